use thiserror::Error;

/// Top-level error type for the bead generator.
#[derive(Debug, Error)]
pub enum LockbeadError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),
}

/// Errors related to mesh storage and connectivity.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("face {face} references vertex {vertex} out of {count}")]
    IndexOutOfRange { face: usize, vertex: u32, count: usize },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to mesh operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to triangulation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("triangulation failed: {0}")]
    Failed(String),
}

/// Errors raised while validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("option `{option}` = {value} is invalid: {reason}")]
    Invalid {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the export collaborator and output resolution.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable output directory: {0}")]
    NoOutputDir(String),
}

/// Convenience type alias for results using [`LockbeadError`].
pub type Result<T> = std::result::Result<T, LockbeadError>;
