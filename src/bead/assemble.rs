use crate::error::Result;
use crate::math::Vector3;
use crate::operations::boolean::{BooleanOp, CsgEvaluator};
use crate::operations::transform::Translate;
use crate::topology::{MeshStore, SolidData, SolidId};

use super::config::BeadConfig;
use super::key::KeySpec;

/// How keys are cut into a hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Pegs fused onto the top half.
    Peg,
    /// Sockets cut into the bottom half.
    Socket,
}

impl KeyMode {
    /// Tool `(radius, height)`; sockets are oversized by the clearance on
    /// both.
    #[must_use]
    pub fn tool_dimensions(self, config: &BeadConfig) -> (f64, f64) {
        match self {
            Self::Peg => (config.max_key_radius, config.peg_length),
            Self::Socket => (
                config.max_key_radius + config.clearance,
                config.peg_length + config.clearance,
            ),
        }
    }

    /// Z of the tool center so that exactly `overlap` of it lies on the
    /// hemisphere side of `z = 0`.
    #[must_use]
    pub fn tool_offset(self, height: f64, overlap: f64) -> f64 {
        match self {
            Self::Peg => -(height / 2.0 - overlap),
            Self::Socket => height / 2.0 - overlap,
        }
    }

    /// The boolean that applies a tool.
    #[must_use]
    pub fn op(self) -> BooleanOp {
        match self {
            Self::Peg => BooleanOp::Union,
            Self::Socket => BooleanOp::Subtract,
        }
    }

    fn tool_prefix(self) -> &'static str {
        match self {
            Self::Peg => "peg",
            Self::Socket => "socket_cutter",
        }
    }
}

/// Outcome of one assembly pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyReport {
    /// The hemisphere carrying every merged key.
    pub solid: SolidId,
    /// Keys whose boolean succeeded.
    pub merged: usize,
    /// Keys skipped because their boolean failed.
    pub failed: usize,
}

/// Merges keys into a hemisphere one at a time.
///
/// For every key: build the tool, move it into place, evaluate the boolean,
/// and remove the tool from the store whether or not the boolean worked. A
/// failed boolean leaves the hemisphere as it was and the next key proceeds.
pub struct AssembleKeys<'a> {
    base: SolidId,
    keys: &'a [KeySpec],
    mode: KeyMode,
    config: &'a BeadConfig,
}

impl<'a> AssembleKeys<'a> {
    /// Creates a new `AssembleKeys` operation.
    #[must_use]
    pub fn new(base: SolidId, keys: &'a [KeySpec], mode: KeyMode, config: &'a BeadConfig) -> Self {
        Self {
            base,
            keys,
            mode,
            config,
        }
    }

    /// Executes the assembly with the given evaluator.
    ///
    /// # Errors
    ///
    /// Boolean failures are absorbed into the report. An error is returned
    /// only if the base solid is missing or a tool cannot be built.
    pub fn execute(
        &self,
        store: &mut MeshStore,
        evaluator: &mut dyn CsgEvaluator,
    ) -> Result<AssemblyReport> {
        let (radius, height) = self.mode.tool_dimensions(self.config);
        let z = self.mode.tool_offset(height, self.config.overlap);
        let op = self.mode.op();
        let base_name = store.solid(self.base)?.name.clone();

        let mut report = AssemblyReport {
            solid: self.base,
            merged: 0,
            failed: 0,
        };
        for (i, key) in self.keys.iter().enumerate() {
            let number = i + 1;
            tracing::debug!(
                key = number,
                shape = %key.shape,
                x = key.position.x,
                y = key.position.y,
                "placing key"
            );

            let mesh = key.shape.build(radius, height)?;
            let tool = store.add_solid(SolidData::tool(
                format!("{}_{}_{number}", self.mode.tool_prefix(), key.shape),
                mesh,
            ));
            let outcome = Translate::new(tool, Vector3::new(key.position.x, key.position.y, z))
                .execute(store)
                .and_then(|()| evaluator.evaluate(store, report.solid, tool, op));
            store.remove_solid(tool)?;

            match outcome {
                Ok(merged) => {
                    store.remove_solid(report.solid)?;
                    report.solid = merged;
                    report.merged += 1;
                    tracing::debug!(key = number, op = op.label(), "boolean applied");
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        solid = %base_name,
                        key = number,
                        shape = %key.shape,
                        op = op.label(),
                        error = %err,
                        "boolean failed; key skipped"
                    );
                }
            }
        }
        Ok(report)
    }
}
