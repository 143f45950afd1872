use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::io::StlFormat;

use super::key::KeyShape;

/// Default outer diameter of a whole bead, in mm.
pub const DEFAULT_SPHERE_DIAMETER: f64 = 60.0;

/// Default wall thickness; the flat face keeps keys this far from the rim.
pub const DEFAULT_WALL_THICKNESS: f64 = 3.0;

/// Default total length of every peg, in mm.
pub const DEFAULT_PEG_LENGTH: f64 = 20.0;

/// Default radial and axial oversize of a socket over its peg, in mm.
pub const DEFAULT_CLEARANCE: f64 = 0.5;

/// Default axial embedding of a key tool across the flat face, in mm.
pub const DEFAULT_OVERLAP: f64 = 11.0;

/// Default number of bead pairs per run.
pub const DEFAULT_BEAD_COUNT: usize = 4;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 2057;

/// Default peg radius, in mm.
pub const DEFAULT_MAX_KEY_RADIUS: f64 = 6.0;

/// Default sphere tessellation.
pub const DEFAULT_SPHERE_SEGMENTS: usize = 64;
pub const DEFAULT_SPHERE_RINGS: usize = 32;

/// Default noise amplitude as a fraction of the outer radius.
pub const DEFAULT_NOISE_AMPLITUDE_RATIO: f64 = 0.3;

/// Default noise frequency times the outer radius.
pub const DEFAULT_NOISE_FREQUENCY_RADII: f64 = 2.0;

/// Default number of candidate draws per bead during key placement.
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: usize = 1000;

/// Default vertex weld distance used by mesh repair, in mm.
pub const DEFAULT_WELD_EPSILON: f64 = 1e-4;

/// Run configuration, fixed for the whole run.
///
/// Every field has a default, so a JSON file only needs to name what it
/// changes. Unknown keys are rejected to catch typos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeadConfig {
    /// Outer diameter of the bead.
    pub sphere_diameter: f64,
    /// Wall thickness kept between keys and the rim.
    pub wall_thickness: f64,
    /// Total peg length.
    pub peg_length: f64,
    /// Socket oversize, applied to both radius and height.
    pub clearance: f64,
    /// Axial embedding of each key tool across `z = 0`.
    pub overlap: f64,
    /// Number of bead pairs.
    pub bead_count: usize,
    /// Key shapes, one key per shape per bead, in placement order.
    pub key_shapes: Vec<KeyShape>,
    /// RNG seed for key placement.
    pub seed: u64,
    /// Peg radius; sockets add `clearance`.
    pub max_key_radius: f64,
    /// Whether the sphere surface is displaced by noise.
    pub add_surface_noise: bool,
    /// Longitudinal sphere subdivisions.
    pub sphere_segments: usize,
    /// Latitudinal sphere subdivisions.
    pub sphere_rings: usize,
    /// Noise amplitude; `None` means `0.3 × outer radius`.
    pub noise_amplitude: Option<f64>,
    /// Noise frequency; `None` means `2 / outer radius`.
    pub noise_frequency: Option<f64>,
    /// Candidate draws per bead during key placement.
    pub max_placement_attempts: usize,
    /// Vertex weld distance for mesh repair.
    pub weld_epsilon: f64,
    /// STL encoding for exported halves.
    pub stl_format: StlFormat,
}

impl Default for BeadConfig {
    fn default() -> Self {
        Self {
            sphere_diameter: DEFAULT_SPHERE_DIAMETER,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            peg_length: DEFAULT_PEG_LENGTH,
            clearance: DEFAULT_CLEARANCE,
            overlap: DEFAULT_OVERLAP,
            bead_count: DEFAULT_BEAD_COUNT,
            key_shapes: KeyShape::ALL.to_vec(),
            seed: DEFAULT_SEED,
            max_key_radius: DEFAULT_MAX_KEY_RADIUS,
            add_surface_noise: true,
            sphere_segments: DEFAULT_SPHERE_SEGMENTS,
            sphere_rings: DEFAULT_SPHERE_RINGS,
            noise_amplitude: None,
            noise_frequency: None,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            weld_epsilon: DEFAULT_WELD_EPSILON,
            stl_format: StlFormat::Binary,
        }
    }
}

impl BeadConfig {
    /// Reads a configuration from a JSON file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. The result is
    /// not validated; call [`BeadConfig::validate`] once overrides are in.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Outer radius `R`.
    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.sphere_diameter / 2.0
    }

    /// Radius of the flat-face disk available to keys.
    #[must_use]
    pub fn inner_radius(&self) -> f64 {
        self.outer_radius() - self.wall_thickness
    }

    /// Radius of the disk key centers are drawn from.
    #[must_use]
    pub fn usable_radius(&self) -> f64 {
        self.inner_radius() - self.max_key_radius
    }

    /// Minimum center-to-center key distance.
    #[must_use]
    pub fn min_separation(&self) -> f64 {
        2.0 * self.max_key_radius
    }

    /// Effective noise amplitude; zero when noise is disabled.
    #[must_use]
    pub fn noise_amplitude(&self) -> f64 {
        if !self.add_surface_noise {
            return 0.0;
        }
        self.noise_amplitude
            .unwrap_or(DEFAULT_NOISE_AMPLITUDE_RATIO * self.outer_radius())
    }

    /// Effective noise frequency.
    #[must_use]
    pub fn noise_frequency(&self) -> f64 {
        self.noise_frequency
            .unwrap_or(DEFAULT_NOISE_FREQUENCY_RADII / self.outer_radius())
    }

    /// Checks every option against the geometry it has to produce.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("sphere_diameter", self.sphere_diameter)?;
        positive("wall_thickness", self.wall_thickness)?;
        positive("peg_length", self.peg_length)?;
        non_negative("clearance", self.clearance)?;
        non_negative("overlap", self.overlap)?;
        positive("max_key_radius", self.max_key_radius)?;
        positive("weld_epsilon", self.weld_epsilon)?;
        if let Some(amplitude) = self.noise_amplitude {
            non_negative("noise_amplitude", amplitude)?;
        }
        if let Some(frequency) = self.noise_frequency {
            non_negative("noise_frequency", frequency)?;
        }

        if self.wall_thickness >= self.outer_radius() {
            return Err(invalid(
                "wall_thickness",
                self.wall_thickness,
                "must be smaller than the outer radius",
            ));
        }
        if self.max_key_radius >= self.inner_radius() {
            return Err(invalid(
                "max_key_radius",
                self.max_key_radius,
                "must be smaller than the inner radius",
            ));
        }
        if self.overlap >= self.peg_length {
            return Err(invalid(
                "overlap",
                self.overlap,
                "must be smaller than the peg length",
            ));
        }
        if self.noise_amplitude() >= self.outer_radius() {
            return Err(invalid(
                "noise_amplitude",
                self.noise_amplitude(),
                "must be smaller than the outer radius",
            ));
        }
        if self.sphere_segments < 3 {
            return Err(invalid(
                "sphere_segments",
                self.sphere_segments,
                "must be at least 3",
            ));
        }
        if self.sphere_rings < 2 {
            return Err(invalid("sphere_rings", self.sphere_rings, "must be at least 2"));
        }
        if self.key_shapes.is_empty() {
            return Err(invalid("key_shapes", "[]", "must name at least one shape"));
        }
        if self.max_placement_attempts == 0 {
            return Err(invalid(
                "max_placement_attempts",
                self.max_placement_attempts,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn invalid(option: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        option,
        value: value.to_string(),
        reason,
    }
}

fn positive(option: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(option, value, "must be finite and positive"))
    }
}

fn non_negative(option: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(option, value, "must be finite and non-negative"))
    }
}
