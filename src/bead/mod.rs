//! Interlocking bead generation: configuration, key layout, hemisphere
//! construction, key assembly and the per-run driver.

mod assemble;
mod config;
mod generator;
mod hemisphere;
mod key;
mod placement;

pub use assemble::{AssembleKeys, AssemblyReport, KeyMode};
pub use config::BeadConfig;
pub use generator::{BeadGenerator, BeadReport, BeadSink, RunSummary};
pub use hemisphere::BuildHemisphere;
pub use key::{BeadLayout, KeyShape, KeySpec, CYLINDER_SIDES};
pub use placement::PlaceKeys;
