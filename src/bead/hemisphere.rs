use crate::error::Result;
use crate::math::Point3;
use crate::operations::creation::MakeUvSphere;
use crate::operations::modification::{Bisect, DisplaceNoise, HalfSpace};
use crate::topology::{MeshStore, SolidData, SolidId};

use super::config::BeadConfig;

/// Builds one solid, flat-capped half of a bead.
///
/// A UV sphere of the configured radius is optionally displaced by noise,
/// then cut at `z = 0` keeping `half`. The flat face lies exactly on
/// `z = 0`.
pub struct BuildHemisphere<'a> {
    config: &'a BeadConfig,
    half: HalfSpace,
}

impl<'a> BuildHemisphere<'a> {
    /// Creates a new `BuildHemisphere` operation.
    #[must_use]
    pub fn new(config: &'a BeadConfig, half: HalfSpace) -> Self {
        Self { config, half }
    }

    /// Executes the build and returns the capped hemisphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the sphere parameters are invalid or the cut
    /// cannot be capped.
    pub fn execute(&self, store: &mut MeshStore) -> Result<SolidId> {
        let config = self.config;
        let sphere = MakeUvSphere::new(
            Point3::origin(),
            config.outer_radius(),
            config.sphere_segments,
            config.sphere_rings,
        )
        .execute()?;
        let mut solid = store.add_solid(SolidData::base(
            format!("hemisphere_{}", self.half.label()),
            sphere,
        ));

        if config.add_surface_noise {
            tracing::info!(
                amplitude = config.noise_amplitude(),
                frequency = config.noise_frequency(),
                "adding surface noise"
            );
            solid = DisplaceNoise::new(solid, config.noise_amplitude(), config.noise_frequency())
                .execute(store)?;
        }

        Bisect::new(solid, self.half).execute(store)
    }
}
