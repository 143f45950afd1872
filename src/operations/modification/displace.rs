use crate::error::{OperationError, Result};
use crate::math::noise::perlin3;
use crate::math::{Point3, TOLERANCE};
use crate::topology::{MeshStore, SolidData, SolidId};

/// Pushes every vertex of a solid radially by a coherent-noise amount.
///
/// Each vertex `v` moves to `v + normalize(v) * noise(v * frequency) * amplitude`.
/// The noise field is sampled at the vertex position only, so the result is
/// independent of traversal order and of any run seed. A zero amplitude
/// leaves every position bit-identical.
pub struct DisplaceNoise {
    solid: SolidId,
    amplitude: f64,
    frequency: f64,
}

impl DisplaceNoise {
    /// Creates a new `DisplaceNoise` operation.
    #[must_use]
    pub fn new(solid: SolidId, amplitude: f64, frequency: f64) -> Self {
        Self {
            solid,
            amplitude,
            frequency,
        }
    }

    /// Executes the displacement, consuming the input solid and returning
    /// the displaced one.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is missing, or amplitude or frequency is
    /// negative or not finite.
    pub fn execute(&self, store: &mut MeshStore) -> Result<SolidId> {
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "noise amplitude must be non-negative, got {}",
                self.amplitude
            ))
            .into());
        }
        if !(self.frequency.is_finite() && self.frequency >= 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "noise frequency must be non-negative, got {}",
                self.frequency
            ))
            .into());
        }

        let SolidData { name, mut mesh, .. } = store.remove_solid(self.solid)?;
        for p in &mut mesh.positions {
            let len = p.coords.norm();
            if len < TOLERANCE {
                continue;
            }
            let dir = p.coords / len;
            let n = perlin3(&Point3::from(p.coords * self.frequency));
            *p += dir * (n * self.amplitude);
        }
        mesh.recompute_normals();

        Ok(store.add_solid(SolidData::base(name, mesh)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeUvSphere;
    use crate::operations::query::IsWatertight;

    fn sphere(store: &mut MeshStore) -> SolidId {
        let mesh = MakeUvSphere::new(Point3::origin(), 30.0, 32, 16).execute().unwrap();
        store.add_solid(SolidData::base("sphere", mesh))
    }

    #[test]
    fn zero_amplitude_is_identity() {
        let mut store = MeshStore::new();
        let id = sphere(&mut store);
        let before = store.mesh(id).unwrap().positions.clone();
        let displaced = DisplaceNoise::new(id, 0.0, 2.0 / 30.0).execute(&mut store).unwrap();
        assert_eq!(store.mesh(displaced).unwrap().positions, before);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn displacement_is_radial_and_bounded() {
        let mut store = MeshStore::new();
        let id = sphere(&mut store);
        let displaced = DisplaceNoise::new(id, 3.0, 2.0 / 30.0).execute(&mut store).unwrap();
        let mesh = store.mesh(displaced).unwrap();
        let mut moved = false;
        for p in &mesh.positions {
            let r = p.coords.norm();
            assert!((r - 30.0).abs() <= 3.0 * 1.1);
            moved |= (r - 30.0).abs() > 1e-6;
        }
        assert!(moved);
        assert!(IsWatertight::new(mesh).execute());
    }

    #[test]
    fn displacement_is_deterministic() {
        let mut store = MeshStore::new();
        let a = sphere(&mut store);
        let b = sphere(&mut store);
        let a = DisplaceNoise::new(a, 5.0, 0.1).execute(&mut store).unwrap();
        let b = DisplaceNoise::new(b, 5.0, 0.1).execute(&mut store).unwrap();
        assert_eq!(
            store.mesh(a).unwrap().positions,
            store.mesh(b).unwrap().positions
        );
    }

    #[test]
    fn negative_amplitude_fails() {
        let mut store = MeshStore::new();
        let id = sphere(&mut store);
        assert!(DisplaceNoise::new(id, -1.0, 0.1).execute(&mut store).is_err());
    }
}
