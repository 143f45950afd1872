use crate::error::{GeometryError, Result};
use crate::math::Vector3;
use crate::topology::{MeshStore, SolidId};

/// Translates a solid by a displacement vector.
pub struct Translate {
    solid: SolidId,
    displacement: Vector3,
}

impl Translate {
    /// Creates a new `Translate` operation.
    #[must_use]
    pub fn new(solid: SolidId, displacement: Vector3) -> Self {
        Self {
            solid,
            displacement,
        }
    }

    /// Executes the translation, modifying the solid in-place.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is missing or the displacement is not
    /// finite.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        if !self.displacement.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite("translation").into());
        }
        store.solid_mut(self.solid)?.mesh.translate(&self.displacement);
        Ok(())
    }
}
