use crate::error::Result;
use crate::topology::{MeshStore, SolidId};

use super::engine::boolean_execute;
use super::select::BooleanOp;

/// Computes the boolean intersection of two solids.
pub struct Intersect {
    solid_a: SolidId,
    solid_b: SolidId,
}

impl Intersect {
    /// Creates a new `Intersect` operation.
    #[must_use]
    pub fn new(solid_a: SolidId, solid_b: SolidId) -> Self {
        Self { solid_a, solid_b }
    }

    /// Executes the intersection, creating the result solid in the mesh store.
    ///
    /// # Errors
    ///
    /// Returns an error if either solid is missing or they do not overlap.
    pub fn execute(&self, store: &mut MeshStore) -> Result<SolidId> {
        boolean_execute(store, self.solid_a, self.solid_b, BooleanOp::Intersect)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::creation::{MakeBox, MakePrism};
    use crate::operations::query::Volume;
    use crate::topology::SolidData;
    use approx::assert_relative_eq;

    #[test]
    fn prism_clipped_by_box() {
        let mut store = MeshStore::new();
        let slab = MakeBox::new(Vector3::new(3.0, 3.0, 0.5)).execute().unwrap();
        let pin = MakePrism::new(4, 1.0, 10.0).execute().unwrap();
        let slab = store.add_solid(SolidData::base("slab", slab));
        let pin = store.add_solid(SolidData::tool("pin", pin));
        let c = Intersect::new(slab, pin).execute(&mut store).unwrap();
        // A square of circumradius 1 has area 2.
        assert_relative_eq!(Volume::new(store.mesh(c).unwrap()).execute(), 2.0, epsilon = 1e-9);
    }
}
