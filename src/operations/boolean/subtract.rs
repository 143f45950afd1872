use crate::error::Result;
use crate::topology::{MeshStore, SolidId};

use super::engine::boolean_execute;
use super::select::BooleanOp;

/// Computes the boolean subtraction of one solid from another.
pub struct Subtract {
    solid_a: SolidId,
    solid_b: SolidId,
}

impl Subtract {
    /// Creates a new `Subtract` operation (A - B).
    #[must_use]
    pub fn new(solid_a: SolidId, solid_b: SolidId) -> Self {
        Self { solid_a, solid_b }
    }

    /// Executes the subtraction, creating the result solid in the mesh store.
    ///
    /// # Errors
    ///
    /// Returns an error if either solid is missing or nothing of A remains.
    pub fn execute(&self, store: &mut MeshStore) -> Result<SolidId> {
        boolean_execute(store, self.solid_a, self.solid_b, BooleanOp::Subtract)
    }
}
