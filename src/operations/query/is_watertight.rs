use crate::topology::{EdgeMap, Mesh};

/// Checks that a mesh closes a volume.
///
/// Every undirected edge must be used by exactly two faces that traverse it
/// in opposite directions, which is both the no-boundary condition and the
/// consistent-winding condition.
pub struct IsWatertight<'a> {
    mesh: &'a Mesh,
}

impl<'a> IsWatertight<'a> {
    /// Creates a new `IsWatertight` query.
    #[must_use]
    pub fn new(mesh: &'a Mesh) -> Self {
        Self { mesh }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self) -> bool {
        if self.mesh.is_empty() || self.mesh.check_indices().is_err() {
            return false;
        }
        let edges = EdgeMap::build(self.mesh);
        let closed = edges
            .iter()
            .all(|(_, uses)| uses.len() == 2 && uses[0].forward != uses[1].forward);
        closed
    }
}
