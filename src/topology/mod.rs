pub mod edge;
pub mod mesh;
pub mod solid;

pub use edge::{EdgeMap, EdgeUse};
pub use mesh::Mesh;
pub use solid::{SolidData, SolidId, SolidRole};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns every solid alive during a run.
///
/// Solids reference nothing but their own mesh, so a stage consumes an ID
/// and produces a new one; removal releases the mesh immediately.
#[derive(Debug, Default)]
pub struct MeshStore {
    solids: SlotMap<SolidId, SolidData>,
}

impl MeshStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, TopologyError> {
        self.solids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    /// Returns a mutable reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid_mut(&mut self, id: SolidId) -> Result<&mut SolidData, TopologyError> {
        self.solids
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    /// Shorthand for the mesh of a solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn mesh(&self, id: SolidId) -> Result<&Mesh, TopologyError> {
        self.solid(id).map(|s| &s.mesh)
    }

    /// Removes a solid from the store, returning its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_solid(&mut self, id: SolidId) -> Result<SolidData, TopologyError> {
        self.solids
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    /// Number of solids currently alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// Returns `true` if no solids are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Counts live solids with the given role.
    #[must_use]
    pub fn count_role(&self, role: SolidRole) -> usize {
        self.solids.values().filter(|s| s.role == role).count()
    }
}
