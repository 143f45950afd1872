use super::mesh::Mesh;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the mesh store.
    pub struct SolidId;
}

/// The part a solid plays in key assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidRole {
    /// A hemisphere that accumulates key features.
    Base,
    /// A primitive consumed by a single boolean and then discarded.
    Tool,
}

/// Data associated with a solid.
///
/// A solid is a closed polygon mesh enclosing a positive volume.
#[derive(Debug, Clone)]
pub struct SolidData {
    /// Human-readable name used in log output.
    pub name: String,
    /// Role of the solid in the current run.
    pub role: SolidRole,
    /// Boundary mesh.
    pub mesh: Mesh,
}

impl SolidData {
    /// Creates base solid data.
    #[must_use]
    pub fn base(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            role: SolidRole::Base,
            mesh,
        }
    }

    /// Creates tool solid data.
    #[must_use]
    pub fn tool(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            role: SolidRole::Tool,
            mesh,
        }
    }
}
