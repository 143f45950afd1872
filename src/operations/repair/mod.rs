mod fill;
mod heal;
mod orient;
mod weld;

use crate::error::Result;
use crate::topology::{EdgeMap, Mesh, MeshStore, SolidId};

/// What a repair pass changed and what it could not fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Vertices merged into a coincident neighbour.
    pub welded: usize,
    /// Vertices inserted into open edges to close T-junctions.
    pub healed_t_junctions: usize,
    /// Open loops capped with new faces.
    pub filled_holes: usize,
    /// Faces whose winding was reversed.
    pub flipped: usize,
    /// Edges still used by a single face afterwards.
    pub boundary_edges: usize,
    /// Edges still used by more than two faces afterwards.
    pub non_manifold_edges: usize,
}

impl RepairReport {
    /// Returns `true` if the repaired mesh is closed and manifold.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }
}

/// Cleans up the seams a boolean leaves behind.
///
/// Runs four passes in order: vertex welding within `weld_epsilon`,
/// T-junction healing along open edges, capping of the loops still open,
/// and consistent outward orientation. Leftover defects are reported, not
/// treated as errors.
pub struct RepairMesh {
    solid: SolidId,
    weld_epsilon: f64,
}

impl RepairMesh {
    /// Creates a new `RepairMesh` operation.
    #[must_use]
    pub fn new(solid: SolidId, weld_epsilon: f64) -> Self {
        Self {
            solid,
            weld_epsilon,
        }
    }

    /// Repairs the solid's mesh in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is missing or its faces index vertices
    /// that do not exist.
    pub fn execute(&self, store: &mut MeshStore) -> Result<RepairReport> {
        let solid = store.solid_mut(self.solid)?;
        solid.mesh.check_indices()?;
        let report = repair_mesh(&mut solid.mesh, self.weld_epsilon);
        if report.is_clean() {
            tracing::debug!(solid = %solid.name, ?report, "mesh repaired");
        } else {
            tracing::warn!(
                solid = %solid.name,
                boundary_edges = report.boundary_edges,
                non_manifold_edges = report.non_manifold_edges,
                "mesh still has open or non-manifold edges after repair"
            );
        }
        Ok(report)
    }
}

/// Runs every repair pass on a bare mesh.
pub fn repair_mesh(mesh: &mut Mesh, weld_epsilon: f64) -> RepairReport {
    let welded = weld::weld_vertices(mesh, weld_epsilon);
    let healed_t_junctions = heal::heal_t_junctions(mesh, weld_epsilon);
    let filled_holes = fill::fill_holes(mesh);
    let flipped = orient::orient_faces(mesh);

    let edges = EdgeMap::build(mesh);
    RepairReport {
        welded,
        healed_t_junctions,
        filled_holes,
        flipped,
        boundary_edges: edges.boundary_edges().len(),
        non_manifold_edges: edges.non_manifold_count(),
    }
}
