use crate::error::Result;
use crate::topology::{MeshStore, SolidId};

use super::TriangleMesh;

/// Tessellates a solid's polygon faces into a triangle mesh.
///
/// Faces are fan-triangulated from their first vertex. Faces produced by
/// the generator are convex (prism caps, sphere quads, BSP fragments) or
/// already triangles (bisect caps), so the fan is exact.
pub struct TessellateSolid {
    solid: SolidId,
}

impl TessellateSolid {
    /// Creates a new `TessellateSolid` operation.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the tessellation, returning a combined triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is missing or has invalid face indices.
    pub fn execute(&self, store: &MeshStore) -> Result<TriangleMesh> {
        let mesh = store.mesh(self.solid)?;
        mesh.check_indices()?;
        Ok(TriangleMesh {
            vertices: mesh.positions.clone(),
            normals: mesh.normals.clone(),
            indices: mesh.triangles().collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::creation::MakeBox;
    use crate::topology::SolidData;

    #[test]
    fn box_tessellates_to_12_triangles() {
        let mut store = MeshStore::new();
        let mesh = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        let id = store.add_solid(SolidData::base("box", mesh));
        let tris = TessellateSolid::new(id).execute(&store).unwrap();
        assert_eq!(tris.indices.len(), 12);
        assert_eq!(tris.vertices.len(), tris.normals.len());
        for tri in &tris.indices {
            let n = tris.facet_normal(*tri);
            assert!((n.norm() - 1.0).abs() < 1e-12);
        }
    }
}
