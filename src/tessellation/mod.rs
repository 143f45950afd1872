mod tessellate_loops;
mod tessellate_solid;

pub use tessellate_loops::TessellateLoops;
pub use tessellate_solid::TessellateSolid;

use crate::math::{Point3, Vector3, TOLERANCE};

/// A triangle mesh approximation of a solid.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Unit geometric normal of a triangle, or zero if it is degenerate.
    #[must_use]
    pub fn facet_normal(&self, tri: [u32; 3]) -> Vector3 {
        let a = self.vertices[tri[0] as usize];
        let b = self.vertices[tri[1] as usize];
        let c = self.vertices[tri[2] as usize];
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len < TOLERANCE {
            Vector3::zeros()
        } else {
            n / len
        }
    }
}
