use crate::error::TopologyError;
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};

/// A polygon mesh: shared vertex positions plus index loops.
///
/// Faces wind counter-clockwise when viewed from outside the enclosed
/// volume. `normals` holds one area-weighted normal per vertex and is kept
/// in sync by [`Mesh::recompute_normals`].
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Faces as vertex-index loops (at least three indices each).
    pub faces: Vec<Vec<u32>>,
    /// Per-vertex normals.
    pub normals: Vec<Vector3>,
}

impl Mesh {
    /// Creates a mesh from positions and faces, computing vertex normals.
    #[must_use]
    pub fn new(positions: Vec<Point3>, faces: Vec<Vec<u32>>) -> Self {
        let mut mesh = Self {
            positions,
            faces,
            normals: Vec::new(),
        };
        mesh.recompute_normals();
        mesh
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the mesh has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Appends a vertex and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, point: Point3) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(point);
        idx
    }

    /// Returns the positions of a face's vertices in winding order.
    #[must_use]
    pub fn face_points(&self, face: usize) -> Vec<Point3> {
        self.faces[face]
            .iter()
            .map(|&i| self.positions[i as usize])
            .collect()
    }

    /// Unit normal of a face, or zero for a degenerate face.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Vector3 {
        let n = newell_normal(&self.face_points(face));
        let len = n.norm();
        if len < TOLERANCE {
            Vector3::zeros()
        } else {
            n / len
        }
    }

    /// Reverses the winding of a face.
    pub fn flip_face(&mut self, face: usize) {
        self.faces[face].reverse();
    }

    /// Recomputes per-vertex normals as the area-weighted average of the
    /// normals of incident faces.
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.positions.len()];
        for face in &self.faces {
            let points: Vec<Point3> = face.iter().map(|&i| self.positions[i as usize]).collect();
            // Newell's normal is already scaled by twice the face area.
            let weighted = newell_normal(&points);
            for &i in face {
                normals[i as usize] += weighted;
            }
        }
        for n in &mut normals {
            let len = n.norm();
            if len > TOLERANCE {
                *n /= len;
            }
        }
        self.normals = normals;
    }

    /// Fan-triangulates every face, yielding vertex-index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces.iter().flat_map(|face| {
            (1..face.len().saturating_sub(1)).map(move |k| [face[0], face[k], face[k + 1]])
        })
    }

    /// Translates every vertex by `displacement`.
    pub fn translate(&mut self, displacement: &Vector3) {
        for p in &mut self.positions {
            *p += displacement;
        }
    }

    /// Returns `true` if every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.positions
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// Checks that every face has at least three in-range indices.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending face.
    pub fn check_indices(&self) -> Result<(), TopologyError> {
        let count = self.positions.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(TopologyError::InvalidTopology(format!(
                    "face {face_idx} has {} vertices",
                    face.len()
                )));
            }
            if let Some(&vertex) = face.iter().find(|&&i| i as usize >= count) {
                return Err(TopologyError::IndexOutOfRange {
                    face: face_idx,
                    vertex,
                    count,
                });
            }
        }
        Ok(())
    }

    /// Removes vertices not referenced by any face and re-indexes faces.
    #[allow(clippy::cast_possible_truncation)]
    pub fn compact(&mut self) {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut positions = Vec::with_capacity(self.positions.len());
        for face in &mut self.faces {
            for idx in face.iter_mut() {
                let old = *idx as usize;
                if remap[old] == u32::MAX {
                    remap[old] = positions.len() as u32;
                    positions.push(self.positions[old]);
                }
                *idx = remap[old];
            }
        }
        self.positions = positions;
        self.recompute_normals();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Mesh {
        Mesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn normals_follow_winding() {
        let mut mesh = unit_square();
        assert_relative_eq!(mesh.normals[0].z, 1.0, epsilon = 1e-12);
        mesh.flip_face(0);
        mesh.recompute_normals();
        assert_relative_eq!(mesh.normals[2].z, -1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_normal(0).z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let tris: Vec<_> = unit_square().triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let mesh = Mesh {
            positions: vec![p(0.0, 0.0, 0.0)],
            faces: vec![vec![0, 1, 2]],
            normals: Vec::new(),
        };
        assert!(mesh.check_indices().is_err());
        assert!(unit_square().check_indices().is_ok());
    }

    #[test]
    fn compact_drops_unused_vertices() {
        let mut mesh = Mesh::new(
            vec![p(9.0, 9.0, 9.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![vec![1, 2, 3]],
        );
        mesh.compact();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[0], vec![0, 1, 2]);
        assert_eq!(mesh.normals.len(), 3);
    }
}
