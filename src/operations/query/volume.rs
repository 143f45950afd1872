use crate::topology::Mesh;

/// Computes the signed volume enclosed by a mesh.
///
/// Uses the signed tetrahedron method: for each fan triangle, sums
/// `(1/6) * v0 . (v1 x v2)`. Positive for outward winding, negative for an
/// inside-out mesh. Only meaningful for closed meshes, though a T-junction
/// crack contributes nothing and leaves the value intact.
pub struct Volume<'a> {
    mesh: &'a Mesh,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(mesh: &'a Mesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the signed volume.
    #[must_use]
    pub fn execute(&self) -> f64 {
        signed_volume_of(self.mesh, self.mesh.triangles())
    }
}

/// Signed volume of the given triangles of `mesh`.
pub(crate) fn signed_volume_of(mesh: &Mesh, triangles: impl Iterator<Item = [u32; 3]>) -> f64 {
    let mut sum = 0.0;
    for [a, b, c] in triangles {
        let v0 = mesh.positions[a as usize].coords;
        let v1 = mesh.positions[b as usize].coords;
        let v2 = mesh.positions[c as usize].coords;
        sum += v0.dot(&v1.cross(&v2));
    }
    sum / 6.0
}
