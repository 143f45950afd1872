use std::f64::consts::{PI, TAU};

use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::Mesh;

/// Creates a closed UV-sphere mesh.
///
/// Poles are single shared vertices closed by triangle fans; every other band
/// is a ring of quads. With an even ring count one vertex ring lies exactly on
/// the equator plane `z = center.z`, so a later cut there needs no new vertices.
pub struct MakeUvSphere {
    center: Point3,
    radius: f64,
    segments: usize,
    rings: usize,
}

impl MakeUvSphere {
    /// Creates a new `MakeUvSphere` operation.
    #[must_use]
    pub fn new(center: Point3, radius: f64, segments: usize, rings: usize) -> Self {
        Self {
            center,
            radius,
            segments,
            rings,
        }
    }

    /// Executes the operation, returning the sphere mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive, or if there are fewer
    /// than 3 segments or 2 rings.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<Mesh> {
        if !(self.radius.is_finite() && self.radius > TOLERANCE) {
            return Err(
                OperationError::InvalidInput("sphere radius must be positive".into()).into(),
            );
        }
        if self.segments < 3 || self.rings < 2 {
            return Err(OperationError::InvalidInput(format!(
                "sphere needs at least 3 segments and 2 rings, got {}x{}",
                self.segments, self.rings
            ))
            .into());
        }

        let r = self.radius;
        let c = self.center;
        let seg = self.segments;

        let mut positions = Vec::with_capacity(2 + seg * (self.rings - 1));
        positions.push(Point3::new(c.x, c.y, c.z + r));
        for i in 1..self.rings {
            let theta = PI * i as f64 / self.rings as f64;
            let z = if 2 * i == self.rings { 0.0 } else { r * theta.cos() };
            let rho = r * theta.sin();
            for j in 0..seg {
                let phi = TAU * j as f64 / seg as f64;
                positions.push(Point3::new(c.x + rho * phi.cos(), c.y + rho * phi.sin(), c.z + z));
            }
        }
        let south = positions.len() as u32;
        positions.push(Point3::new(c.x, c.y, c.z - r));

        let ring = |i: usize, j: usize| -> u32 { (1 + (i - 1) * seg + j % seg) as u32 };

        let mut faces = Vec::with_capacity(seg * self.rings);
        for j in 0..seg {
            faces.push(vec![0, ring(1, j), ring(1, j + 1)]);
        }
        for i in 1..self.rings - 1 {
            for j in 0..seg {
                faces.push(vec![ring(i, j), ring(i + 1, j), ring(i + 1, j + 1), ring(i, j + 1)]);
            }
        }
        let last = self.rings - 1;
        for j in 0..seg {
            faces.push(vec![south, ring(last, j + 1), ring(last, j)]);
        }

        Ok(Mesh::new(positions, faces))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::{IsWatertight, Volume};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn sphere_counts() {
        let mesh = MakeUvSphere::new(p(0.0, 0.0, 0.0), 1.0, 8, 4).execute().unwrap();
        assert_eq!(mesh.vertex_count(), 2 + 8 * 3);
        assert_eq!(mesh.face_count(), 8 * 4);
    }

    #[test]
    fn sphere_is_watertight() {
        let mesh = MakeUvSphere::new(p(1.0, 2.0, 3.0), 5.0, 16, 8).execute().unwrap();
        assert!(IsWatertight::new(&mesh).execute());
    }

    #[test]
    fn sphere_volume_approaches_analytic() {
        let mesh = MakeUvSphere::new(p(0.0, 0.0, 0.0), 2.0, 64, 32).execute().unwrap();
        let volume = Volume::new(&mesh).execute();
        let exact = 4.0 / 3.0 * PI * 8.0;
        assert!(volume > 0.0);
        assert!((volume - exact).abs() / exact < 0.02);
    }

    #[test]
    fn even_rings_put_a_ring_on_the_equator() {
        let mesh = MakeUvSphere::new(p(0.0, 0.0, 0.0), 30.0, 64, 32).execute().unwrap();
        let on_plane = mesh.positions.iter().filter(|q| q.z.abs() < 1e-12).count();
        assert_eq!(on_plane, 64);
    }

    #[test]
    fn zero_radius_fails() {
        assert!(MakeUvSphere::new(p(0.0, 0.0, 0.0), 0.0, 8, 4).execute().is_err());
        assert!(MakeUvSphere::new(p(0.0, 0.0, 0.0), 1.0, 2, 4).execute().is_err());
    }
}
