use std::f64::consts::TAU;

use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::Mesh;

/// Creates a right prism over a regular polygon, centered at the origin with
/// its axis along z.
///
/// `radius` is the circumradius of the cross-section. A high side count
/// stands in for a cylinder.
pub struct MakePrism {
    sides: usize,
    radius: f64,
    height: f64,
}

impl MakePrism {
    /// Creates a new `MakePrism` operation.
    #[must_use]
    pub fn new(sides: usize, radius: f64, height: f64) -> Self {
        Self {
            sides,
            radius,
            height,
        }
    }

    /// Executes the operation, returning the prism mesh.
    ///
    /// The two caps are single n-gons; the sides are quads.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or height is not positive, or there are
    /// fewer than 3 sides.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<Mesh> {
        if !(self.radius.is_finite() && self.radius > TOLERANCE) {
            return Err(
                OperationError::InvalidInput("prism radius must be positive".into()).into(),
            );
        }
        if !(self.height.is_finite() && self.height > TOLERANCE) {
            return Err(
                OperationError::InvalidInput("prism height must be positive".into()).into(),
            );
        }
        if self.sides < 3 {
            return Err(OperationError::InvalidInput(format!(
                "prism needs at least 3 sides, got {}",
                self.sides
            ))
            .into());
        }

        let n = self.sides;
        let half = self.height * 0.5;
        let mut positions = Vec::with_capacity(2 * n);
        for z in [-half, half] {
            for k in 0..n {
                let phi = TAU * k as f64 / n as f64;
                positions.push(Point3::new(self.radius * phi.cos(), self.radius * phi.sin(), z));
            }
        }

        let bottom = |k: usize| (k % n) as u32;
        let top = |k: usize| (n + k % n) as u32;

        let mut faces = Vec::with_capacity(n + 2);
        faces.push((0..n).rev().map(bottom).collect());
        faces.push((0..n).map(top).collect());
        for k in 0..n {
            faces.push(vec![bottom(k), bottom(k + 1), top(k + 1), top(k)]);
        }

        Ok(Mesh::new(positions, faces))
    }
}
