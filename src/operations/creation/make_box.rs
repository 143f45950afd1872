use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::Mesh;

/// Creates an axis-aligned box centered at the origin.
pub struct MakeBox {
    half_extents: Vector3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation from half-extents along x, y and z.
    #[must_use]
    pub fn new(half_extents: Vector3) -> Self {
        Self { half_extents }
    }

    /// Executes the operation, returning a six-quad mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if any extent is not positive.
    pub fn execute(&self) -> Result<Mesh> {
        let h = self.half_extents;
        if !h.iter().all(|e| e.is_finite() && *e > TOLERANCE) {
            return Err(OperationError::InvalidInput(format!(
                "box half-extents must be positive, got ({}, {}, {})",
                h.x, h.y, h.z
            ))
            .into());
        }

        // Corner index bits: x = 1, y = 2, z = 4.
        let positions = (0..8u8)
            .map(|i| {
                Point3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();

        let faces = vec![
            vec![0, 2, 3, 1], // -z
            vec![4, 5, 7, 6], // +z
            vec![0, 1, 5, 4], // -y
            vec![2, 6, 7, 3], // +y
            vec![0, 4, 6, 2], // -x
            vec![1, 3, 7, 5], // +x
        ];

        Ok(Mesh::new(positions, faces))
    }
}
