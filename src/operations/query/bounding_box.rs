use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::Mesh;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Returns `true` if the boxes overlap, allowing `TOLERANCE` slack.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x + TOLERANCE
            && self.max.x >= other.min.x - TOLERANCE
            && self.min.y <= other.max.y + TOLERANCE
            && self.max.y >= other.min.y - TOLERANCE
            && self.min.z <= other.max.z + TOLERANCE
            && self.max.z >= other.min.z - TOLERANCE
    }

    /// Bounding box of a point set, or `None` if it is empty.
    #[must_use]
    pub fn from_points<'p>(points: impl IntoIterator<Item = &'p Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });
        Some(Self { min, max })
    }
}

/// Computes the axis-aligned bounding box of a mesh.
pub struct BoundingBox<'a> {
    mesh: &'a Mesh,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(mesh: &'a Mesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no vertices.
    pub fn execute(&self) -> Result<Aabb> {
        Aabb::from_points(&self.mesh.positions).ok_or_else(|| {
            OperationError::InvalidInput("bounding box of an empty mesh".into()).into()
        })
    }
}
