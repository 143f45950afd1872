use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{Point2, Vector3};
use crate::operations::creation::{MakeBox, MakePrism};
use crate::topology::Mesh;

/// Side count used to approximate a round key.
pub const CYLINDER_SIDES: usize = 32;

/// The closed set of key cross-sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyShape {
    Cylinder,
    Triangle,
    Square,
    Hexagon,
}

impl KeyShape {
    /// Every shape, in the default placement order.
    pub const ALL: [KeyShape; 4] = [
        KeyShape::Cylinder,
        KeyShape::Triangle,
        KeyShape::Square,
        KeyShape::Hexagon,
    ];

    /// Lower-case name, as used in configuration files and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cylinder => "cylinder",
            Self::Triangle => "triangle",
            Self::Square => "square",
            Self::Hexagon => "hexagon",
        }
    }

    /// Builds the key primitive, centered at the origin with its axis on z.
    ///
    /// Round, triangular and hexagonal keys take `radius` as circumradius;
    /// a square key is an axis-aligned box of side `2 × radius`.
    ///
    /// # Errors
    ///
    /// Returns an error if `radius` or `height` is not positive.
    pub fn build(self, radius: f64, height: f64) -> Result<Mesh> {
        match self {
            Self::Cylinder => MakePrism::new(CYLINDER_SIDES, radius, height).execute(),
            Self::Triangle => MakePrism::new(3, radius, height).execute(),
            Self::Hexagon => MakePrism::new(6, radius, height).execute(),
            Self::Square => MakeBox::new(Vector3::new(radius, radius, height * 0.5)).execute(),
        }
    }
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One key feature: a shape at a position on the flat face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySpec {
    pub shape: KeyShape,
    pub position: Point2,
}

/// The keys of one bead, shared read-only by both halves.
#[derive(Debug, Clone, PartialEq)]
pub struct BeadLayout {
    /// 1-based bead number.
    pub index: usize,
    pub keys: Vec<KeySpec>,
}

impl BeadLayout {
    /// Pairs shapes with positions in order; surplus shapes are dropped.
    #[must_use]
    pub fn new(index: usize, shapes: &[KeyShape], positions: &[Point2]) -> Self {
        let keys = shapes
            .iter()
            .zip(positions)
            .map(|(&shape, &position)| KeySpec { shape, position })
            .collect();
        Self { index, keys }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::{BoundingBox, IsWatertight, Volume};
    use approx::assert_relative_eq;

    #[test]
    fn every_shape_builds_a_closed_centered_solid() {
        for shape in KeyShape::ALL {
            let mesh = shape.build(6.0, 20.0).unwrap();
            assert!(IsWatertight::new(&mesh).execute(), "{shape}");
            assert!(Volume::new(&mesh).execute() > 0.0, "{shape}");
            let aabb = BoundingBox::new(&mesh).execute().unwrap();
            assert_relative_eq!(aabb.min.z, -10.0, epsilon = 1e-12);
            assert_relative_eq!(aabb.max.z, 10.0, epsilon = 1e-12);
            assert_relative_eq!(aabb.max.x, 6.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn square_side_is_twice_the_radius() {
        let mesh = KeyShape::Square.build(6.0, 20.0).unwrap();
        assert_relative_eq!(Volume::new(&mesh).execute(), 12.0 * 12.0 * 20.0, epsilon = 1e-9);
    }

    #[test]
    fn hexagon_volume() {
        let mesh = KeyShape::Hexagon.build(2.0, 1.0).unwrap();
        let area = 1.5 * 3.0_f64.sqrt() * 4.0;
        assert_relative_eq!(Volume::new(&mesh).execute(), area, epsilon = 1e-9);
    }

    #[test]
    fn invalid_dimensions_fail() {
        assert!(KeyShape::Cylinder.build(0.0, 1.0).is_err());
        assert!(KeyShape::Square.build(1.0, -1.0).is_err());
    }

    #[test]
    fn names_round_trip_through_serde() {
        let json = serde_json::to_string(&KeyShape::ALL).unwrap();
        assert_eq!(json, r#"["cylinder","triangle","square","hexagon"]"#);
    }

    #[test]
    fn layout_pairs_positionally() {
        let positions = [Point2::new(1.0, 2.0), Point2::new(-3.0, 0.5)];
        let layout = BeadLayout::new(1, &KeyShape::ALL, &positions);
        assert_eq!(layout.keys.len(), 2);
        assert_eq!(layout.keys[1].shape, KeyShape::Triangle);
        assert_eq!(layout.keys[1].position, positions[1]);
    }
}
