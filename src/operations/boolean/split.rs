use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, PLANE_EPSILON, TOLERANCE};

/// An oriented plane `normal . p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub w: f64,
}

impl Plane {
    /// Plane through a polygon, oriented by its winding, or `None` if the
    /// polygon has no area.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_polygon(points: &[Point3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let n = newell_normal(points);
        let len = n.norm();
        if len < TOLERANCE {
            return None;
        }
        let normal = n / len;
        let w = points
            .iter()
            .map(|p| normal.dot(&p.coords))
            .sum::<f64>()
            / points.len() as f64;
        Some(Self { normal, w })
    }

    /// Signed distance of a point from the plane.
    #[must_use]
    pub fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }

    /// The same plane facing the other way.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }
}

/// A convex planar polygon carried through the BSP.
///
/// Fragments keep their parent's plane rather than re-deriving it from
/// clipped vertices, so repeated splits do not drift.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertices: Vec<Point3>,
    pub plane: Plane,
}

impl Polygon {
    /// Creates a polygon, or `None` if it is degenerate.
    #[must_use]
    pub fn new(vertices: Vec<Point3>) -> Option<Self> {
        let plane = Plane::from_polygon(&vertices)?;
        Some(Self { vertices, plane })
    }

    /// Reverses winding and plane orientation.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Output buckets for [`split_polygon`].
pub struct SplitTargets<'a> {
    pub coplanar_front: &'a mut Vec<Polygon>,
    pub coplanar_back: &'a mut Vec<Polygon>,
    pub front: &'a mut Vec<Polygon>,
    pub back: &'a mut Vec<Polygon>,
}

/// Splits `polygon` by `plane` into the target buckets.
///
/// Vertices within [`PLANE_EPSILON`] of the plane count as on it. A polygon
/// lying on the plane goes to the coplanar bucket matching its facing.
pub fn split_polygon(plane: &Plane, polygon: &Polygon, out: &mut SplitTargets<'_>) {
    let mut polygon_type = COPLANAR;
    let types: Vec<u8> = polygon
        .vertices
        .iter()
        .map(|v| {
            let t = plane.distance(v);
            let ty = if t < -PLANE_EPSILON {
                BACK
            } else if t > PLANE_EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= ty;
            ty
        })
        .collect();

    match polygon_type {
        COPLANAR => {
            if plane.normal.dot(&polygon.plane.normal) > 0.0 {
                out.coplanar_front.push(polygon.clone());
            } else {
                out.coplanar_back.push(polygon.clone());
            }
        }
        FRONT => out.front.push(polygon.clone()),
        BACK => out.back.push(polygon.clone()),
        _ => {
            let n = polygon.vertices.len();
            let mut f = Vec::with_capacity(n + 1);
            let mut b = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if (ti | tj) == SPANNING {
                    let t = -plane.distance(&vi) / plane.normal.dot(&(vj - vi));
                    let v = vi + (vj - vi) * t;
                    f.push(v);
                    b.push(v);
                }
            }
            if f.len() >= 3 {
                out.front.push(Polygon {
                    vertices: f,
                    plane: polygon.plane,
                });
            }
            if b.len() >= 3 {
                out.back.push(Polygon {
                    vertices: b,
                    plane: polygon.plane,
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square() -> Polygon {
        Polygon::new(vec![p(-1.0, -1.0, 0.0), p(1.0, -1.0, 0.0), p(1.0, 1.0, 0.0), p(-1.0, 1.0, 0.0)])
            .unwrap()
    }

    fn split(plane: &Plane, poly: &Polygon) -> [Vec<Polygon>; 4] {
        let (mut cf, mut cb, mut f, mut b) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        split_polygon(
            plane,
            poly,
            &mut SplitTargets {
                coplanar_front: &mut cf,
                coplanar_back: &mut cb,
                front: &mut f,
                back: &mut b,
            },
        );
        [cf, cb, f, b]
    }

    #[test]
    fn spanning_polygon_splits_in_two() {
        let plane = Plane {
            normal: Vector3::x(),
            w: 0.0,
        };
        let [cf, cb, f, b] = split(&plane, &square());
        assert!(cf.is_empty() && cb.is_empty());
        assert_eq!(f.len(), 1);
        assert_eq!(b.len(), 1);
        assert!(f[0].vertices.iter().all(|v| v.x >= -1e-12));
        assert!(b[0].vertices.iter().all(|v| v.x <= 1e-12));
        assert_eq!(f[0].plane, square().plane);
    }

    #[test]
    fn coplanar_polygon_sorted_by_facing() {
        let up = Plane {
            normal: Vector3::z(),
            w: 0.0,
        };
        let [cf, cb, ..] = split(&up, &square());
        assert_eq!((cf.len(), cb.len()), (1, 0));
        let [cf, cb, ..] = split(&up.flipped(), &square());
        assert_eq!((cf.len(), cb.len()), (0, 1));
    }

    #[test]
    fn touching_vertex_does_not_split() {
        let plane = Plane {
            normal: Vector3::x(),
            w: 1.0,
        };
        let [_, _, f, b] = split(&plane, &square());
        assert!(f.is_empty());
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].vertices.len(), 4);
    }

    #[test]
    fn degenerate_polygon_rejected() {
        assert!(Polygon::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]).is_none());
    }
}
