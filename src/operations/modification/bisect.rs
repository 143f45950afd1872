use std::collections::{BTreeMap, HashMap};

use crate::error::{OperationError, Result, TopologyError};
use crate::math::{Point2, Point3, PLANE_EPSILON};
use crate::tessellation::TessellateLoops;
use crate::topology::edge::edge_key;
use crate::topology::{EdgeMap, Mesh, MeshStore, SolidData, SolidId};

/// Which side of the `z = 0` plane a bisect keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HalfSpace {
    /// Keep `z >= 0`; the cap faces `-z`.
    Top,
    /// Keep `z <= 0`; the cap faces `+z`.
    Bottom,
}

impl HalfSpace {
    /// Signed distance of `p` into the kept side.
    #[must_use]
    pub fn signed_distance(self, p: &Point3) -> f64 {
        match self {
            Self::Top => p.z,
            Self::Bottom => -p.z,
        }
    }

    /// Lower-case label used in names and logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Cuts a closed solid with the plane `z = 0`, discards one side and caps
/// the opening with a flat face.
///
/// Crossing edges get one shared intersection vertex, so both faces that
/// meet at the edge are clipped identically and the cut stays crack-free.
/// The opening is collected as closed boundary loops and triangulated as a
/// single planar region (loops nested inside others become holes).
///
/// Callers keep any surface displacement small relative to the radius: a
/// cut loop that crosses itself cannot be capped.
pub struct Bisect {
    solid: SolidId,
    half: HalfSpace,
}

impl Bisect {
    /// Creates a new `Bisect` operation.
    #[must_use]
    pub fn new(solid: SolidId, half: HalfSpace) -> Self {
        Self { solid, half }
    }

    /// Executes the cut, consuming the input solid and returning the capped
    /// half.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing remains on the kept side, the opening does
    /// not form closed loops on the plane, or the cap cannot be triangulated.
    pub fn execute(&self, store: &mut MeshStore) -> Result<SolidId> {
        let SolidData { name, mesh, .. } = store.remove_solid(self.solid)?;
        mesh.check_indices()?;

        let mut clipped = clip_to_half(&mesh, self.half);
        if clipped.is_empty() {
            return Err(OperationError::Failed(format!(
                "nothing of `{name}` lies on the {} side of z = 0",
                self.half.label()
            ))
            .into());
        }
        clipped.compact();

        let loops = boundary_loops(&clipped)?;
        cap_loops(&mut clipped, &loops, self.half)?;
        clipped.recompute_normals();

        tracing::debug!(
            solid = %name,
            half = self.half.label(),
            loops = loops.len(),
            faces = clipped.face_count(),
            "bisected and capped"
        );
        Ok(store.add_solid(SolidData::base(name, clipped)))
    }
}

/// Clips every face to the kept half-space.
fn clip_to_half(mesh: &Mesh, half: HalfSpace) -> Mesh {
    let mut positions = mesh.positions.clone();
    let dist: Vec<f64> = positions.iter().map(|p| half.signed_distance(p)).collect();
    let side: Vec<i8> = dist
        .iter()
        .map(|&d| {
            if d > PLANE_EPSILON {
                1
            } else if d < -PLANE_EPSILON {
                -1
            } else {
                0
            }
        })
        .collect();
    for (p, &s) in positions.iter_mut().zip(&side) {
        if s == 0 {
            p.z = 0.0;
        }
    }

    let mut out = Mesh {
        positions,
        faces: Vec::with_capacity(mesh.face_count()),
        normals: Vec::new(),
    };
    let mut crossings: HashMap<(u32, u32), u32> = HashMap::new();

    for face in &mesh.faces {
        let sides: Vec<i8> = face.iter().map(|&i| side[i as usize]).collect();
        if sides.iter().all(|&s| s <= 0) {
            continue;
        }
        if sides.iter().all(|&s| s >= 0) {
            out.faces.push(face.clone());
            continue;
        }

        let n = face.len();
        let mut poly: Vec<u32> = Vec::with_capacity(n + 2);
        for k in 0..n {
            let a = face[k];
            let b = face[(k + 1) % n];
            let (sa, sb) = (side[a as usize], side[b as usize]);
            if sa >= 0 {
                poly.push(a);
            }
            if sa * sb < 0 {
                let key = edge_key(a, b);
                let idx = match crossings.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let (lo, hi) = key;
                        let (plo, phi) = (out.positions[lo as usize], out.positions[hi as usize]);
                        let (dlo, dhi) = (dist[lo as usize], dist[hi as usize]);
                        let t = dlo / (dlo - dhi);
                        let mut q = plo + (phi - plo) * t;
                        q.z = 0.0;
                        let idx = out.push_vertex(q);
                        crossings.insert(key, idx);
                        idx
                    }
                };
                poly.push(idx);
            }
        }
        poly.dedup();
        if poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() >= 3 {
            out.faces.push(poly);
        }
    }
    out
}

/// Chains the directed boundary edges of an open mesh into closed loops.
fn boundary_loops(mesh: &Mesh) -> Result<Vec<Vec<u32>>> {
    let edges = EdgeMap::build(mesh);
    if edges.non_manifold_count() > 0 {
        return Err(TopologyError::InvalidTopology(
            "non-manifold edge before capping".into(),
        )
        .into());
    }

    let mut next: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for (a, b) in edges.boundary_edges() {
        let (pa, pb) = (mesh.positions[a as usize], mesh.positions[b as usize]);
        if pa.z.abs() > PLANE_EPSILON || pb.z.abs() > PLANE_EPSILON {
            return Err(TopologyError::InvalidTopology(
                "open boundary away from the cutting plane".into(),
            )
            .into());
        }
        next.entry(a).or_default().push(b);
    }

    let mut loops = Vec::new();
    loop {
        let Some(start) = next
            .iter()
            .find(|(_, ends)| !ends.is_empty())
            .map(|(&v, _)| v)
        else {
            break;
        };
        let mut lp = vec![start];
        let mut current = start;
        loop {
            let successor = next
                .get_mut(&current)
                .and_then(Vec::pop)
                .ok_or_else(|| TopologyError::InvalidTopology("cut boundary is not closed".into()))?;
            if successor == start {
                break;
            }
            lp.push(successor);
            current = successor;
        }
        loops.push(lp);
    }
    Ok(loops)
}

/// Appends cap triangles for the given loops, facing away from the kept side.
fn cap_loops(mesh: &mut Mesh, loops: &[Vec<u32>], half: HalfSpace) -> Result<()> {
    if loops.is_empty() {
        return Ok(());
    }
    let loops_2d: Vec<Vec<Point2>> = loops
        .iter()
        .map(|lp| {
            lp.iter()
                .map(|&i| {
                    let p = mesh.positions[i as usize];
                    Point2::new(p.x, p.y)
                })
                .collect()
        })
        .collect();
    let flat: Vec<u32> = loops.concat();

    for [a, b, c] in TessellateLoops::new(&loops_2d).execute()? {
        let (a, b, c) = (flat[a], flat[b], flat[c]);
        // Triangles come back counter-clockwise seen from +z.
        match half {
            HalfSpace::Top => mesh.faces.push(vec![a, c, b]),
            HalfSpace::Bottom => mesh.faces.push(vec![a, b, c]),
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeBox, MakeUvSphere};
    use crate::operations::query::{BoundingBox, IsWatertight, Volume};
    use crate::math::Vector3;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn add_sphere(store: &mut MeshStore, rings: usize) -> SolidId {
        let mesh = MakeUvSphere::new(Point3::origin(), 30.0, 64, rings).execute().unwrap();
        store.add_solid(SolidData::base("sphere", mesh))
    }

    #[test]
    fn top_half_is_closed_and_flat_at_zero() {
        let mut store = MeshStore::new();
        let sphere = add_sphere(&mut store, 32);
        let top = Bisect::new(sphere, HalfSpace::Top).execute(&mut store).unwrap();
        let mesh = store.mesh(top).unwrap();
        assert!(IsWatertight::new(mesh).execute());
        let aabb = BoundingBox::new(mesh).execute().unwrap();
        assert_relative_eq!(aabb.min.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(aabb.max.z, 30.0, epsilon = 1e-9);
        let volume = Volume::new(mesh).execute();
        let exact = 2.0 / 3.0 * PI * 27_000.0;
        assert!(volume > 0.0);
        assert!((volume - exact).abs() / exact < 0.02);
    }

    #[test]
    fn bottom_half_bulges_down() {
        let mut store = MeshStore::new();
        let sphere = add_sphere(&mut store, 32);
        let bottom = Bisect::new(sphere, HalfSpace::Bottom).execute(&mut store).unwrap();
        let mesh = store.mesh(bottom).unwrap();
        assert!(IsWatertight::new(mesh).execute());
        let aabb = BoundingBox::new(mesh).execute().unwrap();
        assert_relative_eq!(aabb.max.z, 0.0, epsilon = 1e-12);
        assert!(aabb.min.z < -29.0);
        assert!(Volume::new(mesh).execute() > 0.0);
    }

    #[test]
    fn odd_ring_count_cuts_through_faces() {
        let mut store = MeshStore::new();
        let sphere = add_sphere(&mut store, 31);
        let top = Bisect::new(sphere, HalfSpace::Top).execute(&mut store).unwrap();
        let mesh = store.mesh(top).unwrap();
        assert!(IsWatertight::new(mesh).execute());
        let on_plane = mesh.positions.iter().filter(|p| p.z.abs() < 1e-12).count();
        assert_eq!(on_plane, 64);
    }

    #[test]
    fn cap_faces_away_from_kept_side() {
        let mut store = MeshStore::new();
        let sphere = add_sphere(&mut store, 16);
        let top = Bisect::new(sphere, HalfSpace::Top).execute(&mut store).unwrap();
        let mesh = store.mesh(top).unwrap();
        let cap_faces: Vec<usize> = (0..mesh.face_count())
            .filter(|&f| mesh.face_points(f).iter().all(|p| p.z.abs() < 1e-12))
            .collect();
        assert!(!cap_faces.is_empty());
        for f in cap_faces {
            assert!(mesh.face_normal(f).z < -0.99);
        }
    }

    #[test]
    fn solid_entirely_on_discarded_side_fails() {
        let mut store = MeshStore::new();
        let mut mesh = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        mesh.translate(&Vector3::new(0.0, 0.0, -5.0));
        let id = store.add_solid(SolidData::base("low box", mesh));
        assert!(Bisect::new(id, HalfSpace::Top).execute(&mut store).is_err());
    }

    #[test]
    fn box_cut_through_middle() {
        let mut store = MeshStore::new();
        let mesh = MakeBox::new(Vector3::new(1.0, 2.0, 3.0)).execute().unwrap();
        let id = store.add_solid(SolidData::base("box", mesh));
        let top = Bisect::new(id, HalfSpace::Top).execute(&mut store).unwrap();
        let mesh = store.mesh(top).unwrap();
        assert!(IsWatertight::new(mesh).execute());
        assert_relative_eq!(Volume::new(mesh).execute(), 2.0 * 4.0 * 3.0, epsilon = 1e-9);
    }
}
