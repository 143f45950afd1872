use std::collections::{BTreeMap, BTreeSet};

use crate::math::polygon_3d::{newell_normal, param_on_segment};
use crate::math::{Point2, Point3};
use crate::tessellation::TessellateLoops;
use crate::topology::{EdgeMap, Mesh};

/// Upper bound on insertion sweeps; each sweep closes every crack it sees.
const MAX_PASSES: usize = 4;

/// Closes T-junction cracks by inserting boundary vertices into the open
/// edges they lie on.
///
/// Only boundary edges and boundary vertices take part, so a closed region
/// of the mesh is never touched. Faces that receive new vertices are
/// re-triangulated in their own plane. Returns the number of insertions.
pub(crate) fn heal_t_junctions(mesh: &mut Mesh, epsilon: f64) -> usize {
    let mut healed = 0;
    for _ in 0..MAX_PASSES {
        let inserted = heal_pass(mesh, epsilon);
        if inserted == 0 {
            break;
        }
        healed += inserted;
    }
    healed
}

fn heal_pass(mesh: &mut Mesh, epsilon: f64) -> usize {
    let edges = EdgeMap::build(mesh);
    let boundary: Vec<(usize, u32, u32)> = edges
        .iter()
        .filter(|(_, uses)| uses.len() == 1)
        .map(|(&(lo, hi), uses)| {
            let u = uses[0];
            if u.forward {
                (u.face, lo, hi)
            } else {
                (u.face, hi, lo)
            }
        })
        .collect();
    if boundary.is_empty() {
        return 0;
    }
    let open_vertices: BTreeSet<u32> = boundary.iter().flat_map(|&(_, a, b)| [a, b]).collect();

    // face -> (edge start -> vertices to insert after it, in order)
    let mut insertions: BTreeMap<usize, BTreeMap<u32, Vec<u32>>> = BTreeMap::new();
    let mut count = 0;
    for &(face, a, b) in &boundary {
        let (pa, pb) = (mesh.positions[a as usize], mesh.positions[b as usize]);
        let mut on_edge: Vec<(f64, u32)> = open_vertices
            .iter()
            .filter(|&&v| v != a && v != b)
            .filter_map(|&v| {
                param_on_segment(&mesh.positions[v as usize], &pa, &pb, epsilon).map(|t| (t, v))
            })
            .collect();
        if on_edge.is_empty() {
            continue;
        }
        on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));
        count += on_edge.len();
        insertions
            .entry(face)
            .or_default()
            .insert(a, on_edge.into_iter().map(|(_, v)| v).collect());
    }

    let mut replaced: Vec<(usize, Vec<Vec<u32>>)> = Vec::with_capacity(insertions.len());
    for (face, after) in insertions {
        let old = &mesh.faces[face];
        let mut grown = Vec::with_capacity(old.len() + after.values().map(Vec::len).sum::<usize>());
        for &v in old {
            grown.push(v);
            if let Some(extra) = after.get(&v) {
                grown.extend_from_slice(extra);
            }
        }
        let pieces = retriangulate(mesh, &grown).unwrap_or_else(|| vec![grown]);
        replaced.push((face, pieces));
    }

    // Replace in place, appending any extra triangles at the end.
    for (face, mut pieces) in replaced {
        if let Some(first) = pieces.pop() {
            mesh.faces[face] = first;
        }
        mesh.faces.extend(pieces);
    }
    count
}

/// Triangulates a planar face loop in its own plane, keeping its winding.
///
/// Returns `None` if the loop cannot be triangulated; the caller then keeps
/// the polygon as it is.
pub(super) fn retriangulate(mesh: &Mesh, face: &[u32]) -> Option<Vec<Vec<u32>>> {
    let points: Vec<Point3> = face.iter().map(|&i| mesh.positions[i as usize]).collect();
    let normal = newell_normal(&points);
    let abs = normal.abs();
    // Drop the dominant axis and keep a cyclic order of the other two, so a
    // positive normal component maps to counter-clockwise in 2D.
    let axis = if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    };
    let project = |p: &Point3| match axis {
        0 => Point2::new(p.y, p.z),
        1 => Point2::new(p.z, p.x),
        _ => Point2::new(p.x, p.y),
    };
    let reverse = normal[axis] < 0.0;

    let loops = [points.iter().map(project).collect::<Vec<_>>()];
    let triangles = TessellateLoops::new(&loops).execute().ok()?;
    if triangles.is_empty() {
        return None;
    }
    Some(
        triangles
            .into_iter()
            .map(|[a, b, c]| {
                if reverse {
                    vec![face[a], face[c], face[b]]
                } else {
                    vec![face[a], face[b], face[c]]
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::query::Volume;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// A tetrahedron whose base edge 0-1 is split by vertex 4 on one side
    /// only, leaving a T-junction crack.
    fn cracked_tetrahedron() -> Mesh {
        Mesh::new(
            vec![
                p(0.0, 0.0, 0.0),
                p(2.0, 0.0, 0.0),
                p(0.0, 2.0, 0.0),
                p(0.0, 0.0, 2.0),
                p(1.0, 0.0, 0.0),
            ],
            vec![
                vec![0, 2, 1],
                vec![0, 4, 3],
                vec![4, 1, 3],
                vec![1, 2, 3],
                vec![2, 0, 3],
            ],
        )
    }

    #[test]
    fn crack_is_closed() {
        let mut mesh = cracked_tetrahedron();
        let before = Volume::new(&mesh).execute();
        assert!(!EdgeMap::build(&mesh).boundary_edges().is_empty());

        let healed = heal_t_junctions(&mut mesh, 1e-6);
        assert_eq!(healed, 1);
        let edges = EdgeMap::build(&mesh);
        assert!(edges.boundary_edges().is_empty());
        assert_eq!(edges.misoriented_count(), 0);
        assert_relative_eq!(Volume::new(&mesh).execute(), before, epsilon = 1e-12);
    }

    #[test]
    fn closed_mesh_is_untouched() {
        let mut mesh = cracked_tetrahedron();
        mesh.faces[1] = vec![0, 1, 3];
        mesh.faces.remove(2);
        mesh.compact();
        let faces = mesh.faces.clone();
        assert_eq!(heal_t_junctions(&mut mesh, 1e-6), 0);
        assert_eq!(mesh.faces, faces);
    }
}
