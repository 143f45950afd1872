use std::collections::BTreeMap;

use crate::topology::{EdgeMap, Mesh};

use super::heal::retriangulate;

/// Caps the open loops left once welding and healing are done.
///
/// Directed boundary edges are chained into loops, and a loop that comes
/// back through one of its own vertices is split there. Each loop is
/// triangulated in its own plane, or fanned when that fails, and wound
/// against the boundary so every open edge gains a partner. Returns the
/// number of loops filled.
pub(crate) fn fill_holes(mesh: &mut Mesh) -> usize {
    let loops = open_loops(&EdgeMap::build(mesh));
    for lp in &loops {
        let cap: Vec<u32> = lp.iter().rev().copied().collect();
        let pieces = retriangulate(mesh, &cap).unwrap_or_else(|| fan(&cap));
        mesh.faces.extend(pieces);
    }
    loops.len()
}

/// Chains boundary edges into simple loops of three or more vertices.
/// Chains that dead-end are dropped.
fn open_loops(edges: &EdgeMap) -> Vec<Vec<u32>> {
    let mut next: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for (a, b) in edges.boundary_edges() {
        next.entry(a).or_default().push(b);
    }

    let mut loops = Vec::new();
    while let Some(start) = next
        .iter()
        .find(|(_, ends)| !ends.is_empty())
        .map(|(&v, _)| v)
    {
        let mut path = vec![start];
        let mut current = start;
        while let Some(successor) = next.get_mut(&current).and_then(Vec::pop) {
            match path.iter().position(|&v| v == successor) {
                Some(at) => {
                    loops.push(path.split_off(at));
                    path.push(successor);
                }
                None => path.push(successor),
            }
            current = successor;
        }
    }
    loops.retain(|lp| lp.len() >= 3);
    loops
}

fn fan(face: &[u32]) -> Vec<Vec<u32>> {
    (1..face.len() - 1)
        .map(|k| vec![face[0], face[k], face[k + 1]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::query::{IsWatertight, Volume};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Unit cube split into triangles, with the two top triangles missing.
    fn open_box() -> Mesh {
        let positions = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ];
        let quads = [
            [0, 3, 2, 1],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ];
        let faces = quads
            .iter()
            .flat_map(|q| [vec![q[0], q[1], q[2]], vec![q[0], q[2], q[3]]])
            .collect();
        Mesh::new(positions, faces)
    }

    #[test]
    fn missing_lid_is_capped_flat() {
        let mut mesh = open_box();
        assert_eq!(EdgeMap::build(&mesh).boundary_edges().len(), 4);

        assert_eq!(fill_holes(&mut mesh), 1);
        assert!(IsWatertight::new(&mesh).execute());
        assert_relative_eq!(Volume::new(&mesh).execute(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_sliver_is_closed() {
        // A tetrahedron whose edge 0-1 is met by a split edge 0-4-1 on one
        // side only; the gap between them has no area.
        let mut mesh = Mesh::new(
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
        );
        let before = Volume::new(&mesh).execute();
        assert_eq!(fill_holes(&mut mesh), 1);
        let edges = EdgeMap::build(&mesh);
        assert!(edges.boundary_edges().is_empty());
        assert_eq!(edges.misoriented_count(), 0);
        assert_relative_eq!(Volume::new(&mesh).execute(), before, epsilon = 1e-12);
    }

    #[test]
    fn loops_through_a_shared_vertex_are_split() {
        // Two triangular holes touching at vertex 0.
        let mut mesh = Mesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(-1.0, 0.0, 0.0), p(0.0, -1.0, 0.0)],
            vec![vec![0, 1, 2], vec![0, 3, 4]],
        );
        assert_eq!(fill_holes(&mut mesh), 2);
        assert!(IsWatertight::new(&mesh).execute());
    }

    #[test]
    fn closed_mesh_gets_no_caps() {
        let mut mesh = open_box();
        fill_holes(&mut mesh);
        let faces = mesh.faces.clone();
        assert_eq!(fill_holes(&mut mesh), 0);
        assert_eq!(mesh.faces, faces);
    }
}
