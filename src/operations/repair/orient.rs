use std::collections::VecDeque;

use crate::operations::query::signed_volume_of;
use crate::topology::{EdgeMap, Mesh};

/// Makes face winding consistent across every edge-connected component and
/// turns each component outward.
///
/// Winding is propagated breadth-first over manifold edges; afterwards a
/// component with negative signed volume is flipped as a whole. Returns the
/// number of faces whose winding changed.
pub(crate) fn orient_faces(mesh: &mut Mesh) -> usize {
    let edges = EdgeMap::build(mesh);
    let face_count = mesh.face_count();

    let mut neighbours: Vec<Vec<(usize, bool)>> = vec![Vec::new(); face_count];
    for (_, uses) in edges.iter() {
        if let [u, v] = uses.as_slice() {
            // Consistent neighbours walk a shared edge in opposite directions.
            let consistent = u.forward != v.forward;
            neighbours[u.face].push((v.face, consistent));
            neighbours[v.face].push((u.face, consistent));
        }
    }

    let mut flip: Vec<Option<bool>> = vec![None; face_count];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for seed in 0..face_count {
        if flip[seed].is_some() {
            continue;
        }
        flip[seed] = Some(false);
        let mut component = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(face) = queue.pop_front() {
            let flipped = flip[face].unwrap_or(false);
            for &(other, consistent) in &neighbours[face] {
                if flip[other].is_none() {
                    flip[other] = Some(if consistent { flipped } else { !flipped });
                    component.push(other);
                    queue.push_back(other);
                }
            }
        }
        components.push(component);
    }

    let mut changed = 0;
    for component in &components {
        let volume = signed_volume_of(
            mesh,
            component.iter().flat_map(|&f| {
                let face = &mesh.faces[f];
                let reversed = flip[f].unwrap_or(false);
                (1..face.len().saturating_sub(1)).map(move |k| {
                    if reversed {
                        [face[0], face[k + 1], face[k]]
                    } else {
                        [face[0], face[k], face[k + 1]]
                    }
                })
            }),
        );
        let invert = volume < 0.0;
        for &f in component {
            if flip[f].unwrap_or(false) != invert {
                mesh.flip_face(f);
                changed += 1;
            }
        }
    }
    if changed > 0 {
        mesh.recompute_normals();
    }
    changed
}
