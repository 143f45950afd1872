use std::collections::HashMap;

use crate::math::Point3;
use crate::topology::Mesh;

/// Merges vertices closer than `epsilon` and drops faces that collapse.
///
/// Vertices are bucketed on a grid with cell size `epsilon`; each vertex is
/// compared against the representatives of the 27 surrounding cells, so the
/// first vertex seen in a cluster wins. Returns the number of vertices merged
/// away.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn weld_vertices(mesh: &mut Mesh, epsilon: f64) -> usize {
    let cell = |p: &Point3| -> [i64; 3] {
        [
            (p.x / epsilon).floor() as i64,
            (p.y / epsilon).floor() as i64,
            (p.z / epsilon).floor() as i64,
        ]
    };

    let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
    let mut remap = Vec::with_capacity(mesh.positions.len());
    let mut positions: Vec<Point3> = Vec::with_capacity(mesh.positions.len());

    for p in &mesh.positions {
        let [cx, cy, cz] = cell(p);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&[cx + dx, cy + dy, cz + dz]) else {
                        continue;
                    };
                    if let Some(&rep) = bucket
                        .iter()
                        .find(|&&rep| (positions[rep as usize] - p).norm() <= epsilon)
                    {
                        found = Some(rep);
                        break 'search;
                    }
                }
            }
        }
        let idx = found.unwrap_or_else(|| {
            let idx = positions.len() as u32;
            positions.push(*p);
            grid.entry([cx, cy, cz]).or_default().push(idx);
            idx
        });
        remap.push(idx);
    }

    let welded = mesh.positions.len() - positions.len();
    mesh.positions = positions;

    let faces = std::mem::take(&mut mesh.faces);
    mesh.faces = faces
        .into_iter()
        .filter_map(|face| {
            let mut face: Vec<u32> = face.iter().map(|&i| remap[i as usize]).collect();
            face.dedup();
            while face.len() > 1 && face.first() == face.last() {
                face.pop();
            }
            let mut distinct = face.clone();
            distinct.sort_unstable();
            distinct.dedup();
            (distinct.len() >= 3 && distinct.len() == face.len()).then_some(face)
        })
        .collect();
    mesh.compact();
    welded
}
