use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates the region bounded by one or more closed planar loops.
///
/// Loops are inserted as constraints into a constrained Delaunay
/// triangulation and the interior is selected by crossing parity, so nested
/// loops become holes and concave loops are handled without ear clipping.
/// No points are added: every output triangle uses loop vertices only.
pub struct TessellateLoops<'a> {
    loops: &'a [Vec<Point2>],
}

impl<'a> TessellateLoops<'a> {
    /// Creates a new `TessellateLoops` operation.
    #[must_use]
    pub fn new(loops: &'a [Vec<Point2>]) -> Self {
        Self { loops }
    }

    /// Executes the triangulation.
    ///
    /// Returns counter-clockwise triangles whose indices address the
    /// concatenation of all loops, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if a loop has fewer than 3 points, a coordinate cannot
    /// be inserted, or two loop edges cross.
    pub fn execute(&self) -> Result<Vec<[usize; 3]>> {
        let mut cdt = Cdt::new();
        let mut handle_to_index: HashMap<usize, usize> = HashMap::new();
        let mut offset = 0;
        for points in self.loops {
            let handles = insert_constraint_loop(&mut cdt, points)?;
            for (i, h) in handles.iter().enumerate() {
                handle_to_index.entry(h.index()).or_insert(offset + i);
            }
            offset += points.len();
        }

        let interior = classify_interior_faces(&cdt);

        let mut triangles = Vec::with_capacity(interior.len());
        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let mut tri = [0usize; 3];
            for (slot, vh) in tri.iter_mut().zip(face.vertices()) {
                *slot = *handle_to_index.get(&vh.fix().index()).ok_or_else(|| {
                    TessellationError::Failed("triangulation introduced a vertex".into())
                })?;
            }
            triangles.push(tri);
        }
        Ok(triangles)
    }
}

/// Inserts a closed polygon as constraint edges into the CDT.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<Vec<FixedVertexHandle>> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for pt in points {
        let h = cdt
            .insert(SpadePoint2::new(pt.x, pt.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed("loop edges intersect".into()).into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(handles)
}

/// Classifies which inner faces of the CDT are inside the loops using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            if let Some(inner) = edge.rev().face().as_inner() {
                let idx = inner.fix().index();
                if depth_map.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_map.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            if let Some(neighbor) = edge.rev().face().as_inner() {
                let n_idx = neighbor.fix().index();
                if depth_map.contains_key(&n_idx) {
                    continue;
                }
                let new_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    depth + 1
                } else {
                    depth
                };
                depth_map.insert(n_idx, new_depth);
                if new_depth % 2 == 1 {
                    interior.insert(n_idx);
                }
                queue.push_back((neighbor.fix(), new_depth));
            }
        }
    }

    interior
}
