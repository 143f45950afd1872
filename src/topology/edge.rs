use std::collections::BTreeMap;

use super::mesh::Mesh;

/// One traversal of an undirected edge by a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    /// Index of the face traversing the edge.
    pub face: usize,
    /// `true` if the face walks the edge from the lower to the higher index.
    pub forward: bool,
}

/// Adjacency from undirected edges to the faces that use them.
///
/// Keys are `(min, max)` vertex-index pairs. A `BTreeMap` keeps iteration
/// order stable so derived loops and reports are reproducible.
#[derive(Debug, Clone, Default)]
pub struct EdgeMap {
    edges: BTreeMap<(u32, u32), Vec<EdgeUse>>,
}

impl EdgeMap {
    /// Builds the edge map of a mesh.
    #[must_use]
    pub fn build(mesh: &Mesh) -> Self {
        let mut edges: BTreeMap<(u32, u32), Vec<EdgeUse>> = BTreeMap::new();
        for (face_idx, face) in mesh.faces.iter().enumerate() {
            let n = face.len();
            for k in 0..n {
                let a = face[k];
                let b = face[(k + 1) % n];
                if a == b {
                    continue;
                }
                edges.entry(edge_key(a, b)).or_default().push(EdgeUse {
                    face: face_idx,
                    forward: a < b,
                });
            }
        }
        Self { edges }
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the mesh had no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterates over `(edge, uses)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&(u32, u32), &Vec<EdgeUse>)> {
        self.edges.iter()
    }

    /// Directed boundary edges: edges used by exactly one face, oriented as
    /// that face traverses them.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        self.edges
            .iter()
            .filter(|(_, uses)| uses.len() == 1)
            .map(|(&(lo, hi), uses)| if uses[0].forward { (lo, hi) } else { (hi, lo) })
            .collect()
    }

    /// Number of edges used by more than two faces.
    #[must_use]
    pub fn non_manifold_count(&self) -> usize {
        self.edges.values().filter(|uses| uses.len() > 2).count()
    }

    /// Number of two-face edges whose faces traverse it in the same
    /// direction (inconsistent winding).
    #[must_use]
    pub fn misoriented_count(&self) -> usize {
        self.edges
            .values()
            .filter(|uses| uses.len() == 2 && uses[0].forward == uses[1].forward)
            .count()
    }
}

/// Canonical undirected key for an edge.
#[must_use]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
