use super::split::{split_polygon, Plane, Polygon, SplitTargets};

/// A node of a BSP tree over polygons.
///
/// Each node stores the polygons coplanar with its splitting plane; the
/// front and back subtrees hold everything else. Space behind a node with no
/// back child is solid.
#[derive(Debug, Default)]
pub struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    /// Builds a tree from a polygon set.
    #[must_use]
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Converts solid space to empty space and empty space to solid space.
    pub fn invert(&mut self) {
        for poly in &mut self.polygons {
            poly.flip();
        }
        if let Some(plane) = self.plane.as_mut() {
            *plane = plane.flipped();
        }
        if let Some(front) = self.front.as_mut() {
            front.invert();
        }
        if let Some(back) = self.back.as_mut() {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    #[must_use]
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        {
            // Coplanar polygons follow their facing.
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            for poly in &polygons {
                split_polygon(
                    &plane,
                    poly,
                    &mut SplitTargets {
                        coplanar_front: &mut coplanar_front,
                        coplanar_back: &mut coplanar_back,
                        front: &mut front,
                        back: &mut back,
                    },
                );
            }
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
        }
        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Removes every polygon in this tree that lies inside `other`.
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = self.front.as_mut() {
            front.clip_to(other);
        }
        if let Some(back) = self.back.as_mut() {
            back.clip_to(other);
        }
    }

    /// Collects every polygon in the tree.
    #[must_use]
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_into(out);
        }
        if let Some(back) = &self.back {
            back.collect_into(out);
        }
    }

    /// Inserts polygons, splitting them among the subtrees. The first
    /// polygon's plane becomes the splitter of an empty node.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = *self.plane.get_or_insert(polygons[0].plane);
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar = std::mem::take(&mut self.polygons);
        let mut coplanar_back = Vec::new();
        for poly in &polygons {
            split_polygon(
                &plane,
                poly,
                &mut SplitTargets {
                    coplanar_front: &mut coplanar,
                    coplanar_back: &mut coplanar_back,
                    front: &mut front,
                    back: &mut back,
                },
            );
        }
        coplanar.append(&mut coplanar_back);
        self.polygons = coplanar;

        if !front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(back);
        }
    }
}
