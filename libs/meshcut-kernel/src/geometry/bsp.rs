//! # BSP Tree
//!
//! Binary Space Partitioning tree used to clip one mesh against the solid
//! bounded by another. Based on the csg.js algorithm by Evan Wallace.
//!
//! ## Layout
//!
//! Nodes live in a flat arena and reference their children by index, so
//! construction, inversion and clipping are iterative and need no unsafe
//! pointer juggling. Only splitting planes are stored: clipping never needs
//! the polygons a tree was built from.

use super::plane::Plane;
use super::polygon::{Partition, Polygon};

/// A node in the BSP tree.
#[derive(Debug, Clone)]
struct BspNode {
    /// Dividing plane.
    plane: Plane,
    /// Front subtree (index into the arena).
    front: Option<usize>,
    /// Back subtree (index into the arena).
    back: Option<usize>,
}

/// Which child slot of a parent a pending node fills.
#[derive(Debug, Clone, Copy)]
enum Link {
    Root,
    Front(usize),
    Back(usize),
}

/// A BSP tree over the planes of a polygon soup.
///
/// # Example
///
/// ```rust,ignore
/// let tree = BspTree::new(cut_polygons);
/// let outside = tree.clip_polygons(source_polygons.clone());
/// let inside = tree.inverted().clip_polygons(source_polygons);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    /// Creates a new BSP tree from polygons.
    ///
    /// Each node takes the plane of the first pending polygon; polygons
    /// coplanar with it are absorbed, the rest are split into the front and
    /// back subtrees.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut nodes: Vec<BspNode> = Vec::new();
        let mut stack: Vec<(Link, Vec<Polygon>)> = vec![(Link::Root, polygons)];

        while let Some((link, mut polys)) = stack.pop() {
            if polys.is_empty() {
                continue;
            }

            let splitter = polys.swap_remove(0);
            let plane = *splitter.plane();
            let index = nodes.len();
            nodes.push(BspNode {
                plane,
                front: None,
                back: None,
            });
            match link {
                Link::Root => {}
                Link::Front(parent) => nodes[parent].front = Some(index),
                Link::Back(parent) => nodes[parent].back = Some(index),
            }

            let mut partition = Partition::with_capacity(polys.len() / 2 + 1);
            for poly in polys {
                poly.split(&plane, &mut partition);
            }

            stack.push((Link::Front(index), partition.front));
            stack.push((Link::Back(index), partition.back));
        }

        Self { nodes }
    }

    /// Returns true if the tree has no planes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Inverts this BSP tree (flips all planes and swaps subtrees).
    ///
    /// The inverted tree describes the complement of the original solid.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            node.plane = node.plane.flipped();
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Returns an inverted copy of this tree.
    pub fn inverted(&self) -> Self {
        let mut tree = self.clone();
        tree.invert();
        tree
    }

    /// Clips polygons to this BSP tree.
    ///
    /// Removes the parts of `polygons` inside the solid represented by this
    /// tree and returns what is left. Polygons coplanar with a node follow
    /// the side their normal faces.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        if self.nodes.is_empty() {
            return polygons;
        }

        let mut result = Vec::new();
        let mut stack: Vec<(usize, Vec<Polygon>)> = vec![(0, polygons)];

        while let Some((index, polys)) = stack.pop() {
            if polys.is_empty() {
                continue;
            }
            let node = &self.nodes[index];

            let mut partition = Partition::default();
            for poly in polys {
                poly.split(&node.plane, &mut partition);
            }
            let Partition {
                coplanar_front,
                coplanar_back,
                mut front,
                mut back,
            } = partition;
            front.extend(coplanar_front);
            back.extend(coplanar_back);

            match node.front {
                Some(child) => stack.push((child, front)),
                None => result.extend(front),
            }
            // No back subtree: whatever is behind the plane is inside, drop it
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }

        result
    }
}

// =============================================================================
// TESTS
// =============================================================================
