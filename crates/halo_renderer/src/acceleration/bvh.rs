//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A k-ary tree built by median splits along the longest axis of the
//! centroid bounds. Leaves own contiguous ranges of a permutation of the
//! item indices, so every item sits in exactly one leaf.

use super::search_limit;
use crate::intersection::{Intersectable, IntersectionState};
use halo_math::{Aabb, Ray, Vec3};
use std::ops::Range;

/// BVH node - either a branch with up to `max_children_per_node` children or
/// a leaf with a small number of items.
#[derive(Debug)]
enum BvhNode {
    /// Internal node.
    Branch { bbox: Aabb, children: Vec<BvhNode> },
    /// Leaf referencing `order[items]`.
    Leaf { bbox: Aabb, items: Range<usize> },
    /// Built over no items.
    Empty,
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Empty => Aabb::EMPTY,
        }
    }

    fn count(&self) -> usize {
        match self {
            BvhNode::Branch { children, .. } => 1 + children.iter().map(BvhNode::count).sum::<usize>(),
            BvhNode::Leaf { .. } => 1,
            BvhNode::Empty => 0,
        }
    }
}

#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    /// Item indices, permuted so each leaf covers a contiguous range
    order: Vec<u32>,
}

struct BuildSettings<'b> {
    bounds: &'b [Aabb],
    centroids: Vec<Vec3>,
    max_children: usize,
    items_per_leaf: usize,
}

impl Bvh {
    /// Build a BVH over items with the given bounding boxes.
    ///
    /// `max_children_per_node >= 2` and `items_per_leaf >= 1` are checked by
    /// the caller's configuration.
    pub fn build(bounds: &[Aabb], max_children_per_node: usize, items_per_leaf: usize) -> Self {
        if bounds.is_empty() {
            return Self {
                root: BvhNode::Empty,
                order: Vec::new(),
            };
        }

        let settings = BuildSettings {
            bounds,
            centroids: bounds.iter().map(Aabb::centroid).collect(),
            max_children: max_children_per_node.max(2),
            items_per_leaf: items_per_leaf.max(1),
        };
        let mut order: Vec<u32> = (0..bounds.len() as u32).collect();
        let root = Self::build_node(&settings, &mut order, 0);

        Self { root, order }
    }

    /// Recursive construction over `slice`, which starts at `offset` in the
    /// full permutation.
    ///
    /// Simple median-split approach: sort by centroid on the longest axis,
    /// cut into `max_children` equal runs, recurse.
    fn build_node(settings: &BuildSettings<'_>, slice: &mut [u32], offset: usize) -> BvhNode {
        let bbox = slice
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.union(&settings.bounds[i as usize]));

        if slice.len() <= settings.items_per_leaf {
            return BvhNode::Leaf {
                bbox,
                items: offset..offset + slice.len(),
            };
        }

        let axis = slice
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.include(settings.centroids[i as usize]))
            .longest_axis();
        slice.sort_unstable_by(|&a, &b| {
            settings.centroids[a as usize][axis].total_cmp(&settings.centroids[b as usize][axis])
        });

        let chunk = slice.len().div_ceil(settings.max_children);
        let children = slice
            .chunks_mut(chunk)
            .enumerate()
            .map(|(k, run)| Self::build_node(settings, run, offset + k * chunk))
            .collect();

        BvhNode::Branch { bbox, children }
    }

    /// Visit nodes near-to-far, skipping any whose entry point is beyond the
    /// closest hit recorded so far.
    pub fn intersect<'a, T: Intersectable>(
        &self,
        items: &'a [T],
        ray: &Ray,
        state: &mut IntersectionState<'a>,
    ) -> bool {
        let Some((t_enter, _)) = self.root.bbox().hit(ray, 0.0, search_limit(ray, state)) else {
            return false;
        };

        let mut hit_anything = false;
        let mut stack: Vec<(f32, &BvhNode)> = vec![(t_enter, &self.root)];

        while let Some((t_enter, node)) = stack.pop() {
            if t_enter >= state.intersection_t() {
                continue;
            }
            match node {
                BvhNode::Empty => {}
                BvhNode::Leaf { items: range, .. } => {
                    for &i in &self.order[range.clone()] {
                        if items[i as usize].intersect(ray, state) {
                            hit_anything = true;
                        }
                    }
                }
                BvhNode::Branch { children, .. } => {
                    let first = stack.len();
                    let limit = search_limit(ray, state);
                    for child in children {
                        if let Some((t0, _)) = child.bbox().hit(ray, 0.0, limit) {
                            stack.push((t0, child));
                        }
                    }
                    // Farthest first, so the nearest child is popped next
                    stack[first..].sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
                }
            }
        }

        hit_anything
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bbox()
    }

    pub fn item_count(&self) -> usize {
        self.order.len()
    }

    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Item indices grouped by leaf, in tree order.
    #[cfg(test)]
    fn leaves(&self) -> Vec<Vec<u32>> {
        fn walk(node: &BvhNode, order: &[u32], out: &mut Vec<Vec<u32>>) {
            match node {
                BvhNode::Branch { children, .. } => children.iter().for_each(|c| walk(c, order, out)),
                BvhNode::Leaf { items, .. } => out.push(order[items.clone()].to_vec()),
                BvhNode::Empty => {}
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &self.order, &mut out);
        out
    }

    #[cfg(test)]
    fn max_branching(&self) -> usize {
        fn walk(node: &BvhNode) -> usize {
            match node {
                BvhNode::Branch { children, .. } => children.iter().map(walk).fold(children.len(), usize::max),
                _ => 0,
            }
        }
        walk(&self.root)
    }
}
