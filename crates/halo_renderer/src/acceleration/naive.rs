//! Linear scan, the reference every other structure is checked against.

use crate::intersection::{Intersectable, IntersectionState};
use halo_math::{Aabb, Ray};

#[derive(Debug, Clone)]
pub struct NaiveList {
    item_count: usize,
    bbox: Aabb,
}

impl NaiveList {
    pub fn build(bounds: &[Aabb]) -> Self {
        Self {
            item_count: bounds.len(),
            bbox: bounds.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b)),
        }
    }

    /// Test every item unconditionally.
    pub fn intersect<'a, T: Intersectable>(
        &self,
        items: &'a [T],
        ray: &Ray,
        state: &mut IntersectionState<'a>,
    ) -> bool {
        let mut hit_anything = false;
        for item in items {
            if item.intersect(ray, state) {
                hit_anything = true;
            }
        }
        hit_anything
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }
}
