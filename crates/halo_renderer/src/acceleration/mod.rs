//! Spatial acceleration structures.
//!
//! An [`Accelerator`] is built once over a fixed slice of items and only
//! stores indices into it; the slice is passed again on every query. All
//! variants report the same closest hit as the linear [`NaiveList`].

mod bvh;
mod grid;
mod naive;

pub use bvh::Bvh;
pub use grid::UniformGrid;
pub use naive::NaiveList;

use crate::config::AccelerationConfig;
use crate::error::TracerResult;
use crate::intersection::{Intersectable, IntersectionState};
use halo_math::{Aabb, Ray};

/// A built spatial index. Immutable after construction, so it can be queried
/// from many threads at once.
#[derive(Debug)]
pub enum Accelerator {
    Naive(NaiveList),
    Bvh(Bvh),
    UniformGrid(UniformGrid),
}

impl Accelerator {
    /// Build an index over `items` using `config`.
    pub fn build<T: Intersectable>(items: &[T], config: &AccelerationConfig) -> TracerResult<Self> {
        config.validate()?;
        let bounds: Vec<Aabb> = items.iter().map(|item| item.bounding_box()).collect();

        let accelerator = match *config {
            AccelerationConfig::Naive => Accelerator::Naive(NaiveList::build(&bounds)),
            AccelerationConfig::Bvh {
                max_children_per_node,
                items_per_leaf,
            } => Accelerator::Bvh(Bvh::build(&bounds, max_children_per_node, items_per_leaf)),
            AccelerationConfig::UniformGrid { grid_resolution } => {
                Accelerator::UniformGrid(UniformGrid::build(&bounds, grid_resolution))
            }
        };

        log::debug!(
            "Built {} acceleration over {} items ({})",
            accelerator.kind_name(),
            items.len(),
            accelerator.describe()
        );
        Ok(accelerator)
    }

    /// Test `ray` against the indexed items, recording any closer hit.
    ///
    /// `items` must be the slice the index was built over.
    pub fn intersect<'a, T: Intersectable>(
        &self,
        items: &'a [T],
        ray: &Ray,
        state: &mut IntersectionState<'a>,
    ) -> bool {
        assert_eq!(
            items.len(),
            self.item_count(),
            "acceleration structure queried with a different item set than it was built over"
        );
        match self {
            Accelerator::Naive(naive) => naive.intersect(items, ray, state),
            Accelerator::Bvh(bvh) => bvh.intersect(items, ray, state),
            Accelerator::UniformGrid(grid) => grid.intersect(items, ray, state),
        }
    }

    /// Bounds of everything indexed.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Accelerator::Naive(naive) => naive.bounding_box(),
            Accelerator::Bvh(bvh) => bvh.bounding_box(),
            Accelerator::UniformGrid(grid) => grid.bounding_box(),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Accelerator::Naive(naive) => naive.item_count(),
            Accelerator::Bvh(bvh) => bvh.item_count(),
            Accelerator::UniformGrid(grid) => grid.item_count(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Accelerator::Naive(_) => "naive",
            Accelerator::Bvh(_) => "BVH",
            Accelerator::UniformGrid(_) => "uniform grid",
        }
    }

    fn describe(&self) -> String {
        match self {
            Accelerator::Naive(_) => "linear scan".to_string(),
            Accelerator::Bvh(bvh) => format!("{} nodes", bvh.node_count()),
            Accelerator::UniformGrid(grid) => {
                let [x, y, z] = grid.resolution();
                format!("{}x{}x{} cells", x, y, z)
            }
        }
    }
}

/// Farthest parameter along `ray` that could still improve `state`.
#[inline]
pub(crate) fn search_limit(ray: &Ray, state: &IntersectionState<'_>) -> f32 {
    ray.max_t.min(state.intersection_t())
}
