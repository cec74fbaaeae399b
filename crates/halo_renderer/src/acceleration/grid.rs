//! Uniform grid over the bounds of all items, traversed with a 3D-DDA.

use super::search_limit;
use crate::intersection::{Intersectable, IntersectionState};
use halo_math::{Aabb, Ray, Vec3};
use std::cell::RefCell;

thread_local! {
    /// Spare visited-item bitsets for this thread. Nested grids (an object
    /// grid over meshes with their own grids) each take a separate one.
    static SPARE_BITSETS: RefCell<Vec<Vec<u64>>> = const { RefCell::new(Vec::new()) };
}

/// Zeroed bitset of `words` words, reusing a spare allocation when there is one.
fn take_bitset(words: usize) -> Vec<u64> {
    let mut bits = SPARE_BITSETS.with(|spare| spare.borrow_mut().pop()).unwrap_or_default();
    bits.clear();
    bits.resize(words, 0);
    bits
}

fn give_back_bitset(bits: Vec<u64>) {
    SPARE_BITSETS.with(|spare| spare.borrow_mut().push(bits));
}

#[derive(Debug)]
pub struct UniformGrid {
    bbox: Aabb,
    resolution: [usize; 3],
    cell_size: Vec3,
    /// Item indices per cell, x-major
    cells: Vec<Vec<u32>>,
    item_count: usize,
}

impl UniformGrid {
    /// Build a grid with `suggested` cells per axis (at least one each).
    ///
    /// Every item is registered in each cell its bounding box overlaps.
    pub fn build(bounds: &[Aabb], suggested: [u32; 3]) -> Self {
        let resolution = suggested.map(|n| n.max(1) as usize);
        let joined = bounds.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b));
        if joined.is_empty() {
            return Self {
                bbox: Aabb::EMPTY,
                resolution,
                cell_size: Vec3::ONE,
                cells: Vec::new(),
                item_count: bounds.len(),
            };
        }

        // Re-pad so flat scenes still get cells with volume
        let bbox = Aabb::from_points(joined.min, joined.max);
        let cell_size = bbox.extent()
            / Vec3::new(resolution[0] as f32, resolution[1] as f32, resolution[2] as f32);

        let mut grid = Self {
            bbox,
            resolution,
            cell_size,
            cells: vec![Vec::new(); resolution.iter().product()],
            item_count: bounds.len(),
        };

        for (i, b) in bounds.iter().enumerate() {
            if b.is_empty() {
                continue;
            }
            let lo = grid.cell_of(b.min);
            let hi = grid.cell_of(b.max);
            for z in lo[2]..=hi[2] {
                for y in lo[1]..=hi[1] {
                    for x in lo[0]..=hi[0] {
                        let cell = grid.cell_index([x, y, z]);
                        grid.cells[cell].push(i as u32);
                    }
                }
            }
        }

        grid
    }

    /// Cell containing `p`, clamped into the grid.
    fn cell_of(&self, p: Vec3) -> [usize; 3] {
        let rel = (p - self.bbox.min) / self.cell_size;
        [0, 1, 2].map(|axis| {
            let c = rel[axis].floor();
            if c.is_nan() || c < 0.0 {
                0
            } else {
                (c as usize).min(self.resolution[axis] - 1)
            }
        })
    }

    #[inline]
    fn cell_index(&self, [x, y, z]: [usize; 3]) -> usize {
        x + self.resolution[0] * (y + self.resolution[1] * z)
    }

    /// Walk the cells the ray crosses in order, testing each item at most
    /// once, and stop as soon as the closest hit lies inside the visited
    /// cells.
    pub fn intersect<'a, T: Intersectable>(
        &self,
        items: &'a [T],
        ray: &Ray,
        state: &mut IntersectionState<'a>,
    ) -> bool {
        let Some((t0, t1)) = self.bbox.hit(ray, 0.0, search_limit(ray, state)) else {
            return false;
        };

        let start = self.cell_of(ray.at(t0));
        let mut cell = start.map(|c| c as i64);
        let mut step = [0i64; 3];
        let mut t_next = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];
        for axis in 0..3 {
            let d = ray.direction[axis];
            let lo = self.bbox.min[axis] + start[axis] as f32 * self.cell_size[axis];
            if d > 0.0 {
                step[axis] = 1;
                t_next[axis] = (lo + self.cell_size[axis] - ray.origin[axis]) / d;
                t_delta[axis] = self.cell_size[axis] / d;
            } else if d < 0.0 {
                step[axis] = -1;
                t_next[axis] = (lo - ray.origin[axis]) / d;
                t_delta[axis] = -self.cell_size[axis] / d;
            }
        }

        let mut tested = take_bitset(items.len().div_ceil(64));
        let mut hit_anything = false;

        loop {
            let index = self.cell_index(cell.map(|c| c as usize));
            for &i in &self.cells[index] {
                let (word, bit) = (i as usize / 64, 1u64 << (i % 64));
                if tested[word] & bit != 0 {
                    continue;
                }
                tested[word] |= bit;
                if items[i as usize].intersect(ray, state) {
                    hit_anything = true;
                }
            }

            let axis = if t_next[0] < t_next[1] {
                if t_next[0] < t_next[2] { 0 } else { 2 }
            } else if t_next[1] < t_next[2] {
                1
            } else {
                2
            };
            let t_exit = t_next[axis];

            // A hit before leaving this cell cannot be beaten further along
            if state.intersection_t() <= t_exit || !t_exit.is_finite() || t_exit > t1 {
                break;
            }

            cell[axis] += step[axis];
            if cell[axis] < 0 || cell[axis] >= self.resolution[axis] as i64 {
                break;
            }
            t_next[axis] += t_delta[axis];
        }

        give_back_bitset(tested);
        hit_anything
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_scenes::triangle_grid;
    use crate::{Material, Triangle};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Triangle that counts how often it is tested.
    struct Counted {
        tri: Triangle,
        tests: AtomicUsize,
    }

    impl Intersectable for Counted {
        fn intersect<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
            self.tests.fetch_add(1, Ordering::Relaxed);
            self.tri.intersect(ray, state)
        }

        fn bounding_box(&self) -> Aabb {
            self.tri.bounding_box()
        }
    }

    fn bounds_of(items: &[Triangle]) -> Vec<Aabb> {
        items.iter().map(|t| t.bounding_box()).collect()
    }

    #[test]
    fn test_resolution_is_clamped_to_one() {
        let items = triangle_grid(2, 2);
        let grid = UniformGrid::build(&bounds_of(&items), [0, 4, 0]);
        assert_eq!(grid.resolution(), [1, 4, 1]);
        assert_eq!(grid.cells.len(), 4);
    }

    #[test]
    fn test_every_item_registered() {
        let items = triangle_grid(6, 5);
        let grid = UniformGrid::build(&bounds_of(&items), [4, 4, 1]);
        for i in 0..items.len() as u32 {
            assert!(grid.cells.iter().any(|cell| cell.contains(&i)), "item {} lost", i);
        }
    }

    #[test]
    fn test_large_item_tested_once_per_query() {
        // One big slanted triangle spanning every cell, ray grazing along it
        let big = Counted {
            tri: Triangle::new(
                Vec3::new(-4.0, -4.0, -4.0),
                Vec3::new(4.0, -4.0, 4.0),
                Vec3::new(0.0, 4.0, 0.0),
                Arc::new(Material::default()),
            ),
            tests: AtomicUsize::new(0),
        };
        let items = [big];
        let bounds: Vec<Aabb> = items.iter().map(|c| c.bounding_box()).collect();
        let grid = UniformGrid::build(&bounds, [5, 5, 5]);
        assert!(grid.cells.iter().all(|cell| cell.len() == 1));

        let ray = Ray::new(Vec3::new(-6.0, -3.9, 6.0), Vec3::new(1.0, 0.01, -1.0));
        let mut state = IntersectionState::new(ray, 0, 0);
        grid.intersect(&items, &ray, &mut state);
        assert_eq!(items[0].tests.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_finds_hit_registered_in_a_later_cell() {
        // Listed after the far triangle, so insertion order cannot decide
        let near = Triangle::new(
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Arc::new(Material::default()),
        );
        let far = Triangle::new(
            Vec3::new(3.0, -1.0, -1.0),
            Vec3::new(3.0, 1.0, -1.0),
            Vec3::new(3.0, 0.0, 1.0),
            Arc::new(Material::default()),
        );
        let items = [far, near];
        let grid = UniformGrid::build(&bounds_of(&items), [8, 1, 1]);

        let ray = Ray::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::X);
        let mut state = IntersectionState::new(ray, 0, 0);
        assert!(grid.intersect(&items, &ray, &mut state));
        assert!((state.intersection_t() - 2.0).abs() < 1e-5);
        assert!(std::ptr::eq(state.hit().unwrap().primitive, &items[1]));
    }

    #[test]
    fn test_ray_starting_inside_grid() {
        let items = triangle_grid(4, 4);
        let grid = UniformGrid::build(&bounds_of(&items), [4, 4, 1]);
        let target = items[5].centroid();
        let ray = Ray::new(target + Vec3::new(0.0, 0.0, 1e-5), -Vec3::Z);
        let mut state = IntersectionState::new(ray, 0, 0);
        assert!(grid.intersect(&items, &ray, &mut state));
    }

    /// Grid of triangles queried from inside an outer grid.
    struct Nested {
        grid: UniformGrid,
        tris: Vec<Triangle>,
    }

    impl Intersectable for Nested {
        fn intersect<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
            self.grid.intersect(&self.tris, ray, state)
        }

        fn bounding_box(&self) -> Aabb {
            self.grid.bounding_box()
        }
    }

    fn spare_bitsets() -> usize {
        SPARE_BITSETS.with(|spare| spare.borrow().len())
    }

    #[test]
    fn test_repeated_queries_reuse_bitsets() {
        let items = triangle_grid(4, 4);
        let grid = UniformGrid::build(&bounds_of(&items), [4, 4, 1]);
        let ray = Ray::new(items[5].centroid() + Vec3::Z, -Vec3::Z);

        let expected = spare_bitsets().max(1);
        for _ in 0..3 {
            let mut state = IntersectionState::new(ray, 0, 0);
            assert!(grid.intersect(&items, &ray, &mut state));
            assert_eq!(spare_bitsets(), expected);
        }
    }

    #[test]
    fn test_nested_grids_take_separate_bitsets() {
        let tris = triangle_grid(3, 3);
        let inner = UniformGrid::build(&bounds_of(&tris), [3, 3, 1]);
        let target = tris[4].centroid();
        let items = [Nested { grid: inner, tris }];
        let outer = UniformGrid::build(&[items[0].bounding_box()], [2, 2, 2]);

        let ray = Ray::new(target + Vec3::Z, -Vec3::Z);
        let expected = spare_bitsets().max(2);
        for _ in 0..2 {
            let mut state = IntersectionState::new(ray, 0, 0);
            assert!(outer.intersect(&items, &ray, &mut state));
            assert!(std::ptr::eq(state.hit().unwrap().primitive, &items[0].tris[4]));
            assert_eq!(spare_bitsets(), expected);
        }
    }

    #[test]
    fn test_ray_missing_grid() {
        let items = triangle_grid(3, 3);
        let grid = UniformGrid::build(&bounds_of(&items), [3, 3, 3]);
        let ray = Ray::new(Vec3::new(100.0, 0.0, 1.0), Vec3::Y);
        let mut state = IntersectionState::new(ray, 0, 0);
        assert!(!grid.intersect(&items, &ray, &mut state));
    }
}
