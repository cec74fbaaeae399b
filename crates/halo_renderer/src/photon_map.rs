//! Photons recorded during emission and the frozen kd-tree holding them.

use crate::Color;
use halo_math::{Ray, Vec3};
use kd_tree::{KdPoint, KdTreeN};

/// Energy deposited on a surface by one photon bounce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    pub energy: Color,
    /// Starts at the photon and points back along the incoming direction
    pub to_light_ray: Ray,
}

impl Photon {
    pub fn new(position: Vec3, energy: Color, incoming_direction: Vec3) -> Self {
        Self {
            position,
            energy,
            to_light_ray: Ray::new(position, -incoming_direction.normalize_or_zero()),
        }
    }
}

impl KdPoint for Photon {
    type Scalar = f32;
    type Dim = typenum::U3;

    fn at(&self, i: usize) -> f32 {
        self.position[i]
    }
}

/// Read-only spatial index over photons.
///
/// Built once from the complete photon list; there is no insertion, so
/// concurrent queries need no locking.
pub struct PhotonMap {
    tree: Option<KdTreeN<Photon, typenum::U3>>,
}

impl PhotonMap {
    pub fn build(photons: Vec<Photon>) -> Self {
        if photons.is_empty() {
            return Self::empty();
        }
        Self {
            tree: Some(kd_tree::KdTree::build_by_ordered_float(photons)),
        }
    }

    pub fn empty() -> Self {
        Self { tree: None }
    }

    pub fn len(&self) -> usize {
        self.tree.as_ref().map_or(0, |tree| tree.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Photons within `radius` of `point`.
    pub fn within_radius(&self, point: Vec3, radius: f32) -> Vec<&Photon> {
        match &self.tree {
            Some(tree) => tree.within_radius(&point.to_array(), radius),
            None => Vec::new(),
        }
    }

    /// Whether any photon lies within `radius` of `point`.
    pub fn any_within(&self, point: Vec3, radius: f32) -> bool {
        match &self.tree {
            Some(tree) => tree
                .nearest(&point.to_array())
                .is_some_and(|found| found.squared_distance <= radius * radius),
            None => false,
        }
    }
}

impl std::fmt::Debug for PhotonMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotonMap").field("len", &self.len()).finish()
    }
}
