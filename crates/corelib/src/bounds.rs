//! Axis-aligned bounding boxes.

use crate::{Mat4, Vec3};

/// Axis-aligned box spanning `min..=max` on every axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point. Empty input gives a zero box at the origin.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::default();
        };
        rest.iter().fold(Self::new(*first, *first), |acc, p| {
            Self::new(acc.min.min(*p), acc.max.max(*p))
        })
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest edge length.
    #[inline]
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Box enclosing this one after `m` is applied to its eight corners.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
        .map(|c| m.transform_point3(c));
        Self::from_points(&corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn from_points_tracks_each_axis() {
        let b = Aabb::from_points(&[
            vec3(1.0, -2.0, 0.0),
            vec3(-1.0, 4.0, 0.5),
            vec3(0.0, 0.0, -3.0),
        ]);
        assert_eq!(b.min, vec3(-1.0, -2.0, -3.0));
        assert_eq!(b.max, vec3(1.0, 4.0, 0.5));
        assert_eq!(b.size(), vec3(2.0, 6.0, 3.5));
        assert_eq!(b.center(), vec3(0.0, 1.0, -1.25));
        assert_eq!(b.max_extent(), 6.0);
    }

    #[test]
    fn empty_input_is_zero_box() {
        let b = Aabb::from_points(&[]);
        assert_eq!(b, Aabb::default());
        assert_eq!(b.max_extent(), 0.0);
    }

    #[test]
    fn negative_scale_keeps_min_below_max() {
        let m = Mat4::from_scale(vec3(-2.0, 1.0, 1.0));
        let b = Aabb::new(vec3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0)).transformed(&m);
        assert_eq!(b.min, vec3(-2.0, 0.0, 0.0));
        assert_eq!(b.max, vec3(0.0, 1.0, 1.0));
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let b = Aabb::new(Vec3::ZERO, vec3(2.0, 1.0, 1.0)).transformed(&m);
        assert!((b.size() - vec3(1.0, 2.0, 1.0)).abs().max_element() < 1e-5);
    }
}
