use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[cfg(test)]
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    /// A box containing nothing. Extending it with a point yields a box around that point.
    pub const fn empty() -> Aabb {
        Aabb {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Aabb {
        points
            .into_iter()
            .fold(Aabb::empty(), |aabb, point| aabb.extend_point(point))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    #[must_use]
    pub fn extend_point(self, point: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[must_use]
    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Box around the eight transformed corners. Looser than re-bounding the
    /// transformed geometry when rotations are involved.
    pub fn transform(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }

        Aabb::from_points(
            self.corners()
                .map(|corner| matrix.transform_point3(corner)),
        )
    }

    #[cfg(test)]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;

    #[test]
    fn empty_box_is_union_identity() {
        let aabb = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, 4.0));

        assert!(Aabb::empty().is_empty());
        assert_eq!(Aabb::empty().union(aabb), aabb);
        assert_eq!(aabb.union(Aabb::empty()), aabb);
        assert_eq!(Aabb::empty().size(), Vec3::ZERO);
    }

    #[test]
    fn from_points_bounds_all_points() {
        let points = [
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-3.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 6.0),
        ];
        let aabb = Aabb::from_points(points);

        assert_eq!(aabb.min, Vec3::new(-3.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 6.0));
        assert_eq!(aabb.max_dimension(), 6.0);
        assert!(points.iter().all(|p| aabb.contains_point(*p)));
    }

    #[test]
    fn transform_applies_translation_and_scale() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::IDENTITY,
            Vec3::new(5.0, 0.0, 0.0),
        );
        let transformed = aabb.transform(&matrix);

        assert!(transformed.min.abs_diff_eq(Vec3::new(3.0, -2.0, -2.0), 1e-6));
        assert!(transformed.max.abs_diff_eq(Vec3::new(7.0, 2.0, 2.0), 1e-6));
    }

    #[test]
    fn transform_of_rotated_box_grows() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let matrix = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let transformed = aabb.transform(&matrix);

        assert!((transformed.size().x - 2.0 * std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((transformed.size().y - 2.0).abs() < 1e-6);
    }
}
