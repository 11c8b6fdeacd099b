// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this adds the pieces instancing needs on top.

use crate::Aabb;
use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a surface normal with this matrix, where `self` is the
    /// inverse of the object-to-world transform.
    ///
    /// Applies the transpose of `self` to the normal (w=0) and renormalizes.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners. Boxes with
    /// infinite bounds stay [`Aabb::UNIVERSE`].
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// True when the matrix has an inverse that is safe to use.
    fn is_invertible(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.transpose().transform_vector3(normal).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if !aabb.is_finite() {
            return Aabb::UNIVERSE;
        }

        let lo = aabb.min_point();
        let hi = aabb.max_point();

        let mut result_min = Vec3::splat(f32::INFINITY);
        let mut result_max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = self.transform_point3(corner);
            result_min = result_min.min(p);
            result_max = result_max.max(p);
        }

        Aabb::from_points(result_min, result_max)
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0 && self.inverse().is_finite()
    }
}
