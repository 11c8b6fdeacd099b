//! Axis-aligned box with per-face normals.

use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// Solid axis-aligned box between two corners.
#[derive(Clone)]
pub struct AaBox {
    min: Vec3,
    max: Vec3,
    material: Option<Arc<dyn Material>>,
}

/// Parametric distance of a face crossing and the face's outward normal.
struct FaceHit {
    t: f32,
    normal: Vec3,
}

impl AaBox {
    /// Box spanning the two corners, in any order.
    pub fn new(p0: Vec3, p1: Vec3) -> ConfigResult<Self> {
        let min = p0.min(p1);
        let max = p0.max(p1);
        if !(max - min).cmpgt(Vec3::ZERO).all() {
            return Err(ConfigError::InvalidGeometry(format!(
                "box has zero extent between {p0} and {p1}"
            )));
        }
        Ok(Self {
            min,
            max,
            material: None,
        })
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Slab test tracking which face the ray enters and leaves through.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<FaceHit> {
        let mut t0 = f32::NEG_INFINITY;
        let mut t1 = f32::INFINITY;
        let mut enter = Vec3::ZERO;
        let mut exit = Vec3::ZERO;

        for axis in 0..3 {
            let o = ray.origin()[axis];
            let d = ray.direction()[axis];

            if d == 0.0 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut near = (self.min[axis] - o) * inv;
            let mut far = (self.max[axis] - o) * inv;
            let mut axis_normal = Vec3::ZERO;
            axis_normal[axis] = -d.signum();
            if inv < 0.0 {
                std::mem::swap(&mut near, &mut far);
            }

            if near > t0 {
                t0 = near;
                enter = axis_normal;
            }
            if far < t1 {
                t1 = far;
                exit = -axis_normal;
            }
        }

        if t0 > t1 {
            return None;
        }
        if ray_t.surrounds(t0) {
            Some(FaceHit { t: t0, normal: enter })
        } else if ray_t.surrounds(t1) {
            Some(FaceHit { t: t1, normal: exit })
        } else {
            None
        }
    }
}

impl GeometricObject for AaBox {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let face = self.intersect(ray, ray_t)?;
        Some(HitRecord::new(ray, face.t, face.normal, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.min, self.max)
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}
