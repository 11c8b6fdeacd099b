//! Open (uncapped) cylinder around the y axis.

use super::require_positive;
use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

#[derive(Clone)]
pub struct OpenCylinder {
    y0: f32,
    y1: f32,
    radius: f32,
    material: Option<Arc<dyn Material>>,
}

impl OpenCylinder {
    /// Tube of `radius` between heights `bottom` and `top`.
    pub fn new(bottom: f32, top: f32, radius: f32) -> ConfigResult<Self> {
        let radius = require_positive("cylinder radius", radius)?;
        if !(bottom < top) {
            return Err(ConfigError::InvalidGeometry(format!(
                "cylinder bottom {bottom} must be below top {top}"
            )));
        }
        Ok(Self {
            y0: bottom,
            y1: top,
            radius,
            material: None,
        })
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let o = ray.origin();
        let d = ray.direction();

        let a = d.x * d.x + d.z * d.z;
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * (o.x * d.x + o.z * d.z);
        let c = o.x * o.x + o.z * o.z - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let e = disc.sqrt();
        let denom = 2.0 * a;
        [(-b - e) / denom, (-b + e) / denom]
            .into_iter()
            .find(|&t| {
                let y = o.y + t * d.y;
                ray_t.surrounds(t) && self.y0 < y && y < self.y1
            })
    }
}

impl GeometricObject for OpenCylinder {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        let p = ray.at(t);
        let outward = Vec3::new(p.x / self.radius, 0.0, p.z / self.radius);
        Some(HitRecord::new(ray, t, outward, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(
            Vec3::new(-self.radius, self.y0, -self.radius),
            Vec3::new(self.radius, self.y1, self.radius),
        )
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}
