//! Open cone around the y axis: base circle at y = 0, apex at y = h.

use super::require_positive;
use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

#[derive(Clone)]
pub struct OpenCone {
    height: f32,
    radius: f32,
    /// (radius / height)^2
    k: f32,
    material: Option<Arc<dyn Material>>,
}

impl OpenCone {
    pub fn new(height: f32, radius: f32) -> ConfigResult<Self> {
        let height = require_positive("cone height", height)?;
        let radius = require_positive("cone radius", radius)?;
        Ok(Self {
            height,
            radius,
            k: (radius / height).powi(2),
            material: None,
        })
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// x^2 + z^2 = k (h - y)^2 restricted to 0 <= y <= h.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let o = ray.origin();
        let d = ray.direction();
        let hy = self.height - o.y;

        let a = d.x * d.x + d.z * d.z - self.k * d.y * d.y;
        let b = 2.0 * (o.x * d.x + o.z * d.z + self.k * hy * d.y);
        let c = o.x * o.x + o.z * o.z - self.k * hy * hy;

        let in_range = |t: f32| {
            let y = o.y + t * d.y;
            ray_t.surrounds(t) && (0.0..=self.height).contains(&y)
        };

        if a.abs() < 1e-9 {
            // Ray parallel to a generator line: single crossing
            if b == 0.0 {
                return None;
            }
            let t = -c / b;
            return in_range(t).then_some(t);
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let e = disc.sqrt();
        let (t0, t1) = {
            let r0 = (-b - e) / (2.0 * a);
            let r1 = (-b + e) / (2.0 * a);
            (r0.min(r1), r0.max(r1))
        };
        [t0, t1].into_iter().find(|&t| in_range(t))
    }

    fn outward_normal(&self, p: Vec3) -> Vec3 {
        Vec3::new(p.x, self.k * (self.height - p.y), p.z)
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }
}

impl GeometricObject for OpenCone {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        let outward = self.outward_normal(ray.at(t));
        Some(HitRecord::new(ray, t, outward, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::from_points(
            Vec3::new(-self.radius, 0.0, -self.radius),
            Vec3::new(self.radius, self.height, self.radius),
        )
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}
