//! Flat disk, optionally with a hole (annulus).

use super::require_positive;
use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// Disk of radius `outer` around `center`; points closer than `inner` are
/// cut away.
#[derive(Clone)]
pub struct Disk {
    center: Vec3,
    normal: Vec3,
    inner_squared: f32,
    outer_squared: f32,
    outer: f32,
    material: Option<Arc<dyn Material>>,
}

impl Disk {
    pub fn new(center: Vec3, normal: Vec3, radius: f32) -> ConfigResult<Self> {
        Self::annulus(center, normal, 0.0, radius)
    }

    /// Ring between `inner` and `outer` radius.
    pub fn annulus(center: Vec3, normal: Vec3, inner: f32, outer: f32) -> ConfigResult<Self> {
        let outer = require_positive("disk radius", outer)?;
        if !(0.0..outer).contains(&inner) {
            return Err(ConfigError::InvalidGeometry(format!(
                "annulus inner radius {inner} must be in [0, {outer})"
            )));
        }
        let normal = normal
            .try_normalize()
            .ok_or(ConfigError::ZeroVector("disk normal"))?;

        Ok(Self {
            center,
            normal,
            inner_squared: inner * inner,
            outer_squared: outer * outer,
            outer,
            material: None,
        })
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let denom = ray.direction().dot(self.normal);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = (self.center - ray.origin()).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }
        let d2 = (ray.at(t) - self.center).length_squared();
        (self.inner_squared <= d2 && d2 < self.outer_squared).then_some(t)
    }
}

impl GeometricObject for Disk {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        Some(HitRecord::new(ray, t, self.normal, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        // Extent of a disk along axis i is r * sqrt(1 - n_i^2)
        let n = self.normal;
        let extent = |c: f32| self.outer * (1.0 - c * c).max(0.0).sqrt();
        let e = Vec3::new(extent(n.x), extent(n.y), extent(n.z));
        Aabb::from_points(self.center - e, self.center + e)
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}
