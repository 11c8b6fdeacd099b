//! Sphere restricted to azimuth and polar angle ranges.

use super::require_positive;
use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::f32::consts::TAU;
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// Part of a sphere's surface, with normals pointing away from the center.
///
/// The azimuth `phi` is measured around the y axis starting at +z toward
/// +x; the polar angle `theta` is measured down from +y. Both in degrees.
#[derive(Clone)]
pub struct ConvexPartSphere {
    center: Vec3,
    radius: f32,
    phi_min: f32,
    phi_max: f32,
    cos_theta_min: f32,
    cos_theta_max: f32,
    material: Option<Arc<dyn Material>>,
}

impl ConvexPartSphere {
    pub fn new(
        center: Vec3,
        radius: f32,
        azimuth_min: f32,
        azimuth_max: f32,
        polar_min: f32,
        polar_max: f32,
    ) -> ConfigResult<Self> {
        let radius = require_positive("part sphere radius", radius)?;
        if !(0.0 <= azimuth_min && azimuth_min < azimuth_max && azimuth_max <= 360.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "azimuth range [{azimuth_min}, {azimuth_max}] must lie in [0, 360]"
            )));
        }
        if !(0.0 <= polar_min && polar_min < polar_max && polar_max <= 180.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "polar range [{polar_min}, {polar_max}] must lie in [0, 180]"
            )));
        }

        Ok(Self {
            center,
            radius,
            phi_min: azimuth_min.to_radians(),
            phi_max: azimuth_max.to_radians(),
            cos_theta_min: polar_min.to_radians().cos(),
            cos_theta_max: polar_max.to_radians().cos(),
            material: None,
        })
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    fn in_range(&self, hit: Vec3) -> bool {
        let local = hit - self.center;
        let mut phi = local.x.atan2(local.z);
        if phi < 0.0 {
            phi += TAU;
        }
        let cos_theta = local.y / self.radius;
        // cos decreases with theta, so the bounds swap
        (self.phi_min..=self.phi_max).contains(&phi)
            && (self.cos_theta_max..=self.cos_theta_min).contains(&cos_theta)
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        [(h - sqrtd) / a, (h + sqrtd) / a]
            .into_iter()
            .find(|&t| ray_t.surrounds(t) && self.in_range(ray.at(t)))
    }
}

impl GeometricObject for ConvexPartSphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        let outward = (ray.at(t) - self.center) / self.radius;
        Some(HitRecord::new(ray, t, outward, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}
