//! Infinite plane through a point.

use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// An unbounded plane. Reports [`Aabb::UNIVERSE`] as its bounds, so grids
/// keep it out of their cells.
#[derive(Clone)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: Option<Arc<dyn Material>>,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> ConfigResult<Self> {
        let normal = normal
            .try_normalize()
            .ok_or(ConfigError::ZeroVector("plane normal"))?;
        Ok(Self {
            point,
            normal,
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
        let t = (self.point - ray.origin()).dot(self.normal) / denom;
        ray_t.surrounds(t).then_some(t)
    }
}

impl GeometricObject for Plane {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        Some(HitRecord::new(ray, t, self.normal, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric_object::default_interval;

    #[test]
    fn test_plane_hit_from_above() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y).unwrap();
        let ray = Ray::new(Vec3::new(1.0, 3.0, 2.0), Vec3::NEG_Y);
        let rec = plane.hit(&ray, default_interval()).unwrap();

        assert!((rec.t - 3.0).abs() < 1e-5);
        assert_eq!(rec.normal, Vec3::Y);
    }

    #[test]
    fn test_plane_parallel_ray_misses() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(plane.hit(&ray, default_interval()).is_none());
    }

    #[test]
    fn test_plane_is_unbounded() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Z).unwrap();
        assert!(!plane.bounding_box().is_finite());
        assert!(Plane::new(Vec3::ZERO, Vec3::ZERO).is_err());
    }
}
