//! Parallelogram given by a corner and two edge vectors.

use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

#[derive(Clone)]
pub struct Rectangle {
    p0: Vec3,
    a: Vec3,
    b: Vec3,
    a_len_squared: f32,
    b_len_squared: f32,
    normal: Vec3,
    material: Option<Arc<dyn Material>>,
}

impl Rectangle {
    /// Rectangle with corners `p0`, `p0 + a`, `p0 + b`, `p0 + a + b`.
    /// The normal is `a × b`.
    pub fn new(p0: Vec3, a: Vec3, b: Vec3) -> ConfigResult<Self> {
        let normal = a.cross(b).try_normalize().ok_or_else(|| {
            ConfigError::InvalidGeometry("rectangle edges are parallel".to_string())
        })?;
        Ok(Self {
            p0,
            a,
            b,
            a_len_squared: a.length_squared(),
            b_len_squared: b.length_squared(),
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
        let t = (self.p0 - ray.origin()).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let d = ray.at(t) - self.p0;
        let ddota = d.dot(self.a);
        if !(0.0..=self.a_len_squared).contains(&ddota) {
            return None;
        }
        let ddotb = d.dot(self.b);
        (0.0..=self.b_len_squared).contains(&ddotb).then_some(t)
    }
}

impl GeometricObject for Rectangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        Some(HitRecord::new(ray, t, self.normal, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        let corners = [self.p0 + self.a, self.p0 + self.b, self.p0 + self.a + self.b];
        let (min, max) = corners
            .iter()
            .fold((self.p0, self.p0), |(lo, hi), &c| (lo.min(c), hi.max(c)));
        Aabb::from_points(min, max)
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}
