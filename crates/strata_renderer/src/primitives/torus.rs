//! Torus centered at the origin, lying in the xz plane.

use super::require_positive;
use crate::{
    geometric_object::{GeometricObject, HitRecord},
    solvers::{polish_quartic_root, solve_quartic},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

#[derive(Clone)]
pub struct Torus {
    /// Swept radius (center of the tube to the y axis)
    a: f32,
    /// Tube radius
    b: f32,
    bbox: Aabb,
    material: Option<Arc<dyn Material>>,
}

impl Torus {
    pub fn new(swept_radius: f32, tube_radius: f32) -> ConfigResult<Self> {
        let a = require_positive("torus swept radius", swept_radius)?;
        let b = require_positive("torus tube radius", tube_radius)?;
        if b > a {
            return Err(ConfigError::InvalidGeometry(format!(
                "torus tube radius {b} exceeds swept radius {a}"
            )));
        }
        let bbox = Aabb::from_points(Vec3::new(-a - b, -b, -a - b), Vec3::new(a + b, b, a + b));
        Ok(Self {
            a,
            b,
            bbox,
            material: None,
        })
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let o = ray.origin().as_dvec3();
        let d = ray.direction().as_dvec3();
        let a2 = f64::from(self.a).powi(2);
        let b2 = f64::from(self.b).powi(2);

        let sum_d_sqrd = d.length_squared();
        let e = o.length_squared() - a2 - b2;
        let f = o.dot(d);
        let four_a_sqrd = 4.0 * a2;

        let coeffs = [
            e * e - four_a_sqrd * (b2 - o.y * o.y),
            4.0 * f * e + 2.0 * four_a_sqrd * o.y * d.y,
            2.0 * sum_d_sqrd * e + 4.0 * f * f + four_a_sqrd * d.y * d.y,
            4.0 * sum_d_sqrd * f,
            sum_d_sqrd * sum_d_sqrd,
        ];

        solve_quartic(coeffs)
            .into_iter()
            .map(|root| polish_quartic_root(&coeffs, root) as f32)
            .filter(|&t| ray_t.surrounds(t))
            .min_by(f32::total_cmp)
    }

    /// Gradient of the implicit torus function at `p`.
    fn outward_normal(&self, p: Vec3) -> Vec3 {
        let param_squared = self.a * self.a + self.b * self.b;
        let sum_squared = p.length_squared();
        Vec3::new(
            p.x * (sum_squared - param_squared),
            p.y * (sum_squared - param_squared + 2.0 * self.a * self.a),
            p.z * (sum_squared - param_squared),
        )
        .normalize_or_zero()
    }
}

impl GeometricObject for Torus {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        let outward = self.outward_normal(ray.at(t));
        Some(HitRecord::new(ray, t, outward, self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
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
    fn test_torus_hit_outer_surface() {
        let torus = Torus::new(2.0, 0.5).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let rec = torus.hit(&ray, default_interval()).unwrap();

        assert!((rec.t - 7.5).abs() < 1e-3);
        assert!((rec.normal - Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn test_torus_hole_is_empty() {
        let torus = Torus::new(2.0, 0.5).unwrap();
        // Straight down the y axis through the hole
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        assert!(torus.hit(&ray, default_interval()).is_none());
    }

    #[test]
    fn test_torus_top_hit() {
        let torus = Torus::new(2.0, 0.5).unwrap();
        let ray = Ray::new(Vec3::new(2.0, 10.0, 0.0), Vec3::NEG_Y);
        let rec = torus.hit(&ray, default_interval()).unwrap();

        assert!((rec.t - 9.5).abs() < 1e-3);
        assert!((rec.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_torus_from_inside_hole_hits_inner_wall() {
        let torus = Torus::new(2.0, 0.5).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let rec = torus.hit(&ray, default_interval()).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-3);
        assert!(rec.front_face);
    }

    #[test]
    fn test_torus_rejects_fat_tube() {
        assert!(Torus::new(1.0, 2.0).is_err());
    }
}
