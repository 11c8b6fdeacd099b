//! Affine instancing of a single owned object.
//!
//! An [`Instance`] keeps the child in its own object space and moves rays
//! instead of geometry: the ray goes in through the inverse matrix, the hit
//! comes back out through the forward matrix (points) and the
//! inverse-transpose (normals). One unit sphere can therefore stand in for
//! any ellipsoid, and one unit torus for any ring.
//!
//! # Composition order
//!
//! Transforms apply in the order they are called. Each call pre-multiplies
//! its matrix onto the forward transform, so
//!
//! ```ignore
//! instance.rotate_z(90.0);
//! instance.translate(Vec3::new(5.0, 0.0, 0.0));
//! ```
//!
//! rotates about the object's origin first and then moves it to x = 5.

use crate::{
    geometric_object::{GeometricObject, HitRecord},
    ConfigError, ConfigResult, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};

/// A transformed copy of a geometric object.
#[derive(Clone)]
pub struct Instance {
    object: Box<dyn GeometricObject>,
    /// Object-to-world transform
    forward: Mat4,
    /// World-to-object transform
    inverse: Mat4,
    /// Overrides the child's own material when set
    material: Option<Arc<dyn Material>>,
}

impl Instance {
    /// Wrap an object with the identity transform.
    pub fn new(object: impl GeometricObject + 'static) -> Self {
        Self::from_boxed(Box::new(object))
    }

    pub fn from_boxed(object: Box<dyn GeometricObject>) -> Self {
        Self {
            object,
            forward: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Object-to-world matrix.
    pub fn forward_matrix(&self) -> Mat4 {
        self.forward
    }

    /// World-to-object matrix.
    pub fn inverse_matrix(&self) -> Mat4 {
        self.inverse
    }

    /// Append a transform whose inverse is already known.
    fn push(&mut self, m: Mat4, m_inv: Mat4) -> &mut Self {
        self.forward = m * self.forward;
        self.inverse = self.inverse * m_inv;
        self
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.push(Mat4::from_translation(offset), Mat4::from_translation(-offset))
    }

    /// Scale along each axis; every factor must be non-zero.
    pub fn scale(&mut self, factors: Vec3) -> ConfigResult<&mut Self> {
        if !factors.is_finite() || factors.cmpeq(Vec3::ZERO).any() {
            return Err(ConfigError::SingularTransform);
        }
        Ok(self.push(Mat4::from_scale(factors), Mat4::from_scale(factors.recip())))
    }

    pub fn scale_uniform(&mut self, factor: f32) -> ConfigResult<&mut Self> {
        self.scale(Vec3::splat(factor))
    }

    /// Rotate about the x axis by `degrees`.
    pub fn rotate_x(&mut self, degrees: f32) -> &mut Self {
        let r = degrees.to_radians();
        self.push(Mat4::from_rotation_x(r), Mat4::from_rotation_x(-r))
    }

    /// Rotate about the y axis by `degrees`.
    pub fn rotate_y(&mut self, degrees: f32) -> &mut Self {
        let r = degrees.to_radians();
        self.push(Mat4::from_rotation_y(r), Mat4::from_rotation_y(-r))
    }

    /// Rotate about the z axis by `degrees`.
    pub fn rotate_z(&mut self, degrees: f32) -> &mut Self {
        let r = degrees.to_radians();
        self.push(Mat4::from_rotation_z(r), Mat4::from_rotation_z(-r))
    }

    /// Append a general affine transform (shear included).
    pub fn transform(&mut self, m: Mat4) -> ConfigResult<&mut Self> {
        if !m.is_invertible() {
            return Err(ConfigError::SingularTransform);
        }
        Ok(self.push(m, m.inverse()))
    }

    /// World-space ray expressed in object space. The direction keeps the
    /// length the inverse gives it, so `t` is shared by both spaces.
    fn object_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.inverse.transform_point3(ray.origin()),
            self.inverse.transform_vector3(ray.direction()),
        )
    }
}

impl GeometricObject for Instance {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let local_ray = self.object_ray(ray);
        let local = self.object.hit(&local_ray, ray_t)?;

        // M^-T preserves n . d, so the child's facing still holds in world space
        let normal = self.inverse.transform_normal(local.normal);
        let material = self.material.as_deref().or(local.material);

        Some(HitRecord {
            t: local.t,
            p: ray.at(local.t),
            normal,
            front_face: local.front_face,
            material,
        })
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.object.shadow_hit(&self.object_ray(ray), ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.forward.transform_aabb(&self.object.bounding_box())
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
    use crate::primitives::{Sphere, Torus};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_unit(rng: &mut StdRng) -> Vec3 {
        loop {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if v.length_squared() <= 1.0 {
                if let Some(n) = v.try_normalize() {
                    return n;
                }
            }
        }
    }

    #[test]
    fn test_identity_matches_child() {
        let sphere = Sphere::new(Vec3::new(0.3, -0.2, 0.1), 1.0).unwrap();
        let instance = Instance::new(sphere.clone());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let origin = random_unit(&mut rng) * 4.0;
            let aim = random_unit(&mut rng) * 0.8;
            let ray = Ray::normalized(origin, aim - origin);

            let direct = sphere.hit(&ray, default_interval());
            let wrapped = instance.hit(&ray, default_interval());
            assert_eq!(direct.is_some(), wrapped.is_some());
            if let (Some(a), Some(b)) = (direct, wrapped) {
                assert!((a.t - b.t).abs() < 1e-4);
                assert!((a.p - b.p).length() < 1e-4);
                assert!((a.normal - b.normal).length() < 1e-4);
            }
        }
    }

    #[test]
    fn test_translated_unit_sphere() {
        let mut instance = Instance::new(Sphere::unit());
        instance.translate(Vec3::new(0.0, 0.0, -5.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = instance.hit(&ray, default_interval()).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_scaled_t_is_world_distance() {
        let mut instance = Instance::new(Sphere::unit());
        instance.scale_uniform(3.0).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let rec = instance.hit(&ray, default_interval()).unwrap();
        assert!((rec.t - 7.0).abs() < 1e-4);
        assert!((rec.p - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
    }

    #[test]
    fn test_ellipsoid_normal_matches_gradient() {
        let radii = Vec3::new(3.0, 1.0, 0.5);
        let mut instance = Instance::new(Sphere::unit());
        instance.scale(radii).unwrap();

        // Implicit ellipsoid f(p) = sum (p_i / r_i)^2 - 1
        let f = |p: Vec3| (p / radii).length_squared() - 1.0;
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..100 {
            let origin = random_unit(&mut rng) * 8.0;
            let target = random_unit(&mut rng) * 0.25;
            let ray = Ray::normalized(origin, target - origin);
            let Some(rec) = instance.hit(&ray, default_interval()) else {
                continue;
            };

            assert!((rec.normal.length() - 1.0).abs() < 1e-4);

            let h = 1e-2;
            let gradient = Vec3::new(
                f(rec.p + Vec3::X * h) - f(rec.p - Vec3::X * h),
                f(rec.p + Vec3::Y * h) - f(rec.p - Vec3::Y * h),
                f(rec.p + Vec3::Z * h) - f(rec.p - Vec3::Z * h),
            )
            .normalize();

            // Normal faces the ray, gradient points outward; compare up to sign
            assert!(rec.normal.dot(gradient).abs() > 0.999, "{:?} vs {:?}", rec.normal, gradient);
        }
    }

    #[test]
    fn test_composition_follows_call_order() {
        // Rotate then translate: the sphere's +x pole lands at (5, 1, 0)
        let mut a = Instance::new(Sphere::unit());
        a.rotate_z(90.0).translate(Vec3::new(5.0, 0.0, 0.0));
        let pole = a.forward_matrix().transform_point3(Vec3::X);
        assert!((pole - Vec3::new(5.0, 1.0, 0.0)).length() < 1e-5);

        // Translate then rotate: the translation itself is rotated
        let mut b = Instance::new(Sphere::unit());
        b.translate(Vec3::new(5.0, 0.0, 0.0)).rotate_z(90.0);
        let pole = b.forward_matrix().transform_point3(Vec3::X);
        assert!((pole - Vec3::new(0.0, 6.0, 0.0)).length() < 1e-5);

        // Forward and inverse stay consistent
        let product = b.forward_matrix() * b.inverse_matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_singular_transforms_rejected() {
        let mut instance = Instance::new(Sphere::unit());
        assert_eq!(
            instance.scale(Vec3::new(1.0, 0.0, 1.0)).err(),
            Some(ConfigError::SingularTransform)
        );
        assert!(instance.transform(Mat4::ZERO).is_err());
        // Failed calls leave the transform untouched
        assert_eq!(instance.forward_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_shear_transform() {
        let shear = Mat4::from_cols_array(&[
            1.0, 0.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        let mut instance = Instance::new(Sphere::unit());
        instance.transform(shear).unwrap();

        // The sheared sphere's top point (0, 1, 0) moves to (0.5, 1, 0)
        let ray = Ray::new(Vec3::new(0.5, 5.0, 0.0), Vec3::NEG_Y);
        let rec = instance.hit(&ray, default_interval()).unwrap();
        assert!((rec.p.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Instance::new(Torus::new(1.0, 0.25).unwrap());
        original.translate(Vec3::new(1.0, 0.0, 0.0));

        let mut copy = original.clone();
        copy.translate(Vec3::new(0.0, 10.0, 0.0));

        assert_ne!(original.forward_matrix(), copy.forward_matrix());
        assert!((original.bounding_box().centroid() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_bounding_box_follows_transform() {
        let mut instance = Instance::new(Sphere::unit());
        instance.scale(Vec3::new(2.0, 1.0, 1.0)).unwrap().translate(Vec3::new(0.0, 3.0, 0.0));
        let bbox = instance.bounding_box();
        assert!((bbox.x.max - 2.0).abs() < 1e-4);
        assert!((bbox.y.min - 2.0).abs() < 1e-4);
    }
}
