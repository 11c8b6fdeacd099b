//! GeometricObject trait and HitRecord for ray-object intersection.

use crate::Material;
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// Smallest accepted hit distance; keeps secondary rays off their own surface.
pub const EPSILON: f32 = 0.001;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection (world space once it leaves an instance)
    pub p: Vec3,
    /// Unit surface normal, always pointing against the ray
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point, if any object on the path set one
    pub material: Option<&'a dyn Material>,
}

impl<'a> HitRecord<'a> {
    /// Build a record from the ray parameter and the outward normal.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: Option<&'a dyn Material>,
    ) -> Self {
        let mut rec = Self {
            t,
            p: ray.at(t),
            normal: Vec3::ZERO,
            front_face: false,
            material,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// Fill in a material when the hit object did not carry one.
    pub fn or_material(mut self, fallback: Option<&'a dyn Material>) -> Self {
        if self.material.is_none() {
            self.material = fallback;
        }
        self
    }
}

/// Trait for everything a ray can hit: primitives and containers alike.
///
/// Implementations never mutate shared state during a query, so one scene
/// can be traced from many threads at once.
pub trait GeometricObject: Send + Sync {
    /// Nearest intersection with `t` strictly inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// True if anything blocks the ray inside `ray_t`.
    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.hit(ray, ray_t).is_some()
    }

    /// Get the axis-aligned bounding box of this object.
    ///
    /// Unbounded objects return [`Aabb::UNIVERSE`].
    fn bounding_box(&self) -> Aabb;

    /// Assign the material used to shade this object.
    fn set_material(&mut self, material: Arc<dyn Material>);

    /// Deep copy behind a fresh box.
    fn box_clone(&self) -> Box<dyn GeometricObject>;
}

impl Clone for Box<dyn GeometricObject> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Interval used for primary and secondary rays.
#[inline]
pub fn default_interval() -> Interval {
    Interval::from_min(EPSILON)
}
