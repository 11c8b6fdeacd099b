//! Compound: an ordered group of owned objects acting as one.

use crate::{
    geometric_object::{GeometricObject, HitRecord},
    Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray};

/// A list of geometric objects hit-tested as a unit.
///
/// A material set on the compound shades every child that has none of
/// its own.
#[derive(Clone, Default)]
pub struct Compound {
    objects: Vec<Box<dyn GeometricObject>>,
    material: Option<Arc<dyn Material>>,
    bbox: Option<Aabb>,
}

impl Compound {
    /// Create a new empty compound.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Add an object to the compound.
    pub fn add_object(&mut self, object: impl GeometricObject + 'static) {
        self.add_boxed(Box::new(object));
    }

    pub fn add_boxed(&mut self, object: Box<dyn GeometricObject>) {
        let child_box = object.bounding_box();
        self.bbox = Some(match self.bbox {
            Some(bbox) => Aabb::surrounding(&bbox, &child_box),
            None => child_box,
        });
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the compound is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Box<dyn GeometricObject>] {
        &self.objects
    }

    /// Take the children out, leaving the material behind.
    pub fn into_objects(self) -> Vec<Box<dyn GeometricObject>> {
        self.objects
    }

    pub(crate) fn into_parts(self) -> (Vec<Box<dyn GeometricObject>>, Option<Arc<dyn Material>>) {
        (self.objects, self.material)
    }
}

impl GeometricObject for Compound {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            // surrounds() is strict, so an equal t never displaces an earlier child
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest.map(|rec| rec.or_material(self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.objects.iter().any(|object| object.shadow_hit(ray, ray_t))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox.unwrap_or(Aabb::EMPTY)
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
    use crate::material::Matte;
    use crate::primitives::{Plane, Sphere};
    use crate::Color;
    use strata_math::Vec3;

    #[test]
    fn test_compound_returns_nearest() {
        let mut compound = Compound::new();
        compound.add_object(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0).unwrap());
        compound.add_object(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0).unwrap());
        compound.add_object(Sphere::new(Vec3::new(0.0, 0.0, -20.0), 1.0).unwrap());

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = compound.hit(&ray, default_interval()).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_compound_tie_goes_to_first_child() {
        let first: Arc<dyn Material> = Arc::new(Matte::new(0.1, 0.5, Color::X));
        let second: Arc<dyn Material> = Arc::new(Matte::new(0.1, 0.5, Color::Y));

        let mut compound = Compound::new();
        compound.add_object(Plane::new(Vec3::ZERO, Vec3::Z).unwrap().with_material(first.clone()));
        compound.add_object(Plane::new(Vec3::ZERO, Vec3::Z).unwrap().with_material(second));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let rec = compound.hit(&ray, default_interval()).unwrap();
        let hit_material = rec.material.unwrap() as *const dyn Material as *const u8;
        assert_eq!(hit_material, Arc::as_ptr(&first) as *const u8);
    }

    #[test]
    fn test_compound_material_fills_gaps() {
        let shared: Arc<dyn Material> = Arc::new(Matte::default());
        let own: Arc<dyn Material> = Arc::new(Matte::default());

        let mut compound = Compound::new().with_material(shared.clone());
        compound.add_object(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0).unwrap());
        compound.add_object(
            Sphere::new(Vec3::new(3.0, 0.0, -5.0), 1.0)
                .unwrap()
                .with_material(own.clone()),
        );

        let plain = compound.hit(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), default_interval()).unwrap();
        let ptr = plain.material.unwrap() as *const dyn Material as *const u8;
        assert_eq!(ptr, Arc::as_ptr(&shared) as *const u8);

        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z);
        let painted = compound.hit(&ray, default_interval()).unwrap();
        let ptr = painted.material.unwrap() as *const dyn Material as *const u8;
        assert_eq!(ptr, Arc::as_ptr(&own) as *const u8);
    }

    #[test]
    fn test_compound_miss_and_bounds() {
        let mut compound = Compound::new();
        assert!(compound.is_empty());
        assert!(compound.hit(&Ray::default(), default_interval()).is_none());

        compound.add_object(Sphere::new(Vec3::new(-2.0, 0.0, 0.0), 1.0).unwrap());
        compound.add_object(Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0).unwrap());
        assert_eq!(compound.len(), 2);

        let bbox = compound.bounding_box();
        assert!((bbox.x.min + 3.0).abs() < 1e-5);
        assert!((bbox.x.max - 3.0).abs() < 1e-5);

        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert!(!compound.shadow_hit(&ray, default_interval()));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut compound = Compound::new();
        compound.add_object(Sphere::unit());
        let mut copy = compound.clone();
        copy.add_object(Sphere::unit());

        assert_eq!(compound.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
