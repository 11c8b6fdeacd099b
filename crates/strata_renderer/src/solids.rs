//! Closed solids assembled from primitives inside a [`Compound`].
//!
//! Each solid tests its bounding box before walking its parts.

use crate::{
    geometric_object::{GeometricObject, HitRecord},
    primitives::{Disk, OpenCone, OpenCylinder, Rectangle, Sphere},
    Compound, ConfigError, ConfigResult, Instance, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// Shared body of every solid: the parts plus their cached bounds.
#[derive(Clone)]
struct Parts {
    compound: Compound,
    bbox: Aabb,
}

impl Parts {
    fn new(compound: Compound) -> Self {
        let bbox = compound.bounding_box();
        Self { compound, bbox }
    }

    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }
        self.compound.hit(ray, ray_t)
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.bbox.hit(ray, ray_t) && self.compound.shadow_hit(ray, ray_t)
    }
}

macro_rules! solid_geometric_object {
    ($ty:ty) => {
        impl GeometricObject for $ty {
            fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
                self.parts.hit(ray, ray_t)
            }

            fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
                self.parts.shadow_hit(ray, ray_t)
            }

            fn bounding_box(&self) -> Aabb {
                self.parts.bbox
            }

            fn set_material(&mut self, material: Arc<dyn Material>) {
                self.parts.compound.set_material(material);
            }

            fn box_clone(&self) -> Box<dyn GeometricObject> {
                Box::new(self.clone())
            }
        }
    };
}

/// Cylinder around the y axis closed by two disks.
#[derive(Clone)]
pub struct SolidCylinder {
    parts: Parts,
}

impl SolidCylinder {
    pub fn new(bottom: f32, top: f32, radius: f32) -> ConfigResult<Self> {
        let wall = OpenCylinder::new(bottom, top, radius)?;

        let mut compound = Compound::new();
        compound.add_object(Disk::new(Vec3::new(0.0, bottom, 0.0), Vec3::NEG_Y, radius)?);
        compound.add_object(Disk::new(Vec3::new(0.0, top, 0.0), Vec3::Y, radius)?);
        compound.add_object(wall);

        Ok(Self {
            parts: Parts::new(compound),
        })
    }
}

solid_geometric_object!(SolidCylinder);

/// Cone of `height` over a base disk of `radius` at y = 0.
#[derive(Clone)]
pub struct SolidCone {
    parts: Parts,
}

impl SolidCone {
    pub fn new(height: f32, radius: f32) -> ConfigResult<Self> {
        let mut compound = Compound::new();
        compound.add_object(OpenCone::new(height, radius)?);
        compound.add_object(Disk::new(Vec3::ZERO, Vec3::NEG_Y, radius)?);

        Ok(Self {
            parts: Parts::new(compound),
        })
    }
}

solid_geometric_object!(SolidCone);

/// Thick-walled ring (a tube with a hole) around the y axis.
#[derive(Clone)]
pub struct ThickRing {
    parts: Parts,
}

impl ThickRing {
    pub fn new(bottom: f32, top: f32, inner_radius: f32, outer_radius: f32) -> ConfigResult<Self> {
        if !(0.0 < inner_radius && inner_radius < outer_radius) {
            return Err(ConfigError::InvalidGeometry(format!(
                "ring radii must satisfy 0 < {inner_radius} < {outer_radius}"
            )));
        }

        let mut compound = Compound::new();
        compound.add_object(Disk::annulus(
            Vec3::new(0.0, bottom, 0.0),
            Vec3::NEG_Y,
            inner_radius,
            outer_radius,
        )?);
        compound.add_object(Disk::annulus(
            Vec3::new(0.0, top, 0.0),
            Vec3::Y,
            inner_radius,
            outer_radius,
        )?);
        compound.add_object(OpenCylinder::new(bottom, top, outer_radius)?);
        compound.add_object(OpenCylinder::new(bottom, top, inner_radius)?);

        Ok(Self {
            parts: Parts::new(compound),
        })
    }
}

solid_geometric_object!(ThickRing);

/// Axis-aligned box with its edges and corners rounded off by `bevel_radius`.
///
/// Built from six inset face rectangles, twelve edge cylinders and eight
/// corner spheres.
#[derive(Clone)]
pub struct BeveledBox {
    parts: Parts,
}

impl BeveledBox {
    pub fn new(p0: Vec3, p1: Vec3, bevel_radius: f32) -> ConfigResult<Self> {
        let size = p1 - p0;
        if !(size.min_element() > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "beveled box corners must satisfy {p0} < {p1}"
            )));
        }
        if !(bevel_radius > 0.0 && 2.0 * bevel_radius < size.min_element()) {
            return Err(ConfigError::InvalidGeometry(format!(
                "bevel radius {bevel_radius} does not fit a box of size {size}"
            )));
        }

        let r = bevel_radius;
        // Inner box: axes of the edge cylinders and centers of the corner spheres
        let lo = p0 + Vec3::splat(r);
        let hi = p1 - Vec3::splat(r);
        let inner = hi - lo;
        let mid = (lo + hi) * 0.5;

        let mut compound = Compound::new();

        // Faces, normals pointing out
        let (dx, dy, dz) = (inner.x * Vec3::X, inner.y * Vec3::Y, inner.z * Vec3::Z);
        compound.add_object(Rectangle::new(Vec3::new(p1.x, lo.y, lo.z), dy, dz)?);
        compound.add_object(Rectangle::new(Vec3::new(p0.x, lo.y, lo.z), dz, dy)?);
        compound.add_object(Rectangle::new(Vec3::new(lo.x, p1.y, lo.z), dz, dx)?);
        compound.add_object(Rectangle::new(Vec3::new(lo.x, p0.y, lo.z), dx, dz)?);
        compound.add_object(Rectangle::new(Vec3::new(lo.x, lo.y, p1.z), dx, dy)?);
        compound.add_object(Rectangle::new(Vec3::new(lo.x, lo.y, p0.z), dy, dx)?);

        for a in [lo, hi] {
            for b in [lo, hi] {
                // Along x
                let mut edge = Instance::new(OpenCylinder::new(-0.5 * inner.x, 0.5 * inner.x, r)?);
                edge.rotate_z(90.0).translate(Vec3::new(mid.x, a.y, b.z));
                compound.add_object(edge);

                // Along y
                let mut edge = Instance::new(OpenCylinder::new(lo.y, hi.y, r)?);
                edge.translate(Vec3::new(a.x, 0.0, b.z));
                compound.add_object(edge);

                // Along z
                let mut edge = Instance::new(OpenCylinder::new(-0.5 * inner.z, 0.5 * inner.z, r)?);
                edge.rotate_x(90.0).translate(Vec3::new(a.x, b.y, mid.z));
                compound.add_object(edge);

                for c in [lo, hi] {
                    compound.add_object(Sphere::new(Vec3::new(a.x, b.y, c.z), r)?);
                }
            }
        }

        Ok(Self {
            parts: Parts::new(compound),
        })
    }
}

solid_geometric_object!(BeveledBox);
