//! Material trait and the small set of shading models the tracer needs.
//!
//! Materials turn a [`ShadeRec`] into a color: ambient term, direct light
//! from every light with shadow rays, and for [`Reflective`] a mirror ray
//! traced back through the world's tracer.

use crate::{geometric_object::HitRecord, Light, World};
use std::f32::consts::FRAC_1_PI;
use strata_math::{Ray, Vec3};

/// Color type alias (linear RGB, values typically 0-1)
pub type Color = Vec3;

/// Everything a material needs to shade one hit.
pub struct ShadeRec<'a> {
    pub hit: HitRecord<'a>,
    /// Ray that produced the hit
    pub ray: Ray,
    /// Recursion depth of `ray` (0 for primary rays)
    pub depth: u32,
    /// Product of reflection weights along the path so far
    pub throughput: Color,
    pub world: &'a World,
}

impl<'a> ShadeRec<'a> {
    /// Unit vector from the hit point back toward the ray origin.
    pub fn wo(&self) -> Vec3 {
        -self.ray.direction().normalize()
    }

    /// Whether `light` is blocked along `wi` from the hit point.
    pub fn in_shadow(&self, light: &dyn Light, wi: Vec3) -> bool {
        light.casts_shadows() && light.in_shadow(&Ray::new(self.hit.p, wi), self)
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Radiance leaving the hit point toward the ray origin.
    fn shade(&self, sr: &ShadeRec) -> Color;
}

/// Ambient plus Lambertian diffuse.
#[derive(Debug, Clone, Copy)]
pub struct Matte {
    ka: f32,
    kd: f32,
    cd: Color,
}

impl Matte {
    /// Create a new matte material.
    ///
    /// - `ka`: ambient reflection coefficient
    /// - `kd`: diffuse reflection coefficient
    /// - `cd`: diffuse color
    pub fn new(ka: f32, kd: f32, cd: Color) -> Self {
        Self { ka, kd, cd }
    }
}

impl Default for Matte {
    fn default() -> Self {
        Self::new(0.25, 0.65, Color::splat(0.5))
    }
}

impl Material for Matte {
    fn shade(&self, sr: &ShadeRec) -> Color {
        let mut l = self.ka * self.cd * sr.world.ambient().radiance(sr);
        l += direct_lighting(sr, self.kd * self.cd, None);
        l
    }
}

/// Matte plus a glossy specular lobe.
#[derive(Debug, Clone, Copy)]
pub struct Phong {
    ka: f32,
    kd: f32,
    ks: f32,
    exp: f32,
    cd: Color,
    cs: Color,
}

impl Phong {
    /// Create a Phong material with a white specular color.
    pub fn new(ka: f32, kd: f32, ks: f32, exp: f32, cd: Color) -> Self {
        Self {
            ka,
            kd,
            ks,
            exp,
            cd,
            cs: Color::ONE,
        }
    }

    /// Set the specular color.
    pub fn with_specular_color(mut self, cs: Color) -> Self {
        self.cs = cs;
        self
    }
}

impl Material for Phong {
    fn shade(&self, sr: &ShadeRec) -> Color {
        let mut l = self.ka * self.cd * sr.world.ambient().radiance(sr);
        l += direct_lighting(sr, self.kd * self.cd, Some((self.ks * self.cs, self.exp)));
        l
    }
}

/// Phong plus perfect mirror reflection.
#[derive(Debug, Clone, Copy)]
pub struct Reflective {
    phong: Phong,
    kr: f32,
    cr: Color,
}

impl Reflective {
    /// Wrap a Phong base with a mirror term `kr * cr`.
    pub fn new(phong: Phong, kr: f32, cr: Color) -> Self {
        Self { phong, kr, cr }
    }
}

impl Material for Reflective {
    fn shade(&self, sr: &ShadeRec) -> Color {
        let mut l = self.phong.shade(sr);

        let wo = sr.wo();
        let n = sr.hit.normal;
        let wi = reflect(-wo, n);
        let weight = self.kr * self.cr;
        let reflected = Ray::new(sr.hit.p, wi);

        let tracer = sr.world.tracer();
        l += weight * tracer.trace_ray(sr.world, &reflected, sr.depth + 1, sr.throughput * weight);
        l
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Sum of unshadowed direct light, with an optional `(ks * cs, exp)` glossy lobe.
fn direct_lighting(sr: &ShadeRec, diffuse: Color, glossy: Option<(Color, f32)>) -> Color {
    let n = sr.hit.normal;
    let wo = sr.wo();
    let mut l = Color::ZERO;

    for light in sr.world.lights() {
        let wi = light.direction(sr);
        let ndotwi = n.dot(wi);
        if ndotwi <= 0.0 || sr.in_shadow(light.as_ref(), wi) {
            continue;
        }

        let mut f = diffuse * FRAC_1_PI;
        if let Some((specular, exp)) = glossy {
            let r = reflect(-wi, n);
            let rdotwo = r.dot(wo);
            if rdotwo > 0.0 {
                f += specular * rdotwo.powf(exp);
            }
        }
        l += f * light.radiance(sr) * ndotwi;
    }

    l
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Plane, Sphere};
    use crate::{Tracer, ViewPlane, Whitted};
    use std::sync::Arc;

    /// Mirror at z = 0 facing a red sphere centered on the z axis.
    fn mirror_world(max_depth: u32, kr: f32) -> World {
        let mirror: Arc<dyn Material> = Arc::new(Reflective::new(
            Phong::new(0.0, 0.0, 0.0, 1.0, Color::ONE),
            kr,
            Color::ONE,
        ));
        let red: Arc<dyn Material> = Arc::new(Matte::new(1.0, 0.0, Color::X));

        let mut world = World::new();
        world.set_view_plane(ViewPlane::new(1, 1).with_max_depth(max_depth));
        world.add_object(Plane::new(Vec3::ZERO, Vec3::Z).unwrap().with_material(mirror));
        world.add_object(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0).unwrap().with_material(red));
        world.build().unwrap();
        world
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let r = reflect(v, Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_phong_specular_color_builder() {
        let phong = Phong::new(0.2, 0.5, 0.3, 20.0, Color::X).with_specular_color(Color::Y);
        assert_eq!(phong.cs, Color::Y);
        assert_eq!(phong.cd, Color::X);
    }

    #[test]
    fn test_reflective_picks_up_reflected_color() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);

        for max_depth in [1, 3] {
            let world = mirror_world(max_depth, 1.0);
            let color = Whitted.trace_ray(&world, &ray, 0, Color::ONE);
            assert!((color - Color::X).length() < 1e-5, "{color}");
        }

        let world = mirror_world(0, 1.0);
        assert_eq!(Whitted.trace_ray(&world, &ray, 0, Color::ONE), Color::ZERO);
    }

    #[test]
    fn test_reflective_scales_by_kr() {
        let world = mirror_world(1, 0.5);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        let color = Whitted.trace_ray(&world, &ray, 0, Color::ONE);
        assert!((color - 0.5 * Color::X).length() < 1e-5, "{color}");
    }
}
