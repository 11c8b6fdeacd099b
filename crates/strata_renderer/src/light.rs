//! Light sources: ambient, point and directional.

use crate::{geometric_object::EPSILON, Color, ConfigError, ConfigResult, ShadeRec};
use strata_math::{Interval, Ray, Vec3};

/// A light that materials sample during shading.
pub trait Light: Send + Sync {
    /// Unit direction from the hit point toward the light.
    fn direction(&self, sr: &ShadeRec) -> Vec3;

    /// Incident radiance at the hit point.
    fn radiance(&self, sr: &ShadeRec) -> Color;

    fn casts_shadows(&self) -> bool;

    /// True if an object lies between the shadow ray origin and the light.
    fn in_shadow(&self, ray: &Ray, sr: &ShadeRec) -> bool;
}

/// Constant ambient illumination.
#[derive(Debug, Clone, Copy)]
pub struct Ambient {
    ls: f32,
    color: Color,
}

impl Ambient {
    pub fn new(ls: f32, color: Color) -> Self {
        Self { ls, color }
    }

    /// Set the radiance scale.
    pub fn scale_radiance(mut self, ls: f32) -> Self {
        self.ls = ls;
        self
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self::new(1.0, Color::ONE)
    }
}

impl Light for Ambient {
    fn direction(&self, _sr: &ShadeRec) -> Vec3 {
        Vec3::ZERO
    }

    fn radiance(&self, _sr: &ShadeRec) -> Color {
        self.ls * self.color
    }

    fn casts_shadows(&self) -> bool {
        false
    }

    fn in_shadow(&self, _ray: &Ray, _sr: &ShadeRec) -> bool {
        false
    }
}

/// Point light at a fixed location, no distance falloff.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    location: Vec3,
    ls: f32,
    color: Color,
    shadows: bool,
}

impl PointLight {
    pub fn new(location: Vec3) -> Self {
        Self {
            location,
            ls: 1.0,
            color: Color::ONE,
            shadows: true,
        }
    }

    pub fn scale_radiance(mut self, ls: f32) -> Self {
        self.ls = ls;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Light for PointLight {
    fn direction(&self, sr: &ShadeRec) -> Vec3 {
        (self.location - sr.hit.p).normalize_or_zero()
    }

    fn radiance(&self, _sr: &ShadeRec) -> Color {
        self.ls * self.color
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, ray: &Ray, sr: &ShadeRec) -> bool {
        let distance = (self.location - ray.origin()).length();
        sr.world.shadow_hit(ray, Interval::new(EPSILON, distance))
    }
}

/// Light arriving from one direction everywhere in the scene.
#[derive(Debug, Clone, Copy)]
pub struct Directional {
    /// Unit vector pointing toward the light
    dir: Vec3,
    ls: f32,
    color: Color,
    shadows: bool,
}

impl Directional {
    /// `direction` points from the scene toward the light; it is normalized here.
    pub fn new(direction: Vec3) -> ConfigResult<Self> {
        let dir = direction
            .try_normalize()
            .ok_or(ConfigError::ZeroVector("light direction"))?;
        Ok(Self {
            dir,
            ls: 1.0,
            color: Color::ONE,
            shadows: true,
        })
    }

    pub fn scale_radiance(mut self, ls: f32) -> Self {
        self.ls = ls;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Light for Directional {
    fn direction(&self, _sr: &ShadeRec) -> Vec3 {
        self.dir
    }

    fn radiance(&self, _sr: &ShadeRec) -> Color {
        self.ls * self.color
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, ray: &Ray, sr: &ShadeRec) -> bool {
        sr.world.shadow_hit(ray, Interval::from_min(EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Plane, Sphere};
    use crate::{Material, Matte, Tracer, World, Whitted};
    use std::f32::consts::FRAC_1_PI;
    use std::sync::Arc;

    const KA: f32 = 0.25;
    const KD: f32 = 0.65;

    /// White matte floor at y = 0, seen straight down at the origin.
    fn floor_world(light: impl Light + 'static, blocker: Option<Sphere>) -> World {
        let matte: Arc<dyn Material> = Arc::new(Matte::new(KA, KD, Color::ONE));
        let mut world = World::new();
        world.add_light(light);
        world.add_object(Plane::new(Vec3::ZERO, Vec3::Y).unwrap().with_material(matte));
        if let Some(sphere) = blocker {
            world.add_object(sphere);
        }
        world.build().unwrap();
        world
    }

    fn floor_color(world: &World) -> Color {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y);
        Whitted.trace_ray(world, &ray, 0, Color::ONE)
    }

    fn assert_close(a: Color, b: Color) {
        assert!((a - b).length() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn test_point_light_blocked_leaves_ambient() {
        let light = PointLight::new(Vec3::new(0.0, 10.0, 0.0));
        let lit = floor_world(light, None);
        assert_close(floor_color(&lit), Color::splat(KA + KD * FRAC_1_PI));

        let blocker = Sphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0).unwrap();
        let shadowed = floor_world(light, Some(blocker));
        assert_close(floor_color(&shadowed), Color::splat(KA));
    }

    #[test]
    fn test_shadows_can_be_turned_off() {
        let light = PointLight::new(Vec3::new(0.0, 10.0, 0.0)).with_shadows(false);
        let blocker = Sphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0).unwrap();
        let world = floor_world(light, Some(blocker));
        assert_close(floor_color(&world), Color::splat(KA + KD * FRAC_1_PI));
    }

    #[test]
    fn test_point_light_shadow_stops_at_light() {
        // Blocker sits above the light, so the light still reaches the floor
        let light = PointLight::new(Vec3::new(0.0, 3.0, 0.0)).scale_radiance(2.0);
        let blocker = Sphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0).unwrap();
        let world = floor_world(light, Some(blocker));
        assert_close(floor_color(&world), Color::splat(KA + 2.0 * KD * FRAC_1_PI));
    }

    #[test]
    fn test_directional_shadow_is_unbounded() {
        let light = Directional::new(Vec3::Y).unwrap();
        assert_close(floor_color(&floor_world(light, None)), Color::splat(KA + KD * FRAC_1_PI));

        let blocker = Sphere::new(Vec3::new(0.0, 50.0, 0.0), 1.0).unwrap();
        let world = floor_world(light, Some(blocker));
        assert_close(floor_color(&world), Color::splat(KA));
    }

    #[test]
    fn test_directional_rejects_zero_direction() {
        assert_eq!(
            Directional::new(Vec3::ZERO).err(),
            Some(ConfigError::ZeroVector("light direction"))
        );
        let light = Directional::new(Vec3::new(0.0, 0.0, 4.0)).unwrap();
        assert_eq!(light.dir, Vec3::Z);
    }
}
