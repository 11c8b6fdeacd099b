//! Tracers: what color a ray sees.

use crate::{geometric_object::default_interval, Color, ShadeRec, World};
use strata_math::Ray;

/// Paths whose accumulated weight drops below this contribute nothing.
pub const MIN_THROUGHPUT: f32 = 1.0e-4;

/// Radiance along a ray, recursing through materials as needed.
pub trait Tracer: Send + Sync {
    /// `depth` is 0 for primary rays; `throughput` is the product of the
    /// weights the result will be scaled by.
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32, throughput: Color) -> Color;
}

/// Whitted-style recursive ray tracing.
///
/// Hits are shaded by their material (or the world's fallback material);
/// reflective materials re-enter the tracer one level deeper. Depth past
/// the view plane's `max_depth` returns black.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitted;

impl Tracer for Whitted {
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32, throughput: Color) -> Color {
        if depth > world.view_plane().max_depth || throughput.max_element() < MIN_THROUGHPUT {
            return Color::ZERO;
        }

        match world.hit(ray, default_interval()) {
            Some(hit) => {
                let material = hit.material.unwrap_or(world.default_material());
                let sr = ShadeRec {
                    hit,
                    ray: *ray,
                    depth,
                    throughput,
                    world,
                };
                material.shade(&sr)
            }
            None => world.background(),
        }
    }
}

/// Debug tracer: shading normal mapped to RGB.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalTracer;

impl Tracer for NormalTracer {
    fn trace_ray(&self, world: &World, ray: &Ray, _depth: u32, _throughput: Color) -> Color {
        match world.hit(ray, default_interval()) {
            Some(hit) => 0.5 * (hit.normal + Color::ONE),
            None => world.background(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Plane, Sphere};
    use crate::{Material, ViewPlane};
    use std::sync::Arc;
    use strata_math::Vec3;

    /// Adds one per shaded hit, then bounces straight back.
    struct Echo;

    impl Material for Echo {
        fn shade(&self, sr: &ShadeRec) -> Color {
            let back = Ray::new(sr.hit.p, -sr.ray.direction());
            Color::ONE
                + sr
                    .world
                    .tracer()
                    .trace_ray(sr.world, &back, sr.depth + 1, sr.throughput)
        }
    }

    fn mirror_box(max_depth: u32) -> World {
        let echo: Arc<dyn Material> = Arc::new(Echo);
        let mut world = World::new();
        world.set_view_plane(ViewPlane::new(1, 1).with_max_depth(max_depth));
        world.add_object(Plane::new(Vec3::ZERO, Vec3::Z).unwrap().with_material(echo.clone()));
        world.add_object(Plane::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z).unwrap().with_material(echo));
        world.build().unwrap();
        world
    }

    #[test]
    fn test_depth_limits_recursion() {
        for max_depth in [0, 1, 4] {
            let world = mirror_box(max_depth);
            let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
            let color = Whitted.trace_ray(&world, &ray, 0, Color::ONE);
            assert_eq!(color, Color::splat((max_depth + 1) as f32));
        }
    }

    #[test]
    fn test_past_max_depth_is_black() {
        let world = mirror_box(2);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        assert_eq!(Whitted.trace_ray(&world, &ray, 3, Color::ONE), Color::ZERO);
        assert_eq!(Whitted.trace_ray(&world, &ray, 0, Color::splat(1.0e-6)), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let mut world = World::new();
        world.set_background(Color::new(0.1, 0.2, 0.3));
        world.build().unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(Whitted.trace_ray(&world, &ray, 0, Color::ONE), Color::new(0.1, 0.2, 0.3));
        assert_eq!(NormalTracer.trace_ray(&world, &ray, 0, Color::ONE), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_normal_tracer_colors_normal() {
        let mut world = World::new();
        world.add_object(Sphere::unit());
        world.build().unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let color = NormalTracer.trace_ray(&world, &ray, 0, Color::ONE);
        assert!((color - Color::new(0.5, 0.5, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_unpainted_hit_uses_fallback_material() {
        let mut world = World::new();
        world.add_object(Sphere::unit());
        world.build().unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let color = Whitted.trace_ray(&world, &ray, 0, Color::ONE);
        // Ambient term only: no lights in the world
        assert!(color.min_element() > 0.0);
        assert_ne!(color, world.background());
    }
}
