//! Simple ray tracer example.
//!
//! Renders a small scene of primitives, solids and instances and saves it
//! as PNG.
//!
//! Usage: `simple_render [pinhole|thinlens|fisheye|stereo] [view_plane.json]`

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use strata_renderer::{
    primitives::{Plane, Sphere, Torus},
    Ambient, BeveledBox, Camera, Color, Directional, Fisheye, Instance, Material, Matte, Phong,
    Pinhole, PointLight, Reflective, Sampler, SamplerKind, SolidCylinder, Stereo, StereoViewing,
    ThickRing, ThinLens, Vec3, ViewPlane, World,
};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let camera_name = args.next().unwrap_or_else(|| "pinhole".to_string());
    let vp = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read view plane from {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid view plane in {path}"))?
        }
        None => ViewPlane::new(400, 300)
            .with_samples(SamplerKind::MultiJittered, 16)
            .with_max_depth(4),
    };

    let mut world = World::new();
    world.set_view_plane(vp);
    world.set_background(Color::new(0.05, 0.05, 0.08));

    let start = std::time::Instant::now();
    build_scene(&mut world)?;
    set_camera(&mut world, &camera_name)?;
    world.build()?;
    log::info!("Scene built in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let image = world.render()?;
    log::info!("Rendered in {:?}", start.elapsed());

    let filename = format!("output_{camera_name}.png");
    image
        .to_rgba_image()
        .save(&filename)
        .with_context(|| format!("Failed to save {filename}"))?;
    log::info!("Saved to {filename}");

    Ok(())
}

fn build_scene(world: &mut World) -> Result<()> {
    world.set_ambient(Ambient::new(0.5, Color::ONE));
    world.add_light(PointLight::new(Vec3::new(10.0, 15.0, 10.0)).scale_radiance(2.0));
    world.add_light(Directional::new(Vec3::new(-1.0, 2.0, 1.0))?.scale_radiance(0.8));

    let ground: Arc<dyn Material> = Arc::new(Matte::new(0.3, 0.6, Color::splat(0.6)));
    let red: Arc<dyn Material> = Arc::new(Phong::new(0.2, 0.6, 0.3, 40.0, Color::new(0.8, 0.2, 0.15)));
    let gold: Arc<dyn Material> = Arc::new(Phong::new(0.2, 0.5, 0.4, 60.0, Color::new(0.9, 0.7, 0.2)));
    let teal: Arc<dyn Material> = Arc::new(Matte::new(0.25, 0.7, Color::new(0.1, 0.6, 0.6)));
    let mirror: Arc<dyn Material> = Arc::new(Reflective::new(
        Phong::new(0.1, 0.2, 0.3, 100.0, Color::ONE),
        0.7,
        Color::ONE,
    ));

    world.add_object(Plane::new(Vec3::ZERO, Vec3::Y)?.with_material(ground));
    world.add_object(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0)?.with_material(mirror));
    world.add_object(Sphere::new(Vec3::new(-2.5, 0.6, 1.5), 0.6)?.with_material(red.clone()));

    // One unit torus placed twice
    let torus = Torus::new(1.0, 0.25)?;
    let mut lying = Instance::new(torus.clone()).with_material(gold.clone());
    lying.scale(Vec3::new(1.2, 1.0, 1.2))?.translate(Vec3::new(2.5, 0.25, 1.0));
    world.add_object(lying);

    let mut standing = Instance::new(torus).with_material(teal.clone());
    standing
        .rotate_x(90.0)
        .rotate_y(30.0)
        .translate(Vec3::new(-1.0, 1.25, -2.5));
    world.add_object(standing);

    let mut pillar = Instance::new(SolidCylinder::new(0.0, 2.0, 0.4)?).with_material(red);
    pillar.translate(Vec3::new(3.0, 0.0, -2.0));
    world.add_object(pillar);

    let mut ring = Instance::new(ThickRing::new(0.0, 0.4, 0.5, 0.8)?).with_material(gold);
    ring.translate(Vec3::new(-3.0, 0.0, -1.0));
    world.add_object(ring);

    let key = BeveledBox::new(Vec3::new(-0.6, 0.0, -0.6), Vec3::new(0.6, 0.5, 0.6), 0.1)?;
    let mut key = Instance::new(key).with_material(teal);
    key.rotate_y(20.0).translate(Vec3::new(1.5, 0.0, 3.0));
    world.add_object(key);

    Ok(())
}

fn set_camera(world: &mut World, name: &str) -> Result<()> {
    let eye = Vec3::new(0.0, 3.0, 10.0);
    let lookat = Vec3::new(0.0, 0.8, 0.0);

    match name {
        "pinhole" => {
            let mut camera = Pinhole::new(eye, lookat).with_view_distance(400.0);
            camera.compute_uvw()?;
            world.set_camera(camera);
        }
        "thinlens" => {
            let vp = world.view_plane();
            let lens_sampler = Sampler::new(vp.sampler, vp.num_samples, vp.seed ^ 1)?;
            let mut camera = ThinLens::new(eye, lookat)
                .with_view_distance(400.0)
                .with_focal_distance((eye - lookat).length())
                .with_lens_radius(0.2)
                .with_sampler(lens_sampler);
            camera.compute_uvw()?;
            world.set_camera(camera);
        }
        "fisheye" => {
            let mut camera = Fisheye::new(Vec3::new(0.0, 1.0, 4.0), lookat).with_fov(200.0);
            camera.compute_uvw()?;
            world.set_camera(camera);
        }
        "stereo" => {
            let left = Pinhole::new(eye, lookat).with_view_distance(400.0);
            let right = left.clone();
            let mut camera = Stereo::new(eye, lookat, left, right)
                .with_viewing(StereoViewing::Parallel)
                .with_pixel_gap(5)
                .with_stereo_angle(2.0);
            camera.compute_uvw()?;
            world.set_camera(camera);
        }
        other => bail!("Unknown camera '{other}' (expected pinhole, thinlens, fisheye or stereo)"),
    }

    Ok(())
}
