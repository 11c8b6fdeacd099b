//! World: the scene container and render entry point.
//!
//! Objects are collected with [`World::add_object`] and indexed by a
//! uniform [`Grid`] in [`World::build`]. Adding objects after a build
//! drops the grid; build again before rendering.

use crate::{
    bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE},
    geometric_object::{GeometricObject, HitRecord},
    grid::DEFAULT_MULTIPLIER,
    renderer::ImageBuffer,
    sampler::SamplerKind,
    tracer::{Tracer, Whitted},
    Ambient, Camera, Color, ConfigError, ConfigResult, Grid, Light, Material, Matte, RenderError,
    RenderResult, ViewPlane,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use strata_math::{Interval, Ray};

pub struct World {
    vp: ViewPlane,
    background: Color,
    ambient: Ambient,
    lights: Vec<Arc<dyn Light>>,
    tracer: Box<dyn Tracer>,
    camera: Option<Box<dyn Camera>>,
    objects: Vec<Box<dyn GeometricObject>>,
    scene: Option<Grid>,
    grid_multiplier: f32,
    /// Shades hits on objects that carry no material
    default_material: Matte,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            vp: ViewPlane::default(),
            background: Color::ZERO,
            ambient: Ambient::default(),
            lights: Vec::new(),
            tracer: Box::new(Whitted),
            camera: None,
            objects: Vec::new(),
            scene: None,
            grid_multiplier: DEFAULT_MULTIPLIER,
            default_material: Matte::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    pub fn view_plane(&self) -> &ViewPlane {
        &self.vp
    }

    pub fn set_view_plane(&mut self, vp: ViewPlane) {
        self.vp = vp;
    }

    pub fn set_resolution(&mut self, hres: u32, vres: u32) {
        self.vp.hres = hres;
        self.vp.vres = vres;
    }

    pub fn set_pixel_size(&mut self, pixel_size: f32) {
        self.vp.pixel_size = pixel_size;
    }

    pub fn set_samples(&mut self, sampler: SamplerKind, num_samples: u32) {
        self.vp.sampler = sampler;
        self.vp.num_samples = num_samples;
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.vp.max_depth = max_depth;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn ambient(&self) -> &Ambient {
        &self.ambient
    }

    pub fn set_ambient(&mut self, ambient: Ambient) {
        self.ambient = ambient;
    }

    pub fn add_light(&mut self, light: impl Light + 'static) {
        self.lights.push(Arc::new(light));
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    pub fn set_tracer(&mut self, tracer: impl Tracer + 'static) {
        self.tracer = Box::new(tracer);
    }

    /// Set the camera. Its basis must already be computed.
    pub fn set_camera(&mut self, camera: impl Camera + 'static) {
        self.camera = Some(Box::new(camera));
    }

    pub fn camera(&self) -> Option<&dyn Camera> {
        self.camera.as_deref()
    }

    pub fn default_material(&self) -> &dyn Material {
        &self.default_material
    }

    pub fn set_default_material(&mut self, material: Matte) {
        self.default_material = material;
    }

    /// Grid density used by the next [`Self::build`].
    pub fn set_grid_multiplier(&mut self, multiplier: f32) {
        self.grid_multiplier = multiplier;
    }

    // -------------------------------------------------------------------------
    // Scene
    // -------------------------------------------------------------------------

    pub fn add_object(&mut self, object: impl GeometricObject + 'static) {
        self.add_boxed(Box::new(object));
    }

    pub fn add_boxed(&mut self, object: Box<dyn GeometricObject>) {
        if let Some(grid) = self.scene.take() {
            self.objects = grid.into_objects();
        }
        self.objects.push(object);
    }

    pub fn num_objects(&self) -> usize {
        match &self.scene {
            Some(grid) => grid.len(),
            None => self.objects.len(),
        }
    }

    pub fn is_built(&self) -> bool {
        self.scene.is_some()
    }

    /// Validate the configuration and index every object.
    pub fn build(&mut self) -> ConfigResult<()> {
        self.vp.validate()?;
        if let Some(camera) = &self.camera {
            camera.validate()?;
        }

        let objects = match self.scene.take() {
            Some(grid) => grid.into_objects(),
            None => std::mem::take(&mut self.objects),
        };

        let start = Instant::now();
        let grid = Grid::build_with_multiplier(objects, self.grid_multiplier);
        log::info!(
            "Built scene: {} objects, {} lights in {:.2?}",
            grid.len(),
            self.lights.len(),
            start.elapsed()
        );
        self.scene = Some(grid);
        Ok(())
    }

    /// Nearest hit in the built scene.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.scene.as_ref()?.hit(ray, ray_t)
    }

    /// True if anything in the built scene blocks the ray inside `ray_t`.
    pub fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.scene
            .as_ref()
            .is_some_and(|grid| grid.shadow_hit(ray, ray_t))
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render the full image.
    pub fn render(&self) -> RenderResult<ImageBuffer> {
        self.render_with_cancel(&AtomicBool::new(false))
    }

    /// Render, checking `cancel` before every bucket.
    ///
    /// Configuration errors are reported before any pixel is traced.
    pub fn render_with_cancel(&self, cancel: &AtomicBool) -> RenderResult<ImageBuffer> {
        let camera = self.camera.as_deref().ok_or(ConfigError::MissingCamera)?;
        camera.validate()?;
        self.vp.validate()?;
        if self.scene.is_none() {
            return Err(ConfigError::SceneNotBuilt.into());
        }
        let sampler = self.vp.build_sampler()?;

        let (width, height) = camera.image_size(&self.vp);
        let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);
        log::info!(
            "Rendering {}x{} @ {} spp in {} buckets",
            width,
            height,
            sampler.num_samples(),
            buckets.len()
        );

        let start = Instant::now();
        let results = buckets
            .par_iter()
            .map(|bucket| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(RenderError::Cancelled);
                }
                let pixels = render_bucket(bucket, self, camera, &sampler);
                Ok(BucketResult::new(*bucket, pixels))
            })
            .collect::<RenderResult<Vec<_>>>()?;

        let mut image = ImageBuffer::new(width, height)
            .with_display(self.vp.gamma, self.vp.show_out_of_gamut);
        for result in &results {
            image.write_bucket(result);
        }

        log::info!("Rendered in {:.2?}", start.elapsed());
        Ok(image)
    }
}
