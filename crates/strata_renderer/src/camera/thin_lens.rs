use super::{
    require_view_distance, require_zoom, view_plane_point, Camera, CameraBasis, CameraSample,
};
use crate::{ConfigError, ConfigResult, Sampler, ViewPlane};
use strata_math::{Ray, Vec3};

/// Camera with a finite aperture: sharp only on the focal plane.
#[derive(Debug, Clone)]
pub struct ThinLens {
    basis: CameraBasis,
    lens_radius: f32,
    /// Eye to view-plane distance
    d: f32,
    /// Eye to focal-plane distance
    f: f32,
    zoom: f32,
    sampler: Option<Sampler>,
}

impl ThinLens {
    pub fn new(eye: Vec3, lookat: Vec3) -> Self {
        Self {
            basis: CameraBasis::new(eye, lookat),
            lens_radius: 0.0,
            d: 500.0,
            f: 1.0,
            zoom: 1.0,
            sampler: None,
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.basis.set_up(up);
        self
    }

    pub fn with_lens_radius(mut self, radius: f32) -> Self {
        self.lens_radius = radius;
        self
    }

    pub fn with_view_distance(mut self, d: f32) -> Self {
        self.d = d;
        self
    }

    pub fn with_focal_distance(mut self, f: f32) -> Self {
        self.f = f;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sampler whose disk samples pick lens positions.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }
}

impl Camera for ThinLens {
    fn basis(&self) -> &CameraBasis {
        &self.basis
    }

    fn basis_mut(&mut self) -> &mut CameraBasis {
        &mut self.basis
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(self.lens_radius.is_finite() && self.lens_radius >= 0.0) {
            return Err(ConfigError::InvalidLens(format!(
                "lens radius must be non-negative, got {}",
                self.lens_radius
            )));
        }
        if !(self.f.is_finite() && self.f > 0.0) {
            return Err(ConfigError::InvalidLens(format!(
                "focal distance must be positive, got {}",
                self.f
            )));
        }
        if self.lens_radius > 0.0 && self.sampler.is_none() {
            return Err(ConfigError::InvalidLens("lens sampler not set".to_string()));
        }
        require_view_distance(self.d)?;
        require_zoom(self.zoom)?;
        self.basis.ensure_computed()
    }

    fn lens_sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    fn primary_ray(&self, vp: &ViewPlane, x: u32, y: u32, sample: CameraSample) -> Option<Ray> {
        let pp = view_plane_point(vp, x, y, sample.pixel) / self.zoom;
        let lp = sample.lens * self.lens_radius;

        // Where the view-plane point lands on the focal plane
        let p = pp * (self.f / self.d);

        let origin = self.basis.eye() + self.basis.to_world(lp.x, lp.y, 0.0);
        let direction = self.basis.to_world(p.x - lp.x, p.y - lp.y, -self.f).normalize();
        Some(Ray::new(origin, direction))
    }
}
