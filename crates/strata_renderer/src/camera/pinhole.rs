use super::{
    require_view_distance, require_zoom, view_plane_point, Camera, CameraBasis, CameraSample,
};
use crate::{ConfigResult, ViewPlane};
use strata_math::{Ray, Vec2, Vec3};

/// Perspective camera with every ray leaving the eye.
#[derive(Debug, Clone)]
pub struct Pinhole {
    basis: CameraBasis,
    /// Eye to view-plane distance
    d: f32,
    zoom: f32,
    /// View-plane offset of the image center, used for off-axis frusta
    film_shift: Vec2,
}

impl Pinhole {
    pub fn new(eye: Vec3, lookat: Vec3) -> Self {
        Self {
            basis: CameraBasis::new(eye, lookat),
            d: 500.0,
            zoom: 1.0,
            film_shift: Vec2::ZERO,
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.basis.set_up(up);
        self
    }

    pub fn with_view_distance(mut self, d: f32) -> Self {
        self.d = d;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_film_shift(mut self, shift: Vec2) -> Self {
        self.film_shift = shift;
        self
    }

    pub fn view_distance(&self) -> f32 {
        self.d
    }

    pub fn film_shift(&self) -> Vec2 {
        self.film_shift
    }

    pub(crate) fn set_film_shift(&mut self, shift: Vec2) {
        self.film_shift = shift;
    }

    /// Unit direction through view-plane point `p`.
    pub fn ray_direction(&self, p: Vec2) -> Vec3 {
        let p = p / self.zoom + self.film_shift;
        self.basis.to_world(p.x, p.y, -self.d).normalize()
    }
}

impl Camera for Pinhole {
    fn basis(&self) -> &CameraBasis {
        &self.basis
    }

    fn basis_mut(&mut self) -> &mut CameraBasis {
        &mut self.basis
    }

    fn validate(&self) -> ConfigResult<()> {
        require_view_distance(self.d)?;
        require_zoom(self.zoom)?;
        self.basis.ensure_computed()
    }

    fn primary_ray(&self, vp: &ViewPlane, x: u32, y: u32, sample: CameraSample) -> Option<Ray> {
        let pp = view_plane_point(vp, x, y, sample.pixel);
        Some(Ray::new(self.basis.eye(), self.ray_direction(pp)))
    }
}
