use super::{view_plane_point, Camera, CameraBasis, CameraSample};
use crate::{ConfigError, ConfigResult, ViewPlane};
use strata_math::{Ray, Vec2, Vec3};

/// Equidistant fisheye: angle from the view axis grows linearly with the
/// distance from the image center.
///
/// Only the disk inscribed in the image is covered; pixels outside it
/// show background.
#[derive(Debug, Clone)]
pub struct Fisheye {
    basis: CameraBasis,
    /// Full field of view across the image circle, in degrees
    fov: f32,
}

impl Fisheye {
    pub fn new(eye: Vec3, lookat: Vec3) -> Self {
        Self {
            basis: CameraBasis::new(eye, lookat),
            fov: 180.0,
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.basis.set_up(up);
        self
    }

    pub fn with_fov(mut self, degrees: f32) -> Self {
        self.fov = degrees;
        self
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Direction for normalized image coordinates, `None` outside the unit disk.
    fn ray_direction(&self, pn: Vec2) -> Option<Vec3> {
        let r_squared = pn.length_squared();
        if r_squared > 1.0 {
            return None;
        }

        let r = r_squared.sqrt();
        let psi = r * self.fov.to_radians() * 0.5;
        let (sin_psi, cos_psi) = psi.sin_cos();
        let (cos_alpha, sin_alpha) = if r > 0.0 {
            (pn.x / r, pn.y / r)
        } else {
            (1.0, 0.0)
        };

        Some(
            self.basis
                .to_world(sin_psi * cos_alpha, sin_psi * sin_alpha, -cos_psi),
        )
    }
}

impl Camera for Fisheye {
    fn basis(&self) -> &CameraBasis {
        &self.basis
    }

    fn basis_mut(&mut self) -> &mut CameraBasis {
        &mut self.basis
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(self.fov > 0.0 && self.fov <= 360.0) {
            return Err(ConfigError::InvalidFieldOfView(self.fov));
        }
        self.basis.ensure_computed()
    }

    fn primary_ray(&self, vp: &ViewPlane, x: u32, y: u32, sample: CameraSample) -> Option<Ray> {
        let pp = view_plane_point(vp, x, y, sample.pixel);
        let extent = Vec2::new(vp.hres as f32, vp.vres as f32) * vp.pixel_size;
        let pn = 2.0 * pp / extent;

        let direction = self.ray_direction(pn)?;
        Some(Ray::new(self.basis.eye(), direction))
    }
}
