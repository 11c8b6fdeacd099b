//! Cameras: turn a pixel plus a sample into a primary ray.
//!
//! Every camera carries a [`CameraBasis`] (eye, look-at, up and the derived
//! orthonormal `u, v, w` frame). The frame must be computed with
//! [`Camera::compute_uvw`] after the last change to eye, look-at or up;
//! rendering with a stale frame fails with [`ConfigError::BasisNotComputed`].

mod fisheye;
mod pinhole;
mod stereo;
mod thin_lens;

pub use fisheye::Fisheye;
pub use pinhole::Pinhole;
pub use stereo::{Stereo, StereoViewing};
pub use thin_lens::ThinLens;

use crate::{ConfigError, ConfigResult, Sampler, ViewPlane};
use strata_math::{Ray, Vec2, Vec3};

/// Eye position, look-at point, up vector and the frame derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    eye: Vec3,
    lookat: Vec3,
    up: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    computed: bool,
}

impl CameraBasis {
    /// Basis with `up` along +y. Not computed yet.
    pub fn new(eye: Vec3, lookat: Vec3) -> Self {
        Self {
            eye,
            lookat,
            up: Vec3::Y,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            computed: false,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn lookat(&self) -> Vec3 {
        self.lookat
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn u(&self) -> Vec3 {
        self.u
    }

    pub fn v(&self) -> Vec3 {
        self.v
    }

    /// Unit vector from the look-at point toward the eye.
    pub fn w(&self) -> Vec3 {
        self.w
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        self.eye = eye;
        self.computed = false;
    }

    pub fn set_lookat(&mut self, lookat: Vec3) {
        self.lookat = lookat;
        self.computed = false;
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.computed = false;
    }

    /// Distance from eye to look-at point.
    pub fn view_range(&self) -> f32 {
        (self.eye - self.lookat).length()
    }

    /// Derive the orthonormal frame.
    ///
    /// When `up` is parallel to the view direction another world axis
    /// stands in for it.
    pub fn compute_uvw(&mut self) -> ConfigResult<()> {
        let w = (self.eye - self.lookat)
            .try_normalize()
            .ok_or(ConfigError::DegenerateView)?;
        let up = self.up.try_normalize().ok_or(ConfigError::ZeroVector("up"))?;

        let u = match up.cross(w).try_normalize() {
            Some(u) => u,
            None => {
                let fallback = least_aligned_axis(w);
                log::warn!("Camera up {up} is parallel to the view direction; using {fallback}");
                fallback.cross(w).normalize()
            }
        };

        self.w = w;
        self.u = u;
        self.v = w.cross(u);
        self.computed = true;
        Ok(())
    }

    /// Error unless [`Self::compute_uvw`] ran after the last change.
    pub fn ensure_computed(&self) -> ConfigResult<()> {
        if self.computed {
            Ok(())
        } else {
            Err(ConfigError::BasisNotComputed)
        }
    }

    /// World-space direction for frame coordinates `(x, y, z)`.
    #[inline]
    pub fn to_world(&self, x: f32, y: f32, z: f32) -> Vec3 {
        x * self.u + y * self.v + z * self.w
    }
}

fn least_aligned_axis(w: Vec3) -> Vec3 {
    let a = w.abs();
    if a.x <= a.y && a.x <= a.z {
        Vec3::X
    } else if a.z <= a.y {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

/// Per-ray sample offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSample {
    /// Offset inside the pixel, in [0, 1)^2
    pub pixel: Vec2,
    /// Point on the unit disk, used by cameras with a lens
    pub lens: Vec2,
}

impl CameraSample {
    pub fn new(pixel: Vec2, lens: Vec2) -> Self {
        Self { pixel, lens }
    }

    /// Pixel center, lens center.
    pub fn center() -> Self {
        Self::new(Vec2::splat(0.5), Vec2::ZERO)
    }
}

/// View-plane coordinates of a sample in pixel `(x, y)`.
///
/// Rows count down from the top of the image; the view plane's y axis
/// points up.
pub fn view_plane_point(vp: &ViewPlane, x: u32, y: u32, pixel: Vec2) -> Vec2 {
    let hres = vp.hres as f32;
    let vres = vp.vres as f32;
    Vec2::new(
        x as f32 - 0.5 * hres + pixel.x,
        (vres - 1.0 - y as f32) - 0.5 * vres + pixel.y,
    ) * vp.pixel_size
}

/// A projection from image pixels to primary rays.
pub trait Camera: Send + Sync {
    fn basis(&self) -> &CameraBasis;

    fn basis_mut(&mut self) -> &mut CameraBasis;

    /// Derive the orthonormal frame (and any dependent state).
    fn compute_uvw(&mut self) -> ConfigResult<()> {
        self.basis_mut().compute_uvw()
    }

    /// Check parameters and that the frame is current.
    fn validate(&self) -> ConfigResult<()> {
        self.basis().ensure_computed()
    }

    /// Output image size for a view plane.
    fn image_size(&self, vp: &ViewPlane) -> (u32, u32) {
        (vp.hres, vp.vres)
    }

    /// Sampler for lens positions, if the camera has a lens.
    fn lens_sampler(&self) -> Option<&Sampler> {
        None
    }

    /// Primary ray for one sample of image pixel `(x, y)`.
    ///
    /// `None` means the pixel shows background.
    fn primary_ray(&self, vp: &ViewPlane, x: u32, y: u32, sample: CameraSample) -> Option<Ray>;
}

pub(crate) fn require_view_distance(d: f32) -> ConfigResult<()> {
    if d.is_finite() && d > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidViewDistance(d))
    }
}

pub(crate) fn require_zoom(zoom: f32) -> ConfigResult<()> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLens(format!("zoom must be positive, got {zoom}")))
    }
}
