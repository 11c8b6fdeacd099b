use super::{Camera, CameraBasis, CameraSample, Pinhole};
use crate::{ConfigError, ConfigResult, ViewPlane};
use strata_math::{Ray, Vec2, Vec3};

/// Which view goes on the left half of the output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StereoViewing {
    /// Left eye's view on the left (free viewing with parallel eyes)
    #[default]
    Parallel,
    /// Right eye's view on the left (cross-eyed viewing)
    Transverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Separation {
    Baseline(f32),
    /// Angle subtended by the baseline at the look-at point, in degrees
    Angle(f32),
}

/// Two pinhole views side by side with a gap between them.
///
/// The sub-cameras sit at `eye -/+ (b/2) u`. By default their axes stay
/// parallel and each film is shifted so both views converge at the
/// look-at distance; with toe-in both aim at the shared look-at point
/// instead.
#[derive(Debug, Clone)]
pub struct Stereo {
    basis: CameraBasis,
    left: Pinhole,
    right: Pinhole,
    viewing: StereoViewing,
    pixel_gap: u32,
    separation: Separation,
    toe_in: bool,
}

impl Stereo {
    /// Combine two pinholes; their eye and look-at are overwritten by
    /// [`Camera::compute_uvw`].
    pub fn new(eye: Vec3, lookat: Vec3, left: Pinhole, right: Pinhole) -> Self {
        Self {
            basis: CameraBasis::new(eye, lookat),
            left,
            right,
            viewing: StereoViewing::Parallel,
            pixel_gap: 5,
            separation: Separation::Angle(5.0),
            toe_in: false,
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.basis.set_up(up);
        self
    }

    pub fn with_viewing(mut self, viewing: StereoViewing) -> Self {
        self.viewing = viewing;
        self
    }

    pub fn with_pixel_gap(mut self, gap: u32) -> Self {
        self.pixel_gap = gap;
        self
    }

    /// Eye separation given directly.
    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.separation = Separation::Baseline(baseline);
        self.basis.set_eye(self.basis.eye());
        self
    }

    /// Eye separation derived from the stereo angle, in degrees.
    pub fn with_stereo_angle(mut self, degrees: f32) -> Self {
        self.separation = Separation::Angle(degrees);
        self.basis.set_eye(self.basis.eye());
        self
    }

    pub fn with_toe_in(mut self, toe_in: bool) -> Self {
        self.toe_in = toe_in;
        self.basis.set_eye(self.basis.eye());
        self
    }

    pub fn left(&self) -> &Pinhole {
        &self.left
    }

    pub fn right(&self) -> &Pinhole {
        &self.right
    }

    /// Distance between the two sub-camera eyes.
    pub fn baseline(&self) -> f32 {
        match self.separation {
            Separation::Baseline(b) => b,
            Separation::Angle(degrees) => {
                2.0 * self.basis.view_range() * (0.5 * degrees.to_radians()).tan()
            }
        }
    }

    fn check_separation(&self) -> ConfigResult<()> {
        match self.separation {
            Separation::Baseline(b) if !(b.is_finite() && b >= 0.0) => Err(
                ConfigError::InvalidStereo(format!("baseline must be non-negative, got {b}")),
            ),
            Separation::Angle(a) if !(a >= 0.0 && a < 180.0) => Err(ConfigError::InvalidStereo(
                format!("stereo angle must be in [0, 180) degrees, got {a}"),
            )),
            _ => Ok(()),
        }
    }

    /// Place both sub-cameras from the shared frame.
    fn setup_cameras(&mut self) -> ConfigResult<()> {
        let half = 0.5 * self.baseline();
        let offset = half * self.basis.u();
        let eye = self.basis.eye();
        let lookat = self.basis.lookat();
        let up = self.basis.up();
        let range = self.basis.view_range();

        for (camera, sign) in [(&mut self.left, -1.0), (&mut self.right, 1.0)] {
            let shifted = sign * offset;
            let basis = camera.basis_mut();
            basis.set_eye(eye + shifted);
            basis.set_up(up);
            if self.toe_in {
                basis.set_lookat(lookat);
                camera.set_film_shift(Vec2::ZERO);
            } else {
                basis.set_lookat(lookat + shifted);
                let shift = -sign * half * camera.view_distance() / range;
                camera.set_film_shift(Vec2::new(shift, 0.0));
            }
            camera.compute_uvw()?;
        }
        Ok(())
    }

    fn views(&self) -> (&Pinhole, &Pinhole) {
        match self.viewing {
            StereoViewing::Parallel => (&self.left, &self.right),
            StereoViewing::Transverse => (&self.right, &self.left),
        }
    }
}

impl Camera for Stereo {
    fn basis(&self) -> &CameraBasis {
        &self.basis
    }

    fn basis_mut(&mut self) -> &mut CameraBasis {
        &mut self.basis
    }

    fn compute_uvw(&mut self) -> ConfigResult<()> {
        self.check_separation()?;
        self.basis.compute_uvw()?;
        self.setup_cameras()
    }

    fn validate(&self) -> ConfigResult<()> {
        self.check_separation()?;
        self.basis.ensure_computed()?;
        self.left.validate()?;
        self.right.validate()
    }

    fn image_size(&self, vp: &ViewPlane) -> (u32, u32) {
        (2 * vp.hres + self.pixel_gap, vp.vres)
    }

    fn primary_ray(&self, vp: &ViewPlane, x: u32, y: u32, sample: CameraSample) -> Option<Ray> {
        let (first, second) = self.views();
        if x < vp.hres {
            first.primary_ray(vp, x, y, sample)
        } else if x < vp.hres + self.pixel_gap {
            None
        } else {
            second.primary_ray(vp, x - vp.hres - self.pixel_gap, y, sample)
        }
    }
}
