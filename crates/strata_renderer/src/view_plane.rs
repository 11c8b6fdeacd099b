//! View plane: resolution, pixel size and per-pixel sampling settings.

use crate::{sampler::SamplerKind, ConfigError, ConfigResult, Sampler};
use serde::{Deserialize, Serialize};

/// Image and sampling configuration shared by every camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPlane {
    /// Horizontal resolution in pixels
    pub hres: u32,
    /// Vertical resolution in pixels
    pub vres: u32,
    /// Side length of one pixel on the view plane
    pub pixel_size: f32,
    /// Antialiasing samples per pixel
    pub num_samples: u32,
    pub sampler: SamplerKind,
    /// Deepest secondary ray traced (0 = ray casting)
    pub max_depth: u32,
    pub gamma: f32,
    /// Paint out-of-gamut pixels red instead of rescaling them
    pub show_out_of_gamut: bool,
    /// Seed for sample patterns
    pub seed: u64,
}

impl Default for ViewPlane {
    fn default() -> Self {
        Self {
            hres: 400,
            vres: 400,
            pixel_size: 1.0,
            num_samples: 16,
            sampler: SamplerKind::MultiJittered,
            max_depth: 5,
            gamma: 1.0,
            show_out_of_gamut: false,
            seed: 0,
        }
    }
}

impl ViewPlane {
    pub fn new(hres: u32, vres: u32) -> Self {
        Self {
            hres,
            vres,
            ..Self::default()
        }
    }

    pub fn with_pixel_size(mut self, pixel_size: f32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    /// Set sampler kind and samples per pixel.
    pub fn with_samples(mut self, sampler: SamplerKind, num_samples: u32) -> Self {
        self.sampler = sampler;
        self.num_samples = num_samples;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_out_of_gamut(mut self, show: bool) -> Self {
        self.show_out_of_gamut = show;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check resolution, pixel size, sample count and gamma.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.hres == 0 || self.vres == 0 {
            return Err(ConfigError::InvalidResolution {
                hres: self.hres,
                vres: self.vres,
            });
        }
        if !(self.pixel_size.is_finite() && self.pixel_size > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "pixel size must be positive, got {}",
                self.pixel_size
            )));
        }
        if self.num_samples == 0 {
            return Err(ConfigError::InvalidSampleCount(self.num_samples));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Build the antialiasing sampler described by this view plane.
    pub fn build_sampler(&self) -> ConfigResult<Sampler> {
        Sampler::new(self.sampler, self.num_samples, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ViewPlane::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            ViewPlane::new(0, 10).validate(),
            Err(ConfigError::InvalidResolution { hres: 0, vres: 10 })
        );
        assert_eq!(
            ViewPlane::new(10, 10)
                .with_samples(SamplerKind::Jittered, 0)
                .validate(),
            Err(ConfigError::InvalidSampleCount(0))
        );
        assert!(ViewPlane::new(10, 10).with_pixel_size(0.0).validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "hres": 64, "vres": 32, "sampler": "jittered", "num_samples": 4 }"#;
        let vp: ViewPlane = serde_json::from_str(json).unwrap();

        assert_eq!((vp.hres, vp.vres), (64, 32));
        assert_eq!(vp.sampler, SamplerKind::Jittered);
        assert_eq!(vp.num_samples, 4);
        assert_eq!(vp.max_depth, ViewPlane::default().max_depth);
        assert_eq!(vp.pixel_size, 1.0);
    }

    #[test]
    fn test_json_round_trip() {
        let vp = ViewPlane::new(20, 10).with_gamma(2.2).with_seed(7);
        let json = serde_json::to_string(&vp).unwrap();
        let back: ViewPlane = serde_json::from_str(&json).unwrap();
        assert_eq!(vp, back);
    }
}
