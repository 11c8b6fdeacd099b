//! Pixel evaluation and the output image buffer.
//!
//! - Per-pixel antialiasing over a stratified sampler
//! - Lens samples for cameras with an aperture
//! - Out-of-gamut handling and gamma correction on output

use crate::{
    bucket::BucketResult, camera::CameraSample, sampler::pixel_seed, Camera, Color, Sampler,
    World,
};
use strata_math::Vec2;

/// Mixed into the pixel seed so lens and pixel patterns stay independent.
const LENS_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Average radiance over all samples of pixel `(x, y)`.
///
/// Samples are drawn and summed in a fixed order, so the result only
/// depends on the scene and the view plane's seed.
pub fn render_pixel(
    world: &World,
    camera: &dyn Camera,
    sampler: &Sampler,
    x: u32,
    y: u32,
) -> Color {
    let vp = world.view_plane();
    let seed = pixel_seed(x, y, vp.seed);
    let mut pixel_samples = sampler.cursor(seed);
    let mut lens_samples = camera.lens_sampler().map(|s| s.cursor(seed ^ LENS_SEED_SALT));

    let num_samples = sampler.num_samples();
    let mut pixel_color = Color::ZERO;

    for _ in 0..num_samples {
        let lens = lens_samples
            .as_mut()
            .map_or(Vec2::ZERO, |cursor| cursor.next_disk());
        let sample = CameraSample::new(pixel_samples.next_square(), lens);

        pixel_color += match camera.primary_ray(vp, x, y, sample) {
            Some(ray) => world.tracer().trace_ray(world, &ray, 0, Color::ONE),
            None => world.background(),
        };
    }

    pixel_color / num_samples as f32
}

/// Apply gamma correction.
#[inline]
pub fn linear_to_gamma(linear: f32, gamma: f32) -> f32 {
    if linear <= 0.0 {
        0.0
    } else if gamma == 1.0 {
        linear
    } else {
        linear.powf(1.0 / gamma)
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Bring a color into [0, 1]: either flag it red or scale by its largest
/// component.
pub fn fit_to_gamut(color: Color, show_out_of_gamut: bool) -> Color {
    let max = color.max_element();
    if max <= 1.0 {
        color
    } else if show_out_of_gamut {
        Color::X
    } else {
        color / max
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color, gamma: f32, show_out_of_gamut: bool) -> [u8; 4] {
    let c = fit_to_gamut(color, show_out_of_gamut);
    let r = (255.0 * clamp_01(linear_to_gamma(c.x, gamma))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(c.y, gamma))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(c.z, gamma))) as u8;
    [r, g, b, 255]
}

/// Linear-color image produced by a render.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
    gamma: f32,
    show_out_of_gamut: bool,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
            gamma: 1.0,
            show_out_of_gamut: false,
        }
    }

    /// Output conversion settings used by [`Self::to_rgba`].
    pub fn with_display(mut self, gamma: f32, show_out_of_gamut: bool) -> Self {
        self.gamma = gamma;
        self.show_out_of_gamut = show_out_of_gamut;
        self
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        let rows = result.pixels.chunks(bucket.width.max(1) as usize);
        for (local_y, row) in rows.enumerate() {
            for (local_x, &color) in row.iter().enumerate() {
                self.set(bucket.x + local_x as u32, bucket.y + local_y as u32, color);
            }
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color, self.gamma, self.show_out_of_gamut));
        }
        bytes
    }

    /// Convert to an 8-bit image for encoding.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(color_to_rgba(self.get(x, y), self.gamma, self.show_out_of_gamut))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucket;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0, 2.0), 0.0);
        assert_eq!(linear_to_gamma(0.3, 1.0), 0.3);
        assert!((linear_to_gamma(1.0, 2.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25, 2.0) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_out_of_gamut() {
        let hot = Color::new(2.0, 1.0, 0.5);
        assert_eq!(fit_to_gamut(hot, false), Color::new(1.0, 0.5, 0.25));
        assert_eq!(fit_to_gamut(hot, true), Color::X);
        assert_eq!(fit_to_gamut(Color::splat(0.5), true), Color::splat(0.5));

        assert_eq!(color_to_rgba(hot, 1.0, true), [255, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ZERO, 2.2, false), [0, 0, 0, 255]);
    }

    #[test]
    fn test_write_bucket_places_rows() {
        let mut image = ImageBuffer::new(4, 3);
        let bucket = Bucket::new(1, 1, 2, 2, 0);
        let pixels = vec![Color::X, Color::Y, Color::Z, Color::ONE];
        image.write_bucket(&BucketResult::new(bucket, pixels));

        assert_eq!(image.get(1, 1), Color::X);
        assert_eq!(image.get(2, 1), Color::Y);
        assert_eq!(image.get(1, 2), Color::Z);
        assert_eq!(image.get(2, 2), Color::ONE);
        assert_eq!(image.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_rgba_image_matches_bytes() {
        let mut image = ImageBuffer::new(2, 1).with_display(2.0, false);
        image.set(0, 0, Color::splat(0.25));
        image.set(1, 0, Color::new(3.0, 0.0, 0.0));

        let rgba = image.to_rgba_image();
        assert_eq!(rgba.as_raw().as_slice(), image.to_rgba().as_slice());
        assert_eq!(rgba.get_pixel(0, 0).0, [127, 127, 127, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }
}
