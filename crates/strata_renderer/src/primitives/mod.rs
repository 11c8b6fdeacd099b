//! Leaf geometric objects.
//!
//! Every primitive accepts rays with non-unit directions (instances hand
//! them object-space rays without renormalizing) and only reports hits with
//! `t` strictly inside the query interval.

mod aabox;
mod disk;
mod open_cone;
mod open_cylinder;
mod part_sphere;
mod plane;
mod rectangle;
mod sphere;
mod torus;
mod triangle;

pub use aabox::AaBox;
pub use disk::Disk;
pub use open_cone::OpenCone;
pub use open_cylinder::OpenCylinder;
pub use part_sphere::ConvexPartSphere;
pub use plane::Plane;
pub use rectangle::Rectangle;
pub use sphere::Sphere;
pub use torus::Torus;
pub use triangle::Triangle;

use crate::{ConfigError, ConfigResult};

/// Reject non-positive or non-finite extents.
pub(crate) fn require_positive(name: &str, value: f32) -> ConfigResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidGeometry(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
