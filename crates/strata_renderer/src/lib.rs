//! Strata renderer - CPU ray tracing core
//!
//! A Whitted-style ray tracer built around a single geometric object
//! abstraction:
//! - primitives, closed solids, affine instances and compounds
//! - a uniform grid for acceleration
//! - pinhole, thin-lens, fisheye and stereo cameras driven by
//!   stratified samplers
//! - bucket-parallel rendering with rayon

mod bucket;
mod camera;
mod compound;
mod error;
mod geometric_object;
mod grid;
mod instance;
mod light;
mod material;
pub mod primitives;
mod renderer;
pub mod sampler;
mod solids;
mod solvers;
mod tracer;
mod view_plane;
mod world;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{
    view_plane_point, Camera, CameraBasis, CameraSample, Fisheye, Pinhole, Stereo,
    StereoViewing, ThinLens,
};
pub use compound::Compound;
pub use error::{ConfigError, ConfigResult, RenderError, RenderResult};
pub use geometric_object::{GeometricObject, HitRecord, EPSILON};
pub use grid::{Grid, DEFAULT_MULTIPLIER};
pub use instance::Instance;
pub use light::{Ambient, Directional, Light, PointLight};
pub use material::{Color, Material, Matte, Phong, Reflective, ShadeRec};
pub use renderer::{color_to_rgba, render_pixel, ImageBuffer};
pub use sampler::{Sampler, SamplerKind};
pub use solids::{BeveledBox, SolidCone, SolidCylinder, ThickRing};
pub use solvers::{solve_cubic, solve_quadric, solve_quartic};
pub use tracer::{NormalTracer, Tracer, Whitted};
pub use view_plane::ViewPlane;
pub use world::World;

/// Re-export math types from strata_math
pub use strata_math::{Aabb, Interval, Mat4, Ray, Vec2, Vec3};
