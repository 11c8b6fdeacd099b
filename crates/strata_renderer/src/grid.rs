//! Uniform grid acceleration structure.
//!
//! Objects are registered in every cell their bounding box overlaps. A ray
//! walks the cells it pierces in order (3D DDA) and stops as soon as the
//! nearest hit found so far lies before the next cell boundary, so most
//! rays only test the objects near their path.
//!
//! Unbounded objects (planes) have no cells; they live in a side list that
//! every query tests linearly.

use crate::{
    geometric_object::{GeometricObject, HitRecord, EPSILON},
    Compound, Material,
};
use std::sync::Arc;
use strata_math::{Aabb, Interval, Ray, Vec3};

/// Default cell density multiplier.
pub const DEFAULT_MULTIPLIER: f32 = 2.0;

/// Floor on each axis extent, relative to the largest one, when sizing cells.
/// Keeps flat scenes from getting a cell size near zero.
const MIN_EXTENT_FRACTION: f32 = 0.1;

/// Spatial index over an owned set of objects, built once.
#[derive(Clone)]
pub struct Grid {
    objects: Vec<Box<dyn GeometricObject>>,
    /// Indices into `objects` of everything without finite bounds
    unbounded: Vec<usize>,
    /// Object indices per cell, x fastest then y then z
    cells: Vec<Vec<u32>>,
    counts: [usize; 3],
    bbox: Aabb,
    material: Option<Arc<dyn Material>>,
}

/// Per-axis DDA state.
#[derive(Debug, Clone, Copy)]
struct AxisWalk {
    index: isize,
    step: isize,
    stop: isize,
    t_next: f32,
    dt: f32,
}

impl AxisWalk {
    fn new(origin: f32, dir: f32, min: f32, cell_width: f32, index: isize, count: usize) -> Self {
        if dir > 0.0 {
            Self {
                index,
                step: 1,
                stop: count as isize,
                t_next: (min + (index + 1) as f32 * cell_width - origin) / dir,
                dt: cell_width / dir,
            }
        } else if dir < 0.0 {
            Self {
                index,
                step: -1,
                stop: -1,
                t_next: (min + index as f32 * cell_width - origin) / dir,
                dt: -cell_width / dir,
            }
        } else {
            // Parallel to this axis: never crosses a cell boundary on it
            Self {
                index,
                step: 0,
                stop: -1,
                t_next: f32::INFINITY,
                dt: f32::INFINITY,
            }
        }
    }

    /// Move to the neighbouring cell; false once the walk leaves the grid.
    fn advance(&mut self) -> bool {
        self.index += self.step;
        self.t_next += self.dt;
        self.index != self.stop
    }
}

impl Grid {
    /// Build a grid with the default multiplier.
    pub fn build(objects: Vec<Box<dyn GeometricObject>>) -> Self {
        Self::build_with_multiplier(objects, DEFAULT_MULTIPLIER)
    }

    /// Build a grid with roughly `multiplier^3` cells per bounded object.
    pub fn build_with_multiplier(objects: Vec<Box<dyn GeometricObject>>, multiplier: f32) -> Self {
        let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            log::warn!("Grid multiplier {multiplier} is invalid, using {DEFAULT_MULTIPLIER}");
            DEFAULT_MULTIPLIER
        };

        let mut unbounded = Vec::new();
        let mut bounded = Vec::new();
        let mut scene_box: Option<Aabb> = None;
        for (i, object) in objects.iter().enumerate() {
            let b = object.bounding_box();
            if b.is_finite() && !b.is_empty() {
                scene_box = Some(match scene_box {
                    Some(s) => Aabb::surrounding(&s, &b),
                    None => b,
                });
                bounded.push((i, b));
            } else {
                unbounded.push(i);
            }
        }

        let Some(scene_box) = scene_box else {
            return Self {
                objects,
                unbounded,
                cells: Vec::new(),
                counts: [0; 3],
                bbox: Aabb::EMPTY,
                material: None,
            };
        };

        // Pad so objects touching the boundary still land inside a cell
        let bbox = Aabb::from_points(
            scene_box.min_point() - Vec3::splat(EPSILON),
            scene_box.max_point() + Vec3::splat(EPSILON),
        );

        let w = bbox.size();
        let sizing = w.max(Vec3::splat(MIN_EXTENT_FRACTION * w.max_element()));
        let s = (sizing.x * sizing.y * sizing.z / bounded.len() as f32).cbrt();
        let counts = [
            (multiplier * w.x / s) as usize + 1,
            (multiplier * w.y / s) as usize + 1,
            (multiplier * w.z / s) as usize + 1,
        ];

        let mut cells = vec![Vec::new(); counts[0] * counts[1] * counts[2]];
        for &(i, b) in &bounded {
            let lo = cell_coords(&bbox, &counts, b.min_point());
            let hi = cell_coords(&bbox, &counts, b.max_point());
            for iz in lo[2]..=hi[2] {
                for iy in lo[1]..=hi[1] {
                    for ix in lo[0]..=hi[0] {
                        cells[ix + counts[0] * (iy + counts[1] * iz)].push(i as u32);
                    }
                }
            }
        }

        let occupied = cells.iter().filter(|c| !c.is_empty()).count();
        let max_in_cell = cells.iter().map(Vec::len).max().unwrap_or(0);
        log::debug!(
            "Grid built: {} objects ({} unbounded), {}x{}x{} cells, {} occupied, max {} per cell",
            objects.len(),
            unbounded.len(),
            counts[0],
            counts[1],
            counts[2],
            occupied,
            max_in_cell
        );

        Self {
            objects,
            unbounded,
            cells,
            counts,
            bbox,
            material: None,
        }
    }

    /// Number of cells along x, y and z.
    pub fn cell_counts(&self) -> [usize; 3] {
        self.counts
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Take the objects back, e.g. to rebuild after adding more.
    pub fn into_objects(self) -> Vec<Box<dyn GeometricObject>> {
        self.objects
    }

    /// Walk the cells pierced by `ray` inside `ray_t`, nearest first.
    ///
    /// `visit` receives the object indices of a cell and the distance at
    /// which the ray leaves that cell; returning true ends the walk.
    fn walk(&self, ray: &Ray, ray_t: Interval, mut visit: impl FnMut(&[u32], f32) -> bool) {
        if self.cells.is_empty() {
            return;
        }
        let Some((t0, t1)) = self.bbox.intersect(ray) else {
            return;
        };
        let t_start = t0.max(ray_t.min);
        let t_end = t1.min(ray_t.max);
        if t_start > t_end {
            return;
        }

        let origin = ray.origin();
        let start = if self.bbox.contains(origin) && t0 <= ray_t.min {
            origin
        } else {
            ray.at(t_start)
        };
        let index = cell_coords(&self.bbox, &self.counts, start);
        let min = self.bbox.min_point();
        let cell_size = self.bbox.size() / Vec3::new(
            self.counts[0] as f32,
            self.counts[1] as f32,
            self.counts[2] as f32,
        );

        let mut axes = [0, 1, 2].map(|a| {
            AxisWalk::new(
                origin[a],
                ray.direction()[a],
                min[a],
                cell_size[a],
                index[a] as isize,
                self.counts[a],
            )
        });

        loop {
            let [x, y, z] = axes.map(|w| w.index as usize);
            let cell = &self.cells[x + self.counts[0] * (y + self.counts[1] * z)];

            let axis = if axes[0].t_next < axes[1].t_next && axes[0].t_next < axes[2].t_next {
                0
            } else if axes[1].t_next < axes[2].t_next {
                1
            } else {
                2
            };
            let t_exit = axes[axis].t_next;

            if visit(cell, t_exit) || t_exit > t_end || !axes[axis].advance() {
                return;
            }
        }
    }
}

/// Cell containing `p`, clamped into the grid.
fn cell_coords(bbox: &Aabb, counts: &[usize; 3], p: Vec3) -> [usize; 3] {
    let rel = (p - bbox.min_point()) / bbox.size();
    [0, 1, 2].map(|a| {
        let i = (rel[a] * counts[a] as f32).floor();
        (i.max(0.0) as usize).min(counts[a] - 1)
    })
}

/// Fixed-size bitset marking objects already tested by one query.
struct Visited(Vec<u64>);

impl Visited {
    fn new(len: usize) -> Self {
        Self(vec![0; len.div_ceil(64)])
    }

    /// Mark `i`; returns false if it was already marked.
    fn insert(&mut self, i: u32) -> bool {
        let (word, bit) = ((i / 64) as usize, 1u64 << (i % 64));
        let fresh = self.0[word] & bit == 0;
        self.0[word] |= bit;
        fresh
    }
}

impl From<Compound> for Grid {
    fn from(compound: Compound) -> Self {
        let (objects, material) = compound.into_parts();
        let mut grid = Grid::build(objects);
        grid.material = material;
        grid
    }
}

impl GeometricObject for Grid {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;
        let mut closest_so_far = ray_t.max;

        for &i in &self.unbounded {
            if let Some(rec) = self.objects[i].hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        let mut visited = Visited::new(self.objects.len());
        self.walk(ray, ray_t.with_max(closest_so_far), |cell, t_exit| {
            for &i in cell {
                if !visited.insert(i) {
                    continue;
                }
                if let Some(rec) = self.objects[i as usize].hit(ray, ray_t.with_max(closest_so_far)) {
                    closest_so_far = rec.t;
                    closest = Some(rec);
                }
            }
            closest.is_some() && closest_so_far <= t_exit
        });

        closest.map(|rec| rec.or_material(self.material.as_deref()))
    }

    fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        if self.unbounded.iter().any(|&i| self.objects[i].shadow_hit(ray, ray_t)) {
            return true;
        }

        let mut blocked = false;
        let mut visited = Visited::new(self.objects.len());
        self.walk(ray, ray_t, |cell, _| {
            blocked = cell
                .iter()
                .any(|&i| visited.insert(i) && self.objects[i as usize].shadow_hit(ray, ray_t));
            blocked
        });
        blocked
    }

    fn bounding_box(&self) -> Aabb {
        if self.unbounded.is_empty() {
            self.bbox
        } else {
            Aabb::UNIVERSE
        }
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
    }

    fn box_clone(&self) -> Box<dyn GeometricObject> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric_object::default_interval;
    use crate::primitives::{AaBox, Plane, Sphere};
    use crate::Instance;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps an object and counts every intersection call.
    #[derive(Clone)]
    struct Counted {
        inner: Sphere,
        calls: Arc<AtomicUsize>,
    }

    impl GeometricObject for Counted {
        fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.hit(ray, ray_t)
        }

        fn shadow_hit(&self, ray: &Ray, ray_t: Interval) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.shadow_hit(ray, ray_t)
        }

        fn bounding_box(&self) -> Aabb {
            self.inner.bounding_box()
        }

        fn set_material(&mut self, material: Arc<dyn Material>) {
            self.inner.set_material(material);
        }

        fn box_clone(&self) -> Box<dyn GeometricObject> {
            Box::new(self.clone())
        }
    }

    fn random_vec(rng: &mut StdRng, extent: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    fn random_scene(rng: &mut StdRng) -> Vec<Box<dyn GeometricObject>> {
        let mut objects: Vec<Box<dyn GeometricObject>> = Vec::new();
        for _ in 0..60 {
            let center = random_vec(rng, 10.0);
            let radius = rng.gen_range(0.2..1.5);
            objects.push(Box::new(Sphere::new(center, radius).unwrap()));
        }
        for _ in 0..20 {
            let corner = random_vec(rng, 10.0);
            let b = AaBox::new(corner, corner + Vec3::splat(rng.gen_range(0.3..2.0))).unwrap();
            let mut instance = Instance::new(b);
            instance.rotate_y(rng.gen_range(0.0..90.0));
            objects.push(Box::new(instance));
        }
        objects.push(Box::new(Plane::new(Vec3::new(0.0, -12.0, 0.0), Vec3::Y).unwrap()));
        objects
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let objects = random_scene(&mut rng);

        let mut brute = Compound::new();
        for object in &objects {
            brute.add_boxed(object.clone());
        }
        let grid = Grid::build(objects);

        for _ in 0..2000 {
            let origin = random_vec(&mut rng, 20.0);
            let dir = random_vec(&mut rng, 1.0).try_normalize().unwrap_or(Vec3::X);
            let ray = Ray::new(origin, dir);

            let expected = brute.hit(&ray, default_interval());
            let actual = grid.hit(&ray, default_interval());
            assert_eq!(expected.is_some(), actual.is_some(), "ray {ray:?}");
            if let (Some(e), Some(a)) = (expected, actual) {
                assert!((e.t - a.t).abs() < 1e-4, "t {} vs {} for {ray:?}", e.t, a.t);
            }

            let limit = Interval::new(EPSILON, rng.gen_range(0.5..30.0));
            assert_eq!(brute.shadow_hit(&ray, limit), grid.shadow_hit(&ray, limit));
        }
    }

    #[test]
    fn test_grid_axis_parallel_rays() {
        let mut rng = StdRng::seed_from_u64(3);
        let objects = random_scene(&mut rng);
        let mut brute = Compound::new();
        for object in &objects {
            brute.add_boxed(object.clone());
        }
        let grid = Grid::build(objects);

        for dir in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            for _ in 0..200 {
                let ray = Ray::new(random_vec(&mut rng, 15.0), dir);
                let expected = brute.hit(&ray, default_interval()).map(|r| r.t);
                let actual = grid.hit(&ray, default_interval()).map(|r| r.t);
                match (expected, actual) {
                    (Some(e), Some(a)) => assert!((e - a).abs() < 1e-4),
                    (None, None) => {}
                    other => panic!("mismatch {other:?} for {ray:?}"),
                }
            }
        }
    }

    #[test]
    fn test_missing_ray_tests_no_object() {
        let calls = Arc::new(AtomicUsize::new(0));
        let objects: Vec<Box<dyn GeometricObject>> = (0..10)
            .map(|i| {
                let inner = Sphere::new(Vec3::new(i as f32 * 3.0, 0.0, 0.0), 1.0).unwrap();
                Box::new(Counted {
                    inner,
                    calls: calls.clone(),
                }) as Box<dyn GeometricObject>
            })
            .collect();
        let grid = Grid::build(objects);

        let ray = Ray::new(Vec3::new(0.0, 50.0, 0.0), Vec3::Y);
        assert!(grid.hit(&ray, default_interval()).is_none());
        assert!(!grid.shadow_hit(&ray, default_interval()));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_object_spanning_cells_tested_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let long = Counted {
            inner: Sphere::new(Vec3::ZERO, 10.0).unwrap(),
            calls: calls.clone(),
        };
        let mut objects: Vec<Box<dyn GeometricObject>> = vec![Box::new(long)];
        for i in 0..8 {
            objects.push(Box::new(Sphere::new(Vec3::new(-9.0 + i as f32, 12.0, 0.0), 0.3).unwrap()));
        }
        let grid = Grid::build(objects);

        // Starts inside the big sphere and crosses many cells before leaving it
        let ray = Ray::new(Vec3::new(-9.0, 0.0, 0.0), Vec3::X);
        let rec = grid.hit(&ray, default_interval()).unwrap();
        assert!((rec.t - 19.0).abs() < 1e-3);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_cell_counts_follow_density() {
        let cube = || -> Vec<Box<dyn GeometricObject>> {
            vec![Box::new(AaBox::new(Vec3::ZERO, Vec3::ONE).unwrap())]
        };
        assert_eq!(Grid::build_with_multiplier(cube(), 2.5).cell_counts(), [3, 3, 3]);
        assert_eq!(Grid::build_with_multiplier(cube(), 1.5).cell_counts(), [2, 2, 2]);

        // A long bar gets its cells along the long axis
        let bar: Vec<Box<dyn GeometricObject>> =
            vec![Box::new(AaBox::new(Vec3::ZERO, Vec3::new(8.0, 1.0, 1.0)).unwrap())];
        assert_eq!(Grid::build_with_multiplier(bar, 1.5).cell_counts(), [6, 1, 1]);
    }

    #[test]
    fn test_flat_scene_cell_count_stays_bounded() {
        let tiles: Vec<Box<dyn GeometricObject>> = (0..100)
            .map(|i| {
                let corner = Vec3::new((i % 10) as f32, (i / 10) as f32, 0.0);
                Box::new(AaBox::new(corner, corner + Vec3::new(1.0, 1.0, 0.001)).unwrap())
                    as Box<dyn GeometricObject>
            })
            .collect();
        let mut brute = Compound::new();
        for tile in &tiles {
            brute.add_boxed(tile.clone());
        }
        let grid = Grid::build(tiles);

        let [nx, ny, nz] = grid.cell_counts();
        assert_eq!(nz, 1);
        assert!(nx * ny * nz <= 8 * 100, "{nx}x{ny}x{nz}");

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let origin = Vec3::new(rng.gen_range(-1.0..11.0), rng.gen_range(-1.0..11.0), 5.0);
            let dir = Vec3::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5), -1.0);
            let ray = Ray::new(origin, dir);
            let expected = brute.hit(&ray, default_interval()).map(|r| r.t);
            let actual = grid.hit(&ray, default_interval()).map(|r| r.t);
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_grid_with_only_unbounded_objects() {
        let objects: Vec<Box<dyn GeometricObject>> =
            vec![Box::new(Plane::new(Vec3::ZERO, Vec3::Y).unwrap())];
        let grid = Grid::build(objects);
        assert_eq!(grid.cell_counts(), [0, 0, 0]);
        assert!(!grid.bounding_box().is_finite());

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y);
        let rec = grid.hit(&ray, default_interval()).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_grid_from_compound_keeps_material() {
        let material: Arc<dyn Material> = Arc::new(crate::Matte::default());
        let mut compound = Compound::new().with_material(material.clone());
        compound.add_object(Sphere::unit());

        let grid = Grid::from(compound);
        let rec = grid.hit(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z), default_interval()).unwrap();
        let ptr = rec.material.unwrap() as *const dyn Material as *const u8;
        assert_eq!(ptr, Arc::as_ptr(&material) as *const u8);
    }
}
