//! Closed-form polynomial root finders (quadratic, cubic, quartic).
//!
//! Coefficients are given lowest degree first: `c[0] + c[1] x + c[2] x^2 ...`.
//! Everything runs in f64; the torus quartic loses too much precision in f32.
//! Roots come back unsorted.

use std::f64::consts::PI;

const EQN_EPS: f64 = 1e-9;

#[inline]
fn is_zero(x: f64) -> bool {
    x.abs() < EQN_EPS
}

/// Real roots of `c[2] x^2 + c[1] x + c[0]`.
pub fn solve_quadric(c: [f64; 3]) -> Vec<f64> {
    // Normal form: x^2 + 2px + q = 0
    let p = c[1] / (2.0 * c[2]);
    let q = c[0] / c[2];
    let d = p * p - q;

    if is_zero(d) {
        vec![-p]
    } else if d < 0.0 {
        Vec::new()
    } else {
        let sqrt_d = d.sqrt();
        vec![sqrt_d - p, -sqrt_d - p]
    }
}

/// Real roots of `c[3] x^3 + c[2] x^2 + c[1] x + c[0]`.
pub fn solve_cubic(c: [f64; 4]) -> Vec<f64> {
    // Normal form: x^3 + Ax^2 + Bx + C = 0
    let a = c[2] / c[3];
    let b = c[1] / c[3];
    let cc = c[0] / c[3];

    // Substitute x = y - A/3 to eliminate the quadric term: y^3 + 3py + 2q = 0
    let sq_a = a * a;
    let p = (-sq_a / 3.0 + b) / 3.0;
    let q = (2.0 / 27.0 * a * sq_a - a * b / 3.0 + cc) / 2.0;

    let cb_p = p * p * p;
    let d = q * q + cb_p;

    let mut roots = if is_zero(d) {
        if is_zero(q) {
            vec![0.0]
        } else {
            let u = (-q).cbrt();
            vec![2.0 * u, -u]
        }
    } else if d < 0.0 {
        // Casus irreducibilis: three real roots
        let phi = (-q / (-cb_p).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
        let t = 2.0 * (-p).sqrt();
        vec![
            t * phi.cos(),
            -t * (phi + PI / 3.0).cos(),
            -t * (phi - PI / 3.0).cos(),
        ]
    } else {
        let sqrt_d = d.sqrt();
        let u = (sqrt_d - q).cbrt();
        let v = -(sqrt_d + q).cbrt();
        vec![u + v]
    };

    let sub = a / 3.0;
    for r in &mut roots {
        *r -= sub;
    }
    roots
}

/// Real roots of `c[4] x^4 + c[3] x^3 + c[2] x^2 + c[1] x + c[0]`.
pub fn solve_quartic(c: [f64; 5]) -> Vec<f64> {
    // Normal form: x^4 + Ax^3 + Bx^2 + Cx + D = 0
    let a = c[3] / c[4];
    let b = c[2] / c[4];
    let cc = c[1] / c[4];
    let d = c[0] / c[4];

    // Substitute x = y - A/4 to eliminate the cubic term: y^4 + py^2 + qy + r = 0
    let sq_a = a * a;
    let p = -3.0 / 8.0 * sq_a + b;
    let q = sq_a * a / 8.0 - a * b / 2.0 + cc;
    let r = -3.0 / 256.0 * sq_a * sq_a + sq_a * b / 16.0 - a * cc / 4.0 + d;

    let mut roots = if is_zero(r) {
        // No absolute term: y (y^3 + py + q) = 0
        let mut roots = solve_cubic([q, p, 0.0, 1.0]);
        roots.push(0.0);
        roots
    } else {
        // Solve the resolvent cubic and take one real root
        let z = solve_cubic([r * p / 2.0 - q * q / 8.0, -r, -p / 2.0, 1.0])[0];

        // Build two quadratic equations from it
        let Some(u) = non_negative_sqrt(z * z - r) else {
            return Vec::new();
        };
        let Some(v) = non_negative_sqrt(2.0 * z - p) else {
            return Vec::new();
        };

        let mut roots = solve_quadric([z - u, if q < 0.0 { -v } else { v }, 1.0]);
        roots.extend(solve_quadric([z + u, if q < 0.0 { v } else { -v }, 1.0]));
        roots
    };

    let sub = a / 4.0;
    for root in &mut roots {
        *root -= sub;
    }
    roots
}

/// Square root that treats tiny negatives as zero; `None` for real negatives.
fn non_negative_sqrt(x: f64) -> Option<f64> {
    if is_zero(x) {
        Some(0.0)
    } else if x > 0.0 {
        Some(x.sqrt())
    } else {
        None
    }
}

/// One Newton step on a quartic, used to tighten roots before they are
/// compared against the hit interval.
pub fn polish_quartic_root(c: &[f64; 5], x: f64) -> f64 {
    let f = (((c[4] * x + c[3]) * x + c[2]) * x + c[1]) * x + c[0];
    let df = ((4.0 * c[4] * x + 3.0 * c[3]) * x + 2.0 * c[2]) * x + c[1];
    if df.abs() > EQN_EPS {
        x - f / df
    } else {
        x
    }
}
