//! Deterministic pseudo-random helpers: lattice value noise for the flow field
//! and pair-seeded hashes for link gating and runner phases.
//!
//! Everything here is a pure function of its inputs, so the same pair or the
//! same lattice point produces the same value on every frame.

use glam::Vec2;
use std::f64::consts::TAU;

/// Fractional part in `[0, 1)`, also for negative inputs.
#[inline]
fn fract(v: f64) -> f64 {
    let f = v - v.floor();
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// Narrow a `[0, 1)` value to `f32` without rounding up to 1.
#[inline]
fn unit_f32(v: f64) -> f32 {
    let n = v as f32;
    if n >= 1.0 {
        0.0
    } else {
        n
    }
}

/// Lattice hash in `[0, 1)`.
#[inline]
pub fn hash2(x: f64, y: f64) -> f64 {
    fract((x * 127.1 + y * 311.7).sin() * 43758.5453)
}

/// Bilinearly interpolated value noise with smoothstep easing, in `[0, 1)`.
pub fn value_noise(x: f64, y: f64) -> f64 {
    let (xi, yi) = (x.floor(), y.floor());
    let (xf, yf) = (x - xi, y - yi);
    let tl = hash2(xi, yi);
    let tr = hash2(xi + 1.0, yi);
    let bl = hash2(xi, yi + 1.0);
    let br = hash2(xi + 1.0, yi + 1.0);
    let u = xf * xf * (3.0 - 2.0 * xf);
    let v = yf * yf * (3.0 - 2.0 * yf);
    let top = tl + u * (tr - tl);
    let bot = bl + u * (br - bl);
    top + v * (bot - top)
}

/// Unit direction of the flow field at `(x, y)` and time `t` (seconds).
///
/// `speed` drifts the sampling point diagonally over time; `scale` sets the
/// spatial frequency.
pub fn flow_vec(x: f32, y: f32, t: f64, scale: f32, speed: f32) -> Vec2 {
    let drift = t * speed as f64;
    let n = value_noise(
        (x as f64 + drift) * scale as f64,
        (y as f64 - drift) * scale as f64,
    );
    let angle = TAU * n;
    Vec2::new(angle.cos() as f32, angle.sin() as f32)
}

/// Gate value for the unordered pair `(a, b)`, in `[0, 1)`.
#[inline]
pub fn pair_rand(a: usize, b: usize) -> f32 {
    let (i, j) = (a.min(b) as f64, a.max(b) as f64);
    unit_f32((i * 12.9898 + j * 78.233 + 0.1234).sin().abs() % 1.0)
}

/// Phase seed for the unordered pair `(a, b)`, in `[0, 1)`.
#[inline]
pub fn pair_seed(a: usize, b: usize) -> f32 {
    let (i, j) = (a.min(b) as f64, a.max(b) as f64);
    unit_f32(fract((i * 12.345 + j * 98.765).sin() * 43758.5453))
}
