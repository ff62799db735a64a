//! Particle state and the population factory.
//!
//! The population is rebuilt wholesale whenever the region changes; there is
//! no per-particle lifecycle.

use crate::config::{Config, MIN_PARTICLES_PER_LAYER};
use crate::region::{Region, Viewport};
use glam::Vec2;
use rand::Rng;
use std::ops::Range;

/// Viewport area above which density is reduced by `LARGE_AREA_FACTOR`.
pub const LARGE_AREA_PX: f64 = 2_000_000.0;
pub const LARGE_AREA_FACTOR: f64 = 0.85;
/// Viewport area above which density is reduced again by `HUGE_AREA_FACTOR`.
pub const HUGE_AREA_PX: f64 = 3_500_000.0;
pub const HUGE_AREA_FACTOR: f64 = 0.70;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub layer: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Depth in `[0, 1)`; 0 is far, values toward 1 are near.
    pub z: f32,
    /// Base radius before depth scaling.
    pub r0: f32,
    /// Desynchronizes flow sampling and twinkle phase, in `[0, 1000)`.
    pub seed: f32,
}

/// All particles plus the per-layer index ranges and a far-to-near order.
#[derive(Clone, Debug, Default)]
pub struct Population {
    pub particles: Vec<Particle>,
    /// Contiguous index range of each layer within `particles`.
    pub layers: Vec<Range<usize>>,
    /// Indices sorted by depth, far first, computed once per rebuild.
    pub draw_order: Vec<usize>,
}

impl Population {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn layer_counts(&self) -> Vec<usize> {
        self.layers.iter().map(|r| r.len()).collect()
    }
}

/// Density after large-viewport cost control.
pub fn adaptive_density(area: f64, density: f64) -> f64 {
    let mut d = density;
    if area > LARGE_AREA_PX {
        d *= LARGE_AREA_FACTOR;
    }
    if area > HUGE_AREA_PX {
        d *= HUGE_AREA_FACTOR;
    }
    d
}

/// Requested population size for a viewport, never below the layer floor.
pub fn total_count(viewport: Viewport, density: f64) -> usize {
    let area = viewport.area();
    let n = (area * adaptive_density(area, density)).floor();
    (n.max(0.0) as usize).max(MIN_PARTICLES_PER_LAYER)
}

/// Split `total` across `layers` by weight `1 / (i + 1)`, each at least the floor.
pub fn layer_counts(total: usize, layers: usize) -> Vec<usize> {
    let weights: Vec<f64> = (0..layers).map(|i| 1.0 / (i as f64 + 1.0)).collect();
    let sum: f64 = weights.iter().sum();
    weights
        .iter()
        .map(|w| ((total as f64 * (w / sum)).floor() as usize).max(MIN_PARTICLES_PER_LAYER))
        .collect()
}

/// Depth sample `1 - U^bias` with `U` uniform in `(0, 1]`, so `z` is in `[0, 1)`.
#[inline]
pub fn sample_depth<R: Rng + ?Sized>(rng: &mut R, bias: f32) -> f32 {
    let u = 1.0 - rng.gen::<f32>();
    let z = 1.0 - u.powf(bias.max(f32::EPSILON));
    z.clamp(0.0, 1.0 - f32::EPSILON)
}

#[inline]
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    (lo + rng.gen::<f32>() * (hi - lo)).min(hi.max(lo))
}

/// Build a fresh population inside `region`.
pub fn seed_population<R: Rng + ?Sized>(
    config: &Config,
    viewport: Viewport,
    region: &Region,
    rng: &mut R,
) -> Population {
    let total = total_count(viewport, config.density);
    let counts = layer_counts(total, config.layers.len());

    let mut particles = Vec::with_capacity(counts.iter().sum());
    let mut layers = Vec::with_capacity(counts.len());
    for (li, (layer, &count)) in config.layers.iter().zip(&counts).enumerate() {
        let start = particles.len();
        for _ in 0..count {
            particles.push(Particle {
                layer: li,
                pos: Vec2::new(
                    uniform(rng, region.x_min, region.x_max),
                    uniform(rng, region.y_min, region.y_max),
                ),
                vel: Vec2::ZERO,
                z: sample_depth(rng, config.depth.z_bias),
                r0: uniform(rng, layer.size[0], layer.size[1]),
                seed: rng.gen::<f32>() * 1000.0,
            });
        }
        layers.push(start..particles.len());
    }

    let mut draw_order: Vec<usize> = (0..particles.len()).collect();
    draw_order.sort_by(|&a, &b| particles[a].z.total_cmp(&particles[b].z));

    log::debug!(
        "[population] total={} layers={:?} region=({},{})..({},{})",
        particles.len(),
        counts,
        region.x_min,
        region.y_min,
        region.x_max,
        region.y_max
    );

    Population {
        particles,
        layers,
        draw_order,
    }
}
