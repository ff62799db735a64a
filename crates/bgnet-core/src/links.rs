//! Per-frame link discovery.
//!
//! A pure pass over a particle snapshot: it never mutates particles and
//! returns the links to draw this frame. Primary links pass a pair-seeded
//! gate so the same pair is either always or never drawn while it stays in
//! range; fallback links keep sparse particles connected to their nearest
//! neighbours.

use crate::config::{Config, LayerConfig, LinkConfig};
use crate::noise::pair_rand;
use crate::particles::Particle;
use fnv::FnvHashSet;
use smallvec::SmallVec;
use std::ops::Range;

/// Floor for the distance-decayed primary opacity.
pub const MIN_PRIMARY_ALPHA: f32 = 0.06;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Primary,
    Fallback,
}

/// One link to draw this frame. `a < b` always.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub kind: LinkKind,
    /// Final stroke opacity.
    pub alpha: f32,
    /// Opacity before the depth boost; primary gate input.
    pub base_alpha: f32,
    /// Mean depth of both endpoints.
    pub z_pair: f32,
    pub width: f32,
}

/// Running nearest list, sorted by distance, at most `k` long.
#[derive(Clone, Debug, Default)]
struct Nearest {
    entries: SmallVec<[(f32, usize); 4]>,
}

impl Nearest {
    fn offer(&mut self, k: usize, dist: f32, idx: usize) {
        if k == 0 {
            return;
        }
        if self.entries.len() < k {
            self.entries.push((dist, idx));
        } else if let Some(worst) = self.entries.last_mut() {
            if dist < worst.0 {
                *worst = (dist, idx);
            } else {
                return;
            }
        }
        self.entries.sort_by(|x, y| x.0.total_cmp(&y.0));
    }
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Opacity of a primary link before the depth boost.
#[inline]
pub fn primary_base_alpha(dist: f32, layer: &LayerConfig) -> f32 {
    ((1.0 - dist / layer.link_dist) * layer.link_alpha).clamp(MIN_PRIMARY_ALPHA, 1.0)
}

/// Depth boost mapping mean depth `[0, 1]` to `[0.5, 1.3]`.
#[inline]
pub fn depth_boost(z_pair: f32) -> f32 {
    0.50 + 0.80 * z_pair
}

/// Whether the pair-seeded gate lets a primary link through.
#[inline]
pub fn passes_gate(a: usize, b: usize, base_alpha: f32) -> bool {
    pair_rand(a, b) < base_alpha.powf(1.5) * 0.85
}

/// Opacity of a fallback link; never below the configured floor.
#[inline]
pub fn fallback_alpha(dist: f32, layer: &LayerConfig, cfg: &LinkConfig) -> f32 {
    let reach = layer.link_dist + cfg.extra_reach;
    let norm = 1.0 - (dist / reach).min(1.0);
    (norm * layer.link_alpha).max(cfg.min_link_alpha).min(1.0)
}

/// Discover this frame's links for every layer.
pub fn discover_links(particles: &[Particle], layers: &[Range<usize>], config: &Config) -> Vec<Link> {
    let mut links = Vec::new();
    for (li, range) in layers.iter().enumerate() {
        let Some(layer) = config.layers.get(li) else {
            continue;
        };
        let range = range.start.min(particles.len())..range.end.min(particles.len());
        discover_layer(particles, range, layer, config, &mut links);
    }
    links
}

fn discover_layer(
    particles: &[Particle],
    range: Range<usize>,
    layer: &LayerConfig,
    config: &Config,
    out: &mut Vec<Link>,
) {
    let cfg = &config.links;
    let k = cfg.k_nearest;
    let base = range.start;
    let n = range.len();

    let mut degree = vec![0usize; n];
    let mut nearest: Vec<Nearest> = vec![Nearest::default(); n];
    let mut linked: FnvHashSet<(usize, usize)> = FnvHashSet::default();

    for a in range.clone() {
        let pa = &particles[a];
        let mut drawn = 0usize;
        for b in a + 1..range.end {
            let pb = &particles[b];
            let dist = pa.pos.distance(pb.pos);
            nearest[a - base].offer(k, dist, b);
            nearest[b - base].offer(k, dist, a);

            if dist >= layer.link_dist {
                continue;
            }
            let z_pair = (pa.z + pb.z) * 0.5;
            let base_alpha = primary_base_alpha(dist, layer);
            if !passes_gate(a, b, base_alpha) {
                continue;
            }
            out.push(Link {
                a,
                b,
                kind: LinkKind::Primary,
                alpha: (base_alpha * depth_boost(z_pair)).min(1.0),
                base_alpha,
                z_pair,
                width: config.depth.line_width(z_pair),
            });
            linked.insert((a, b));
            degree[a - base] += 1;
            degree[b - base] += 1;
            drawn += 1;
            if drawn >= cfg.max_links_per_particle {
                break;
            }
        }
    }

    if !cfg.keep_connected || k == 0 || n < 2 {
        return;
    }

    for a in range.clone() {
        let need = k.saturating_sub(degree[a - base]);
        if need == 0 {
            continue;
        }
        // Early exits can leave late particles with a short list.
        if nearest[a - base].entries.len() < k.min(n - 1) {
            let mut full = Nearest::default();
            for b in range.clone().filter(|&b| b != a) {
                full.offer(k, particles[a].pos.distance(particles[b].pos), b);
            }
            nearest[a - base] = full;
        }
        let candidates = nearest[a - base].entries.clone();
        let mut added = 0;
        for (dist, b) in candidates {
            if added >= need {
                break;
            }
            let pair = ordered(a, b);
            if !linked.insert(pair) {
                continue;
            }
            let alpha = fallback_alpha(dist, layer, cfg);
            out.push(Link {
                a: pair.0,
                b: pair.1,
                kind: LinkKind::Fallback,
                alpha,
                base_alpha: alpha,
                z_pair: (particles[a].z + particles[b].z) * 0.5,
                width: 1.0 + 1.2 * alpha,
            });
            degree[a - base] += 1;
            degree[b - base] += 1;
            added += 1;
        }
    }
}
