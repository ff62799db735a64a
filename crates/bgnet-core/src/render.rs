//! Frame rendering over an abstract 2D surface.
//!
//! The pipeline runs in a fixed order: clear, dots far to near (with specular
//! highlights and sparkles), links, runners, then optional triangle accents.
//! Every draw call goes through [`Surface`], so the whole pass can be recorded
//! and checked off-browser.

use crate::color::Rgba;
use crate::config::Config;
use crate::links::Link;
use crate::noise::{hash2, pair_seed};
use crate::particles::Population;
use crate::region::{Region, Viewport};
use glam::Vec2;
use std::f64::consts::TAU;

/// Blend mode for subsequent draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composite {
    SourceOver,
    Lighter,
}

/// Horizontal two-stop gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub x0: f32,
    pub x1: f32,
    pub from: Rgba,
    pub to: Rgba,
}

/// Radial gradient starting at zero radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub inner: Rgba,
    pub outer: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear(LinearGradient),
    Radial(RadialGradient),
}

/// Immediate-mode drawing target. State setters persist until changed.
pub trait Surface {
    fn clear(&mut self, viewport: Viewport);
    fn set_composite(&mut self, op: Composite);
    fn set_global_alpha(&mut self, alpha: f32);
    /// Shadow blur radius in pixels (0 disables) and its color.
    fn set_shadow(&mut self, blur: f32, color: Rgba);
    /// Gaussian blur filter in pixels, `None` to clear it.
    fn set_blur(&mut self, px: Option<f32>);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn fill_triangle(&mut self, points: [Vec2; 3], color: Rgba);
}

/// Blur below this is not worth a filter change.
pub const MIN_BLUR_PX: f32 = 0.01;

pub const SPARKLE_COLOR: Rgba = Rgba::rgb(255, 235, 170);

/// Everything one frame draws from.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub config: &'a Config,
    pub viewport: Viewport,
    pub region: &'a Region,
    pub population: &'a Population,
    pub links: &'a [Link],
    /// Smoothed pointer offset from the surface center, each axis in `[-1, 1]`.
    pub pointer: Vec2,
    pub time_sec: f64,
}

impl Scene<'_> {
    /// Screen shift for depth `z`; near particles move against the pointer.
    #[inline]
    pub fn parallax(&self, z: f32) -> Vec2 {
        let p = &self.config.parallax;
        if p.enabled {
            -self.pointer * ((z - 0.5) * p.strength)
        } else {
            Vec2::ZERO
        }
    }

    fn dot_position(&self, index: usize) -> Vec2 {
        let p = &self.population.particles[index];
        p.pos + self.parallax(p.z)
    }
}

/// Twinkle level in `[0, 1]` for a particle seed at time `t`.
#[inline]
pub fn twinkle(seed: f32, t: f64, speed: f32) -> f32 {
    let phase = (seed as f64 * 50.0 + t * speed as f64).rem_euclid(TAU);
    (0.5 + 0.5 * phase.sin()) as f32
}

/// Dot opacity after depth scaling and optional twinkle modulation.
pub fn dot_alpha(config: &Config, z: f32, twinkle: Option<f32>) -> f32 {
    let mut alpha = config.depth.alpha_factor(z);
    if let Some(tw) = twinkle {
        let near = 1.0 + config.twinkle.depth_boost * z;
        alpha *= 1.0 + config.twinkle.intensity * (tw * near - 0.5);
    }
    alpha.clamp(0.0, 1.0)
}

/// Number of runners on the pair `(a, b)`; the fractional part of
/// `per_link` becomes a stable per-pair chance of one extra.
pub fn runner_count(per_link: f32, a: usize, b: usize) -> usize {
    let per_link = per_link.max(0.0);
    let whole = per_link.floor();
    let extra = hash2(a.min(b) as f64, a.max(b) as f64) < (per_link - whole) as f64;
    whole as usize + usize::from(extra)
}

/// Normalized positions along a link of its `count` runners at time `t`.
pub fn runner_phases(a: usize, b: usize, count: usize, z_pair: f32, speed: f32, t: f64) -> Vec<f32> {
    let seed = pair_seed(a, b) as f64;
    let speed = (speed * (0.9 + 0.2 * z_pair)) as f64;
    (0..count)
        .map(|i| {
            let offset = i as f64 / count as f64;
            ((seed + offset + t * speed).rem_euclid(1.0) as f32).min(1.0)
        })
        .collect()
}

/// Draw one frame.
pub fn render_frame<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let config = scene.config;
    surface.clear(scene.viewport);
    surface.set_composite(Composite::SourceOver);
    surface.set_global_alpha(1.0);
    surface.set_shadow(config.glow, config.palette.glow);

    draw_dots(surface, scene);
    draw_links(surface, scene);
    if config.runners.enabled {
        draw_runners(surface, scene);
    }
    if config.triangles.enabled {
        draw_triangles(surface, scene);
    }
    surface.set_global_alpha(1.0);
}

fn draw_dots<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let config = scene.config;
    let tw_cfg = &config.twinkle;
    let fill = Paint::Linear(LinearGradient {
        x0: scene.region.x_min,
        x1: scene.region.x_max,
        from: config.palette.dot_a,
        to: config.palette.dot_b,
    });

    for &i in &scene.population.draw_order {
        let p = &scene.population.particles[i];
        let pos = scene.dot_position(i);
        let r = p.r0 * config.depth.size_factor(p.z);
        let tw = tw_cfg
            .enabled
            .then(|| twinkle(p.seed, scene.time_sec, tw_cfg.speed));

        let blur = config.depth.blur_px(p.z);
        let blurred = blur > MIN_BLUR_PX;
        if blurred {
            surface.set_blur(Some(blur));
        }
        surface.set_global_alpha(dot_alpha(config, p.z, tw));
        surface.fill_circle(pos, r, &fill);

        if let Some(tw) = tw {
            draw_specular(surface, scene, pos, r, p.z, tw);
        }

        surface.set_global_alpha(1.0);
        if blurred {
            surface.set_blur(None);
        }
    }
}

fn draw_specular<S: Surface + ?Sized>(
    surface: &mut S,
    scene: &Scene<'_>,
    pos: Vec2,
    r: f32,
    z: f32,
    tw: f32,
) {
    let config = scene.config;
    let cfg = &config.twinkle;
    let spec = tw * (0.75 + 0.25 * z) * cfg.specular_scale;
    let center = pos + cfg.light_dir * (r * 0.4);
    let warmth = cfg.specular_warmth;
    let highlight = RadialGradient {
        center,
        radius: r * cfg.specular_size,
        inner: Rgba::WHITE.with_alpha(0.20 + 0.6 * spec),
        outer: Rgba::rgba(
            255,
            (210.0 + 40.0 * warmth).floor().clamp(0.0, 255.0) as u8,
            (120.0 + 30.0 * warmth).floor().clamp(0.0, 255.0) as u8,
            (0.08 + 0.3 * spec).clamp(0.0, 1.0),
        ),
    };

    surface.set_composite(Composite::Lighter);
    surface.set_shadow(0.0, config.palette.glow);
    surface.fill_circle(center, highlight.radius, &Paint::Radial(highlight));
    surface.set_shadow(config.glow, config.palette.glow);

    if tw > cfg.sparkle_threshold {
        let len = r * cfg.sparkle_size * (0.8 + 0.3 * z);
        let span = (1.0 - cfg.sparkle_threshold).max(f32::EPSILON);
        let alpha = 0.25 + 0.3 * (tw - cfg.sparkle_threshold) / span;
        let color = SPARKLE_COLOR.with_alpha(alpha);
        let width = (r * 0.35).max(0.6);
        surface.stroke_line(pos - Vec2::X * len, pos + Vec2::X * len, width, color);
        surface.stroke_line(pos - Vec2::Y * len, pos + Vec2::Y * len, width, color);
    }
    surface.set_composite(Composite::SourceOver);
}

fn draw_links<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let line = scene.config.palette.line;
    for link in scene.links {
        let from = scene.dot_position(link.a);
        let to = scene.dot_position(link.b);
        surface.stroke_line(from, to, link.width, line.with_alpha(link.alpha));
    }
}

fn draw_runners<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let config = scene.config;
    let cfg = &config.runners;
    let half_tail = cfg.tail.max(0.0) * 0.5;

    surface.set_composite(Composite::Lighter);
    surface.set_shadow(cfg.glow, config.palette.glow);
    for link in scene.links {
        let count = runner_count(cfg.per_link, link.a, link.b);
        if count == 0 {
            continue;
        }
        let from = scene.dot_position(link.a);
        let to = scene.dot_position(link.b);
        let z = link.z_pair;
        let alpha = (0.9 * link.alpha * (0.6 + 0.6 * z)).min(1.0);
        let tail_width = (1.2 + 1.2 * z).max(1.0);
        let head = cfg.size * (0.8 + 0.4 * z);

        surface.set_global_alpha(alpha);
        for t in runner_phases(link.a, link.b, count, z, cfg.speed, scene.time_sec) {
            let t0 = (t - half_tail).max(0.0);
            let t1 = (t + half_tail).min(1.0);
            surface.stroke_line(from.lerp(to, t0), from.lerp(to, t1), tail_width, cfg.color);
            surface.fill_circle(from.lerp(to, t), head, &Paint::Solid(cfg.color));
        }
    }
    surface.set_global_alpha(1.0);
    surface.set_shadow(config.glow, config.palette.glow);
    surface.set_composite(Composite::SourceOver);
}

fn draw_triangles<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let config = scene.config;
    let pop = scene.population;
    let shift = if config.parallax.enabled {
        -scene.pointer * (config.parallax.strength * 0.5)
    } else {
        Vec2::ZERO
    };
    let front: Vec<usize> = pop
        .draw_order
        .iter()
        .copied()
        .filter(|&i| pop.particles[i].layer == 0)
        .collect();
    let color = Rgba::WHITE.with_alpha(config.triangles.alpha);
    for tri in front.chunks_exact(3) {
        let corner = |k: usize| pop.particles[tri[k]].pos + shift;
        surface.fill_triangle([corner(0), corner(1), corner(2)], color);
    }
}
