//! Tunable constants for the particle network.
//!
//! `Config::default()` is the built-in tuning panel. The environment-driven
//! adjustments applied at startup live in `presets.rs`; nothing else mutates
//! a `Config` while frames are running.

use crate::color::Rgba;
use glam::Vec2;
use serde::Serialize;
use std::fmt;

/// Minimum particle count per layer (and for the whole population).
pub const MIN_PARTICLES_PER_LAYER: usize = 8;

/// Primary links a particle may initiate per frame.
pub const MAX_LINKS_PER_PARTICLE: usize = 4;

/// Depth band sharing motion and link parameters. Index 0 is the front.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub speed: f32,
    pub size: [f32; 2],
    pub link_dist: f32,
    pub link_alpha: f32,
}

impl LayerConfig {
    pub const fn new(speed: f32, size: [f32; 2], link_dist: f32, link_alpha: f32) -> Self {
        Self {
            speed,
            size,
            link_dist,
            link_alpha,
        }
    }
}

/// Boundary policy applied after every integration step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainMode {
    /// Both axes wrap to the opposite edge.
    Wrap,
    /// Horizontal wraps, vertical clamps.
    WrapX,
    /// Velocity is nudged inward near edges; position clamps as a safety net.
    Steer,
    /// Position clamps and the violated velocity component flips.
    Bounce,
}

impl fmt::Display for ContainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainMode::Wrap => "wrap",
            ContainMode::WrapX => "wrapX",
            ContainMode::Steer => "steer",
            ContainMode::Bounce => "bounce",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowFieldConfig {
    /// Spatial frequency (lower = broader waves).
    pub scale: f32,
    /// Temporal drift of the field per second of simulation time.
    pub speed: f32,
    pub strength: f32,
    pub damping: f32,
    pub jitter: f32,
    pub max_speed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainmentConfig {
    pub enabled: bool,
    pub mode: ContainMode,
    pub wall_margin: f32,
    pub wall_force: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfig {
    pub keep_connected: bool,
    /// Size of the running nearest list and the fallback guarantee.
    pub k_nearest: usize,
    pub min_link_alpha: f32,
    pub extra_reach: f32,
    pub max_links_per_particle: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthConfig {
    pub enabled: bool,
    pub size_range: [f32; 2],
    pub alpha_range: [f32; 2],
    pub blur_max: f32,
    /// Line width, far to near.
    pub link_width: [f32; 2],
    pub speed_scale: [f32; 2],
    /// `> 1` skews the depth distribution toward near.
    pub z_bias: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallaxConfig {
    pub enabled: bool,
    /// Pixel shift for z = 1 with the pointer at the surface edge.
    pub strength: f32,
    /// Pointer smoothing factor per frame.
    pub follow: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinkleConfig {
    pub enabled: bool,
    pub speed: f32,
    pub depth_boost: f32,
    pub intensity: f32,
    pub light_dir: Vec2,
    pub specular_size: f32,
    pub specular_scale: f32,
    pub specular_warmth: f32,
    pub sparkle_threshold: f32,
    pub sparkle_size: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    pub enabled: bool,
    pub per_link: f32,
    pub speed: f32,
    pub size: f32,
    pub glow: f32,
    /// Fraction of the link covered by the bright streak.
    pub tail: f32,
    pub color: Rgba,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleConfig {
    pub enabled: bool,
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    /// Gradient start (region left edge).
    pub dot_a: Rgba,
    /// Gradient end (region right edge).
    pub dot_b: Rgba,
    pub line: Rgba,
    pub glow: Rgba,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Particles per square viewport pixel.
    pub density: f64,
    pub layers: Vec<LayerConfig>,
    pub field: FlowFieldConfig,
    pub containment: ContainmentConfig,
    pub links: LinkConfig,
    pub depth: DepthConfig,
    pub parallax: ParallaxConfig,
    pub twinkle: TwinkleConfig,
    pub runners: RunnerConfig,
    pub triangles: TriangleConfig,
    pub palette: Palette,
    /// Shadow blur for dots and links (0 disables).
    pub glow: f32,
}

pub const DEFAULT_DOT_A: Rgba = Rgba::rgb(0xFF, 0xD1, 0x66);
pub const DEFAULT_DOT_B: Rgba = Rgba::rgb(0xF5, 0xB0, 0x00);
pub const DEFAULT_LINE: Rgba = Rgba::rgb(0xFF, 0xDF, 0x8A);
pub const DEFAULT_RUNNER: Rgba = Rgba::rgb(0xFF, 0xD4, 0x4D);
pub const DEFAULT_GLOW: Rgba = Rgba::rgba(255, 223, 130, 0.45);

impl Default for Config {
    fn default() -> Self {
        Self {
            density: 0.00007,
            layers: vec![
                LayerConfig::new(0.70, [1.6, 2.4], 160.0, 0.30),
                LayerConfig::new(0.45, [1.5, 2.1], 140.0, 0.24),
                LayerConfig::new(0.30, [1.3, 1.8], 120.0, 0.20),
            ],
            field: FlowFieldConfig {
                scale: 0.005,
                speed: 0.00025,
                strength: 0.05,
                damping: 0.99,
                jitter: 0.002,
                max_speed: 0.55,
            },
            containment: ContainmentConfig {
                enabled: true,
                mode: ContainMode::WrapX,
                wall_margin: 10.0,
                wall_force: 0.1,
            },
            links: LinkConfig {
                keep_connected: true,
                k_nearest: 1,
                min_link_alpha: 0.16,
                extra_reach: 10.0,
                max_links_per_particle: MAX_LINKS_PER_PARTICLE,
            },
            depth: DepthConfig {
                enabled: true,
                size_range: [0.70, 2.00],
                alpha_range: [0.45, 1.00],
                blur_max: 2.2,
                link_width: [0.6, 2.6],
                speed_scale: [0.85, 1.12],
                z_bias: 1.8,
            },
            parallax: ParallaxConfig {
                enabled: true,
                strength: 50.0,
                follow: 0.10,
            },
            twinkle: TwinkleConfig {
                enabled: true,
                speed: 6.0,
                depth_boost: 0.99,
                intensity: 0.45,
                light_dir: Vec2::new(-0.6, -0.4),
                specular_size: 1.5,
                specular_scale: 0.65,
                specular_warmth: 0.15,
                sparkle_threshold: 0.92,
                sparkle_size: 2.0,
            },
            runners: RunnerConfig {
                enabled: true,
                per_link: 1.5,
                speed: 0.85,
                size: 6.0,
                glow: 8.0,
                tail: 0.16,
                color: DEFAULT_RUNNER,
            },
            triangles: TriangleConfig {
                enabled: false,
                alpha: 0.05,
            },
            palette: Palette {
                dot_a: DEFAULT_DOT_A,
                dot_b: DEFAULT_DOT_B,
                line: DEFAULT_LINE,
                glow: DEFAULT_GLOW,
            },
            glow: 14.0,
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl DepthConfig {
    /// Radius multiplier for depth `z` (1.0 when depth effects are off).
    #[inline]
    pub fn size_factor(&self, z: f32) -> f32 {
        if self.enabled {
            lerp(self.size_range[0], self.size_range[1], z)
        } else {
            1.0
        }
    }

    #[inline]
    pub fn alpha_factor(&self, z: f32) -> f32 {
        if self.enabled {
            lerp(self.alpha_range[0], self.alpha_range[1], z)
        } else {
            1.0
        }
    }

    #[inline]
    pub fn speed_factor(&self, z: f32) -> f32 {
        if self.enabled {
            lerp(self.speed_scale[0], self.speed_scale[1], z)
        } else {
            1.0
        }
    }

    /// Primary link width for the mean depth of its endpoints.
    #[inline]
    pub fn line_width(&self, z_pair: f32) -> f32 {
        lerp(self.link_width[0], self.link_width[1], z_pair)
    }

    /// Blur radius in pixels; farther particles blur more.
    #[inline]
    pub fn blur_px(&self, z: f32) -> f32 {
        if self.enabled {
            (1.0 - z) * self.blur_max
        } else {
            0.0
        }
    }
}
