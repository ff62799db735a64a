//! Startup adaptation of the base configuration to the device and page.
//!
//! The final configuration is a pure function of the base configuration and
//! an [`Environment`]: each entry of [`ENVIRONMENT_OVERRIDES`] runs once, in
//! order.

use crate::color::Rgba;
use crate::config::{Config, DEFAULT_DOT_A, DEFAULT_DOT_B, DEFAULT_LINE};

/// Viewport width below which runners and twinkle are off.
pub const SMALL_SCREEN_PX: f32 = 768.0;
/// Opacity applied to theme dot colors.
pub const THEME_DOT_ALPHA: f32 = 0.82;

/// Raw theme accent values as read from the page, untrimmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThemeColors {
    pub gold_1: Option<String>,
    pub gold_2: Option<String>,
    pub gold_line: Option<String>,
}

/// Device and page signals sampled once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    pub viewport_width: f32,
    pub device_pixel_ratio: f32,
    pub reduced_motion: bool,
    pub theme: ThemeColors,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            device_pixel_ratio: 1.0,
            reduced_motion: false,
            theme: ThemeColors::default(),
        }
    }
}

pub type Override = fn(&mut Config, &Environment);

pub const ENVIRONMENT_OVERRIDES: &[(&str, Override)] = &[
    ("small-screen", small_screen as Override),
    ("reduced-motion", reduced_motion as Override),
    ("load", load_preset as Override),
    ("motion", motion_tuning as Override),
    ("hi-dpi", hi_dpi as Override),
    ("theme", theme_colors as Override),
];

/// Apply every environment override to `base`.
pub fn adapt(mut base: Config, env: &Environment) -> Config {
    for (name, apply) in ENVIRONMENT_OVERRIDES {
        apply(&mut base, env);
        log::trace!("[presets] applied {name}");
    }
    log::info!(
        "[presets] width={} dpr={} reduced_motion={} density={} glow={} runners={} twinkle={}",
        env.viewport_width,
        env.device_pixel_ratio,
        env.reduced_motion,
        base.density,
        base.glow,
        base.runners.enabled,
        base.twinkle.enabled
    );
    base
}

/// Backing-store scale for the canvas.
pub fn surface_scale(device_pixel_ratio: f32, coarse_pointer: bool) -> f32 {
    let cap = if coarse_pointer { 1.25 } else { 1.75 };
    if device_pixel_ratio.is_finite() {
        device_pixel_ratio.clamp(1.0, cap)
    } else {
        1.0
    }
}

fn small_screen(c: &mut Config, env: &Environment) {
    let wide = env.viewport_width >= SMALL_SCREEN_PX;
    c.runners.enabled &= wide;
    c.twinkle.enabled &= wide;
}

fn reduced_motion(c: &mut Config, env: &Environment) {
    if !env.reduced_motion {
        return;
    }
    c.runners.enabled = false;
    c.twinkle.enabled = false;
    c.glow = c.glow.min(6.0);
    for layer in &mut c.layers {
        layer.link_dist = layer.link_dist.min(110.0);
    }
}

fn load_preset(c: &mut Config, _: &Environment) {
    c.density = 0.00013;
    c.glow = 8.0;
    for layer in &mut c.layers {
        layer.link_dist = 110.0;
    }
}

fn motion_tuning(c: &mut Config, _: &Environment) {
    c.field.speed = 0.00020;
    c.field.strength = 0.40;
    c.field.damping = 0.995;
    for (i, layer) in c.layers.iter_mut().enumerate() {
        layer.speed *= if i == 0 { 0.80 } else { 0.70 };
    }
}

fn hi_dpi(c: &mut Config, env: &Environment) {
    if env.device_pixel_ratio <= 2.0 {
        return;
    }
    c.density = c.density.min(0.00005);
    c.glow = c.glow.min(6.0);
    c.runners.glow = c.runners.glow.min(6.0);
    c.runners.per_link = c.runners.per_link.min(1.0);
    c.runners.speed = c.runners.speed.min(0.22);
    c.field.strength = c.field.strength.min(0.028);
}

fn theme_colors(c: &mut Config, env: &Environment) {
    let theme = &env.theme;
    c.palette.dot_a = theme_color("--gold-1", theme.gold_1.as_deref(), DEFAULT_DOT_A)
        .with_alpha(THEME_DOT_ALPHA);
    c.palette.dot_b = theme_color("--gold-2", theme.gold_2.as_deref(), DEFAULT_DOT_B)
        .with_alpha(THEME_DOT_ALPHA);
    c.palette.line = theme_color("--gold-line", theme.gold_line.as_deref(), DEFAULT_LINE);
}

/// Parse a theme value, falling back to `default` when empty or malformed.
pub fn theme_color(name: &str, raw: Option<&str>, default: Rgba) -> Rgba {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(value) => Rgba::parse_hex(value).unwrap_or_else(|e| {
            log::warn!("[presets] {name}: {e}; using default");
            default
        }),
    }
}
