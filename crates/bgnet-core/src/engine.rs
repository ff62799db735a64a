//! The single owner of simulation state.
//!
//! `Engine` ties the pieces together: it rebuilds the population on every
//! region change, integrates and links once per frame, and renders into any
//! [`Surface`]. Pause state lives in [`crate::lifecycle`], not here.

use crate::config::Config;
use crate::integrate::{step_all, FrameClock};
use crate::links::{discover_links, Link};
use crate::particles::{seed_population, Population};
use crate::region::{PercentsUpdate, Region, RegionError, RegionMode, RegionPercents, Viewport};
use crate::render::{render_frame, Scene, Surface};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Pointer position normalized to the surface, with a smoothed follower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub target: Vec2,
    pub smoothed: Vec2,
}

impl Default for Pointer {
    fn default() -> Self {
        let start = Vec2::new(0.7, 0.3);
        Self {
            target: start,
            smoothed: start,
        }
    }
}

impl Pointer {
    /// Move the smoothed position a fraction `k` toward the target.
    pub fn follow(&mut self, k: f32) {
        self.smoothed += (self.target - self.smoothed) * k;
    }

    /// Offset of the smoothed position from the center, each axis in `[-1, 1]`
    /// while the pointer is over the surface.
    pub fn offset(&self) -> Vec2 {
        (self.smoothed - Vec2::splat(0.5)) * 2.0
    }
}

pub struct Engine {
    config: Config,
    mode: RegionMode,
    custom: RegionPercents,
    viewport: Viewport,
    region: Region,
    population: Population,
    links: Vec<Link>,
    pointer: Pointer,
    clock: FrameClock,
    rng: StdRng,
}

impl Engine {
    pub fn new(config: Config, viewport: Viewport, seed: u64) -> Self {
        Self::with_mode(config, viewport, RegionMode::default(), seed)
    }

    /// Build directly into `mode`; the population is seeded once.
    pub fn with_mode(config: Config, viewport: Viewport, mode: RegionMode, seed: u64) -> Self {
        let mut engine = Self {
            config,
            mode,
            custom: RegionPercents::default(),
            viewport,
            region: Region::default(),
            population: Population::default(),
            links: Vec::new(),
            pointer: Pointer::default(),
            clock: FrameClock::default(),
            rng: StdRng::seed_from_u64(seed),
        };
        engine.rebuild();
        engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn region_mode(&self) -> RegionMode {
        self.mode
    }

    pub fn custom_percents(&self) -> &RegionPercents {
        &self.custom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Links discovered by the last [`Engine::step`].
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.rebuild();
    }

    pub fn set_region_mode(&mut self, mode: RegionMode) {
        self.mode = mode;
        self.rebuild();
    }

    /// Merge a partial custom region and switch to `custom` mode.
    pub fn set_custom_percents(&mut self, update: &PercentsUpdate) -> Result<(), RegionError> {
        self.custom = self.custom.updated(update)?;
        self.mode = RegionMode::Custom;
        self.rebuild();
        Ok(())
    }

    /// New pointer target in surface-normalized coordinates.
    pub fn set_pointer(&mut self, uv: Vec2) {
        if uv.is_finite() {
            self.pointer.target = uv;
        }
    }

    /// Advance the simulation to `timestamp_ms` and refresh the links.
    pub fn step(&mut self, timestamp_ms: f64) {
        let dt = self.clock.tick(timestamp_ms);
        self.pointer.follow(self.config.parallax.follow);
        step_all(
            &mut self.population.particles,
            &self.config,
            &self.region,
            dt,
            self.clock.time_sec,
            &mut self.rng,
        );
        self.links = discover_links(&self.population.particles, &self.population.layers, &self.config);
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let scene = Scene {
            config: &self.config,
            viewport: self.viewport,
            region: &self.region,
            population: &self.population,
            links: &self.links,
            pointer: self.pointer.offset(),
            time_sec: self.clock.time_sec,
        };
        render_frame(surface, &scene);
    }

    /// Simulate then draw one frame.
    pub fn frame<S: Surface + ?Sized>(&mut self, timestamp_ms: f64, surface: &mut S) {
        self.step(timestamp_ms);
        self.render(surface);
    }

    fn rebuild(&mut self) {
        self.region = Region::compute(self.viewport, self.mode, &self.custom);
        self.population = seed_population(&self.config, self.viewport, &self.region, &mut self.rng);
        self.links.clear();
        log::debug!(
            "[engine] rebuilt for {}x{} mode={} particles={}",
            self.viewport.width,
            self.viewport.height,
            self.mode,
            self.population.len()
        );
    }
}
