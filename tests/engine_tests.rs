// Host-side scenario tests driving the engine the way the page does:
// a lifecycle-gated frame loop rendering into an off-screen surface.

use bgnet_core::{
    adapt, Composite, Config, ContainMode, Engine, Environment, FrameScheduler, Lifecycle,
    LinkKind, Paint, PauseReason, PercentsUpdate, RegionMode, Rgba, Surface, Viewport,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Default)]
struct CountingSurface {
    clears: usize,
    circles: usize,
    lines: usize,
}

impl Surface for CountingSurface {
    fn clear(&mut self, _: Viewport) {
        self.clears += 1;
    }
    fn set_composite(&mut self, _: Composite) {}
    fn set_global_alpha(&mut self, _: f32) {}
    fn set_shadow(&mut self, _: f32, _: Rgba) {}
    fn set_blur(&mut self, _: Option<f32>) {}
    fn fill_circle(&mut self, _: Vec2, _: f32, _: &Paint) {
        self.circles += 1;
    }
    fn stroke_line(&mut self, _: Vec2, _: Vec2, _: f32, _: Rgba) {
        self.lines += 1;
    }
    fn fill_triangle(&mut self, _: [Vec2; 3], _: Rgba) {}
}

/// Queue of pending frame ids, fired by the test.
#[derive(Default)]
struct ManualFrames {
    next: u32,
    queued: Vec<u32>,
    requests: usize,
}

impl FrameScheduler for ManualFrames {
    type Handle = u32;
    fn request(&mut self) -> u32 {
        self.next += 1;
        self.requests += 1;
        self.queued.push(self.next);
        self.next
    }
    fn cancel(&mut self, handle: u32) {
        self.queued.retain(|&h| h != handle);
    }
}

struct Page {
    engine: Engine,
    lifecycle: Lifecycle<ManualFrames>,
    surface: CountingSurface,
    now_ms: f64,
}

impl Page {
    fn new(viewport: Viewport) -> Self {
        let config = adapt(Config::default(), &Environment::default());
        let engine = Engine::with_mode(config, viewport, RegionMode::Custom, 9);
        let mut lifecycle = Lifecycle::new(ManualFrames::default());
        lifecycle.start();
        Self {
            engine,
            lifecycle,
            surface: CountingSurface::default(),
            now_ms: 0.0,
        }
    }

    /// Fire every queued frame once, the way the browser would.
    fn pump(&mut self) {
        let due: Vec<u32> = std::mem::take(&mut self.lifecycle.scheduler_mut().queued);
        for _ in due {
            self.now_ms += 16.7;
            if self.lifecycle.begin_frame() {
                self.engine.frame(self.now_ms, &mut self.surface);
                self.lifecycle.end_frame();
            }
        }
    }
}

#[test]
fn manual_pause_stops_and_resume_restarts() {
    let mut page = Page::new(Viewport::new(1280.0, 720.0));
    page.pump();
    assert!(page.lifecycle.is_running());
    assert_eq!(page.surface.clears, 1);
    assert!(page.surface.circles >= page.engine.population().len());

    page.lifecycle.set_paused(PauseReason::Manual, true);
    assert!(!page.lifecycle.is_running());
    let requests = page.lifecycle.scheduler().requests;
    for _ in 0..5 {
        page.pump();
    }
    assert_eq!(page.surface.clears, 1);
    assert_eq!(page.lifecycle.scheduler().requests, requests);

    page.lifecycle.set_paused(PauseReason::Manual, false);
    assert!(page.lifecycle.is_running());
    assert_eq!(page.lifecycle.scheduler().queued.len(), 1);
    page.pump();
    assert_eq!(page.surface.clears, 2);
}

#[test]
fn resume_with_other_reasons_active_stays_stopped() {
    let mut page = Page::new(Viewport::new(1280.0, 720.0));
    page.lifecycle.set_paused(PauseReason::Visibility, true);
    page.lifecycle.set_paused(PauseReason::Manual, true);
    page.lifecycle.set_paused(PauseReason::Manual, false);
    assert!(!page.lifecycle.is_running());
    assert!(page.lifecycle.scheduler().queued.is_empty());

    page.lifecycle.set_paused(PauseReason::Visibility, false);
    assert_eq!(page.lifecycle.scheduler().queued.len(), 1);
}

#[test]
fn resize_rebuilds_without_touching_pause_state() {
    let mut page = Page::new(Viewport::new(1280.0, 720.0));
    page.lifecycle.set_paused(PauseReason::LowPower, true);
    let before = page.engine.population().len();
    page.engine.resize(Viewport::new(1920.0, 1080.0));
    assert!(page.engine.population().len() > before);
    assert!(page.lifecycle.is_paused_by(PauseReason::LowPower));
    assert!(!page.lifecycle.is_running());
}

#[test]
fn every_particle_stays_linked_while_running() {
    let mut page = Page::new(Viewport::new(1440.0, 900.0));
    for _ in 0..90 {
        page.pump();
        let pop = page.engine.population();
        let mut degree = vec![0usize; pop.len()];
        for link in page.engine.links() {
            degree[link.a] += 1;
            degree[link.b] += 1;
        }
        for range in &pop.layers {
            if range.len() > 1 {
                assert!(degree[range.clone()].iter().all(|&d| d > 0));
            }
        }
    }
    assert!(page.surface.lines >= page.engine.links().len());
}

#[test]
fn links_are_stable_for_a_frozen_snapshot() {
    let page = {
        let mut p = Page::new(Viewport::new(1200.0, 800.0));
        p.pump();
        p
    };
    let pop = page.engine.population();
    let again = bgnet_core::discover_links(&pop.particles, &pop.layers, page.engine.config());
    assert_eq!(page.engine.links(), &again[..]);
    assert!(!again.is_empty());
    let floor = page.engine.config().links.min_link_alpha;
    for link in again.iter().filter(|l| l.kind == LinkKind::Fallback) {
        assert!(link.alpha >= floor);
    }
}

#[test]
fn containment_holds_over_many_frames_in_every_mode() {
    let modes = [
        ContainMode::Wrap,
        ContainMode::WrapX,
        ContainMode::Steer,
        ContainMode::Bounce,
    ];
    let mut rng = StdRng::seed_from_u64(2024);
    for mode in modes {
        let mut config = Config::default();
        config.containment.mode = mode;
        config.field.strength = 0.4;
        let mut engine = Engine::new(config, Viewport::new(1024.0, 768.0), rng.gen());
        engine
            .set_custom_percents(&PercentsUpdate {
                x_min: Some(rng.gen_range(0.0..0.5)),
                y_max: Some(rng.gen_range(0.5..1.0)),
                ..Default::default()
            })
            .unwrap();
        let mut t = 0.0;
        for _ in 0..300 {
            t += rng.gen_range(1.0..80.0);
            engine.step(t);
            let r = *engine.region();
            let max = engine.config().field.max_speed;
            for p in &engine.population().particles {
                assert!(r.contains(p.pos.x, p.pos.y), "{mode}: {:?} outside {:?}", p.pos, r);
                assert!(p.vel.length() <= max + 1e-4, "{mode}: speed {}", p.vel.length());
            }
        }
    }
}

#[test]
fn region_modes_switch_through_the_engine() {
    let mut engine = Engine::new(Config::default(), Viewport::new(1000.0, 800.0), 1);
    assert_eq!(engine.region().x_min, 700.0);
    engine.set_region_mode("full".parse().unwrap());
    assert_eq!((engine.region().x_min, engine.region().x_max), (0.0, 1000.0));
    engine.set_region_mode("topRight".parse().unwrap());
    assert_eq!(engine.region().y_max, 360.0);
    assert!("diagonal".parse::<RegionMode>().is_err());
}
