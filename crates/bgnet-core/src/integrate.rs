//! Per-frame motion: flow-field push, damping, speed cap and containment.

use crate::config::{Config, ContainMode, ContainmentConfig, FlowFieldConfig, LayerConfig};
use crate::noise::flow_vec;
use crate::particles::Particle;
use crate::region::Region;
use glam::Vec2;
use rand::Rng;

/// Longest step a single frame may integrate, in seconds.
pub const MAX_DT_SEC: f32 = 0.033;
/// Step used when there is no usable previous timestamp.
pub const DEFAULT_DT_SEC: f32 = 0.016;

/// Converts animation-frame timestamps into simulation time and clamped steps.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    /// Absolute simulation time in seconds.
    pub time_sec: f64,
}

impl FrameClock {
    /// Advance to `now_ms` and return the elapsed step in seconds.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (((now_ms - last) * 0.001) as f32).min(MAX_DT_SEC),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        self.time_sec = now_ms * 0.001;
        if dt > 0.0 {
            dt
        } else {
            DEFAULT_DT_SEC
        }
    }
}

/// Everything the integrator needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct StepParams<'a> {
    pub field: &'a FlowFieldConfig,
    pub containment: &'a ContainmentConfig,
    pub region: &'a Region,
    pub dt_sec: f32,
    pub time_sec: f64,
}

/// Move one particle by one frame.
pub fn step_particle<R: Rng + ?Sized>(
    p: &mut Particle,
    layer: &LayerConfig,
    depth_speed: f32,
    params: &StepParams<'_>,
    rng: &mut R,
) {
    let field = params.field;
    let flow = flow_vec(
        p.pos.x + p.seed * 13.7,
        p.pos.y - p.seed * 9.1,
        params.time_sec,
        field.scale,
        field.speed * layer.speed,
    );

    if field.jitter > 0.0 {
        p.vel.x += (rng.gen::<f32>() - 0.5) * field.jitter;
        p.vel.y += (rng.gen::<f32>() - 0.5) * field.jitter;
    }

    let frames = params.dt_sec * 60.0;
    let damp = field.damping.powf(frames);
    let gain = field.strength * layer.speed * depth_speed * frames;
    p.vel = p.vel * damp + flow * gain;
    p.vel = cap_speed(p.vel, field.max_speed);

    p.pos += p.vel;

    if params.containment.enabled {
        contain(p, params.region, params.containment);
        // Steering nudges velocity after the cap.
        p.vel = cap_speed(p.vel, field.max_speed);
    }
}

/// Rescale `vel` so its magnitude is at most `max`.
#[inline]
pub fn cap_speed(vel: Vec2, max: f32) -> Vec2 {
    let speed = vel.length();
    if speed > max && speed > 0.0 {
        vel * (max / speed)
    } else {
        vel
    }
}

pub fn contain(p: &mut Particle, region: &Region, cfg: &ContainmentConfig) {
    match cfg.mode {
        ContainMode::Wrap => {
            p.pos.x = wrap_axis(p.pos.x, region.x_min, region.x_max);
            p.pos.y = wrap_axis(p.pos.y, region.y_min, region.y_max);
        }
        ContainMode::WrapX => {
            p.pos.x = wrap_axis(p.pos.x, region.x_min, region.x_max);
            p.pos.y = p.pos.y.clamp(region.y_min, region.y_max);
        }
        ContainMode::Steer => steer(p, region, cfg.wall_margin, cfg.wall_force),
        ContainMode::Bounce => bounce(p, region),
    }
}

/// Crossing one edge re-enters one pixel inside the opposite edge.
#[inline]
fn wrap_axis(v: f32, min: f32, max: f32) -> f32 {
    let wrapped = if v < min {
        max - 1.0
    } else if v > max {
        min + 1.0
    } else {
        return v;
    };
    wrapped.clamp(min, max)
}

fn steer(p: &mut Particle, region: &Region, margin: f32, force: f32) {
    if p.pos.x < region.x_min + margin {
        p.vel.x += force;
    }
    if p.pos.x > region.x_max - margin {
        p.vel.x -= force;
    }
    if p.pos.y < region.y_min + margin {
        p.vel.y += force;
    }
    if p.pos.y > region.y_max - margin {
        p.vel.y -= force;
    }
    p.pos.x = p.pos.x.clamp(region.x_min, region.x_max);
    p.pos.y = p.pos.y.clamp(region.y_min, region.y_max);
}

fn bounce(p: &mut Particle, region: &Region) {
    if p.pos.x < region.x_min || p.pos.x > region.x_max {
        p.pos.x = p.pos.x.clamp(region.x_min, region.x_max);
        p.vel.x = -p.vel.x;
    }
    if p.pos.y < region.y_min || p.pos.y > region.y_max {
        p.pos.y = p.pos.y.clamp(region.y_min, region.y_max);
        p.vel.y = -p.vel.y;
    }
}

/// Integrate every particle of the population for one frame.
pub fn step_all<R: Rng + ?Sized>(
    particles: &mut [Particle],
    config: &Config,
    region: &Region,
    dt_sec: f32,
    time_sec: f64,
    rng: &mut R,
) {
    let params = StepParams {
        field: &config.field,
        containment: &config.containment,
        region,
        dt_sec,
        time_sec,
    };
    for p in particles.iter_mut() {
        let Some(layer) = config.layers.get(p.layer) else {
            continue;
        };
        let depth_speed = config.depth.speed_factor(p.z);
        step_particle(p, layer, depth_speed, &params, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MODES: [ContainMode; 4] = [
        ContainMode::Wrap,
        ContainMode::WrapX,
        ContainMode::Steer,
        ContainMode::Bounce,
    ];

    fn particle(pos: Vec2, vel: Vec2) -> Particle {
        Particle {
            layer: 0,
            pos,
            vel,
            z: 0.5,
            r0: 2.0,
            seed: 123.0,
        }
    }

    #[test]
    fn clock_defaults_then_clamps() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(1000.0), DEFAULT_DT_SEC);
        assert!((clock.tick(1010.0) - 0.010).abs() < 1e-6);
        // Long pause (tab switch) is capped.
        assert_eq!(clock.tick(9000.0), MAX_DT_SEC);
        // Duplicate or backwards timestamps fall back to the default step.
        assert_eq!(clock.tick(9000.0), DEFAULT_DT_SEC);
        assert_eq!(clock.tick(8000.0), DEFAULT_DT_SEC);
        assert!((clock.time_sec - 8.0).abs() < 1e-9);
    }

    #[test]
    fn speed_cap_preserves_direction() {
        let v = cap_speed(Vec2::new(3.0, 4.0), 1.0);
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x / v.y - 0.75).abs() < 1e-6);
        assert_eq!(cap_speed(Vec2::new(0.1, 0.0), 1.0), Vec2::new(0.1, 0.0));
    }

    #[test]
    fn containment_holds_for_arbitrary_states() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut config = Config::default();
        config.field.strength = 0.4;
        let regions = [
            Region {
                x_min: 700.0,
                x_max: 1000.0,
                y_min: 0.0,
                y_max: 800.0,
            },
            Region {
                x_min: 10.0,
                x_max: 11.0,
                y_min: 5.0,
                y_max: 5.0,
            },
        ];
        for mode in MODES {
            config.containment.mode = mode;
            for region in &regions {
                let mut particles: Vec<Particle> = (0..200)
                    .map(|_| {
                        let x = rng.gen_range(-2000.0..3000.0);
                        let y = rng.gen_range(-2000.0..3000.0);
                        let vx = rng.gen_range(-50.0..50.0);
                        let vy = rng.gen_range(-50.0..50.0);
                        particle(Vec2::new(x, y), Vec2::new(vx, vy))
                    })
                    .collect();
                for frame in 0..60 {
                    let t = frame as f64 * 0.016;
                    step_all(&mut particles, &config, region, 0.016, t, &mut rng);
                    for p in &particles {
                        assert!(
                            region.contains(p.pos.x, p.pos.y),
                            "{mode} left region: {:?} in {:?}",
                            p.pos,
                            region
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn velocity_never_exceeds_max_speed() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut config = Config::default();
        config.field.strength = 5.0;
        config.field.jitter = 0.5;
        config.containment.mode = ContainMode::Wrap;
        let region = Region {
            x_min: 0.0,
            x_max: 500.0,
            y_min: 0.0,
            y_max: 500.0,
        };
        let mut particles: Vec<Particle> = (0..100)
            .map(|i| particle(Vec2::splat(i as f32 * 5.0), Vec2::new(40.0, -40.0)))
            .collect();
        for frame in 0..30 {
            let t = frame as f64 * 0.033;
            step_all(&mut particles, &config, &region, 0.033, t, &mut rng);
            for p in &particles {
                assert!(p.vel.length() <= config.field.max_speed + 1e-4);
            }
        }
    }

    #[test]
    fn wrap_re_enters_at_opposite_edge() {
        let region = Region {
            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 50.0,
        };
        let cfg = ContainmentConfig {
            enabled: true,
            mode: ContainMode::Wrap,
            wall_margin: 10.0,
            wall_force: 0.1,
        };
        let mut p = particle(Vec2::new(-0.5, 51.0), Vec2::ZERO);
        contain(&mut p, &region, &cfg);
        assert_eq!(p.pos, Vec2::new(99.0, 1.0));

        let cfg = ContainmentConfig {
            mode: ContainMode::WrapX,
            ..cfg
        };
        let mut p = particle(Vec2::new(100.5, -3.0), Vec2::ZERO);
        contain(&mut p, &region, &cfg);
        assert_eq!(p.pos, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn bounce_flips_only_the_violated_axis() {
        let region = Region {
            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 100.0,
        };
        let cfg = ContainmentConfig {
            enabled: true,
            mode: ContainMode::Bounce,
            wall_margin: 0.0,
            wall_force: 0.0,
        };
        let mut p = particle(Vec2::new(101.0, 50.0), Vec2::new(2.0, 1.0));
        contain(&mut p, &region, &cfg);
        assert_eq!(p.pos, Vec2::new(100.0, 50.0));
        assert_eq!(p.vel, Vec2::new(-2.0, 1.0));
    }

    #[test]
    fn steer_nudges_inward_near_edges() {
        let region = Region {
            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 100.0,
        };
        let cfg = ContainmentConfig {
            enabled: true,
            mode: ContainMode::Steer,
            wall_margin: 10.0,
            wall_force: 0.1,
        };
        let mut p = particle(Vec2::new(5.0, 95.0), Vec2::ZERO);
        contain(&mut p, &region, &cfg);
        assert!(p.vel.x > 0.0 && p.vel.y < 0.0);
        let mut mid = particle(Vec2::new(50.0, 50.0), Vec2::ZERO);
        contain(&mut mid, &region, &cfg);
        assert_eq!(mid.vel, Vec2::ZERO);
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let mut config = Config::default();
        config.field.strength = 0.0;
        config.field.jitter = 0.0;
        config.containment.enabled = false;
        let region = Region::default();
        let mut rng = StdRng::seed_from_u64(0);

        let mut a = vec![particle(Vec2::ZERO, Vec2::new(0.5, 0.0))];
        let mut b = a.clone();
        step_all(&mut a, &config, &region, 0.032, 0.0, &mut rng);
        step_all(&mut b, &config, &region, 0.016, 0.0, &mut rng);
        step_all(&mut b, &config, &region, 0.016, 0.0, &mut rng);
        let expected = 0.5 * config.field.damping.powf(0.032 * 60.0);
        assert!((a[0].vel.x - expected).abs() < 1e-6);
        let two_steps = 0.5 * config.field.damping.powf(0.016 * 60.0 * 2.0);
        assert!((b[0].vel.x - two_steps).abs() < 1e-6);
    }
}
