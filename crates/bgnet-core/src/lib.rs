pub mod color;
pub mod config;
pub mod engine;
pub mod integrate;
pub mod lifecycle;
pub mod links;
pub mod noise;
pub mod particles;
pub mod presets;
pub mod region;
pub mod render;

pub use color::{ColorError, Rgba};
pub use config::*;
pub use engine::{Engine, Pointer};
pub use lifecycle::{FrameScheduler, Lifecycle, PauseReason};
pub use links::{discover_links, Link, LinkKind};
pub use particles::{Particle, Population};
pub use presets::{adapt, surface_scale, Environment, ThemeColors};
pub use region::{PercentsUpdate, Region, RegionError, RegionMode, RegionPercents, Viewport};
pub use render::{Composite, LinearGradient, Paint, RadialGradient, Surface};
