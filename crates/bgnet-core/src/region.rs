//! The rectangle of the viewport particles are confined to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegionError {
    #[error("unknown region mode `{0}` (expected full, right, topRight or custom)")]
    UnknownMode(String),
    #[error("region percentage `{0}` is not a finite number")]
    NotFinite(f64),
    #[error("malformed region percentages: {0}")]
    Malformed(String),
}

/// Viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) as f64 * self.height.max(0.0) as f64
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionMode {
    Full,
    #[default]
    Right,
    TopRight,
    Custom,
}

impl FromStr for RegionMode {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "right" => Ok(Self::Right),
            "topRight" => Ok(Self::TopRight),
            "custom" => Ok(Self::Custom),
            other => Err(RegionError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for RegionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full => "full",
            Self::Right => "right",
            Self::TopRight => "topRight",
            Self::Custom => "custom",
        })
    }
}

/// Region bounds as fractions of the viewport.
///
/// Always clamped to `[0, 1]` with `min <= max` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionPercents {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

pub const FULL_PERCENTS: RegionPercents = RegionPercents::fixed(0.0, 1.0, 0.0, 1.0);
pub const RIGHT_PERCENTS: RegionPercents = RegionPercents::fixed(0.70, 1.0, 0.0, 1.0);
pub const TOP_RIGHT_PERCENTS: RegionPercents = RegionPercents::fixed(0.70, 1.0, 0.0, 0.45);
pub const DEFAULT_CUSTOM_PERCENTS: RegionPercents = RegionPercents::fixed(0.6, 1.0, 0.0, 1.0);

impl Default for RegionPercents {
    fn default() -> Self {
        DEFAULT_CUSTOM_PERCENTS
    }
}

impl RegionPercents {
    const fn fixed(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, RegionError> {
        for v in [x_min, x_max, y_min, y_max] {
            if !v.is_finite() {
                return Err(RegionError::NotFinite(v));
            }
        }
        let unit = |v: f64| v.clamp(0.0, 1.0);
        let (x0, x1) = ordered(unit(x_min), unit(x_max));
        let (y0, y1) = ordered(unit(y_min), unit(y_max));
        Ok(Self::fixed(x0, x1, y0, y1))
    }

    /// Apply a partial update, keeping fields the update leaves out.
    pub fn updated(&self, update: &PercentsUpdate) -> Result<Self, RegionError> {
        Self::new(
            update.x_min.unwrap_or(self.x_min),
            update.x_max.unwrap_or(self.x_max),
            update.y_min.unwrap_or(self.y_min),
            update.y_max.unwrap_or(self.y_max),
        )
    }
}

#[inline]
fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Partial custom-region update; `None` keeps the current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentsUpdate {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
}

impl PercentsUpdate {
    /// Parse `{ xMin, xMax, yMin, yMax }` with any subset of keys present.
    /// Missing or `null` keys keep the current value; unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, RegionError> {
        serde_json::from_str(json).map_err(|e| RegionError::Malformed(e.to_string()))
    }
}

/// Axis-aligned region in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Region {
    pub fn compute(viewport: Viewport, mode: RegionMode, custom: &RegionPercents) -> Self {
        let pct = match mode {
            RegionMode::Full => &FULL_PERCENTS,
            RegionMode::Right => &RIGHT_PERCENTS,
            RegionMode::TopRight => &TOP_RIGHT_PERCENTS,
            RegionMode::Custom => custom,
        };
        let w = viewport.width.max(0.0) as f64;
        let h = viewport.height.max(0.0) as f64;
        let px = |extent: f64, pct: f64| (extent * pct).floor() as f32;
        Self {
            x_min: px(w, pct.x_min),
            x_max: px(w, pct.x_max),
            y_min: px(h, pct.y_min),
            y_max: px(h, pct.y_max),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [RegionMode; 4] = [
        RegionMode::Full,
        RegionMode::Right,
        RegionMode::TopRight,
        RegionMode::Custom,
    ];

    #[test]
    fn right_mode_on_1000_by_800() {
        let r = Region::compute(
            Viewport::new(1000.0, 800.0),
            RegionMode::Right,
            &RegionPercents::default(),
        );
        assert_eq!(
            r,
            Region {
                x_min: 700.0,
                x_max: 1000.0,
                y_min: 0.0,
                y_max: 800.0
            }
        );
    }

    #[test]
    fn top_right_uses_upper_band() {
        let r = Region::compute(
            Viewport::new(1280.0, 720.0),
            RegionMode::TopRight,
            &RegionPercents::default(),
        );
        assert_eq!((r.x_min, r.x_max), (896.0, 1280.0));
        assert_eq!((r.y_min, r.y_max), (0.0, 324.0));
    }

    #[test]
    fn bounds_hold_for_all_modes_and_sizes() {
        let customs = [
            RegionPercents::default(),
            RegionPercents::new(0.9, 0.1, 1.5, -3.0).unwrap(),
            RegionPercents::new(0.5, 0.5, 0.0, 0.0).unwrap(),
        ];
        for w in [0.0, 1.0, 3.0, 320.0, 1000.0, 2560.0, 7681.0] {
            for h in [0.0, 1.0, 480.0, 800.0, 1441.0] {
                for mode in MODES {
                    for custom in &customs {
                        let r = Region::compute(Viewport::new(w, h), mode, custom);
                        assert!(0.0 <= r.x_min && r.x_min <= r.x_max && r.x_max <= w);
                        assert!(0.0 <= r.y_min && r.y_min <= r.y_max && r.y_max <= h);
                    }
                }
            }
        }
    }

    #[test]
    fn percents_are_clamped_and_ordered() {
        let p = RegionPercents::new(0.8, 0.2, -1.0, 2.0).unwrap();
        assert_eq!((p.x_min, p.x_max, p.y_min, p.y_max), (0.2, 0.8, 0.0, 1.0));
        assert!(matches!(
            RegionPercents::new(f64::NAN, 1.0, 0.0, 1.0),
            Err(RegionError::NotFinite(v)) if v.is_nan()
        ));
    }

    #[test]
    fn partial_updates_keep_untouched_fields() {
        let base = RegionPercents::default();
        let next = base
            .updated(&PercentsUpdate {
                x_min: Some(0.25),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(next.x_min, 0.25);
        assert_eq!(next.x_max, base.x_max);
        assert_eq!(next.y_max, base.y_max);
        assert!(base
            .updated(&PercentsUpdate {
                y_max: Some(f64::INFINITY),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn percents_update_parses_partial_objects() {
        let update = PercentsUpdate::from_json(r#"{"xMin":0.5}"#).unwrap();
        assert_eq!(
            update,
            PercentsUpdate {
                x_min: Some(0.5),
                ..Default::default()
            }
        );
        let update = PercentsUpdate::from_json(r#"{"yMax":0.4,"xMax":null,"extra":1}"#).unwrap();
        assert_eq!(update.y_max, Some(0.4));
        assert_eq!(update.x_max, None);
        assert_eq!(PercentsUpdate::from_json("{}").unwrap(), PercentsUpdate::default());

        let next = RegionPercents::default().updated(&update).unwrap();
        assert_eq!(next.y_max, 0.4);
        assert_eq!(next.x_min, RegionPercents::default().x_min);
    }

    #[test]
    fn percents_update_rejects_non_objects() {
        for bad in ["0.5", "null", r#"{"xMin":"left"}"#, "{", ""] {
            assert!(
                matches!(PercentsUpdate::from_json(bad), Err(RegionError::Malformed(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in MODES {
            assert_eq!(mode.to_string().parse::<RegionMode>(), Ok(mode));
        }
        assert!("left".parse::<RegionMode>().is_err());
    }
}
