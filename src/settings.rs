//! Flag settings as supplied by the host application.
//!
//! Parsing is forgiving: malformed values degrade to the nearest valid
//! setting instead of failing, and loosely typed inputs (a single edge name
//! or a list, numbers written as strings) are normalized here so the core
//! only ever sees [`EdgeSet`], `f64` and `usize`.
//!
//! ```
//! use pennant::settings::{Dimension, FlagConfig};
//! use pennant::pin::Edge;
//!
//! let config: FlagConfig = serde_json::from_str(
//!     r#"{ "width": "auto", "height": 1.5, "pin": { "edges": "top", "spacing": 2 } }"#,
//! ).unwrap();
//! assert_eq!(config.width, Dimension::Auto);
//! assert!(config.pin.edges.unwrap().contains(Edge::Top));
//! ```

use crate::cloth::{DEFAULT_AREAL_DENSITY, DEFAULT_HEIGHT, DEFAULT_REST_DISTANCE, DEFAULT_WIDTH};
use crate::float::Float;
use crate::flag::{Hoisting, Orientation};
use crate::pin::{Edge, EdgeSet};
use alloc::string::String;
use alloc::vec::Vec as AllocVec;
use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;
use tracing::warn;

/// Largest side of a flag whose size is derived from its picture.
pub const MAX_AUTO_EXTENT: f64 = 3.0;

/// Anything a host might send where a number is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl NumberLike {
    fn value(&self) -> Option<f64> {
        match self {
            NumberLike::Number(v) => Some(*v),
            NumberLike::Text(s) => s.trim().parse::<f64>().ok(),
            NumberLike::Other(_) => None,
        }
    }

    fn positive(&self) -> Option<f64> {
        self.value().filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// Anything a host might send where a name is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum NameLike {
    Name(String),
    Other(IgnoredAny),
}

impl NameLike {
    fn name(&self) -> Option<&str> {
        match self {
            NameLike::Name(s) => Some(s.as_str()),
            NameLike::Other(_) => None,
        }
    }
}

/// A physical extent, or `auto` to derive it from the picture.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Dimension {
    #[default]
    Auto,
    Value(f64),
}

impl Dimension {
    /// Parse `"auto"` or a positive number. Anything else is `Auto`.
    pub fn parse(text: &str) -> Dimension {
        let text = text.trim();
        if text.eq_ignore_ascii_case("auto") {
            return Dimension::Auto;
        }
        match text.parse::<f64>() {
            Ok(v) => Dimension::from_value(v),
            Err(_) => {
                warn!(text, "non-numeric flag size, using auto");
                Dimension::Auto
            }
        }
    }

    pub fn from_value(value: f64) -> Dimension {
        if value.is_finite() && value > 0.0 {
            Dimension::Value(value)
        } else {
            warn!(value, "flag size must be positive, using auto");
            Dimension::Auto
        }
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match NumberLike::deserialize(deserializer)? {
            NumberLike::Number(v) => Dimension::from_value(v),
            NumberLike::Text(s) => Dimension::parse(&s),
            NumberLike::Other(_) => Dimension::Auto,
        })
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = NameLike::deserialize(deserializer)?;
        Ok(raw.name().and_then(Orientation::from_name).unwrap_or_else(|| {
            warn!("unknown orientation, using horizontal");
            Orientation::default()
        }))
    }
}

impl<'de> Deserialize<'de> for Hoisting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = NameLike::deserialize(deserializer)?;
        Ok(raw.name().and_then(Hoisting::from_name).unwrap_or_else(|| {
            warn!("unknown hoisting, using dexter");
            Hoisting::default()
        }))
    }
}

impl<'de> Deserialize<'de> for EdgeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(AllocVec<NameLike>),
            Other(IgnoredAny),
        }

        let names: AllocVec<NameLike> = match Raw::deserialize(deserializer)? {
            Raw::One(name) => alloc::vec![NameLike::Name(name)],
            Raw::Many(names) => names,
            Raw::Other(_) => AllocVec::new(),
        };
        let mut set = EdgeSet::empty();
        for name in names.iter().filter_map(NameLike::name) {
            match Edge::from_name(name) {
                Some(edge) => set.insert(edge),
                None => warn!(name, "ignoring unknown pin edge"),
            }
        }
        Ok(set)
    }
}

fn spacing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let raw = NumberLike::deserialize(deserializer)?;
    Ok(match raw.value() {
        Some(v) if v >= 1.0 && v.is_finite() && v == libm::floor(v) => v as usize,
        _ => {
            warn!("pin spacing must be a positive integer, using 1");
            1
        }
    })
}

fn areal_density<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(NumberLike::deserialize(deserializer)?.positive().unwrap_or_else(|| {
        warn!("invalid flag mass, using default");
        DEFAULT_AREAL_DENSITY
    }))
}

fn rest_distance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(NumberLike::deserialize(deserializer)?.positive().unwrap_or_else(|| {
        warn!("invalid rest distance, using default");
        DEFAULT_REST_DISTANCE
    }))
}

fn wind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<[f64; 3]>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Vector([f64; 3]),
        Other(IgnoredAny),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Vector(v) if v.iter().all(|c| c.is_finite()) => Some(v),
        _ => {
            warn!("wind must be three finite numbers, ignoring");
            None
        }
    })
}

/// Which particles are anchored.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinSettings {
    /// `None` means the hoist edge of the chosen orientation.
    pub edges: Option<EdgeSet>,
    #[serde(deserialize_with = "spacing")]
    pub spacing: usize,
}

impl Default for PinSettings {
    fn default() -> Self {
        PinSettings { edges: None, spacing: 1 }
    }
}

/// Construction parameters for a flag.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlagConfig {
    pub width: Dimension,
    pub height: Dimension,
    /// Areal density in kg/m².
    #[serde(deserialize_with = "areal_density")]
    pub mass: f64,
    #[serde(deserialize_with = "rest_distance")]
    pub rest_distance: f64,
    pub orientation: Orientation,
    pub hoisting: Hoisting,
    pub pin: PinSettings,
    /// Ambient wind velocity.
    #[serde(deserialize_with = "wind")]
    pub wind: Option<[f64; 3]>,
}

impl Default for FlagConfig {
    fn default() -> Self {
        FlagConfig {
            width: Dimension::Auto,
            height: Dimension::Auto,
            mass: DEFAULT_AREAL_DENSITY,
            rest_distance: DEFAULT_REST_DISTANCE,
            orientation: Orientation::default(),
            hoisting: Hoisting::default(),
            pin: PinSettings::default(),
            wind: None,
        }
    }
}

/// Pixel size of the picture shown on the flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AssetSize {
    pub width: u32,
    pub height: u32,
}

impl AssetSize {
    pub fn new(width: u32, height: u32) -> Self {
        AssetSize { width, height }
    }

    /// Width over height, or `None` for an empty picture.
    pub fn aspect(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

impl FlagConfig {
    /// Physical `(width, height)`.
    ///
    /// Explicit values are used as given. An `auto` side follows the
    /// picture's aspect ratio (3:2 without a picture) and is capped at
    /// [`MAX_AUTO_EXTENT`]; when both sides are `auto` the flag starts from
    /// the default height and is scaled down as a whole if needed.
    pub fn resolve_dimensions(&self, asset: Option<AssetSize>) -> (f64, f64) {
        let aspect = asset
            .and_then(|a| a.aspect())
            .unwrap_or(DEFAULT_WIDTH / DEFAULT_HEIGHT);
        match (self.width, self.height) {
            (Dimension::Value(w), Dimension::Value(h)) => (w, h),
            (Dimension::Value(w), Dimension::Auto) => (w, Float::min(w / aspect, MAX_AUTO_EXTENT)),
            (Dimension::Auto, Dimension::Value(h)) => (Float::min(h * aspect, MAX_AUTO_EXTENT), h),
            (Dimension::Auto, Dimension::Auto) => {
                let (w, h) = (DEFAULT_HEIGHT * aspect, DEFAULT_HEIGHT);
                let largest = Float::max(w, h);
                if largest > MAX_AUTO_EXTENT {
                    let scale = MAX_AUTO_EXTENT / largest;
                    (w * scale, h * scale)
                } else {
                    (w, h)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_parsing() {
        assert_eq!(Dimension::parse("auto"), Dimension::Auto);
        assert_eq!(Dimension::parse(" 1.5 "), Dimension::Value(1.5));
        assert_eq!(Dimension::parse("wide"), Dimension::Auto);
        assert_eq!(Dimension::from_value(-2.0), Dimension::Auto);
    }

    #[test]
    fn default_dimensions_without_asset() {
        let (w, h) = FlagConfig::default().resolve_dimensions(None);
        assert!((w - DEFAULT_WIDTH).abs() < 1e-12);
        assert!((h - DEFAULT_HEIGHT).abs() < 1e-12);
    }

    #[test]
    fn wide_asset_is_capped() {
        let (w, h) = FlagConfig::default().resolve_dimensions(Some(AssetSize::new(1000, 100)));
        assert!((w - MAX_AUTO_EXTENT).abs() < 1e-12);
        assert!((h - 0.3).abs() < 1e-12);
    }

    #[test]
    fn empty_asset_falls_back_to_default_aspect() {
        assert_eq!(AssetSize::new(0, 10).aspect(), None);
        let config = FlagConfig { width: Dimension::Value(3.0), ..FlagConfig::default() };
        let (_, h) = config.resolve_dimensions(Some(AssetSize::new(0, 10)));
        assert!((h - 2.0).abs() < 1e-12);
    }
}
