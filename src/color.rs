//! Deterministic colour assignment for categorical labels and numeric scores.
//!
//! Categorical mapping walks its input once and hands out palette entries in
//! first-seen order, wrapping around when the palette runs out. Continuous
//! scales interpolate linearly between three stops over the numeric domain of
//! a single view; the domain is computed per call, never shared globally.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ShelfError;

/// An opaque sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Build a colour from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| -> u8 {
            let value = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            value.round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ShelfError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid =
            || ShelfError::Configuration(format!("invalid colour '{raw}': expected #RRGGBB"));
        let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Color {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Non-empty, ordered colour list drawn from cyclically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette; fails when `colors` is empty.
    pub fn new(colors: Vec<Color>) -> Result<Self, ShelfError> {
        if colors.is_empty() {
            return Err(ShelfError::Configuration(
                "palette must contain at least one colour".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Parse a palette from `#RRGGBB` strings.
    pub fn from_hex<'a>(values: impl IntoIterator<Item = &'a str>) -> Result<Self, ShelfError> {
        let colors = values
            .into_iter()
            .map(Color::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Colour for `position`, wrapping past the end of the palette.
    pub fn color_at(&self, position: usize) -> Color {
        self.colors[position % self.colors.len()]
    }

    /// Number of distinct colours before wrap-around.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when the palette holds no colours (never, once constructed).
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colours in palette order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = ShelfError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

/// Label-to-colour mapping in first-seen order.
pub type CategoricalColors = IndexMap<String, Color>;

/// Assign palette colours to distinct `values` in first-seen order.
///
/// The i-th distinct value receives `palette.color_at(i)`; identical input
/// sequences always produce identical mappings.
pub fn assign_categorical<I, S>(values: I, palette: &Palette) -> CategoricalColors
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut mapping = CategoricalColors::new();
    for value in values {
        let value = value.as_ref();
        if !mapping.contains_key(value) {
            let color = palette.color_at(mapping.len());
            mapping.insert(value.to_string(), color);
        }
    }
    mapping
}

/// Colours anchoring a three-stop continuous scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleStops {
    pub low: Color,
    pub mid: Color,
    pub high: Color,
}

/// Three-stop linear colour scale over `[min, max]` with a midpoint stop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ContinuousScale {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
    pub stops: ScaleStops,
}

impl ContinuousScale {
    /// Build a scale with explicit domain stops.
    pub fn new(min: f64, mid: f64, max: f64, stops: ScaleStops) -> Self {
        Self {
            min,
            mid,
            max,
            stops,
        }
    }

    /// Build a scale spanning the observed `values`, with the midpoint halfway.
    ///
    /// Returns `None` when no finite value is present.
    pub fn over_values(values: impl IntoIterator<Item = f64>, stops: ScaleStops) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, value| match acc {
                None => Some((value, value)),
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
            })?;
        Some(Self::new(min, (min + max) / 2.0, max, stops))
    }

    /// Colour for `value`; values outside the domain clamp to the end stops.
    pub fn color_at(&self, value: f64) -> Color {
        if self.min.is_nan() || self.max.is_nan() || self.max <= self.min {
            return self.stops.mid;
        }
        if value <= self.min {
            return self.stops.low;
        }
        if value >= self.max {
            return self.stops.high;
        }
        if value <= self.mid {
            let span = self.mid - self.min;
            let t = if span > 0.0 { (value - self.min) / span } else { 1.0 };
            self.stops.low.lerp(&self.stops.mid, t)
        } else {
            let span = self.max - self.mid;
            let t = if span > 0.0 { (value - self.mid) / span } else { 1.0 };
            self.stops.mid.lerp(&self.stops.high, t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::palette::{CATEGORICAL, SCALE_HIGH, SCALE_LOW, SCALE_MID, STATUS};

    fn stops() -> ScaleStops {
        ScaleStops {
            low: SCALE_LOW.parse().unwrap(),
            mid: SCALE_MID.parse().unwrap(),
            high: SCALE_HIGH.parse().unwrap(),
        }
    }

    #[test]
    fn color_parses_and_renders_hex() {
        let color: Color = "#0a0B0c".parse().unwrap();
        assert_eq!(color, Color::rgb(10, 11, 12));
        assert_eq!(color.to_string(), "#0A0B0C");
        assert!("0A0B0C".parse::<Color>().is_err());
        assert!("#0A0B".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn palette_rejects_empty_and_wraps() {
        assert!(matches!(
            Palette::new(Vec::new()),
            Err(ShelfError::Configuration(_))
        ));
        let palette = Palette::from_hex(STATUS).unwrap();
        assert_eq!(palette.len(), 4);
        assert_eq!(palette.color_at(4), palette.color_at(0));
        assert_eq!(palette.color_at(6), palette.color_at(2));
    }

    #[test]
    fn categorical_assignment_is_deterministic_and_first_seen() {
        let palette = Palette::from_hex(CATEGORICAL).unwrap();
        let first = assign_categorical(["A", "B", "A", "C"], &palette);
        let second = assign_categorical(["A", "B", "A", "C"], &palette);
        assert_eq!(first, second);
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(first["A"], palette.color_at(0));
        assert_eq!(first["B"], palette.color_at(1));
        assert_eq!(first["C"], palette.color_at(2));
    }

    #[test]
    fn categorical_assignment_wraps_small_palettes() {
        let palette = Palette::from_hex(["#000000", "#FFFFFF"]).unwrap();
        let mapping = assign_categorical(["a", "b", "c"], &palette);
        assert_eq!(mapping["c"], mapping["a"]);
    }

    #[test]
    fn continuous_scale_hits_end_stops_at_domain_bounds() {
        let scale = ContinuousScale::over_values((1..=10).map(f64::from), stops()).unwrap();
        assert_eq!(scale.min, 1.0);
        assert_eq!(scale.max, 10.0);
        assert_eq!(scale.color_at(1.0), stops().low);
        assert_eq!(scale.color_at(10.0), stops().high);
        assert_eq!(scale.color_at(5.5), stops().mid);
    }

    #[test]
    fn continuous_scale_interpolates_between_stops() {
        let scale = ContinuousScale::new(0.0, 5.0, 10.0, stops());
        // Halfway between red and white.
        assert_eq!(scale.color_at(2.5), Color::rgb(255, 128, 128));
        // Halfway between white and green (#008000).
        assert_eq!(scale.color_at(7.5), Color::rgb(128, 192, 128));
        assert_eq!(scale.color_at(-3.0), stops().low);
        assert_eq!(scale.color_at(42.0), stops().high);
    }

    #[test]
    fn continuous_scale_degenerate_domain_uses_mid_stop() {
        let scale = ContinuousScale::over_values([7.0, 7.0], stops()).unwrap();
        assert_eq!(scale.color_at(7.0), stops().mid);
        let empty = ContinuousScale::over_values(std::iter::empty(), stops());
        assert!(empty.is_none());
        assert!(ContinuousScale::over_values([f64::NAN], stops()).is_none());
    }

    #[test]
    fn palette_serializes_as_hex_list() {
        let palette = Palette::from_hex(["#FF0000", "#00FF00"]).unwrap();
        let json = serde_json::to_string(&palette).unwrap();
        assert_eq!(json, r##"["#FF0000","#00FF00"]"##);
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, palette);
        assert!(serde_json::from_str::<Palette>("[]").is_err());
    }
}
