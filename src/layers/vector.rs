use crate::{
    core::geo::{LatLng, LatLngBounds},
    ui::popup::PopupContent,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "egui")]
use egui::Color32;

/// Serializable RGBA color, convertible to `egui::Color32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(MapError::Parse(format!("invalid hex color '{}'", hex)));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| MapError::Parse(format!("invalid hex color '{}': {}", hex, e)))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Formats as lowercase `#rrggbb`, ignoring alpha
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Same color with alpha scaled by `opacity` (0.0 to 1.0)
    pub fn with_opacity(&self, opacity: f32) -> Self {
        let alpha = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self::new(self.r, self.g, self.b, alpha)
    }
}

#[cfg(feature = "egui")]
impl From<Color> for Color32 {
    fn from(color: Color) -> Self {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

/// Style for circle markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleStyle {
    pub fill_color: Color,
    pub fill_opacity: f32,
    pub stroke_color: Color,
    pub stroke_opacity: f32,
    /// Stroke width in pixels
    pub stroke_weight: f32,
    /// Radius in pixels
    pub radius: f64,
}

/// Style for polylines and polygon outlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: Color,
    /// Stroke width in pixels
    pub weight: f32,
    pub opacity: f32,
    /// Fill opacity for closed shapes
    pub fill_opacity: f32,
}

/// Drawable overlay features
#[derive(Debug, Clone, PartialEq)]
pub enum VectorFeature {
    /// A circle with a pixel radius, optionally carrying popup content
    CircleMarker {
        position: LatLng,
        style: CircleStyle,
        popup: Option<PopupContent>,
    },
    /// An open line string
    Polyline { points: Vec<LatLng>, style: PathStyle },
    /// A polygon: exterior ring first, then holes
    Polygon {
        rings: Vec<Vec<LatLng>>,
        style: PathStyle,
    },
}

impl VectorFeature {
    /// Geographic extent of the feature, `None` for empty geometry
    pub fn bounds(&self) -> Option<LatLngBounds> {
        match self {
            VectorFeature::CircleMarker { position, .. } => {
                Some(LatLngBounds::new(*position, *position))
            }
            VectorFeature::Polyline { points, .. } => LatLngBounds::from_points(points),
            VectorFeature::Polygon { rings, .. } => rings
                .first()
                .and_then(|exterior| LatLngBounds::from_points(exterior)),
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, VectorFeature::CircleMarker { .. })
    }

    pub fn popup(&self) -> Option<&PopupContent> {
        match self {
            VectorFeature::CircleMarker { popup, .. } => popup.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let color = Color::from_hex("#fc9d03").unwrap();
        assert_eq!(color, Color::rgb(0xfc, 0x9d, 0x03));
        assert_eq!(color.to_hex(), "#fc9d03");
        assert_eq!(Color::from_hex("000000").unwrap(), Color::BLACK);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
        assert!(Color::from_hex("blue").is_err());
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(Color::WHITE.with_opacity(0.5).a, 128);
        assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
    }

    #[test]
    fn test_feature_bounds() {
        let style = crate::style::plate_style();
        let line = VectorFeature::Polyline {
            points: vec![LatLng::new(1.0, 2.0), LatLng::new(-3.0, 8.0)],
            style: style.clone(),
        };
        let bounds = line.bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(-3.0, 2.0));
        assert_eq!(bounds.north_east, LatLng::new(1.0, 8.0));

        let empty = VectorFeature::Polygon { rings: vec![], style };
        assert!(empty.bounds().is_none());
        assert!(!empty.is_marker());
    }
}
