//! Depth/magnitude symbology for earthquake markers and the plate overlay.
//!
//! A single ordered bucket table drives both marker colors and legend rows.

use crate::{
    layers::vector::{CircleStyle, Color, PathStyle},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// A depth tier: depths strictly greater than `lower_km` (and not above the
/// next tier's bound) are drawn in `color`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBucket {
    pub lower_km: f64,
    pub color: Color,
}

impl DepthBucket {
    pub const fn new(lower_km: f64, color: Color) -> Self {
        Self { lower_km, color }
    }
}

/// Depth tiers in ascending order. The first bound is only shown in the
/// legend; the first tier also takes every depth at or below 10 km.
pub const DEPTH_BUCKETS: [DepthBucket; 6] = [
    DepthBucket::new(-10.0, Color::rgb(0x03, 0xfc, 0x62)),
    DepthBucket::new(10.0, Color::rgb(0xa1, 0xfc, 0x03)),
    DepthBucket::new(30.0, Color::rgb(0xfc, 0xe7, 0x03)),
    DepthBucket::new(50.0, Color::rgb(0xfc, 0x9d, 0x03)),
    DepthBucket::new(70.0, Color::rgb(0xfc, 0x6f, 0x03)),
    DepthBucket::new(90.0, Color::rgb(0xfc, 0x03, 0x03)),
];

/// Marker radius for a magnitude of exactly zero.
pub const MIN_RADIUS: f64 = 1.0;

/// Pixels of radius per unit of magnitude.
pub const RADIUS_PER_MAGNITUDE: f64 = 3.0;

/// Validated, ordered depth tiers
#[derive(Debug, Clone, PartialEq)]
pub struct DepthScale {
    buckets: Vec<DepthBucket>,
}

impl DepthScale {
    /// Builds a scale, rejecting empty tables and bounds that are not
    /// strictly increasing or not finite.
    pub fn new(buckets: Vec<DepthBucket>) -> Result<Self> {
        if buckets.is_empty() {
            return Err(MapError::Parse("depth scale needs at least one bucket".into()));
        }
        if let Some(bad) = buckets.iter().find(|b| !b.lower_km.is_finite()) {
            return Err(MapError::Parse(format!(
                "depth bucket bound {} is not finite",
                bad.lower_km
            )));
        }
        if let Some(pair) = buckets
            .windows(2)
            .find(|pair| pair[0].lower_km >= pair[1].lower_km)
        {
            return Err(MapError::Parse(format!(
                "depth buckets out of order: {} then {}",
                pair[0].lower_km, pair[1].lower_km
            )));
        }
        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[DepthBucket] {
        &self.buckets
    }

    /// Index of the tier for `depth`: the highest bucket (above the first)
    /// whose bound the depth strictly exceeds, otherwise the first.
    pub fn bucket_index(&self, depth: f64) -> usize {
        tier_index(&self.buckets, depth)
    }

    pub fn color_for(&self, depth: f64) -> Color {
        self.buckets[self.bucket_index(depth)].color
    }
}

impl Default for DepthScale {
    fn default() -> Self {
        Self {
            buckets: DEPTH_BUCKETS.to_vec(),
        }
    }
}

/// Fill color for a depth in kilometers using [`DEPTH_BUCKETS`]
pub fn depth_color(depth: f64) -> Color {
    DEPTH_BUCKETS[tier_index(&DEPTH_BUCKETS, depth)].color
}

// Strict "greater than" ladder scanned from the deepest tier down.
fn tier_index(buckets: &[DepthBucket], depth: f64) -> usize {
    (1..buckets.len())
        .rev()
        .find(|&i| depth > buckets[i].lower_km)
        .unwrap_or(0)
}

/// Marker radius for a magnitude. Zero maps to [`MIN_RADIUS`]; everything
/// else, negative values included, scales linearly.
pub fn magnitude_radius(magnitude: f64) -> f64 {
    if magnitude == 0.0 {
        MIN_RADIUS
    } else {
        magnitude * RADIUS_PER_MAGNITUDE
    }
}

/// Full marker style for an earthquake. A missing magnitude is drawn at
/// [`MIN_RADIUS`].
pub fn earthquake_style(scale: &DepthScale, depth: f64, magnitude: Option<f64>) -> CircleStyle {
    CircleStyle {
        fill_color: scale.color_for(depth),
        fill_opacity: 0.5,
        stroke_color: Color::BLACK,
        stroke_opacity: 1.0,
        stroke_weight: 0.5,
        radius: magnitude.map_or(MIN_RADIUS, magnitude_radius),
    }
}

/// Static style for plate boundaries
pub fn plate_style() -> PathStyle {
    PathStyle {
        color: Color::rgb(0x00, 0x00, 0xff),
        weight: 1.0,
        opacity: 1.0,
        fill_opacity: 0.2,
    }
}
