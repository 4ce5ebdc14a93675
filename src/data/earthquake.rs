use crate::{
    core::geo::LatLng,
    data::geojson::{GeoJsonFeature, GeoJsonGeometry},
    layers::vector::VectorFeature,
    style::{earthquake_style, DepthScale},
    ui::popup::PopupContent,
};

/// One event from the USGS summary feed
#[derive(Debug, Clone, PartialEq)]
pub struct Earthquake {
    pub id: Option<String>,
    pub location: LatLng,
    /// Hypocenter depth in kilometers (third ordinate); may be negative
    pub depth_km: f64,
    pub magnitude: Option<f64>,
    pub place: Option<String>,
}

impl Earthquake {
    /// Reads an event from a Point feature. Other geometries, and points
    /// with fewer than two ordinates, yield `None`. A missing depth
    /// ordinate reads as 0 km.
    pub fn from_feature(feature: &GeoJsonFeature) -> Option<Self> {
        let coordinates = match feature.geometry.as_ref()? {
            GeoJsonGeometry::Point { coordinates } => coordinates,
            _ => return None,
        };
        let location = LatLng::from_position(coordinates)?;

        Some(Self {
            id: feature.id_string(),
            location,
            depth_km: coordinates.get(2).copied().unwrap_or(0.0),
            magnitude: feature.number_property("mag"),
            place: feature.string_property("place").map(str::to_owned),
        })
    }

    /// Circle marker styled by depth and magnitude, with its popup attached
    pub fn to_marker(&self, scale: &DepthScale) -> VectorFeature {
        VectorFeature::CircleMarker {
            position: self.location,
            style: earthquake_style(scale, self.depth_km, self.magnitude),
            popup: Some(PopupContent::for_earthquake(self)),
        }
    }
}
