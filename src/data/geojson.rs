use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A GeoJSON position: `[longitude, latitude]` with optional extra
/// ordinates (the earthquake feed puts depth in kilometers third).
pub type Position = Vec<f64>;

/// GeoJSON geometry objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

impl GeoJsonGeometry {
    /// Name of the geometry type as spelled in GeoJSON
    pub fn type_name(&self) -> &'static str {
        match self {
            GeoJsonGeometry::Point { .. } => "Point",
            GeoJsonGeometry::MultiPoint { .. } => "MultiPoint",
            GeoJsonGeometry::LineString { .. } => "LineString",
            GeoJsonGeometry::MultiLineString { .. } => "MultiLineString",
            GeoJsonGeometry::Polygon { .. } => "Polygon",
            GeoJsonGeometry::MultiPolygon { .. } => "MultiPolygon",
            GeoJsonGeometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, Value>>,
}

impl GeoJsonFeature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// Numeric property; `null`, missing and non-numeric values are `None`
    pub fn number_property(&self, key: &str) -> Option<f64> {
        self.property(key)?.as_f64()
    }

    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.property(key)?.as_str()
    }

    /// Feature id rendered as text (string ids verbatim, numbers formatted)
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// GeoJSON feature collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<GeoJsonFeature>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    FeatureCollection(FeatureCollection),
    Feature(GeoJsonFeature),
    Geometry(GeoJsonGeometry),
}

impl GeoJson {
    /// Parses a document, dispatching on its top-level `type` member
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| MapError::Parse("GeoJSON object has no \"type\" member".into()))?
            .to_owned();

        match kind.as_str() {
            "FeatureCollection" => Ok(GeoJson::FeatureCollection(serde_json::from_value(value)?)),
            "Feature" => Ok(GeoJson::Feature(serde_json::from_value(value)?)),
            "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon"
            | "MultiPolygon" | "GeometryCollection" => {
                Ok(GeoJson::Geometry(serde_json::from_value(value)?))
            }
            other => Err(MapError::Parse(format!("unsupported GeoJSON type '{}'", other))),
        }
    }

    /// Features in document order; a bare geometry has none
    pub fn features(&self) -> &[GeoJsonFeature] {
        match self {
            GeoJson::FeatureCollection(collection) => &collection.features,
            GeoJson::Feature(feature) => std::slice::from_ref(feature),
            GeoJson::Geometry(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features().is_empty()
    }
}

impl FromStr for GeoJson {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<FeatureCollection> for GeoJson {
    fn from(collection: FeatureCollection) -> Self {
        GeoJson::FeatureCollection(collection)
    }
}
