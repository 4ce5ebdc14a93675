//! Overlay feeds: fetching GeoJSON and turning it into drawable features.

use crate::{
    constants::PLATE_POINT_RADIUS,
    core::{config::FetchConfig, geo::LatLng},
    data::{
        earthquake::Earthquake,
        geojson::{GeoJson, GeoJsonGeometry, Position},
    },
    layers::vector::{CircleStyle, VectorFeature},
    style::{plate_style, DepthScale},
    MapError, Result,
};
use async_trait::async_trait;

/// Anything that can return the body of a feed URL
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetches feeds over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFeatureSource {
    client: reqwest::Client,
}

impl HttpFeatureSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeatureSource for HttpFeatureSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Fetches and parses one GeoJSON document
pub async fn fetch_collection(source: &dyn FeatureSource, url: &str) -> Result<GeoJson> {
    let body = source.fetch_text(url).await?;
    let doc = GeoJson::parse(&body)?;
    log::debug!("{}: {} features", url, doc.features().len());
    Ok(doc)
}

/// Features produced from a document, plus how many inputs were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub features: Vec<VectorFeature>,
    pub skipped: usize,
}

/// One circle marker per Point feature. Other geometries are skipped.
pub fn render_earthquakes(doc: &GeoJson, scale: &DepthScale) -> Rendered {
    let mut rendered = Rendered::default();

    for feature in doc.features() {
        match Earthquake::from_feature(feature) {
            Some(quake) => {
                if quake.magnitude.is_none() {
                    log::debug!("earthquake {:?} has no magnitude", quake.id);
                }
                rendered.features.push(quake.to_marker(scale));
            }
            None => {
                log::debug!(
                    "skipping earthquake feature {:?} with geometry {:?}",
                    feature.id_string(),
                    feature.geometry.as_ref().map(GeoJsonGeometry::type_name)
                );
                rendered.skipped += 1;
            }
        }
    }

    rendered
}

/// Plate boundaries in the plate style: lines become polylines, polygons
/// stay polygons, points become small circles.
pub fn render_plates(doc: &GeoJson) -> Rendered {
    let mut rendered = Rendered::default();

    match doc {
        GeoJson::Geometry(geometry) => push_geometry(geometry, &mut rendered),
        _ => {
            for feature in doc.features() {
                match &feature.geometry {
                    Some(geometry) => push_geometry(geometry, &mut rendered),
                    None => rendered.skipped += 1,
                }
            }
        }
    }

    if rendered.skipped > 0 {
        log::debug!("plates: skipped {} empty or degenerate geometries", rendered.skipped);
    }
    rendered
}

fn push_geometry(geometry: &GeoJsonGeometry, out: &mut Rendered) {
    match geometry {
        GeoJsonGeometry::Point { coordinates } => push_point(coordinates, out),
        GeoJsonGeometry::MultiPoint { coordinates } => {
            coordinates.iter().for_each(|p| push_point(p, out))
        }
        GeoJsonGeometry::LineString { coordinates } => push_line(coordinates, out),
        GeoJsonGeometry::MultiLineString { coordinates } => {
            coordinates.iter().for_each(|line| push_line(line, out))
        }
        GeoJsonGeometry::Polygon { coordinates } => push_polygon(coordinates, out),
        GeoJsonGeometry::MultiPolygon { coordinates } => {
            coordinates.iter().for_each(|rings| push_polygon(rings, out))
        }
        GeoJsonGeometry::GeometryCollection { geometries } => {
            geometries.iter().for_each(|g| push_geometry(g, out))
        }
    }
}

fn to_lat_lngs(positions: &[Position]) -> Vec<LatLng> {
    positions
        .iter()
        .filter_map(|p| LatLng::from_position(p))
        .collect()
}

fn push_point(position: &[f64], out: &mut Rendered) {
    let Some(position) = LatLng::from_position(position) else {
        out.skipped += 1;
        return;
    };
    let path = plate_style();
    out.features.push(VectorFeature::CircleMarker {
        position,
        style: CircleStyle {
            fill_color: path.color,
            fill_opacity: path.fill_opacity,
            stroke_color: path.color,
            stroke_opacity: path.opacity,
            stroke_weight: path.weight,
            radius: PLATE_POINT_RADIUS,
        },
        popup: None,
    });
}

fn push_line(positions: &[Position], out: &mut Rendered) {
    let points = to_lat_lngs(positions);
    if points.len() < 2 {
        out.skipped += 1;
        return;
    }
    out.features.push(VectorFeature::Polyline {
        points,
        style: plate_style(),
    });
}

fn push_polygon(rings: &[Vec<Position>], out: &mut Rendered) {
    let rings: Vec<Vec<LatLng>> = rings
        .iter()
        .map(|ring| to_lat_lngs(ring))
        .filter(|ring| ring.len() >= 3)
        .collect();
    if rings.is_empty() {
        out.skipped += 1;
        return;
    }
    out.features.push(VectorFeature::Polygon {
        rings,
        style: plate_style(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_earthquake() {
        let doc = GeoJson::parse(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"mag": 4, "place": "Test"},
                 "geometry": {"type": "Point", "coordinates": [-120, 36, 45]}}
            ]}"#,
        )
        .unwrap();
        let rendered = render_earthquakes(&doc, &DepthScale::default());

        assert_eq!(rendered.skipped, 0);
        assert_eq!(rendered.features.len(), 1);
        match &rendered.features[0] {
            VectorFeature::CircleMarker { style, position, .. } => {
                assert_eq!(style.fill_color.to_hex(), "#fce703");
                assert_eq!(style.radius, 12.0);
                assert_eq!(*position, LatLng::new(36.0, -120.0));
            }
            other => panic!("expected a marker, got {:?}", other),
        }
    }

    #[test]
    fn test_earthquakes_skip_non_points() {
        let doc = GeoJson::parse(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}},
                {"type": "Feature", "properties": {"mag": 1.2},
                 "geometry": {"type": "Point", "coordinates": [0, 0, 5]}}
            ]}"#,
        )
        .unwrap();
        let rendered = render_earthquakes(&doc, &DepthScale::default());
        assert_eq!(rendered.features.len(), 1);
        assert_eq!(rendered.skipped, 2);
    }

    #[test]
    fn test_render_plates_geometries() {
        let doc = GeoJson::parse(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"Name": "AF-AN"},
                 "geometry": {"type": "LineString", "coordinates": [[-0.4, -54.8], [-1.5, -54.5]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiLineString", "coordinates": [
                    [[0, 0], [1, 1]], [[2, 2], [3, 3]], [[9, 9]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "GeometryCollection", "geometries": [
                    {"type": "Point", "coordinates": [5, 5]}]}}
            ]}"#,
        )
        .unwrap();
        let rendered = render_plates(&doc);

        let lines = rendered
            .features
            .iter()
            .filter(|f| matches!(f, VectorFeature::Polyline { .. }))
            .count();
        let polygons = rendered
            .features
            .iter()
            .filter(|f| matches!(f, VectorFeature::Polygon { .. }))
            .count();
        assert_eq!(lines, 3);
        assert_eq!(polygons, 1);
        assert_eq!(rendered.features.iter().filter(|f| f.is_marker()).count(), 1);
        // the single-position line
        assert_eq!(rendered.skipped, 1);
    }

    #[test]
    fn test_render_plates_bare_geometry() {
        let doc = GeoJson::parse(r#"{"type": "LineString", "coordinates": [[0, 0], [1, 1]]}"#)
            .unwrap();
        assert_eq!(render_plates(&doc).features.len(), 1);
    }

    #[test]
    fn test_empty_feeds_render_nothing() {
        let doc = GeoJson::parse(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert_eq!(render_plates(&doc), Rendered::default());
        assert_eq!(render_earthquakes(&doc, &DepthScale::default()), Rendered::default());
    }
}
