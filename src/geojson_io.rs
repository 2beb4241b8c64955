//! GeoJSON boundary adapter: lineal features in, polygon features out.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use geo_types::Polygon;
use std::convert::TryInto;

use crate::error::{PolygonizerError, Result};
use crate::Polygonizer;

/// Parses GeoJSON text, polygonizes its lines and returns a FeatureCollection
/// of Polygon features as text.
pub fn polygonize_geojson(input: &str) -> Result<String> {
    let geojson: GeoJson = serde_json::from_str(input).map_err(|e| {
        PolygonizerError::InputTypeError(format!("Failed to parse GeoJSON: {}", e))
    })?;

    let polygons = polygonize_document(geojson)?;
    Ok(polygons_to_geojson(&polygons).to_string())
}

/// Polygonizes every geometry of a parsed GeoJSON document.
/// Features without a geometry are skipped.
pub fn polygonize_document(geojson: GeoJson) -> Result<Vec<Polygon<f64>>> {
    let mut polygonizer = Polygonizer::new();
    for geom in document_geometries(geojson) {
        let geo_geom: geo_types::Geometry<f64> = geom.try_into().map_err(|e| {
            PolygonizerError::InputTypeError(format!("Unsupported GeoJSON geometry: {}", e))
        })?;
        polygonizer.add_geometry(geo_geom)?;
    }
    polygonizer.polygonize()
}

fn document_geometries(geojson: GeoJson) -> Vec<Geometry> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    }
}

/// Wraps polygons as a FeatureCollection without properties.
pub fn polygons_to_geojson(polygons: &[Polygon<f64>]) -> GeoJson {
    let features: Vec<Feature> = polygons
        .iter()
        .map(|poly| {
            let geometry = Geometry::new(Value::from(poly));
            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }
        })
        .collect();

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}
