use geojson::GeoJson;
use wasm_bindgen::prelude::*;

use crate::geojson_io;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// GeoJSON text in, FeatureCollection of polygons out.
#[wasm_bindgen]
pub fn polygonize(geojson_str: &str) -> Result<String, JsValue> {
    geojson_io::polygonize_geojson(geojson_str)
        .map_err(|e| JsValue::from_str(&format!("Polygonization failed: {}", e)))
}

/// Same as `polygonize`, but takes and returns plain JS objects.
#[wasm_bindgen(js_name = polygonizeObject)]
pub fn polygonize_object(input: JsValue) -> Result<JsValue, JsValue> {
    let geojson: GeoJson = serde_wasm_bindgen::from_value(input)
        .map_err(|e| JsValue::from_str(&format!("Failed to read GeoJSON: {}", e)))?;

    let polygons = geojson_io::polygonize_document(geojson)
        .map_err(|e| JsValue::from_str(&format!("Polygonization failed: {}", e)))?;

    serde_wasm_bindgen::to_value(&geojson_io::polygons_to_geojson(&polygons))
        .map_err(|e| JsValue::from_str(&format!("Failed to write GeoJSON: {}", e)))
}
