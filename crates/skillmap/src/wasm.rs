//! WebAssembly bindings for skillmap
//!
//! JSON in, JSON out. Errors surface as thrown JavaScript strings.

use wasm_bindgen::prelude::*;

use crate::core::Direction;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

fn parse_direction(direction: Option<String>) -> Result<Direction, JsValue> {
    match direction {
        Some(name) => name.parse().map_err(|e: String| JsValue::from_str(&e)),
        None => Ok(Direction::default()),
    }
}

/// Lay out a raw graph
///
/// # Arguments
/// * `input` - JSON `{nodes: [{id, rank}], edges: [{id, source, target}]}`
/// * `direction` - "top-to-bottom" or "bottom-to-top" (default)
///
/// # Returns
/// * The positioned graph as a JSON string
#[wasm_bindgen]
pub fn layout_graph(input: &str, direction: Option<String>) -> Result<String, JsValue> {
    let direction = parse_direction(direction)?;
    let positioned =
        crate::layout_json(input, direction).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&positioned).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compose the skill map of a store document
///
/// # Arguments
/// * `store` - JSON `{exercises, trees, progress}`
/// * `user_id` - Whose progress drives node status; difficulty is used if absent
#[wasm_bindgen]
pub fn skill_map(store: &str, user_id: Option<String>) -> Result<String, JsValue> {
    let map = crate::skill_map_json(store, user_id.as_deref())
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
    serde_json::to_string(&map).map_err(|e| JsValue::from_str(&e.to_string()))
}
