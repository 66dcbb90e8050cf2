//! WASM bindings for in-browser e-book decoding.
//!
//! Exposes the decoder to JavaScript via wasm-bindgen. Documents cross the
//! boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::{is_mobi_file, parse_mobi};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Decode MOBI/PalmDOC bytes and return the document as JSON.
#[wasm_bindgen]
pub fn parse_mobi_json(data: &[u8]) -> Result<String, JsValue> {
    let doc = parse_mobi(data).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&doc).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Quick signature check without decoding.
#[wasm_bindgen]
pub fn is_mobi(data: &[u8]) -> bool {
    is_mobi_file(data)
}
