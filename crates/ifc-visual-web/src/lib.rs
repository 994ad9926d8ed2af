//! IFC Visual Web - browser host adapter for the IFC dashboard visual
//!
//! Registers the visual with the host's plugin registry and wires a
//! [`ifc_visual_core::VisualCore`] to the DOM: a canvas and a file input in
//! the host container, window resize and pointer events, a
//! `requestAnimationFrame` chain and a WebGL2 renderer.

use ifc_visual_core::{PluginDescriptor, VisualError};
use wasm_bindgen::prelude::*;

pub mod dom;
pub mod frame_loop;
pub mod input;
pub mod logger;
pub mod registry;
pub mod renderer;
pub mod visual;

pub use renderer::WebGlRenderer;
pub use visual::IfcVisual;

/// Register the visual in `window.powerbi.visuals.plugins`.
/// Call once after the module is loaded.
#[wasm_bindgen(js_name = registerPlugin)]
pub fn register_plugin() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logger::init();
    registry::register(&PluginDescriptor::default())
}

/// Static descriptor fields, for hosts that build the registry entry themselves
#[wasm_bindgen(js_name = pluginDescriptor)]
pub fn plugin_descriptor() -> Result<JsValue, JsValue> {
    use serde::Serialize;
    Ok(PluginDescriptor::default().serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

pub(crate) fn js_error(error: VisualError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}
