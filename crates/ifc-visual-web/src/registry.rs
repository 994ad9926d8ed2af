//! Host plugin registry: `window.powerbi.visuals.plugins[name]`

use crate::visual::IfcVisual;
use ifc_visual_core::{PluginDescriptor, VisualError};
use js_sys::{Object, Reflect};
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

/// Write the descriptor and its `create` factory into the registry
pub fn register(descriptor: &PluginDescriptor) -> Result<(), JsValue> {
    let window = crate::dom::window().map_err(crate::js_error)?;

    let powerbi = child_object(&window, "powerbi")?;
    let visuals = child_object(&powerbi, "visuals")?;
    let plugins = child_object(&visuals, "plugins")?;

    let entry = descriptor.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?;

    let create = Closure::wrap(Box::new(|options: JsValue| -> Result<JsValue, JsValue> {
        match IfcVisual::new(options, JsValue::UNDEFINED) {
            Ok(visual) => Ok(visual.into()),
            Err(e) => {
                log::error!("[Registry] Visual construction failed: {:?}", e);
                Err(js_sys::Error::new(&VisualError::InstanceNotFound.to_string()).into())
            }
        }
    }) as Box<dyn Fn(JsValue) -> Result<JsValue, JsValue>>);

    Reflect::set(&entry, &"create".into(), create.as_ref())?;
    // The registry keeps the factory for the page's lifetime
    create.forget();

    Reflect::set(&plugins, &descriptor.name.as_str().into(), &entry)?;
    log::info!("[Registry] Registered plugin {}", descriptor.name);
    Ok(())
}

/// `parent[key]`, created as an empty object when missing
fn child_object(parent: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    let key = JsValue::from_str(key);
    let existing = Reflect::get(parent, &key)?;
    if existing.is_object() {
        return Ok(existing);
    }
    let created: JsValue = Object::new().into();
    Reflect::set(parent, &key, &created)?;
    Ok(created)
}
