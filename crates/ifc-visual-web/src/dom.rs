//! DOM helpers: host container wiring and window metrics

use ifc_visual_core::config::SurfaceConfig;
use ifc_visual_core::{Viewport, VisualError};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, Window};

pub fn window() -> Result<Window, VisualError> {
    web_sys::window().ok_or_else(|| VisualError::missing("window"))
}

pub fn document() -> Result<Document, VisualError> {
    window()?
        .document()
        .ok_or_else(|| VisualError::missing("document"))
}

/// Window inner size in CSS pixels. Unreadable values come back as 0.
pub fn window_size(window: &Window) -> (f32, f32) {
    let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    (read(window.inner_width()), read(window.inner_height()))
}

pub fn device_pixel_ratio(window: &Window) -> f32 {
    window.device_pixel_ratio() as f32
}

/// Canvas and file input appended to the host container
pub struct SurfaceElements {
    pub canvas: HtmlCanvasElement,
    pub file_input: HtmlInputElement,
}

/// Append `<canvas>` and `<input type="file">` to `container`
pub fn mount(container: &HtmlElement, config: &SurfaceConfig) -> Result<SurfaceElements, VisualError> {
    let document = document()?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| VisualError::missing("canvas element"))?
        .dyn_into()
        .map_err(|_| VisualError::missing("canvas element"))?;
    canvas.set_id(&config.canvas_id);
    // Let the pointer handlers see right-drag instead of the context menu
    let _ = canvas.set_attribute("oncontextmenu", "return false;");

    let file_input: HtmlInputElement = document
        .create_element("input")
        .map_err(|_| VisualError::missing("file input"))?
        .dyn_into()
        .map_err(|_| VisualError::missing("file input"))?;
    file_input.set_type("file");
    file_input.set_id(&config.file_input_id);
    file_input.set_accept(".ifc");

    container
        .append_child(&canvas)
        .map_err(|_| VisualError::missing("host container"))?;
    container
        .append_child(&file_input)
        .map_err(|_| VisualError::missing("host container"))?;

    Ok(SurfaceElements { canvas, file_input })
}

/// Size the canvas backing store and its CSS box to the viewport
pub fn apply_viewport(canvas: &HtmlCanvasElement, viewport: &Viewport) {
    let (width, height) = viewport.drawing_buffer_size();
    canvas.set_width(width);
    canvas.set_height(height);

    let style = canvas.style();
    let size = viewport.size();
    let _ = style.set_property("width", &format!("{}px", size.width()));
    let _ = style.set_property("height", &format!("{}px", size.height()));
}

/// Remove an element from its parent, if attached
pub fn detach(element: &web_sys::Element) {
    element.remove();
}
