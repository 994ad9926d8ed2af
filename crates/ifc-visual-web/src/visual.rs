//! The visual instance handed to the host

use crate::dom::{self, SurfaceElements};
use crate::frame_loop::FrameLoop;
use crate::input;
use crate::renderer::WebGlRenderer;
use gloo::events::EventListener;
use ifc_visual_core::{
    EnumerateOptions, FrameOutcome, HostVisual, StopHandle, UpdateOptions, ViewerConfig,
    VisualCore, VisualError,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

/// State shared by the frame loop and the event handlers
pub struct ViewerState {
    pub core: VisualCore,
    pub renderer: WebGlRenderer,
}

impl ViewerState {
    pub fn frame(&mut self) -> FrameOutcome {
        self.core.frame(&mut self.renderer)
    }
}

/// One visual bound to a host container element
#[wasm_bindgen]
pub struct IfcVisual {
    state: Rc<RefCell<ViewerState>>,
    elements: SurfaceElements,
    stop: StopHandle,
    frame_loop: Option<FrameLoop>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl IfcVisual {
    /// `options.element` is the host container. `config` is an optional
    /// partial viewer configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue, config: JsValue) -> Result<IfcVisual, JsValue> {
        Self::create(&options, &config).map_err(crate::js_error)
    }

    /// Host data/view change. Only the settings snapshot is touched.
    pub fn update(&mut self, options: JsValue) {
        let options: UpdateOptions = match serde_wasm_bindgen::from_value(options) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("[Visual] Ignoring malformed update options: {}", e);
                return;
            }
        };
        self.state.borrow_mut().core.update(&options);
    }

    /// Property-panel instances for `options.objectName`
    #[wasm_bindgen(js_name = enumerateObjectInstances)]
    pub fn enumerate_object_instances(&self, options: JsValue) -> Result<JsValue, JsValue> {
        let options: EnumerateOptions = serde_wasm_bindgen::from_value(options)?;
        let instances = self.state.borrow().core.enumerate_object_instances(&options);
        Ok(instances.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
    }

    /// Stop rendering, drop listeners and remove the DOM elements
    pub fn destroy(&mut self) {
        self.stop.stop();
        self.frame_loop.take();
        self.listeners.clear();
        self.state.borrow_mut().renderer.release();
        dom::detach(&self.elements.canvas);
        dom::detach(&self.elements.file_input);
        log::info!("[Visual] Destroyed");
    }

    /// Whether another animation frame is pending
    #[wasm_bindgen(getter, js_name = isRendering)]
    pub fn is_rendering(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(FrameLoop::is_scheduled)
    }
}

impl IfcVisual {
    fn create(options: &JsValue, config: &JsValue) -> Result<IfcVisual, VisualError> {
        let config = parse_config(config)?;
        let container: HtmlElement = js_sys::Reflect::get(options, &"element".into())
            .ok()
            .and_then(|element| element.dyn_into().ok())
            .ok_or_else(|| VisualError::missing("options.element"))?;

        let window = dom::window()?;
        let (width, height) = dom::window_size(&window);
        let mut core = VisualCore::new(config, width, height, dom::device_pixel_ratio(&window))?;

        let elements = dom::mount(&container, &core.config().surface)?;
        let renderer = WebGlRenderer::new(elements.canvas.clone())?;
        let stop = core.start()?;

        let state = Rc::new(RefCell::new(ViewerState { core, renderer }));

        let mut listeners = vec![
            input::on_window_resize(&window, &state),
            input::on_file_selected(&elements.file_input, &state),
        ];
        listeners.extend(input::navigation_listeners(&elements.canvas, &state));

        let frame_loop = FrameLoop::start(state.clone(), stop.clone());

        Ok(IfcVisual {
            state,
            elements,
            stop,
            frame_loop: Some(frame_loop),
            listeners,
        })
    }
}

fn parse_config(config: &JsValue) -> Result<ViewerConfig, VisualError> {
    if config.is_undefined() || config.is_null() {
        return Ok(ViewerConfig::default());
    }
    let json: String = js_sys::JSON::stringify(config)
        .map_err(|_| VisualError::missing("serializable config"))?
        .into();
    ViewerConfig::from_json(&json)
}
