//! Browser tests. Run with `wasm-pack test --headless --chrome crates/ifc-visual-web`.

#![cfg(target_arch = "wasm32")]

use ifc_visual_core::{LoopState, ViewerConfig, VisualCore};
use ifc_visual_web::frame_loop::FrameLoop;
use ifc_visual_web::visual::ViewerState;
use ifc_visual_web::{register_plugin, IfcVisual, WebGlRenderer};
use js_sys::{Array, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const PLUGIN_NAME: &str = "pbiifcAC7183C660094BBFBAF6377A0971F532";

fn container() -> web_sys::HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element: web_sys::HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

fn options_for(element: &web_sys::HtmlElement) -> JsValue {
    let options = js_sys::Object::new();
    Reflect::set(&options, &"element".into(), element).unwrap();
    options.into()
}

fn object(entries: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &(*key).into(), value).unwrap();
    }
    object.into()
}

fn viewer_state(element: &web_sys::HtmlElement) -> (Rc<RefCell<ViewerState>>, ifc_visual_core::StopHandle) {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: web_sys::HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    element.append_child(&canvas).unwrap();

    let mut core = VisualCore::new(ViewerConfig::default(), 320.0, 240.0, 1.0).unwrap();
    let stop = core.start().unwrap();
    let renderer = WebGlRenderer::new(canvas).unwrap();
    (Rc::new(RefCell::new(ViewerState { core, renderer })), stop)
}

async fn next_animation_frame() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window().unwrap().request_animation_frame(&resolve).unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn plugin_entry() -> JsValue {
    let window = web_sys::window().unwrap();
    let powerbi = Reflect::get(&window, &"powerbi".into()).unwrap();
    let visuals = Reflect::get(&powerbi, &"visuals".into()).unwrap();
    let plugins = Reflect::get(&visuals, &"plugins".into()).unwrap();
    Reflect::get(&plugins, &PLUGIN_NAME.into()).unwrap()
}

#[wasm_bindgen_test]
fn registers_descriptor() {
    register_plugin().unwrap();
    let entry = plugin_entry();

    assert_eq!(Reflect::get(&entry, &"displayName".into()).unwrap(), "pbiifc");
    assert_eq!(Reflect::get(&entry, &"class".into()).unwrap(), "Visual");
    assert_eq!(Reflect::get(&entry, &"apiVersion".into()).unwrap(), "3.8.0");
    assert_eq!(Reflect::get(&entry, &"custom".into()).unwrap(), true);
    assert!(Reflect::get(&entry, &"create".into()).unwrap().is_function());
}

#[wasm_bindgen_test]
fn create_without_element_throws() {
    register_plugin().unwrap();
    let create: js_sys::Function = Reflect::get(&plugin_entry(), &"create".into())
        .unwrap()
        .dyn_into()
        .unwrap();

    let error = create.call1(&JsValue::NULL, &js_sys::Object::new()).unwrap_err();
    let message = Reflect::get(&error, &"message".into()).unwrap();
    assert_eq!(message, "Visual instance not found");
}

#[wasm_bindgen_test]
fn mounts_canvas_and_file_input() {
    let element = container();
    let mut visual = IfcVisual::new(options_for(&element), JsValue::UNDEFINED).unwrap();

    let document = web_sys::window().unwrap().document().unwrap();
    assert!(document.get_element_by_id("three-canvas").is_some());
    assert!(document.get_element_by_id("file-input").is_some());
    assert!(visual.is_rendering());

    visual.destroy();
    assert!(!visual.is_rendering());
    assert!(document.get_element_by_id("three-canvas").is_none());
}

#[wasm_bindgen_test]
fn enumerates_defaults_before_update() {
    let element = container();
    let mut visual = IfcVisual::new(options_for(&element), JsValue::UNDEFINED).unwrap();

    let request = js_sys::Object::new();
    Reflect::set(&request, &"objectName".into(), &"dataPoint".into()).unwrap();
    let instances: js_sys::Array = visual
        .enumerate_object_instances(request.into())
        .unwrap()
        .dyn_into()
        .unwrap();
    assert_eq!(instances.length(), 1);

    let properties = Reflect::get(&instances.get(0), &"properties".into()).unwrap();
    assert_eq!(Reflect::get(&properties, &"fontSize".into()).unwrap(), 12.0);

    visual.destroy();
}

#[wasm_bindgen_test]
fn update_from_host_objects_reaches_enumeration() {
    let element = container();
    let mut visual = IfcVisual::new(options_for(&element), JsValue::UNDEFINED).unwrap();

    let fill = object(&[("solid", object(&[("color", "#FF0000".into())]))]);
    let data_point = object(&[("fontSize", 18.into()), ("fill", fill)]);
    let metadata = object(&[("objects", object(&[("dataPoint", data_point)]))]);
    let data_views = Array::of1(&object(&[("metadata", metadata)]));
    visual.update(object(&[("dataViews", data_views.into())]));

    let request = object(&[("objectName", "dataPoint".into())]);
    let instances: Array = visual.enumerate_object_instances(request).unwrap().dyn_into().unwrap();
    assert_eq!(instances.length(), 1);

    let properties = Reflect::get(&instances.get(0), &"properties".into()).unwrap();
    assert_eq!(Reflect::get(&properties, &"fontSize".into()).unwrap(), 18.0);
    assert_eq!(Reflect::get(&properties, &"fill".into()).unwrap(), "#FF0000");

    visual.destroy();
}

#[wasm_bindgen_test]
fn frame_loop_not_scheduled_once_stopped() {
    let element = container();
    let (state, stop) = viewer_state(&element);

    stop.stop();
    let frame_loop = FrameLoop::start(state.clone(), stop);
    assert!(!frame_loop.is_scheduled());
    assert_eq!(state.borrow().core.loop_state(), LoopState::Running);
}

#[wasm_bindgen_test]
async fn frame_loop_winds_down_after_stop() {
    let element = container();
    let (state, stop) = viewer_state(&element);

    let frame_loop = FrameLoop::start(state.clone(), stop.clone());
    assert!(frame_loop.is_scheduled());
    next_animation_frame().await;
    next_animation_frame().await;

    stop.stop();
    next_animation_frame().await;
    next_animation_frame().await;
    assert!(!frame_loop.is_scheduled());
}
