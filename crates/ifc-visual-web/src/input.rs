//! Browser input wiring: window resize, pointer and wheel navigation, file input

use crate::dom;
use crate::visual::ViewerState;
use gloo::events::{EventListener, EventListenerOptions};
use ifc_visual_core::PointerButton;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, HtmlInputElement, PointerEvent, WheelEvent, Window};

/// Viewport and camera follow the window size
pub fn on_window_resize(window: &Window, state: &Rc<RefCell<ViewerState>>) -> EventListener {
    let state = Rc::downgrade(state);
    let target = window.clone();
    EventListener::new(window, "resize", move |_event| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let (width, height) = dom::window_size(&target);
        let mut state = state.borrow_mut();
        state.core.resize(width, height);
        state.core.set_device_pixel_ratio(dom::device_pixel_ratio(&target));
    })
}

/// Orbit, pan and zoom from pointer and wheel events on the canvas
pub fn navigation_listeners(canvas: &HtmlCanvasElement, state: &Rc<RefCell<ViewerState>>) -> Vec<EventListener> {
    let down = {
        let state = Rc::downgrade(state);
        let canvas_ref = canvas.clone();
        EventListener::new(canvas, "pointerdown", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let Some(button) = pointer_button(event.button()) else {
                return;
            };
            let _ = canvas_ref.set_pointer_capture(event.pointer_id());
            with_state(&state, |state| {
                let (navigation, _) = state.core.navigation_mut();
                navigation.pointer_down(
                    button,
                    event.offset_x() as f32,
                    event.offset_y() as f32,
                    event.shift_key(),
                );
            });
        })
    };

    let moved = {
        let state = Rc::downgrade(state);
        EventListener::new(canvas, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            with_state(&state, |state| {
                let (navigation, camera) = state.core.navigation_mut();
                navigation.pointer_move(event.offset_x() as f32, event.offset_y() as f32, camera);
            });
        })
    };

    let up = {
        let state = Rc::downgrade(state);
        let canvas_ref = canvas.clone();
        EventListener::new(canvas, "pointerup", move |event| {
            if let Some(event) = event.dyn_ref::<PointerEvent>() {
                let _ = canvas_ref.release_pointer_capture(event.pointer_id());
            }
            with_state(&state, |state| state.core.navigation_mut().0.pointer_up());
        })
    };

    let cancel = {
        let state = Rc::downgrade(state);
        EventListener::new(canvas, "pointercancel", move |_event| {
            with_state(&state, |state| state.core.navigation_mut().0.pointer_up());
        })
    };

    // Non-passive so the page does not scroll while zooming
    let wheel = {
        let state = Rc::downgrade(state);
        EventListener::new_with_options(
            canvas,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                with_state(&state, |state| {
                    state.core.navigation_mut().0.wheel(event.delta_y() as f32)
                });
            },
        )
    };

    vec![down, moved, up, cancel, wheel]
}

/// Load the chosen IFC file into the scene
pub fn on_file_selected(input: &HtmlInputElement, state: &Rc<RefCell<ViewerState>>) -> EventListener {
    let state = Rc::downgrade(state);
    let input_ref = input.clone();
    EventListener::new(input, "change", move |_event| {
        let Some(file) = input_ref.files().and_then(|files| files.get(0)) else {
            return;
        };
        let name = file.name();
        log::info!("[Visual] Loading file: {}", name);

        let file = gloo_file::File::from(file);
        let state = state.clone();
        spawn_local(async move {
            let bytes = match gloo_file::futures::read_as_bytes(&file).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("[Visual] Failed to read {}: {:?}", name, e);
                    return;
                }
            };
            log::debug!("[Visual] Read {} bytes", bytes.len());

            let content = String::from_utf8_lossy(&bytes);
            match ifc_visual_core::load_ifc(&content) {
                Ok(model) => with_state(&state, |state| {
                    state.core.load_model(model);
                }),
                Err(e) => log::error!("[Visual] Failed to load {}: {}", name, e),
            }
        });
    })
}

/// DOM button index to navigation button
fn pointer_button(button: i16) -> Option<PointerButton> {
    match button {
        0 => Some(PointerButton::Primary),
        1 => Some(PointerButton::Middle),
        2 => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Run `f` on the state if the visual is still alive and not busy
fn with_state(state: &Weak<RefCell<ViewerState>>, f: impl FnOnce(&mut ViewerState)) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => f(&mut state),
        Err(_) => log::debug!("[Visual] State busy, dropping input event"),
    };
}
