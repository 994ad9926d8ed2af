//! `requestAnimationFrame` chain
//!
//! Each callback runs one frame and asks for the next one only when the
//! render loop says to continue and the stop handle is still clear.
//! Dropping the [`FrameLoop`] cancels the pending request.

use crate::visual::ViewerState;
use gloo::render::{request_animation_frame, AnimationFrame};
use ifc_visual_core::{FrameOutcome, StopHandle};
use std::cell::RefCell;
use std::rc::Rc;

type PendingFrame = Rc<RefCell<Option<AnimationFrame>>>;

pub struct FrameLoop {
    pending: PendingFrame,
}

impl FrameLoop {
    /// Request the first frame, unless `stop` is already set
    pub fn start(state: Rc<RefCell<ViewerState>>, stop: StopHandle) -> Self {
        let pending: PendingFrame = Rc::new(RefCell::new(None));
        schedule(state, pending.clone(), stop);
        Self { pending }
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Cancel the pending request, if any
    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule(state: Rc<RefCell<ViewerState>>, pending: PendingFrame, stop: StopHandle) {
    if stop.is_stopped() {
        pending.borrow_mut().take();
        log::debug!("[FrameLoop] Stop requested, not scheduling");
        return;
    }

    let next = pending.clone();
    let request = request_animation_frame(move |_timestamp| {
        let outcome = state.borrow_mut().frame();
        match outcome {
            FrameOutcome::Continue => schedule(state, next, stop),
            FrameOutcome::Stop => {
                next.borrow_mut().take();
                log::debug!("[FrameLoop] Not rescheduling");
            }
        }
    });
    *pending.borrow_mut() = Some(request);
}
