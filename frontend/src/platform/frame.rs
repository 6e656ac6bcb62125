use std::cell::RefCell;

use gloo_render::{request_animation_frame, AnimationFrame};

/// Dirty flag plus at most one outstanding animation frame. Scroll, resize
/// and orientation triggers all funnel through `schedule`, so a burst of
/// events inside one frame collapses into a single recompute.
#[derive(Default)]
pub struct FrameScheduler {
    handle: RefCell<Option<AnimationFrame>>,
}

impl FrameScheduler {
    pub fn is_pending(&self) -> bool {
        self.handle.borrow().is_some()
    }

    /// Returns false when a frame is already queued; that frame reads the
    /// latest state when it runs.
    pub fn schedule<F>(&self, callback: F) -> bool
    where
        F: FnOnce(f64) + 'static,
    {
        if self.is_pending() {
            return false;
        }
        let handle = request_animation_frame(callback);
        *self.handle.borrow_mut() = Some(handle);
        true
    }

    /// Must be called first thing inside the frame callback.
    pub fn begin_frame(&self) {
        self.handle.borrow_mut().take();
    }

    pub fn cancel(&self) {
        self.handle.borrow_mut().take();
    }
}
