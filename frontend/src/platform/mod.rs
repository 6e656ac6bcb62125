pub mod capabilities;
pub mod frame;
pub mod storage;

use web_sys::{js_sys, window, Window};

pub use capabilities::{Capabilities, MediaWatch, MotionFlag, MotionSubscription};
pub use frame::FrameScheduler;

/// High resolution timestamp in milliseconds.
pub fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn scroll_y(window: &Window) -> f64 {
    window.scroll_y().unwrap_or(0.0)
}

pub fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(0.0)
}
