use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::info;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::error::BehaviorError;
use crate::platform::FrameScheduler;
use crate::scene::controller::TransitionStats;

const FPS_WINDOW_MS: f64 = 1000.0;

const OVERLAY_STYLE: &str = "position: fixed; right: 8px; bottom: 8px; z-index: 9999; \
    padding: 6px 10px; font: 12px/1.4 monospace; white-space: pre; \
    color: #0f0; background: rgba(0, 0, 0, 0.75); border-radius: 4px; pointer-events: none;";

/// Scene switcher state as seen by the overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneSnapshot {
    pub progress: f64,
    pub active: Option<usize>,
    pub pending: Option<usize>,
    pub stats: TransitionStats,
}

/// Frames per second over a rolling window.
#[derive(Debug)]
pub struct FpsMeter {
    frames: VecDeque<f64>,
    window_ms: f64,
}

impl FpsMeter {
    pub fn new(window_ms: f64) -> Self {
        Self {
            frames: VecDeque::new(),
            window_ms,
        }
    }

    pub fn tick(&mut self, now_ms: f64) -> f64 {
        self.frames.push_back(now_ms);
        while let Some(first) = self.frames.front() {
            if now_ms - *first > self.window_ms {
                self.frames.pop_front();
            } else {
                break;
            }
        }
        self.fps()
    }

    pub fn fps(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) if last > first => {
                (self.frames.len() - 1) as f64 * 1000.0 / (last - first)
            }
            _ => 0.0,
        }
    }
}

fn scene_label(index: Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |i| (i + 1).to_string())
}

pub fn format_overlay(fps: f64, scene: Option<&SceneSnapshot>) -> String {
    let mut text = format!("fps      {:>5.1}", fps);
    match scene {
        Some(scene) => {
            text.push_str(&format!(
                "\nprogress {:>5.3}\nactive   {:>5}\npending  {:>5}\nswitches {:>5}\ndeferred {:>5}",
                scene.progress,
                scene_label(scene.active),
                scene_label(scene.pending),
                scene.stats.activations,
                scene.stats.deferrals,
            ));
        }
        None => text.push_str("\nscenes   off"),
    }
    text
}

struct OverlayInner {
    element: HtmlElement,
    meter: RefCell<FpsMeter>,
    scene: Cell<Option<SceneSnapshot>>,
    frame: FrameScheduler,
}

/// Fixed-position diagnostics panel, enabled with `?debug=1`.
pub struct DebugOverlay {
    inner: Rc<OverlayInner>,
}

/// Handle the scene driver reports through. Holds no strong reference, so
/// the overlay can go away first.
#[derive(Clone)]
pub struct DebugReporter {
    inner: Weak<OverlayInner>,
}

impl DebugReporter {
    pub fn report(&self, snapshot: SceneSnapshot) {
        if let Some(inner) = self.inner.upgrade() {
            inner.scene.set(Some(snapshot));
        }
    }
}

impl DebugOverlay {
    pub fn install(document: &Document) -> Result<Self, BehaviorError> {
        let body = document.body().ok_or(BehaviorError::MissingElement("body"))?;
        let element = document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| BehaviorError::Unsupported("HTMLElement"))?;
        element.set_class_name("debug-overlay");
        element.set_attribute("style", OVERLAY_STYLE)?;
        element.set_attribute("aria-hidden", "true")?;
        body.append_child(&element)?;

        let inner = Rc::new(OverlayInner {
            element,
            meter: RefCell::new(FpsMeter::new(FPS_WINDOW_MS)),
            scene: Cell::new(None),
            frame: FrameScheduler::default(),
        });
        request_tick(&inner);
        info!("debug overlay enabled");
        Ok(Self { inner })
    }

    pub fn reporter(&self) -> DebugReporter {
        DebugReporter {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

fn request_tick(inner: &Rc<OverlayInner>) {
    let weak = Rc::downgrade(inner);
    inner.frame.schedule(move |timestamp| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.frame.begin_frame();
        let fps = inner.meter.borrow_mut().tick(timestamp);
        let scene = inner.scene.get();
        inner
            .element
            .set_text_content(Some(&format_overlay(fps, scene.as_ref())));
        request_tick(&inner);
    });
}

impl Drop for DebugOverlay {
    fn drop(&mut self) {
        self.inner.frame.cancel();
        self.inner.element.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_over_rolling_window() {
        let mut meter = FpsMeter::new(1000.0);
        assert_eq!(meter.tick(0.0), 0.0);
        let mut fps = 0.0;
        for i in 1..=120 {
            fps = meter.tick(i as f64 * 1000.0 / 60.0);
        }
        assert!((fps - 60.0).abs() < 0.5, "fps = {}", fps);

        // A long stall empties the window.
        assert_eq!(meter.tick(10_000.0), 0.0);
    }

    #[test]
    fn overlay_text_lists_scene_state() {
        let snapshot = SceneSnapshot {
            progress: 0.25,
            active: Some(0),
            pending: Some(1),
            stats: TransitionStats {
                activations: 3,
                deferrals: 7,
            },
        };
        let text = format_overlay(59.94, Some(&snapshot));
        assert!(text.contains("fps       59.9"));
        assert!(text.contains("progress 0.250"));
        assert!(text.contains("active       1"));
        assert!(text.contains("pending      2"));
        assert!(text.contains("switches     3"));
        assert!(text.contains("deferred     7"));
    }

    #[test]
    fn overlay_without_scenes() {
        let text = format_overlay(0.0, None);
        assert!(text.ends_with("scenes   off"));
    }
}
