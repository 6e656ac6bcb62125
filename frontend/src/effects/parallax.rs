use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::config::{self, ParallaxTuning};
use crate::error::BehaviorError;
use crate::platform::{self, Capabilities, FrameScheduler, MotionFlag, MotionSubscription};

/// Eased background offset. `current` chases `target` a fixed fraction per
/// frame until it is close enough to snap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxState {
    tuning: ParallaxTuning,
    current: f64,
    target: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Frame {
    /// Offset to write; another frame is needed.
    Moving(f64),
    /// Offset to write; no further frames until the target changes.
    Settled(f64),
}

impl Frame {
    pub fn offset(self) -> f64 {
        match self {
            Frame::Moving(offset) | Frame::Settled(offset) => offset,
        }
    }
}

pub fn target_offset(scroll_y: f64, viewport_height: f64, tuning: &ParallaxTuning) -> f64 {
    let max = (viewport_height * tuning.max_ratio).max(0.0);
    let raw = scroll_y * tuning.speed;
    if raw.is_finite() && max.is_finite() {
        raw.clamp(0.0, max)
    } else {
        0.0
    }
}

impl ParallaxState {
    pub fn new(tuning: ParallaxTuning) -> Self {
        Self {
            tuning,
            current: 0.0,
            target: 0.0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Returns true when the eased value has somewhere to go.
    pub fn retarget(&mut self, scroll_y: f64, viewport_height: f64, reduced_motion: bool) -> bool {
        if reduced_motion {
            self.pin();
            return false;
        }
        self.target = target_offset(scroll_y, viewport_height, &self.tuning);
        !self.is_settled()
    }

    pub fn pin(&mut self) {
        self.current = 0.0;
        self.target = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        (self.target - self.current).abs() < self.tuning.epsilon_px
    }

    pub fn step(&mut self) -> Frame {
        if self.is_settled() {
            self.current = self.target;
            return Frame::Settled(self.current);
        }
        self.current += (self.target - self.current) * self.tuning.easing;
        if self.is_settled() {
            self.current = self.target;
            Frame::Settled(self.current)
        } else {
            Frame::Moving(self.current)
        }
    }
}

struct ParallaxInner {
    window: Window,
    elements: Vec<HtmlElement>,
    state: RefCell<ParallaxState>,
    motion: MotionFlag,
    frame: FrameScheduler,
}

impl ParallaxInner {
    fn write(&self, offset: f64) {
        let value = format!("translate3d(0, {:.2}px, 0)", offset);
        for element in &self.elements {
            let _ = element.style().set_property("transform", &value);
        }
    }

    fn pin(&self) {
        self.frame.cancel();
        self.state.borrow_mut().pin();
        self.write(0.0);
    }
}

fn on_scroll(inner: &Rc<ParallaxInner>) {
    if inner.motion.reduced() {
        inner.pin();
        return;
    }
    let moving = inner.state.borrow_mut().retarget(
        platform::scroll_y(&inner.window),
        platform::viewport_height(&inner.window),
        false,
    );
    if moving {
        request_frame(inner);
    }
}

fn request_frame(inner: &Rc<ParallaxInner>) {
    let weak = Rc::downgrade(inner);
    inner.frame.schedule(move |_| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.frame.begin_frame();
        let frame = inner.state.borrow_mut().step();
        inner.write(frame.offset());
        if let Frame::Moving(_) = frame {
            request_frame(&inner);
        }
    });
}

/// Eased scroll offset on every `[data-parallax]` element.
pub struct Parallax {
    inner: Rc<ParallaxInner>,
    _listeners: Vec<EventListener>,
    _motion: MotionSubscription,
}

impl Parallax {
    pub fn install(
        window: &Window,
        document: &Document,
        capabilities: &Capabilities,
        tuning: ParallaxTuning,
    ) -> Result<Option<Self>, BehaviorError> {
        let nodes = document.query_selector_all(config::PARALLAX_SELECTOR)?;
        let elements: Vec<HtmlElement> = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();
        if elements.is_empty() {
            return Ok(None);
        }

        let inner = Rc::new(ParallaxInner {
            window: window.clone(),
            elements,
            state: RefCell::new(ParallaxState::new(tuning)),
            motion: capabilities.motion.clone(),
            frame: FrameScheduler::default(),
        });
        let weak = Rc::downgrade(&inner);
        let listeners = ["scroll", "resize"]
            .into_iter()
            .map(|event| {
                let weak = weak.clone();
                EventListener::new(window, event, move |_| {
                    if let Some(inner) = weak.upgrade() {
                        on_scroll(&inner);
                    }
                })
            })
            .collect();
        let motion = capabilities.motion.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                on_scroll(&inner);
            }
        });

        on_scroll(&inner);
        debug!("parallax on {} elements", inner.elements.len());
        Ok(Some(Self {
            inner,
            _listeners: listeners,
            _motion: motion,
        }))
    }
}

impl Drop for Parallax {
    fn drop(&mut self) {
        self.inner.frame.cancel();
    }
}
