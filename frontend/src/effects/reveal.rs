use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::config;
use crate::error::BehaviorError;
use crate::platform::{self, Capabilities, MotionSubscription};

const VISIBLE_CLASS: &str = "is-in";

/// One-shot visibility per element: once revealed, always revealed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(count: usize) -> Self {
        Self {
            revealed: vec![false; count],
        }
    }

    /// Returns true only the first time `index` is revealed.
    pub fn reveal(&mut self, index: usize) -> bool {
        match self.revealed.get_mut(index) {
            Some(seen) if !*seen => {
                *seen = true;
                true
            }
            _ => false,
        }
    }

    /// Feeds an observation; below the threshold nothing changes, and an
    /// element that already went visible is never reverted.
    pub fn observe(&mut self, index: usize, ratio: f64, threshold: f64) -> bool {
        ratio >= threshold && ratio > 0.0 && self.reveal(index)
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn reveal_all(&mut self) -> Vec<usize> {
        (0..self.revealed.len()).filter(|i| self.reveal(*i)).collect()
    }

    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.revealed
            .iter()
            .enumerate()
            .filter(|(_, seen)| !**seen)
            .map(|(i, _)| i)
    }

    pub fn is_complete(&self) -> bool {
        self.revealed.iter().all(|seen| *seen)
    }
}

/// Share of an element's height inside the viewport, used when
/// IntersectionObserver is missing.
pub fn visible_ratio(top: f64, height: f64, viewport_height: f64) -> f64 {
    if !(height > 0.0) || !(viewport_height > 0.0) {
        return 0.0;
    }
    let visible = (top + height).min(viewport_height) - top.max(0.0);
    (visible / height).clamp(0.0, 1.0)
}

/// Ratio an element has to reach. An element taller than the viewport can
/// never show `threshold` of itself, so any visible part counts.
pub fn required_ratio(element_height: f64, viewport_height: f64, threshold: f64) -> f64 {
    if viewport_height > 0.0 && element_height > viewport_height {
        f64::MIN_POSITIVE
    } else {
        threshold
    }
}

struct RevealInner {
    window: Window,
    elements: Vec<Element>,
    tracker: RefCell<RevealTracker>,
    observer: RefCell<Option<IntersectionObserver>>,
}

impl RevealInner {
    fn show(&self, index: usize) {
        if let Some(element) = self.elements.get(index) {
            let _ = element.class_list().add_1(VISIBLE_CLASS);
            if let Some(observer) = self.observer.borrow().as_ref() {
                observer.unobserve(element);
            }
        }
    }

    fn show_all(&self) {
        let fresh = self.tracker.borrow_mut().reveal_all();
        for index in fresh {
            self.show(index);
        }
        if let Some(observer) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
    }

    fn on_entries(&self, entries: Array) {
        for entry in entries
            .iter()
            .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
        {
            if !entry.is_intersecting() {
                continue;
            }
            let target = entry.target();
            let Some(index) = self.elements.iter().position(|el| *el == target) else {
                continue;
            };
            let threshold = required_ratio(
                entry.bounding_client_rect().height(),
                platform::viewport_height(&self.window),
                config::REVEAL_THRESHOLD,
            );
            let fresh =
                self.tracker
                    .borrow_mut()
                    .observe(index, entry.intersection_ratio(), threshold);
            if fresh {
                self.show(index);
            }
        }
    }

    fn check_geometry(&self, viewport_height: f64) {
        let pending: Vec<usize> = self.tracker.borrow().pending().collect();
        for index in pending {
            let rect = self.elements[index].get_bounding_client_rect();
            let ratio = visible_ratio(rect.top(), rect.height(), viewport_height);
            let threshold =
                required_ratio(rect.height(), viewport_height, config::REVEAL_THRESHOLD);
            if self.tracker.borrow_mut().observe(index, ratio, threshold)
            {
                self.show(index);
            }
        }
    }
}

/// Reveal-on-scroll for every `.reveal` element.
pub struct Reveal {
    inner: Rc<RevealInner>,
    _callback: Option<Closure<dyn FnMut(Array)>>,
    _scroll: Option<EventListener>,
    _motion: MotionSubscription,
}

impl Reveal {
    pub fn install(
        window: &Window,
        document: &Document,
        capabilities: &Capabilities,
    ) -> Result<Option<Self>, BehaviorError> {
        let nodes = document.query_selector_all(config::REVEAL_SELECTOR)?;
        let elements: Vec<Element> = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        if elements.is_empty() {
            return Ok(None);
        }

        let inner = Rc::new(RevealInner {
            window: window.clone(),
            tracker: RefCell::new(RevealTracker::new(elements.len())),
            elements,
            observer: RefCell::new(None),
        });
        let weak = Rc::downgrade(&inner);
        let motion = capabilities.motion.subscribe({
            let weak = weak.clone();
            move |reduced| {
                if reduced {
                    if let Some(inner) = weak.upgrade() {
                        inner.show_all();
                    }
                }
            }
        });

        if capabilities.reduced_motion() {
            inner.show_all();
            debug!("reduced motion, {} reveal elements shown", inner.elements.len());
            return Ok(Some(Self {
                inner,
                _callback: None,
                _scroll: None,
                _motion: motion,
            }));
        }

        if capabilities.intersection_observer {
            let callback = Closure::<dyn FnMut(Array)>::new({
                let weak = weak.clone();
                move |entries: Array| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_entries(entries);
                    }
                }
            });
            let init = IntersectionObserverInit::new();
            let thresholds = Array::of2(
                &JsValue::from_f64(0.0),
                &JsValue::from_f64(config::REVEAL_THRESHOLD),
            );
            init.set_threshold(&thresholds);
            let observer =
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
            for element in &inner.elements {
                observer.observe(element);
            }
            *inner.observer.borrow_mut() = Some(observer);
            debug!("observing {} reveal elements", inner.elements.len());
            return Ok(Some(Self {
                inner,
                _callback: Some(callback),
                _scroll: None,
                _motion: motion,
            }));
        }

        let scroll = scroll_fallback(window, weak);
        inner.check_geometry(platform::viewport_height(window));
        debug!("no IntersectionObserver, reveal falls back to scroll checks");
        Ok(Some(Self {
            inner,
            _callback: None,
            _scroll: Some(scroll),
            _motion: motion,
        }))
    }
}

fn scroll_fallback(window: &Window, weak: Weak<RevealInner>) -> EventListener {
    let target = window.clone();
    EventListener::new(window, "scroll", move |_| {
        if let Some(inner) = weak.upgrade() {
            if !inner.tracker.borrow().is_complete() {
                inner.check_geometry(platform::viewport_height(&target));
            }
        }
    })
}

impl Drop for Reveal {
    fn drop(&mut self) {
        if let Some(observer) = self.inner.observer.borrow_mut().take() {
            observer.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_is_one_shot() {
        let mut tracker = RevealTracker::new(2);
        assert!(tracker.observe(0, 0.5, 0.12));
        assert!(!tracker.observe(0, 0.9, 0.12));
        assert!(tracker.is_revealed(0));
        assert!(!tracker.is_revealed(1));
    }

    #[test]
    fn revealed_elements_never_revert() {
        let mut tracker = RevealTracker::new(3);
        tracker.observe(1, 0.3, 0.12);
        let ratios = [0.0, 0.05, 1.0, 0.0, 0.11, 0.0];
        for ratio in ratios {
            tracker.observe(1, ratio, 0.12);
            assert!(tracker.is_revealed(1));
        }
    }

    #[test]
    fn below_threshold_is_ignored() {
        let mut tracker = RevealTracker::new(1);
        assert!(!tracker.observe(0, 0.11, 0.12));
        assert!(!tracker.observe(0, 0.0, 0.0));
        assert!(!tracker.is_revealed(0));
        assert!(tracker.observe(0, 0.12, 0.12));
    }

    #[test]
    fn reveal_all_reports_only_new_ones() {
        let mut tracker = RevealTracker::new(3);
        tracker.reveal(1);
        assert_eq!(tracker.reveal_all(), vec![0, 2]);
        assert!(tracker.is_complete());
        assert!(tracker.reveal_all().is_empty());
        assert_eq!(tracker.pending().count(), 0);
    }

    #[test]
    fn out_of_range_index_is_noop() {
        let mut tracker = RevealTracker::new(1);
        assert!(!tracker.reveal(4));
        assert!(!tracker.is_revealed(4));
    }

    #[test]
    fn visible_ratio_from_geometry() {
        assert_eq!(visible_ratio(0.0, 100.0, 800.0), 1.0);
        assert_eq!(visible_ratio(750.0, 100.0, 800.0), 0.5);
        assert_eq!(visible_ratio(-50.0, 100.0, 800.0), 0.5);
        assert_eq!(visible_ratio(900.0, 100.0, 800.0), 0.0);
        assert_eq!(visible_ratio(-300.0, 100.0, 800.0), 0.0);
        assert_eq!(visible_ratio(0.0, 0.0, 800.0), 0.0);
        assert_eq!(visible_ratio(0.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn tall_elements_reveal_on_any_intersection() {
        let viewport = 600.0;
        let tall = 10.0 * viewport;
        // At most a tenth of it is ever on screen.
        let ratio = visible_ratio(-1000.0, tall, viewport);
        assert!(ratio < 0.12);

        let mut tracker = RevealTracker::new(2);
        let threshold = required_ratio(tall, viewport, 0.12);
        assert!(tracker.observe(0, ratio, threshold));
        assert!(!tracker.observe(1, 0.0, threshold));
    }

    #[test]
    fn regular_elements_keep_the_threshold() {
        assert_eq!(required_ratio(300.0, 600.0, 0.12), 0.12);
        assert_eq!(required_ratio(600.0, 600.0, 0.12), 0.12);
        assert_eq!(required_ratio(900.0, 0.0, 0.12), 0.12);
    }
}
