use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::{MediaQueryList, Window};

use crate::config;

/// Keeps a media query change listener alive. Browsers without
/// `MediaQueryList.addEventListener` get the legacy `addListener` variant.
pub struct MediaWatch {
    list: MediaQueryList,
    _listener: Option<EventListener>,
    legacy: Option<Closure<dyn FnMut(JsValue)>>,
}

impl MediaWatch {
    pub fn new<F>(window: &Window, query: &str, on_change: F) -> Option<Self>
    where
        F: Fn(bool) + 'static,
    {
        let list = window.match_media(query).ok().flatten()?;
        let watched = list.clone();

        if has_property(&list, "addEventListener") {
            let listener = EventListener::new(&list, "change", move |_| on_change(watched.matches()));
            return Some(Self {
                list,
                _listener: Some(listener),
                legacy: None,
            });
        }

        let legacy = Closure::<dyn FnMut(JsValue)>::new(move |_| on_change(watched.matches()));
        list.add_listener_with_opt_callback(Some(legacy.as_ref().unchecked_ref()))
            .ok()?;
        Some(Self {
            list,
            _listener: None,
            legacy: Some(legacy),
        })
    }

    pub fn matches(&self) -> bool {
        self.list.matches()
    }
}

impl Drop for MediaWatch {
    fn drop(&mut self) {
        if let Some(legacy) = self.legacy.take() {
            let _ = self
                .list
                .remove_listener_with_opt_callback(Some(legacy.as_ref().unchecked_ref()));
        }
    }
}

/// Page-lifetime reduced-motion preference. Cloning shares the same flag.
#[derive(Clone, Default)]
pub struct MotionFlag {
    inner: Rc<MotionInner>,
}

#[derive(Default)]
struct MotionInner {
    reduced: Cell<bool>,
    subscribers: RefCell<Vec<Weak<dyn Fn(bool)>>>,
}

/// Dropping the subscription stops notifications.
pub struct MotionSubscription {
    _callback: Rc<dyn Fn(bool)>,
}

impl MotionFlag {
    pub fn new(reduced: bool) -> Self {
        let flag = Self::default();
        flag.inner.reduced.set(reduced);
        flag
    }

    pub fn reduced(&self) -> bool {
        self.inner.reduced.get()
    }

    pub fn set(&self, reduced: bool) {
        if self.inner.reduced.replace(reduced) == reduced {
            return;
        }
        debug!("reduced motion is now {}", reduced);

        let live: Vec<Rc<dyn Fn(bool)>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(reduced);
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> MotionSubscription
    where
        F: Fn(bool) + 'static,
    {
        let callback: Rc<dyn Fn(bool)> = Rc::new(callback);
        self.inner
            .subscribers
            .borrow_mut()
            .push(Rc::downgrade(&callback));
        MotionSubscription {
            _callback: callback,
        }
    }
}

/// Platform capabilities read once when the page behaviors are installed and
/// handed to every behavior.
#[derive(Clone)]
pub struct Capabilities {
    pub motion: MotionFlag,
    pub intersection_observer: bool,
    pub resize_observer: bool,
    _motion_watch: Option<Rc<MediaWatch>>,
}

impl Capabilities {
    pub fn detect(window: &Window) -> Self {
        let motion = MotionFlag::default();
        let flag = motion.clone();
        let watch = MediaWatch::new(window, config::REDUCED_MOTION_QUERY, move |reduced| {
            flag.set(reduced)
        });
        if let Some(watch) = &watch {
            motion.set(watch.matches());
        }

        let capabilities = Self {
            motion,
            intersection_observer: has_property(window, "IntersectionObserver"),
            resize_observer: has_property(window, "ResizeObserver"),
            _motion_watch: watch.map(Rc::new),
        };
        debug!(
            "capabilities: reduced_motion={} intersection_observer={} resize_observer={}",
            capabilities.reduced_motion(),
            capabilities.intersection_observer,
            capabilities.resize_observer
        );
        capabilities
    }

    pub fn reduced_motion(&self) -> bool {
        self.motion.reduced()
    }
}

fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_hear_changes_only() {
        let flag = MotionFlag::new(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = flag.subscribe(move |reduced| sink.borrow_mut().push(reduced));

        flag.set(false);
        flag.set(true);
        flag.set(true);
        flag.set(false);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn dropped_subscription_is_not_called() {
        let flag = MotionFlag::new(false);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let sub = flag.subscribe(move |_| counter.set(counter.get() + 1));
        drop(sub);

        flag.set(true);
        assert_eq!(calls.get(), 0);
        assert!(flag.reduced());
    }

    #[test]
    fn clones_share_state() {
        let flag = MotionFlag::new(false);
        let other = flag.clone();
        other.set(true);
        assert!(flag.reduced());
    }
}
