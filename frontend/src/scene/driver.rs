use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, ResizeObserver, Window,
};

use crate::config::{self, SceneTuning};
use crate::effects::debug_overlay::{DebugReporter, SceneSnapshot};
use crate::error::BehaviorError;
use crate::platform::{self, Capabilities, FrameScheduler, MotionFlag, MotionSubscription};

use super::controller::{SceneController, Step};
use super::progress::ScrollRange;
use super::selector::positional_target;
use super::{SceneId, SceneSet};

const ACTIVE_CLASS: &str = "is-active";

/// Window events after which the scroll range is measured again. `pageshow`
/// covers pages restored from the back/forward cache.
const REMEASURE_EVENTS: [&str; 3] = ["resize", "orientationchange", "pageshow"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Container visibility comes from an IntersectionObserver and scroll
    /// updates are batched per animation frame.
    Observed,
    /// No observer: every scroll event recomputes and scenes are picked by
    /// block position.
    Direct,
}

struct DriverInner {
    window: Window,
    container: Element,
    images: Vec<(usize, Element)>,
    blocks: Vec<(usize, Element)>,
    scenes: SceneSet,
    controller: RefCell<SceneController>,
    range: Cell<ScrollRange>,
    progress: Cell<f64>,
    motion: MotionFlag,
    mode: Mode,
    in_view: Cell<bool>,
    guideline_ratio: f64,
    frame: FrameScheduler,
    dwell: RefCell<Option<Timeout>>,
    reporter: Option<DebugReporter>,
}

impl DriverInner {
    fn measure(&self) {
        let rect = self.container.get_bounding_client_rect();
        self.range.set(ScrollRange::measure(
            rect.top(),
            rect.height(),
            platform::scroll_y(&self.window),
            platform::viewport_height(&self.window),
        ));
    }

    fn nearest_block(&self) -> Option<usize> {
        let guideline = platform::viewport_height(&self.window) * self.guideline_ratio;
        let centers: Vec<f64> = self
            .blocks
            .iter()
            .map(|(_, block)| {
                let rect = block.get_bounding_client_rect();
                rect.top() + rect.height() / 2.0
            })
            .collect();
        positional_target(&centers, guideline).map(|i| self.blocks[i].0)
    }

    fn decide(&self, now_ms: f64, force: bool) -> Step {
        let progress = self.range.get().progress(platform::scroll_y(&self.window));
        self.progress.set(progress);
        let reduced = self.motion.reduced();

        let by_position = match self.mode {
            Mode::Direct if !reduced => self.nearest_block(),
            _ => None,
        };
        choose_step(
            &mut self.controller.borrow_mut(),
            by_position,
            progress,
            now_ms,
            reduced,
            force,
        )
    }

    fn render(&self, index: usize) {
        for (scene, image) in &self.images {
            let _ = image
                .class_list()
                .toggle_with_force(ACTIVE_CLASS, *scene == index);
        }
        for (scene, block) in &self.blocks {
            let active = *scene == index;
            let _ = block.class_list().toggle_with_force(ACTIVE_CLASS, active);
            if active {
                let _ = block.set_attribute("aria-current", "step");
            } else {
                let _ = block.remove_attribute("aria-current");
            }
        }
        if let Some(id) = self.scenes.get(index) {
            let _ = self
                .container
                .set_attribute("data-active-scene", &id.to_string());
        }
    }

    fn report(&self) {
        if let Some(reporter) = &self.reporter {
            let controller = self.controller.borrow();
            reporter.report(SceneSnapshot {
                progress: self.progress.get(),
                active: controller.active(),
                pending: controller.pending(),
                stats: controller.stats(),
            });
        }
    }

    fn cancel_dwell(&self) {
        self.dwell.borrow_mut().take();
    }

    fn on_page_hide(&self) {
        self.cancel_dwell();
        self.frame.cancel();
        self.controller.borrow_mut().cancel_pending();
        self.report();
    }
}

/// A positional target (direct mode with separated blocks) goes through the
/// dwell rules as is; otherwise the controller picks from scroll progress.
fn choose_step(
    controller: &mut SceneController,
    by_position: Option<usize>,
    progress: f64,
    now_ms: f64,
    reduced: bool,
    force: bool,
) -> Step {
    match (by_position, force) {
        (Some(target), true) => controller.force(target, now_ms),
        (Some(target), false) => controller.propose(target, now_ms, false),
        (None, true) => {
            let target = controller.target_for(progress, true);
            controller.force(target, now_ms)
        }
        (None, false) => controller.update(progress, now_ms, reduced),
    }
}

/// Scenes are logged 1-based, the way `data-scene` numbers them.
fn transition_label(previous: Option<usize>, index: usize) -> String {
    match previous {
        Some(previous) => format!("scene {} -> {}", previous + 1, index + 1),
        None => format!("scene {}", index + 1),
    }
}

fn recompute(inner: &Rc<DriverInner>, force: bool) {
    let step = inner.decide(platform::now_ms(), force);
    match step {
        Step::Activate { index, previous } => {
            inner.cancel_dwell();
            inner.render(index);
            debug!("{}", transition_label(previous, index));
        }
        Step::Defer { wait_ms, .. } => arm_dwell(inner, wait_ms),
        Step::Idle => inner.cancel_dwell(),
    }
    inner.report();
}

/// Replaces any armed timer, so at most one deferred re-evaluation exists.
fn arm_dwell(inner: &Rc<DriverInner>, wait_ms: f64) {
    let weak = Rc::downgrade(inner);
    let millis = wait_ms.ceil().clamp(0.0, f64::from(u32::MAX)) as u32;
    let timeout = Timeout::new(millis, move || {
        if let Some(inner) = weak.upgrade() {
            recompute(&inner, false);
        }
    });
    *inner.dwell.borrow_mut() = Some(timeout);
}

fn schedule(inner: &Rc<DriverInner>) {
    match inner.mode {
        Mode::Direct => recompute(inner, false),
        Mode::Observed => {
            if !inner.in_view.get() {
                return;
            }
            let weak = Rc::downgrade(inner);
            inner.frame.schedule(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.frame.begin_frame();
                    recompute(&inner, false);
                }
            });
        }
    }
}

fn remeasure(inner: &Rc<DriverInner>) {
    inner.measure();
    schedule(inner);
}

fn with_inner(weak: &Weak<DriverInner>, f: impl FnOnce(&Rc<DriverInner>)) {
    if let Some(inner) = weak.upgrade() {
        f(&inner);
    }
}

fn collect(container: &Element, selector: &str) -> Result<Vec<(SceneId, Element)>, BehaviorError> {
    let nodes = container.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .filter_map(|element| {
            let id = element
                .get_attribute("data-scene")
                .and_then(|raw| SceneId::parse(&raw))?;
            Some((id, element))
        })
        .collect())
}

/// Scene switcher bound to the `#story` container. Dropping it removes every
/// listener and observer it registered.
pub struct SceneDriver {
    inner: Rc<DriverInner>,
    _listeners: Vec<EventListener>,
    _motion: MotionSubscription,
    intersection: Option<(IntersectionObserver, Closure<dyn FnMut(Array)>)>,
    resize: Option<(ResizeObserver, Closure<dyn FnMut(Array)>)>,
}

impl SceneDriver {
    pub fn install(
        window: &Window,
        document: &Document,
        capabilities: &Capabilities,
        tuning: SceneTuning,
        reporter: Option<DebugReporter>,
    ) -> Result<Option<Self>, BehaviorError> {
        let Some(container) = document.query_selector(config::STORY_SELECTOR)? else {
            debug!("no story container, scene switcher off");
            return Ok(None);
        };
        let images = collect(&container, config::SCENE_IMAGE_SELECTOR)?;
        let blocks = collect(&container, config::SCENE_BLOCK_SELECTOR)?;
        let image_ids: Vec<SceneId> = images.iter().map(|(id, _)| *id).collect();
        let block_ids: Vec<SceneId> = blocks.iter().map(|(id, _)| *id).collect();
        let Some(scenes) = SceneSet::pair(&image_ids, &block_ids) else {
            debug!(
                "{} images / {} blocks do not make two scenes, scene switcher off",
                images.len(),
                blocks.len()
            );
            return Ok(None);
        };

        let index_elements = |elements: Vec<(SceneId, Element)>| -> Vec<(usize, Element)> {
            elements
                .into_iter()
                .filter_map(|(id, element)| scenes.position(id).map(|i| (i, element)))
                .collect()
        };
        let images = index_elements(images);
        let blocks = index_elements(blocks);

        let mode = if capabilities.intersection_observer {
            Mode::Observed
        } else {
            Mode::Direct
        };
        let inner = Rc::new(DriverInner {
            window: window.clone(),
            container,
            images,
            blocks,
            controller: RefCell::new(SceneController::new(scenes.len(), &tuning)),
            scenes,
            range: Cell::new(ScrollRange::default()),
            progress: Cell::new(0.0),
            motion: capabilities.motion.clone(),
            mode,
            in_view: Cell::new(mode == Mode::Direct),
            guideline_ratio: tuning.guideline_ratio,
            frame: FrameScheduler::default(),
            dwell: RefCell::new(None),
            reporter,
        });

        inner.measure();
        recompute(&inner, true);

        let weak = Rc::downgrade(&inner);
        let listen = |event: &'static str, f: fn(&Rc<DriverInner>)| {
            let weak = weak.clone();
            EventListener::new(window, event, move |_| with_inner(&weak, f))
        };
        let mut listeners = vec![
            listen("scroll", schedule),
            listen("pagehide", |inner| inner.on_page_hide()),
        ];
        listeners.extend(REMEASURE_EVENTS.into_iter().map(|event| listen(event, remeasure)));

        let motion = {
            let weak = weak.clone();
            capabilities
                .motion
                .subscribe(move |_| with_inner(&weak, remeasure))
        };

        let intersection = if mode == Mode::Observed {
            let weak = weak.clone();
            let callback = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
                let Some(entry) = entries
                    .iter()
                    .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                    .last()
                else {
                    return;
                };
                with_inner(&weak, |inner| {
                    inner.in_view.set(entry.is_intersecting());
                    if entry.is_intersecting() {
                        remeasure(inner);
                    }
                });
            });
            let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
            observer.observe(&inner.container);
            Some((observer, callback))
        } else {
            None
        };

        let resize = if capabilities.resize_observer {
            let weak = weak.clone();
            let callback =
                Closure::<dyn FnMut(Array)>::new(move |_| with_inner(&weak, remeasure));
            let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
            observer.observe(&inner.container);
            Some((observer, callback))
        } else {
            None
        };

        let fonts = document.fonts();
        spawn_local(async move {
            if let Ok(ready) = fonts.ready() {
                if JsFuture::from(ready).await.is_ok() {
                    with_inner(&weak, remeasure);
                }
            }
        });

        debug!("scene switcher on: {} scenes, mode {:?}", inner.scenes.len(), mode);
        Ok(Some(Self {
            inner,
            _listeners: listeners,
            _motion: motion,
            intersection,
            resize,
        }))
    }
}

impl Drop for SceneDriver {
    fn drop(&mut self) {
        if let Some((observer, _)) = &self.intersection {
            observer.disconnect();
        }
        if let Some((observer, _)) = &self.resize {
            observer.disconnect();
        }
        self.inner.cancel_dwell();
        self.inner.frame.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::selector::positional_target;

    const VIEWPORT: f64 = 600.0;

    fn guideline() -> f64 {
        VIEWPORT * SceneTuning::default().guideline_ratio
    }

    #[test]
    fn stacked_blocks_advance_through_every_scene() {
        let mut controller = SceneController::new(3, &SceneTuning::default());
        let stacked = [400.0, 400.0, 400.0];
        choose_step(&mut controller, positional_target(&stacked, guideline()), 0.0, 0.0, false, true);
        assert_eq!(controller.active(), Some(0));

        let mut visited = vec![0];
        let mut now = 0.0;
        for i in 0..=100 {
            now += 1100.0;
            let progress = i as f64 / 100.0;
            let by_position = positional_target(&stacked, guideline());
            if let Step::Activate { index, .. } =
                choose_step(&mut controller, by_position, progress, now, false, false)
            {
                visited.push(index);
            }
        }
        assert_eq!(visited, vec![0, 1, 2]);
    }

    #[test]
    fn separated_blocks_follow_the_guideline() {
        let mut controller = SceneController::new(3, &SceneTuning::default());
        let mut now = 0.0;
        // Blocks in normal flow scroll past the guideline one after another.
        for (offset, expected) in [(0.0, 0), (500.0, 1), (1000.0, 2)] {
            now += 1100.0;
            let centers = [250.0 - offset, 750.0 - offset, 1250.0 - offset];
            let by_position = positional_target(&centers, guideline());
            choose_step(&mut controller, by_position, 0.0, now, false, now == 1100.0);
            assert_eq!(controller.active(), Some(expected));
        }
    }

    #[test]
    fn transitions_log_scene_numbers() {
        assert_eq!(transition_label(Some(1), 2), "scene 2 -> 3");
        assert_eq!(transition_label(None, 0), "scene 1");
    }

    #[test]
    fn restored_pages_are_measured_again() {
        assert!(REMEASURE_EVENTS.contains(&"pageshow"));
        assert!(REMEASURE_EVENTS.contains(&"resize"));
        assert!(REMEASURE_EVENTS.contains(&"orientationchange"));
    }
}
