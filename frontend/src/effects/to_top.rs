use gloo_events::EventListener;
use web_sys::{Document, Element, ScrollToOptions, Window};

use crate::config;
use crate::error::BehaviorError;
use crate::platform::{self, MotionFlag};

use super::anchors::scroll_behavior;

const SHOW_CLASS: &str = "is-show";

pub fn to_top_visible(scroll_y: f64) -> bool {
    scroll_y > config::TO_TOP_THRESHOLD_PX
}

/// Back-to-top button: shown past the threshold, scrolls home on click.
pub struct ToTop {
    _listeners: [EventListener; 2],
}

fn sync(button: &Element, window: &Window) {
    let _ = button
        .class_list()
        .toggle_with_force(SHOW_CLASS, to_top_visible(platform::scroll_y(window)));
}

impl ToTop {
    pub fn install(
        window: &Window,
        document: &Document,
        motion: MotionFlag,
    ) -> Result<Option<Self>, BehaviorError> {
        let Some(button) = document.query_selector(config::TO_TOP_SELECTOR)? else {
            return Ok(None);
        };
        sync(&button, window);

        let scroll = {
            let button = button.clone();
            let target = window.clone();
            EventListener::new(window, "scroll", move |_| sync(&button, &target))
        };
        let click = {
            let target = window.clone();
            EventListener::new(&button, "click", move |_| {
                let options = ScrollToOptions::new();
                options.set_top(0.0);
                options.set_behavior(scroll_behavior(motion.reduced()));
                target.scroll_to_with_scroll_to_options(&options);
            })
        };
        Ok(Some(Self {
            _listeners: [scroll, click],
        }))
    }
}
