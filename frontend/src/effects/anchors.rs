use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::platform::MotionFlag;

/// Fragment selector an in-page link should scroll to. A bare `#` is left
/// to the browser.
pub fn anchor_target(href: &str) -> Option<&str> {
    let href = href.trim();
    (href.starts_with('#') && href.len() > 1).then_some(href)
}

pub fn scroll_behavior(reduced_motion: bool) -> ScrollBehavior {
    if reduced_motion {
        ScrollBehavior::Auto
    } else {
        ScrollBehavior::Smooth
    }
}

/// Document-level click handler turning same-page links into smooth scrolls.
pub struct AnchorScroll {
    _listener: EventListener,
}

impl AnchorScroll {
    pub fn install(document: &Document, motion: MotionFlag) -> Self {
        let doc = document.clone();
        let listener = EventListener::new_with_options(
            document,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                let Some(target) = link_target(&doc, event) else {
                    return;
                };
                event.prevent_default();
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(scroll_behavior(motion.reduced()));
                options.set_block(ScrollLogicalPosition::Start);
                target.scroll_into_view_with_scroll_into_view_options(&options);
            },
        );
        Self {
            _listener: listener,
        }
    }
}

fn link_target(document: &Document, event: &Event) -> Option<Element> {
    let clicked = event.target()?.dyn_into::<Element>().ok()?;
    let link = clicked.closest("a[href^=\"#\"]").ok()??;
    let href = link.get_attribute("href")?;
    let selector = anchor_target(&href)?;
    // An id that is not a valid selector throws; treat it as no match.
    document.query_selector(selector).ok()?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_links_resolve() {
        assert_eq!(anchor_target("#contact"), Some("#contact"));
        assert_eq!(anchor_target(" #story "), Some("#story"));
    }

    #[test]
    fn bare_hash_and_other_links_are_left_alone() {
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target(""), None);
        assert_eq!(anchor_target("/privacy#top"), None);
        assert_eq!(anchor_target("mailto:info@lumirize.com"), None);
    }

    #[test]
    fn reduced_motion_jumps() {
        assert_eq!(scroll_behavior(true), ScrollBehavior::Auto);
        assert_eq!(scroll_behavior(false), ScrollBehavior::Smooth);
    }
}
