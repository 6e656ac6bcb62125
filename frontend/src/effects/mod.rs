//! DOM behaviors attached after the landing page has rendered.

pub mod anchors;
pub mod debug_overlay;
pub mod parallax;
pub mod reveal;
pub mod to_top;

use log::{info, warn};
use web_sys::window;

use crate::config::{ParallaxTuning, SceneTuning};
use crate::error::BehaviorError;
use crate::platform::Capabilities;
use crate::scene::SceneDriver;

use anchors::AnchorScroll;
use debug_overlay::DebugOverlay;
use parallax::Parallax;
use reveal::Reveal;
use to_top::ToTop;

/// Everything the page installs, torn down together when dropped. Each
/// behavior fails on its own; the others keep working.
pub struct PageBehaviors {
    _capabilities: Capabilities,
    _anchors: AnchorScroll,
    _to_top: Option<ToTop>,
    _scene: Option<SceneDriver>,
    _reveal: Option<Reveal>,
    _parallax: Option<Parallax>,
    _overlay: Option<DebugOverlay>,
}

fn settle<T>(name: &str, result: Result<Option<T>, BehaviorError>) -> Option<T> {
    match result {
        Ok(Some(behavior)) => Some(behavior),
        Ok(None) => {
            info!("{} not present on this page", name);
            None
        }
        Err(err) => {
            warn!("{} disabled: {}", name, err);
            None
        }
    }
}

impl PageBehaviors {
    pub fn install(debug: bool) -> Result<Self, BehaviorError> {
        let window = window().ok_or(BehaviorError::NoWindow)?;
        let document = window
            .document()
            .ok_or(BehaviorError::MissingElement("document"))?;
        let capabilities = Capabilities::detect(&window);

        let overlay = if debug {
            settle("debug overlay", DebugOverlay::install(&document).map(Some))
        } else {
            None
        };
        let reporter = overlay.as_ref().map(DebugOverlay::reporter);

        let scene = settle(
            "scene switcher",
            SceneDriver::install(
                &window,
                &document,
                &capabilities,
                SceneTuning::default(),
                reporter,
            ),
        );
        let reveal = settle("reveal", Reveal::install(&window, &document, &capabilities));
        let parallax = settle(
            "parallax",
            Parallax::install(&window, &document, &capabilities, ParallaxTuning::default()),
        );
        let to_top = settle(
            "back-to-top button",
            ToTop::install(&window, &document, capabilities.motion.clone()),
        );
        let anchors = AnchorScroll::install(&document, capabilities.motion.clone());

        Ok(Self {
            _capabilities: capabilities,
            _anchors: anchors,
            _to_top: to_top,
            _scene: scene,
            _reveal: reveal,
            _parallax: parallax,
            _overlay: overlay,
        })
    }
}
