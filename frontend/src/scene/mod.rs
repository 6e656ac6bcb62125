//! Scroll-driven "cinematic" scene switcher.
//!
//! `progress`, `selector` and `controller` are plain state and arithmetic so
//! the transition rules can be exercised without a browser; `driver` binds
//! them to the `#story` container.

pub mod controller;
pub mod driver;
pub mod progress;
pub mod selector;

use std::fmt;

pub use controller::{SceneController, Step};
pub use driver::SceneDriver;
pub use progress::ScrollRange;

/// Fewer pairs than this and the switcher stays off.
pub const MIN_SCENES: usize = 2;

/// Value of a `data-scene` attribute, "1".."N".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u8);

impl SceneId {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u8>()
            .ok()
            .filter(|n| *n >= 1)
            .map(SceneId)
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered scenes that have both an image and a text block.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSet {
    ids: Vec<SceneId>,
}

impl SceneSet {
    /// Keeps identifiers present in both lists, in ascending order.
    pub fn pair(image_ids: &[SceneId], block_ids: &[SceneId]) -> Option<Self> {
        let mut ids: Vec<SceneId> = image_ids
            .iter()
            .copied()
            .filter(|id| block_ids.contains(id))
            .collect();
        ids.sort();
        ids.dedup();
        (ids.len() >= MIN_SCENES).then_some(Self { ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn get(&self, index: usize) -> Option<SceneId> {
        self.ids.get(index).copied()
    }

    pub fn position(&self, id: SceneId) -> Option<usize> {
        self.ids.iter().position(|known| *known == id)
    }

    /// Unknown or malformed identifiers resolve to `None`.
    pub fn resolve(&self, raw: &str) -> Option<usize> {
        SceneId::parse(raw).and_then(|id| self.position(id))
    }
}
