use log::Level;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

pub const CONTACT_RECIPIENT: &str = "info@lumirize.com";
pub const RAW_MODE_STORAGE_KEY: &str = "lumirize:raw";
pub const DEBUG_QUERY_PARAM: &str = "debug";

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
pub const DESKTOP_QUERY: &str = "(min-width: 900px)";

pub const STORY_SELECTOR: &str = "#story";
pub const SCENE_IMAGE_SELECTOR: &str = ".cinematic__img";
pub const SCENE_BLOCK_SELECTOR: &str = ".cinematic__block";
pub const REVEAL_SELECTOR: &str = ".reveal";
pub const PARALLAX_SELECTOR: &str = "[data-parallax]";
pub const TO_TOP_SELECTOR: &str = ".toTop";

/// Scroll distance after which the back-to-top button shows up.
pub const TO_TOP_THRESHOLD_PX: f64 = 600.0;

/// Intersection ratio an element must reach before it is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTuning {
    /// Offset applied on both sides of each band boundary.
    pub hysteresis_margin: f64,
    /// Minimum time a scene stays active before another one may take over.
    pub min_dwell_ms: f64,
    /// Fraction of the viewport height used as the guideline when scenes
    /// are picked by block position instead of scroll progress.
    pub guideline_ratio: f64,
}

impl Default for SceneTuning {
    fn default() -> Self {
        Self {
            hysteresis_margin: 0.03,
            min_dwell_ms: 1000.0,
            guideline_ratio: 0.48,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxTuning {
    pub speed: f64,
    /// Maximum offset as a fraction of the viewport height.
    pub max_ratio: f64,
    pub easing: f64,
    pub epsilon_px: f64,
}

impl Default for ParallaxTuning {
    fn default() -> Self {
        Self {
            speed: 0.06,
            max_ratio: 0.02,
            easing: 0.16,
            epsilon_px: 0.04,
        }
    }
}
