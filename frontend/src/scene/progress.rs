/// Smallest span between range start and end, in CSS pixels.
const MIN_SPAN: f64 = 1.0;

/// Document scroll positions between which the story container plays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRange {
    start: f64,
    end: f64,
}

impl Default for ScrollRange {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: MIN_SPAN,
        }
    }
}

impl ScrollRange {
    /// `container_top` is the viewport-relative top from
    /// `getBoundingClientRect`, taken at scroll position `scroll_y`.
    pub fn measure(
        container_top: f64,
        container_height: f64,
        scroll_y: f64,
        viewport_height: f64,
    ) -> Self {
        let start = finite(container_top) + finite(scroll_y);
        let span = finite(container_height).max(0.0) - finite(viewport_height).max(0.0);
        Self {
            start,
            end: start + span.max(MIN_SPAN),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn progress(&self, scroll_y: f64) -> f64 {
        let p = (finite(scroll_y) - self.start) / (self.end - self.start);
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_follows_container() {
        // Container 400px below the fold while scrolled 100px, 3000px tall.
        let range = ScrollRange::measure(400.0, 3000.0, 100.0, 800.0);
        assert_eq!(range.start(), 500.0);
        assert_eq!(range.end(), 2700.0);

        assert_eq!(range.progress(0.0), 0.0);
        assert_eq!(range.progress(500.0), 0.0);
        assert_eq!(range.progress(1600.0), 0.5);
        assert_eq!(range.progress(2700.0), 1.0);
        assert_eq!(range.progress(9000.0), 1.0);
    }

    #[test]
    fn short_container_keeps_end_after_start() {
        let range = ScrollRange::measure(0.0, 300.0, 0.0, 800.0);
        assert!(range.end() > range.start());
        assert_eq!(range.progress(-10.0), 0.0);
        assert_eq!(range.progress(0.5), 0.5);
        assert_eq!(range.progress(5.0), 1.0);
    }

    #[test]
    fn degenerate_geometry_is_safe() {
        let range = ScrollRange::measure(f64::NAN, 0.0, f64::INFINITY, 0.0);
        assert_eq!(range.start(), 0.0);
        assert!(range.end() > range.start());
        assert_eq!(range.progress(f64::NAN), 0.0);
        assert_eq!(ScrollRange::default().progress(0.0), 0.0);
    }
}
