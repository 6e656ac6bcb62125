/// Stateless mapping: `count` equal-width bands over [0, 1].
pub fn partition(progress: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let p = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((p * count as f64).floor() as usize).min(count - 1)
}

/// Band selection with separate enter and exit thresholds around each
/// boundary so scroll jitter near a boundary does not flip scenes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hysteresis {
    count: usize,
    margin: f64,
}

impl Hysteresis {
    pub fn new(count: usize, margin: f64) -> Self {
        let count = count.max(1);
        // A margin of half a band or more would make some bands unreachable.
        let limit = 0.5 / count as f64;
        let margin = if margin.is_finite() {
            margin.clamp(0.0, limit * 0.99)
        } else {
            0.0
        };
        Self { count, margin }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    fn boundary(&self, band: usize) -> f64 {
        band as f64 / self.count as f64
    }

    /// Progress that must be exceeded to leave `current` forwards.
    pub fn enter_threshold(&self, current: usize) -> Option<f64> {
        (current + 1 < self.count).then(|| self.boundary(current + 1) + self.margin)
    }

    /// Progress that must be undercut to leave `current` backwards.
    pub fn exit_threshold(&self, current: usize) -> Option<f64> {
        (current > 0 && current < self.count).then(|| self.boundary(current) - self.margin)
    }

    pub fn next(&self, current: usize, progress: f64) -> usize {
        if !progress.is_finite() {
            return current.min(self.count - 1);
        }
        let mut band = current.min(self.count - 1);
        while let Some(threshold) = self.enter_threshold(band) {
            if progress <= threshold {
                break;
            }
            band += 1;
        }
        while let Some(threshold) = self.exit_threshold(band) {
            if progress >= threshold {
                break;
            }
            band -= 1;
        }
        band
    }
}

/// Index of the center closest to `guideline`; ties go to the earlier one.
pub fn nearest_center(centers: &[f64], guideline: f64) -> Option<usize> {
    centers
        .iter()
        .enumerate()
        .filter(|(_, center)| center.is_finite())
        .min_by(|(_, a), (_, b)| (*a - guideline).abs().total_cmp(&(*b - guideline).abs()))
        .map(|(index, _)| index)
}

/// Block centers closer together than this carry no position information.
pub const MIN_CENTER_SPREAD_PX: f64 = 1.0;

/// `nearest_center`, but only when the centers actually separate. Stacked
/// blocks (all sharing one box) return `None` so the caller can fall back to
/// scroll progress.
pub fn positional_target(centers: &[f64], guideline: f64) -> Option<usize> {
    let finite = centers.iter().copied().filter(|c| c.is_finite());
    let (low, high) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c), hi.max(c))
    });
    if !(high - low >= MIN_CENTER_SPREAD_PX) {
        return None;
    }
    nearest_center(centers, guideline)
}
