use crate::config::SceneTuning;

use super::selector::{partition, Hysteresis};

/// What the driver has to do after an update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Nothing changes.
    Idle,
    /// Switch the view to `index`.
    Activate { index: usize, previous: Option<usize> },
    /// `target` wins once the dwell interval has passed; re-evaluate after
    /// `wait_ms`.
    Defer { target: usize, wait_ms: f64 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionStats {
    pub activations: u32,
    pub deferrals: u32,
}

/// Active scene bookkeeping. Owns the only mutable scene state on the page.
#[derive(Clone, Debug)]
pub struct SceneController {
    count: usize,
    hysteresis: Hysteresis,
    min_dwell_ms: f64,
    active: Option<usize>,
    last_activation_ms: Option<f64>,
    pending: Option<usize>,
    stats: TransitionStats,
}

impl SceneController {
    pub fn new(count: usize, tuning: &SceneTuning) -> Self {
        let count = count.max(1);
        Self {
            count,
            hysteresis: Hysteresis::new(count, tuning.hysteresis_margin),
            min_dwell_ms: tuning.min_dwell_ms.max(0.0),
            active: None,
            last_activation_ms: None,
            pending: None,
            stats: TransitionStats::default(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn stats(&self) -> TransitionStats {
        self.stats
    }

    /// Scene the controller would like to show at `progress`.
    pub fn target_for(&self, progress: f64, reduced_motion: bool) -> usize {
        match self.active {
            Some(current) if !reduced_motion => self.hysteresis.next(current, progress),
            _ => partition(progress, self.count),
        }
    }

    pub fn update(&mut self, progress: f64, now_ms: f64, reduced_motion: bool) -> Step {
        let target = self.target_for(progress, reduced_motion);
        self.propose(target, now_ms, reduced_motion)
    }

    /// Feeds an externally chosen target (nearest-block selection) through
    /// the same dwell rules.
    pub fn propose(&mut self, target: usize, now_ms: f64, reduced_motion: bool) -> Step {
        let target = target.min(self.count - 1);
        let Some(current) = self.active else {
            return self.activate(target, now_ms);
        };
        if current == target {
            self.pending = None;
            return Step::Idle;
        }
        if reduced_motion {
            return self.activate(target, now_ms);
        }

        let elapsed = self
            .last_activation_ms
            .map_or(f64::INFINITY, |last| now_ms - last);
        if elapsed >= self.min_dwell_ms {
            return self.activate(target, now_ms);
        }

        self.pending = Some(target);
        self.stats.deferrals += 1;
        Step::Defer {
            target,
            wait_ms: (self.min_dwell_ms - elapsed).min(self.min_dwell_ms),
        }
    }

    /// Activation that skips the "already active" short-circuit, used when
    /// the view has to be brought in line with the controller regardless of
    /// the markup's initial classes.
    pub fn force(&mut self, index: usize, now_ms: f64) -> Step {
        self.activate(index.min(self.count - 1), now_ms)
    }

    /// Forget any deferred transition, e.g. when the page is hidden.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    fn activate(&mut self, index: usize, now_ms: f64) -> Step {
        let previous = self.active.replace(index);
        self.last_activation_ms = Some(now_ms);
        self.pending = None;
        self.stats.activations += 1;
        Step::Activate { index, previous }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller(count: usize) -> SceneController {
        SceneController::new(count, &SceneTuning::default())
    }

    #[test]
    fn first_update_activates_partition() {
        let mut c = controller(3);
        assert_eq!(
            c.update(0.9, 0.0, false),
            Step::Activate {
                index: 2,
                previous: None
            }
        );
        assert_eq!(c.active(), Some(2));
    }

    #[test]
    fn exactly_one_active_for_all_progress() {
        for count in 2..=3 {
            for reduced in [false, true] {
                let mut c = controller(count);
                let mut now = 0.0;
                for i in 0..=200 {
                    let p = i as f64 / 200.0;
                    now += 1500.0;
                    c.update(p, now, reduced);
                    let active = c.active().expect("a scene is always active");
                    assert!(active < count);
                }
                for i in (0..=200).rev() {
                    let p = i as f64 / 200.0;
                    now += 16.0;
                    c.update(p, now, reduced);
                    assert!(c.active().is_some());
                }
            }
        }
    }

    #[test]
    fn transition_inside_dwell_is_deferred() {
        let mut c = controller(2);
        c.force(0, 0.0);
        match c.update(0.9, 400.0, false) {
            Step::Defer { target, wait_ms } => {
                assert_eq!(target, 1);
                assert_eq!(wait_ms, 600.0);
            }
            other => panic!("expected deferral, got {:?}", other),
        }
        assert_eq!(c.active(), Some(0));
        assert_eq!(c.pending(), Some(1));

        assert_eq!(
            c.update(0.9, 1000.0, false),
            Step::Activate {
                index: 1,
                previous: Some(0)
            }
        );
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn returning_to_active_scene_clears_pending() {
        let mut c = controller(2);
        c.force(0, 0.0);
        assert!(matches!(c.update(0.9, 100.0, false), Step::Defer { .. }));
        assert_eq!(c.update(0.1, 200.0, false), Step::Idle);
        assert_eq!(c.pending(), None);
    }

    proptest! {
        #[test]
        fn activations_respect_dwell_for_any_sequence(
            steps in prop::collection::vec((0.0f64..=1.0, 0.0f64..400.0), 1..400),
        ) {
            let tuning = SceneTuning::default();
            let mut c = SceneController::new(3, &tuning);
            let mut last: Option<f64> = None;
            let mut now = 0.0;
            for (progress, dt) in steps {
                now += dt;
                if let Step::Activate { .. } = c.update(progress, now, false) {
                    if let Some(previous) = last {
                        prop_assert!(now - previous >= tuning.min_dwell_ms, "{} then {}", previous, now);
                    }
                    last = Some(now);
                }
                prop_assert!(c.active().is_some());
            }
        }
    }

    #[test]
    fn newer_deferral_replaces_pending_target() {
        let mut c = controller(3);
        c.force(0, 0.0);

        assert_eq!(
            c.update(0.5, 100.0, false),
            Step::Defer {
                target: 1,
                wait_ms: 900.0
            }
        );
        assert_eq!(c.pending(), Some(1));

        assert_eq!(
            c.update(0.95, 300.0, false),
            Step::Defer {
                target: 2,
                wait_ms: 700.0
            }
        );
        assert_eq!(c.pending(), Some(2));
        assert_eq!(c.stats().activations, 1);

        assert_eq!(
            c.update(0.95, 1000.0, false),
            Step::Activate {
                index: 2,
                previous: Some(0)
            }
        );
        assert_eq!(c.pending(), None);
        assert_eq!(c.stats().activations, 2);
        assert_eq!(c.update(0.95, 1200.0, false), Step::Idle);
        assert_eq!(c.stats().activations, 2);
    }

    #[test]
    fn reduced_motion_uses_partition_without_dwell() {
        let mut c = controller(2);
        c.force(0, 0.0);
        assert_eq!(
            c.update(0.51, 10.0, true),
            Step::Activate {
                index: 1,
                previous: Some(0)
            }
        );
        assert_eq!(
            c.update(0.49, 20.0, true),
            Step::Activate {
                index: 0,
                previous: Some(1)
            }
        );
    }

    #[test]
    fn force_bypasses_already_active() {
        let mut c = controller(2);
        c.force(1, 0.0);
        assert_eq!(
            c.force(1, 5.0),
            Step::Activate {
                index: 1,
                previous: Some(1)
            }
        );
        assert_eq!(c.stats().activations, 2);
    }

    #[test]
    fn out_of_range_targets_are_clamped() {
        let mut c = controller(2);
        c.force(9, 0.0);
        assert_eq!(c.active(), Some(1));
        assert_eq!(c.propose(5, 5000.0, false), Step::Idle);
    }

    #[test]
    fn cancel_pending_drops_deferred_target() {
        let mut c = controller(2);
        c.force(0, 0.0);
        c.update(1.0, 10.0, false);
        c.cancel_pending();
        assert_eq!(c.pending(), None);
        assert_eq!(c.active(), Some(0));
    }
}
