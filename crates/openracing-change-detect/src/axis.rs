//! Axis movement detection

/// An axis that moved, and by how much.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMovement {
    /// 0-based axis slot
    pub axis: usize,
    pub delta: f64,
}

/// Largest delta strictly above `threshold`; lower index wins ties.
fn largest_change<'a>(
    current: &[f64],
    reference: impl IntoIterator<Item = &'a f64>,
    threshold: f64,
) -> Option<AxisMovement> {
    let mut best: Option<AxisMovement> = None;
    for (axis, (now, before)) in current.iter().zip(reference).enumerate() {
        let delta = (now - before).abs();
        if delta > threshold && best.is_none_or(|b| delta > b.delta) {
            best = Some(AxisMovement { axis, delta });
        }
    }
    best
}

/// Tick-to-tick movement tracker for one device.
///
/// The first snapshot becomes the baseline; afterwards each snapshot is
/// compared with the one before it.
#[derive(Debug, Clone)]
pub struct AxisTracker {
    epsilon: f64,
    previous: Option<Vec<f64>>,
}

impl AxisTracker {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            previous: None,
        }
    }

    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    /// Feed one tick. Returns the axis with the largest delta above epsilon.
    pub fn observe(&mut self, axes: &[f64]) -> Option<AxisMovement> {
        let movement = self
            .previous
            .as_ref()
            .and_then(|previous| largest_change(axes, previous, self.epsilon));
        self.previous = Some(axes.to_vec());
        movement
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Movement tracker against a fixed baseline, for all-devices scans.
#[derive(Debug, Clone)]
pub struct BaselineAxisTracker {
    threshold: f64,
    baseline: Vec<f64>,
}

impl BaselineAxisTracker {
    pub fn new(baseline: &[f64], threshold: f64) -> Self {
        Self {
            threshold,
            baseline: baseline.to_vec(),
        }
    }

    /// Largest change from the baseline above the threshold. Axes missing
    /// from the baseline are ignored.
    pub fn observe(&self, axes: &[f64]) -> Option<AxisMovement> {
        largest_change(axes, &self.baseline, self.threshold)
    }
}

/// Best axis movement seen so far across the devices of one scan.
///
/// Offers are compared strictly, so among equal deltas the device that was
/// ticked first keeps the candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisCandidate {
    best: Option<(usize, AxisMovement)>,
}

impl AxisCandidate {
    /// Offer the movement seen on `device` (its position in the scan list).
    /// Returns true if it replaced the current candidate.
    pub fn offer(&mut self, device: usize, movement: AxisMovement) -> bool {
        let better = self
            .best
            .is_none_or(|(_, current)| movement.delta > current.delta);
        if better {
            self.best = Some((device, movement));
        }
        better
    }

    /// True once the candidate's delta exceeds `commit_threshold`.
    pub fn is_committed(&self, commit_threshold: f64) -> bool {
        self.best
            .is_some_and(|(_, movement)| movement.delta > commit_threshold)
    }

    pub fn best(&self) -> Option<(usize, AxisMovement)> {
        self.best
    }

    /// Forget the candidate if it belongs to `device`, e.g. after the device
    /// was unplugged.
    pub fn forget_device(&mut self, device: usize) {
        if self.best.is_some_and(|(owner, _)| owner == device) {
            self.best = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.001;

    #[test]
    fn test_first_observation_is_baseline() {
        let mut tracker = AxisTracker::new(EPS);
        assert!(!tracker.has_baseline());
        assert_eq!(tracker.observe(&[0.0, 1.0]), None);
        assert!(tracker.has_baseline());
    }

    #[test]
    fn test_small_delta_detected() {
        let mut tracker = AxisTracker::new(EPS);
        tracker.observe(&[0.5, 0.5, 0.5]);
        let movement = tracker.observe(&[0.5, 0.5, 0.503]);
        assert_eq!(movement.map(|m| m.axis), Some(2));
    }

    #[test]
    fn test_delta_at_epsilon_is_ignored() {
        let mut tracker = AxisTracker::new(0.25);
        tracker.observe(&[0.5]);
        assert_eq!(tracker.observe(&[0.75]), None);
    }

    #[test]
    fn test_largest_delta_wins() {
        let mut tracker = AxisTracker::new(EPS);
        tracker.observe(&[0.5, 0.5, 0.5]);
        let movement = tracker.observe(&[0.52, 0.9, 0.6]);
        assert_eq!(movement.map(|m| m.axis), Some(1));
    }

    #[test]
    fn test_ties_go_to_lowest_axis() {
        let mut tracker = AxisTracker::new(EPS);
        tracker.observe(&[0.25, 0.25]);
        let movement = tracker.observe(&[0.5, 0.5]);
        assert_eq!(movement.map(|m| m.axis), Some(0));
    }

    #[test]
    fn test_compares_with_previous_tick_not_start() {
        let mut tracker = AxisTracker::new(0.05);
        tracker.observe(&[0.0]);
        assert_eq!(tracker.observe(&[0.04]), None);
        assert_eq!(tracker.observe(&[0.08]), None);
        assert!(tracker.observe(&[0.2]).is_some());
    }

    #[test]
    fn test_new_axes_are_baselined() {
        let mut tracker = AxisTracker::new(EPS);
        tracker.observe(&[0.5]);
        assert_eq!(tracker.observe(&[0.5, 1.0]), None);
        assert_eq!(tracker.observe(&[0.5, 0.0]).map(|m| m.axis), Some(1));
    }

    #[test]
    fn test_nan_is_never_movement() {
        let mut tracker = AxisTracker::new(EPS);
        tracker.observe(&[0.5]);
        assert_eq!(tracker.observe(&[f64::NAN]), None);
    }

    #[test]
    fn test_baseline_tracker_accumulates_slow_movement() {
        let tracker = BaselineAxisTracker::new(&[1.0, 0.0], 0.05);
        assert_eq!(tracker.observe(&[0.98, 0.0]), None);
        assert_eq!(tracker.observe(&[0.9, 0.0]).map(|m| m.axis), Some(0));
    }

    #[test]
    fn test_candidate_commit_and_tie_break() {
        let mut candidate = AxisCandidate::default();
        assert!(!candidate.is_committed(0.1));

        assert!(candidate.offer(0, AxisMovement { axis: 2, delta: 0.07 }));
        assert!(!candidate.is_committed(0.1));

        assert!(!candidate.offer(1, AxisMovement { axis: 0, delta: 0.07 }));
        assert_eq!(candidate.best().map(|(device, _)| device), Some(0));

        assert!(candidate.offer(1, AxisMovement { axis: 0, delta: 0.3 }));
        assert!(candidate.is_committed(0.1));
    }

    #[test]
    fn test_forget_device() {
        let mut candidate = AxisCandidate::default();
        candidate.offer(1, AxisMovement { axis: 0, delta: 0.07 });
        candidate.forget_device(0);
        assert!(candidate.best().is_some());
        candidate.forget_device(1);
        assert!(candidate.best().is_none());
    }
}
