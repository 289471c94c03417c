pub const DEFAULT_SWIPE_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved up: show the next video.
    Up,
    /// Finger moved down: show the previous video.
    Down,
    None,
}

/// Vertical swipe detector fed with one start sample and the latest move
/// sample of a gesture.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    threshold: f64,
    start: Option<f64>,
    end: Option<f64>,
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl SwipeDetector {
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_finite() && threshold > 0.0 {
            threshold
        } else {
            DEFAULT_SWIPE_THRESHOLD
        };
        Self {
            threshold,
            start: None,
            end: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn touch_start(&mut self, y: f64) {
        self.start = Some(y);
        self.end = None;
    }

    pub fn touch_move(&mut self, y: f64) {
        if self.start.is_some() {
            self.end = Some(y);
        }
    }

    pub fn in_progress(&self) -> bool {
        self.start.is_some()
    }

    pub fn touch_end(&mut self) -> Swipe {
        let (Some(start), Some(end)) = (self.start.take(), self.end.take()) else {
            return Swipe::None;
        };
        let delta = start - end;
        if delta > self.threshold {
            Swipe::Up
        } else if delta < -self.threshold {
            Swipe::Down
        } else {
            Swipe::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swipe(from: f64, to: f64) -> Swipe {
        let mut detector = SwipeDetector::default();
        detector.touch_start(from);
        detector.touch_move(to);
        detector.touch_end()
    }

    #[test]
    fn upward_drag_past_threshold_is_swipe_up() {
        assert_eq!(swipe(500.0, 350.0), Swipe::Up);
    }

    #[test]
    fn downward_drag_past_threshold_is_swipe_down() {
        assert_eq!(swipe(200.0, 420.0), Swipe::Down);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(swipe(300.0, 200.0), Swipe::None);
        assert_eq!(swipe(200.0, 300.0), Swipe::None);
    }

    #[test]
    fn tap_without_move_is_ignored() {
        let mut detector = SwipeDetector::default();
        detector.touch_start(400.0);
        assert_eq!(detector.touch_end(), Swipe::None);
        assert!(!detector.in_progress());
    }

    #[test]
    fn only_latest_move_counts() {
        let mut detector = SwipeDetector::new(10.0);
        detector.touch_start(100.0);
        detector.touch_move(10.0);
        detector.touch_move(95.0);
        assert_eq!(detector.touch_end(), Swipe::None);
    }

    #[test]
    fn invalid_threshold_falls_back_to_default() {
        assert_eq!(SwipeDetector::new(-3.0).threshold(), DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(SwipeDetector::new(f64::NAN).threshold(), DEFAULT_SWIPE_THRESHOLD);
    }
}
