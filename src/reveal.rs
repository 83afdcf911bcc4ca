//! One-shot reveal animations for elements scrolling into view.
//!
//! Every target starts `Hidden` (opacity 0, observed). The first visibility
//! report at or above the threshold moves it to `Revealed` (opacity 1,
//! animated) and stops observation. `Revealed` is terminal: later reports for
//! the same target are ignored.

/// Tolerance for ratios the observer reports a hair under the threshold it
/// fired for.
const RATIO_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

/// A visibility report for one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    /// Visible fraction of the element, `0.0..=1.0`.
    pub ratio: f64,
    pub intersecting: bool,
}

/// Style writes and observation control for the targets, addressed by index.
pub trait RevealHost {
    fn set_hidden(&mut self, index: usize);
    fn set_revealed(&mut self, index: usize, animate: bool);
    fn stop_observing(&mut self, index: usize);
}

#[derive(Debug)]
pub struct RevealAnimator {
    threshold: f64,
    states: Vec<RevealState>,
}

impl RevealAnimator {
    pub fn new(threshold: f64, count: usize) -> Self {
        Self {
            threshold,
            states: vec![RevealState::Hidden; count],
        }
    }

    /// Puts every target in its starting state. Without an observer the
    /// targets are shown at once, unanimated.
    pub fn attach(&mut self, host: &mut impl RevealHost, observer_available: bool) {
        for (index, state) in self.states.iter_mut().enumerate() {
            if observer_available {
                *state = RevealState::Hidden;
                host.set_hidden(index);
            } else {
                *state = RevealState::Revealed;
                host.set_revealed(index, false);
            }
        }
    }

    /// Handles one observer report. Returns `true` if the target was revealed
    /// by this call.
    pub fn on_visibility(
        &mut self,
        index: usize,
        visibility: Visibility,
        host: &mut impl RevealHost,
    ) -> bool {
        let Some(state) = self.states.get_mut(index) else {
            log::debug!("visibility report for unknown reveal target {}", index);
            return false;
        };
        if *state == RevealState::Revealed || !crosses(visibility, self.threshold) {
            return false;
        }
        *state = RevealState::Revealed;
        host.set_revealed(index, true);
        host.stop_observing(index);
        true
    }

    pub fn state(&self, index: usize) -> Option<RevealState> {
        self.states.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn revealed_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == RevealState::Revealed)
            .count()
    }
}

fn crosses(visibility: Visibility, threshold: f64) -> bool {
    visibility.intersecting && visibility.ratio + RATIO_EPSILON >= threshold
}
