//! Edge-triggered threshold detector
//!
//! A signal is produced only when a reading crosses the threshold, never
//! for a level that stays on one side of it. `previous` starts at 0, so a
//! first reading already at or above a positive threshold starts the alarm
//! immediately.

use crate::signal::AlarmSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Alarming,
}

#[derive(Debug, Clone)]
pub struct ThresholdDetector {
    threshold: f64,
    previous: f64,
    state: AlarmState,
}

impl ThresholdDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: 0.0,
            state: AlarmState::Idle,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Feed one reading, returning the signal for a crossing, if any
    ///
    /// Start and Clear are two separate comparisons, so a reading that is
    /// unordered against the threshold (NaN) produces neither.
    pub fn evaluate(&mut self, current: f64) -> Option<AlarmSignal> {
        let threshold = self.threshold;
        let previous = std::mem::replace(&mut self.previous, current);

        if previous < threshold && current >= threshold {
            self.state = AlarmState::Alarming;
            Some(AlarmSignal::Start)
        } else if previous >= threshold && current < threshold {
            self.state = AlarmState::Idle;
            Some(AlarmSignal::Clear)
        } else {
            None
        }
    }
}
