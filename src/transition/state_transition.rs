use smol_str::SmolStr;

use super::TimeFunction;

/// An in-flight blend between two visual states of a drawable shape.
///
/// The blend owns no surfaces; it only tracks which two states are being
/// mixed and how far along the mix is. The shape samples `progress()` each
/// frame to produce the interpolated surface.
#[derive(Clone, Debug)]
pub struct StateTransition {
    start_state: SmolStr,
    target_state: SmolStr,
    duration: f32,
    elapsed: f32,
    timing: TimeFunction,
}

impl StateTransition {
    pub fn new(start_state: SmolStr, target_state: SmolStr, duration: f32) -> Self {
        Self {
            start_state,
            target_state,
            duration: duration.max(0.0),
            elapsed: 0.0,
            timing: TimeFunction::Linear,
        }
    }

    pub fn with_timing(mut self, timing: TimeFunction) -> Self {
        self.timing = timing;
        self
    }

    pub fn start_state(&self) -> &SmolStr {
        &self.start_state
    }

    pub fn target_state(&self) -> &SmolStr {
        &self.target_state
    }

    pub fn update(&mut self, time_delta: f32) {
        self.elapsed += time_delta.max(0.0);
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            return 1.0;
        }
        self.timing.sample(self.elapsed / self.duration)
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
