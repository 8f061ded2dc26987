use serde::{Deserialize, Serialize};

/// generation-indexed exponential anneal: f(g) = floor + (start - floor)·e^(−k·g).
///
/// the same curve drives two independent knobs with their own parameters:
/// Boltzmann selection temperature (flat pressure early, sharp late) and the
/// engine's mutation probability (broad exploration early, fine-tuning late).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecaySchedule {
    pub start: f64,
    pub floor: f64,
    pub k: f64,
}

impl DecaySchedule {
    pub fn new(start: f64, floor: f64, k: f64) -> Self {
        Self { start, floor, k }
    }

    /// value at generation `g`
    pub fn at(&self, g: u64) -> f64 {
        self.floor + (self.start - self.floor) * (-self.k * g as f64).exp()
    }
}
