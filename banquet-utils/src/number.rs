use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Rounds to two decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn ceil2(value: f64) -> i64 {
    round2(value).ceil() as i64
}

pub fn floor2(value: f64) -> i64 {
    round2(value).floor() as i64
}

/// A flat plus percentage modifier, applied as `(base + abs) * (1 + percent / 100)`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Addition {
    pub abs: f64,
    pub percent: f64,
}

impl Addition {
    pub fn new(abs: f64, percent: f64) -> Self {
        Self { abs, percent }
    }

    pub fn is_zero(&self) -> bool {
        self.abs == 0.0 && self.percent == 0.0
    }

    /// Accumulates with two-decimal rounding after every step.
    pub fn push_abs_rounded(&mut self, value: f64) {
        self.abs = round2(self.abs + value);
    }

    pub fn push_percent_rounded(&mut self, value: f64) {
        self.percent = round2(self.percent + value);
    }

    pub fn apply(&self, base: f64) -> f64 {
        round2((base + self.abs) * (1.0 + self.percent / 100.0))
    }

    pub fn reduce(&self, base: f64) -> f64 {
        round2((base - self.abs) * (1.0 - self.percent / 100.0))
    }
}

impl AddAssign for Addition {
    fn add_assign(&mut self, rhs: Self) {
        self.abs += rhs.abs;
        self.percent += rhs.percent;
    }
}
