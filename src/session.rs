use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const MIN_POINTS: u32 = 1;
pub const MAX_POINTS: u32 = 2000;

/// Granularity of the elapsed-time clock
pub const CLOCK_STEP: Duration = Duration::from_millis(100);
/// Most session time a single `advance` catches up on
pub const MAX_CATCH_UP: Duration = Duration::from_secs(60 * 60);
/// Granularity of a fading target's countdown
pub const COUNTDOWN_STEP: Duration = Duration::from_millis(1000);

/// How clicks are validated against the field
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum ClickRule {
    /// targets must be hit in ascending order; a wrong hit ends the run
    #[default]
    Ordered,
    /// any active target may be hit; the run ends when none are left
    AnyOrder,
}

/// Logical size of the play field; target coordinates live in `[0, width) x [0, height)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSize {
    pub width: f64,
    pub height: f64,
}

impl Default for FieldSize {
    fn default() -> Self {
        Self {
            width: 250.0,
            height: 350.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub points: u32,
    pub rule: ClickRule,
    pub field: FieldSize,
    pub fade_secs: u32,
    pub auto_play_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            points: 5,
            rule: ClickRule::Ordered,
            field: FieldSize::default(),
            fade_secs: 2,
            auto_play_interval: Duration::from_millis(800),
        }
    }
}

impl SessionConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.fade_secs))
    }
}

/// Out-of-range point counts are clamped, never rejected
pub fn clamp_points(count: i64) -> u32 {
    count.clamp(i64::from(MIN_POINTS), i64::from(MAX_POINTS)) as u32
}
