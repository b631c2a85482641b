use rand::Rng;

use crate::session::FieldSize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    Active,
    Fading,
    Cleared,
}

/// One numbered element on the play field
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub state: TargetState,
    /// seconds left before a fading target is removed
    pub countdown: Option<f64>,
    /// elapsed time at which the target was hit
    pub cleared_at: Option<f64>,
}

impl Target {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            state: TargetState::Active,
            countdown: None,
            cleared_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == TargetState::Active
    }

    pub fn is_fading(&self) -> bool {
        self.state == TargetState::Fading
    }

    pub fn start_fading(&mut self, countdown_secs: u32, at: f64) {
        self.state = TargetState::Fading;
        self.countdown = Some(f64::from(countdown_secs));
        self.cleared_at = Some(at);
    }

    pub fn count_down(&mut self) {
        if let Some(left) = self.countdown {
            self.countdown = Some((left - 1.0).max(0.0));
        }
    }
}

/// Places `count` targets with ids `1..=count` uniformly over the field.
/// Overlaps are allowed.
pub fn scatter<R: Rng + ?Sized>(rng: &mut R, count: u32, field: FieldSize) -> Vec<Target> {
    (1..=count)
        .map(|id| {
            let x = random_coord(rng, field.width);
            let y = random_coord(rng, field.height);
            Target::new(id, x, y)
        })
        .collect()
}

fn random_coord<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}
