use std::time::Duration;

use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::click_policy::{self, ClickOutcome};
use crate::session::{
    clamp_points, ClickRule, FieldSize, SessionConfig, CLOCK_STEP, COUNTDOWN_STEP, MAX_CATCH_UP,
};
use crate::target::{self, Target, TargetState};
use crate::timers::{TimerId, TimerKind, TimerQueue};

/// Coarse lifecycle of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Setup,
    Running,
    Cleared,
    Failed,
}

impl Phase {
    pub fn is_over(&self) -> bool {
        matches!(self, Phase::Cleared | Phase::Failed)
    }
}

/// Inputs that drive a session
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    /// point count for the next run; clamped
    Configure(i64),
    /// start, or restart over whatever is on the field
    Start,
    Click(u32),
    ToggleAutoPlay,
    /// let this much time pass on the session clock
    Advance(Duration),
}

/// Immutable view of a session handed to the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub rule: ClickRule,
    pub points: u32,
    pub elapsed: f64,
    pub auto_play: bool,
    pub next: Option<u32>,
    pub field: FieldSize,
    pub targets: Vec<Target>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct FadeTimers {
    target: u32,
    countdown: TimerId,
}

/// The game state machine: `Setup -> Running -> {Cleared, Failed}`.
///
/// Owns the targets and every timer a run schedules. Starting a new run
/// cancels all timers of the previous one.
#[derive(Debug)]
pub struct GameSession {
    pub(crate) config: SessionConfig,
    pub(crate) targets: Vec<Target>,
    pub(crate) expected_next: u32,
    pub(crate) elapsed_tenths: u64,
    pub(crate) phase: Phase,
    pub(crate) auto_play: bool,
    /// point count of the run on the field (config may change mid-run)
    pub(crate) run_points: u32,
    pub(crate) timers: TimerQueue,
    pub(crate) clock: Option<TimerId>,
    pub(crate) auto_play_timer: Option<TimerId>,
    pub(crate) fades: Vec<FadeTimers>,
    rng: StdRng,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic target placement
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut config: SessionConfig, rng: StdRng) -> Self {
        config.points = clamp_points(i64::from(config.points));
        Self {
            config,
            targets: vec![],
            expected_next: 1,
            elapsed_tenths: 0,
            phase: Phase::Setup,
            auto_play: false,
            run_points: 0,
            timers: TimerQueue::new(),
            clock: None,
            auto_play_timer: None,
            fades: vec![],
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rule(&self) -> ClickRule {
        self.config.rule
    }

    /// Point count used by the next `start`
    pub fn points(&self) -> u32 {
        self.config.points
    }

    pub fn expected_next(&self) -> u32 {
        self.expected_next
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// State of a target of the current run; removed ones report `Cleared`
    pub fn target_state(&self, id: u32) -> Option<TargetState> {
        match self.target(id) {
            Some(t) => Some(t.state),
            None if (1..=self.run_points).contains(&id) => Some(TargetState::Cleared),
            None => None,
        }
    }

    /// Seconds since the run started, on a one-decimal grid
    pub fn elapsed(&self) -> f64 {
        self.elapsed_tenths as f64 / 10.0
    }

    /// Number of timers currently owned by the session
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Whether the elapsed clock is still scheduled
    pub fn clock_running(&self) -> bool {
        self.clock.is_some_and(|id| self.timers.is_scheduled(id))
    }

    pub fn next_target(&self) -> Option<u32> {
        click_policy::next_pick(self)
    }

    pub fn configure(&mut self, count: i64) -> u32 {
        self.config.points = clamp_points(count);
        self.config.points
    }

    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.fades.clear();
        self.auto_play_timer = None;

        self.run_points = self.config.points;
        self.targets = target::scatter(&mut self.rng, self.run_points, self.config.field);
        self.elapsed_tenths = 0;
        self.expected_next = 1;
        self.auto_play = false;
        self.phase = Phase::Running;
        self.clock = Some(self.timers.schedule_repeating(TimerKind::Clock, CLOCK_STEP));

        info!(
            "run started: {} targets, {} rule",
            self.run_points, self.config.rule
        );
    }

    pub fn tick(&mut self) {
        if self.phase == Phase::Running {
            self.elapsed_tenths += 1;
        }
    }

    pub fn click_target(&mut self, id: u32) -> ClickOutcome {
        click_policy::apply_click(self, id)
    }

    /// Flips auto-play while running; returns the resulting flag
    pub fn toggle_auto_play(&mut self) -> bool {
        if self.phase != Phase::Running {
            return self.auto_play;
        }

        self.auto_play = !self.auto_play;
        if self.auto_play {
            let every = self.config.auto_play_interval;
            self.auto_play_timer = Some(self.timers.schedule_repeating(TimerKind::AutoPlay, every));
        } else {
            self.stop_auto_play_timer();
        }
        info!("auto play {}", if self.auto_play { "on" } else { "off" });
        self.auto_play
    }

    pub fn auto_play_step(&mut self) {
        if !self.auto_play || self.phase != Phase::Running {
            return;
        }

        match click_policy::next_pick(self) {
            Some(id) => {
                self.click_target(id);
            }
            None => {
                debug!("auto play has nothing left to hit");
                self.auto_play = false;
                self.stop_auto_play_timer();
            }
        }
    }

    /// Runs every timer falling due within `dt`, earliest first.
    /// Gaps longer than `MAX_CATCH_UP` only catch up that much.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.timers.now().saturating_add(dt.min(MAX_CATCH_UP));
        while let Some((_, kind)) = self.timers.pop_due(until) {
            self.fire(kind);
        }
        self.timers.settle(until);
    }

    pub fn update(&mut self, event: GameEvent) -> GameSnapshot {
        match event {
            GameEvent::Configure(count) => {
                self.configure(count);
            }
            GameEvent::Start => self.start(),
            GameEvent::Click(id) => {
                self.click_target(id);
            }
            GameEvent::ToggleAutoPlay => {
                self.toggle_auto_play();
            }
            GameEvent::Advance(dt) => self.advance(dt),
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            rule: self.config.rule,
            points: self.config.points,
            elapsed: self.elapsed(),
            auto_play: self.auto_play,
            next: self.next_target(),
            field: self.config.field,
            targets: self.targets.clone(),
        }
    }

    pub(crate) fn fade(&mut self, idx: usize) {
        let at = self.elapsed();
        let target = &mut self.targets[idx];
        target.start_fading(self.config.fade_secs, at);
        let id = target.id;

        let countdown = self
            .timers
            .schedule_repeating(TimerKind::Countdown(id), COUNTDOWN_STEP);
        self.timers
            .schedule_once(TimerKind::Removal(id), self.config.fade_duration());
        self.fades.push(FadeTimers {
            target: id,
            countdown,
        });
    }

    /// Leaves `Running`, dropping every timer of the run
    pub(crate) fn halt(&mut self, phase: Phase) {
        self.phase = phase;
        self.auto_play = false;
        self.timers.cancel_all();
        self.clock = None;
        self.auto_play_timer = None;
        self.fades.clear();
        info!("run ended: {} at {:.1}s", phase, self.elapsed());
    }

    fn stop_auto_play_timer(&mut self) {
        if let Some(id) = self.auto_play_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Clock => self.tick(),
            TimerKind::Countdown(id) => {
                if let Some(t) = self.targets.iter_mut().find(|t| t.id == id) {
                    t.count_down();
                }
            }
            TimerKind::Removal(id) => self.remove(id),
            TimerKind::AutoPlay => self.auto_play_step(),
        }
    }

    fn remove(&mut self, id: u32) {
        self.targets.retain(|t| t.id != id);
        if let Some(pos) = self.fades.iter().position(|f| f.target == id) {
            let fade = self.fades.swap_remove(pos);
            self.timers.cancel(fade.countdown);
        }
        debug!("target {} removed, {} left", id, self.targets.len());

        if self.targets.is_empty() && self.phase == Phase::Running {
            self.halt(Phase::Cleared);
        }
    }
}
