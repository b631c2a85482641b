use log::{debug, info};

use crate::game::{GameSession, Phase};
use crate::session::ClickRule;

/// Result of a single click on the field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// the click had no effect (not running, fading or removed; unknown ids under any-order)
    Ignored,
    /// the target started fading
    Hit,
    /// out-of-order click; the run is lost
    Miss,
}

fn active_index(session: &GameSession, id: u32) -> Option<usize> {
    if session.phase != Phase::Running {
        return None;
    }
    session
        .targets
        .iter()
        .position(|t| t.id == id && t.is_active())
}

pub fn click_ordered(session: &mut GameSession, id: u32) -> ClickOutcome {
    // ids that never existed in this run are wrong guesses, not stale clicks
    if session.phase == Phase::Running && !(1..=session.run_points).contains(&id) {
        info!(
            "clicked {} on a board of {}; game over at {:.1}s",
            id,
            session.run_points,
            session.elapsed()
        );
        session.halt(Phase::Failed);
        return ClickOutcome::Miss;
    }

    let Some(idx) = active_index(session, id) else {
        return ClickOutcome::Ignored;
    };

    if id != session.expected_next {
        info!(
            "clicked {} while expecting {}; game over at {:.1}s",
            id,
            session.expected_next,
            session.elapsed()
        );
        session.halt(Phase::Failed);
        return ClickOutcome::Miss;
    }

    session.fade(idx);
    session.expected_next += 1;
    ClickOutcome::Hit
}

pub fn click_any_order(session: &mut GameSession, id: u32) -> ClickOutcome {
    let Some(idx) = active_index(session, id) else {
        return ClickOutcome::Ignored;
    };

    session.fade(idx);
    session.expected_next = lowest_active(session).unwrap_or(session.run_points + 1);

    if !session.targets.iter().any(|t| t.is_active()) {
        session.halt(Phase::Cleared);
    }
    ClickOutcome::Hit
}

pub fn apply_click(session: &mut GameSession, id: u32) -> ClickOutcome {
    let outcome = match session.rule() {
        ClickRule::Ordered => click_ordered(session, id),
        ClickRule::AnyOrder => click_any_order(session, id),
    };
    debug!("click on {} -> {:?}", id, outcome);
    outcome
}

/// The target auto-play (and the "next" hint) should go for
pub fn next_pick(session: &GameSession) -> Option<u32> {
    match session.rule() {
        ClickRule::Ordered => session
            .targets
            .iter()
            .find(|t| t.id == session.expected_next && t.is_active())
            .map(|t| t.id),
        ClickRule::AnyOrder => lowest_active(session),
    }
}

fn lowest_active(session: &GameSession) -> Option<u32> {
    session
        .targets
        .iter()
        .filter(|t| t.is_active())
        .map(|t| t.id)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    fn running(points: u32, rule: ClickRule) -> GameSession {
        let mut session = GameSession::with_seed(
            SessionConfig {
                points,
                rule,
                ..SessionConfig::default()
            },
            3,
        );
        session.start();
        session
    }

    #[test]
    fn ordered_rejects_skipping_ahead() {
        let mut s = running(3, ClickRule::Ordered);
        assert_eq!(apply_click(&mut s, 2), ClickOutcome::Miss);
        assert_eq!(s.phase, Phase::Failed);
        // frozen: nothing else registers
        assert_eq!(apply_click(&mut s, 1), ClickOutcome::Ignored);
    }

    #[test]
    fn ordered_ignores_fading_targets() {
        let mut s = running(3, ClickRule::Ordered);
        assert_eq!(apply_click(&mut s, 1), ClickOutcome::Hit);
        assert_eq!(apply_click(&mut s, 1), ClickOutcome::Ignored);
        assert_eq!(s.phase, Phase::Running);
        assert_eq!(s.expected_next, 2);
    }

    #[test]
    fn ordered_fails_on_ids_outside_the_board() {
        let mut s = running(3, ClickRule::Ordered);
        assert_eq!(apply_click(&mut s, 99), ClickOutcome::Miss);
        assert_eq!(s.phase, Phase::Failed);

        let mut s = running(3, ClickRule::Ordered);
        assert_eq!(apply_click(&mut s, 0), ClickOutcome::Miss);
        assert_eq!(s.phase, Phase::Failed);
    }

    #[test]
    fn any_order_ignores_ids_outside_the_board() {
        let mut s = running(3, ClickRule::AnyOrder);
        assert_eq!(apply_click(&mut s, 99), ClickOutcome::Ignored);
        assert_eq!(apply_click(&mut s, 0), ClickOutcome::Ignored);
        assert_eq!(s.phase, Phase::Running);
    }

    #[test]
    fn any_order_accepts_any_active_target() {
        let mut s = running(3, ClickRule::AnyOrder);
        assert_eq!(apply_click(&mut s, 3), ClickOutcome::Hit);
        assert_eq!(next_pick(&s), Some(1));
        assert_eq!(apply_click(&mut s, 1), ClickOutcome::Hit);
        assert_eq!(next_pick(&s), Some(2));
        assert_eq!(s.phase, Phase::Running);
    }

    #[test]
    fn any_order_clears_when_last_active_target_is_hit() {
        let mut s = running(2, ClickRule::AnyOrder);
        apply_click(&mut s, 2);
        apply_click(&mut s, 1);
        assert_eq!(s.phase, Phase::Cleared);
        assert_eq!(next_pick(&s), None);
        // faded targets stay on the board, frozen
        assert_eq!(s.targets.len(), 2);
    }

    #[test]
    fn ordered_pick_follows_expected_next() {
        let mut s = running(2, ClickRule::Ordered);
        assert_eq!(next_pick(&s), Some(1));
        apply_click(&mut s, 1);
        assert_eq!(next_pick(&s), Some(2));
        apply_click(&mut s, 2);
        assert_eq!(next_pick(&s), None);
    }
}
