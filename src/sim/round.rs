//! Round state machine
//!
//! Idle -> Playing -> Ended, with Ended -> Playing on restart. Every
//! operation that does not apply to the current phase is a no-op.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round running
    #[default]
    Idle,
    /// Active gameplay
    Playing,
    /// Round over, waiting for restart
    Ended,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    OutOfLives,
}

/// Score/lives/time rules applied at round start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    /// Lives (or health points) at round start
    pub starting_lives: u32,
    /// Countdown length in seconds
    pub round_duration_secs: u32,
    /// Lives lost per missed bomb
    pub life_cost_per_miss: u32,
    /// Score gained per caught bomb
    pub points_per_catch: u64,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            round_duration_secs: ROUND_DURATION_SECS,
            life_cost_per_miss: LIFE_COST_PER_MISS,
            points_per_catch: POINTS_PER_CATCH,
        }
    }
}

/// Score, lives, remaining time and phase of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    rules: RoundRules,
    phase: RoundPhase,
    score: u64,
    lives: u32,
    remaining_secs: u32,
    end_reason: Option<EndReason>,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(RoundRules::default())
    }
}

impl Round {
    /// An idle round with fields defaulted from `rules`
    pub fn new(rules: RoundRules) -> Self {
        Self {
            rules,
            phase: RoundPhase::Idle,
            score: 0,
            lives: rules.starting_lives,
            remaining_secs: rules.round_duration_secs,
            end_reason: None,
        }
    }

    pub fn rules(&self) -> &RoundRules {
        &self.rules
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Reset every field and enter Playing. Valid from any phase.
    pub fn start(&mut self) {
        *self = Self::new(self.rules);
        self.phase = RoundPhase::Playing;
    }

    /// Same reset path as `start`
    pub fn reset(&mut self) {
        self.start();
    }

    /// Drop back to Idle (leave request)
    pub fn abandon(&mut self) {
        *self = Self::new(self.rules);
    }

    /// Countdown by `delta_secs`, ending the round when time runs out.
    ///
    /// Returns the end reason only on the call that ended the round.
    pub fn tick(&mut self, delta_secs: u32) -> Option<EndReason> {
        if self.phase != RoundPhase::Playing {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(delta_secs);
        if self.remaining_secs == 0 {
            return self.end(EndReason::TimeUp);
        }
        None
    }

    /// Apply one tick's batched collision results.
    ///
    /// Returns the end reason only on the call that ended the round.
    pub fn apply_collision_deltas(&mut self, caught: u32, missed: u32) -> Option<EndReason> {
        if self.phase != RoundPhase::Playing {
            return None;
        }
        self.score = self
            .score
            .saturating_add(u64::from(caught).saturating_mul(self.rules.points_per_catch));
        let lost = missed.saturating_mul(self.rules.life_cost_per_miss);
        self.lives = self.lives.saturating_sub(lost);
        if self.lives == 0 {
            return self.end(EndReason::OutOfLives);
        }
        None
    }

    /// Playing -> Ended. Anything else is a no-op returning None.
    fn end(&mut self, reason: EndReason) -> Option<EndReason> {
        if self.phase != RoundPhase::Playing {
            return None;
        }
        self.phase = RoundPhase::Ended;
        self.end_reason = Some(reason);
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> Round {
        let mut round = Round::default();
        round.start();
        round
    }

    #[test]
    fn test_start_from_idle() {
        let mut round = Round::default();
        assert_eq!(round.phase(), RoundPhase::Idle);
        round.start();
        assert_eq!(round.phase(), RoundPhase::Playing);
        assert_eq!(round.score(), 0);
        assert_eq!(round.lives(), STARTING_LIVES);
        assert_eq!(round.remaining_secs(), ROUND_DURATION_SECS);
    }

    #[test]
    fn test_idle_ignores_ticks_and_deltas() {
        let mut round = Round::default();
        assert_eq!(round.tick(100), None);
        assert_eq!(round.apply_collision_deltas(2, 10), None);
        assert_eq!(round, Round::default());
        assert_eq!(round.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_countdown_ends_round_with_lives_left() {
        let mut round = playing();
        for _ in 0..ROUND_DURATION_SECS - 1 {
            assert_eq!(round.tick(1), None);
        }
        assert_eq!(round.remaining_secs(), 1);
        assert_eq!(round.tick(1), Some(EndReason::TimeUp));
        assert_eq!(round.phase(), RoundPhase::Ended);
        assert_eq!(round.remaining_secs(), 0);
        assert_eq!(round.lives(), STARTING_LIVES);
    }

    #[test]
    fn test_countdown_clamps_at_zero() {
        let mut round = playing();
        assert_eq!(round.tick(500), Some(EndReason::TimeUp));
        assert_eq!(round.remaining_secs(), 0);
    }

    #[test]
    fn test_deltas_score_and_lives() {
        let mut round = playing();
        assert_eq!(round.apply_collision_deltas(2, 1), None);
        assert_eq!(round.score(), 2);
        assert_eq!(round.lives(), 2);
    }

    #[test]
    fn test_lives_floor_at_zero_and_end() {
        let mut round = playing();
        assert_eq!(round.apply_collision_deltas(0, 7), Some(EndReason::OutOfLives));
        assert_eq!(round.lives(), 0);
        assert_eq!(round.phase(), RoundPhase::Ended);
    }

    #[test]
    fn test_end_fires_once() {
        let mut round = playing();
        assert_eq!(round.apply_collision_deltas(0, 3), Some(EndReason::OutOfLives));
        let ended = round.clone();
        // Countdown arriving in the same tick after the life loss
        assert_eq!(round.tick(ROUND_DURATION_SECS), None);
        assert_eq!(round.apply_collision_deltas(5, 5), None);
        assert_eq!(round, ended);
        assert_eq!(round.end_reason(), Some(EndReason::OutOfLives));
    }

    #[test]
    fn test_restart_matches_fresh_start() {
        let mut round = playing();
        round.apply_collision_deltas(4, 1);
        round.tick(10);
        round.apply_collision_deltas(0, 2);
        assert_eq!(round.phase(), RoundPhase::Ended);

        round.reset();
        assert_eq!(round, playing());
        assert_eq!(round.end_reason(), None);
    }

    #[test]
    fn test_health_rules() {
        let rules = RoundRules {
            starting_lives: 100,
            round_duration_secs: 60,
            life_cost_per_miss: 10,
            points_per_catch: 1,
        };
        let mut round = Round::new(rules);
        round.start();
        assert_eq!(round.apply_collision_deltas(1, 3), None);
        assert_eq!(round.lives(), 70);
        assert_eq!(round.apply_collision_deltas(0, 7), Some(EndReason::OutOfLives));
    }

    #[test]
    fn test_abandon_returns_to_idle() {
        let mut round = playing();
        round.apply_collision_deltas(3, 0);
        round.abandon();
        assert_eq!(round, Round::default());
        // Idle never goes straight to Ended
        assert_eq!(round.tick(ROUND_DURATION_SECS), None);
        assert_eq!(round.phase(), RoundPhase::Idle);
    }
}
