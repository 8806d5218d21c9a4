//! Game session driver
//!
//! Owns the simulation state, the round clock and the feedback listener.
//! Hosts either call `frame` once per rendered frame or, if they run their
//! own timers, `simulation_tick` and `countdown_tick` directly.

use thiserror::Error;

use crate::settings::Settings;
use crate::sim::{
    Bomb, Cadence, EndReason, GameEvent, GameState, RoundClock, RoundPhase, Snapshot, TickInput,
    countdown_step, simulation_step,
};

/// Failure reported by a feedback listener. Logged, never acted on.
#[derive(Debug, Error)]
#[error("feedback listener failed: {0}")]
pub struct FeedbackError(pub String);

/// Audio/haptic cue hooks, one call per bomb
pub trait FeedbackListener {
    fn on_catch(&mut self, bomb: &Bomb) -> Result<(), FeedbackError>;

    fn on_miss(&mut self, bomb: &Bomb) -> Result<(), FeedbackError>;

    fn on_round_over(&mut self, _reason: EndReason, _score: u64) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// A game session
pub struct Game {
    settings: Settings,
    state: GameState,
    clock: RoundClock,
    input: TickInput,
    listener: Option<Box<dyn FeedbackListener>>,
    /// Events from the most recent frame or tick
    events: Vec<GameEvent>,
}

impl Game {
    /// Idle session; nothing runs until `start`.
    ///
    /// Settings that fail validation are still accepted; the clock pulls its
    /// own tuning back into range so a bad file can't stall the frame loop.
    pub fn new(seed: u64, settings: Settings) -> Self {
        if let Err(e) = settings.validate() {
            log::warn!("Running with unvalidated settings: {}", e);
        }
        let settings = Settings {
            clock: settings.clock.sanitized(),
            ..settings
        };
        Self {
            settings,
            state: GameState::new(seed, settings.round),
            clock: RoundClock::new(settings.clock),
            input: TickInput::default(),
            listener: None,
            events: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn FeedbackListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase()
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Events produced by the last `frame` or tick call
    pub fn last_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Reset the round and enter Playing
    pub fn start(&mut self) {
        self.state.start_round();
        self.clock.start();
        self.events.clear();
        log::info!(
            "Round started: {} lives, {}s",
            self.state.round.lives(),
            self.state.round.remaining_secs()
        );
    }

    /// Same reset path as `start`
    pub fn restart(&mut self) {
        self.start();
    }

    /// Stop both cadences and drop back to Idle
    pub fn leave(&mut self) {
        self.clock.stop();
        self.state.abandon_round();
        self.events.clear();
        log::info!("Round abandoned");
    }

    /// Input adapter position, clamped to [0, 100]
    pub fn set_catcher_position(&mut self, position: f32) {
        self.state.catcher.move_to(position);
    }

    /// Let the catcher steer itself
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Advance by one rendered frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) -> &[GameEvent] {
        self.events.clear();
        for cadence in self.clock.advance(dt) {
            self.run_cadence(cadence);
            if !self.state.is_playing() {
                break;
            }
        }
        self.settle();
        &self.events
    }

    /// Run one simulation step now
    pub fn simulation_tick(&mut self) -> &[GameEvent] {
        self.events.clear();
        self.run_cadence(Cadence::Simulation);
        self.settle();
        &self.events
    }

    /// Take one second off the countdown now
    pub fn countdown_tick(&mut self) -> &[GameEvent] {
        self.events.clear();
        self.run_cadence(Cadence::Countdown);
        self.settle();
        &self.events
    }

    fn run_cadence(&mut self, cadence: Cadence) {
        match cadence {
            Cadence::Simulation => {
                simulation_step(&mut self.state, &self.settings, &self.input, &mut self.events)
            }
            Cadence::Countdown => countdown_step(&mut self.state, &mut self.events),
        }
    }

    /// Halt the clock if the round is over, then notify the listener
    fn settle(&mut self) {
        if !self.state.is_playing() && self.clock.is_running() {
            self.clock.stop();
        }

        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        for event in &self.events {
            let result = match event {
                GameEvent::Caught(bomb) => listener.on_catch(bomb),
                GameEvent::Missed(bomb) => listener.on_miss(bomb),
                GameEvent::RoundEnded { reason, score } => listener.on_round_over(*reason, *score),
                GameEvent::Spawned { .. } => Ok(()),
            };
            if let Err(e) = result {
                log::warn!("{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::consts::*;
    use crate::sim::{ClockTuning, RoundRules, SpawnTuning};

    #[derive(Debug, Clone, PartialEq)]
    enum Cue {
        Catch(u32),
        Miss(u32),
        Over(EndReason),
    }

    struct Recorder(Rc<RefCell<Vec<Cue>>>);

    impl FeedbackListener for Recorder {
        fn on_catch(&mut self, bomb: &Bomb) -> Result<(), FeedbackError> {
            self.0.borrow_mut().push(Cue::Catch(bomb.id));
            Ok(())
        }

        fn on_miss(&mut self, bomb: &Bomb) -> Result<(), FeedbackError> {
            self.0.borrow_mut().push(Cue::Miss(bomb.id));
            Ok(())
        }

        fn on_round_over(&mut self, reason: EndReason, _score: u64) -> Result<(), FeedbackError> {
            self.0.borrow_mut().push(Cue::Over(reason));
            Ok(())
        }
    }

    struct Broken;

    impl FeedbackListener for Broken {
        fn on_catch(&mut self, _bomb: &Bomb) -> Result<(), FeedbackError> {
            Err(FeedbackError("speaker unplugged".to_string()))
        }

        fn on_miss(&mut self, _bomb: &Bomb) -> Result<(), FeedbackError> {
            Err(FeedbackError("speaker unplugged".to_string()))
        }
    }

    fn left_lane_settings() -> Settings {
        Settings {
            spawn: SpawnTuning {
                chance: 1.0,
                min_x: 10.0,
                max_x: 20.0,
                ..Default::default()
            }
            .with_fixed_speed(5.0),
            ..Default::default()
        }
    }

    fn run_until_over(game: &mut Game) -> usize {
        let mut frames = 0;
        while game.phase() == RoundPhase::Playing {
            game.frame(SIM_DT);
            frames += 1;
            assert!(frames < 10_000, "round never ended");
        }
        frames
    }

    #[test]
    fn test_idle_frames_do_nothing() {
        let mut game = Game::new(1, left_lane_settings());
        assert!(game.frame(0.1).is_empty());
        assert_eq!(game.phase(), RoundPhase::Idle);
        assert!(game.snapshot().bombs.is_empty());
    }

    #[test]
    fn test_listener_hears_each_miss_and_round_end() {
        let cues = Rc::new(RefCell::new(Vec::new()));
        let mut game =
            Game::new(5, left_lane_settings()).with_listener(Box::new(Recorder(cues.clone())));
        game.start();
        run_until_over(&mut game);

        let cues = cues.borrow();
        let misses = cues.iter().filter(|c| matches!(c, Cue::Miss(_))).count();
        assert_eq!(misses, 3);
        assert_eq!(cues.last(), Some(&Cue::Over(EndReason::OutOfLives)));
        assert_eq!(game.snapshot().lives, 0);
    }

    #[test]
    fn test_round_end_stops_clock() {
        let mut game = Game::new(5, left_lane_settings());
        game.start();
        assert!(game.is_clock_running());
        run_until_over(&mut game);
        assert!(!game.is_clock_running());

        // Stale callbacks after the end change nothing
        let ended = game.snapshot();
        assert!(game.frame(0.2).is_empty());
        assert!(game.simulation_tick().is_empty());
        assert!(game.countdown_tick().is_empty());
        assert_eq!(game.snapshot(), ended);
    }

    #[test]
    fn test_timer_ends_round() {
        let settings = Settings {
            spawn: SpawnTuning {
                chance: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut game = Game::new(5, settings);
        game.start();
        let frames = run_until_over(&mut game);
        let snap = game.snapshot();
        assert_eq!(snap.phase, RoundPhase::Ended);
        assert_eq!(snap.remaining_secs, 0);
        assert_eq!(snap.lives, STARTING_LIVES);
        assert_eq!(game.state().round.end_reason(), Some(EndReason::TimeUp));
        // 30 s of 60 Hz frames, give or take a frame of float drift
        let expected = (ROUND_DURATION_SECS * SIM_HZ) as usize;
        assert!(frames.abs_diff(expected) <= 1, "frames = {}", frames);
    }

    #[test]
    fn test_broken_listener_does_not_affect_state() {
        let mut quiet = Game::new(77, left_lane_settings());
        let mut noisy = Game::new(77, left_lane_settings()).with_listener(Box::new(Broken));
        quiet.start();
        noisy.start();
        for _ in 0..40 {
            quiet.frame(SIM_DT);
            noisy.frame(SIM_DT);
        }
        assert_eq!(quiet.snapshot(), noisy.snapshot());
        assert_eq!(noisy.phase(), RoundPhase::Ended);
    }

    #[test]
    fn test_restart_matches_start() {
        let mut game = Game::new(9, left_lane_settings());
        game.start();
        let fresh = game.snapshot();
        run_until_over(&mut game);

        game.restart();
        assert_eq!(game.snapshot(), fresh);
        assert!(game.is_clock_running());
        assert_eq!(game.state().round.end_reason(), None);
    }

    #[test]
    fn test_leave_halts_everything() {
        let mut game = Game::new(9, left_lane_settings());
        game.start();
        for _ in 0..10 {
            game.frame(SIM_DT);
        }
        assert!(!game.snapshot().bombs.is_empty());

        game.leave();
        assert_eq!(game.phase(), RoundPhase::Idle);
        assert!(!game.is_clock_running());
        assert!(game.frame(0.2).is_empty());
        assert!(game.snapshot().bombs.is_empty());
    }

    #[test]
    fn test_catcher_position_clamped() {
        let mut game = Game::new(1, Settings::default());
        game.start();
        game.set_catcher_position(-40.0);
        assert_eq!(game.snapshot().catcher_position, 0.0);
        game.set_catcher_position(55.5);
        assert_eq!(game.snapshot().catcher_position, 55.5);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut a = Game::new(2024, Settings::default());
        let mut b = Game::new(2024, Settings::default());
        a.set_autopilot(true);
        b.set_autopilot(true);
        a.start();
        b.start();
        for i in 0..600 {
            let dt = if i % 3 == 0 { 0.02 } else { 0.013 };
            a.frame(dt);
            b.frame(dt);
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }

    fn one_life_one_second(clock: ClockTuning, speed: f32) -> Settings {
        Settings {
            round: RoundRules {
                starting_lives: 1,
                round_duration_secs: 1,
                ..Default::default()
            },
            spawn: SpawnTuning {
                chance: 1.0,
                min_x: 10.0,
                max_x: 20.0,
                ..Default::default()
            }
            .with_fixed_speed(speed),
            clock,
            ..Default::default()
        }
    }

    fn round_overs(cues: &[Cue]) -> usize {
        cues.iter().filter(|c| matches!(c, Cue::Over(_))).count()
    }

    fn ended_events(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundEnded { .. }))
            .count()
    }

    #[test]
    fn test_countdown_and_last_miss_in_same_frame_end_once() {
        // Countdown and second sim step both fall due at t = 0.5
        let clock = ClockTuning {
            sim_hz: 4,
            countdown_interval: 0.5,
            ..Default::default()
        };
        let cues = Rc::new(RefCell::new(Vec::new()));
        let mut game = Game::new(3, one_life_one_second(clock, 90.0))
            .with_listener(Box::new(Recorder(cues.clone())));
        game.start();

        game.frame(0.25);
        assert_eq!(game.snapshot().bombs.len(), 1);

        let events = game.frame(0.25).to_vec();
        assert_eq!(ended_events(&events), 1);
        assert_eq!(events, game.last_events());
        assert_eq!(round_overs(&cues.borrow()), 1);
        assert_eq!(game.state().round.end_reason(), Some(EndReason::TimeUp));
        assert_eq!(game.snapshot().lives, 1);
        assert!(!game.is_clock_running());
    }

    #[test]
    fn test_last_miss_then_countdown_in_same_frame_end_once() {
        // Miss lands at t = 0.4, countdown would follow at t = 0.5
        let clock = ClockTuning {
            sim_hz: 5,
            countdown_interval: 0.5,
            ..Default::default()
        };
        let cues = Rc::new(RefCell::new(Vec::new()));
        let mut game = Game::new(3, one_life_one_second(clock, 90.0))
            .with_listener(Box::new(Recorder(cues.clone())));
        game.start();

        game.frame(0.25);
        let events = game.frame(0.25).to_vec();
        assert_eq!(ended_events(&events), 1);
        assert_eq!(round_overs(&cues.borrow()), 1);
        assert_eq!(game.state().round.end_reason(), Some(EndReason::OutOfLives));
        assert_eq!(game.snapshot().remaining_secs, 1);

        assert!(game.frame(0.25).is_empty());
        assert!(game.last_events().is_empty());
        assert_eq!(round_overs(&cues.borrow()), 1);
    }

    #[test]
    fn test_zero_countdown_interval_does_not_stall() {
        let settings = Settings {
            clock: ClockTuning {
                countdown_interval: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let mut game = Game::new(11, settings);
        game.start();
        let events = game.frame(0.25).to_vec();
        assert!(events.len() < 64);
        // Countdown runs no faster than the simulation step
        assert_eq!(game.settings().clock.countdown_interval, SIM_DT);
        let mut frames = 0;
        while game.phase() == RoundPhase::Playing {
            game.frame(0.25);
            frames += 1;
            assert!(frames < 100, "round never ended");
        }
        assert_eq!(game.snapshot().remaining_secs.min(game.snapshot().lives), 0);
    }
}
