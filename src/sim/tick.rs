//! Fixed timestep simulation tick
//!
//! Two entry points, one per cadence: `simulation_step` (move, resolve,
//! spawn) and `countdown_step` (one second off the clock). Both are no-ops
//! unless the round is playing.

use super::collision::{self, Hitbox};
use super::physics;
use super::round::EndReason;
use super::spawn;
use super::state::{Bomb, GameState};
use crate::settings::Settings;

/// Autopilot catcher speed (percent per tick)
pub const AUTOPILOT_SPEED: f32 = 1.2;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target catcher position from the input adapter, in [0, 100]
    pub target_position: Option<f32>,
    /// Demo mode - the catcher chases bombs on its own
    pub autopilot: bool,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// New bomb at the top of the playfield
    Spawned { id: u32, x: f32 },
    /// Bomb landed in the catcher
    Caught(Bomb),
    /// Bomb fell past the catcher
    Missed(Bomb),
    /// Round moved to Ended
    RoundEnded { reason: EndReason, score: u64 },
}

/// Advance the simulation by one fixed step
pub fn simulation_step(
    state: &mut GameState,
    settings: &Settings,
    input: &TickInput,
    events: &mut Vec<GameEvent>,
) {
    if !state.is_playing() {
        return;
    }

    if input.autopilot {
        steer_autopilot(state, settings);
    } else if let Some(target) = input.target_position {
        state.catcher.move_to(target);
    }

    state.time_ticks += 1;
    physics::integrate(&mut state.bombs);

    let hitbox = Hitbox::around(state.catcher.position, &settings.catcher);
    let tally = collision::resolve(&mut state.bombs, &hitbox);
    if !tally.is_empty() {
        // One batched update per tick
        let ended = state
            .round
            .apply_collision_deltas(tally.caught_count(), tally.missed_count());
        events.extend(tally.caught.into_iter().map(GameEvent::Caught));
        events.extend(tally.missed.into_iter().map(GameEvent::Missed));
        if let Some(reason) = ended {
            finish(state, reason, events);
            return;
        }
    }

    if let Some(id) = spawn::spawn_tick(state, &settings.spawn) {
        if let Some(bomb) = state.bombs.last() {
            events.push(GameEvent::Spawned { id, x: bomb.x() });
        }
    }
}

/// Take one second off the countdown
pub fn countdown_step(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if let Some(reason) = state.round.tick(1) {
        finish(state, reason, events);
    }
}

fn finish(state: &GameState, reason: EndReason, events: &mut Vec<GameEvent>) {
    let score = state.round.score();
    log::info!(
        "Round over ({:?}): score {}, lives {}, {}s left",
        reason,
        score,
        state.round.lives(),
        state.round.remaining_secs()
    );
    events.push(GameEvent::RoundEnded { reason, score });
}

/// Chase the lowest bomb that can still be caught
fn steer_autopilot(state: &mut GameState, settings: &Settings) {
    let (_, band_bottom) = settings.catcher.catch_band();
    let target = state
        .bombs
        .iter()
        .filter(|b| b.y() <= band_bottom)
        .max_by(|a, b| a.y().total_cmp(&b.y()))
        .map(|b| b.x());
    if let Some(x) = target {
        state.catcher.move_toward(x, AUTOPILOT_SPEED);
    }
}
