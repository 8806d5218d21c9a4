//! Bomb spawner
//!
//! At most one bomb per simulation tick, only while a round is playing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Bomb, GameState};
use crate::consts::*;

/// Spawn rate, placement and fall speed tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Chance per tick of spawning a bomb, in [0, 1]
    pub chance: f32,
    /// Horizontal spawn range
    pub min_x: f32,
    pub max_x: f32,
    /// Base fall speed (percent per tick)
    pub base_fall_speed: f32,
    /// speed = base * (jitter_min + random * jitter_span)
    pub jitter_min: f32,
    pub jitter_span: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            chance: SPAWN_CHANCE,
            min_x: SPAWN_MIN_X,
            max_x: SPAWN_MAX_X,
            base_fall_speed: BASE_FALL_SPEED,
            jitter_min: FALL_SPEED_JITTER_MIN,
            jitter_span: FALL_SPEED_JITTER_SPAN,
        }
    }
}

impl SpawnTuning {
    /// Every bomb falls at exactly `speed`
    pub fn with_fixed_speed(mut self, speed: f32) -> Self {
        self.base_fall_speed = speed;
        self.jitter_min = 1.0;
        self.jitter_span = 0.0;
        self
    }

    /// Slowest and fastest possible fall speed
    pub fn speed_bounds(&self) -> (f32, f32) {
        let slow = self.base_fall_speed * self.jitter_min;
        (slow, slow + self.base_fall_speed * self.jitter_span)
    }
}

/// Roll a spawn position and fall speed; None if this tick doesn't spawn
pub fn roll_spawn<R: Rng + ?Sized>(rng: &mut R, tuning: &SpawnTuning) -> Option<(f32, f32)> {
    let chance = if tuning.chance.is_nan() {
        0.0
    } else {
        tuning.chance.clamp(0.0, 1.0)
    };
    if !rng.random_bool(f64::from(chance)) {
        return None;
    }
    let x = tuning.min_x + rng.random::<f32>() * (tuning.max_x - tuning.min_x);
    let fall_speed =
        tuning.base_fall_speed * (tuning.jitter_min + rng.random::<f32>() * tuning.jitter_span);
    Some((x, fall_speed))
}

/// Maybe spawn one bomb at the top of the playfield.
///
/// Returns the new bomb's id if one was created.
pub fn spawn_tick(state: &mut GameState, tuning: &SpawnTuning) -> Option<u32> {
    if !state.is_playing() {
        return None;
    }
    let (x, fall_speed) = roll_spawn(&mut state.rng, tuning)?;
    let id = state.next_entity_id();
    state.bombs.push(Bomb::new(id, x, fall_speed));
    log::debug!("Spawned bomb {} at x={:.1} speed={:.3}", id, x, fall_speed);
    Some(id)
}
