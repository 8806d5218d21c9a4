//! Game state and core simulation types
//!
//! `GameState` is owned by exactly one control flow; everything that reads
//! it from outside goes through a `Snapshot`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::round::{Round, RoundPhase, RoundRules};
use crate::clamp_percent;
use crate::consts::CATCHER_START_POSITION;

/// A falling bomb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    /// x is fixed at spawn, y only grows
    pub pos: Vec2,
    /// Playfield percent per tick, fixed at spawn
    pub fall_speed: f32,
}

impl Bomb {
    pub fn new(id: u32, x: f32, fall_speed: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(clamp_percent(x), 0.0),
            fall_speed,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }
}

/// The player's catcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Catcher {
    /// Horizontal centre, always in [0, 100]
    pub position: f32,
}

impl Default for Catcher {
    fn default() -> Self {
        Self {
            position: CATCHER_START_POSITION,
        }
    }
}

impl Catcher {
    /// Move to an adapter-reported position, clamping anything out of range
    pub fn move_to(&mut self, position: f32) {
        self.position = clamp_percent(position);
    }

    /// Move toward a target position by at most `max_step`
    pub fn move_toward(&mut self, target: f32, max_step: f32) {
        let delta = (clamp_percent(target) - self.position).clamp(-max_step, max_step);
        self.move_to(self.position + delta);
    }

    pub fn recenter(&mut self) {
        self.position = CATCHER_START_POSITION;
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn/jitter source
    pub rng: Pcg32,
    /// Score, lives, countdown and phase
    pub round: Round,
    /// Player catcher
    pub catcher: Catcher,
    /// Live bombs (sorted by id for determinism)
    pub bombs: Vec<Bomb>,
    /// Simulation tick counter for the current round
    pub time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle game state with the given seed
    pub fn new(seed: u64, rules: RoundRules) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            round: Round::new(rules),
            catcher: Catcher::default(),
            bombs: Vec::new(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Reset everything the round owns and enter Playing.
    ///
    /// Start and restart both come through here. The RNG and id counter keep
    /// running so successive rounds differ and ids stay unique.
    pub fn start_round(&mut self) {
        self.bombs.clear();
        self.catcher.recenter();
        self.time_ticks = 0;
        self.round.start();
    }

    /// Drop the round and go back to Idle
    pub fn abandon_round(&mut self) {
        self.bombs.clear();
        self.catcher.recenter();
        self.time_ticks = 0;
        self.round.abandon();
    }

    #[inline]
    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.round.phase() == RoundPhase::Playing
    }

    /// Read-only view for presentation
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bombs: self
                .bombs
                .iter()
                .map(|b| BombView {
                    id: b.id,
                    x: b.pos.x,
                    y: b.pos.y,
                })
                .collect(),
            catcher_position: self.catcher.position,
            score: self.round.score(),
            lives: self.round.lives(),
            remaining_secs: self.round.remaining_secs(),
            phase: self.round.phase(),
        }
    }
}

/// Bomb as seen by presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Per-frame presentation snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub bombs: Vec<BombView>,
    pub catcher_position: f32,
    pub score: u64,
    pub lives: u32,
    pub remaining_secs: u32,
    pub phase: RoundPhase,
}
