//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod physics;
pub mod round;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::{Cadence, ClockTuning, RoundClock};
pub use collision::{CatcherGeometry, CollisionTally, Hitbox, Verdict, classify, resolve};
pub use physics::integrate;
pub use round::{EndReason, Round, RoundPhase, RoundRules};
pub use spawn::{SpawnTuning, roll_spawn, spawn_tick};
pub use state::{Bomb, BombView, Catcher, GameState, Snapshot};
pub use tick::{GameEvent, TickInput, countdown_step, simulation_step};
