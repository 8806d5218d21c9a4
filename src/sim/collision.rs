//! Catch/miss classification against the catcher hitbox
//!
//! The hitbox is narrower and shorter than the catcher sprite: only the
//! middle of the sprite's width and the top part of its height count, so a
//! bomb that visibly grazes the edge is not a catch.

use serde::{Deserialize, Serialize};

use super::state::Bomb;
use crate::clamp_percent;
use crate::consts::*;

/// Catcher layout constants the hitbox is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatcherGeometry {
    /// Sprite half width (percent of playfield width)
    pub half_width: f32,
    /// Fraction of the sprite width that catches
    pub width_fraction: f32,
    /// Gap between sprite bottom and playfield bottom
    pub bottom_offset: f32,
    /// Sprite height (percent of playfield height)
    pub height: f32,
    /// Fraction of the sprite height, from its top, that catches
    pub height_fraction: f32,
}

impl Default for CatcherGeometry {
    fn default() -> Self {
        Self {
            half_width: CATCHER_HALF_WIDTH,
            width_fraction: CATCH_WIDTH_FRACTION,
            bottom_offset: CATCHER_BOTTOM_OFFSET,
            height: CATCHER_HEIGHT,
            height_fraction: CATCH_HEIGHT_FRACTION,
        }
    }
}

impl CatcherGeometry {
    /// Half width of the catching region
    pub fn catch_half_width(&self) -> f32 {
        self.half_width * self.width_fraction
    }

    /// Vertical catch band (top, bottom); y grows downward
    pub fn catch_band(&self) -> (f32, f32) {
        let top = 100.0 - self.bottom_offset - self.height;
        (top, top + self.height * self.height_fraction)
    }
}

/// Axis-aligned catch region in playfield percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Hitbox {
    /// Hitbox for a catcher centred at `position`
    pub fn around(position: f32, geometry: &CatcherGeometry) -> Self {
        let half = geometry.catch_half_width();
        let (top, bottom) = geometry.catch_band();
        Self {
            left: clamp_percent(position - half),
            right: clamp_percent(position + half),
            top,
            bottom,
        }
    }

    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    #[inline]
    pub fn spans_y(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom
    }
}

/// Outcome for one bomb on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Caught,
    Missed,
    Falling,
}

/// Classify a bomb. Both axes must overlap for a catch; once past the band
/// bottom it is a miss no matter where it is horizontally.
pub fn classify(bomb: &Bomb, hitbox: &Hitbox) -> Verdict {
    if hitbox.spans_y(bomb.y()) && hitbox.spans_x(bomb.x()) {
        Verdict::Caught
    } else if bomb.y() > hitbox.bottom {
        Verdict::Missed
    } else {
        Verdict::Falling
    }
}

/// Bombs removed on one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionTally {
    pub caught: Vec<Bomb>,
    pub missed: Vec<Bomb>,
}

impl CollisionTally {
    pub fn caught_count(&self) -> u32 {
        u32::try_from(self.caught.len()).unwrap_or(u32::MAX)
    }

    pub fn missed_count(&self) -> u32 {
        u32::try_from(self.missed.len()).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.caught.is_empty() && self.missed.is_empty()
    }
}

/// Classify every live bomb once and remove the caught and missed ones
pub fn resolve(bombs: &mut Vec<Bomb>, hitbox: &Hitbox) -> CollisionTally {
    let mut tally = CollisionTally::default();
    bombs.retain(|bomb| match classify(bomb, hitbox) {
        Verdict::Falling => true,
        Verdict::Caught => {
            log::trace!("Bomb {} caught at x={:.1}", bomb.id, bomb.x());
            tally.caught.push(bomb.clone());
            false
        }
        Verdict::Missed => {
            log::trace!("Bomb {} missed at x={:.1}", bomb.id, bomb.x());
            tally.missed.push(bomb.clone());
            false
        }
    });
    tally
}
