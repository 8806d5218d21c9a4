//! Fall integration

use super::state::Bomb;

/// Advance every bomb by its own fall speed
pub fn integrate(bombs: &mut [Bomb]) {
    for bomb in bombs.iter_mut() {
        bomb.pos.y += bomb.fall_speed;
    }
}
