use crate::types::{GhostRole, GhostState, Vec2};

pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const SCATTER_MS: u64 = 7_000;
pub const CHASE_MS: u64 = 30_000;
/// Scatter/chase entries consumed before the clock locks into Chase for good.
pub const MODE_ALTERNATIONS: usize = 8;

pub const FRIGHT_DURATION_MS: u64 = 6_000;
pub const START_LIVES: i32 = 3;

pub const DOT_SCORE: i32 = 10;
pub const ENERGIZER_SCORE: i32 = 50;
pub const GHOST_BASE_SCORE: i32 = 200;

pub const PLAYER_BASE_SPEED: f32 = 6.0;
pub const GHOST_BASE_SPEED: f32 = 5.0;
/// Whole-tile steps one entity may take in a single tick, whatever the delta.
pub const MAX_STEPS_PER_TICK: u32 = 5;

pub const DEFAULT_AMBUSH_OFFSET: i32 = 4;

/// Cells per second while in the given behavior state. House ghosts idle.
pub fn ghost_speed(state: GhostState) -> f32 {
    match state {
        GhostState::House => 0.0,
        GhostState::Exiting => 3.5,
        GhostState::Scatter | GhostState::Chase => GHOST_BASE_SPEED,
        GhostState::Frightened => 3.0,
        GhostState::Eaten => 8.0,
    }
}

/// Eaten-dot count that releases the role from the house.
pub fn dot_threshold(role: GhostRole) -> i32 {
    match role {
        GhostRole::Red => 0,
        GhostRole::Pink => 7,
        GhostRole::Cyan => 17,
        GhostRole::Brown => 32,
    }
}

/// Fallback house wait; whichever of wait and dot threshold fires first wins.
pub fn house_wait_ms(role: GhostRole) -> u64 {
    match role {
        GhostRole::Red => 0,
        GhostRole::Pink => 1_000,
        GhostRole::Cyan => 7_000,
        GhostRole::Brown => 15_000,
    }
}

/// Fixed scatter-phase corner for the role. Corners sit just inside the
/// border walls; they need not be walkable, only comparable by distance.
pub fn home_corner(role: GhostRole, width: i32, height: i32) -> Vec2 {
    match role {
        GhostRole::Red => Vec2::new(width - 2, 1),
        GhostRole::Pink => Vec2::new(1, 1),
        GhostRole::Cyan => Vec2::new(width - 2, height - 2),
        GhostRole::Brown => Vec2::new(1, height - 2),
    }
}

/// Score for the nth ghost eaten within one frightened window (0-based).
pub fn ghost_chain_score(chain: u32) -> i32 {
    GHOST_BASE_SCORE << chain.min(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_score_doubles_and_caps_at_sixteen_hundred() {
        assert_eq!(ghost_chain_score(0), 200);
        assert_eq!(ghost_chain_score(1), 400);
        assert_eq!(ghost_chain_score(2), 800);
        assert_eq!(ghost_chain_score(3), 1_600);
        assert_eq!(ghost_chain_score(9), 1_600);
    }

    #[test]
    fn house_waits_are_staggered_in_role_order() {
        let waits: Vec<u64> = GhostRole::ALL.iter().map(|r| house_wait_ms(*r)).collect();
        assert_eq!(waits, vec![0, 1_000, 7_000, 15_000]);
    }

    #[test]
    fn corners_split_roles_across_the_four_quadrants() {
        let corners: Vec<Vec2> = GhostRole::ALL
            .iter()
            .map(|r| home_corner(*r, 21, 15))
            .collect();
        assert_eq!(corners[0], Vec2::new(19, 1));
        assert_eq!(corners[1], Vec2::new(1, 1));
        assert_eq!(corners[2], Vec2::new(19, 13));
        assert_eq!(corners[3], Vec2::new(1, 13));
    }
}
