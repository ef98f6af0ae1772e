use crate::constants::home_corner;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, GhostRole, GhostState, Vec2, DIRECTION_PRIORITY};

/// Everything a ghost decision needs, passed in explicitly per tick.
pub struct GhostContext<'a> {
    pub maze: &'a Maze,
    pub player_tile: Vec2,
    pub player_facing: Direction,
    pub ambush_offset: i32,
}

/// Target tile for a ghost in the given state. Frightened has no target;
/// callers use [`frightened_direction`] instead.
pub fn target_tile(state: GhostState, role: GhostRole, ctx: &GhostContext) -> Vec2 {
    match state {
        GhostState::Scatter => home_corner(role, ctx.maze.width(), ctx.maze.height()),
        GhostState::Chase => chase_target(role, ctx),
        GhostState::Eaten => ctx.maze.house_entrance(),
        _ => ctx.maze.house_entrance(),
    }
}

/// Baseline chase target is the player tile. The Brown role leads the player
/// by `ambush_offset` tiles along their facing, clamped into the grid.
pub fn chase_target(role: GhostRole, ctx: &GhostContext) -> Vec2 {
    if role != GhostRole::Brown {
        return ctx.player_tile;
    }
    let (dx, dy) = ctx.player_facing.delta();
    Vec2::new(
        (ctx.player_tile.x + dx * ctx.ambush_offset).clamp(0, ctx.maze.width() - 1),
        (ctx.player_tile.y + dy * ctx.ambush_offset).clamp(0, ctx.maze.height() - 1),
    )
}

fn candidates(
    maze: &Maze,
    pos: Vec2,
    facing: Direction,
    gate_ok: bool,
    allow_reverse: bool,
) -> Vec<(Direction, Vec2)> {
    let reverse = facing.opposite();
    let mut out = Vec::with_capacity(4);
    for dir in DIRECTION_PRIORITY {
        if !allow_reverse && dir == reverse {
            continue;
        }
        let next = maze.step(pos, dir);
        if !maze.passable(next, gate_ok) {
            continue;
        }
        out.push((dir, next));
    }
    out
}

/// Pick the legal non-reversing direction whose next tile minimizes squared
/// Euclidean distance to the target. Candidates are scanned in priority
/// order (Up, Left, Down, Right), so a strict comparison breaks ties.
/// Returns None when the junction offers no legal move; the caller stalls
/// for one tick and retries.
pub fn choose_direction(
    maze: &Maze,
    pos: Vec2,
    facing: Direction,
    target: Vec2,
    gate_ok: bool,
    allow_reverse: bool,
) -> Option<Direction> {
    let mut best: Option<(Direction, i64)> = None;
    for (dir, next) in candidates(maze, pos, facing, gate_ok, allow_reverse) {
        let dist = next.distance_sq(target);
        if best.map(|(_, seen)| dist < seen).unwrap_or(true) {
            best = Some((dir, dist));
        }
    }
    best.map(|(dir, _)| dir)
}

/// Frightened movement: uniform pick among the legal non-reversing moves.
pub fn frightened_direction(
    maze: &Maze,
    pos: Vec2,
    facing: Direction,
    allow_reverse: bool,
    rng: &mut Rng,
) -> Option<Direction> {
    let options = candidates(maze, pos, facing, false, allow_reverse);
    rng.pick(&options).map(|(dir, _)| *dir)
}
