use crate::constants::{MAX_STEPS_PER_TICK, PLAYER_BASE_SPEED};
use crate::maze::{Maze, Pickup};
use crate::types::{Direction, Vec2};

/// The player entity. Steering comes from outside (input or a sim policy);
/// the ghost subsystem only ever reads its tile and facing.
#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) pos: Vec2,
    pub(crate) facing: Direction,
    pub(crate) desired_dir: Direction,
    pub(crate) move_buffer: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            facing: Direction::None,
            desired_dir: Direction::None,
            move_buffer: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_desired_dir(&mut self, dir: Direction) {
        self.desired_dir = dir;
    }

    pub fn reset(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.facing = Direction::None;
        self.desired_dir = Direction::None;
        self.move_buffer = 0.0;
    }

    /// Advance by buffered whole-cell steps, eating whatever the arrival
    /// tiles hold. The buffered turn is attempted first; failing that the
    /// player keeps rolling along its facing until a wall stops it.
    pub fn update(&mut self, dt_ms: u64, maze: &mut Maze) -> Vec<(Vec2, Pickup)> {
        let mut pickups = Vec::new();
        self.move_buffer += PLAYER_BASE_SPEED * dt_ms as f32 / 1000.0;
        let mut safety = 0;
        while self.move_buffer >= 1.0 {
            self.move_buffer -= 1.0;
            safety += 1;
            if safety > MAX_STEPS_PER_TICK {
                break;
            }
            if !self.step_once(maze) {
                continue;
            }
            if let Some(pickup) = maze.eat_at(self.pos) {
                pickups.push((self.pos, pickup));
            }
        }
        pickups
    }

    fn step_once(&mut self, maze: &Maze) -> bool {
        for dir in [self.desired_dir, self.facing] {
            if dir == Direction::None {
                continue;
            }
            let next = maze.step(self.pos, dir);
            if maze.passable(next, false) {
                self.facing = dir;
                self.pos = next;
                return true;
            }
        }
        false
    }
}
