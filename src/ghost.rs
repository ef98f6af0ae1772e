use crate::constants::{dot_threshold, ghost_speed, house_wait_ms, MAX_STEPS_PER_TICK};
use crate::rng::Rng;
use crate::targeting::{choose_direction, frightened_direction, target_tile, GhostContext};
use crate::types::{Direction, GhostRole, GhostState, GhostView, Mode, RuntimeEvent, Vec2};

fn state_for(mode: Mode) -> GhostState {
    match mode {
        Mode::Scatter => GhostState::Scatter,
        Mode::Chase => GhostState::Chase,
    }
}

/// One ghost's behavior machine:
/// House -> Exiting -> Scatter <-> Chase -> Frightened -> (Eaten -> Exiting).
///
/// Facing never flips to its opposite at a tile center; the one exception is
/// the forced entry into Frightened or Eaten, which arms a single free
/// reversal for the next decision.
#[derive(Clone, Debug)]
pub struct GhostControl {
    pub(crate) role: GhostRole,
    pub(crate) pos: Vec2,
    pub(crate) facing: Direction,
    pub(crate) state: GhostState,
    pub(crate) house_wait_ms: u64,
    pub(crate) fright_ms: u64,
    pub(crate) resume_mode: Mode,
    pub(crate) move_buffer: f32,
    pub(crate) allow_reverse_once: bool,
}

impl GhostControl {
    pub fn new(role: GhostRole, house_slot: Vec2) -> Self {
        Self {
            role,
            pos: house_slot,
            facing: Direction::Up,
            state: GhostState::House,
            house_wait_ms: house_wait_ms(role),
            fright_ms: 0,
            resume_mode: Mode::Scatter,
            move_buffer: 0.0,
            allow_reverse_once: false,
        }
    }

    pub fn role(&self) -> GhostRole {
        self.role
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            role: self.role,
            x: self.pos.x,
            y: self.pos.y,
            dir: self.facing,
            state: self.state,
        }
    }

    /// Back to the house slot with the role's stagger re-armed. Used at level
    /// start and after a lost life; the mode clock is untouched.
    pub fn reset(&mut self, house_slot: Vec2) {
        self.pos = house_slot;
        self.facing = Direction::Up;
        self.state = GhostState::House;
        self.house_wait_ms = house_wait_ms(self.role);
        self.fright_ms = 0;
        self.resume_mode = Mode::Scatter;
        self.move_buffer = 0.0;
        self.allow_reverse_once = false;
    }

    /// Clock notification. Frightened and Eaten are sticky; they resume their
    /// stored phase on expiry instead of following the flip.
    pub fn apply_phase(&mut self, mode: Mode) {
        if matches!(self.state, GhostState::Scatter | GhostState::Chase) {
            self.state = state_for(mode);
        }
    }

    /// Energizer effect. Only Scatter/Chase ghosts frighten; a ghost already
    /// frightened re-arms its countdown but keeps the original resume phase.
    pub fn frighten(&mut self, duration_ms: u64) {
        match self.state {
            GhostState::Scatter => {
                self.resume_mode = Mode::Scatter;
                self.enter_fright(duration_ms);
            }
            GhostState::Chase => {
                self.resume_mode = Mode::Chase;
                self.enter_fright(duration_ms);
            }
            GhostState::Frightened => {
                self.fright_ms = duration_ms;
            }
            _ => {}
        }
    }

    fn enter_fright(&mut self, duration_ms: u64) {
        self.state = GhostState::Frightened;
        self.fright_ms = duration_ms;
        self.allow_reverse_once = true;
    }

    /// Caught by the player while frightened.
    pub fn mark_eaten(&mut self) {
        self.state = GhostState::Eaten;
        self.fright_ms = 0;
        self.allow_reverse_once = true;
    }

    pub fn is_vulnerable(&self) -> bool {
        self.state == GhostState::Frightened
    }

    pub fn is_deadly(&self) -> bool {
        matches!(
            self.state,
            GhostState::Scatter | GhostState::Chase | GhostState::Exiting
        )
    }

    pub fn update(
        &mut self,
        dt_ms: u64,
        ctx: &GhostContext,
        rng: &mut Rng,
        events: &mut Vec<RuntimeEvent>,
    ) {
        self.run_timers(dt_ms, ctx, events);
        let speed = ghost_speed(self.state);
        if speed <= 0.0 {
            return;
        }
        self.move_buffer += speed * dt_ms as f32 / 1000.0;
        let mut safety = 0;
        while self.move_buffer >= 1.0 {
            self.move_buffer -= 1.0;
            safety += 1;
            if safety > MAX_STEPS_PER_TICK {
                break;
            }
            self.step_once(ctx, rng, events);
        }
    }

    fn run_timers(&mut self, dt_ms: u64, ctx: &GhostContext, events: &mut Vec<RuntimeEvent>) {
        match self.state {
            GhostState::House => {
                self.house_wait_ms = self.house_wait_ms.saturating_sub(dt_ms);
                let released = ctx.maze.eaten_dots() >= dot_threshold(self.role)
                    || self.house_wait_ms == 0;
                if released {
                    self.state = GhostState::Exiting;
                    events.push(RuntimeEvent::GhostReleased { role: self.role });
                }
            }
            GhostState::Frightened => {
                self.fright_ms = self.fright_ms.saturating_sub(dt_ms);
                if self.fright_ms == 0 {
                    self.state = state_for(self.resume_mode);
                    events.push(RuntimeEvent::GhostRecovered { role: self.role });
                }
            }
            _ => {}
        }
    }

    fn step_once(&mut self, ctx: &GhostContext, rng: &mut Rng, events: &mut Vec<RuntimeEvent>) {
        match self.state {
            GhostState::House => {}
            GhostState::Exiting => self.step_exit(ctx),
            GhostState::Frightened => {
                let allow_reverse = std::mem::take(&mut self.allow_reverse_once);
                match frightened_direction(ctx.maze, self.pos, self.facing, allow_reverse, rng) {
                    Some(dir) => {
                        self.facing = dir;
                        self.pos = ctx.maze.step(self.pos, dir);
                    }
                    None => events.push(RuntimeEvent::GhostStalled { role: self.role }),
                }
            }
            GhostState::Scatter | GhostState::Chase | GhostState::Eaten => {
                if self.state == GhostState::Eaten && self.pos == ctx.maze.house_entrance() {
                    self.state = GhostState::Exiting;
                    return;
                }
                let target = target_tile(self.state, self.role, ctx);
                let gate_ok = self.state == GhostState::Eaten;
                let allow_reverse = std::mem::take(&mut self.allow_reverse_once);
                match choose_direction(ctx.maze, self.pos, self.facing, target, gate_ok, allow_reverse)
                {
                    Some(dir) => {
                        self.facing = dir;
                        self.pos = ctx.maze.step(self.pos, dir);
                    }
                    // No legal junction exit: hold for one step and retry.
                    None => events.push(RuntimeEvent::GhostStalled { role: self.role }),
                }
            }
        }
    }

    /// Fixed house-exit path: align with the gate column, then climb through
    /// the gate. Reaching the entrance always lands in Scatter; the next
    /// clock flip resynchronizes the ghost with the global phase.
    fn step_exit(&mut self, ctx: &GhostContext) {
        let entrance = ctx.maze.house_entrance();
        if self.pos == entrance {
            self.state = GhostState::Scatter;
            return;
        }
        let gate = ctx.maze.gate_tile();
        let dir = if self.pos.x < gate.x {
            Direction::Right
        } else if self.pos.x > gate.x {
            Direction::Left
        } else {
            Direction::Up
        };
        self.facing = dir;
        self.pos = ctx.maze.step(self.pos, dir);
    }
}
