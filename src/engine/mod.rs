use crate::clock::ModeClock;
use crate::constants::{
    ghost_chain_score, DOT_SCORE, ENERGIZER_SCORE, FRIGHT_DURATION_MS, START_LIVES,
};
use crate::controller::GhostController;
use crate::maze::{Maze, Pickup};
use crate::player::Player;
use crate::rng::Rng;
use crate::targeting::GhostContext;
use crate::types::{
    Direction, EngineOptions, GameOverReason, GameSummary, Mode, PlayerView, RuntimeEvent,
    Snapshot, Vec2,
};

/// The whole subsystem behind one synchronous tick: maze, mode clock, player
/// and the four ghost controls. `step` is pure computation over a time delta;
/// the host frame loop calls it once per frame and reads snapshots back.
#[derive(Clone, Debug)]
pub struct ChaseEngine {
    options: EngineOptions,
    maze: Maze,
    fresh_maze: Maze,
    clock: ModeClock,
    player: Player,
    controller: GhostController,
    rng: Rng,
    events: Vec<RuntimeEvent>,

    score: i32,
    lives: i32,
    level: u32,
    fright_chain: u32,
    dots_eaten_total: i32,
    ghosts_eaten_total: i32,

    elapsed_ms: u64,
    tick_counter: u64,
    ended: bool,
    end_reason: Option<GameOverReason>,
}

impl ChaseEngine {
    pub fn new(seed: u32, options: EngineOptions) -> Self {
        let maze = Maze::standard();
        let fresh_maze = maze.clone();
        let controller = GhostController::new(&maze);
        let player = Player::new(maze.player_spawn());
        Self {
            options,
            maze,
            fresh_maze,
            clock: ModeClock::standard(),
            player,
            controller,
            rng: Rng::new(seed),
            events: Vec::new(),
            score: 0,
            lives: START_LIVES,
            level: 1,
            fright_chain: 0,
            dots_eaten_total: 0,
            ghosts_eaten_total: 0,
            elapsed_ms: 0,
            tick_counter: 0,
            ended: false,
            end_reason: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn mode(&self) -> Mode {
        self.clock.mode()
    }

    pub fn set_player_direction(&mut self, dir: Direction) {
        self.player.set_desired_dir(dir);
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        if self.clock.advance(dt_ms) {
            let mode = self.clock.mode();
            self.controller.apply_phase(mode);
            self.events.push(RuntimeEvent::PhaseChanged { mode });
        }

        let player_before = self.player.position();
        let ghosts_before: Vec<Vec2> = self
            .controller
            .controls()
            .iter()
            .map(|control| control.position())
            .collect();

        self.update_player(dt_ms);

        let ctx = GhostContext {
            maze: &self.maze,
            player_tile: self.player.position(),
            player_facing: self.player.facing(),
            ambush_offset: self.options.ambush_offset,
        };
        self.controller
            .update(dt_ms, &ctx, &mut self.rng, &mut self.events);

        self.resolve_collisions(player_before, &ghosts_before);

        if !self.ended && self.maze.remaining_dots() == 0 {
            self.clear_level();
        }
    }

    fn update_player(&mut self, dt_ms: u64) {
        let fright_ms = self
            .options
            .fright_ms_override
            .unwrap_or(FRIGHT_DURATION_MS);
        for (tile, pickup) in self.player.update(dt_ms, &mut self.maze) {
            self.dots_eaten_total += 1;
            match pickup {
                Pickup::Dot => {
                    self.score += DOT_SCORE;
                    self.events.push(RuntimeEvent::DotEaten {
                        x: tile.x,
                        y: tile.y,
                    });
                }
                Pickup::Energizer => {
                    self.score += ENERGIZER_SCORE;
                    self.fright_chain = 0;
                    self.controller.frighten(fright_ms);
                    self.events.push(RuntimeEvent::EnergizerEaten {
                        x: tile.x,
                        y: tile.y,
                    });
                }
            }
        }
    }

    /// Same-tile overlap and pass-through swaps both count as contact.
    fn resolve_collisions(&mut self, player_before: Vec2, ghosts_before: &[Vec2]) {
        let player_pos = self.player.position();
        for index in 0..self.controller.controls().len() {
            let ghost_pos = self.controller.controls()[index].position();
            let overlap = ghost_pos == player_pos;
            let swapped = ghosts_before
                .get(index)
                .map(|before| *before == player_pos && ghost_pos == player_before)
                .unwrap_or(false);
            if !overlap && !swapped {
                continue;
            }

            let control = &mut self.controller.controls_mut()[index];
            if control.is_vulnerable() {
                let score = ghost_chain_score(self.fright_chain);
                self.fright_chain += 1;
                self.score += score;
                self.ghosts_eaten_total += 1;
                let role = control.role();
                control.mark_eaten();
                self.events.push(RuntimeEvent::GhostEaten { role, score });
            } else if control.is_deadly() {
                self.lose_life();
                return;
            }
        }
    }

    fn lose_life(&mut self) {
        self.lives -= 1;
        self.events.push(RuntimeEvent::LifeLost {
            lives_left: self.lives,
        });
        if self.lives <= 0 {
            self.ended = true;
            self.end_reason = Some(GameOverReason::OutOfLives);
            self.events.push(RuntimeEvent::GameOver {
                reason: GameOverReason::OutOfLives,
            });
            return;
        }
        // Positions re-seed; the mode clock keeps its place in the timeline.
        self.player.reset(self.maze.player_spawn());
        self.controller.reset(&self.maze);
        self.fright_chain = 0;
    }

    fn clear_level(&mut self) {
        self.events.push(RuntimeEvent::LevelCleared { level: self.level });
        self.level += 1;
        self.maze = self.fresh_maze.clone();
        self.clock = ModeClock::standard();
        self.player.reset(self.maze.player_spawn());
        self.controller.reset(&self.maze);
        self.fright_chain = 0;
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            mode: self.clock.mode(),
            level: self.level,
            dots_remaining: self.maze.remaining_dots(),
            dots_eaten: self.maze.eaten_dots(),
            player: PlayerView {
                x: self.player.position().x,
                y: self.player.position().y,
                dir: self.player.facing(),
                score: self.score,
                lives: self.lives,
            },
            ghosts: self.controller.views(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            reason: self.end_reason.unwrap_or(GameOverReason::Aborted),
            duration_ms: self.elapsed_ms,
            level: self.level,
            score: self.score,
            dots_eaten: self.dots_eaten_total,
            ghosts_eaten: self.ghosts_eaten_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TICK_MS;
    use crate::types::{GhostRole, GhostState};

    fn engine_with_seed(seed: u32) -> ChaseEngine {
        ChaseEngine::new(seed, EngineOptions::default())
    }

    /// Deterministic steering so two engines can be compared tick for tick.
    fn scripted_dir(tick: u64) -> Direction {
        match (tick / 40) % 4 {
            0 => Direction::Left,
            1 => Direction::Up,
            2 => Direction::Right,
            _ => Direction::Down,
        }
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = engine_with_seed(424_242);
        let mut b = engine_with_seed(424_242);

        for tick in 0..1_200u64 {
            a.set_player_direction(scripted_dir(tick));
            b.set_player_direction(scripted_dir(tick));
            a.step(TICK_MS);
            b.step(TICK_MS);
            let sa = a.build_snapshot(false);
            let sb = b.build_snapshot(false);

            assert_eq!(sa.mode, sb.mode);
            assert_eq!(sa.dots_remaining, sb.dots_remaining);
            assert_eq!(sa.player.x, sb.player.x);
            assert_eq!(sa.player.y, sb.player.y);
            assert_eq!(sa.player.score, sb.player.score);
            for (ga, gb) in sa.ghosts.iter().zip(sb.ghosts.iter()) {
                assert_eq!(ga.role, gb.role);
                assert_eq!(ga.x, gb.x);
                assert_eq!(ga.y, gb.y);
                assert_eq!(ga.state, gb.state);
            }
            if a.is_ended() || b.is_ended() {
                assert_eq!(a.is_ended(), b.is_ended());
                break;
            }
        }
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut engine = engine_with_seed(333);
        engine.events.push(RuntimeEvent::PhaseChanged { mode: Mode::Chase });

        let first = engine.build_snapshot(true);
        let second = engine.build_snapshot(true);
        assert_eq!(first.events.len(), 1);
        assert_eq!(second.events.len(), 0);
    }

    #[test]
    fn energizer_frightens_only_scatter_and_chase_ghosts() {
        let mut engine = engine_with_seed(100);
        {
            let controls = engine.controller.controls_mut();
            controls[0].state = GhostState::Scatter;
            controls[0].pos = Vec2::new(5, 13);
            controls[1].state = GhostState::Eaten;
            controls[1].pos = Vec2::new(15, 13);
            // controls[2] and [3] stay in House with long waits.
            controls[2].house_wait_ms = 600_000;
            controls[3].house_wait_ms = 600_000;
        }
        // Walk the player onto the energizer at (1,12).
        engine.player.pos = Vec2::new(2, 12);
        engine.player.facing = Direction::Left;
        engine.set_player_direction(Direction::Left);

        engine.step(200);
        let states: Vec<GhostState> = engine
            .controller
            .controls()
            .iter()
            .map(|control| control.state())
            .collect();
        assert_eq!(states[0], GhostState::Frightened);
        assert_eq!(states[1], GhostState::Eaten);
        assert_eq!(states[2], GhostState::House);
        assert_eq!(states[3], GhostState::House);
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::EnergizerEaten { .. })));
    }

    #[test]
    fn eating_ghosts_doubles_the_chain_score() {
        let mut engine = engine_with_seed(7);
        {
            let controls = engine.controller.controls_mut();
            for control in controls.iter_mut() {
                control.state = GhostState::Frightened;
                control.fright_ms = 60_000;
                control.pos = Vec2::new(9, 13);
            }
        }
        engine.player.pos = Vec2::new(10, 13);
        engine.player.facing = Direction::Left;
        engine.set_player_direction(Direction::Left);

        engine.step(200);
        let scores: Vec<i32> = engine
            .events
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::GhostEaten { score, .. } => Some(*score),
                _ => None,
            })
            .collect();
        assert_eq!(scores, vec![200, 400, 800, 1_600]);
        for control in engine.controller.controls() {
            assert_eq!(control.state(), GhostState::Eaten);
        }
    }

    #[test]
    fn chain_resets_on_the_next_energizer() {
        let mut engine = engine_with_seed(8);
        engine.fright_chain = 3;
        engine.player.pos = Vec2::new(2, 12);
        engine.player.facing = Direction::Left;
        engine.set_player_direction(Direction::Left);
        engine.step(200);
        assert_eq!(engine.fright_chain, 0);
    }

    #[test]
    fn life_loss_reseeds_positions_but_not_the_clock() {
        let mut engine = engine_with_seed(55);
        engine.clock.advance(7_000);
        assert_eq!(engine.mode(), Mode::Chase);

        {
            let controls = engine.controller.controls_mut();
            controls[0].state = GhostState::Chase;
            controls[0].pos = engine.player.pos;
        }
        engine.step(1);

        assert_eq!(engine.player.position(), engine.maze.player_spawn());
        for control in engine.controller.controls() {
            assert_eq!(control.state(), GhostState::House);
        }
        // The clock did not rewind to the opening scatter phase.
        assert_eq!(engine.mode(), Mode::Chase);
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::LifeLost { lives_left: 2 })));
        assert!(!engine.is_ended());
    }

    #[test]
    fn last_life_ends_the_run() {
        let mut engine = engine_with_seed(56);
        engine.lives = 1;
        {
            let controls = engine.controller.controls_mut();
            controls[0].state = GhostState::Chase;
            controls[0].pos = engine.player.pos;
        }
        engine.step(1);

        assert!(engine.is_ended());
        let summary = engine.build_summary();
        assert_eq!(summary.reason, GameOverReason::OutOfLives);
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::GameOver { .. })));

        // Further steps are no-ops once the run is over.
        let before = engine.build_snapshot(false);
        engine.step(TICK_MS);
        let after = engine.build_snapshot(false);
        assert_eq!(before.tick, after.tick);
    }

    #[test]
    fn clearing_the_last_dot_starts_the_next_level() {
        let mut engine = engine_with_seed(77);
        let total = engine.maze.remaining_dots();

        // Eat everything except the dot just left of the player spawn.
        let keep = Vec2::new(9, 12);
        for y in 0..engine.maze.height() {
            for x in 0..engine.maze.width() {
                let tile = Vec2::new(x, y);
                if tile != keep {
                    engine.maze.eat_at(tile);
                }
            }
        }
        assert_eq!(engine.maze.remaining_dots(), 1);

        engine.set_player_direction(Direction::Left);
        engine.step(200);

        assert_eq!(engine.level, 2);
        assert_eq!(engine.maze.remaining_dots(), total);
        assert_eq!(engine.player.position(), engine.maze.player_spawn());
        for control in engine.controller.controls() {
            assert_eq!(control.state(), GhostState::House);
        }
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::LevelCleared { level: 1 })));
    }

    #[test]
    fn seventh_dot_releases_pink_within_the_same_tick() {
        let mut engine = engine_with_seed(99);
        for _ in 0..6 {
            let mut eaten = false;
            'scan: for y in 0..engine.maze.height() {
                for x in 0..engine.maze.width() {
                    if engine.maze.eat_at(Vec2::new(x, y)).is_some() {
                        eaten = true;
                        break 'scan;
                    }
                }
            }
            assert!(eaten);
        }
        assert_eq!(engine.maze.eaten_dots(), 6);

        // Keep pink's house wait far away so only the dot gate can fire.
        engine.controller.controls_mut()[1].house_wait_ms = 600_000;
        engine.set_player_direction(Direction::Left);

        let mut released_tick = None;
        for tick in 1..=40u64 {
            engine.step(TICK_MS);
            let eaten_now = engine.maze.eaten_dots();
            let pink = &engine.controller.controls()[1];
            if eaten_now >= 7 {
                // Same tick as the seventh dot: pink is already on its way.
                assert_ne!(pink.state(), GhostState::House);
                released_tick = Some(tick);
                break;
            }
            assert_eq!(pink.state(), GhostState::House);
        }
        assert!(released_tick.is_some());
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::GhostReleased { role: GhostRole::Pink })));
    }

    #[test]
    fn summary_reports_running_totals_before_the_run_ends() {
        let mut engine = engine_with_seed(11);
        engine.set_player_direction(Direction::Left);
        for _ in 0..40 {
            engine.step(TICK_MS);
        }
        let summary = engine.build_summary();
        assert_eq!(summary.reason, GameOverReason::Aborted);
        assert!(summary.dots_eaten > 0);
        assert_eq!(summary.level, 1);
        assert!(summary.duration_ms >= 2_000);
    }
}
