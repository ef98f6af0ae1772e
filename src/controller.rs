use crate::ghost::GhostControl;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::targeting::GhostContext;
use crate::types::{GhostRole, GhostView, Mode, RuntimeEvent};

/// Owns the four ghost controls and drives them in lockstep. The fixed
/// Red, Pink, Cyan, Brown order keeps runs reproducible for debugging; the
/// controls never talk to each other directly.
#[derive(Clone, Debug)]
pub struct GhostController {
    controls: Vec<GhostControl>,
}

impl GhostController {
    pub fn new(maze: &Maze) -> Self {
        let controls = GhostRole::ALL
            .iter()
            .enumerate()
            .map(|(index, role)| GhostControl::new(*role, maze.house_slot(index)))
            .collect();
        Self { controls }
    }

    pub fn controls(&self) -> &[GhostControl] {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut [GhostControl] {
        &mut self.controls
    }

    pub fn views(&self) -> Vec<GhostView> {
        self.controls.iter().map(|control| control.view()).collect()
    }

    /// Everyone back to the house, staggered waits re-armed.
    pub fn reset(&mut self, maze: &Maze) {
        for (index, control) in self.controls.iter_mut().enumerate() {
            control.reset(maze.house_slot(index));
        }
    }

    /// Mode clock flip notification; sticky states ignore it.
    pub fn apply_phase(&mut self, mode: Mode) {
        for control in &mut self.controls {
            control.apply_phase(mode);
        }
    }

    /// Energizer effect on every eligible (Scatter/Chase) ghost.
    pub fn frighten(&mut self, duration_ms: u64) {
        for control in &mut self.controls {
            control.frighten(duration_ms);
        }
    }

    pub fn update(
        &mut self,
        dt_ms: u64,
        ctx: &GhostContext,
        rng: &mut Rng,
        events: &mut Vec<RuntimeEvent>,
    ) {
        for control in &mut self.controls {
            control.update(dt_ms, ctx, rng, events);
        }
    }
}
