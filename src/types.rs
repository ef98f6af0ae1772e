use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }
}

/// Decision priority at a junction. Ties in target distance resolve in this
/// order: Up, then Left, then Down, then Right.
pub const DIRECTION_PRIORITY: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Vec2) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Wall,
    Corridor,
    Dot,
    Energizer,
    Tunnel,
    GhostHouse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostRole {
    Red,
    Pink,
    Cyan,
    Brown,
}

impl GhostRole {
    pub const ALL: [GhostRole; 4] = [
        GhostRole::Red,
        GhostRole::Pink,
        GhostRole::Cyan,
        GhostRole::Brown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Pink => "pink",
            Self::Cyan => "cyan",
            Self::Brown => "brown",
        }
    }
}

/// Global alternating phase produced by the mode clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Scatter,
    Chase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostState {
    House,
    Exiting,
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    OutOfLives,
    Aborted,
}

#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    /// How many tiles ahead of the player's facing the Brown role aims
    /// while chasing.
    pub ambush_offset: i32,
    pub fright_ms_override: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ambush_offset: crate::constants::DEFAULT_AMBUSH_OFFSET,
            fright_ms_override: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub score: i32,
    pub lives: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub role: GhostRole,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub state: GhostState,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PhaseChanged {
        mode: Mode,
    },
    DotEaten {
        x: i32,
        y: i32,
    },
    EnergizerEaten {
        x: i32,
        y: i32,
    },
    GhostReleased {
        role: GhostRole,
    },
    GhostEaten {
        role: GhostRole,
        score: i32,
    },
    GhostRecovered {
        role: GhostRole,
    },
    GhostStalled {
        role: GhostRole,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    LevelCleared {
        level: u32,
    },
    GameOver {
        reason: GameOverReason,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub mode: Mode,
    pub level: u32,
    #[serde(rename = "dotsRemaining")]
    pub dots_remaining: i32,
    #[serde(rename = "dotsEaten")]
    pub dots_eaten: i32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub reason: GameOverReason,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub level: u32,
    pub score: i32,
    #[serde(rename = "dotsEaten")]
    pub dots_eaten: i32,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: i32,
}
