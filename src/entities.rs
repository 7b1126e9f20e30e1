/// All game entity types: plain data plus read-only accessors.
///
/// Coordinates are world pixels on a fixed 400×400 field; the renderer
/// scales them to whatever surface it draws on.

// ── World ─────────────────────────────────────────────────────────────────────

pub const WINDOW_WIDTH: i32 = 400;
pub const WINDOW_HEIGHT: i32 = 400;

// ── Actor (the bird) ──────────────────────────────────────────────────────────

/// Fixed column of the bird's left edge.
pub const ACTOR_X: i32 = 100;
pub const ACTOR_WIDTH: i32 = 17;
pub const ACTOR_HEIGHT: i32 = 12;

/// Velocity added every tick.
pub const GRAVITY: i32 = 2;
/// Upper clamp on velocity; there is no lower clamp.
pub const MAX_FALL_VELOCITY: i32 = 30;
/// Velocity a jump sets, regardless of the current one.
pub const JUMP_VELOCITY: i32 = -50;
/// Velocity is stored in tenths of a pixel per tick.
pub const VELOCITY_SCALE: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub y: i32,
    /// Position before the last advance, used to clear the vacated band.
    pub prev_y: i32,
    pub velocity: i32,
}

impl Actor {
    pub fn new() -> Self {
        let y = WINDOW_HEIGHT / 2;
        Actor {
            y,
            prev_y: y,
            velocity: 0,
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

// ── Obstacles (tubes) ─────────────────────────────────────────────────────────

pub const OBSTACLE_WIDTH: i32 = 50;
pub const GAP_HEIGHT: i32 = 100;
/// Height of the wider cap drawn on each side of the gap. Cosmetic only.
pub const HEAD_HEIGHT: i32 = 18;
/// Pixels an obstacle moves left per tick.
pub const OBSTACLE_STEP: i32 = 2;
/// Inclusive lower / exclusive upper bound of a freshly rolled `gap_y`.
pub const GAP_Y_MIN: i32 = 50;
pub const GAP_Y_MAX: i32 = 250;
/// Horizontal position every spawned obstacle starts from.
pub const SPAWN_X: i32 = WINDOW_WIDTH + 1;
pub const MAX_OBSTACLES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle {
    pub x: i32,
    /// Top edge of the gap; the gap spans `gap_y .. gap_y + GAP_HEIGHT`.
    pub gap_y: i32,
}

impl Obstacle {
    pub fn gap_bottom(&self) -> i32 {
        self.gap_y + GAP_HEIGHT
    }

    pub fn right_edge(&self) -> i32 {
        self.x + OBSTACLE_WIDTH
    }
}

/// Fixed-capacity obstacle arena. Slots `0..active` are live; the rest hold
/// stale values and are never read until activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstacleSet {
    pub slots: [Obstacle; MAX_OBSTACLES],
    pub active: usize,
}

impl ObstacleSet {
    pub fn active_obstacles(&self) -> &[Obstacle] {
        &self.slots[..self.active]
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// The entire game state.  `Copy`, so the update functions in `compute`
/// hand back a fresh value instead of mutating in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub actor: Actor,
    pub obstacles: ObstacleSet,
    pub score: u32,
    /// Set when the last tick changed `score`.
    pub score_changed: bool,
    pub status: GameStatus,
    /// Ticks simulated since the session started.
    pub frame: u64,
}

impl GameState {
    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}
