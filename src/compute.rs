/// Pure game-logic functions.
///
/// Every public function takes the current value (and, where needed, an RNG
/// handle) and returns a brand-new value.  Side effects are limited to the
/// injected RNG and the `log` facade.

use log::{debug, info};
use rand::Rng;

use crate::entities::{
    Actor, GameState, GameStatus, Obstacle, ObstacleSet, ACTOR_HEIGHT, ACTOR_WIDTH, ACTOR_X,
    GAP_Y_MAX, GAP_Y_MIN, GRAVITY, JUMP_VELOCITY, MAX_FALL_VELOCITY, MAX_OBSTACLES,
    OBSTACLE_STEP, OBSTACLE_WIDTH, SPAWN_X, VELOCITY_SCALE, WINDOW_HEIGHT, WINDOW_WIDTH,
};

/// A new obstacle is activated once the newest one is left of this column.
pub const ACTIVATION_X: i32 = WINDOW_WIDTH - WINDOW_WIDTH / 3;

// ── Input ─────────────────────────────────────────────────────────────────────

/// Discrete events the driver forwards into the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameInput {
    Jump,
    Restart,
    /// The surface was invalidated (resize, expose) and needs a full frame.
    Redraw,
    Quit,
}

/// What the driver should do after an input has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Redraw,
    Exit,
}

// ── Actor ─────────────────────────────────────────────────────────────────────

/// Apply one tick of gravity. Bounds are the caller's concern.
pub fn advance_actor(actor: &Actor) -> Actor {
    let velocity = (actor.velocity + GRAVITY).min(MAX_FALL_VELOCITY);
    Actor {
        y: actor.y + velocity / VELOCITY_SCALE,
        prev_y: actor.y,
        velocity,
    }
}

pub fn jump(actor: &Actor) -> Actor {
    Actor {
        velocity: JUMP_VELOCITY,
        ..*actor
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

pub fn randomize_obstacle(rng: &mut impl Rng) -> Obstacle {
    Obstacle {
        x: SPAWN_X,
        gap_y: rng.gen_range(GAP_Y_MIN..GAP_Y_MAX),
    }
}

/// Move one step left; once fully past the left edge the slot is reused
/// with a freshly rolled obstacle.
pub fn advance_obstacle(obstacle: &Obstacle, rng: &mut impl Rng) -> Obstacle {
    let x = obstacle.x - OBSTACLE_STEP;
    if x < -(OBSTACLE_WIDTH + 2) {
        let fresh = randomize_obstacle(rng);
        debug!("obstacle recycled, new gap at {}", fresh.gap_y);
        fresh
    } else {
        Obstacle { x, ..*obstacle }
    }
}

/// Activate the next slot when the newest live obstacle has crossed a third
/// of the screen. Spacing therefore tracks distance, not time.
pub fn maybe_activate_next(set: &ObstacleSet, rng: &mut impl Rng) -> ObstacleSet {
    let newest = set.slots[set.active - 1];
    if set.active >= MAX_OBSTACLES || newest.x >= ACTIVATION_X {
        return *set;
    }
    let mut slots = set.slots;
    slots[set.active] = randomize_obstacle(rng);
    debug!("obstacle slot {} activated", set.active);
    ObstacleSet {
        slots,
        active: set.active + 1,
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

/// True when the obstacle overlaps the actor horizontally and the actor is
/// not strictly inside the gap.
pub fn check_collision(actor: &Actor, obstacle: &Obstacle) -> bool {
    let overlaps = obstacle.x <= ACTOR_X + ACTOR_WIDTH && obstacle.right_edge() >= ACTOR_X;
    overlaps && (actor.y <= obstacle.gap_y || actor.y + ACTOR_HEIGHT >= obstacle.gap_bottom())
}

/// True on the single tick the obstacle's trailing edge reaches the actor.
///
/// The window is two integers wide to match the per-tick step, so exactly
/// one tick of any passage lands in it.
pub fn check_add_score(_actor: &Actor, obstacle: &Obstacle) -> bool {
    matches!(ACTOR_X - obstacle.right_edge(), 0 | 1)
}

pub fn is_out_of_bounds(actor: &Actor) -> bool {
    actor.y < 0 || actor.y + ACTOR_HEIGHT > WINDOW_HEIGHT
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Build the state for a fresh session: bird centred, one obstacle in flight.
pub fn start_game(rng: &mut impl Rng) -> GameState {
    let first = randomize_obstacle(rng);
    info!("game started, first gap at {}", first.gap_y);
    GameState {
        actor: Actor::new(),
        obstacles: ObstacleSet {
            slots: [first; MAX_OBSTACLES],
            active: 1,
        },
        score: 0,
        score_changed: false,
        status: GameStatus::Playing,
        frame: 0,
    }
}

/// Advance the simulation by one tick.  A finished game is returned as is.
pub fn tick(state: &GameState, rng: &mut impl Rng) -> GameState {
    if !state.is_playing() {
        return *state;
    }

    let actor = advance_actor(&state.actor);
    let mut obstacles = maybe_activate_next(&state.obstacles, rng);
    let mut score = state.score;
    let mut score_changed = false;
    let mut status = GameStatus::Playing;

    for slot in obstacles.slots.iter_mut().take(obstacles.active) {
        if check_add_score(&actor, slot) {
            score += 1;
            score_changed = true;
            debug!("score {}", score);
        }

        // A hit obstacle stays where it is; the rest keep moving this tick.
        if check_collision(&actor, slot) {
            status = GameStatus::GameOver;
            continue;
        }

        *slot = advance_obstacle(slot, rng);
    }

    if is_out_of_bounds(&actor) {
        status = GameStatus::GameOver;
    }

    let frame = state.frame + 1;
    if status == GameStatus::GameOver {
        info!("game over at frame {} with score {}", frame, score);
    }

    GameState {
        actor,
        obstacles,
        score,
        score_changed,
        status,
        frame,
    }
}

// ── Input-driven transitions ──────────────────────────────────────────────────

pub fn on_jump(state: &GameState) -> GameState {
    if !state.is_playing() {
        return *state;
    }
    GameState {
        actor: jump(&state.actor),
        ..*state
    }
}

pub fn on_restart(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.is_playing() {
        return *state;
    }
    info!("restarting after score {}", state.score);
    start_game(rng)
}

/// Quitting is valid in either state; the driver owns process exit.
pub fn on_quit(_state: &GameState) -> Flow {
    Flow::Exit
}

/// Route one input to the matching transition.  While the game is over any
/// key restarts, so `Jump` doubles as a restart there.
pub fn handle_input(
    state: &GameState,
    input: GameInput,
    rng: &mut impl Rng,
) -> (GameState, Flow) {
    match (state.status, input) {
        (_, GameInput::Quit) => (*state, on_quit(state)),
        (_, GameInput::Redraw) => (*state, Flow::Redraw),
        (GameStatus::Playing, GameInput::Jump) => (on_jump(state), Flow::Continue),
        (GameStatus::Playing, GameInput::Restart) => (*state, Flow::Continue),
        (GameStatus::GameOver, GameInput::Jump | GameInput::Restart) => {
            (on_restart(state, rng), Flow::Redraw)
        }
    }
}
