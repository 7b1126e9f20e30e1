/// Rendering layer; all terminal I/O lives here.
///
/// The game runs in fixed world pixels; a `Viewport` scales that field into
/// the terminal.  Each function receives a mutable writer and an immutable
/// view of the game state.  No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use flappy_bird::entities::{
    GameState, Obstacle, ACTOR_HEIGHT, ACTOR_WIDTH, ACTOR_X, HEAD_HEIGHT, OBSTACLE_STEP,
    WINDOW_HEIGHT, WINDOW_WIDTH,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_SKY: Color = Color::Cyan;
const C_TUBE_BODY: Color = Color::Green;
const C_TUBE_HEAD: Color = Color::DarkGreen;
const C_BIRD: Color = Color::Yellow;
const C_TEXT: Color = Color::Black;
const C_GAME_OVER_BG: Color = Color::Black;
const C_GAME_OVER_TEXT: Color = Color::White;

const TITLE: &str = "Flappy bird";
const CONTROLS: &str = "SPACEBAR TO JUMP";
const GAME_OVER: &str = "GAMEOVER";
const ANY_KEY: &str = "Press any key for restart";

/// Tube heads stick out this many pixels past the body on the right.
const HEAD_OVERHANG: i32 = 2;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Terminal rectangle the world is scaled into, centred with room for a
/// one-cell border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub left: u16,
    pub top: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    /// Largest square-looking field that fits; cells are roughly twice as
    /// tall as they are wide, hence two columns per row.
    pub fn fit(term_width: u16, term_height: u16) -> Self {
        let rows = term_height
            .saturating_sub(2)
            .min(term_width.saturating_sub(2) / 2)
            .max(1);
        let cols = (rows * 2).min(term_width.saturating_sub(2)).max(1);
        Viewport {
            left: term_width.saturating_sub(cols) / 2,
            top: term_height.saturating_sub(rows) / 2,
            cols,
            rows,
        }
    }

    /// World x → viewport column (may be outside `0..cols`).
    pub fn col(&self, x: i32) -> i32 {
        (x * self.cols as i32).div_euclid(WINDOW_WIDTH)
    }

    /// World y → viewport row (may be outside `0..rows`).
    pub fn row(&self, y: i32) -> i32 {
        (y * self.rows as i32).div_euclid(WINDOW_HEIGHT)
    }

    /// Visible columns covered by world span `x0..x1`, at least one wide.
    pub fn col_span(&self, x0: i32, x1: i32) -> Option<(u16, u16)> {
        span(x0, x1, WINDOW_WIDTH, self.cols, |x| self.col(x))
    }

    /// Visible rows covered by world span `y0..y1`, at least one tall.
    pub fn row_span(&self, y0: i32, y1: i32) -> Option<(u16, u16)> {
        span(y0, y1, WINDOW_HEIGHT, self.rows, |y| self.row(y))
    }
}

fn span(lo: i32, hi: i32, world: i32, cells: u16, map: impl Fn(i32) -> i32) -> Option<(u16, u16)> {
    if hi <= lo || hi <= 0 || lo >= world {
        return None;
    }
    let start = map(lo.max(0));
    let end = map(hi.min(world)).max(start + 1).min(cells as i32);
    Some((start as u16, end as u16))
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, vp: &Viewport) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, vp)?;
    fill(out, vp, (0, vp.cols), (0, vp.rows), C_SKY)?;

    for obstacle in state.obstacles.active_obstacles() {
        draw_obstacle(out, vp, obstacle)?;
    }
    draw_actor(out, vp, state)?;
    draw_hud(out, vp, state)?;

    finish(out)
}

/// Redraw only what a tick can have changed: the band the bird vacated,
/// the score when it moved, and the trailing edge of every tube.
pub fn redraw<W: Write>(out: &mut W, state: &GameState, vp: &Viewport) -> std::io::Result<()> {
    let actor = &state.actor;
    let vacated = if actor.y > actor.prev_y {
        vp.row_span(actor.prev_y, actor.y)
    } else {
        vp.row_span(actor.y + ACTOR_HEIGHT, actor.prev_y + ACTOR_HEIGHT)
    };
    if let (Some(rows), Some(cols)) = (vacated, vp.col_span(ACTOR_X, ACTOR_X + ACTOR_WIDTH)) {
        fill(out, vp, cols, rows, C_SKY)?;
    }

    if state.score_changed {
        let width = score_line(state.score).chars().count() as u16;
        fill(out, vp, (0, width.min(vp.cols)), (0, 1), C_SKY)?;
    }

    for obstacle in state.obstacles.active_obstacles() {
        let edge = obstacle.right_edge() + HEAD_OVERHANG;
        if let Some(cols) = vp.col_span(edge, edge + OBSTACLE_STEP) {
            fill(out, vp, cols, (0, vp.rows), C_SKY)?;
        }
        draw_obstacle(out, vp, obstacle)?;
    }
    draw_actor(out, vp, state)?;
    draw_hud(out, vp, state)?;

    finish(out)
}

/// Render the game-over screen.
pub fn render_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    vp: &Viewport,
) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, vp)?;
    fill(out, vp, (0, vp.cols), (0, vp.rows), C_GAME_OVER_BG)?;

    let score = score_line(state.score);
    let lines = [(GAME_OVER, 50), (score.as_str(), 100), (ANY_KEY, 150)];
    // Keep the lines on distinct rows even when the field is tiny.
    let mut next_free = 0;
    for (text, world_y) in lines {
        let row = vp.row(world_y).max(next_free).min(vp.rows as i32 - 1);
        next_free = row + 1;
        let width = text.chars().count() as u16;
        let col = vp.cols.saturating_sub(width) / 2;
        out.queue(cursor::MoveTo(vp.left + col, vp.top + row as u16))?;
        out.queue(style::SetBackgroundColor(C_GAME_OVER_BG))?;
        out.queue(style::SetForegroundColor(C_GAME_OVER_TEXT))?;
        out.queue(Print(text))?;
    }

    finish(out)
}

pub fn score_line(score: u32) -> String {
    format!("Score: {:>3}", score)
}

// ── Frame pieces ──────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, vp: &Viewport) -> std::io::Result<()> {
    // No room left around the field on very small terminals.
    if vp.left == 0 || vp.top == 0 {
        return Ok(());
    }
    let w = vp.cols as usize;
    let (x0, y0) = (vp.left - 1, vp.top - 1);

    out.queue(style::SetBackgroundColor(Color::Reset))?;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    let title = format!(" {} ", TITLE);
    let bar = if title.chars().count() + 2 <= w {
        format!("┌─{}{}┐", title, "─".repeat(w - title.chars().count() - 1))
    } else {
        format!("┌{}┐", "─".repeat(w))
    };
    out.queue(cursor::MoveTo(x0, y0))?;
    out.queue(Print(bar))?;

    out.queue(cursor::MoveTo(x0, vp.top + vp.rows))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;

    for row in vp.top..vp.top + vp.rows {
        out.queue(cursor::MoveTo(x0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(vp.left + vp.cols, row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_obstacle<W: Write>(out: &mut W, vp: &Viewport, obstacle: &Obstacle) -> std::io::Result<()> {
    let body = vp.col_span(obstacle.x, obstacle.right_edge());
    let head = vp.col_span(obstacle.x, obstacle.right_edge() + HEAD_OVERHANG);
    let (Some(body), Some(head)) = (body, head) else {
        return Ok(());
    };

    let top_head = obstacle.gap_y - HEAD_HEIGHT;
    let bottom_head = obstacle.gap_bottom() + HEAD_HEIGHT;
    let bands = [
        (0, top_head, body, C_TUBE_BODY),
        (top_head, obstacle.gap_y, head, C_TUBE_HEAD),
        (obstacle.gap_bottom(), bottom_head, head, C_TUBE_HEAD),
        (bottom_head, WINDOW_HEIGHT, body, C_TUBE_BODY),
    ];
    for (y0, y1, cols, color) in bands {
        if let Some(rows) = vp.row_span(y0, y1) {
            fill(out, vp, cols, rows, color)?;
        }
    }
    Ok(())
}

fn draw_actor<W: Write>(out: &mut W, vp: &Viewport, state: &GameState) -> std::io::Result<()> {
    let y = state.actor.y;
    if let (Some(cols), Some(rows)) = (
        vp.col_span(ACTOR_X, ACTOR_X + ACTOR_WIDTH),
        vp.row_span(y, y + ACTOR_HEIGHT),
    ) {
        fill(out, vp, cols, rows, C_BIRD)?;
    }
    Ok(())
}

/// Score on the first row, controls hint on the second.
fn draw_hud<W: Write>(out: &mut W, vp: &Viewport, state: &GameState) -> std::io::Result<()> {
    out.queue(style::SetBackgroundColor(C_SKY))?;
    out.queue(style::SetForegroundColor(C_TEXT))?;
    for (row, text) in [score_line(state.score), CONTROLS.to_string()]
        .iter()
        .enumerate()
        .take(vp.rows as usize)
    {
        let clipped: String = text.chars().take(vp.cols as usize).collect();
        out.queue(cursor::MoveTo(vp.left, vp.top + row as u16))?;
        out.queue(Print(clipped))?;
    }
    Ok(())
}

fn fill<W: Write>(
    out: &mut W,
    vp: &Viewport,
    (c0, c1): (u16, u16),
    (r0, r1): (u16, u16),
    color: Color,
) -> std::io::Result<()> {
    if c1 <= c0 {
        return Ok(());
    }
    let blank = " ".repeat((c1 - c0) as usize);
    out.queue(style::SetBackgroundColor(color))?;
    for row in r0..r1 {
        out.queue(cursor::MoveTo(vp.left + c0, vp.top + row))?;
        out.queue(Print(&blank))?;
    }
    Ok(())
}

/// Park the cursor in a harmless spot and flush.
fn finish<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, 0))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_bird::compute::{start_game, tick};
    use flappy_bird::entities::GameStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn viewport_is_centred_with_border_room() {
        let vp = Viewport::fit(100, 42);
        assert_eq!(vp.rows, 40);
        assert_eq!(vp.cols, 80);
        assert_eq!(vp.left, 10);
        assert_eq!(vp.top, 1);
    }

    #[test]
    fn viewport_limited_by_narrow_terminal() {
        let vp = Viewport::fit(42, 50);
        assert_eq!(vp.rows, 20);
        assert_eq!(vp.cols, 40);
    }

    #[test]
    fn viewport_never_collapses_to_zero() {
        let vp = Viewport::fit(0, 0);
        assert_eq!(vp.rows, 1);
        assert_eq!(vp.cols, 1);
    }

    #[test]
    fn world_to_cell_mapping() {
        let vp = Viewport::fit(82, 42); // 80 x 40
        assert_eq!(vp.col(0), 0);
        assert_eq!(vp.col(ACTOR_X), 20);
        assert_eq!(vp.col(-1), -1);
        assert_eq!(vp.row(WINDOW_HEIGHT / 2), 20);
        assert_eq!(vp.row(399), 39);
    }

    #[test]
    fn spans_are_clipped_and_non_empty() {
        let vp = Viewport::fit(82, 42);
        assert_eq!(vp.col_span(-30, 20), Some((0, 4)));
        assert_eq!(vp.col_span(390, 460), Some((78, 80)));
        assert_eq!(vp.col_span(401, 451), None);
        assert_eq!(vp.col_span(-100, -50), None);
        // A sliver narrower than one cell still covers a cell.
        assert_eq!(vp.row_span(201, 203), Some((20, 21)));
    }

    #[test]
    fn full_frame_shows_hud() {
        let state = start_game(&mut StdRng::seed_from_u64(1));
        let vp = Viewport::fit(82, 42);
        let text = rendered(|out| render(out, &state, &vp));
        assert!(text.contains("Score:   0"));
        assert!(text.contains(CONTROLS));
        assert!(text.contains(TITLE));
    }

    #[test]
    fn partial_redraw_writes_hud_after_tick() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = tick(&start_game(&mut rng), &mut rng);
        let vp = Viewport::fit(82, 42);
        let text = rendered(|out| redraw(out, &state, &vp));
        assert!(text.contains("Score:   0"));
    }

    #[test]
    fn game_over_screen_lists_score_and_hint() {
        let mut state = start_game(&mut StdRng::seed_from_u64(1));
        state.status = GameStatus::GameOver;
        state.score = 12;
        let vp = Viewport::fit(82, 42);
        let text = rendered(|out| render_game_over(out, &state, &vp));
        assert!(text.contains(GAME_OVER));
        assert!(text.contains("Score:  12"));
        assert!(text.contains(ANY_KEY));
    }
}
