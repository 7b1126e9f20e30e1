mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal, ExecutableCommand,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use flappy_bird::compute::{handle_input, start_game, tick, Flow, GameInput};

use display::Viewport;

#[derive(Parser, Debug)]
#[command(name = "flappy_bird", about = "Flappy Bird in the terminal")]
struct Cli {
    /// Seed for the obstacle gaps (defaults to the system clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Delay between simulation ticks, in milliseconds
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Redraw the whole frame every tick instead of only what changed
    #[arg(long)]
    full_redraw: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Setup helpers ─────────────────────────────────────────────────────────────

/// The game owns the terminal, so logging stays quiet unless it has a file
/// to go to. `RUST_LOG` still overrides the default filter.
fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let default = if log_file.is_some() { "info" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    builder.format_timestamp_millis();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn fit_terminal() -> std::io::Result<Viewport> {
    let (width, height) = terminal::size()?;
    Ok(Viewport::fit(width, height))
}

/// Map a terminal event onto a game input; `None` for events the game
/// does not care about.
fn translate(event: &Event) -> Option<GameInput> {
    match event {
        Event::Resize(..) => Some(GameInput::Redraw),
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => Some(match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => GameInput::Quit,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => GameInput::Quit,
            KeyCode::Char(' ') | KeyCode::Char('w') | KeyCode::Up => GameInput::Jump,
            _ => GameInput::Restart,
        }),
        _ => None,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// While playing, each iteration ticks once, redraws, and takes at most one
/// pending event without blocking.  Once the game is over the loop blocks on
/// the next meaningful event instead.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    cli: &Cli,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let delay = Duration::from_millis(cli.tick_ms);
    let mut viewport = fit_terminal()?;
    let mut state = start_game(rng);
    display::render(out, &state, &viewport)?;

    loop {
        if !state.is_playing() {
            display::render_game_over(out, &state, &viewport)?;

            let input = loop {
                match rx.recv() {
                    Ok(ev) => {
                        if let Some(input) = translate(&ev) {
                            break input;
                        }
                    }
                    // Input thread is gone; nothing can restart us.
                    Err(_) => return Ok(()),
                }
            };

            let (next, flow) = handle_input(&state, input, rng);
            state = next;
            match flow {
                Flow::Exit => return Ok(()),
                Flow::Redraw => {
                    viewport = fit_terminal()?;
                    if state.is_playing() {
                        display::render(out, &state, &viewport)?;
                    }
                }
                Flow::Continue => {}
            }
            continue;
        }

        let frame_start = Instant::now();

        state = tick(&state, rng);
        if !state.is_playing() {
            continue;
        }

        if cli.full_redraw {
            display::render(out, &state, &viewport)?;
        } else {
            display::redraw(out, &state, &viewport)?;
        }

        if let Some(input) = rx.try_recv().ok().as_ref().and_then(translate) {
            let (next, flow) = handle_input(&state, input, rng);
            state = next;
            match flow {
                Flow::Exit => return Ok(()),
                Flow::Redraw => {
                    viewport = fit_terminal()?;
                    display::render(out, &state, &viewport)?;
                }
                Flow::Continue => {}
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < delay {
            thread::sleep(delay - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let seed = cli.seed.unwrap_or_else(clock_seed);
    info!("seeding obstacle generator with {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread to blocking event reads so the game loop can poll
    // without ever blocking on I/O while playing.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &rx, &cli, &mut rng);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("terminal I/O failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["flappy_bird"]).unwrap();
        assert_eq!(cli.seed, None);
        assert_eq!(cli.tick_ms, 10);
        assert!(!cli.full_redraw);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn cli_accepts_all_flags() {
        let cli = Cli::try_parse_from([
            "flappy_bird",
            "--seed",
            "7",
            "--tick-ms",
            "25",
            "--full-redraw",
            "--log-file",
            "game.log",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.tick_ms, 25);
        assert!(cli.full_redraw);
        assert_eq!(cli.log_file, Some(PathBuf::from("game.log")));
    }

    #[test]
    fn space_jumps() {
        assert_eq!(translate(&key(KeyCode::Char(' '))), Some(GameInput::Jump));
        assert_eq!(translate(&key(KeyCode::Up)), Some(GameInput::Jump));
    }

    #[test]
    fn quit_keys() {
        assert_eq!(translate(&key(KeyCode::Char('q'))), Some(GameInput::Quit));
        assert_eq!(translate(&key(KeyCode::Esc)), Some(GameInput::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate(&ctrl_c), Some(GameInput::Quit));
    }

    #[test]
    fn plain_c_is_not_quit() {
        assert_eq!(translate(&key(KeyCode::Char('c'))), Some(GameInput::Restart));
    }

    #[test]
    fn resize_requests_redraw() {
        assert_eq!(translate(&Event::Resize(80, 24)), Some(GameInput::Redraw));
    }

    #[test]
    fn key_release_is_ignored() {
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(translate(&release), None);
        assert_eq!(translate(&Event::FocusGained), None);
    }
}
