use std::io;
use std::panic;
use std::time::Duration;

use clap::Parser;
use crossterm::{cursor, execute, terminal as ct_terminal};
use log::{error, info, LevelFilter};

use lumencrawl::cli::Cli;
use lumencrawl::compose;
use lumencrawl::game::{Game, GameOutcome};
use lumencrawl::scheduler::FlickerScheduler;
use lumencrawl::terminal::{CellAttr, CrosstermBackend, Key, Terminal};
use lumencrawl::turn;

fn main() {
    setup_os_optimizations();
    let cli = Cli::parse();
    setup_diagnostics(&cli.log_level);

    info!("starting lumencrawl");

    if let Err(e) = std::panic::catch_unwind(|| run(cli)) {
        restore_terminal_best_effort();
        error!("crashed: {:?}", e);
        std::process::exit(1);
    }
}

fn setup_os_optimizations() {
    #[cfg(feature = "high_priority")]
    {
        let _ = thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max);
    }
}

fn setup_diagnostics(log_level: &str) {
    let level = match log_level {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env()
        .init();

    panic::set_hook(Box::new(|panic_info| {
        restore_terminal_best_effort();
        eprintln!("lumencrawl crashed: {panic_info}");
    }));
}

fn restore_terminal_best_effort() {
    let _ = execute!(io::stdout(), cursor::Show, ct_terminal::LeaveAlternateScreen);
    let _ = ct_terminal::disable_raw_mode();
}

fn run(cli: Cli) {
    let seed = cli.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
    });

    let mut game = Game::new(seed);
    let mut scheduler = FlickerScheduler::new();
    let mut backend = CrosstermBackend::new();

    if backend.init().is_err() {
        error!("failed to initialize terminal");
        return;
    }

    let result = game_loop(&mut game, &mut scheduler, &mut backend);
    let _ = backend.quit();

    match result {
        Ok(GameOutcome::Victory) => println!("You escape with the sword. You win."),
        Ok(GameOutcome::Death) => println!("You have died."),
        Ok(GameOutcome::Quit) => {}
        Err(e) => error!("game loop error: {e}"),
    }
}

fn game_loop(
    game: &mut Game,
    scheduler: &mut FlickerScheduler,
    backend: &mut CrosstermBackend,
) -> lumencrawl::Result<GameOutcome> {
    loop {
        draw(game, backend);

        if scheduler.maybe_tick(&mut game.floors[game.current_floor]) {
            continue;
        }

        match backend.poll_event(Duration::from_millis(100))? {
            Some(Key::Char(c)) => {
                turn::handle_key(game, c)?;
            }
            Some(Key::Unhandled) | None => {}
        }

        if let Some(outcome) = game.outcome {
            return Ok(outcome);
        }
    }
}

fn draw(game: &mut Game, backend: &mut CrosstermBackend) {
    let (cols, rows) = backend.dimensions();
    let (px, py) = game
        .floors[game.current_floor]
        .entities
        .get(game.player)
        .map(|e| (e.x, e.y))
        .unwrap_or((0, 0));

    let cells = compose::compose(&mut game.floors[game.current_floor], px, py, rows as i32, cols as i32);
    backend.clear();
    for cell in cells {
        let attr = CellAttr {
            fg: cell.fg,
            bg: cell.bg,
            bold: false,
            reverse: cell.reverse,
        };
        backend.draw_at(cell.row as u16, cell.col as u16, &cell.glyph.to_string(), attr);
    }
    let _ = backend.flush();
}
