//! # Rolice Main Entry Point
//!
//! Loads a level, then plays it from a move script or from stdin in the
//! terminal.

use clap::Parser;
use log::{error, info};
use rolice::{
    execute_input, render_board, render_status, validate_level, ColorType, CommandOutcome,
    DiceFaces, GameSession, InputHandler, JsonProgressStore, LevelDescriptor, MoveOutcome,
    PlayerInput, Position, ProgressTracker, RoliceError, RoliceResult, HELP_TEXT,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Command line arguments for Rolice.
#[derive(Parser, Debug)]
#[command(name = "rolice")]
#[command(about = "Roll a colored die across the grid and clear every color tile")]
#[command(version)]
struct Args {
    /// Level JSON file; the built-in tutorial is used when omitted
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Move script, e.g. "RU" or "wasd"; reads stdin when omitted
    #[arg(short, long)]
    moves: Option<String>,

    /// Start position as "x,y", overriding the level's
    #[arg(long)]
    start: Option<String>,

    /// Six face colors as "top,bottom,front,back,left,right"
    #[arg(long)]
    faces: Option<String>,

    /// Seconds of the time limit spent per move
    #[arg(long, default_value_t = 0.0)]
    seconds_per_move: f32,

    /// Progress file to record stage clears in
    #[arg(short, long)]
    progress: Option<PathBuf>,

    /// Print the level validation report and exit
    #[arg(long)]
    validate: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> RoliceResult<()> {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(&args.log_level)?;

    info!("Starting Rolice v{}", rolice::VERSION);

    if let Err(err) = run(&args) {
        error!("{}", err);
        return Err(err);
    }
    Ok(())
}

/// Initializes env_logger; `RUST_LOG` takes precedence over `--log-level`.
fn initialize_logging(log_level: &str) -> RoliceResult<()> {
    let level = log_level.to_lowercase();
    if !matches!(
        level.as_str(),
        "off" | "error" | "warn" | "info" | "debug" | "trace"
    ) {
        return Err(RoliceError::InvalidInput(format!(
            "Unknown log level '{}'",
            log_level
        )));
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
    Ok(())
}

fn run(args: &Args) -> RoliceResult<()> {
    let level = load_level(args)?;

    if args.validate {
        let report = validate_level(&level);
        print!("{}", report);
        return if report.is_valid() {
            Ok(())
        } else {
            Err(RoliceError::InvalidLevel(format!(
                "'{}' failed validation with {} error(s)",
                level.name,
                report.errors.len()
            )))
        };
    }

    let mut session = GameSession::new(level)?;
    println!(
        "Stage {}: {}",
        session.descriptor().stage_info.stage_number,
        session.descriptor().stage_info.display_name()
    );
    for event in session.events_mut().drain() {
        println!("  {}", event);
    }
    session.subscribe(|event| println!("  {}", event));

    let handler = InputHandler::new();
    match &args.moves {
        Some(script) => {
            let inputs = handler.parse_script(script)?;
            print_board(&session);
            play_inputs(&mut session, inputs, args.seconds_per_move)?;
        }
        None => play_interactive(&mut session, &handler, args.seconds_per_move)?,
    }

    finish(&session, args)
}

/// Loads the level and applies command line overrides.
fn load_level(args: &Args) -> RoliceResult<LevelDescriptor> {
    let mut level = match &args.level {
        Some(path) => {
            info!("Loading level from {}", path.display());
            LevelDescriptor::load_from_file(path)?
        }
        None => LevelDescriptor::tutorial(),
    };

    if let Some(start) = &args.start {
        level.start_position = Some(parse_position(start)?);
    }
    if let Some(faces) = &args.faces {
        level.dice_faces = Some(parse_faces(faces)?);
    }
    Ok(level)
}

fn parse_position(text: &str) -> RoliceResult<Position> {
    let invalid = || RoliceError::InvalidInput(format!("Expected \"x,y\", got '{}'", text));
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(Position::new(x, y))
}

fn parse_faces(text: &str) -> RoliceResult<DiceFaces> {
    let colors = text
        .split(',')
        .map(|name| {
            ColorType::from_name(name)
                .ok_or_else(|| RoliceError::InvalidInput(format!("Unknown color '{}'", name.trim())))
        })
        .collect::<RoliceResult<Vec<_>>>()?;
    DiceFaces::from_slice(&colors)
}

/// Applies inputs until they run out, the player quits or the game ends.
fn play_inputs(
    session: &mut GameSession,
    inputs: Vec<PlayerInput>,
    seconds_per_move: f32,
) -> RoliceResult<()> {
    for input in inputs {
        if !apply(session, input, seconds_per_move)? || session.is_game_over() {
            break;
        }
    }
    Ok(())
}

/// Applies one input. Returns false when the player quits.
fn apply(session: &mut GameSession, input: PlayerInput, seconds_per_move: f32) -> RoliceResult<bool> {
    match execute_input(session, input)? {
        CommandOutcome::Moved(MoveOutcome::Moved(_)) => {
            if seconds_per_move > 0.0 {
                session.tick(seconds_per_move);
            }
            print_board(session);
        }
        CommandOutcome::Moved(MoveOutcome::Rejected(rejection)) => {
            println!("Can't move: {}", rejection);
        }
        CommandOutcome::Waited => {}
        CommandOutcome::Restarted => {
            println!("Restarted");
            print_board(session);
        }
        CommandOutcome::Help => println!("{}", HELP_TEXT),
        CommandOutcome::Quit => return Ok(false),
    }
    Ok(true)
}

fn play_interactive(
    session: &mut GameSession,
    handler: &InputHandler,
    seconds_per_move: f32,
) -> RoliceResult<()> {
    println!("{}", HELP_TEXT);
    print_board(session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if session.is_game_over() {
            println!("Press r to restart or q to quit");
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let inputs = match handler.parse_line(&line?) {
            Ok(inputs) => inputs,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        for input in inputs {
            if !apply(session, input, seconds_per_move)? {
                return Ok(());
            }
        }
    }
}

fn print_board(session: &GameSession) {
    print!("{}", render_board(session.level(), session.pawn()));
    println!("{}", render_status(session));
}

/// Reports the result and records a clear in the progress file.
fn finish(session: &GameSession, args: &Args) -> RoliceResult<()> {
    let Some(result) = session.stage_result() else {
        println!("Stage not cleared");
        return Ok(());
    };

    println!(
        "Cleared stage {} in {} turns: {} star(s)",
        result.stage_number, result.turn_count, result.stars
    );

    if let Some(path) = &args.progress {
        let mut tracker = ProgressTracker::new(JsonProgressStore::new(path));
        tracker.record_result(&result)?;
        println!(
            "Best: {} star(s); stage {} is {}",
            tracker.stage_stars(result.stage_number),
            result.stage_number + 1,
            if tracker.is_stage_unlocked(result.stage_number + 1) {
                "unlocked"
            } else {
                "locked"
            }
        );
    }
    Ok(())
}
