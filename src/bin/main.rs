use std::error;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use board_game_traits::{Color, GameResult};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use hypertac::evaluation::{LineEvaluator, Weighting};
use hypertac::minmax::minmax;
use hypertac::position::{Board, Position, Shape, Square};
use hypertac::search::{self, Player, SearchEngine, SearchSettings};
use hypertac::Error;

fn engine_args() -> Vec<Arg> {
    vec![
        Arg::new("dimensions")
            .short('d')
            .long("dimensions")
            .env("HYPERTAC_DIMENSIONS")
            .help("Number of board dimensions")
            .num_args(1)
            .default_value("2")
            .value_parser(clap::value_parser!(u8).range(1..=6)),
        Arg::new("side")
            .short('k')
            .long("side")
            .env("HYPERTAC_SIDE")
            .help("Number of cells along each side of the board, which is also the length of a winning line")
            .num_args(1)
            .default_value("3")
            .value_parser(clap::value_parser!(u8).range(2..=16)),
        Arg::new("depth")
            .long("depth")
            .env("HYPERTAC_DEPTH")
            .help("Maximum search depth in plies. Defaults to the full game for 3x3, and 3 otherwise")
            .num_args(1)
            .value_parser(clap::value_parser!(u16)),
        Arg::new("timeMs")
            .long("time-ms")
            .env("HYPERTAC_TIME_MS")
            .help("Search iteratively deeper for at most this many milliseconds per move. The first iteration always completes")
            .num_args(1)
            .value_parser(clap::value_parser!(u64)),
        Arg::new("weighted")
            .long("weighted")
            .env("HYPERTAC_WEIGHTED")
            .help("Weight each open line by how many diagonals pass through its cells")
            .action(ArgAction::SetTrue)
            .num_args(0),
        Arg::new("orderMoves")
            .long("order-moves")
            .env("HYPERTAC_ORDER_MOVES")
            .help("Search the most promising root moves first. May change which of several equally good moves is played")
            .action(ArgAction::SetTrue)
            .num_args(0),
    ]
}

pub fn main() -> Result<(), Box<dyn error::Error>> {
    let app = Command::new("Hypertac")
        .version("0.1")
        .about("Alpha-beta search for tic-tac-toe on 3x3, 4x4x4 and other hypercube boards")
        .subcommand_required(true)
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("logfile")
                .env("HYPERTAC_LOGFILE")
                .value_name("hypertac.log")
                .help("Name of debug logfile")
                .global(true)
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug output, including every search iteration, to stderr")
                .global(true)
                .action(ArgAction::SetTrue)
                .num_args(0),
        )
        .subcommand(
            Command::new("analyze")
                .about("Find the best move in a position")
                .args(engine_args())
                .arg(
                    Arg::new("position")
                        .short('p')
                        .long("position")
                        .env("HYPERTAC_POSITION")
                        .help("One character per square in index order: x, o or '.'. Whitespace, '/' and '|' are ignored")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("toMove")
                        .long("to-move")
                        .help("Player to move. Inferred from the number of marks if not given")
                        .num_args(1)
                        .value_parser(["x", "o"]),
                ),
        )
        .subcommand(
            Command::new("play")
                .about("Play against the engine through the command line")
                .args(engine_args())
                .arg(
                    Arg::new("human")
                        .long("human")
                        .help("The mark played by the human. x moves first")
                        .num_args(1)
                        .value_parser(["x", "o"])
                        .default_value("o"),
                ),
        )
        .subcommand(
            Command::new("selfplay")
                .about("Watch the engine play against a random mover, against unpruned minmax, and against itself")
                .args(engine_args())
                .arg(
                    Arg::new("games")
                        .short('g')
                        .long("games")
                        .help("Number of games against the random mover")
                        .num_args(1)
                        .default_value("10")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the random mover")
                        .num_args(1)
                        .default_value("0")
                        .value_parser(clap::value_parser!(u64)),
                ),
        );
    let matches = app.get_matches();

    let stderr_level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(fern::log_file(log_file)?),
            )
            .chain(fern::Dispatch::new().level(stderr_level).chain(io::stderr()))
            .apply()?
    } else {
        log_dispatcher
            .level(stderr_level)
            .chain(io::stderr())
            .apply()?
    }

    match matches.subcommand() {
        Some(("analyze", sub_matches)) => analyze(sub_matches)?,
        Some(("play", sub_matches)) => play_human(sub_matches)?,
        Some(("selfplay", sub_matches)) => selfplay(sub_matches)?,
        _ => unreachable!("a subcommand is required"),
    }
    Ok(())
}

fn shape_from_matches(matches: &ArgMatches) -> hypertac::Result<Shape> {
    Shape::new(
        *matches.get_one::<u8>("dimensions").unwrap(),
        *matches.get_one::<u8>("side").unwrap(),
    )
}

fn engine_from_matches(matches: &ArgMatches, shape: Shape) -> SearchEngine<LineEvaluator> {
    let mut settings = SearchSettings::for_shape(shape).order_root_moves(matches.get_flag("orderMoves"));
    if let Some(depth) = matches.get_one::<u16>("depth") {
        settings = settings.max_depth(*depth);
    }
    if let Some(time_ms) = matches.get_one::<u64>("timeMs") {
        settings = settings.time_limit(Duration::from_millis(*time_ms));
    }
    let weighting = if matches.get_flag("weighted") {
        Weighting::Diagonal
    } else {
        Weighting::Uniform
    };
    debug!("Searching {} with {:?} and {:?} weighting", shape, settings, weighting);
    SearchEngine::new(LineEvaluator::with_weighting(shape, weighting), settings)
}

fn color_from_mark(mark: &str) -> Color {
    match mark {
        "x" => Color::White,
        "o" => Color::Black,
        s => panic!("Mark cannot be {}", s),
    }
}

fn mark(color: Color) -> char {
    match color {
        Color::White => 'x',
        Color::Black => 'o',
    }
}

fn analyze(matches: &ArgMatches) -> hypertac::Result<()> {
    let shape = shape_from_matches(matches)?;
    let engine = engine_from_matches(matches, shape);
    let mut position = Position::parse(shape, matches.get_one::<String>("position").unwrap())?;
    let to_move = matches
        .get_one::<String>("toMove")
        .map(|s| color_from_mark(s))
        .unwrap_or_else(|| position.side_to_move());

    println!("{:?}", position);
    let result = engine.search(&mut position, to_move)?;
    match result.best_move {
        Some(best_move) => println!(
            "Best move for {}: {}",
            mark(to_move),
            best_move.display_with_shape(shape)
        ),
        None => println!("No move to play, the game is over"),
    }
    print_value(result.value);
    println!(
        "Depth {}, {} nodes, {} evaluations, {} cutoffs",
        result.depth_reached, result.stats.nodes, result.stats.evaluations, result.stats.cutoffs
    );
    Ok(())
}

fn print_value(value: i32) {
    match search::plies_to_result(value) {
        Some(plies) if value > 0 => println!("Value {}: x wins in {} plies", value, plies),
        Some(plies) => println!("Value {}: o wins in {} plies", value, plies),
        None => println!("Value {}", value),
    }
}

fn play_human(matches: &ArgMatches) -> hypertac::Result<()> {
    let shape = shape_from_matches(matches)?;
    let engine = engine_from_matches(matches, shape);
    let human = color_from_mark(matches.get_one::<String>("human").unwrap());
    let mut position = Position::start_position(shape);

    let reader = io::stdin();
    let mut input = String::new();
    while position.game_result().is_none() {
        println!("Position:\n{:?}", position);
        let to_move = position.side_to_move();
        if to_move == human {
            println!("Type your move as a square index, or as comma-separated coordinates (0,2):");
            input.clear();
            let bytes_read = reader.lock().read_line(&mut input).unwrap_or(0);
            if bytes_read == 0 {
                return Ok(());
            }
            match parse_human_move(&position, &input) {
                Ok(square) => position.do_move(square, to_move),
                Err(err) => println!("{}, try again.", err),
            }
        } else {
            let result = engine.search(&mut position, to_move)?;
            let Some(best_move) = result.best_move else {
                warn!("Engine found no move in an undecided position");
                break;
            };
            println!(
                "Computer played {} with value {}",
                best_move.display_with_shape(shape),
                result.value
            );
            position.do_move(best_move, to_move);
        }
        let _ = io::stdout().flush();
    }

    match position.game_result() {
        Some(GameResult::WhiteWin) => println!("x won! Board:\n{}", position),
        Some(GameResult::BlackWin) => println!("o won! Board:\n{}", position),
        Some(GameResult::Draw) => println!("The game was drawn! Board:\n{}", position),
        None => println!("Game aborted. Board:\n{}", position),
    }
    Ok(())
}

fn parse_human_move(position: &Position, input: &str) -> hypertac::Result<Square> {
    let square = position.shape().parse_square(input)?;
    if position.cell(square).is_some() {
        return Err(Error::OccupiedSquare {
            square: square.into_inner(),
        });
    }
    Ok(square)
}

fn selfplay(matches: &ArgMatches) -> hypertac::Result<()> {
    let shape = shape_from_matches(matches)?;
    let engine = engine_from_matches(matches, shape);
    let num_games = *matches.get_one::<u32>("games").unwrap();
    let mut rng = SmallRng::seed_from_u64(*matches.get_one::<u64>("seed").unwrap());

    let (mut wins, mut draws, mut losses) = (0, 0, 0);
    for game in 0..num_games {
        let engine_color = if game % 2 == 0 { Color::White } else { Color::Black };
        let mut position = Position::start_position(shape);
        let mut moves = vec![];
        while position.game_result().is_none() {
            let to_move = position.side_to_move();
            let square = if to_move == engine_color {
                engine.search(&mut position, to_move)?.best_move
            } else {
                moves.clear();
                position.generate_moves(&mut moves);
                moves.choose(&mut rng).copied()
            };
            let Some(square) = square else {
                break;
            };
            position.do_move(square, to_move);
        }
        let result = position.game_result();
        info!("Game {}: {:?} with engine as {}", game + 1, result, mark(engine_color));
        match (result, engine_color) {
            (Some(GameResult::WhiteWin), Color::White) | (Some(GameResult::BlackWin), Color::Black) => {
                wins += 1
            }
            (Some(GameResult::WhiteWin), Color::Black) | (Some(GameResult::BlackWin), Color::White) => {
                losses += 1;
                println!("Engine lost as {}:\n{}", mark(engine_color), position);
            }
            _ => draws += 1,
        }
    }
    println!(
        "Against a random mover: {} wins, {} draws, {} losses",
        wins, draws, losses
    );

    for engine_color in [Color::White, Color::Black] {
        let result = engine_vs_minmax(&engine, shape, engine_color)?;
        println!(
            "Against minmax at depth {}, engine as {}: {:?}",
            engine.settings().get_max_depth(),
            mark(engine_color),
            result
        );
    }

    println!("Engine against itself:");
    let mut position = Position::start_position(shape);
    while position.game_result().is_none() {
        let to_move = position.side_to_move();
        let result = engine.search(&mut position, to_move)?;
        let Some(best_move) = result.best_move else {
            break;
        };
        print!("{}{} ", mark(to_move), best_move);
        let _ = io::stdout().flush();
        position.do_move(best_move, to_move);
    }
    println!("\n{}Result: {:?}", position, position.game_result());
    Ok(())
}

/// Plays one game against unpruned minmax at the same depth.
fn engine_vs_minmax(
    engine: &SearchEngine<LineEvaluator>,
    shape: Shape,
    engine_color: Color,
) -> hypertac::Result<Option<GameResult>> {
    let depth = engine.settings().get_max_depth();
    let maximizer = engine.settings().get_maximizer();
    let mut position = Position::start_position(shape);
    while position.game_result().is_none() {
        let to_move = position.side_to_move();
        let square = if to_move == engine_color {
            engine.search(&mut position, to_move)?.best_move
        } else {
            let player = Player::from_color(to_move, maximizer);
            minmax(&mut position, engine.evaluator(), player, maximizer, depth).0
        };
        let Some(square) = square else {
            break;
        };
        position.do_move(square, to_move);
    }
    debug!("Game against minmax ended:\n{}", position);
    Ok(position.game_result())
}
