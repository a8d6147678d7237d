//! `ttr`: operator CLI for table-tennis matches.
//!
//! Each invocation opens the session, applies one operation and exits;
//! the match log keeps state between invocations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ttr_engine::{MatchConfig, MatchMode, PointOutcome, Side};
use ttr_runtime::repository::TournamentRepository;
use ttr_runtime::{open_store, MatchHeader, MatchSession, RuntimeConfig, RuntimeError};

#[derive(Parser, Debug)]
#[command(name = "ttr")]
#[command(about = "Table-tennis referee: score matches and store results")]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "TTR_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new match
    New {
        session: String,
        #[arg(long)]
        p1: String,
        #[arg(long)]
        p2: String,
        /// quick, best_of_3, best_of_5 or best_of_7
        #[arg(long)]
        mode: Option<MatchMode>,
        /// Side serving first (1 or 2)
        #[arg(long, default_value_t = 1)]
        server: u32,
        #[arg(long)]
        tournament: Option<u64>,
    },
    /// Award a point to side 1 or 2
    Point { session: String, side: u32 },
    /// Take back the last point
    Undo { session: String },
    /// Start the next set after a set win
    NextSet { session: String },
    /// Print score, sets, server and hash
    Show { session: String },
    /// Replay the log and compare with the live state
    Verify { session: String },
    /// Store the result of a finished match
    Record { session: String },
    /// Create a tournament
    CreateTournament {
        name: String,
        #[arg(long, default_value_t = ttr_engine::domain::DEFAULT_SETS_TO_WIN)]
        sets_to_win: u32,
    },
    /// List tournaments
    Tournaments,
    /// Standings of one tournament
    Rankings { tournament: u64 },
}

fn load_config(args: &Args) -> Result<RuntimeConfig, RuntimeError> {
    let base = match &args.config {
        Some(path) => RuntimeConfig::from_json_file(path)?,
        None => RuntimeConfig::default(),
    };
    let mut config = base.with_env_overrides()?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn describe(outcome: PointOutcome) -> &'static str {
    match outcome {
        PointOutcome { match_won: true, .. } => "match won",
        PointOutcome { set_won: true, .. } => "set won (run next-set to continue)",
        _ => "point",
    }
}

fn run(args: Args) -> Result<(), RuntimeError> {
    let config = load_config(&args)?;
    let sessions = config.sessions_dir();
    let interval = config.checkpoint_interval;

    match args.command {
        Command::New {
            session,
            p1,
            p2,
            mode,
            server,
            tournament,
        } => {
            let mode = mode.unwrap_or(config.default_mode);
            let match_config = MatchConfig::from_ids(mode.sets_to_win(), server)?;
            let mut header = MatchHeader::new(p1, p2, match_config);
            if let Some(id) = tournament {
                open_store(&config)?.tournament(id)?;
                header = header.with_tournament(id);
            }
            let s = MatchSession::create(&sessions, &session, header, interval)?;
            println!("{}", s.engine());
        }
        Command::Point { session, side } => {
            let mut s = MatchSession::open(&sessions, &session, interval)?;
            let outcome = s.add_point_by_id(side)?;
            println!("{} | {}", s.engine(), describe(outcome));
            if let Some(winner) = outcome.winner {
                println!("winner: {}", s.engine().label(winner));
            }
        }
        Command::Undo { session } => {
            let mut s = MatchSession::open(&sessions, &session, interval)?;
            if !s.undo_last_point()? {
                println!("nothing to undo");
            }
            println!("{}", s.engine());
        }
        Command::NextSet { session } => {
            let mut s = MatchSession::open(&sessions, &session, interval)?;
            s.reset_set()?;
            println!("{}", s.engine());
        }
        Command::Show { session } => {
            let s = MatchSession::open(&sessions, &session, interval)?;
            let e = s.engine();
            println!("{}", e);
            for side in Side::BOTH {
                println!(
                    "  {:<20} points {:>2}  sets {}",
                    e.label(side),
                    e.score(side),
                    e.sets(side)
                );
            }
            println!("  serving: {}", e.label(e.server()));
            if let Some(winner) = e.winner() {
                println!("  finished, winner: {}", e.label(winner));
            }
            println!("  events:  {}", s.current_sequence());
            println!("  hash:    {}", s.current_hash());
        }
        Command::Verify { session } => {
            let s = MatchSession::open(&sessions, &session, interval)?;
            let hash = s.verify()?;
            println!("ok {} events, hash {}", s.current_sequence(), hash);
        }
        Command::Record { session } => {
            let s = MatchSession::open(&sessions, &session, interval)?;
            let mut store = open_store(&config)?;
            let record = s.record_result(store.as_mut())?;
            println!(
                "saved match {} ({}:{})",
                record.id, record.sets_player1, record.sets_player2
            );
        }
        Command::CreateTournament { name, sets_to_win } => {
            let tournament = open_store(&config)?.create(&name, sets_to_win)?;
            println!("tournament {}: {}", tournament.id, tournament.name);
        }
        Command::Tournaments => {
            for t in open_store(&config)?.tournaments()? {
                println!("{:>4}  {}  (sets to win: {})", t.id, t.name, t.sets_to_win);
            }
        }
        Command::Rankings { tournament } => {
            for (place, r) in open_store(&config)?.rankings(tournament)?.iter().enumerate() {
                println!("{:>3}. {:<24} {:>3} W {:>3} L", place + 1, r.name, r.wins, r.losses);
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse())?;
    Ok(())
}
