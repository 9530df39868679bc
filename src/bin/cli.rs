//! fieldtrace CLI - debug tool for stored survey tracks
//!
//! Usage:
//!   fieldtrace-cli --root <dir> list
//!   fieldtrace-cli --root <dir> info <name>
//!   fieldtrace-cli --root <dir> show <name>
//!   fieldtrace-cli --root <dir> demo [--points <n>] [--seed <n>]
//!
//! `demo` drives the full pipeline on synthetic fixes: record a noisy
//! walk, refine it with the trace filter, persist the result and print
//! what the filter removed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fieldtrace::synthetic::{generate_walk, WalkConfig, WalkPattern};
use fieldtrace::{GeoPoint, Session};

#[derive(Parser)]
#[command(name = "fieldtrace-cli")]
#[command(about = "Debug tool for stored survey tracks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Track store root directory
    #[arg(long, default_value = "./fieldtrace-data", global = true)]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List all stored tracks with their summaries
    List,

    /// Print the summary of one stored track
    Info {
        /// Track name (directory name under the store root)
        name: String,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump a stored track's ways and points of interest
    Show {
        name: String,
    },

    /// Record, filter and save a synthetic walk
    Demo {
        /// Number of synthetic fixes
        #[arg(long, default_value = "200")]
        points: usize,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut session = match Session::open(&cli.root) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("cannot open store: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::List => list(&session),
        Commands::Info { name, json } => info(&session, &name, json),
        Commands::Show { name } => show(&mut session, &name),
        Commands::Demo { points, seed } => demo(&mut session, points, seed),
    }
}

fn list(session: &Session) -> ExitCode {
    let names = session.tracks();
    if names.is_empty() {
        println!("no tracks stored under {}", session.store().root().display());
        return ExitCode::SUCCESS;
    }

    for name in names {
        match session.track_info(&name) {
            Some(info) => println!(
                "{name}: {} POIs, {} ways, {} media ({})",
                info.pois, info.ways, info.media, info.timestamp
            ),
            None => println!("{name}: no summary"),
        }
    }
    ExitCode::SUCCESS
}

fn info(session: &Session, name: &str, json: bool) -> ExitCode {
    match session.track_info(name) {
        Some(info) if json => {
            let rendered = serde_json::to_string_pretty(&info).unwrap_or_else(|e| {
                eprintln!("failed to serialize summary for '{name}': {e}");
                "{}".to_string()
            });
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Some(info) => {
            println!("name:      {}", info.name);
            println!("recorded:  {}", info.timestamp);
            if !info.comment.is_empty() {
                println!("comment:   {}", info.comment);
            }
            println!("POIs:      {}", info.pois);
            println!("ways:      {}", info.ways);
            println!("media:     {}", info.media);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("track '{name}' has no readable summary");
            ExitCode::FAILURE
        }
    }
}

fn show(session: &mut Session, name: &str) -> ExitCode {
    let Some(track) = session.load_track(name) else {
        eprintln!("track '{name}' could not be loaded");
        return ExitCode::FAILURE;
    };

    println!(
        "track '{}' ({:.0} m recorded)",
        track.name(),
        track.length_meters()
    );

    for way in track.ways() {
        let kind = if way.is_area() { "area" } else { "way" };
        println!("  {kind} {} with {} points", way.id(), way.len());
        for (key, value) in way.tags() {
            println!("    {key}={value}");
        }
    }

    for node in track.nodes() {
        match node.coordinates() {
            Some(c) => println!(
                "  poi {} at ({:.7}, {:.7})",
                node.id(),
                c.latitude,
                c.longitude
            ),
            None => println!("  poi {} (no fix)", node.id()),
        }
    }
    ExitCode::SUCCESS
}

fn demo(session: &mut Session, points: usize, seed: u64) -> ExitCode {
    let walk = generate_walk(&WalkConfig {
        origin: GeoPoint::new(52.4556, 13.2972),
        point_count: points,
        step_meters: 5.0,
        noise_sigma_meters: 3.0,
        pattern: WalkPattern::Winding,
        seed,
    });

    let track_name = match session.new_track() {
        Ok(track) => track.name().to_string(),
        Err(e) => {
            eprintln!("cannot create track: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = session.begin_way(false, false) {
        eprintln!("cannot start recording: {e}");
        return ExitCode::FAILURE;
    }
    for fix in &walk {
        session.record_fix(*fix);
    }

    let Some(way_id) = session.end_way() else {
        eprintln!("recording produced no usable way");
        return ExitCode::FAILURE;
    };

    let kept = session
        .track()
        .and_then(|t| t.way_by_id(way_id))
        .map(|w| w.len())
        .unwrap_or(0);
    println!(
        "recorded {} fixes, kept {} points after filtering ({} events queued)",
        walk.len(),
        kept,
        session.changes().len()
    );

    match session.save() {
        Ok(()) => {
            println!("saved as '{track_name}'");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("save failed: {e}");
            ExitCode::FAILURE
        }
    }
}
