use std::fs::File;
use std::io::{self, BufRead, BufReader};

use boardcache::channel::{delivery_queue, spawn_delivery_task};
use boardcache::decoder::{self, RealtimeCommand};
use boardcache::{CacheConfig, RealtimeChannel, RealtimeEvent, Stroke, WhiteboardCache};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),
    #[error("invalid initial strokes: {0}")]
    InitialStrokes(#[source] serde_json::Error),
    #[error("failed to render board: {0}")]
    Render(#[source] serde_json::Error),
    #[error("delivery queue closed early")]
    QueueClosed,
    #[error("delivery task failed: {0}")]
    Delivery(#[from] tokio::task::JoinError),
    #[error("board `{0}` missing after replay")]
    BoardMissing(String),
}

#[derive(Parser, Debug)]
#[command(name = "boardcache", about = "Replay and inspect whiteboard realtime traffic")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a JSON-lines event log through the cache and print the board.
    Replay(ReplayArgs),
    /// Print the decoded command for each payload in a JSON-lines log.
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Board id to initialise as the live board.
    #[arg(long, env = "WHITEBOARD_BOARD_ID", default_value = "replay")]
    board: String,

    /// JSON array of strokes to seed the board with.
    #[arg(long)]
    initial: Option<String>,

    /// Event log path, or `-` for stdin.
    #[arg(default_value = "-")]
    input: String,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Event log path, or `-` for stdin.
    #[arg(default_value = "-")]
    input: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(args).await,
        Command::Decode(args) => run_decode(&args),
    }
}

async fn run_replay(args: ReplayArgs) -> Result<(), CliError> {
    let config = CacheConfig::from_env();
    let initial = match &args.initial {
        Some(path) => load_strokes(path)?,
        None => Vec::new(),
    };

    let channel = RealtimeChannel::new();
    let cache = WhiteboardCache::with_config(channel.clone(), config);
    cache.init_and_start_realtime_for_board(args.board.as_str(), initial);
    cache.start();

    let (tx, rx) = delivery_queue(&config);
    let delivery = spawn_delivery_task(channel, rx);

    let mut queued = 0_usize;
    for line in open_input(&args.input)?.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        tx.send(RealtimeEvent::new(line)).await.map_err(|_| CliError::QueueClosed)?;
        queued += 1;
    }
    drop(tx);
    delivery.await?;
    cache.stop();

    let board = cache
        .get_whiteboard(&args.board)
        .ok_or_else(|| CliError::BoardMissing(args.board.clone()))?;
    info!(queued, strokes = board.stroke_count(), board = %args.board, "replay finished");
    let rendered = serde_json::to_string_pretty(&board).map_err(CliError::Render)?;
    println!("{rendered}");
    Ok(())
}

fn run_decode(args: &DecodeArgs) -> Result<(), CliError> {
    for (index, line) in open_input(&args.input)?.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = index + 1;
        match decoder::decode_payload(&line) {
            Ok(RealtimeCommand::Commit(stroke)) => println!(
                "{number}: commit points={} stride={} color=#{:08x} blend={:?}",
                stroke.point_count(),
                stroke.stride(),
                stroke.color().0,
                stroke.blend_mode()
            ),
            Ok(RealtimeCommand::ClearEnd) => println!("{number}: clear"),
            Ok(RealtimeCommand::Ignored) => println!("{number}: ignored"),
            Err(e) => println!("{number}: rejected ({e})"),
        }
    }
    Ok(())
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>, CliError> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|source| CliError::Open { path: path.to_owned(), source })?;
    Ok(Box::new(BufReader::new(file)))
}

fn load_strokes(path: &str) -> Result<Vec<Stroke>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Open { path: path.to_owned(), source })?;
    serde_json::from_reader(BufReader::new(file)).map_err(CliError::InitialStrokes)
}
