//! RecordDB Shell
//!
//! Reads commands from stdin, one per line, and prints each reply.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use recorddb::protocol::{parse_command, Command};
use recorddb::{CommandExecutor, Config, Engine, RecordError};
use tracing_subscriber::{fmt, EnvFilter};

/// RecordDB Shell
#[derive(Parser, Debug)]
#[command(name = "recorddb-shell")]
#[command(about = "Interactive shell for the RecordDB document store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./recorddb_data")]
    data_dir: String,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Seconds `STOP` waits for in-flight work before forcing shutdown
    #[arg(short, long, default_value = "5")]
    grace_secs: u64,

    /// Load documents persisted by a previous run
    #[arg(short, long)]
    recover: bool,
}

fn main() {
    // Initialize tracing/logging (stderr, so replies on stdout stay clean)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,recorddb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("RecordDB Shell v{}", recorddb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let mut builder = Config::builder()
        .data_dir(&args.data_dir)
        .shutdown_grace_secs(args.grace_secs)
        .recover_on_open(args.recover);
    if let Some(workers) = args.workers {
        builder = builder.worker_threads(workers);
    }
    let config = builder.build();

    let engine = match Engine::open(config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };
    let executor = CommandExecutor::new(Arc::clone(&engine));

    if let Err(e) = run(&executor) {
        tracing::error!("Shell error: {}", e);
        std::process::exit(1);
    }

    if engine.is_running() {
        engine.stop();
    }
    tracing::info!("Shell stopped");
}

/// Read-eval-print until a stop command or EOF
fn run(executor: &CommandExecutor) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = parse_command(&line);
        let terminal = matches!(command, Command::Stop | Command::PurgeAndStop);

        match executor.dispatch(command).wait() {
            Ok(reply) => writeln!(stdout, "{}", reply)?,
            Err(RecordError::Stopped) => writeln!(stdout, "ERROR: database is stopped")?,
            Err(e) => writeln!(stdout, "ERROR: {}", e)?,
        }
        stdout.flush()?;

        if terminal {
            break;
        }
    }
    Ok(())
}
