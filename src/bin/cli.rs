//! LineKV CLI Client
//!
//! Interactive and batch frontends for the LineKV client.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linekv::client::{Session, Shell};
use linekv::config::{DEFAULT_MAX_HEADER_LEN, DEFAULT_MAX_VALUE_SIZE};
use linekv::protocol::FrameLimits;
use tracing_subscriber::{fmt, EnvFilter};

/// LineKV CLI
#[derive(Parser, Debug)]
#[command(name = "linekv-cli")]
#[command(about = "CLI for the LineKV key-value server")]
#[command(version)]
struct Args {
    /// Largest value accepted in a server reply
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_VALUE_SIZE)]
    max_value_size: usize,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Read commands from standard input with a prompt
    Interactive,

    /// Read commands from a file, one per line
    Batch {
        /// Command file
        file: PathBuf,
    },
}

fn main() {
    // Logs go to stderr so they never mix with command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let session = Session::with_limits(FrameLimits {
        max_value_size: args.max_value_size,
        max_header_len: DEFAULT_MAX_HEADER_LEN,
    });
    let mut shell = Shell::with_session(session, io::stdout().lock());

    let result = match args.mode {
        Mode::Interactive => shell.run_interactive(io::stdin().lock()),
        Mode::Batch { file } => {
            let input = match File::open(&file) {
                Ok(f) => BufReader::new(f),
                Err(e) => {
                    eprintln!("Cannot open {}: {}", file.display(), e);
                    std::process::exit(1);
                }
            };
            shell.run_batch(input)
        }
    };

    if let Err(e) = result {
        tracing::error!("Output error: {}", e);
    }
}
