//! pow-signer CLI Application
//!
//! Runs the proof-of-work and signing demo, or one of its steps on its own.

use clap::{Args, Parser, Subcommand};
use log::error;
use pow_signer::cli::{self, DemoConfig, DEFAULT_DIFFICULTIES, DEFAULT_IDENTIFIER};
use pow_signer::crypto::DEFAULT_KEY_BITS;
use pow_signer::mining::SearchLimit;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pow-signer")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Proof-of-work search with RSA signing of the result", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate keys, solve, sign and verify, then solve the remaining difficulties
    Demo {
        /// Identifier the nonce is appended to
        #[arg(short, long, default_value = DEFAULT_IDENTIFIER)]
        identifier: String,

        /// Required leading zero hex digits (repeat for several searches)
        #[arg(short, long)]
        difficulty: Vec<usize>,

        /// RSA modulus size in bits
        #[arg(short, long, default_value_t = DEFAULT_KEY_BITS)]
        key_bits: usize,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Run a single proof-of-work search
    Pow {
        /// Identifier the nonce is appended to
        #[arg(short, long, default_value = DEFAULT_IDENTIFIER)]
        identifier: String,

        /// Required leading zero hex digits
        #[arg(short, long, default_value = "4")]
        difficulty: usize,

        /// Print the solution as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Generate an RSA key pair and print the public key
    Keygen {
        /// RSA modulus size in bits
        #[arg(short, long, default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,
    },

    /// Check that a nonce meets a difficulty
    Check {
        /// Identifier the nonce is appended to
        #[arg(short, long, default_value = DEFAULT_IDENTIFIER)]
        identifier: String,

        /// Claimed nonce
        #[arg(short, long)]
        nonce: u64,

        /// Required leading zero hex digits
        #[arg(short, long)]
        difficulty: usize,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Give up after this many nonces
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Number of search threads
    #[arg(short, long, default_value = "1")]
    threads: usize,
}

impl SearchArgs {
    fn limit(&self) -> SearchLimit {
        SearchLimit {
            max_iterations: self.max_iterations,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Option<Commands>) -> cli::CliResult<()> {
    match command {
        None => cli::cmd_demo(&DemoConfig::default()),

        Some(Commands::Demo {
            identifier,
            difficulty,
            key_bits,
            search,
        }) => {
            let difficulties = if difficulty.is_empty() {
                DEFAULT_DIFFICULTIES.to_vec()
            } else {
                difficulty
            };
            let config = DemoConfig {
                identifier,
                difficulties,
                key_bits,
                limit: search.limit(),
                threads: search.threads,
            };
            cli::cmd_demo(&config)
        }

        Some(Commands::Pow {
            identifier,
            difficulty,
            json,
            search,
        }) => cli::cmd_pow(&identifier, difficulty, search.limit(), search.threads, json),

        Some(Commands::Keygen { bits }) => cli::cmd_keygen(bits),

        Some(Commands::Check {
            identifier,
            nonce,
            difficulty,
        }) => cli::cmd_check(&identifier, nonce, difficulty),
    }
}
