//! Command-line front end

pub mod commands;

pub use commands::{
    cmd_check, cmd_demo, cmd_keygen, cmd_pow, run_search, CliResult, DemoConfig,
    DEFAULT_DIFFICULTIES, DEFAULT_IDENTIFIER,
};
