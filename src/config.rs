use std::path::PathBuf;

use clap::Parser;

use crate::password::{DEFAULT_ROUNDS, MIN_ROUNDS};

#[derive(Debug, Clone, Parser)]
#[command(name = "campusd")]
#[command(about = "Student and enquiry records with a correspondence log, driven over stdin/stdout JSON lines", long_about = None)]
pub struct Config {
    /// Workspace directory to open at start-up
    #[arg(long, env = "CAMPUSD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log filter, e.g. `info` or `campusd=debug`
    #[arg(long, env = "CAMPUSD_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON objects
    #[arg(long, env = "CAMPUSD_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// PBKDF2 rounds for newly hashed passwords
    #[arg(
        long,
        env = "CAMPUSD_PASSWORD_ROUNDS",
        default_value_t = DEFAULT_ROUNDS,
        value_parser = clap::value_parser!(u32).range(MIN_ROUNDS as i64..)
    )]
    pub password_rounds: u32,
}
