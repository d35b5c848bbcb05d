use clap::{Parser, Subcommand, ValueEnum};
use shortlinks_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_URL_ENV: &str = "SHORTLINKS_DATABASE_URL";
pub const SHORT_ID_LENGTH_ENV: &str = "SHORTLINKS_SHORT_ID_LENGTH";
pub const LENGTH_FILE_ENV: &str = "SHORTLINKS_LENGTH_FILE";
pub const REDIS_URL_ENV: &str = "SHORTLINKS_REDIS_URL";
pub const REDIS_PREFIX_ENV: &str = "SHORTLINKS_REDIS_PREFIX";
pub const REDIS_TTL_SECS_ENV: &str = "SHORTLINKS_REDIS_TTL_SECS";
pub const BASE_URL_ENV: &str = "SHORTLINKS_BASE_URL";
pub const ROUNDS_ENV: &str = "SHORTLINKS_ROUNDS";
pub const BATCH_SIZE_ENV: &str = "SHORTLINKS_BATCH_SIZE";
pub const NO_TOUCH_ENV: &str = "SHORTLINKS_NO_TOUCH";
pub const LOG_FORMAT_ENV: &str = "SHORTLINKS_LOG_FORMAT";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://shortlinks.db";
pub const DEFAULT_REDIS_PREFIX: &str = "sl:link:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Pretty => write!(f, "pretty"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "shortlinks", version, about = "Create and resolve short links")]
pub struct CLI {
    #[arg(long, env = DATABASE_URL_ENV, default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Length of new ids when no length file says otherwise.
    #[arg(long, env = SHORT_ID_LENGTH_ENV, default_value_t = 3)]
    pub short_id_length: usize,

    /// File the current id length is read from and persisted to.
    #[arg(long, env = LENGTH_FILE_ENV)]
    pub length_file: Option<PathBuf>,

    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_PREFIX_ENV, default_value = DEFAULT_REDIS_PREFIX)]
    pub redis_prefix: String,

    #[arg(long, env = REDIS_TTL_SECS_ENV)]
    pub redis_ttl_secs: Option<u64>,

    /// Prefix printed in front of created ids, e.g. `https://sho.rt/`.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    #[arg(long, env = ROUNDS_ENV, default_value_t = 3)]
    pub rounds: usize,

    #[arg(long, env = BATCH_SIZE_ENV, default_value_t = 50)]
    pub batch_size: usize,

    /// Do not refresh the last accessed time on resolve.
    #[arg(long, env = NO_TOUCH_ENV)]
    pub no_touch: bool,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a link and print its short id.
    Create { target_url: String },
    /// Print the target URL of a short id.
    Resolve { short_id: String },
    /// Mark a short id as accessed now.
    Touch { short_id: String },
    /// Delete links not accessed within the given number of days.
    Clean {
        #[arg(long)]
        max_age_days: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        CLI::command().debug_assert();
    }

    #[test]
    fn defaults_apply() {
        let cli = CLI::try_parse_from(["shortlinks", "create", "https://poto.nz"]).unwrap();

        assert_eq!(cli.short_id_length, 3);
        assert_eq!(cli.rounds, 3);
        assert_eq!(cli.batch_size, 50);
        assert!(!cli.no_touch);
        assert!(matches!(cli.command, Command::Create { ref target_url } if target_url == "https://poto.nz"));
    }

    #[test]
    fn clean_requires_max_age() {
        assert!(CLI::try_parse_from(["shortlinks", "clean"]).is_err());

        let cli = CLI::try_parse_from(["shortlinks", "clean", "--max-age-days", "30"]).unwrap();
        assert!(matches!(cli.command, Command::Clean { max_age_days: 30 }));
    }
}
