use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DATABASE_PATH, ENV_FRONTEND_ORIGIN, ENV_HOST, ENV_PORT, ENV_SECURE_COOKIE,
    ENV_SESSION_TTL_DAYS, SEED_DEFAULT_COUNT, SEED_DEFAULT_EMAIL, SEED_DEFAULT_PASSWORD,
};

#[derive(Parser)]
#[command(name = "leads")]
#[command(version, about = "Lead management API server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Browser origin allowed to call the API with credentials
    #[arg(long, global = true, env = ENV_FRONTEND_ORIGIN)]
    pub frontend_origin: Option<String>,

    /// Session lifetime in days
    #[arg(long, global = true, env = ENV_SESSION_TTL_DAYS)]
    pub session_ttl_days: Option<u32>,

    /// Issue Secure + SameSite=None session cookies (required behind HTTPS cross-site)
    #[arg(long, global = true, env = ENV_SECURE_COOKIE)]
    pub secure_cookie: Option<bool>,

    /// SQLite database file (defaults to the data directory)
    #[arg(long, global = true, env = ENV_DATABASE_PATH)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Create a demo user and fill the database with random leads
    Seed {
        /// Seed user email
        #[arg(long, default_value = SEED_DEFAULT_EMAIL)]
        email: String,
        /// Seed user password (only used when the user is created)
        #[arg(long, default_value = SEED_DEFAULT_PASSWORD)]
        password: String,
        /// Number of leads to insert
        #[arg(long, default_value_t = SEED_DEFAULT_COUNT)]
        count: u32,
    },
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database, signing key). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub frontend_origin: Option<String>,
    pub session_ttl_days: Option<u32>,
    pub secure_cookie: Option<bool>,
    pub database_path: Option<PathBuf>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        frontend_origin: cli.frontend_origin,
        session_ttl_days: cli.session_ttl_days,
        secure_cookie: cli.secure_cookie,
        database_path: cli.database_path,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["leads"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_seed_defaults() {
        let cli = Cli::try_parse_from(["leads", "seed"]).unwrap();
        match cli.command {
            Some(Commands::Seed {
                email,
                password,
                count,
            }) => {
                assert_eq!(email, SEED_DEFAULT_EMAIL);
                assert_eq!(password, SEED_DEFAULT_PASSWORD);
                assert_eq!(count, SEED_DEFAULT_COUNT);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["leads", "start", "--port", "9000", "--secure-cookie", "true"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Start)));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.secure_cookie, Some(true));
    }

    #[test]
    fn test_parse_prune_yes() {
        let cli = Cli::try_parse_from(["leads", "system", "prune", "-y"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::System {
                command: SystemCommands::Prune { yes: true }
            })
        ));
    }
}
