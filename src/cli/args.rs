//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Merch API - storefront backend for the Kryeit server shop
#[derive(Parser, Debug)]
#[command(name = "merch-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The requested command, falling back to serving with env defaults.
    pub fn command_or_serve(self) -> Commands {
        self.command.unwrap_or(Commands::Serve(ServeArgs::default()))
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage admin panel accounts
    Admin(AdminArgs),
}

/// Arguments for the serve command. Unset values come from the config.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create an admin account, even when others already exist
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::parse_from(["merch-api"]);
        match cli.command_or_serve() {
            Commands::Serve(args) => {
                assert!(args.host.is_none());
                assert!(args.port.is_none());
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["merch-api", "serve", "--port", "8080", "-H", "127.0.0.1"]);
        match cli.command_or_serve() {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_create() {
        let cli = Cli::parse_from([
            "merch-api", "-v", "admin", "create", "--username", "root", "--password", "hunter22",
        ]);
        assert!(cli.verbose);
        match cli.command_or_serve() {
            Commands::Admin(AdminArgs {
                action: AdminAction::Create { username, password },
            }) => {
                assert_eq!(username, "root");
                assert_eq!(password, "hunter22");
            }
            other => panic!("expected admin create, got {:?}", other),
        }
    }
}
