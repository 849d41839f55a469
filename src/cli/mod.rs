// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod commands;

use crate::core::config::ConnectionConfig;
use crate::core::error::ConfigError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Groundwork - Database Initialization CLI
///
/// Seeds schema, reference/menu data, and baseline accounts for the
/// application framework from a JSON source of truth.
#[derive(Parser, Debug)]
#[command(name = "groundwork")]
#[command(author = "Groundwork Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Database initialization CLI tool")]
#[command(long_about = "Groundwork - Database Initialization CLI

Groundwork helps you:
  • Apply framework schema and seed SQL files in one transaction
  • Synchronize the menus table from data/init.json (single source of truth)
  • Compare existing tables against the managed table list
  • Provision the baseline admin/user accounts with bcrypt-hashed passwords

Target database: PostgreSQL")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Preview the SQL:               groundwork migrate --dry-run
  2. Apply schema and menu data:    groundwork migrate
  3. Inspect an existing database:  groundwork migrate --compare-only
  4. Provision baseline accounts:   groundwork seed-users

For detailed help on each command, use: groundwork <command> --help")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Database connection flags shared by all subcommands
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Database host
    #[arg(long, value_name = "HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long, value_name = "PORT", default_value_t = 5432)]
    pub port: u16,

    /// Database name
    #[arg(long = "db", alias = "database", value_name = "NAME", default_value = "postgres")]
    pub database: String,

    /// Database user
    #[arg(long, value_name = "USER", default_value = "postgres")]
    pub user: String,

    /// Database password
    #[arg(long, value_name = "PASSWORD", default_value = "postgres")]
    pub password: String,

    /// Target schema (created if absent, must be a bare identifier)
    #[arg(long, value_name = "SCHEMA", default_value = "public")]
    pub schema: String,
}

impl ConnectionArgs {
    /// フラグを検証済みの接続設定へ解決
    ///
    /// スキーマ名はSQLを組み立てる前にここで検証されます。
    pub fn resolve(&self) -> Result<ConnectionConfig, ConfigError> {
        let config = ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            schema: self.schema.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply framework schema, seed data, and menu synchronization
    ///
    /// Reads the menu definitions from data/init.json, flattens them into
    /// relational rows, and executes all schema/seed/menu steps inside a
    /// single transaction. Any failure rolls back the entire run.
    ///
    /// EXAMPLES:
    ///   # Preview every SQL step without touching the database
    ///   groundwork migrate --dry-run
    ///
    ///   # Apply with a before/after table comparison
    ///   groundwork migrate --compare
    ///
    ///   # Only report the table diff, never mutate
    ///   groundwork migrate --compare-only
    ///
    ///   # Drop all managed tables first, then re-apply from scratch
    ///   groundwork migrate --reset
    ///
    ///   # Target a dedicated schema
    ///   groundwork migrate --schema app_dev
    Migrate {
        /// Connection flags
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Path to the menu source file (default: data/init.json)
        #[arg(long, value_name = "FILE")]
        source: Option<PathBuf>,

        /// Dry run - print SQL without executing
        #[arg(long)]
        dry_run: bool,

        /// Print a table diff before and after applying
        #[arg(long)]
        compare: bool,

        /// Only print the table diff, do not apply anything (implies --compare)
        #[arg(long)]
        compare_only: bool,

        /// Drop all managed tables before applying (DESTRUCTIVE)
        #[arg(long)]
        reset: bool,
    },

    /// Provision the baseline admin and user accounts
    ///
    /// Hashes the built-in account passwords with bcrypt and upserts them
    /// into the authentication tables (users / user_authorities) inside a
    /// single transaction. Requires the authentication schema to exist.
    ///
    /// EXAMPLES:
    ///   # Provision into the default schema
    ///   groundwork seed-users
    ///
    ///   # Preview the planned steps without connecting
    ///   groundwork seed-users --dry-run
    ///
    ///   # Provision into a dedicated schema
    ///   groundwork seed-users --schema app_dev
    SeedUsers {
        /// Connection flags
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Dry run - print planned steps without executing
        #[arg(long)]
        dry_run: bool,
    },
}
