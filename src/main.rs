use clap::Parser;
use groundwork::cli::commands::migrate::{MigrateCommand, MigrateCommandHandler};
use groundwork::cli::commands::seed_users::{SeedUsersCommand, SeedUsersCommandHandler};
use groundwork::cli::{Cli, Commands};
use anyhow::Result;
use std::env;
use std::process;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    match cli.command {
        Commands::Migrate {
            connection,
            source,
            dry_run,
            compare,
            compare_only,
            reset,
        } => {
            let config = connection.resolve()?;
            let handler = MigrateCommandHandler::new();
            let command = MigrateCommand {
                project_path,
                config,
                source,
                dry_run,
                compare: compare || compare_only,
                compare_only,
                reset,
            };
            handler.execute(&command).await
        }

        Commands::SeedUsers {
            connection,
            dry_run,
        } => {
            let config = connection.resolve()?;
            let handler = SeedUsersCommandHandler::new();
            let command = SeedUsersCommand {
                config,
                dry_run,
            };
            handler.execute(&command).await
        }
    }
}
