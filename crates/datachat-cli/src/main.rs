//! datachat CLI: analyze a CSV, chat about it, inspect context windows. Config from env and
//! optional CLI args.

use anyhow::Result;
use chat_core::init_tracing;
use clap::Parser;
use datachat_cli::commands::{analyze, chat, read_messages, window_report};
use datachat_cli::{AppConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load();
    init_tracing(&config.log_file)?;

    match cli.command {
        Commands::Analyze {
            csv,
            query,
            generative,
        } => {
            let result = analyze(&config, &csv, &query, generative).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Chat { csv, title } => {
            chat(&config, csv.as_deref(), &title).await?;
        }
        Commands::Window {
            file,
            max_messages,
            preserve_first,
            token_limit,
        } => {
            let mut window = config.window.clone();
            if let Some(n) = max_messages {
                window.max_messages = n;
            }
            if let Some(n) = preserve_first {
                window.preserve_first = n;
            }
            if let Some(n) = token_limit {
                window.token_limit = n;
            }
            let messages = read_messages(&file)?;
            let report = window_report(&messages, &window);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
