//! DataCommit CLI entry point.

use anyhow::Result;
use clap::Parser;
use datacommit::cli::{commands, Cli, Commands};
use datacommit::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("datacommit={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = Settings::load_from(cli.config.as_ref())?;

    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ingest { reset } => {
            commands::run_ingest(reset, settings).await?;
        }

        Commands::Ask { question, k, show_chunks } => {
            commands::run_ask(&question, k, show_chunks, settings).await?;
        }

        Commands::Status => {
            commands::run_status(settings).await?;
        }

        Commands::Download { url, output } => {
            commands::run_download(&url, output, settings).await?;
        }

        Commands::Transcribe { audio, speakers, output } => {
            commands::run_transcribe(&audio, speakers, output, settings).await?;
        }

        Commands::Clean { input, output } => {
            commands::run_clean(&input, &output, settings).await?;
        }

        Commands::RenameSpeakers { file, host, guest } => {
            commands::run_rename_speakers(&file, &host, &guest)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
