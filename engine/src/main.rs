// Agenda generator
// Main entry point for the agenda binary

use agenda_engine::cli::{Cli, Command, ConfigAction, RosterAction};
use agenda_engine::config::Config;
use agenda_engine::handlers::{
    handle_config_show, handle_config_validate, handle_generate, handle_replay,
    handle_roster_show, handle_roster_stats, OutputFormat,
};
use agenda_engine::telemetry::init_telemetry_with_level;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log overrides the configured level; RUST_LOG overrides both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Agenda v{} ({} - {})", version, commit, timestamp);

    // Handle commands
    match cli.command {
        Command::Generate { file, dry_run } => {
            tracing::info!("Generating agenda from {}", file.display());
            handle_generate(&file, &config, dry_run, format)
        }

        Command::Replay { dir } => {
            tracing::info!("Replaying call-roles");
            handle_replay(dir, &config, format)
        }

        Command::Roster { action } => match action {
            RosterAction::Show { name } => handle_roster_show(name.as_deref(), &config, format),
            RosterAction::Stats => handle_roster_stats(&config, format),
        },

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Validate => handle_config_validate(&config, format),
        },
    }
}
