//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - generate: Build agendas for a call-role file and update the roster
//! - replay: Rebuild the roster from archived call-roles
//! - roster show / stats: Inspect members
//! - config show / validate: Inspect configuration

use anyhow::{bail, Context, Result};
use sdk::errors::{AgendaError, AgendaErrorExt};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::meeting::{parse_call_role, MeetingFields, MeetingPlan};
use crate::render;
use crate::roster::Roster;
use crate::timing::format_minutes;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Plan one meeting against `roster`.
///
/// Records already dated on or after the meeting are cleared first, so
/// running the same meeting twice leaves the roster as a single run would.
pub fn run_meeting<'a>(
    config: &'a Config,
    fields: &MeetingFields,
    roster: &mut Roster,
) -> Result<MeetingPlan<'a>, AgendaError> {
    let date_key = fields.date_key(config.meeting_year())?;
    roster.clear_records(&date_key);

    let mut plan = MeetingPlan::new(config);
    plan.parse(fields, roster)?;
    plan.assemble()?;
    Ok(plan)
}

/// Write the text agenda, JSON agenda and timer script for a planned meeting
pub fn write_outputs(plan: &mut MeetingPlan<'_>, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let date_key = plan.date_key().to_string();
    let outputs = [
        (
            format!("{}.agenda.txt", date_key),
            render::format_text(plan.sessions()),
        ),
        (
            format!("{}.agenda.json", date_key),
            render::agenda_json(&date_key, plan.theme(), plan.sessions())?,
        ),
        (
            format!("{}.timer.js", date_key),
            render::timer_script(plan.sessions())?,
        ),
    ];

    let mut written = Vec::new();
    for (name, contents) in outputs {
        let path = output_dir.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    plan.mark_rendered()?;
    Ok(written)
}

/// Keep a copy of the call-role so `replay` can rebuild the roster later
fn archive_call_role(source: &Path, output_dir: &Path, date_key: &str) -> Result<PathBuf> {
    let logs = output_dir.join("logs");
    fs::create_dir_all(&logs).with_context(|| format!("Failed to create {}", logs.display()))?;

    let target = logs.join(format!("{}.txt", date_key));
    let same_file = match (fs::canonicalize(source), fs::canonicalize(&target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same_file {
        fs::copy(source, &target)
            .with_context(|| format!("Failed to archive call-role to {}", target.display()))?;
    }
    Ok(target)
}

fn load_roster(config: &Config) -> Result<Roster> {
    let curriculum = config.curriculum()?;
    Roster::load(&config.core.roster_path, curriculum).context("Failed to load roster")
}

/// Generate agendas for every meeting in a call-role file
///
/// The roster is written back only after every meeting in the file was
/// planned successfully. With `dry_run` the roster file is left alone and a
/// snapshot is written to the output directory instead.
pub fn handle_generate(
    path: &Path,
    config: &Config,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read call-role {}", path.display()))?;

    let meetings = parse_call_role(&text);
    if meetings.is_empty() {
        bail!("No meetings found in {}", path.display());
    }

    let output_dir = &config.core.output_dir;
    let mut roster = load_roster(config)?;
    let mut results = Vec::new();
    let mut text_output = String::new();

    for fields in &meetings {
        let mut plan = run_meeting(config, fields, &mut roster)
            .with_context(|| format!("Failed to plan meeting from {}", path.display()))?;
        let files = write_outputs(&mut plan, output_dir)?;

        info!(
            "Generated agenda for {} ({} files)",
            plan.date_key(),
            files.len()
        );

        text_output.push_str(&format!(
            "Meeting {}{}\n",
            plan.date_key(),
            plan.theme()
                .map(|t| format!(" - {}", t))
                .unwrap_or_default()
        ));
        text_output.push_str(&render::format_text(plan.sessions()));
        text_output.push('\n');

        results.push(json!({
            "date": plan.date_key(),
            "theme": plan.theme(),
            "sessions": plan.sessions(),
            "files": files,
        }));
    }

    let last_date = results
        .last()
        .and_then(|r| r["date"].as_str())
        .unwrap_or_default()
        .to_string();

    let roster_path = if dry_run {
        output_dir.join(format!("{}.roster.json", last_date))
    } else {
        archive_call_role(path, output_dir, &last_date)?;
        config.core.roster_path.clone()
    };
    roster.dump(&roster_path)?;

    match format {
        OutputFormat::Text => {
            print!("{}", text_output);
            println!("Roster written to {}", roster_path.display());
        }
        OutputFormat::Json => {
            let output = json!({
                "meetings": results,
                "roster": roster_path,
                "dry_run": dry_run,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Call-role files in `dir`, in file-name order
fn call_role_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    Ok(files)
}

/// Replay archived call-roles in name order against the roster
///
/// Each meeting runs against a copy of the roster that is committed and
/// written only when the meeting succeeds. A failed meeting is logged and
/// skipped; configuration errors stop the replay immediately.
pub fn handle_replay(dir: Option<PathBuf>, config: &Config, format: OutputFormat) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.core.output_dir.join("logs"));
    let files = call_role_files(&dir)?;
    if files.is_empty() {
        warn!("No call-role files in {}", dir.display());
    }

    let mut roster = load_roster(config)?;
    let mut replayed = Vec::new();
    let mut failures = Vec::new();

    for file in &files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed to read call-role {}", file.display()))?;

        for fields in parse_call_role(&text) {
            let mut working = roster.clone();
            match run_meeting(config, &fields, &mut working) {
                Ok(plan) => {
                    roster = working;
                    roster.dump(&config.core.roster_path)?;
                    info!("Replayed meeting {} from {}", plan.date_key(), file.display());
                    replayed.push(plan.date_key().to_string());
                }
                Err(e) if !e.is_recoverable() => {
                    return Err(e).with_context(|| {
                        format!("Replay stopped at {}", file.display())
                    });
                }
                Err(e) => {
                    error!("Skipping meeting in {}: {} ({})", file.display(), e, e.user_hint());
                    failures.push(json!({
                        "file": file,
                        "error": e.to_string(),
                    }));
                }
            }
        }
    }

    match format {
        OutputFormat::Text => {
            println!(
                "Replayed {} meetings from {} files in {}",
                replayed.len(),
                files.len(),
                dir.display()
            );
            for date in &replayed {
                println!("  {}", date);
            }
            for failure in &failures {
                println!(
                    "  FAILED {}: {}",
                    failure["file"].as_str().unwrap_or_default(),
                    failure["error"].as_str().unwrap_or_default()
                );
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "replayed": replayed,
                "failed": failures,
                "files": files.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if !failures.is_empty() {
        bail!("{} meetings failed to replay", failures.len());
    }

    Ok(())
}

/// Show all members, or the one `name` resolves to
pub fn handle_roster_show(name: Option<&str>, config: &Config, format: OutputFormat) -> Result<()> {
    let roster = load_roster(config)?;

    let Some(name) = name else {
        match format {
            OutputFormat::Text => {
                if roster.is_empty() {
                    println!("Roster is empty");
                    return Ok(());
                }
                println!("Members ({}):", roster.len());
                for entry in roster.entries() {
                    println!(
                        "  {} ({}) - {}",
                        entry.english_name(),
                        entry.chinese_name(),
                        entry.current_level()
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&roster.to_records())?);
            }
        }
        return Ok(());
    };

    let entry = roster
        .find(name)
        .ok_or_else(|| anyhow::anyhow!("No member matches '{}'", name))?;

    match format {
        OutputFormat::Text => {
            println!("{}", entry.english_name());
            println!("  Chinese Name: {}", entry.chinese_name());
            if !entry.nick_names().is_empty() {
                println!("  Nick Names: {}", entry.nick_names().join(", "));
            }
            println!("  Current Level: {}", entry.current_level());
            println!();
            println!("  Speeches ({}):", entry.speech_history().len());
            for speech in entry.speech_history() {
                println!(
                    "    {}  {:<10} {:<8} {}",
                    speech.date,
                    speech.level,
                    speech.track.as_str(),
                    speech.topic
                );
            }
            println!("  Roles ({}):", entry.role_history().len());
            for role in entry.role_history() {
                println!(
                    "    {}  {} {}",
                    role.date,
                    role.role,
                    role.topic.as_deref().unwrap_or_default()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entry.to_record())?);
        }
    }

    Ok(())
}

/// Show per-member progress counts
pub fn handle_roster_stats(config: &Config, format: OutputFormat) -> Result<()> {
    let roster = load_roster(config)?;
    let stats = roster.stats();

    match format {
        OutputFormat::Text => {
            if stats.is_empty() {
                println!("Roster is empty");
                return Ok(());
            }
            println!(
                "{:<24} {:<10} {:>8} {:>6}  {:<10} {:<10}",
                "Member", "Level", "Speeches", "Roles", "Last Talk", "Last Role"
            );
            for member in &stats {
                println!(
                    "{:<24} {:<10} {:>8} {:>6}  {:<10} {:<10}",
                    member.english_name,
                    member.current_level,
                    member.speeches,
                    member.roles,
                    member.last_speech.as_deref().unwrap_or("-"),
                    member.last_role.as_deref().unwrap_or("-")
                );
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "members": stats,
                "count": stats.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Validate configuration and check that the roster it points at loads
pub fn handle_config_validate(config: &Config, format: OutputFormat) -> Result<()> {
    config.validate()?;
    let roster = load_roster(config)?;

    let fixed_minutes = |phases: &[crate::meeting::Phase]| -> f64 {
        phases
            .iter()
            .filter(|p| p.mandatory)
            .map(|p| p.minutes)
            .sum()
    };

    match format {
        OutputFormat::Text => {
            println!("Configuration is valid");
            println!("  Roles: {}", config.roles.len());
            println!(
                "  Opening phases: {} ({} min mandatory)",
                config.agenda.opening.len(),
                format_minutes(fixed_minutes(&config.agenda.opening))
            );
            println!(
                "  Evaluation phases: {} ({} min mandatory)",
                config.agenda.evaluation.len(),
                format_minutes(fixed_minutes(&config.agenda.evaluation))
            );
            println!(
                "  Roster: {} ({} members)",
                config.core.roster_path.display(),
                roster.len()
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "valid": true,
                "roles": config.roles.len(),
                "opening_phases": config.agenda.opening.len(),
                "evaluation_phases": config.agenda.evaluation.len(),
                "roster_path": config.core.roster_path,
                "members": roster.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
