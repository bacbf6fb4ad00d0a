//! Agenda rendering
//!
//! Turns assembled sessions into the three outputs a meeting needs:
//! a plain-text agenda table, the cue list driving the meeting timer page
//! (`var data = [...]`), and a JSON document of the sessions.

use sdk::errors::AgendaError;
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

use crate::session::Session;

const HEADERS: [&str; 6] = ["Time", "Role", "Event", "Member", "Duration", "G/Y/R"];

/// One row of the timer front-end's data array
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerCue {
    pub role: String,
    pub event: String,
    pub member: String,
    pub durations: f64,
    /// Green/yellow/red minute marks, `-1` where no card is shown
    pub limits: [f64; 3],
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, to: usize) -> String {
    let mut out = s.to_string();
    out.extend(std::iter::repeat(' ').take(to.saturating_sub(width(s))));
    out
}

/// Fixed-width agenda table; each session title is printed as a header row.
pub fn format_text(sessions: &[Session]) -> String {
    let rows: Vec<[String; 6]> = sessions
        .iter()
        .flat_map(|s| &s.rows)
        .map(|row| {
            let cards = if row.cards.green.is_empty()
                && row.cards.yellow.is_empty()
                && row.cards.red.is_empty()
            {
                String::new()
            } else {
                format!("{}/{}/{}", row.cards.green, row.cards.yellow, row.cards.red)
            };
            [
                row.clock.clone(),
                row.role_label.clone(),
                row.event_title.clone(),
                row.assignee.clone(),
                row.display_duration.clone(),
                cards,
            ]
        })
        .collect();

    let mut widths: [usize; 6] = std::array::from_fn(|i| width(HEADERS[i]));
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(width(cell));
        }
    }

    let line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| pad(cell, w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&HEADERS));

    let mut rows = rows.iter();
    for session in sessions {
        if let Some(title) = &session.title {
            let _ = writeln!(out);
            let _ = writeln!(out, "== {} ==", title);
        }
        for row in rows.by_ref().take(session.rows.len()) {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            let _ = writeln!(out, "{}", line(&cells));
        }
    }

    out
}

/// Cue list for the meeting timer page, one entry per agenda row
pub fn timer_cues(sessions: &[Session]) -> Vec<TimerCue> {
    sessions
        .iter()
        .flat_map(|s| &s.rows)
        .map(|row| TimerCue {
            role: row.role_label.clone(),
            event: row.event_title.clone(),
            member: row.assignee.clone(),
            durations: row.minutes,
            limits: row.cards.limits(),
        })
        .collect()
}

/// JavaScript data file loaded by the timer page
pub fn timer_script(sessions: &[Session]) -> Result<String, AgendaError> {
    let cues = serde_json::to_string_pretty(&timer_cues(sessions))?;
    Ok(format!("var data = {};\n", cues))
}

/// JSON document of the whole agenda
pub fn agenda_json(
    date_key: &str,
    theme: Option<&str>,
    sessions: &[Session],
) -> Result<String, AgendaError> {
    let output = json!({
        "date": date_key,
        "theme": theme,
        "sessions": sessions,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
