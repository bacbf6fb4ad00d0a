//! Roster history and agenda row types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Curriculum track a speech belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    /// Pathways education program
    #[default]
    #[serde(rename = "pathway")]
    Pathway,
    /// Traditional communication track
    #[serde(rename = "CC")]
    Communication,
}

impl Track {
    pub fn as_str(&self) -> &str {
        match self {
            Track::Pathway => "pathway",
            Track::Communication => "CC",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meeting language; selects which member name is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Chinese,
}

impl Language {
    /// Parse a call-role language tag (`English`, `Chinese` or `中文`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            t if t.eq_ignore_ascii_case("english") => Some(Language::English),
            t if t.eq_ignore_ascii_case("chinese") || t == "中文" => Some(Language::Chinese),
            _ => None,
        }
    }
}

/// One delivered speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecord {
    #[serde(rename = "Level")]
    pub level: String,
    /// Meeting date as `YYYYMMDD`
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Topic", default)]
    pub topic: String,
    #[serde(rename = "Type", default)]
    pub track: Track,
}

/// One functionary role held
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(rename = "Role")]
    pub role: String,
    /// Meeting date as `YYYYMMDD`
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Topic", default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// What taking a meeting role means for a member's history.
///
/// Resolved once when a meeting is parsed so the roster never has to
/// inspect role names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// Prepared speaker in slot `n` (1-based); advances the curriculum
    Speaker(usize),
    /// Individual evaluator in slot `n` (1-based)
    Evaluator(usize),
    /// Functionary role recorded in the member's role history
    Functionary(String),
    /// Administrative role that is never tracked
    NonRecorded(String),
}

impl RoleKind {
    /// Role name written to the role history, if this kind is recorded at all.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            RoleKind::Speaker(_) | RoleKind::NonRecorded(_) => None,
            RoleKind::Evaluator(_) => Some("IE"),
            RoleKind::Functionary(name) => Some(name),
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Speaker(n) => write!(f, "Speaker {}", n),
            RoleKind::Evaluator(n) => write!(f, "IE{}", n),
            RoleKind::Functionary(name) | RoleKind::NonRecorded(name) => f.write_str(name),
        }
    }
}

/// Green/yellow/red timing-signal marks, in minutes, as displayed.
///
/// A blank string means the card is not shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardThresholds {
    pub green: String,
    pub yellow: String,
    pub red: String,
}

impl CardThresholds {
    pub fn new(
        green: impl Into<String>,
        yellow: impl Into<String>,
        red: impl Into<String>,
    ) -> Self {
        Self {
            green: green.into(),
            yellow: yellow.into(),
            red: red.into(),
        }
    }

    /// All three cards hidden
    pub fn blank() -> Self {
        Self::default()
    }

    /// Parse an explicit `"green/yellow/red"` triplet such as `"1/1.5/2"`.
    pub fn parse_triplet(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [g, y, r] if !g.is_empty() && !y.is_empty() && !r.is_empty() => {
                Some(Self::new(*g, *y, *r))
            }
            _ => None,
        }
    }

    /// Numeric marks for the timer front-end; blank or non-numeric cards become `-1`.
    pub fn limits(&self) -> [f64; 3] {
        let parse = |s: &str| s.trim().parse::<f64>().unwrap_or(-1.0);
        [parse(&self.green), parse(&self.yellow), parse(&self.red)]
    }
}

/// One rendered agenda line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaRow {
    /// Start time on a 12-hour clock, e.g. `06:45 PM`
    pub clock: String,
    pub role_label: String,
    pub event_title: String,
    pub assignee: String,
    /// Duration text shown on the agenda, e.g. `5-7`
    pub display_duration: String,
    /// Duration the running clock advanced by
    pub minutes: f64,
    #[serde(flatten)]
    pub cards: CardThresholds,
}
