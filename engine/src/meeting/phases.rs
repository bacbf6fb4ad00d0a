//! Phase lists
//!
//! The opening and evaluation sessions are ordered lists of phases read from
//! configuration. Each phase names the roles that may take it (the first
//! filled role wins, the last one is the fallback), its duration, and the
//! condition under which it appears at all.

use serde::{Deserialize, Serialize};

/// When a phase is included in its session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always included
    #[default]
    Always,
    /// Only when the role with this key has a taker
    Filled(String),
    /// Only when new members are inducted; duration is per member
    NewMembers,
    /// Only when the special event with this prefix (e.g. `SE_TE`) was declared;
    /// the event supplies its own role, taker, topic, duration and cards
    SpecialEvent(String),
}

/// One configurable agenda phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Event title shown on the agenda
    pub event: String,

    /// Candidate role keys
    pub role: Vec<String>,

    pub minutes: f64,

    #[serde(default = "default_true")]
    pub show_duration: bool,

    /// Explicit "green/yellow/red" cards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<String>,

    #[serde(default)]
    pub when: Condition,

    /// Show the row with a TBD taker instead of dropping it
    #[serde(default)]
    pub mandatory: bool,
}

fn default_true() -> bool {
    true
}

impl Phase {
    pub fn new(event: &str, role: &[&str], minutes: f64) -> Self {
        Self {
            event: event.to_string(),
            role: role.iter().map(|r| r.to_string()).collect(),
            minutes,
            show_duration: true,
            cards: None,
            when: Condition::Always,
            mandatory: false,
        }
    }

    pub fn hide_duration(mut self) -> Self {
        self.show_duration = false;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when = condition;
        self
    }
}

fn filled(key: &str) -> Condition {
    Condition::Filled(key.to_string())
}

/// Registration through the hand-back to the Toastmaster
pub fn default_opening_phases() -> Vec<Phase> {
    vec![
        Phase::new("Registration/Greeting", &["SAA", "VPM"], 20.0)
            .hide_duration()
            .mandatory(),
        Phase::new("Meeting Opening", &["Toastmaster"], 4.0).mandatory(),
        Phase::new("Welcome Guests", &["SAA", "VPM"], 5.0).mandatory(),
        Phase::new("Introduction of Evaluation Team", &["GE", "Toastmaster"], 1.0).mandatory(),
        Phase::new("Timer Guidelines", &["Timer"], 1.0).mandatory(),
        Phase::new("Ah-Counter Guidelines", &["Ah-Counter"], 1.0).when(filled("Ah-Counter")),
        Phase::new("Word of the Day", &["Word-Smith"], 1.0).when(filled("Word-Smith")),
        Phase::new("Return Control to Toastmaster", &["GE"], 1.0).when(filled("GE")),
    ]
}

/// Functionary reports through the closing remarks
pub fn default_evaluation_phases() -> Vec<Phase> {
    vec![
        Phase::new("Ah-Counter Report", &["Ah-Counter"], 2.0).when(filled("Ah-Counter")),
        Phase::new("Word-Smith Report", &["Word-Smith"], 2.0).when(filled("Word-Smith")),
        Phase::new("Timer Report", &["Timer"], 2.0).mandatory(),
        Phase::new("General Evaluation", &["GE"], 5.0).when(filled("GE")),
        Phase::new("Guest Speech", &["Toastmaster"], 20.0)
            .when(Condition::SpecialEvent("SE_TE".to_string())),
        Phase::new("New Member Induction", &["President", "VPM"], 2.0)
            .when(Condition::NewMembers)
            .mandatory(),
        Phase::new("Closing Remarks", &["Toastmaster"], 2.0).mandatory(),
        Phase::new("President's Closing", &["President"], 2.0).mandatory(),
    ]
}
