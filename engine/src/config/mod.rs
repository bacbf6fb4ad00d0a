//! Configuration management
//!
//! This module handles loading, validation, and management of the agenda
//! configuration. Configuration is stored in TOML format at ~/.agenda/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Roster file, output directory, log level, meeting start time
//! - **curriculum**: The two ordered level tracks speakers progress through
//! - **roles**: Functionary roles, their call-role field aliases and default takers
//! - **timing**: Speech durations per level and fixed micro-event durations
//! - **agenda**: Session titles and the opening/evaluation phase lists
//!
//! The whole structure is loaded once and passed by reference into the roster
//! and the meeting planner; nothing reads configuration from global state.
//!
//! # Examples
//!
//! ```no_run
//! use agenda_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! println!("Roster: {:?}", config.core.roster_path);
//! println!("Meeting starts at {}", config.core.start_time);
//! # Ok(())
//! # }
//! ```

use chrono::{Datelike, NaiveTime};
use sdk::errors::AgendaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::curriculum::{CurriculumTrack, NOT_STARTED};
use crate::meeting::phases::{default_evaluation_phases, default_opening_phases, Condition, Phase};
use crate::meeting::{MAX_ITEM_MINUTES, TABLE_TOPIC_EVALUATOR, TABLE_TOPIC_MASTER, TOASTMASTER};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    /// Curriculum tracks
    #[serde(default)]
    pub curriculum: CurriculumConfig,

    /// Functionary roles
    #[serde(default = "default_roles")]
    pub roles: Vec<RoleConfig>,

    /// Durations and card overrides
    #[serde(default)]
    pub timing: TimingConfig,

    /// Session layout
    #[serde(default)]
    pub agenda: AgendaConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Member roster JSON file (supports ~ expansion)
    #[serde(default = "default_roster_path")]
    pub roster_path: PathBuf,

    /// Directory for rendered agendas and archived call-roles (supports ~ expansion)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Meeting start time, 24-hour "HH:MM"
    #[serde(default = "default_start_time")]
    pub start_time: String,

    /// Year used to date `M/D` call-role headers; current year when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Number of numbered speaker and evaluator slots read from a call-role
    #[serde(default = "default_speaker_slots")]
    pub speaker_slots: usize,
}

/// Curriculum track configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumConfig {
    /// Pathways levels, in order
    pub pathway: Vec<String>,

    /// Communication track levels, in order
    pub communication: Vec<String>,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        let mut pathway = vec![NOT_STARTED.to_string()];
        pathway.extend((1..=5).map(|n| format!("Level {}", n)));
        Self {
            pathway,
            communication: (1..=10).map(|n| format!("CC{}", n)).collect(),
        }
    }
}

/// One functionary role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Call-role field that names the taker, also used as the role's id
    pub key: String,

    /// Label printed in the agenda's role column
    pub label: String,

    /// Alternative call-role fields (nicknames) consulted after `key`
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Member who takes the role when the call-role leaves it open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_taker: Option<String>,

    /// Whether taking the role is written to the member's role history
    #[serde(default = "default_true")]
    pub recorded: bool,

    /// Whether the role record carries the meeting theme as its topic
    #[serde(default)]
    pub records_theme: bool,
}

impl RoleConfig {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            aliases: Vec::new(),
            default_taker: None,
            recorded: true,
            records_theme: false,
        }
    }

    fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    fn not_recorded(mut self) -> Self {
        self.recorded = false;
        self
    }

    fn with_theme(mut self) -> Self {
        self.records_theme = true;
        self
    }
}

/// Speech duration for a curriculum level (`"*"` matches any level)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechTiming {
    pub level: String,
    pub minutes: f64,
}

/// Timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Speaker introduction by the Toastmaster
    #[serde(default = "default_intro_minutes")]
    pub intro_minutes: f64,

    /// Individual evaluation of one speech
    #[serde(default = "default_evaluation_minutes")]
    pub evaluation_minutes: f64,

    /// Themed table-topic block when a table-topic evaluator is assigned
    #[serde(default = "default_table_topics_minutes")]
    pub table_topics_minutes: f64,

    /// Round-table block when no table-topic evaluator is assigned
    #[serde(default = "default_round_table_minutes")]
    pub round_table_minutes: f64,

    /// Table-topic evaluation block
    #[serde(default = "default_table_topics_evaluation_minutes")]
    pub table_topics_evaluation_minutes: f64,

    /// Card override for table-topic answers, "green/yellow/red"
    #[serde(default = "default_table_topics_cards")]
    pub table_topics_cards: String,

    /// Speech durations, consulted in order; the last matching entry wins
    #[serde(default = "default_speech_timings")]
    pub speech: Vec<SpeechTiming>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            intro_minutes: default_intro_minutes(),
            evaluation_minutes: default_evaluation_minutes(),
            table_topics_minutes: default_table_topics_minutes(),
            round_table_minutes: default_round_table_minutes(),
            table_topics_evaluation_minutes: default_table_topics_evaluation_minutes(),
            table_topics_cards: default_table_topics_cards(),
            speech: default_speech_timings(),
        }
    }
}

/// Session titles; a missing title renders no header row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTitles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_topics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<String>,
}

/// Agenda layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Include a table-topics session
    #[serde(default = "default_true")]
    pub table_topics: bool,

    #[serde(default = "default_titles")]
    pub titles: SessionTitles,

    /// Opening session phases, in order
    #[serde(default = "default_opening_phases")]
    pub opening: Vec<Phase>,

    /// Evaluation session phases, in order
    #[serde(default = "default_evaluation_phases")]
    pub evaluation: Vec<Phase>,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            table_topics: true,
            titles: default_titles(),
            opening: default_opening_phases(),
            evaluation: default_evaluation_phases(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_roster_path() -> PathBuf {
    PathBuf::from("~/.agenda/roster.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("~/.agenda/output")
}

fn default_start_time() -> String {
    "18:45".to_string()
}

fn default_speaker_slots() -> usize {
    8
}

fn default_intro_minutes() -> f64 {
    1.0
}

fn default_evaluation_minutes() -> f64 {
    3.0
}

fn default_table_topics_minutes() -> f64 {
    20.0
}

fn default_round_table_minutes() -> f64 {
    25.0
}

fn default_table_topics_evaluation_minutes() -> f64 {
    6.0
}

fn default_table_topics_cards() -> String {
    "1/1.5/2".to_string()
}

fn default_speech_timings() -> Vec<SpeechTiming> {
    vec![
        SpeechTiming {
            level: "*".to_string(),
            minutes: 7.0,
        },
        SpeechTiming {
            level: "Level 1".to_string(),
            minutes: 6.0,
        },
        SpeechTiming {
            level: "Level 5".to_string(),
            minutes: 10.0,
        },
    ]
}

fn default_titles() -> SessionTitles {
    SessionTitles {
        opening: None,
        prepared: Some("Prepared Speech Session".to_string()),
        table_topics: Some("Table Topic Session".to_string()),
        evaluation: Some("Evaluation Session".to_string()),
    }
}

fn default_roles() -> Vec<RoleConfig> {
    vec![
        RoleConfig::new("SAA", "Sergeant at Arms (SAA)").not_recorded(),
        RoleConfig::new("VPM", "VP Membership")
            .aliases(&["VP Membership"])
            .not_recorded(),
        RoleConfig::new("President", "President").not_recorded(),
        RoleConfig::new("Toastmaster", "Toastmaster")
            .aliases(&["TM", "TMoD"])
            .with_theme(),
        RoleConfig::new("GE", "General Evaluator").aliases(&["General Evaluator"]),
        RoleConfig::new("Timer", "Timer"),
        RoleConfig::new("Ah-Counter", "Ah-Counter").aliases(&["Ah Counter", "AC"]),
        RoleConfig::new("Word-Smith", "Word Smith").aliases(&["Grammarian", "WS"]),
        RoleConfig::new("TTM", "Table Topic Master")
            .aliases(&["Table Topic Master"])
            .with_theme(),
        RoleConfig::new("TTE", "Table Topic Evaluator").aliases(&["Table Topic Evaluator"]),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
                roster_path: default_roster_path(),
                output_dir: default_output_dir(),
                start_time: default_start_time(),
                year: None,
                speaker_slots: default_speaker_slots(),
            },
            curriculum: CurriculumConfig::default(),
            roles: default_roles(),
            timing: TimingConfig::default(),
            agenda: AgendaConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.agenda/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, AgendaError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, AgendaError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AgendaError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse, validate and process configuration text
    pub fn from_toml_str(contents: &str) -> Result<Self, AgendaError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| AgendaError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, AgendaError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();

        // Write the unexpanded paths so the file stays portable
        let toml_string = config.to_toml_string()?;
        fs::write(path, toml_string)
            .map_err(|e| AgendaError::Config(format!("Failed to write config file: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String, AgendaError> {
        toml::to_string_pretty(self)
            .map_err(|e| AgendaError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Get the default configuration file path (~/.agenda/config.toml)
    fn default_config_path() -> Result<PathBuf, AgendaError> {
        let home = dirs::home_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".agenda").join("config.toml"))
    }

    /// Look up a configured role by key.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::UnknownRole` if no role with this key is declared.
    pub fn role(&self, key: &str) -> Result<&RoleConfig, AgendaError> {
        self.roles
            .iter()
            .find(|role| role.key == key)
            .ok_or_else(|| AgendaError::UnknownRole(key.to_string()))
    }

    /// Year used for `M/D` call-role dates
    pub fn meeting_year(&self) -> i32 {
        self.core
            .year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Parsed meeting start time
    pub fn start_time(&self) -> Result<NaiveTime, AgendaError> {
        NaiveTime::parse_from_str(self.core.start_time.trim(), "%H:%M").map_err(|e| {
            AgendaError::Config(format!(
                "Invalid start_time '{}': {}",
                self.core.start_time, e
            ))
        })
    }

    /// Curriculum tracks built from the `[curriculum]` section
    pub fn curriculum(&self) -> Result<CurriculumTrack, AgendaError> {
        CurriculumTrack::from_config(&self.curriculum)
    }

    /// Check every setting that does not touch the file system.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::Config` for invalid values and
    /// `AgendaError::UnknownRole` when a phase names an undeclared role.
    pub fn validate(&self) -> Result<(), AgendaError> {
        // Validate log level
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(AgendaError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        self.start_time()?;

        if self.core.speaker_slots == 0 {
            return Err(AgendaError::Config(
                "speaker_slots must be at least 1".to_string(),
            ));
        }

        self.curriculum()?;

        // Role keys must be unique
        let mut keys = HashSet::new();
        for role in &self.roles {
            if role.key.trim().is_empty() {
                return Err(AgendaError::Config("role key must not be empty".to_string()));
            }
            if !keys.insert(role.key.as_str()) {
                return Err(AgendaError::Config(format!(
                    "role '{}' is declared twice",
                    role.key
                )));
            }
        }

        // Roles the prepared and table-topic sessions are built around
        self.role(TOASTMASTER)?;
        if self.agenda.table_topics {
            self.role(TABLE_TOPIC_MASTER)?;
            self.role(TABLE_TOPIC_EVALUATOR)?;
        }

        // Durations
        let fixed = [
            ("intro_minutes", self.timing.intro_minutes),
            ("evaluation_minutes", self.timing.evaluation_minutes),
            ("table_topics_minutes", self.timing.table_topics_minutes),
            ("round_table_minutes", self.timing.round_table_minutes),
            (
                "table_topics_evaluation_minutes",
                self.timing.table_topics_evaluation_minutes,
            ),
        ];
        for (name, minutes) in fixed {
            check_minutes(name, minutes)?;
        }
        for entry in &self.timing.speech {
            check_minutes(&format!("speech duration for '{}'", entry.level), entry.minutes)?;
        }
        check_cards("table_topics_cards", &self.timing.table_topics_cards)?;

        // Phases may only reference declared roles
        for phase in self.agenda.opening.iter().chain(&self.agenda.evaluation) {
            if phase.role.is_empty() {
                return Err(AgendaError::Config(format!(
                    "phase '{}' has no role",
                    phase.event
                )));
            }
            for key in &phase.role {
                self.role(key)?;
            }
            if let Condition::Filled(key) = &phase.when {
                self.role(key)?;
            }
            check_minutes(&format!("phase '{}'", phase.event), phase.minutes)?;
            if let Some(cards) = &phase.cards {
                check_cards(&format!("phase '{}'", phase.event), cards)?;
            }
        }

        Ok(())
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates all settings
    /// - Expands ~ in paths
    /// - Creates the output directory if it doesn't exist
    fn validate_and_process(&mut self) -> Result<(), AgendaError> {
        self.validate()?;

        self.core.roster_path = expand_path(&self.core.roster_path)?;
        self.core.output_dir = expand_path(&self.core.output_dir)?;

        if !self.core.output_dir.exists() {
            fs::create_dir_all(&self.core.output_dir).map_err(|e| {
                AgendaError::Config(format!("Failed to create output directory: {}", e))
            })?;
        }

        Ok(())
    }
}

fn check_minutes(name: &str, minutes: f64) -> Result<(), AgendaError> {
    if !(0.0..=MAX_ITEM_MINUTES).contains(&minutes) {
        return Err(AgendaError::Config(format!(
            "{} must be between 0 and {} minutes",
            name, MAX_ITEM_MINUTES
        )));
    }
    Ok(())
}

fn check_cards(name: &str, cards: &str) -> Result<(), AgendaError> {
    if sdk::types::CardThresholds::parse_triplet(cards).is_none() {
        return Err(AgendaError::Config(format!(
            "{}: cards '{}' must look like \"green/yellow/red\"",
            name, cards
        )));
    }
    Ok(())
}

/// Expand ~ in path to user's home directory
///
/// # Examples
///
/// ```ignore
/// let path = PathBuf::from("~/.agenda/roster.json");
/// let expanded = expand_path(&path)?;
/// // expanded is now /home/user/.agenda/roster.json (on Unix)
/// ```
fn expand_path(path: &Path) -> Result<PathBuf, AgendaError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| AgendaError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
