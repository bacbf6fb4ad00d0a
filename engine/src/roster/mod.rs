//! Member roster
//!
//! The roster owns every `RosterEntry`. It resolves free-text names from a
//! call-role to members, records the roles they take and advances speakers
//! along their curriculum track.
//!
//! # Name Resolution
//!
//! A name resolves to the first member (in roster order) whose English name,
//! Chinese name or any alias starts with it, ignoring case. A blank name
//! resolves to the shared "TBD" placeholder, which is never stored. A name
//! nobody matches creates a shadow entry that is kept and persisted.
//!
//! # Persistence
//!
//! The roster is read and written as a whole JSON file; the last write wins.

use sdk::errors::AgendaError;
use sdk::types::{Language, RoleKind, RoleRecord, SpeechRecord, Track};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::curriculum::CurriculumTrack;

pub mod entry;

pub use entry::{MemberRecord, RosterEntry, TBD};

/// Snapshot of the member who took a role, kept by the meeting plan
#[derive(Debug, Clone, PartialEq)]
pub struct Assignee {
    pub english_name: String,
    pub chinese_name: String,
    /// Member's level right after the assignment
    pub level: String,
    pub placeholder: bool,
}

impl Assignee {
    pub fn from_entry(entry: &RosterEntry) -> Self {
        Self {
            english_name: entry.english_name().to_string(),
            chinese_name: entry.chinese_name().to_string(),
            level: entry.current_level().to_string(),
            placeholder: entry.is_placeholder(),
        }
    }

    /// Unassigned role
    pub fn tbd() -> Self {
        Self::from_entry(&RosterEntry::placeholder())
    }

    pub fn display_name(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english_name,
            Language::Chinese => &self.chinese_name,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Per-member progress summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStats {
    pub english_name: String,
    pub chinese_name: String,
    pub current_level: String,
    pub track: Option<Track>,
    pub speeches: usize,
    pub roles: usize,
    pub last_speech: Option<String>,
    pub last_role: Option<String>,
}

/// The collection of all members
#[derive(Debug, Clone)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    curriculum: CurriculumTrack,
    placeholder: RosterEntry,
}

impl Roster {
    /// Create an empty roster
    pub fn new(curriculum: CurriculumTrack) -> Self {
        Self {
            entries: Vec::new(),
            curriculum,
            placeholder: RosterEntry::placeholder(),
        }
    }

    /// Build a roster from persisted member records
    pub fn from_records(records: Vec<MemberRecord>, curriculum: CurriculumTrack) -> Self {
        let entries = records
            .into_iter()
            .map(|record| RosterEntry::from_record(record, &curriculum))
            .collect();

        Self {
            entries,
            curriculum,
            placeholder: RosterEntry::placeholder(),
        }
    }

    /// Load the roster file at `path`; a missing file yields an empty roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path, curriculum: CurriculumTrack) -> Result<Self, AgendaError> {
        if !path.exists() {
            info!("No roster at {}, starting empty", path.display());
            return Ok(Self::new(curriculum));
        }

        let contents = fs::read_to_string(path)?;
        let records: Vec<MemberRecord> = serde_json::from_str(&contents).map_err(|e| {
            AgendaError::Roster(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        info!("Loaded {} members from {}", records.len(), path.display());
        Ok(Self::from_records(records, curriculum))
    }

    /// Persisted form of every member, in roster order
    pub fn to_records(&self) -> Vec<MemberRecord> {
        self.entries.iter().map(RosterEntry::to_record).collect()
    }

    /// Overwrite `path` with the whole roster as pretty JSON
    pub fn dump(&self, path: &Path) -> Result<(), AgendaError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.to_records())?;
        fs::write(path, json)?;

        info!("Wrote {} members to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn curriculum(&self) -> &CurriculumTrack {
        &self.curriculum
    }

    /// Find a member without creating one
    pub fn find(&self, name: &str) -> Option<&RosterEntry> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| entry.matches_prefix(&query))
    }

    /// Index of the member `name` resolves to, creating a shadow entry when
    /// nobody matches; `None` for a blank name.
    fn resolve_index(&mut self, name: &str) -> Option<usize> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let query = name.to_lowercase();
        if let Some(index) = self.entries.iter().position(|e| e.matches_prefix(&query)) {
            debug!(
                "Resolved '{}' to {}",
                name,
                self.entries[index].english_name()
            );
            return Some(index);
        }

        warn!("No member matches '{}', adding a new roster entry", name);
        self.entries.push(RosterEntry::shadow(name));
        Some(self.entries.len() - 1)
    }

    /// Resolve a free-text name to a member.
    ///
    /// Blank names give the TBD placeholder; unknown names create a shadow entry.
    pub fn resolve(&mut self, name: &str) -> &RosterEntry {
        match self.resolve_index(name) {
            Some(index) => &self.entries[index],
            None => &self.placeholder,
        }
    }

    /// Resolve `name` and record that they take a role of `kind` on `date`.
    ///
    /// - Speakers get a speech record at their next curriculum level.
    /// - Non-recorded roles leave the history untouched.
    /// - Every other role gets a role record.
    ///
    /// The TBD placeholder is returned unchanged for blank names.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::CurriculumExhausted` when a speaker has no next level.
    pub fn assign_role(
        &mut self,
        name: &str,
        kind: &RoleKind,
        date: &str,
        topic: Option<&str>,
    ) -> Result<&RosterEntry, AgendaError> {
        let Some(index) = self.resolve_index(name) else {
            return Ok(&self.placeholder);
        };

        match kind {
            RoleKind::Speaker(slot) => {
                let (track, level) = self
                    .curriculum
                    .next_level(self.entries[index].current_level())?;
                debug!(
                    "Speaker {} {} advances to {} ({})",
                    slot,
                    self.entries[index].english_name(),
                    level,
                    track
                );
                self.entries[index].append_speech(SpeechRecord {
                    level,
                    date: date.to_string(),
                    topic: topic.unwrap_or_default().to_string(),
                    track,
                });
            }
            RoleKind::NonRecorded(role) => {
                debug!(
                    "{} takes untracked role {}",
                    self.entries[index].english_name(),
                    role
                );
            }
            RoleKind::Evaluator(_) | RoleKind::Functionary(_) => {
                let role = kind.record_name().unwrap_or_default().to_string();
                self.entries[index].append_role(RoleRecord {
                    role,
                    date: date.to_string(),
                    topic: topic.filter(|t| !t.is_empty()).map(str::to_string),
                });
            }
        }

        Ok(&self.entries[index])
    }

    /// Drop every record dated on or after `cutoff` so a meeting can be regenerated.
    pub fn clear_records(&mut self, cutoff: &str) {
        for entry in &mut self.entries {
            entry.clear_records(cutoff);
        }
        debug!("Cleared roster records from {}", cutoff);
    }

    /// Progress summary for every member
    pub fn stats(&self) -> Vec<MemberStats> {
        self.entries
            .iter()
            .map(|entry| MemberStats {
                english_name: entry.english_name().to_string(),
                chinese_name: entry.chinese_name().to_string(),
                current_level: entry.current_level().to_string(),
                track: entry.current_track(),
                speeches: entry.speech_history().len(),
                roles: entry.role_history().len(),
                last_speech: entry.speech_history().last().map(|s| s.date.clone()),
                last_role: entry.role_history().last().map(|r| r.date.clone()),
            })
            .collect()
    }
}
