//! Member records
//!
//! A `RosterEntry` is one member: their names, aliases and dated speech and
//! role histories. `MemberRecord` is the on-disk JSON shape of the same data.

use sdk::types::{Language, RoleRecord, SpeechRecord, Track};
use serde::{Deserialize, Serialize};

use crate::curriculum::{CurriculumTrack, NOT_STARTED};

/// Name printed for roles nobody has taken yet
pub const TBD: &str = "TBD";

/// Persisted member record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(rename = "English Name")]
    pub english_name: String,

    #[serde(rename = "Chinese Name", default)]
    pub chinese_name: String,

    #[serde(rename = "Nick Names", default)]
    pub nick_names: Vec<String>,

    /// Written on dump; read back only for members without speech history
    #[serde(
        rename = "Current Level",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_level: Option<String>,

    #[serde(rename = "Role Records", default)]
    pub role_records: Vec<RoleRecord>,

    #[serde(rename = "Speech Records", default)]
    pub speech_records: Vec<SpeechRecord>,
}

/// One member and their history
///
/// Both histories are kept sorted by their `YYYYMMDD` date key.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    english_name: String,
    chinese_name: String,
    nick_names: Vec<String>,
    /// Level a member joined with, used until their first recorded speech
    baseline_level: Option<String>,
    speeches: Vec<SpeechRecord>,
    roles: Vec<RoleRecord>,
    placeholder: bool,
}

impl RosterEntry {
    /// Shadow entry for a name with no prior record
    pub fn shadow(name: &str) -> Self {
        Self {
            english_name: name.to_string(),
            chinese_name: name.to_string(),
            nick_names: Vec::new(),
            baseline_level: None,
            speeches: Vec::new(),
            roles: Vec::new(),
            placeholder: false,
        }
    }

    /// The "TBD" entry standing in for an unassigned role
    pub fn placeholder() -> Self {
        Self {
            placeholder: true,
            ..Self::shadow(TBD)
        }
    }

    /// Build an entry from its persisted form, sorting histories and
    /// re-deriving each speech's track from the curriculum.
    pub fn from_record(record: MemberRecord, curriculum: &CurriculumTrack) -> Self {
        let MemberRecord {
            english_name,
            chinese_name,
            nick_names,
            current_level,
            mut role_records,
            mut speech_records,
        } = record;

        // Stable sort keeps same-day records in file order
        role_records.sort_by(|a, b| a.date.cmp(&b.date));
        speech_records.sort_by(|a, b| a.date.cmp(&b.date));

        for speech in &mut speech_records {
            if let Some(track) = curriculum.track_of(&speech.level) {
                speech.track = track;
            }
        }

        // The stored level reflects the last speech; the joining level is
        // the one preceding the first speech, or the stored level without any
        let baseline_level = match speech_records.first() {
            Some(first) => curriculum.previous_level(&first.level).map(str::to_string),
            None => current_level,
        }
        .filter(|level| level != NOT_STARTED);
        let chinese_name = if chinese_name.trim().is_empty() {
            english_name.clone()
        } else {
            chinese_name
        };

        Self {
            english_name,
            chinese_name,
            nick_names,
            baseline_level,
            speeches: speech_records,
            roles: role_records,
            placeholder: false,
        }
    }

    /// Persisted form, with the derived current level
    pub fn to_record(&self) -> MemberRecord {
        MemberRecord {
            english_name: self.english_name.clone(),
            chinese_name: self.chinese_name.clone(),
            nick_names: self.nick_names.clone(),
            current_level: Some(self.current_level().to_string()),
            role_records: self.roles.clone(),
            speech_records: self.speeches.clone(),
        }
    }

    pub fn english_name(&self) -> &str {
        &self.english_name
    }

    pub fn chinese_name(&self) -> &str {
        &self.chinese_name
    }

    pub fn nick_names(&self) -> &[String] {
        &self.nick_names
    }

    /// Primary name, secondary name, then aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [self.english_name.as_str(), self.chinese_name.as_str()]
            .into_iter()
            .chain(self.nick_names.iter().map(String::as_str))
    }

    /// Case-insensitive prefix match against any name; `query` must already be lowercase.
    pub(crate) fn matches_prefix(&self, query: &str) -> bool {
        self.names().any(|name| name.to_lowercase().starts_with(query))
    }

    /// Name printed on an agenda held in `language`
    pub fn display_name(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english_name,
            Language::Chinese => &self.chinese_name,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Level of the most recent speech, the joining level, or `NotStarted`
    pub fn current_level(&self) -> &str {
        self.speeches
            .last()
            .map(|s| s.level.as_str())
            .or(self.baseline_level.as_deref())
            .unwrap_or(NOT_STARTED)
    }

    /// Track of the most recent speech
    pub fn current_track(&self) -> Option<Track> {
        self.speeches.last().map(|s| s.track)
    }

    pub fn speech_history(&self) -> &[SpeechRecord] {
        &self.speeches
    }

    pub fn role_history(&self) -> &[RoleRecord] {
        &self.roles
    }

    pub fn last_speech_topic(&self) -> Option<&str> {
        self.speeches.last().map(|s| s.topic.as_str())
    }

    pub(crate) fn append_speech(&mut self, record: SpeechRecord) {
        let at = self.speeches.partition_point(|s| s.date <= record.date);
        self.speeches.insert(at, record);
    }

    pub(crate) fn append_role(&mut self, record: RoleRecord) {
        let at = self.roles.partition_point(|r| r.date <= record.date);
        self.roles.insert(at, record);
    }

    /// Drop every record dated on or after `cutoff` (`YYYYMMDD`).
    pub fn clear_records(&mut self, cutoff: &str) {
        self.speeches.retain(|s| s.date.as_str() < cutoff);
        self.roles.retain(|r| r.date.as_str() < cutoff);
    }
}
