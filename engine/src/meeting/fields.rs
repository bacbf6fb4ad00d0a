//! Call-role parser
//!
//! A call-role is the sign-up sheet members fill in before a meeting:
//!
//! ```text
//! Call Role
//! 11/4 (English)
//! Toastmaster: Ann
//! SP1: Alice
//! SP1 Topic: Growth Mindset
//! skip: Word of the Day
//! ```
//!
//! One text may hold several meetings, each starting at a line containing
//! `Call Role`. Every `Label: value` line becomes a field; the `M/D` line
//! (optionally tagged with the meeting language) dates the meeting. Lines that
//! fit neither shape are skipped.

use chrono::NaiveDate;
use regex::Regex;
use sdk::errors::AgendaError;
use sdk::types::Language;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Marker line that starts a new meeting
const MEETING_MARKER: &str = "Call Role";

/// Field key for skip directives
const SKIP_KEY: &str = "skip";

fn date_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})\s*(?:\(\s*(Chinese|English|中文)\s*\))?")
            .expect("Invalid regex pattern for date header")
    })
}

/// Flat fields of one meeting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingFields {
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub language: Language,
    values: BTreeMap<String, String>,
    /// Event titles to leave off the agenda, in directive order
    pub skips: Vec<String>,
}

impl MeetingFields {
    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Set the meeting date
    pub fn set_date(&mut self, month: u32, day: u32) {
        self.month = Some(month);
        self.day = Some(day);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.skips.is_empty() && self.month.is_none()
    }

    /// Meeting date in `year`.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::MissingMeetingDate` when no date header was seen
    /// and `AgendaError::InvalidInput` when month/day is not a calendar date.
    pub fn date(&self, year: i32) -> Result<NaiveDate, AgendaError> {
        let (Some(month), Some(day)) = (self.month, self.day) else {
            return Err(AgendaError::MissingMeetingDate);
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AgendaError::InvalidInput(format!("{}/{} is not a valid date in {}", month, day, year))
        })
    }

    /// `YYYYMMDD` key used for roster records and output file names
    pub fn date_key(&self, year: i32) -> Result<String, AgendaError> {
        Ok(self.date(year)?.format("%Y%m%d").to_string())
    }
}

/// Split a `Label: value` line on its first ASCII or full-width colon.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let at = line.find([':', '：'])?;
    let sep_len = line[at..].chars().next().map_or(1, char::len_utf8);
    Some((&line[..at], &line[at + sep_len..]))
}

fn clean(s: &str) -> String {
    s.trim().trim_matches('\u{fe0f}').trim().to_string()
}

/// Parse a call-role text into one `MeetingFields` per meeting.
pub fn parse_call_role(text: &str) -> Vec<MeetingFields> {
    let mut meetings = Vec::new();
    let mut current = MeetingFields::default();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains(MEETING_MARKER) {
            meetings.push(std::mem::take(&mut current));
            continue;
        }

        if let Some((label, value)) = split_field(line) {
            let label = clean(label);
            let value = clean(value);
            if label.eq_ignore_ascii_case(SKIP_KEY) {
                if !value.is_empty() {
                    current.skips.push(value);
                }
            } else if !label.is_empty() {
                current.insert(label, value);
            }
            continue;
        }

        if let Some(caps) = date_header().captures(line) {
            let month = caps[1].parse::<u32>().unwrap_or(0);
            let day = caps[2].parse::<u32>().unwrap_or(0);
            if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
                warn!("Line {}: ignoring invalid date header '{}'", number + 1, line);
                continue;
            }
            current.set_date(month, day);
            if let Some(tag) = caps.get(3) {
                current.language = Language::from_tag(tag.as_str()).unwrap_or_default();
            }
            continue;
        }

        debug!("Line {}: skipping unrecognised line '{}'", number + 1, line);
    }

    meetings.push(current);
    meetings.retain(|m| !m.is_empty());
    meetings
}
