//! Meeting plan
//!
//! `MeetingPlan` turns one meeting's call-role fields into an ordered list of
//! timed sessions. It moves strictly forward through its states:
//!
//! ```text
//! Created -> InfoParsed -> SessionsBuilt -> Rendered
//! ```
//!
//! - `parse` resolves every speaker, evaluator and functionary through the
//!   roster, recording the roles they take on the meeting date.
//! - `assemble` lays out opening, prepared speeches, table topics and
//!   evaluation on a single running clock; each session starts where the
//!   previous one ended.

use chrono::{NaiveDate, NaiveDateTime};
use sdk::errors::AgendaError;
use sdk::types::{CardThresholds, Language, RoleKind};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::{Config, RoleConfig};
use crate::roster::{Assignee, Roster};
use crate::session::{AgendaItem, Session, SessionBuilder};

pub mod fields;
pub mod phases;

pub use fields::{parse_call_role, MeetingFields};
pub use phases::{Condition, Phase};

/// Speech length used when no timing entry matches
const DEFAULT_SPEECH_MINUTES: f64 = 7.0;

/// Special-event prefixes read from the call-role
pub const SPECIAL_EVENTS: [&str; 2] = ["SE_SP", "SE_TE"];

/// Special event placed after the last prepared speech
const PREPARED_SPECIAL_EVENT: &str = "SE_SP";

/// Longest duration accepted from a call-role: one day
pub const MAX_ITEM_MINUTES: f64 = 24.0 * 60.0;

// Roles the built-in sessions refer to directly
pub const TOASTMASTER: &str = "Toastmaster";
pub const TABLE_TOPIC_MASTER: &str = "TTM";
pub const TABLE_TOPIC_EVALUATOR: &str = "TTE";

/// Construction state of a meeting plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    Created,
    InfoParsed,
    SessionsBuilt,
    Rendered,
}

impl PlanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanState::Created => "created",
            PlanState::InfoParsed => "info-parsed",
            PlanState::SessionsBuilt => "sessions-built",
            PlanState::Rendered => "rendered",
        }
    }
}

/// A prepared speech
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerSlot {
    /// 1-based slot number from `SP{n}`
    pub index: usize,
    pub speaker: Assignee,
    pub topic: String,
    /// `SP{n} Duration`, overriding the level timing table
    pub duration_override: Option<f64>,
}

/// A one-off event declared with `SE_SP ...` or `SE_TE ...` fields
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialEvent {
    pub role: String,
    pub taker: Assignee,
    pub topic: String,
    pub minutes: Option<f64>,
    pub cards: Option<CardThresholds>,
}

/// One meeting occurrence
#[derive(Debug)]
pub struct MeetingPlan<'a> {
    config: &'a Config,
    state: PlanState,
    date: Option<NaiveDate>,
    date_key: String,
    language: Language,
    theme: Option<String>,
    speakers: Vec<SpeakerSlot>,
    evaluators: BTreeMap<usize, Assignee>,
    functionaries: BTreeMap<String, Assignee>,
    new_members: u32,
    skips: Vec<String>,
    special_events: BTreeMap<String, SpecialEvent>,
    sessions: Vec<Session>,
}

/// Parse a minute count, logging and ignoring malformed values
fn parse_minutes(field: &str, raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(minutes) if (0.0..=MAX_ITEM_MINUTES).contains(&minutes) => Some(minutes),
        _ => {
            warn!("Ignoring {} '{}': not a number of minutes", field, raw);
            None
        }
    }
}

/// Taker name for `role`: its own field, then alias fields, then the configured default.
fn lookup_taker<'f>(fields: &'f MeetingFields, role: &'f RoleConfig) -> Option<&'f str> {
    std::iter::once(role.key.as_str())
        .chain(role.aliases.iter().map(String::as_str))
        .find_map(|key| fields.get(key))
        .or_else(|| {
            role.default_taker
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
        })
}

impl<'a> MeetingPlan<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            state: PlanState::Created,
            date: None,
            date_key: String::new(),
            language: Language::default(),
            theme: None,
            speakers: Vec::new(),
            evaluators: BTreeMap::new(),
            functionaries: BTreeMap::new(),
            new_members: 0,
            skips: Vec::new(),
            special_events: BTreeMap::new(),
            sessions: Vec::new(),
        }
    }

    fn expect_state(&self, expected: PlanState) -> Result<(), AgendaError> {
        if self.state != expected {
            return Err(AgendaError::InvalidState {
                expected: expected.as_str(),
                found: self.state.as_str(),
            });
        }
        Ok(())
    }

    /// Resolve every role in `fields` through `roster` and record it on the meeting date.
    ///
    /// # Errors
    ///
    /// - `AgendaError::MissingMeetingDate` / `InvalidInput` for an undated meeting
    /// - `AgendaError::CurriculumExhausted` when a speaker has no next level
    pub fn parse(&mut self, fields: &MeetingFields, roster: &mut Roster) -> Result<(), AgendaError> {
        self.expect_state(PlanState::Created)?;

        let date = fields.date(self.config.meeting_year())?;
        let date_key = date.format("%Y%m%d").to_string();

        self.language = fields.language;
        self.theme = fields.get("Theme").map(str::to_string);
        self.skips = fields.skips.clone();

        // Speakers
        for index in 1..=self.config.core.speaker_slots {
            let Some(name) = fields.get(&format!("SP{}", index)) else {
                continue;
            };
            let topic = fields
                .get(&format!("SP{} Topic", index))
                .unwrap_or_default()
                .to_string();
            let duration_key = format!("SP{} Duration", index);
            let duration_override = fields
                .get(&duration_key)
                .and_then(|raw| parse_minutes(&duration_key, raw));

            let entry = roster.assign_role(
                name,
                &RoleKind::Speaker(index),
                &date_key,
                Some(topic.as_str()),
            )?;
            self.speakers.push(SpeakerSlot {
                index,
                speaker: Assignee::from_entry(entry),
                topic,
                duration_override,
            });
        }

        // Individual evaluators
        for index in 1..=self.config.core.speaker_slots {
            let Some(name) = fields.get(&format!("IE{}", index)) else {
                continue;
            };
            let entry = roster.assign_role(name, &RoleKind::Evaluator(index), &date_key, None)?;
            self.evaluators.insert(index, Assignee::from_entry(entry));
        }

        // Functionaries, including unfilled ones so sessions can show TBD
        for role in &self.config.roles {
            let name = lookup_taker(fields, role).unwrap_or_default();
            let kind = if role.recorded {
                RoleKind::Functionary(role.key.clone())
            } else {
                RoleKind::NonRecorded(role.key.clone())
            };
            let topic = if role.records_theme {
                self.theme.as_deref()
            } else {
                None
            };

            let entry = roster.assign_role(name, &kind, &date_key, topic)?;
            self.functionaries
                .insert(role.key.clone(), Assignee::from_entry(entry));
        }

        self.new_members = match fields.get("NM") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring NM '{}': not a member count", raw);
                0
            }),
            None => 0,
        };

        for prefix in SPECIAL_EVENTS {
            let role = fields.get(&format!("{} role", prefix));
            let taker = fields.get(&format!("{} role taker", prefix));
            if role.is_none() && taker.is_none() {
                continue;
            }

            let role = role.unwrap_or(prefix).to_string();
            let topic = fields
                .get(&format!("{} topic", prefix))
                .unwrap_or_default()
                .to_string();
            let duration_key = format!("{} duration", prefix);
            let minutes = fields
                .get(&duration_key)
                .and_then(|raw| parse_minutes(&duration_key, raw));
            let cards = fields.get(&format!("{} gyr", prefix)).and_then(|raw| {
                let cards = CardThresholds::parse_triplet(raw);
                if cards.is_none() {
                    warn!("Ignoring {} gyr '{}': expected green/yellow/red", prefix, raw);
                }
                cards
            });

            let entry = roster.assign_role(
                taker.unwrap_or_default(),
                &RoleKind::Functionary(role.clone()),
                &date_key,
                Some(topic.as_str()),
            )?;
            debug!("Special event {}: {} by {}", prefix, role, entry.english_name());
            self.special_events.insert(
                prefix.to_string(),
                SpecialEvent {
                    role,
                    taker: Assignee::from_entry(entry),
                    topic,
                    minutes,
                    cards,
                },
            );
        }

        info!(
            "Parsed meeting {}: {} speakers, {} evaluators, {} new members",
            date_key,
            self.speakers.len(),
            self.evaluators.len(),
            self.new_members
        );

        self.date = Some(date);
        self.date_key = date_key;
        self.state = PlanState::InfoParsed;
        Ok(())
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    /// `YYYYMMDD` key of the meeting; empty until parsed
    pub fn date_key(&self) -> &str {
        &self.date_key
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn speakers(&self) -> &[SpeakerSlot] {
        &self.speakers
    }

    /// Who takes the configured role `key` (the TBD placeholder when nobody does).
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::UnknownRole` when `key` is not a configured role.
    pub fn taker(&self, key: &str) -> Result<&Assignee, AgendaError> {
        self.functionaries
            .get(key)
            .ok_or_else(|| AgendaError::UnknownRole(key.to_string()))
    }

    fn is_filled(&self, key: &str) -> Result<bool, AgendaError> {
        Ok(!self.taker(key)?.is_placeholder())
    }

    /// First candidate role with a taker; the last candidate otherwise.
    fn first_filled(&self, keys: &[String]) -> Result<(&'a RoleConfig, &Assignee), AgendaError> {
        let mut chosen = None;
        for key in keys {
            let role = self.config.role(key)?;
            let who = self.taker(key)?;
            chosen = Some((role, who));
            if !who.is_placeholder() {
                break;
            }
        }
        chosen.ok_or_else(|| AgendaError::Config("phase has no role".to_string()))
    }

    /// Minutes for a prepared speech: the slot override, else the last timing
    /// entry matching the speaker's new level (or `*`).
    pub fn speech_duration(&self, slot: &SpeakerSlot) -> f64 {
        if let Some(minutes) = slot.duration_override {
            return minutes;
        }
        self.level_duration(&slot.speaker.level)
    }

    fn level_duration(&self, level: &str) -> f64 {
        self.config
            .timing
            .speech
            .iter()
            .filter(|entry| entry.level == "*" || entry.level == level)
            .last()
            .map_or(DEFAULT_SPEECH_MINUTES, |entry| entry.minutes)
    }

    fn session(&self, base: NaiveDateTime, title: &Option<String>) -> SessionBuilder {
        SessionBuilder::new(base, title.clone()).with_skip_list(&self.skips)
    }

    fn item(&self, minutes: f64, label: &str, event: &str, who: &Assignee) -> AgendaItem {
        AgendaItem::new(minutes, label, event, who.display_name(self.language))
            .unassigned(who.is_placeholder())
    }

    fn special_item(&self, event: &SpecialEvent, fallback_title: &str, minutes: f64) -> AgendaItem {
        let title = if event.topic.is_empty() {
            fallback_title
        } else {
            event.topic.as_str()
        };
        self.item(
            event.minutes.unwrap_or(minutes),
            &event.role,
            title,
            &event.taker,
        )
        .cards(event.cards.clone())
        .allow_unassigned(true)
    }

    /// Lay out a configured phase list
    fn build_phases(
        &self,
        base: NaiveDateTime,
        title: &Option<String>,
        phases: &[Phase],
    ) -> Result<Session, AgendaError> {
        let mut builder = self.session(base, title);

        for phase in phases {
            let mut minutes = phase.minutes;
            match &phase.when {
                Condition::Always => {}
                Condition::Filled(key) => {
                    if !self.is_filled(key)? {
                        continue;
                    }
                }
                Condition::NewMembers => {
                    if self.new_members == 0 {
                        continue;
                    }
                    minutes *= f64::from(self.new_members);
                }
                Condition::SpecialEvent(prefix) => {
                    if let Some(event) = self.special_events.get(prefix) {
                        let item = self
                            .special_item(event, &phase.event, phase.minutes)
                            .cards(
                                event
                                    .cards
                                    .clone()
                                    .or_else(|| phase_cards(phase)),
                            );
                        builder.append(item)?;
                    }
                    continue;
                }
            }

            let (role, who) = self.first_filled(&phase.role)?;
            let item = self
                .item(minutes, &role.label, &phase.event, who)
                .show_duration(phase.show_duration)
                .cards(phase_cards(phase))
                .allow_unassigned(phase.mandatory);
            builder.append(item)?;
        }

        Ok(builder.finish())
    }

    /// Registration through the hand-back to the Toastmaster
    pub fn build_opening(&self, base: NaiveDateTime) -> Result<Session, AgendaError> {
        let agenda = &self.config.agenda;
        self.build_phases(base, &agenda.titles.opening, &agenda.opening)
    }

    /// Table topics with a separate evaluation when a Table-Topic-Evaluator is
    /// assigned, a longer round table otherwise.
    pub fn build_table_topics(&self, start: NaiveDateTime) -> Result<Session, AgendaError> {
        let timing = &self.config.timing;
        let cards = CardThresholds::parse_triplet(&timing.table_topics_cards);
        let ttm_role = self.config.role(TABLE_TOPIC_MASTER)?;
        let ttm = self.taker(TABLE_TOPIC_MASTER)?;
        let tte_role = self.config.role(TABLE_TOPIC_EVALUATOR)?;
        let tte = self.taker(TABLE_TOPIC_EVALUATOR)?;

        let mut builder = self.session(start, &self.config.agenda.titles.table_topics);

        if tte.is_placeholder() {
            builder.append(
                self.item(
                    timing.round_table_minutes,
                    &ttm_role.label,
                    "Round Table Topics",
                    ttm,
                )
                .cards(cards)
                .allow_unassigned(true),
            )?;
        } else {
            builder.append(
                self.item(
                    timing.table_topics_minutes,
                    &ttm_role.label,
                    "Theme Introduction & Table Topic Session",
                    ttm,
                )
                .cards(cards)
                .allow_unassigned(true),
            )?;
            builder.append(self.item(
                timing.table_topics_evaluation_minutes,
                &tte_role.label,
                "Table Topic Evaluation",
                tte,
            ))?;
        }

        builder.append(
            self.item(
                timing.intro_minutes,
                &ttm_role.label,
                "Return Control to Toastmaster",
                ttm,
            )
            .allow_unassigned(true),
        )?;

        Ok(builder.finish())
    }

    /// Introduction and speech per speaker, the prepared special event, then
    /// one individual evaluation per speaker.
    pub fn build_prepared(&self, start: NaiveDateTime) -> Result<Session, AgendaError> {
        let timing = &self.config.timing;
        let toastmaster_role = self.config.role(TOASTMASTER)?;
        let toastmaster = self.taker(TOASTMASTER)?;
        let tbd = Assignee::tbd();

        let mut builder = self.session(start, &self.config.agenda.titles.prepared);

        for slot in &self.speakers {
            builder.append(
                self.item(
                    timing.intro_minutes,
                    &toastmaster_role.label,
                    "Speaker Introduction",
                    toastmaster,
                )
                .allow_unassigned(true),
            )?;

            let title = if slot.topic.is_empty() {
                slot.speaker.level.as_str()
            } else {
                slot.topic.as_str()
            };
            builder.append(
                self.item(
                    self.speech_duration(slot),
                    &format!("Speaker {}", slot.index),
                    title,
                    &slot.speaker,
                )
                .allow_unassigned(true),
            )?;
        }

        if let Some(event) = self.special_events.get(PREPARED_SPECIAL_EVENT) {
            builder.append(self.special_item(event, "Special Speech", self.level_duration("*")))?;
        }

        for slot in &self.speakers {
            let evaluator = self.evaluators.get(&slot.index).unwrap_or(&tbd);
            builder.append(
                self.item(
                    timing.evaluation_minutes,
                    &format!("Individual Evaluator {}", slot.index),
                    &format!("Evaluation of Speaker {}", slot.index),
                    evaluator,
                )
                .allow_unassigned(true),
            )?;
        }

        Ok(builder.finish())
    }

    /// Functionary reports through the closing remarks
    pub fn build_evaluation(&self, start: NaiveDateTime) -> Result<Session, AgendaError> {
        let agenda = &self.config.agenda;
        self.build_phases(start, &agenda.titles.evaluation, &agenda.evaluation)
    }

    /// Lay out the whole meeting on one timeline.
    ///
    /// Order: opening, prepared speeches (when anyone speaks), table topics
    /// (when enabled), evaluation.
    pub fn assemble(&mut self) -> Result<&[Session], AgendaError> {
        self.expect_state(PlanState::InfoParsed)?;

        let date = self.date.ok_or(AgendaError::MissingMeetingDate)?;
        let base = date.and_time(self.config.start_time()?);

        let mut sessions = Vec::new();

        let opening = self.build_opening(base)?;
        let mut clock = opening.ends_at;
        sessions.push(opening);

        if !self.speakers.is_empty() {
            let prepared = self.build_prepared(clock)?;
            clock = prepared.ends_at;
            sessions.push(prepared);
        }

        if self.config.agenda.table_topics {
            let table_topics = self.build_table_topics(clock)?;
            clock = table_topics.ends_at;
            sessions.push(table_topics);
        }

        sessions.push(self.build_evaluation(clock)?);

        info!(
            "Assembled meeting {}: {} sessions, {} rows",
            self.date_key,
            sessions.len(),
            sessions.iter().map(|s| s.rows.len()).sum::<usize>()
        );

        self.sessions = sessions;
        self.state = PlanState::SessionsBuilt;
        Ok(&self.sessions)
    }

    /// Mark the sessions as handed to a renderer
    pub fn mark_rendered(&mut self) -> Result<(), AgendaError> {
        self.expect_state(PlanState::SessionsBuilt)?;
        self.state = PlanState::Rendered;
        Ok(())
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }
}

fn phase_cards(phase: &Phase) -> Option<CardThresholds> {
    phase
        .cards
        .as_deref()
        .and_then(CardThresholds::parse_triplet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::NOT_STARTED;

    fn config() -> Config {
        let mut config = Config::default();
        config.core.year = Some(2020);
        config
    }

    fn fields(pairs: &[(&str, &str)]) -> MeetingFields {
        let mut fields = MeetingFields::default();
        fields.set_date(11, 4);
        for (key, value) in pairs {
            fields.insert(*key, *value);
        }
        fields
    }

    fn roster(config: &Config) -> Roster {
        Roster::new(config.curriculum().unwrap())
    }

    #[test]
    fn test_state_machine_order() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);

        assert!(matches!(
            plan.assemble(),
            Err(AgendaError::InvalidState { expected: "info-parsed", found: "created" })
        ));

        plan.parse(&fields(&[("Toastmaster", "Ann")]), &mut roster)
            .unwrap();
        assert!(plan.parse(&fields(&[]), &mut roster).is_err());

        plan.assemble().unwrap();
        plan.mark_rendered().unwrap();
        assert_eq!(plan.state(), PlanState::Rendered);
    }

    #[test]
    fn test_taker_fallback_chain() {
        let mut config = config();
        config.roles[5].default_taker = Some("Kay".to_string()); // Timer
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);

        plan.parse(&fields(&[("TMoD", "Ann"), ("GE", "")]), &mut roster)
            .unwrap();

        assert_eq!(plan.taker("Toastmaster").unwrap().english_name, "Ann");
        assert_eq!(plan.taker("Timer").unwrap().english_name, "Kay");
        assert!(plan.taker("GE").unwrap().is_placeholder());
        assert!(matches!(plan.taker("Chair"), Err(AgendaError::UnknownRole(_))));
    }

    #[test]
    fn test_speech_duration_last_match_wins() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(
            &fields(&[("SP1", "Alice"), ("SP2", "Bob"), ("SP2 Duration", "12")]),
            &mut roster,
        )
        .unwrap();

        // NotStarted -> Level 1
        let slots = plan.speakers();
        assert_eq!(slots[0].speaker.level, "Level 1");
        assert_eq!(plan.speech_duration(&slots[0]), 6.0);
        assert_eq!(plan.speech_duration(&slots[1]), 12.0);
        assert_eq!(roster.find("Alice").unwrap().current_level(), "Level 1");
        assert_ne!(roster.find("Alice").unwrap().current_level(), NOT_STARTED);
    }

    #[test]
    fn test_table_topics_with_evaluator() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(&fields(&[("TTM", "Ann"), ("TTE", "Bo")]), &mut roster)
            .unwrap();

        let base = NaiveDate::from_ymd_opt(2020, 11, 4)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        let session = plan.build_table_topics(base).unwrap();
        let events: Vec<_> = session.rows.iter().map(|r| r.event_title.as_str()).collect();
        assert_eq!(
            events,
            [
                "Theme Introduction & Table Topic Session",
                "Table Topic Evaluation",
                "Return Control to Toastmaster"
            ]
        );
        assert_eq!(session.rows[0].cards, CardThresholds::new("1", "1.5", "2"));
        assert_eq!(session.rows[0].display_duration, "20");
    }

    #[test]
    fn test_round_table_without_evaluator() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(&fields(&[("TTM", "Ann")]), &mut roster).unwrap();

        let base = NaiveDate::from_ymd_opt(2020, 11, 4)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        let session = plan.build_table_topics(base).unwrap();
        assert_eq!(session.rows.len(), 2);
        assert_eq!(session.rows[0].event_title, "Round Table Topics");
        assert_eq!(session.rows[0].minutes, 25.0);
    }

    #[test]
    fn test_special_events_and_new_members() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(
            &fields(&[
                ("Toastmaster", "Ann"),
                ("President", "Pat"),
                ("NM", "3"),
                ("SE_TE role", "Guest Speaker"),
                ("SE_TE role taker", "Dr. Lin"),
                ("SE_TE topic", "Leadership"),
                ("SE_TE duration", "15"),
                ("SE_TE gyr", "10/12/15"),
            ]),
            &mut roster,
        )
        .unwrap();

        let sessions = plan.assemble().unwrap();
        let evaluation = sessions.last().unwrap();

        let guest = evaluation
            .rows
            .iter()
            .find(|r| r.role_label == "Guest Speaker")
            .unwrap();
        assert_eq!(guest.event_title, "Leadership");
        assert_eq!(guest.assignee, "Dr. Lin");
        assert_eq!(guest.cards, CardThresholds::new("10", "12", "15"));

        let induction = evaluation
            .rows
            .iter()
            .find(|r| r.event_title == "New Member Induction")
            .unwrap();
        assert_eq!(induction.minutes, 6.0);
        assert_eq!(induction.assignee, "Pat");
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(
            &fields(&[
                ("Toastmaster", "Ann"),
                ("President", "Pat"),
                ("SP1", "Alice"),
                ("SP1 Duration", "abc"),
                ("NM", "many"),
                ("SE_TE role", "Guest Speaker"),
                ("SE_TE role taker", "Dr. Lin"),
                ("SE_TE duration", "15"),
                ("SE_TE gyr", "1-2"),
            ]),
            &mut roster,
        )
        .unwrap();

        // Level table duration for Level 1
        assert_eq!(plan.speakers()[0].duration_override, None);
        assert_eq!(plan.speech_duration(&plan.speakers()[0]), 6.0);

        let sessions = plan.assemble().unwrap();
        let evaluation = sessions.last().unwrap();
        assert!(evaluation
            .rows
            .iter()
            .all(|r| r.event_title != "New Member Induction"));

        // Band cards for a 15 minute slot
        let guest = evaluation
            .rows
            .iter()
            .find(|r| r.role_label == "Guest Speaker")
            .unwrap();
        assert_eq!(guest.minutes, 15.0);
        assert_eq!(guest.cards, CardThresholds::new("13", "14", "15"));
        assert_eq!(guest.display_duration, "13-15");
    }

    #[test]
    fn test_oversized_durations_are_ignored() {
        let config = config();
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(
            &fields(&[
                ("Toastmaster", "Ann"),
                ("SP1", "Alice"),
                ("SP1 Duration", "1e300"),
                ("SE_SP role", "Debate"),
                ("SE_SP role taker", "Dee"),
                ("SE_SP duration", "100000"),
            ]),
            &mut roster,
        )
        .unwrap();

        assert_eq!(plan.speakers()[0].duration_override, None);

        let sessions = plan.assemble().unwrap();
        let prepared = &sessions[1];
        let speech = prepared
            .rows
            .iter()
            .find(|r| r.role_label == "Speaker 1")
            .unwrap();
        assert_eq!(speech.minutes, 6.0);
        let debate = prepared
            .rows
            .iter()
            .find(|r| r.role_label == "Debate")
            .unwrap();
        assert_eq!(debate.minutes, 7.0);
    }

    #[test]
    fn test_clock_overflow_fails_the_meeting() {
        let mut config = config();
        config.agenda.opening[1].minutes = 1e12;
        let mut roster = roster(&config);
        let mut plan = MeetingPlan::new(&config);
        plan.parse(&fields(&[("Toastmaster", "Ann")]), &mut roster)
            .unwrap();

        let err = plan.assemble().unwrap_err();
        assert!(matches!(err, AgendaError::InvalidInput(_)));
        assert_eq!(plan.state(), PlanState::InfoParsed);
    }

    #[test]
    fn test_chinese_meeting_prints_secondary_names() {
        let config = config();
        let records = serde_json::from_str(
            r#"[{"English Name": "Elliot", "Chinese Name": "星知",
                 "Role Records": [], "Speech Records": []}]"#,
        )
        .unwrap();
        let mut roster = Roster::from_records(records, config.curriculum().unwrap());
        let mut plan = MeetingPlan::new(&config);
        let mut fields = fields(&[("Toastmaster", "Ell")]);
        fields.language = Language::Chinese;
        plan.parse(&fields, &mut roster).unwrap();

        let sessions = plan.assemble().unwrap();
        let opening = &sessions[0];
        let row = opening
            .rows
            .iter()
            .find(|r| r.event_title == "Meeting Opening")
            .unwrap();
        assert_eq!(row.assignee, "星知");
    }
}
