//! Session builder
//!
//! A session is a titled block of agenda rows on a running clock. The
//! builder starts at a base time and advances the clock by each appended
//! item's duration. Items may be suppressed: an unassigned item is dropped
//! unless it allows a TBD taker, and an item whose event title is on the
//! meeting's skip list is always dropped.

use chrono::{Duration, NaiveDateTime};
use sdk::errors::AgendaError;
use sdk::types::{AgendaRow, CardThresholds};
use serde::Serialize;
use tracing::debug;

use crate::timing;

/// Clock format printed in the agenda, e.g. `06:45 PM`
pub const CLOCK_FORMAT: &str = "%I:%M %p";

/// One finished agenda block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Rendered as a header row ahead of the data rows
    pub title: Option<String>,
    pub rows: Vec<AgendaRow>,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
}

/// An item waiting to be placed on the clock
#[derive(Debug, Clone)]
pub struct AgendaItem {
    minutes: f64,
    role_label: String,
    event_title: String,
    assignee: String,
    unassigned: bool,
    show_duration: bool,
    cards: Option<CardThresholds>,
    allow_unassigned: bool,
}

impl AgendaItem {
    pub fn new(
        minutes: f64,
        role_label: impl Into<String>,
        event_title: impl Into<String>,
        assignee: impl Into<String>,
    ) -> Self {
        Self {
            minutes,
            role_label: role_label.into(),
            event_title: event_title.into(),
            assignee: assignee.into(),
            unassigned: false,
            show_duration: true,
            cards: None,
            allow_unassigned: false,
        }
    }

    /// Mark the assignee as the TBD placeholder
    pub fn unassigned(mut self, unassigned: bool) -> Self {
        self.unassigned = unassigned;
        self
    }

    pub fn show_duration(mut self, show: bool) -> Self {
        self.show_duration = show;
        self
    }

    /// Explicit cards override the duration bands
    pub fn cards(mut self, cards: Option<CardThresholds>) -> Self {
        self.cards = cards;
        self
    }

    /// Keep the row even when nobody has taken the role
    pub fn allow_unassigned(mut self, allow: bool) -> Self {
        self.allow_unassigned = allow;
        self
    }
}

/// Accumulates rows for one session
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    title: Option<String>,
    starts_at: NaiveDateTime,
    clock: NaiveDateTime,
    rows: Vec<AgendaRow>,
    /// Lowercased event titles to drop
    skip: Vec<String>,
}

impl SessionBuilder {
    pub fn new(base: NaiveDateTime, title: Option<String>) -> Self {
        Self {
            title,
            starts_at: base,
            clock: base,
            rows: Vec::new(),
            skip: Vec::new(),
        }
    }

    /// Event titles (case-insensitive) that must never produce a row
    pub fn with_skip_list(mut self, skip: &[String]) -> Self {
        self.skip = skip.iter().map(|s| s.trim().to_lowercase()).collect();
        self
    }

    fn is_skipped(&self, event_title: &str) -> bool {
        let title = event_title.trim().to_lowercase();
        self.skip.iter().any(|s| *s == title)
    }

    /// Place `item` at the current clock and advance the clock by its duration.
    ///
    /// Returns `None` without touching the clock when the item is suppressed.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::InvalidInput` when the item would run the clock
    /// past the representable date range.
    pub fn append(&mut self, item: AgendaItem) -> Result<Option<&AgendaRow>, AgendaError> {
        if item.unassigned && !item.allow_unassigned {
            debug!("Dropping '{}': no taker", item.event_title);
            return Ok(None);
        }

        if self.is_skipped(&item.event_title) {
            debug!("Dropping '{}': skipped for this meeting", item.event_title);
            return Ok(None);
        }

        // Clock only moves forward
        let seconds = (item.minutes.max(0.0) * 60.0).round() as i64;
        let next = Duration::try_seconds(seconds)
            .and_then(|step| self.clock.checked_add_signed(step))
            .ok_or_else(|| {
                AgendaError::InvalidInput(format!(
                    "'{}' lasts {} minutes, past the end of the calendar",
                    item.event_title, item.minutes
                ))
            })?;

        let timing = timing::evaluate(item.minutes, item.cards.as_ref(), item.show_duration);
        let row = AgendaRow {
            clock: self.clock.format(CLOCK_FORMAT).to_string(),
            role_label: item.role_label,
            event_title: item.event_title,
            assignee: item.assignee,
            display_duration: timing.display,
            minutes: item.minutes,
            cards: timing.cards,
        };

        self.clock = next;

        self.rows.push(row);
        Ok(self.rows.last())
    }

    /// Time the next item would start at
    pub fn current_time(&self) -> NaiveDateTime {
        self.clock
    }

    pub fn rows(&self) -> &[AgendaRow] {
        &self.rows
    }

    pub fn finish(self) -> Session {
        Session {
            title: self.title,
            rows: self.rows,
            starts_at: self.starts_at,
            ends_at: self.clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 11, 4)
            .unwrap()
            .and_hms_opt(18, 45, 0)
            .unwrap()
    }

    #[test]
    fn test_clock_advances_per_row() {
        let mut builder = SessionBuilder::new(base(), Some("Opening".to_string()));
        let row = builder
            .append(AgendaItem::new(20.0, "SAA", "Registration", "Ray").show_duration(false))
            .unwrap()
            .unwrap();
        assert_eq!(row.clock, "06:45 PM");
        assert_eq!(row.cards, CardThresholds::blank());

        let row = builder
            .append(AgendaItem::new(4.0, "Toastmaster", "Meeting Opening", "Ann"))
            .unwrap()
            .unwrap();
        assert_eq!(row.clock, "07:05 PM");
        assert_eq!(row.display_duration, "2-4");

        let session = builder.finish();
        assert_eq!(session.rows.len(), 2);
        assert_eq!(session.ends_at, base() + Duration::minutes(24));
        assert_eq!(session.title.as_deref(), Some("Opening"));
    }

    #[test]
    fn test_fractional_minutes() {
        let mut builder = SessionBuilder::new(base(), None);
        builder
            .append(AgendaItem::new(1.5, "Timer", "Guidelines", "Kay"))
            .unwrap();
        assert_eq!(builder.current_time(), base() + Duration::seconds(90));
    }

    #[test]
    fn test_unassigned_item_is_suppressed_unless_allowed() {
        let mut builder = SessionBuilder::new(base(), None);
        let dropped = builder
            .append(AgendaItem::new(2.0, "GE", "Report", "TBD").unassigned(true))
            .unwrap();
        assert!(dropped.is_none());
        assert_eq!(builder.current_time(), base());

        let kept = builder
            .append(
                AgendaItem::new(2.0, "GE", "Report", "TBD")
                    .unassigned(true)
                    .allow_unassigned(true),
            )
            .unwrap()
            .unwrap();
        assert_eq!(kept.assignee, "TBD");
    }

    #[test]
    fn test_skip_list_is_case_insensitive() {
        let mut builder =
            SessionBuilder::new(base(), None).with_skip_list(&["  word of the DAY ".to_string()]);
        assert!(builder
            .append(AgendaItem::new(1.0, "Word Smith", "Word of the Day", "Bo"))
            .unwrap()
            .is_none());
        assert!(builder
            .append(AgendaItem::new(1.0, "Timer", "Timer Guidelines", "Kay"))
            .unwrap()
            .is_some());
        assert_eq!(builder.rows().len(), 1);
    }

    #[test]
    fn test_explicit_cards() {
        let mut builder = SessionBuilder::new(base(), None);
        let cards = CardThresholds::parse_triplet("1/1.5/2");
        let row = builder
            .append(AgendaItem::new(20.0, "TTM", "Table Topics", "Ann").cards(cards.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(Some(row.cards.clone()), cards);
        assert_eq!(row.display_duration, "20");
    }

    #[test]
    fn test_clock_overflow_is_an_error() {
        let mut builder = SessionBuilder::new(base(), None);
        builder
            .append(AgendaItem::new(2.0, "Timer", "Guidelines", "Kay"))
            .unwrap();

        for minutes in [1e300, 1e12] {
            let err = builder
                .append(AgendaItem::new(minutes, "Speaker 1", "Growth", "Alice"))
                .unwrap_err();
            assert!(matches!(err, AgendaError::InvalidInput(_)));
        }

        // Failed items leave the session untouched
        assert_eq!(builder.rows().len(), 1);
        assert_eq!(builder.current_time(), base() + Duration::minutes(2));
    }
}
