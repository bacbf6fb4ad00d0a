//! End-to-end tests for meeting planning
//!
//! These tests drive a call-role through parsing, roster updates and
//! session assembly, and check the resulting agenda timeline.

use agenda_engine::config::Config;
use agenda_engine::handlers::run_meeting;
use agenda_engine::meeting::{parse_call_role, MeetingFields, MeetingPlan, PlanState};
use agenda_engine::roster::{MemberRecord, Roster};
use agenda_engine::session::Session;
use chrono::NaiveDate;
use sdk::errors::AgendaError;

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

fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 11, 4)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn events(session: &Session) -> Vec<&str> {
    session.rows.iter().map(|r| r.event_title.as_str()).collect()
}

#[test]
fn test_speaker_row_and_level_advance() {
    let config = config();
    let records: Vec<MemberRecord> = serde_json::from_str(
        r#"[{"English Name": "Alice", "Chinese Name": "爱丽丝", "Current Level": "Level 1",
             "Role Records": [], "Speech Records": []}]"#,
    )
    .unwrap();
    let mut roster = Roster::from_records(records, config.curriculum().unwrap());

    let fields = fields(&[("SP1", "Alice"), ("SP1 Topic", "X"), ("Theme", "Growth")]);
    let plan = run_meeting(&config, &fields, &mut roster).unwrap();

    let prepared = &plan.sessions()[1];
    assert_eq!(prepared.title.as_deref(), Some("Prepared Speech Session"));
    let speech = prepared
        .rows
        .iter()
        .find(|r| r.role_label.starts_with("Speaker"))
        .unwrap();
    assert_eq!(speech.assignee, "Alice");
    assert_eq!(speech.event_title, "X");
    assert_eq!(speech.display_duration, "5-7");

    let alice = roster.find("Alice").unwrap();
    assert_eq!(alice.current_level(), "Level 2");
    assert_eq!(alice.last_speech_topic(), Some("X"));
    assert_eq!(plan.theme(), Some("Growth"));
}

#[test]
fn test_opening_fixed_phases_from_base_clock() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let fields = fields(&[("SAA", "Sam"), ("Toastmaster", "Ann"), ("Timer", "Kay")]);

    let plan = run_meeting(&config, &fields, &mut roster).unwrap();
    let sessions = plan.sessions();
    let opening = &sessions[0];

    assert_eq!(opening.starts_at, at(18, 45));
    assert_eq!(opening.ends_at, at(19, 16));
    assert_eq!(
        events(opening),
        [
            "Registration/Greeting",
            "Meeting Opening",
            "Welcome Guests",
            "Introduction of Evaluation Team",
            "Timer Guidelines"
        ]
    );
    assert_eq!(opening.rows[0].assignee, "Sam");
    assert_eq!(opening.rows[0].clock, "06:45 PM");
    // GE unfilled: the Toastmaster introduces the evaluation team
    assert_eq!(opening.rows[3].assignee, "Ann");
    assert_eq!(opening.rows[3].role_label, "Toastmaster");

    // No speakers: table topics follow the opening directly
    assert_eq!(sessions[1].title.as_deref(), Some("Table Topic Session"));
    assert_eq!(sessions[1].starts_at, opening.ends_at);
}

#[test]
fn test_sessions_share_one_timeline() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let fields = fields(&[
        ("Toastmaster", "Ann"),
        ("GE", "Gus"),
        ("SP1", "Alice"),
        ("SP2", "Bob"),
        ("IE1", "Ivy"),
        ("TTM", "Tina"),
    ]);

    let plan = run_meeting(&config, &fields, &mut roster).unwrap();
    let sessions = plan.sessions();
    assert_eq!(sessions.len(), 4);
    for pair in sessions.windows(2) {
        assert_eq!(pair[1].starts_at, pair[0].ends_at);
    }

    // GE filled: the hand-back appears and GE introduces the team
    assert!(events(&sessions[0]).contains(&"Return Control to Toastmaster"));

    let prepared = &sessions[1];
    let labels: Vec<&str> = prepared.rows.iter().map(|r| r.role_label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "Toastmaster",
            "Speaker 1",
            "Toastmaster",
            "Speaker 2",
            "Individual Evaluator 1",
            "Individual Evaluator 2"
        ]
    );
    assert_eq!(prepared.rows[4].assignee, "Ivy");
    assert_eq!(prepared.rows[5].assignee, "TBD");
    assert_eq!(prepared.rows[4].minutes, 3.0);

    // Round table without a Table-Topic-Evaluator
    assert_eq!(events(&sessions[2])[0], "Round Table Topics");
}

#[test]
fn test_unfilled_optional_rows_are_dropped_and_mandatory_show_tbd() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let plan = run_meeting(&config, &fields(&[("Toastmaster", "Ann")]), &mut roster).unwrap();

    let evaluation = plan.sessions().last().unwrap();
    let titles = events(evaluation);
    assert!(!titles.contains(&"Ah-Counter Report"));
    assert!(!titles.contains(&"General Evaluation"));
    assert!(!titles.contains(&"New Member Induction"));

    let timer = evaluation
        .rows
        .iter()
        .find(|r| r.event_title == "Timer Report")
        .unwrap();
    assert_eq!(timer.assignee, "TBD");
}

#[test]
fn test_skip_list_removes_rows_everywhere() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let mut fields = fields(&[("Toastmaster", "Ann"), ("Timer", "Kay"), ("SP1", "Alice")]);
    fields.skips = vec!["timer guidelines".to_string(), "TIMER REPORT".to_string()];

    let plan = run_meeting(&config, &fields, &mut roster).unwrap();
    for session in plan.sessions() {
        for row in &session.rows {
            assert!(!row.event_title.eq_ignore_ascii_case("Timer Guidelines"));
            assert!(!row.event_title.eq_ignore_ascii_case("Timer Report"));
        }
    }
    // Skipped rows do not take time
    assert_eq!(plan.sessions()[0].ends_at, at(19, 15));
}

#[test]
fn test_table_topics_toggle_off() {
    let mut config = config();
    config.agenda.table_topics = false;
    let mut roster = Roster::new(config.curriculum().unwrap());

    let plan = run_meeting(&config, &fields(&[("SP1", "Alice")]), &mut roster).unwrap();
    let titles: Vec<Option<&str>> = plan.sessions().iter().map(|s| s.title.as_deref()).collect();
    assert_eq!(
        titles,
        [None, Some("Prepared Speech Session"), Some("Evaluation Session")]
    );
}

#[test]
fn test_prepared_special_event_follows_last_speech() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let fields = fields(&[
        ("SP1", "Alice"),
        ("SE_SP role", "Debate"),
        ("SE_SP role taker", "Dee"),
        ("SE_SP topic", "Remote Work"),
    ]);

    let plan = run_meeting(&config, &fields, &mut roster).unwrap();
    let prepared = &plan.sessions()[1];
    assert_eq!(
        events(prepared),
        ["Speaker Introduction", "Level 1", "Remote Work", "Evaluation of Speaker 1"]
    );
    assert_eq!(prepared.rows[2].role_label, "Debate");
    assert_eq!(prepared.rows[2].minutes, 7.0);
    assert_eq!(
        roster.find("Dee").unwrap().role_history()[0].role,
        "Debate"
    );
}

#[test]
fn test_call_role_text_end_to_end() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let text = "\
Call Role
11/4 (English)
Theme: Growth
TMoD: Ann
Timer: Kay
SP1: Alice
SP1 Topic: Icebreaker
SP1 Duration: 5
IE1: Ivy
skip: Word of the Day
";
    let meetings = parse_call_role(text);
    assert_eq!(meetings.len(), 1);

    let plan = run_meeting(&config, &meetings[0], &mut roster).unwrap();
    let speech = &plan.sessions()[1].rows[1];
    assert_eq!(speech.event_title, "Icebreaker");
    assert_eq!(speech.minutes, 5.0);
    assert_eq!(speech.display_duration, "3-5");

    let ann = roster.find("Ann").unwrap();
    assert_eq!(ann.role_history()[0].role, "Toastmaster");
    assert_eq!(ann.role_history()[0].topic.as_deref(), Some("Growth"));
    assert_eq!(roster.find("Ivy").unwrap().role_history()[0].role, "IE");
}

#[test]
fn test_undated_meeting_is_rejected() {
    let config = config();
    let mut roster = Roster::new(config.curriculum().unwrap());
    let mut plan = MeetingPlan::new(&config);

    let err = plan
        .parse(&MeetingFields::default(), &mut roster)
        .unwrap_err();
    assert!(matches!(err, AgendaError::MissingMeetingDate));
    assert_eq!(plan.state(), PlanState::Created);
    assert!(roster.is_empty());
}

#[test]
fn test_undeclared_role_is_fatal() {
    let mut config = config();
    config.roles.retain(|r| r.key != "TTE");
    let mut roster = Roster::new(config.curriculum().unwrap());

    let err = run_meeting(&config, &fields(&[("Toastmaster", "Ann")]), &mut roster).unwrap_err();
    assert!(matches!(err, AgendaError::UnknownRole(ref key) if key == "TTE"));
    assert!(err.is_configuration_error());
}
