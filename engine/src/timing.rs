//! Timing policy
//!
//! Maps an agenda item's duration to the text shown in the agenda's duration
//! column and to the green/yellow/red signal cards a timer holds up.
//!
//! Rules, in priority order:
//!
//! 1. Duration hidden: the duration is shown as-is and no cards are shown.
//! 2. Explicit cards: used verbatim, duration shown as-is.
//! 3. Duration bands:
//!
//! | duration        | green | yellow | red | shown as      |
//! |-----------------|-------|--------|-----|---------------|
//! | `d >= 20`       | d-5   | d-2    | d   | `d`           |
//! | `4 <= d < 20`   | d-2   | d-1    | d   | `green-red`   |
//! | `3 <= d < 4`    | d-1   | d-0.5  | d   | `d`           |
//! | `d < 3`         |       |        | d   | `d`           |

use sdk::types::CardThresholds;

/// Duration column text and signal cards for one agenda item
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub display: String,
    pub cards: CardThresholds,
}

/// Compute the displayed duration and card thresholds for an item.
pub fn evaluate(minutes: f64, explicit: Option<&CardThresholds>, show_duration: bool) -> Timing {
    let shown = format_minutes(minutes);

    if !show_duration {
        return Timing {
            display: shown,
            cards: CardThresholds::blank(),
        };
    }

    if let Some(cards) = explicit {
        return Timing {
            display: shown,
            cards: cards.clone(),
        };
    }

    let red = shown.clone();
    if minutes >= 20.0 {
        Timing {
            display: shown,
            cards: CardThresholds::new(
                format_minutes(minutes - 5.0),
                format_minutes(minutes - 2.0),
                red,
            ),
        }
    } else if minutes >= 4.0 {
        let green = format_minutes(minutes - 2.0);
        Timing {
            display: format!("{}-{}", green, red),
            cards: CardThresholds::new(green, format_minutes(minutes - 1.0), red),
        }
    } else if minutes >= 3.0 {
        Timing {
            display: shown,
            cards: CardThresholds::new(
                format_minutes(minutes - 1.0),
                format_minutes(minutes - 0.5),
                red,
            ),
        }
    } else {
        Timing {
            display: shown,
            cards: CardThresholds::new("", "", red),
        }
    }
}

/// Render a minute count without a trailing `.0` (`7`, `2.5`).
pub fn format_minutes(minutes: f64) -> String {
    let rounded = (minutes * 100.0).round() / 100.0;
    // Avoid printing "-0"
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_item_bands() {
        let timing = evaluate(25.0, None, true);
        assert_eq!(timing.display, "25");
        assert_eq!(timing.cards, CardThresholds::new("20", "23", "25"));

        let timing = evaluate(20.0, None, true);
        assert_eq!(timing.cards, CardThresholds::new("15", "18", "20"));
    }

    #[test]
    fn test_speech_band_shows_range() {
        let timing = evaluate(7.0, None, true);
        assert_eq!(timing.display, "5-7");
        assert_eq!(timing.cards, CardThresholds::new("5", "6", "7"));

        // Lower boundary is inclusive
        let timing = evaluate(4.0, None, true);
        assert_eq!(timing.display, "2-4");
        assert_eq!(timing.cards, CardThresholds::new("2", "3", "4"));

        let timing = evaluate(19.5, None, true);
        assert_eq!(timing.display, "17.5-19.5");
    }

    #[test]
    fn test_short_item_bands() {
        let timing = evaluate(3.0, None, true);
        assert_eq!(timing.display, "3");
        assert_eq!(timing.cards, CardThresholds::new("2", "2.5", "3"));

        let timing = evaluate(2.0, None, true);
        assert_eq!(timing.display, "2");
        assert_eq!(timing.cards, CardThresholds::new("", "", "2"));

        let timing = evaluate(1.0, None, true);
        assert_eq!(timing.cards, CardThresholds::new("", "", "1"));
    }

    #[test]
    fn test_explicit_cards_verbatim() {
        let cards = CardThresholds::new("1", "1.5", "2");
        let timing = evaluate(25.0, Some(&cards), true);
        assert_eq!(timing.display, "25");
        assert_eq!(timing.cards, cards);
    }

    #[test]
    fn test_hidden_duration_blanks_everything() {
        let cards = CardThresholds::new("1", "1.5", "2");
        let timing = evaluate(20.0, Some(&cards), false);
        assert_eq!(timing.display, "20");
        assert_eq!(timing.cards, CardThresholds::blank());
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(7.0), "7");
        assert_eq!(format_minutes(2.5), "2.5");
        assert_eq!(format_minutes(0.0), "0");
        assert_eq!(format_minutes(3.3 - 0.5), "2.8");
    }
}
