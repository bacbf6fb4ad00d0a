//! Curriculum tracks
//!
//! A member progresses through one of two disjoint, ordered level sequences:
//! the Pathways track and the traditional communication (CC) track. Every
//! prepared speech moves the speaker one step along the track their current
//! level belongs to.

use sdk::errors::AgendaError;
use sdk::types::Track;

use crate::config::CurriculumConfig;

/// Level of a member who has not given any speech yet
pub const NOT_STARTED: &str = "NotStarted";

/// Two ordered level sequences used to compute a speaker's next level
#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumTrack {
    pathway: Vec<String>,
    communication: Vec<String>,
}

impl CurriculumTrack {
    /// Build and validate the tracks.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::Config` if a track is empty, the tracks share a
    /// level, a track repeats a level, or `NotStarted` is missing.
    pub fn new(pathway: Vec<String>, communication: Vec<String>) -> Result<Self, AgendaError> {
        if pathway.is_empty() || communication.is_empty() {
            return Err(AgendaError::Config(
                "curriculum tracks must not be empty".to_string(),
            ));
        }

        for (name, levels) in [("pathway", &pathway), ("communication", &communication)] {
            for (i, level) in levels.iter().enumerate() {
                if levels[..i].contains(level) {
                    return Err(AgendaError::Config(format!(
                        "level '{}' appears twice in the {} track",
                        level, name
                    )));
                }
            }
        }

        if let Some(shared) = pathway.iter().find(|level| communication.contains(level)) {
            return Err(AgendaError::Config(format!(
                "level '{}' appears in both curriculum tracks",
                shared
            )));
        }

        if !pathway.iter().chain(&communication).any(|l| l == NOT_STARTED) {
            return Err(AgendaError::Config(format!(
                "one curriculum track must start from '{}'",
                NOT_STARTED
            )));
        }

        Ok(Self {
            pathway,
            communication,
        })
    }

    pub fn from_config(config: &CurriculumConfig) -> Result<Self, AgendaError> {
        Self::new(config.pathway.clone(), config.communication.clone())
    }

    /// Ordered levels of one track
    pub fn levels(&self, track: Track) -> &[String] {
        match track {
            Track::Pathway => &self.pathway,
            Track::Communication => &self.communication,
        }
    }

    /// Track a level label belongs to, if any
    pub fn track_of(&self, level: &str) -> Option<Track> {
        [Track::Pathway, Track::Communication]
            .into_iter()
            .find(|&track| self.levels(track).iter().any(|l| l == level))
    }

    /// Level that follows `current` on its own track.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::CurriculumExhausted` when `current` is the last
    /// level of its track or belongs to neither track.
    pub fn next_level(&self, current: &str) -> Result<(Track, String), AgendaError> {
        let exhausted = || AgendaError::CurriculumExhausted {
            level: current.to_string(),
        };

        let track = self.track_of(current).ok_or_else(exhausted)?;
        let levels = self.levels(track);
        let index = levels
            .iter()
            .position(|l| l == current)
            .ok_or_else(exhausted)?;

        levels
            .get(index + 1)
            .map(|next| (track, next.clone()))
            .ok_or_else(exhausted)
    }

    /// Level that precedes `level` on its own track
    pub fn previous_level(&self, level: &str) -> Option<&str> {
        let levels = self.levels(self.track_of(level)?);
        let index = levels.iter().position(|l| l == level)?;
        index
            .checked_sub(1)
            .and_then(|i| levels.get(i))
            .map(String::as_str)
    }
}
