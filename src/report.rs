//! Report selection.
//!
//! Every run renders exactly one [`Report`]. The CLI takes it as a free-form
//! mode name so an unknown name can fall back to the overview with a hint
//! instead of failing argument parsing.

use std::fmt;
use std::str::FromStr;

/// The reports this tool can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// Overview numbers and top lists in the terminal
    #[default]
    Stats,
    /// Bar chart of minutes played per year
    ListenTimePlot,
    /// Rank chart of the top artists of each year
    TopArtists,
    /// Frequency table of genres (uses the Spotify API or the cache)
    TopGenre,
}

/// A mode name that matches no [`Report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown option {}, available options are: \n{}",
            self.0,
            Report::mode_list()
        )
    }
}

impl std::error::Error for UnknownMode {}

impl Report {
    /// Mode name accepted on the command line.
    #[must_use]
    pub const fn mode_name(self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::ListenTimePlot => "listen_time_plot",
            Self::TopArtists => "top_artists",
            Self::TopGenre => "top_genre",
        }
    }

    /// Get all reports.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Stats,
            Self::ListenTimePlot,
            Self::TopArtists,
            Self::TopGenre,
        ]
    }

    /// Supported mode names separated by spaces.
    #[must_use]
    pub fn mode_list() -> String {
        Self::all()
            .iter()
            .map(|r| r.mode_name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Look up a report by mode name. Hyphens and case are ignored.
    pub fn from_mode(mode: &str) -> Result<Self, UnknownMode> {
        let normalized = mode.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|r| r.mode_name() == normalized)
            .ok_or_else(|| UnknownMode(mode.to_string()))
    }
}

impl FromStr for Report {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mode(s)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode_name())
    }
}
