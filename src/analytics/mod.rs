//! Analytics and statistics module
//!
//! Group-by and ranking over the enriched event table. Sums are kept in
//! integer milliseconds and only converted to minutes for display, so ties
//! compare exactly.
//!
//! Every top list is truncated to `limit` rows. Equal values are ordered by
//! key (artist, track or genre) ascending.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::genres::GenreEntry;
use crate::history::Event;
use crate::types::{Milliseconds, PlayCount};

/// Aggregated play count and time for an artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistStats {
    /// Artist name.
    pub artist: String,
    /// Number of plays with non-zero duration.
    pub play_count: PlayCount,
    /// Total listening time.
    pub total: Milliseconds,
}

/// Aggregated listening time for a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackStats {
    /// Track title.
    pub title: String,
    /// First artist seen for this title.
    pub artist: Option<String>,
    /// Total listening time.
    pub total: Milliseconds,
}

/// Overview statistics for a whole export.
#[derive(Debug, Clone, Default)]
pub struct Overview {
    /// Listening time over non-zero-duration plays.
    pub total: Milliseconds,
    /// Number of non-zero-duration plays.
    pub total_plays: PlayCount,
    /// Count of distinct artists.
    pub unique_artists: usize,
    /// Top artists by play count.
    pub top_artists_by_plays: Vec<ArtistStats>,
    /// Top artists by listening time.
    pub top_artists_by_time: Vec<ArtistStats>,
    /// Top tracks by listening time.
    pub top_tracks: Vec<TrackStats>,
}

impl Overview {
    /// Total listening time in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        self.total.as_minutes_f64()
    }
}

/// One artist's position in one year's ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyRank {
    pub year: i32,
    pub artist: String,
    pub total: Milliseconds,
    /// Dense rank within the year, 1 = most listened.
    pub rank: u32,
}

impl YearlyRank {
    /// Listening time in minutes.
    #[must_use]
    pub fn minutes(&self) -> f64 {
        self.total.as_minutes_f64()
    }
}

/// Listening time in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTotal {
    pub year: i32,
    pub total: Milliseconds,
}

/// Occurrences of one genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: PlayCount,
}

/// Compute the overview report.
#[must_use]
pub fn overview(events: &[Event], limit: usize) -> Overview {
    let mut artists: HashMap<&str, ArtistStats> = HashMap::new();
    let mut tracks: HashMap<&str, TrackStats> = HashMap::new();
    let mut total = Milliseconds::default();
    let mut total_plays = PlayCount::default();

    for event in events {
        let listened = !event.played.is_zero();
        if listened {
            total += event.played;
            total_plays.increment();
        }

        if let Some(artist) = event.artist.as_deref() {
            let stats = artists.entry(artist).or_insert_with(|| ArtistStats {
                artist: artist.to_string(),
                play_count: PlayCount::default(),
                total: Milliseconds::default(),
            });
            stats.total += event.played;
            if listened {
                stats.play_count.increment();
            }
        }

        if let Some(title) = event.track.as_deref() {
            tracks
                .entry(title)
                .or_insert_with(|| TrackStats {
                    title: title.to_string(),
                    artist: event.artist.clone(),
                    total: Milliseconds::default(),
                })
                .total += event.played;
        }
    }

    let unique_artists = artists.len();
    let artists: Vec<ArtistStats> = artists.into_values().collect();

    let mut by_plays: Vec<ArtistStats> = artists
        .iter()
        .filter(|a| !a.play_count.is_zero())
        .cloned()
        .collect();
    by_plays.sort_by(|a, b| descending(a.play_count, b.play_count, &a.artist, &b.artist));
    by_plays.truncate(limit);

    let mut by_time = artists;
    by_time.sort_by(|a, b| descending(a.total, b.total, &a.artist, &b.artist));
    by_time.truncate(limit);

    let mut top_tracks: Vec<TrackStats> = tracks.into_values().collect();
    top_tracks.sort_by(|a, b| descending(a.total, b.total, &a.title, &b.title));
    top_tracks.truncate(limit);

    Overview {
        total,
        total_plays,
        unique_artists,
        top_artists_by_plays: by_plays,
        top_artists_by_time: by_time,
        top_tracks,
    }
}

/// Rank artists by listening time within each year, keeping ranks `<= limit`.
///
/// Ranks are dense: equal totals share a rank and the next total gets the
/// following rank. Rows come out ordered by year, rank, then artist.
#[must_use]
pub fn yearly_top_artists(events: &[Event], limit: usize) -> Vec<YearlyRank> {
    let mut by_year: BTreeMap<i32, HashMap<&str, Milliseconds>> = BTreeMap::new();
    for event in events {
        if let Some(artist) = event.artist.as_deref() {
            *by_year
                .entry(event.year)
                .or_default()
                .entry(artist)
                .or_default() += event.played;
        }
    }

    let mut ranked = Vec::new();
    for (year, artists) in by_year {
        let mut rows: Vec<(&str, Milliseconds)> = artists.into_iter().collect();
        rows.sort_by(|a, b| descending(a.1, b.1, a.0, b.0));

        let ranks = dense_ranks(rows.iter().map(|(_, total)| *total));
        ranked.extend(
            rows.into_iter()
                .zip(ranks)
                .take_while(|(_, rank)| (*rank as usize) <= limit)
                .map(|((artist, total), rank)| YearlyRank {
                    year,
                    artist: artist.to_string(),
                    total,
                    rank,
                }),
        );
    }
    ranked
}

/// Listening time per calendar year, ascending by year.
#[must_use]
pub fn minutes_by_year(events: &[Event]) -> Vec<YearTotal> {
    let mut years: BTreeMap<i32, Milliseconds> = BTreeMap::new();
    for event in events {
        *years.entry(event.year).or_default() += event.played;
    }
    years
        .into_iter()
        .map(|(year, total)| YearTotal { year, total })
        .collect()
}

/// Count genre occurrences and keep the `limit` most frequent.
#[must_use]
pub fn genre_counts(entries: &[GenreEntry], limit: usize) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, PlayCount> = HashMap::new();
    for entry in entries {
        counts.entry(entry.genre.as_str()).or_default().increment();
    }

    let mut genres: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    genres.sort_by(|a, b| descending(a.count, b.count, &a.genre, &b.genre));
    genres.truncate(limit);
    genres
}

/// Assign dense ranks to values already sorted in descending order.
pub(crate) fn dense_ranks<T, I>(sorted_desc: I) -> Vec<u32>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut ranks = Vec::new();
    let mut previous: Option<T> = None;
    let mut rank = 0;
    for value in sorted_desc {
        if previous.as_ref() != Some(&value) {
            rank += 1;
        }
        ranks.push(rank);
        previous = Some(value);
    }
    ranks
}

/// Descending by value, then ascending by key.
fn descending<T: Ord>(a: T, b: T, key_a: &str, key_b: &str) -> Ordering {
    b.cmp(&a).then_with(|| key_a.cmp(key_b))
}
