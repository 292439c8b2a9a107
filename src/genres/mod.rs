//! Genre resolution
//!
//! Spotify has no track-to-genre endpoint, so genres are found in two hops:
//! track ids to artist ids, then artist ids to genre lists. The result is
//! cached in a flat file and the network path only runs when that file is
//! missing.

mod cache;
mod spotify;

pub use cache::{get_or_fetch, CsvGenreStore, GenreStore};
pub use spotify::{Credentials, SpotifyClient};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::history::Event;

/// One genre of one credited artist. An artist with three genres credited on
/// two tracks contributes six entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreEntry {
    pub artist_id: String,
    #[serde(rename = "genres")]
    pub genre: String,
}

impl GenreEntry {
    /// Create a new entry.
    pub fn new(artist_id: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            artist_id: artist_id.into(),
            genre: genre.into(),
        }
    }
}

/// Genres Spotify lists for one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistGenres {
    pub artist_id: String,
    pub genres: Vec<String>,
}

/// Anything that can answer the two lookup hops.
pub trait GenreSource {
    /// Artist ids credited on the given tracks, in response order.
    /// A track credited to several artists yields several ids.
    fn artist_ids_for_tracks(&self, track_ids: &[String]) -> Result<Vec<String>>;

    /// Genre lists for the given artists.
    fn genres_for_artists(&self, artist_ids: &[String]) -> Result<Vec<ArtistGenres>>;
}

/// Distinct track ids in first-seen order.
#[must_use]
pub fn unique_track_ids(events: &[Event]) -> Vec<String> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| seen.insert(e.track_id.as_str()))
        .map(|e| e.track_id.clone())
        .collect()
}

/// Resolve genres for `track_ids`, `batch_size` ids per request.
///
/// Requests are issued one after another. Each distinct artist is looked up
/// once, but its genres are emitted once per track credit.
pub fn resolve_genres<S: GenreSource + ?Sized>(
    source: &S,
    track_ids: &[String],
    batch_size: usize,
) -> Result<Vec<GenreEntry>> {
    let batch_size = batch_size.max(1);

    let mut credits = Vec::new();
    for (i, batch) in track_ids.chunks(batch_size).enumerate() {
        debug!("Fetching artist ids for track batch {} ({} ids)", i + 1, batch.len());
        credits.extend(source.artist_ids_for_tracks(batch)?);
    }

    let mut seen = HashSet::new();
    let unique_artists: Vec<String> = credits
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    info!(
        "Found {} artist credits ({} distinct artists) for {} tracks",
        credits.len(),
        unique_artists.len(),
        track_ids.len()
    );

    let mut genres_by_artist: HashMap<String, Vec<String>> = HashMap::new();
    for (i, batch) in unique_artists.chunks(batch_size).enumerate() {
        debug!("Fetching genres for artist batch {} ({} ids)", i + 1, batch.len());
        for artist in source.genres_for_artists(batch)? {
            genres_by_artist.insert(artist.artist_id, artist.genres);
        }
    }

    Ok(credits
        .iter()
        .filter_map(|id| genres_by_artist.get(id).map(|genres| (id, genres)))
        .flat_map(|(id, genres)| genres.iter().map(move |g| GenreEntry::new(id.as_str(), g.as_str())))
        .collect())
}
