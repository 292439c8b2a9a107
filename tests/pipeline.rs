//! End-to-end tests over on-disk history folders and cache files.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use spotify_stats::analytics;
use spotify_stats::genres::{
    get_or_fetch, resolve_genres, unique_track_ids, ArtistGenres, CsvGenreStore, GenreEntry,
    GenreSource, GenreStore,
};
use spotify_stats::history::load_history;
use spotify_stats::plot;
use spotify_stats::types::PlayCount;
use spotify_stats::{Error, Result};

fn play(ts: &str, ms: u64, artist: &str, track: &str, uri: &str) -> String {
    format!(
        r#"{{
            "ts": "{ts}",
            "platform": "linux",
            "ms_played": {ms},
            "conn_country": "NL",
            "master_metadata_track_name": "{track}",
            "master_metadata_album_artist_name": "{artist}",
            "master_metadata_album_album_name": "{track} (Album)",
            "spotify_track_uri": "{uri}",
            "episode_name": null,
            "spotify_episode_uri": null,
            "shuffle": false,
            "skipped": null
        }}"#
    )
}

fn episode(ts: &str, ms: u64) -> String {
    format!(
        r#"{{
            "ts": "{ts}",
            "ms_played": {ms},
            "master_metadata_track_name": null,
            "master_metadata_album_artist_name": null,
            "master_metadata_album_album_name": null,
            "spotify_track_uri": null,
            "episode_name": "Some Episode",
            "spotify_episode_uri": "spotify:episode:ep1"
        }}"#
    )
}

fn write_history(dir: &Path, name: &str, records: &[String]) {
    fs::write(dir.join(name), format!("[{}]", records.join(","))).unwrap();
}

fn sample_export(dir: &Path) {
    write_history(
        dir,
        "Streaming_History_Audio_2020-2021_0.json",
        &[
            play("2020-02-01T10:00:00Z", 60_000, "A", "One", "spotify:track:t1"),
            play("2020-02-01T10:01:00Z", 120_000, "A", "Two", "spotify:track:t2"),
            play("2020-02-01T10:03:00Z", 0, "A", "Two", "spotify:track:t2"),
            episode("2020-02-02T09:00:00Z", 1_800_000),
        ],
    );
    write_history(
        dir,
        "Streaming_History_Audio_2021-2022_1.json",
        &[
            play("2021-07-04T18:00:00Z", 240_000, "Daft Punk", "Around", "spotify:track:t3"),
            play("2021-07-04T18:04:00Z", 180_000, "A", "One", "spotify:track:t1"),
        ],
    );
    fs::write(dir.join("notes.txt"), "not history").unwrap();
}

#[test]
fn test_load_and_enrich_export() {
    let dir = tempfile::tempdir().unwrap();
    sample_export(dir.path());

    let history = load_history(dir.path()).unwrap();
    assert_eq!(history.len(), 6);
    assert_eq!(history.files().len(), 2);

    let events = history.enrich().unwrap();
    assert_eq!(events.len(), 5, "podcast episode is dropped");
    assert_eq!(events[0].year, 2020);
    assert_eq!(events[0].month, 2);
    assert_eq!(events[0].track_id, "t1");
}

#[test]
fn test_overview_from_export() {
    let dir = tempfile::tempdir().unwrap();
    sample_export(dir.path());
    let events = load_history(dir.path()).unwrap().enrich().unwrap();

    let overview = analytics::overview(&events, 10);
    assert!((overview.total_minutes() - 10.0).abs() < 1e-9);
    assert_eq!(overview.unique_artists, 2);
    assert_eq!(overview.top_artists_by_plays[0].artist, "A");
    assert_eq!(overview.top_artists_by_plays[0].play_count, PlayCount::new(3));
    assert_eq!(overview.top_tracks[0].title, "Around");
}

#[test]
fn test_malformed_file_halts_load() {
    let dir = tempfile::tempdir().unwrap();
    sample_export(dir.path());
    fs::write(dir.path().join("broken.json"), "[{\"ts\": ").unwrap();

    match load_history(dir.path()) {
        Err(Error::Parse { path, .. }) => assert!(path.ends_with("broken.json")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_history(&dir.path().join("nope"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_empty_directory_yields_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let history = load_history(dir.path()).unwrap();
    assert!(history.is_empty());
    assert!(history.enrich().unwrap().is_empty());
}

#[test]
fn test_csv_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvGenreStore::new(dir.path().join("cache").join("genres.csv"));
    assert!(store.load().unwrap().is_none());

    let entries = vec![
        GenreEntry::new("a1", "indie rock"),
        GenreEntry::new("a1", "art pop, experimental"),
        GenreEntry::new("a2", "french house"),
    ];
    store.save(&entries).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("artist_id,genres"));
    assert_eq!(store.load().unwrap(), Some(entries));
}

struct CountingSource {
    requests: Cell<usize>,
}

impl GenreSource for CountingSource {
    fn artist_ids_for_tracks(&self, track_ids: &[String]) -> Result<Vec<String>> {
        self.requests.set(self.requests.get() + 1);
        Ok(track_ids.iter().map(|t| format!("artist-of-{t}")).collect())
    }

    fn genres_for_artists(&self, artist_ids: &[String]) -> Result<Vec<ArtistGenres>> {
        self.requests.set(self.requests.get() + 1);
        Ok(artist_ids
            .iter()
            .map(|a| ArtistGenres {
                artist_id: a.clone(),
                genres: vec!["pop".to_string()],
            })
            .collect())
    }
}

#[test]
fn test_second_run_uses_cache_without_requests() {
    let dir = tempfile::tempdir().unwrap();
    sample_export(dir.path());
    let events = load_history(dir.path()).unwrap().enrich().unwrap();
    let track_ids = unique_track_ids(&events);
    assert_eq!(track_ids, ["t1", "t2", "t3"]);

    let store = CsvGenreStore::new(dir.path().join("genres.csv"));
    let source = CountingSource {
        requests: Cell::new(0),
    };

    let first = get_or_fetch(&store, || resolve_genres(&source, &track_ids, 2)).unwrap();
    let requests_after_first = source.requests.get();
    assert_eq!(requests_after_first, 4, "two track batches, two artist batches");

    let second = get_or_fetch(&store, || resolve_genres(&source, &track_ids, 2)).unwrap();
    assert_eq!(source.requests.get(), requests_after_first);
    assert_eq!(
        analytics::genre_counts(&first, 10),
        analytics::genre_counts(&second, 10)
    );
}

#[test]
fn test_charts_are_written() {
    let dir = tempfile::tempdir().unwrap();
    sample_export(dir.path());
    let events = load_history(dir.path()).unwrap().enrich().unwrap();
    let out = dir.path().join("charts");

    let years = analytics::minutes_by_year(&events);
    let bars = plot::listen_time_by_year(&years, &out).unwrap();
    assert!(bars.ends_with(plot::LISTEN_TIME_FILE));
    assert!(fs::read_to_string(&bars).unwrap().contains("<svg"));

    let ranks = analytics::yearly_top_artists(&events, 10);
    let scatter = plot::top_artists_by_year(&ranks, 10, &out).unwrap();
    let svg = fs::read_to_string(&scatter).unwrap();
    assert!(svg.contains("Daft"));
    assert!(svg.contains("Punk"));
}
