//! Streaming history records, raw and enriched

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer};

use crate::types::Milliseconds;

/// One listening event exactly as it appears in the export.
///
/// Metadata fields use `Option<Option<_>>`: the outer `None` means the key
/// was absent, `Some(None)` means it was present with `null`. Podcast
/// episodes carry `null` track metadata but still have the keys.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub ts: DateTime<Utc>,
    pub ms_played: u64,

    #[serde(default, deserialize_with = "present")]
    pub master_metadata_track_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub master_metadata_album_album_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub master_metadata_album_artist_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub spotify_track_uri: Option<Option<String>>,
}

/// Marks a key as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A listening event with derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub year: i32,
    pub month: u32,
    pub played: Milliseconds,
    pub track: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub track_id: String,
}

impl Event {
    /// Build an enriched event, or `None` when the record is not a track play.
    #[must_use]
    pub fn from_raw(raw: RawEvent) -> Option<Self> {
        let track_id = raw
            .spotify_track_uri
            .flatten()
            .as_deref()
            .and_then(track_id_from_uri)?;

        Some(Self {
            year: raw.ts.year(),
            month: raw.ts.month(),
            timestamp: raw.ts,
            played: Milliseconds::new(raw.ms_played),
            track: raw.master_metadata_track_name.flatten(),
            album: raw.master_metadata_album_album_name.flatten(),
            artist: raw.master_metadata_album_artist_name.flatten(),
            track_id,
        })
    }

    /// Minutes played (ms / 60000).
    #[must_use]
    pub fn minutes_played(&self) -> f64 {
        self.played.as_minutes_f64()
    }

    /// Hours played.
    #[must_use]
    pub fn hours_played(&self) -> f64 {
        self.played.as_hours_f64()
    }
}

/// Extract the id from a `spotify:track:<id>` URI.
///
/// Episode, show and other URIs yield `None`, as does an empty id.
#[must_use]
pub fn track_id_from_uri(uri: &str) -> Option<String> {
    let mut parts = uri.rsplit(':');
    let id = parts.next()?.trim();
    let kind = parts.next()?;
    (kind == "track" && !id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_track_id_from_track_uri() {
        assert_eq!(
            track_id_from_uri("spotify:track:ABC123"),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_track_id_rejects_other_uris() {
        assert_eq!(track_id_from_uri("spotify:episode:XYZ"), None);
        assert_eq!(track_id_from_uri("spotify:track:"), None);
        assert_eq!(track_id_from_uri("ABC123"), None);
        assert_eq!(track_id_from_uri(""), None);
    }

    #[test]
    fn test_from_raw_derives_fields() {
        let event = Event::from_raw(raw(
            r#"{
                "ts": "2021-03-14T15:09:26Z",
                "ms_played": 90000,
                "master_metadata_track_name": "Song",
                "master_metadata_album_album_name": "Album",
                "master_metadata_album_artist_name": "Artist",
                "spotify_track_uri": "spotify:track:abc"
            }"#,
        ))
        .unwrap();

        assert_eq!(event.year, 2021);
        assert_eq!(event.month, 3);
        assert_eq!(event.track_id, "abc");
        assert_eq!(event.artist.as_deref(), Some("Artist"));
        assert!((event.minutes_played() - 1.5).abs() < f64::EPSILON);
        assert!((event.hours_played() - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_from_raw_drops_podcast_episode() {
        let event = Event::from_raw(raw(
            r#"{
                "ts": "2021-03-14T15:09:26Z",
                "ms_played": 90000,
                "master_metadata_track_name": null,
                "master_metadata_album_album_name": null,
                "master_metadata_album_artist_name": null,
                "spotify_track_uri": null
            }"#,
        ));
        assert!(event.is_none());
    }

    #[test]
    fn test_null_and_absent_are_distinguished() {
        let with_null = raw(r#"{"ts": "2021-01-01T00:00:00Z", "ms_played": 0, "spotify_track_uri": null}"#);
        assert_eq!(with_null.spotify_track_uri, Some(None));

        let absent = raw(r#"{"ts": "2021-01-01T00:00:00Z", "ms_played": 0}"#);
        assert_eq!(absent.spotify_track_uri, None);
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let parsed: Result<RawEvent, _> =
            serde_json::from_str(r#"{"ts": "2021-01-01T00:00:00Z", "ms_played": -5}"#);
        assert!(parsed.is_err());
    }
}
