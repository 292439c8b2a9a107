//! Streaming history ingestion
//!
//! Reads every `*.json` file of an export folder into one [`History`], then
//! derives the enriched [`Event`] table every report works from.

mod event;

pub use event::{track_id_from_uri, Event, RawEvent};

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Raw events concatenated from all history files of one export.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<RawEvent>,
    files: Vec<PathBuf>,
}

impl History {
    /// Build a history from already-parsed records.
    #[must_use]
    pub fn from_records(records: Vec<RawEvent>) -> Self {
        Self {
            records,
            files: Vec::new(),
        }
    }

    /// Files the records came from, in load order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of raw records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Derive the enriched event table.
    ///
    /// Rows without a track id (podcasts, audiobooks) are dropped. A required
    /// column that no record carries is an error.
    pub fn enrich(&self) -> Result<Vec<Event>> {
        self.check_columns()?;

        let events: Vec<Event> = self
            .records
            .iter()
            .cloned()
            .filter_map(Event::from_raw)
            .collect();

        debug!(
            "Enriched {} of {} records ({} non-track rows dropped)",
            events.len(),
            self.records.len(),
            self.records.len() - events.len()
        );
        Ok(events)
    }

    fn check_columns(&self) -> Result<()> {
        if self.records.is_empty() {
            return Ok(());
        }

        let required: [(&'static str, fn(&RawEvent) -> bool); 4] = [
            ("master_metadata_track_name", |r| {
                r.master_metadata_track_name.is_some()
            }),
            ("master_metadata_album_album_name", |r| {
                r.master_metadata_album_album_name.is_some()
            }),
            ("master_metadata_album_artist_name", |r| {
                r.master_metadata_album_artist_name.is_some()
            }),
            ("spotify_track_uri", |r| r.spotify_track_uri.is_some()),
        ];

        for (column, has_column) in required {
            if !self.records.iter().any(has_column) {
                return Err(Error::MissingColumn(column));
            }
        }
        Ok(())
    }
}

/// Load every `*.json` history file in `dir`.
///
/// Files are read in name order. The first malformed file aborts the load.
pub fn load_history(dir: &Path) -> Result<History> {
    let files = history_files(dir)?;
    if files.is_empty() {
        warn!("No JSON history files found in {}", dir.display());
    }

    let mut history = History::default();
    for path in files {
        let records = read_history_file(&path)?;
        debug!("Read {} records from {}", records.len(), path.display());
        history.records.extend(records);
        history.files.push(path);
    }

    info!(
        "Loaded {} records from {} files",
        history.records.len(),
        history.files.len()
    );
    Ok(history)
}

/// List the `.json` files directly inside `dir`, sorted by name.
fn history_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_history_file(path: &Path) -> Result<Vec<RawEvent>> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
