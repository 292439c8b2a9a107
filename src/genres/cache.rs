//! Genre cache
//!
//! The cache never expires: if the file exists it is the answer. Delete it
//! to fetch again.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::GenreEntry;
use crate::error::Result;

/// Storage for resolved genres.
pub trait GenreStore {
    /// Stored entries, or `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<GenreEntry>>>;

    /// Persist entries, replacing anything stored before.
    fn save(&self, entries: &[GenreEntry]) -> Result<()>;
}

/// Return stored entries, or run `fetch`, store its result and return it.
///
/// `fetch` is not called when the store already has entries.
pub fn get_or_fetch<S, F>(store: &S, fetch: F) -> Result<Vec<GenreEntry>>
where
    S: GenreStore + ?Sized,
    F: FnOnce() -> Result<Vec<GenreEntry>>,
{
    if let Some(entries) = store.load()? {
        info!("Using {} cached genre entries", entries.len());
        return Ok(entries);
    }

    let entries = fetch()?;
    store.save(&entries)?;
    Ok(entries)
}

/// CSV file with an `artist_id,genres` header, one row per entry.
#[derive(Debug, Clone)]
pub struct CsvGenreStore {
    path: PathBuf,
}

impl CsvGenreStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GenreStore for CsvGenreStore {
    fn load(&self) -> Result<Option<Vec<GenreEntry>>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let entries = reader
            .deserialize()
            .collect::<std::result::Result<Vec<GenreEntry>, _>>()?;
        Ok(Some(entries))
    }

    fn save(&self, entries: &[GenreEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        if entries.is_empty() {
            warn!("No genres resolved; writing an empty cache");
            writer.write_record(["artist_id", "genres"])?;
        }
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;

        info!("Saved {} genre entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}
