//! Song ids whose spectrogram images are known to be unusable.
//!
//! The label table on disk still contains these ids. Every consumer
//! (splitting, dataset indexing, summaries) filters them out on read.

use crate::error::{DatasetError, Result};
use crate::table::SongRecord;
use std::collections::BTreeSet;
use std::path::Path;

/// Set of excluded song ids, injected into every component that reads
/// from the full label table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: BTreeSet<u32>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, song_id: u32) -> bool {
        self.ids.contains(&song_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    pub fn insert(&mut self, song_id: u32) -> bool {
        self.ids.insert(song_id)
    }

    pub fn extend(&mut self, other: &ExclusionSet) {
        self.ids.extend(other.ids());
    }

    /// Loads ids from a text file, one per line. Blank lines and `#`
    /// comments are skipped.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DatasetError::SourceNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut set = Self::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = match line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => line.trim(),
            };
            if line.is_empty() {
                continue;
            }
            let id = line
                .parse::<u32>()
                .map_err(|e| DatasetError::InvalidRecord {
                    path: path.to_path_buf(),
                    row: line_no + 1,
                    reason: format!("'{}' is not a song id: {}", line, e),
                })?;
            set.insert(id);
        }
        Ok(set)
    }
}

impl FromIterator<u32> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Returns the records whose song id is not excluded, in their original order.
pub fn filter<R: SongRecord + Clone>(records: &[R], exclusions: &ExclusionSet) -> Vec<R> {
    records
        .iter()
        .filter(|r| !exclusions.contains(r.song_id()))
        .cloned()
        .collect()
}
