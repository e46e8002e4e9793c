//! Typed records and the CSV boundary they are read from and written to.
//!
//! Column names are validated once, when a file is opened; everything past
//! this module works on [`AnnotationRecord`] and [`LabeledRecord`] only.

mod annotations;
mod labels;

pub use annotations::read_annotations;
pub use labels::{LabelTable, MoodCounts};

use crate::error::{DatasetError, Result};
use crate::mood::{MoodLabel, MoodMetrics, RATING_RANGE};
use csv::StringRecord;
use std::path::Path;

/// Anything keyed by a song id.
pub trait SongRecord {
    fn song_id(&self) -> u32;
}

/// One row of the raw valence/arousal annotation table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotationRecord {
    pub song_id: u32,
    pub valence: f64,
    pub arousal: f64,
}

impl SongRecord for AnnotationRecord {
    fn song_id(&self) -> u32 {
        self.song_id
    }
}

/// A song paired with its mood. `metrics` is set only for tables derived
/// with metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledRecord {
    pub song_id: u32,
    pub mood: MoodLabel,
    pub metrics: Option<MoodMetrics>,
}

impl LabeledRecord {
    pub fn new(song_id: u32, mood: MoodLabel) -> Self {
        Self {
            song_id,
            mood,
            metrics: None,
        }
    }

    pub fn with_metrics(song_id: u32, mood: MoodLabel, metrics: MoodMetrics) -> Self {
        Self {
            song_id,
            mood,
            metrics: Some(metrics),
        }
    }
}

impl SongRecord for LabeledRecord {
    fn song_id(&self) -> u32 {
        self.song_id
    }
}

/// Opens a headed CSV file, trimming whitespace around every field.
pub(crate) fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(DatasetError::SourceNotFound(path.to_path_buf()));
    }
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    Ok(reader)
}

/// Index of a required column.
pub(crate) fn required_column(
    headers: &StringRecord,
    column: &'static str,
    path: &Path,
) -> Result<usize> {
    optional_column(headers, column).ok_or_else(|| DatasetError::Schema {
        path: path.to_path_buf(),
        column,
    })
}

pub(crate) fn optional_column(headers: &StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|h| h == column)
}

/// Line number of a record, for error messages.
pub(crate) fn row_number(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback)
}

/// Parses one field, reporting the column and row on failure.
pub(crate) fn parse_field<T>(
    record: &StringRecord,
    index: usize,
    column: &str,
    row: usize,
    path: &Path,
) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).unwrap_or_default();
    raw.parse::<T>().map_err(|e| DatasetError::InvalidRecord {
        path: path.to_path_buf(),
        row,
        reason: format!("bad {} '{}': {}", column, raw, e),
    })
}

/// Parses a valence or arousal value, which must be finite and on the
/// annotation scale.
pub(crate) fn parse_rating(
    record: &StringRecord,
    index: usize,
    column: &str,
    row: usize,
    path: &Path,
) -> Result<f64> {
    let value: f64 = parse_field(record, index, column, row, path)?;
    if !RATING_RANGE.contains(&value) {
        return Err(DatasetError::InvalidRecord {
            path: path.to_path_buf(),
            row,
            reason: format!(
                "{} {} outside [{}, {}]",
                column,
                value,
                RATING_RANGE.start(),
                RATING_RANGE.end()
            ),
        });
    }
    Ok(value)
}
