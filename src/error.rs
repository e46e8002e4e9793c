//! Error taxonomy for the mood dataset pipeline.
//!
//! Every failure is surfaced to the caller, nothing here is recovered
//! silently. Binaries wrap these into `anyhow::Error` with extra context.

use crate::mood::MoodLabel;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by label derivation, splitting and dataset indexing.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// An input file or directory does not exist.
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A required column is missing from a table header.
    #[error("Missing required column '{column}' in {}", .path.display())]
    Schema { path: PathBuf, column: &'static str },

    /// A mood bucket is too small for the requested per-class training count.
    #[error("Not enough '{mood}' samples: requested {requested}, available {available}")]
    InsufficientData {
        mood: MoodLabel,
        requested: usize,
        available: usize,
    },

    /// A dataset row references a song with no image on disk.
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// Dataset access outside `[0, len)`.
    #[error("Index {index} out of bounds for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The derived `temp` metric is not finite (arousal of zero).
    #[error("Non-finite metric for song {song_id}: valence={valence}, arousal={arousal}")]
    NonFiniteMetric {
        song_id: u32,
        valence: f64,
        arousal: f64,
    },

    /// A row could not be turned into a typed record.
    #[error("Invalid record in {} (row {row}): {reason}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    /// A parameter outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
