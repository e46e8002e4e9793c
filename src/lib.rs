//! Mood Dataset Library
//!
//! Derives mood labels from valence/arousal annotations, splits them into
//! class-balanced training and validation tables, and serves
//! (spectrogram, mood) samples to a training loop.

pub mod cli_style;
pub mod config;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod exclusion;
pub mod mood;
pub mod split;
pub mod table;

// Re-export commonly used types for convenience
pub use dataset::{DataLoader, Dataset, MoodDataModule, MoodDataset, Sample, SampleLabel};
pub use error::{DatasetError, Result};
pub use exclusion::ExclusionSet;
pub use mood::{classify, MoodLabel, MoodMetrics};
pub use split::{SplitParams, SplitTables};
pub use table::{AnnotationRecord, LabelTable, LabeledRecord};
