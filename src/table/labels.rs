use super::{
    open_reader, optional_column, parse_field, parse_rating, required_column, row_number,
    LabeledRecord,
};
use crate::error::{DatasetError, Result};
use crate::exclusion::{self, ExclusionSet};
use crate::mood::{classify, MoodLabel, MoodMetrics};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const MINIMAL_HEADER: [&str; 2] = ["song_id", "mood"];
const METRICS_HEADER: [&str; 4] = ["song_id", "mood", "valence", "arousal"];

/// An ordered, validated set of labeled songs.
///
/// Song ids are unique and either every record carries metrics or none
/// does, so a table always maps to exactly one on-disk schema.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LabelTable {
    records: Vec<LabeledRecord>,
    with_metrics: bool,
}

impl LabelTable {
    /// Builds a table, inferring the layout from the first record.
    pub fn new(records: Vec<LabeledRecord>) -> Result<Self> {
        let with_metrics = records.first().is_some_and(|r| r.metrics.is_some());
        Self::with_layout(records, with_metrics)
    }

    /// Builds a table with a fixed layout, so an empty table still knows
    /// which header to write.
    pub fn with_layout(records: Vec<LabeledRecord>, with_metrics: bool) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.song_id) {
                return Err(DatasetError::InvalidParameter(format!(
                    "duplicate song_id {} in label table",
                    record.song_id
                )));
            }
            if record.metrics.is_some() != with_metrics {
                return Err(DatasetError::InvalidParameter(format!(
                    "song_id {} does not match the table's metrics layout",
                    record.song_id
                )));
            }
        }
        Ok(Self {
            records,
            with_metrics,
        })
    }

    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LabeledRecord> {
        self.records
    }

    pub fn get(&self, index: usize) -> Option<&LabeledRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the table carries the `valence`/`arousal` columns.
    pub fn has_metrics(&self) -> bool {
        self.with_metrics
    }

    /// A copy of this table without the excluded songs.
    pub fn without(&self, exclusions: &ExclusionSet) -> LabelTable {
        LabelTable {
            records: exclusion::filter(&self.records, exclusions),
            with_metrics: self.with_metrics,
        }
    }

    /// Per-mood counts after removing excluded songs.
    pub fn mood_counts(&self, exclusions: &ExclusionSet) -> MoodCounts {
        let mut counts: BTreeMap<MoodLabel, usize> =
            MoodLabel::CLASS_ORDER.iter().map(|m| (*m, 0)).collect();
        let mut excluded = 0;
        for record in &self.records {
            if exclusions.contains(record.song_id) {
                excluded += 1;
                continue;
            }
            *counts.entry(record.mood).or_default() += 1;
        }
        MoodCounts {
            total: self.records.len() - excluded,
            excluded,
            counts,
        }
    }

    /// Reads a label table in either the minimal or the metrics layout.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = open_reader(path)?;
        let headers = reader.headers()?.clone();
        let id_col = required_column(&headers, "song_id", path)?;
        let mood_col = required_column(&headers, "mood", path)?;
        let metric_cols = match (
            optional_column(&headers, "valence"),
            optional_column(&headers, "arousal"),
        ) {
            (Some(v), Some(a)) => Some((v, a)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(DatasetError::Schema {
                    path: path.to_path_buf(),
                    column: "arousal",
                })
            }
            (None, Some(_)) => {
                return Err(DatasetError::Schema {
                    path: path.to_path_buf(),
                    column: "valence",
                })
            }
        };

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = row_number(&record, i + 2);
            let song_id: u32 = parse_field(&record, id_col, "song_id", row, path)?;
            let mood: MoodLabel = parse_field(&record, mood_col, "mood", row, path)?;
            if !seen.insert(song_id) {
                return Err(DatasetError::InvalidRecord {
                    path: path.to_path_buf(),
                    row,
                    reason: format!("duplicate song_id {}", song_id),
                });
            }

            let labeled = match metric_cols {
                Some((valence_col, arousal_col)) => {
                    let valence = parse_rating(&record, valence_col, "valence", row, path)?;
                    let arousal = parse_rating(&record, arousal_col, "arousal", row, path)?;
                    let expected = classify(valence, arousal);
                    if mood != expected {
                        return Err(DatasetError::InvalidRecord {
                            path: path.to_path_buf(),
                            row,
                            reason: format!(
                                "mood '{}' does not match valence/arousal -> {}",
                                mood, expected
                            ),
                        });
                    }
                    let metrics = MoodMetrics::compute(song_id, valence, arousal)?;
                    LabeledRecord::with_metrics(song_id, mood, metrics)
                }
                None => LabeledRecord::new(song_id, mood),
            };
            records.push(labeled);
        }

        info!("Read {} labels from {}", records.len(), path.display());
        Ok(Self {
            records,
            with_metrics: metric_cols.is_some(),
        })
    }

    /// Writes the table, replacing anything already at `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        if self.with_metrics {
            writer.write_record(METRICS_HEADER)?;
        } else {
            writer.write_record(MINIMAL_HEADER)?;
        }

        for record in &self.records {
            let id = record.song_id.to_string();
            match &record.metrics {
                Some(metrics) => {
                    let valence = metrics.valence.to_string();
                    let arousal = metrics.arousal.to_string();
                    writer.write_record([
                        id.as_str(),
                        record.mood.as_str(),
                        valence.as_str(),
                        arousal.as_str(),
                    ])?;
                }
                None => writer.write_record([id.as_str(), record.mood.as_str()])?,
            }
        }
        writer.flush()?;

        debug!("Wrote {} labels to {}", self.records.len(), path.display());
        Ok(())
    }
}

/// Summary of a label table used by the inspect command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoodCounts {
    /// Rows left after exclusion.
    pub total: usize,
    /// Rows dropped because their song id is excluded.
    pub excluded: usize,
    pub counts: BTreeMap<MoodLabel, usize>,
}

impl MoodCounts {
    pub fn get(&self, mood: MoodLabel) -> usize {
        self.counts.get(&mood).copied().unwrap_or(0)
    }

    /// The least represented mood, which bounds any balanced split.
    pub fn smallest(&self) -> Option<(MoodLabel, usize)> {
        self.counts
            .iter()
            .min_by_key(|(_, count)| **count)
            .map(|(mood, count)| (*mood, *count))
    }

    /// Largest per-class training count that still leaves one song of every
    /// mood for validation, with the mood that limits it.
    pub fn max_training_with_validation(&self) -> Option<(MoodLabel, usize)> {
        self.smallest()
            .map(|(mood, count)| (mood, count.saturating_sub(1)))
    }
}
