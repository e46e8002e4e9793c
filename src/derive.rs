//! Label derivation: annotations in, mood labels out.
//!
//! Derivation does not look at the exclusion set. The written label table
//! is the unfiltered superset and each consumer filters on read.

use crate::error::Result;
use crate::mood::{classify, MoodMetrics};
use crate::table::{read_annotations, AnnotationRecord, LabelTable, LabeledRecord};
use std::path::Path;
use tracing::{debug, info};

/// Labels every annotation, preserving input order.
///
/// With `include_metrics` each record also carries [`MoodMetrics`]; an
/// annotation with zero arousal then fails the whole derivation.
pub fn derive(annotations: &[AnnotationRecord], include_metrics: bool) -> Result<LabelTable> {
    let mut records = Vec::with_capacity(annotations.len());
    for annotation in annotations {
        let mood = classify(annotation.valence, annotation.arousal);
        let record = if include_metrics {
            let metrics =
                MoodMetrics::compute(annotation.song_id, annotation.valence, annotation.arousal)?;
            LabeledRecord::with_metrics(annotation.song_id, mood, metrics)
        } else {
            LabeledRecord::new(annotation.song_id, mood)
        };
        debug!("song {} -> {}", annotation.song_id, mood);
        records.push(record);
    }
    LabelTable::with_layout(records, include_metrics)
}

/// Reads `annotations_path`, derives labels and writes them to `output_path`.
///
/// Nothing is written if reading or derivation fails.
pub fn derive_file(
    annotations_path: &Path,
    output_path: &Path,
    include_metrics: bool,
) -> Result<LabelTable> {
    let annotations = read_annotations(annotations_path)?;
    let table = derive(&annotations, include_metrics)?;
    table.write(output_path)?;

    info!(
        "Derived {} labels{} into {}",
        table.len(),
        if include_metrics { " with metrics" } else { "" },
        output_path.display()
    );
    Ok(table)
}
