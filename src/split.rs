//! Class-balanced training/validation split.

use crate::error::{DatasetError, Result};
use crate::exclusion::ExclusionSet;
use crate::mood::MoodLabel;
use crate::table::{LabelTable, LabeledRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;

/// Sampling parameters for [`split`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitParams {
    /// Songs drawn per mood into the training table.
    pub per_class_training_count: usize,
    /// Fixes the sampling. `None` draws from the OS entropy source, so two
    /// runs will differ.
    pub seed: Option<u64>,
}

/// The two halves of a split. Both tables are sorted by song id.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitTables {
    pub training: LabelTable,
    pub validation: LabelTable,
}

/// Splits a label table into balanced training and validation tables.
///
/// Excluded songs are dropped first. Each mood contributes exactly
/// `per_class_training_count` songs to training; validation takes the same
/// number from every mood, equal to the smallest leftover pool.
///
/// All sampling goes through one generator, visiting moods in
/// [`MoodLabel::CLASS_ORDER`], so a fixed seed reproduces both tables.
pub fn split(
    table: &LabelTable,
    exclusions: &ExclusionSet,
    params: SplitParams,
) -> Result<SplitTables> {
    let per_class = params.per_class_training_count;
    if per_class == 0 {
        return Err(DatasetError::InvalidParameter(
            "per_class_training_count must be positive".to_string(),
        ));
    }

    let filtered = table.without(exclusions);
    let mut buckets: Vec<Vec<LabeledRecord>> = vec![Vec::new(); MoodLabel::CLASS_ORDER.len()];
    for record in filtered.records() {
        buckets[record.mood.class_index()].push(record.clone());
    }

    for (mood, bucket) in MoodLabel::CLASS_ORDER.iter().zip(&buckets) {
        if bucket.len() < per_class {
            return Err(DatasetError::InsufficientData {
                mood: *mood,
                requested: per_class,
                available: bucket.len(),
            });
        }
    }

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut training = Vec::with_capacity(per_class * buckets.len());
    let mut leftovers = Vec::with_capacity(buckets.len());
    for mut bucket in buckets {
        bucket.shuffle(&mut rng);
        let leftover = bucket.split_off(per_class);
        training.extend(bucket);
        leftovers.push(leftover);
    }

    let min_leftover = leftovers.iter().map(Vec::len).min().unwrap_or(0);
    let mut validation = Vec::with_capacity(min_leftover * leftovers.len());
    for mut leftover in leftovers {
        leftover.shuffle(&mut rng);
        leftover.truncate(min_leftover);
        validation.extend(leftover);
    }

    training.sort_by_key(|r| r.song_id);
    validation.sort_by_key(|r| r.song_id);

    info!(
        "Split {} labels ({} excluded): {} training ({} per mood), {} validation ({} per mood)",
        table.len(),
        table.len() - filtered.len(),
        training.len(),
        per_class,
        validation.len(),
        min_leftover
    );

    Ok(SplitTables {
        training: LabelTable::with_layout(training, table.has_metrics())?,
        validation: LabelTable::with_layout(validation, table.has_metrics())?,
    })
}

/// Reads a label table, splits it and writes both halves.
pub fn split_file(
    labels_path: &Path,
    training_path: &Path,
    validation_path: &Path,
    exclusions: &ExclusionSet,
    params: SplitParams,
) -> Result<SplitTables> {
    let table = LabelTable::read(labels_path)?;
    let tables = split(&table, exclusions, params)?;
    tables.training.write(training_path)?;
    tables.validation.write(validation_path)?;
    info!(
        "Wrote training table to {} and validation table to {}",
        training_path.display(),
        validation_path.display()
    );
    Ok(tables)
}
