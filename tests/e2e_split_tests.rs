//! End-to-end tests for the stratified split
//!
//! Derive a label table on disk, split it into training and validation
//! files and check the written tables.

mod common;

use common::{interleaved_mood, TestWorkspace};
use mood_dataset::derive::derive_file;
use mood_dataset::split::split_file;
use mood_dataset::{DatasetError, ExclusionSet, LabelTable, MoodLabel, SplitParams};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

struct Split {
    training: PathBuf,
    validation: PathBuf,
}

fn derive_labels(workspace: &TestWorkspace, sizes: [usize; 4]) -> PathBuf {
    let annotations = workspace.write_annotations("annotations.csv", sizes);
    let labels = workspace.path("mood.csv");
    derive_file(&annotations, &labels, false).unwrap();
    labels
}

fn run_split(
    workspace: &TestWorkspace,
    labels: &Path,
    name: &str,
    exclusions: &ExclusionSet,
    params: SplitParams,
) -> Result<Split, DatasetError> {
    let split = Split {
        training: workspace.path(&format!("{}/mood_training.csv", name)),
        validation: workspace.path(&format!("{}/mood_validation.csv", name)),
    };
    split_file(labels, &split.training, &split.validation, exclusions, params)?;
    Ok(split)
}

fn ids(table: &LabelTable) -> HashSet<u32> {
    table.records().iter().map(|r| r.song_id).collect()
}

fn count(table: &LabelTable, mood: MoodLabel) -> usize {
    table.records().iter().filter(|r| r.mood == mood).count()
}

#[test]
fn test_split_writes_balanced_disjoint_tables() {
    let workspace = TestWorkspace::new();
    let labels = derive_labels(&workspace, [30, 25, 40, 22]);
    // Song 1 is calm and song 2 is happy
    let exclusions: ExclusionSet = [1, 2].into_iter().collect();
    let params = SplitParams {
        per_class_training_count: 10,
        seed: Some(42),
    };

    let split = run_split(&workspace, &labels, "out", &exclusions, params).unwrap();
    let training = LabelTable::read(&split.training).unwrap();
    let validation = LabelTable::read(&split.validation).unwrap();

    assert_eq!(training.len(), 40);
    // Leftovers: calm 19, happy 14, sad 30, tense 12
    assert_eq!(validation.len(), 48);
    for mood in MoodLabel::CLASS_ORDER {
        assert_eq!(count(&training, mood), 10);
        assert_eq!(count(&validation, mood), 12);
    }

    let training_ids = ids(&training);
    let validation_ids = ids(&validation);
    assert!(training_ids.is_disjoint(&validation_ids));
    for id in exclusions.ids() {
        assert!(!training_ids.contains(&id));
        assert!(!validation_ids.contains(&id));
    }
}

#[test]
fn test_split_files_are_reproducible_with_seed() {
    let workspace = TestWorkspace::new();
    let labels = derive_labels(&workspace, [20, 20, 20, 20]);
    let params = SplitParams {
        per_class_training_count: 8,
        seed: Some(2024),
    };

    let first = run_split(&workspace, &labels, "first", &ExclusionSet::new(), params).unwrap();
    let second = run_split(&workspace, &labels, "second", &ExclusionSet::new(), params).unwrap();

    assert_eq!(
        fs::read(&first.training).unwrap(),
        fs::read(&second.training).unwrap()
    );
    assert_eq!(
        fs::read(&first.validation).unwrap(),
        fs::read(&second.validation).unwrap()
    );
}

#[test]
fn test_split_tables_keep_labels_from_source() {
    let workspace = TestWorkspace::new();
    let labels = derive_labels(&workspace, [12, 12, 12, 12]);
    let params = SplitParams {
        per_class_training_count: 5,
        seed: Some(3),
    };

    let split = run_split(&workspace, &labels, "out", &ExclusionSet::new(), params).unwrap();
    for path in [&split.training, &split.validation] {
        let table = LabelTable::read(path).unwrap();
        assert!(!table.has_metrics());
        for record in table.records() {
            assert_eq!(record.mood, interleaved_mood(record.song_id));
        }
        let sorted: Vec<u32> = {
            let mut ids: Vec<u32> = table.records().iter().map(|r| r.song_id).collect();
            ids.sort();
            ids
        };
        let in_file: Vec<u32> = table.records().iter().map(|r| r.song_id).collect();
        assert_eq!(in_file, sorted);
    }
}

#[test]
fn test_split_insufficient_class_writes_nothing() {
    let workspace = TestWorkspace::new();
    let labels = derive_labels(&workspace, [200, 200, 150, 200]);
    let params = SplitParams {
        per_class_training_count: 200,
        seed: Some(1),
    };

    let err = run_split(&workspace, &labels, "out", &ExclusionSet::new(), params)
        .err()
        .unwrap();
    match err {
        DatasetError::InsufficientData {
            mood,
            requested,
            available,
        } => {
            assert_eq!(mood, MoodLabel::Sad);
            assert_eq!(requested, 200);
            assert_eq!(available, 150);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!workspace.path("out/mood_training.csv").exists());
}

#[test]
fn test_split_missing_labels() {
    let workspace = TestWorkspace::new();
    let params = SplitParams {
        per_class_training_count: 1,
        seed: None,
    };
    let err = run_split(
        &workspace,
        &workspace.path("missing.csv"),
        "out",
        &ExclusionSet::new(),
        params,
    )
    .err()
    .unwrap();
    assert!(matches!(err, DatasetError::SourceNotFound(_)));
}
