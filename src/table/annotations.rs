use super::{open_reader, parse_field, parse_rating, required_column, row_number, AnnotationRecord};
use crate::error::{DatasetError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Reads the raw annotation table.
///
/// The header must contain `song_id`, `valence` and `arousal`; any other
/// column is ignored. Rows are returned in file order.
pub fn read_annotations(path: &Path) -> Result<Vec<AnnotationRecord>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let id_col = required_column(&headers, "song_id", path)?;
    let valence_col = required_column(&headers, "valence", path)?;
    let arousal_col = required_column(&headers, "arousal", path)?;
    debug!(
        "Annotation columns in {}: song_id={}, valence={}, arousal={}",
        path.display(),
        id_col,
        valence_col,
        arousal_col
    );

    let mut seen = HashSet::new();
    let mut annotations = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = row_number(&record, i + 2);
        let song_id: u32 = parse_field(&record, id_col, "song_id", row, path)?;
        let valence = parse_rating(&record, valence_col, "valence", row, path)?;
        let arousal = parse_rating(&record, arousal_col, "arousal", row, path)?;

        if !seen.insert(song_id) {
            return Err(DatasetError::InvalidRecord {
                path: path.to_path_buf(),
                row,
                reason: format!("duplicate song_id {}", song_id),
            });
        }
        annotations.push(AnnotationRecord {
            song_id,
            valence,
            arousal,
        });
    }

    info!(
        "Read {} annotations from {}",
        annotations.len(),
        path.display()
    );
    Ok(annotations)
}
