//! Shared constants for end-to-end tests
//!
//! When the fixture data changes, update only this file.

// ============================================================================
// Annotation Tables
// ============================================================================

/// One song per quadrant, in the shape of the DEAM annotation export
/// (padded header names, extra std columns).
pub const QUADRANT_ANNOTATIONS: &str = "\
song_id, valence_mean, valence_std, arousal_mean, arousal_std, valence, arousal
1, 6, 0.9, 6, 1.1, 6, 6
2, 6, 1.2, 2, 0.8, 6, 2
3, 2, 0.7, 2, 0.9, 2, 2
4, 2, 1.0, 6, 1.3, 2, 6
";

/// Expected labels for [`QUADRANT_ANNOTATIONS`], in input order.
pub const QUADRANT_LABELS: [(u32, &str); 4] = [(1, "happy"), (2, "calm"), (3, "sad"), (4, "tense")];

// ============================================================================
// Exclusions
// ============================================================================

/// Songs whose spectrograms came out black in the DEAM dataset.
pub const DEAM_EXCLUSIONS: [u32; 20] = [
    137, 146, 187, 206, 236, 449, 488, 621, 646, 661, 707, 1016, 1109, 1134, 1142, 1161, 1167,
    1171, 1184, 1429,
];

// ============================================================================
// Images
// ============================================================================

pub const IMAGE_WIDTH: u32 = 16;
pub const IMAGE_HEIGHT: u32 = 8;
