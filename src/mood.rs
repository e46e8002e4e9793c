//! Mood categories derived from valence/arousal annotations.

use crate::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Midpoint of the 0-10 annotation scale splitting the four quadrants.
pub const QUADRANT_MIDPOINT: f64 = 5.0;

/// Inclusive bounds of the annotation scale.
pub const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// One of the four valence/arousal quadrants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Calm,
    Happy,
    Sad,
    Tense,
}

impl MoodLabel {
    /// Fixed class order used for one-hot encoding and for stratified buckets.
    pub const CLASS_ORDER: [MoodLabel; 4] = [
        MoodLabel::Calm,
        MoodLabel::Happy,
        MoodLabel::Sad,
        MoodLabel::Tense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Calm => "calm",
            MoodLabel::Happy => "happy",
            MoodLabel::Sad => "sad",
            MoodLabel::Tense => "tense",
        }
    }

    /// Position of this label in [`MoodLabel::CLASS_ORDER`].
    pub fn class_index(&self) -> usize {
        match self {
            MoodLabel::Calm => 0,
            MoodLabel::Happy => 1,
            MoodLabel::Sad => 2,
            MoodLabel::Tense => 3,
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calm" => Ok(MoodLabel::Calm),
            "happy" => Ok(MoodLabel::Happy),
            "sad" => Ok(MoodLabel::Sad),
            "tense" => Ok(MoodLabel::Tense),
            other => Err(format!("unknown mood '{}'", other)),
        }
    }
}

/// Maps a (valence, arousal) pair to its quadrant.
///
/// Values exactly on the midpoint count as "high": `classify(5.0, 5.0)` is
/// happy, `classify(5.0, 4.999)` is calm.
pub fn classify(valence: f64, arousal: f64) -> MoodLabel {
    let positive = valence >= QUADRANT_MIDPOINT;
    let energetic = arousal >= QUADRANT_MIDPOINT;
    match (positive, energetic) {
        (true, false) => MoodLabel::Calm,
        (true, true) => MoodLabel::Happy,
        (false, false) => MoodLabel::Sad,
        (false, true) => MoodLabel::Tense,
    }
}

/// Source annotations carried by a "with metrics" label table, plus the
/// scalars derived from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoodMetrics {
    pub valence: f64,
    pub arousal: f64,
    /// `|valence - arousal|`
    pub difference: f64,
    /// `valence * difference / arousal`
    pub temp: f64,
}

impl MoodMetrics {
    /// Computes the derived scalars, failing when `temp` is not finite.
    pub fn compute(song_id: u32, valence: f64, arousal: f64) -> Result<Self> {
        let difference = (valence - arousal).abs();
        let temp = valence * difference / arousal;
        if !temp.is_finite() {
            return Err(DatasetError::NonFiniteMetric {
                song_id,
                valence,
                arousal,
            });
        }
        Ok(Self {
            valence,
            arousal,
            difference,
            temp,
        })
    }
}
