//! On-disk fixtures: CSV tables and spectrogram images

use super::constants::*;
use image::{GrayImage, Luma};
use mood_dataset::MoodLabel;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// (valence, arousal) well inside each quadrant, in class order.
const QUADRANT_CENTERS: [(f64, f64); 4] = [(7.0, 3.0), (7.0, 7.0), (3.0, 3.0), (3.0, 7.0)];

/// A temporary directory removed when dropped.
pub struct TestWorkspace {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    /// Annotation table with `sizes[i]` songs in mood `CLASS_ORDER[i]`.
    ///
    /// Ids start at 1 and are interleaved across moods so that no mood
    /// owns a contiguous id range.
    pub fn write_annotations(&self, name: &str, sizes: [usize; 4]) -> PathBuf {
        let mut content = String::from("song_id,valence,arousal\n");
        let mut remaining = sizes;
        let mut song_id = 1;
        while remaining.iter().any(|r| *r > 0) {
            for (class, left) in remaining.iter_mut().enumerate() {
                if *left == 0 {
                    continue;
                }
                *left -= 1;
                let (valence, arousal) = QUADRANT_CENTERS[class];
                // Small per-song jitter keeps values off the midpoint
                let jitter = (song_id % 10) as f64 * 0.1;
                writeln!(content, "{},{},{}", song_id, valence + jitter, arousal - jitter)
                    .expect("Failed to format row");
                song_id += 1;
            }
        }
        self.write_file(name, &content)
    }

    /// Writes one grayscale PNG per id into `dir_name` and returns the
    /// directory. Pixel values are [`image_value`] of the id.
    pub fn write_images(&self, dir_name: &str, ids: impl IntoIterator<Item = u32>) -> PathBuf {
        let dir = self.path(dir_name);
        fs::create_dir_all(&dir).expect("Failed to create image dir");
        for id in ids {
            let img = GrayImage::from_pixel(IMAGE_WIDTH, IMAGE_HEIGHT, Luma([pixel(id)]));
            img.save(dir.join(format!("{}.png", id)))
                .expect("Failed to write fixture image");
        }
        dir
    }
}

fn pixel(song_id: u32) -> u8 {
    (song_id % 256) as u8
}

/// Normalized value every pixel of a fixture image for `song_id` holds.
#[allow(dead_code)]
pub fn image_value(song_id: u32) -> f32 {
    pixel(song_id) as f32 / 255.0
}

/// Mood of song `song_id` in a table produced by
/// [`TestWorkspace::write_annotations`] with equal class sizes.
#[allow(dead_code)]
pub fn interleaved_mood(song_id: u32) -> MoodLabel {
    MoodLabel::CLASS_ORDER[((song_id - 1) % 4) as usize]
}
