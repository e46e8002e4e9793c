//! Indexed access to (spectrogram, mood) samples.
//!
//! [`MoodDataset`] reads the label table once at construction and then
//! serves samples by position. It holds no mutable state after `open`, so
//! a single instance can be shared across loader workers.

mod loader;
mod module;
mod transform;

pub use loader::{
    Batch, Batches, DataLoader, LoaderOptions, DEFAULT_BATCH_SIZE, DEFAULT_NUM_WORKERS,
};
pub use module::{MoodDataModule, Stage, StageSource};
pub use transform::{Normalize, Transform, TransformPipeline};

use crate::error::{DatasetError, Result};
use crate::exclusion::ExclusionSet;
use crate::mood::MoodLabel;
use crate::table::{LabelTable, LabeledRecord};
use ndarray::{Array1, Array2};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Single-channel image with values in `[0, 1]`, shaped `(height, width)`.
pub type ImageTensor = Array2<f32>;

pub const DEFAULT_IMAGE_EXT: &str = "png";

/// Random access to a fixed-size collection of samples.
///
/// Implementations must tolerate concurrent `get` calls for different
/// indices.
pub trait Dataset: Send + Sync {
    type Item: Send;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<Self::Item>;
}

/// How labels are handed out by [`MoodDataset::get`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelEncoding {
    /// The raw mood, for inspection and testing.
    #[default]
    Category,
    /// A one-hot vector over [`MoodLabel::CLASS_ORDER`], for training.
    OneHot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SampleLabel {
    Category(MoodLabel),
    OneHot(Array1<f32>),
}

impl SampleLabel {
    pub fn encode(mood: MoodLabel, encoding: LabelEncoding) -> Self {
        match encoding {
            LabelEncoding::Category => SampleLabel::Category(mood),
            LabelEncoding::OneHot => SampleLabel::OneHot(one_hot(mood)),
        }
    }

    /// The mood behind this label. A one-hot vector resolves to its
    /// largest component.
    pub fn mood(&self) -> Option<MoodLabel> {
        match self {
            SampleLabel::Category(mood) => Some(*mood),
            SampleLabel::OneHot(vector) => vector
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .and_then(|(i, _)| MoodLabel::CLASS_ORDER.get(i).copied()),
        }
    }
}

pub fn one_hot(mood: MoodLabel) -> Array1<f32> {
    let mut vector = Array1::zeros(MoodLabel::CLASS_ORDER.len());
    vector[mood.class_index()] = 1.0;
    vector
}

/// One dataset item.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub song_id: u32,
    pub image: ImageTensor,
    pub label: SampleLabel,
}

/// Decodes an image file into a grayscale tensor.
pub fn load_image(path: &Path) -> Result<ImageTensor> {
    let gray = image::open(path)?.to_luma32f();
    let (width, height) = gray.dimensions();
    let tensor = Array2::from_shape_vec((height as usize, width as usize), gray.into_raw())?;
    Ok(tensor)
}

/// Spectrogram dataset over a label table and an image directory.
///
/// Images are resolved as `{image_dir}/{song_id}.{image_ext}` and read
/// from disk on every `get`.
#[derive(Debug)]
pub struct MoodDataset {
    records: Vec<LabeledRecord>,
    image_dir: PathBuf,
    image_ext: String,
    encoding: LabelEncoding,
    transforms: TransformPipeline,
}

impl MoodDataset {
    /// Reads `label_path` and drops excluded songs.
    pub fn open(label_path: &Path, image_dir: &Path, exclusions: &ExclusionSet) -> Result<Self> {
        let table = LabelTable::read(label_path)?;
        Self::new(&table, image_dir, exclusions)
    }

    pub fn new(table: &LabelTable, image_dir: &Path, exclusions: &ExclusionSet) -> Result<Self> {
        if !image_dir.is_dir() {
            return Err(DatasetError::SourceNotFound(image_dir.to_path_buf()));
        }
        let records = table.without(exclusions).into_records();
        info!(
            "Dataset over {} songs ({} excluded), images in {}",
            records.len(),
            table.len() - records.len(),
            image_dir.display()
        );
        Ok(Self {
            records,
            image_dir: image_dir.to_path_buf(),
            image_ext: DEFAULT_IMAGE_EXT.to_string(),
            encoding: LabelEncoding::default(),
            transforms: TransformPipeline::new(),
        })
    }

    pub fn with_encoding(mut self, encoding: LabelEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Image file extension, without the dot.
    pub fn with_image_ext(mut self, ext: impl Into<String>) -> Self {
        self.image_ext = ext.into();
        self
    }

    pub fn with_transforms(mut self, transforms: TransformPipeline) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn encoding(&self) -> LabelEncoding {
        self.encoding
    }

    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    fn record(&self, index: usize) -> Result<&LabeledRecord> {
        self.records.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    /// Where the image for row `index` is expected to be.
    pub fn image_path(&self, index: usize) -> Result<PathBuf> {
        let record = self.record(index)?;
        Ok(self
            .image_dir
            .join(format!("{}.{}", record.song_id, self.image_ext)))
    }
}

impl Dataset for MoodDataset {
    type Item = Sample;

    fn len(&self) -> usize {
        self.records.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let record = self.record(index)?;
        let path = self.image_path(index)?;
        if !path.is_file() {
            return Err(DatasetError::ImageNotFound(path));
        }

        let image = self.transforms.apply(load_image(&path)?)?;
        debug!(
            "sample {} -> song {} ({}), image {:?}",
            index,
            record.song_id,
            record.mood,
            image.dim()
        );
        Ok(Sample {
            song_id: record.song_id,
            image,
            label: SampleLabel::encode(record.mood, self.encoding),
        })
    }
}
