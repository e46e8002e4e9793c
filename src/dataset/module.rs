use super::{DataLoader, Dataset, LabelEncoding, LoaderOptions, MoodDataset, TransformPipeline};
use crate::error::{DatasetError, Result};
use crate::exclusion::ExclusionSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Train,
    Validate,
    Test,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Train, Stage::Validate, Stage::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Train => "train",
            Stage::Validate => "validate",
            Stage::Test => "test",
        }
    }

    /// Training and validation feed the model one-hot targets; the test
    /// stage keeps raw moods for inspection.
    pub fn encoding(&self) -> LabelEncoding {
        match self {
            Stage::Train | Stage::Validate => LabelEncoding::OneHot,
            Stage::Test => LabelEncoding::Category,
        }
    }

    fn slot(&self) -> usize {
        match self {
            Stage::Train => 0,
            Stage::Validate => 1,
            Stage::Test => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" | "fit" => Ok(Stage::Train),
            "validate" | "val" => Ok(Stage::Validate),
            "test" => Ok(Stage::Test),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

/// Label table and image directory backing one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageSource {
    pub labels: PathBuf,
    pub images: PathBuf,
}

impl StageSource {
    pub fn new(labels: impl Into<PathBuf>, images: impl Into<PathBuf>) -> Self {
        Self {
            labels: labels.into(),
            images: images.into(),
        }
    }
}

/// Train/validation/test datasets and the loaders over them.
///
/// A stage must be [`setup`](MoodDataModule::setup) before its loader is
/// requested.
pub struct MoodDataModule {
    sources: [StageSource; 3],
    datasets: [Option<Arc<MoodDataset>>; 3],
    exclusions: ExclusionSet,
    options: LoaderOptions,
    image_ext: String,
    transforms: TransformPipeline,
}

impl MoodDataModule {
    pub fn new(
        train: StageSource,
        validate: StageSource,
        test: StageSource,
        exclusions: ExclusionSet,
        options: LoaderOptions,
    ) -> Self {
        Self {
            sources: [train, validate, test],
            datasets: [None, None, None],
            exclusions,
            options,
            image_ext: super::DEFAULT_IMAGE_EXT.to_string(),
            transforms: TransformPipeline::new(),
        }
    }

    pub fn with_image_ext(mut self, ext: impl Into<String>) -> Self {
        self.image_ext = ext.into();
        self
    }

    pub fn with_transforms(mut self, transforms: TransformPipeline) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn source(&self, stage: Stage) -> &StageSource {
        &self.sources[stage.slot()]
    }

    /// Opens the dataset for `stage`, replacing any previous one.
    pub fn setup(&mut self, stage: Stage) -> Result<()> {
        let source = &self.sources[stage.slot()];
        let dataset = MoodDataset::open(&source.labels, &source.images, &self.exclusions)?
            .with_image_ext(self.image_ext.clone())
            .with_encoding(stage.encoding())
            .with_transforms(self.transforms.clone());
        info!(
            "Set up {} stage: {} samples from {}",
            stage,
            dataset.len(),
            source.labels.display()
        );
        self.datasets[stage.slot()] = Some(Arc::new(dataset));
        Ok(())
    }

    pub fn dataset(&self, stage: Stage) -> Option<&Arc<MoodDataset>> {
        self.datasets[stage.slot()].as_ref()
    }

    /// Loader for `stage`. Only the training loader shuffles.
    pub fn loader(&self, stage: Stage) -> Result<DataLoader<MoodDataset>> {
        let dataset = self.dataset(stage).cloned().ok_or_else(|| {
            DatasetError::InvalidParameter(format!("stage '{}' has not been set up", stage))
        })?;
        let mut options = self.options;
        if stage != Stage::Train {
            options.shuffle = false;
        }
        DataLoader::new(dataset, options)
    }

    pub fn train_loader(&self) -> Result<DataLoader<MoodDataset>> {
        self.loader(Stage::Train)
    }

    pub fn val_loader(&self) -> Result<DataLoader<MoodDataset>> {
        self.loader(Stage::Validate)
    }

    pub fn test_loader(&self) -> Result<DataLoader<MoodDataset>> {
        self.loader(Stage::Test)
    }
}
