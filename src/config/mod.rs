mod file_config;

pub use file_config::{FileConfig, LoaderConfig, SplitConfig};

use crate::dataset::{LoaderOptions, DEFAULT_BATCH_SIZE, DEFAULT_IMAGE_EXT, DEFAULT_NUM_WORKERS};
use crate::exclusion::ExclusionSet;
use crate::split::SplitParams;
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub annotations_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub training_path: Option<PathBuf>,
    pub validation_path: Option<PathBuf>,
    pub image_dir: Option<PathBuf>,
    pub image_ext: Option<String>,
    pub exclusions_file: Option<PathBuf>,
    pub per_class_training_count: Option<usize>,
    pub seed: Option<u64>,
    pub batch_size: Option<usize>,
    pub num_workers: Option<usize>,
    pub shuffle: bool,
    pub loader_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Paths, each only needed by some commands
    pub annotations_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub training_path: Option<PathBuf>,
    pub validation_path: Option<PathBuf>,
    pub image_dir: Option<PathBuf>,
    pub image_ext: String,

    pub exclusions: ExclusionSet,

    pub per_class_training_count: Option<usize>,
    pub seed: Option<u64>,
    pub loader: LoaderOptions,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let path = |toml: Option<String>, flag: &Option<PathBuf>| {
            toml.map(PathBuf::from).or_else(|| flag.clone())
        };
        let annotations_path = path(file.annotations_path, &cli.annotations_path);
        let labels_path = path(file.labels_path, &cli.labels_path);
        let training_path = path(file.training_path, &cli.training_path);
        let validation_path = path(file.validation_path, &cli.validation_path);
        let image_dir = path(file.image_dir, &cli.image_dir);

        let image_ext = file
            .image_ext
            .or_else(|| cli.image_ext.clone())
            .unwrap_or_else(|| DEFAULT_IMAGE_EXT.to_string());
        let image_ext = image_ext.trim_start_matches('.').to_string();
        if image_ext.is_empty() {
            bail!("image_ext must not be empty");
        }

        // Inline ids and the exclusion file are merged, not overridden
        let mut exclusions: ExclusionSet = file.exclusions.unwrap_or_default().into_iter().collect();
        let exclusions_file = path(file.exclusions_file, &cli.exclusions_file);
        if let Some(exclusions_file) = &exclusions_file {
            let from_file = ExclusionSet::load_file(exclusions_file).with_context(|| {
                format!("Failed to load exclusions from {:?}", exclusions_file)
            })?;
            exclusions.extend(&from_file);
        }

        let split = file.split.unwrap_or_default();
        let per_class_training_count = split
            .per_class_training_count
            .or(cli.per_class_training_count);
        if per_class_training_count == Some(0) {
            bail!("per_class_training_count must be positive");
        }
        let seed = split.seed.or(cli.seed);

        let loader_file = file.loader.unwrap_or_default();
        let batch_size = loader_file
            .batch_size
            .or(cli.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let num_workers = loader_file
            .num_workers
            .or(cli.num_workers)
            .unwrap_or(DEFAULT_NUM_WORKERS);
        if batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if num_workers == 0 {
            bail!("num_workers must be positive");
        }
        let loader = LoaderOptions {
            batch_size,
            num_workers,
            shuffle: loader_file.shuffle.unwrap_or(cli.shuffle),
            seed: loader_file.seed.or(cli.loader_seed),
        };

        Ok(Self {
            annotations_path,
            labels_path,
            training_path,
            validation_path,
            image_dir,
            image_ext,
            exclusions,
            per_class_training_count,
            seed,
            loader,
        })
    }

    pub fn annotations_path(&self) -> Result<&Path> {
        required(&self.annotations_path, "annotations_path", "--annotations")
    }

    pub fn labels_path(&self) -> Result<&Path> {
        required(&self.labels_path, "labels_path", "--labels")
    }

    pub fn training_path(&self) -> Result<&Path> {
        required(&self.training_path, "training_path", "--training")
    }

    pub fn validation_path(&self) -> Result<&Path> {
        required(&self.validation_path, "validation_path", "--validation")
    }

    pub fn image_dir(&self) -> Result<&Path> {
        required(&self.image_dir, "image_dir", "--images")
    }

    pub fn split_params(&self) -> Result<SplitParams> {
        let per_class_training_count = self.per_class_training_count.ok_or_else(|| {
            anyhow!(
                "per_class_training_count must be specified via --per-class or in config file"
            )
        })?;
        Ok(SplitParams {
            per_class_training_count,
            seed: self.seed,
        })
    }
}

fn required<'a>(value: &'a Option<PathBuf>, key: &str, flag: &str) -> Result<&'a Path> {
    value
        .as_deref()
        .ok_or_else(|| anyhow!("{} must be specified via {} or in config file", key, flag))
}
