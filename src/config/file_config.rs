use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Table and image locations (can override CLI)
    pub annotations_path: Option<String>,
    pub labels_path: Option<String>,
    pub training_path: Option<String>,
    pub validation_path: Option<String>,
    pub image_dir: Option<String>,
    pub image_ext: Option<String>,

    // Songs to drop wherever the label table is consumed
    pub exclusions: Option<Vec<u32>>,
    pub exclusions_file: Option<String>,

    pub split: Option<SplitConfig>,
    pub loader: Option<LoaderConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SplitConfig {
    pub per_class_training_count: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LoaderConfig {
    pub batch_size: Option<usize>,
    pub num_workers: Option<usize>,
    pub shuffle: Option<bool>,
    /// Seeds the per-epoch shuffle; independent of `[split] seed`.
    pub seed: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            labels_path = "data/mood.csv"
            image_dir = "data/spectrograms"
            exclusions = [137, 146]

            [split]
            per_class_training_count = 200
            seed = 42

            [loader]
            batch_size = 8
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.labels_path.as_deref(), Some("data/mood.csv"));
        assert_eq!(config.exclusions, Some(vec![137, 146]));
        let split = config.split.unwrap();
        assert_eq!(split.per_class_training_count, Some(200));
        assert_eq!(split.seed, Some(42));
        let loader = config.loader.unwrap();
        assert_eq!(loader.batch_size, Some(8));
        assert_eq!(loader.num_workers, None);
        assert_eq!(loader.seed, Some(7));
    }

    #[test]
    fn test_example_config_parses() {
        let config: FileConfig =
            toml::from_str(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(config.exclusions.map(|e| e.len()), Some(20));
        assert_eq!(config.image_ext.as_deref(), Some("png"));
        assert!(config.exclusions_file.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.labels_path.is_none());
        assert!(config.split.is_none());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "exclusions = \"not a list\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/mood-dataset.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
