use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mood_dataset::cli_style::{self, get_styles, TableBuilder};
use mood_dataset::config::{AppConfig, CliConfig, FileConfig};
use mood_dataset::dataset::{DataLoader, Dataset, LabelEncoding, MoodDataset};
use mood_dataset::mood::MoodLabel;
use mood_dataset::table::{LabelTable, MoodCounts};
use mood_dataset::{derive, split};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "mood-dataset", version = env!("BUILD_VERSION"), styles = get_styles())]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override flags.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Text file with song ids to exclude, one per line.
    #[clap(long, global = true, value_parser = parse_path)]
    pub exclusions_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derives a mood label for every annotated song.
    ///
    /// The output keeps excluded songs; they are dropped by whoever reads
    /// the label table.
    Derive {
        /// Annotation table with song_id, valence and arousal columns.
        #[clap(long, value_parser = parse_path)]
        annotations: Option<PathBuf>,

        /// Where to write the label table.
        #[clap(long, value_parser = parse_path)]
        output: Option<PathBuf>,

        /// Also write the valence and arousal columns.
        #[clap(long)]
        with_metrics: bool,
    },

    /// Splits a label table into class-balanced training and validation tables.
    Split {
        #[clap(long, value_parser = parse_path)]
        labels: Option<PathBuf>,

        #[clap(long, value_parser = parse_path)]
        training: Option<PathBuf>,

        #[clap(long, value_parser = parse_path)]
        validation: Option<PathBuf>,

        /// Songs per mood in the training table.
        #[clap(long)]
        per_class: Option<usize>,

        /// Seed for reproducible sampling. Omit for a fresh split every run.
        #[clap(long)]
        seed: Option<u64>,
    },

    /// Shows per-mood counts and the first rows of a label table.
    Inspect {
        #[clap(long, value_parser = parse_path)]
        labels: Option<PathBuf>,

        /// Number of rows to show.
        #[clap(long, default_value_t = 10)]
        rows: usize,

        /// Print the summary as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Walks the data loader over a label table and logs every batch.
    Batches {
        #[clap(long, value_parser = parse_path)]
        labels: Option<PathBuf>,

        /// Directory holding one image per song, named {song_id}.{ext}.
        #[clap(long, value_parser = parse_path)]
        images: Option<PathBuf>,

        #[clap(flatten)]
        loader: LoaderArgs,

        /// Hand out one-hot labels instead of mood names.
        #[clap(long)]
        one_hot: bool,

        /// Stop after this many batches.
        #[clap(long)]
        limit: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct LoaderArgs {
    #[clap(long)]
    batch_size: Option<usize>,

    #[clap(long)]
    num_workers: Option<usize>,

    #[clap(long)]
    shuffle: bool,

    /// Seed for the per-epoch shuffle.
    #[clap(long)]
    seed: Option<u64>,

    /// Image file extension.
    #[clap(long)]
    image_ext: Option<String>,
}

impl CliArgs {
    fn cli_config(&self) -> CliConfig {
        let mut cli = CliConfig {
            exclusions_file: self.exclusions_file.clone(),
            ..Default::default()
        };
        match &self.command {
            Command::Derive {
                annotations,
                output,
                ..
            } => {
                cli.annotations_path = annotations.clone();
                cli.labels_path = output.clone();
            }
            Command::Split {
                labels,
                training,
                validation,
                per_class,
                seed,
            } => {
                cli.labels_path = labels.clone();
                cli.training_path = training.clone();
                cli.validation_path = validation.clone();
                cli.per_class_training_count = *per_class;
                cli.seed = *seed;
            }
            Command::Inspect { labels, .. } => {
                cli.labels_path = labels.clone();
            }
            Command::Batches {
                labels,
                images,
                loader,
                ..
            } => {
                cli.labels_path = labels.clone();
                cli.image_dir = images.clone();
                cli.batch_size = loader.batch_size;
                cli.num_workers = loader.num_workers;
                cli.shuffle = loader.shuffle;
                cli.loader_seed = loader.seed;
                cli.image_ext = loader.image_ext.clone();
            }
        }
        cli
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    info!("mood-dataset {}", env!("BUILD_VERSION"));

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.cli_config(), file_config)?;
    if !config.exclusions.is_empty() {
        info!("Excluding {} song ids", config.exclusions.len());
    }

    match cli_args.command {
        Command::Derive { with_metrics, .. } => run_derive(&config, with_metrics),
        Command::Split { .. } => run_split(&config),
        Command::Inspect { rows, json, .. } => run_inspect(&config, rows, json),
        Command::Batches { one_hot, limit, .. } => run_batches(&config, one_hot, limit),
    }
}

fn run_derive(config: &AppConfig, with_metrics: bool) -> Result<()> {
    let annotations = config.annotations_path()?;
    let output = config.labels_path()?;
    let table = derive::derive_file(annotations, output, with_metrics)
        .with_context(|| format!("Failed to derive labels from {:?}", annotations))?;

    cli_style::print_success(&format!(
        "Wrote {} labels to {}",
        table.len(),
        output.display()
    ));
    Ok(())
}

fn run_split(config: &AppConfig) -> Result<()> {
    let labels = config.labels_path()?;
    let training = config.training_path()?;
    let validation = config.validation_path()?;
    let params = config.split_params()?;

    let tables = split::split_file(labels, training, validation, &config.exclusions, params)
        .with_context(|| format!("Failed to split {:?}", labels))?;

    cli_style::print_success(&format!(
        "{} training rows -> {}",
        tables.training.len(),
        training.display()
    ));
    cli_style::print_success(&format!(
        "{} validation rows -> {}",
        tables.validation.len(),
        validation.display()
    ));
    Ok(())
}

#[derive(Serialize)]
struct InspectSummary<'a> {
    path: &'a Path,
    with_metrics: bool,
    #[serde(flatten)]
    counts: MoodCounts,
    rows: Vec<RowSummary>,
}

#[derive(Serialize)]
struct RowSummary {
    song_id: u32,
    mood: MoodLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    valence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arousal: Option<f64>,
}

/// Display only: a missing table is reported, not treated as a failure.
fn run_inspect(config: &AppConfig, rows: usize, json: bool) -> Result<()> {
    let path = config.labels_path()?;
    if !path.exists() {
        warn!("Label table {:?} does not exist, nothing to inspect", path);
        cli_style::print_warning(&format!("No label table at {}", path.display()));
        return Ok(());
    }

    let table = LabelTable::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let counts = table.mood_counts(&config.exclusions);
    let preview: Vec<RowSummary> = table
        .without(&config.exclusions)
        .records()
        .iter()
        .take(rows)
        .map(|r| RowSummary {
            song_id: r.song_id,
            mood: r.mood,
            valence: r.metrics.map(|m| m.valence),
            arousal: r.metrics.map(|m| m.arousal),
        })
        .collect();

    if json {
        let summary = InspectSummary {
            path,
            with_metrics: table.has_metrics(),
            counts,
            rows: preview,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    cli_style::print_section_header("Label Table");
    cli_style::print_key_value("Path", &path.display().to_string());
    cli_style::print_key_value(
        "Layout",
        if table.has_metrics() {
            "song_id, mood, valence, arousal"
        } else {
            "song_id, mood"
        },
    );
    cli_style::print_key_value("Excluded", &counts.excluded.to_string());
    cli_style::print_key_value_highlight("Songs", &counts.total.to_string());
    println!();

    let max = counts.counts.values().copied().max().unwrap_or(0);
    for mood in MoodLabel::CLASS_ORDER {
        cli_style::print_mood_bar(mood, counts.get(mood), max);
    }
    if let Some((mood, per_class)) = counts.max_training_with_validation() {
        println!();
        let value = if per_class == 0 {
            format!("none ({} has {} songs)", mood, counts.get(mood))
        } else {
            format!("--per-class {} (limited by {})", per_class, mood)
        };
        cli_style::print_key_value("Largest split with validation", &value);
    }
    cli_style::print_section_footer();

    if preview.is_empty() {
        cli_style::print_empty_list("No rows");
        return Ok(());
    }
    let mut headers = vec!["song_id", "mood"];
    if table.has_metrics() {
        headers.extend(["valence", "arousal"]);
    }
    let mut rows_table = TableBuilder::new(headers);
    for row in &preview {
        let mut cells = vec![row.song_id.to_string(), row.mood.to_string()];
        if let (Some(valence), Some(arousal)) = (row.valence, row.arousal) {
            cells.push(valence.to_string());
            cells.push(arousal.to_string());
        }
        rows_table.add_row(cells);
    }
    rows_table.print();
    Ok(())
}

fn run_batches(config: &AppConfig, one_hot: bool, limit: Option<usize>) -> Result<()> {
    let labels = config.labels_path()?;
    let images = config.image_dir()?;
    let encoding = if one_hot {
        LabelEncoding::OneHot
    } else {
        LabelEncoding::Category
    };

    let dataset = MoodDataset::open(labels, images, &config.exclusions)
        .with_context(|| format!("Failed to open dataset {:?}", labels))?
        .with_image_ext(config.image_ext.clone())
        .with_encoding(encoding);
    info!("Dataset has {} samples", dataset.len());

    let loader = DataLoader::new(Arc::new(dataset), config.loader)?;
    let total = limit.map_or(loader.num_batches(), |l| l.min(loader.num_batches()));
    for batch in loader.iter().take(total) {
        let batch = batch?;
        let shape = batch.items.first().map(|s| s.image.dim());
        let moods: Vec<String> = batch
            .items
            .iter()
            .map(|s| {
                s.label
                    .mood()
                    .map_or_else(|| "?".to_string(), |m| m.to_string())
            })
            .collect();
        info!(
            "batch {}: {} samples, image shape {:?}, labels [{}]",
            batch.index,
            batch.len(),
            shape,
            moods.join(", ")
        );
    }

    cli_style::print_success(&format!(
        "Loaded {} of {} batches",
        total,
        loader.num_batches()
    ));
    Ok(())
}
