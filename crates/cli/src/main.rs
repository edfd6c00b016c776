use std::path::PathBuf;
use std::process;

use clap::Parser;

use facesort_core::detection::infrastructure::keypoint_landmark_predictor::KeypointLandmarkPredictor;
use facesort_core::detection::infrastructure::onnx_arcface_extractor::OnnxArcFaceExtractor;
use facesort_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use facesort_core::identity::domain::assignment::{SortMode, UnknownPolicy};
use facesort_core::pipeline::face_analyzer::FaceAnalyzer;
use facesort_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedSortExecutor;
use facesort_core::pipeline::run_logger::LogRunLogger;
use facesort_core::pipeline::sort_config::SortConfig;
use facesort_core::pipeline::sort_photos_use_case::SortPhotosUseCase;
use facesort_core::placement::domain::placement::PlacementStyle;
use facesort_core::shared::constants::DEFAULT_DISTANCE_THRESHOLD;
use facesort_core::shared::model_resolver::{
    ModelResolver, ModelSpec, FACE_DETECTION_MODEL, FACE_EMBEDDING_MODEL,
};

/// Typical same-person distance limit for L2-normalised ArcFace embeddings.
const ARCFACE_SUGGESTED_THRESHOLD: f64 = 1.05;

/// Sort photos into per-person folders by face.
#[derive(Parser)]
#[command(name = "facesort")]
struct Cli {
    /// Folder of photos to sort.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Folder receiving one sub-folder per person.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Reference photos: `<name>.jpg` or `<name>/<any>.jpg`, one face each.
    #[arg(long, short)]
    reference: Option<PathBuf>,

    /// supervised (references only) or clustering (discover people).
    #[arg(long)]
    mode: Option<SortMode>,

    /// Match when the embedding distance is strictly below this value.
    /// Defaults to 0.6; the bundled ArcFace model works best around 1.0-1.1.
    #[arg(long)]
    threshold: Option<f64>,

    /// Parallel workers, each with its own copy of the models.
    #[arg(long, short = 'j')]
    workers: Option<usize>,

    /// copy (whole photo) or crop (256px face chip).
    #[arg(long)]
    placement: Option<PlacementStyle>,

    /// What supervised mode does with unmatched faces: skip or collect.
    #[arg(long)]
    unknown: Option<UnknownPolicy>,

    /// Process files with identical bytes more than once.
    #[arg(long)]
    no_dedup: bool,

    /// Skip photos already present anywhere in the output folder.
    #[arg(long)]
    resume: bool,

    /// Face detection confidence threshold (0.0-1.0].
    #[arg(long)]
    confidence: Option<f64>,

    /// Directory holding the ONNX models (checked before the cache).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// JSON file with defaults for any of the options above.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(cli)?;
    let paths = config.validate()?;

    let analyzers = build_analyzers(&config)?;

    let use_case = SortPhotosUseCase::new(config, paths, Box::new(ThreadedSortExecutor::new()));
    let mut logger = LogRunLogger::default();
    let summary = use_case.execute(analyzers, &mut logger)?;

    if summary.failed > 0 {
        log::warn!("{} image(s) could not be processed", summary.failed);
    }
    Ok(())
}

/// Starts from the `--config` file (or defaults) and applies explicit flags.
fn build_config(cli: Cli) -> Result<SortConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SortConfig::load(path)?,
        None => SortConfig::default(),
    };

    if cli.input.is_some() {
        config.input_dir = cli.input;
    }
    if cli.output.is_some() {
        config.output_dir = cli.output;
    }
    if cli.reference.is_some() {
        config.reference_dir = cli.reference;
    }
    if cli.model_dir.is_some() {
        config.model_dir = cli.model_dir;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(placement) = cli.placement {
        config.placement = placement;
    }
    if let Some(unknown) = cli.unknown {
        config.unknown = unknown;
    }
    if let Some(confidence) = cli.confidence {
        config.confidence = confidence;
    }
    if cli.no_dedup {
        config.dedup = false;
    }
    if cli.resume {
        config.resume = true;
    }
    Ok(config)
}

/// Loads one set of models per worker. Any failure aborts before sorting.
fn build_analyzers(config: &SortConfig) -> Result<Vec<FaceAnalyzer>, Box<dyn std::error::Error>> {
    let resolver = ModelResolver::new(config.model_dir.clone())?;
    let detector_path = resolve(&resolver, FACE_DETECTION_MODEL)?;
    let embedder_path = resolve(&resolver, FACE_EMBEDDING_MODEL)?;
    if let Some(warning) = threshold_warning(config.threshold) {
        log::warn!("{warning}");
    }

    (0..config.workers)
        .map(|_| -> Result<FaceAnalyzer, Box<dyn std::error::Error>> {
            Ok(FaceAnalyzer::new(
                Box::new(OnnxYoloDetector::new(
                    &detector_path,
                    config.confidence,
                    config.workers,
                )?),
                Box::new(KeypointLandmarkPredictor::new()),
                Box::new(OnnxArcFaceExtractor::new(&embedder_path, config.workers)?),
            ))
        })
        .collect()
}

/// ArcFace distances between photos of one person are usually well above
/// the unit-scale default, which would give nearly every face its own folder.
fn threshold_warning(threshold: f64) -> Option<String> {
    (threshold == DEFAULT_DISTANCE_THRESHOLD).then(|| {
        format!(
            "Threshold {threshold} is tuned for unit-scale descriptors; with the bundled \
             ArcFace model most faces will not match. Consider --threshold {ARCFACE_SUGGESTED_THRESHOLD}"
        )
    })
}

fn resolve(resolver: &ModelResolver, spec: ModelSpec) -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {}", spec.name);
    let downloading = resolver.local(spec).is_none();
    let name = spec.name;
    let path = resolver.resolve(
        spec,
        Some(Box::new(move |downloaded: u64, total: u64| {
            download_progress(name, downloaded, total)
        })),
    )?;
    if downloading {
        eprintln!();
    }
    Ok(path)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
