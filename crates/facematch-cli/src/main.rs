use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use facematch_core::{
    CosineScorer, Embedding, FaceLocation, Gallery, LabelledEmbedding, Matcher, Prediction,
    ScoreError,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

mod config;

#[derive(Parser)]
#[command(name = "facematch", about = "Face identification over labeled embedding galleries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScorerKind {
    /// 1 − euclidean distance (the default)
    Euclidean,
    /// Cosine similarity; thresholds are not interchangeable with euclidean
    Cosine,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a gallery file from labeled reference embeddings
    Build {
        /// JSON file with [{"label": ..., "embedding": {"values": [...]}}] entries
        #[arg(short, long)]
        references: PathBuf,
        /// Output gallery file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Identify a single query embedding against a gallery
    Identify {
        #[arg(short, long)]
        gallery: PathBuf,
        /// JSON file with {"embedding": {...}, "location": {...}}
        #[arg(short, long)]
        query: PathBuf,
        /// Minimum aggregate score for a match (default: FACEMATCH_THRESHOLD or 0.5)
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Reference samples per label to average (default: FACEMATCH_TOP_K or 3)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        #[arg(long, value_enum, default_value = "euclidean")]
        scorer: ScorerKind,
    },
    /// Identify every query in a file, one result line per query, in order
    Batch {
        #[arg(short, long)]
        gallery: PathBuf,
        /// JSON file with an array of {"embedding": {...}, "location": {...}}
        #[arg(short, long)]
        queries: PathBuf,
        #[arg(short, long)]
        threshold: Option<f32>,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        #[arg(long, value_enum, default_value = "euclidean")]
        scorer: ScorerKind,
    },
    /// List gallery labels with their reference sample counts
    List {
        #[arg(short, long)]
        gallery: PathBuf,
    },
}

/// One query as stored on disk. The location is optional; it defaults to a
/// zeroed region when the caller has no detector geometry to attach.
#[derive(Deserialize)]
struct QueryFile {
    embedding: Embedding,
    #[serde(default)]
    location: FaceLocation,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let defaults = config::Defaults::from_env();

    match cli.command {
        Commands::Build { references, output } => run_build(&references, &output),
        Commands::Identify {
            gallery,
            query,
            threshold,
            top_k,
            scorer,
        } => run_identify(
            &gallery,
            &query,
            threshold.unwrap_or(defaults.threshold),
            top_k.unwrap_or(defaults.top_k),
            scorer,
        ),
        Commands::Batch {
            gallery,
            queries,
            threshold,
            top_k,
            scorer,
        } => run_batch(
            &gallery,
            &queries,
            threshold.unwrap_or(defaults.threshold),
            top_k.unwrap_or(defaults.top_k),
            scorer,
        ),
        Commands::List { gallery } => run_list(&gallery),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn load_gallery(path: &Path) -> Result<Gallery> {
    let entries: Vec<LabelledEmbedding> = read_json(path)?;
    let gallery = Gallery::from_entries(entries)
        .with_context(|| format!("loading gallery {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        entries = gallery.len(),
        "gallery loaded"
    );
    Ok(gallery)
}

fn run_build(references: &Path, output: &Path) -> Result<()> {
    let entries: Vec<LabelledEmbedding> = read_json(references)?;
    let gallery = Gallery::from_entries(entries).context("assembling gallery")?;

    let json = serde_json::to_string_pretty(gallery.entries())?;
    std::fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;

    println!(
        "gallery written to {}: {} entries, {} labels",
        output.display(),
        gallery.len(),
        gallery.label_counts().len()
    );
    Ok(())
}

fn run_identify(
    gallery_path: &Path,
    query_path: &Path,
    threshold: f32,
    top_k: usize,
    scorer: ScorerKind,
) -> Result<()> {
    let gallery = load_gallery(gallery_path)?;
    let query: QueryFile = read_json(query_path)?;

    let prediction = identify_one(
        scorer,
        &query.embedding,
        &gallery,
        &query.location,
        threshold,
        top_k,
    )?;

    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

fn run_batch(
    gallery_path: &Path,
    queries_path: &Path,
    threshold: f32,
    top_k: usize,
    scorer: ScorerKind,
) -> Result<()> {
    let gallery = load_gallery(gallery_path)?;
    let queries: Vec<QueryFile> = read_json(queries_path)?;
    let queries: Vec<(Embedding, FaceLocation)> = queries
        .into_iter()
        .map(|q| (q.embedding, q.location))
        .collect();

    let results = identify_batch(scorer, &queries, &gallery, threshold, top_k)?;
    for result in results {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

fn run_list(gallery_path: &Path) -> Result<()> {
    let gallery = load_gallery(gallery_path)?;
    println!("{}", serde_json::to_string_pretty(&gallery.label_counts())?);
    Ok(())
}

fn identify_one(
    kind: ScorerKind,
    query: &Embedding,
    gallery: &Gallery,
    location: &FaceLocation,
    threshold: f32,
    top_k: usize,
) -> Result<Option<Prediction>, ScoreError> {
    match kind {
        ScorerKind::Euclidean => {
            Matcher::new().identify(query, gallery, location, threshold, top_k)
        }
        ScorerKind::Cosine => Matcher::with_scorer(CosineScorer)
            .identify(query, gallery, location, threshold, top_k),
    }
}

fn identify_batch(
    kind: ScorerKind,
    queries: &[(Embedding, FaceLocation)],
    gallery: &Gallery,
    threshold: f32,
    top_k: usize,
) -> Result<Vec<Option<Prediction>>, ScoreError> {
    match kind {
        ScorerKind::Euclidean => Matcher::new().identify_all(queries, gallery, threshold, top_k),
        ScorerKind::Cosine => {
            Matcher::with_scorer(CosineScorer).identify_all(queries, gallery, threshold, top_k)
        }
    }
}
