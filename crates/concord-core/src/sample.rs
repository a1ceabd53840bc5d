//! Stratified sampler: draws a balanced validation subset from a
//! machine-labeled corpus, hiding the machine labels from the coding file.
//!
//! Three artifacts are produced per run: the coding CSV handed to human
//! coders, a key CSV that keeps the machine label for the later agreement
//! analysis, and a JSON stats file describing the draw.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::SessionError;
use crate::judgment::Category;

/// Quotations shorter than this are noise from upstream segmentation.
const MIN_QUOTE_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Target number of items drawn per category.
    pub per_category: usize,
    /// Seed for the deterministic draw.
    pub seed: u64,
    /// Prefix for generated coding ids (`ITEM_0000`, ...).
    pub id_prefix: String,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            per_category: 50,
            seed: 42,
            id_prefix: "ITEM".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleStats {
    pub n_items: usize,
    pub n_skipped_short: usize,
    pub n_skipped_unlabeled: usize,
    pub per_category: BTreeMap<String, usize>,
    pub per_variable: BTreeMap<String, usize>,
    pub seed: u64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct SampleArtifacts {
    pub coding_path: PathBuf,
    pub key_path: PathBuf,
    pub stats_path: PathBuf,
    pub stats: SampleStats,
}

#[derive(Debug, Clone, Deserialize)]
struct CorpusRow {
    quotation: String,
    category: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    variable: Option<String>,
}

struct LabeledRow {
    quotation: String,
    category: Category,
    description: String,
    explanation: String,
    variable: String,
}

fn load_corpus(input: &Path) -> Result<(Vec<LabeledRow>, usize, usize), SessionError> {
    let label = input.display().to_string();
    let load_err = |reason: String| SessionError::Load {
        path: label.clone(),
        reason,
    };

    let file = File::open(input).map_err(|e| load_err(e.to_string()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr.headers().map_err(|e| load_err(e.to_string()))?.clone();
    let missing: Vec<&str> = ["quotation", "category"]
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .collect();
    if !missing.is_empty() {
        return Err(load_err(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    let mut skipped_short = 0usize;
    let mut skipped_unlabeled = 0usize;
    for record in rdr.deserialize::<CorpusRow>() {
        let raw = record.map_err(|e| load_err(e.to_string()))?;
        if raw.quotation.trim().len() < MIN_QUOTE_LEN {
            skipped_short += 1;
            continue;
        }
        let category = match Category::from_str(&raw.category) {
            Ok(c) => c,
            Err(_) => {
                warn!(raw = %raw.category, "corpus row has unknown category, skipping");
                skipped_unlabeled += 1;
                continue;
            }
        };
        rows.push(LabeledRow {
            quotation: raw.quotation,
            category,
            description: raw.description.unwrap_or_default(),
            explanation: raw.explanation.unwrap_or_default(),
            variable: raw.variable.unwrap_or_default(),
        });
    }
    Ok((rows, skipped_short, skipped_unlabeled))
}

/// Draw the stratified sample and write the coding/key/stats artifacts.
pub fn run(
    input: &Path,
    output_dir: &Path,
    name: &str,
    cfg: &SampleConfig,
) -> Result<SampleArtifacts, SessionError> {
    let (rows, skipped_short, skipped_unlabeled) = load_corpus(input)?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    // Stratified draw: up to per_category from each label, then one shuffle
    // so coders see categories interleaved.
    let mut drawn: Vec<&LabeledRow> = Vec::new();
    for category in Category::ALL {
        let pool: Vec<&LabeledRow> = rows.iter().filter(|r| r.category == category).collect();
        let take = cfg.per_category.min(pool.len());
        for i in index::sample(&mut rng, pool.len(), take) {
            drawn.push(pool[i]);
        }
        info!(category = %category, sampled = take, available = pool.len(), "stratum drawn");
    }
    drawn.shuffle(&mut rng);

    std::fs::create_dir_all(output_dir)?;
    let coding_path = output_dir.join(format!("coding_{name}.csv"));
    let key_path = output_dir.join(format!("key_{name}.csv"));
    let stats_path = output_dir.join(format!("stats_{name}.json"));

    let mut coding = csv::Writer::from_writer(File::create(&coding_path)?);
    coding.write_record(["coding_id", "quotation", "description", "explanation", "variable"])?;
    let mut key = csv::Writer::from_writer(File::create(&key_path)?);
    key.write_record([
        "coding_id",
        "quotation",
        "description",
        "explanation",
        "variable",
        "model_category",
    ])?;

    let mut per_category: BTreeMap<String, usize> = BTreeMap::new();
    let mut per_variable: BTreeMap<String, usize> = BTreeMap::new();
    for (i, row) in drawn.iter().enumerate() {
        let coding_id = format!("{}_{:04}", cfg.id_prefix, i);
        coding.write_record([
            coding_id.as_str(),
            &row.quotation,
            &row.description,
            &row.explanation,
            &row.variable,
        ])?;
        key.write_record([
            coding_id.as_str(),
            &row.quotation,
            &row.description,
            &row.explanation,
            &row.variable,
            row.category.as_str(),
        ])?;
        *per_category.entry(row.category.to_string()).or_default() += 1;
        if !row.variable.is_empty() {
            *per_variable.entry(row.variable.clone()).or_default() += 1;
        }
    }
    coding.flush()?;
    key.flush()?;

    let stats = SampleStats {
        n_items: drawn.len(),
        n_skipped_short: skipped_short,
        n_skipped_unlabeled: skipped_unlabeled,
        per_category,
        per_variable,
        seed: cfg.seed,
        created_at: Utc::now().to_rfc3339(),
    };
    let stats_file = File::create(&stats_path)?;
    serde_json::to_writer_pretty(stats_file, &stats)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    info!(
        sampled = stats.n_items,
        coding = %coding_path.display(),
        key = %key_path.display(),
        "sample artifacts written"
    );

    Ok(SampleArtifacts {
        coding_path,
        key_path,
        stats_path,
        stats,
    })
}
