use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "concord",
    version,
    about = "Human validation of LLM text classifications: stratified sampling and an interactive coding session"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an interactive coding session over a coding CSV
    Code(CodeArgs),
    /// Draw a stratified validation sample from a machine-labeled corpus
    Sample(SampleArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CodeArgs {
    /// Coding CSV (columns: coding_id, quotation, optional description/explanation/variable)
    #[arg(long)]
    pub data: PathBuf,

    /// Previously exported results CSV to resume from
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Directory where exported results are written
    #[arg(long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SampleArgs {
    /// Corpus CSV with machine labels (columns: quotation, category, optional description/explanation/variable)
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the coding/key/stats artifacts
    #[arg(long, default_value = "validation_samples")]
    pub output: PathBuf,

    /// Target number of items per category
    #[arg(long, default_value_t = 50)]
    pub per_category: usize,

    /// Seed for the deterministic draw
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Base name for the generated artifacts (coding_<name>.csv, ...)
    #[arg(long, default_value = "sample")]
    pub name: String,
}
