use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Hide progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Tsv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Windowed genealogical nearest neighbours for a set of focal nodes
    Gnn {
        /// Tree sequence tables in JSON
        trees_file: PathBuf,

        /// Focal node ids, comma separated (defaults to every sample)
        #[arg(long, value_delimiter = ',')]
        focal: Vec<usize>,

        /// Reference sets as JSON (defaults to sample populations)
        #[arg(long)]
        sample_sets: Option<PathBuf>,

        /// Genomic window breakpoints, comma separated
        #[arg(long, value_delimiter = ',', conflicts_with = "window_size")]
        windows: Option<Vec<f64>>,

        /// Size of evenly spaced genomic windows
        #[arg(long)]
        window_size: Option<f64>,

        /// Time window breakpoints, comma separated
        #[arg(long, value_delimiter = ',')]
        time_windows: Option<Vec<f64>>,

        /// Do not normalise by genomic span
        #[arg(long)]
        no_span_normalise: bool,

        /// Do not normalise by time windows
        #[arg(long)]
        no_time_normalise: bool,

        /// Output file
        #[arg(short = 'o', long = "output", default_value = "gnn.json")]
        output_file: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// GNN proportions along the haplotypes of one individual
    HaplotypeGnn {
        /// Tree sequence tables in JSON
        trees_file: PathBuf,

        /// Individual index
        #[arg(long)]
        individual: usize,

        /// Reference sets as JSON (defaults to sample populations)
        #[arg(long)]
        sample_sets: Option<PathBuf>,

        /// Genomic window breakpoints, comma separated
        #[arg(long, value_delimiter = ',', conflicts_with = "window_size")]
        windows: Option<Vec<f64>>,

        /// Size of evenly spaced genomic windows
        #[arg(long)]
        window_size: Option<f64>,

        /// Output file
        #[arg(short = 'o', long = "output", default_value = "haplotype_gnn.tsv")]
        output_file: PathBuf,

        #[arg(long, value_enum, default_value = "tsv")]
        format: OutputFormat,
    },
}
