pub mod gnn;
pub mod haplotype_gnn;

use crate::config::Config;
use crate::gnn::windows::make_windows;
use crate::gnn::ReferenceSets;
use crate::tree_sequence::{TreeSequence, TreeSequenceSource};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use log::{debug, info};
use std::path::Path;

pub(crate) fn load_tree_sequence(path: &Path, show_progress: bool) -> Result<TreeSequence> {
    let progress = ProgressBarBuilder::new(format!("Loading {}...", path.display()))
        .with_tick()
        .visible(show_progress)
        .build()?;

    let ts = TreeSequence::from_json_file(path)
        .with_context(|| format!("Failed to load tree sequence from {}", path.display()))?;

    progress.finish_and_clear();
    info!(
        "Loaded {}: {} nodes, {} edges, sequence length {}",
        path.display(),
        ts.num_nodes(),
        ts.edges().len(),
        ts.sequence_length()
    );
    Ok(ts)
}

pub(crate) fn load_reference_sets(ts: &TreeSequence, path: Option<&Path>) -> Result<ReferenceSets> {
    let sets = match path {
        Some(path) => ReferenceSets::from_json_file(path)
            .with_context(|| format!("Failed to read sample sets from {}", path.display()))?,
        None => ReferenceSets::from_populations(ts),
    };
    if sets.is_empty() {
        bail!("No reference sets: supply --sample-sets or assign samples to populations");
    }
    info!("Using {} reference sets: {}", sets.len(), sets.labels().join(", "));
    for set in sets.iter() {
        debug!("Reference set '{}': {} nodes", set.label, set.nodes.len());
    }
    Ok(sets)
}

/// Explicit breakpoints win over a window size; the configured default size
/// applies when neither is given.
pub(crate) fn resolve_windows(
    windows: Option<Vec<f64>>,
    window_size: Option<f64>,
    config: &Config,
    sequence_length: f64,
) -> Result<Option<Vec<f64>>> {
    if windows.is_some() {
        return Ok(windows);
    }
    match window_size.or(config.default_window_size) {
        Some(size) => Ok(Some(make_windows(size, sequence_length)?)),
        None => Ok(None),
    }
}

pub(crate) fn traversal_progress(ts: &TreeSequence, show_progress: bool) -> Result<ProgressBar> {
    let mut breakpoints: Vec<f64> = ts.edges().iter().flat_map(|e| [e.left, e.right]).collect();
    breakpoints.push(0.0);
    breakpoints.push(ts.sequence_length());
    breakpoints.sort_by(|a, b| a.total_cmp(b));
    breakpoints.dedup();
    let num_trees = breakpoints.len() - 1;
    ProgressBarBuilder::new("Computing GNN")
        .with_template("{spinner:.green} [{elapsed_precise}] {msg} {pos}/{len} trees")
        .with_length(num_trees as u64)
        .visible(show_progress)
        .build()
}
