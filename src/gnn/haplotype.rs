use crate::error::{GnnError, Result};
use crate::gnn::engine::{windowed_genealogical_nearest_neighbours_with_progress, GnnOptions};
use crate::gnn::reference_sets::ReferenceSets;
use crate::tree_sequence::{TreeSequence, TreeSequenceSource};
use indicatif::ProgressBar;
use ndarray::Axis;
use serde::Serialize;

/// GNN proportions of one haplotype over one genomic interval.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HaplotypeGnnRow {
    pub haplotype: usize,
    pub start: f64,
    pub end: f64,
    pub values: Vec<f64>,
}

/// Long-format table of GNN proportions for every haplotype (node) of one
/// individual, one row per haplotype and window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HaplotypeGnnTable {
    pub individual: String,
    pub columns: Vec<String>,
    pub rows: Vec<HaplotypeGnnRow>,
}

pub fn haplotype_gnn(
    ts: &TreeSequence,
    individual: usize,
    reference_sets: &ReferenceSets,
    windows: Option<&[f64]>,
    progress: &ProgressBar,
) -> Result<HaplotypeGnnTable> {
    let ind = ts
        .individuals()
        .get(individual)
        .ok_or(GnnError::UnknownIndividual(individual))?;

    let mut options = GnnOptions::default();
    if let Some(w) = windows {
        options = options.with_windows(w.to_vec());
    }
    let gnn = windowed_genealogical_nearest_neighbours_with_progress(
        ts,
        &ind.nodes,
        reference_sets,
        &options,
        progress,
    )?;

    let mut rows = Vec::new();
    match windows {
        None => {
            // (focal, set)
            for (haplotype, values) in gnn.axis_iter(Axis(0)).enumerate() {
                rows.push(HaplotypeGnnRow {
                    haplotype,
                    start: 0.0,
                    end: ts.sequence_length(),
                    values: values.iter().copied().collect(),
                });
            }
        }
        Some(w) => {
            // (window, focal, set)
            for haplotype in 0..ind.nodes.len() {
                let per_window = gnn.index_axis(Axis(1), haplotype);
                for (i, values) in per_window.axis_iter(Axis(0)).enumerate() {
                    rows.push(HaplotypeGnnRow {
                        haplotype,
                        start: w[i],
                        end: w[i + 1],
                        values: values.iter().copied().collect(),
                    });
                }
            }
        }
    }

    Ok(HaplotypeGnnTable {
        individual: ind.name.clone(),
        columns: reference_sets.labels(),
        rows,
    })
}
