//! Windowed genealogical nearest neighbours.
//!
//! The trees are visited left to right through their edge differences while
//! every node keeps a count of the reference samples below it, one count per
//! reference set. For each focal sample the nearest ancestor that has some
//! reference sample besides the focal itself defines its genealogical
//! neighbourhood; the per-set proportions in that clade are accumulated per
//! genomic window and per time window, weighted by the span of the tree.

use crate::error::{GnnError, Result};
use crate::gnn::reference_sets::ReferenceSets;
use crate::gnn::windows::{parse_time_windows, parse_windows, time_window_index};
use crate::tree_sequence::{Edge, NodeId, TreeSequenceSource};
use indicatif::ProgressBar;
use log::debug;
use ndarray::{s, Array3, Array4, ArrayD, Axis};

#[derive(Debug, Clone)]
pub struct GnnOptions {
    pub windows: Option<Vec<f64>>,
    pub time_windows: Option<Vec<f64>>,
    pub span_normalise: bool,
    pub time_normalise: bool,
}

impl Default for GnnOptions {
    fn default() -> Self {
        Self {
            windows: None,
            time_windows: None,
            span_normalise: true,
            time_normalise: true,
        }
    }
}

impl GnnOptions {
    pub fn with_windows(mut self, windows: Vec<f64>) -> Self {
        self.windows = Some(windows);
        self
    }

    pub fn with_time_windows(mut self, time_windows: Vec<f64>) -> Self {
        self.time_windows = Some(time_windows);
        self
    }

    pub fn with_normalisation(mut self, span_normalise: bool, time_normalise: bool) -> Self {
        self.span_normalise = span_normalise;
        self.time_normalise = time_normalise;
        self
    }
}

/// Parent pointers and per-set reference sample counts for the current tree.
///
/// `counts[u * K + k]` is the number of set-`k` reference samples in the
/// subtree of `u`, the node itself included.
pub(crate) struct SampleCounts {
    parent: Vec<Option<NodeId>>,
    counts: Vec<u32>,
    num_sets: usize,
    scratch: Vec<u32>,
}

impl SampleCounts {
    pub(crate) fn new(num_nodes: usize, membership: &[Option<usize>], num_sets: usize) -> Self {
        let mut counts = vec![0u32; num_nodes * num_sets];
        for (u, set) in membership.iter().enumerate() {
            if let Some(k) = set {
                counts[u * num_sets + k] = 1;
            }
        }
        Self {
            parent: vec![None; num_nodes],
            counts,
            num_sets,
            scratch: vec![0; num_sets],
        }
    }

    pub(crate) fn parent(&self, u: NodeId) -> Option<NodeId> {
        self.parent[u]
    }

    pub(crate) fn counts(&self, u: NodeId) -> &[u32] {
        &self.counts[u * self.num_sets..(u + 1) * self.num_sets]
    }

    pub(crate) fn total(&self, u: NodeId) -> u32 {
        self.counts(u).iter().sum()
    }

    pub(crate) fn remove_edge(&mut self, edge: &Edge) {
        self.parent[edge.child] = None;
        self.propagate(edge.parent, edge.child, false);
    }

    pub(crate) fn insert_edge(&mut self, edge: &Edge) {
        self.parent[edge.child] = Some(edge.parent);
        self.propagate(edge.parent, edge.child, true);
    }

    /// Add (or subtract) the child's counts on the path from `start` to the root.
    fn propagate(&mut self, start: NodeId, child: NodeId, add: bool) {
        let k = self.num_sets;
        self.scratch
            .copy_from_slice(&self.counts[child * k..(child + 1) * k]);
        let mut v = Some(start);
        while let Some(node) = v {
            let row = &mut self.counts[node * k..(node + 1) * k];
            for (c, d) in row.iter_mut().zip(&self.scratch) {
                if add {
                    *c += d;
                } else {
                    *c -= d;
                }
            }
            v = self.parent[node];
        }
    }
}

/// Compute the windowed GNN statistic. See
/// [`windowed_genealogical_nearest_neighbours_with_progress`].
pub fn windowed_genealogical_nearest_neighbours(
    ts: &dyn TreeSequenceSource,
    focal: &[NodeId],
    reference_sets: &ReferenceSets,
    options: &GnnOptions,
) -> Result<ArrayD<f64>> {
    windowed_genealogical_nearest_neighbours_with_progress(
        ts,
        focal,
        reference_sets,
        options,
        &ProgressBar::hidden(),
    )
}

/// Compute the windowed GNN statistic, ticking `progress` once per tree.
///
/// The result has axes `(window, time_window, focal, reference_set)`; the
/// window and time-window axes are dropped when the corresponding option was
/// not supplied. Cells where no tree contributed are `NaN`.
pub fn windowed_genealogical_nearest_neighbours_with_progress(
    ts: &dyn TreeSequenceSource,
    focal: &[NodeId],
    reference_sets: &ReferenceSets,
    options: &GnnOptions,
    progress: &ProgressBar,
) -> Result<ArrayD<f64>> {
    let num_nodes = ts.num_nodes();
    if focal.is_empty() {
        return Err(GnnError::EmptyFocal);
    }
    if let Some(&u) = focal.iter().find(|&&u| u >= num_nodes) {
        return Err(GnnError::NodeOutOfRange {
            node: u,
            num_nodes,
            what: "focal samples",
        });
    }
    if reference_sets.is_empty() {
        return Err(GnnError::EmptyReferenceSets);
    }
    let normalisation = Normalisation::from_flags(options.span_normalise, options.time_normalise)?;
    let reference_set_map = reference_sets.membership(num_nodes)?;

    let windows_used = options.windows.is_some();
    let time_windows_used = options.time_windows.is_some();
    let windows = parse_windows(options.windows.as_deref(), ts.sequence_length())?;
    let time_windows = parse_time_windows(options.time_windows.as_deref(), ts.max_root_time())?;
    let num_windows = windows.len() - 1;
    let num_time_windows = time_windows.len() - 1;
    let num_focal = focal.len();
    let num_sets = reference_sets.len();

    debug!(
        "GNN: {} focal, {} reference sets, {} windows, {} time windows",
        num_focal, num_sets, num_windows, num_time_windows
    );

    let mut a = Array4::<f64>::zeros((num_windows, num_time_windows, num_focal, num_sets));
    let mut norm = Array3::<f64>::zeros((num_windows, num_time_windows, num_focal));
    let mut state = SampleCounts::new(num_nodes, &reference_set_map, num_sets);
    let time = ts.node_times();

    let mut window_index = 0;
    let mut num_trees = 0usize;
    for diff in ts.edge_diffs() {
        let (t_left, t_right) = diff.interval;
        for edge in &diff.edges_out {
            state.remove_edge(edge);
        }
        for edge in &diff.edges_in {
            state.insert_edge(edge);
        }
        num_trees += 1;
        progress.inc(1);

        assert!(window_index < num_windows, "window index overran the windows");
        while window_index < num_windows && windows[window_index] < t_right {
            let w_left = windows[window_index];
            let w_right = windows[window_index + 1];
            let span = t_right.min(w_right) - t_left.max(w_left);
            assert!(span > 0.0, "non-positive overlap of tree and window");

            for (j, &u) in focal.iter().enumerate() {
                let focal_set = reference_set_map[u];
                let delta = u32::from(focal_set.is_some());

                // Nearest ancestor holding a reference sample other than u.
                let mut p = Some(u);
                let mut total = 0;
                while let Some(node) = p {
                    total = state.total(node);
                    if total > delta {
                        break;
                    }
                    p = state.parent(node);
                }
                let Some(p) = p else { continue };

                let Some(time_index) = time_window_index(&time_windows, time[p]) else {
                    continue;
                };
                let scale = span / f64::from(total - delta);
                for (k, &count) in state.counts(p).iter().enumerate() {
                    let n = count - u32::from(focal_set == Some(k));
                    a[[window_index, time_index, j, k]] += f64::from(n) * scale;
                }
                norm[[window_index, time_index, j]] += span;
            }

            if w_right <= t_right {
                window_index += 1;
            } else {
                // The window continues into the next tree.
                break;
            }
        }
    }
    debug!("GNN: processed {} trees", num_trees);

    normalise(&mut a, &norm, normalisation);
    Ok(squeeze(a, windows_used, time_windows_used))
}

/// Which accumulated spans form the denominator of each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Normalisation {
    SpanAndTime,
    Span,
    Time,
}

impl Normalisation {
    fn from_flags(span_normalise: bool, time_normalise: bool) -> Result<Self> {
        match (span_normalise, time_normalise) {
            (true, true) => Ok(Self::SpanAndTime),
            (true, false) => Ok(Self::Span),
            (false, true) => Ok(Self::Time),
            (false, false) => Err(GnnError::invalid_statistic(
                "at least one of span or time normalisation must be enabled",
            )),
        }
    }
}

/// Divide by the accumulated span in the selected axes. Any reference-set
/// vector that ends up all zero had no contribution and becomes `NaN`.
fn normalise(a: &mut Array4<f64>, norm: &Array3<f64>, normalisation: Normalisation) {
    let per_window = norm.sum_axis(Axis(1));
    let per_time_window = norm.sum_axis(Axis(0));

    for ((w, t, j), &cell) in norm.indexed_iter() {
        let denominator = match normalisation {
            Normalisation::SpanAndTime => cell,
            Normalisation::Span => per_window[[w, j]],
            Normalisation::Time => per_time_window[[t, j]],
        };
        let mut row = a.slice_mut(s![w, t, j, ..]);
        row.mapv_inplace(|x| x / denominator);
        if row.iter().all(|&x| x == 0.0) {
            row.fill(f64::NAN);
        }
    }
}

fn squeeze(a: Array4<f64>, windows_used: bool, time_windows_used: bool) -> ArrayD<f64> {
    let mut out = a.into_dyn();
    if !time_windows_used {
        out = out.index_axis_move(Axis(1), 0);
    }
    if !windows_used {
        out = out.index_axis_move(Axis(0), 0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_sequence::{Node, TreeSequence};
    use assert_approx_eq::assert_approx_eq;

    // [0, 4): ((0,1)3,2)4   [4, 10): ((0,2)3,1)4
    fn two_tree_sequence() -> TreeSequence {
        let nodes = vec![
            Node::sample(0.0),
            Node::sample(0.0),
            Node::sample(0.0),
            Node::internal(1.0),
            Node::internal(2.0),
        ];
        let edges = vec![
            Edge::new(0.0, 4.0, 3, 1),
            Edge::new(4.0, 10.0, 3, 2),
            Edge::new(0.0, 10.0, 3, 0),
            Edge::new(0.0, 4.0, 4, 2),
            Edge::new(4.0, 10.0, 4, 1),
            Edge::new(0.0, 10.0, 4, 3),
        ];
        TreeSequence::new(10.0, nodes, edges).unwrap()
    }

    /// Counts recomputed from the parent pointers alone.
    fn counts_from_scratch(
        state: &SampleCounts,
        membership: &[Option<usize>],
        num_sets: usize,
    ) -> Vec<u32> {
        let mut counts = vec![0u32; membership.len() * num_sets];
        for (u, set) in membership.iter().enumerate() {
            if let Some(k) = set {
                let mut v = Some(u);
                while let Some(node) = v {
                    counts[node * num_sets + k] += 1;
                    v = state.parent(node);
                }
            }
        }
        counts
    }

    #[test]
    fn test_counts_match_recomputation_at_every_tree() {
        let ts = two_tree_sequence();
        let sets = ReferenceSets::new().with_set("A", vec![0, 2]).with_set("B", vec![1]);
        let membership = sets.membership(ts.num_nodes()).unwrap();
        let mut state = SampleCounts::new(ts.num_nodes(), &membership, 2);

        for diff in ts.edge_diffs() {
            for edge in &diff.edges_out {
                state.remove_edge(edge);
            }
            for edge in &diff.edges_in {
                state.insert_edge(edge);
            }
            assert_eq!(state.counts, counts_from_scratch(&state, &membership, 2));
        }
        // In the last tree node 3 holds samples 0 and 2, both in set A.
        assert_eq!(state.counts(3), &[2, 0]);
        assert_eq!(state.counts(4), &[2, 1]);
    }

    #[test]
    fn test_focal_excludes_itself() {
        // Focal 0 is its own set's only member below node 3 in the first tree.
        let ts = two_tree_sequence();
        let sets = ReferenceSets::new().with_set("A", vec![0]).with_set("B", vec![1, 2]);
        let options = GnnOptions::default().with_windows(vec![0.0, 4.0, 10.0]);
        let result = windowed_genealogical_nearest_neighbours(&ts, &[0], &sets, &options).unwrap();
        assert_eq!(result.shape(), &[2, 1, 2]);
        assert_approx_eq!(result[[0, 0, 0]], 0.0);
        assert_approx_eq!(result[[0, 0, 1]], 1.0);
        assert_approx_eq!(result[[1, 0, 0]], 0.0);
        assert_approx_eq!(result[[1, 0, 1]], 1.0);
    }

    #[test]
    fn test_span_weighting_across_trees() {
        let ts = two_tree_sequence();
        let sets = ReferenceSets::new().with_set("A", vec![1]).with_set("B", vec![2]);
        let result =
            windowed_genealogical_nearest_neighbours(&ts, &[0], &sets, &GnnOptions::default()).unwrap();
        // 0's neighbour is 1 over [0, 4) and 2 over [4, 10).
        assert_eq!(result.shape(), &[1, 2]);
        assert_approx_eq!(result[[0, 0]], 0.4);
        assert_approx_eq!(result[[0, 1]], 0.6);
    }

    #[test]
    fn test_both_normalisations_off_is_rejected() {
        let ts = two_tree_sequence();
        let sets = ReferenceSets::new().with_set("A", vec![1]);
        let options = GnnOptions::default().with_normalisation(false, false);
        assert!(matches!(
            windowed_genealogical_nearest_neighbours(&ts, &[0], &sets, &options),
            Err(GnnError::InvalidStatistic { .. })
        ));
    }

    #[test]
    fn test_focal_out_of_range() {
        let ts = two_tree_sequence();
        let sets = ReferenceSets::new().with_set("A", vec![1]);
        assert!(matches!(
            windowed_genealogical_nearest_neighbours(&ts, &[9], &sets, &GnnOptions::default()),
            Err(GnnError::NodeOutOfRange { node: 9, .. })
        ));
        assert!(matches!(
            windowed_genealogical_nearest_neighbours(&ts, &[], &sets, &GnnOptions::default()),
            Err(GnnError::EmptyFocal)
        ));
    }

    #[test]
    fn test_progress_counts_trees() {
        let ts = two_tree_sequence();
        let sets = ReferenceSets::new().with_set("A", vec![1]);
        let progress = ProgressBar::hidden();
        windowed_genealogical_nearest_neighbours_with_progress(
            &ts,
            &[0],
            &sets,
            &GnnOptions::default(),
            &progress,
        )
        .unwrap();
        assert_eq!(progress.position(), 2);
    }
}
