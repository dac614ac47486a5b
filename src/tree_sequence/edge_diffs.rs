use super::{Edge, NodeId};

/// Edges leaving and entering the tree at one breakpoint, with the genomic
/// interval over which the resulting tree is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDiff {
    pub interval: (f64, f64),
    pub edges_out: Vec<Edge>,
    pub edges_in: Vec<Edge>,
}

/// Forward-only iterator over the trees of a tree sequence, expressed as
/// edge differences.
pub struct EdgeDiffs<'a> {
    edges: &'a [Edge],
    insertion: Vec<usize>,
    removal: Vec<usize>,
    sequence_length: f64,
    left: f64,
    next_in: usize,
    next_out: usize,
}

impl<'a> EdgeDiffs<'a> {
    pub(crate) fn new(sequence_length: f64, edges: &'a [Edge], times: &[f64]) -> Self {
        let time_of = |u: NodeId| times[u];

        let mut insertion: Vec<usize> = (0..edges.len()).collect();
        insertion.sort_by(|&a, &b| {
            let (ea, eb) = (&edges[a], &edges[b]);
            ea.left
                .total_cmp(&eb.left)
                .then_with(|| time_of(ea.parent).total_cmp(&time_of(eb.parent)))
                .then_with(|| ea.parent.cmp(&eb.parent))
                .then_with(|| ea.child.cmp(&eb.child))
        });

        // Oldest parents leave first.
        let mut removal: Vec<usize> = (0..edges.len()).collect();
        removal.sort_by(|&a, &b| {
            let (ea, eb) = (&edges[a], &edges[b]);
            ea.right
                .total_cmp(&eb.right)
                .then_with(|| time_of(eb.parent).total_cmp(&time_of(ea.parent)))
                .then_with(|| eb.parent.cmp(&ea.parent))
                .then_with(|| eb.child.cmp(&ea.child))
        });

        Self {
            edges,
            insertion,
            removal,
            sequence_length,
            left: 0.0,
            next_in: 0,
            next_out: 0,
        }
    }
}

impl<'a> Iterator for EdgeDiffs<'a> {
    type Item = EdgeDiff;

    fn next(&mut self) -> Option<Self::Item> {
        let num_edges = self.edges.len();
        if self.next_in >= num_edges && self.left >= self.sequence_length {
            return None;
        }

        let left = self.left;
        let mut edges_out = Vec::new();
        while self.next_out < num_edges && self.edges[self.removal[self.next_out]].right == left {
            edges_out.push(self.edges[self.removal[self.next_out]]);
            self.next_out += 1;
        }

        let mut edges_in = Vec::new();
        while self.next_in < num_edges && self.edges[self.insertion[self.next_in]].left == left {
            edges_in.push(self.edges[self.insertion[self.next_in]]);
            self.next_in += 1;
        }

        let mut right = self.sequence_length;
        if self.next_in < num_edges {
            right = right.min(self.edges[self.insertion[self.next_in]].left);
        }
        if self.next_out < num_edges {
            right = right.min(self.edges[self.removal[self.next_out]].right);
        }
        self.left = right;

        Some(EdgeDiff {
            interval: (left, right),
            edges_out,
            edges_in,
        })
    }
}
