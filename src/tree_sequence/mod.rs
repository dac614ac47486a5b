//! Minimal tree-sequence tables: nodes, edges, individuals and populations,
//! plus the edge-diff traversal the GNN engine is driven by.

mod edge_diffs;

pub use edge_diffs::{EdgeDiff, EdgeDiffs};

use crate::error::{GnnError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub type NodeId = usize;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    pub time: f64,
    #[serde(default)]
    pub is_sample: bool,
    #[serde(default)]
    pub population: Option<usize>,
    #[serde(default)]
    pub individual: Option<usize>,
}

impl Node {
    pub fn sample(time: f64) -> Self {
        Self {
            time,
            is_sample: true,
            population: None,
            individual: None,
        }
    }

    pub fn internal(time: f64) -> Self {
        Self {
            time,
            is_sample: false,
            population: None,
            individual: None,
        }
    }

    pub fn with_population(mut self, population: usize) -> Self {
        self.population = Some(population);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub left: f64,
    pub right: f64,
    pub parent: NodeId,
    pub child: NodeId,
}

impl Edge {
    pub fn new(left: f64, right: f64, parent: NodeId, child: NodeId) -> Self {
        Self {
            left,
            right,
            parent,
            child,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Individual {
    pub name: String,
    pub nodes: Vec<NodeId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Population {
    pub name: String,
}

/// Read access the GNN engine needs from a tree sequence.
///
/// `edge_diffs` yields the removed and inserted edges at every breakpoint in
/// increasing genomic order; the intervals partition `[0, sequence_length)`.
pub trait TreeSequenceSource {
    fn num_nodes(&self) -> usize;
    fn node_times(&self) -> &[f64];
    fn sequence_length(&self) -> f64;
    fn max_root_time(&self) -> f64;
    fn edge_diffs(&self) -> Box<dyn Iterator<Item = EdgeDiff> + '_>;
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TreeSequence {
    sequence_length: f64,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(default)]
    individuals: Vec<Individual>,
    #[serde(default)]
    populations: Vec<Population>,
    #[serde(skip)]
    times: Vec<f64>,
}

impl TreeSequence {
    pub fn new(sequence_length: f64, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let mut ts = Self {
            sequence_length,
            nodes,
            edges,
            individuals: Vec::new(),
            populations: Vec::new(),
            times: Vec::new(),
        };
        ts.finalize()?;
        Ok(ts)
    }

    pub fn with_individuals(mut self, individuals: Vec<Individual>) -> Result<Self> {
        self.individuals = individuals;
        self.finalize()?;
        Ok(self)
    }

    pub fn with_populations(mut self, populations: Vec<Population>) -> Result<Self> {
        self.populations = populations;
        self.finalize()?;
        Ok(self)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let mut ts: TreeSequence = serde_json::from_str(data)?;
        ts.finalize()?;
        Ok(ts)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn samples(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_sample)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn edge_diffs(&self) -> EdgeDiffs<'_> {
        EdgeDiffs::new(self.sequence_length, &self.edges, &self.times)
    }

    fn finalize(&mut self) -> Result<()> {
        self.validate()?;
        self.times = self.nodes.iter().map(|node| node.time).collect();
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let length = self.sequence_length;
        if !(length.is_finite() && length > 0.0) {
            return Err(GnnError::invalid_tree_sequence(format!(
                "sequence length must be positive, got {}",
                length
            )));
        }

        let num_nodes = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            if !node.time.is_finite() {
                return Err(GnnError::invalid_tree_sequence(format!(
                    "node {} has non-finite time",
                    id
                )));
            }
            if let Some(pop) = node.population {
                if pop >= self.populations.len() && !self.populations.is_empty() {
                    return Err(GnnError::invalid_tree_sequence(format!(
                        "node {} references unknown population {}",
                        id, pop
                    )));
                }
            }
        }

        for (j, edge) in self.edges.iter().enumerate() {
            if !(edge.left >= 0.0 && edge.left < edge.right && edge.right <= length) {
                return Err(GnnError::invalid_tree_sequence(format!(
                    "edge {} has bad interval [{}, {})",
                    j, edge.left, edge.right
                )));
            }
            if edge.parent >= num_nodes || edge.child >= num_nodes {
                return Err(GnnError::invalid_tree_sequence(format!(
                    "edge {} references a node outside the node table",
                    j
                )));
            }
            if self.nodes[edge.parent].time <= self.nodes[edge.child].time {
                return Err(GnnError::invalid_tree_sequence(format!(
                    "edge {}: parent {} must be older than child {}",
                    j, edge.parent, edge.child
                )));
            }
        }

        // At most one parent per child at any position.
        let mut by_child: Vec<&Edge> = self.edges.iter().collect();
        by_child.sort_by(|a, b| a.child.cmp(&b.child).then(a.left.total_cmp(&b.left)));
        if let Some(pair) = by_child
            .windows(2)
            .find(|pair| pair[0].child == pair[1].child && pair[0].right > pair[1].left)
        {
            return Err(GnnError::invalid_tree_sequence(format!(
                "node {} has parents {} and {} over overlapping intervals [{}, {}) and [{}, {})",
                pair[0].child,
                pair[0].parent,
                pair[1].parent,
                pair[0].left,
                pair[0].right,
                pair[1].left,
                pair[1].right
            )));
        }

        for (i, individual) in self.individuals.iter().enumerate() {
            if let Some(&node) = individual.nodes.iter().find(|&&u| u >= num_nodes) {
                return Err(GnnError::invalid_tree_sequence(format!(
                    "individual {} ('{}') references unknown node {}",
                    i, individual.name, node
                )));
            }
        }
        Ok(())
    }
}

impl TreeSequenceSource for TreeSequence {
    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn node_times(&self) -> &[f64] {
        &self.times
    }

    fn sequence_length(&self) -> f64 {
        self.sequence_length
    }

    /// Oldest root over all trees. The oldest parent in any tree is that
    /// tree's root; isolated samples are roots of their own.
    fn max_root_time(&self) -> f64 {
        let parent_max = self
            .edges
            .iter()
            .map(|edge| self.times[edge.parent])
            .fold(f64::NEG_INFINITY, f64::max);
        let sample_max = self
            .nodes
            .iter()
            .filter(|node| node.is_sample)
            .map(|node| node.time)
            .fold(f64::NEG_INFINITY, f64::max);
        let max = parent_max.max(sample_max);
        if max.is_finite() {
            max
        } else {
            0.0
        }
    }

    fn edge_diffs(&self) -> Box<dyn Iterator<Item = EdgeDiff> + '_> {
        Box::new(TreeSequence::edge_diffs(self))
    }
}
