use crate::error::{GnnError, Result};
use crate::tree_sequence::{NodeId, TreeSequence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReferenceSet {
    pub label: String,
    pub nodes: Vec<NodeId>,
}

/// Ordered collection of reference sets. The position of a set is its
/// index along the last axis of the GNN output.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ReferenceSets {
    sets: Vec<ReferenceSet>,
}

impl ReferenceSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(mut self, label: impl Into<String>, nodes: Vec<NodeId>) -> Self {
        self.push(label, nodes);
        self
    }

    pub fn push(&mut self, label: impl Into<String>, nodes: Vec<NodeId>) {
        self.sets.push(ReferenceSet {
            label: label.into(),
            nodes,
        });
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSet> {
        self.sets.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.sets.iter().map(|set| set.label.clone()).collect()
    }

    /// Sample nodes grouped by population, in population order. Populations
    /// without samples are left out.
    pub fn from_populations(ts: &TreeSequence) -> Self {
        let mut grouped: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        for (id, node) in ts.nodes().iter().enumerate() {
            if let (true, Some(pop)) = (node.is_sample, node.population) {
                grouped.entry(pop).or_default().push(id);
            }
        }

        let mut sets = ReferenceSets::new();
        for (pop, nodes) in grouped {
            let label = ts
                .populations()
                .get(pop)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("pop_{}", pop));
            sets.push(label, nodes);
        }
        sets
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Per-node set index. Each node may belong to at most one set.
    pub fn membership(&self, num_nodes: usize) -> Result<Vec<Option<usize>>> {
        let mut map: Vec<Option<usize>> = vec![None; num_nodes];
        for (k, set) in self.sets.iter().enumerate() {
            for &u in &set.nodes {
                if u >= num_nodes {
                    return Err(GnnError::NodeOutOfRange {
                        node: u,
                        num_nodes,
                        what: "reference set",
                    });
                }
                if let Some(existing) = map[u] {
                    return Err(GnnError::DuplicateMembership {
                        node: u,
                        first: self.sets[existing].label.clone(),
                        second: set.label.clone(),
                    });
                }
                map[u] = Some(k);
            }
        }
        Ok(map)
    }
}

impl<L: Into<String>> FromIterator<(L, Vec<NodeId>)> for ReferenceSets {
    fn from_iter<I: IntoIterator<Item = (L, Vec<NodeId>)>>(iter: I) -> Self {
        let mut sets = ReferenceSets::new();
        for (label, nodes) in iter {
            sets.push(label, nodes);
        }
        sets
    }
}
