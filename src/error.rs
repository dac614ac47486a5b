//! Error types for tree-sequence loading and GNN computation.

use crate::tree_sequence::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GnnError {
    /// A node was listed in two reference sets.
    #[error("Duplicate value in reference sets: node {node} is in both '{first}' and '{second}'")]
    DuplicateMembership {
        node: NodeId,
        first: String,
        second: String,
    },

    #[error("Node {node} out of range ({what}); tree sequence has {num_nodes} nodes")]
    NodeOutOfRange {
        node: NodeId,
        num_nodes: usize,
        what: &'static str,
    },

    #[error("At least one focal sample is required")]
    EmptyFocal,

    #[error("At least one reference set is required")]
    EmptyReferenceSets,

    #[error("Invalid windows: {message}")]
    InvalidWindows { message: String },

    /// Unsupported combination of statistic options.
    #[error("Invalid statistic selection: {message}")]
    InvalidStatistic { message: String },

    #[error("Invalid tree sequence: {message}")]
    InvalidTreeSequence { message: String },

    #[error("Unknown individual {0}")]
    UnknownIndividual(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GnnError>;

impl GnnError {
    pub fn invalid_windows(message: impl Into<String>) -> Self {
        Self::InvalidWindows {
            message: message.into(),
        }
    }

    pub fn invalid_tree_sequence(message: impl Into<String>) -> Self {
        Self::InvalidTreeSequence {
            message: message.into(),
        }
    }

    pub fn invalid_statistic(message: impl Into<String>) -> Self {
        Self::InvalidStatistic {
            message: message.into(),
        }
    }
}
