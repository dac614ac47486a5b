pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod gnn;
pub mod tree_sequence;
mod utils;

// Re-export main API
pub use error::{GnnError, Result};
pub use gnn::{
    haplotype_gnn, windowed_genealogical_nearest_neighbours,
    windowed_genealogical_nearest_neighbours_with_progress, GnnOptions, HaplotypeGnnTable,
    ReferenceSets,
};
pub use tree_sequence::{Edge, EdgeDiff, Node, NodeId, TreeSequence, TreeSequenceSource};
