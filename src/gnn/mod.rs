mod engine;
mod haplotype;
mod reference_sets;
pub mod windows;

pub use engine::{
    windowed_genealogical_nearest_neighbours, windowed_genealogical_nearest_neighbours_with_progress,
    GnnOptions,
};
pub use haplotype::{haplotype_gnn, HaplotypeGnnRow, HaplotypeGnnTable};
pub use reference_sets::{ReferenceSet, ReferenceSets};
