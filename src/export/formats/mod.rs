pub mod gnn;
pub mod haplotype;
