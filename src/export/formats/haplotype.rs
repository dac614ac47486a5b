use crate::gnn::HaplotypeGnnTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HaplotypeGnnExport {
    pub individual: String,
    pub columns: Vec<String>,
    pub rows: Vec<HaplotypeRowExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HaplotypeRowExport {
    pub haplotype: usize,
    pub start: f64,
    pub end: f64,
    pub values: Vec<Option<f64>>,
}

impl From<&HaplotypeGnnTable> for HaplotypeGnnExport {
    fn from(table: &HaplotypeGnnTable) -> Self {
        Self {
            individual: table.individual.clone(),
            columns: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .map(|row| HaplotypeRowExport {
                    haplotype: row.haplotype,
                    start: row.start,
                    end: row.end,
                    values: row
                        .values
                        .iter()
                        .map(|&x| if x.is_nan() { None } else { Some(x) })
                        .collect(),
                })
                .collect(),
        }
    }
}
