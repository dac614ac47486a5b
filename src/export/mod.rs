pub mod formats;
pub mod tsv;

use crate::export::formats::gnn::GnnExport;
use crate::export::formats::haplotype::HaplotypeGnnExport;
use chrono::{DateTime, Utc};
use serde::de::{Deserializer, Error};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Root structure for all exports
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisExport {
    pub version: String,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,

    #[serde(flatten)]
    pub data: AnalysisData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisData {
    Gnn(GnnExport),
    HaplotypeGnn(HaplotypeGnnExport),
}

impl AnalysisExport {
    pub fn new(data: AnalysisData) -> Self {
        Self {
            version: "1".to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            data,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(D::Error::custom)
}
