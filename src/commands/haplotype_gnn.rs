use crate::cli::OutputFormat;
use crate::commands::{load_reference_sets, load_tree_sequence, resolve_windows, traversal_progress};
use crate::config::Config;
use crate::export::formats::haplotype::HaplotypeGnnExport;
use crate::export::{tsv, AnalysisData, AnalysisExport};
use crate::gnn::haplotype_gnn;
use crate::tree_sequence::TreeSequenceSource;
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

pub struct HaplotypeGnnCommand {
    pub trees_file: PathBuf,
    pub individual: usize,
    pub sample_sets: Option<PathBuf>,
    pub windows: Option<Vec<f64>>,
    pub window_size: Option<f64>,
    pub output_file: PathBuf,
    pub format: OutputFormat,
}

pub fn run(cmd: HaplotypeGnnCommand, config: &Config, show_progress: bool) -> Result<()> {
    let ts = load_tree_sequence(&cmd.trees_file, show_progress)?;
    let reference_sets = load_reference_sets(&ts, cmd.sample_sets.as_deref())?;
    let windows = resolve_windows(cmd.windows, cmd.window_size, config, ts.sequence_length())?;

    let progress = traversal_progress(&ts, show_progress)?;
    let table = haplotype_gnn(
        &ts,
        cmd.individual,
        &reference_sets,
        windows.as_deref(),
        &progress,
    )
    .with_context(|| format!("Haplotype GNN failed for individual {}", cmd.individual))?;
    progress.finish_with_message("Haplotype GNN computed");
    info!(
        "Individual '{}': {} rows over {} haplotypes",
        table.individual,
        table.rows.len(),
        ts.individuals()[cmd.individual].nodes.len()
    );

    match cmd.format {
        OutputFormat::Json => {
            let export = HaplotypeGnnExport::from(&table);
            AnalysisExport::new(AnalysisData::HaplotypeGnn(export)).write_json(&cmd.output_file)?;
        }
        OutputFormat::Tsv => {
            let mut writer = BufWriter::new(File::create(&cmd.output_file)?);
            tsv::write_haplotype_gnn(&mut writer, &table)?;
        }
    }
    info!("Results written to {}", cmd.output_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // ((0,1)4,(2,3)5)6 over [0, 10); populations A = {0, 2}, B = {1, 3}.
    const TREES: &str = r#"{
        "sequence_length": 10.0,
        "nodes": [
            {"time": 0.0, "is_sample": true, "population": 0, "individual": 0},
            {"time": 0.0, "is_sample": true, "population": 1, "individual": 0},
            {"time": 0.0, "is_sample": true, "population": 0},
            {"time": 0.0, "is_sample": true, "population": 1},
            {"time": 1.0},
            {"time": 1.0},
            {"time": 2.0}
        ],
        "edges": [
            {"left": 0.0, "right": 10.0, "parent": 4, "child": 0},
            {"left": 0.0, "right": 10.0, "parent": 4, "child": 1},
            {"left": 0.0, "right": 10.0, "parent": 5, "child": 2},
            {"left": 0.0, "right": 10.0, "parent": 5, "child": 3},
            {"left": 0.0, "right": 10.0, "parent": 6, "child": 4},
            {"left": 0.0, "right": 10.0, "parent": 6, "child": 5}
        ],
        "individuals": [{"name": "ind0", "nodes": [0, 1]}],
        "populations": [{"name": "A"}, {"name": "B"}]
    }"#;

    fn command(dir: &std::path::Path, format: OutputFormat, output: &str) -> HaplotypeGnnCommand {
        let trees_file = dir.join("trees.json");
        fs::write(&trees_file, TREES).unwrap();
        HaplotypeGnnCommand {
            trees_file,
            individual: 0,
            sample_sets: None,
            windows: None,
            window_size: None,
            output_file: dir.join(output),
            format,
        }
    }

    #[test]
    fn test_run_writes_tsv_per_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = command(dir.path(), OutputFormat::Tsv, "haplotype_gnn.tsv");
        cmd.window_size = Some(5.0);
        let output = cmd.output_file.clone();
        run(cmd, &Config::default(), false).unwrap();

        let text = fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "haplotype\tstart\tend\tA\tB");
        assert_eq!(lines[1], "0\t0\t5\t0.000000\t1.000000");
        assert_eq!(lines[4], "1\t5\t10\t1.000000\t0.000000");
    }

    #[test]
    fn test_run_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = command(dir.path(), OutputFormat::Json, "haplotype_gnn.json");
        let output = cmd.output_file.clone();
        run(cmd, &Config::default(), false).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["type"], "HaplotypeGnn");
        let export: HaplotypeGnnExport = serde_json::from_value(value).unwrap();
        assert_eq!(export.individual, "ind0");
        assert_eq!(export.columns, vec!["A", "B"]);
        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.rows[0].values, vec![Some(0.0), Some(1.0)]);
        assert_eq!(export.rows[1].values, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_run_rejects_unknown_individual() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = command(dir.path(), OutputFormat::Tsv, "haplotype_gnn.tsv");
        cmd.individual = 3;
        let err = run(cmd, &Config::default(), false).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown individual 3"));
    }
}
