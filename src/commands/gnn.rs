use crate::cli::OutputFormat;
use crate::commands::{load_reference_sets, load_tree_sequence, resolve_windows, traversal_progress};
use crate::config::Config;
use crate::export::formats::gnn::{GnnExport, GnnExportParts};
use crate::export::{tsv, AnalysisData, AnalysisExport};
use crate::gnn::windows::{parse_time_windows, parse_windows};
use crate::gnn::{windowed_genealogical_nearest_neighbours_with_progress, GnnOptions};
use crate::tree_sequence::{NodeId, TreeSequenceSource};
use anyhow::Result;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

pub struct GnnCommand {
    pub trees_file: PathBuf,
    pub focal: Vec<NodeId>,
    pub sample_sets: Option<PathBuf>,
    pub windows: Option<Vec<f64>>,
    pub window_size: Option<f64>,
    pub time_windows: Option<Vec<f64>>,
    pub span_normalise: bool,
    pub time_normalise: bool,
    pub output_file: PathBuf,
    pub format: OutputFormat,
}

pub fn run(cmd: GnnCommand, config: &Config, show_progress: bool) -> Result<()> {
    let ts = load_tree_sequence(&cmd.trees_file, show_progress)?;
    let reference_sets = load_reference_sets(&ts, cmd.sample_sets.as_deref())?;
    let windows = resolve_windows(cmd.windows, cmd.window_size, config, ts.sequence_length())?;
    let focal = if cmd.focal.is_empty() {
        ts.samples()
    } else {
        cmd.focal
    };

    let options = GnnOptions {
        windows,
        time_windows: cmd.time_windows,
        span_normalise: cmd.span_normalise,
        time_normalise: cmd.time_normalise,
    };

    let progress = traversal_progress(&ts, show_progress)?;
    let result = windowed_genealogical_nearest_neighbours_with_progress(
        &ts,
        &focal,
        &reference_sets,
        &options,
        &progress,
    )?;
    progress.finish_with_message("GNN computed");
    info!("GNN result shape {:?} for {} focal nodes", result.shape(), focal.len());

    let export = GnnExport::new(
        &result,
        GnnExportParts {
            windows: parse_windows(options.windows.as_deref(), ts.sequence_length())?,
            windows_requested: options.windows.is_some(),
            time_windows: parse_time_windows(options.time_windows.as_deref(), ts.max_root_time())?,
            time_windows_requested: options.time_windows.is_some(),
            span_normalise: options.span_normalise,
            time_normalise: options.time_normalise,
            focal: &focal,
            reference_sets: reference_sets.labels(),
        },
    )?;

    match cmd.format {
        OutputFormat::Json => {
            AnalysisExport::new(AnalysisData::Gnn(export)).write_json(&cmd.output_file)?;
        }
        OutputFormat::Tsv => {
            let mut writer = BufWriter::new(File::create(&cmd.output_file)?);
            tsv::write_gnn(&mut writer, &export)?;
        }
    }
    info!("Results written to {}", cmd.output_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::formats::gnn::GnnExport;
    use std::fs;

    const TREES: &str = r#"{
        "sequence_length": 10.0,
        "nodes": [
            {"time": 0.0, "is_sample": true, "population": 0},
            {"time": 0.0, "is_sample": true, "population": 1},
            {"time": 0.0, "is_sample": true},
            {"time": 1.0},
            {"time": 2.0}
        ],
        "edges": [
            {"left": 0.0, "right": 10.0, "parent": 3, "child": 0},
            {"left": 0.0, "right": 10.0, "parent": 3, "child": 1},
            {"left": 0.0, "right": 10.0, "parent": 4, "child": 2},
            {"left": 0.0, "right": 10.0, "parent": 4, "child": 3}
        ],
        "populations": [{"name": "X"}, {"name": "Y"}]
    }"#;

    fn command(dir: &std::path::Path, format: OutputFormat, output: &str) -> GnnCommand {
        let trees_file = dir.join("trees.json");
        fs::write(&trees_file, TREES).unwrap();
        GnnCommand {
            trees_file,
            focal: vec![2],
            sample_sets: None,
            windows: None,
            window_size: None,
            time_windows: None,
            span_normalise: true,
            time_normalise: true,
            output_file: dir.join(output),
            format,
        }
    }

    #[test]
    fn test_run_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = command(dir.path(), OutputFormat::Json, "gnn.json");
        let output = cmd.output_file.clone();
        run(cmd, &Config::default(), false).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["type"], "Gnn");
        let export: GnnExport = serde_json::from_value(value).unwrap();
        assert_eq!(export.shape, vec![1, 1, 1, 2]);
        assert_eq!(export.reference_sets, vec!["X", "Y"]);
        assert_eq!(export.values, vec![Some(0.5), Some(0.5)]);
    }

    #[test]
    fn test_run_defaults_focal_to_all_samples() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = command(dir.path(), OutputFormat::Json, "gnn.json");
        cmd.focal = vec![];
        let output = cmd.output_file.clone();
        run(cmd, &Config::default(), false).unwrap();

        let text = fs::read_to_string(output).unwrap();
        let export: GnnExport = serde_json::from_str(&text).unwrap();
        assert_eq!(export.focal, vec![0, 1, 2]);
        assert_eq!(export.shape, vec![1, 1, 3, 2]);
        assert_eq!(
            export.values,
            vec![Some(0.0), Some(1.0), Some(1.0), Some(0.0), Some(0.5), Some(0.5)]
        );
    }

    #[test]
    fn test_run_writes_tsv_with_window_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = command(dir.path(), OutputFormat::Tsv, "gnn.tsv");
        cmd.window_size = Some(5.0);
        let output = cmd.output_file.clone();
        run(cmd, &Config::default(), false).unwrap();

        let text = fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0\t5\t"));
        assert!(lines[2].starts_with("5\t10\t"));
    }
}
