//! Tab-separated output, one row per (window, time window, focal) or per
//! (haplotype, window). Missing values are written as `NaN`.

use crate::export::formats::gnn::GnnExport;
use crate::gnn::HaplotypeGnnTable;
use std::io::Write;

pub fn write_gnn<W: Write>(writer: &mut W, export: &GnnExport) -> anyhow::Result<()> {
    let array = export.to_array()?;
    writeln!(
        writer,
        "window_start\twindow_end\ttime_start\ttime_end\tfocal\t{}",
        export.reference_sets.join("\t")
    )?;
    let (num_windows, num_time_windows, num_focal, _) = array.dim();
    for w in 0..num_windows {
        for t in 0..num_time_windows {
            for j in 0..num_focal {
                write!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}",
                    export.windows[w],
                    export.windows[w + 1],
                    export.time_windows[t],
                    export.time_windows[t + 1],
                    export.focal[j]
                )?;
                for value in array.slice(ndarray::s![w, t, j, ..]) {
                    write!(writer, "\t{:.6}", value)?;
                }
                writeln!(writer)?;
            }
        }
    }
    Ok(())
}

pub fn write_haplotype_gnn<W: Write>(writer: &mut W, table: &HaplotypeGnnTable) -> anyhow::Result<()> {
    writeln!(writer, "haplotype\tstart\tend\t{}", table.columns.join("\t"))?;
    for row in &table.rows {
        write!(writer, "{}\t{}\t{}", row.haplotype, row.start, row.end)?;
        for value in &row.values {
            write!(writer, "\t{:.6}", value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::formats::gnn::GnnExportParts;
    use crate::gnn::HaplotypeGnnRow;
    use ndarray::{arr2, ArrayD};

    #[test]
    fn test_write_gnn_unwindowed() {
        let result: ArrayD<f64> = arr2(&[[0.5, 0.5], [f64::NAN, f64::NAN]]).into_dyn();
        let export = GnnExport::new(
            &result,
            GnnExportParts {
                windows: vec![0.0, 10.0],
                windows_requested: false,
                time_windows: vec![0.0, 2.0],
                time_windows_requested: false,
                span_normalise: true,
                time_normalise: true,
                focal: &[2, 5],
                reference_sets: vec!["X".to_string(), "Y".to_string()],
            },
        )
        .unwrap();
        assert_eq!(export.shape, vec![1, 1, 2, 2]);
        assert_eq!(export.values[2], None);

        let mut out = Vec::new();
        write_gnn(&mut out, &export).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "window_start\twindow_end\ttime_start\ttime_end\tfocal\tX\tY");
        assert_eq!(lines[1], "0\t10\t0\t2\t2\t0.500000\t0.500000");
        assert_eq!(lines[2], "0\t10\t0\t2\t5\tNaN\tNaN");
    }

    #[test]
    fn test_write_haplotype_gnn() {
        let table = HaplotypeGnnTable {
            individual: "tsk_0".to_string(),
            columns: vec!["A".to_string(), "B".to_string()],
            rows: vec![HaplotypeGnnRow {
                haplotype: 1,
                start: 0.0,
                end: 5.0,
                values: vec![0.25, 0.75],
            }],
        };
        let mut out = Vec::new();
        write_haplotype_gnn(&mut out, &table).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "haplotype\tstart\tend\tA\tB\n1\t0\t5\t0.250000\t0.750000\n"
        );
    }
}
