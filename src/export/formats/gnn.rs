use crate::tree_sequence::NodeId;
use ndarray::{Array4, ArrayD, Axis, Ix4};
use serde::{Deserialize, Serialize};

/// Windowed GNN result with the labels needed to read it back.
///
/// `values` is the row-major flattening of the four-axis array
/// `(window, time_window, focal, reference_set)`. Windows that were not
/// requested appear as a single window spanning the whole range, and
/// `windows_requested`/`time_windows_requested` record which axes the
/// caller asked for. Cells without data are `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GnnExport {
    pub shape: Vec<usize>,
    pub windows: Vec<f64>,
    pub windows_requested: bool,
    pub time_windows: Vec<f64>,
    pub time_windows_requested: bool,
    pub span_normalise: bool,
    pub time_normalise: bool,
    pub focal: Vec<NodeId>,
    pub reference_sets: Vec<String>,
    pub values: Vec<Option<f64>>,
}

pub struct GnnExportParts<'a> {
    pub windows: Vec<f64>,
    pub windows_requested: bool,
    pub time_windows: Vec<f64>,
    pub time_windows_requested: bool,
    pub span_normalise: bool,
    pub time_normalise: bool,
    pub focal: &'a [NodeId],
    pub reference_sets: Vec<String>,
}

impl GnnExport {
    pub fn new(result: &ArrayD<f64>, parts: GnnExportParts<'_>) -> anyhow::Result<Self> {
        let full = restore_axes(
            result.clone(),
            parts.windows_requested,
            parts.time_windows_requested,
        )?;
        Ok(Self {
            shape: full.shape().to_vec(),
            windows: parts.windows,
            windows_requested: parts.windows_requested,
            time_windows: parts.time_windows,
            time_windows_requested: parts.time_windows_requested,
            span_normalise: parts.span_normalise,
            time_normalise: parts.time_normalise,
            focal: parts.focal.to_vec(),
            reference_sets: parts.reference_sets,
            values: full
                .iter()
                .map(|&x| if x.is_nan() { None } else { Some(x) })
                .collect(),
        })
    }

    pub fn to_array(&self) -> anyhow::Result<Array4<f64>> {
        let dims: [usize; 4] = self
            .shape
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected a four-axis shape, got {:?}", self.shape))?;
        let data: Vec<f64> = self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        Ok(Array4::from_shape_vec(
            (dims[0], dims[1], dims[2], dims[3]),
            data,
        )?)
    }
}

/// Put back the window axes dropped from a GNN result.
pub fn restore_axes(
    result: ArrayD<f64>,
    windows_requested: bool,
    time_windows_requested: bool,
) -> anyhow::Result<Array4<f64>> {
    let mut full = result;
    if !windows_requested {
        full = full.insert_axis(Axis(0));
    }
    if !time_windows_requested {
        full = full.insert_axis(Axis(1));
    }
    Ok(full.into_dimensionality::<Ix4>()?)
}
