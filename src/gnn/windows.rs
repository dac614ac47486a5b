use crate::error::{GnnError, Result};

/// Resolve genomic window breakpoints. `None` means one window over the
/// whole sequence.
pub fn parse_windows(windows: Option<&[f64]>, sequence_length: f64) -> Result<Vec<f64>> {
    let windows = match windows {
        None => return Ok(vec![0.0, sequence_length]),
        Some(w) => w,
    };
    check_increasing(windows)?;
    if windows[0] != 0.0 {
        return Err(GnnError::invalid_windows(format!(
            "first window breakpoint must be 0, got {}",
            windows[0]
        )));
    }
    let last = windows[windows.len() - 1];
    if last != sequence_length {
        return Err(GnnError::invalid_windows(format!(
            "last window breakpoint must equal the sequence length {}, got {}",
            sequence_length, last
        )));
    }
    Ok(windows.to_vec())
}

/// Resolve time window breakpoints. `None` means one window spanning
/// `[0, max_root_time]`.
pub fn parse_time_windows(time_windows: Option<&[f64]>, max_root_time: f64) -> Result<Vec<f64>> {
    let time_windows = match time_windows {
        None => return Ok(vec![0.0, max_root_time]),
        Some(w) => w,
    };
    check_increasing(time_windows)?;
    if time_windows[0] < 0.0 {
        return Err(GnnError::invalid_windows(format!(
            "time windows must start at or after 0, got {}",
            time_windows[0]
        )));
    }
    Ok(time_windows.to_vec())
}

fn check_increasing(breakpoints: &[f64]) -> Result<()> {
    if breakpoints.len() < 2 {
        return Err(GnnError::invalid_windows(
            "at least two breakpoints are required",
        ));
    }
    if breakpoints.iter().any(|x| !x.is_finite()) {
        return Err(GnnError::invalid_windows("breakpoints must be finite"));
    }
    if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(GnnError::invalid_windows(format!(
            "breakpoints must be strictly increasing ({} >= {})",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Evenly spaced genomic windows of roughly `window_size`; the final
/// breakpoint is exactly `sequence_length`.
pub fn make_windows(window_size: f64, sequence_length: f64) -> Result<Vec<f64>> {
    if !(window_size.is_finite() && window_size > 0.0) {
        return Err(GnnError::invalid_windows(format!(
            "window size must be positive, got {}",
            window_size
        )));
    }
    let num_windows = ((sequence_length / window_size) as usize).max(1);
    let step = sequence_length / num_windows as f64;
    let mut windows: Vec<f64> = (0..=num_windows).map(|i| i as f64 * step).collect();
    windows[num_windows] = sequence_length;
    Ok(windows)
}

/// Index of the time window containing `time`, using a left-sided binary
/// search minus one. Times equal to the first breakpoint, or beyond the
/// last, fall outside every window.
pub fn time_window_index(breakpoints: &[f64], time: f64) -> Option<usize> {
    let insertion = breakpoints.partition_point(|&b| b < time);
    let num_windows = breakpoints.len() - 1;
    match insertion.checked_sub(1) {
        Some(index) if index < num_windows => Some(index),
        _ => None,
    }
}
