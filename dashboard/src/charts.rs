pub mod svg;

/// Every how-many-th x axis label to draw so that at most `max_labels` fit.
pub fn label_step(len: usize, max_labels: usize) -> usize {
    if max_labels == 0 {
        return len.max(1);
    }
    len.div_ceil(max_labels).max(1)
}

/// Rounds an axis maximum up to 1, 2 or 5 times a power of ten.
pub fn nice_max(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(max.log10().floor() as i32);
    let normalized = max / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
