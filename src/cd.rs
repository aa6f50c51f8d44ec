use crate::PIXEL_SIZE_NM;
use ndarray::Array2;

/// Measures the critical dimension, in nm, of the widest printed feature
/// on the center row of a normalized intensity image.
///
/// A pixel prints when `intensity * dose >= 1.0`. This is the sweep's
/// own convention and is independent of the resist-view threshold. Ties
/// between equally wide runs go to the run whose center is closest to
/// the image center. Returns 0.0 when nothing prints.
pub fn measure_cd(intensity: &Array2<f32>, dose: f64) -> f64 {
    let (rows, cols) = intensity.dim();
    let row = intensity.row(rows / 2);
    let center = (cols / 2) as f64;

    let mut best_len = 0usize;
    let mut best_dist = f64::INFINITY;
    let mut run_start: Option<usize> = None;

    // one column past the end acts as a virtual non-printed boundary
    for c in 0..=cols {
        let printed = c < cols && row[c] as f64 * dose >= 1.0;
        match (printed, run_start) {
            (true, None) => run_start = Some(c),
            (false, Some(start)) => {
                let len = c - start;
                let mid = start as f64 + (len as f64 - 1.0) / 2.0;
                let dist = (mid - center).abs();
                if len > best_len || (len == best_len && dist < best_dist) {
                    best_len = len;
                    best_dist = dist;
                }
                run_start = None;
            }
            _ => {}
        }
    }

    best_len as f64 * PIXEL_SIZE_NM
}
