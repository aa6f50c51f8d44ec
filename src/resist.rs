use ndarray::Array2;

/// Binary resist render: a pixel prints when `intensity >= threshold`.
/// This is the viewing convention; CD measurement applies its own
/// dose-scaled condition.
pub fn resist_print(intensity: &Array2<f32>, threshold: f32) -> Array2<bool> {
    intensity.map(|&i| i >= threshold)
}

/// Copies out one row of the intensity image for 1-D plotting.
pub fn cross_section(intensity: &Array2<f32>, row: usize) -> Vec<f32> {
    intensity.row(row).to_vec()
}
