use ndarray::Array2;

/// Binary photomask: 1.0 transmits, 0.0 blocks.
pub type Mask = Array2<f64>;

// column offset that centers a feature of `feature` pixels on n/2
fn centering_offset(n: usize, feature: usize) -> usize {
    n / 2 - feature / 2
}

pub fn blank(n: usize) -> Mask {
    Array2::zeros((n, n))
}

/// Vertical slit of `width_px` columns centered on the grid. At n = 256
/// and width 6 the open columns are 125..=130.
pub fn isolated_line(n: usize, width_px: usize) -> Mask {
    let start = centering_offset(n, width_px);
    Array2::from_shape_fn((n, n), |(_, c)| {
        if c >= start && c < start + width_px {
            1.0
        } else {
            0.0
        }
    })
}

/// Vertical line/space grating, phased so one line is centered on
/// column n/2.
pub fn line_space(n: usize, pitch_px: usize, line_px: usize) -> Mask {
    let offset = centering_offset(n, line_px) % pitch_px;
    Array2::from_shape_fn((n, n), |(_, c)| {
        if (c + pitch_px - offset) % pitch_px < line_px {
            1.0
        } else {
            0.0
        }
    })
}

/// Square contact-hole array on a regular pitch, one hole centered on
/// the grid.
pub fn contact_array(n: usize, hole_px: usize, pitch_px: usize) -> Mask {
    let offset = centering_offset(n, hole_px) % pitch_px;
    let open = |i: usize| (i + pitch_px - offset) % pitch_px < hole_px;
    Array2::from_shape_fn((n, n), |(r, c)| if open(r) && open(c) { 1.0 } else { 0.0 })
}
