use crate::error::Error;
use crate::fft::{fft2d, fftshift, FftDirection, FftPlanner};
use crate::mask::Mask;
use crate::pupil::{apply_pupil, PupilParams};
use crate::GRID_DIM;
use log::debug;
use ndarray::{Array2, Zip};
use num_complex::Complex;
use std::time::Instant;

/// Aerial image intensity, normalized to a unit maximum, plus the
/// wall-clock cost of producing it.
#[derive(Clone, Debug)]
pub struct AerialImage {
    pub intensity: Array2<f32>,
    pub time_ms: f64,
}

/// Image-formation pipeline. Owns the process-lifetime complex scratch
/// grid and the transform planner; `&mut self` keeps the scratch
/// un-aliased, so at most one run can be in flight.
pub struct Pipeline {
    planner: FftPlanner,
    scratch: Array2<Complex<f64>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_grid(GRID_DIM)
    }

    pub fn with_grid(n: usize) -> Self {
        assert!(n.is_power_of_two(), "grid size must be a power of two");
        Pipeline {
            planner: FftPlanner::new(),
            scratch: Array2::from_elem((n, n), Complex::new(0.0, 0.0)),
        }
    }

    pub fn grid_dim(&self) -> usize {
        self.scratch.dim().0
    }

    /// Forms the aerial image of `mask` under `params`:
    /// mask -> FFT -> shift -> pupil -> shift -> IFFT -> |.|^2 -> normalize.
    ///
    /// Internal work is double precision; the emitted image is single
    /// precision. A mask that transmits nothing yields an all-zero image.
    pub fn run(&mut self, mask: &Mask, params: &PupilParams) -> Result<AerialImage, Error> {
        let n = self.grid_dim();
        let (rows, cols) = mask.dim();
        if (rows, cols) != (n, n) {
            return Err(Error::MaskShape {
                expected: n,
                rows,
                cols,
            });
        }

        let start = Instant::now();

        Zip::from(&mut self.scratch)
            .and(mask)
            .for_each(|s, &m| *s = Complex::new(m, 0.0));

        fft2d(&mut self.planner, &mut self.scratch, FftDirection::Forward);
        fftshift(&mut self.scratch);
        apply_pupil(&mut self.scratch, params);
        fftshift(&mut self.scratch);
        fft2d(&mut self.planner, &mut self.scratch, FftDirection::Inverse);

        // squared magnitude lands in the real slot of the scratch
        let mut max = 0.0f64;
        for s in self.scratch.iter_mut() {
            let i = s.norm_sqr();
            s.re = i;
            if i > max {
                max = i;
            }
        }

        let intensity = if max > 0.0 {
            self.scratch.map(|s| (s.re / max) as f32)
        } else {
            Array2::zeros((n, n))
        };

        let time_ms = start.elapsed().as_secs_f64() * 1e3;
        debug!("aerial image {}x{} in {:.2} ms", n, n, time_ms);

        Ok(AerialImage { intensity, time_ms })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask;

    #[test]
    fn blank_mask_yields_all_zeros() {
        let mut pipeline = Pipeline::with_grid(64);
        let image = pipeline
            .run(&mask::blank(64), &PupilParams::default())
            .unwrap();
        assert!(image.intensity.iter().all(|&i| i == 0.0));
    }

    #[test]
    fn intensity_is_normalized_and_bounded() {
        let mut pipeline = Pipeline::with_grid(64);
        let image = pipeline
            .run(&mask::line_space(64, 10, 5), &PupilParams::default())
            .unwrap();

        let mut max = 0.0f32;
        for &i in image.intensity.iter() {
            assert!(i.is_finite());
            assert!((0.0..=1.0).contains(&i));
            max = max.max(i);
        }
        assert_eq!(max, 1.0);
    }

    #[test]
    fn wide_open_aperture_reproduces_the_mask() {
        let params = PupilParams {
            wavelength_nm: 193.0,
            na: 20.0,
            sigma: 1.0,
            ..PupilParams::default()
        };
        let mut pipeline = Pipeline::with_grid(64);
        let line = mask::isolated_line(64, 6);
        assert!(params.is_wide_open(64));

        let image = pipeline.run(&line, &params).unwrap();
        for ((r, c), &i) in image.intensity.indexed_iter() {
            assert!(
                (i as f64 - line[[r, c]]).abs() < 1e-9,
                "pixel ({}, {}) diverged from the mask",
                r,
                c
            );
        }
    }

    #[test]
    fn symmetric_mask_images_symmetrically() {
        // line grating even about the center column, unaberrated optics
        let n = 64;
        let mut pipeline = Pipeline::with_grid(n);
        let grating = mask::line_space(n, 8, 3);
        let image = pipeline.run(&grating, &PupilParams::default()).unwrap();

        let row = image.intensity.row(n / 2);
        for c in 1..n {
            assert!(
                (row[c] - row[n - c]).abs() < 1e-5,
                "asymmetry at column {}",
                c
            );
        }
    }

    #[test]
    fn mask_shape_mismatch_is_rejected() {
        let mut pipeline = Pipeline::with_grid(64);
        let err = pipeline
            .run(&mask::blank(32), &PupilParams::default())
            .unwrap_err();
        assert!(matches!(err, Error::MaskShape { expected: 64, .. }));
    }

    #[test]
    fn scratch_reuse_is_deterministic() {
        let mut pipeline = Pipeline::with_grid(64);
        let grating = mask::line_space(64, 10, 5);
        let first = pipeline.run(&grating, &PupilParams::default()).unwrap();
        pipeline
            .run(&mask::isolated_line(64, 4), &PupilParams::default())
            .unwrap();
        let third = pipeline.run(&grating, &PupilParams::default()).unwrap();
        assert_eq!(first.intensity, third.intensity);
    }
}
