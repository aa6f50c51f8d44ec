use crate::cd::measure_cd;
use crate::error::Error;
use crate::mask::Mask;
use crate::pipeline::Pipeline;
use crate::pupil::PupilParams;
use log::debug;
use ndarray::Array1;
use std::time::Instant;

/// Focus/dose grid for a process-window sweep. Focus in um, dose as the
/// CD-measurement scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossungParams {
    pub focus_range: (f64, f64),
    pub focus_steps: usize,
    pub dose_range: (f64, f64),
    pub dose_steps: usize,
}

impl Default for BossungParams {
    fn default() -> Self {
        BossungParams {
            focus_range: (-1.0, 1.0),
            focus_steps: 11,
            dose_range: (0.7, 1.3),
            dose_steps: 7,
        }
    }
}

impl BossungParams {
    fn validate(&self) -> Result<(), Error> {
        let (f_min, f_max) = self.focus_range;
        let (d_min, d_max) = self.dose_range;
        let finite = [f_min, f_max, d_min, d_max];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(Error::Sweep {
                reason: "ranges must be finite".into(),
            });
        }
        if f_min > f_max {
            return Err(Error::Sweep {
                reason: format!("focus range is inverted: {} > {}", f_min, f_max),
            });
        }
        if d_min > d_max {
            return Err(Error::Sweep {
                reason: format!("dose range is inverted: {} > {}", d_min, d_max),
            });
        }
        if self.focus_steps < 1 || self.dose_steps < 1 {
            return Err(Error::Sweep {
                reason: "step counts must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossungPoint {
    pub focus_um: f64,
    pub cd_nm: f64,
}

/// One constant-dose curve of CD vs focus.
#[derive(Clone, Debug)]
pub struct BossungCurve {
    pub dose: f64,
    pub points: Vec<BossungPoint>,
}

#[derive(Clone, Debug)]
pub struct BossungResult {
    pub focus_values: Vec<f64>,
    pub dose_values: Vec<f64>,
    pub curves: Vec<BossungCurve>,
    pub time_ms: f64,
    pub pipeline_runs: usize,
}

// a single-step axis collapses to the range midpoint
fn axis(range: (f64, f64), steps: usize) -> Vec<f64> {
    if steps == 1 {
        vec![0.5 * (range.0 + range.1)]
    } else {
        Array1::linspace(range.0, range.1, steps).to_vec()
    }
}

/// Sweeps focus x dose over the mask. Dose only scales the CD print
/// condition, so one pipeline run per focus value covers the whole dose
/// axis: exactly `focus_steps` runs, never `focus_steps * dose_steps`.
pub fn run_bossung_sweep(
    pipeline: &mut Pipeline,
    mask: &Mask,
    base: &PupilParams,
    sweep: &BossungParams,
) -> Result<BossungResult, Error> {
    sweep.validate()?;
    let start = Instant::now();

    let focus_values = axis(sweep.focus_range, sweep.focus_steps);
    let dose_values = axis(sweep.dose_range, sweep.dose_steps);

    let mut curves: Vec<BossungCurve> = dose_values
        .iter()
        .map(|&dose| BossungCurve {
            dose,
            points: Vec::with_capacity(focus_values.len()),
        })
        .collect();

    let mut pipeline_runs = 0;
    for &focus in &focus_values {
        let params = PupilParams {
            defocus_um: focus,
            ..*base
        };
        let image = pipeline.run(mask, &params)?;
        pipeline_runs += 1;

        for curve in curves.iter_mut() {
            curve.points.push(BossungPoint {
                focus_um: focus,
                cd_nm: measure_cd(&image.intensity, curve.dose),
            });
        }
    }

    let time_ms = start.elapsed().as_secs_f64() * 1e3;
    debug!(
        "bossung sweep: {} focus x {} dose, {} pipeline runs, {:.1} ms",
        focus_values.len(),
        dose_values.len(),
        pipeline_runs,
        time_ms
    );

    Ok(BossungResult {
        focus_values,
        dose_values,
        curves,
        time_ms,
        pipeline_runs,
    })
}
