use crate::freq_step;
use crate::zernike::ZernikeCoeffs;
use ndarray::{Array2, Zip};
use num_complex::Complex;
use std::f64::consts::PI;

/// Projection-optics settings. Wavelength in nm, defocus in um,
/// aberration coefficients in waves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PupilParams {
    pub wavelength_nm: f64,
    pub na: f64,
    pub sigma: f64,
    pub defocus_um: f64,
    pub zernike: ZernikeCoeffs,
}

impl Default for PupilParams {
    fn default() -> Self {
        PupilParams {
            wavelength_nm: 248.0,
            na: 0.75,
            sigma: 0.5,
            defocus_um: 0.0,
            zernike: ZernikeCoeffs::default(),
        }
    }
}

impl PupilParams {
    /// Effective frequency cutoff in cycles/nm. The `(1 + sigma)` factor
    /// widens the incoherent aperture in place of a full Hopkins
    /// partial-coherence integral.
    pub fn cutoff(&self) -> f64 {
        self.na * (1.0 + self.sigma) / self.wavelength_nm
    }

    /// True when the aperture passes every frequency the grid can
    /// represent, making the filter (at zero defocus and aberration) an
    /// exact passthrough.
    pub fn is_wide_open(&self, n: usize) -> bool {
        let corner = 2f64.sqrt() * (n / 2) as f64 * freq_step(n);
        self.cutoff() >= corner
    }
}

/// Applies the pupil to a centered spectrum in place: hard aperture
/// cutoff, defocus quadratic phase, and Zernike aberration phase.
///
/// In-aperture samples with zero accumulated phase are left untouched.
pub fn apply_pupil(spectrum: &mut Array2<Complex<f64>>, params: &PupilParams) {
    let n = spectrum.dim().0;
    let center = (n / 2) as f64;
    let df = freq_step(n);

    let cutoff = params.cutoff();
    let cutoff_sqr = cutoff * cutoff;
    // defocus um -> nm; phase = pi * lambda * z * f^2
    let defocus_coeff = PI * params.wavelength_nm * (params.defocus_um * 1000.0);
    let aberrated = !params.zernike.is_zero();

    Zip::indexed(spectrum).for_each(|(r, c), e| {
        let fy = (r as f64 - center) * df;
        let fx = (c as f64 - center) * df;
        let f_sqr = fx * fx + fy * fy;

        if f_sqr > cutoff_sqr {
            *e = Complex::new(0.0, 0.0);
            return;
        }

        let mut phase = defocus_coeff * f_sqr;
        if aberrated {
            phase += 2.0
                * PI
                * params
                    .zernike
                    .phase_error(f_sqr.sqrt() / cutoff, fy.atan2(fx));
        }
        if phase != 0.0 {
            *e *= Complex::from_polar(1.0, phase);
        }
    });
}

/// Aperture radius of the cutoff in frequency bins; handy for sizing
/// expectations in tests and diagnostics.
pub fn cutoff_bins(params: &PupilParams, n: usize) -> f64 {
    params.cutoff() / freq_step(n)
}
