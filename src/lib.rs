//! Partially coherent projection-lithography simulator: forms the
//! aerial image of a binary photomask through an aberrated circular
//! pupil, measures critical dimensions, and sweeps focus and dose into
//! Bossung curves for process-window analysis.

pub mod bossung;
pub mod cd;
mod error;
pub mod fft;
pub mod mask;
pub mod pipeline;
pub mod pupil;
pub mod resist;
pub mod store;
pub mod zernike;

pub use bossung::{run_bossung_sweep, BossungCurve, BossungParams, BossungPoint, BossungResult};
pub use cd::measure_cd;
pub use error::Error;
pub use mask::Mask;
pub use pipeline::{AerialImage, Pipeline};
pub use pupil::PupilParams;
pub use store::{
    ManualScheduler, OpticalParam, SimState, SimStore, TickScheduler, ViewParam, ViewParams,
};
pub use zernike::{Noll, ZernikeCoeffs};

/// Samples per side of the simulation grid.
pub const GRID_DIM: usize = 256;

/// Physical size of one grid sample. 256 samples cover a 5.0 um field.
pub const PIXEL_SIZE_NM: f64 = 19.53125;

/// Spacing of one frequency bin, in cycles/nm, for an `n`-sample grid.
pub fn freq_step(n: usize) -> f64 {
    1.0 / (n as f64 * PIXEL_SIZE_NM)
}
