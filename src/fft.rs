use ndarray::Array2;
use num_complex::Complex;
use num_traits::Zero;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FftDirection {
    Forward,
    Inverse,
}

impl FftDirection {
    fn sign(self) -> f64 {
        match self {
            FftDirection::Forward => -1.0,
            FftDirection::Inverse => 1.0,
        }
    }
}

/// Radix-2 transform planner.
///
/// Memoizes the bit-reversal permutation per transform length and the
/// twiddle table per (half block, direction). Tables are immutable once
/// published, so lookups hand out shared slices.
#[derive(Default)]
pub struct FftPlanner {
    bit_rev: HashMap<usize, Arc<[usize]>>,
    twiddles: HashMap<(usize, FftDirection), Arc<[Complex<f64>]>>,
}

impl FftPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn bit_rev_table(&mut self, n: usize) -> Arc<[usize]> {
        self.bit_rev
            .entry(n)
            .or_insert_with(|| {
                let mut table = vec![0usize; n];
                let mut j = 0;
                for i in 1..n {
                    let mut bit = n >> 1;
                    while j & bit != 0 {
                        j ^= bit;
                        bit >>= 1;
                    }
                    j |= bit;
                    table[i] = j;
                }
                table.into()
            })
            .clone()
    }

    fn twiddle_table(&mut self, half: usize, direction: FftDirection) -> Arc<[Complex<f64>]> {
        self.twiddles
            .entry((half, direction))
            .or_insert_with(|| {
                let sign = direction.sign();
                (0..half)
                    .map(|k| Complex::from_polar(1.0, sign * PI * k as f64 / half as f64))
                    .collect()
            })
            .clone()
    }
}

/// In-place radix-2 Cooley-Tukey over the `n` samples at
/// `buf[offset + k * stride]`, `k` in `0..n`.
///
/// Forward is unnormalised; inverse finishes with a `1/n` scaling.
/// `n` must be a power of two.
pub fn fft1d(
    planner: &mut FftPlanner,
    buf: &mut [Complex<f64>],
    n: usize,
    direction: FftDirection,
    offset: usize,
    stride: usize,
) {
    debug_assert!(n.is_power_of_two());
    if n < 2 {
        return;
    }

    let rev = planner.bit_rev_table(n);
    for i in 0..n {
        let j = rev[i];
        if i < j {
            buf.swap(offset + i * stride, offset + j * stride);
        }
    }

    let mut half = 1;
    while half < n {
        let block = half * 2;
        let twiddles = planner.twiddle_table(half, direction);
        let mut start = 0;
        while start < n {
            for k in 0..half {
                let even = offset + (start + k) * stride;
                let odd = even + half * stride;
                let t = twiddles[k] * buf[odd];
                let e = buf[even];
                buf[even] = e + t;
                buf[odd] = e - t;
            }
            start += block;
        }
        half = block;
    }

    if direction == FftDirection::Inverse {
        let scale = 1.0 / n as f64;
        for k in 0..n {
            buf[offset + k * stride] *= scale;
        }
    }
}

/// Row-then-column decomposition of the 2-D transform on a square
/// power-of-two grid. Rows go through the stride-1 fast path directly on
/// the backing buffer; columns are gathered into a scratch column,
/// transformed, and scattered back.
pub fn fft2d(planner: &mut FftPlanner, grid: &mut Array2<Complex<f64>>, direction: FftDirection) {
    let (rows, cols) = grid.dim();
    debug_assert_eq!(rows, cols);
    let n = rows;
    let buf = grid.as_slice_mut().expect("grid must be standard layout");

    for r in 0..n {
        fft1d(planner, buf, n, direction, r * n, 1);
    }

    let mut column = vec![Complex::zero(); n];
    for c in 0..n {
        for r in 0..n {
            column[r] = buf[r * n + c];
        }
        fft1d(planner, &mut column, n, direction, 0, 1);
        for r in 0..n {
            buf[r * n + c] = column[r];
        }
    }
}

/// Swaps diagonally opposite quadrants so the DC bin moves between the
/// corner (0, 0) and the center (n/2, n/2). An involution for even n.
pub fn fftshift(grid: &mut Array2<Complex<f64>>) {
    let (rows, cols) = grid.dim();
    debug_assert_eq!(rows, cols);
    debug_assert_eq!(rows % 2, 0);
    let n = rows;
    let half = n / 2;
    let buf = grid.as_slice_mut().expect("grid must be standard layout");

    for r in 0..half {
        for c in 0..half {
            buf.swap(r * n + c, (r + half) * n + (c + half));
            buf.swap(r * n + c + half, (r + half) * n + c);
        }
    }
}
