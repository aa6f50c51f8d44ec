/// Noll-indexed Zernike terms Z4 through Z11, the classic third-order
/// aberrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Noll {
    Z4,
    Z5,
    Z6,
    Z7,
    Z8,
    Z9,
    Z10,
    Z11,
}

pub const NOLL_TERMS: [Noll; 8] = [
    Noll::Z4,
    Noll::Z5,
    Noll::Z6,
    Noll::Z7,
    Noll::Z8,
    Noll::Z9,
    Noll::Z10,
    Noll::Z11,
];

impl Noll {
    /// Position within the coefficient array (Z4 is slot 0).
    fn slot(self) -> usize {
        self as usize
    }

    /// The conventional Noll index, 4..=11.
    pub fn index(self) -> usize {
        self as usize + 4
    }

    pub fn name(self) -> &'static str {
        match self {
            Noll::Z4 => "defocus",
            Noll::Z5 => "oblique astigmatism",
            Noll::Z6 => "vertical astigmatism",
            Noll::Z7 => "vertical coma",
            Noll::Z8 => "horizontal coma",
            Noll::Z9 => "spherical",
            Noll::Z10 => "oblique trefoil",
            Noll::Z11 => "vertical trefoil",
        }
    }

    /// Evaluates the orthonormal polynomial at normalized polar
    /// coordinates, rho in [0, 1] and theta in [-pi, pi].
    pub fn evaluate(self, rho: f64, theta: f64) -> f64 {
        let r2 = rho * rho;
        match self {
            Noll::Z4 => 3f64.sqrt() * (2.0 * r2 - 1.0),
            Noll::Z5 => 6f64.sqrt() * r2 * (2.0 * theta).sin(),
            Noll::Z6 => 6f64.sqrt() * r2 * (2.0 * theta).cos(),
            Noll::Z7 => 8f64.sqrt() * (3.0 * r2 - 2.0) * rho * theta.sin(),
            Noll::Z8 => 8f64.sqrt() * (3.0 * r2 - 2.0) * rho * theta.cos(),
            Noll::Z9 => 5f64.sqrt() * (6.0 * r2 * r2 - 6.0 * r2 + 1.0),
            Noll::Z10 => 8f64.sqrt() * r2 * rho * (3.0 * theta).sin(),
            Noll::Z11 => 8f64.sqrt() * r2 * rho * (3.0 * theta).cos(),
        }
    }
}

/// Aberration coefficients in waves, one per Noll term.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZernikeCoeffs {
    waves: [f64; 8],
}

impl ZernikeCoeffs {
    pub fn get(&self, term: Noll) -> f64 {
        self.waves[term.slot()]
    }

    pub fn set(&mut self, term: Noll, waves: f64) {
        self.waves[term.slot()] = waves;
    }

    pub fn is_zero(&self) -> bool {
        self.waves.iter().all(|&c| c == 0.0)
    }

    /// Wavefront deviation in waves at (rho, theta); zero-coefficient
    /// terms are skipped.
    pub fn phase_error(&self, rho: f64, theta: f64) -> f64 {
        NOLL_TERMS
            .iter()
            .map(|&term| {
                let c = self.get(term);
                if c == 0.0 {
                    0.0
                } else {
                    c * term.evaluate(rho, theta)
                }
            })
            .sum()
    }
}
