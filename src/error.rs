#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("mask is {rows}x{cols}, pipeline grid is {expected}x{expected}")]
    MaskShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },
    #[error("bad sweep parameters: {reason}")]
    Sweep { reason: String },
    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },
}
