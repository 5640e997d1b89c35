use core::fmt;

/// Errors surfaced by this crate, grouped the way CCSDS 121.0-B-2 implementations
/// conventionally report them: configuration, resource, and stream (data) errors, plus the
/// two EOF shapes used internally to distinguish "ran out mid-block" from "clean boundary".
#[derive(Debug, Clone)]
pub enum AecError {
    /// Rejected at init: out-of-range `bits_per_sample`, incompatible flag combination, or an
    /// unsupported `block_size`/`rsi`.
    ConfError(&'static str),
    /// A buffer size derived from the configuration overflows `usize`.
    MemError(&'static str),
    /// The stream violates a decoder invariant (e.g. a zero-run that would overflow the RSI
    /// buffer, or an out-of-range Second Extension code).
    DataError(&'static str),
    /// Input exhausted while reading a field; not itself fatal, absorbed by the driver as a
    /// suspension unless the caller asserted `Flush::Flush`.
    UnexpectedEof { bit_pos: u64 },
    /// Input exhausted mid-decode while flushing was asserted.
    UnexpectedEofDuringDecode { bit_pos: u64, samples_written: usize },
}

impl fmt::Display for AecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AecError::ConfError(s) => write!(f, "configuration error: {s}"),
            AecError::MemError(s) => write!(f, "resource error: {s}"),
            AecError::DataError(s) => write!(f, "data error: {s}"),
            AecError::UnexpectedEof { bit_pos } => write!(f, "unexpected end of input at bit {bit_pos}"),
            AecError::UnexpectedEofDuringDecode { bit_pos, samples_written } => {
                write!(f, "unexpected end of input at bit {bit_pos} (wrote {samples_written} samples)")
            }
        }
    }
}

impl std::error::Error for AecError {}
