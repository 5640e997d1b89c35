//! RSI buffer and the sample sink: accumulates decoded residuals as raw 32-bit words and
//! drains them to the caller's output buffer, applying the preprocessor inverse when enabled.
//!
//! Block decoders always write *raw* residual words here, whether or not preprocessing is on:
//! a reference sample is the raw `bits_per_sample`-bit field (sign extension happens on flush),
//! a split/zero/second-extension residual is the coded, non-negative delta. Interpreting those
//! words - copying them verbatim, or integrating them against a running predictor - is entirely
//! `flush`'s job, mirroring `libaec`'s `FLUSH` macro.

use crate::error::AecError;
use crate::params::{AecFlags, Config};

/// Reference Sample Interval buffer: `rsi * block_size` raw residual words.
#[derive(Debug, Clone)]
pub struct RsiBuffer {
    data: Vec<u32>,
    rsip: usize,
    flush_start: usize,
}

impl RsiBuffer {
    pub fn new(rsi_size: usize) -> Self {
        Self { data: vec![0u32; rsi_size], rsip: 0, flush_start: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.data.len() - self.rsip
    }

    pub fn is_rsi_full(&self) -> bool {
        self.rsip == self.data.len()
    }

    /// Number of residual words committed so far this RSI (the write cursor).
    pub fn len(&self) -> usize {
        self.rsip
    }

    pub fn is_empty(&self) -> bool {
        self.rsip == 0
    }

    /// Push one residual word. Caller must ensure `remaining_capacity() > 0`.
    pub fn push(&mut self, v: u32) {
        self.data[self.rsip] = v;
        self.rsip += 1;
    }

    /// Add `delta` to an already-committed slot (used by split-mode's tail pass, which
    /// revisits slots written by the preceding fundamental-sequence pass).
    pub fn add_at(&mut self, idx: usize, delta: u32) {
        self.data[idx] = self.data[idx].wrapping_add(delta);
    }

    /// Push `n` zero residuals (used by the zero-block mode). Errors if `n` would overflow
    /// the RSI buffer.
    pub fn fill_zero(&mut self, n: usize) -> Result<(), AecError> {
        if n > self.remaining_capacity() {
            return Err(AecError::DataError("zero-block run overflows RSI buffer"));
        }
        for _ in 0..n {
            self.push(0);
        }
        Ok(())
    }

    /// Reset to the start of a new RSI.
    pub fn reset(&mut self) {
        self.rsip = 0;
        self.flush_start = 0;
    }

    pub fn has_pending(&self) -> bool {
        self.flush_start < self.rsip
    }
}

/// Drain `[flush_start, rsip)` of `buf` into `out[*out_pos..]`, advancing `*out_pos`.
///
/// `predictor` holds the running `last_out` value. `buf.flush_start == 0 && buf.rsip > 0` marks
/// an as-yet-unflushed reference sample at the head of `buf` - true at the start of every RSI
/// (the driver resets `buf` wholesale at each RSI boundary) - and this function always treats
/// that slot as an absolute reference, overwriting whatever `predictor` carried from the
/// previous RSI. The driver never needs to reset `predictor` itself.
pub fn flush(
    buf: &mut RsiBuffer,
    out: &mut [u8],
    out_pos: &mut usize,
    predictor: &mut Option<i64>,
    config: &Config,
) -> Result<(), AecError> {
    let preprocess = config.params.flags.contains(AecFlags::DATA_PREPROCESS);
    let rsip = buf.rsip;
    let mut idx = buf.flush_start;

    if !preprocess {
        for &w in &buf.data[idx..rsip] {
            write_sample(out, out_pos, w as i64, config)?;
        }
        buf.flush_start = rsip;
        return Ok(());
    }

    if idx == 0 && rsip > 0 {
        let raw = buf.data[0] as i64;
        let last = if config.params.flags.contains(AecFlags::DATA_SIGNED) {
            let m = 1i64 << (config.params.bits_per_sample - 1);
            (raw ^ m) - m
        } else {
            raw
        };
        write_sample(out, out_pos, last, config)?;
        *predictor = Some(last);
        idx = 1;
    }

    let Some(mut data) = *predictor else {
        // Nothing buffered yet and no reference seen: nothing to do.
        buf.flush_start = rsip;
        return Ok(());
    };

    let med: i64 = if config.params.flags.contains(AecFlags::DATA_SIGNED) {
        0
    } else {
        (config.xmax - config.xmin) / 2 + 1
    };

    for &w in &buf.data[idx..rsip] {
        let d = w as i64;
        let half_d = (d + 1) >> 1;

        data = if data < med {
            if half_d <= data - config.xmin {
                if d & 1 != 0 { data - half_d } else { data + half_d }
            } else {
                config.xmin + d
            }
        } else if half_d <= config.xmax - data {
            if d & 1 != 0 { data - half_d } else { data + half_d }
        } else {
            config.xmax - d
        };

        write_sample(out, out_pos, data, config)?;
    }

    *predictor = Some(data);
    buf.flush_start = rsip;
    Ok(())
}

fn write_sample(out: &mut [u8], out_pos: &mut usize, value: i64, config: &Config) -> Result<(), AecError> {
    let bytes_per_sample = config.bytes_per_sample;

    // Signed output is the low `bytes_per_sample` bytes of the two's-complement value, not the
    // low `bits_per_sample` bits: masking to `bps` would clip the sign into the byte (e.g. -1 at
    // bps=1 must emit 0xff, not 0x01). Unsigned samples are already within [0, xmax], so masking
    // to `bps` bits is a no-op there and is kept for symmetry with the signed path's width.
    let raw_u: u64 = if config.params.flags.contains(AecFlags::DATA_SIGNED) {
        let byte_mask: u64 = if bytes_per_sample >= 8 { u64::MAX } else { (1u64 << (bytes_per_sample * 8)) - 1 };
        (value as u64) & byte_mask
    } else {
        let n = config.params.bits_per_sample as u32;
        let bit_mask: u64 = if n >= 64 { u64::MAX } else { (1u64 << n) - 1 };
        (value.max(0) as u64) & bit_mask
    };

    if out_pos.checked_add(bytes_per_sample).ok_or(AecError::DataError("output position overflow"))? > out.len() {
        return Err(AecError::DataError("output buffer too small for flushed sample"));
    }

    if config.params.flags.contains(AecFlags::MSB) {
        for i in (0..bytes_per_sample).rev() {
            out[*out_pos] = ((raw_u >> (i * 8)) & 0xff) as u8;
            *out_pos += 1;
        }
    } else {
        for i in 0..bytes_per_sample {
            out[*out_pos] = ((raw_u >> (i * 8)) & 0xff) as u8;
            *out_pos += 1;
        }
    }

    Ok(())
}
