//! Public decode entry points: a resumable streaming [`Decoder`] plus one-shot convenience
//! wrappers (`decode`, `decode_into`, `buffer_decode`) built on top of it.

use crate::bitreader::BitReader;
use crate::driver::{self, DriverState};
use crate::error::AecError;
use crate::params::{AecParams, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// Like `AEC_NO_FLUSH`: decoding may continue once more input is provided.
    NoFlush,
    /// Like `AEC_FLUSH`: the caller asserts no more input will be provided; running out of
    /// input before `output_samples` is reached is a stream error, not a suspension.
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// More input is required to make progress.
    NeedInput,
    /// The output buffer was filled; provide more output space to continue.
    NeedOutput,
    /// Finished decoding `output_samples`.
    Finished,
}

/// Streaming AEC decoder, modeled after `libaec`'s `aec_stream`/`aec_decode`.
///
/// Chunked input and chunked output are both supported:
///
/// - call [`Decoder::push_input`] to append more compressed bytes
/// - call [`Decoder::decode`] to write decoded bytes into a caller-provided buffer
///
/// `Decoder` is single-threaded and synchronous: there is no internal concurrency, and it is
/// safe to `Send` between threads but must not have `decode` called on it from more than one
/// thread at a time. This is documented rather than enforced with a marker type, matching how
/// this pack's other streaming bit readers document single-writer use.
pub struct Decoder {
    config: Config,
    output_samples: usize,
    reader: BitReader,
    state: DriverState,
    total_in: u64,
    total_out: u64,
}

impl Decoder {
    pub fn new(params: AecParams, output_samples: usize) -> Result<Self, AecError> {
        let config = Config::derive(params)?;
        Ok(Self {
            state: DriverState::new(&config),
            config,
            output_samples,
            reader: BitReader::new(),
            total_in: 0,
            total_out: 0,
        })
    }

    /// Append more bytes to the input buffer. Safe to call between suspended `decode` calls.
    pub fn push_input(&mut self, input: &[u8]) {
        self.reader.push(input);
    }

    /// Total number of input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total number of output bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Bytes pushed but not yet consumed.
    pub fn avail_in(&self) -> usize {
        self.reader.avail_in()
    }

    /// Decode into `out`, returning the number of bytes written and the reason decoding
    /// stopped. `flush` is advisory: whatever is buffered is always drained into `out` by the
    /// end of the call regardless of its value: it only changes how an input underflow before
    /// `output_samples` is reached is reported.
    pub fn decode(&mut self, out: &mut [u8], flush: Flush) -> Result<(usize, DecodeStatus), AecError> {
        let target_bytes = self.output_samples * self.config.bytes_per_sample;
        if self.total_out as usize >= target_bytes {
            return Ok((0, DecodeStatus::Finished));
        }

        let cap = (target_bytes - self.total_out as usize).min(out.len());
        let out_slice = &mut out[..cap];
        let mut out_pos = 0usize;
        let mut avail_out = cap;

        driver::drive(&mut self.state, &mut self.reader, out_slice, &mut out_pos, &mut avail_out, &self.config)?;
        driver::final_flush(&mut self.state, out_slice, &mut out_pos, &self.config)?;

        self.total_in += self.reader.compact() as u64;
        self.total_out += out_pos as u64;

        if self.total_out as usize >= target_bytes {
            return Ok((out_pos, DecodeStatus::Finished));
        }
        if avail_out == 0 {
            return Ok((out_pos, DecodeStatus::NeedOutput));
        }
        match flush {
            Flush::NoFlush => Ok((out_pos, DecodeStatus::NeedInput)),
            Flush::Flush => Err(AecError::UnexpectedEofDuringDecode {
                bit_pos: self.reader.bits_read_total(),
                samples_written: self.total_out as usize / self.config.bytes_per_sample,
            }),
        }
    }
}

/// Decode an AEC bitstream into freshly allocated packed sample bytes.
///
/// Returns a `Vec<u8>` of length `output_samples * bytes_per_sample`, where `bytes_per_sample`
/// follows from `params` (`ceil(bits_per_sample / 8)`, subject to `AecFlags::DATA_3BYTE`).
pub fn decode(input: &[u8], params: AecParams, output_samples: usize) -> Result<Vec<u8>, AecError> {
    let config = Config::derive(params)?;
    let output_bytes = output_samples
        .checked_mul(config.bytes_per_sample)
        .ok_or(AecError::MemError("output size overflows usize"))?;
    let mut out = vec![0u8; output_bytes];
    decode_into(input, params, output_samples, &mut out)?;
    Ok(out)
}

/// Decode an AEC bitstream into a caller-provided output buffer.
///
/// `output.len()` must equal exactly `output_samples * bytes_per_sample`.
pub fn decode_into(
    input: &[u8],
    params: AecParams,
    output_samples: usize,
    output: &mut [u8],
) -> Result<(), AecError> {
    let config = Config::derive(params)?;
    let output_bytes = output_samples
        .checked_mul(config.bytes_per_sample)
        .ok_or(AecError::MemError("output size overflows usize"))?;
    if output.len() != output_bytes {
        return Err(AecError::DataError("output buffer has wrong length"));
    }

    buffer_decode(params, input, output, output_samples)
}

/// One-shot convenience wrapping `init` + `decode(Flush)` + `end`, matching the language-agnostic
/// entry-point surface: `buffer_decode(config, input, output)`.
pub fn buffer_decode(
    params: AecParams,
    input: &[u8],
    output: &mut [u8],
    output_samples: usize,
) -> Result<(), AecError> {
    let mut decoder = Decoder::new(params, output_samples)?;
    decoder.push_input(input);

    let mut written = 0usize;
    while written < output.len() {
        let (n, status) = decoder.decode(&mut output[written..], Flush::Flush)?;
        written += n;
        if status == DecodeStatus::Finished || n == 0 {
            break;
        }
    }
    Ok(())
}
