//! Block-oriented state machine: dispatches per-block coding modes and suspends/resumes across
//! `decode` calls on buffer exhaustion.
//!
//! The original structure (`examples/original_source/src/decode.c`) uses a table of per-state
//! function pointers indexed by block mode id. This crate re-architects it as a tagged [`Mode`]
//! enum with an explicit `match` in [`step`]: resumption state is then explicit in the enum
//! rather than hidden behind an indirect call, and the compiler can specialize the fast paths.
//!
//! Every block decoder keeps the duplication the original has between a "direct" (unchecked,
//! `BUFFERSPACE`-gated) routine and a "checked" (resumable) routine: the direct routines call
//! into `BitReader`'s unchecked `direct_get`/`direct_get_fs`, which have no fallible signature.

use crate::bitreader::BitReader;
use crate::error::AecError;
use crate::params::{AecFlags, Config};
use crate::se_table::{self, SE_TABLE_LEN};
use crate::sink::{self, RsiBuffer};

/// Zero-block fundamental-sequence escape value ("reference of same").
const ROS: u32 = 5;
/// Number of (a, b) pairs the second-extension table covers; `m` outside this range is corrupt.
const SE_PAIR_COUNT: usize = SE_TABLE_LEN / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    LowEntropy,
    Split(u32),
    Uncomp,
}

fn build_id_table(id_len: usize) -> Vec<BlockKind> {
    let n = 1usize << id_len;
    let mut table = Vec::with_capacity(n);
    table.push(BlockKind::LowEntropy);
    for id in 1..n - 1 {
        table.push(BlockKind::Split(id as u32 - 1));
    }
    table.push(BlockKind::Uncomp);
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Id,
    LowEntropy,
    LowEntropyRef,
    Split,
    SplitFs,
    SplitOutput,
    ZeroBlock,
    ZeroOutput,
    Se,
    SeDecode,
    Uncomp,
    UncompCopy,
}

pub enum StepResult {
    Continue,
    Exit,
    Error(AecError),
}

/// Driver state: current mode plus the intra-block scratch that must survive a suspension.
pub struct DriverState {
    pub mode: Mode,
    id: u32,
    ref_flag: bool,
    /// RSI-buffer index where the current block's (non-reference) residuals begin.
    block_start: usize,
    /// Generic progress counter, meaning depends on `mode`.
    i: usize,
    /// Generic target count for the current phase.
    n: usize,
    /// Partial fundamental-sequence accumulator, preserved across suspension mid-code.
    fs: u32,
    /// Set once a second-extension pair's `m` has been fully decoded but not yet both its
    /// samples emitted (output space ran out between the two `put_sample`s of a pair).
    se_have_m: bool,
    /// Running `last_out`; `None` only before the stream's very first reference sample.
    pub predictor: Option<i64>,
    pub rsi_buf: RsiBuffer,
    id_table: Vec<BlockKind>,
    se_table: [i32; SE_TABLE_LEN],
}

impl DriverState {
    pub fn new(config: &Config) -> Self {
        Self {
            mode: Mode::Id,
            id: 0,
            ref_flag: false,
            block_start: 0,
            i: 0,
            n: 0,
            fs: 0,
            se_have_m: false,
            predictor: None,
            rsi_buf: RsiBuffer::new(config.rsi_size),
            id_table: build_id_table(config.id_len),
            se_table: se_table::build(),
        }
    }
}

fn check_rsi_end(
    state: &mut DriverState,
    out: &mut [u8],
    out_pos: &mut usize,
    config: &Config,
) -> Result<(), AecError> {
    if state.rsi_buf.len() == config.rsi_size {
        let before = *out_pos;
        sink::flush(&mut state.rsi_buf, out, out_pos, &mut state.predictor, config)?;
        log::debug!("rsi flush: {} bytes drained", *out_pos - before);
        state.rsi_buf.reset();
    }
    Ok(())
}

/// Drain whatever has accumulated in the RSI buffer regardless of whether it fills an RSI.
/// Called unconditionally at the end of every `decode` call, mirroring `decode.c`'s post-loop
/// `flush_output` invocation.
pub fn final_flush(state: &mut DriverState, out: &mut [u8], out_pos: &mut usize, config: &Config) -> Result<(), AecError> {
    if state.rsi_buf.has_pending() {
        let before = *out_pos;
        sink::flush(&mut state.rsi_buf, out, out_pos, &mut state.predictor, config)?;
        log::debug!("final flush: {} bytes drained", *out_pos - before);
    }
    Ok(())
}

/// Run the state machine until it suspends (needs more input/output) or hits a stream error.
pub fn drive(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> Result<(), AecError> {
    loop {
        log::trace!("dispatch: mode={:?} bitp={}", state.mode, reader.bitp());
        match step(state, reader, out, out_pos, avail_out, config) {
            StepResult::Continue => continue,
            StepResult::Exit => {
                log::debug!("suspending: mode={:?} bitp={}", state.mode, reader.bitp());
                return Ok(());
            }
            StepResult::Error(e) => return Err(e),
        }
    }
}

fn step(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    match state.mode {
        Mode::Id => step_id(state, reader, config),
        Mode::LowEntropy => step_low_entropy(state, reader),
        Mode::LowEntropyRef => step_low_entropy_ref(state, reader, out, out_pos, avail_out, config),
        Mode::Split => step_split(state, reader, out, out_pos, avail_out, config),
        Mode::SplitFs => step_split_fs(state, reader),
        Mode::SplitOutput => step_split_output(state, reader, out, out_pos, avail_out, config),
        Mode::ZeroBlock => step_zero_block(state, reader, out, out_pos, avail_out, config),
        Mode::ZeroOutput => step_zero_output(state, out, out_pos, avail_out, config),
        Mode::Se => step_se(state, reader, out, out_pos, avail_out, config),
        Mode::SeDecode => step_se_decode(state, reader, out, out_pos, avail_out, config),
        Mode::Uncomp => step_uncomp(state, reader, out, out_pos, avail_out, config),
        Mode::UncompCopy => step_uncomp_copy(state, reader, out, out_pos, avail_out, config),
    }
}

fn step_id(state: &mut DriverState, reader: &mut BitReader, config: &Config) -> StepResult {
    if config.params.flags.contains(AecFlags::DATA_PREPROCESS) && state.rsi_buf.is_empty() {
        state.ref_flag = true;
        if config.params.flags.contains(AecFlags::PAD_RSI) {
            reader.align_to_byte();
        }
    } else {
        state.ref_flag = false;
    }

    if !reader.ensure(config.id_len) {
        return StepResult::Exit;
    }
    let id = reader.peek(config.id_len);
    reader.drop_bits(config.id_len);
    state.id = id;
    state.mode = match state.id_table[id as usize] {
        BlockKind::LowEntropy => Mode::LowEntropy,
        BlockKind::Split(_) => Mode::Split,
        BlockKind::Uncomp => Mode::Uncomp,
    };
    StepResult::Continue
}

fn step_low_entropy(state: &mut DriverState, reader: &mut BitReader) -> StepResult {
    if !reader.ensure(1) {
        return StepResult::Exit;
    }
    state.id = reader.peek(1);
    reader.drop_bits(1);
    state.mode = Mode::LowEntropyRef;
    StepResult::Continue
}

fn step_low_entropy_ref(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    if state.ref_flag {
        let bps = config.params.bits_per_sample as usize;
        if !reader.ensure(bps) || *avail_out < config.bytes_per_sample {
            return StepResult::Exit;
        }
        let v = reader.peek(bps);
        reader.drop_bits(bps);
        state.rsi_buf.push(v);
        *avail_out -= config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
    }
    state.mode = if state.id == 1 { Mode::Se } else { Mode::ZeroBlock };
    StepResult::Continue
}

fn step_split(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    let BlockKind::Split(k) = state.id_table[state.id as usize] else { unreachable!("id_table entry for Split id must be Split") };
    let k = k as usize;
    let block_size = config.params.block_size as usize;
    let bps = config.params.bits_per_sample as usize;

    if reader.avail_in() >= config.in_blklen && *avail_out >= config.out_blklen {
        if state.ref_flag {
            let v = reader.direct_get(bps);
            state.rsi_buf.push(v);
        }
        let n = block_size - state.ref_flag as usize;
        let start = state.rsi_buf.len();
        for _ in 0..n {
            let v = reader.direct_get_fs();
            state.rsi_buf.push(v << k);
        }
        for i in 0..n {
            let t = reader.direct_get(k);
            state.rsi_buf.add_at(start + i, t);
        }
        *avail_out -= config.out_blklen;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.mode = Mode::Id;
        return StepResult::Continue;
    }

    if state.ref_flag {
        if !reader.ensure(bps) || *avail_out < config.bytes_per_sample {
            return StepResult::Exit;
        }
        let v = reader.peek(bps);
        reader.drop_bits(bps);
        state.rsi_buf.push(v);
        *avail_out -= config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.n = block_size - 1;
    } else {
        state.n = block_size;
    }
    state.i = 0;
    state.block_start = state.rsi_buf.len();
    state.mode = Mode::SplitFs;
    StepResult::Continue
}

fn step_split_fs(state: &mut DriverState, reader: &mut BitReader) -> StepResult {
    let BlockKind::Split(k) = state.id_table[state.id as usize] else { unreachable!("id_table entry for Split id must be Split") };
    let k = k as usize;
    while state.i < state.n {
        if !reader.fs_step(&mut state.fs) {
            return StepResult::Exit;
        }
        state.rsi_buf.push(state.fs << k);
        state.fs = 0;
        state.i += 1;
    }
    state.i = 0;
    state.mode = Mode::SplitOutput;
    StepResult::Continue
}

fn step_split_output(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    let BlockKind::Split(k) = state.id_table[state.id as usize] else { unreachable!("id_table entry for Split id must be Split") };
    let k = k as usize;
    while state.i < state.n {
        let have_bits = k == 0 || reader.ensure(k);
        if !have_bits || *avail_out < config.bytes_per_sample {
            return StepResult::Exit;
        }
        let t = if k == 0 {
            0
        } else {
            let v = reader.peek(k);
            reader.drop_bits(k);
            v
        };
        state.rsi_buf.add_at(state.block_start + state.i, t);
        *avail_out -= config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.i += 1;
    }
    state.mode = Mode::Id;
    StepResult::Continue
}

fn step_zero_block(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    if !reader.fs_step(&mut state.fs) {
        return StepResult::Exit;
    }
    let mut zero_blocks = state.fs + 1;
    state.fs = 0;

    let block_size = config.params.block_size as usize;
    let b = state.rsi_buf.len() / block_size;

    if zero_blocks == ROS {
        let rsi = config.params.rsi as usize;
        zero_blocks = ((rsi - b).min(64 - (b % 64))) as u32;
    } else if zero_blocks > ROS {
        zero_blocks -= 1;
    }

    let n = if state.ref_flag {
        zero_blocks as usize * block_size - 1
    } else {
        zero_blocks as usize * block_size
    };

    if *avail_out >= n * config.bytes_per_sample {
        if let Err(e) = state.rsi_buf.fill_zero(n) {
            return StepResult::Error(e);
        }
        *avail_out -= n * config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.mode = Mode::Id;
        return StepResult::Continue;
    }

    state.i = n;
    state.mode = Mode::ZeroOutput;
    StepResult::Continue
}

fn step_zero_output(
    state: &mut DriverState,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    while state.i > 0 {
        if *avail_out < config.bytes_per_sample {
            return StepResult::Exit;
        }
        if state.rsi_buf.remaining_capacity() == 0 {
            return StepResult::Error(AecError::DataError("zero-block run overflows RSI buffer"));
        }
        state.rsi_buf.push(0);
        *avail_out -= config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.i -= 1;
    }
    state.mode = Mode::Id;
    StepResult::Continue
}

fn se_pair(se_table: &[i32; SE_TABLE_LEN], m: u32) -> Result<(i32, i32), AecError> {
    if m as usize >= SE_PAIR_COUNT {
        return Err(AecError::DataError("second extension code out of range"));
    }
    let d1 = m as i32 - se_table[2 * m as usize + 1];
    let a = se_table[2 * m as usize] - d1;
    Ok((a, d1))
}

fn step_se(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    let block_size = config.params.block_size as usize;

    if reader.avail_in() >= config.in_blklen && *avail_out >= config.out_blklen {
        let mut i = state.ref_flag as usize;
        while i < block_size {
            let m = reader.direct_get_fs();
            let (a, d1) = match se_pair(&state.se_table, m) {
                Ok(pair) => pair,
                Err(e) => return StepResult::Error(e),
            };
            if i % 2 == 0 {
                state.rsi_buf.push(a as u32);
                i += 1;
            }
            state.rsi_buf.push(d1 as u32);
            i += 1;
        }
        // Unlike `step_split`/`step_uncomp`, the reference sample (if any) was already pushed
        // and already charged against `avail_out` by `step_low_entropy_ref`; this loop only
        // emits `block_size - ref` samples, so only those are charged here.
        *avail_out -= (block_size - state.ref_flag as usize) * config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.mode = Mode::Id;
        return StepResult::Continue;
    }

    state.i = state.ref_flag as usize;
    state.mode = Mode::SeDecode;
    StepResult::Continue
}

fn step_se_decode(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    let block_size = config.params.block_size as usize;

    while state.i < block_size {
        if !state.se_have_m {
            if !reader.fs_step(&mut state.fs) {
                return StepResult::Exit;
            }
            state.se_have_m = true;
        }

        let (a, d1) = match se_pair(&state.se_table, state.fs) {
            Ok(pair) => pair,
            Err(e) => return StepResult::Error(e),
        };

        if state.i % 2 == 0 {
            if *avail_out < config.bytes_per_sample {
                return StepResult::Exit;
            }
            state.rsi_buf.push(a as u32);
            *avail_out -= config.bytes_per_sample;
            if let Err(e) = check_rsi_end(state, out, out_pos, config) {
                return StepResult::Error(e);
            }
            state.i += 1;
        }

        if *avail_out < config.bytes_per_sample {
            return StepResult::Exit;
        }
        state.rsi_buf.push(d1 as u32);
        *avail_out -= config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.i += 1;

        state.fs = 0;
        state.se_have_m = false;
    }
    state.mode = Mode::Id;
    StepResult::Continue
}

fn step_uncomp(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    let block_size = config.params.block_size as usize;
    let bps = config.params.bits_per_sample as usize;

    if reader.avail_in() >= config.in_blklen && *avail_out >= config.out_blklen {
        for _ in 0..block_size {
            let v = reader.direct_get(bps);
            state.rsi_buf.push(v);
        }
        *avail_out -= config.out_blklen;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.mode = Mode::Id;
        return StepResult::Continue;
    }

    state.i = block_size;
    state.mode = Mode::UncompCopy;
    StepResult::Continue
}

fn step_uncomp_copy(
    state: &mut DriverState,
    reader: &mut BitReader,
    out: &mut [u8],
    out_pos: &mut usize,
    avail_out: &mut usize,
    config: &Config,
) -> StepResult {
    let bps = config.params.bits_per_sample as usize;
    while state.i > 0 {
        if !reader.ensure(bps) || *avail_out < config.bytes_per_sample {
            return StepResult::Exit;
        }
        let v = reader.peek(bps);
        reader.drop_bits(bps);
        state.rsi_buf.push(v);
        *avail_out -= config.bytes_per_sample;
        if let Err(e) = check_rsi_end(state, out, out_pos, config) {
            return StepResult::Error(e);
        }
        state.i -= 1;
    }
    state.mode = Mode::Id;
    StepResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AecParams;

    fn run(
        state: &mut DriverState,
        reader: &mut BitReader,
        out: &mut [u8],
        config: &Config,
    ) -> (usize, Result<(), AecError>) {
        let mut out_pos = 0usize;
        let mut avail_out = out.len();
        let result = drive(state, reader, out, &mut out_pos, &mut avail_out, config);
        if result.is_ok() {
            let _ = final_flush(state, out, &mut out_pos, config);
        }
        (out_pos, result)
    }

    #[test]
    fn uncompressed_block_exact_bytes() {
        let config = Config::derive(AecParams::new(8, 8, 1, AecFlags::empty())).unwrap();
        // id (3 bits) = 111 (uncompressed), then 8 bytes of 8 bits each => 67 bits => 9 bytes.
        let mut stream = vec![0u8; 9];
        // Write id=0b111 into the top 3 bits of byte 0.
        stream[0] = 0b1110_0000;
        let samples: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
        let mut bitpos = 3usize;
        for &s in &samples {
            for b in (0..8).rev() {
                let bit = (s >> b) & 1;
                if bit != 0 {
                    stream[bitpos / 8] |= 1 << (7 - (bitpos % 8));
                }
                bitpos += 1;
            }
        }

        let mut reader = BitReader::new();
        reader.push(&stream);
        let mut state = DriverState::new(&config);
        let mut out = vec![0u8; 8];
        let (n, result) = run(&mut state, &mut reader, &mut out, &config);
        result.unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, samples);
    }

    #[test]
    fn preprocess_signed_zero_residuals_repeat_reference() {
        let config = Config::derive(AecParams::new(
            8,
            8,
            1,
            AecFlags::DATA_PREPROCESS | AecFlags::DATA_SIGNED,
        ))
        .unwrap();

        // First block of the only RSI: reference (8 bits) = 100, then 7 samples split k=0
        // (fs-only) each encoding residual 0 (one terminating bit each).
        let mut bits = Vec::new();
        // id = 0b001 (k = 0 => id - 1 = 0 => id = 1), 3 bits.
        push_bits(&mut bits, 0b001, 3);
        push_bits(&mut bits, 100, 8); // reference sample raw bits
        for _ in 0..7 {
            push_bits(&mut bits, 1, 1); // fs = 0: single terminating '1' bit
        }
        let stream = pack_bits(&bits);

        let mut reader = BitReader::new();
        reader.push(&stream);
        let mut state = DriverState::new(&config);
        let mut out = vec![0u8; 8];
        let (n, result) = run(&mut state, &mut reader, &mut out, &config);
        result.unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, [100u8; 8]);
    }

    #[test]
    fn zero_block_ros_clamps_to_rsi_remainder() {
        // bps = 8, block_size = 8, rsi = 4: reference then a ROS zero-block should fill
        // the remaining 3 blocks (24 samples minus the 1 already-written reference = 23).
        let config =
            Config::derive(AecParams::new(8, 8, 4, AecFlags::DATA_PREPROCESS)).unwrap();

        let mut bits = Vec::new();
        push_bits(&mut bits, 0b000, 3); // id = 0 -> low entropy
        push_bits(&mut bits, 0, 1); // low-entropy sub-id 0 -> zero block
        push_bits(&mut bits, 42, 8); // reference sample
        // fs = 4 (ROS): four zero bits then a terminating one.
        push_bits(&mut bits, 0, 4);
        push_bits(&mut bits, 1, 1);
        let stream = pack_bits(&bits);

        let mut reader = BitReader::new();
        reader.push(&stream);
        let mut state = DriverState::new(&config);
        let mut out = vec![0u8; 32];
        let (n, result) = run(&mut state, &mut reader, &mut out, &config);
        result.unwrap();
        assert_eq!(n, 32);
        assert_eq!(&out[0..32], [42u8; 32]);
    }

    #[test]
    fn second_extension_all_zero_pairs() {
        let config = Config::derive(AecParams::new(8, 8, 1, AecFlags::empty())).unwrap();
        let mut bits = Vec::new();
        push_bits(&mut bits, 0b000, 3); // id = 0 -> low entropy
        push_bits(&mut bits, 1, 1); // sub-id 1 -> second extension
        for _ in 0..4 {
            push_bits(&mut bits, 1, 1); // m = 0 for each of 4 pairs (8 samples)
        }
        let stream = pack_bits(&bits);

        let mut reader = BitReader::new();
        reader.push(&stream);
        let mut state = DriverState::new(&config);
        let mut out = vec![0u8; 8];
        let (n, result) = run(&mut state, &mut reader, &mut out, &config);
        result.unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, [0u8; 8]);
    }

    #[test]
    fn byte_at_a_time_suspension_matches_whole_input() {
        let config = Config::derive(AecParams::new(8, 8, 1, AecFlags::empty())).unwrap();
        let mut stream = vec![0u8; 9];
        stream[0] = 0b1110_0000;
        let samples: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
        let mut bitpos = 3usize;
        for &s in &samples {
            for b in (0..8).rev() {
                let bit = (s >> b) & 1;
                if bit != 0 {
                    stream[bitpos / 8] |= 1 << (7 - (bitpos % 8));
                }
                bitpos += 1;
            }
        }

        let mut reader = BitReader::new();
        let mut state = DriverState::new(&config);
        let mut out = vec![0u8; 8];
        let mut out_pos = 0usize;
        for &byte in &stream {
            reader.push(&[byte]);
            let mut avail_out = out.len() - out_pos;
            drive(&mut state, &mut reader, &mut out, &mut out_pos, &mut avail_out, &config).unwrap();
        }
        final_flush(&mut state, &mut out, &mut out_pos, &config).unwrap();
        assert_eq!(out_pos, 8);
        assert_eq!(out, samples);
    }

    fn push_bits(bits: &mut Vec<u8>, value: u32, n: usize) {
        for i in (0..n).rev() {
            bits.push(((value >> i) & 1) as u8);
        }
    }

    fn pack_bits(bits: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; bits.len().div_ceil(8)];
        for (i, &b) in bits.iter().enumerate() {
            if b != 0 {
                out[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        out
    }
}
