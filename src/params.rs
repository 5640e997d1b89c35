use bitflags::bitflags;

use crate::error::AecError;

bitflags! {
    /// AEC flags (mirrors `libaec`'s `aec_stream.flags`).
    ///
    /// For GRIB2 template 5.42, a subset of these flags is provided in the
    /// `ccsdsFlags` field; see [`crate::flags_from_grib2_ccsds_flags`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AecFlags: u32 {
        /// Signed samples (two's complement). If not set, samples are unsigned.
        const DATA_SIGNED     = 1 << 0;
        /// Use 3 bytes/sample for 17..=24-bit samples (otherwise 4).
        const DATA_3BYTE      = 1 << 1;
        /// Output samples as MSB-first byte order (big-endian within each sample).
        const MSB            = 1 << 2;
        /// Enable preprocessing (predictor + folding) in the bitstream.
        const DATA_PREPROCESS = 1 << 3;
        /// Restricted ID table for small bit depths.
        const RESTRICTED      = 1 << 4;
        /// Pad each RSI interval to the next byte boundary.
        const PAD_RSI         = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AecParams {
    /// Bits per sample, 1..=32.
    pub bits_per_sample: u8,
    /// Samples per block (8, 16, 32, or 64).
    pub block_size: u32,
    /// Reference sample interval, in blocks.
    pub rsi: u32,
    /// Decoder flags.
    pub flags: AecFlags,
}

impl AecParams {
    pub fn new(bits_per_sample: u8, block_size: u32, rsi: u32, flags: AecFlags) -> Self {
        Self { bits_per_sample, block_size, rsi, flags }
    }
}

/// Values derived from [`AecParams`] at init time; computed once and held immutable for the
/// life of a decode.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub params: AecParams,
    pub bytes_per_sample: usize,
    pub id_len: usize,
    pub xmin: i64,
    pub xmax: i64,
    pub in_blklen: usize,
    pub out_blklen: usize,
    pub rsi_size: usize,
}

impl Config {
    pub fn derive(params: AecParams) -> Result<Self, AecError> {
        validate_params(params)?;

        let bytes_per_sample = bytes_per_sample(params)?;
        let id_len = id_len(params)?;

        let (xmin, xmax) = if params.flags.contains(AecFlags::DATA_SIGNED) {
            let half = 1i64 << (params.bits_per_sample - 1);
            (-half, half - 1)
        } else {
            (0i64, (1i64 << params.bits_per_sample) - 1)
        };

        let block_size = params.block_size as usize;
        let bps = params.bits_per_sample as usize;
        let in_blklen = (block_size * bps + id_len) / 8 + 9;
        let out_blklen = block_size
            .checked_mul(bytes_per_sample)
            .ok_or(AecError::MemError("out_blklen overflow"))?;

        let rsi_size = block_size
            .checked_mul(params.rsi as usize)
            .ok_or(AecError::MemError("rsi_size overflow"))?;

        Ok(Self { params, bytes_per_sample, id_len, xmin, xmax, in_blklen, out_blklen, rsi_size })
    }
}

fn validate_params(params: AecParams) -> Result<(), AecError> {
    if !(1..=32).contains(&params.bits_per_sample) {
        return Err(AecError::ConfError("bits_per_sample must be 1..=32"));
    }
    if params.block_size == 0 {
        return Err(AecError::ConfError("block_size must be > 0"));
    }
    if params.rsi == 0 {
        return Err(AecError::ConfError("rsi must be > 0"));
    }
    if ![8u32, 16, 32, 64].contains(&params.block_size) {
        return Err(AecError::ConfError("block_size must be one of 8,16,32,64"));
    }
    if params.flags.contains(AecFlags::RESTRICTED) && params.bits_per_sample > 4 {
        return Err(AecError::ConfError("RESTRICTED requires bits_per_sample <= 4"));
    }
    Ok(())
}

fn bytes_per_sample(params: AecParams) -> Result<usize, AecError> {
    let bps = params.bits_per_sample;
    let b = match bps {
        1..=8 => 1,
        9..=16 => 2,
        17..=24 => if params.flags.contains(AecFlags::DATA_3BYTE) { 3 } else { 4 },
        25..=32 => 4,
        _ => return Err(AecError::ConfError("invalid bits_per_sample")),
    };
    Ok(b)
}

fn id_len(params: AecParams) -> Result<usize, AecError> {
    let bps = params.bits_per_sample;
    let mut id_len = if bps > 16 { 5 } else if bps > 8 { 4 } else { 3 };
    if params.flags.contains(AecFlags::RESTRICTED) && bps <= 4 {
        id_len = if bps <= 2 { 1 } else { 2 };
    }
    Ok(id_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_len_table() {
        let base = AecParams::new(8, 8, 1, AecFlags::empty());
        assert_eq!(Config::derive(base).unwrap().id_len, 3);
        assert_eq!(Config::derive(AecParams::new(12, 8, 1, AecFlags::empty())).unwrap().id_len, 4);
        assert_eq!(Config::derive(AecParams::new(20, 8, 1, AecFlags::empty())).unwrap().id_len, 5);
        assert_eq!(
            Config::derive(AecParams::new(2, 8, 1, AecFlags::RESTRICTED)).unwrap().id_len,
            1
        );
        assert_eq!(
            Config::derive(AecParams::new(4, 8, 1, AecFlags::RESTRICTED)).unwrap().id_len,
            2
        );
    }

    #[test]
    fn restricted_above_4_bits_is_conf_error() {
        let err = Config::derive(AecParams::new(5, 8, 1, AecFlags::RESTRICTED)).unwrap_err();
        assert!(matches!(err, AecError::ConfError(_)));
    }

    #[test]
    fn xmin_xmax_signed_unsigned() {
        let signed = Config::derive(AecParams::new(8, 8, 1, AecFlags::DATA_SIGNED)).unwrap();
        assert_eq!((signed.xmin, signed.xmax), (-128, 127));
        let unsigned = Config::derive(AecParams::new(8, 8, 1, AecFlags::empty())).unwrap();
        assert_eq!((unsigned.xmin, unsigned.xmax), (0, 255));
    }

    #[test]
    fn bytes_per_sample_3byte_flag() {
        let packed = Config::derive(AecParams::new(20, 8, 1, AecFlags::DATA_3BYTE)).unwrap();
        assert_eq!(packed.bytes_per_sample, 3);
        let unpacked = Config::derive(AecParams::new(20, 8, 1, AecFlags::empty())).unwrap();
        assert_eq!(unpacked.bytes_per_sample, 4);
    }
}
