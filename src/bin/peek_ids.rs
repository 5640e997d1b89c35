//! Diagnostic tool: print the sequence of per-block mode IDs at the front of an AEC payload
//! without running a full decode. Handy for sanity-checking GRIB2 template 5.42 parameters
//! against a real payload before wiring up a full pipeline.

use ccsds_aec::bitreader::BitReader;
use ccsds_aec::flags_from_grib2_ccsds_flags;
use ccsds_aec::params::{AecFlags, AecParams, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let payload = std::fs::read("aec_payload.bin")?;

    let bits_per_sample = 12u8;
    let block_size = 32u32;
    let rsi = 128u32;
    let grib_ccsds_flags = 0x0eu8;

    let params = AecParams::new(bits_per_sample, block_size, rsi, flags_from_grib2_ccsds_flags(grib_ccsds_flags));
    let config = Config::derive(params)?;

    println!("payload bytes: {}", payload.len());
    println!(
        "bps={bits_per_sample} block={block_size} rsi={rsi} bytes/sample={} id_len={}",
        config.bytes_per_sample, config.id_len
    );

    let mut r = BitReader::new();
    r.push(&payload);
    let id_len = config.id_len;
    let max_id = (1u32 << id_len) - 1;
    let preprocess = params.flags.contains(AecFlags::DATA_PREPROCESS);

    for i in 0..50 {
        let Some(id) = r.read_bits(id_len) else {
            println!("#{i:02} <input exhausted>");
            break;
        };
        let mut note = String::new();
        if id == 0 {
            let sel = r.read_bit();
            note = match sel {
                Some(true) => "low:SE".to_string(),
                Some(false) => "low:ZRUN".to_string(),
                None => "low:<truncated>".to_string(),
            };
        } else if id == max_id {
            note = "UNCOMP".to_string();
            let ref_bits = if preprocess && i == 0 { bits_per_sample as usize } else { 0 };
            let skip = ref_bits + bits_per_sample as usize * (block_size as usize - 1);
            if !skip_bits(&mut r, skip) {
                note.push_str(" <truncated>");
            }
        }
        println!("#{i:02} id={id} {note} (bits_read={})", r.bits_read_total());
    }

    Ok(())
}

/// Drop `n` bits, in chunks of at most 32 (`BitReader::read_bits`/`peek` only accept `n <= 32`).
/// Returns `false` if the input runs out partway through.
fn skip_bits(r: &mut BitReader, mut n: usize) -> bool {
    while n > 0 {
        let chunk = n.min(32);
        if r.read_bits(chunk).is_none() {
            return false;
        }
        n -= chunk;
    }
    true
}
