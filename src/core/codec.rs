//! Sequence payload compression
//!
//! zlib framing carries its own header and checksum, so stored payloads
//! can be decompressed later without any side information.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Compress a payload for storage
pub fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 3 + 16), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompress a payload produced by [`compress`]
pub fn decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 3);
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_is_lossless() -> io::Result<()> {
        let seq = b"ACGTNNNNNNNNNNacgtACGTACGTACGTACGT".repeat(50);
        let packed = compress(&seq)?;
        assert!(packed.len() < seq.len());
        assert_eq!(decompress(&packed)?, seq);
        Ok(())
    }

    #[test]
    fn test_empty_payload() -> io::Result<()> {
        assert_eq!(decompress(&compress(b"")?)?, b"");
        Ok(())
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decompress(b"not zlib at all").is_err());
    }
}
