//! Fuzz target: `AdpcmEncoder::encode`
//!
//! Feeds arbitrary PCM sample streams (in arbitrary chunk splits) into
//! the encoder and asserts the codec's hard invariants:
//! - No panics on any input
//! - Output length is always `ceil(n/2)` per chunk
//! - `step_index` stays in `[0, 88]` after every chunk
//! - Odd-tail bytes keep their high nibble zero
//!
//! cargo fuzz run fuzz_adpcm_encode

#![no_main]

use beacon::audio::{AdpcmEncoder, AdpcmState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Reinterpret the raw bytes as i16 samples.
    let samples: Vec<i16> = data
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect();

    let mut encoder = AdpcmEncoder::new();
    let mut out = vec![0u8; samples.len().div_ceil(2).max(1)];

    // Split the stream into chunks driven by the first input byte, so the
    // fuzzer also explores state continuity across encode calls.
    let chunk = usize::from(*data.first().unwrap_or(&1)).max(1);
    for piece in samples.chunks(chunk) {
        let written = encoder.encode(piece, &mut out);
        assert_eq!(written, piece.len().div_ceil(2));

        if piece.len() % 2 != 0 {
            assert_eq!(out[written - 1] & 0xF0, 0, "odd tail high nibble");
        }

        let AdpcmState { step_index, .. } = encoder.state();
        assert!((0..=88).contains(&step_index), "step index escaped range");
    }
});
