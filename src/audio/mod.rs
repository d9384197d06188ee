//! Audio capture pipeline — compression, voice activity, stream glue.
//!
//! ```text
//! I2S samples ──▶ AudioStreamer ──▶ AdpcmEncoder (4:1) ──▶ scheduler (NORMAL)
//!                      │
//!                      └─▶ VoiceActivityDetector ──edge──▶ rate limit 15 ↔ 30
//! ```
//!
//! The encoder is pure and stateful; the streamer owns it together with
//! the VAD and the chunking buffer, so the capture task touches exactly
//! one object per DMA read.

pub mod adpcm;
pub mod stream;
pub mod vad;

pub use adpcm::{AdpcmEncoder, AdpcmState};
pub use stream::{AudioStreamer, STREAM_CHUNK_SAMPLES};
pub use vad::{rms_amplitude, VadEdge, VoiceActivityDetector};
