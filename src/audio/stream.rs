//! Audio streaming glue — capture samples in, scheduled packets out.
//!
//! The streamer accumulates raw capture samples into fixed 256-sample
//! chunks.  Each completed chunk is run through the voice-activity gate
//! (which may flip the scheduler's audio rate budget on an edge), then
//! ADPCM-compressed to 128 bytes and offered to the NORMAL tier.  A
//! rejected chunk is simply dropped — the capture task never stalls on a
//! congested link.

use log::info;

use crate::config::BeaconConfig;
use crate::telemetry::TelemetryScheduler;

use super::adpcm::{AdpcmEncoder, AdpcmState};
use super::vad::{VadEdge, VoiceActivityDetector};

/// Samples per compression chunk.  256 samples at 16 kHz is 16 ms of
/// audio; compresses to 128 bytes, comfortably inside the 244-byte
/// transport payload.
pub const STREAM_CHUNK_SAMPLES: usize = 256;

/// ADPCM output size per chunk (4:1).
const COMPRESSED_CHUNK_BYTES: usize = STREAM_CHUNK_SAMPLES / 2;

/// Owns the capture-side audio pipeline state.
pub struct AudioStreamer {
    encoder: AdpcmEncoder,
    vad: VoiceActivityDetector,
    chunk: [i16; STREAM_CHUNK_SAMPLES],
    fill: usize,
    enabled: bool,
    rate_quiet_pps: u16,
    rate_active_pps: u16,
}

impl AudioStreamer {
    pub fn new(config: &BeaconConfig) -> Self {
        Self {
            encoder: AdpcmEncoder::new(),
            vad: VoiceActivityDetector::new(config.audio_vad_threshold),
            chunk: [0; STREAM_CHUNK_SAMPLES],
            fill: 0,
            enabled: false,
            rate_quiet_pps: config.audio_rate_quiet_pps,
            rate_active_pps: config.audio_rate_active_pps,
        }
    }

    /// Enable or disable streaming.  Disabled, `push_samples` discards
    /// everything and the chunk buffer stays empty.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            info!(
                "audio streaming {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
        if !enabled {
            self.fill = 0;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the last VAD evaluation considered voice present.
    pub fn voice_active(&self) -> bool {
        self.vad.is_active()
    }

    /// Current encoder state, for out-of-band decoder resynchronization.
    pub fn encoder_state(&self) -> AdpcmState {
        self.encoder.state()
    }

    /// Reset the encoder and discard the partial chunk.  The next chunk
    /// is then self-contained, letting a receiver join the stream fresh.
    pub fn restart(&mut self) {
        self.encoder.reset();
        self.fill = 0;
        info!("audio stream restarted (encoder reset)");
    }

    /// Feed capture samples.  May complete several chunks in one call;
    /// each completed chunk is gated, compressed and enqueued.  Returns
    /// the last voice-activity edge observed, if any, so the caller can
    /// surface it as an application event.
    pub fn push_samples(
        &mut self,
        samples: &[i16],
        now_ms: u32,
        scheduler: &TelemetryScheduler,
    ) -> Option<VadEdge> {
        if !self.enabled {
            return None;
        }

        let mut last_edge = None;

        for &sample in samples {
            self.chunk[self.fill] = sample;
            self.fill += 1;

            if self.fill == STREAM_CHUNK_SAMPLES {
                self.fill = 0;

                if let Some(edge) = self.vad.check(&self.chunk, now_ms) {
                    let limit = match edge {
                        VadEdge::Active => self.rate_active_pps,
                        VadEdge::Inactive => self.rate_quiet_pps,
                    };
                    scheduler.set_audio_rate_limit(limit);
                    last_edge = Some(edge);
                }

                let mut compressed = [0u8; COMPRESSED_CHUNK_BYTES];
                let written = self.encoder.encode(&self.chunk, &mut compressed);
                // Drop-and-continue: a rate- or queue-rejected chunk is lost,
                // never retried.
                let _ = scheduler.enqueue_audio(&compressed[..written], now_ms);
            }
        }

        last_edge
    }
}

// ── Tests ────────────────────────────────────────────────────
