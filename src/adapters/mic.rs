//! I2S MEMS microphone adapter.
//!
//! Implements [`AudioCapturePort`] over the ESP-IDF I2S standard-mode
//! receive channel (16 kHz, 16-bit, mono, DMA).  On non-ESP targets a
//! scripted capture source stands in so the whole audio pipeline can be
//! driven from host tests.

#[cfg(not(target_os = "espidf"))]
use crate::app::ports::AudioCapturePort;
#[cfg(not(target_os = "espidf"))]
use crate::error::Result;

/// DMA read chunk, in samples.  Small enough to keep the capture task's
/// latency well under one chunk period.
pub const CAPTURE_READ_SAMPLES: usize = 32;

// ───────────────────────────────────────────────────────────────
// Host simulation twin
// ───────────────────────────────────────────────────────────────

/// Scripted capture source: yields queued samples in DMA-sized chunks.
#[cfg(not(target_os = "espidf"))]
pub struct ScriptedCapture {
    queue: std::collections::VecDeque<i16>,
}

#[cfg(not(target_os = "espidf"))]
impl ScriptedCapture {
    pub fn new() -> Self {
        Self {
            queue: std::collections::VecDeque::new(),
        }
    }

    /// Queue samples to be "captured" by subsequent reads.
    pub fn feed(&mut self, samples: &[i16]) {
        self.queue.extend(samples.iter().copied());
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for ScriptedCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl AudioCapturePort for ScriptedCapture {
    fn read_samples(&mut self, buf: &mut [i16]) -> Result<usize> {
        let take = buf.len().min(self.queue.len()).min(CAPTURE_READ_SAMPLES);
        for slot in buf.iter_mut().take(take) {
            // take bounded by queue length above
            *slot = self.queue.pop_front().unwrap_or(0);
        }
        Ok(take)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF I2S implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod espidf {
    use log::info;

    use crate::app::ports::AudioCapturePort;
    use crate::error::{Error, Result, SensorError};
    use crate::pins;

    /// I2S microphone over the ESP-IDF standard-mode RX channel.
    pub struct I2sMicrophone {
        rx: esp_idf_svc::sys::i2s_chan_handle_t,
    }

    impl I2sMicrophone {
        /// Install the I2S driver and start the DMA receive channel.
        pub fn init(sample_rate_hz: u32) -> Result<Self> {
            use esp_idf_svc::sys::*;

            unsafe {
                let mut chan_cfg: i2s_chan_config_t = core::mem::zeroed();
                chan_cfg.id = i2s_port_t_I2S_NUM_0;
                chan_cfg.role = i2s_role_t_I2S_ROLE_MASTER;
                chan_cfg.dma_desc_num = 4;
                chan_cfg.dma_frame_num = 256;

                let mut rx: i2s_chan_handle_t = core::ptr::null_mut();
                if i2s_new_channel(&chan_cfg, core::ptr::null_mut(), &mut rx) != ESP_OK {
                    return Err(Error::Init("I2S channel allocation failed"));
                }

                let mut std_cfg: i2s_std_config_t = core::mem::zeroed();
                std_cfg.clk_cfg.sample_rate_hz = sample_rate_hz;
                std_cfg.clk_cfg.clk_src = soc_periph_i2s_clk_src_t_I2S_CLK_SRC_DEFAULT;
                std_cfg.clk_cfg.mclk_multiple = i2s_mclk_multiple_t_I2S_MCLK_MULTIPLE_256;
                std_cfg.slot_cfg.data_bit_width = i2s_data_bit_width_t_I2S_DATA_BIT_WIDTH_16BIT;
                std_cfg.slot_cfg.slot_bit_width = i2s_slot_bit_width_t_I2S_SLOT_BIT_WIDTH_AUTO;
                std_cfg.slot_cfg.slot_mode = i2s_slot_mode_t_I2S_SLOT_MODE_MONO;
                std_cfg.gpio_cfg.bclk = pins::I2S_SCK;
                std_cfg.gpio_cfg.ws = pins::I2S_WS;
                std_cfg.gpio_cfg.din = pins::I2S_SD;
                std_cfg.gpio_cfg.mclk = -1;
                std_cfg.gpio_cfg.dout = -1;

                if i2s_channel_init_std_mode(rx, &std_cfg) != ESP_OK
                    || i2s_channel_enable(rx) != ESP_OK
                {
                    i2s_del_channel(rx);
                    return Err(Error::Init("I2S std-mode init failed"));
                }

                info!("I2S microphone up: {} Hz, 16-bit mono", sample_rate_hz);
                Ok(Self { rx })
            }
        }
    }

    impl AudioCapturePort for I2sMicrophone {
        fn read_samples(&mut self, buf: &mut [i16]) -> Result<usize> {
            use esp_idf_svc::sys::*;

            let mut bytes_read: usize = 0;
            let ret = unsafe {
                i2s_channel_read(
                    self.rx,
                    buf.as_mut_ptr().cast(),
                    core::mem::size_of_val(buf),
                    &mut bytes_read,
                    10, // ms — DMA poll budget, never a long block
                )
            };
            if ret != ESP_OK && ret != ESP_ERR_TIMEOUT {
                return Err(SensorError::I2sReadFailed.into());
            }
            Ok(bytes_read / core::mem::size_of::<i16>())
        }
    }

    impl Drop for I2sMicrophone {
        fn drop(&mut self) {
            unsafe {
                esp_idf_svc::sys::i2s_channel_disable(self.rx);
                esp_idf_svc::sys::i2s_del_channel(self.rx);
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use espidf::I2sMicrophone;

// ── Tests ────────────────────────────────────────────────────
