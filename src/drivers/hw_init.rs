//! One-shot hardware peripheral initialization.
//!
//! Configures the alert-button GPIO and its falling-edge ISR using raw
//! ESP-IDF sys calls.  Called once from `main()` before the control loop
//! starts.  The I2S microphone and the vendor sensor component bring up
//! their own peripherals.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::Result;

#[cfg(target_os = "espidf")]
use crate::error::Error;

#[cfg(target_os = "espidf")]
use crate::drivers::button::button_isr_handler;
#[cfg(target_os = "espidf")]
use crate::pins;

/// GPIO ISR trampoline for the alert button.  Timestamps the edge; all
/// debounce/gesture logic runs later in the control loop.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_gpio_isr(_arg: *mut core::ffi::c_void) {
    let now_ms = (esp_timer_get_time() / 1000) as u32;
    button_isr_handler(now_ms);
}

/// Configure the button GPIO (input, pull-up, falling edge) and attach
/// the ISR.  Requires the GPIO ISR service.
#[cfg(target_os = "espidf")]
pub fn init_button() -> Result<()> {
    unsafe {
        let rc = gpio_install_isr_service(0);
        // ESP_ERR_INVALID_STATE means the service is already installed.
        if rc != ESP_OK && rc != ESP_ERR_INVALID_STATE {
            return Err(Error::Init("GPIO ISR service install failed"));
        }

        let mut cfg: gpio_config_t = core::mem::zeroed();
        cfg.pin_bit_mask = 1u64 << pins::BUTTON;
        cfg.mode = gpio_mode_t_GPIO_MODE_INPUT;
        cfg.pull_up_en = gpio_pullup_t_GPIO_PULLUP_ENABLE;
        cfg.pull_down_en = gpio_pulldown_t_GPIO_PULLDOWN_DISABLE;
        cfg.intr_type = gpio_int_type_t_GPIO_INTR_NEGEDGE;
        if gpio_config(&cfg) != ESP_OK {
            return Err(Error::Init("button GPIO config failed"));
        }

        if gpio_isr_handler_add(pins::BUTTON, Some(button_gpio_isr), core::ptr::null_mut())
            != ESP_OK
        {
            return Err(Error::Init("button ISR attach failed"));
        }
    }
    log::info!("alert button armed on GPIO {}", pins::BUTTON);
    Ok(())
}

/// Host targets have no GPIO; the scripted test harnesses drive the
/// button state machine directly.
#[cfg(not(target_os = "espidf"))]
pub fn init_button() -> Result<()> {
    Ok(())
}
