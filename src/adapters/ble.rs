//! BLE radio adapter.
//!
//! Implements [`RadioLink`] — the transport boundary the link pump
//! drains into.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via
//!   `esp_idf_svc::sys` (four characteristics under the beacon service).
//! - **all other targets**: a simulation twin recording wire frames for
//!   host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                   | Perms        | Carries          |
//! |----------------|------------------------|--------------|------------------|
//! | Heart Rate     | `12345678-…-90AC`      | Read+Notify  | 1-byte BPM       |
//! | Alert          | `12345678-…-90AD`      | Read+Notify  | alert string     |
//! | Control        | `12345678-…-90AE`      | Write        | command verbs    |
//! | Audio          | `12345678-…-90AF`      | Notify       | ADPCM chunks     |

use log::warn;

use crate::app::commands::ControlCommand;
use crate::link::channels;

#[cfg(not(target_os = "espidf"))]
use crate::error::LinkError;
#[cfg(not(target_os = "espidf"))]
use crate::link::transport::RadioLink;
#[cfg(not(target_os = "espidf"))]
use crate::telemetry::Packet;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x12345678_9012_3456_7890_1234567890AB;
pub const CHAR_HEART_RATE: u128 = 0x12345678_9012_3456_7890_1234567890AC;
pub const CHAR_ALERT: u128 = 0x12345678_9012_3456_7890_1234567890AD;
pub const CHAR_CONTROL: u128 = 0x12345678_9012_3456_7890_1234567890AE;
pub const CHAR_AUDIO: u128 = 0x12345678_9012_3456_7890_1234567890AF;

/// Requested MTU: 244 usable payload bytes + 3-byte ATT header.
pub const REQUESTED_MTU: u16 = 247;

/// Connection interval in 1.25 ms units (15 ms) — fixed for predictable
/// audio pacing.
pub const CONN_INTERVAL_UNITS: u16 = 12;

/// Supervision timeout in 10 ms units (5 s).
pub const SUPERVISION_TIMEOUT_UNITS: u16 = 500;

/// Handle a raw control-characteristic write: parse the verb and hand it
/// to the control loop through the bounded channel.  Shared by the
/// Bluedroid callback and the simulation twin.
pub fn handle_control_write(raw: &[u8]) {
    match ControlCommand::parse(raw) {
        Some(cmd) => {
            if !channels::post_command(cmd) {
                warn!("control command dropped — channel full");
            }
        }
        None => warn!(
            "unknown control command ({} bytes): {:?}",
            raw.len(),
            core::str::from_utf8(raw).unwrap_or("<binary>")
        ),
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation twin
// ───────────────────────────────────────────────────────────────

/// Records transmitted wire frames; connection state is scriptable.
/// Stands in for the Bluedroid stack in host tests and simulation runs.
#[cfg(not(target_os = "espidf"))]
pub struct SimRadio {
    connected: bool,
    mtu: u16,
    frames: Vec<Vec<u8>>,
}

#[cfg(not(target_os = "espidf"))]
impl SimRadio {
    pub fn new() -> Self {
        Self {
            connected: false,
            mtu: REQUESTED_MTU,
            frames: Vec::new(),
        }
    }

    /// Script a connect/disconnect.  On the device the Bluedroid callback
    /// publishes the matching `LinkConnected`/`LinkDisconnected` event;
    /// simulation harnesses push that themselves when they care.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_mtu(&mut self, mtu: u16) {
        self.mtu = mtu;
    }

    /// Script a client write to the control characteristic.
    pub fn write_control(&mut self, raw: &[u8]) {
        handle_control_write(raw);
    }

    /// Drain the recorded wire frames.
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.frames)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl RadioLink for SimRadio {
    fn connected(&self) -> bool {
        self.connected
    }

    fn max_payload(&self) -> usize {
        usize::from(self.mtu.saturating_sub(3))
    }

    fn send(&mut self, packet: &Packet) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        if packet.len() > self.max_payload() {
            return Err(LinkError::PayloadTooLarge);
        }
        let frame = packet.to_wire().map_err(|_| LinkError::TxFailed)?;
        self.frames.push(frame);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF Bluedroid implementation
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures.  These atomics bridge the callback context to the adapter;
// connect/disconnect edges go through the lock-free event queue.

#[cfg(target_os = "espidf")]
mod espidf {
    use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

    use log::{info, warn};

    use crate::error::LinkError;
    use crate::events::{push_event, Event};
    use crate::link::transport::RadioLink;
    use crate::telemetry::{Packet, PacketKind};

    use super::{
        handle_control_write, CHAR_ALERT, CHAR_AUDIO, CHAR_CONTROL, CHAR_HEART_RATE,
        REQUESTED_MTU, SERVICE_UUID,
    };

    static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
    static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
    static BLE_CONNECTED: AtomicBool = AtomicBool::new(false);
    static BLE_MTU: AtomicU16 = AtomicU16::new(23);
    static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
    static BLE_HR_HANDLE: AtomicU32 = AtomicU32::new(0);
    static BLE_ALERT_HANDLE: AtomicU32 = AtomicU32::new(0);
    static BLE_CONTROL_HANDLE: AtomicU32 = AtomicU32::new(0);
    static BLE_AUDIO_HANDLE: AtomicU32 = AtomicU32::new(0);
    static BLE_CHAR_STEP: AtomicU32 = AtomicU32::new(0);

    fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
        let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = 16;
        unsafe {
            t.uuid.uuid128 = uuid.to_le_bytes();
        }
        t
    }

    unsafe fn add_gatt_char(svc_handle: u16, uuid: u128, perm: u32, prop: u32) {
        use esp_idf_svc::sys::*;
        let mut char_uuid = uuid128_to_esp(uuid);
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            perm as esp_gatt_perm_t,
            prop as esp_gatt_char_prop_t,
            core::ptr::null_mut(),
            core::ptr::null_mut(),
        );
    }

    unsafe extern "C" fn gap_event_handler(
        event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
        _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
    ) {
        use esp_idf_svc::sys::*;
        match event {
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
                info!("BLE GAP: advertising started");
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
                info!("BLE GAP: advertising stopped");
            }
            _ => {}
        }
    }

    unsafe extern "C" fn gatts_event_handler(
        event: esp_idf_svc::sys::esp_gatts_cb_event_t,
        gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
        param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
    ) {
        use esp_idf_svc::sys::*;

        BLE_GATTS_IF.store(gatts_if as u32, Ordering::Relaxed);

        match event {
            esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
                info!("BLE GATTS: app registered (if={})", gatts_if);
                let svc_uuid = uuid128_to_esp(SERVICE_UUID);
                let mut svc_id = esp_gatt_srvc_id_t {
                    id: esp_gatt_id_t {
                        uuid: svc_uuid,
                        inst_id: 0,
                    },
                    is_primary: true,
                };
                // 4 characteristics × (decl + value) + service decl.
                esp_ble_gatts_create_service(gatts_if, &mut svc_id, 10);
            }

            esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
                let p = &(*param).create;
                let svc_handle = p.service_handle;
                BLE_SVC_HANDLE.store(svc_handle as u32, Ordering::Relaxed);
                esp_ble_gatts_start_service(svc_handle);
                BLE_CHAR_STEP.store(1, Ordering::Relaxed);
                add_gatt_char(
                    svc_handle,
                    CHAR_HEART_RATE,
                    ESP_GATT_PERM_READ,
                    ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                );
            }

            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
                let p = &(*param).add_char;
                let handle = p.attr_handle;
                let svc_handle = BLE_SVC_HANDLE.load(Ordering::Relaxed) as u16;
                match BLE_CHAR_STEP.load(Ordering::Relaxed) {
                    1 => {
                        BLE_HR_HANDLE.store(handle as u32, Ordering::Relaxed);
                        BLE_CHAR_STEP.store(2, Ordering::Relaxed);
                        add_gatt_char(
                            svc_handle,
                            CHAR_ALERT,
                            ESP_GATT_PERM_READ,
                            ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                        );
                    }
                    2 => {
                        BLE_ALERT_HANDLE.store(handle as u32, Ordering::Relaxed);
                        BLE_CHAR_STEP.store(3, Ordering::Relaxed);
                        add_gatt_char(
                            svc_handle,
                            CHAR_CONTROL,
                            ESP_GATT_PERM_WRITE,
                            ESP_GATT_CHAR_PROP_BIT_WRITE,
                        );
                    }
                    3 => {
                        BLE_CONTROL_HANDLE.store(handle as u32, Ordering::Relaxed);
                        BLE_CHAR_STEP.store(4, Ordering::Relaxed);
                        add_gatt_char(
                            svc_handle,
                            CHAR_AUDIO,
                            ESP_GATT_PERM_READ,
                            ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                        );
                    }
                    4 => {
                        BLE_AUDIO_HANDLE.store(handle as u32, Ordering::Relaxed);
                        info!("BLE GATTS: all characteristics registered");
                    }
                    step => warn!("BLE GATTS: unexpected char step {step}"),
                }
            }

            esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
                let p = &(*param).connect;
                BLE_CONN_ID.store(p.conn_id as u32, Ordering::Relaxed);
                BLE_CONNECTED.store(true, Ordering::Release);
                info!("BLE GATTS: client connected (conn_id={})", p.conn_id);
                let _ = push_event(Event::LinkConnected);

                // Fixed 15 ms interval for predictable audio pacing.
                let mut conn_params: esp_ble_conn_update_params_t = core::mem::zeroed();
                conn_params.bda = p.remote_bda;
                conn_params.min_int = super::CONN_INTERVAL_UNITS;
                conn_params.max_int = super::CONN_INTERVAL_UNITS;
                conn_params.latency = 0;
                conn_params.timeout = super::SUPERVISION_TIMEOUT_UNITS;
                esp_ble_gap_update_conn_params(&mut conn_params);
            }

            esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
                BLE_CONNECTED.store(false, Ordering::Release);
                BLE_MTU.store(23, Ordering::Relaxed);
                info!("BLE GATTS: client disconnected");
                let _ = push_event(Event::LinkDisconnected);
                esp_ble_gap_start_advertising(&mut ADV_PARAMS);
            }

            esp_gatts_cb_event_t_ESP_GATTS_MTU_EVT => {
                let p = &(*param).mtu;
                BLE_MTU.store(p.mtu, Ordering::Relaxed);
                info!("BLE GATTS: MTU negotiated to {}", p.mtu);
            }

            esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
                let p = &(*param).write;
                if p.handle as u32 == BLE_CONTROL_HANDLE.load(Ordering::Relaxed) {
                    let data = core::slice::from_raw_parts(p.value, p.len as usize);
                    handle_control_write(data);
                }
            }

            _ => {}
        }
    }

    static mut ADV_PARAMS: esp_idf_svc::sys::esp_ble_adv_params_t =
        unsafe { core::mem::zeroed() };

    /// BLE radio over the Bluedroid GATT server.
    pub struct BleRadio;

    impl BleRadio {
        /// Bring up the Bluedroid stack, register the GATT service and
        /// start advertising.
        pub fn init() -> crate::error::Result<Self> {
            use esp_idf_svc::sys::*;
            unsafe {
                let mut bt_cfg: esp_bt_controller_config_t = core::mem::zeroed();
                bt_cfg.controller_task_stack_size = 4096;
                if esp_bt_controller_init(&mut bt_cfg) != ESP_OK
                    || esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE) != ESP_OK
                    || esp_bluedroid_init() != ESP_OK
                    || esp_bluedroid_enable() != ESP_OK
                {
                    return Err(crate::error::Error::Init("bluedroid bring-up failed"));
                }

                esp_ble_gap_register_callback(Some(gap_event_handler));
                esp_ble_gatts_register_callback(Some(gatts_event_handler));
                esp_ble_gatts_app_register(0);
                esp_ble_gatt_set_local_mtu(REQUESTED_MTU);

                ADV_PARAMS.adv_int_min = 0x20;
                ADV_PARAMS.adv_int_max = 0x40;
                ADV_PARAMS.adv_type = esp_ble_adv_type_t_ADV_TYPE_IND;
                ADV_PARAMS.own_addr_type = esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC;
                ADV_PARAMS.channel_map = esp_ble_adv_channel_t_ADV_CHNL_ALL;
                esp_ble_gap_start_advertising(&mut ADV_PARAMS);
            }
            info!("BLE radio initialised, advertising");
            Ok(Self)
        }

        fn char_handle(kind: PacketKind) -> u16 {
            let handle = match kind {
                PacketKind::Alert => BLE_ALERT_HANDLE.load(Ordering::Relaxed),
                PacketKind::HeartRate => BLE_HR_HANDLE.load(Ordering::Relaxed),
                PacketKind::Audio => BLE_AUDIO_HANDLE.load(Ordering::Relaxed),
            };
            handle as u16
        }
    }

    impl RadioLink for BleRadio {
        fn connected(&self) -> bool {
            BLE_CONNECTED.load(Ordering::Acquire)
        }

        fn max_payload(&self) -> usize {
            usize::from(BLE_MTU.load(Ordering::Relaxed).saturating_sub(3))
        }

        fn send(&mut self, packet: &Packet) -> Result<(), LinkError> {
            use esp_idf_svc::sys::*;

            if !self.connected() {
                return Err(LinkError::NotConnected);
            }
            if packet.len() > self.max_payload() {
                return Err(LinkError::PayloadTooLarge);
            }

            let handle = Self::char_handle(packet.kind);
            if handle == 0 {
                return Err(LinkError::TxFailed);
            }

            let ret = unsafe {
                esp_ble_gatts_send_indicate(
                    BLE_GATTS_IF.load(Ordering::Relaxed) as esp_gatt_if_t,
                    BLE_CONN_ID.load(Ordering::Relaxed) as u16,
                    handle,
                    packet.payload.len() as u16,
                    packet.payload.as_ptr() as *mut u8,
                    false, // notification, no confirmation round-trip
                )
            };
            if ret == ESP_OK {
                Ok(())
            } else {
                Err(LinkError::TxFailed)
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use espidf::BleRadio;

// ── Tests ────────────────────────────────────────────────────
