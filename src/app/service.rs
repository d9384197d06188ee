//! Application service — the hexagonal core.
//!
//! [`BeaconService`] owns the sensor monitors, the power manager and the
//! audio streamer, and fans their decisions into the telemetry scheduler
//! and the event sink.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  VitalSignsPort ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!  MotionPort     ──▶ │       BeaconService       │
//!  audio samples  ──▶ │  HR · Fall · Wear · Power │ ──▶ TelemetryScheduler
//!                     └───────────────────────────┘
//! ```

use std::sync::Arc;

use log::{info, warn};

use crate::audio::{AudioStreamer, VadEdge};
use crate::config::BeaconConfig;
use crate::drivers::button::{AlertButton, ButtonEvent};
use crate::power::{PowerAction, PowerManager};
use crate::sensors::{FallDetector, HeartRateMonitor, HrEvent, WearDetector};
use crate::telemetry::TelemetryScheduler;

use super::commands::ControlCommand;
use super::events::{AlertKind, BeaconEvent};
use super::ports::{EventSink, MotionPort, VitalSignsPort};

/// The application service orchestrates all domain logic.
pub struct BeaconService {
    heart_rate: HeartRateMonitor,
    fall: FallDetector,
    wear: WearDetector,
    button: AlertButton,
    power: PowerManager,
    streamer: AudioStreamer,
    scheduler: Arc<TelemetryScheduler>,
}

impl BeaconService {
    /// Construct the service.  The scheduler arrives shared because the
    /// link pump drains it from its own task.
    pub fn new(config: &BeaconConfig, scheduler: Arc<TelemetryScheduler>, now_ms: u32) -> Self {
        Self {
            heart_rate: HeartRateMonitor::new(config),
            fall: FallDetector::new(config),
            wear: WearDetector::new(config),
            button: AlertButton::new(config),
            power: PowerManager::new(config, now_ms),
            streamer: AudioStreamer::new(config),
            scheduler,
        }
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&BeaconEvent::Started);
        info!("beacon service started");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: vitals → motion → button → power.
    ///
    /// Individual sensor read failures are logged and skipped — a flaky
    /// peripheral must not take the control loop down.  Returns a power
    /// action for the caller to apply (sleep entry).
    pub fn tick(
        &mut self,
        now_ms: u32,
        link_connected: bool,
        vitals: &mut impl VitalSignsPort,
        motion: &mut impl MotionPort,
        sink: &mut impl EventSink,
    ) -> Option<PowerAction> {
        // 1. Vitals: wear detection first, heart rate only while worn.
        match vitals.sample() {
            Ok(s) => {
                if let Some(worn) = self.wear.update(now_ms, s.ir) {
                    sink.emit(&BeaconEvent::WearChanged(worn));
                    if worn {
                        self.power.record_activity(now_ms);
                    }
                }

                if self.wear.is_worn() {
                    match self.heart_rate.on_sample(now_ms, s.ir, s.beat) {
                        Some(HrEvent::Sample(bpm)) => {
                            let _ = self.scheduler.enqueue_heart_rate(bpm, now_ms);
                            sink.emit(&BeaconEvent::HeartRate(bpm));
                        }
                        Some(HrEvent::HeartStop) => {
                            self.raise_alert(AlertKind::HeartStop, now_ms, sink);
                        }
                        None => {}
                    }
                }
            }
            Err(e) => warn!("vitals read failed: {e}"),
        }

        // 2. Motion: fall detection and wake input for the power manager.
        let mut motion_wake = false;
        match motion.accel_magnitude() {
            Ok(magnitude) => {
                if self.fall.update(now_ms, magnitude) {
                    self.raise_alert(AlertKind::Fall, now_ms, sink);
                }
                motion_wake = self.fall.motion_wake(magnitude);
                if motion_wake {
                    self.power.record_activity(now_ms);
                }
            }
            Err(e) => warn!("IMU read failed: {e}"),
        }

        // 3. Button gestures.
        match self.button.tick(now_ms) {
            Some(ButtonEvent::ManualAlert) => {
                self.raise_alert(AlertKind::Manual, now_ms, sink);
            }
            Some(ButtonEvent::FalseAlarm) => self.cancel_alert(sink),
            None => {}
        }

        // 4. Power state machine.
        let prev = self.power.state();
        let action = self
            .power
            .update(now_ms, link_connected, self.wear.is_worn(), motion_wake);
        let state = self.power.state();
        if state != prev {
            sink.emit(&BeaconEvent::PowerChanged { from: prev, to: state });
        }
        action
    }

    /// Feed captured audio through the compression pipeline.  Runs on the
    /// capture task's cadence, independent of `tick`.
    pub fn feed_audio(&mut self, samples: &[i16], now_ms: u32, sink: &mut impl EventSink) {
        if let Some(edge) = self.streamer.push_samples(samples, now_ms, &self.scheduler) {
            sink.emit(&BeaconEvent::VoiceActivity(edge == VadEdge::Active));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (BLE control characteristic, serial).
    pub fn handle_command(
        &mut self,
        cmd: ControlCommand,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            ControlCommand::ResetAlert => {
                self.fall.reset();
                sink.emit(&BeaconEvent::AlertCancelled);
                info!("alert reset by client");
            }
            ControlCommand::TriggerTestFall => {
                info!("test fall triggered by client");
                self.raise_alert(AlertKind::Fall, now_ms, sink);
            }
            ControlCommand::StreamOn => self.streamer.set_enabled(true),
            ControlCommand::StreamOff => self.streamer.set_enabled(false),
            ControlCommand::RestartStream => self.streamer.restart(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_worn(&self) -> bool {
        self.wear.is_worn()
    }

    pub fn current_bpm(&self) -> u8 {
        self.heart_rate.current_bpm()
    }

    pub fn streaming(&self) -> bool {
        self.streamer.is_enabled()
    }

    /// Wake the power manager after a sleep exit (button / timer / motion).
    pub fn wake(&mut self, now_ms: u32) {
        self.power.wake(now_ms);
    }

    // ── Internal ──────────────────────────────────────────────

    fn raise_alert(&mut self, kind: AlertKind, now_ms: u32, sink: &mut impl EventSink) {
        let _ = self.scheduler.enqueue_alert(kind.message(), now_ms);
        self.power.record_activity(now_ms);
        sink.emit(&BeaconEvent::AlertRaised(kind));
    }

    fn cancel_alert(&mut self, sink: &mut impl EventSink) {
        self.fall.reset();
        sink.emit(&BeaconEvent::AlertCancelled);
        info!("alert cancelled (false alarm gesture)");
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::VitalsSample;
    use crate::error::{Result, SensorError};
    use crate::telemetry::{PacketKind, Tier};

    struct ScriptedVitals {
        ir: f32,
        beat: bool,
        fail: bool,
    }

    impl VitalSignsPort for ScriptedVitals {
        fn sample(&mut self) -> Result<VitalsSample> {
            if self.fail {
                return Err(SensorError::I2cReadFailed.into());
            }
            Ok(VitalsSample {
                ir: self.ir,
                beat: self.beat,
            })
        }
    }

    struct ScriptedMotion {
        magnitude: f32,
    }

    impl MotionPort for ScriptedMotion {
        fn accel_magnitude(&mut self) -> Result<f32> {
            Ok(self.magnitude)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<BeaconEvent>,
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &BeaconEvent) {
            self.events.push(event.clone());
        }
    }

    fn fixture() -> (BeaconService, Arc<TelemetryScheduler>, RecordingSink) {
        let scheduler = Arc::new(TelemetryScheduler::new(1000));
        let service = BeaconService::new(&BeaconConfig::default(), Arc::clone(&scheduler), 0);
        (service, scheduler, RecordingSink::default())
    }

    #[test]
    fn fall_raises_critical_alert() {
        let (mut svc, scheduler, mut sink) = fixture();
        let mut vitals = ScriptedVitals {
            ir: 50_000.0,
            beat: false,
            fail: false,
        };

        // Impact spike, then stillness long enough to confirm.
        let mut motion = ScriptedMotion { magnitude: 30.0 };
        svc.tick(50, true, &mut vitals, &mut motion, &mut sink);
        motion.magnitude = 0.5;
        let mut t = 100;
        while t <= 3000 {
            svc.tick(t, true, &mut vitals, &mut motion, &mut sink);
            t += 50;
        }

        let packet = scheduler.next_packet(0).expect("alert queued");
        assert_eq!(packet.tier, Tier::Critical);
        assert_eq!(packet.payload.as_slice(), b"FALL\0");
        assert!(sink
            .events
            .iter()
            .any(|e| matches!(e, BeaconEvent::AlertRaised(AlertKind::Fall))));
    }

    #[test]
    fn steady_pulse_flows_to_high_tier() {
        let (mut svc, scheduler, mut sink) = fixture();
        let mut motion = ScriptedMotion { magnitude: 0.1 };

        for i in 1..200 {
            let now = i * 50;
            let mut vitals = ScriptedVitals {
                ir: 50_000.0,
                beat: now % 1000 == 0,
                fail: false,
            };
            svc.tick(now, true, &mut vitals, &mut motion, &mut sink);
        }

        let packet = scheduler.next_packet(0).expect("heart rate queued");
        assert_eq!(packet.kind, PacketKind::HeartRate);
        assert_eq!(packet.payload[0], 60);
        assert_eq!(svc.current_bpm(), 60);
    }

    #[test]
    fn removed_device_stops_heart_rate() {
        let (mut svc, scheduler, mut sink) = fixture();
        let mut motion = ScriptedMotion { magnitude: 0.1 };

        // IR at "no contact" level: wear detector commits removal after
        // its debounce, then heart-rate processing is gated off.
        for i in 1..300 {
            let mut vitals = ScriptedVitals {
                ir: 100.0,
                beat: (i * 50) % 1000 == 0,
                fail: false,
            };
            svc.tick(i * 50, true, &mut vitals, &mut motion, &mut sink);
        }

        assert!(!svc.is_worn());
        assert!(sink
            .events
            .iter()
            .any(|e| matches!(e, BeaconEvent::WearChanged(false))));
        assert!(scheduler.next_packet(0).is_none());
    }

    #[test]
    fn sensor_failure_does_not_stop_the_loop() {
        let (mut svc, _scheduler, mut sink) = fixture();
        let mut vitals = ScriptedVitals {
            ir: 0.0,
            beat: false,
            fail: true,
        };
        let mut motion = ScriptedMotion { magnitude: 0.1 };

        for i in 1..20 {
            svc.tick(i * 50, true, &mut vitals, &mut motion, &mut sink);
        }
        // Still alive and responsive to commands.
        svc.handle_command(ControlCommand::StreamOn, 1000, &mut sink);
        assert!(svc.streaming());
    }

    #[test]
    fn test_fall_command_raises_alert() {
        let (mut svc, scheduler, mut sink) = fixture();
        svc.handle_command(ControlCommand::TriggerTestFall, 10, &mut sink);

        let packet = scheduler.next_packet(0).expect("alert queued");
        assert_eq!(packet.payload.as_slice(), b"FALL\0");
    }

    #[test]
    fn reset_command_rearms_and_reports() {
        let (mut svc, _scheduler, mut sink) = fixture();
        svc.handle_command(ControlCommand::ResetAlert, 10, &mut sink);
        assert!(sink
            .events
            .iter()
            .any(|e| matches!(e, BeaconEvent::AlertCancelled)));
    }

    #[test]
    fn stream_commands_toggle_audio() {
        let (mut svc, scheduler, mut sink) = fixture();
        assert!(!svc.streaming());

        svc.handle_command(ControlCommand::StreamOn, 0, &mut sink);
        svc.feed_audio(&[0i16; 256], 10, &mut sink);
        assert!(scheduler.next_packet(0).is_some());

        svc.handle_command(ControlCommand::StreamOff, 20, &mut sink);
        svc.feed_audio(&[0i16; 512], 30, &mut sink);
        assert!(scheduler.next_packet(0).is_none());
    }

    #[test]
    fn voice_edge_surfaces_as_event() {
        let (mut svc, _scheduler, mut sink) = fixture();
        svc.handle_command(ControlCommand::StreamOn, 0, &mut sink);
        svc.feed_audio(&[6000i16; 256], 10, &mut sink);
        assert!(sink
            .events
            .iter()
            .any(|e| matches!(e, BeaconEvent::VoiceActivity(true))));
    }
}
