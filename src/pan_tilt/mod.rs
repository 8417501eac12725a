//! PanTiltController - Two-Axis Servo Mount
//!
//! ## Responsibilities
//!
//! - Own the two servo axes and convert requested angles to pulse widths
//! - Enforce safety bounds (pulse-domain clamp on absolute sets,
//!   degree-domain clamp on relative moves - the asymmetry is deliberate
//!   and kept for compatibility with deployed units)
//! - Deterministic PWM disable on stop/cleanup
//!
//! Not safe for concurrent use from multiple threads; one controller per
//! process.

mod types;

pub use types::{pulse_for_angle, AxisName, ServoAxis, PULSE_CENTER_US, PULSE_MAX_US, PULSE_MIN_US};

use crate::hardware::PulseDriver;
use crate::Result;

/// PWM channel of the tilt (vertical) servo
pub const CHANNEL_TILT: u8 = 0;
/// PWM channel of the pan (horizontal) servo
pub const CHANNEL_PAN: u8 = 1;

/// Initial pan pulse: centered
pub const PAN_INITIAL_PULSE: u16 = 1500;
/// Initial tilt pulse. Deliberately off-center (-45 degrees); deployed
/// units expect this exact default, do not re-center.
pub const TILT_INITIAL_PULSE: u16 = 1000;

/// Degree bounds applied to relative moves
const ANGLE_MIN_DEG: i32 = -90;
const ANGLE_MAX_DEG: i32 = 90;

/// Pan/tilt mount controller
pub struct PanTiltController {
    driver: Box<dyn PulseDriver>,
    pan: ServoAxis,
    tilt: ServoAxis,
}

impl PanTiltController {
    /// Create the controller and drive both axes to their initial pulses
    pub fn new(mut driver: Box<dyn PulseDriver>) -> Result<Self> {
        driver.set_pulse(CHANNEL_PAN, PAN_INITIAL_PULSE)?;
        driver.set_pulse(CHANNEL_TILT, TILT_INITIAL_PULSE)?;
        Ok(Self {
            driver,
            pan: ServoAxis::new(AxisName::Pan, PAN_INITIAL_PULSE),
            tilt: ServoAxis::new(AxisName::Tilt, TILT_INITIAL_PULSE),
        })
    }

    /// Set the pan angle. The pulse is clamped, not the angle; every call
    /// wakes the driver and re-issues the pulse (the chip does not retain
    /// state across power cycles).
    pub fn set_pan(&mut self, angle_deg: i32) -> Result<()> {
        let pulse = pulse_for_angle(angle_deg);
        self.pan.pulse_width_us = pulse;
        tracing::debug!(angle_deg, pulse_us = pulse, "Setting pan");
        self.driver.wake()?;
        self.driver.set_pulse(CHANNEL_PAN, pulse)
    }

    /// Set the tilt angle. Same clamping and refresh semantics as pan.
    pub fn set_tilt(&mut self, angle_deg: i32) -> Result<()> {
        let pulse = pulse_for_angle(angle_deg);
        self.tilt.pulse_width_us = pulse;
        tracing::debug!(angle_deg, pulse_us = pulse, "Setting tilt");
        self.driver.wake()?;
        self.driver.set_pulse(CHANNEL_TILT, pulse)
    }

    /// Current pan angle in degrees (derived from the stored pulse)
    pub fn get_pan(&self) -> i32 {
        self.pan.angle_deg()
    }

    /// Current tilt angle in degrees (derived from the stored pulse)
    pub fn get_tilt(&self) -> i32 {
        self.tilt.angle_deg()
    }

    /// Move relative to the current position. The sum is clamped in degree
    /// space to [-90, 90] before the absolute set; a zero delta leaves that
    /// axis untouched.
    pub fn move_relative(&mut self, pan_delta: i32, tilt_delta: i32) -> Result<()> {
        if pan_delta != 0 {
            let target = (self.get_pan() + pan_delta).clamp(ANGLE_MIN_DEG, ANGLE_MAX_DEG);
            self.set_pan(target)?;
        }
        if tilt_delta != 0 {
            let target = (self.get_tilt() + tilt_delta).clamp(ANGLE_MIN_DEG, ANGLE_MAX_DEG);
            self.set_tilt(target)?;
        }
        Ok(())
    }

    /// Disable PWM output. Servos lose holding torque until the next set.
    pub fn stop(&mut self) -> Result<()> {
        tracing::info!("Disabling PWM output");
        self.driver.disable()
    }

    /// Release hardware resources. Reached from every exit path, including
    /// error paths and operator interrupt.
    pub fn cleanup(&mut self) -> Result<()> {
        self.driver.disable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::sim::{PwmOp, SimPwm};

    fn controller() -> (PanTiltController, crate::hardware::sim::PwmLog) {
        let pwm = SimPwm::new();
        let log = pwm.log();
        let ctl = PanTiltController::new(Box::new(pwm)).unwrap();
        (ctl, log)
    }

    #[test]
    fn test_initial_pulses_are_asymmetric() {
        let (ctl, log) = controller();
        assert_eq!(log.last_pulse(CHANNEL_PAN), Some(1500));
        assert_eq!(log.last_pulse(CHANNEL_TILT), Some(1000));
        assert_eq!(ctl.get_pan(), 0);
        assert_eq!(ctl.get_tilt(), -45);
    }

    #[test]
    fn test_set_get_round_trip_within_one_degree() {
        let (mut ctl, _log) = controller();
        for angle in [-90, -47, -1, 0, 1, 33, 89, 90] {
            ctl.set_pan(angle).unwrap();
            let read = ctl.get_pan();
            assert!(
                (read - angle).abs() <= 1,
                "angle {} read back as {}",
                angle,
                read
            );
        }
    }

    #[test]
    fn test_out_of_range_angle_saturates_at_pulse_bounds() {
        let (mut ctl, log) = controller();

        ctl.set_pan(200).unwrap();
        assert_eq!(log.last_pulse(CHANNEL_PAN), Some(2500));
        assert_eq!(ctl.get_pan(), 90);

        ctl.set_pan(-400).unwrap();
        assert_eq!(log.last_pulse(CHANNEL_PAN), Some(500));
        assert_eq!(ctl.get_pan(), -90);
    }

    #[test]
    fn test_relative_move_saturates_in_degree_space() {
        let (mut ctl, _log) = controller();
        ctl.set_pan(80).unwrap();
        for _ in 0..5 {
            ctl.move_relative(20, 0).unwrap();
            assert!(ctl.get_pan() <= 90);
        }
        assert_eq!(ctl.get_pan(), 90);
    }

    #[test]
    fn test_zero_delta_does_not_touch_axis() {
        let (mut ctl, log) = controller();
        let before = log.ops().len();
        ctl.move_relative(0, 0).unwrap();
        assert_eq!(log.ops().len(), before);
    }

    #[test]
    fn test_every_set_wakes_and_reissues() {
        let (mut ctl, log) = controller();
        ctl.set_tilt(-45).unwrap();
        ctl.set_tilt(-45).unwrap();
        let ops = log.ops();
        let wakes = ops.iter().filter(|op| **op == PwmOp::Wake).count();
        let pulses = ops
            .iter()
            .filter(|op| matches!(op, PwmOp::Pulse { channel, .. } if *channel == CHANNEL_TILT))
            .count();
        assert_eq!(wakes, 2);
        // initial pulse from construction plus one per set call
        assert_eq!(pulses, 3);
    }

    #[test]
    fn test_stop_disables_output() {
        let (mut ctl, log) = controller();
        ctl.set_pan(10).unwrap();
        ctl.stop().unwrap();
        assert!(log.disabled());
    }

    #[test]
    fn test_tilt_channel_is_zero_pan_is_one() {
        let (mut ctl, log) = controller();
        ctl.set_tilt(20).unwrap();
        assert_eq!(
            log.ops().last(),
            Some(&PwmOp::Pulse {
                channel: 0,
                pulse_us: pulse_for_angle(20)
            })
        );
        ctl.set_pan(20).unwrap();
        assert_eq!(
            log.ops().last(),
            Some(&PwmOp::Pulse {
                channel: 1,
                pulse_us: pulse_for_angle(20)
            })
        );
    }
}
