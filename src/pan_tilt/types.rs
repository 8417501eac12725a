//! Pan/tilt type definitions

/// Servo axis name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisName {
    /// Horizontal axis (PWM channel 1)
    Pan,
    /// Vertical axis (PWM channel 0)
    Tilt,
}

impl AxisName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisName::Pan => "pan",
            AxisName::Tilt => "tilt",
        }
    }
}

/// Hardware pulse bounds in microseconds
pub const PULSE_MIN_US: u16 = 500;
pub const PULSE_MAX_US: u16 = 2500;

/// Pulse at 0 degrees
pub const PULSE_CENTER_US: u16 = 1500;

/// One servo axis. The pulse width is the source of truth; the angle is
/// derived on read.
#[derive(Debug, Clone, Copy)]
pub struct ServoAxis {
    pub name: AxisName,
    pub pulse_width_us: u16,
}

impl ServoAxis {
    pub fn new(name: AxisName, pulse_width_us: u16) -> Self {
        Self {
            name,
            pulse_width_us,
        }
    }

    /// Inverse map of the stored pulse back to degrees, with integer
    /// truncation. Not an exact inverse of [`pulse_for_angle`] for all
    /// inputs; round trips are within 1 degree.
    pub fn angle_deg(&self) -> i32 {
        (i32::from(self.pulse_width_us) - i32::from(PULSE_CENTER_US)) * 90 / 1000
    }
}

/// Convert a requested angle to a pulse width.
///
/// The pulse is computed from the raw angle and then clamped to the pulse
/// bounds. The clamp is in the pulse domain, not the degree domain: an
/// out-of-range angle saturates at the pulse boundary.
pub fn pulse_for_angle(angle_deg: i32) -> u16 {
    let raw = f64::from(PULSE_CENTER_US) + f64::from(angle_deg) * 1000.0 / 90.0;
    (raw.round() as i32).clamp(i32::from(PULSE_MIN_US), i32::from(PULSE_MAX_US)) as u16
}
