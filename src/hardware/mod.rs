//! Hardware access layer
//!
//! ## Responsibilities
//!
//! - Trait boundaries for the two hardware collaborators: the PIR input pin
//!   (`MotionSense`) and the servo PWM board (`PulseDriver`)
//! - Real backends for the deployed unit (rppal GPIO, PCA9685 over I2C)
//! - Simulated backends for host-side tests
//!
//! There is no process-wide hardware singleton: backends are constructed
//! once at process startup and passed into the owning component, so tests
//! substitute the simulated ones.

mod pca9685;
mod pir;
pub mod sim;

pub use pca9685::Pca9685Driver;
pub use pir::PirInput;

use crate::Result;

/// Digital level of the motion input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Motion sensor input: one digital pin sampled as High/Low
pub trait MotionSense {
    /// Sample the current pin level
    fn sample(&mut self) -> Result<Level>;
}

/// Servo PWM output: logical channels, pulse width in microseconds.
///
/// Channel map: 0 = tilt (vertical), 1 = pan (horizontal). Fixed 50 Hz.
pub trait PulseDriver {
    /// Wake the driver chip. The chip does not retain output state across
    /// power cycles, so callers re-issue the pulse after waking.
    fn wake(&mut self) -> Result<()>;

    /// Issue a pulse width on a channel
    fn set_pulse(&mut self, channel: u8, pulse_us: u16) -> Result<()>;

    /// Disable all PWM output (servos released, no holding torque)
    fn disable(&mut self) -> Result<()>;
}
