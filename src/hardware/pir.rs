//! PIR sensor input pin (rppal GPIO)

use super::{Level, MotionSense};
use crate::Result;
use rppal::gpio::{Gpio, InputPin};

/// PIR motion sensor on a BCM input pin
pub struct PirInput {
    pin: InputPin,
}

impl PirInput {
    /// Open the PIR input pin
    pub fn open(bcm_pin: u8) -> Result<Self> {
        let pin = Gpio::new()?.get(bcm_pin)?.into_input();
        tracing::info!(pin = bcm_pin, "PIR input pin opened");
        Ok(Self { pin })
    }
}

impl MotionSense for PirInput {
    fn sample(&mut self) -> Result<Level> {
        Ok(if self.pin.is_high() {
            Level::High
        } else {
            Level::Low
        })
    }
}
