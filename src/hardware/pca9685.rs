//! PCA9685 servo board backend (I2C)
//!
//! Thin adapter over the register-level driver crate. Pulse widths are
//! converted to 12-bit counts against the 20 ms servo frame.

use super::PulseDriver;
use crate::{Error, Result};
use linux_embedded_hal::I2cdev;
use pwm_pca9685::{Address, Channel, Pca9685};

/// Prescale for a 50 Hz output frame (25 MHz / 4096 / 50 - 1)
const PRESCALE_50HZ: u8 = 121;

/// Servo frame period in microseconds at 50 Hz
const FRAME_US: u32 = 20_000;

/// PCA9685 backend for the pan/tilt mount
pub struct Pca9685Driver {
    dev: Pca9685<I2cdev>,
}

impl Pca9685Driver {
    /// Open the servo board on an I2C bus and program the 50 Hz frame
    pub fn open(bus: &str, addr: u8) -> Result<Self> {
        let i2c = I2cdev::new(bus)
            .map_err(|e| Error::Pwm(format!("I2C bus {} open failed: {}", bus, e)))?;
        let mut dev = Pca9685::new(i2c, Address::from(addr))
            .map_err(|e| Error::Pwm(format!("PCA9685 init failed: {:?}", e)))?;
        dev.set_prescale(PRESCALE_50HZ)
            .map_err(|e| Error::Pwm(format!("PCA9685 prescale failed: {:?}", e)))?;
        dev.enable()
            .map_err(|e| Error::Pwm(format!("PCA9685 enable failed: {:?}", e)))?;
        tracing::info!(bus = %bus, addr, "PCA9685 opened at 50 Hz");
        Ok(Self { dev })
    }

    fn channel(channel: u8) -> Result<Channel> {
        match channel {
            0 => Ok(Channel::C0),
            1 => Ok(Channel::C1),
            other => Err(Error::Pwm(format!("unmapped PWM channel {}", other))),
        }
    }
}

impl PulseDriver for Pca9685Driver {
    fn wake(&mut self) -> Result<()> {
        self.dev
            .enable()
            .map_err(|e| Error::Pwm(format!("PCA9685 wake failed: {:?}", e)))
    }

    fn set_pulse(&mut self, channel: u8, pulse_us: u16) -> Result<()> {
        let ch = Self::channel(channel)?;
        // 12-bit counts over the 20 ms frame; on-time starts at count 0
        let off = (u32::from(pulse_us) * 4096 / FRAME_US) as u16;
        self.dev
            .set_channel_on_off(ch, 0, off)
            .map_err(|e| Error::Pwm(format!("PCA9685 pulse write failed: {:?}", e)))
    }

    fn disable(&mut self) -> Result<()> {
        self.dev
            .disable()
            .map_err(|e| Error::Pwm(format!("PCA9685 disable failed: {:?}", e)))
    }
}
