//! Simulated hardware backends for host-side tests

use super::{Level, MotionSense, PulseDriver};
use crate::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted pin: replays a level sequence, then repeats the last level
pub struct SimPin {
    script: VecDeque<Level>,
    last: Level,
}

impl SimPin {
    pub fn new(levels: &[Level]) -> Self {
        Self {
            script: levels.iter().copied().collect(),
            last: Level::Low,
        }
    }
}

impl MotionSense for SimPin {
    fn sample(&mut self) -> Result<Level> {
        if let Some(level) = self.script.pop_front() {
            self.last = level;
        }
        Ok(self.last)
    }
}

/// One recorded PWM operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmOp {
    Wake,
    Pulse { channel: u8, pulse_us: u16 },
    Disable,
}

/// Shared recording of everything a SimPwm was asked to do
#[derive(Clone, Default)]
pub struct PwmLog(Arc<Mutex<Vec<PwmOp>>>);

impl PwmLog {
    pub fn ops(&self) -> Vec<PwmOp> {
        self.0.lock().unwrap().clone()
    }

    /// Last pulse issued on a channel, if any
    pub fn last_pulse(&self, channel: u8) -> Option<u16> {
        self.ops().iter().rev().find_map(|op| match op {
            PwmOp::Pulse { channel: c, pulse_us } if *c == channel => Some(*pulse_us),
            _ => None,
        })
    }

    pub fn disabled(&self) -> bool {
        matches!(self.ops().last(), Some(PwmOp::Disable))
    }

    fn push(&self, op: PwmOp) {
        self.0.lock().unwrap().push(op);
    }
}

/// Recording PWM backend. Clone the [`PwmLog`] out before handing the
/// driver to a controller.
#[derive(Default)]
pub struct SimPwm {
    log: PwmLog,
}

impl SimPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> PwmLog {
        self.log.clone()
    }
}

impl PulseDriver for SimPwm {
    fn wake(&mut self) -> Result<()> {
        self.log.push(PwmOp::Wake);
        Ok(())
    }

    fn set_pulse(&mut self, channel: u8, pulse_us: u16) -> Result<()> {
        self.log.push(PwmOp::Pulse { channel, pulse_us });
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.log.push(PwmOp::Disable);
        Ok(())
    }
}
