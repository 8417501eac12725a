//! MotionEdgeDetector - PIR Samples to Discrete Motion Events
//!
//! ## Responsibilities
//!
//! - Turn periodic digital-pin samples into motion-start/motion-end events
//! - Track the pulse counter and the last finalized pulse
//! - Flag overlong pulses (sensor likely in retriggering mode, not pulsed)
//!
//! The detector is a pure state machine; the watch loop samples the pin and
//! feeds levels in. Polling is deliberate: the poll interval is both the
//! minimum detectable pulse width and the maximum detection latency, and a
//! sub-interval bounce is observed as a real pulse. No further debouncing
//! is performed.

use crate::hardware::Level;
use std::time::{Duration, Instant};

/// Pulse duration above which the sensor is probably misconfigured
/// (retriggering/H mode instead of single-pulse/L mode)
const CALIBRATION_LIMIT: Duration = Duration::from_secs(10);

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A finalized motion pulse. Immutable once created.
#[derive(Debug, Clone, Copy)]
pub struct MotionPulse {
    pub started_at: Instant,
    pub ended_at: Instant,
    pub duration: Duration,
}

/// Events emitted on level transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// Rising edge observed
    MotionStarted { pulse_number: u64 },
    /// Falling edge observed
    MotionEnded { duration: Duration },
    /// Advisory only, emitted alongside MotionEnded for overlong pulses
    CalibrationWarning { duration: Duration },
}

#[derive(Debug, Clone, Copy)]
enum DetectorState {
    Idle,
    Active { since: Instant },
}

/// Two-state edge detector over the sampled pin level
pub struct MotionEdgeDetector {
    state: DetectorState,
    pulse_count: u64,
    last_pulse: Option<MotionPulse>,
}

impl MotionEdgeDetector {
    pub fn new() -> Self {
        Self {
            state: DetectorState::Idle,
            pulse_count: 0,
            last_pulse: None,
        }
    }

    /// Total rising edges observed
    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }

    /// Last finalized pulse, if any
    pub fn last_pulse(&self) -> Option<MotionPulse> {
        self.last_pulse
    }

    /// Whether the detector is currently inside a pulse
    pub fn is_active(&self) -> bool {
        matches!(self.state, DetectorState::Active { .. })
    }

    /// Feed one sample. Returns the events this transition produced:
    /// empty for no transition, one for a rising edge, one or two for a
    /// falling edge (MotionEnded, plus CalibrationWarning when overlong).
    pub fn observe(&mut self, level: Level, now: Instant) -> Vec<MotionEvent> {
        match (self.state, level) {
            (DetectorState::Idle, Level::High) => {
                self.pulse_count += 1;
                self.state = DetectorState::Active { since: now };
                tracing::debug!(pulse_number = self.pulse_count, "Motion started");
                vec![MotionEvent::MotionStarted {
                    pulse_number: self.pulse_count,
                }]
            }
            (DetectorState::Active { since }, Level::Low) => {
                let duration = now.duration_since(since);
                self.state = DetectorState::Idle;
                self.last_pulse = Some(MotionPulse {
                    started_at: since,
                    ended_at: now,
                    duration,
                });
                tracing::debug!(duration_ms = duration.as_millis() as u64, "Motion ended");

                let mut events = vec![MotionEvent::MotionEnded { duration }];
                if duration > CALIBRATION_LIMIT {
                    tracing::warn!(
                        duration_secs = duration.as_secs(),
                        "Overlong motion pulse - sensor likely in retriggering mode"
                    );
                    events.push(MotionEvent::CalibrationWarning { duration });
                }
                events
            }
            // Idle+Low and Active+High are no transitions
            _ => Vec::new(),
        }
    }
}

impl Default for MotionEdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, offset_ms: u64) -> Instant {
        base + Duration::from_millis(offset_ms)
    }

    #[test]
    fn test_low_high_high_low_emits_one_pulse() {
        let base = Instant::now();
        let mut det = MotionEdgeDetector::new();

        assert!(det.observe(Level::Low, at(base, 0)).is_empty());
        assert_eq!(
            det.observe(Level::High, at(base, 50)),
            vec![MotionEvent::MotionStarted { pulse_number: 1 }]
        );
        assert!(det.observe(Level::High, at(base, 100)).is_empty());
        assert_eq!(
            det.observe(Level::Low, at(base, 150)),
            vec![MotionEvent::MotionEnded {
                duration: Duration::from_millis(100)
            }]
        );
        assert_eq!(det.pulse_count(), 1);
    }

    #[test]
    fn test_sustained_high_never_ends() {
        let base = Instant::now();
        let mut det = MotionEdgeDetector::new();

        det.observe(Level::High, at(base, 0));
        for i in 1..100 {
            assert!(det.observe(Level::High, at(base, i * 50)).is_empty());
        }
        assert!(det.is_active());
        assert!(det.last_pulse().is_none());
    }

    #[test]
    fn test_overlong_pulse_adds_calibration_warning() {
        let base = Instant::now();
        let mut det = MotionEdgeDetector::new();

        det.observe(Level::High, at(base, 0));
        let events = det.observe(Level::Low, at(base, 11_000));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], MotionEvent::MotionEnded { .. }));
        assert!(matches!(
            events[1],
            MotionEvent::CalibrationWarning { duration } if duration == Duration::from_secs(11)
        ));
    }

    #[test]
    fn test_ten_second_pulse_is_not_warned() {
        let base = Instant::now();
        let mut det = MotionEdgeDetector::new();

        det.observe(Level::High, at(base, 0));
        let events = det.observe(Level::Low, at(base, 10_000));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_pulse_counter_increments_per_rising_edge() {
        let base = Instant::now();
        let mut det = MotionEdgeDetector::new();

        for i in 0..3 {
            det.observe(Level::High, at(base, i * 200));
            det.observe(Level::Low, at(base, i * 200 + 100));
        }
        assert_eq!(det.pulse_count(), 3);
        let pulse = det.last_pulse().unwrap();
        assert_eq!(pulse.duration, Duration::from_millis(100));
    }
}
