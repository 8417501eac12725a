//! PiSentry - Home Monitoring Sentry
//!
//! PIR-triggered camera capture on a pan/tilt mount, with delivery to a chat
//! channel and object storage.
//!
//! ## Architecture (6 Components)
//!
//! 1. Hardware - GPIO/PWM access layer (real + simulated backends)
//! 2. MotionEdgeDetector - digital pin samples -> discrete motion events
//! 3. PanTiltController - two-axis servo mount, angle -> pulse with clamping
//! 4. ProcessSupervisor - capture worker spawn / liveness / kill
//! 5. RetryableTransfer - bounded-retry artifact delivery (chat, storage)
//! 6. SharedStateStore - cross-process key-value cache (last writer wins)
//!
//! ## Process Model
//!
//! Execution is multi-process, one subcommand per OS process (`watch`,
//! `mount`, `deliver`). The shared cache is the only coordination point;
//! there is no locking and no ordering guarantee between writers.

pub mod error;
pub mod hardware;
pub mod motion;
pub mod pan_tilt;
pub mod state;
pub mod state_cache;
pub mod supervisor;
pub mod transfer;
pub mod watcher;

pub use error::{Error, Result};
