//! MotionWatcher - Sensor Polling Loop
//!
//! ## Responsibilities
//!
//! - Poll the PIR pin at the configured interval and feed the edge detector
//! - On motion start: record state in the shared cache, spawn the capture
//!   worker (single-flight: never while the previous worker is alive),
//!   notify the alerts channel
//! - On motion end: record the pulse; relay calibration warnings
//!
//! One iteration per poll interval; the loop blocks between samples. Poll
//! interval is the detection latency and the minimum pulse width.

use crate::hardware::MotionSense;
use crate::motion::{MotionEdgeDetector, MotionEvent};
use crate::state_cache::{CacheValue, StateStore};
use crate::supervisor::ProcessSupervisor;
use crate::transfer::slack::SlackNotifier;
use crate::Result;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;

/// Cache keys shared between the sentry processes
pub mod keys {
    pub const MOTION_DETECTED: &str = "motion_detected";
    pub const PULSE_COUNT: &str = "pulse_count";
    pub const LAST_MOTION_SECS: &str = "last_motion_duration_secs";
    pub const CAPTURE_PID: &str = "capture_pid";
    pub const PAN_ANGLE: &str = "pan_angle";
    pub const TILT_ANGLE: &str = "tilt_angle";
}

/// Motion watch loop over the PIR pin
pub struct MotionWatcher<S: StateStore> {
    detector: MotionEdgeDetector,
    sense: Box<dyn MotionSense>,
    supervisor: Arc<ProcessSupervisor>,
    store: S,
    notifier: Option<SlackNotifier>,
    interpreter: String,
    capture_script: PathBuf,
    poll_interval: Duration,
}

impl<S: StateStore> MotionWatcher<S> {
    pub fn new(
        sense: Box<dyn MotionSense>,
        supervisor: Arc<ProcessSupervisor>,
        store: S,
        notifier: Option<SlackNotifier>,
        interpreter: String,
        capture_script: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            detector: MotionEdgeDetector::new(),
            sense,
            supervisor,
            store,
            notifier,
            interpreter,
            capture_script,
            poll_interval,
        }
    }

    /// Run until the shutdown future resolves
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Starting motion watch loop"
        );
        tokio::pin!(shutdown);
        let mut ticker = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(pulses = self.detector.pulse_count(), "Watch loop stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.step().await {
                        tracing::error!(error = %e, "Watch iteration failed");
                    }
                }
            }
        }
        Ok(())
    }

    /// One poll iteration
    async fn step(&mut self) -> Result<()> {
        let level = self.sense.sample()?;
        for event in self.detector.observe(level, Instant::now()) {
            self.handle_event(event).await?;
        }
        Ok(())
    }

    async fn handle_event(&mut self, event: MotionEvent) -> Result<()> {
        match event {
            MotionEvent::MotionStarted { pulse_number } => {
                self.store
                    .set(keys::MOTION_DETECTED, CacheValue::Bool(true))
                    .await?;
                self.store
                    .set(keys::PULSE_COUNT, CacheValue::Int(pulse_number as i64))
                    .await?;
                self.spawn_capture_worker().await?;
                self.notify(&format!("Motion detected (pulse #{})", pulse_number))
                    .await;
            }
            MotionEvent::MotionEnded { duration } => {
                self.store
                    .set(keys::MOTION_DETECTED, CacheValue::Bool(false))
                    .await?;
                self.store
                    .set(
                        keys::LAST_MOTION_SECS,
                        CacheValue::Float(duration.as_secs_f64()),
                    )
                    .await?;
                tracing::info!(
                    duration_ms = duration.as_millis() as u64,
                    "Motion pulse recorded"
                );
            }
            MotionEvent::CalibrationWarning { duration } => {
                self.notify(&format!(
                    "PIR pulse lasted {}s - sensor may be in retriggering mode, \
                     check the trigger jumper",
                    duration.as_secs()
                ))
                .await;
            }
        }
        Ok(())
    }

    /// Spawn the capture worker unless the previous one is still running
    async fn spawn_capture_worker(&self) -> Result<()> {
        if let Some(value) = self.store.get(keys::CAPTURE_PID).await? {
            if let Some(pid) = value.as_int() {
                if self.supervisor.check_liveness(pid as u32).await {
                    tracing::info!(pid, "Capture worker still running, not respawning");
                    return Ok(());
                }
            }
        }

        let script = self.capture_script.to_string_lossy().to_string();
        match self.supervisor.spawn(&self.interpreter, &[script]).await {
            Some(pid) => {
                self.store
                    .set(keys::CAPTURE_PID, CacheValue::Int(i64::from(pid)))
                    .await?;
            }
            None => {
                tracing::error!("Capture worker did not start, continuing to watch");
            }
        }
        Ok(())
    }

    /// Best-effort notification; delivery failures are logged, not retried
    /// (the artifact delivery path has its own retry budget)
    async fn notify(&self, text: &str) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.post_message(text).await {
                tracing::error!(error = %e, "Unable to post to chat");
            }
        }
    }
}
