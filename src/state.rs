//! Application configuration
//!
//! Env-var backed, with defaults matching the deployed sentry unit.
//! Values are logged at startup; secrets are not.

use crate::motion::DEFAULT_POLL_INTERVAL;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// BCM pin number of the PIR sensor input
    pub pir_pin: u8,
    /// Poll interval for the motion loop in milliseconds.
    /// This is both the minimum detectable pulse width and the maximum
    /// event-detection latency.
    pub poll_interval_ms: u64,
    /// PIR warm-up time before the first sample, in seconds
    pub warmup_secs: u64,
    /// I2C bus device for the PCA9685 servo board
    pub i2c_bus: String,
    /// PCA9685 I2C address
    pub pca9685_addr: u8,
    /// Interpreter used to run the capture worker script
    pub interpreter: String,
    /// Capture worker script path
    pub capture_script: PathBuf,
    /// Chat bot token (empty disables notifications)
    pub chat_token: String,
    /// Chat alerts channel id
    pub chat_channel: String,
    /// Object storage endpoint URL
    pub storage_endpoint: String,
    /// Object storage bucket name
    pub storage_bucket: String,
    /// Shared cache URL
    pub redis_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pir_pin: std::env::var("PIR_PIN")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(21),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL.as_millis() as u64),
            warmup_secs: std::env::var("PIR_WARMUP_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            i2c_bus: std::env::var("I2C_BUS")
                .unwrap_or_else(|_| "/dev/i2c-1".to_string()),
            pca9685_addr: std::env::var("PCA9685_ADDR")
                .ok()
                .and_then(|a| u8::from_str_radix(a.trim_start_matches("0x"), 16).ok())
                .unwrap_or(0x40),
            interpreter: std::env::var("CAPTURE_INTERPRETER")
                .unwrap_or_else(|_| "python3".to_string()),
            capture_script: std::env::var("CAPTURE_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/opt/pisentry/capture.py")),
            chat_token: std::env::var("CHAT_BOT_TOKEN").unwrap_or_default(),
            chat_channel: std::env::var("CHAT_ALERTS_CHANNEL")
                .unwrap_or_else(|_| "alerts".to_string()),
            storage_endpoint: std::env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "https://s3.amazonaws.com".to_string()),
            storage_bucket: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "pisentry-captures".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        }
    }
}
