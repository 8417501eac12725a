//! Error handling for PiSentry

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GPIO access error
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// PWM driver error (PCA9685 / I2C)
    #[error("PWM error: {0}")]
    Pwm(String),

    /// Shared cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External API error (endpoint responded but signalled failure)
    #[error("API error: {0}")]
    Api(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
