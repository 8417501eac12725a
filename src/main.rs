//! PiSentry entry point
//!
//! One subcommand per process: `watch` (sensor loop), `mount` (pan/tilt
//! repositioning), `deliver` (artifact delivery). Processes coordinate
//! through the shared cache only.

use clap::{Parser, Subcommand};
use pisentry::hardware::{Pca9685Driver, PirInput};
use pisentry::pan_tilt::PanTiltController;
use pisentry::state::AppConfig;
use pisentry::state_cache::{CacheValue, RedisStore, StateStore};
use pisentry::supervisor::ProcessSupervisor;
use pisentry::transfer::slack::SlackNotifier;
use pisentry::transfer::storage::ObjectStore;
use pisentry::transfer::{deliver, TransferOutcome, TransferPolicy};
use pisentry::watcher::{keys, MotionWatcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pisentry", about = "Home monitoring sentry", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the motion watch loop
    Watch,
    /// Reposition the pan/tilt mount
    Mount {
        /// Absolute pan angle in degrees
        #[arg(long)]
        pan: Option<i32>,
        /// Absolute tilt angle in degrees
        #[arg(long)]
        tilt: Option<i32>,
        /// Relative pan change in degrees
        #[arg(long)]
        pan_delta: Option<i32>,
        /// Relative tilt change in degrees
        #[arg(long)]
        tilt_delta: Option<i32>,
        /// Disable PWM output and exit
        #[arg(long)]
        park: bool,
    },
    /// Deliver a capture artifact to storage and the alerts channel
    Deliver {
        /// File to deliver
        file: PathBuf,
        /// Chat upload title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pisentry=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PiSentry v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = AppConfig::default();
    tracing::info!(
        pir_pin = config.pir_pin,
        poll_interval_ms = config.poll_interval_ms,
        i2c_bus = %config.i2c_bus,
        redis_url = %config.redis_url,
        storage_bucket = %config.storage_bucket,
        "Configuration loaded"
    );

    match cli.command {
        Command::Watch => run_watch(config).await,
        Command::Mount {
            pan,
            tilt,
            pan_delta,
            tilt_delta,
            park,
        } => run_mount(config, pan, tilt, pan_delta, tilt_delta, park).await,
        Command::Deliver { file, title } => run_deliver(config, file, title).await,
    }
}

/// Sensor loop: PIR polling, capture worker supervision, notifications
async fn run_watch(config: AppConfig) -> anyhow::Result<()> {
    let sense = PirInput::open(config.pir_pin)?;
    let store = RedisStore::connect(&config.redis_url).await?;
    let supervisor = Arc::new(ProcessSupervisor::new());
    let notifier = if config.chat_token.is_empty() {
        tracing::warn!("No chat token configured, notifications disabled");
        None
    } else {
        Some(SlackNotifier::new(
            config.chat_token.clone(),
            config.chat_channel.clone(),
        ))
    };

    if config.warmup_secs > 0 {
        tracing::info!(secs = config.warmup_secs, "Calibrating PIR sensor, stay still");
        tokio::time::sleep(Duration::from_secs(config.warmup_secs)).await;
    }

    let mut watcher = MotionWatcher::new(
        Box::new(sense),
        supervisor,
        store,
        notifier,
        config.interpreter.clone(),
        config.capture_script.clone(),
        Duration::from_millis(config.poll_interval_ms),
    );

    watcher
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

/// One-shot mount repositioning. PWM output is disabled on every error
/// path and on operator interrupt.
async fn run_mount(
    config: AppConfig,
    pan: Option<i32>,
    tilt: Option<i32>,
    pan_delta: Option<i32>,
    tilt_delta: Option<i32>,
    park: bool,
) -> anyhow::Result<()> {
    let driver = Pca9685Driver::open(&config.i2c_bus, config.pca9685_addr)?;
    let mut controller = PanTiltController::new(Box::new(driver))?;
    let store = RedisStore::connect(&config.redis_url).await?;

    let result = tokio::select! {
        r = apply_mount(&mut controller, &store, pan, tilt, pan_delta, tilt_delta, park) => r,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, disabling PWM output");
            Err(pisentry::Error::Internal("operator interrupt".to_string()))
        }
    };

    if result.is_err() {
        if let Err(e) = controller.cleanup() {
            tracing::error!(error = %e, "PWM disable failed during cleanup");
        }
    }
    result?;
    Ok(())
}

async fn apply_mount(
    controller: &mut PanTiltController,
    store: &RedisStore,
    pan: Option<i32>,
    tilt: Option<i32>,
    pan_delta: Option<i32>,
    tilt_delta: Option<i32>,
    park: bool,
) -> pisentry::Result<()> {
    // Restore the mount to its cache-visible position first; construction
    // drove it to the fixed initial pulses, and relative moves need the
    // real current angles.
    if let Some(angle) = read_angle(store, keys::PAN_ANGLE).await? {
        controller.set_pan(angle)?;
    }
    if let Some(angle) = read_angle(store, keys::TILT_ANGLE).await? {
        controller.set_tilt(angle)?;
    }

    if let Some(angle) = pan {
        controller.set_pan(angle)?;
    }
    if let Some(angle) = tilt {
        controller.set_tilt(angle)?;
    }
    if pan_delta.is_some() || tilt_delta.is_some() {
        controller.move_relative(pan_delta.unwrap_or(0), tilt_delta.unwrap_or(0))?;
    }

    store
        .set(
            keys::PAN_ANGLE,
            CacheValue::Int(i64::from(controller.get_pan())),
        )
        .await?;
    store
        .set(
            keys::TILT_ANGLE,
            CacheValue::Int(i64::from(controller.get_tilt())),
        )
        .await?;
    tracing::info!(
        pan = controller.get_pan(),
        tilt = controller.get_tilt(),
        "Mount repositioned"
    );

    if park {
        controller.stop()?;
        tracing::info!("Mount parked");
    }
    Ok(())
}

async fn read_angle(store: &RedisStore, key: &str) -> pisentry::Result<Option<i32>> {
    Ok(store
        .get(key)
        .await?
        .and_then(|v| v.as_int())
        .map(|v| v as i32))
}

/// Deliver an artifact: object storage upload plus chat upload with the
/// tagging prompt, each under the bounded retry policy
async fn run_deliver(
    config: AppConfig,
    file: PathBuf,
    title: Option<String>,
) -> anyhow::Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("artifact path has no file name"))?
        .to_string();
    let key = format!("captures/{}", filename);
    let policy = TransferPolicy::default();

    let objects = ObjectStore::new(config.storage_endpoint.clone(), config.storage_bucket.clone());
    let storage_outcome = deliver(policy, |_| objects.put_object(&file, &key)).await;
    match &storage_outcome {
        TransferOutcome::Success { attempts, .. } => {
            tracing::info!(key = %key, attempts, "Archived to object storage");
        }
        TransferOutcome::Failure {
            attempts,
            last_error,
        } => {
            tracing::error!(key = %key, attempts, error = %last_error, "Storage delivery failed");
        }
    }

    let notifier = SlackNotifier::new(config.chat_token.clone(), config.chat_channel.clone());
    let chat_outcome = deliver(policy, |_| notifier.upload_file(&file, title.as_deref())).await;
    match &chat_outcome {
        TransferOutcome::Success { value, attempts } => {
            tracing::info!(file_id = %value.id, attempts, "Uploaded to chat");
            // the tagging prompt is posted once; a retry here would re-ask
            if let Err(e) = notifier.post_tagging_prompt(value).await {
                tracing::error!(error = %e, "Unable to post tagging prompt");
            }
        }
        TransferOutcome::Failure {
            attempts,
            last_error,
        } => {
            tracing::error!(attempts, error = %last_error, "Chat delivery failed");
        }
    }

    if !storage_outcome.is_success() || !chat_outcome.is_success() {
        anyhow::bail!("artifact delivery incomplete: {}", filename);
    }
    Ok(())
}
