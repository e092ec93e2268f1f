// # medwatchd - registry watch batch binary
//
// This is a THIN integration layer ONLY:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Wiring the source, notifier and snapshot store
// 4. Executing exactly one WatchRunner run, then exiting
//
// All diffing, caching and orchestration logic lives in medwatch-core.
// The process is batch, run-to-completion: schedule it externally (cron,
// systemd timer, CI schedule) to poll the registry.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Registry query
// - `MEDWATCH_SEARCH_MODE`: Query mode, `ambito` (health district) or
//   `comune` (municipality). Required.
// - `MEDWATCH_DISTRICT_ID`: District id (required when mode is `ambito`)
// - `MEDWATCH_MUNICIPALITY_CODE`: Municipality code (required when mode
//   is `comune`)
//
// ### Notification channel
// - `MEDWATCH_BOT_TOKEN`: Telegram bot token. Required.
// - `MEDWATCH_CHAT_ID`: Target chat/channel id. Required.
//
// ### State and cache
// - `MEDWATCH_DATA_DIR`: Directory holding `doctor_state.json`
//   (default: current directory)
// - `MEDWATCH_CACHE_TTL_DAYS`: Location cache TTL in days (default: 7;
//   0 forces a detail fetch on every lookup)
// - `MEDWATCH_FETCH_DELAY_SECS`: Pause after each detail fetch
//   (default: 1)
//
// ### Logging
// - `MEDWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export MEDWATCH_SEARCH_MODE=ambito
// export MEDWATCH_DISTRICT_ID=4
// export MEDWATCH_BOT_TOKEN=123456:your_token
// export MEDWATCH_CHAT_ID=@your_channel
// export MEDWATCH_DATA_DIR=/var/lib/medwatch
//
// medwatchd
// ```

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use medwatch_core::{
    CacheConfig, FileSnapshotStore, NotifierConfig, RunOutcome, SourceConfig, StateStoreConfig,
    WatchConfig, WatchRunner,
};
use medwatch_notify_telegram::TelegramNotifier;
use medwatch_source_apss::ApssSource;

/// File name of the persisted snapshot inside MEDWATCH_DATA_DIR
const STATE_FILE_NAME: &str = "doctor_state.json";

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (including "no changes")
/// - 1: Configuration error
/// - 2: Runtime error (fetch failure, empty listing, storage failure)
#[derive(Debug, Clone, Copy)]
enum WatchExitCode {
    /// Run completed normally
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (fatal fetch or storage failure)
    RuntimeError = 2,
}

impl From<WatchExitCode> for ExitCode {
    fn from(code: WatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    search_mode: String,
    district_id: Option<String>,
    municipality_code: Option<String>,
    bot_token: String,
    chat_id: String,
    data_dir: String,
    cache_ttl_days: Option<i64>,
    fetch_delay_secs: Option<u64>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            search_mode: env::var("MEDWATCH_SEARCH_MODE")
                .map_err(|_| anyhow::anyhow!("MEDWATCH_SEARCH_MODE is required"))?
                .to_lowercase(),
            district_id: env::var("MEDWATCH_DISTRICT_ID").ok(),
            municipality_code: env::var("MEDWATCH_MUNICIPALITY_CODE").ok(),
            bot_token: env::var("MEDWATCH_BOT_TOKEN")
                .map_err(|_| anyhow::anyhow!("MEDWATCH_BOT_TOKEN is required"))?,
            chat_id: env::var("MEDWATCH_CHAT_ID")
                .map_err(|_| anyhow::anyhow!("MEDWATCH_CHAT_ID is required"))?,
            data_dir: env::var("MEDWATCH_DATA_DIR").unwrap_or_else(|_| ".".to_string()),
            cache_ttl_days: env::var("MEDWATCH_CACHE_TTL_DAYS")
                .ok()
                .map(|s| s.parse().unwrap_or(7)),
            fetch_delay_secs: env::var("MEDWATCH_FETCH_DELAY_SECS")
                .ok()
                .map(|s| s.parse().unwrap_or(1)),
            log_level: env::var("MEDWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.search_mode.as_str() {
            "ambito" => {
                if self
                    .district_id
                    .as_ref()
                    .is_none_or(|district| district.is_empty())
                {
                    anyhow::bail!(
                        "MEDWATCH_DISTRICT_ID is required when MEDWATCH_SEARCH_MODE=ambito"
                    );
                }
            }
            "comune" => {
                if self
                    .municipality_code
                    .as_ref()
                    .is_none_or(|code| code.is_empty())
                {
                    anyhow::bail!(
                        "MEDWATCH_MUNICIPALITY_CODE is required when MEDWATCH_SEARCH_MODE=comune"
                    );
                }
            }
            other => anyhow::bail!(
                "MEDWATCH_SEARCH_MODE '{}' is not supported. \
                Supported modes: ambito, comune",
                other
            ),
        }

        if self.bot_token.is_empty() {
            anyhow::bail!(
                "MEDWATCH_BOT_TOKEN is required. \
                Set it via: export MEDWATCH_BOT_TOKEN=your_token"
            );
        }

        // Bot API tokens look like "123456:ABC..."; catch obvious mistakes
        if !self.bot_token.contains(':') {
            anyhow::bail!(
                "MEDWATCH_BOT_TOKEN does not look like a bot token \
                (expected '<bot id>:<secret>'). Verify your token is correct."
            );
        }

        if self.chat_id.is_empty() {
            anyhow::bail!(
                "MEDWATCH_CHAT_ID is required. \
                Set it via: export MEDWATCH_CHAT_ID=@your_channel"
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MEDWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the core configuration
    fn watch_config(&self) -> WatchConfig {
        let source = match self.search_mode.as_str() {
            "ambito" => SourceConfig::District {
                district_id: self.district_id.clone().unwrap_or_default(),
            },
            _ => SourceConfig::Municipality {
                code: self.municipality_code.clone().unwrap_or_default(),
            },
        };

        let mut cache = CacheConfig::default();
        if let Some(ttl_days) = self.cache_ttl_days {
            cache.ttl_days = ttl_days;
        }
        if let Some(delay) = self.fetch_delay_secs {
            cache.fetch_delay_secs = delay;
        }

        WatchConfig {
            source,
            notifier: NotifierConfig::Telegram {
                bot_token: self.bot_token.clone(),
                chat_id: self.chat_id.clone(),
            },
            state_store: StateStoreConfig::File {
                path: self.state_file_path().display().to_string(),
            },
            cache,
        }
    }

    /// Path to the persisted snapshot file
    fn state_file_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(STATE_FILE_NAME)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return WatchExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return WatchExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WatchExitCode::ConfigError.into();
    }

    info!("Starting medwatchd");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WatchExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(()) => WatchExitCode::Success,
            Err(e) => {
                error!("Run failed: {}", e);
                WatchExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Wire the collaborators and execute one run
async fn run(config: Config) -> Result<()> {
    let watch_config = config.watch_config();

    let source = ApssSource::new(&watch_config.source);
    info!("Search URL: {}", source.search_url());

    let notifier = match &watch_config.notifier {
        NotifierConfig::Telegram { bot_token, chat_id } => {
            TelegramNotifier::new(bot_token.clone(), chat_id.clone())
                .with_search_url(source.search_url())
        }
    };

    let store = FileSnapshotStore::new(config.state_file_path());
    info!("State file: {}", store.path().display());

    let runner = WatchRunner::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(store),
        &watch_config,
    )?;

    match runner.run().await? {
        RunOutcome::Bootstrapped { doctors } => {
            info!(
                "Initialized state with {} doctors; future runs will detect and post changes",
                doctors
            );
        }
        RunOutcome::Completed {
            added,
            removed,
            changed,
            notified,
        } => {
            info!(
                "Run complete: {} added, {} removed, {} changed, notified: {}",
                added, removed, changed, notified
            );
        }
    }

    Ok(())
}
