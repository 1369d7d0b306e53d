use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Mutex, Once};
use tracing::{error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling, rolling::Rotation};
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

static INIT: Once = Once::new();

// Flush guards for the non-blocking file writers live as long as the process.
static GUARDS: Mutex<Vec<WorkerGuard>> = Mutex::new(Vec::new());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub service_name: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_directory: String,
    pub enable_colors: bool,
    pub enable_thread_ids: bool,
    pub enable_file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            service_name: "yeil-dashboard".to_string(),
            enable_console: true,
            enable_file: true,
            log_directory: "logs".to_string(),
            enable_colors: true,
            enable_thread_ids: false,
            enable_file_line: false,
        }
    }
}

pub struct Logger;

impl Logger {
    pub fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    pub fn init(log_level: &str) {
        Self::init_with_config(LogConfig {
            level: log_level.to_string(),
            ..LogConfig::default()
        });
    }

    pub fn init_with_config(config: LogConfig) {
        INIT.call_once(|| {
            let level = Self::parse_level(&config.level);

            // RUST_LOG wins; otherwise our crate at the configured level and
            // actix access logs at info.
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("yeil_dashboard={level},actix_web=info")));

            let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

            if config.enable_console {
                let console_layer = fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_thread_ids(config.enable_thread_ids)
                    .with_file(config.enable_file_line)
                    .with_line_number(config.enable_file_line)
                    .with_ansi(config.enable_colors)
                    .with_writer(std::io::stdout);
                layers.push(Box::new(console_layer));
            }

            if config.enable_file {
                if let Err(e) = fs::create_dir_all(&config.log_directory) {
                    eprintln!("Failed to create log directory {}: {e}", config.log_directory);
                } else {
                    let file_appender = rolling::RollingFileAppender::new(
                        Rotation::DAILY,
                        &config.log_directory,
                        format!("{}.log", config.service_name.replace('-', "_")),
                    );
                    let (writer, guard) = non_blocking(file_appender);
                    if let Ok(mut guards) = GUARDS.lock() {
                        guards.push(guard);
                    }
                    let file_layer = fmt::layer()
                        .with_timer(UtcTime::rfc_3339())
                        .with_thread_ids(config.enable_thread_ids)
                        .with_ansi(false)
                        .with_writer(writer);
                    layers.push(Box::new(file_layer));
                }
            }

            let result = Registry::default().with(layers).with(env_filter).try_init();
            if let Err(e) = result {
                eprintln!("Logger already initialized: {e}");
            }
        });
    }

    pub fn transaction_submitted(tx_hash: &str, chain_id: u64, kind: &str) {
        info!(tx_hash, chain_id, kind, "Transaction submitted");
    }

    pub fn transaction_confirmed(tx_hash: &str, chain_id: u64, block_number: Option<u64>, gas_used: Option<u64>) {
        info!(tx_hash, chain_id, ?block_number, ?gas_used, "Transaction confirmed");
    }

    pub fn transaction_failed(id: &str, chain_id: u64, error: &str) {
        error!(id, chain_id, error, "Transaction failed");
    }

    pub fn contract_read_failed(chain_id: u64, operation: &str, error: &str) {
        warn!(chain_id, operation, error, "Contract read failed");
    }
}
