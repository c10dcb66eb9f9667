// Configuration module for findstream
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;
use std::time::Duration;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Debounce interval for intermediate publications in milliseconds
    /// (FINDSTREAM_STREAMING_INTERVAL_MS)
    pub streaming_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            streaming_interval_ms: 300,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("FINDSTREAM_STREAMING_INTERVAL_MS") {
            if let Ok(parsed) = val.parse() {
                config.streaming_interval_ms = parsed;
            } else {
                eprintln!(
                    "findstream: Warning: Invalid FINDSTREAM_STREAMING_INTERVAL_MS value: {}, using default: {}",
                    val, config.streaming_interval_ms
                );
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }

    pub fn streaming_interval(&self) -> Duration {
        Duration::from_millis(self.streaming_interval_ms.max(1))
    }
}
