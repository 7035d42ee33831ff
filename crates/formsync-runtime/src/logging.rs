//! Log output for hosts embedding a form
//!
//! Library code only emits `tracing` events. A host application calls
//! [`init_logging`] once to install a subscriber.

use formsync_core::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Install the global subscriber
pub fn init_logging(config: &LogConfig) -> FormResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| FormError::InvalidConfig(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| FormError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_from_json() {
        let config: LogConfig = serde_json::from_str(r#"{ "format": "json" }"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn test_second_install_fails() {
        let config = LogConfig {
            filter: "formsync=debug".to_string(),
            format: LogFormat::Pretty,
        };

        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(FormError::InvalidConfig(_))
        ));
    }
}
