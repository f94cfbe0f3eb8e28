//! Configuration structures.

use chrono::{Duration, NaiveTime};
use odte_core::error::TradingError;
use odte_core::session::SessionConfig;
use odte_risk::RiskConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
    /// Underlying the strategy watches
    pub underlying: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "odte".to_string(),
            environment: "development".to_string(),
            underlying: "QQQ".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Session calendar settings, exchange-local times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub open: String,
    pub close: String,
    pub close_buffer_minutes: i64,
    pub timezone: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            open: "09:30".to_string(),
            close: "16:00".to_string(),
            close_buffer_minutes: 30,
            timezone: "US/Eastern".to_string(),
        }
    }
}

impl SessionSettings {
    /// Convert into the core session calendar.
    pub fn to_session_config(&self) -> Result<SessionConfig, TradingError> {
        let open = NaiveTime::parse_from_str(&self.open, "%H:%M")
            .map_err(|e| TradingError::Config(format!("invalid session open: {e}")))?;
        let close = NaiveTime::parse_from_str(&self.close, "%H:%M")
            .map_err(|e| TradingError::Config(format!("invalid session close: {e}")))?;
        let timezone = self
            .timezone
            .parse()
            .map_err(|e| TradingError::Config(format!("invalid timezone: {e}")))?;
        Ok(SessionConfig {
            open,
            close,
            close_buffer: Duration::minutes(self.close_buffer_minutes),
            timezone,
        })
    }
}

/// Quote monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub poll_interval_secs: u64,
    pub retry_budget: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            retry_budget: 5,
            backoff_base_ms: 500,
            backoff_cap_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_settings_convert() {
        let settings = SessionSettings::default();
        let config = settings.to_session_config().unwrap();
        assert_eq!(config.open, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(config.close, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(config.close_buffer, Duration::minutes(30));
        assert_eq!(config.timezone.name(), "US/Eastern");
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let settings = SessionSettings {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert!(settings.to_session_config().is_err());
    }

    #[test]
    fn test_risk_defaults_flow_through() {
        let config = AppConfig::default();
        assert_eq!(config.risk.max_contracts, 25);
        assert_eq!(config.risk.cooldown_secs, 30);
        assert_eq!(config.monitor.retry_budget, 5);
    }
}
