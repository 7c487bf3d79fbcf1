//! Scheduler configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::path::PathBuf;

use crate::error::ScheduleError;
use crate::service::{ServiceCatalog, SlotPolicy};

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Top-level scheduler configuration.
///
/// Loaded once at startup via [`SchedulerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Slot length and increment.
    pub slot_policy: SlotPolicy,

    /// Services offered, filtered by slot length at resolution time.
    pub services: ServiceCatalog,

    /// Refuse a second pending proposal for the same optometrist and day.
    pub enforce_single_pending: bool,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Optional JSON seed with branches, optometrists and roster rows.
    pub seed_path: Option<PathBuf>,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_policy: SlotPolicy::HOURLY,
            services: ServiceCatalog::default(),
            enforce_single_pending: true,
            event_bus_capacity: 1024,
            seed_path: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl SchedulerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or unparsable.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if `SLOT_DURATION_MINUTES` is
    /// out of range or `SERVICE_LABELS` is malformed.
    pub fn from_env() -> Result<Self, ScheduleError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let slot_policy = SlotPolicy::new(parse_env(
            "SLOT_DURATION_MINUTES",
            defaults.slot_policy.slot_minutes(),
        ))?;

        let services = match std::env::var("SERVICE_LABELS") {
            Ok(spec) => ServiceCatalog::parse(&spec)?,
            Err(_) => defaults.services,
        };

        let enforce_single_pending =
            parse_env_bool("ENFORCE_SINGLE_PENDING", defaults.enforce_single_pending);
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity);

        let seed_path = std::env::var("ROSTER_SEED_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            slot_policy,
            services,
            enforce_single_pending,
            event_bus_capacity,
            seed_path,
            log_format,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_clinic_policy() {
        let config = SchedulerConfig::default();
        assert_eq!(config.slot_policy.slot_minutes(), 60);
        assert!(config.enforce_single_pending);
        assert_eq!(config.services.offerings().len(), 4);
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn unset_variables_fall_back() {
        assert_eq!(parse_env("CLINIC_ROSTER_TEST_UNSET_NUMBER", 42_u32), 42);
        assert!(parse_env_bool("CLINIC_ROSTER_TEST_UNSET_BOOL", true));
    }
}
