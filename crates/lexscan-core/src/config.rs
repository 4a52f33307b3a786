use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LexError, Result};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    /// Upper bound on time spent waiting for a job to leave `IN_PROGRESS`.
    pub timeout: Duration,
}

impl PollerConfig {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub aws_region: String,
    pub bucket: String,
    pub upload_prefix: String,
    pub model_id: String,
    pub poller: PollerConfig,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    /// Reads `LEXSCAN_*` variables. `LEXSCAN_OCR_TIMEOUT_SECS` has no default
    /// and must be set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("LEXSCAN_OCR_TIMEOUT_SECS") {
            Some(raw) => parse_secs("LEXSCAN_OCR_TIMEOUT_SECS", &raw)?,
            None => {
                return Err(LexError::Config(
                    "LEXSCAN_OCR_TIMEOUT_SECS must be set to bound OCR job polling".into(),
                ))
            }
        };
        let poll_secs = match lookup("LEXSCAN_POLL_INTERVAL_SECS") {
            Some(raw) => parse_secs("LEXSCAN_POLL_INTERVAL_SECS", &raw)?,
            None => DEFAULT_POLL_INTERVAL_SECS,
        };
        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| LexError::Config(format!("SERVER_PORT is not a port: '{raw}'")))?,
            None => 8080,
        };

        Ok(Self {
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".into()),
            bucket: lookup("LEXSCAN_BUCKET").unwrap_or_else(|| "legal-doc-review".into()),
            upload_prefix: lookup("LEXSCAN_UPLOAD_PREFIX").unwrap_or_else(|| "uploads/".into()),
            model_id: lookup("LEXSCAN_MODEL_ID").unwrap_or_else(|| "amazon.nova-lite-v1:0".into()),
            poller: PollerConfig::new(
                Duration::from_secs(poll_secs),
                Duration::from_secs(timeout_secs),
            ),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
        })
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(LexError::Config(format!("{name} must be greater than zero"))),
        Ok(secs) => Ok(secs),
        Err(_) => Err(LexError::Config(format!(
            "{name} must be a whole number of seconds, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn timeout_is_required() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, LexError::Config(_)));
    }

    #[test]
    fn defaults_apply_when_only_timeout_is_set() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("LEXSCAN_OCR_TIMEOUT_SECS", "600")])).unwrap();
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.bucket, "legal-doc-review");
        assert_eq!(config.upload_prefix, "uploads/");
        assert_eq!(config.model_id, "amazon.nova-lite-v1:0");
        assert_eq!(config.poller.poll_interval, Duration::from_secs(5));
        assert_eq!(config.poller.timeout, Duration::from_secs(600));
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn zero_and_garbage_durations_are_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("LEXSCAN_OCR_TIMEOUT_SECS", "0")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup_from(&[
                ("LEXSCAN_OCR_TIMEOUT_SECS", "60"),
                ("LEXSCAN_POLL_INTERVAL_SECS", "soon"),
            ]))
            .is_err()
        );
    }
}
