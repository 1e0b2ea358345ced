use anyhow::{anyhow, Context, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::dynamodb::{Throughput, WaitConfig};

/// Which connector the program runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Aws,
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "aws" => Ok(Backend::Aws),
            "memory" => Ok(Backend::Memory),
            other => Err(anyhow!("unknown backend '{other}', expected 'aws' or 'memory'")),
        }
    }
}

/// Program settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub profile: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub table_name: String,
    pub throughput: Throughput,
    pub wait: WaitConfig,
    pub log_level: Level,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = WaitConfig::default();

        let on_demand = parse_bool("COURSES_ON_DEMAND", &get("COURSES_ON_DEMAND", "false"))?;
        let throughput = if on_demand {
            Throughput::OnDemand
        } else {
            Throughput::Provisioned {
                read_capacity_units: parse_units(
                    "COURSES_READ_CAPACITY",
                    &get("COURSES_READ_CAPACITY", "1"),
                )?,
                write_capacity_units: parse_units(
                    "COURSES_WRITE_CAPACITY",
                    &get("COURSES_WRITE_CAPACITY", "1"),
                )?,
            }
        };

        let wait = WaitConfig {
            interval: parse_duration("COURSES_POLL_INTERVAL", lookup("COURSES_POLL_INTERVAL"))?
                .unwrap_or(defaults.interval),
            max_interval: parse_duration(
                "COURSES_POLL_MAX_INTERVAL",
                lookup("COURSES_POLL_MAX_INTERVAL"),
            )?
            .unwrap_or(defaults.max_interval),
            timeout: parse_duration("COURSES_WAIT_TIMEOUT", lookup("COURSES_WAIT_TIMEOUT"))?
                .unwrap_or(defaults.timeout),
        };
        if wait.interval.is_zero() {
            return Err(anyhow!("COURSES_POLL_INTERVAL must be greater than zero"));
        }
        if wait.max_interval.is_zero() {
            return Err(anyhow!("COURSES_POLL_MAX_INTERVAL must be greater than zero"));
        }

        Ok(Self {
            backend: get("COURSES_BACKEND", "aws")
                .parse::<Backend>()
                .context("invalid COURSES_BACKEND")?,
            profile: get("AWS_PROFILE", "default"),
            region: get("AWS_REGION", "us-west-2"),
            endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|url| !url.is_empty()),
            table_name: get("COURSES_TABLE", "my-courses"),
            throughput,
            wait,
            log_level: get("COURSES_LOG_LEVEL", "info")
                .parse::<Level>()
                .map_err(|e| anyhow!("invalid COURSES_LOG_LEVEL: {e}"))?,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(anyhow!("invalid {key}: '{other}' is not a boolean")),
    }
}

fn parse_units(key: &str, value: &str) -> Result<i64> {
    let units: i64 = value
        .parse()
        .with_context(|| format!("invalid {key}: '{value}'"))?;
    if units < 1 {
        return Err(anyhow!("{key} must be at least 1"));
    }
    Ok(units)
}

fn parse_duration(key: &str, value: Option<String>) -> Result<Option<Duration>> {
    value
        .map(|value| {
            humantime::parse_duration(&value).with_context(|| format!("invalid {key}: '{value}'"))
        })
        .transpose()
}
