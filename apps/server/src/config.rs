use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use chrono_tz::Tz;
use mindquest_core::utils::time_utils::{parse_timezone, DEFAULT_CIVIL_TZ};
use mindquest_storage_sqlite::db;

const DEFAULT_DATA_DIR: &str = "./db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Civil timezone for streak days, daily cooldowns and goal windows.
    pub timezone: Tz,
    /// `None` disables the goal recalculation scheduler.
    pub goal_recalc_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("MQ_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid MQ_LISTEN_ADDR")?;
        let db_path =
            std::env::var("MQ_DB_PATH").unwrap_or_else(|_| db::get_db_path(DEFAULT_DATA_DIR));
        let cors_allow = std::env::var("MQ_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("MQ_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let timezone = match std::env::var("MQ_TIMEZONE") {
            Ok(name) => parse_timezone(&name).context("Invalid MQ_TIMEZONE")?,
            Err(_) => DEFAULT_CIVIL_TZ,
        };
        let recalc_secs: u64 = std::env::var("MQ_GOAL_RECALC_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .unwrap_or(3600);
        let log_format = match std::env::var("MQ_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            timezone,
            goal_recalc_interval: (recalc_secs > 0).then(|| Duration::from_secs(recalc_secs)),
            log_format,
        })
    }
}
