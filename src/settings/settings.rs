use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub store: Store,
    pub tokens: Tokens,
    pub session: Session,
    pub sweep: Sweep,
    pub http: Http,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "real"
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct Tokens {
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_seconds: i64,
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_signing_algorithm")]
    pub signing_algorithm: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct Sweep {
    #[serde(default = "default_sweep_interval")]
    pub interval_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub cert_path: String,
    pub key_path: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "vestibule".to_string()
}

fn default_access_ttl() -> i64 {
    900
}

fn default_refresh_ttl() -> i64 {
    604_800
}

fn default_clock_skew() -> u64 {
    5
}

fn default_signing_algorithm() -> String {
    "HS256".to_string()
}

fn default_session_ttl() -> i64 {
    86_400
}

fn default_sweep_interval() -> u64 {
    300
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
