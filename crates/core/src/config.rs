use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Env var selecting the active profile (e.g. `PROD`).
pub const PROFILE_VAR: &str = "NUDGE_PROFILE";

pub const DEFAULT_REMINDER_BODY: &str =
    "You haven't logged your habits in the last couple of days. A small step today keeps your streak alive!";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn active_profile() -> String {
    env::var(PROFILE_VAR).unwrap_or_default().to_uppercase()
}

/// Log verbosity from `LOG_LEVEL` (profile-aware), default `info`.
///
/// Readable before the rest of the config so the subscriber can be installed
/// before configuration errors are reported.
pub fn log_level_from_env() -> String {
    let profile = active_profile();
    let lookup = |key: &str| env::var(key).ok();
    EnvReader::new(&profile, &lookup).or("LOG_LEVEL", "info")
}

// ── Profiled env lookup ───────────────────────────────────────

/// Reads `{PROFILE}_{KEY}` first, falling back to `{KEY}`. Empty values count
/// as unset. Missing required keys are collected so they can be reported
/// together.
struct EnvReader<'a> {
    profile: &'a str,
    lookup: &'a dyn Fn(&str) -> Option<String>,
    missing: Vec<String>,
}

impl<'a> EnvReader<'a> {
    fn new(profile: &'a str, lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            profile,
            lookup,
            missing: Vec::new(),
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            if let Some(v) = self.raw(&format!("{}_{}", self.profile, key)) {
                return Some(v);
            }
        }
        self.raw(key)
    }

    /// Like `opt`, but an empty value is returned rather than skipped.
    fn explicit(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            if let Some(v) = (self.lookup)(&format!("{}_{}", self.profile, key)) {
                return Some(v);
            }
        }
        (self.lookup)(key)
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    /// First present key wins; when none is set the first key is reported.
    fn required_any(&mut self, keys: &[&str]) -> String {
        if let Some(v) = keys.iter().find_map(|k| self.opt(k)) {
            return v;
        }
        self.missing.push(keys[0].to_string());
        String::new()
    }

    fn required(&mut self, key: &str) -> String {
        self.required_any(&[key])
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.opt(key) {
            None => Ok(default),
            Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                value: v.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(v) = self.opt(key) else {
            return Ok(default);
        };
        match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value: v,
                reason: "expected true or false".to_string(),
            }),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub database: DatabaseConfig,
    pub twilio: TwilioConfig,
    pub job: JobConfig,
    pub health: HealthConfig,
    pub log_level: String,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `NUDGE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = active_profile();
        Self::for_profile(&profile, |key| env::var(key).ok())
    }

    /// Build config for a named profile from an arbitrary key lookup.
    pub fn for_profile(
        profile: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let p = profile.to_uppercase();
        let mut reader = EnvReader::new(&p, &lookup);

        let database = DatabaseConfig::from_reader(&mut reader)?;
        let twilio = TwilioConfig::from_reader(&mut reader)?;
        let job = JobConfig::from_reader(&reader)?;
        let health = HealthConfig::from_reader(&reader);
        let log_level = reader.or("LOG_LEVEL", "info");

        if !reader.missing.is_empty() {
            return Err(ConfigError::Missing(reader.missing));
        }

        Ok(Self {
            profile: p,
            database,
            twilio,
            job,
            health,
            log_level,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  database:    {}", self.database.redacted_target());
        tracing::info!(
            "  twilio:      from={}, api_base={}",
            self.twilio.from_number,
            self.twilio.api_base
        );
        tracing::info!(
            "  job:         dry_run={}, concurrency={}",
            self.job.dry_run,
            self.job.concurrency
        );
        tracing::info!(
            "  health:      addr={}",
            self.health.addr.as_deref().unwrap_or("(disabled)")
        );
    }
}

// ── MySQL ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full `mysql://` URL. Takes precedence over the individual parts.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    fn from_reader(r: &mut EnvReader<'_>) -> Result<Self, ConfigError> {
        let url = r.opt("DATABASE_URL");
        let (host, username, database) = if url.is_some() {
            (r.opt("DB_HOST"), r.opt("DB_USER"), r.opt("DB_NAME"))
        } else {
            (
                Some(r.required("DB_HOST")),
                Some(r.required("DB_USER")),
                Some(r.required("DB_NAME")),
            )
        };

        Ok(Self {
            url,
            host,
            port: r.parse("DB_PORT", 3306)?,
            username,
            password: r.opt("DB_PASSWORD"),
            database,
            max_connections: r.parse("DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: r.parse("DB_ACQUIRE_TIMEOUT_SECS", 30)?,
        })
    }

    /// Connection target without credentials.
    pub fn redacted_target(&self) -> String {
        if self.url.is_some() {
            return "(DATABASE_URL)".to_string();
        }
        format!(
            "host={}:{}, db={}",
            self.host.as_deref().unwrap_or("?"),
            self.port,
            self.database.as_deref().unwrap_or("?")
        )
    }
}

// ── Twilio ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    /// Sender number used as `From` on every message.
    pub from_number: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl TwilioConfig {
    fn from_reader(r: &mut EnvReader<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            account_sid: r.required("TWILIO_ACCOUNT_SID"),
            auth_token: r.required("TWILIO_AUTH_TOKEN"),
            from_number: r.required_any(&["TWILIO_FROM_NUMBER", "TWILIO_PHONE_NUMBER"]),
            api_base: r
                .or("TWILIO_API_BASE", "https://api.twilio.com")
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: r.parse("TWILIO_TIMEOUT_SECS", 30)?,
        })
    }
}

// ── Job ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Log outgoing messages instead of sending them.
    pub dry_run: bool,
    pub reminder_body: String,
    /// Users evaluated in parallel. 1 = sequential.
    pub concurrency: usize,
}

impl JobConfig {
    fn from_reader(r: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let concurrency: usize = r.parse("NUDGE_CONCURRENCY", 1)?;
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "NUDGE_CONCURRENCY".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            dry_run: r.flag("DRY_RUN", false)?,
            reminder_body: r.or("NUDGE_REMINDER_BODY", DEFAULT_REMINDER_BODY),
            concurrency,
        })
    }
}

// ── Health ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Listen address for `/health`. `None` disables the server.
    pub addr: Option<String>,
}

impl HealthConfig {
    fn from_reader(r: &EnvReader<'_>) -> Self {
        // An explicitly empty value disables the listener.
        let addr = match r.explicit("NUDGE_HEALTH_ADDR") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => Some("0.0.0.0:8080".to_string()),
        };
        Self { addr }
    }
}
