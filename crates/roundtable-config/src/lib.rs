//! Shared configuration for the roundtable CLI.
//!
//! TOML file + environment loading, credential resolution (env var +
//! plaintext), and translation to `roundtable_core::ClientConfig`. Every
//! timing knob the reconciliation loops use lives here -- the core layer
//! never embeds a literal interval or duration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roundtable_core::{ClientConfig, Timing, UserId};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bearer token configured (set [auth] token, token_env, or GD_AUTH__TOKEN)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub timing: TimingSection,
    #[serde(default)]
    pub cache: CacheSection,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSection {
    /// Server root URL; `/api/gd` is appended per request.
    pub url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthSection {
    /// The acting user's platform id. Snapshot cache keys and the
    /// survey shuffle both derive from it.
    pub user_id: Option<String>,
    /// Bearer token in plaintext -- prefer `token_env`.
    pub token: Option<String>,
    /// Name of an environment variable holding the bearer token.
    pub token_env: Option<String>,
}

/// Reconciliation timing, in seconds (durations in minutes where noted).
///
/// Defaults mirror `roundtable_core::Timing::default()`.
#[derive(Debug, Deserialize, Serialize)]
pub struct TimingSection {
    #[serde(default = "default_qr_poll")]
    pub qr_poll_secs: u64,
    #[serde(default = "default_resync")]
    pub resync_secs: u64,
    #[serde(default = "default_ready_poll")]
    pub ready_poll_secs: u64,
    #[serde(default = "default_participants_poll")]
    pub participants_poll_secs: u64,
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance_secs: u64,
    #[serde(default = "default_lobby_countdown")]
    pub lobby_countdown_secs: u64,
    #[serde(default = "default_question_window")]
    pub survey_question_window_secs: u64,
    #[serde(default = "default_prep_mins")]
    pub fallback_prep_mins: u64,
    #[serde(default = "default_discussion_mins")]
    pub fallback_discussion_mins: u64,
    #[serde(default = "default_survey_mins")]
    pub fallback_survey_mins: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            qr_poll_secs: default_qr_poll(),
            resync_secs: default_resync(),
            ready_poll_secs: default_ready_poll(),
            participants_poll_secs: default_participants_poll(),
            drift_tolerance_secs: default_drift_tolerance(),
            lobby_countdown_secs: default_lobby_countdown(),
            survey_question_window_secs: default_question_window(),
            fallback_prep_mins: default_prep_mins(),
            fallback_discussion_mins: default_discussion_mins(),
            fallback_survey_mins: default_survey_mins(),
        }
    }
}

impl TimingSection {
    pub fn to_timing(&self) -> Timing {
        Timing {
            qr_poll_interval: Duration::from_secs(self.qr_poll_secs),
            resync_interval: Duration::from_secs(self.resync_secs),
            ready_poll_interval: Duration::from_secs(self.ready_poll_secs),
            participants_poll_interval: Duration::from_secs(self.participants_poll_secs),
            drift_tolerance: Duration::from_secs(self.drift_tolerance_secs),
            lobby_countdown: Duration::from_secs(self.lobby_countdown_secs),
            survey_question_window: Duration::from_secs(self.survey_question_window_secs),
            fallback_prep: Duration::from_secs(self.fallback_prep_mins * 60),
            fallback_discussion: Duration::from_secs(self.fallback_discussion_mins * 60),
            fallback_survey: Duration::from_secs(self.fallback_survey_mins * 60),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CacheSection {
    /// Snapshot cache directory. Defaults to the platform cache dir.
    pub dir: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    30
}
fn default_qr_poll() -> u64 {
    3
}
fn default_resync() -> u64 {
    10
}
fn default_ready_poll() -> u64 {
    3
}
fn default_participants_poll() -> u64 {
    5
}
fn default_drift_tolerance() -> u64 {
    2
}
fn default_lobby_countdown() -> u64 {
    120
}
fn default_question_window() -> u64 {
    30
}
fn default_prep_mins() -> u64 {
    5
}
fn default_discussion_mins() -> u64 {
    20
}
fn default_survey_mins() -> u64 {
    5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "roundtable", "roundtable").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("roundtable");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults + file + environment.
///
/// Environment variables use a `GD_` prefix with `__` as the section
/// separator, e.g. `GD_SERVER__URL`, `GD_TIMING__RESYNC_SECS`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit file path (tests, `--config` flags).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GD_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the bearer token from the credential chain.
pub fn resolve_token(auth: &AuthSection) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = auth.token_env
        && let Ok(val) = std::env::var(env_name)
    {
        return Ok(SecretString::from(val));
    }

    // 2. Plaintext in config
    if let Some(ref token) = auth.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials)
}

// ── Translation to the runtime config ───────────────────────────────

impl Config {
    /// Build the core layer's runtime config from this file config.
    ///
    /// The token is optional at this level; operations that require
    /// auth fail server-side with a clear 401 if it is absent.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let url_str = self
            .server
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation {
                field: "server.url".into(),
                reason: "no server URL configured".into(),
            })?;
        let server_url = url_str.parse().map_err(|e| ConfigError::Validation {
            field: "server.url".into(),
            reason: format!("{e}"),
        })?;

        let user_id = self
            .auth
            .user_id
            .as_deref()
            .ok_or_else(|| ConfigError::Validation {
                field: "auth.user_id".into(),
                reason: "no user id configured".into(),
            })
            .and_then(|raw| {
                UserId::new(raw).map_err(|e| ConfigError::Validation {
                    field: "auth.user_id".into(),
                    reason: e.to_string(),
                })
            })?;

        Ok(ClientConfig {
            server_url,
            bearer_token: resolve_token(&self.auth).ok(),
            user_id,
            timeout: Duration::from_secs(self.server.timeout),
            timing: self.timing.to_timing(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_core_timing() {
        let timing = TimingSection::default().to_timing();
        let core = Timing::default();
        assert_eq!(timing.qr_poll_interval, core.qr_poll_interval);
        assert_eq!(timing.resync_interval, core.resync_interval);
        assert_eq!(timing.drift_tolerance, core.drift_tolerance);
        assert_eq!(timing.fallback_discussion, core.fallback_discussion);
    }

    #[test]
    fn file_and_env_layer_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [server]
                url = "https://gd.example.edu"

                [auth]
                user_id = "admin-1"

                [timing]
                resync_secs = 20
                "#,
            )?;
            jail.set_env("GD_TIMING__QR_POLL_SECS", "7");

            let config = load_config_from(std::path::Path::new("config.toml")).unwrap();
            assert_eq!(config.server.url.as_deref(), Some("https://gd.example.edu"));
            assert_eq!(config.timing.resync_secs, 20);
            assert_eq!(config.timing.qr_poll_secs, 7);
            // Untouched fields keep their defaults.
            assert_eq!(config.timing.ready_poll_secs, 3);
            Ok(())
        });
    }

    #[test]
    fn token_chain_prefers_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ROUNDTABLE_TEST_TOKEN", "from-env");

            let auth = AuthSection {
                user_id: None,
                token: Some("from-file".into()),
                token_env: Some("ROUNDTABLE_TEST_TOKEN".into()),
            };

            use secrecy::ExposeSecret;
            let token = resolve_token(&auth).unwrap();
            assert_eq!(token.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn missing_token_everywhere_is_an_error() {
        let auth = AuthSection::default();
        assert!(matches!(
            resolve_token(&auth),
            Err(ConfigError::NoCredentials)
        ));
    }

    #[test]
    fn client_config_requires_url_and_user() {
        let config = Config::default();
        assert!(config.to_client_config().is_err());

        let config = Config {
            server: ServerSection {
                url: Some("https://gd.example.edu".into()),
                timeout: 30,
            },
            auth: AuthSection {
                user_id: Some("admin-1".into()),
                token: None,
                token_env: None,
            },
            ..Config::default()
        };

        let client = config.to_client_config().unwrap();
        assert_eq!(client.server_url.as_str(), "https://gd.example.edu/");
        assert_eq!(client.user_id.as_str(), "admin-1");
        assert!(client.bearer_token.is_none());
    }
}
