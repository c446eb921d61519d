//! Configuration for zteng.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `zteng_core::RouterConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use zteng_core::{RouterConfig, TlsVerification};

/// Keyring service name for stored router passwords.
pub const KEYRING_SERVICE: &str = "zteng";

/// Env var consulted for the router password.
pub const PASSWORD_ENV: &str = "ZTENG_PASSWORD";

/// Supported router models: (key, display name).
pub const ROUTER_TYPES: &[(&str, &str)] = &[("g5tc", "ZTE G5TC")];

pub const DEFAULT_SCAN_INTERVAL: u64 = 60;
pub const MIN_SCAN_INTERVAL: u64 = 5;
pub const MAX_SCAN_INTERVAL: u64 = 3600;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Routers ship self-signed certificates, so verification is off
    /// unless asked for.
    #[serde(default)]
    pub verify_tls: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            verify_tls: false,
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

/// A named router profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router base URL (e.g., "http://192.168.0.1").
    pub router: String,

    /// Display name for the router.
    pub name: Option<String>,

    /// Router model key, see [`ROUTER_TYPES`].
    #[serde(default = "default_router_type")]
    pub router_type: String,

    /// Password (plaintext; keyring or env var preferred).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override TLS verification.
    pub verify_tls: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override polling interval (seconds).
    pub scan_interval: Option<u64>,
}

fn default_router_type() -> String {
    "g5tc".into()
}

impl Profile {
    pub fn new(router: impl Into<String>) -> Self {
        Self {
            router: router.into(),
            name: None,
            router_type: default_router_type(),
            password: None,
            password_env: None,
            verify_tls: None,
            ca_cert: None,
            timeout: None,
            scan_interval: None,
        }
    }
}

// ── Validation ──────────────────────────────────────────────────────

/// Display name for a router model key.
pub fn router_type_label(key: &str) -> Option<&'static str> {
    ROUTER_TYPES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

/// Check a polling interval against the allowed range.
pub fn validate_scan_interval(secs: u64) -> Result<Duration, ConfigError> {
    if (MIN_SCAN_INTERVAL..=MAX_SCAN_INTERVAL).contains(&secs) {
        Ok(Duration::from_secs(secs))
    } else {
        Err(ConfigError::Validation {
            field: "scan_interval".into(),
            reason: format!(
                "{secs}s is outside {MIN_SCAN_INTERVAL}..={MAX_SCAN_INTERVAL} seconds"
            ),
        })
    }
}

/// Effective polling interval for a profile, validated.
pub fn scan_interval(profile: &Profile, defaults: &Defaults) -> Result<Duration, ConfigError> {
    validate_scan_interval(profile.scan_interval.unwrap_or(defaults.scan_interval))
}

/// Parse and check a router URL. Bare hosts get `http://`.
pub fn parse_router_url(raw: &str) -> Result<url::Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{raw}")
    };
    let url: url::Url = candidate.parse().map_err(|_| ConfigError::Validation {
        field: "router".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "router".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "zteng", "zteng").map_or_else(
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
    p.push("zteng");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from a specific file + environment.
///
/// A missing file is not an error; defaults and env still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZTENG_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve the router password from the credential chain.
///
/// Order: the profile's `password_env` variable, `ZTENG_PASSWORD`, the
/// OS keyring, then plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a router password in the OS keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Build a `RouterConfig` from a profile, without CLI flag overrides.
pub fn profile_to_router_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<RouterConfig, ConfigError> {
    if router_type_label(&profile.router_type).is_none() {
        return Err(ConfigError::Validation {
            field: "router_type".into(),
            reason: format!("unknown router type '{}'", profile.router_type),
        });
    }

    let url = parse_router_url(&profile.router)?;
    let password = resolve_password(profile, profile_name)?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::from_flag(profile.verify_tls.unwrap_or(defaults.verify_tls))
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(RouterConfig {
        url,
        password,
        tls,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"
scan_interval = 30

[profiles.home]
router = "https://192.168.0.1"
name = "Living room"
password = "hunter2"
timeout = 5
"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&write_sample(&dir)).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.scan_interval, 30);
        assert_eq!(config.defaults.timeout, 10);

        let home = config.profile("home").unwrap();
        assert_eq!(home.router, "https://192.168.0.1");
        assert_eq!(home.router_type, "g5tc");
        assert_eq!(home.timeout, Some(5));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.scan_interval, DEFAULT_SCAN_INTERVAL);
        assert!(!config.defaults.verify_tls);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut profile = Profile::new("http://10.0.0.1");
        profile.scan_interval = Some(120);
        config.profiles.insert("lab".into(), profile);
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile("lab").unwrap().scan_interval, Some(120));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.profile("nope"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn scan_interval_bounds() {
        assert_eq!(validate_scan_interval(5).unwrap(), Duration::from_secs(5));
        assert_eq!(validate_scan_interval(3600).unwrap(), Duration::from_secs(3600));
        assert!(validate_scan_interval(4).is_err());
        assert!(validate_scan_interval(3601).is_err());
    }

    #[test]
    fn profile_scan_interval_overrides_default() {
        let mut profile = Profile::new("192.168.0.1");
        let defaults = Defaults::default();
        assert_eq!(scan_interval(&profile, &defaults).unwrap(), Duration::from_secs(60));
        profile.scan_interval = Some(1);
        assert!(scan_interval(&profile, &defaults).is_err());
    }

    #[test]
    fn router_types() {
        assert_eq!(router_type_label("g5tc"), Some("ZTE G5TC"));
        assert_eq!(router_type_label("mc801"), None);
    }

    #[test]
    fn bare_host_gets_http_scheme() {
        let url = parse_router_url("192.168.0.1").unwrap();
        assert_eq!(url.as_str(), "http://192.168.0.1/");
        assert!(parse_router_url("ftp://192.168.0.1").is_err());
        assert!(parse_router_url("http://").is_err());
    }

    #[test]
    fn plaintext_is_the_last_resort() {
        let mut profile = Profile::new("192.168.0.1");
        profile.password = Some("plain".into());
        profile.password_env = Some("ZTENG_TEST_UNSET_PASSWORD_VAR".into());

        let resolved = resolve_password(&profile, "zteng-test-plaintext").unwrap();
        if std::env::var(PASSWORD_ENV).is_err() {
            assert_eq!(resolved.expose_secret(), "plain");
        }
    }

    #[test]
    fn missing_password_is_reported_per_profile() {
        if std::env::var(PASSWORD_ENV).is_ok() {
            return;
        }
        let profile = Profile::new("192.168.0.1");
        let err = resolve_password(&profile, "zteng-test-empty").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NoCredentials { ref profile } if profile == "zteng-test-empty"
        ));
    }

    #[test]
    fn profile_builds_router_config() {
        let mut profile = Profile::new("http://192.168.0.1");
        profile.password = Some("pw".into());
        profile.timeout = Some(3);
        profile.verify_tls = Some(true);

        let config = profile_to_router_config(&profile, "build", &Defaults::default()).unwrap();
        assert_eq!(config.url.as_str(), "http://192.168.0.1/");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn unknown_router_type_is_rejected() {
        let mut profile = Profile::new("http://192.168.0.1");
        profile.password = Some("pw".into());
        profile.router_type = "mc801".into();

        let err = profile_to_router_config(&profile, "bad", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "router_type"));
    }
}
