//! Shared configuration for alexa-plug.
//!
//! TOML profiles, cookie resolution (env + keyring + plaintext), and
//! translation to `alexa_plug_api::SessionConfig`. The CLI layers its flag
//! overrides on top.

use std::collections::HashMap;
use std::net::IpAddr;
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

use alexa_plug_api::SessionConfig;

/// Keyring service name; entries are keyed `{profile}/cookie`.
pub const KEYRING_SERVICE: &str = "alexa-plug";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no cookie configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no Amazon domain configured for profile '{profile}'")]
    NoDomain { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds. `0` disables it.
    #[serde(default)]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: 0,
        }
    }
}

fn default_output() -> String {
    "table".into()
}

/// A named Alexa account.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Amazon domain of the account (e.g. "amazon.co.jp").
    pub amazon_domain: Option<String>,

    /// Session cookie (plaintext -- prefer keyring or env var).
    pub cookie: Option<String>,

    /// Environment variable name containing the cookie.
    pub cookie_env: Option<String>,

    /// Force `alexa.{amazon_domain}` to resolve to this address.
    pub alexa_ip: Option<IpAddr>,

    /// Override the endpoint base URL (self-hosted gateways).
    pub api_base: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "alexa-plug", "alexa-plug").map_or_else(
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
    p.push("alexa-plug");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path`, layered under `ALEXA_PLUG_*` variables.
///
/// Nested keys use a double underscore: `ALEXA_PLUG_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ALEXA_PLUG_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/cookie"),
    )?)
}

/// Store a cookie for `profile_name` in the system keyring.
pub fn store_cookie(profile_name: &str, cookie: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(cookie)?;
    Ok(())
}

/// Resolve the session cookie from the profile's credential chain.
///
/// 1. The variable named by `cookie_env`
/// 2. System keyring (`alexa-plug` / `{profile}/cookie`)
/// 3. Plaintext `cookie` in the config
pub fn resolve_cookie(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.cookie_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref cookie) = profile.cookie {
        return Ok(SecretString::from(cookie.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `SessionConfig` from a profile.
///
/// `cookie` short-circuits the credential chain when given. A missing
/// cookie or domain is an error here.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    cookie: Option<SecretString>,
) -> Result<SessionConfig, ConfigError> {
    let cookie = match cookie {
        Some(cookie) => cookie,
        None => resolve_cookie(profile, profile_name)?,
    };
    let amazon_domain = profile
        .amazon_domain
        .clone()
        .ok_or_else(|| ConfigError::NoDomain {
            profile: profile_name.into(),
        })?;

    let endpoints = profile
        .api_base
        .as_deref()
        .map(alexa_plug_api::Endpoints::with_base)
        .unwrap_or_default();

    Ok(SessionConfig {
        cookie: Some(cookie),
        amazon_domain: Some(amazon_domain),
        alexa_ip: profile.alexa_ip,
        endpoints,
        timeout: profile.timeout.filter(|t| *t > 0).map(Duration::from_secs),
        ..SessionConfig::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_parse_from_toml() {
        let file = write_config(
            r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
amazon_domain = "amazon.co.jp"
cookie = "session-id=abc"
alexa_ip = "192.168.1.20"
timeout = 10
"#,
        );
        let cfg = load_config_from(file.path()).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("home"));
        assert_eq!(cfg.defaults.output, "json");

        let home = &cfg.profiles["home"];
        assert_eq!(home.amazon_domain.as_deref(), Some("amazon.co.jp"));
        assert_eq!(home.alexa_ip, Some("192.168.1.20".parse().unwrap()));
        assert_eq!(home.timeout, Some(10));
    }

    #[test]
    fn invalid_ip_is_rejected() {
        let file = write_config(
            r#"
[profiles.bad]
alexa_ip = "not-an-ip"
"#,
        );
        assert!(matches!(
            load_config_from(file.path()),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                amazon_domain: Some("amazon.de".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profiles["default"].amazon_domain.as_deref(),
            Some("amazon.de")
        );
    }

    #[test]
    fn plaintext_cookie_resolves() {
        let profile = Profile {
            amazon_domain: Some("amazon.com".into()),
            cookie: Some("session-id=plain".into()),
            api_base: Some("http://127.0.0.1:9000".into()),
            timeout: Some(0),
            ..Profile::default()
        };
        let session = profile_to_session_config(&profile, "alexa-plug-test-plaintext", None).unwrap();
        assert_eq!(
            session.cookie.unwrap().expose_secret(),
            "session-id=plain"
        );
        assert_eq!(session.amazon_domain.as_deref(), Some("amazon.com"));
        assert_eq!(session.endpoints.state, "http://127.0.0.1:9000/api/phoenix/state");
        assert_eq!(session.timeout, None);
    }

    #[test]
    fn missing_domain_is_reported() {
        let profile = Profile {
            cookie: Some("session-id=plain".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_session_config(&profile, "alexa-plug-test-nodomain", None),
            Err(ConfigError::NoDomain { .. })
        ));
    }

    #[test]
    fn explicit_cookie_wins_over_profile() {
        let profile = Profile {
            amazon_domain: Some("amazon.com".into()),
            cookie: Some("session-id=plain".into()),
            ..Profile::default()
        };
        let session = profile_to_session_config(
            &profile,
            "alexa-plug-test-override",
            Some(SecretString::from("session-id=flag")),
        )
        .unwrap();
        assert_eq!(session.cookie.unwrap().expose_secret(), "session-id=flag");
    }

    #[test]
    fn missing_cookie_is_reported() {
        let profile = Profile {
            amazon_domain: Some("amazon.com".into()),
            ..Profile::default()
        };
        assert!(matches!(
            resolve_cookie(&profile, "alexa-plug-test-nocookie"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }
}
