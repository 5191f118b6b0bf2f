//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with help text
//! and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use alexa_plug_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {host}")]
    #[diagnostic(
        code(alexa_plug::connection_failed),
        help(
            "Check the Amazon domain and your network.\n\
             Use --alexa-ip to pin the regional host if DNS is the problem."
        )
    )]
    ConnectionFailed {
        host: String,
        #[source]
        source: alexa_plug_api::Error,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Alexa rejected the session cookie (HTTP {status})")]
    #[diagnostic(
        code(alexa_plug::auth_failed),
        help(
            "The cookie has expired or belongs to another region.\n\
             Copy a fresh cookie from a signed-in alexa.amazon.* browser session and run:\n  \
             alexa-plug config set-cookie"
        )
    )]
    AuthFailed { status: u16 },

    #[error("No session cookie configured for profile '{profile}'")]
    #[diagnostic(
        code(alexa_plug::no_credentials),
        help(
            "Run: alexa-plug config set-cookie\n\
             Or set ALEXA_SMARTPLUG_COOKIE."
        )
    )]
    NoCredentials { profile: String },

    #[error("No Amazon domain configured for profile '{profile}'")]
    #[diagnostic(
        code(alexa_plug::no_domain),
        help(
            "Run: alexa-plug config set-domain amazon.com\n\
             Or pass --domain / set ALEXA_SMARTPLUG_AMAZON_DOMAIN."
        )
    )]
    NoDomain { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Smart plug '{identifier}' not found")]
    #[diagnostic(
        code(alexa_plug::not_found),
        help("Run: alexa-plug devices list")
    )]
    DeviceNotFound { identifier: String },

    #[error("'{identifier}' matches {count} smart plugs")]
    #[diagnostic(
        code(alexa_plug::ambiguous),
        help("Use the entity id from `alexa-plug devices list` instead of the name.")
    )]
    AmbiguousDevice { identifier: String, count: usize },

    #[error("No smart plugs found on this account")]
    #[diagnostic(code(alexa_plug::no_devices))]
    NoDevices,

    #[error("Entity '{entity_id}' is not in the device topology")]
    #[diagnostic(
        code(alexa_plug::unresolved),
        help("Retry with --force to refresh the cached topology.")
    )]
    Unresolved { entity_id: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(alexa_plug::api_error))]
    Api(alexa_plug_api::Error),

    #[error("Selftest failed: expected the plug to be {expected} but it reads {actual}")]
    #[diagnostic(code(alexa_plug::selftest))]
    SelftestFailed {
        expected: &'static str,
        actual: &'static str,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(alexa_plug::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(alexa_plug::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(alexa_plug::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } | Self::NoDevices | Self::Unresolved { .. } => {
                exit_code::NOT_FOUND
            }
            Self::NoDomain { .. }
            | Self::AmbiguousDevice { .. }
            | Self::ProfileNotFound { .. }
            | Self::Validation { .. } => exit_code::USAGE,
            Self::Api(err) if err.is_auth_error() => exit_code::AUTH,
            Self::Api(err) if err.is_configuration_error() => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<alexa_plug_api::Error> for CliError {
    fn from(err: alexa_plug_api::Error) -> Self {
        if let alexa_plug_api::Error::Transport(source) = &err {
            if source.is_connect() || source.is_timeout() {
                let host = source
                    .url()
                    .and_then(|url| url.host_str())
                    .unwrap_or("alexa")
                    .to_owned();
                return Self::ConnectionFailed { host, source: err };
            }
        }
        match err {
            alexa_plug_api::Error::SessionRejected { status } => Self::AuthFailed { status },
            other => Self::Api(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::NoDomain { profile } => Self::NoDomain { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_session_maps_to_auth_exit_code() {
        let err = CliError::from(alexa_plug_api::Error::SessionRejected { status: 401 });
        assert!(matches!(err, CliError::AuthFailed { status: 401 }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn missing_cookie_maps_to_auth_exit_code() {
        let err = CliError::from(alexa_plug_api::Error::Unauthenticated);
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn interaction_failure_is_general() {
        let err = CliError::from(alexa_plug_api::Error::InteractionFailed {
            message: "device offline".into(),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(err.to_string(), "Interaction failed: device offline");
    }

    #[test]
    fn lookup_failures_are_not_found() {
        let err = CliError::DeviceNotFound {
            identifier: "Desk Lamp".into(),
        };
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
