use thiserror::Error;

/// Top-level error type for the `alexa-plug-api` crate.
///
/// Construction problems (missing cookie or domain, conflicting options),
/// vendor-reported failures, and the transport/decoding errors that are
/// passed through untouched. `alexa-plug` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Construction ────────────────────────────────────────────────
    /// No session cookie was supplied and none was found in the environment.
    #[error("No cookie provided.")]
    Unauthenticated,

    /// No Amazon domain was supplied and none was found in the environment.
    #[error("No amazon domain provided.")]
    MissingRegion,

    /// Mutually exclusive construction options were both supplied.
    #[error("{0}")]
    InvalidOption(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The topology did not have the expected shape, or an entity could not
    /// be mapped to an appliance id.
    #[error("{}", unknown_state_message(.help.as_deref()))]
    UnknownState { help: Option<String> },

    /// The state endpoint answered with a non-empty `errors` list.
    #[error("Interaction failed: {message}")]
    InteractionFailed { message: String },

    /// The vendor rejected the session cookie (HTTP 401/403).
    #[error("Session rejected by Alexa (HTTP {status}) -- the cookie is missing or expired")]
    SessionRejected { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL rendering or parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// A response body (or one of its JSON-encoded string fields) was not
    /// the JSON we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn unknown_state_message(help: Option<&str>) -> String {
    match help {
        Some(help) => format!(
            "alexa-plug detected unknown error. Try {help}\n\
             If this keeps happening, please submit an issue with logs attached."
        ),
        None => "alexa-plug detected unknown error. Please submit an issue with logs attached."
            .to_owned(),
    }
}

impl Error {
    /// Shorthand for an [`UnknownState`](Self::UnknownState) with a hint.
    pub(crate) fn unknown_state_with(help: impl Into<String>) -> Self {
        Self::UnknownState {
            help: Some(help.into()),
        }
    }

    /// Returns `true` for topology or resolution failures.
    pub fn is_unknown_state(&self) -> bool {
        matches!(self, Self::UnknownState { .. })
    }

    /// Returns `true` if a fresh session cookie might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionRejected { .. })
    }

    /// Returns `true` if the error was raised before any network access.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::MissingRegion | Self::InvalidOption(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_includes_hint() {
        let err = Error::unknown_state_with("passing true on force parameter on getState");
        let msg = err.to_string();
        assert!(msg.contains("Try passing true on force parameter on getState"));
        assert!(err.is_unknown_state());
    }

    #[test]
    fn unknown_state_without_hint() {
        let msg = Error::UnknownState { help: None }.to_string();
        assert!(msg.starts_with("alexa-plug detected unknown error."));
        assert!(!msg.contains("Try"));
    }

    #[test]
    fn interaction_failed_prefixes_message() {
        let err = Error::InteractionFailed {
            message: "TargetOffline".into(),
        };
        assert_eq!(err.to_string(), "Interaction failed: TargetOffline");
    }
}
