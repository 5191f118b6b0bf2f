// Immutable per-client session state: cookie, region, and endpoint templates.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::Error;
use crate::topology::TopologyCache;

/// Skill id the smart-home entity listing is scoped to.
pub const SMARTHOME_SKILL_ID: &str = "amzn1.ask.1p.smarthome";

/// Environment variable consulted when no cookie is configured.
pub const COOKIE_ENV: &str = "ALEXA_SMARTPLUG_COOKIE";
/// Environment variable consulted when no Amazon domain is configured.
pub const DOMAIN_ENV: &str = "ALEXA_SMARTPLUG_AMAZON_DOMAIN";
/// When set (to anything), request and response payloads are logged.
pub const LOG_ENV: &str = "ALEXA_SMARTPLUG_ENABLE_LOG";

const DOMAIN_PLACEHOLDER: &str = "{AMAZON_DOMAIN}";
const SKILL_PLACEHOLDER: &str = "{SKILL_ID}";

/// URL templates for the three endpoints the client talks to.
///
/// `{AMAZON_DOMAIN}` and `{SKILL_ID}` are substituted when a URL is rendered.
/// The state endpoint serves both reads (POST) and writes (PUT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub entities: String,
    pub topology: String,
    pub state: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base("https://alexa.{AMAZON_DOMAIN}")
    }
}

impl Endpoints {
    /// Endpoint templates rooted at `base` instead of `https://alexa.{domain}`.
    ///
    /// Useful for self-hosted gateways and for pointing the client at a
    /// local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            entities: format!("{base}/api/behaviors/entities?skillId={SKILL_PLACEHOLDER}"),
            topology: format!("{base}/api/phoenix?includeRelationships=true"),
            state: format!("{base}/api/phoenix/state"),
        }
    }
}

/// Everything needed to build an [`AlexaClient`](crate::AlexaClient).
///
/// `cookie` and `amazon_domain` fall back to [`COOKIE_ENV`] / [`DOMAIN_ENV`]
/// when left as `None`. `http_client` and `alexa_ip` are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub cookie: Option<SecretString>,
    pub amazon_domain: Option<String>,
    /// Pre-built HTTP client used as-is for every request.
    pub http_client: Option<reqwest::Client>,
    /// Force `alexa.{amazon_domain}` to resolve to this address.
    pub alexa_ip: Option<IpAddr>,
    pub endpoints: Endpoints,
    pub timeout: Option<Duration>,
    /// Log every payload at debug level. `None` defers to [`LOG_ENV`].
    pub log_payloads: Option<bool>,
    /// Share a topology cache with other clients. Each client gets its own
    /// cache when `None`.
    pub topology_cache: Option<Arc<TopologyCache>>,
}

/// Resolved, immutable session data shared by a client and its devices.
#[derive(Debug)]
pub struct Session {
    pub(crate) cookie: SecretString,
    amazon_domain: String,
    endpoints: Endpoints,
    log_payloads: bool,
}

impl Session {
    pub(crate) fn new(
        cookie: SecretString,
        amazon_domain: String,
        endpoints: Endpoints,
        log_payloads: bool,
    ) -> Self {
        Self {
            cookie,
            amazon_domain,
            endpoints,
            log_payloads,
        }
    }

    /// The account's Amazon domain (e.g. `amazon.co.jp`).
    pub fn amazon_domain(&self) -> &str {
        &self.amazon_domain
    }

    /// Regional Alexa host, `alexa.{amazon_domain}`.
    pub fn alexa_host(&self) -> String {
        format!("alexa.{}", self.amazon_domain)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn log_payloads(&self) -> bool {
        self.log_payloads
    }

    /// `GET`: every smart-home entity on the account.
    pub fn entities_url(&self) -> Result<Url, Error> {
        self.render(&self.endpoints.entities)
    }

    /// `GET`: network detail (locations, bridges, appliances).
    pub fn topology_url(&self) -> Result<Url, Error> {
        self.render(&self.endpoints.topology)
    }

    /// `POST` to read, `PUT` to write appliance state.
    pub fn state_url(&self) -> Result<Url, Error> {
        self.render(&self.endpoints.state)
    }

    fn render(&self, template: &str) -> Result<Url, Error> {
        let url = template
            .replace(DOMAIN_PLACEHOLDER, &self.amazon_domain)
            .replace(SKILL_PLACEHOLDER, SMARTHOME_SKILL_ID);
        Ok(Url::parse(&url)?)
    }
}
