// HTTP transport for the Alexa web API.
//
// Every request carries the mobile-bridge User-Agent the vendor expects and
// the session cookie. Network routing (system DNS, a forced gateway IP, or a
// caller-supplied client) is decided once when the client is built.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// `User-Agent` the Alexa API requires before it will answer.
pub const USER_AGENT_SIGNATURE: &str = "PitanguiBridge/2.2.479076.0-[PLATFORM=Android][MANUFACTURER=][RELEASE=10][BRAND=][SDK=29][MODEL=]";

/// How outbound connections reach the Alexa host.
#[derive(Debug, Clone, Default)]
pub enum NetworkRoute {
    /// Resolve every host through the system resolver.
    #[default]
    System,
    /// Answer DNS for the regional Alexa host with this address. Every other
    /// host still goes through the system resolver.
    ForcedIp(IpAddr),
    /// A caller-built client, used as-is.
    Client(reqwest::Client),
}

impl NetworkRoute {
    /// Combine the two optional routing overrides into a single route.
    ///
    /// A custom client and a forced IP cannot be combined: the forced IP
    /// only works by building the client ourselves.
    pub fn from_options(client: Option<reqwest::Client>, ip: Option<IpAddr>) -> Result<Self, Error> {
        match (client, ip) {
            (Some(_), Some(_)) => Err(Error::InvalidOption(
                "cannot specify both a custom HTTP client and an Alexa IP on the same session"
                    .into(),
            )),
            (Some(client), None) => Ok(Self::Client(client)),
            (None, Some(ip)) => Ok(Self::ForcedIp(ip)),
            (None, None) => Ok(Self::System),
        }
    }
}

/// Settings for building the underlying `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub route: NetworkRoute,
    /// Whole-request timeout. `None` leaves reqwest's default (no timeout).
    /// Ignored for [`NetworkRoute::Client`].
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Build a `reqwest::Client` for talking to `alexa_host`.
    pub fn build_client(&self, alexa_host: &str) -> Result<reqwest::Client, Error> {
        let mut builder = match &self.route {
            NetworkRoute::Client(client) => return Ok(client.clone()),
            NetworkRoute::System => reqwest::Client::builder(),
            // Port 0 keeps whatever port the URL (or its scheme) implies.
            NetworkRoute::ForcedIp(ip) => {
                debug!(host = alexa_host, %ip, "forcing DNS resolution for Alexa host");
                reqwest::Client::builder().resolve(alexa_host, SocketAddr::new(*ip, 0))
            }
        };

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

/// Caller-supplied request settings, merged with the session's headers on send.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// A request carrying `payload` as a JSON body.
    pub fn json(method: Method, payload: &impl Serialize) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            method,
            headers,
            body: Some(serde_json::to_vec(payload)?),
        })
    }
}

/// Sends authenticated requests with the session cookie attached.
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    cookie: SecretString,
}

impl Transport {
    pub fn new(http: reqwest::Client, cookie: SecretString) -> Self {
        Self { http, cookie }
    }

    /// Send a request and return the raw response.
    ///
    /// No retries and no status interpretation; callers decide what a
    /// non-success status means.
    pub async fn send(&self, url: Url, options: RequestOptions) -> Result<reqwest::Response, Error> {
        let RequestOptions {
            method,
            mut headers,
            body,
        } = options;

        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_SIGNATURE));
        let cookie = merge_cookie(headers.get(COOKIE), self.cookie.expose_secret())?;
        headers.insert(COOKIE, cookie);

        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        Ok(builder.send().await?)
    }
}

/// Append the session cookie to whatever cookie the caller already set.
fn merge_cookie(existing: Option<&HeaderValue>, session: &str) -> Result<HeaderValue, Error> {
    let merged = match existing {
        Some(existing) => {
            let mut bytes = existing.as_bytes().to_vec();
            bytes.extend_from_slice(b"; ");
            bytes.extend_from_slice(session.as_bytes());
            bytes
        }
        None => session.as_bytes().to_vec(),
    };

    let mut value = HeaderValue::from_bytes(&merged).map_err(|_| {
        Error::InvalidOption("session cookie contains characters not allowed in a header".into())
    })?;
    value.set_sensitive(true);
    Ok(value)
}
