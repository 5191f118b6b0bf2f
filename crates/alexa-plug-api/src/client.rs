// Top-level Alexa client
//
// Resolves the session (explicit config first, environment second), builds
// the transport, and owns the topology cache. Endpoint operations live in
// their own modules as inherent methods: device listing in `devices`,
// topology and entity resolution in `topology`, state control in `state`.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::session::{COOKIE_ENV, DOMAIN_ENV, LOG_ENV, Session, SessionConfig};
use crate::topology::TopologyCache;
use crate::transport::{NetworkRoute, RequestOptions, Transport, TransportConfig};

/// Async client for one Alexa account.
///
/// Cheaply cloneable; clones share the session, HTTP connection pool and
/// topology cache. Every [`Device`](crate::Device) it hands out holds a
/// clone.
#[derive(Debug, Clone)]
pub struct AlexaClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    session: Session,
    transport: Transport,
    topology: Arc<TopologyCache>,
}

impl AlexaClient {
    /// Build a client, falling back to the process environment for a
    /// missing cookie or domain.
    pub fn new(config: SessionConfig) -> Result<Self, Error> {
        Self::with_env(config, |key| std::env::var(key).ok())
    }

    /// Build a client with a custom environment lookup.
    ///
    /// Validation happens here, before any network access: the cookie
    /// first, then the domain, then the routing options.
    pub fn with_env(
        config: SessionConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let SessionConfig {
            cookie,
            amazon_domain,
            http_client,
            alexa_ip,
            endpoints,
            timeout,
            log_payloads,
            topology_cache,
        } = config;

        let cookie = match cookie {
            Some(cookie) => cookie,
            None => env(COOKIE_ENV)
                .map(SecretString::from)
                .ok_or(Error::Unauthenticated)?,
        };
        let amazon_domain = amazon_domain
            .or_else(|| env(DOMAIN_ENV))
            .ok_or(Error::MissingRegion)?;
        let route = NetworkRoute::from_options(http_client, alexa_ip)?;
        let log_payloads = log_payloads.unwrap_or_else(|| env(LOG_ENV).is_some());

        let session = Session::new(cookie, amazon_domain, endpoints, log_payloads);
        let http = TransportConfig { route, timeout }.build_client(&session.alexa_host())?;
        let transport = Transport::new(http, session.cookie.clone());

        debug!(
            domain = session.amazon_domain(),
            log_payloads, "alexa client ready"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                session,
                transport,
                topology: topology_cache.unwrap_or_default(),
            }),
        })
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    /// The topology cache this client reads and refreshes.
    pub fn topology_cache(&self) -> &Arc<TopologyCache> {
        &self.inner.topology
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `GET` a URL and decode its JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> Result<T, Error> {
        let resp = self.transport().send(url, RequestOptions::get()).await?;
        self.read_json(resp, operation).await
    }

    /// Send `payload` as a JSON body and decode the JSON response.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        payload: &impl Serialize,
        operation: &'static str,
    ) -> Result<T, Error> {
        let options = RequestOptions::json(method, payload)?;
        if self.session().log_payloads() {
            if let Some(body) = options.body.as_deref() {
                debug!(
                    target: crate::PAYLOAD_TARGET,
                    operation,
                    body = %String::from_utf8_lossy(body),
                    "request payload"
                );
            }
        }
        let resp = self.transport().send(url, options).await?;
        self.read_json(resp, operation).await
    }

    /// Reject a dead session, then decode the body.
    ///
    /// Other statuses are not interpreted: the vendor reports interaction
    /// failures inside the body, and anything else shows up as a decode error.
    async fn read_json<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, Error> {
        let status = resp.status();
        trace!(operation, %status, "response received");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::SessionRejected {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        self.log_payload(operation, &body);
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) fn log_payload(&self, operation: &str, body: &str) {
        if self.session().log_payloads() {
            debug!(target: crate::PAYLOAD_TARGET, operation, body, "response payload");
        }
    }
}
