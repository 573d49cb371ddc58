// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP client for the indexing pipeline.
//!
//! Posts each batch as a JSON array to one of the configured endpoints,
//! failing over to the next endpoint on connection errors and 5xx
//! responses. With credentials, a session is opened per endpoint origin
//! (`POST /api/session?realm=<realm>`) and its cookie is reused.

use crate::config::PipelineConfig;
use crate::document::{encode_batch, Document};
use crate::transport::{DeliveryError, PipelineTransport, TransportFactory};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Session credentials and the origins a session is open on.
struct SessionAuth {
    username: String,
    password: String,
    realm: String,
    open: HashSet<String>,
}

impl fmt::Debug for SessionAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .field("open", &self.open)
            .finish()
    }
}

impl SessionAuth {
    fn new(username: &str, password: &str, realm: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            realm: realm.to_string(),
            open: HashSet::new(),
        }
    }

    fn ensure_session(&mut self, http: &Client, endpoint: &Url) -> Result<(), DeliveryError> {
        let origin = endpoint.origin().ascii_serialization();
        if self.open.contains(&origin) {
            return Ok(());
        }

        let mut session_url = endpoint.join("/api/session").map_err(|e| {
            DeliveryError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })?;
        session_url
            .query_pairs_mut()
            .clear()
            .append_pair("realm", &self.realm);

        let body = serde_json::json!({
            "username": self.username,
            "password": self.password,
        });

        tracing::debug!("opening session on {} (realm {})", origin, self.realm);
        let resp = http
            .post(session_url)
            .json(&body)
            .send()
            .map_err(|e| DeliveryError::Http {
                endpoint: origin.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(DeliveryError::Auth {
                endpoint: origin,
                reason: format!("session request returned {}", resp.status()),
            });
        }

        self.open.insert(origin);
        Ok(())
    }

    fn invalidate(&mut self, endpoint: &Url) {
        self.open.remove(&endpoint.origin().ascii_serialization());
    }
}

/// Blocking HTTP transport to an indexing pipeline.
#[derive(Debug)]
pub struct PipelineClient {
    http: Client,
    endpoints: Vec<Url>,
    next: usize,
    auth: Option<SessionAuth>,
}

impl PipelineClient {
    /// Create a client for unauthenticated delivery.
    pub fn new(endpoints: &[String]) -> Result<Self, DeliveryError> {
        Self::build(endpoints, None, DEFAULT_TIMEOUT)
    }

    /// Create a client that authenticates with `username`/`password` in `realm`.
    pub fn authenticated(
        endpoints: &[String],
        username: &str,
        password: &str,
        realm: &str,
    ) -> Result<Self, DeliveryError> {
        Self::build(
            endpoints,
            Some(SessionAuth::new(username, password, realm)),
            DEFAULT_TIMEOUT,
        )
    }

    /// Create a client from run configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, DeliveryError> {
        let auth = config
            .credentials()
            .map(|c| SessionAuth::new(c.username, c.password, c.realm));
        Self::build(
            &config.endpoints,
            auth,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn build(
        endpoints: &[String],
        auth: Option<SessionAuth>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        if endpoints.is_empty() {
            return Err(DeliveryError::NoEndpoints);
        }
        let endpoints = endpoints
            .iter()
            .map(|e| {
                Url::parse(e).map_err(|err| DeliveryError::InvalidEndpoint {
                    endpoint: e.clone(),
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            http: http_client(timeout)?,
            endpoints,
            next: 0,
            auth,
        })
    }

    /// Start with endpoint `index` (modulo the endpoint count).
    pub fn starting_at(mut self, index: usize) -> Self {
        self.next = index % self.endpoints.len();
        self
    }

    /// Endpoint the next batch is sent to first.
    pub fn current_endpoint(&self) -> &Url {
        &self.endpoints[self.next]
    }

    fn send(&self, endpoint: &Url, body: &[u8]) -> Result<Response, DeliveryError> {
        self.http
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .map_err(|e| DeliveryError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })
    }

    fn post_to(&mut self, endpoint: &Url, body: &[u8]) -> Result<(), DeliveryError> {
        if let Some(auth) = self.auth.as_mut() {
            auth.ensure_session(&self.http, endpoint)?;
        }

        let mut resp = self.send(endpoint, body)?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            if let Some(auth) = self.auth.as_mut() {
                tracing::debug!("session on {} expired, re-authenticating", endpoint);
                auth.invalidate(endpoint);
                auth.ensure_session(&self.http, endpoint)?;
                resp = self.send(endpoint, body)?;
            }
        }

        check_status(endpoint, resp)
    }
}

impl PipelineTransport for PipelineClient {
    fn post_batch(&mut self, documents: &[Document]) -> Result<(), DeliveryError> {
        let body = encode_batch(documents)?;
        let count = self.endpoints.len();
        let mut last_err = DeliveryError::NoEndpoints;

        for attempt in 0..count {
            let idx = (self.next + attempt) % count;
            let endpoint = self.endpoints[idx].clone();

            match self.post_to(&endpoint, &body) {
                Ok(()) => {
                    tracing::trace!("posted {} documents to {}", documents.len(), endpoint);
                    self.next = idx;
                    return Ok(());
                }
                Err(e) if e.is_failover() => {
                    tracing::warn!("endpoint {} failed, trying next: {}", endpoint, e);
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err)
    }
}

fn http_client(timeout: Duration) -> Result<Client, DeliveryError> {
    Client::builder()
        .timeout(timeout)
        .cookie_store(true)
        .build()
        .map_err(DeliveryError::Client)
}

fn check_status(endpoint: &Url, resp: Response) -> Result<(), DeliveryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(DeliveryError::Auth {
            endpoint: endpoint.to_string(),
            reason: format!("{}: {}", status, body),
        });
    }
    Err(DeliveryError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Builds one [`PipelineClient`] per partition from shared configuration.
#[derive(Debug, Clone, Copy)]
pub struct HttpTransportFactory<'a> {
    config: &'a PipelineConfig,
}

impl<'a> HttpTransportFactory<'a> {
    /// Create a factory over `config`.
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for HttpTransportFactory<'_> {
    type Transport = PipelineClient;

    fn connect(&self, partition: usize) -> Result<PipelineClient, DeliveryError> {
        Ok(PipelineClient::from_config(self.config)?.starting_at(partition))
    }
}
