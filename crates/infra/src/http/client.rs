use std::fmt;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use indexpoll_core::{
    BodyReader, Method, RequestBody, Transport, TransportRequest, TransportResponse,
};
use indexpoll_domain::constants::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_URL, DEFAULT_USER_AGENT};
use indexpoll_domain::{ClientConfig, PollError, Result};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Body, Client as ReqwestClient, RequestBuilder};
use tokio_util::io::{ReaderStream, StreamReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::errors::{error_kind, InfraError};

/// [`Transport`] backed by a pooled reqwest client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Start building a new HTTP transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport for the default local endpoint.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Transport configured from the client section of a [`indexpoll_domain::Config`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        HttpTransportBuilder::from_config(config).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` below the base URL, keeping any base path prefix.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined =
            format!("{}/{}", url.path().trim_end_matches('/'), path.trim_start_matches('/'));
        url.set_path(&joined);
        url
    }

    fn prepare(&self, request: &mut TransportRequest) -> RequestBuilder {
        let url = self.endpoint(&request.path);
        let mut builder = self.client.request(to_reqwest_method(request.method), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                builder.basic_auth(username, password.as_ref())
            }
            Some(Credentials::ApiKey(key)) => {
                builder.header(AUTHORIZATION, format!("ApiKey {key}"))
            }
            None => builder,
        };

        match request.body.take() {
            Some(RequestBody::Buffered(bytes)) => builder.body(Body::from(bytes)),
            Some(RequestBody::Streaming(reader)) => {
                builder.body(Body::wrap_stream(ReaderStream::new(reader)))
            }
            None => builder,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &mut TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        let method = request.method;
        let path = request.path.clone();
        let builder = self.prepare(request);
        debug!(%method, %path, "sending HTTP request");

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(%method, %path, "HTTP request cancelled");
                return Err(PollError::Cancelled);
            }
            result = builder.send() => result.map_err(|err| {
                debug!(%method, %path, error = %err, kind = error_kind(&err), "HTTP request failed");
                PollError::from(InfraError::from(err))
            })?,
        };

        let status = response.status().as_u16();
        debug!(%method, %path, status, "received HTTP response");

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let stream = response.bytes_stream().map_err(io::Error::other);
        let body: BodyReader = Box::new(StreamReader::new(Box::pin(stream)));

        Ok(TransportResponse::new(status, headers, body))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    }
}

#[derive(Clone)]
enum Credentials {
    Basic { username: String, password: Option<String> },
    ApiKey(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).finish_non_exhaustive()
            }
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
        }
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
    default_headers: Option<HeaderMap>,
    credentials: Option<Credentials>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: None,
            credentials: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Builder seeded from configuration. An API key takes precedence over
    /// basic credentials, and a zero request timeout disables the limit.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Self::default().base_url(&config.url);

        builder.timeout = (config.request_timeout_ms > 0).then(|| config.request_timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(key) = &config.api_key {
            builder = builder.api_key(key);
        } else if let Some(username) = &config.username {
            builder = builder.basic_auth(username, config.password.clone());
        }

        builder
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout covering connect, send and the full body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some(Credentials::Basic { username: username.into(), password });
        self
    }

    /// Send `Authorization: ApiKey <key>` with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::ApiKey(key.into()));
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let base_url = Url::parse(&self.base_url).map_err(InfraError::from)?;
        if base_url.cannot_be_a_base() {
            return Err(PollError::Config(format!("invalid base URL: {}", self.base_url)));
        }

        let mut builder = ReqwestClient::builder().user_agent(self.user_agent).no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(InfraError::from)?;

        Ok(HttpTransport { client, base_url, credentials: self.credentials })
    }
}
