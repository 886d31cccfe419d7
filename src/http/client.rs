// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session: request dispatch with per-host cookie persistence

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;

use super::cookie::{Cookie, CookieJar};
use super::request::{
    resolve_target, to_json_value, Body, BodyEncoding, PreparedRequest, QueryValue,
    RequestOptions, DEFAULT_TIMEOUT,
};
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};
use crate::network::{ErrorEvent, ErrorEvents, SubscriptionId};
use crate::store::CookieStore;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// User agent string
    pub user_agent: String,
    /// Default per-call timeout
    pub timeout: Duration,
    /// Maximum redirects the transport follows
    pub max_redirects: usize,
    /// Headers sent with every request (request headers override them)
    pub default_headers: HeaderMap,
    /// Default for storing response cookies
    pub persist_cookies: bool,
    /// Default body encoding
    pub body_encoding: BodyEncoding,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: 10,
            default_headers: HeaderMap::new(),
            persist_cookies: true,
            body_encoding: BodyEncoding::default(),
            proxy: None,
        }
    }
}

impl SessionConfig {
    /// Create a new session config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set default timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set default headers
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// Set cookie persistence default
    pub fn persist_cookies(mut self, persist: bool) -> Self {
        self.persist_cookies = persist;
        self
    }

    /// Set default body encoding
    pub fn body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.body_encoding = encoding;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    fn build_client(&self, accept_invalid_certs: bool) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .redirect(Policy::limited(self.max_redirects))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .default_headers(self.default_headers.clone());

        if let Some(ref proxy_url) = self.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(builder.build()?)
    }
}

/// HTTP session with per-host cookie persistence
///
/// Cookies received from a host are stored in the session's [`CookieStore`] and
/// sent back on every later request to that host. Responses with a 4xx/5xx
/// status are returned normally and also published to the session's
/// [`ErrorEvents`]. Subscriber failures during that publish are logged at
/// `warn` and not reported to the caller of `send`; call
/// [`ErrorEvents::publish`] directly to collect them.
#[derive(Clone, Debug)]
pub struct Session {
    client: Client,
    /// Used only for requests with `verify(false)`
    insecure_client: Client,
    config: SessionConfig,
    cookies: CookieStore,
    events: Arc<ErrorEvents>,
}

impl Session {
    /// Create a session with default configuration and in-memory cookies
    pub fn new() -> Result<Self> {
        Self::with_config(SessionConfig::default())
    }

    /// Create a session with custom configuration and in-memory cookies
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        Ok(Self {
            client: config.build_client(false)?,
            insecure_client: config.build_client(true)?,
            config,
            cookies: CookieStore::in_memory(),
            events: Arc::new(ErrorEvents::new()),
        })
    }

    /// Use a different cookie store
    pub fn with_cookie_store(mut self, cookies: CookieStore) -> Self {
        self.cookies = cookies;
        self
    }

    /// Publish failed responses to a shared registry
    pub fn with_error_events(mut self, events: Arc<ErrorEvents>) -> Self {
        self.events = events;
        self
    }

    /// Get session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the cookie store
    pub fn cookie_store(&self) -> &CookieStore {
        &self.cookies
    }

    /// Get the error event registry
    pub fn error_events(&self) -> &Arc<ErrorEvents> {
        &self.events
    }

    /// Subscribe to failed responses
    pub fn on_error<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ErrorEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Options a new request starts from
    pub fn default_options(&self) -> RequestOptions {
        RequestOptions {
            timeout: self.config.timeout,
            persist_cookies: self.config.persist_cookies,
            body_encoding: self.config.body_encoding,
            ..RequestOptions::default()
        }
    }

    /// Start a request with an arbitrary method
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            session: self.clone(),
            method,
            url: url.into(),
            options: self.default_options(),
        }
    }

    /// Start a GET request
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Start a HEAD request
    pub fn head(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    /// Start a POST request
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Start a PUT request
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    /// Start a PATCH request
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    /// Start a DELETE request
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Build, dispatch and post-process one request
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let prepared = self.prepare(method, url, &options).await?;
        let response = self.dispatch(&prepared, &options).await?;
        self.post_process(&prepared, response, options.persist_cookies)
            .await
    }

    /// Resolve a request against the host's stored cookies without sending it
    pub async fn prepare(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<PreparedRequest> {
        let (target, hostname) = resolve_target(url)?;
        options.validate()?;
        let mut jar = self.cookies.get(&hostname).await?;
        jar.purge_expired();
        PreparedRequest::build(method, target, hostname, options, &jar)
    }

    /// Send a prepared request and read the whole body, bounded by the timeout
    async fn dispatch(
        &self,
        request: &PreparedRequest,
        options: &RequestOptions,
    ) -> Result<Response> {
        if !options.verify {
            tracing::warn!(url = %request.url, "TLS certificate verification disabled for request");
        }
        let client = self.client_for(options.verify);

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(method = %request.method, url = %request.url, "Request");

        let start = Instant::now();
        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let final_url = response.url().clone();

            let mut body = BytesMut::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                body.extend_from_slice(&chunk?);
            }

            Ok::<_, Error>(Response::new(
                status,
                headers,
                body.freeze(),
                final_url,
                start.elapsed().as_millis() as u64,
            ))
        };

        match tokio::time::timeout(options.timeout, exchange).await {
            Ok(result) => {
                let response = result?;
                tracing::debug!(
                    url = %request.url,
                    status = %response.status,
                    time_ms = response.response_time_ms,
                    "Response"
                );
                Ok(response)
            }
            Err(_) => {
                tracing::debug!(url = %request.url, timeout = ?options.timeout, "Request timed out");
                Err(Error::timeout_with_url(
                    format!("{} {}", request.method, request.hostname),
                    options.timeout.as_millis() as u64,
                    request.url.as_str(),
                ))
            }
        }
    }

    fn client_for(&self, verify: bool) -> &Client {
        if verify {
            &self.client
        } else {
            &self.insecure_client
        }
    }

    /// Store received cookies and announce error responses
    ///
    /// The error event is published even when the cookie write fails; the
    /// storage error is returned afterwards.
    async fn post_process(
        &self,
        request: &PreparedRequest,
        response: Response,
        persist_cookies: bool,
    ) -> Result<Response> {
        let stored = if persist_cookies {
            self.store_received_cookies(&request.hostname, &response).await
        } else {
            Ok(())
        };

        if response.has_error() {
            let event = ErrorEvent {
                method: request.method.clone(),
                hostname: request.hostname.clone(),
                response: response.clone(),
            };
            self.events.publish(&event);
        }

        stored?;
        Ok(response)
    }

    async fn store_received_cookies(&self, hostname: &str, response: &Response) -> Result<()> {
        let received = response
            .set_cookies()
            .into_iter()
            .map(CookieJar::parse_cookies_string)
            .fold(CookieJar::new(), |mut jar, parsed| {
                jar.merge(parsed);
                jar
            });

        if received.is_empty() {
            return Ok(());
        }

        let mut stored = self.cookies.get(hostname).await?;
        stored.merge(received);
        stored.purge_expired();
        self.cookies.set(hostname, &stored).await
    }

    /// Cookies stored for a hostname
    pub async fn get_stored_cookies(&self, hostname: &str) -> Result<CookieJar> {
        self.cookies.get(hostname).await
    }

    /// Replace the cookies stored for a hostname
    pub async fn set_stored_cookies(&self, hostname: &str, jar: &CookieJar) -> Result<()> {
        self.cookies.set(hostname, jar).await
    }

    /// Forget the cookies stored for a hostname
    pub async fn clear_stored_cookies(&self, hostname: &str) -> Result<()> {
        self.cookies.clear(hostname).await
    }

    /// Add or replace one stored cookie
    pub async fn add_cookie(
        &self,
        hostname: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let mut jar = self.cookies.get(hostname).await?;
        jar.insert(Cookie::new(name, value));
        self.cookies.set(hostname, &jar).await
    }
}

/// Builder for one request on a session
#[derive(Debug)]
pub struct RequestBuilder {
    session: Session,
    method: Method,
    url: String,
    options: RequestOptions,
}

impl RequestBuilder {
    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options = self.options.header(name, value);
        self
    }

    /// Set multiple headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.options = self.options.header(name, value);
        }
        self
    }

    /// Add a query parameter; a sequence value repeats the parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.options = self.options.query(key, value);
        self
    }

    /// Override the URL port
    pub fn port(mut self, port: u16) -> Self {
        self.options = self.options.port(port);
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.options = self.options.body(body);
        self
    }

    /// Set a JSON body from any serializable value
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.options = self.options.json(to_json_value(data)?);
        Ok(self)
    }

    /// Set a JSON body from a value
    pub fn json_value(mut self, value: Value) -> Self {
        self.options = self.options.json(value);
        self
    }

    /// Set a form-encoded body from any serializable map
    pub fn form<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.options = self
            .options
            .body(Body::Structured(to_json_value(data)?))
            .body_encoding(BodyEncoding::FormUrlEncoded);
        Ok(self)
    }

    /// Set the body encoding
    pub fn body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.options = self.options.body_encoding(encoding);
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.timeout(timeout);
        self
    }

    /// Enable or disable cookie persistence for this call
    pub fn persist_cookies(mut self, persist: bool) -> Self {
        self.options = self.options.persist_cookies(persist);
        self
    }

    /// Enable or disable TLS certificate verification for this call
    ///
    /// `false` accepts any certificate, including self-signed and expired ones.
    pub fn verify(mut self, verify: bool) -> Self {
        self.options = self.options.verify(verify);
        self
    }

    /// Replace all options
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve without sending
    pub async fn prepare(&self) -> Result<PreparedRequest> {
        self.session
            .prepare(self.method.clone(), &self.url, &self.options)
            .await
    }

    /// Execute the request
    pub async fn send(self) -> Result<Response> {
        self.session
            .execute(self.method, &self.url, self.options)
            .await
    }
}
