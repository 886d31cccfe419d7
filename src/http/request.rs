// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request options and the fully-resolved outbound request
//!
//! [`RequestOptions`] is what a caller asks for. [`PreparedRequest::build`] turns
//! it, together with the host's cookie jar, into the exact method/URI/headers/body
//! handed to the transport. Every argument error surfaces here, before any I/O.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::cookie::CookieJar;
use crate::error::{Error, Result};

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a request body is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    #[default]
    FormUrlEncoded,
    /// `text/plain`
    PlainText,
}

impl BodyEncoding {
    /// Content type sent for this encoding
    pub fn content_type(&self) -> &'static str {
        match self {
            BodyEncoding::Json => "application/json",
            BodyEncoding::FormUrlEncoded => "application/x-www-form-urlencoded",
            BodyEncoding::PlainText => "text/plain",
        }
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// No body
    #[default]
    Empty,
    /// Already-encoded text, sent verbatim
    Raw(String),
    /// Structured value, encoded according to [`BodyEncoding`]
    Structured(Value),
}

impl Body {
    /// Check if there is no body
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Encode to the wire string
    pub fn encode(&self, encoding: BodyEncoding) -> Result<Option<String>> {
        let value = match self {
            Body::Empty => return Ok(None),
            Body::Raw(text) => return Ok(Some(text.clone())),
            Body::Structured(value) => value,
        };

        let encoded = match encoding {
            BodyEncoding::Json => serde_json::to_string(value)?,
            BodyEncoding::FormUrlEncoded => encode_form(value)?,
            BodyEncoding::PlainText => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        };
        Ok(Some(encoded))
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Raw(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Raw(s)
    }
}

impl From<Value> for Body {
    fn from(v: Value) -> Self {
        Body::Structured(v)
    }
}

/// Stringify a JSON scalar the way it appears in a query or form
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode_form(value: &Value) -> Result<String> {
    let map = value.as_object().ok_or_else(|| {
        Error::invalid_argument("form-encoded body must be a JSON object of key/value pairs")
    })?;

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    serializer.append_pair(key, &scalar_to_string(item));
                }
            }
            other => {
                serializer.append_pair(key, &scalar_to_string(other));
            }
        }
    }
    Ok(serializer.finish())
}

/// Query parameter value: one value or a repeated parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `key=value`
    Single(String),
    /// `key=a&key=b`
    Many(Vec<String>),
}

macro_rules! query_value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(v: $t) -> Self {
                    QueryValue::Single(v.to_string())
                }
            }
        )*
    };
}

query_value_from_scalar!(&str, String, bool, i32, i64, u16, u32, u64, usize, f32, f64);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::Many(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::Many(values.iter().map(ToString::to_string).collect())
    }
}

/// Everything a caller can ask of a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Extra headers; these win over the injected cookie header
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL
    pub query: Vec<(String, QueryValue)>,
    /// Port override
    pub port: Option<u16>,
    /// Request body
    pub body: Body,
    /// JSON body; mutually exclusive with `body`
    pub json: Option<Value>,
    /// Body encoding (forced to JSON when `json` is set)
    pub body_encoding: BodyEncoding,
    /// Per-call timeout
    pub timeout: Duration,
    /// Store `Set-Cookie` values from the response
    pub persist_cookies: bool,
    /// Verify TLS certificates
    pub verify: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            query: Vec::new(),
            port: None,
            body: Body::Empty,
            json: None,
            body_encoding: BodyEncoding::default(),
            timeout: DEFAULT_TIMEOUT,
            persist_cookies: true,
            verify: true,
        }
    }
}

impl RequestOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Override the URL port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body
    pub fn json(mut self, value: Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Set the body encoding
    pub fn body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.body_encoding = encoding;
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable cookie persistence for this call
    pub fn persist_cookies(mut self, persist: bool) -> Self {
        self.persist_cookies = persist;
        self
    }

    /// Enable or disable TLS verification for this call
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Reject option combinations that can never be sent
    pub fn validate(&self) -> Result<()> {
        if !self.body.is_empty() && self.json.is_some() {
            return Err(Error::invalid_argument(
                "body and json are mutually exclusive",
            ));
        }
        Ok(())
    }
}

/// Parse a URL and check its scheme; returns the URL and its hostname.
pub fn resolve_target(url: &str) -> Result<(Url, String)> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::invalid_argument(format!(
                "unsupported URL scheme '{}', expected http or https",
                other
            )))
        }
    }
    let hostname = parsed
        .host_str()
        .ok_or_else(|| Error::invalid_argument(format!("URL has no host: {}", url)))?
        .to_string();
    Ok((parsed, hostname))
}

/// Hostname a URL's cookies are stored under
pub fn get_hostname(url: &str) -> Result<String> {
    resolve_target(url).map(|(_, host)| host)
}

/// Fully-resolved request handed to the transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Request method
    pub method: Method,
    /// Target URI including query and port override
    pub url: Url,
    /// Hostname cookies are read from and written to
    pub hostname: String,
    /// Final headers, including the cookie header
    pub headers: HeaderMap,
    /// Encoded body
    pub body: Option<String>,
    /// Encoding the body was produced with
    pub body_encoding: BodyEncoding,
}

impl PreparedRequest {
    /// Build the outbound request from options and the host's stored cookies
    pub fn build(
        method: Method,
        url: Url,
        hostname: String,
        options: &RequestOptions,
        cookies: &CookieJar,
    ) -> Result<Self> {
        options.validate()?;

        let mut headers = HeaderMap::new();
        if !cookies.is_empty() {
            headers.insert(COOKIE, header_value(&cookies.serialize())?);
        }
        for (name, value) in &options.headers {
            let name = HeaderName::try_from(name.as_str()).map_err(|e| {
                Error::invalid_argument(format!("invalid header name '{}': {}", name, e))
            })?;
            headers.insert(name, header_value(value)?);
        }

        let mut url = url;
        if !options.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &options.query {
                match value {
                    QueryValue::Single(v) => {
                        pairs.append_pair(key, v);
                    }
                    QueryValue::Many(values) => {
                        for v in values {
                            pairs.append_pair(key, v);
                        }
                    }
                }
            }
        }

        if let Some(port) = options.port {
            url.set_port(Some(port))
                .map_err(|_| Error::invalid_argument(format!("cannot set port on {}", url)))?;
        }

        let (body, body_encoding) = match &options.json {
            Some(json) => (Body::Structured(json.clone()), BodyEncoding::Json),
            None => (options.body.clone(), options.body_encoding),
        };

        let body = body.encode(body_encoding)?;
        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(body_encoding.content_type()),
            );
        }

        Ok(Self {
            method,
            url,
            hostname,
            headers,
            body,
            body_encoding,
        })
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| Error::invalid_argument(format!("invalid header value: {}", e)))
}

/// Serialize any value into a JSON body
pub fn to_json_value<T: Serialize>(data: &T) -> Result<Value> {
    serde_json::to_value(data).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(url: &str, options: RequestOptions, jar: &CookieJar) -> Result<PreparedRequest> {
        let (url, host) = resolve_target(url)?;
        PreparedRequest::build(Method::POST, url, host, &options, jar)
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = resolve_target("ftp://example.com/file").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_hostname_excludes_scheme_port_path() {
        assert_eq!(
            get_hostname("https://api.example.com:8443/v1/users?x=1").unwrap(),
            "api.example.com"
        );
    }

    #[test]
    fn test_body_and_json_conflict() {
        let options = RequestOptions::new().body("a=1").json(json!({"a": 1}));
        let err = build("https://example.com", options, &CookieJar::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_cookie_header_injected() {
        let jar = CookieJar::parse_cookies_string("sid=abc123, theme=dark");
        let req = build("https://example.com", RequestOptions::new(), &jar).unwrap();
        assert_eq!(req.header("cookie"), Some("sid=abc123; theme=dark"));
    }

    #[test]
    fn test_no_cookie_header_for_empty_jar() {
        let req = build("https://example.com", RequestOptions::new(), &CookieJar::new()).unwrap();
        assert!(req.header("cookie").is_none());
    }

    #[test]
    fn test_caller_cookie_header_wins() {
        let jar = CookieJar::parse_cookies_string("sid=stored");
        let options = RequestOptions::new().header("Cookie", "sid=manual");
        let req = build("https://example.com", options, &jar).unwrap();
        assert_eq!(req.header("cookie"), Some("sid=manual"));
    }

    #[test]
    fn test_caller_content_type_wins() {
        let options = RequestOptions::new()
            .header("Content-Type", "text/custom")
            .json(json!({"a": 1}));
        let req = build("https://example.com", options, &CookieJar::new()).unwrap();

        assert_eq!(req.header("content-type"), Some("text/custom"));
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_query_sequences_repeat() {
        let options = RequestOptions::new()
            .query("tag", vec!["a", "b"])
            .query("q", 1);
        let req = build("https://example.com/search", options, &CookieJar::new()).unwrap();

        let pairs: Vec<(String, String)> = req.url.query_pairs().into_owned().collect();
        let tags: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| k == "tag")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(pairs.iter().filter(|(k, v)| k == "q" && v == "1").count(), 1);
    }

    #[test]
    fn test_query_appends_to_existing() {
        let options = RequestOptions::new().query("page", 2);
        let req = build("https://example.com/list?sort=asc", options, &CookieJar::new()).unwrap();
        assert_eq!(req.url.query(), Some("sort=asc&page=2"));
    }

    #[test]
    fn test_port_override() {
        let options = RequestOptions::new().port(8080);
        let req = build("http://example.com/path", options, &CookieJar::new()).unwrap();
        assert_eq!(req.url.as_str(), "http://example.com:8080/path");
        assert_eq!(req.hostname, "example.com");
    }

    #[test]
    fn test_json_forces_json_encoding() {
        let options = RequestOptions::new()
            .body_encoding(BodyEncoding::PlainText)
            .json(json!({"name": "kalle"}));
        let req = build("https://example.com", options, &CookieJar::new()).unwrap();

        assert_eq!(req.body_encoding, BodyEncoding::Json);
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_form_encoding_default() {
        let options = RequestOptions::new().body(json!({"user": "a b", "ids": [1, 2]}));
        let req = build("https://example.com", options, &CookieJar::new()).unwrap();

        assert_eq!(
            req.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(req.body.as_deref(), Some("ids=1&ids=2&user=a+b"));
    }

    #[test]
    fn test_form_body_must_be_object() {
        let options = RequestOptions::new().body(json!([1, 2, 3]));
        let err = build("https://example.com", options, &CookieJar::new()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_plain_text_passthrough() {
        let options = RequestOptions::new()
            .body("hello there")
            .body_encoding(BodyEncoding::PlainText);
        let req = build("https://example.com", options, &CookieJar::new()).unwrap();

        assert_eq!(req.body.as_deref(), Some("hello there"));
        assert_eq!(req.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_no_body_no_content_type() {
        let req = build("https://example.com", RequestOptions::new(), &CookieJar::new()).unwrap();
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let options = RequestOptions::new().header("bad header", "x");
        assert!(build("https://example.com", options, &CookieJar::new())
            .unwrap_err()
            .is_invalid_argument());
    }
}
