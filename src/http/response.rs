// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Materialized HTTP response

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

/// HTTP response with its body fully read into memory
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            response_time_ms,
        }
    }

    /// Status signals failure (4xx or 5xx)
    pub fn has_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    /// Check if status is success (2xx)
    pub fn success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn an error status into [`Error::HttpStatus`]
    pub fn raise_for_status(&self) -> Result<()> {
        if self.has_error() {
            return Err(Error::HttpStatus {
                status: self.status_code(),
                url: self.url.to_string(),
            });
        }
        Ok(())
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all("set-cookie")
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, SET_COOKIE};

    fn response(status: StatusCode, body: &'static str) -> Response {
        Response::new(
            status,
            HeaderMap::new(),
            Bytes::from(body),
            Url::parse("https://example.com").unwrap(),
            12,
        )
    }

    #[test]
    fn test_response_status() {
        let resp = response(StatusCode::OK, "");
        assert!(resp.success());
        assert!(!resp.has_error());
        assert!(resp.raise_for_status().is_ok());
        assert_eq!(resp.status_code(), 200);
    }

    #[test]
    fn test_error_statuses() {
        assert!(response(StatusCode::NOT_FOUND, "").has_error());
        assert!(response(StatusCode::BAD_GATEWAY, "").has_error());
        assert!(!response(StatusCode::FOUND, "").has_error());

        let err = response(StatusCode::FORBIDDEN, "").raise_for_status().unwrap_err();
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_response_body() {
        let resp = response(StatusCode::OK, r#"{"ok":true}"#);
        assert_eq!(resp.text().unwrap(), r#"{"ok":true}"#);

        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_set_cookie_headers() {
        let mut resp = response(StatusCode::OK, "");
        resp.headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        resp.headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));

        assert_eq!(resp.set_cookies(), vec!["a=1", "b=2"]);
    }
}
