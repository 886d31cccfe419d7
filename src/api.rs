// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-verb functions on a process-wide default session
//!
//! The default session keeps cookies in memory and publishes failed responses
//! to [`ErrorEvents::global`].

use std::sync::Arc;

use lazy_static::lazy_static;
use reqwest::Method;

use crate::error::{Error, Result};
use crate::http::{RequestBuilder, Session, SessionConfig};
use crate::network::{ErrorEvent, ErrorEvents, SubscriptionId};

lazy_static! {
    static ref DEFAULT_SESSION: std::result::Result<Session, String> =
        Session::with_config(SessionConfig::default())
            .map(|session| session.with_error_events(ErrorEvents::global()))
            .map_err(|e| e.to_string());
}

/// The process-wide session behind the free functions
pub fn default_session() -> Result<Session> {
    DEFAULT_SESSION.clone().map_err(Error::Config)
}

/// Start a request with an arbitrary method on the default session
pub fn request(method: Method, url: impl Into<String>) -> Result<RequestBuilder> {
    Ok(default_session()?.request(method, url))
}

/// Start a GET request on the default session
pub fn get(url: impl Into<String>) -> Result<RequestBuilder> {
    request(Method::GET, url)
}

/// Start a HEAD request on the default session
pub fn head(url: impl Into<String>) -> Result<RequestBuilder> {
    request(Method::HEAD, url)
}

/// Start a POST request on the default session
pub fn post(url: impl Into<String>) -> Result<RequestBuilder> {
    request(Method::POST, url)
}

/// Start a PUT request on the default session
pub fn put(url: impl Into<String>) -> Result<RequestBuilder> {
    request(Method::PUT, url)
}

/// Start a PATCH request on the default session
pub fn patch(url: impl Into<String>) -> Result<RequestBuilder> {
    request(Method::PATCH, url)
}

/// Start a DELETE request on the default session
pub fn delete(url: impl Into<String>) -> Result<RequestBuilder> {
    request(Method::DELETE, url)
}

/// Subscribe to failed responses of the default session
pub fn on_error<F>(callback: F) -> SubscriptionId
where
    F: Fn(&ErrorEvent) -> Result<()> + Send + Sync + 'static,
{
    ErrorEvents::global().subscribe(callback)
}

/// Registry the default session publishes to
pub fn error_events() -> Arc<ErrorEvents> {
    ErrorEvents::global()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_shares_global_events() {
        let session = default_session().unwrap();
        assert!(Arc::ptr_eq(session.error_events(), &error_events()));
    }

    #[tokio::test]
    async fn test_free_functions_validate_arguments() {
        let err = get("ftp://example.com").unwrap().send().await.unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
