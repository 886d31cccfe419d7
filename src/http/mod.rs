// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for hostjar
//!
//! Request building, dispatch and response handling on top of reqwest, with
//! cookies persisted per host between calls.

mod client;
mod cookie;
mod request;
mod response;

pub use client::{RequestBuilder, Session, SessionConfig};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use request::{
    get_hostname, resolve_target, Body, BodyEncoding, PreparedRequest, QueryValue,
    RequestOptions, DEFAULT_TIMEOUT,
};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("hostjar/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
}
