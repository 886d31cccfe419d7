// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # hostjar - HTTP with per-host cookie sessions
//!
//! A thin request layer over reqwest that remembers cookies per host. Every
//! `Set-Cookie` a host sends is stored and sent back on later requests to the
//! same host, so callers never handle cookies themselves.
//!
//! ## Features
//!
//! - Per-verb builders: GET, HEAD, POST, PUT, PATCH, DELETE
//! - Query parameters with repeated values, port override
//! - JSON, form-urlencoded and plain-text bodies
//! - Per-call timeout covering send and body download
//! - Pluggable cookie storage (in-memory, directory of JSON files, or your own)
//! - Error events: 4xx/5xx responses are returned *and* published to observers
//!
//! ## Example
//!
//! ```rust,no_run
//! use hostjar::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new()?;
//!
//!     session.on_error(|event| {
//!         eprintln!("{} failed with {}", event.hostname, event.response.status);
//!         Ok(())
//!     });
//!
//!     // Any Set-Cookie from the login is stored for example.com ...
//!     session
//!         .post("https://example.com/login")
//!         .json(&serde_json::json!({"user": "kalle", "password": "hunter2"}))?
//!         .send()
//!         .await?;
//!
//!     // ... and sent back here
//!     let profile = session
//!         .get("https://example.com/profile")
//!         .query("fields", vec!["name", "email"])
//!         .send()
//!         .await?;
//!     println!("{}", profile.text_lossy());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod network;
pub mod store;

// Re-exports for convenience

// Default session
pub use api::{default_session, delete, get, head, on_error, patch, post, put, request};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{
    get_hostname, Body, BodyEncoding, Cookie, CookieJar, PreparedRequest, QueryValue,
    RequestBuilder, RequestOptions, Response, SameSite, Session, SessionConfig,
};

// Error events
pub use network::{ErrorEvent, ErrorEvents, SubscriberFailure, SubscriptionId};

// Storage
pub use store::{storage_key, CookieStore, FileStore, KeyValueStore, MemoryStore};

// Transport types that appear in the public API
pub use reqwest::{Method, StatusCode};

/// hostjar version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
