// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error events for failed responses
//!
//! Every response whose status signals failure is published to an
//! [`ErrorEvents`] registry. Subscribers are called synchronously, in the order
//! they subscribed, against a snapshot taken when publishing starts; a callback
//! may therefore subscribe or unsubscribe without deadlocking. A failing
//! subscriber does not stop the ones after it: each failure is logged and
//! returned from [`ErrorEvents::publish`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use reqwest::Method;

use crate::error::{Error, Result};
use crate::http::Response;

lazy_static! {
    static ref GLOBAL_EVENTS: Arc<ErrorEvents> = Arc::new(ErrorEvents::new());
}

/// A failed response, as seen by subscribers
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    /// Method of the originating request
    pub method: Method,
    /// Hostname of the originating request
    pub hostname: String,
    /// The response, unchanged
    pub response: Response,
}

/// Subscriber callback
pub type ErrorCallback = Arc<dyn Fn(&ErrorEvent) -> Result<()> + Send + Sync>;

/// Handle returned by [`ErrorEvents::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A subscriber that returned an error during publish
#[derive(Debug)]
pub struct SubscriberFailure {
    /// Which subscriber failed
    pub id: SubscriptionId,
    /// What it returned
    pub error: Error,
}

/// Observer registry for failed responses
pub struct ErrorEvents {
    subscribers: RwLock<Vec<(SubscriptionId, ErrorCallback)>>,
    next_id: AtomicU64,
}

impl ErrorEvents {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Process-wide registry, used by the default session
    pub fn global() -> Arc<ErrorEvents> {
        Arc::clone(&GLOBAL_EVENTS)
    }

    /// Register a callback; it is called after every earlier subscriber
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ErrorEvent) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Call every subscriber with `event`
    pub fn publish(&self, event: &ErrorEvent) -> Vec<SubscriberFailure> {
        let snapshot: Vec<(SubscriptionId, ErrorCallback)> = self.subscribers.read().clone();

        let mut failures = Vec::new();
        for (id, callback) in snapshot {
            if let Err(error) = callback(event) {
                tracing::warn!(
                    subscriber = id.0,
                    hostname = %event.hostname,
                    status = %event.response.status,
                    error = %error,
                    "Error event subscriber failed"
                );
                failures.push(SubscriberFailure { id, error });
            }
        }
        failures
    }
}

impl Default for ErrorEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
