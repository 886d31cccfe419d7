// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Notification of failed responses

mod event;

pub use event::{ErrorCallback, ErrorEvent, ErrorEvents, SubscriberFailure, SubscriptionId};
