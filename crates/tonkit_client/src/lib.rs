//! # Tonkit Client
//!
//! Request/response orchestration over an opaque TON node engine.
//!
//! The engine (tonlibjson or a stand-in) consumes JSON requests and produces
//! JSON records out of order, interleaved with unsolicited notifications.
//! This crate provides:
//! - [`NodeEngine`], the engine boundary trait, with [`MockEngine`] for tests
//! - A bounded receive loop with the engine's conventional timing
//!   (4.5 s per attempt, 10 attempts, 1 s between empty attempts)
//! - In-place servicing of `updateSyncState` (a full sync round) and
//!   `updateSendLiteServerQuery` (handed to a [`LiteQueryHandler`]) while a
//!   caller waits for a reply
//! - [`TonClient`], the handle tying it together
//!
//! ## Key Invariants
//!
//! - One request is in flight per handle; callers serialize on an internal
//!   lock
//! - Replies come back exactly as received; `error` records are replies
//! - The receive budget is never exceeded, sync waits included
//! - Sync rounds within one request are bounded by configuration
//! - The engine is closed exactly once, at the latest on drop
//!
//! ## Usage
//!
//! ```
//! use serde_json::json;
//! use tonkit_client::{ClientConfig, MockEngine, TonClient};
//!
//! let engine = MockEngine::new();
//! engine.push_record(r#"{"@type":"ok"}"#);
//!
//! let client = TonClient::init(ClientConfig::default(), json!({}), engine).unwrap();
//! assert_eq!(client.stats().requests, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod engine;
mod error;
mod receive;
mod sync;

pub use client::{ClientStats, LiteQueryHandler, TonClient};
pub use config::{
    ClientConfig, ReceiveConfig, DEFAULT_MAX_SYNC_ROUNDS, DEFAULT_RECEIVE_ATTEMPTS,
    DEFAULT_RECEIVE_TIMEOUT, DEFAULT_RETRY_DELAY,
};
pub use engine::{MockEngine, NodeEngine};
pub use error::{ClientError, ClientResult};
