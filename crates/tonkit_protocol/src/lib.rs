//! # Tonkit Protocol
//!
//! Reserved wire shapes and routing classification for Tonkit.
//!
//! The engine speaks an open set of JSON records; this crate pins down the
//! handful with reserved meaning:
//! - The `syncState` shapes ([`SyncState`], [`SyncStateKind`])
//! - The reserved requests ([`InitRequest`], [`SyncRequest`])
//! - The routing classes of received records ([`Inbound`])
//! - The reserved discriminator tags (`TAG_*`)
//!
//! The crate is pure: it never talks to an engine and performs no I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod inbound;
mod messages;
mod sync_state;
mod tags;

pub use inbound::Inbound;
pub use messages::{InitRequest, SyncRequest, SyncUpdate};
pub use sync_state::{SyncState, SyncStateKind};
pub use tags::{
    TAG_ERROR, TAG_INIT, TAG_OK, TAG_SYNC, TAG_SYNC_STATE_DONE, TAG_SYNC_STATE_IN_PROGRESS,
    TAG_UPDATE_SEND_LITE_SERVER_QUERY, TAG_UPDATE_SYNC_STATE,
};
