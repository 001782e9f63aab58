//! Reserved request and update shapes.

use crate::sync_state::SyncState;
use crate::tags::{TAG_INIT, TAG_SYNC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `init` request, consumed by the engine once per handle.
///
/// The options record is opaque to the client core: key directories,
/// network config and the like belong to the application.
#[derive(Debug, Clone, Serialize)]
pub struct InitRequest {
    /// Record discriminator, always `"init"`.
    #[serde(rename = "@type")]
    pub type_tag: &'static str,
    /// Opaque engine options record.
    pub options: Value,
}

impl InitRequest {
    /// Creates an init request carrying the given options record.
    pub fn new(options: Value) -> Self {
        Self {
            type_tag: TAG_INIT,
            options,
        }
    }
}

/// The `sync` request that hands a reported state back to the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SyncRequest {
    /// Record discriminator, always `"sync"`.
    #[serde(rename = "@type")]
    pub type_tag: &'static str,
    /// The state exactly as the engine reported it.
    pub sync_state: SyncState,
}

impl SyncRequest {
    /// Creates a sync request echoing the given state.
    pub fn new(sync_state: SyncState) -> Self {
        Self {
            type_tag: TAG_SYNC,
            sync_state,
        }
    }
}

/// The body of an `updateSyncState` notification.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncUpdate {
    /// The reported synchronization state.
    pub sync_state: SyncState,
}
