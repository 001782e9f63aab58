//! Block-synchronization state as reported by the engine.

use serde::{Deserialize, Serialize};
use tonkit_codec::{CodecError, CodecResult, TaggedEnvelope};

/// Progress discriminator inside a `syncState` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStateKind {
    /// Synchronization is still running.
    #[serde(rename = "syncStateInProgress")]
    InProgress,
    /// Synchronization has finished.
    #[serde(rename = "syncStateDone")]
    Done,
}

/// Block-synchronization progress.
///
/// `syncStateDone` records omit the seqno fields on the wire; they default
/// to zero here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Progress discriminator.
    #[serde(rename = "@type")]
    pub kind: SyncStateKind,
    /// First block of the sync window.
    #[serde(default)]
    pub from_seqno: i64,
    /// Target block of the sync window.
    #[serde(default)]
    pub to_seqno: i64,
    /// Most recently applied block.
    #[serde(default)]
    pub current_seqno: i64,
}

impl SyncState {
    /// Returns true once the engine reports synchronization finished.
    pub fn is_done(&self) -> bool {
        self.kind == SyncStateKind::Done
    }

    /// Extracts the embedded `sync_state` object, when the record carries
    /// one.
    ///
    /// Absence is ordinary; a present but malformed `sync_state` is a
    /// decoding failure.
    pub fn from_envelope(envelope: &TaggedEnvelope) -> CodecResult<Option<Self>> {
        match envelope.get("sync_state") {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| CodecError::decoding_failed(e.to_string())),
        }
    }
}
