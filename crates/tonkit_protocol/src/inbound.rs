//! Classification of records arriving from the engine.

use crate::messages::SyncUpdate;
use crate::sync_state::SyncState;
use crate::tags::{TAG_UPDATE_SEND_LITE_SERVER_QUERY, TAG_UPDATE_SYNC_STATE};
use tonkit_codec::{CodecError, CodecResult, RawResult};

/// A received record, sorted by how the client must react to it.
///
/// This is the closed interpretation layer over the open envelope: the two
/// notification kinds the core services itself are pulled apart, everything
/// else stays a [`RawResult`] for the caller.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// An `updateSyncState` notification: the engine wants a sync driven
    /// before it will answer the outstanding request.
    SyncState(SyncState),
    /// An `updateSendLiteServerQuery` notification for the installed
    /// handler.
    LiteQuery {
        /// Opaque query payload, passed through uninterpreted.
        payload: Vec<u8>,
        /// Correlation id to echo back with the answer.
        query_id: i64,
    },
    /// Anything else, handed to the caller as the reply. `error` records
    /// are replies too; interpreting them is the caller's business.
    Reply(RawResult),
}

impl Inbound {
    /// Sorts a decoded record into its routing class.
    ///
    /// A record with a recognized notification tag but a malformed body is
    /// a decoding failure, never a reply.
    pub fn classify(raw: RawResult) -> CodecResult<Self> {
        match raw.type_tag() {
            TAG_UPDATE_SYNC_STATE => {
                let update: SyncUpdate = raw.decode_as()?;
                Ok(Inbound::SyncState(update.sync_state))
            }
            TAG_UPDATE_SEND_LITE_SERVER_QUERY => {
                let query_id = raw.envelope().get_i64("id").ok_or_else(|| {
                    CodecError::decoding_failed("updateSendLiteServerQuery without id")
                })?;
                let payload = raw
                    .envelope()
                    .get_str("data")
                    .ok_or_else(|| {
                        CodecError::decoding_failed("updateSendLiteServerQuery without data")
                    })?
                    .as_bytes()
                    .to_vec();
                Ok(Inbound::LiteQuery { payload, query_id })
            }
            _ => Ok(Inbound::Reply(raw)),
        }
    }
}
