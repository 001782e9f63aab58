//! Wire discriminators with reserved meaning.
//!
//! The engine speaks an open set of record kinds; only these few carry
//! routing or protocol meaning for the client core. Everything else passes
//! through untouched.

/// Successful completion acknowledgment.
pub const TAG_OK: &str = "ok";

/// Node-reported failure.
pub const TAG_ERROR: &str = "error";

/// Unsolicited notification: the node wants block synchronization driven.
pub const TAG_UPDATE_SYNC_STATE: &str = "updateSyncState";

/// Unsolicited notification: the node asks for a lite-server query.
pub const TAG_UPDATE_SEND_LITE_SERVER_QUERY: &str = "updateSendLiteServerQuery";

/// Synchronization still running.
pub const TAG_SYNC_STATE_IN_PROGRESS: &str = "syncStateInProgress";

/// Synchronization finished.
pub const TAG_SYNC_STATE_DONE: &str = "syncStateDone";

/// The request kind that hands a sync state back to the engine.
pub const TAG_SYNC: &str = "sync";

/// The request kind that initializes the engine.
pub const TAG_INIT: &str = "init";
