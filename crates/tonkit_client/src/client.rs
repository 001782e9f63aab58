//! The client facade.

use crate::config::ClientConfig;
use crate::engine::NodeEngine;
use crate::error::{ClientError, ClientResult};
use crate::receive::poll_receive;
use crate::sync::SyncDriver;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tonkit_codec::{from_wire, to_wire, RawResult};
use tonkit_protocol::{Inbound, InitRequest, TAG_ERROR, TAG_OK};
use tracing::{debug, trace, warn};

/// Receives lite-server queries the node wants answered.
pub trait LiteQueryHandler: Send + Sync {
    /// Called for every `updateSendLiteServerQuery` notification observed
    /// while a request is waiting for its reply.
    ///
    /// `payload` is passed through uninterpreted; `query_id` must be echoed
    /// back with the answer. A returned error is logged and does not affect
    /// the reply eventually returned for the waiting request.
    fn on_lite_server_query(&self, payload: &[u8], query_id: i64) -> ClientResult<()>;
}

impl<T: LiteQueryHandler + ?Sized> LiteQueryHandler for std::sync::Arc<T> {
    fn on_lite_server_query(&self, payload: &[u8], query_id: i64) -> ClientResult<()> {
        (**self).on_lite_server_query(payload, query_id)
    }
}

/// Counters describing a handle's activity.
#[derive(Debug, Clone, Default)]
pub struct ClientStats {
    /// Requests submitted through the routed path, init included.
    pub requests: u64,
    /// Replies handed back to callers.
    pub replies: u64,
    /// Sync rounds serviced while waiting for replies.
    pub sync_rounds: u64,
    /// Lite-server queries forwarded to the handler.
    pub lite_queries: u64,
    /// Requests run on the synchronous execute path.
    pub direct_executions: u64,
    /// Last failure observed on this handle.
    pub last_error: Option<String>,
}

/// A handle to one node engine.
///
/// The handle owns its engine exclusively and keeps one request in flight
/// at a time; concurrent callers queue on an internal lock. Closing is
/// idempotent and also happens on drop.
pub struct TonClient<E: NodeEngine> {
    config: ClientConfig,
    engine: E,
    handler: Option<Box<dyn LiteQueryHandler>>,
    request_lock: Mutex<()>,
    closed: AtomicBool,
    cancelled: AtomicBool,
    stats: RwLock<ClientStats>,
}

impl<E: NodeEngine> fmt::Debug for TonClient<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TonClient")
            .field("config", &self.config)
            .field("has_handler", &self.handler.is_some())
            .field("closed", &self.closed)
            .field("cancelled", &self.cancelled)
            .finish_non_exhaustive()
    }
}

impl<E: NodeEngine> TonClient<E> {
    /// Creates a handle and initializes the engine.
    ///
    /// The `init` request carrying `options` goes through the routed path,
    /// so sync rounds demanded during startup are serviced. The node must
    /// acknowledge with `ok`: an `error` reply fails with
    /// [`ClientError::Node`] carrying the node's message, any other reply
    /// kind fails with [`ClientError::UnexpectedReply`], and engine silence
    /// fails with [`ClientError::RetryExhausted`].
    pub fn init(config: ClientConfig, options: Value, engine: E) -> ClientResult<Self> {
        Self::init_inner(config, options, engine, None)
    }

    /// Like [`TonClient::init`], with a handler for lite-server queries.
    pub fn init_with_handler(
        config: ClientConfig,
        options: Value,
        engine: E,
        handler: Box<dyn LiteQueryHandler>,
    ) -> ClientResult<Self> {
        Self::init_inner(config, options, engine, Some(handler))
    }

    fn init_inner(
        config: ClientConfig,
        options: Value,
        engine: E,
        handler: Option<Box<dyn LiteQueryHandler>>,
    ) -> ClientResult<Self> {
        let client = Self {
            config,
            engine,
            handler,
            request_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            stats: RwLock::new(ClientStats::default()),
        };

        // A failed init drops the handle, which closes the engine.
        let reply = client.execute(&InitRequest::new(options))?;
        match reply.type_tag() {
            TAG_OK => Ok(client),
            TAG_ERROR => {
                let message = match reply.envelope().get_str("message") {
                    Some(message) => message.to_string(),
                    None => reply.text().into_owned(),
                };
                Err(ClientError::Node(message))
            }
            other => Err(ClientError::UnexpectedReply(other.to_string())),
        }
    }

    /// Sends a request and waits for its reply.
    ///
    /// Notifications that arrive first are serviced in place: a sync update
    /// runs a full sync round, a lite-server query goes to the handler, and
    /// the wait resumes. The reply is returned exactly as received; `error`
    /// records are replies too. A caller that queued behind a concurrent
    /// [`TonClient::close`] fails with [`ClientError::Closed`].
    pub fn execute<R: Serialize>(&self, request: &R) -> ClientResult<RawResult> {
        let _guard = self.request_lock.lock();
        // Checked under the lock: a caller queued behind close() must not
        // reach the released engine.
        self.ensure_open()?;
        self.cancelled.store(false, Ordering::SeqCst);

        let result = self.execute_locked(request);
        if let Err(ref e) = result {
            self.stats.write().last_error = Some(e.to_string());
        }
        result
    }

    fn execute_locked<R: Serialize>(&self, request: &R) -> ClientResult<RawResult> {
        let wire = to_wire(request)?;
        trace!("sending request: {}", wire);
        self.engine.send(&wire);
        self.stats.write().requests += 1;

        let mut sync_rounds = 0u32;
        loop {
            let record = poll_receive(&self.engine, &self.config.receive, &self.cancelled)?;
            let raw = from_wire(record.as_bytes())?;

            match Inbound::classify(raw)? {
                Inbound::Reply(reply) => {
                    debug!("reply received, kind {}", reply.type_tag());
                    self.stats.write().replies += 1;
                    return Ok(reply);
                }
                Inbound::SyncState(state) => {
                    if sync_rounds >= self.config.max_sync_rounds {
                        return Err(ClientError::SyncRoundsExhausted {
                            rounds: sync_rounds,
                        });
                    }
                    sync_rounds += 1;
                    debug!("servicing sync round {}", sync_rounds);
                    let mut driver =
                        SyncDriver::new(&self.engine, &self.config.receive, &self.cancelled);
                    driver.run(state)?;
                    self.stats.write().sync_rounds += 1;
                }
                Inbound::LiteQuery { payload, query_id } => {
                    self.forward_lite_query(&payload, query_id);
                }
            }
        }
    }

    fn forward_lite_query(&self, payload: &[u8], query_id: i64) {
        match &self.handler {
            Some(handler) => {
                self.stats.write().lite_queries += 1;
                if let Err(e) = handler.on_lite_server_query(payload, query_id) {
                    warn!("lite-server query handler failed for id {}: {}", query_id, e);
                }
            }
            None => {
                warn!("dropping lite-server query {}: no handler installed", query_id);
            }
        }
    }

    /// Runs a request on the engine's synchronous path.
    ///
    /// No routing happens here; the engine answers from the calling thread
    /// and notifications never appear. Only requests the engine documents
    /// as synchronous belong on this path.
    pub fn execute_direct<R: Serialize>(&self, request: &R) -> ClientResult<RawResult> {
        let _guard = self.request_lock.lock();
        self.ensure_open()?;

        let result = self.execute_direct_locked(request);
        if let Err(ref e) = result {
            self.stats.write().last_error = Some(e.to_string());
        }
        result
    }

    fn execute_direct_locked<R: Serialize>(&self, request: &R) -> ClientResult<RawResult> {
        let wire = to_wire(request)?;
        trace!("executing request directly: {}", wire);
        let reply = self.engine.execute(&wire);
        self.stats.write().direct_executions += 1;
        from_wire(reply.as_bytes()).map_err(ClientError::from)
    }

    /// Requests cancellation of the in-flight request.
    ///
    /// The waiting thread observes the flag between receive attempts and
    /// fails with [`ClientError::Cancelled`]. Starting the next request
    /// clears the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Releases the engine.
    ///
    /// Waits for an in-flight request to finish; call [`TonClient::cancel`]
    /// first to break a long wait. Callers queued behind the close observe
    /// [`ClientError::Closed`]. Closing again is a no-op, and dropping the
    /// handle closes it as well.
    pub fn close(&self) {
        let _guard = self.request_lock.lock();
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("closing engine");
        self.engine.close();
    }

    /// True once the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Counters describing this handle's activity.
    pub fn stats(&self) -> ClientStats {
        self.stats.read().clone()
    }

    /// The configuration this handle was created with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(ClientError::Closed)
        } else {
            Ok(())
        }
    }
}

impl<E: NodeEngine> Drop for TonClient<E> {
    fn drop(&mut self) {
        self.close();
    }
}
