//! The node-engine boundary.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// An opaque node client engine.
///
/// Implementations wrap the actual engine library. The boundary reports
/// failures in band: `send` cannot fail here, a broken request surfaces
/// later as an `error` record or as silence on `receive`.
pub trait NodeEngine: Send + Sync {
    /// Queues a request for asynchronous processing.
    fn send(&self, request: &str);

    /// Waits up to `timeout` for the next available record.
    ///
    /// `None` means nothing arrived in time. On a quiet connection this is
    /// the common case, not a failure.
    fn receive(&self, timeout: Duration) -> Option<String>;

    /// Runs a request on the engine's synchronous path, bypassing the
    /// asynchronous queue.
    fn execute(&self, request: &str) -> String;

    /// Releases the engine. Must be safe to call more than once.
    fn close(&self);
}

impl<T: NodeEngine + ?Sized> NodeEngine for Arc<T> {
    fn send(&self, request: &str) {
        (**self).send(request);
    }

    fn receive(&self, timeout: Duration) -> Option<String> {
        (**self).receive(timeout)
    }

    fn execute(&self, request: &str) -> String {
        (**self).execute(request)
    }

    fn close(&self) {
        (**self).close();
    }
}

/// A scriptable engine for testing.
///
/// Records arrive in the scripted order; once the script runs out every
/// `receive` returns `None`. Sent and directly executed requests are
/// recorded for assertions.
#[derive(Debug, Default)]
pub struct MockEngine {
    sent: Mutex<Vec<String>>,
    executed: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Option<String>>>,
    execute_reply: Mutex<Option<String>>,
    receive_calls: AtomicU64,
    receive_timeouts: Mutex<Vec<Duration>>,
    closed: AtomicBool,
}

impl MockEngine {
    /// Creates a new mock engine with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the receive script.
    pub fn push_record(&self, record: impl Into<String>) {
        self.script.lock().push_back(Some(record.into()));
    }

    /// Appends an empty receive outcome to the script.
    pub fn push_silence(&self) {
        self.script.lock().push_back(None);
    }

    /// Sets the reply served by the synchronous execute path.
    pub fn set_execute_reply(&self, reply: impl Into<String>) {
        *self.execute_reply.lock() = Some(reply.into());
    }

    /// Requests pushed through `send`, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Requests run through `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    /// Number of `receive` calls made so far.
    pub fn receive_calls(&self) -> u64 {
        self.receive_calls.load(Ordering::SeqCst)
    }

    /// Timeouts handed to `receive`, in order.
    pub fn receive_timeouts(&self) -> Vec<Duration> {
        self.receive_timeouts.lock().clone()
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl NodeEngine for MockEngine {
    fn send(&self, request: &str) {
        self.sent.lock().push(request.to_string());
    }

    fn receive(&self, timeout: Duration) -> Option<String> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        self.receive_timeouts.lock().push(timeout);
        self.script.lock().pop_front().flatten()
    }

    fn execute(&self, request: &str) -> String {
        self.executed.lock().push(request.to_string());
        self.execute_reply
            .lock()
            .clone()
            .unwrap_or_else(|| r#"{"@type":"ok"}"#.to_string())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_engine_plays_script_in_order() {
        let engine = MockEngine::new();
        engine.push_record(r#"{"@type":"a"}"#);
        engine.push_silence();
        engine.push_record(r#"{"@type":"b"}"#);

        let timeout = Duration::from_millis(1);
        assert_eq!(engine.receive(timeout), Some(r#"{"@type":"a"}"#.to_string()));
        assert_eq!(engine.receive(timeout), None);
        assert_eq!(engine.receive(timeout), Some(r#"{"@type":"b"}"#.to_string()));
        assert_eq!(engine.receive(timeout), None);
        assert_eq!(engine.receive_calls(), 4);
    }

    #[test]
    fn mock_engine_records_sends() {
        let engine = MockEngine::new();
        engine.send(r#"{"@type":"ping"}"#);
        engine.send(r#"{"@type":"pong"}"#);

        assert_eq!(engine.sent().len(), 2);
        assert_eq!(engine.sent()[0], r#"{"@type":"ping"}"#);
    }

    #[test]
    fn mock_engine_execute_reply() {
        let engine = MockEngine::new();
        assert_eq!(engine.execute("{}"), r#"{"@type":"ok"}"#);

        engine.set_execute_reply(r#"{"@type":"pong"}"#);
        assert_eq!(engine.execute("{}"), r#"{"@type":"pong"}"#);
        assert_eq!(engine.executed().len(), 2);
    }

    #[test]
    fn mock_engine_close() {
        let engine = MockEngine::new();
        assert!(!engine.is_closed());
        engine.close();
        engine.close();
        assert!(engine.is_closed());
    }

    #[test]
    fn arc_delegates_to_inner_engine() {
        let engine = Arc::new(MockEngine::new());
        engine.push_record(r#"{"@type":"a"}"#);

        let shared: Arc<MockEngine> = Arc::clone(&engine);
        NodeEngine::send(&shared, "x");
        assert_eq!(engine.sent(), vec!["x".to_string()]);
        assert!(NodeEngine::receive(&shared, Duration::from_millis(1)).is_some());
    }
}
