//! The block-synchronization driver.

use crate::config::ReceiveConfig;
use crate::engine::NodeEngine;
use crate::error::{ClientError, ClientResult};
use crate::receive::poll_receive;
use std::sync::atomic::AtomicBool;
use tonkit_codec::{from_wire, to_wire, RawResult};
use tonkit_protocol::{SyncRequest, SyncState, TAG_ERROR, TAG_OK};
use tracing::{debug, trace};

/// Phases of one synchronization round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncPhase {
    /// Waiting for the next progress update.
    AwaitUpdate,
    /// A `syncStateDone` update arrived; absorbing the completion record.
    Drain,
    /// Synchronization finished.
    Finished,
    /// Synchronization failed.
    Failed,
}

/// Drives one synchronization round against the engine.
///
/// The round hands the reported state back via a `sync` request, then
/// consumes records until the engine acknowledges with `ok`. An `error`
/// record at any point, the drain receive included, fails the round.
pub(crate) struct SyncDriver<'a, E: NodeEngine> {
    engine: &'a E,
    receive: &'a ReceiveConfig,
    cancelled: &'a AtomicBool,
    phase: SyncPhase,
}

impl<'a, E: NodeEngine> SyncDriver<'a, E> {
    pub(crate) fn new(
        engine: &'a E,
        receive: &'a ReceiveConfig,
        cancelled: &'a AtomicBool,
    ) -> Self {
        Self {
            engine,
            receive,
            cancelled,
            phase: SyncPhase::AwaitUpdate,
        }
    }

    /// Current phase, asserted by the driver tests.
    #[cfg(test)]
    pub(crate) fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Runs the round to completion.
    ///
    /// The original request is not re-sent afterwards; the engine answers
    /// it once synchronization has caught up.
    pub(crate) fn run(&mut self, state: SyncState) -> ClientResult<()> {
        let request = match to_wire(&SyncRequest::new(state)) {
            Ok(request) => request,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.engine.send(&request);
        debug!(
            "sync round started at seqno {} of {}",
            state.current_seqno, state.to_seqno
        );

        while self.phase != SyncPhase::Finished {
            let record = match poll_receive(self.engine, self.receive, self.cancelled) {
                Ok(record) => record,
                Err(e) => return Err(self.fail(e)),
            };
            let raw = match from_wire(record.as_bytes()) {
                Ok(raw) => raw,
                Err(e) => return Err(self.fail(e.into())),
            };
            self.step(&raw)?;
        }

        debug!("sync round finished");
        Ok(())
    }

    /// Applies one received record to the phase machine.
    fn step(&mut self, raw: &RawResult) -> ClientResult<()> {
        if raw.type_tag() == TAG_ERROR {
            debug!("engine reported an error during sync");
            return Err(self.fail(ClientError::Sync(raw.text().into_owned())));
        }

        match self.phase {
            SyncPhase::AwaitUpdate => {
                let embedded = match SyncState::from_envelope(raw.envelope()) {
                    Ok(embedded) => embedded,
                    Err(e) => return Err(self.fail(e.into())),
                };
                if embedded.is_some_and(|state| state.is_done()) {
                    debug!("sync reported done, draining completion record");
                    self.phase = SyncPhase::Drain;
                } else if raw.type_tag() == TAG_OK {
                    self.phase = SyncPhase::Finished;
                } else {
                    trace!("sync in progress, record kind {}", raw.type_tag());
                }
            }
            SyncPhase::Drain => {
                if raw.type_tag() == TAG_OK {
                    self.phase = SyncPhase::Finished;
                } else {
                    // The drained record was yet another update; resume
                    // waiting rather than draining again.
                    trace!("drained record kind {}, resuming wait", raw.type_tag());
                    self.phase = SyncPhase::AwaitUpdate;
                }
            }
            SyncPhase::Finished | SyncPhase::Failed => {}
        }

        Ok(())
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        self.phase = SyncPhase::Failed;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use serde_json::Value;
    use std::time::Duration;
    use tonkit_protocol::SyncStateKind;

    fn fast_receive() -> ReceiveConfig {
        ReceiveConfig::new()
            .with_timeout(Duration::from_millis(1))
            .with_max_attempts(3)
            .with_retry_delay(Duration::from_millis(1))
    }

    fn in_progress(current: i64) -> SyncState {
        SyncState {
            kind: SyncStateKind::InProgress,
            from_seqno: 1,
            to_seqno: 100,
            current_seqno: current,
        }
    }

    fn progress_update(current: i64) -> String {
        format!(
            r#"{{"@type":"updateSyncState","sync_state":{{"@type":"syncStateInProgress","from_seqno":1,"to_seqno":100,"current_seqno":{current}}}}}"#
        )
    }

    const DONE_UPDATE: &str =
        r#"{"@type":"updateSyncState","sync_state":{"@type":"syncStateDone"}}"#;
    const OK_RECORD: &str = r#"{"@type":"ok"}"#;
    const ERROR_RECORD: &str = r#"{"@type":"error","code":4,"message":"sync broke"}"#;

    #[test]
    fn run_sends_sync_request_with_state() {
        let engine = MockEngine::new();
        engine.push_record(OK_RECORD);
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        driver.run(in_progress(42)).unwrap();

        let sent: Value = serde_json::from_str(&engine.sent()[0]).unwrap();
        assert_eq!(sent["@type"], "sync");
        assert_eq!(sent["sync_state"]["@type"], "syncStateInProgress");
        assert_eq!(sent["sync_state"]["current_seqno"], 42);
        assert_eq!(driver.phase(), SyncPhase::Finished);
    }

    #[test]
    fn progress_then_done_then_ok_finishes() {
        let engine = MockEngine::new();
        engine.push_record(progress_update(10));
        engine.push_record(progress_update(90));
        engine.push_record(DONE_UPDATE);
        engine.push_record(OK_RECORD);
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        driver.run(in_progress(1)).unwrap();

        assert_eq!(driver.phase(), SyncPhase::Finished);
        assert_eq!(engine.receive_calls(), 4);
    }

    #[test]
    fn error_while_awaiting_fails_round() {
        let engine = MockEngine::new();
        engine.push_record(progress_update(10));
        engine.push_record(ERROR_RECORD);
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        let err = driver.run(in_progress(1)).unwrap_err();

        match err {
            ClientError::Sync(raw) => assert!(raw.contains("sync broke")),
            other => panic!("expected Sync, got {other:?}"),
        }
        assert_eq!(driver.phase(), SyncPhase::Failed);
    }

    #[test]
    fn error_while_draining_fails_round() {
        let engine = MockEngine::new();
        engine.push_record(DONE_UPDATE);
        engine.push_record(ERROR_RECORD);
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        let err = driver.run(in_progress(1)).unwrap_err();

        assert!(matches!(err, ClientError::Sync(_)));
        assert_eq!(driver.phase(), SyncPhase::Failed);
    }

    #[test]
    fn drained_update_resumes_waiting() {
        let engine = MockEngine::new();
        engine.push_record(DONE_UPDATE);
        engine.push_record(progress_update(99));
        engine.push_record(DONE_UPDATE);
        engine.push_record(OK_RECORD);
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        driver.run(in_progress(1)).unwrap();

        assert_eq!(driver.phase(), SyncPhase::Finished);
        assert_eq!(engine.receive_calls(), 4);
    }

    #[test]
    fn silence_exhausts_the_receive_budget() {
        let engine = MockEngine::new();
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        let err = driver.run(in_progress(1)).unwrap_err();

        assert!(matches!(err, ClientError::RetryExhausted { attempts: 3 }));
        assert_eq!(driver.phase(), SyncPhase::Failed);
        assert_eq!(engine.receive_calls(), 3);
    }

    #[test]
    fn silence_while_draining_is_bounded_too() {
        let engine = MockEngine::new();
        engine.push_record(DONE_UPDATE);
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        let err = driver.run(in_progress(1)).unwrap_err();

        assert!(matches!(err, ClientError::RetryExhausted { attempts: 3 }));
        assert_eq!(engine.receive_calls(), 4);
    }

    #[test]
    fn malformed_record_fails_round() {
        let engine = MockEngine::new();
        engine.push_record("{broken");
        let cancelled = AtomicBool::new(false);
        let receive = fast_receive();

        let mut driver = SyncDriver::new(&engine, &receive, &cancelled);
        let err = driver.run(in_progress(1)).unwrap_err();

        assert!(matches!(err, ClientError::Codec(_)));
        assert_eq!(driver.phase(), SyncPhase::Failed);
    }
}
