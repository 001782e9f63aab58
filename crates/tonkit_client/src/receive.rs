//! The bounded receive loop.

use crate::config::ReceiveConfig;
use crate::engine::NodeEngine;
use crate::error::{ClientError, ClientResult};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Waits for the next record, retrying empty attempts up to the budget.
///
/// Sleeps `retry_delay` between empty attempts; the final empty attempt is
/// not followed by a sleep. The cancellation flag is checked before every
/// attempt. Exhausting the budget fails with
/// [`ClientError::RetryExhausted`]; no further attempt is made.
pub(crate) fn poll_receive<E: NodeEngine>(
    engine: &E,
    config: &ReceiveConfig,
    cancelled: &AtomicBool,
) -> ClientResult<String> {
    for attempt in 1..=config.max_attempts {
        if cancelled.load(Ordering::SeqCst) {
            return Err(ClientError::Cancelled);
        }

        if let Some(record) = engine.receive(config.timeout) {
            trace!("received record on attempt {}", attempt);
            return Ok(record);
        }

        trace!("attempt {} of {} received nothing", attempt, config.max_attempts);
        if attempt < config.max_attempts {
            std::thread::sleep(config.retry_delay);
        }
    }

    Err(ClientError::RetryExhausted {
        attempts: config.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use std::time::Duration;

    fn fast_config(max_attempts: u32) -> ReceiveConfig {
        ReceiveConfig::new()
            .with_timeout(Duration::from_millis(1))
            .with_max_attempts(max_attempts)
            .with_retry_delay(Duration::from_millis(1))
    }

    #[test]
    fn returns_record_on_first_attempt() {
        let engine = MockEngine::new();
        engine.push_record(r#"{"@type":"ok"}"#);
        let cancelled = AtomicBool::new(false);

        let record = poll_receive(&engine, &fast_config(10), &cancelled).unwrap();
        assert_eq!(record, r#"{"@type":"ok"}"#);
        assert_eq!(engine.receive_calls(), 1);
    }

    #[test]
    fn retries_through_empty_attempts() {
        let engine = MockEngine::new();
        engine.push_silence();
        engine.push_silence();
        engine.push_silence();
        engine.push_record(r#"{"@type":"ok"}"#);
        let cancelled = AtomicBool::new(false);

        let record = poll_receive(&engine, &fast_config(10), &cancelled).unwrap();
        assert_eq!(record, r#"{"@type":"ok"}"#);
        assert_eq!(engine.receive_calls(), 4);
    }

    #[test]
    fn exhausts_budget_without_extra_attempt() {
        let engine = MockEngine::new();
        let cancelled = AtomicBool::new(false);

        let err = poll_receive(&engine, &fast_config(10), &cancelled).unwrap_err();
        assert!(matches!(err, ClientError::RetryExhausted { attempts: 10 }));
        assert_eq!(engine.receive_calls(), 10);
    }

    #[test]
    fn record_on_final_attempt_succeeds() {
        let engine = MockEngine::new();
        for _ in 0..2 {
            engine.push_silence();
        }
        engine.push_record(r#"{"@type":"ok"}"#);
        let cancelled = AtomicBool::new(false);

        let record = poll_receive(&engine, &fast_config(3), &cancelled).unwrap();
        assert_eq!(record, r#"{"@type":"ok"}"#);
        assert_eq!(engine.receive_calls(), 3);
    }

    #[test]
    fn cancellation_checked_before_first_attempt() {
        let engine = MockEngine::new();
        engine.push_record(r#"{"@type":"ok"}"#);
        let cancelled = AtomicBool::new(true);

        let err = poll_receive(&engine, &fast_config(10), &cancelled).unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(engine.receive_calls(), 0);
    }

    #[test]
    fn configured_timeout_reaches_engine() {
        let engine = MockEngine::new();
        engine.push_record(r#"{"@type":"ok"}"#);
        let cancelled = AtomicBool::new(false);
        let config = fast_config(1).with_timeout(Duration::from_millis(37));

        poll_receive(&engine, &config, &cancelled).unwrap();
        assert_eq!(engine.receive_timeouts(), vec![Duration::from_millis(37)]);
    }

    #[test]
    fn zero_attempt_budget_exhausts_immediately() {
        let engine = MockEngine::new();
        let cancelled = AtomicBool::new(false);

        let err = poll_receive(&engine, &fast_config(0), &cancelled).unwrap_err();
        assert!(matches!(err, ClientError::RetryExhausted { attempts: 0 }));
        assert_eq!(engine.receive_calls(), 0);
    }
}
