//! Client configuration.

use std::time::Duration;

/// Default per-attempt receive timeout.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(4500);

/// Default receive attempt budget.
pub const DEFAULT_RECEIVE_ATTEMPTS: u32 = 10;

/// Default delay between empty receive attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default bound on sync rounds serviced within one request.
pub const DEFAULT_MAX_SYNC_ROUNDS: u32 = 8;

/// Controls the bounded receive loop.
///
/// The defaults are the engine's conventional timing and are part of the
/// observable contract: 4.5 s per attempt, 10 attempts, 1 s between empty
/// attempts. Tests shrink them.
#[derive(Debug, Clone)]
pub struct ReceiveConfig {
    /// Timeout handed to the engine for each receive attempt.
    pub timeout: Duration,
    /// Maximum number of receive attempts per wait.
    pub max_attempts: u32,
    /// Delay between empty attempts.
    pub retry_delay: Duration,
}

impl ReceiveConfig {
    /// Creates the default receive configuration.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_RECEIVE_TIMEOUT,
            max_attempts: DEFAULT_RECEIVE_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between empty attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a client handle, read-only after construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Receive loop settings.
    pub receive: ReceiveConfig,
    /// Bound on sync rounds serviced within a single request.
    pub max_sync_rounds: u32,
}

impl ClientConfig {
    /// Creates the default client configuration.
    pub fn new() -> Self {
        Self {
            receive: ReceiveConfig::new(),
            max_sync_rounds: DEFAULT_MAX_SYNC_ROUNDS,
        }
    }

    /// Sets the receive loop configuration.
    pub fn with_receive(mut self, receive: ReceiveConfig) -> Self {
        self.receive = receive;
        self
    }

    /// Sets the bound on sync rounds per request.
    pub fn with_max_sync_rounds(mut self, rounds: u32) -> Self {
        self.max_sync_rounds = rounds;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
