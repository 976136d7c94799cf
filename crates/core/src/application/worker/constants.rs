// Pipeline constants (No magic values)
use std::time::Duration;

/// Maximum number of cards in a derived deck list (commander excluded)
pub const DECK_CARD_LIMIT: usize = 99;

/// Default bound on each card catalog call (10s)
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on each persistence call (5s)
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on each notification delivery (2s)
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of import workers
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Sleep duration after a queue error before dequeuing again (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);
