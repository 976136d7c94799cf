//! Shared helpers for the cross-crate tests in `tests/`

use std::time::Duration;

/// Poll `condition` every few milliseconds until it holds or `limit` elapses.
/// Returns whether the condition was observed.
pub async fn wait_for(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    tokio::time::timeout(limit, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}
