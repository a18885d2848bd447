//! Sync module - the bundle/database synchronizer.
//!
//! - `engine` - per-family reconciliation and the pass loop body
//! - `plan` - pure create/update decisions for one file
//! - `notifier` - translation requests for missing keys
//! - `scheduler` - periodic background execution with shutdown

mod engine;
mod notifier;
mod plan;
mod report;
mod scheduler;

use std::future::Future;
use std::time::Duration;

use crate::error::{SyncError, SyncResult};

pub use engine::Reconciler;
pub use notifier::Notifier;
pub use report::PassReport;
pub use scheduler::{PassRunner, Scheduler};

/// Run `fut`, failing with `SyncError::Timeout` if it takes longer than `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    fut: impl Future<Output = SyncResult<T>>,
) -> SyncResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::Timeout {
            operation,
            after: limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        };
        let result = bounded(Duration::from_millis(10), "slow thing", slow).await;
        assert!(matches!(result, Err(SyncError::Timeout { operation: "slow thing", .. })));
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded(Duration::from_secs(1), "fast", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
