//! Bounded backend calls.

use kanban_service::{Result, ServiceError};
use std::future::Future;
use std::time::Duration;

/// Run a backend call, converting an elapsed deadline into
/// [`ServiceError::Timeout`].
pub(crate) async fn timed<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(limit)),
    }
}
