//! Timeout wrapper for browser page operations
//!
//! Navigation can hang forever on a page that never fires its load event;
//! every such await goes through [`with_page_timeout`].

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run `operation`, failing with "`{operation_name}` timeout after N seconds"
/// when it does not finish within `timeout_secs`.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout_secs: u64,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(Duration::from_secs(timeout_secs), operation)
        .await
        .unwrap_or_else(|_| {
            Err(anyhow::anyhow!(
                "{operation_name} timeout after {timeout_secs} seconds"
            ))
        })
}
