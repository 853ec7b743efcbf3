use crate::{err, ErrorKind, Result};
use async_trait::async_trait;
use easy_ext::ext;
use std::future::Future;
use std::time::Duration;

#[ext(TimeoutExt)]
#[async_trait]
pub(crate) impl<T, F> F
where
    F: Future<Output = Result<T>> + Send,
{
    /// Fails with [`ErrorKind::Timeout`] if the future doesn't resolve in
    /// the given duration. The future is dropped in this case.
    async fn timeout(self, operation: &'static str, timeout: Duration) -> Result<T> {
        ::tokio::time::timeout(timeout, self)
            .await
            .unwrap_or_else(|_elapsed| Err(err!(ErrorKind::Timeout { operation, timeout })))
    }
}
