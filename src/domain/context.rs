use crate::utils::error::{LabelError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// 單一請求的執行期限，所有對外網路呼叫都在此期限內執行
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// No deadline. The call only ends when the future completes or is dropped.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Runs `fut` until it completes or the deadline passes, whichever is
    /// first. On expiry the in-flight future is dropped.
    pub async fn run<T, F>(&self, stage: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| LabelError::DeadlineExceeded { stage })?,
            None => fut.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_aborts_slow_call() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result: Result<()> = ctx
            .run("carrier tracking", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(LabelError::DeadlineExceeded { stage: "carrier tracking" })
        ));
    }

    #[tokio::test]
    async fn test_background_passes_through() {
        let ctx = RequestContext::background();
        let value = ctx.run("vision", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
