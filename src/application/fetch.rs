//! # Fetch Worker
//!
//! Runs a generator off the foreground loop. Each submission gets a ticket and ends with
//! exactly one [`FetchEvent`] on the worker's channel, whatever happens inside the
//! generator (including a panic). Submissions may overlap; events arrive in completion
//! order. There is no retry and no cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::domain::error::CoreError;
use crate::domain::traits::PlanGenerator;
use crate::strings::logs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Raw generator output, not yet decoded.
    PlanReady(String),
    FetchFailed(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchEvent {
    pub ticket: u64,
    pub result: FetchResult,
}

/// Identifies one submission. Matches the `ticket` of its terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchHandle {
    pub ticket: u64,
}

pub struct FetchWorker {
    tx: mpsc::UnboundedSender<FetchEvent>,
    next_ticket: AtomicU64,
    timeout: Option<Duration>,
}

impl FetchWorker {
    /// Create a worker and the receiving end the foreground loop drains.
    pub fn new(timeout: Option<Duration>) -> (Self, mpsc::UnboundedReceiver<FetchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            tx,
            next_ticket: AtomicU64::new(1),
            timeout,
        };
        (worker, rx)
    }

    /// Start generating a plan for `instruction` and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        instruction: impl Into<String>,
        generator: Arc<dyn PlanGenerator>,
    ) -> FetchHandle {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let instruction = instruction.into();
        let tx = self.tx.clone();
        let timeout = self.timeout;

        tracing::info!("{}", logs::fetch_submitted(ticket, generator.name()));

        tokio::spawn(async move {
            let job = tokio::spawn(async move { generator.generate(&instruction).await });
            let abort = job.abort_handle();

            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, job).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        abort.abort();
                        let event = FetchEvent {
                            ticket,
                            result: FetchResult::FetchFailed(CoreError::RemoteError(format!(
                                "timed out after {limit:?}"
                            ))),
                        };
                        deliver(&tx, event);
                        return;
                    }
                },
                None => job.await,
            };

            let result = match joined {
                Ok(Ok(raw)) => FetchResult::PlanReady(raw),
                Ok(Err(err)) => FetchResult::FetchFailed(err),
                Err(join_err) => FetchResult::FetchFailed(CoreError::RemoteError(format!(
                    "generator task failed: {join_err}"
                ))),
            };
            deliver(&tx, FetchEvent { ticket, result });
        });

        FetchHandle { ticket }
    }
}

fn deliver(tx: &mpsc::UnboundedSender<FetchEvent>, event: FetchEvent) {
    let ok = matches!(event.result, FetchResult::PlanReady(_));
    tracing::info!("{}", logs::fetch_completed(event.ticket, ok));
    if tx.send(event).is_err() {
        // Receiver dropped: the session is gone, nobody is waiting.
        tracing::debug!("Fetch result discarded, receiver closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generator::OfflineStub;
    use crate::domain::error::CoreResult;
    use async_trait::async_trait;

    struct Scripted {
        delay: Duration,
        reply: CoreResult<String>,
    }

    #[async_trait]
    impl PlanGenerator for Scripted {
        async fn generate(&self, _instruction: &str) -> CoreResult<String> {
            tokio::time::sleep(self.delay).await;
            self.reply.clone()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Panicking;

    #[async_trait]
    impl PlanGenerator for Panicking {
        async fn generate(&self, _instruction: &str) -> CoreResult<String> {
            panic!("generator blew up")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_success_delivers_plan_ready() {
        let (worker, mut rx) = FetchWorker::new(None);
        let handle = worker.submit("hello", Arc::new(OfflineStub));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.ticket, handle.ticket);
        match event.result {
            FetchResult::PlanReady(raw) => assert!(raw.contains("hello")),
            other => panic!("expected PlanReady, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_delivers_fetch_failed() {
        let (worker, mut rx) = FetchWorker::new(None);
        let generator = Arc::new(Scripted {
            delay: Duration::ZERO,
            reply: Err(CoreError::ServiceUnavailable("no key".into())),
        });
        worker.submit("x", generator);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event.result,
            FetchResult::FetchFailed(CoreError::ServiceUnavailable("no key".into()))
        );
    }

    #[tokio::test]
    async fn test_submit_does_not_block_caller() {
        let (worker, mut rx) = FetchWorker::new(None);
        let generator = Arc::new(Scripted {
            delay: Duration::from_millis(200),
            reply: Ok("{}".into()),
        });
        let started = std::time::Instant::now();
        worker.submit("slow", generator);
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(rx.try_recv().is_err());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_overlapping_fetches_complete_unordered() {
        let (worker, mut rx) = FetchWorker::new(None);
        let slow = worker.submit(
            "slow",
            Arc::new(Scripted {
                delay: Duration::from_millis(150),
                reply: Ok("slow".into()),
            }),
        );
        let fast = worker.submit(
            "fast",
            Arc::new(Scripted {
                delay: Duration::from_millis(10),
                reply: Ok("fast".into()),
            }),
        );
        assert_ne!(slow.ticket, fast.ticket);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.ticket, fast.ticket);
        assert_eq!(second.ticket, slow.ticket);
    }

    #[tokio::test]
    async fn test_panic_still_yields_one_event() {
        let (worker, mut rx) = FetchWorker::new(None);
        let handle = worker.submit("x", Arc::new(Panicking));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.ticket, handle.ticket);
        assert!(matches!(
            event.result,
            FetchResult::FetchFailed(CoreError::RemoteError(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_reports_remote_error() {
        let (worker, mut rx) = FetchWorker::new(Some(Duration::from_millis(50)));
        worker.submit(
            "x",
            Arc::new(Scripted {
                delay: Duration::from_secs(10),
                reply: Ok("late".into()),
            }),
        );
        let event = rx.recv().await.unwrap();
        match event.result {
            FetchResult::FetchFailed(CoreError::RemoteError(detail)) => {
                assert!(detail.contains("timed out"))
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
