// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::engine::outcome::OutcomeCollector;
use crate::errors::{ExecutionError, FailureStrategy};
use crate::message::{Message, StreamId};
use crate::observability::messages::engine::{ExecutionCompleted, ExecutionStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionOutcome, Modulator, StreamExecutor};

/// Fans messages out to blocking worker threads.
///
/// Each message is modulated inside `tokio::task::spawn_blocking`; a semaphore keeps
/// at most `max_concurrency` messages in flight. Results are collected in input order,
/// so the outcome is identical to the sequential executor for the same batch.
///
/// Under `FailFast` the batch aborts at the first discarded message in input order.
/// Messages already in flight still finish but their results are dropped.
pub struct ConcurrentExecutor {
    max_concurrency: usize,
}

impl ConcurrentExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

#[async_trait]
impl StreamExecutor for ConcurrentExecutor {
    async fn execute_with_strategy(
        &self,
        pipeline: Arc<dyn Modulator>,
        messages: Vec<Message>,
        fallback_stream: StreamId,
        failure_strategy: FailureStrategy,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let started = ExecutionStarted {
            strategy: self.name(),
            message_count: messages.len(),
            max_concurrency: self.max_concurrency,
        };
        started.log();
        let start_time = Instant::now();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = Vec::with_capacity(messages.len());

        for mut msg in messages {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ExecutionError::InternalError {
                    message: format!(
                        "Failed to acquire semaphore permit for message {}: {}",
                        msg.sequence, e
                    ),
                })?;
            let pipeline = pipeline.clone();

            tasks.push(tokio::task::spawn_blocking(move || {
                let result = pipeline.modulate(&mut msg);
                drop(permit);
                (msg, result)
            }));
        }

        let mut collector = OutcomeCollector::new(fallback_stream, failure_strategy);
        for task in tasks {
            let (msg, result) = task.await?;
            collector.record(msg, result)?;
        }
        let outcome = collector.finish();

        ExecutionCompleted {
            strategy: self.name(),
            delivered: outcome.delivered.len(),
            fallback: outcome.fallback.len(),
            discarded: outcome.discarded,
            duration: start_time.elapsed(),
        }
        .log();

        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "concurrent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ModulateResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Sleeps longer for earlier messages so that completion order is reversed.
    struct ReverseSleeper {
        total: u64,
    }

    impl Modulator for ReverseSleeper {
        fn modulate(&self, msg: &mut Message) -> ModulateResult {
            std::thread::sleep(Duration::from_millis((self.total - msg.sequence) * 5));
            msg.payload.extend_from_slice(b"-done");
            ModulateResult::Continue
        }
    }

    struct PeakTracker {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Modulator for PeakTracker {
        fn modulate(&self, _msg: &mut Message) -> ModulateResult {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(10));
            self.active.fetch_sub(1, Ordering::SeqCst);
            ModulateResult::Continue
        }
    }

    struct DiscardOdd;

    impl Modulator for DiscardOdd {
        fn modulate(&self, msg: &mut Message) -> ModulateResult {
            if msg.sequence % 2 == 1 {
                ModulateResult::Discard
            } else {
                ModulateResult::Continue
            }
        }
    }

    fn batch(count: u64) -> Vec<Message> {
        (0..count)
            .map(|i| Message::new(i.to_string(), StreamId::INVALID, i))
            .collect()
    }

    #[tokio::test]
    async fn output_keeps_input_order() {
        let executor = ConcurrentExecutor::new(4);
        let outcome = executor
            .execute(Arc::new(ReverseSleeper { total: 8 }), batch(8))
            .await
            .unwrap();

        let payloads: Vec<_> = outcome.delivered.iter().map(|m| m.payload_str()).collect();
        let expected: Vec<_> = (0..8).map(|i| format!("{}-done", i)).collect();
        assert_eq!(payloads, expected);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let tracker = Arc::new(PeakTracker {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let executor = ConcurrentExecutor::new(2);
        executor.execute(tracker.clone(), batch(10)).await.unwrap();

        assert!(tracker.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn discards_are_counted_or_fatal() {
        let executor = ConcurrentExecutor::new(3);
        let outcome = executor.execute(Arc::new(DiscardOdd), batch(6)).await.unwrap();
        assert_eq!(outcome.delivered.len(), 3);
        assert_eq!(outcome.discarded, 3);

        let result = executor
            .execute_with_strategy(
                Arc::new(DiscardOdd),
                batch(6),
                StreamId::dropped(),
                FailureStrategy::FailFast,
            )
            .await;
        assert!(matches!(
            result,
            Err(ExecutionError::MessageDiscarded { sequence: 1 })
        ));
    }

    #[test]
    fn zero_concurrency_is_raised_to_one() {
        assert_eq!(ConcurrentExecutor::new(0).max_concurrency(), 1);
    }
}
