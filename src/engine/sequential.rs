// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::outcome::OutcomeCollector;
use crate::errors::{ExecutionError, FailureStrategy};
use crate::message::{Message, StreamId};
use crate::observability::messages::engine::{ExecutionCompleted, ExecutionStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionOutcome, Modulator, StreamExecutor};

/// Runs every message through the pipeline on the calling task, one after another.
///
/// This is the default strategy. Formatters are synchronous and cheap, so for small
/// batches the overhead of handing messages to worker threads outweighs any gain.
#[derive(Debug, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StreamExecutor for SequentialExecutor {
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
            max_concurrency: 1,
        };
        started.log();
        let start_time = Instant::now();

        let mut collector = OutcomeCollector::new(fallback_stream, failure_strategy);
        for mut msg in messages {
            let result = pipeline.modulate(&mut msg);
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
        "sequential"
    }
}
