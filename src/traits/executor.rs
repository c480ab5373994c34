// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::{ExecutionError, FailureStrategy};
use crate::message::{Message, StreamId};
use crate::traits::Modulator;

/// Messages sorted by the result their pipeline produced.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    /// Messages that passed every modulator, in input order.
    pub delivered: Vec<Message>,
    /// Messages re-routed to the fallback stream, in input order.
    pub fallback: Vec<Message>,
    /// Number of messages dropped by the pipeline.
    pub discarded: usize,
}

impl ExecutionOutcome {
    pub fn total(&self) -> usize {
        self.delivered.len() + self.fallback.len() + self.discarded
    }
}

#[async_trait]
pub trait StreamExecutor: Send + Sync {
    /// Run `pipeline` over a batch of messages.
    ///
    /// - `pipeline`: the modulator (usually a `ModulatorArray`) applied to each message
    /// - `messages`: the batch, in arrival order
    /// - `fallback_stream`: stream assigned to messages whose pipeline returned `Fallback`
    /// - `failure_strategy`: whether a discarded message aborts the batch
    ///
    /// Returns the sorted messages, or an error under `FailFast`.
    async fn execute_with_strategy(
        &self,
        pipeline: Arc<dyn Modulator>,
        messages: Vec<Message>,
        fallback_stream: StreamId,
        failure_strategy: FailureStrategy,
    ) -> Result<ExecutionOutcome, ExecutionError>;

    /// Run `pipeline` with the default routing: fallback to `_DROPPED_`, never fail.
    async fn execute(
        &self,
        pipeline: Arc<dyn Modulator>,
        messages: Vec<Message>,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        self.execute_with_strategy(
            pipeline,
            messages,
            StreamId::dropped(),
            FailureStrategy::ContinueOnError,
        )
        .await
    }

    fn name(&self) -> &'static str;
}
