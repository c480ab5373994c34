// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::engine::factory::ExecutorFactory;
use crate::engine::ModulatorArray;
use crate::errors::{ConfigError, ExecutionError, FailureStrategy};
use crate::formatters::FormatterFactory;
use crate::message::{Message, StreamId};
use crate::traits::{ExecutionOutcome, StreamExecutor};

/// Everything needed to push messages through a configured pipeline.
pub struct Runtime {
    pub pipeline: Arc<ModulatorArray>,
    pub executor: Box<dyn StreamExecutor>,
    pub failure_strategy: FailureStrategy,
    pub stream: StreamId,
    pub fallback_stream: StreamId,
}

impl Runtime {
    /// Run a batch through the pipeline with the configured routing.
    pub async fn run(&self, messages: Vec<Message>) -> Result<ExecutionOutcome, ExecutionError> {
        self.executor
            .execute_with_strategy(
                self.pipeline.clone(),
                messages,
                self.fallback_stream,
                self.failure_strategy,
            )
            .await
    }
}

/// Pipeline runtime builder - creates the modulator array and executor from configuration.
///
/// # Examples
///
/// ```
/// use the_modulator::config::{parse_config, ConfigFormat, RuntimeBuilder};
/// use the_modulator::message::Message;
///
/// let config = parse_config(
///     "modulators:\n  - type: envelope\n    options:\n      prefix: \"<\"\n      postfix: \">\"\n",
///     ConfigFormat::Yaml,
/// )
/// .unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let outcome = rt
///     .block_on(runtime.run(vec![Message::new("hi", runtime.stream, 0)]))
///     .unwrap();
///
/// assert_eq!(outcome.delivered[0].payload, b"<hi>");
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the complete runtime from configuration.
    ///
    /// Creates and returns a [`Runtime`] holding:
    /// - the `ModulatorArray` built by `FormatterFactory`
    /// - the `StreamExecutor` selected by `strategy`
    /// - the failure strategy and resolved input/fallback stream ids
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        let pipeline = FormatterFactory::build_pipeline(&cfg.modulators)?;
        let executor = ExecutorFactory::from_config(cfg);
        Ok(Runtime {
            pipeline: Arc::new(pipeline),
            executor,
            failure_strategy: cfg.failure_strategy,
            stream: StreamId::of(&cfg.stream),
            fallback_stream: StreamId::of(&cfg.fallback_stream),
        })
    }
}
