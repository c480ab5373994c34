// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{ExecutionError, FailureStrategy};
use crate::message::{stream_name, Message, StreamId};
use crate::observability::messages::engine::{MessageDiscarded, MessageRoutedToFallback};
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionOutcome, ModulateResult};

/// Sorts modulated messages into an [`ExecutionOutcome`].
///
/// Shared by all executors so that routing is identical regardless of strategy.
/// Messages must be recorded in input order.
pub(crate) struct OutcomeCollector {
    outcome: ExecutionOutcome,
    fallback_stream: StreamId,
    failure_strategy: FailureStrategy,
}

impl OutcomeCollector {
    pub fn new(fallback_stream: StreamId, failure_strategy: FailureStrategy) -> Self {
        Self {
            outcome: ExecutionOutcome::default(),
            fallback_stream,
            failure_strategy,
        }
    }

    pub fn record(&mut self, mut msg: Message, result: ModulateResult) -> Result<(), ExecutionError> {
        match result {
            ModulateResult::Continue => self.outcome.delivered.push(msg),
            ModulateResult::Fallback => {
                MessageRoutedToFallback {
                    sequence: msg.sequence,
                    from_stream: &stream_name(msg.stream_id),
                    fallback_stream: &stream_name(self.fallback_stream),
                }
                .log();
                msg.set_stream_id(self.fallback_stream);
                self.outcome.fallback.push(msg);
            }
            ModulateResult::Discard => {
                MessageDiscarded {
                    sequence: msg.sequence,
                    stream: &stream_name(msg.stream_id),
                }
                .log();
                if self.failure_strategy == FailureStrategy::FailFast {
                    return Err(ExecutionError::MessageDiscarded {
                        sequence: msg.sequence,
                    });
                }
                self.outcome.discarded += 1;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> ExecutionOutcome {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_are_sorted_by_kind() {
        let input = StreamId::of("outcome_input");
        let mut collector = OutcomeCollector::new(StreamId::dropped(), FailureStrategy::ContinueOnError);
        collector
            .record(Message::new("a", input, 0), ModulateResult::Continue)
            .unwrap();
        collector
            .record(Message::new("b", input, 1), ModulateResult::Fallback)
            .unwrap();
        collector
            .record(Message::new("c", input, 2), ModulateResult::Discard)
            .unwrap();

        let outcome = collector.finish();
        assert_eq!(outcome.delivered.len(), 1);
        assert_eq!(outcome.fallback[0].stream_id, StreamId::dropped());
        assert_eq!(outcome.fallback[0].prev_stream_id, input);
        assert_eq!(outcome.discarded, 1);
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn fail_fast_reports_discarded_sequence() {
        let mut collector = OutcomeCollector::new(StreamId::dropped(), FailureStrategy::FailFast);
        let result = collector.record(Message::new("x", StreamId::INVALID, 9), ModulateResult::Discard);
        assert!(matches!(
            result,
            Err(ExecutionError::MessageDiscarded { sequence: 9 })
        ));
    }
}
