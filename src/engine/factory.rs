// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_MAX_CONCURRENCY;
use crate::config::{Config, Strategy};
use crate::engine::concurrent::ConcurrentExecutor;
use crate::engine::sequential::SequentialExecutor;
use crate::traits::StreamExecutor;

/// Factory for creating stream executors from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create an executor based on the configuration strategy
    pub fn from_config(cfg: &Config) -> Box<dyn StreamExecutor> {
        let max_concurrency = cfg.executor_options.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_MAX_CONCURRENCY)
        });

        match cfg.strategy {
            Strategy::Sequential => Box::new(SequentialExecutor::new()),
            Strategy::Concurrent => Box::new(ConcurrentExecutor::new(max_concurrency)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, ConfigFormat};

    #[test]
    fn strategy_selects_executor() {
        struct TestCase {
            yaml: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                yaml: "{}",
                expected: "sequential",
            },
            TestCase {
                yaml: "strategy: sequential",
                expected: "sequential",
            },
            TestCase {
                yaml: "strategy: concurrent\nexecutor_options:\n  max_concurrency: 2",
                expected: "concurrent",
            },
        ];

        for case in cases {
            let cfg = parse_config(case.yaml, ConfigFormat::Yaml).unwrap();
            assert_eq!(ExecutorFactory::from_config(&cfg).name(), case.expected, "{}", case.yaml);
        }
    }
}
