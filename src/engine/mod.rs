// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline execution.
//!
//! A [`ModulatorArray`] applies its modulators to a single message. Executors run an
//! array over a batch of messages and sort the results into delivered, fallback and
//! discarded sets:
//!
//! - [`SequentialExecutor`] processes messages one after another on the calling task.
//! - [`ConcurrentExecutor`] processes them on blocking worker threads, bounded by
//!   `max_concurrency`, and keeps input order in its output.

pub mod concurrent;
pub mod factory;
pub mod modulator_array;
mod outcome;
pub mod sequential;

pub use concurrent::ConcurrentExecutor;
pub use factory::ExecutorFactory;
pub use modulator_array::{FormatterModulator, ModulatorArray};
pub use sequential::SequentialExecutor;
