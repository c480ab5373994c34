// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod executor;
pub mod formatter;
pub mod modulator;

pub use executor::{ExecutionOutcome, StreamExecutor};
pub use formatter::Formatter;
pub use modulator::{ModulateResult, Modulator};
