// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::message::Message;
use crate::observability::messages::formatter::{FormatterApplied, FormatterFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{Formatter, ModulateResult, Modulator};

/// Adapts a [`Formatter`] to the [`Modulator`] interface.
///
/// A successful `apply` continues the pipeline. An error is logged as a warning and
/// the message is discarded.
pub struct FormatterModulator {
    id: String,
    formatter: Arc<dyn Formatter>,
}

impl FormatterModulator {
    pub fn new(id: impl Into<String>, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            id: id.into(),
            formatter,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Modulator for FormatterModulator {
    fn modulate(&self, msg: &mut Message) -> ModulateResult {
        let input_size = msg.len();
        match self.formatter.apply(msg) {
            Ok(()) => {
                FormatterApplied {
                    modulator_id: &self.id,
                    formatter: self.formatter.name(),
                    input_size,
                    output_size: msg.len(),
                }
                .log();
                ModulateResult::Continue
            }
            Err(e) => {
                FormatterFailed {
                    modulator_id: &self.id,
                    formatter: self.formatter.name(),
                    error: &e,
                }
                .log();
                ModulateResult::Discard
            }
        }
    }
}

/// An ordered list of modulators applied to one message.
///
/// Processing stops at the first modulator that does not return
/// [`ModulateResult::Continue`]; that result is returned.
#[derive(Default)]
pub struct ModulatorArray {
    items: Vec<Box<dyn Modulator>>,
}

impl ModulatorArray {
    pub fn new(items: Vec<Box<dyn Modulator>>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, modulator: Box<dyn Modulator>) {
        self.items.push(modulator);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Modulator for ModulatorArray {
    fn modulate(&self, msg: &mut Message) -> ModulateResult {
        for item in &self.items {
            let result = item.modulate(msg);
            if result != ModulateResult::Continue {
                return result;
            }
        }
        ModulateResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FormatError;
    use crate::message::StreamId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        result: ModulateResult,
        calls: Arc<AtomicUsize>,
    }

    impl Modulator for Fixed {
        fn modulate(&self, _msg: &mut Message) -> ModulateResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
        }
    }

    struct Failing;

    impl Formatter for Failing {
        fn apply(&self, _msg: &mut Message) -> Result<(), FormatError> {
            Err(FormatError::Parse("broken".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Append(&'static str);

    impl Formatter for Append {
        fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
            msg.payload.extend_from_slice(self.0.as_bytes());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "append"
        }
    }

    #[test]
    fn empty_array_continues() {
        let array = ModulatorArray::default();
        let mut msg = Message::new("x", StreamId::INVALID, 0);
        assert!(array.is_empty());
        assert_eq!(array.modulate(&mut msg), ModulateResult::Continue);
    }

    #[test]
    fn first_non_continue_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fixed = |result| {
            Box::new(Fixed {
                result,
                calls: calls.clone(),
            }) as Box<dyn Modulator>
        };
        let array = ModulatorArray::new(vec![
            fixed(ModulateResult::Continue),
            fixed(ModulateResult::Fallback),
            fixed(ModulateResult::Discard),
        ]);

        let mut msg = Message::new("x", StreamId::INVALID, 0);
        assert_eq!(array.modulate(&mut msg), ModulateResult::Fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn formatters_run_in_order() {
        let array = ModulatorArray::new(vec![
            Box::new(FormatterModulator::new("a", Arc::new(Append("1")))),
            Box::new(FormatterModulator::new("b", Arc::new(Append("2")))),
        ]);
        let mut msg = Message::new("x", StreamId::INVALID, 0);
        assert_eq!(array.modulate(&mut msg), ModulateResult::Continue);
        assert_eq!(msg.payload, b"x12");
    }

    #[test]
    fn formatter_error_discards() {
        let array = ModulatorArray::new(vec![
            Box::new(FormatterModulator::new("bad", Arc::new(Failing))),
            Box::new(FormatterModulator::new("never", Arc::new(Append("!")))),
        ]);
        let mut msg = Message::new("x", StreamId::INVALID, 0);
        assert_eq!(array.modulate(&mut msg), ModulateResult::Discard);
        assert_eq!(msg.payload, b"x");
    }
}
