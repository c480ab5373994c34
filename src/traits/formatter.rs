// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::FormatError;
use crate::message::Message;

/// A single message transformation.
///
/// Formatters read from their configured source field, compute a new value and store
/// it in their configured target field. They are synchronous and hold no per-message
/// state, so one instance is shared by every worker running the pipeline.
///
/// # Example
/// ```
/// use the_modulator::errors::FormatError;
/// use the_modulator::message::{Message, StreamId};
/// use the_modulator::traits::Formatter;
///
/// struct Shout;
///
/// impl Formatter for Shout {
///     fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
///         msg.payload = msg.payload.to_ascii_uppercase();
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "shout"
///     }
/// }
///
/// let mut msg = Message::new("hello", StreamId::INVALID, 0);
/// Shout.apply(&mut msg).unwrap();
/// assert_eq!(msg.payload, b"HELLO");
/// ```
pub trait Formatter: Send + Sync {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError>;

    /// The configuration type name of this formatter.
    fn name(&self) -> &'static str;
}
