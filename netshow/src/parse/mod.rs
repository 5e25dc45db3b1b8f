//! Structured parsing of show command output.
//!
//! Parsing is a capability consumed by the session layer through the
//! [`OutputParser`] trait. [`TextFsmParser`] is the built-in
//! implementation, backed by TextFSM templates.

mod record;
mod textfsm;

pub use record::Record;
pub use textfsm::TextFsmParser;

use crate::error::ParseError;
use crate::platform::Platform;

/// Turns raw command output into ordered records.
pub trait OutputParser: Send + Sync {
    /// Parse the output of `command` as printed by a `platform` device.
    ///
    /// `output` has the echoed command and trailing prompt already removed.
    fn parse(&self, platform: Platform, command: &str, output: &str)
    -> Result<Vec<Record>, ParseError>;
}
