//! Device sessions.
//!
//! A session owns one authenticated shell on a device and moves through
//! a fixed lifecycle:
//!
//! ```text
//! Created --login ok--> Ready --execute*--> Ready --close--> Closed
//!    |                                                        ^
//!    +--------------------login failed-------------------------+
//! ```
//!
//! Login connects, moves the shell to privileged EXEC,
//! disables paging and reads the device name from the prompt. The name is
//! cached for the life of the session.

mod device;
mod response;
mod settings;

use std::fmt;
use std::future::Future;

pub use device::{ConnectionParams, DeviceSession};
pub use response::Response;
pub use settings::SessionSettings;

use crate::error::Result;
use crate::parse::Record;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Constructed, not connected.
    Created,
    /// Logged in; commands may be executed.
    Ready,
    /// Released. Terminal.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Created => "created",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        })
    }
}

/// How command output should be returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Parse into records with the platform's template for the command.
    #[default]
    Structured,
    /// Return the normalized text unparsed.
    Raw,
}

/// Output of [`Session::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Structured(Vec<Record>),
    Raw(String),
}

impl CommandOutput {
    /// Records for structured output, `None` for raw text.
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            CommandOutput::Structured(records) => Some(records),
            CommandOutput::Raw(_) => None,
        }
    }

    /// Text for raw output, `None` for records.
    pub fn into_text(self) -> Option<String> {
        match self {
            CommandOutput::Raw(text) => Some(text),
            CommandOutput::Structured(_) => None,
        }
    }
}

/// One authenticated command channel to a device.
pub trait Session: Send {
    /// Connect, authenticate, escalate and resolve the device name.
    ///
    /// Only valid in [`SessionState::Created`]. On failure the session is
    /// left [`SessionState::Closed`] with the transport released.
    fn login(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Run `command` and return its output with the echo and prompt removed.
    ///
    /// Only valid in [`SessionState::Ready`].
    fn execute(
        &mut self,
        command: &str,
        mode: OutputMode,
    ) -> impl Future<Output = Result<CommandOutput>> + Send;

    /// Release the transport. Calling it again is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Device name resolved at login.
    fn device_name(&self) -> Option<&str>;

    fn state(&self) -> SessionState;
}
