//! Transport capability consumed by device sessions.
//!
//! A [`Connector`] turns an [`SshConfig`] into an authenticated interactive
//! shell, exposed as a [`CommandChannel`]. The session layer only ever talks
//! to these traits, so tests and offline tooling can substitute the
//! scripted device from [`crate::mock`].

pub mod config;
mod ssh;

use std::time::Duration;

use async_trait::async_trait;
use regex::bytes::Regex;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::{SshChannel, SshConnector};

use crate::error::Result;

/// Opens authenticated shells on devices.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect, authenticate and request an interactive shell.
    ///
    /// Unreachable hosts and timeouts surface as transport errors;
    /// rejected credentials as
    /// [`AuthenticationFailed`](crate::error::TransportError::AuthenticationFailed).
    async fn connect(&self, config: &SshConfig) -> Result<Box<dyn CommandChannel>>;
}

/// An open interactive shell on a device.
#[async_trait]
pub trait CommandChannel: Send {
    /// Send a line of input. A line terminator is appended.
    async fn send(&mut self, input: &str) -> Result<()>;

    /// Read until `pattern` matches the tail of the received output.
    ///
    /// Returns everything received up to and including the match and
    /// clears the internal buffer.
    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>>;

    /// Release the shell and the underlying connection.
    async fn close(self: Box<Self>) -> Result<()>;
}
