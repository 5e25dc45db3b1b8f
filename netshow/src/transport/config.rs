//! Per-connection SSH parameters, derived from session settings and credentials.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For lab use only.
    Disabled,
}

/// Everything a [`Connector`](super::Connector) needs to open a shell on one device.
#[derive(Debug)]
pub struct SshConfig {
    /// Device address.
    pub host: String,

    /// SSH port.
    pub port: u16,

    pub username: String,

    pub auth: AuthMethod,

    /// Bound on TCP connect, handshake and authentication.
    pub connect_timeout: Duration,

    /// PTY size requested with the shell.
    pub terminal_width: u32,
    pub terminal_height: u32,

    /// Bytes of output tail searched for prompts.
    pub search_depth: usize,

    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file (defaults to ~/.ssh/known_hosts).
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// `host:port`, as passed to the TCP connect.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How the client proves its identity.
#[derive(Debug)]
pub enum AuthMethod {
    /// `none` method. Only useful against lab or mock devices.
    None,

    /// The SSH `password` method.
    Password(SecretString),
}
