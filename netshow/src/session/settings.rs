//! Per-session connection settings.

use std::path::PathBuf;
use std::time::Duration;

use crate::transport::HostKeyVerification;

/// Tunables applied to every session a collector opens.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use netshow::session::SessionSettings;
///
/// let settings = SessionSettings::new()
///     .port(2222)
///     .command_timeout(Duration::from_secs(60));
/// assert_eq!(settings.port, 2222);
/// ```
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub port: u16,

    /// Bound on TCP connect, SSH handshake and authentication.
    pub connect_timeout: Duration,

    /// Bound on each wait for a prompt.
    pub command_timeout: Duration,

    pub host_key_verification: HostKeyVerification,

    /// known_hosts file; `~/.ssh/known_hosts` when unset.
    pub known_hosts_path: Option<PathBuf>,

    pub terminal_width: u32,
    pub terminal_height: u32,

    /// Bytes of output tail scanned for prompts.
    pub search_depth: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            port: 22,
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            terminal_width: 511,
            terminal_height: 24,
            search_depth: 1000,
        }
    }
}

impl SessionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SessionSettings::default();
        assert_eq!(settings.port, 22);
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
        assert_eq!(settings.command_timeout, Duration::from_secs(30));
        assert_eq!(settings.host_key_verification, HostKeyVerification::AcceptNew);
        assert_eq!((settings.terminal_width, settings.terminal_height), (511, 24));
        assert_eq!(settings.search_depth, 1000);
    }

    #[test]
    fn test_builder() {
        let settings = SessionSettings::new()
            .port(830)
            .host_key_verification(HostKeyVerification::Strict)
            .known_hosts_path("/tmp/known_hosts")
            .terminal_size(200, 50)
            .search_depth(4096);
        assert_eq!(settings.port, 830);
        assert_eq!(settings.host_key_verification, HostKeyVerification::Strict);
        assert!(settings.known_hosts_path.is_some());
        assert_eq!(settings.terminal_width, 200);
        assert_eq!(settings.search_depth, 4096);
    }
}
