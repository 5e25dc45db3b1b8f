//! Error types for netshow.
//!
//! Errors are layered per concern (configuration, transport, channel,
//! session, parsing, mapping) and wrapped by [`Error`]. Use
//! [`Error::kind`] to get the coarse classification callers report on.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netshow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Credential or parameter resolution errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Device session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Structured parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Result shaping errors
    #[error("Mapping error: {0}")]
    Mapper(#[from] MapperError),

    /// JSON encoding of a result envelope failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A failure while running or shaping one command on one device
    #[error("{host} ({platform}) '{command}': {source}")]
    Execute {
        host: String,
        platform: String,
        command: String,
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential resolution or invalid parameters. Not retryable.
    Config,
    /// Unreachable host, timeout, dropped connection. Retryable by the caller.
    Connection,
    /// Rejected credentials or enable secret.
    Auth,
    /// The device rejected the command.
    Command,
    /// Output did not match the expected structure.
    Parse,
    /// Operation issued in the wrong session state. Always a defect.
    InvalidState,
    /// A configured field was missing from a record.
    FieldNotFound,
    /// The envelope could not be encoded.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Connection => "connection",
            ErrorKind::Auth => "auth",
            ErrorKind::Command => "command",
            ErrorKind::Parse => "parse",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::FieldNotFound => "field not found",
            ErrorKind::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Attach the device and command a failure happened on.
    ///
    /// Errors that already name them are returned unchanged.
    pub fn in_command(
        self,
        host: impl Into<String>,
        platform: impl fmt::Display,
        command: impl Into<String>,
    ) -> Self {
        match self {
            Error::Execute { .. } | Error::Session(SessionError::CommandFailed { .. }) => self,
            source => Error::Execute {
                host: host.into(),
                platform: platform.to_string(),
                command: command.into(),
                source: Box::new(source),
            },
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Transport(TransportError::AuthenticationFailed { .. }) => ErrorKind::Auth,
            Error::Transport(_) | Error::Channel(_) => ErrorKind::Connection,
            Error::Session(e) => match e {
                SessionError::InvalidState { .. } => ErrorKind::InvalidState,
                SessionError::CommandFailed { .. } => ErrorKind::Command,
                SessionError::PrivilegeAcquisitionFailed { .. } => ErrorKind::Auth,
                SessionError::UnknownPrompt { .. } => ErrorKind::Connection,
            },
            Error::Parse(_) => ErrorKind::Parse,
            Error::Mapper(MapperError::FieldNotFound { .. }) => ErrorKind::FieldNotFound,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Execute { source, .. } => source.kind(),
        }
    }
}

/// Credential and parameter resolution errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required credential entry is not set
    #[error("Credential '{id}' is missing {var}")]
    MissingCredential { id: String, var: String },

    /// A required credential entry is set but empty
    #[error("Credential '{id}' has an empty {var}")]
    EmptyCredential { id: String, var: String },

    /// Credential identifier is empty or has characters that cannot form an env key
    #[error("Invalid credential id '{id}'")]
    InvalidCredentialId { id: String },

    /// Platform identifier is not one of the supported platforms
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// Interface state modifier is not one of "", "up", "down"
    #[error("Unknown interface state '{value}'")]
    UnknownInterfaceState { value: String },
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}' on {host}")]
    AuthenticationFailed { user: String, host: String },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connect or handshake timed out
    #[error("Connection to {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },
}

/// Channel layer errors (prompt matching on an open shell).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt not seen in time
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed by the remote side
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Device session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation not allowed in the current session state
    #[error("Cannot {operation} a session in state {state}")]
    InvalidState {
        operation: &'static str,
        state: crate::session::SessionState,
    },

    /// The device rejected the command
    #[error("{host} ({platform}) rejected '{command}': {message}")]
    CommandFailed {
        host: String,
        platform: String,
        command: String,
        message: String,
    },

    /// The device did not reach privileged EXEC (bad enable secret)
    #[error("Failed to reach privileged EXEC on {host}, still in {reached}")]
    PrivilegeAcquisitionFailed { host: String, reached: String },

    /// Prompt matched no known CLI mode
    #[error("Unrecognized prompt '{prompt}' from {host}")]
    UnknownPrompt { host: String, prompt: String },
}

/// Structured parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No template is registered for this platform and command
    #[error("No template for '{command}' on {platform}")]
    NoTemplate { platform: String, command: String },

    /// The template failed to compile or the output did not fit it
    #[error("Template for '{command}' on {platform} failed: {message}")]
    Template {
        platform: String,
        command: String,
        message: String,
    },
}

/// Result shaping errors.
#[derive(Error, Debug)]
pub enum MapperError {
    /// A field configured for removal is absent from a record
    #[error("Field '{field}' not found in record {index}")]
    FieldNotFound { field: String, index: usize },
}

/// Result type alias using netshow's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    #[test]
    fn test_kind_classification() {
        let err: Error = ConfigError::UnknownPlatform {
            name: "junos".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err: Error = TransportError::AuthenticationFailed {
            user: "admin".into(),
            host: "10.0.0.1".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Auth);

        let err: Error = TransportError::Timeout {
            host: "10.0.0.1".into(),
            timeout: Duration::from_secs(5),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Connection);

        let err: Error = ChannelError::Closed.into();
        assert_eq!(err.kind(), ErrorKind::Connection);

        let err: Error = SessionError::InvalidState {
            operation: "execute",
            state: SessionState::Closed,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err: Error = SessionError::PrivilegeAcquisitionFailed {
            host: "r1".into(),
            reached: "user_exec".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Auth);

        let err: Error = MapperError::FieldNotFound {
            field: "uptime".into(),
            index: 0,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn test_command_error_message_has_context() {
        let err = SessionError::CommandFailed {
            host: "10.0.0.1".into(),
            platform: "cisco_ios".into(),
            command: "show ip rout".into(),
            message: "% Invalid input detected at '^' marker.".into(),
        };
        let text = err.to_string();
        assert!(text.contains("10.0.0.1"));
        assert!(text.contains("cisco_ios"));
        assert!(text.contains("show ip rout"));
        assert!(text.contains("% Invalid input"));
    }

    #[test]
    fn test_in_command_keeps_kind_and_adds_context() {
        let err = Error::from(ChannelError::PatternTimeout(Duration::from_secs(30))).in_command(
            "10.0.0.1",
            "cisco_ios",
            "show ip route",
        );
        assert_eq!(err.kind(), ErrorKind::Connection);
        let text = err.to_string();
        assert!(text.contains("10.0.0.1"));
        assert!(text.contains("cisco_ios"));
        assert!(text.contains("show ip route"));
        assert!(text.contains("30s"));

        let err: Error = MapperError::FieldNotFound {
            field: "uptime".into(),
            index: 2,
        }
        .into();
        let err = err.in_command("10.0.0.1", "cisco_ios", "show ip route");
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn test_in_command_does_not_wrap_twice() {
        let err = Error::from(ChannelError::Closed)
            .in_command("10.0.0.1", "cisco_ios", "show vlan")
            .in_command("10.0.0.1", "cisco_ios", "show vlan");
        assert!(matches!(
            &err,
            Error::Execute { source, .. } if matches!(**source, Error::Channel(_))
        ));

        let failed: Error = SessionError::CommandFailed {
            host: "10.0.0.1".into(),
            platform: "cisco_ios".into(),
            command: "show ip rout".into(),
            message: "% Invalid input".into(),
        }
        .into();
        let failed = failed.in_command("10.0.0.1", "cisco_ios", "show ip rout");
        assert!(matches!(failed, Error::Session(SessionError::CommandFailed { .. })));
    }
}
