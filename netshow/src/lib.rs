//! # netshow
//!
//! Collect operational state from network devices over SSH as JSON.
//!
//! netshow logs in to a Cisco device, runs one show command, parses the
//! output with TextFSM templates and wraps the records with the device's
//! name in a JSON-ready envelope.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, with prompt detection on the output tail
//! - Privilege escalation with `enable` and an enable secret
//! - Built-in templates for ARP, CDP, interfaces, VLANs and routes on
//!   IOS, IOS-XE and NX-OS
//! - Credentials resolved from `{ID}_USERNAME` / `_PASSWORD` / `_SECRET`
//! - A scripted mock device for tests and offline work
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netshow::{Collector, DeviceTarget, InterfaceState, Platform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netshow::Error> {
//!     let collector = Collector::from_env();
//!     let target = DeviceTarget::new("192.168.1.1", Platform::CiscoIos, "gns3");
//!
//!     let interfaces = collector
//!         .show_ifaces_all(&target, InterfaceState::Up)
//!         .await?;
//!     println!("{}", interfaces.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod collector;
pub mod commands;
pub mod credentials;
pub mod error;
pub mod mapper;
pub mod mock;
pub mod parse;
pub mod platform;
pub mod session;
pub mod transport;

pub use collector::{Collector, DeviceTarget};
pub use commands::{InterfaceState, ShowCommand};
pub use credentials::{CredentialSet, CredentialStore};
pub use error::{Error, ErrorKind, Result};
pub use mapper::{FieldFilter, MissingField, Payload, ResultEnvelope, ResultKind};
pub use parse::{OutputParser, Record, TextFsmParser};
pub use platform::{CliMode, Platform, PlatformDefinition, Prompts};
pub use session::{
    CommandOutput, ConnectionParams, DeviceSession, OutputMode, Response, Session, SessionSettings,
    SessionState,
};
pub use transport::{
    AuthMethod, CommandChannel, Connector, HostKeyVerification, SshConfig, SshConnector,
};
