//! Scripted in-memory device for tests and offline demos.
//!
//! [`MockDevice`] behaves like a small Cisco CLI: it echoes input, prints a
//! `name>` or `name#` prompt, answers `enable` with a `Password:` prompt and
//! replies to known commands with canned output. Anything else gets the
//! usual `% Invalid input` marker.
//!
//! ```rust
//! use netshow::mock::{MockConnector, MockDevice};
//!
//! let connector = MockConnector::new(
//!     MockDevice::new("R1")
//!         .with_enable_secret("enable123")
//!         .with_response("show vlan", "1    default    active    Gi0/1"),
//! );
//! assert_eq!(connector.connect_count(), 0);
//! ```

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use regex::bytes::Regex;
use secrecy::ExposeSecret;

use crate::commands::base_command;
use crate::error::{ChannelError, Result, TransportError};
use crate::transport::{AuthMethod, CommandChannel, Connector, SshConfig};

const INVALID_INPUT: &str = "% Invalid input detected at '^' marker.";

/// Canned CLI behavior of one device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    hostname: String,
    privileged: bool,
    configuring: bool,
    login: Option<(String, String)>,
    enable_secret: Option<String>,
    banner: String,
    responses: HashMap<String, String>,
    stalled: HashSet<String>,
}

impl MockDevice {
    /// A device that starts in user EXEC and accepts any login.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            privileged: false,
            configuring: false,
            login: None,
            enable_secret: None,
            banner: String::new(),
            responses: HashMap::new(),
            stalled: HashSet::new(),
        }
    }

    /// Land directly in privileged EXEC after login.
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    /// Land in global configuration after login, as a shell someone left
    /// in `configure terminal` would.
    pub fn in_configuration_mode(mut self) -> Self {
        self.privileged = true;
        self.configuring = true;
        self
    }

    /// Only accept this username and password.
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some((username.into(), password.into()));
        self
    }

    /// Require this secret after `enable`.
    pub fn with_enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(secret.into());
        self
    }

    /// Text printed before the first prompt.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Output printed for `command`.
    ///
    /// `| include <word>` modifiers sent by callers are applied to this
    /// output line by line.
    pub fn with_response(mut self, command: &str, output: impl Into<String>) -> Self {
        self.responses.insert(base_command(command), output.into());
        self
    }

    /// Echo `command` but never print the prompt after it.
    pub fn with_stalled_command(mut self, command: &str) -> Self {
        self.stalled.insert(base_command(command));
        self
    }

    fn accepts(&self, config: &SshConfig) -> bool {
        let Some((username, password)) = &self.login else {
            return true;
        };
        let offered = match &config.auth {
            AuthMethod::Password(secret) => secret.expose_secret(),
            AuthMethod::None => return false,
        };
        config.username == *username && offered == password
    }
}

/// How the next connection attempt behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reachability {
    Reachable,
    Unreachable,
    TimesOut,
}

/// [`Connector`] handing out shells on a [`MockDevice`].
///
/// Clones share counters and the command log, so a test can keep one
/// clone for assertions and give the other to the code under test.
#[derive(Debug, Clone)]
pub struct MockConnector {
    device: MockDevice,
    reachability: Reachability,
    connects: Arc<AtomicUsize>,
    open_channels: Arc<AtomicUsize>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(device: MockDevice) -> Self {
        Self {
            device,
            reachability: Reachability::Reachable,
            connects: Arc::new(AtomicUsize::new(0)),
            open_channels: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Refuse every connection.
    pub fn unreachable(mut self) -> Self {
        self.reachability = Reachability::Unreachable;
        self
    }

    /// Fail every connection with a connect timeout.
    pub fn timing_out(mut self) -> Self {
        self.reachability = Reachability::TimesOut;
        self
    }

    /// Number of connection attempts made.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of shells handed out and not yet closed.
    pub fn open_channels(&self) -> usize {
        self.open_channels.load(Ordering::SeqCst)
    }

    /// Every line sent to any shell, in order. Enable secrets are not recorded.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, config: &SshConfig) -> Result<Box<dyn CommandChannel>> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        match self.reachability {
            Reachability::Unreachable => {
                return Err(TransportError::ConnectionFailed {
                    host: config.host.clone(),
                    port: config.port,
                    source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
                }
                .into());
            }
            Reachability::TimesOut => {
                return Err(TransportError::Timeout {
                    host: config.host.clone(),
                    timeout: config.connect_timeout,
                }
                .into());
            }
            Reachability::Reachable => {}
        }

        if !self.device.accepts(config) {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
                host: config.host.clone(),
            }
            .into());
        }

        self.open_channels.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockChannel::new(
            self.device.clone(),
            self.sent.clone(),
            self.open_channels.clone(),
        )))
    }
}

/// Shell on a [`MockDevice`]. Output is produced synchronously on `send`.
struct MockChannel {
    device: MockDevice,
    privileged: bool,
    configuring: bool,
    awaiting_secret: bool,
    pending: String,
    sent: Arc<Mutex<Vec<String>>>,
    open_channels: Arc<AtomicUsize>,
}

impl MockChannel {
    fn new(
        device: MockDevice,
        sent: Arc<Mutex<Vec<String>>>,
        open_channels: Arc<AtomicUsize>,
    ) -> Self {
        let mut channel = Self {
            privileged: device.privileged,
            configuring: device.configuring,
            awaiting_secret: false,
            pending: String::new(),
            device,
            sent,
            open_channels,
        };
        if !channel.device.banner.is_empty() {
            channel.pending.push_str(&channel.device.banner.replace('\n', "\r\n"));
            channel.pending.push_str("\r\n");
        }
        channel.push_prompt();
        channel
    }

    fn push_prompt(&mut self) {
        let mark = match (self.configuring, self.privileged) {
            (true, _) => "(config)#",
            (false, true) => "#",
            (false, false) => ">",
        };
        self.pending.push_str(&format!("\r\n{}{}", self.device.hostname, mark));
    }

    fn push_output(&mut self, output: &str) {
        for line in output.lines() {
            self.pending.push_str(line);
            self.pending.push_str("\r\n");
        }
    }

    fn answer_secret(&mut self, input: &str) {
        self.awaiting_secret = false;
        self.pending.push_str("\r\n");
        if self.device.enable_secret.as_deref() == Some(input) {
            self.privileged = true;
        } else {
            self.pending.push_str("% Access denied\r\n");
        }
        self.push_prompt();
    }

    fn answer_command(&mut self, input: &str) {
        self.pending.push_str(input);
        self.pending.push_str("\r\n");

        let command = base_command(input);
        if self.device.stalled.contains(&command) {
            return;
        }

        match command.as_str() {
            "" => {}
            "end" if self.configuring => self.configuring = false,
            "enable" if !self.privileged => match self.device.enable_secret {
                Some(_) => {
                    self.pending.push_str("Password: ");
                    self.awaiting_secret = true;
                    return;
                }
                None => self.privileged = true,
            },
            "enable" => {}
            "disable" => self.privileged = false,
            c if c.starts_with("terminal ") => {}
            _ => match self.device.responses.get(&command) {
                Some(output) => {
                    let output = apply_include(input, output);
                    self.push_output(&output);
                }
                None => {
                    self.pending.push_str("           ^\r\n");
                    self.pending.push_str(INVALID_INPUT);
                    self.pending.push_str("\r\n");
                }
            },
        }
        self.push_prompt();
    }
}

/// Keep the lines containing the word after `| include`, if any.
fn apply_include(input: &str, output: &str) -> String {
    let filter = input
        .split_once('|')
        .and_then(|(_, modifier)| modifier.trim().strip_prefix("include"))
        .map(str::trim)
        .filter(|word| !word.is_empty());

    match filter {
        Some(word) => output
            .lines()
            .filter(|line| line.contains(word))
            .collect::<Vec<_>>()
            .join("\n"),
        None => output.to_string(),
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn send(&mut self, input: &str) -> Result<()> {
        if self.awaiting_secret {
            self.answer_secret(input);
            return Ok(());
        }

        trace!("{} <- {:?}", self.device.hostname, input);
        if let Ok(mut log) = self.sent.lock() {
            log.push(input.to_string());
        }
        self.answer_command(input);
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        if pattern.is_match(self.pending.as_bytes()) {
            Ok(std::mem::take(&mut self.pending).into_bytes())
        } else {
            Err(ChannelError::PatternTimeout(timeout).into())
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.open_channels.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
