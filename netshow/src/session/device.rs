//! Session implementation over a [`Connector`].

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, trace, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::response::Response;
use super::settings::SessionSettings;
use super::{CommandOutput, OutputMode, Session, SessionState};
use crate::credentials::CredentialSet;
use crate::error::{ChannelError, Error, Result, SessionError};
use crate::parse::OutputParser;
use crate::platform::{CliMode, Platform, PlatformDefinition};
use crate::transport::{AuthMethod, CommandChannel, Connector, SshConfig};

/// Where and as whom to open a session.
#[derive(Debug)]
pub struct ConnectionParams {
    pub host: String,
    pub platform: Platform,
    pub credentials: CredentialSet,
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>, platform: Platform, credentials: CredentialSet) -> Self {
        Self {
            host: host.into(),
            platform,
            credentials,
        }
    }
}

/// A session on one device, driven through a prompt-matching shell.
pub struct DeviceSession {
    host: String,
    platform: Platform,
    definition: PlatformDefinition,

    username: String,
    /// Taken when the connection is made.
    password: Option<SecretString>,
    enable_secret: SecretString,

    connector: Arc<dyn Connector>,
    parser: Arc<dyn OutputParser>,
    settings: SessionSettings,

    channel: Option<Box<dyn CommandChannel>>,
    state: SessionState,
    mode: Option<CliMode>,
    device_name: Option<String>,
}

impl DeviceSession {
    /// Create a session. Nothing is sent until [`login`](Session::login).
    pub fn open(
        params: ConnectionParams,
        connector: Arc<dyn Connector>,
        parser: Arc<dyn OutputParser>,
        settings: SessionSettings,
    ) -> Self {
        let (username, password, enable_secret) = params.credentials.into_parts();

        Self {
            host: params.host,
            platform: params.platform,
            definition: params.platform.definition(),
            username,
            password: Some(password),
            enable_secret,
            connector,
            parser,
            settings,
            channel: None,
            state: SessionState::Created,
            mode: None,
            device_name: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// CLI mode seen in the last prompt.
    pub fn mode(&self) -> Option<CliMode> {
        self.mode
    }

    /// Send a command and collect its output up to the next prompt.
    ///
    /// A rejected command is not an error here; check
    /// [`Response::is_success`].
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();

        let channel = self.channel.as_mut().ok_or(ChannelError::Closed)?;
        channel.send(command).await?;

        let (raw, prompt) = self.read_until_prompt().await?;
        match self.definition.prompts.mode_of(&prompt) {
            Some(mode) => self.mode = Some(mode),
            None => trace!("{}: no mode for prompt '{}'", self.host, prompt),
        }

        let result = self.definition.normalize_output(&raw, command);
        let failure = self.definition.detect_failure(&result).map(str::to_string);
        let response = Response::new(command, result, prompt, start.elapsed());

        Ok(match failure {
            Some(marker) => response.with_failure(marker),
            None => response,
        })
    }

    fn ensure_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            }
            .into())
        }
    }

    fn ssh_config(&mut self) -> SshConfig {
        SshConfig {
            host: self.host.clone(),
            port: self.settings.port,
            username: self.username.clone(),
            auth: self
                .password
                .take()
                .map_or(AuthMethod::None, AuthMethod::Password),
            connect_timeout: self.settings.connect_timeout,
            terminal_width: self.settings.terminal_width,
            terminal_height: self.settings.terminal_height,
            search_depth: self.settings.search_depth,
            host_key_verification: self.settings.host_key_verification.clone(),
            known_hosts_path: self.settings.known_hosts_path.clone(),
        }
    }

    /// Everything login does after the state check.
    async fn establish(&mut self) -> Result<()> {
        let config = self.ssh_config();
        debug!("connecting to {} ({})", config.socket_addr(), self.platform);
        let channel = self.connector.connect(&config).await?;
        self.channel = Some(channel);

        let (_, prompt) = self.read_until_prompt().await?;
        let mode = self.definition.prompts.mode_of(&prompt).ok_or_else(|| {
            SessionError::UnknownPrompt {
                host: self.host.clone(),
                prompt: prompt.clone(),
            }
        })?;
        debug!("{}: initial prompt '{}' ({})", self.host, prompt, mode);
        self.mode = Some(mode);

        self.enter_privileged_exec().await?;

        for command in self.definition.on_open_commands.clone() {
            let response = self.send_command(&command).await?;
            if let Some(text) = response.error_text() {
                warn!("{}: '{}' rejected: {}", self.host, command, text);
            }
        }

        self.identify().await
    }

    /// Resolve the device name from a fresh prompt.
    async fn identify(&mut self) -> Result<()> {
        let channel = self.channel.as_mut().ok_or(ChannelError::Closed)?;
        channel.send("").await?;
        let (_, prompt) = self.read_until_prompt().await?;

        let name = self
            .definition
            .device_name_from_prompt(&prompt)
            .unwrap_or_else(|| {
                debug!("{}: no name in prompt '{}', using host", self.host, prompt);
                self.host.clone()
            });
        self.device_name = Some(name);
        Ok(())
    }

    /// Bring the shell to privileged EXEC, where show commands run.
    ///
    /// From user EXEC this sends `enable` and answers the password prompt
    /// with the enable secret, but only if the device asks for it. A second
    /// password prompt means the secret was rejected.
    async fn enter_privileged_exec(&mut self) -> Result<()> {
        match self.mode {
            Some(CliMode::PrivilegedExec) => return Ok(()),
            Some(CliMode::Config) => {
                let command = self.definition.config_exit_command.clone();
                debug!("{}: leaving configuration via '{}'", self.host, command);
                self.send_command(&command).await?;
            }
            Some(CliMode::UserExec) | None => {
                debug!("{}: escalating via '{}'", self.host, self.definition.enable_command);
                let prompts = &self.definition.prompts;
                let timeout = self.settings.command_timeout;
                let channel = self.channel.as_mut().ok_or(ChannelError::Closed)?;

                channel.send(&self.definition.enable_command).await?;
                let mut data = channel.read_until(prompts.password_or_any(), timeout).await?;
                if prompts.is_password(&data) {
                    channel.send(self.enable_secret.expose_secret()).await?;
                    data = channel.read_until(prompts.password_or_any(), timeout).await?;
                    if prompts.is_password(&data) {
                        return Err(self.escalation_failed());
                    }
                }

                let prompt = prompt_of(prompts.any(), &data);
                self.mode = self.definition.prompts.mode_of(&prompt);
            }
        }

        if self.mode == Some(CliMode::PrivilegedExec) {
            Ok(())
        } else {
            Err(self.escalation_failed())
        }
    }

    fn escalation_failed(&self) -> Error {
        SessionError::PrivilegeAcquisitionFailed {
            host: self.host.clone(),
            reached: self
                .mode
                .map_or_else(|| "an unknown mode".to_string(), |mode| mode.to_string()),
        }
        .into()
    }

    /// Read up to the next prompt. Returns the full output and the prompt.
    async fn read_until_prompt(&mut self) -> Result<(String, String)> {
        let channel = self.channel.as_mut().ok_or(ChannelError::Closed)?;
        let prompt = self.definition.prompts.any();
        let data = channel
            .read_until(prompt, self.settings.command_timeout)
            .await?;

        let last = prompt_of(prompt, &data);
        Ok((String::from_utf8_lossy(&data).into_owned(), last))
    }

    async fn release(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                warn!("{}: error closing channel: {}", self.host, e);
            }
        }
    }
}

/// The prompt at the end of `data`, trimmed.
fn prompt_of(pattern: &Regex, data: &[u8]) -> String {
    pattern
        .find(data)
        .map(|m| String::from_utf8_lossy(&data[m.start()..]).trim().to_string())
        .unwrap_or_default()
}

impl Session for DeviceSession {
    async fn login(&mut self) -> Result<()> {
        self.ensure_state(SessionState::Created, "log in")?;

        match self.establish().await {
            Ok(()) => {
                self.state = SessionState::Ready;
                info!(
                    "logged in to {} ({}) as {}",
                    self.device_name.as_deref().unwrap_or(&self.host),
                    self.platform,
                    self.username
                );
                Ok(())
            }
            Err(e) => {
                debug!("login to {} failed: {}", self.host, e);
                self.release().await;
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }

    async fn execute(&mut self, command: &str, mode: OutputMode) -> Result<CommandOutput> {
        self.ensure_state(SessionState::Ready, "execute on")?;

        let response = self
            .send_command(command)
            .await
            .map_err(|e| e.in_command(&self.host, self.platform, command))?;
        debug!(
            "{}: '{}' returned {} bytes in {:?}",
            self.host,
            command,
            response.result.len(),
            response.elapsed
        );

        if let Some(text) = response.error_text() {
            return Err(SessionError::CommandFailed {
                host: self.host.clone(),
                platform: self.platform.to_string(),
                command: command.to_string(),
                message: text.to_string(),
            }
            .into());
        }

        match mode {
            OutputMode::Raw => Ok(CommandOutput::Raw(response.result)),
            OutputMode::Structured => {
                let records = self
                    .parser
                    .parse(self.platform, command, &response.result)
                    .map_err(|e| Error::from(e).in_command(&self.host, self.platform, command))?;
                Ok(CommandOutput::Structured(records))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;

        if let Some(channel) = self.channel.take() {
            debug!("closing session to {}", self.host);
            channel.close().await?;
        }
        Ok(())
    }

    fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    fn state(&self) -> SessionState {
        self.state
    }
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("host", &self.host)
            .field("platform", &self.platform)
            .field("username", &self.username)
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        if self.channel.is_some() {
            warn!("session to {} dropped without close", self.host);
        }
    }
}
