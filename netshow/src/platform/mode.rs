//! Cisco CLI modes and the prompts that identify them.

use std::fmt;

use regex::bytes::Regex;

/// Where the Cisco CLI is, as told by the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CliMode {
    /// User EXEC, `R1>`.
    UserExec,
    /// Privileged EXEC, `R1#`. Show commands run here.
    PrivilegedExec,
    /// Global or nested configuration, `R1(config-if)#`.
    Config,
}

impl CliMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CliMode::UserExec => "user_exec",
            CliMode::PrivilegedExec => "privileged_exec",
            CliMode::Config => "config",
        }
    }
}

impl fmt::Display for CliMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled prompt patterns for one platform.
///
/// Every pattern is anchored to the end of the output, so they can be run
/// against a whole read without isolating the last line first.
#[derive(Debug, Clone)]
pub struct Prompts {
    user_exec: Regex,
    privileged_exec: Regex,
    config: Regex,
    password: Regex,
    any: Regex,
    password_or_any: Regex,
}

impl Prompts {
    pub fn new(
        user_exec: &str,
        privileged_exec: &str,
        config: &str,
        password: &str,
    ) -> Result<Self, regex::Error> {
        let any = format!("(?:{user_exec})|(?:{privileged_exec})|(?:{config})");
        Ok(Self {
            user_exec: Regex::new(user_exec)?,
            privileged_exec: Regex::new(privileged_exec)?,
            config: Regex::new(config)?,
            password: Regex::new(password)?,
            password_or_any: Regex::new(&format!("(?:{password})|{any}"))?,
            any: Regex::new(&any)?,
        })
    }

    /// Matches a prompt of any mode.
    pub fn any(&self) -> &Regex {
        &self.any
    }

    /// Matches the enable password prompt or a prompt of any mode.
    pub fn password_or_any(&self) -> &Regex {
        &self.password_or_any
    }

    /// Whether `data` ends in the enable password prompt.
    pub fn is_password(&self, data: &[u8]) -> bool {
        self.password.is_match(data)
    }

    /// The mode a prompt belongs to.
    pub fn mode_of(&self, prompt: &str) -> Option<CliMode> {
        let prompt = prompt.as_bytes();
        if self.config.is_match(prompt) {
            Some(CliMode::Config)
        } else if self.privileged_exec.is_match(prompt) {
            Some(CliMode::PrivilegedExec)
        } else if self.user_exec.is_match(prompt) {
            Some(CliMode::UserExec)
        } else {
            None
        }
    }

    pub fn is_prompt(&self, line: &str) -> bool {
        self.any.is_match(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn test_mode_of() {
        let prompts = Platform::CiscoIos.definition().prompts;
        assert_eq!(prompts.mode_of("R1>"), Some(CliMode::UserExec));
        assert_eq!(prompts.mode_of("edge-rtr.lab> "), Some(CliMode::UserExec));
        assert_eq!(prompts.mode_of("\r\nR1# "), Some(CliMode::PrivilegedExec));
        assert_eq!(prompts.mode_of("R1(config)#"), Some(CliMode::Config));
        assert_eq!(prompts.mode_of("R1(config-router)# "), Some(CliMode::Config));
        assert_eq!(prompts.mode_of("Password:"), None);
    }

    #[test]
    fn test_password_prompt() {
        let prompts = Platform::CiscoIos.definition().prompts;
        assert!(prompts.is_password(b"enable\r\nPassword: "));
        assert!(!prompts.is_password(b"R1#"));
        assert!(prompts.password_or_any().is_match(b"enable\r\nPassword: "));
        assert!(prompts.password_or_any().is_match(b"enable\r\nR1#"));
        assert!(!prompts.any().is_match(b"enable\r\nPassword: "));
    }
}
