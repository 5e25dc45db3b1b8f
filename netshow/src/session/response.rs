//! Result of one command sent on a session.

use std::fmt;
use std::time::Duration;

/// Output of a single command, with echo and prompt removed.
#[derive(Debug, Clone)]
pub struct Response {
    pub command: String,

    /// Normalized output: command echo and trailing prompt removed.
    pub result: String,

    /// The prompt that ended the output.
    pub prompt: String,

    pub elapsed: Duration,

    /// The failure marker found in the output, if the device rejected the command.
    pub failure_message: Option<String>,
}

impl Response {
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// The device's error text: the output line carrying the failure marker.
    ///
    /// Falls back to the marker itself when it cannot be located.
    pub fn error_text(&self) -> Option<&str> {
        let marker = self.failure_message.as_deref()?;
        Some(
            self.result
                .lines()
                .map(str::trim)
                .find(|line| line.contains(marker))
                .unwrap_or(marker),
        )
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_text_is_device_line() {
        let response = Response::new(
            "show ip rout",
            "           ^\n% Invalid input detected at '^' marker.",
            "R1#",
            Duration::ZERO,
        )
        .with_failure("% Invalid input");

        assert!(!response.is_success());
        assert_eq!(
            response.error_text(),
            Some("% Invalid input detected at '^' marker.")
        );
    }

    #[test]
    fn test_success_has_no_error_text() {
        let response = Response::new("show vlan", "1 default", "R1#", Duration::ZERO);
        assert!(response.is_success());
        assert_eq!(response.error_text(), None);
    }
}
