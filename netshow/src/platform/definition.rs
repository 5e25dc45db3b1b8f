//! Platform definition for vendor-specific CLI behavior.

use once_cell::sync::Lazy;
use regex::Regex as TextRegex;

use super::mode::Prompts;

/// `R1#`, `R1>`, `R1(config-if)#` -> `R1`
static PROMPT_NAME: Lazy<TextRegex> = Lazy::new(|| {
    TextRegex::new(r"^(?P<name>.+?)(?:\(conf[^)]*\))?[#>]\s*$").expect("valid prompt name regex")
});

/// Prompts, mode commands and failure markers for one platform.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios", "cisco_nxos").
    pub name: String,

    pub prompts: Prompts,

    /// Moves user EXEC to privileged EXEC.
    pub enable_command: String,

    /// Leaves any configuration mode for privileged EXEC.
    pub config_exit_command: String,

    /// Output markers that mean the device rejected a command.
    pub failed_when_contains: Vec<String>,

    /// Commands run once after login (paging off, wide terminal).
    pub on_open_commands: Vec<String>,
}

impl PlatformDefinition {
    pub fn new(name: impl Into<String>, prompts: Prompts) -> Self {
        Self {
            name: name.into(),
            prompts,
            enable_command: "enable".to_string(),
            config_exit_command: "end".to_string(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
        }
    }

    /// Rename (used for platforms that share another's definition).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Strip the echoed command and the trailing prompt from raw output.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let text = raw.replace("\r\n", "\n").replace('\r', "");
        let mut lines: Vec<&str> = text.lines().collect();

        let command = command.trim();
        if !command.is_empty()
            && lines
                .first()
                .is_some_and(|first| first.trim_end().ends_with(command))
        {
            lines.remove(0);
        }

        if lines
            .last()
            .is_some_and(|last| self.prompts.is_prompt(last.trim_end()))
        {
            lines.pop();
        }

        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }

    /// The first failure marker contained in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// Device identity as shown in its prompt.
    pub fn device_name_from_prompt(&self, prompt: &str) -> Option<String> {
        let prompt = prompt.trim();
        PROMPT_NAME
            .captures(prompt)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str().to_string())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use crate::platform::Platform;

    #[test]
    fn test_device_name_from_prompt() {
        let platform = Platform::CiscoIos.definition();
        assert_eq!(platform.device_name_from_prompt("R1#").as_deref(), Some("R1"));
        assert_eq!(platform.device_name_from_prompt("R1>").as_deref(), Some("R1"));
        assert_eq!(
            platform.device_name_from_prompt("core-sw.lab(config-if)#").as_deref(),
            Some("core-sw.lab")
        );
        assert_eq!(platform.device_name_from_prompt("\r\nR1# ").as_deref(), Some("R1"));
        assert_eq!(platform.device_name_from_prompt("#"), None);
    }

    #[test]
    fn test_normalize_output() {
        let platform = Platform::CiscoIos.definition();
        let raw = "show ip arp\r\nProtocol  Address\r\nInternet  10.0.0.1\r\nR1#";
        assert_eq!(
            platform.normalize_output(raw, "show ip arp"),
            "Protocol  Address\nInternet  10.0.0.1"
        );
    }

    #[test]
    fn test_normalize_output_keeps_non_prompt_tail() {
        let platform = Platform::CiscoIos.definition();
        let raw = "show vlan\r\n1    default    active\r\n";
        assert_eq!(platform.normalize_output(raw, "show vlan"), "1    default    active");
    }

    #[test]
    fn test_detect_failure() {
        let platform = Platform::CiscoIos.definition();
        assert_eq!(
            platform.detect_failure("        ^\n% Invalid input detected at '^' marker."),
            Some("% Invalid input")
        );
        assert_eq!(platform.detect_failure("Internet  10.0.0.1"), None);
    }

    #[test]
    fn test_any_prompt_matches_every_mode() {
        for platform in Platform::ALL {
            let definition = platform.definition();
            let pattern = definition.prompts.any();
            assert!(pattern.is_match(b"output\r\nR1>"));
            assert!(pattern.is_match(b"output\r\nR1#"));
            assert!(pattern.is_match(b"output\r\nR1(config)#"));
            assert!(!pattern.is_match(b"R1# show ip route\r\n"));
        }
    }
}
