//! Cisco NX-OS platform definition.
//!
//! NX-OS uses the same prompt shapes as IOS. Most accounts land directly in
//! privileged EXEC (`switch#`), so `enable` is rarely needed.
//!
//! ```text
//! switch#                 # privileged EXEC
//! switch(config)#         # configuration
//! switch(config-if)#      # configuration sub-mode (interface)
//! ```

use super::cisco_ios::prompts;
use crate::platform::PlatformDefinition;

/// Create the Cisco NX-OS platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new("cisco_nxos", prompts())
        .with_failure_pattern("% Invalid command")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("Syntax error while parsing")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CliMode;

    #[test]
    fn test_nxos_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_nxos");
        assert_eq!(platform.config_exit_command, "end");
    }

    #[test]
    fn test_prompts() {
        let platform = platform();
        assert_eq!(
            platform.prompts.mode_of("nx-spine-01#"),
            Some(CliMode::PrivilegedExec)
        );
        assert_eq!(
            platform.prompts.mode_of("nx-spine-01(config-if)#"),
            Some(CliMode::Config)
        );
    }

    #[test]
    fn test_failure_patterns() {
        let platform = platform();
        assert_eq!(
            platform.detect_failure("% Invalid command at '^' marker."),
            Some("% Invalid command")
        );
        assert!(platform.detect_failure("Syntax error while parsing 'show ip rout'").is_some());
    }
}
