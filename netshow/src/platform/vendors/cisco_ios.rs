//! Cisco IOS / IOS-XE platform definition.
//!
//! ```text
//! R1>                     # user EXEC
//! R1#                     # privileged EXEC, where show commands run
//! R1(config)#             # configuration
//! R1(config-if)#          # configuration sub-mode (interface)
//! ```
//!
//! Login lands in user EXEC or privileged EXEC. From user EXEC `enable`
//! moves up, answering `Password:` with the enable secret when asked. A
//! session left in configuration mode is brought back with `end`.

use crate::platform::{PlatformDefinition, Prompts};

pub(crate) const USER_EXEC_PROMPT: &str = r"(?i)(?:^|[\r\n])[\w.\-@/:]{1,63}>\s*$";
pub(crate) const PRIVILEGED_EXEC_PROMPT: &str = r"(?i)(?:^|[\r\n])[\w.\-@/:]{1,63}#\s*$";
pub(crate) const CONFIG_PROMPT: &str =
    r"(?i)(?:^|[\r\n])[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,63}\)#\s*$";
pub(crate) const ENABLE_PASSWORD_PROMPT: &str = r"(?i)(?:^|[\r\n])\s*password:\s*$";

/// Prompt patterns shared by the Cisco platforms.
pub(crate) fn prompts() -> Prompts {
    Prompts::new(
        USER_EXEC_PROMPT,
        PRIVILEGED_EXEC_PROMPT,
        CONFIG_PROMPT,
        ENABLE_PASSWORD_PROMPT,
    )
    .expect("valid Cisco prompt patterns")
}

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new("cisco_ios", prompts())
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Unknown command")
        .with_failure_pattern("% Bad IP address")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
}
