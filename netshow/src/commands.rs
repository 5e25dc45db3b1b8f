//! The show commands netshow knows how to run and parse.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::platform::Platform;

/// A read-only show command with a built-in parsing template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowCommand {
    IpArp,
    CdpNeighbors,
    CdpNeighborsDetail,
    IpInterfaceBrief,
    InterfacesDescription,
    Vlan,
    IpRoute,
}

impl ShowCommand {
    pub const ALL: [ShowCommand; 7] = [
        ShowCommand::IpArp,
        ShowCommand::CdpNeighbors,
        ShowCommand::CdpNeighborsDetail,
        ShowCommand::IpInterfaceBrief,
        ShowCommand::InterfacesDescription,
        ShowCommand::Vlan,
        ShowCommand::IpRoute,
    ];

    /// CLI text of this command on `platform`.
    pub fn cli(&self, platform: Platform) -> &'static str {
        match (self, platform) {
            (ShowCommand::IpArp, _) => "show ip arp",
            (ShowCommand::CdpNeighbors, _) => "show cdp neighbors",
            (ShowCommand::CdpNeighborsDetail, _) => "show cdp neighbors detail",
            (ShowCommand::IpInterfaceBrief, _) => "show ip interface brief",
            (ShowCommand::InterfacesDescription, Platform::CiscoNxos) => {
                "show interface description"
            }
            (ShowCommand::InterfacesDescription, _) => "show interfaces description",
            (ShowCommand::Vlan, _) => "show vlan",
            (ShowCommand::IpRoute, _) => "show ip route",
        }
    }

    /// Identify the show command behind a CLI string.
    ///
    /// Output modifiers after `|` are ignored and whitespace is collapsed,
    /// so `show ip interface brief | include up` maps to
    /// [`ShowCommand::IpInterfaceBrief`].
    pub fn from_cli(platform: Platform, command: &str) -> Option<ShowCommand> {
        let base = base_command(command);
        ShowCommand::ALL
            .into_iter()
            .find(|cmd| cmd.cli(platform) == base)
    }
}

/// Lower-cased command text before any `|` modifier, whitespace collapsed.
pub fn base_command(command: &str) -> String {
    let head = command.split('|').next().unwrap_or_default();
    head.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Interface status filter for the interface listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterfaceState {
    #[default]
    All,
    Up,
    Down,
}

impl InterfaceState {
    /// Append the matching output filter to `command`.
    pub fn apply(&self, command: &str) -> String {
        match self {
            InterfaceState::All => command.to_string(),
            InterfaceState::Up => format!("{command} | include up"),
            InterfaceState::Down => format!("{command} | include down"),
        }
    }
}

impl FromStr for InterfaceState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(InterfaceState::All),
            "up" => Ok(InterfaceState::Up),
            "down" => Ok(InterfaceState::Down),
            _ => Err(ConfigError::UnknownInterfaceState {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterfaceState::All => "all",
            InterfaceState::Up => "up",
            InterfaceState::Down => "down",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_specific_cli() {
        assert_eq!(
            ShowCommand::InterfacesDescription.cli(Platform::CiscoIos),
            "show interfaces description"
        );
        assert_eq!(
            ShowCommand::InterfacesDescription.cli(Platform::CiscoNxos),
            "show interface description"
        );
        assert_eq!(ShowCommand::IpRoute.cli(Platform::CiscoNxos), "show ip route");
    }

    #[test]
    fn test_from_cli_ignores_modifiers() {
        assert_eq!(
            ShowCommand::from_cli(Platform::CiscoIos, "show ip interface brief | include up"),
            Some(ShowCommand::IpInterfaceBrief)
        );
        assert_eq!(
            ShowCommand::from_cli(Platform::CiscoIos, "  SHOW   cdp neighbors  detail "),
            Some(ShowCommand::CdpNeighborsDetail)
        );
        assert_eq!(ShowCommand::from_cli(Platform::CiscoIos, "show clock"), None);
    }

    #[test]
    fn test_interface_state() {
        assert_eq!("".parse::<InterfaceState>().unwrap(), InterfaceState::All);
        assert_eq!("up".parse::<InterfaceState>().unwrap(), InterfaceState::Up);
        assert_eq!("DOWN".parse::<InterfaceState>().unwrap(), InterfaceState::Down);
        assert!(matches!(
            "sideways".parse::<InterfaceState>(),
            Err(ConfigError::UnknownInterfaceState { .. })
        ));
    }

    #[test]
    fn test_interface_state_filter() {
        assert_eq!(
            InterfaceState::Up.apply("show ip interface brief"),
            "show ip interface brief | include up"
        );
        assert_eq!(
            InterfaceState::Down.apply("show interfaces description"),
            "show interfaces description | include down"
        );
        assert_eq!(InterfaceState::All.apply("show vlan"), "show vlan");
    }
}
