//! Supported device platforms.
//!
//! [`Platform`] is the closed set of identifiers accepted at the API
//! boundary. Each one maps to a [`PlatformDefinition`] describing its
//! prompts, mode commands and failure markers.

mod definition;
mod mode;
pub mod vendors;

use std::fmt;
use std::str::FromStr;

pub use definition::PlatformDefinition;
pub use mode::{CliMode, Prompts};

use crate::error::ConfigError;

/// Device platform (vendor + network OS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// Cisco IOS.
    CiscoIos,
    /// Cisco IOS-XE. Shares CLI behavior and templates with IOS.
    CiscoXe,
    /// Cisco NX-OS.
    CiscoNxos,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::CiscoIos, Platform::CiscoXe, Platform::CiscoNxos];

    /// Identifier as used in credentials and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::CiscoIos => "cisco_ios",
            Platform::CiscoXe => "cisco_xe",
            Platform::CiscoNxos => "cisco_nxos",
        }
    }

    /// Build the platform definition.
    pub fn definition(&self) -> PlatformDefinition {
        match self {
            Platform::CiscoIos => vendors::cisco_ios::platform(),
            Platform::CiscoXe => vendors::cisco_ios::platform().with_name("cisco_xe"),
            Platform::CiscoNxos => vendors::cisco_nxos::platform(),
        }
    }

    /// Route fields dropped by the minified routing table view.
    ///
    /// These are columns that are usually empty or churn on every poll.
    pub fn minified_route_fields(&self) -> &'static [&'static str] {
        match self {
            Platform::CiscoIos | Platform::CiscoXe => &["uptime"],
            Platform::CiscoNxos => &["encap", "tunnelid", "segid", "tag", "uptime"],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownPlatform {
                name: s.to_string(),
            })
    }
}
