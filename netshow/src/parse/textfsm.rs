//! TextFSM-backed output parser with a built-in template index.

use std::collections::HashMap;

use log::debug;
use textfsm_rust::{ListItem, Template, Value};

use super::{OutputParser, Record};
use crate::commands::{ShowCommand, base_command};
use crate::error::ParseError;
use crate::platform::Platform;

const IOS_FAMILY: &[Platform] = &[Platform::CiscoIos, Platform::CiscoXe];
const NXOS: &[Platform] = &[Platform::CiscoNxos];

/// A built-in template and the (platform, command) pairs it parses.
struct TemplateEntry {
    platforms: &'static [Platform],
    command: ShowCommand,
    source: &'static str,
}

const BUILTIN_TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        platforms: IOS_FAMILY,
        command: ShowCommand::IpArp,
        source: include_str!("../../templates/cisco_ios_show_ip_arp.textfsm"),
    },
    TemplateEntry {
        platforms: NXOS,
        command: ShowCommand::IpArp,
        source: include_str!("../../templates/cisco_nxos_show_ip_arp.textfsm"),
    },
    TemplateEntry {
        platforms: IOS_FAMILY,
        command: ShowCommand::CdpNeighbors,
        source: include_str!("../../templates/cisco_ios_show_cdp_neighbors.textfsm"),
    },
    TemplateEntry {
        platforms: NXOS,
        command: ShowCommand::CdpNeighbors,
        source: include_str!("../../templates/cisco_nxos_show_cdp_neighbors.textfsm"),
    },
    TemplateEntry {
        platforms: IOS_FAMILY,
        command: ShowCommand::CdpNeighborsDetail,
        source: include_str!("../../templates/cisco_ios_show_cdp_neighbors_detail.textfsm"),
    },
    TemplateEntry {
        platforms: NXOS,
        command: ShowCommand::CdpNeighborsDetail,
        source: include_str!("../../templates/cisco_nxos_show_cdp_neighbors_detail.textfsm"),
    },
    TemplateEntry {
        platforms: IOS_FAMILY,
        command: ShowCommand::IpInterfaceBrief,
        source: include_str!("../../templates/cisco_ios_show_ip_interface_brief.textfsm"),
    },
    TemplateEntry {
        platforms: NXOS,
        command: ShowCommand::IpInterfaceBrief,
        source: include_str!("../../templates/cisco_nxos_show_ip_interface_brief.textfsm"),
    },
    TemplateEntry {
        platforms: IOS_FAMILY,
        command: ShowCommand::InterfacesDescription,
        source: include_str!("../../templates/cisco_ios_show_interfaces_description.textfsm"),
    },
    TemplateEntry {
        platforms: NXOS,
        command: ShowCommand::InterfacesDescription,
        source: include_str!("../../templates/cisco_nxos_show_interface_description.textfsm"),
    },
    TemplateEntry {
        platforms: &[Platform::CiscoIos, Platform::CiscoXe, Platform::CiscoNxos],
        command: ShowCommand::Vlan,
        source: include_str!("../../templates/cisco_show_vlan.textfsm"),
    },
    TemplateEntry {
        platforms: IOS_FAMILY,
        command: ShowCommand::IpRoute,
        source: include_str!("../../templates/cisco_ios_show_ip_route.textfsm"),
    },
    TemplateEntry {
        platforms: NXOS,
        command: ShowCommand::IpRoute,
        source: include_str!("../../templates/cisco_nxos_show_ip_route.textfsm"),
    },
];

/// Parses show output with TextFSM templates.
///
/// Lookup order: templates registered with [`with_template`](Self::with_template),
/// then the built-in index. Output modifiers (`| include up`) are ignored
/// when looking up a template.
#[derive(Debug, Default, Clone)]
pub struct TextFsmParser {
    custom: HashMap<(Platform, String), String>,
}

impl TextFsmParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template for a command, overriding any built-in one.
    ///
    /// The template is compiled once here so a broken template is reported
    /// at registration rather than on first use.
    pub fn with_template(
        mut self,
        platform: Platform,
        command: &str,
        source: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let source = source.into();
        let command = base_command(command);
        Template::parse_str(&source).map_err(|e| ParseError::Template {
            platform: platform.to_string(),
            command: command.clone(),
            message: e.to_string(),
        })?;
        self.custom.insert((platform, command), source);
        Ok(self)
    }

    /// Template source used for `command` on `platform`, if any.
    pub fn template_for(&self, platform: Platform, command: &str) -> Option<&str> {
        let base = base_command(command);
        if let Some(source) = self.custom.get(&(platform, base)) {
            return Some(source.as_str());
        }

        let show = ShowCommand::from_cli(platform, command)?;
        BUILTIN_TEMPLATES
            .iter()
            .find(|entry| entry.command == show && entry.platforms.contains(&platform))
            .map(|entry| entry.source)
    }
}

impl OutputParser for TextFsmParser {
    fn parse(
        &self,
        platform: Platform,
        command: &str,
        output: &str,
    ) -> Result<Vec<Record>, ParseError> {
        let source = self
            .template_for(platform, command)
            .ok_or_else(|| ParseError::NoTemplate {
                platform: platform.to_string(),
                command: command.to_string(),
            })?;

        let template_error = |message: String| ParseError::Template {
            platform: platform.to_string(),
            command: command.to_string(),
            message,
        };

        let template = Template::parse_str(source).map_err(|e| template_error(e.to_string()))?;
        let columns: Vec<String> = template
            .header()
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();

        let mut parser = template.parser();
        let rows = parser
            .parse_text(output)
            .map_err(|e| template_error(e.to_string()))?;
        debug!("parsed {} rows for '{}' on {}", rows.len(), command, platform);

        Ok(rows.into_iter().map(|row| to_record(&columns, row)).collect())
    }
}

/// Lay out a parsed row under the template's column names.
fn to_record(columns: &[String], row: Vec<Value>) -> Record {
    let mut record = Record::new();
    for (column, value) in columns.iter().zip(row) {
        record.insert(column.clone(), field_text(value));
    }
    record
}

/// `List` values (VLAN ports spread over several lines) are joined with
/// ", " so every field stays a plain string.
fn field_text(value: Value) -> String {
    match value {
        Value::Empty => String::new(),
        Value::Single(text) => text,
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                ListItem::String(text) => text,
                ListItem::Dict(fields) => {
                    let mut pairs: Vec<String> =
                        fields.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
                    pairs.sort();
                    pairs.join(" ")
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}
