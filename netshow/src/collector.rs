//! One-shot state collection from devices.
//!
//! Every operation follows the same shape: resolve credentials, open a
//! session, log in, run one show command, close the session and shape the
//! result into a [`ResultEnvelope`]. Sessions are never reused between
//! operations.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::commands::{InterfaceState, ShowCommand};
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::mapper::{FieldFilter, ResultEnvelope, ResultKind};
use crate::parse::{OutputParser, Record, TextFsmParser};
use crate::platform::Platform;
use crate::session::{
    CommandOutput, ConnectionParams, DeviceSession, OutputMode, Session, SessionSettings,
};
use crate::transport::{Connector, SshConnector};

/// The device an operation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    /// IP address or hostname.
    pub host: String,
    pub platform: Platform,
    /// Key into the credential store.
    pub credential_id: String,
}

impl DeviceTarget {
    pub fn new(
        host: impl Into<String>,
        platform: Platform,
        credential_id: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            platform,
            credential_id: credential_id.into(),
        }
    }
}

/// Runs show commands against devices and returns result envelopes.
///
/// # Example
///
/// ```rust,no_run
/// use netshow::{Collector, DeviceTarget, Platform};
///
/// # async fn example() -> Result<(), netshow::Error> {
/// let collector = Collector::from_env();
/// let target = DeviceTarget::new("192.168.1.1", Platform::CiscoIos, "gns3");
///
/// let routes = collector.show_route(&target).await?;
/// println!("{}", routes.to_json_pretty()?);
/// # Ok(())
/// # }
/// ```
pub struct Collector {
    credentials: CredentialStore,
    connector: Arc<dyn Connector>,
    parser: Arc<dyn OutputParser>,
    settings: SessionSettings,
}

impl Collector {
    /// A collector over SSH with the built-in templates.
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            connector: Arc::new(SshConnector::new()),
            parser: Arc::new(TextFsmParser::new()),
            settings: SessionSettings::default(),
        }
    }

    /// A collector whose credentials come from the process environment.
    pub fn from_env() -> Self {
        Self::new(CredentialStore::from_env())
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn OutputParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Resolve credentials and build a session that is not yet logged in.
    ///
    /// Fails with a configuration error, before any connection is made,
    /// when the credential id cannot be resolved.
    pub fn open_session(&self, target: &DeviceTarget) -> Result<DeviceSession> {
        let credentials = self.credentials.resolve(&target.credential_id)?;
        if let Some(device_type) = credentials.device_type() {
            if device_type != target.platform {
                debug!(
                    "credential '{}' is configured for {}, target {} is {}",
                    target.credential_id, device_type, target.host, target.platform
                );
            }
        }

        Ok(DeviceSession::open(
            ConnectionParams::new(target.host.clone(), target.platform, credentials),
            self.connector.clone(),
            self.parser.clone(),
            self.settings.clone(),
        ))
    }

    /// ARP table, as returned by the device.
    pub async fn show_arp_table(&self, target: &DeviceTarget) -> Result<ResultEnvelope> {
        let (device, records) = self.structured(target, ShowCommand::IpArp, None).await?;
        Ok(ResultEnvelope::single(ResultKind::ArpTable, device, records))
    }

    /// CDP neighbors keyed by position, optionally the detailed listing.
    pub async fn show_cdp_neighbors(
        &self,
        target: &DeviceTarget,
        get_details: bool,
    ) -> Result<ResultEnvelope> {
        let command = if get_details {
            ShowCommand::CdpNeighborsDetail
        } else {
            ShowCommand::CdpNeighbors
        };
        let (device, records) = self.structured(target, command, None).await?;
        Ok(ResultEnvelope::enumerated(ResultKind::CdpNeighbors, device, records))
    }

    /// `show ip interface brief`, filtered by interface state.
    pub async fn show_ifaces_all(
        &self,
        target: &DeviceTarget,
        state: InterfaceState,
    ) -> Result<ResultEnvelope> {
        let (device, records) = self
            .structured(target, ShowCommand::IpInterfaceBrief, Some(state))
            .await?;
        Ok(ResultEnvelope::single(ResultKind::Interfaces, device, records))
    }

    /// Interface descriptions, filtered by interface state.
    pub async fn show_iface_description(
        &self,
        target: &DeviceTarget,
        state: InterfaceState,
    ) -> Result<ResultEnvelope> {
        let (device, records) = self
            .structured(target, ShowCommand::InterfacesDescription, Some(state))
            .await?;
        Ok(ResultEnvelope::single(ResultKind::Interfaces, device, records))
    }

    /// Routing table keyed by position.
    pub async fn show_route(&self, target: &DeviceTarget) -> Result<ResultEnvelope> {
        let (device, records) = self.structured(target, ShowCommand::IpRoute, None).await?;
        Ok(ResultEnvelope::enumerated(ResultKind::Routes, device, records))
    }

    /// Routing table without the platform's noisy columns.
    pub async fn show_route_minified(&self, target: &DeviceTarget) -> Result<ResultEnvelope> {
        let (device, records) = self.structured(target, ShowCommand::IpRoute, None).await?;
        let records = FieldFilter::for_minified_routes(target.platform)
            .apply(records)
            .map_err(|e| {
                let command = ShowCommand::IpRoute.cli(target.platform);
                Error::from(e).in_command(&target.host, target.platform, command)
            })?;
        Ok(ResultEnvelope::enumerated(ResultKind::Routes, device, records))
    }

    /// VLAN table, as returned by the device.
    pub async fn show_vlans(&self, target: &DeviceTarget) -> Result<ResultEnvelope> {
        let (device, records) = self.structured(target, ShowCommand::Vlan, None).await?;
        Ok(ResultEnvelope::single(ResultKind::Vlans, device, records))
    }

    /// Any command, returned as unparsed text.
    pub async fn show_raw(&self, target: &DeviceTarget, command: &str) -> Result<ResultEnvelope> {
        let (device, output) = self.collect(target, command, OutputMode::Raw).await?;
        let text = output.into_text().unwrap_or_default();
        Ok(ResultEnvelope::raw(device, text))
    }

    async fn structured(
        &self,
        target: &DeviceTarget,
        command: ShowCommand,
        state: Option<InterfaceState>,
    ) -> Result<(String, Vec<Record>)> {
        let base = command.cli(target.platform);
        let cli = state.map_or_else(|| base.to_string(), |state| state.apply(base));
        let (device, output) = self.collect(target, &cli, OutputMode::Structured).await?;
        Ok((device, output.into_records().unwrap_or_default()))
    }

    /// Open a session, run one command and always close the session.
    async fn collect(
        &self,
        target: &DeviceTarget,
        command: &str,
        mode: OutputMode,
    ) -> Result<(String, CommandOutput)> {
        let mut session = self.open_session(target)?;

        let outcome = run_once(&mut session, command, mode).await;
        if let Err(e) = session.close().await {
            warn!("{}: error closing session: {}", target.host, e);
        }

        let (device, output) = outcome?;
        info!("{}: collected '{}' from {}", device, command, target.host);
        Ok((device, output))
    }
}

/// Log in, run `command` and report the device name with the output.
async fn run_once<S: Session>(
    session: &mut S,
    command: &str,
    mode: OutputMode,
) -> Result<(String, CommandOutput)> {
    session.login().await?;
    let output = session.execute(command, mode).await?;
    let device = session.device_name().unwrap_or_default().to_string();
    Ok((device, output))
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("credentials", &self.credentials)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mock::{MockConnector, MockDevice};

    fn store() -> CredentialStore {
        CredentialStore::from_vars([
            ("LAB_USERNAME", "admin"),
            ("LAB_PASSWORD", "cisco"),
            ("LAB_SECRET", "enable123"),
        ])
    }

    fn collector(device: MockDevice) -> (Collector, MockConnector) {
        let connector = MockConnector::new(device);
        let collector = Collector::new(store()).with_connector(Arc::new(connector.clone()));
        (collector, connector)
    }

    const IP_INT_BRIEF: &str = "\
Interface              IP-Address      OK? Method Status                Protocol
GigabitEthernet0/0     10.0.0.2        YES NVRAM  up                    up
GigabitEthernet0/1     unassigned      YES NVRAM  administratively down down";

    #[tokio::test]
    async fn test_interface_state_filter_is_sent() {
        let (collector, connector) = collector(
            MockDevice::new("R1")
                .with_enable_secret("enable123")
                .with_response("show ip interface brief", IP_INT_BRIEF),
        );
        let target = DeviceTarget::new("10.0.0.1", Platform::CiscoIos, "lab");

        let envelope = collector
            .show_ifaces_all(&target, InterfaceState::Up)
            .await
            .unwrap();
        assert!(connector
            .sent_commands()
            .contains(&"show ip interface brief | include up".to_string()));

        let value = serde_json::to_value(&envelope).unwrap();
        let interfaces = value["interfaces"].as_array().unwrap();
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0]["interface"], "GigabitEthernet0/0");
    }

    #[tokio::test]
    async fn test_unreachable_is_connection_error() {
        let (collector, connector) = collector(MockDevice::new("R1"));
        let collector = collector.with_connector(Arc::new(connector.clone().unreachable()));
        let target = DeviceTarget::new("10.0.0.1", Platform::CiscoIos, "lab");

        let err = collector.show_vlans(&target).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_session_closed_after_command_error() {
        let (collector, connector) =
            collector(MockDevice::new("R1").with_enable_secret("enable123"));
        let target = DeviceTarget::new("10.0.0.1", Platform::CiscoIos, "lab");

        let err = collector.show_arp_table(&target).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Command);
        assert_eq!(connector.open_channels(), 0);
    }

    #[tokio::test]
    async fn test_raw_output() {
        let (collector, _) = collector(
            MockDevice::new("R1")
                .privileged()
                .with_response("show clock", "*10:00:00.000 UTC Mon Oct 19 2026"),
        );
        let target = DeviceTarget::new("10.0.0.1", Platform::CiscoXe, "lab");

        let envelope = collector.show_raw(&target, "show clock").await.unwrap();
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"device name":"R1","output":"*10:00:00.000 UTC Mon Oct 19 2026"}"#
        );
    }
}
