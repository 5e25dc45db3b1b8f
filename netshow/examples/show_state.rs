//! Collect one kind of state from a device and print it as JSON.
//!
//! Credentials come from the environment. For `--credential gns3`:
//!
//! ```bash
//! export GNS3_USERNAME=admin GNS3_PASSWORD=cisco GNS3_SECRET=enable123
//! cargo run --example show_state -- --host 192.168.1.1 --platform cisco_ios \
//!     --credential gns3 --command route
//! ```
//!
//! Pass `--mock` to run against the built-in scripted device instead.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use netshow::mock::{MockConnector, MockDevice};
use netshow::{
    Collector, CredentialStore, DeviceTarget, InterfaceState, Platform, ResultEnvelope,
    SessionSettings,
};

const MOCK_ROUTES: &str = "\
Codes: L - local, C - connected, S - static, R - RIP, M - mobile, B - BGP

Gateway of last resort is 10.0.0.1 to network 0.0.0.0

S*    0.0.0.0/0 [1/0] via 10.0.0.1
C        10.0.0.0/24 is directly connected, GigabitEthernet1
O        10.1.0.0/24 [110/2] via 10.0.0.2, 00:12:01, GigabitEthernet1";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let platform: Platform = args.platform.parse()?;
    let state: InterfaceState = args.state.parse()?;
    let target = DeviceTarget::new(&args.host, platform, &args.credential);

    let settings = SessionSettings::new()
        .port(args.port)
        .connect_timeout(Duration::from_secs(args.timeout))
        .command_timeout(Duration::from_secs(args.timeout));

    let collector = if args.mock {
        Collector::new(CredentialStore::from_vars([
            (format!("{}_USERNAME", args.credential.to_uppercase()), "admin"),
            (format!("{}_PASSWORD", args.credential.to_uppercase()), "cisco"),
            (format!("{}_SECRET", args.credential.to_uppercase()), "enable123"),
        ]))
        .with_connector(Arc::new(MockConnector::new(
            MockDevice::new("R1")
                .with_enable_secret("enable123")
                .with_response("show ip route", MOCK_ROUTES),
        )))
    } else {
        Collector::from_env()
    }
    .with_settings(settings);

    let envelope: ResultEnvelope = match args.command.as_str() {
        "arp" => collector.show_arp_table(&target).await?,
        "cdp" => collector.show_cdp_neighbors(&target, args.details).await?,
        "interfaces" => collector.show_ifaces_all(&target, state).await?,
        "descriptions" => collector.show_iface_description(&target, state).await?,
        "route" => collector.show_route(&target).await?,
        "route-min" => collector.show_route_minified(&target).await?,
        "vlan" => collector.show_vlans(&target).await?,
        other => collector.show_raw(&target, other).await?,
    };

    println!("{}", envelope.to_json_pretty()?);
    Ok(())
}

struct Args {
    host: String,
    port: u16,
    platform: String,
    credential: String,
    command: String,
    state: String,
    details: bool,
    timeout: u64,
    mock: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            platform: "cisco_ios".to_string(),
            credential: "gns3".to_string(),
            command: "route".to_string(),
            state: String::new(),
            details: false,
            timeout: 30,
            mock: false,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => {
                    parsed.host = value.unwrap_or(parsed.host);
                    i += 1;
                }
                "--port" | "-p" => {
                    parsed.port = value.and_then(|v| v.parse().ok()).unwrap_or(22);
                    i += 1;
                }
                "--platform" => {
                    parsed.platform = value.unwrap_or(parsed.platform);
                    i += 1;
                }
                "--credential" | "-c" => {
                    parsed.credential = value.unwrap_or(parsed.credential);
                    i += 1;
                }
                "--command" => {
                    parsed.command = value.unwrap_or(parsed.command);
                    i += 1;
                }
                "--state" => {
                    parsed.state = value.unwrap_or_default();
                    i += 1;
                }
                "--timeout" | "-t" => {
                    parsed.timeout = value.and_then(|v| v.parse().ok()).unwrap_or(30);
                    i += 1;
                }
                "--details" => parsed.details = true,
                "--mock" => parsed.mock = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other => eprintln!("Unknown argument: {other}"),
            }
            i += 1;
        }

        parsed
    }

    fn print_help() {
        println!(
            r#"netshow show_state example

USAGE:
    cargo run --example show_state -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Device address [default: localhost]
    -p, --port <PORT>          SSH port [default: 22]
        --platform <ID>        cisco_ios | cisco_xe | cisco_nxos [default: cisco_ios]
    -c, --credential <ID>      Credential id in the environment [default: gns3]
        --command <NAME>       arp | cdp | interfaces | descriptions | route |
                               route-min | vlan | any other CLI text (raw)
                               [default: route]
        --state <STATE>        Interface filter: up | down [default: all]
        --details              Detailed CDP listing
    -t, --timeout <SECS>       Connect and command timeout [default: 30]
        --mock                 Use the scripted mock device
        --help                 Print this help message"#
        );
    }
}
