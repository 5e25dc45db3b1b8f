//! End-to-end collection over the scripted mock device.

use std::sync::Arc;

use serde_json::{Value, json};

use netshow::mock::{MockConnector, MockDevice};
use netshow::{
    Collector, CredentialStore, DeviceTarget, ErrorKind, InterfaceState, Platform,
    SessionSettings,
};

const IOS_ROUTES: &str = "\
Codes: L - local, C - connected, S - static, R - RIP, M - mobile, B - BGP
       D - EIGRP, EX - EIGRP external, O - OSPF, IA - OSPF inter area

Gateway of last resort is 10.0.0.1 to network 0.0.0.0

S*    0.0.0.0/0 [1/0] via 10.0.0.1
C        10.0.0.0/24 is directly connected, GigabitEthernet1
O IA     10.2.0.0/16 [110/3] via 10.0.0.2, 2d01h, GigabitEthernet1";

const NXOS_ROUTES: &str = "\
IP Route Table for VRF \"default\"
'*' denotes best ucast next-hop
'**' denotes best mcast next-hop

10.0.0.0/24, ubest/mbest: 1/0, attached
    *via 10.0.0.1, Eth1/1, [0/0], 3w2d, direct
10.1.0.0/24, ubest/mbest: 1/0
    *via 10.0.0.2, Eth1/1, [110/41], 3d02h, ospf-1, intra, tag 65001";

const IOS_CDP: &str = "\
Capability Codes: R - Router, T - Trans Bridge, B - Source Route Bridge
                  S - Switch, H - Host, I - IGMP, r - Repeater, P - Phone

Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID

Total cdp entries displayed : 0";

const IOS_ROUTES_SUBNETTED: &str = "\
Codes: L - local, C - connected, S - static, R - RIP, M - mobile, B - BGP

Gateway of last resort is 10.0.0.1 to network 0.0.0.0

S*    0.0.0.0/0 [1/0] via 10.0.0.1
      10.0.0.0/8 is variably subnetted, 2 subnets, 2 masks
C        10.0.0.0/24 is directly connected, GigabitEthernet1
O IA     10.2.0.0/16 [110/3] via 10.0.0.2, 2d01h, GigabitEthernet1
                     [110/3] via 10.0.0.3, 2d01h, GigabitEthernet2
      172.16.0.0/24 is subnetted, 2 subnets
O        172.16.1.0 [110/2] via 10.0.0.2, 00:12:01, GigabitEthernet1
O        172.16.2.0 [110/2] via 10.0.0.2, 00:12:01, GigabitEthernet1";

const IOS_CDP_WRAPPED: &str = "\
Capability Codes: R - Router, T - Trans Bridge, B - Source Route Bridge
                  S - Switch, H - Host, I - IGMP, r - Repeater, P - Phone

Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID
dist-sw01.lab.example.com
                 Gig 0/1           155             R S I  WS-C3750  Gig 1/0/24
R2               Gig 0/2           163              R B   ISR4331   Gig 0/0/0

Total cdp entries displayed : 2";

const VLANS: &str = "\
VLAN Name                             Status    Ports
---- -------------------------------- --------- -------------------------------
1    default                          active    Gi0/1, Gi0/2
10   users                            active    Gi0/3";

fn store() -> CredentialStore {
    CredentialStore::from_vars([
        ("GNS3_USERNAME", "admin"),
        ("GNS3_PASSWORD", "cisco"),
        ("GNS3_SECRET", "enable123"),
    ])
}

fn ios_device() -> MockDevice {
    MockDevice::new("R1")
        .with_login("admin", "cisco")
        .with_enable_secret("enable123")
        .with_response("show ip route", IOS_ROUTES)
        .with_response("show cdp neighbors", IOS_CDP)
        .with_response("show vlan", VLANS)
}

fn collector(connector: &MockConnector) -> Collector {
    Collector::new(store())
        .with_connector(Arc::new(connector.clone()))
        .with_settings(SessionSettings::default())
}

fn ios_target() -> DeviceTarget {
    DeviceTarget::new("10.0.0.1", Platform::CiscoIos, "gns3")
}

#[tokio::test]
async fn test_unknown_credential_never_connects() {
    let connector = MockConnector::new(ios_device());
    let collector = collector(&connector);
    let target = DeviceTarget::new("10.0.0.1", Platform::CiscoIos, "prod");

    let err = collector.show_route(&target).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_route_table_is_enumerated() {
    let connector = MockConnector::new(ios_device());
    let envelope = collector(&connector).show_route(&ios_target()).await.unwrap();

    let value: Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
    assert_eq!(value["device"], "R1");
    assert_eq!(value["total routes"], 3);

    let table = &value["routing table"];
    assert_eq!(table["001"]["network"], "0.0.0.0");
    assert_eq!(table["001"]["nexthop_ip"], "10.0.0.1");
    assert_eq!(table["002"]["nexthop_if"], "GigabitEthernet1");
    assert_eq!(table["003"]["protocol"], "O IA");
    assert_eq!(table["003"]["uptime"], "2d01h");

    assert_eq!(connector.connect_count(), 1);
    assert_eq!(connector.open_channels(), 0);
}

#[tokio::test]
async fn test_minified_routes_drop_uptime() {
    let connector = MockConnector::new(ios_device());
    let envelope = collector(&connector)
        .show_route_minified(&ios_target())
        .await
        .unwrap();

    let value = serde_json::to_value(&envelope).unwrap();
    let route = value["routing table"]["003"].as_object().unwrap();
    assert!(!route.contains_key("uptime"));
    assert_eq!(route["network"], "10.2.0.0");
}

#[tokio::test]
async fn test_nxos_minified_routes() {
    let connector = MockConnector::new(
        MockDevice::new("nx-spine-01")
            .with_login("admin", "cisco")
            .privileged()
            .with_response("show ip route", NXOS_ROUTES),
    );
    let target = DeviceTarget::new("10.0.0.2", Platform::CiscoNxos, "gns3");
    let envelope = collector(&connector)
        .show_route_minified(&target)
        .await
        .unwrap();

    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["device"], "nx-spine-01");
    assert_eq!(value["total routes"], 2);

    let route = value["routing table"]["002"].as_object().unwrap();
    assert_eq!(route["network"], "10.1.0.0");
    assert_eq!(route["nexthop_ip"], "10.0.0.2");
    for dropped in ["encap", "tunnelid", "segid", "tag", "uptime"] {
        assert!(!route.contains_key(dropped), "{dropped} should be removed");
    }
}

#[tokio::test]
async fn test_zero_neighbors() {
    let connector = MockConnector::new(ios_device());
    let envelope = collector(&connector)
        .show_cdp_neighbors(&ios_target(), false)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({"device": "R1", "total neighbors": 0, "cdp neighbors": {}})
    );
}

#[tokio::test]
async fn test_vlans_single_object() {
    let connector = MockConnector::new(ios_device());
    let envelope = collector(&connector).show_vlans(&ios_target()).await.unwrap();

    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["device name"], "R1");
    let vlans = value["vlans"].as_array().unwrap();
    assert_eq!(vlans.len(), 2);
    assert_eq!(vlans[1]["name"], "users");
}

#[tokio::test]
async fn test_bad_password_is_auth_error() {
    let connector = MockConnector::new(ios_device().with_login("admin", "other"));

    let err = collector(&connector)
        .show_vlans(&ios_target())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_connect_timeout_is_connection_error() {
    let connector = MockConnector::new(ios_device()).timing_out();

    let err = collector(&connector)
        .show_ifaces_all(&ios_target(), InterfaceState::All)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn test_every_operation_opens_its_own_session() {
    let connector = MockConnector::new(ios_device());
    let collector = collector(&connector);

    collector.show_vlans(&ios_target()).await.unwrap();
    collector.show_route(&ios_target()).await.unwrap();

    assert_eq!(connector.connect_count(), 2);
    assert_eq!(connector.open_channels(), 0);
}

#[tokio::test]
async fn test_subnetted_and_multipath_routes_are_counted() {
    let connector = MockConnector::new(
        ios_device().with_response("show ip route", IOS_ROUTES_SUBNETTED),
    );
    let value = serde_json::to_value(
        collector(&connector).show_route(&ios_target()).await.unwrap(),
    )
    .unwrap();

    assert_eq!(value["total routes"], 6);
    let table = value["routing table"].as_object().unwrap();
    assert_eq!(table.len(), 6);

    assert_eq!(table["003"]["network"], "10.2.0.0");
    assert_eq!(table["004"]["network"], "10.2.0.0");
    assert_eq!(table["004"]["nexthop_ip"], "10.0.0.3");
    assert_eq!(table["004"]["nexthop_if"], "GigabitEthernet2");
    assert_eq!(table["005"]["network"], "172.16.1.0");
    assert_eq!(table["006"]["network"], "172.16.2.0");
    assert_eq!(table["006"]["mask"], "24");
}

#[tokio::test]
async fn test_wrapped_neighbor_is_counted() {
    let connector = MockConnector::new(
        ios_device().with_response("show cdp neighbors", IOS_CDP_WRAPPED),
    );
    let value = serde_json::to_value(
        collector(&connector)
            .show_cdp_neighbors(&ios_target(), false)
            .await
            .unwrap(),
    )
    .unwrap();

    assert_eq!(value["total neighbors"], 2);
    let neighbors = &value["cdp neighbors"];
    assert_eq!(neighbors["001"]["neighbor_name"], "dist-sw01.lab.example.com");
    assert_eq!(neighbors["001"]["neighbor_interface"], "Gig 1/0/24");
    assert_eq!(neighbors["002"]["neighbor_name"], "R2");
}

#[tokio::test]
async fn test_command_timeout_names_device_and_command() {
    let connector = MockConnector::new(ios_device().with_stalled_command("show vlan"));

    let err = collector(&connector)
        .show_vlans(&ios_target())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);

    let text = err.to_string();
    assert!(text.contains("10.0.0.1"), "{text}");
    assert!(text.contains("show vlan"), "{text}");
    assert_eq!(connector.open_channels(), 0);
}
