// CfgSmith: Template-Based Network Device Configuration Compiler
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.


use crate::template::*;
use crate::types::{ConstructionError, InterfaceId};
use crate::values::*;

fn gi(s: &str) -> InterfaceId {
    s.parse().unwrap()
}

fn lines(template: &PortTemplate, iface: &str) -> Vec<String> {
    template.generate_config(&gi(iface)).into_commands()
}

#[test]
fn test_access_port_security_block() {
    let mut t = AccessPortTemplate::new();
    t.set_access_vlan(10).unwrap();
    t.set_max_mac_count(1).unwrap();
    t.set_violation_action(ViolationAction::Shutdown);
    t.set_portfast(true);
    let t = PortTemplate::from(t);

    assert_eq!(
        lines(&t, "Gi0/1"),
        vec![
            "interface GigabitEthernet0/1",
            "switchport mode access",
            "switchport access vlan 10",
            "switchport port-security",
            "switchport port-security maximum 1",
            "switchport port-security violation shutdown",
            "spanning-tree portfast",
            "exit",
        ]
    );
    let depths: Vec<usize> =
        t.generate_config(&gi("Gi0/1")).cli_lines().iter().map(|l| l.depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 1, 1, 1, 1, 0]);
}

#[test]
fn test_inert_templates() {
    let access = PortTemplate::from(AccessPortTemplate::new());
    assert_eq!(
        lines(&access, "Fa0/3"),
        vec!["interface FastEthernet0/3", "switchport mode access", "exit"]
    );
    let trunk = PortTemplate::from(TrunkPortTemplate::new());
    assert_eq!(
        lines(&trunk, "Gi0/1"),
        vec!["interface GigabitEthernet0/1", "switchport mode trunk", "exit"]
    );
    assert!(!access.is_active(PortFeature::PortSecurity));
    assert!(!access.is_active(PortFeature::Stp));
    assert!(access.vlan_refs().is_empty());
}

#[test]
fn test_feature_groups_reset_to_inert() {
    let mut t = AccessPortTemplate::new();
    t.set_portfast(true);
    assert!(t.is_active(PortFeature::Stp));
    t.set_portfast(false);
    assert!(t.stp().is_none());
    assert!(!t.is_active(PortFeature::Stp));

    t.set_speed(Speed::Mbps100).unwrap();
    assert_eq!(t.link().unwrap().speed(), Speed::Mbps100);
    t.set_speed(Speed::Auto).unwrap();
    assert!(t.link().is_none());

    t.set_dhcp_snooping_trust(true);
    t.set_dhcp_snooping_rate(Some(100)).unwrap();
    t.set_dhcp_snooping_trust(false);
    assert!(t.is_active(PortFeature::DhcpSnooping));
    t.set_dhcp_snooping_rate(None).unwrap();
    assert!(!t.is_active(PortFeature::DhcpSnooping));
}

#[test]
fn test_rejected_setters_leave_template_untouched() {
    let mut t = AccessPortTemplate::new();
    t.set_duplex(Duplex::Half).unwrap();
    let before = t.clone();
    assert!(matches!(
        t.set_speed(Speed::Mbps1000),
        Err(ConstructionError::Incompatible { field: "duplex", .. })
    ));
    assert_eq!(t, before);

    t.set_loop_guard(true).unwrap();
    let before = t.clone();
    assert_eq!(t.set_root_guard(true).unwrap_err().field(), "stp_guard");
    assert_eq!(t, before);

    assert_eq!(t.set_access_vlan(0).unwrap_err().field(), "access_vlan");
    assert_eq!(t.set_voice_vlan(5000).unwrap_err().field(), "voice_vlan");
    assert_eq!(t.set_dhcp_snooping_rate(Some(0)).unwrap_err().field(), "dhcp_snooping");
    assert_eq!(t, before);
}

#[test]
fn test_port_security_limits() {
    let m1: MacAddress = "0011.2233.4455".parse().unwrap();
    let m2: MacAddress = "0011.2233.4466".parse().unwrap();
    let m3: MacAddress = "0011.2233.4477".parse().unwrap();

    let mut t = AccessPortTemplate::new();
    t.set_max_mac_count(2).unwrap();
    t.add_static_mac(m1).unwrap();
    t.add_static_mac(m2).unwrap();
    // adding an existing address again is fine
    t.add_static_mac(m2).unwrap();
    assert_eq!(t.add_static_mac(m3).unwrap_err().field(), "static_mac");
    assert_eq!(t.port_security().unwrap().static_macs().len(), 2);

    assert_eq!(t.set_max_mac_count(1).unwrap_err().field(), "max_mac_count");
    assert_eq!(t.port_security().unwrap().maximum().unwrap().get(), 2);

    let multicast: MacAddress = "0100.5e00.0001".parse().unwrap();
    assert!(t.add_static_mac(multicast).is_err());

    t.remove_static_mac(m2);
    t.set_max_mac_count(1).unwrap();
    t.set_sticky_mac(true);
    let out = lines(&PortTemplate::from(t.clone()), "Gi0/2");
    assert!(out.contains(&"switchport port-security mac-address sticky".to_string()));
    assert!(out.contains(&"switchport port-security mac-address 0011.2233.4455".to_string()));

    t.disable_port_security();
    assert!(t.port_security().is_none());
    assert!(!lines(&PortTemplate::from(t), "Gi0/2")
        .contains(&"switchport port-security".to_string()));
}

#[test]
fn test_access_full_feature_order() {
    let mut t = AccessPortTemplate::new();
    t.set_description("Office desk").unwrap();
    t.set_access_vlan(20).unwrap();
    t.set_voice_vlan(30).unwrap();
    t.set_protected(true);
    t.set_bpdu_guard(true);
    let level = StormThreshold::percent(20.0, Some(10.0)).unwrap();
    t.set_storm_control(StormTraffic::Broadcast, level);
    t.set_qos_trust(Some(QosTrust::Dscp));
    t.add_auth_method(AuthMethod::Mab);
    t.add_auth_method(AuthMethod::Dot1x);
    t.set_poe(Some(PoeMode::Auto));
    t.set_arp_inspection_rate(Some(15)).unwrap();
    t.set_mdix_auto(true);

    assert_eq!(
        lines(&t.into(), "Gi1/0/5"),
        vec![
            "interface GigabitEthernet1/0/5",
            "description Office desk",
            "switchport mode access",
            "switchport access vlan 20",
            "switchport voice vlan 30",
            "switchport protected",
            "spanning-tree bpduguard enable",
            "storm-control broadcast level 20.00 10.00",
            "mls qos trust dscp",
            "authentication port-control auto",
            "dot1x pae authenticator",
            "mab",
            "power inline auto",
            "ip arp inspection limit rate 15",
            "mdix auto",
            "exit",
        ]
    );
}

#[test]
fn test_trunk_block() {
    let mut t = TrunkPortTemplate::new();
    t.set_encapsulation(Some(Encapsulation::Dot1q)).unwrap();
    t.set_dtp_mode(Some(DtpMode::Nonegotiate));
    t.set_native_vlan(99).unwrap();
    t.set_allowed_vlans(vec![30, 10, 20, 21, 22]).unwrap();
    t.set_portfast(true);
    t.set_etherchannel(1, ChannelProtocol::Lacp, None).unwrap();

    assert_eq!(
        lines(&t.into(), "Te1/1/1"),
        vec![
            "interface TenGigabitEthernet1/1/1",
            "switchport trunk encapsulation dot1q",
            "switchport mode trunk",
            "switchport nonegotiate",
            "switchport trunk native vlan 99",
            "switchport trunk allowed vlan 10,20-22,30",
            "spanning-tree portfast trunk",
            "channel-protocol lacp",
            "channel-group 1 mode active",
            "exit",
        ]
    );
}

#[test]
fn test_trunk_allowed_vlans() {
    let mut t = TrunkPortTemplate::new();
    assert!(t.allowed_vlans().is_none());
    t.disallow_vlan(10).unwrap();
    assert!(t.allowed_vlans().is_none());

    t.allow_vlan(10).unwrap();
    t.allow_vlan(10).unwrap();
    assert_eq!(t.allowed_vlans().unwrap().to_string(), "10");
    t.disallow_vlan(10).unwrap();
    assert!(t.allowed_vlans().unwrap().is_empty());
    assert!(lines(&t.clone().into(), "Gi0/1")
        .contains(&"switchport trunk allowed vlan none".to_string()));

    assert_eq!(t.set_allowed_vlans(vec![10, 4095]).unwrap_err().field(), "allowed_vlans");
    assert!(t.allowed_vlans().unwrap().is_empty());

    t.allow_all_vlans();
    assert!(!t.is_active(PortFeature::AllowedVlans));
}

#[test]
fn test_trunk_constraints() {
    let mut t = TrunkPortTemplate::new();
    t.set_native_vlan(10).unwrap();
    assert!(t.set_encapsulation(Some(Encapsulation::Isl)).is_err());
    assert_eq!(t.encapsulation(), None);

    assert_eq!(
        t.set_etherchannel(65, ChannelProtocol::Lacp, None).unwrap_err().field(),
        "channel_group"
    );
    assert_eq!(
        t.set_etherchannel(2, ChannelProtocol::Lacp, Some(ChannelMode::Desirable))
            .unwrap_err()
            .field(),
        "channel_mode"
    );
    assert!(t.etherchannel().is_none());

    t.set_etherchannel(2, ChannelProtocol::None, None).unwrap();
    let out = lines(&t.into(), "Gi0/1");
    assert!(out.contains(&"channel-group 2 mode on".to_string()));
    assert!(!out.iter().any(|l| l.starts_with("channel-protocol")));
}

#[test]
fn test_vlan_refs_and_capabilities() {
    let mut a = AccessPortTemplate::new();
    a.set_access_vlan(10).unwrap().set_voice_vlan(20).unwrap();
    let a = PortTemplate::from(a);
    let refs: Vec<(&str, u16)> = a.vlan_refs().into_iter().map(|(f, v)| (f, v.get())).collect();
    assert_eq!(refs, vec![("access_vlan", 10), ("voice_vlan", 20)]);
    assert!(a.has_capability(Capability::Security));
    assert_eq!(a.mode(), "access");
    assert!(a.as_trunk().is_none());

    let mut t = TrunkPortTemplate::new();
    t.set_native_vlan(5).unwrap();
    t.set_allowed_vlans(vec![5, 6]).unwrap();
    let t = PortTemplate::from(t);
    assert!(!t.has_capability(Capability::Security));
    assert!(t.is_active(PortFeature::NativeVlan));
    assert!(!t.is_active(PortFeature::AccessVlan));
}

#[test]
fn test_suggested_name() {
    let mut a = AccessPortTemplate::new();
    assert_eq!(PortTemplate::from(a.clone()).suggested_name(), "Custom template");
    a.set_access_vlan(10).unwrap();
    assert_eq!(PortTemplate::from(a).suggested_name(), "VLAN 10");

    let mut t = TrunkPortTemplate::new();
    assert_eq!(PortTemplate::from(t.clone()).suggested_name(), "TRUNK");
    t.set_allowed_vlans(vec![30, 20]).unwrap();
    assert_eq!(PortTemplate::from(t.clone()).suggested_name(), "TRUNK 20");
    t.set_native_vlan(99).unwrap();
    assert_eq!(PortTemplate::from(t).suggested_name(), "TRUNK 99");
}

#[test]
fn test_port_template_serde() {
    let mut t = AccessPortTemplate::new();
    t.set_access_vlan(10).unwrap();
    t.set_violation_action(ViolationAction::Restrict);
    let t = PortTemplate::from(t);
    let json = serde_json::to_string(&t).unwrap();
    assert!(json.contains("\"mode\":\"access\""));
    let back: PortTemplate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);

    let bad = r#"{"mode":"access","access_vlan":5000}"#;
    assert!(serde_json::from_str::<PortTemplate>(bad).is_err());
}
