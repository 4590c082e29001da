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


use crate::catalog;
use crate::color::Color;
use crate::generate::generate;
use crate::printer::{self, ExportOptions};
use crate::registry::{DisplayTag, InterfaceRegistry};
use crate::template::*;
use crate::types::{DeviceId, InterfaceId};
use crate::validate::{Constraint, ValidationOptions};
use crate::values::*;
use std::net::Ipv4Addr;

fn iface(s: &str) -> InterfaceId {
    s.parse().unwrap()
}

fn access(vlan: u16) -> PortTemplate {
    let mut t = AccessPortTemplate::new();
    t.set_access_vlan(vlan).unwrap();
    t.into()
}

fn tag() -> DisplayTag {
    DisplayTag::new("test", Color::default())
}

fn registered(device: &DeviceTemplate) -> InterfaceRegistry {
    let mut registry = InterfaceRegistry::new();
    registry.register(device).unwrap();
    registry
}

fn opts() -> ValidationOptions {
    ValidationOptions::default()
}

#[test]
fn test_inert_switch() {
    let device = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    let registry = registered(&device);
    let script = generate(&device, &registry, &opts()).unwrap();
    assert_eq!(script.into_commands(), vec!["configure terminal", "hostname Switch", "end"]);

    let device = DeviceTemplate::switch_l3(DeviceId(1), catalog::l3_poe_24()).unwrap();
    let registry = registered(&device);
    let script = generate(&device, &registry, &opts()).unwrap();
    // no layer-3 object, so routing stays disabled
    assert!(!script.contains("ip routing"));
    assert_eq!(script.len(), 3);
}

#[test]
fn test_layer3_switch_script() {
    let mut device = DeviceTemplate::switch_l3(DeviceId(0), catalog::l3_poe_24()).unwrap();
    device.set_hostname("core-01").unwrap();
    device.set_domain_name(Some("corp.example")).unwrap();
    device.define_vlan(10, Some("USERS")).unwrap();
    device.define_vlan(20, None).unwrap();
    device.set_stp_mode(StpMode::RapidPvst).unwrap();
    device.add_logging_host(Ipv4Addr::new(10, 0, 0, 5));
    let mut users = Svi::with_address("10.0.10.1/24".parse().unwrap());
    users.set_ospf_area(Some(0));
    device.set_svi(10, users).unwrap();
    device.set_svi(20, Svi::with_address("10.0.20.1/24".parse().unwrap())).unwrap();
    let default = StaticRoute::new(
        "0.0.0.0/0".parse().unwrap(),
        NextHop::Address(Ipv4Addr::new(10, 0, 20, 254)),
    );
    device.add_static_route(default).unwrap();
    let mut ospf = OspfProcess::new(1).unwrap();
    ospf.add_network("10.0.10.0/24".parse().unwrap(), 0);
    device.set_ospf(Some(ospf)).unwrap();

    let mut registry = registered(&device);
    registry.assign(device.id(), iface("Gi1/0/1"), access(10), tag()).unwrap();

    let script = generate(&device, &registry, &opts()).unwrap();
    assert_eq!(
        script.clone().into_commands(),
        vec![
            "configure terminal",
            "hostname core-01",
            "ip domain-name corp.example",
            "vlan 10",
            "name USERS",
            "exit",
            "vlan 20",
            "exit",
            "spanning-tree mode rapid-pvst",
            "logging host 10.0.0.5",
            "ip routing",
            "ip route 0.0.0.0 0.0.0.0 10.0.20.254",
            "router ospf 1",
            "network 10.0.10.0 0.0.0.255 area 0",
            "exit",
            "interface GigabitEthernet1/0/1",
            "switchport mode access",
            "switchport access vlan 10",
            "exit",
            "interface Vlan10",
            "ip address 10.0.10.1 255.255.255.0",
            "ip ospf 1 area 0",
            "no shutdown",
            "exit",
            "interface Vlan20",
            "ip address 10.0.20.1 255.255.255.0",
            "no shutdown",
            "exit",
            "end",
        ]
    );
}

#[test]
fn test_layer3_global_order() {
    let mut device = DeviceTemplate::switch_l3(DeviceId(0), catalog::l3_poe_24()).unwrap();
    device.define_vlan(10, None).unwrap();
    device.define_vlan(20, None).unwrap();

    let lan: Ipv4Net = "10.0.10.0/24".parse().unwrap();
    let mut acl = Acl::new(AclKind::Standard);
    acl.push(AclRule::standard(AclAction::Permit, AddressMatch::Network(lan))).unwrap();
    device.set_acl("LAN", acl).unwrap();
    let mask: Netmask = "/29".parse().unwrap();
    let pool = NatPool::new(Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 1, 1, 6), mask).unwrap();
    device.set_nat_pool("PUBLIC", pool).unwrap();
    device.add_nat_rule(NatRule::to_pool("LAN", "PUBLIC", true).unwrap()).unwrap();
    device.exclude_dhcp_range(Ipv4Addr::new(10, 0, 10, 1), Ipv4Addr::new(10, 0, 10, 9)).unwrap();
    let mut dhcp = DhcpPool::new(lan);
    dhcp.set_default_router(Ipv4Addr::new(10, 0, 10, 1)).unwrap();
    dhcp.add_dns_server(Ipv4Addr::new(9, 9, 9, 9));
    dhcp.add_dns_server(Ipv4Addr::new(1, 1, 1, 1));
    dhcp.add_dns_server(Ipv4Addr::new(9, 9, 9, 9));
    device.set_dhcp_pool("USERS", dhcp).unwrap();
    let mut vrf = Vrf::new();
    vrf.set_rd("65000:1").unwrap();
    device.set_vrf("GUEST", vrf).unwrap();

    let mut inside = Svi::with_address("10.0.10.1/24".parse().unwrap());
    inside.set_nat(Some(NatSide::Inside));
    let hsrp = RedundancyGroup::new(Ipv4Addr::new(10, 0, 10, 254)).with_preempt();
    inside.set_hsrp(1, hsrp).unwrap();
    let mut outside = Svi::with_address("1.1.1.9/29".parse().unwrap());
    outside.set_nat(Some(NatSide::Outside));
    device.set_svi(10, inside).unwrap();
    device.set_svi(20, outside).unwrap();

    let registry = registered(&device);
    let script = generate(&device, &registry, &opts()).unwrap();
    let order = [
        "ip routing",
        "ip access-list standard LAN",
        "10 permit 10.0.10.0 0.0.0.255",
        "ip nat pool PUBLIC 1.1.1.1 1.1.1.6 netmask 255.255.255.248",
        "ip nat inside source list LAN pool PUBLIC overload",
        "ip dhcp excluded-address 10.0.10.1 10.0.10.9",
        "ip dhcp pool USERS",
        "network 10.0.10.0 255.255.255.0",
        "default-router 10.0.10.1",
        "dns-server 9.9.9.9 1.1.1.1",
        "vrf definition GUEST",
        "rd 65000:1",
        "address-family ipv4",
        "exit-address-family",
        "interface Vlan10",
        "ip nat inside",
        "standby 1 ip 10.0.10.254",
        "standby 1 preempt",
        "interface Vlan20",
        "ip nat outside",
    ];
    let positions: Vec<usize> = order.iter().map(|l| script.position(l).unwrap()).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);

    let af = script.position("address-family ipv4").unwrap();
    let depths: Vec<usize> = script.cli_lines()[af - 2..af + 3].iter().map(|l| l.depth).collect();
    // vrf definition, rd, address-family, exit-address-family, exit
    assert_eq!(depths, vec![0, 1, 1, 1, 0]);
}

#[test]
fn test_management_gateway() {
    let management = Management {
        interface: ManagementInterface::Vlan(VlanId::new(99).unwrap()),
        address: Some("10.0.99.2/24".parse().unwrap()),
        gateway: Some(Ipv4Addr::new(10, 0, 99, 1)),
    };

    let mut l2 = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    l2.define_vlan(99, None).unwrap();
    l2.set_management(Some(management.clone())).unwrap();
    let script = generate(&l2, &registered(&l2), &opts()).unwrap();
    let start = script.position("interface Vlan99").unwrap();
    let block: Vec<&str> = script.lines().skip(start).take(5).collect();
    assert_eq!(
        block,
        vec![
            "interface Vlan99",
            "ip address 10.0.99.2 255.255.255.0",
            "no shutdown",
            "exit",
            "ip default-gateway 10.0.99.1",
        ]
    );

    let mut l3 = DeviceTemplate::switch_l3(DeviceId(1), catalog::l3_poe_24()).unwrap();
    l3.define_vlan(99, None).unwrap();
    l3.define_vlan(10, None).unwrap();
    l3.set_management(Some(management)).unwrap();
    l3.set_svi(10, Svi::with_address("10.0.10.1/24".parse().unwrap())).unwrap();
    let script = generate(&l3, &registered(&l3), &opts()).unwrap();
    let routing = script.position("ip routing").unwrap();
    let default = script.position("ip route 0.0.0.0 0.0.0.0 10.0.99.1").unwrap();
    assert!(script.position("interface Vlan99").unwrap() < routing);
    assert_eq!(default, routing + 1);
    assert!(!script.contains("ip default-gateway 10.0.99.1"));

    let mut router = DeviceTemplate::router(DeviceId(2), catalog::branch_router()).unwrap();
    router
        .set_management(Some(Management {
            interface: ManagementInterface::Port(iface("Gi0/0/0")),
            address: Some("192.168.1.1/24".parse().unwrap()),
            gateway: Some(Ipv4Addr::new(192, 168, 1, 254)),
        }))
        .unwrap();
    let script = generate(&router, &InterfaceRegistry::new(), &opts()).unwrap();
    assert!(script.contains("interface GigabitEthernet0/0/0"));
    assert!(script.contains("ip route 0.0.0.0 0.0.0.0 192.168.1.254"));
    assert_eq!(script.lines().next(), Some("configure terminal"));
    assert_eq!(script.lines().last(), Some("end"));
}

#[test]
fn test_switch_globals() {
    let mut device = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    device.set_domain_name(Some("corp.example")).unwrap();
    device.define_vlan(10, None).unwrap();
    device.set_stp_priority(10, Some(8192)).unwrap();
    device.set_portfast_default(true).unwrap();
    device.set_logging_buffered(Some(8192)).unwrap();
    device.set_logging_trap(Some(LoggingLevel::new(5).unwrap()));
    device.set_snmp_community("public", SnmpAccess::ReadOnly).unwrap();
    device.set_snmp_traps(true);
    device.set_enable_secret(Some("en4ble")).unwrap();
    device.set_local_user("admin", LocalUser::new(15, "adm1n").unwrap()).unwrap();
    device.set_login_local(true);
    device.set_ssh(Some(SshSettings::new(2048).unwrap()));
    device.set_dhcp_snooping_vlans(vec![10]).unwrap();
    device.set_mls_qos(true).unwrap();
    device.set_errdisable_recovery(Some(300)).unwrap();
    let span = SpanSession::new(vec![iface("Fa0/1"), iface("Fa0/2")], iface("Fa0/24")).unwrap();
    device.set_span_session(1, span).unwrap();

    let script = generate(&device, &registered(&device), &opts()).unwrap();
    let expected = [
        "spanning-tree vlan 10 priority 8192",
        "spanning-tree portfast default",
        "logging buffered 8192",
        "logging trap notifications",
        "snmp-server community public RO",
        "snmp-server enable traps",
        "monitor session 1 source interface FastEthernet0/1 , FastEthernet0/2",
        "monitor session 1 destination interface FastEthernet0/24",
        "enable secret en4ble",
        "username admin privilege 15 secret adm1n",
        "aaa new-model",
        "aaa authentication login default local",
        "crypto key generate rsa modulus 2048",
        "ip ssh version 2",
        "line vty 0 15",
        "transport input ssh",
        "ip dhcp snooping",
        "ip dhcp snooping vlan 10",
        "mls qos",
        "errdisable recovery cause all",
        "errdisable recovery interval 300",
    ];
    let positions: Vec<usize> = expected.iter().map(|l| script.position(l).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    let vty = script.position("transport input ssh").unwrap();
    assert_eq!(script.cli_lines()[vty].depth, 1);
}

#[test]
fn test_generation_refused() {
    let device = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    let mut registry = registered(&device);
    registry.assign(device.id(), iface("Fa0/1"), access(10), tag()).unwrap();
    let err = generate(&device, &registry, &opts()).unwrap_err();
    assert!(err.violations.has(Constraint::UndefinedVlan));
}

#[test]
fn test_deterministic_output() {
    let mut device = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    device.define_vlan(10, None).unwrap();
    device.define_vlan(20, None).unwrap();

    let mut forward = registered(&device);
    let mut backward = registered(&device);
    let ports = [("Fa0/1", 10), ("Fa0/2", 20), ("Fa0/10", 10), ("Gi0/1", 20)];
    for (name, vlan) in ports.iter() {
        forward.assign(device.id(), iface(name), access(*vlan), tag()).unwrap();
    }
    for (name, vlan) in ports.iter().rev() {
        backward.assign(device.id(), iface(name), access(*vlan), tag()).unwrap();
    }

    let a = generate(&device, &forward, &opts()).unwrap();
    let b = generate(&device, &backward, &opts()).unwrap();
    let c = generate(&device, &forward, &opts()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert!(a.position("interface FastEthernet0/2") < a.position("interface FastEthernet0/10"));
}

#[test]
fn test_export_options() {
    let mut device = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    device.define_vlan(10, Some("USERS")).unwrap();
    let script = generate(&device, &registered(&device), &opts()).unwrap();

    let flat = printer::script(&script, &ExportOptions::default());
    assert_eq!(flat, "configure terminal\nhostname Switch\nvlan 10\nname USERS\nexit\nend\n");

    let options = ExportOptions { indent: 2, privileged_prelude: true, save: true };
    assert_eq!(
        printer::script_lines(&script, &options),
        vec![
            "enable",
            "configure terminal",
            "hostname Switch",
            "vlan 10",
            "  name USERS",
            "exit",
            "end",
            "write memory",
        ]
    );
}

#[test]
fn test_printer_summaries() {
    assert_eq!(
        printer::model(&catalog::access_24()),
        "C2960-24TT-L: 24x FastEthernet, 2x GigabitEthernet [switching, voice VLAN]"
    );
    assert_eq!(
        printer::model(&catalog::branch_router()),
        "ISR4331: 3x GigabitEthernet [routing]"
    );

    let device = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    let mut registry = registered(&device);
    registry.assign(device.id(), iface("Fa0/1"), access(10), tag()).unwrap();
    let violations = crate::validate::validate(&device, &registry, &opts());
    assert_eq!(
        printer::violations(&violations),
        vec!["FastEthernet0/1.access_vlan: VLAN 10 is not defined (undefined VLAN)"]
    );
}
