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
use crate::template::*;
use crate::types::{ConstructionError, DeviceClass, DeviceId, InterfaceId, ModelCapability};
use crate::values::*;
use std::net::Ipv4Addr;

fn l2() -> DeviceTemplate {
    DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap()
}

fn l3() -> DeviceTemplate {
    DeviceTemplate::switch_l3(DeviceId(1), catalog::l3_poe_24()).unwrap()
}

fn router() -> DeviceTemplate {
    DeviceTemplate::router(DeviceId(2), catalog::branch_router()).unwrap()
}

fn iface(s: &str) -> InterfaceId {
    s.parse().unwrap()
}

#[test]
fn test_device_class_and_model() {
    assert_eq!(l2().hostname().as_str(), "Switch");
    assert_eq!(router().hostname().as_str(), "Router");
    assert_eq!(l3().class(), DeviceClass::SwitchL3);
    assert!(l3().supports_routing() && l3().supports_switching());
    assert!(!l2().supports_routing());
    assert!(!router().supports_switching());
    assert!(l2().l3().is_none());

    assert_eq!(
        DeviceTemplate::switch_l3(DeviceId(3), catalog::access_24()),
        Err(ConstructionError::UnsupportedByModel {
            field: "class",
            model: "C2960-24TT-L".to_string(),
            capability: ModelCapability::Routing,
        })
    );
    assert!(DeviceTemplate::router(DeviceId(3), catalog::access_24()).is_err());
    assert!(DeviceTemplate::switch_l2(DeviceId(3), catalog::branch_router()).is_err());
}

#[test]
fn test_identity_and_vlans() {
    let mut d = l2();
    d.set_hostname("access-01").unwrap();
    assert!(d.set_hostname("bad name").is_err());
    assert_eq!(d.hostname().as_str(), "access-01");

    d.set_domain_name(Some("corp.example")).unwrap();
    assert!(d.is_active(DeviceFeature::DomainName));
    d.set_domain_name(None).unwrap();
    assert!(!d.is_active(DeviceFeature::DomainName));

    d.define_vlan(20, Some("VOICE")).unwrap();
    d.define_vlan(10, None).unwrap();
    assert!(d.define_vlan(4095, None).is_err());
    assert_eq!(d.define_vlan(30, Some("two words")).unwrap_err().field(), "vlan_name");
    let ids: Vec<u16> = d.vlans().keys().map(|v| v.get()).collect();
    assert_eq!(ids, vec![10, 20]);
    assert!(d.is_vlan_defined(VlanId::new(10).unwrap()));
    assert!(d.remove_vlan(10).unwrap());
    assert!(!d.remove_vlan(10).unwrap());
}

#[test]
fn test_inert_device_features() {
    let d = l3();
    for feature in [
        DeviceFeature::DomainName,
        DeviceFeature::Vlans,
        DeviceFeature::Management,
        DeviceFeature::Stp,
        DeviceFeature::Logging,
        DeviceFeature::Snmp,
        DeviceFeature::Span,
        DeviceFeature::Aaa,
        DeviceFeature::Ssh,
        DeviceFeature::SwitchServices,
        DeviceFeature::Svis,
        DeviceFeature::Redundancy,
        DeviceFeature::StaticRoutes,
        DeviceFeature::Ospf,
        DeviceFeature::Eigrp,
        DeviceFeature::Acls,
        DeviceFeature::Nat,
        DeviceFeature::Dhcp,
        DeviceFeature::Vrfs,
    ] {
        assert!(!d.is_active(feature), "{:?} should be inert", feature);
    }
}

#[test]
fn test_switch_only_features() {
    let mut r = router();
    assert!(matches!(
        r.set_stp_mode(StpMode::RapidPvst),
        Err(ConstructionError::UnsupportedByDevice {
            field: "stp_mode",
            device: DeviceClass::Router
        })
    ));
    assert!(r.set_mls_qos(true).is_err());
    assert!(r.set_dhcp_snooping_vlans(vec![10]).is_err());
    let span = SpanSession::new(vec![iface("Gi0/0/1")], iface("Gi0/0/2")).unwrap();
    assert!(r.set_span_session(1, span).is_err());
    assert!(r.stp().is_none());
    assert!(r.services().is_none());

    let mut s = l2();
    s.set_stp_mode(StpMode::RapidPvst).unwrap();
    s.set_stp_priority(10, Some(4096)).unwrap();
    assert!(s.set_stp_priority(10, Some(1000)).is_err());
    assert_eq!(s.stp().unwrap().priorities().len(), 1);
    s.set_errdisable_recovery(Some(300)).unwrap();
    assert_eq!(s.set_errdisable_recovery(Some(10)).unwrap_err().field(), "errdisable_recovery");
    assert_eq!(s.services().unwrap().errdisable_recovery(), Some(300));
}

#[test]
fn test_management() {
    let mut r = router();
    let vlan_mgmt = Management {
        interface: ManagementInterface::Vlan(VlanId::new(99).unwrap()),
        address: Some("10.0.99.2/24".parse().unwrap()),
        gateway: Some(Ipv4Addr::new(10, 0, 99, 1)),
    };
    assert_eq!(r.set_management(Some(vlan_mgmt.clone())).unwrap_err().field(), "management_vlan");

    let bad_port = Management {
        interface: ManagementInterface::Port(iface("Gi0/5")),
        address: None,
        gateway: None,
    };
    assert_eq!(r.set_management(Some(bad_port)).unwrap_err().field(), "management");

    let port = Management {
        interface: ManagementInterface::Port(iface("Gi0/0/2")),
        address: Some("192.168.0.2/24".parse().unwrap()),
        gateway: None,
    };
    r.set_management(Some(port)).unwrap();
    assert!(r.is_active(DeviceFeature::Management));

    let mut s = l2();
    s.set_management(Some(vlan_mgmt)).unwrap();
    s.set_management(None).unwrap();
    assert!(s.management().is_none());
}

#[test]
fn test_logging_snmp_aaa() {
    let mut d = l2();
    d.add_logging_host(Ipv4Addr::new(10, 0, 0, 5));
    d.set_logging_trap(Some(LoggingLevel::new(4).unwrap()));
    assert_eq!(d.set_logging_buffered(Some(100)).unwrap_err().field(), "logging_buffered");
    d.set_logging_buffered(Some(16384)).unwrap();
    assert_eq!(d.logging().unwrap().buffered(), Some(16384));
    d.remove_logging_host(Ipv4Addr::new(10, 0, 0, 5));
    d.set_logging_trap(None);
    d.set_logging_buffered(None).unwrap();
    assert!(d.logging().is_none());

    d.set_snmp_community("public", SnmpAccess::ReadOnly).unwrap();
    d.set_snmp_location(Some("Building 1")).unwrap();
    d.remove_snmp_community("public");
    assert!(d.snmp().unwrap().communities().is_empty());
    d.set_snmp_location(None).unwrap();
    assert!(!d.is_active(DeviceFeature::Snmp));

    d.set_enable_secret(Some("s3cret")).unwrap();
    assert_eq!(d.set_enable_secret(Some("has space")).unwrap_err().field(), "enable_secret");
    d.set_local_user("admin", LocalUser::new(15, "pw").unwrap()).unwrap();
    assert!(LocalUser::new(16, "pw").is_err());
    d.set_login_local(true);
    assert!(d.aaa().unwrap().login_local());
    assert_eq!(d.aaa().unwrap().users().len(), 1);
    d.remove_local_user("admin");
    assert!(d.aaa().unwrap().users().is_empty());

    assert!(SshSettings::new(768).is_err());
    d.set_ssh(Some(SshSettings::new(2048).unwrap()));
    assert_eq!(d.ssh().unwrap().modulus(), 2048);
}

#[test]
fn test_span_sessions() {
    let mut d = l2();
    assert!(SpanSession::new(Vec::new(), iface("Fa0/24")).is_err());
    assert!(SpanSession::new(vec![iface("Fa0/1")], iface("Fa0/1")).is_err());

    let session = SpanSession::new(vec![iface("Fa0/2"), iface("Fa0/1")], iface("Fa0/24")).unwrap();
    assert_eq!(d.set_span_session(67, session.clone()).unwrap_err().field(), "span");
    d.set_span_session(1, session.clone()).unwrap();
    assert_eq!(d.span_sessions().len(), 1);

    let undeclared = SpanSession::new(vec![iface("Gi1/0/1")], iface("Fa0/24")).unwrap();
    assert!(d.set_span_session(2, undeclared).is_err());
    assert_eq!(d.remove_span_session(1), Some(session));
}

#[test]
fn test_layer3_setters_rejected_on_layer2() {
    let mut d = l2();
    let before = d.clone();
    let svi = Svi::with_address("10.0.10.1/24".parse().unwrap());
    assert_eq!(
        d.set_svi(10, svi),
        Err(ConstructionError::UnsupportedByDevice { field: "svi", device: DeviceClass::SwitchL2 })
    );
    let route = StaticRoute::new("0.0.0.0/0".parse().unwrap(), NextHop::Null0);
    assert!(d.add_static_route(route).is_err());
    assert!(d.set_ospf(Some(OspfProcess::new(1).unwrap())).is_err());
    assert!(d.set_acl("WEB", Acl::new(AclKind::Extended)).is_err());
    assert!(d.add_nat_rule(NatRule::fixed(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(1, 1, 1, 5)))
        .is_err());
    assert!(d
        .exclude_dhcp_range(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 9))
        .is_err());
    assert!(d.set_vrf("CUST", Vrf::new()).is_err());
    assert_eq!(d, before);

    let mut r = router();
    assert!(matches!(
        r.set_svi(10, Svi::new()),
        Err(ConstructionError::UnsupportedByDevice { device: DeviceClass::Router, .. })
    ));
}

#[test]
fn test_layer3_setters() {
    let mut d = l3();
    d.set_svi(10, Svi::with_address("10.0.10.1/24".parse().unwrap())).unwrap();
    assert!(d.set_svi(0, Svi::new()).is_err());
    d.add_static_route(StaticRoute::new(
        "0.0.0.0/0".parse().unwrap(),
        NextHop::Address(Ipv4Addr::new(10, 0, 10, 254)),
    ))
    .unwrap();
    d.set_ospf(Some(OspfProcess::new(1).unwrap())).unwrap();
    assert!(d.is_active(DeviceFeature::Svis));
    assert!(d.is_active(DeviceFeature::StaticRoutes));
    assert!(d.is_active(DeviceFeature::Ospf));
    assert!(d.l3().unwrap().routing_enabled());

    assert!(d
        .exclude_dhcp_range(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 1))
        .is_err());
    d.exclude_dhcp_range(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 9)).unwrap();
    assert!(d.is_active(DeviceFeature::Dhcp));

    assert!(d.remove_svi(10).unwrap().is_some());
    assert!(d.remove_svi(10).unwrap().is_none());
}

#[test]
fn test_svi_construction() {
    let mut svi = Svi::new();
    let secondary: InterfaceAddress = "10.1.0.1/24".parse().unwrap();
    assert_eq!(svi.add_secondary(secondary).unwrap_err().field(), "secondary_address");
    svi.set_address(Some("10.0.0.1/24".parse().unwrap())).unwrap();
    svi.add_secondary(secondary).unwrap();
    assert!(svi.set_address(None).is_err());
    assert_eq!(svi.addresses().count(), 2);
    assert_eq!(svi.addresses().next(), svi.address());

    let vip = RedundancyGroup::new(Ipv4Addr::new(10, 0, 0, 254));
    assert!(vip.clone().with_priority(0).is_err());
    assert!(svi.set_hsrp(4096, vip.clone()).is_err());
    assert!(svi.set_vrrp(0, vip.clone()).is_err());
    svi.set_hsrp(1, vip.with_priority(110).unwrap().with_preempt()).unwrap();
    assert_eq!(svi.hsrp().len(), 1);
    svi.clear_redundancy();
    assert!(svi.hsrp().is_empty());
}

#[test]
fn test_routing_objects() {
    let mut acl = Acl::new(AclKind::Extended);
    let web = AclRule::extended(
        AclAction::Permit,
        AclProtocol::Tcp,
        AddressMatch::Any,
        AddressMatch::Host(Ipv4Addr::new(10, 0, 0, 80)),
    )
    .with_port(PortMatch::Eq(80))
    .unwrap()
    .with_log();
    assert_eq!(web.to_string(), "permit tcp any host 10.0.0.80 eq 80 log");
    assert_eq!(acl.push(web).unwrap(), 10);
    let any = AddressMatch::Any;
    let deny = AclRule::extended(AclAction::Deny, AclProtocol::Ip, any, any);
    assert_eq!(acl.push(deny).unwrap(), 20);
    let standard = AclRule::standard(AclAction::Permit, AddressMatch::Any);
    assert_eq!(acl.insert(15, standard).unwrap_err().field(), "acl_rule");
    assert_eq!(acl.rules().len(), 2);

    let icmp = AclRule::extended(AclAction::Permit, AclProtocol::Icmp, any, any);
    assert_eq!(icmp.with_port(PortMatch::Eq(7)).unwrap_err().field(), "port");
    assert!(PortMatch::range(100, 10).is_err());

    let mask: Netmask = "255.255.255.0".parse().unwrap();
    assert!(NatPool::new(Ipv4Addr::new(1, 1, 1, 20), Ipv4Addr::new(1, 1, 1, 10), mask).is_err());
    assert!(NatPool::new(Ipv4Addr::new(1, 1, 1, 10), Ipv4Addr::new(1, 1, 2, 10), mask).is_err());
    assert!(NatPool::new(Ipv4Addr::new(1, 1, 1, 10), Ipv4Addr::new(1, 1, 1, 20), mask).is_ok());

    let mut pool = DhcpPool::new("10.0.10.0/24".parse().unwrap());
    assert!(pool.set_default_router(Ipv4Addr::new(10, 0, 20, 1)).is_err());
    pool.set_default_router(Ipv4Addr::new(10, 0, 10, 1)).unwrap();
    assert!(pool.set_lease_days(400).is_err());

    assert!("65000:100".parse::<RouteDistinguisher>().is_ok());
    assert!("10.0.0.1:7".parse::<RouteDistinguisher>().is_ok());
    assert_eq!("65000".parse::<RouteDistinguisher>().unwrap_err().field(), "rd");
    assert!(OspfProcess::new(0).is_err());
    let route = StaticRoute::new("10.0.0.0/8".parse().unwrap(), NextHop::Null0);
    assert!(route.with_distance(0).is_err());
}

#[test]
fn test_config_round_trip() {
    let mut d = l3();
    d.set_hostname("core-01").unwrap();
    d.define_vlan(10, Some("USERS")).unwrap();
    d.set_svi(10, Svi::with_address("10.0.10.1/24".parse().unwrap())).unwrap();
    let config = d.config();

    let json = serde_json::to_string(&config).unwrap();
    let back: DeviceConfig = serde_json::from_str(&json).unwrap();
    let copy = DeviceTemplate::from_config(DeviceId(7), catalog::l3_poe_24(), back).unwrap();
    assert_eq!(copy.config(), config);
    assert_eq!(copy.id(), DeviceId(7));

    let mut other = l2();
    assert_eq!(other.load_config(config).unwrap_err().field(), "class");
    assert_eq!(other.hostname().as_str(), "Switch");
}
