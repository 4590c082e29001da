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


use crate::color::Color;
use crate::types::{ConstructionError, InterfaceId, InterfaceKind};
use crate::values::*;
use std::net::Ipv4Addr;

#[test]
fn test_vlan_id_range() {
    assert_eq!(VlanId::new(1).unwrap().get(), 1);
    assert_eq!(VlanId::new(4094).unwrap().get(), 4094);
    assert_eq!(
        VlanId::new(4095),
        Err(ConstructionError::OutOfRange { field: "vlan", value: 4095, min: 1, max: 4094 })
    );
    assert_eq!(VlanId::new(0).unwrap_err().field(), "vlan");
    assert_eq!("Vlan20".parse::<VlanId>().unwrap().get(), 20);
    assert!("twenty".parse::<VlanId>().is_err());
}

#[test]
fn test_vlan_set() {
    let set: VlanSet = "30,10,20-22,21".parse().unwrap();
    assert_eq!(set.to_string(), "10,20-22,30");
    assert_eq!(set.len(), 5);
    assert!(set.contains(VlanId::new(21).unwrap()));

    let empty: VlanSet = "".parse().unwrap();
    assert!(empty.is_empty());

    assert!("22-20".parse::<VlanSet>().is_err());
    assert!("1-5000".parse::<VlanSet>().is_err());

    let set = VlanSet::from_ids(vec![5, 4, 4, 6, 9]).unwrap();
    assert_eq!(set.to_string(), "4-6,9");
    assert_eq!(set.iter().map(|v| v.get()).collect::<Vec<_>>(), vec![4, 5, 6, 9]);
}

#[test]
fn test_mac_address() {
    let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();
    assert_eq!(mac.to_string(), "0011.2233.4455");
    assert_eq!("00-11-22-33-44-55".parse::<MacAddress>().unwrap(), mac);
    assert_eq!("0011.2233.4455".parse::<MacAddress>().unwrap(), mac);
    assert_eq!("AA:BB:CC:DD:EE:FF".parse::<MacAddress>().unwrap().to_string(), "aabb.ccdd.eeff");
    assert!(!mac.is_multicast());
    assert!("01:00:5e:00:00:01".parse::<MacAddress>().unwrap().is_multicast());

    assert!("00:11:22:33:44".parse::<MacAddress>().is_err());
    assert!("0011:2233:4455".parse::<MacAddress>().is_err());
    assert_eq!("zz:11:22:33:44:55".parse::<MacAddress>().unwrap_err().field(), "mac_address");
}

#[test]
fn test_netmask() {
    let mask: Netmask = "255.255.255.0".parse().unwrap();
    assert_eq!(mask.prefix_len(), 24);
    assert_eq!(mask.wildcard(), Ipv4Addr::new(0, 0, 0, 255));
    assert_eq!("/24".parse::<Netmask>().unwrap(), mask);
    assert_eq!("24".parse::<Netmask>().unwrap(), mask);
    assert_eq!(Netmask::from_prefix_len(30).unwrap().to_string(), "255.255.255.252");
    assert!(Netmask::from_prefix_len(33).is_err());
    assert!("255.0.255.0".parse::<Netmask>().is_err());
}

#[test]
fn test_network_and_address() {
    let net: Ipv4Net = "10.1.0.0/16".parse().unwrap();
    assert!(net.contains(Ipv4Addr::new(10, 1, 200, 3)));
    assert!(!net.contains(Ipv4Addr::new(10, 2, 0, 1)));
    assert_eq!(net.with_mask(), "10.1.0.0 255.255.0.0");
    assert_eq!(net.with_wildcard(), "10.1.0.0 0.0.255.255");
    assert_eq!(net.to_string(), "10.1.0.0/16");
    assert!("10.1.0.1/16".parse::<Ipv4Net>().is_err());

    let addr: InterfaceAddress = "192.168.10.1/24".parse().unwrap();
    assert_eq!(addr.with_mask(), "192.168.10.1 255.255.255.0");
    assert_eq!(addr.network(), "192.168.10.0/24".parse().unwrap());
    assert_eq!("192.168.10.0/24".parse::<InterfaceAddress>().unwrap_err().field(), "address");
    assert!("192.168.10.255/24".parse::<InterfaceAddress>().is_err());
    // point-to-point links use both addresses
    assert!("10.0.0.0/31".parse::<InterfaceAddress>().is_ok());
}

#[test]
fn test_keywords() {
    assert_eq!("rapid-pvst".parse::<StpMode>().unwrap(), StpMode::RapidPvst);
    assert_eq!("SHUTDOWN".parse::<ViolationAction>().unwrap(), ViolationAction::Shutdown);
    assert_eq!(SnmpAccess::ReadOnly.to_string(), "RO");
    assert_eq!(Speed::Mbps1000.mbps(), Some(1000));
    assert_eq!("fast".parse::<Speed>().unwrap_err().field(), "speed");
    assert!(ChannelProtocol::Lacp.allows(ChannelMode::Passive));
    assert!(!ChannelProtocol::Lacp.allows(ChannelMode::Desirable));
    assert_eq!(ChannelProtocol::Pagp.default_mode(), ChannelMode::Desirable);
}

#[test]
fn test_bounded_scalars() {
    assert!(MaxMacCount::new(0).is_err());
    assert_eq!(MaxMacCount::new(8192).unwrap().get(), 8192);
    assert!(RateLimit::new(2049).is_err());

    assert_eq!(StpPriority::new(4096).unwrap().get(), 4096);
    assert!(matches!(
        StpPriority::new(1000),
        Err(ConstructionError::InvalidFormat { field: "stp_priority", .. })
    ));
    assert!(StpPriority::new(65535).is_err());

    assert_eq!(LoggingLevel::default().to_string(), "informational");
    assert_eq!("warnings".parse::<LoggingLevel>().unwrap().get(), 4);
    assert!(LoggingLevel::new(8).is_err());
}

#[test]
fn test_storm_threshold() {
    assert_eq!(StormThreshold::percent(20.0, Some(10.0)).unwrap().to_string(), "20.00 10.00");
    assert_eq!(StormThreshold::percent(0.5, None).unwrap().to_string(), "0.50");
    assert_eq!(StormThreshold::pps(1000, Some(500)).unwrap().to_string(), "pps 1000 500");
    assert!(StormThreshold::percent(10.0, Some(20.0)).is_err());
    assert!(StormThreshold::percent(120.0, None).is_err());
    assert!(StormThreshold::pps(100, Some(200)).is_err());
}

#[test]
fn test_names() {
    assert_eq!(Name::new("CORP").unwrap().as_str(), "CORP");
    assert!(Name::new("").is_err());
    assert!(Name::new("two words").is_err());
    assert!(Name::new("x".repeat(65)).is_err());
    assert!(Hostname::new("access-sw-01").is_ok());
    assert_eq!(Hostname::new("-bad").unwrap_err().field(), "hostname");
    assert!(Description::new("Uplink to core").is_ok());
    assert_eq!(format!("{:?}", Secret::new("hunter2").unwrap()), "Secret(***)");
}

#[test]
fn test_color() {
    assert_eq!(Color::default(), Color::new(0x42, 0x87, 0xf5));
    assert_eq!("#abc".parse::<Color>().unwrap().to_string(), "#AABBCC");
    assert_eq!("4287f5".parse::<Color>().unwrap(), Color::default());
    assert!("#12345".parse::<Color>().is_err());
    assert!("#gggggg".parse::<Color>().is_err());
    assert_eq!(Color::new(250, 10, 0).adjust(10), Color::new(255, 20, 10));
    assert_eq!(Color::new(5, 10, 0).adjust(-10), Color::new(0, 0, 0));
    assert_eq!(Color::BLACK.contrasting_text(), Color::WHITE);
    assert_eq!(Color::WHITE.contrasting_text(), Color::BLACK);
}

#[test]
fn test_interface_id() {
    let short: InterfaceId = "Gi0/1".parse().unwrap();
    let long: InterfaceId = "GigabitEthernet0/1".parse().unwrap();
    assert_eq!(short, long);
    assert_eq!(short.to_string(), "GigabitEthernet0/1");
    assert_eq!(short.short_name(), "Gi0/1");
    assert_eq!(short.kind(), InterfaceKind::GigabitEthernet);
    assert_eq!(short.path(), &[0, 1]);

    let a: InterfaceId = "Gi1/0/2".parse().unwrap();
    let b: InterfaceId = "Gi1/0/10".parse().unwrap();
    assert!(a < b);
    let fa: InterfaceId = "Fa0/24".parse().unwrap();
    assert!(fa < short);

    assert_eq!("Foo0/1".parse::<InterfaceId>().unwrap_err().field(), "interface");
    assert!("Gi0/x".parse::<InterfaceId>().is_err());
}
