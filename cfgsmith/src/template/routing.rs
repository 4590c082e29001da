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

//! # Layer-3 extension
//! Routing features of layer-3 switches: SVIs, static routes, routing processes, ACLs, NAT, DHCP
//! server and VRFs. All records are owned by the [`L3Config`] of a device.

use crate::script::ScriptWriter;
use crate::types::{check_range, ConstructionError};
use crate::values::{Description, InterfaceAddress, Ipv4Net, NatSide, Name, Netmask, VlanId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

fn name(field: &'static str, s: &str) -> Result<Name, ConstructionError> {
    Name::new(s).map_err(|e| e.in_field(field))
}

/// First-hop redundancy group (HSRP or VRRP) on an SVI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRedundancyGroup")]
pub struct RedundancyGroup {
    virtual_ip: Ipv4Addr,
    priority: Option<u8>,
    preempt: bool,
}

#[derive(Deserialize)]
struct RawRedundancyGroup {
    virtual_ip: Ipv4Addr,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    preempt: bool,
}

impl TryFrom<RawRedundancyGroup> for RedundancyGroup {
    type Error = ConstructionError;

    fn try_from(raw: RawRedundancyGroup) -> Result<Self, Self::Error> {
        let mut group = Self::new(raw.virtual_ip);
        if let Some(priority) = raw.priority {
            group = group.with_priority(priority)?;
        }
        group.preempt = raw.preempt;
        Ok(group)
    }
}

impl RedundancyGroup {
    /// Create a group with the given virtual address
    pub fn new(virtual_ip: Ipv4Addr) -> Self {
        Self { virtual_ip, priority: None, preempt: false }
    }

    /// Set the priority (1-254)
    pub fn with_priority(mut self, priority: u8) -> Result<Self, ConstructionError> {
        check_range("redundancy_priority", priority as i64, 1, 254)?;
        self.priority = Some(priority);
        Ok(self)
    }

    /// Take over the active role when having the highest priority
    pub fn with_preempt(mut self) -> Self {
        self.preempt = true;
        self
    }

    /// Virtual gateway address
    pub fn virtual_ip(&self) -> Ipv4Addr {
        self.virtual_ip
    }

    fn write(&self, w: &mut ScriptWriter, keyword: &str, group: u16) {
        w.line(format!("{} {} ip {}", keyword, group, self.virtual_ip));
        if let Some(priority) = self.priority {
            w.line(format!("{} {} priority {}", keyword, group, priority));
        }
        if self.preempt {
            w.line(format!("{} {} preempt", keyword, group));
        }
    }
}

/// # Switch Virtual Interface
/// Routed interface of a VLAN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSvi")]
pub struct Svi {
    address: Option<InterfaceAddress>,
    secondary: BTreeSet<InterfaceAddress>,
    description: Option<Description>,
    vrf: Option<Name>,
    helpers: BTreeSet<Ipv4Addr>,
    acl_in: Option<Name>,
    acl_out: Option<Name>,
    nat: Option<NatSide>,
    ospf_area: Option<u32>,
    hsrp: BTreeMap<u16, RedundancyGroup>,
    vrrp: BTreeMap<u16, RedundancyGroup>,
    shutdown: bool,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSvi {
    address: Option<InterfaceAddress>,
    secondary: BTreeSet<InterfaceAddress>,
    description: Option<Description>,
    vrf: Option<Name>,
    helpers: BTreeSet<Ipv4Addr>,
    acl_in: Option<Name>,
    acl_out: Option<Name>,
    nat: Option<NatSide>,
    ospf_area: Option<u32>,
    hsrp: BTreeMap<u16, RedundancyGroup>,
    vrrp: BTreeMap<u16, RedundancyGroup>,
    shutdown: bool,
}

impl TryFrom<RawSvi> for Svi {
    type Error = ConstructionError;

    fn try_from(raw: RawSvi) -> Result<Self, Self::Error> {
        let mut svi = Self {
            address: raw.address,
            description: raw.description,
            vrf: raw.vrf,
            helpers: raw.helpers,
            acl_in: raw.acl_in,
            acl_out: raw.acl_out,
            nat: raw.nat,
            ospf_area: raw.ospf_area,
            shutdown: raw.shutdown,
            ..Default::default()
        };
        for address in raw.secondary {
            svi.add_secondary(address)?;
        }
        for (group, config) in raw.hsrp {
            svi.set_hsrp(group, config)?;
        }
        for (group, config) in raw.vrrp {
            svi.set_vrrp(group, config)?;
        }
        Ok(svi)
    }
}

impl Svi {
    /// Create an SVI without address
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an SVI with a primary address
    pub fn with_address(address: InterfaceAddress) -> Self {
        Self { address: Some(address), ..Default::default() }
    }

    /// Primary address
    pub fn address(&self) -> Option<InterfaceAddress> {
        self.address
    }

    /// Secondary addresses
    pub fn secondary(&self) -> &BTreeSet<InterfaceAddress> {
        &self.secondary
    }

    /// All addresses (primary first)
    pub fn addresses(&self) -> impl Iterator<Item = InterfaceAddress> + '_ {
        self.address.into_iter().chain(self.secondary.iter().copied())
    }

    /// Set (or clear) the primary address. The primary address cannot be removed while
    /// secondary addresses exist.
    pub fn set_address(
        &mut self,
        address: Option<InterfaceAddress>,
    ) -> Result<&mut Self, ConstructionError> {
        if address.is_none() && !self.secondary.is_empty() {
            return Err(ConstructionError::Incompatible {
                field: "address",
                reason: "secondary addresses require a primary address".to_string(),
            });
        }
        self.address = address;
        Ok(self)
    }

    /// Add a secondary address. Requires a primary address.
    pub fn add_secondary(
        &mut self,
        address: InterfaceAddress,
    ) -> Result<&mut Self, ConstructionError> {
        if self.address.is_none() {
            return Err(ConstructionError::Incompatible {
                field: "secondary_address",
                reason: "secondary addresses require a primary address".to_string(),
            });
        }
        self.secondary.insert(address);
        Ok(self)
    }

    /// Description
    pub fn description(&self) -> Option<&Description> {
        self.description.as_ref()
    }

    /// Set the description
    pub fn set_description(&mut self, text: &str) -> Result<&mut Self, ConstructionError> {
        self.description = Some(Description::new(text)?);
        Ok(self)
    }

    /// VRF of the SVI
    pub fn vrf(&self) -> Option<&Name> {
        self.vrf.as_ref()
    }

    /// Put the SVI into a VRF (or back into the global table)
    pub fn set_vrf(&mut self, vrf: Option<&str>) -> Result<&mut Self, ConstructionError> {
        self.vrf = vrf.map(|v| name("vrf", v)).transpose()?;
        Ok(self)
    }

    /// DHCP relay destinations
    pub fn helpers(&self) -> &BTreeSet<Ipv4Addr> {
        &self.helpers
    }

    /// Relay DHCP requests to a server
    pub fn add_helper(&mut self, server: Ipv4Addr) -> &mut Self {
        self.helpers.insert(server);
        self
    }

    /// Inbound ACL
    pub fn acl_in(&self) -> Option<&Name> {
        self.acl_in.as_ref()
    }

    /// Outbound ACL
    pub fn acl_out(&self) -> Option<&Name> {
        self.acl_out.as_ref()
    }

    /// Apply (or remove) an inbound ACL
    pub fn set_acl_in(&mut self, acl: Option<&str>) -> Result<&mut Self, ConstructionError> {
        self.acl_in = acl.map(|a| name("acl_in", a)).transpose()?;
        Ok(self)
    }

    /// Apply (or remove) an outbound ACL
    pub fn set_acl_out(&mut self, acl: Option<&str>) -> Result<&mut Self, ConstructionError> {
        self.acl_out = acl.map(|a| name("acl_out", a)).transpose()?;
        Ok(self)
    }

    /// NAT side
    pub fn nat(&self) -> Option<NatSide> {
        self.nat
    }

    /// Set (or clear) the NAT side
    pub fn set_nat(&mut self, side: Option<NatSide>) -> &mut Self {
        self.nat = side;
        self
    }

    /// OSPF area of the SVI
    pub fn ospf_area(&self) -> Option<u32> {
        self.ospf_area
    }

    /// Enable OSPF on the SVI in the given area (requires an OSPF process)
    pub fn set_ospf_area(&mut self, area: Option<u32>) -> &mut Self {
        self.ospf_area = area;
        self
    }

    /// HSRP groups
    pub fn hsrp(&self) -> &BTreeMap<u16, RedundancyGroup> {
        &self.hsrp
    }

    /// Add or replace an HSRP group (0-4095)
    pub fn set_hsrp(
        &mut self,
        group: u16,
        config: RedundancyGroup,
    ) -> Result<&mut Self, ConstructionError> {
        check_range("hsrp_group", group as i64, 0, 4095)?;
        self.hsrp.insert(group, config);
        Ok(self)
    }

    /// VRRP groups
    pub fn vrrp(&self) -> &BTreeMap<u16, RedundancyGroup> {
        &self.vrrp
    }

    /// Add or replace a VRRP group (1-255)
    pub fn set_vrrp(
        &mut self,
        group: u16,
        config: RedundancyGroup,
    ) -> Result<&mut Self, ConstructionError> {
        check_range("vrrp_group", group as i64, 1, 255)?;
        self.vrrp.insert(group, config);
        Ok(self)
    }

    /// Remove all redundancy groups
    pub fn clear_redundancy(&mut self) -> &mut Self {
        self.hsrp.clear();
        self.vrrp.clear();
        self
    }

    /// The SVI is administratively down
    pub fn shutdown(&self) -> bool {
        self.shutdown
    }

    /// Shut down (or enable) the SVI
    pub fn set_shutdown(&mut self, shutdown: bool) -> &mut Self {
        self.shutdown = shutdown;
        self
    }

    fn write(&self, vlan: VlanId, ospf: Option<u16>, w: &mut ScriptWriter) {
        w.enter(format!("interface Vlan{}", vlan));
        if let Some(description) = &self.description {
            w.line(format!("description {}", description));
        }
        if let Some(vrf) = &self.vrf {
            w.line(format!("vrf forwarding {}", vrf));
        }
        if let Some(address) = &self.address {
            w.line(format!("ip address {}", address.with_mask()));
        }
        for address in self.secondary.iter() {
            w.line(format!("ip address {} secondary", address.with_mask()));
        }
        for helper in self.helpers.iter() {
            w.line(format!("ip helper-address {}", helper));
        }
        if let Some(acl) = &self.acl_in {
            w.line(format!("ip access-group {} in", acl));
        }
        if let Some(acl) = &self.acl_out {
            w.line(format!("ip access-group {} out", acl));
        }
        if let Some(side) = self.nat {
            w.line(format!("ip nat {}", side));
        }
        if let (Some(area), Some(process)) = (self.ospf_area, ospf) {
            w.line(format!("ip ospf {} area {}", process, area));
        }
        for (group, config) in self.hsrp.iter() {
            config.write(w, "standby", *group);
        }
        for (group, config) in self.vrrp.iter() {
            config.write(w, "vrrp", *group);
        }
        w.line(if self.shutdown { "shutdown" } else { "no shutdown" });
        w.exit();
    }
}

/// Next hop of a static route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextHop {
    /// Gateway address
    Address(Ipv4Addr),
    /// Directly attached SVI
    Vlan(VlanId),
    /// Discard the traffic
    Null0,
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{}", a),
            Self::Vlan(v) => write!(f, "Vlan{}", v),
            Self::Null0 => f.write_str("Null0"),
        }
    }
}

/// Static route
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawStaticRoute")]
pub struct StaticRoute {
    vrf: Option<Name>,
    prefix: Ipv4Net,
    next_hop: NextHop,
    distance: Option<u8>,
    name: Option<Name>,
}

#[derive(Deserialize)]
struct RawStaticRoute {
    #[serde(default)]
    vrf: Option<Name>,
    prefix: Ipv4Net,
    next_hop: NextHop,
    #[serde(default)]
    distance: Option<u8>,
    #[serde(default)]
    name: Option<Name>,
}

impl TryFrom<RawStaticRoute> for StaticRoute {
    type Error = ConstructionError;

    fn try_from(raw: RawStaticRoute) -> Result<Self, Self::Error> {
        let mut route = Self::new(raw.prefix, raw.next_hop);
        if let Some(distance) = raw.distance {
            route = route.with_distance(distance)?;
        }
        route.vrf = raw.vrf;
        route.name = raw.name;
        Ok(route)
    }
}

impl StaticRoute {
    /// Create a route in the global table
    pub fn new(prefix: Ipv4Net, next_hop: NextHop) -> Self {
        Self { vrf: None, prefix, next_hop, distance: None, name: None }
    }

    /// Put the route into a VRF
    pub fn in_vrf(mut self, vrf: &str) -> Result<Self, ConstructionError> {
        self.vrf = Some(name("vrf", vrf)?);
        Ok(self)
    }

    /// Set the administrative distance (1-255)
    pub fn with_distance(mut self, distance: u8) -> Result<Self, ConstructionError> {
        check_range("distance", distance as i64, 1, 255)?;
        self.distance = Some(distance);
        Ok(self)
    }

    /// Name the route
    pub fn with_name(mut self, route_name: &str) -> Result<Self, ConstructionError> {
        self.name = Some(name("route_name", route_name)?);
        Ok(self)
    }

    /// VRF of the route
    pub fn vrf(&self) -> Option<&Name> {
        self.vrf.as_ref()
    }

    /// Destination prefix
    pub fn prefix(&self) -> Ipv4Net {
        self.prefix
    }

    /// Next hop
    pub fn next_hop(&self) -> NextHop {
        self.next_hop
    }

    fn write(&self, w: &mut ScriptWriter) {
        let mut cmd = String::from("ip route");
        if let Some(vrf) = &self.vrf {
            cmd.push_str(&format!(" vrf {}", vrf));
        }
        cmd.push_str(&format!(" {} {}", self.prefix.with_mask(), self.next_hop));
        if let Some(distance) = self.distance {
            cmd.push_str(&format!(" {}", distance));
        }
        if let Some(name) = &self.name {
            cmd.push_str(&format!(" name {}", name));
        }
        w.line(cmd);
    }
}

/// OSPF process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOspfProcess")]
pub struct OspfProcess {
    id: u16,
    router_id: Option<Ipv4Addr>,
    networks: BTreeSet<(Ipv4Net, u32)>,
    passive: BTreeSet<VlanId>,
    default_originate: bool,
}

#[derive(Deserialize)]
struct RawOspfProcess {
    id: u16,
    #[serde(default)]
    router_id: Option<Ipv4Addr>,
    #[serde(default)]
    networks: BTreeSet<(Ipv4Net, u32)>,
    #[serde(default)]
    passive: BTreeSet<VlanId>,
    #[serde(default)]
    default_originate: bool,
}

impl TryFrom<RawOspfProcess> for OspfProcess {
    type Error = ConstructionError;

    fn try_from(raw: RawOspfProcess) -> Result<Self, Self::Error> {
        Ok(Self {
            router_id: raw.router_id,
            networks: raw.networks,
            passive: raw.passive,
            default_originate: raw.default_originate,
            ..Self::new(raw.id)?
        })
    }
}

impl OspfProcess {
    /// Create a process (1-65535)
    pub fn new(id: u16) -> Result<Self, ConstructionError> {
        check_range("ospf_process", id as i64, 1, 65535)?;
        Ok(Self {
            id,
            router_id: None,
            networks: BTreeSet::new(),
            passive: BTreeSet::new(),
            default_originate: false,
        })
    }

    /// Process ID
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Set the router ID
    pub fn set_router_id(&mut self, id: Ipv4Addr) -> &mut Self {
        self.router_id = Some(id);
        self
    }

    /// Enable OSPF on all interfaces inside of the network
    pub fn add_network(&mut self, network: Ipv4Net, area: u32) -> &mut Self {
        self.networks.insert((network, area));
        self
    }

    /// SVIs on which no hellos are sent
    pub fn passive(&self) -> &BTreeSet<VlanId> {
        &self.passive
    }

    /// Make an SVI passive
    pub fn add_passive(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        self.passive.insert(VlanId::new(vlan).map_err(|e| e.in_field("passive_interface"))?);
        Ok(self)
    }

    /// Originate a default route
    pub fn set_default_originate(&mut self, enable: bool) -> &mut Self {
        self.default_originate = enable;
        self
    }

    fn write(&self, w: &mut ScriptWriter) {
        w.enter(format!("router ospf {}", self.id));
        if let Some(id) = self.router_id {
            w.line(format!("router-id {}", id));
        }
        for vlan in self.passive.iter() {
            w.line(format!("passive-interface Vlan{}", vlan));
        }
        for (network, area) in self.networks.iter() {
            w.line(format!("network {} area {}", network.with_wildcard(), area));
        }
        if self.default_originate {
            w.line("default-information originate");
        }
        w.exit();
    }
}

/// EIGRP process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEigrpProcess")]
pub struct EigrpProcess {
    asn: u16,
    router_id: Option<Ipv4Addr>,
    networks: BTreeSet<Ipv4Net>,
    passive: BTreeSet<VlanId>,
}

#[derive(Deserialize)]
struct RawEigrpProcess {
    asn: u16,
    #[serde(default)]
    router_id: Option<Ipv4Addr>,
    #[serde(default)]
    networks: BTreeSet<Ipv4Net>,
    #[serde(default)]
    passive: BTreeSet<VlanId>,
}

impl TryFrom<RawEigrpProcess> for EigrpProcess {
    type Error = ConstructionError;

    fn try_from(raw: RawEigrpProcess) -> Result<Self, Self::Error> {
        Ok(Self {
            router_id: raw.router_id,
            networks: raw.networks,
            passive: raw.passive,
            ..Self::new(raw.asn)?
        })
    }
}

impl EigrpProcess {
    /// Create a process for the autonomous system (1-65535)
    pub fn new(asn: u16) -> Result<Self, ConstructionError> {
        check_range("eigrp_as", asn as i64, 1, 65535)?;
        Ok(Self { asn, router_id: None, networks: BTreeSet::new(), passive: BTreeSet::new() })
    }

    /// Autonomous system number
    pub fn asn(&self) -> u16 {
        self.asn
    }

    /// Set the router ID
    pub fn set_router_id(&mut self, id: Ipv4Addr) -> &mut Self {
        self.router_id = Some(id);
        self
    }

    /// Enable EIGRP on all interfaces inside of the network
    pub fn add_network(&mut self, network: Ipv4Net) -> &mut Self {
        self.networks.insert(network);
        self
    }

    /// SVIs on which no hellos are sent
    pub fn passive(&self) -> &BTreeSet<VlanId> {
        &self.passive
    }

    /// Make an SVI passive
    pub fn add_passive(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        self.passive.insert(VlanId::new(vlan).map_err(|e| e.in_field("passive_interface"))?);
        Ok(self)
    }

    fn write(&self, w: &mut ScriptWriter) {
        w.enter(format!("router eigrp {}", self.asn));
        if let Some(id) = self.router_id {
            w.line(format!("eigrp router-id {}", id));
        }
        for vlan in self.passive.iter() {
            w.line(format!("passive-interface Vlan{}", vlan));
        }
        for network in self.networks.iter() {
            w.line(format!("network {}", network.with_wildcard()));
        }
        w.exit();
    }
}

/// Standard ACLs match on the source only, extended ACLs on protocol, source, destination and
/// ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclKind {
    /// Standard ACL
    Standard,
    /// Extended ACL
    Extended,
}

/// Action of an ACL rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclAction {
    /// Permit matching packets
    Permit,
    /// Deny matching packets
    Deny,
}

/// Protocol matched by an extended ACL rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclProtocol {
    /// Any IP packet
    Ip,
    /// TCP
    Tcp,
    /// UDP
    Udp,
    /// ICMP
    Icmp,
}

/// Address part of an ACL rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMatch {
    /// Any address
    Any,
    /// A single host
    Host(Ipv4Addr),
    /// A network
    Network(Ipv4Net),
}

impl fmt::Display for AddressMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Host(a) => write!(f, "host {}", a),
            Self::Network(n) => f.write_str(&n.with_wildcard()),
        }
    }
}

/// Destination port match of a TCP or UDP rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortMatch {
    /// Equal to
    Eq(u16),
    /// Greater than
    Gt(u16),
    /// Less than
    Lt(u16),
    /// Inclusive range
    Range(u16, u16),
}

impl PortMatch {
    /// Create a range, failing if it is empty.
    pub fn range(from: u16, to: u16) -> Result<Self, ConstructionError> {
        if from > to {
            return Err(ConstructionError::Incompatible {
                field: "port",
                reason: format!("port range {}-{} is empty", from, to),
            });
        }
        Ok(Self::Range(from, to))
    }
}

impl fmt::Display for PortMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(p) => write!(f, "eq {}", p),
            Self::Gt(p) => write!(f, "gt {}", p),
            Self::Lt(p) => write!(f, "lt {}", p),
            Self::Range(a, b) => write!(f, "range {} {}", a, b),
        }
    }
}

/// Single ACL rule (access control entry)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAclRule")]
pub struct AclRule {
    action: AclAction,
    protocol: Option<AclProtocol>,
    source: AddressMatch,
    destination: Option<AddressMatch>,
    port: Option<PortMatch>,
    log: bool,
}

#[derive(Deserialize)]
struct RawAclRule {
    action: AclAction,
    #[serde(default)]
    protocol: Option<AclProtocol>,
    source: AddressMatch,
    #[serde(default)]
    destination: Option<AddressMatch>,
    #[serde(default)]
    port: Option<PortMatch>,
    #[serde(default)]
    log: bool,
}

impl TryFrom<RawAclRule> for AclRule {
    type Error = ConstructionError;

    fn try_from(raw: RawAclRule) -> Result<Self, Self::Error> {
        let rule = Self {
            action: raw.action,
            protocol: raw.protocol,
            source: raw.source,
            destination: raw.destination,
            port: None,
            log: raw.log,
        };
        match raw.port {
            Some(port) => rule.with_port(port),
            None => Ok(rule),
        }
    }
}

impl AclRule {
    /// Rule of a standard ACL
    pub fn standard(action: AclAction, source: AddressMatch) -> Self {
        Self { action, protocol: None, source, destination: None, port: None, log: false }
    }

    /// Rule of an extended ACL
    pub fn extended(
        action: AclAction,
        protocol: AclProtocol,
        source: AddressMatch,
        destination: AddressMatch,
    ) -> Self {
        Self {
            action,
            protocol: Some(protocol),
            source,
            destination: Some(destination),
            port: None,
            log: false,
        }
    }

    /// Match on the destination port. Only possible for TCP and UDP rules.
    pub fn with_port(mut self, port: PortMatch) -> Result<Self, ConstructionError> {
        if !matches!(self.protocol, Some(AclProtocol::Tcp) | Some(AclProtocol::Udp)) {
            return Err(ConstructionError::Incompatible {
                field: "port",
                reason: "ports can only be matched for TCP and UDP".to_string(),
            });
        }
        self.port = Some(port);
        Ok(self)
    }

    /// Log matching packets
    pub fn with_log(mut self) -> Self {
        self.log = true;
        self
    }

    /// Action of the rule
    pub fn action(&self) -> AclAction {
        self.action
    }

    fn kind(&self) -> AclKind {
        if self.protocol.is_some() || self.destination.is_some() {
            AclKind::Extended
        } else {
            AclKind::Standard
        }
    }
}

impl fmt::Display for AclRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            AclAction::Permit => "permit",
            AclAction::Deny => "deny",
        };
        f.write_str(action)?;
        if let Some(protocol) = self.protocol {
            let protocol = match protocol {
                AclProtocol::Ip => "ip",
                AclProtocol::Tcp => "tcp",
                AclProtocol::Udp => "udp",
                AclProtocol::Icmp => "icmp",
            };
            write!(f, " {}", protocol)?;
        }
        write!(f, " {}", self.source)?;
        if let Some(destination) = &self.destination {
            write!(f, " {}", destination)?;
        }
        if let Some(port) = &self.port {
            write!(f, " {}", port)?;
        }
        if self.log {
            f.write_str(" log")?;
        }
        Ok(())
    }
}

/// # Access control list
/// Named, ordered list of rules. Rules are kept sorted by their sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAcl")]
pub struct Acl {
    kind: AclKind,
    rules: BTreeMap<u32, AclRule>,
}

#[derive(Deserialize)]
struct RawAcl {
    kind: AclKind,
    #[serde(default)]
    rules: BTreeMap<u32, AclRule>,
}

impl TryFrom<RawAcl> for Acl {
    type Error = ConstructionError;

    fn try_from(raw: RawAcl) -> Result<Self, Self::Error> {
        let mut acl = Self::new(raw.kind);
        for (seq, rule) in raw.rules {
            acl.insert(seq, rule)?;
        }
        Ok(acl)
    }
}

impl Acl {
    /// Create an empty ACL
    pub fn new(kind: AclKind) -> Self {
        Self { kind, rules: BTreeMap::new() }
    }

    /// Kind of the ACL
    pub fn kind(&self) -> AclKind {
        self.kind
    }

    /// Rules, ordered by sequence number
    pub fn rules(&self) -> &BTreeMap<u32, AclRule> {
        &self.rules
    }

    /// Append a rule, using the next multiple of ten as sequence number. Returns the sequence
    /// number.
    pub fn push(&mut self, rule: AclRule) -> Result<u32, ConstructionError> {
        let seq = self.rules.keys().next_back().map(|s| (s / 10 + 1) * 10).unwrap_or(10);
        self.insert(seq, rule)?;
        Ok(seq)
    }

    /// Insert (or replace) a rule at the given sequence number (1-2147483647).
    pub fn insert(&mut self, seq: u32, rule: AclRule) -> Result<&mut Self, ConstructionError> {
        check_range("acl_sequence", seq as i64, 1, 2_147_483_647)?;
        if self.kind == AclKind::Standard && rule.kind() == AclKind::Extended {
            return Err(ConstructionError::Incompatible {
                field: "acl_rule",
                reason: "a standard ACL only matches on the source address".to_string(),
            });
        }
        if self.kind == AclKind::Extended && rule.kind() == AclKind::Standard {
            return Err(ConstructionError::Incompatible {
                field: "acl_rule",
                reason: "an extended ACL rule needs a protocol and a destination".to_string(),
            });
        }
        self.rules.insert(seq, rule);
        Ok(self)
    }

    /// Remove the rule with the given sequence number
    pub fn remove(&mut self, seq: u32) -> Option<AclRule> {
        self.rules.remove(&seq)
    }

    fn write(&self, name: &Name, w: &mut ScriptWriter) {
        let kind = match self.kind {
            AclKind::Standard => "standard",
            AclKind::Extended => "extended",
        };
        w.enter(format!("ip access-list {} {}", kind, name));
        for (seq, rule) in self.rules.iter() {
            w.line(format!("{} {}", seq, rule));
        }
        w.exit();
    }
}

/// Pool of public addresses for dynamic NAT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNatPool")]
pub struct NatPool {
    start: Ipv4Addr,
    end: Ipv4Addr,
    netmask: Netmask,
}

#[derive(Deserialize)]
struct RawNatPool {
    start: Ipv4Addr,
    end: Ipv4Addr,
    netmask: Netmask,
}

impl TryFrom<RawNatPool> for NatPool {
    type Error = ConstructionError;

    fn try_from(raw: RawNatPool) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end, raw.netmask)
    }
}

impl NatPool {
    /// Create a pool. Both addresses must lie in the same network, and start must not be after
    /// end.
    pub fn new(
        start: Ipv4Addr,
        end: Ipv4Addr,
        netmask: Netmask,
    ) -> Result<Self, ConstructionError> {
        if start > end {
            return Err(ConstructionError::Incompatible {
                field: "nat_pool",
                reason: format!("{} comes after {}", start, end),
            });
        }
        if u32::from(start) & netmask.bits() != u32::from(end) & netmask.bits() {
            return Err(ConstructionError::Incompatible {
                field: "nat_pool",
                reason: format!("{} and {} are not in the same network", start, end),
            });
        }
        Ok(Self { start, end, netmask })
    }

    fn write(&self, name: &Name, w: &mut ScriptWriter) {
        w.line(format!(
            "ip nat pool {} {} {} netmask {}",
            name, self.start, self.end, self.netmask
        ));
    }
}

/// Translation target of a dynamic NAT rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NatTarget {
    /// Addresses of a NAT pool
    Pool(Name),
    /// Address of an SVI
    Interface(VlanId),
}

/// Inside source NAT rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NatRule {
    /// Translate sources matched by an ACL to a pool or interface address
    Dynamic {
        /// ACL selecting the inside sources
        acl: Name,
        /// Translation target
        target: NatTarget,
        /// Use port address translation
        overload: bool,
    },
    /// Translate a single inside address to a fixed outside address
    Static {
        /// Inside local address
        local: Ipv4Addr,
        /// Inside global address
        global: Ipv4Addr,
    },
}

impl NatRule {
    /// Dynamic NAT to a pool
    pub fn to_pool(acl: &str, pool: &str, overload: bool) -> Result<Self, ConstructionError> {
        Ok(Self::Dynamic {
            acl: name("nat_acl", acl)?,
            target: NatTarget::Pool(name("nat_pool", pool)?),
            overload,
        })
    }

    /// Port address translation to the address of an SVI
    pub fn to_interface(acl: &str, vlan: u16) -> Result<Self, ConstructionError> {
        Ok(Self::Dynamic {
            acl: name("nat_acl", acl)?,
            target: NatTarget::Interface(VlanId::new(vlan).map_err(|e| e.in_field("nat_target"))?),
            overload: true,
        })
    }

    /// Static one-to-one translation
    pub fn fixed(local: Ipv4Addr, global: Ipv4Addr) -> Self {
        Self::Static { local, global }
    }

    fn write(&self, w: &mut ScriptWriter) {
        match self {
            Self::Dynamic { acl, target, overload } => {
                let target = match target {
                    NatTarget::Pool(pool) => format!("pool {}", pool),
                    NatTarget::Interface(vlan) => format!("interface Vlan{}", vlan),
                };
                let overload = if *overload { " overload" } else { "" };
                w.line(format!("ip nat inside source list {} {}{}", acl, target, overload));
            }
            Self::Static { local, global } => {
                w.line(format!("ip nat inside source static {} {}", local, global))
            }
        }
    }
}

/// DHCP server pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDhcpPool")]
pub struct DhcpPool {
    network: Ipv4Net,
    default_router: Option<Ipv4Addr>,
    dns_servers: Vec<Ipv4Addr>,
    domain_name: Option<Name>,
    lease_days: Option<u16>,
}

#[derive(Deserialize)]
struct RawDhcpPool {
    network: Ipv4Net,
    #[serde(default)]
    default_router: Option<Ipv4Addr>,
    #[serde(default)]
    dns_servers: Vec<Ipv4Addr>,
    #[serde(default)]
    domain_name: Option<Name>,
    #[serde(default)]
    lease_days: Option<u16>,
}

impl TryFrom<RawDhcpPool> for DhcpPool {
    type Error = ConstructionError;

    fn try_from(raw: RawDhcpPool) -> Result<Self, Self::Error> {
        let mut pool = Self::new(raw.network);
        if let Some(router) = raw.default_router {
            pool.set_default_router(router)?;
        }
        if let Some(days) = raw.lease_days {
            pool.set_lease_days(days)?;
        }
        for server in raw.dns_servers {
            pool.add_dns_server(server);
        }
        pool.domain_name = raw.domain_name;
        Ok(pool)
    }
}

impl DhcpPool {
    /// Create a pool serving the network
    pub fn new(network: Ipv4Net) -> Self {
        Self {
            network,
            default_router: None,
            dns_servers: Vec::new(),
            domain_name: None,
            lease_days: None,
        }
    }

    /// Served network
    pub fn network(&self) -> Ipv4Net {
        self.network
    }

    /// Default router announced to the clients
    pub fn default_router(&self) -> Option<Ipv4Addr> {
        self.default_router
    }

    /// Set the default router. It must lie inside the served network.
    pub fn set_default_router(&mut self, router: Ipv4Addr) -> Result<&mut Self, ConstructionError> {
        if !self.network.contains(router) {
            return Err(ConstructionError::Incompatible {
                field: "default_router",
                reason: format!("{} is outside of {}", router, self.network),
            });
        }
        self.default_router = Some(router);
        Ok(self)
    }

    /// Add a DNS server. The order of the servers is kept, duplicates are ignored.
    pub fn add_dns_server(&mut self, server: Ipv4Addr) -> &mut Self {
        if !self.dns_servers.contains(&server) {
            self.dns_servers.push(server);
        }
        self
    }

    /// Set the domain name announced to the clients
    pub fn set_domain_name(&mut self, domain: &str) -> Result<&mut Self, ConstructionError> {
        self.domain_name = Some(name("dhcp_domain_name", domain)?);
        Ok(self)
    }

    /// Set the lease time in days (0-365)
    pub fn set_lease_days(&mut self, days: u16) -> Result<&mut Self, ConstructionError> {
        check_range("lease", days as i64, 0, 365)?;
        self.lease_days = Some(days);
        Ok(self)
    }

    fn write(&self, name: &Name, w: &mut ScriptWriter) {
        w.enter(format!("ip dhcp pool {}", name));
        w.line(format!("network {}", self.network.with_mask()));
        if let Some(router) = self.default_router {
            w.line(format!("default-router {}", router));
        }
        if !self.dns_servers.is_empty() {
            w.line(format!("dns-server {}", self.dns_servers.iter().join(" ")));
        }
        if let Some(domain) = &self.domain_name {
            w.line(format!("domain-name {}", domain));
        }
        if let Some(days) = self.lease_days {
            w.line(format!("lease {}", days));
        }
        w.exit();
    }
}

/// Route distinguisher of a VRF, either `<asn>:<nn>` or `<ip>:<nn>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteDistinguisher(String);

impl FromStr for RouteDistinguisher {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = match s.split_once(':') {
            Some((admin, assigned)) => {
                (admin.parse::<u32>().is_ok() || admin.parse::<Ipv4Addr>().is_ok())
                    && assigned.parse::<u32>().is_ok()
            }
            None => false,
        };
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ConstructionError::InvalidFormat {
                field: "rd",
                value: s.to_string(),
                expected: "a route distinguisher like 65000:1 or 10.0.0.1:1",
            })
        }
    }
}

impl TryFrom<String> for RouteDistinguisher {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RouteDistinguisher> for String {
    fn from(rd: RouteDistinguisher) -> String {
        rd.0
    }
}

impl fmt::Display for RouteDistinguisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// VRF definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vrf {
    rd: Option<RouteDistinguisher>,
    description: Option<Description>,
}

impl Vrf {
    /// Create a VRF without route distinguisher
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the route distinguisher
    pub fn set_rd(&mut self, rd: &str) -> Result<&mut Self, ConstructionError> {
        self.rd = Some(rd.parse()?);
        Ok(self)
    }

    /// Set the description
    pub fn set_description(&mut self, text: &str) -> Result<&mut Self, ConstructionError> {
        self.description = Some(Description::new(text)?);
        Ok(self)
    }

    fn write(&self, name: &Name, w: &mut ScriptWriter) {
        w.enter(format!("vrf definition {}", name));
        if let Some(description) = &self.description {
            w.line(format!("description {}", description));
        }
        if let Some(rd) = &self.rd {
            w.line(format!("rd {}", rd));
        }
        w.enter("address-family ipv4");
        w.exit_with("exit-address-family");
        w.exit();
    }
}

/// # Layer-3 configuration
/// Routing features of a layer-3 switch. Definitions are keyed by their name (or VLAN), so a
/// name is unique within the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct L3Config {
    pub(crate) svis: BTreeMap<VlanId, Svi>,
    pub(crate) routes: BTreeSet<StaticRoute>,
    pub(crate) ospf: Option<OspfProcess>,
    pub(crate) eigrp: Option<EigrpProcess>,
    pub(crate) acls: BTreeMap<Name, Acl>,
    pub(crate) nat_pools: BTreeMap<Name, NatPool>,
    pub(crate) nat_rules: BTreeSet<NatRule>,
    pub(crate) dhcp_excluded: BTreeSet<(Ipv4Addr, Ipv4Addr)>,
    pub(crate) dhcp_pools: BTreeMap<Name, DhcpPool>,
    pub(crate) vrfs: BTreeMap<Name, Vrf>,
}

impl L3Config {
    /// SVIs by VLAN
    pub fn svis(&self) -> &BTreeMap<VlanId, Svi> {
        &self.svis
    }

    /// Static routes
    pub fn routes(&self) -> &BTreeSet<StaticRoute> {
        &self.routes
    }

    /// OSPF process
    pub fn ospf(&self) -> Option<&OspfProcess> {
        self.ospf.as_ref()
    }

    /// EIGRP process
    pub fn eigrp(&self) -> Option<&EigrpProcess> {
        self.eigrp.as_ref()
    }

    /// ACLs by name
    pub fn acls(&self) -> &BTreeMap<Name, Acl> {
        &self.acls
    }

    /// NAT pools by name
    pub fn nat_pools(&self) -> &BTreeMap<Name, NatPool> {
        &self.nat_pools
    }

    /// NAT rules
    pub fn nat_rules(&self) -> &BTreeSet<NatRule> {
        &self.nat_rules
    }

    /// DHCP pools by name
    pub fn dhcp_pools(&self) -> &BTreeMap<Name, DhcpPool> {
        &self.dhcp_pools
    }

    /// VRFs by name
    pub fn vrfs(&self) -> &BTreeMap<Name, Vrf> {
        &self.vrfs
    }

    /// Returns `true` if the switch has to route packets.
    pub fn routing_enabled(&self) -> bool {
        !self.svis.is_empty()
            || !self.routes.is_empty()
            || self.ospf.is_some()
            || self.eigrp.is_some()
    }

    pub(crate) fn write_routing(&self, w: &mut ScriptWriter) {
        if self.routing_enabled() {
            w.line("ip routing");
        }
    }

    pub(crate) fn write_globals(&self, w: &mut ScriptWriter) {
        for (name, acl) in self.acls.iter() {
            acl.write(name, w);
        }
        for (name, pool) in self.nat_pools.iter() {
            pool.write(name, w);
        }
        for rule in self.nat_rules.iter() {
            rule.write(w);
        }
        for (from, to) in self.dhcp_excluded.iter() {
            if from == to {
                w.line(format!("ip dhcp excluded-address {}", from));
            } else {
                w.line(format!("ip dhcp excluded-address {} {}", from, to));
            }
        }
        for (name, pool) in self.dhcp_pools.iter() {
            pool.write(name, w);
        }
        for (name, vrf) in self.vrfs.iter() {
            vrf.write(name, w);
        }
        for route in self.routes.iter() {
            route.write(w);
        }
        if let Some(ospf) = &self.ospf {
            ospf.write(w);
        }
        if let Some(eigrp) = &self.eigrp {
            eigrp.write(w);
        }
    }

    pub(crate) fn write_svis(&self, w: &mut ScriptWriter) {
        let ospf = self.ospf.as_ref().map(|p| p.id);
        for (vlan, svi) in self.svis.iter() {
            svi.write(*vlan, ospf, w);
        }
    }
}
