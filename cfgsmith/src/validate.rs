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

//! # Validation Layer
//! Cross-checks a template graph (a device template together with all port templates bound to
//! its interfaces) before generation. The validation collects every violation instead of
//! stopping at the first one, and never mutates the graph.

use crate::registry::InterfaceRegistry;
use crate::template::{
    DeviceTemplate, L3Config, ManagementInterface, NatRule, NatTarget, NextHop, PortTemplate,
};
use crate::types::{GenerationPreconditionError, InterfaceId, ModelCapability};
use crate::values::{InterfaceAddress, Name, VlanId};
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Kind of constraint violated by a template graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// A VLAN is referenced, but not defined on the device
    UndefinedVlan,
    /// The native VLAN of a trunk conflicts with its allowed VLAN set
    NativeVlanPolicy,
    /// Access and voice VLAN are the same
    VoiceEqualsAccess,
    /// A port feature needs a capability the device model does not provide
    UnsupportedByModel,
    /// Members of the same EtherChannel are configured differently
    EtherChannelMismatch,
    /// A named definition (ACL, VRF, NAT pool, SVI, routing process) is referenced, but missing
    UndefinedReference,
    /// The same address is configured twice
    DuplicateAddress,
    /// Two interfaces of the same routing table are in overlapping subnets
    OverlappingSubnet,
    /// A virtual address lies outside of the subnets of its interface
    AddressOutsideSubnet,
    /// A feature requires another feature which is not configured
    MissingPrerequisite,
    /// An interface is used by a device feature and bound to a port template at the same time
    PortConflict,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UndefinedVlan => "undefined VLAN",
            Self::NativeVlanPolicy => "native VLAN policy",
            Self::VoiceEqualsAccess => "voice VLAN equals access VLAN",
            Self::UnsupportedByModel => "unsupported by model",
            Self::EtherChannelMismatch => "EtherChannel mismatch",
            Self::UndefinedReference => "undefined reference",
            Self::DuplicateAddress => "duplicate address",
            Self::OverlappingSubnet => "overlapping subnet",
            Self::AddressOutsideSubnet => "address outside of subnet",
            Self::MissingPrerequisite => "missing prerequisite",
            Self::PortConflict => "port conflict",
        })
    }
}

/// A single violation, naming the offending field and the violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending field, like `GigabitEthernet0/1.native_vlan` or `Vlan10.acl_in`
    pub field: String,
    /// Violated constraint
    pub constraint: Constraint,
    /// Human readable description
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered and de-duplicated set of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violations(BTreeSet<Violation>);

impl Violations {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a violation
    pub fn push(&mut self, field: impl Into<String>, constraint: Constraint, message: String) {
        self.0.insert(Violation { field: field.into(), constraint, message });
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the graph is valid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all violations, ordered by field
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Returns `true` if some violation is of the given kind
    pub fn has(&self, constraint: Constraint) -> bool {
        self.0.iter().any(|v| v.constraint == constraint)
    }

    /// Returns all violations of a field
    pub fn of_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.0.iter().filter(move |v| v.field == field)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::collections::btree_set::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Relation between the native VLAN of a trunk and its allowed VLAN set. The check only applies
/// to trunks which restrict the allowed VLANs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeVlanPolicy {
    /// The native VLAN must not be part of the allowed set
    Exclude,
    /// The native VLAN must be part of the allowed set
    Include,
    /// No restriction
    Unrestricted,
}

impl Default for NativeVlanPolicy {
    fn default() -> Self {
        Self::Exclude
    }
}

impl fmt::Display for NativeVlanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exclude => "exclude",
            Self::Include => "include",
            Self::Unrestricted => "unrestricted",
        })
    }
}

impl FromStr for NativeVlanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "include" => Ok(Self::Include),
            "unrestricted" => Ok(Self::Unrestricted),
            _ => Err(format!(
                "invalid native VLAN policy {:?}, expected exclude, include or unrestricted",
                s
            )),
        }
    }
}

/// Options of the validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Policy for the native VLAN of trunks
    pub native_vlan_policy: NativeVlanPolicy,
}

/// A template graph which passed the validation. Only a validated graph can be generated
/// infallibly, see [`Validated::generate`].
#[derive(Debug, Clone)]
pub struct Validated<'a> {
    pub(crate) device: &'a DeviceTemplate,
    pub(crate) ports: Vec<(&'a InterfaceId, &'a PortTemplate)>,
}

impl<'a> Validated<'a> {
    /// The validated device template
    pub fn device(&self) -> &'a DeviceTemplate {
        self.device
    }
}

/// Collect all port templates bound to interfaces of the device. Routers and unregistered
/// switches have no bindings.
pub(crate) fn bound_ports<'a>(
    device: &DeviceTemplate,
    registry: &'a InterfaceRegistry,
) -> Vec<(&'a InterfaceId, &'a PortTemplate)> {
    match registry.all_assignments(device.id()) {
        Ok(iter) if device.supports_switching() => iter.collect(),
        _ => Vec::new(),
    }
}

/// Validate the template graph of a device, returning every violation found.
pub fn validate(
    device: &DeviceTemplate,
    registry: &InterfaceRegistry,
    options: &ValidationOptions,
) -> Violations {
    let ports = bound_ports(device, registry);
    let violations = check(device, &ports, options);
    debug!("Validated {}: {} violation(s)", device.hostname(), violations.len());
    violations
}

/// Validate the template graph of a device, and return the validated graph on success.
pub fn validate_graph<'a>(
    device: &'a DeviceTemplate,
    registry: &'a InterfaceRegistry,
    options: &ValidationOptions,
) -> Result<Validated<'a>, GenerationPreconditionError> {
    let ports = bound_ports(device, registry);
    let violations = check(device, &ports, options);
    if violations.is_empty() {
        debug!("Validated {}: no violations", device.hostname());
        Ok(Validated { device, ports })
    } else {
        debug!("Validated {}: {} violation(s)", device.hostname(), violations.len());
        Err(GenerationPreconditionError { violations })
    }
}

fn check(
    device: &DeviceTemplate,
    ports: &[(&InterfaceId, &PortTemplate)],
    options: &ValidationOptions,
) -> Violations {
    let mut checker = Checker { device, violations: Violations::new() };
    checker.check_base(ports);
    checker.check_ports(ports, options);
    checker.check_etherchannels(ports);
    if let Some(l3) = device.l3() {
        checker.check_l3(l3);
    }
    checker.violations
}

struct Checker<'a> {
    device: &'a DeviceTemplate,
    violations: Violations,
}

impl<'a> Checker<'a> {
    fn push(&mut self, field: impl Into<String>, constraint: Constraint, message: String) {
        self.violations.push(field, constraint, message)
    }

    fn require_vlan(&mut self, field: impl Into<String>, vlan: VlanId) {
        if !self.device.is_vlan_defined(vlan) {
            self.push(field, Constraint::UndefinedVlan, format!("VLAN {} is not defined", vlan));
        }
    }

    fn check_base(&mut self, ports: &[(&InterfaceId, &PortTemplate)]) {
        let device = self.device;
        let base = device.base();
        let bound: BTreeSet<&InterfaceId> = ports.iter().map(|(i, _)| *i).collect();

        if let Some(management) = &base.management {
            match &management.interface {
                ManagementInterface::Vlan(vlan) => self.require_vlan("management", *vlan),
                ManagementInterface::Port(iface) if bound.contains(iface) => self.push(
                    "management",
                    Constraint::PortConflict,
                    format!("{} is bound to a port template", iface),
                ),
                ManagementInterface::Port(_) => {}
            }
            if let (Some(address), Some(gateway)) = (management.address, management.gateway) {
                if !address.network().contains(gateway) {
                    self.push(
                        "management.gateway",
                        Constraint::AddressOutsideSubnet,
                        format!("{} is outside of {}", gateway, address.network()),
                    );
                }
            }
        }

        if let Some(stp) = &base.stp {
            for vlan in stp.priorities().keys() {
                self.require_vlan("stp.priority", *vlan);
            }
        }

        if let Some(services) = &base.services {
            for vlan in services.dhcp_snooping_vlans().iter() {
                self.require_vlan("services.dhcp_snooping_vlans", vlan);
            }
            for vlan in services.arp_inspection_vlans().iter() {
                self.require_vlan("services.arp_inspection_vlans", vlan);
            }
        }

        for (id, session) in base.span.iter() {
            if bound.contains(session.destination()) {
                self.push(
                    format!("span.{}", id),
                    Constraint::PortConflict,
                    format!("destination {} is bound to a port template", session.destination()),
                );
            }
        }

        if base.ssh.is_some() && base.domain_name.is_none() {
            self.push(
                "ssh",
                Constraint::MissingPrerequisite,
                "generating the RSA key requires a domain name".to_string(),
            );
        }

        if let Some(aaa) = &base.aaa {
            if aaa.login_local() && aaa.users().is_empty() {
                self.push(
                    "aaa.login_local",
                    Constraint::MissingPrerequisite,
                    "local login requires at least one local user".to_string(),
                );
            }
        }
    }

    fn check_ports(
        &mut self,
        ports: &[(&InterfaceId, &PortTemplate)],
        options: &ValidationOptions,
    ) {
        let device = self.device;
        let model = device.model();
        for (iface, template) in ports.iter().copied() {
            for (field, vlan) in template.vlan_refs() {
                self.require_vlan(format!("{}.{}", iface, field), vlan);
            }
            match template {
                PortTemplate::Access(t) => {
                    if t.access_vlan().is_some() && t.access_vlan() == t.voice_vlan() {
                        self.push(
                            format!("{}.voice_vlan", iface),
                            Constraint::VoiceEqualsAccess,
                            "voice VLAN must differ from the access VLAN".to_string(),
                        );
                    }
                    if t.voice_vlan().is_some() && !model.has(ModelCapability::Voice) {
                        self.unsupported(iface, "voice_vlan", ModelCapability::Voice);
                    }
                    if t.poe().is_some() && !model.has(ModelCapability::Poe) {
                        self.unsupported(iface, "poe", ModelCapability::Poe);
                    }
                }
                PortTemplate::Trunk(t) => {
                    if let (Some(native), Some(allowed)) = (t.native_vlan(), t.allowed_vlans()) {
                        let conflict = match options.native_vlan_policy {
                            NativeVlanPolicy::Exclude if allowed.contains(native) => {
                                Some("is also in the allowed VLAN set")
                            }
                            NativeVlanPolicy::Include if !allowed.contains(native) => {
                                Some("is not in the allowed VLAN set")
                            }
                            _ => None,
                        };
                        if let Some(reason) = conflict {
                            self.push(
                                format!("{}.native_vlan", iface),
                                Constraint::NativeVlanPolicy,
                                format!(
                                    "native VLAN {} {} {} (policy {})",
                                    native,
                                    reason,
                                    allowed,
                                    options.native_vlan_policy
                                ),
                            );
                        }
                    }
                }
            }
        }
    }

    fn unsupported(&mut self, iface: &InterfaceId, field: &str, capability: ModelCapability) {
        self.push(
            format!("{}.{}", iface, field),
            Constraint::UnsupportedByModel,
            format!(
                "model {} does not provide {} support",
                self.device.model().name(),
                capability
            ),
        );
    }

    fn check_etherchannels(&mut self, ports: &[(&InterfaceId, &PortTemplate)]) {
        let mut groups: BTreeMap<u8, Vec<(&InterfaceId, &PortTemplate)>> = BTreeMap::new();
        for (iface, template) in ports.iter().copied() {
            if let Some(channel) = template.as_trunk().and_then(|t| t.etherchannel()) {
                groups.entry(channel.group()).or_default().push((iface, template));
            }
        }
        for (group, members) in groups {
            let (first_iface, first) = members[0];
            for (iface, template) in members.iter().skip(1).copied() {
                if template != first {
                    self.push(
                        format!("{}.etherchannel", iface),
                        Constraint::EtherChannelMismatch,
                        format!(
                            "member of port-channel {} is configured differently from {}",
                            group, first_iface
                        ),
                    );
                }
            }
        }
    }

    fn require_name<T>(
        &mut self,
        field: impl Into<String>,
        kind: &str,
        name: &Name,
        defs: &BTreeMap<Name, T>,
    ) {
        if !defs.contains_key(name) {
            self.push(
                field,
                Constraint::UndefinedReference,
                format!("{} {} is not defined", kind, name),
            );
        }
    }

    fn require_svi(&mut self, field: impl Into<String>, l3: &L3Config, vlan: VlanId) {
        if !l3.svis().contains_key(&vlan) {
            self.push(
                field,
                Constraint::UndefinedReference,
                format!("interface Vlan{} is not defined", vlan),
            );
        }
    }

    fn check_l3(&mut self, l3: &L3Config) {
        if let Some(ManagementInterface::Vlan(vlan)) =
            self.device.management().map(|m| &m.interface)
        {
            if l3.svis().contains_key(vlan) {
                self.push(
                    "management",
                    Constraint::PortConflict,
                    format!("interface Vlan{} is also configured as SVI", vlan),
                );
            }
        }

        let mut seen: BTreeMap<(Option<&Name>, std::net::Ipv4Addr), VlanId> = BTreeMap::new();
        let mut subnets: Vec<(Option<&Name>, InterfaceAddress, VlanId)> = Vec::new();

        for (vlan, svi) in l3.svis().iter() {
            let field = format!("Vlan{}", vlan);
            self.require_vlan(field.clone(), *vlan);
            if let Some(acl) = svi.acl_in() {
                self.require_name(format!("{}.acl_in", field), "ACL", acl, l3.acls());
            }
            if let Some(acl) = svi.acl_out() {
                self.require_name(format!("{}.acl_out", field), "ACL", acl, l3.acls());
            }
            if let Some(vrf) = svi.vrf() {
                self.require_name(format!("{}.vrf", field), "VRF", vrf, l3.vrfs());
            }
            if svi.ospf_area().is_some() && l3.ospf().is_none() {
                self.push(
                    format!("{}.ospf_area", field),
                    Constraint::MissingPrerequisite,
                    "no OSPF process is configured".to_string(),
                );
            }

            for address in svi.addresses() {
                let key = (svi.vrf(), address.addr());
                if let Some(other) = seen.get(&key) {
                    self.push(
                        format!("{}.address", field),
                        Constraint::DuplicateAddress,
                        format!("{} is also configured on Vlan{}", address.addr(), other),
                    );
                } else {
                    seen.insert(key, *vlan);
                }
                for (vrf, other, other_vlan) in subnets.iter() {
                    if *vrf == svi.vrf() && other_vlan != vlan && overlaps(other, &address) {
                        self.push(
                            format!("{}.address", field),
                            Constraint::OverlappingSubnet,
                            format!(
                                "{} overlaps with {} on Vlan{}",
                                address.network(),
                                other.network(),
                                other_vlan
                            ),
                        );
                    }
                }
                subnets.push((svi.vrf(), address, *vlan));
            }

            let groups = svi
                .hsrp()
                .iter()
                .map(|(g, r)| ("hsrp", g, r))
                .chain(svi.vrrp().iter().map(|(g, r)| ("vrrp", g, r)));
            for (protocol, group, config) in groups {
                let vip = config.virtual_ip();
                if !svi.addresses().any(|a| a.network().contains(vip)) {
                    self.push(
                        format!("{}.{}.{}", field, protocol, group),
                        Constraint::AddressOutsideSubnet,
                        format!(
                            "virtual address {} is outside of the subnets of Vlan{}",
                            vip, vlan
                        ),
                    );
                }
                if svi.addresses().any(|a| a.addr() == vip) {
                    self.push(
                        format!("{}.{}.{}", field, protocol, group),
                        Constraint::DuplicateAddress,
                        format!("virtual address {} is the address of Vlan{}", vip, vlan),
                    );
                }
            }
        }

        for route in l3.routes().iter() {
            let field = format!("route.{}", route.prefix());
            if let Some(vrf) = route.vrf() {
                self.require_name(field.clone(), "VRF", vrf, l3.vrfs());
            }
            if let NextHop::Vlan(vlan) = route.next_hop() {
                self.require_svi(field, l3, vlan);
            }
        }

        if let Some(ospf) = l3.ospf() {
            for vlan in ospf.passive().iter() {
                self.require_svi("ospf.passive_interface", l3, *vlan);
            }
        }
        if let Some(eigrp) = l3.eigrp() {
            for vlan in eigrp.passive().iter() {
                self.require_svi("eigrp.passive_interface", l3, *vlan);
            }
        }

        for rule in l3.nat_rules().iter() {
            if let NatRule::Dynamic { acl, target, .. } = rule {
                self.require_name(format!("nat.{}", acl), "ACL", acl, l3.acls());
                match target {
                    NatTarget::Pool(pool) => {
                        self.require_name(format!("nat.{}", acl), "NAT pool", pool, l3.nat_pools())
                    }
                    NatTarget::Interface(vlan) => {
                        self.require_svi(format!("nat.{}", acl), l3, *vlan)
                    }
                }
            }
        }
        if !l3.nat_rules().is_empty() {
            let sides: BTreeSet<_> = l3.svis().values().filter_map(|s| s.nat()).collect();
            if sides.len() < 2 {
                self.push(
                    "nat",
                    Constraint::MissingPrerequisite,
                    "NAT rules require both an inside and an outside interface".to_string(),
                );
            }
        }
    }
}

fn overlaps(a: &InterfaceAddress, b: &InterfaceAddress) -> bool {
    let (a, b) = (a.network(), b.network());
    a.contains(b.addr()) || b.contains(a.addr())
}
