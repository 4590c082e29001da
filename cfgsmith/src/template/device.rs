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

//! # Device templates
//! A device template is a tagged variant over routers, layer-2 and layer-3 switches. All of them
//! share a [`BaseConfig`], and the layer-3 switch carries the [`L3Config`] extension. Whether a
//! field can be set is decided by the predicates [`DeviceKind::supports_routing`] and
//! [`DeviceKind::supports_switching`].

use super::globals::{
    Aaa, BaseConfig, LocalUser, Logging, Management, ManagementInterface, Snmp, SpanSession,
    SshSettings, StpGlobals, SwitchServices,
};
use super::routing::{
    Acl, DhcpPool, EigrpProcess, L3Config, NatPool, NatRule, OspfProcess, StaticRoute, Svi, Vrf,
};
use super::{modify_group, update_group};
use crate::model::DeviceModel;
use crate::types::{check_range, ConstructionError, DeviceClass, DeviceId, ModelCapability};
use crate::values::{
    Description, Hostname, LoggingLevel, Name, Secret, SnmpAccess, StpMode, StpPriority, VlanId,
    VlanSet,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Kind of a device template, carrying the kind-specific extension record. Serialized as
/// `"router"`, `"switch_l2"` or `{ "switch_l3": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Router
    Router,
    /// Layer-2 switch
    SwitchL2,
    /// Layer-3 switch
    SwitchL3(Box<L3Config>),
}

impl DeviceKind {
    /// Create the empty kind record of a device class
    pub fn new(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Router => Self::Router,
            DeviceClass::SwitchL2 => Self::SwitchL2,
            DeviceClass::SwitchL3 => Self::SwitchL3(Box::new(L3Config::default())),
        }
    }

    /// Class of the device
    pub fn class(&self) -> DeviceClass {
        match self {
            Self::Router => DeviceClass::Router,
            Self::SwitchL2 => DeviceClass::SwitchL2,
            Self::SwitchL3(_) => DeviceClass::SwitchL3,
        }
    }

    /// Returns `true` if the layer-3 extension (SVIs, routes, ACLs, NAT, ...) can be configured.
    pub fn supports_routing(&self) -> bool {
        matches!(self, Self::SwitchL3(_))
    }

    /// Returns `true` if the device has switchports, to which port templates can be bound.
    pub fn supports_switching(&self) -> bool {
        matches!(self, Self::SwitchL2 | Self::SwitchL3(_))
    }
}

/// Serializable state of a device template, without its identity and hardware model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Shared base configuration
    pub base: BaseConfig,
    /// Kind-specific extension
    pub kind: DeviceKind,
}

/// Optional feature groups of device templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceFeature {
    /// Domain name
    DomainName,
    /// VLAN definitions
    Vlans,
    /// Management interface and gateway
    Management,
    /// Global spanning tree settings
    Stp,
    /// Syslog
    Logging,
    /// SNMP agent
    Snmp,
    /// SPAN sessions
    Span,
    /// Enable secret, local users and AAA
    Aaa,
    /// SSH server
    Ssh,
    /// DHCP snooping, ARP inspection, QoS and errdisable recovery
    SwitchServices,
    /// Switch virtual interfaces (layer-3 only)
    Svis,
    /// HSRP and VRRP groups (layer-3 only)
    Redundancy,
    /// Static routes (layer-3 only)
    StaticRoutes,
    /// OSPF (layer-3 only)
    Ospf,
    /// EIGRP (layer-3 only)
    Eigrp,
    /// Access control lists (layer-3 only)
    Acls,
    /// NAT pools and rules (layer-3 only)
    Nat,
    /// DHCP server (layer-3 only)
    Dhcp,
    /// VRF definitions (layer-3 only)
    Vrfs,
}

/// # Device template
/// Identity, hardware model and configuration of a single device. All fields are changed
/// through setters, which reject invalid values and leave the template unchanged on failure.
///
/// ```
/// # use cfgsmith::{catalog, DeviceId, template::DeviceTemplate};
/// # fn main() -> Result<(), cfgsmith::ConstructionError> {
/// let mut sw = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24())?;
/// sw.set_hostname("ACC-01")?.define_vlan(10, Some("USERS"))?;
/// assert!(sw.add_static_route(
///     cfgsmith::template::StaticRoute::new(
///         "0.0.0.0/0".parse()?,
///         cfgsmith::template::NextHop::Null0,
///     )
/// ).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTemplate {
    id: DeviceId,
    model: DeviceModel,
    base: BaseConfig,
    kind: DeviceKind,
}

impl DeviceTemplate {
    /// Create an empty device template. The hostname defaults to `Router` or `Switch`. Fails if
    /// the model lacks the capabilities of the device class.
    pub fn new(
        id: DeviceId,
        model: DeviceModel,
        class: DeviceClass,
    ) -> Result<Self, ConstructionError> {
        check_model(&model, class)?;
        let hostname = match class {
            DeviceClass::Router => Hostname::new("Router")?,
            DeviceClass::SwitchL2 | DeviceClass::SwitchL3 => Hostname::new("Switch")?,
        };
        Ok(Self { id, model, base: BaseConfig::new(hostname), kind: DeviceKind::new(class) })
    }

    /// Create an empty router template
    pub fn router(id: DeviceId, model: DeviceModel) -> Result<Self, ConstructionError> {
        Self::new(id, model, DeviceClass::Router)
    }

    /// Create an empty layer-2 switch template
    pub fn switch_l2(id: DeviceId, model: DeviceModel) -> Result<Self, ConstructionError> {
        Self::new(id, model, DeviceClass::SwitchL2)
    }

    /// Create an empty layer-3 switch template
    pub fn switch_l3(id: DeviceId, model: DeviceModel) -> Result<Self, ConstructionError> {
        Self::new(id, model, DeviceClass::SwitchL3)
    }

    /// Create a template from a stored configuration. The configuration is checked against the
    /// model exactly like a freshly constructed template.
    pub fn from_config(
        id: DeviceId,
        model: DeviceModel,
        config: DeviceConfig,
    ) -> Result<Self, ConstructionError> {
        let mut device = Self::new(id, model, config.kind.class())?;
        device.load_config(config)?;
        Ok(device)
    }

    /// Replace the whole configuration. The device class of the configuration must match the
    /// one of the template, and the configuration must be compatible with the model.
    pub fn load_config(&mut self, config: DeviceConfig) -> Result<&mut Self, ConstructionError> {
        if config.kind.class() != self.class() {
            return Err(ConstructionError::Incompatible {
                field: "class",
                reason: format!(
                    "cannot load a {} configuration into a {} template",
                    config.kind.class(),
                    self.class()
                ),
            });
        }
        if let Some(management) = &config.base.management {
            self.check_management(management)?;
        }
        if !config.base.span.is_empty() {
            self.switch_only("span")?;
        }
        for (id, session) in config.base.span.iter() {
            check_range("span", *id as i64, 1, 66)?;
            self.check_span(session)?;
        }
        if config.base.stp.is_some() {
            self.switch_only("stp")?;
        }
        if config.base.services.is_some() {
            self.switch_only("services")?;
        }
        self.base = config.base;
        self.kind = config.kind;
        Ok(self)
    }

    /// Export the configuration (without identity and model)
    pub fn config(&self) -> DeviceConfig {
        DeviceConfig { base: self.base.clone(), kind: self.kind.clone() }
    }

    /// Identity of the device
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Hardware model
    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// Device class
    pub fn class(&self) -> DeviceClass {
        self.kind.class()
    }

    /// Kind record
    pub fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    /// Base configuration
    pub fn base(&self) -> &BaseConfig {
        &self.base
    }

    /// Layer-3 extension, if the device is a layer-3 switch
    pub fn l3(&self) -> Option<&L3Config> {
        match &self.kind {
            DeviceKind::SwitchL3(l3) => Some(l3),
            _ => None,
        }
    }

    /// See [`DeviceKind::supports_routing`]
    pub fn supports_routing(&self) -> bool {
        self.kind.supports_routing()
    }

    /// See [`DeviceKind::supports_switching`]
    pub fn supports_switching(&self) -> bool {
        self.kind.supports_switching()
    }

    /// Returns `true` if the feature group deviates from its inert default. Features the device
    /// kind cannot hold are never active.
    pub fn is_active(&self, feature: DeviceFeature) -> bool {
        let b = &self.base;
        let l3 = self.l3();
        match feature {
            DeviceFeature::DomainName => b.domain_name.is_some(),
            DeviceFeature::Vlans => !b.vlans.is_empty(),
            DeviceFeature::Management => b.management.is_some(),
            DeviceFeature::Stp => b.stp.is_some(),
            DeviceFeature::Logging => b.logging.is_some(),
            DeviceFeature::Snmp => b.snmp.is_some(),
            DeviceFeature::Span => !b.span.is_empty(),
            DeviceFeature::Aaa => b.aaa.is_some(),
            DeviceFeature::Ssh => b.ssh.is_some(),
            DeviceFeature::SwitchServices => b.services.is_some(),
            DeviceFeature::Svis => l3.map(|l| !l.svis.is_empty()).unwrap_or(false),
            DeviceFeature::Redundancy => l3
                .map(|l| l.svis.values().any(|s| !s.hsrp().is_empty() || !s.vrrp().is_empty()))
                .unwrap_or(false),
            DeviceFeature::StaticRoutes => l3.map(|l| !l.routes.is_empty()).unwrap_or(false),
            DeviceFeature::Ospf => l3.map(|l| l.ospf.is_some()).unwrap_or(false),
            DeviceFeature::Eigrp => l3.map(|l| l.eigrp.is_some()).unwrap_or(false),
            DeviceFeature::Acls => l3.map(|l| !l.acls.is_empty()).unwrap_or(false),
            DeviceFeature::Nat => {
                l3.map(|l| !l.nat_pools.is_empty() || !l.nat_rules.is_empty()).unwrap_or(false)
            }
            DeviceFeature::Dhcp => l3
                .map(|l| !l.dhcp_pools.is_empty() || !l.dhcp_excluded.is_empty())
                .unwrap_or(false),
            DeviceFeature::Vrfs => l3.map(|l| !l.vrfs.is_empty()).unwrap_or(false),
        }
    }

    fn unsupported(&self, field: &'static str) -> ConstructionError {
        ConstructionError::UnsupportedByDevice { field, device: self.class() }
    }

    fn switch_only(&self, field: &'static str) -> Result<(), ConstructionError> {
        if self.supports_switching() {
            Ok(())
        } else {
            Err(self.unsupported(field))
        }
    }

    fn l3_mut(&mut self, field: &'static str) -> Result<&mut L3Config, ConstructionError> {
        let class = self.class();
        match &mut self.kind {
            DeviceKind::SwitchL3(l3) => Ok(l3),
            _ => Err(ConstructionError::UnsupportedByDevice { field, device: class }),
        }
    }

    fn check_management(&self, management: &Management) -> Result<(), ConstructionError> {
        match &management.interface {
            ManagementInterface::Vlan(_) => self.switch_only("management_vlan"),
            ManagementInterface::Port(iface) if !self.model.declares(iface) => {
                Err(ConstructionError::Incompatible {
                    field: "management",
                    reason: format!("{} is not declared by model {}", iface, self.model.name()),
                })
            }
            ManagementInterface::Port(_) => Ok(()),
        }
    }

    fn check_span(&self, session: &SpanSession) -> Result<(), ConstructionError> {
        let undeclared = session
            .sources()
            .iter()
            .chain(std::iter::once(session.destination()))
            .find(|iface| !self.model.declares(iface));
        match undeclared {
            Some(iface) => Err(ConstructionError::Incompatible {
                field: "span",
                reason: format!("{} is not declared by model {}", iface, self.model.name()),
            }),
            None => Ok(()),
        }
    }

    // identity

    /// Hostname
    pub fn hostname(&self) -> &Hostname {
        &self.base.hostname
    }

    /// Set the hostname
    pub fn set_hostname(&mut self, hostname: &str) -> Result<&mut Self, ConstructionError> {
        self.base.hostname = Hostname::new(hostname)?;
        Ok(self)
    }

    /// Domain name
    pub fn domain_name(&self) -> Option<&Name> {
        self.base.domain_name.as_ref()
    }

    /// Set (or clear) the domain name
    pub fn set_domain_name(
        &mut self,
        domain: Option<&str>,
    ) -> Result<&mut Self, ConstructionError> {
        self.base.domain_name =
            domain.map(|d| Name::new(d).map_err(|e| e.in_field("domain_name"))).transpose()?;
        Ok(self)
    }

    // VLANs

    /// VLAN definitions
    pub fn vlans(&self) -> &BTreeMap<VlanId, Option<Name>> {
        &self.base.vlans
    }

    /// Returns `true` if the VLAN is defined on the device.
    pub fn is_vlan_defined(&self, vlan: VlanId) -> bool {
        self.base.vlans.contains_key(&vlan)
    }

    /// Define a VLAN (or rename an existing definition)
    pub fn define_vlan(
        &mut self,
        vlan: u16,
        name: Option<&str>,
    ) -> Result<&mut Self, ConstructionError> {
        let vlan = VlanId::new(vlan)?;
        let name = name.map(|n| Name::new(n).map_err(|e| e.in_field("vlan_name"))).transpose()?;
        self.base.vlans.insert(vlan, name);
        Ok(self)
    }

    /// Remove a VLAN definition. References to the VLAN are reported by the validation.
    pub fn remove_vlan(&mut self, vlan: u16) -> Result<bool, ConstructionError> {
        let vlan = VlanId::new(vlan)?;
        Ok(self.base.vlans.remove(&vlan).is_some())
    }

    // management

    /// Management settings
    pub fn management(&self) -> Option<&Management> {
        self.base.management.as_ref()
    }

    /// Set (or clear) the management settings. Routers have no SVIs, so they must be managed
    /// through a declared port.
    pub fn set_management(
        &mut self,
        management: Option<Management>,
    ) -> Result<&mut Self, ConstructionError> {
        if let Some(m) = &management {
            self.check_management(m)?;
        }
        self.base.management = management;
        Ok(self)
    }

    // spanning tree

    /// Global spanning tree settings
    pub fn stp(&self) -> Option<&StpGlobals> {
        self.base.stp.as_ref()
    }

    /// Set the spanning tree mode
    pub fn set_stp_mode(&mut self, mode: StpMode) -> Result<&mut Self, ConstructionError> {
        self.switch_only("stp_mode")?;
        modify_group(&mut self.base.stp, |s| s.mode = Some(mode));
        Ok(self)
    }

    /// Set (or clear) the bridge priority of a VLAN
    pub fn set_stp_priority(
        &mut self,
        vlan: u16,
        priority: Option<u16>,
    ) -> Result<&mut Self, ConstructionError> {
        self.switch_only("stp_priority")?;
        let vlan = VlanId::new(vlan).map_err(|e| e.in_field("stp_priority"))?;
        let priority = priority.map(StpPriority::new).transpose()?;
        update_group(&mut self.base.stp, |s| {
            match priority {
                Some(p) => s.priorities.insert(vlan, p),
                None => s.priorities.remove(&vlan),
            };
            Ok(())
        })?;
        Ok(self)
    }

    /// Enable PortFast on all access ports by default
    pub fn set_portfast_default(&mut self, enable: bool) -> Result<&mut Self, ConstructionError> {
        self.switch_only("portfast_default")?;
        modify_group(&mut self.base.stp, |s| s.portfast_default = enable);
        Ok(self)
    }

    /// Enable BPDU guard on all PortFast ports by default
    pub fn set_bpduguard_default(&mut self, enable: bool) -> Result<&mut Self, ConstructionError> {
        self.switch_only("bpduguard_default")?;
        modify_group(&mut self.base.stp, |s| s.bpduguard_default = enable);
        Ok(self)
    }

    /// Enable loop guard on all ports by default
    pub fn set_loopguard_default(&mut self, enable: bool) -> Result<&mut Self, ConstructionError> {
        self.switch_only("loopguard_default")?;
        modify_group(&mut self.base.stp, |s| s.loopguard_default = enable);
        Ok(self)
    }

    // logging

    /// Syslog settings
    pub fn logging(&self) -> Option<&Logging> {
        self.base.logging.as_ref()
    }

    /// Send log messages to a syslog server
    pub fn add_logging_host(&mut self, host: Ipv4Addr) -> &mut Self {
        modify_group(&mut self.base.logging, |l| {
            l.hosts.insert(host);
        });
        self
    }

    /// Stop sending log messages to a syslog server
    pub fn remove_logging_host(&mut self, host: Ipv4Addr) -> &mut Self {
        modify_group(&mut self.base.logging, |l| {
            l.hosts.remove(&host);
        });
        self
    }

    /// Set (or clear) the severity sent to the syslog servers
    pub fn set_logging_trap(&mut self, level: Option<LoggingLevel>) -> &mut Self {
        modify_group(&mut self.base.logging, |l| l.trap = level);
        self
    }

    /// Set (or clear) the size of the local log buffer (4096 bytes or more)
    pub fn set_logging_buffered(
        &mut self,
        size: Option<u32>,
    ) -> Result<&mut Self, ConstructionError> {
        if let Some(size) = size {
            Logging::check_buffer(size)?;
        }
        modify_group(&mut self.base.logging, |l| l.buffered = size);
        Ok(self)
    }

    // SNMP

    /// SNMP settings
    pub fn snmp(&self) -> Option<&Snmp> {
        self.base.snmp.as_ref()
    }

    /// Add (or change) an SNMP community
    pub fn set_snmp_community(
        &mut self,
        community: &str,
        access: SnmpAccess,
    ) -> Result<&mut Self, ConstructionError> {
        let community = Name::new(community).map_err(|e| e.in_field("snmp_community"))?;
        modify_group(&mut self.base.snmp, |s| {
            s.communities.insert(community, access);
        });
        Ok(self)
    }

    /// Remove an SNMP community
    pub fn remove_snmp_community(&mut self, community: &str) -> &mut Self {
        modify_group(&mut self.base.snmp, |s| {
            s.communities.retain(|c, _| c.as_str() != community);
        });
        self
    }

    /// Set (or clear) the SNMP location
    pub fn set_snmp_location(
        &mut self,
        text: Option<&str>,
    ) -> Result<&mut Self, ConstructionError> {
        let text = text.map(|t| Description::new(t).map_err(|e| e.in_field("snmp_location")));
        let text = text.transpose()?;
        modify_group(&mut self.base.snmp, |s| s.location = text);
        Ok(self)
    }

    /// Set (or clear) the SNMP contact
    pub fn set_snmp_contact(&mut self, text: Option<&str>) -> Result<&mut Self, ConstructionError> {
        let text = text.map(|t| Description::new(t).map_err(|e| e.in_field("snmp_contact")));
        let text = text.transpose()?;
        modify_group(&mut self.base.snmp, |s| s.contact = text);
        Ok(self)
    }

    /// Enable (or disable) all SNMP traps
    pub fn set_snmp_traps(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.base.snmp, |s| s.traps = enable);
        self
    }

    // SPAN

    /// SPAN sessions by session number
    pub fn span_sessions(&self) -> &BTreeMap<u8, SpanSession> {
        &self.base.span
    }

    /// Add (or replace) a SPAN session (1-66). All ports must be declared by the model.
    pub fn set_span_session(
        &mut self,
        id: u8,
        session: SpanSession,
    ) -> Result<&mut Self, ConstructionError> {
        self.switch_only("span")?;
        check_range("span", id as i64, 1, 66)?;
        self.check_span(&session)?;
        self.base.span.insert(id, session);
        Ok(self)
    }

    /// Remove a SPAN session
    pub fn remove_span_session(&mut self, id: u8) -> Option<SpanSession> {
        self.base.span.remove(&id)
    }

    // AAA

    /// Authentication settings
    pub fn aaa(&self) -> Option<&Aaa> {
        self.base.aaa.as_ref()
    }

    /// Set (or clear) the enable secret
    pub fn set_enable_secret(
        &mut self,
        secret: Option<&str>,
    ) -> Result<&mut Self, ConstructionError> {
        let secret =
            secret.map(|s| Secret::new(s).map_err(|e| e.in_field("enable_secret"))).transpose()?;
        modify_group(&mut self.base.aaa, |a| a.enable_secret = secret);
        Ok(self)
    }

    /// Add (or replace) a local user
    pub fn set_local_user(
        &mut self,
        name: &str,
        user: LocalUser,
    ) -> Result<&mut Self, ConstructionError> {
        let name = Name::new(name).map_err(|e| e.in_field("username"))?;
        modify_group(&mut self.base.aaa, |a| {
            a.users.insert(name, user);
        });
        Ok(self)
    }

    /// Remove a local user
    pub fn remove_local_user(&mut self, name: &str) -> &mut Self {
        modify_group(&mut self.base.aaa, |a| {
            a.users.retain(|n, _| n.as_str() != name);
        });
        self
    }

    /// Enable the AAA access control model
    pub fn set_aaa_new_model(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.base.aaa, |a| a.new_model = enable);
        self
    }

    /// Authenticate logins against the local user database (implies `aaa new-model`)
    pub fn set_login_local(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.base.aaa, |a| a.login_local = enable);
        self
    }

    // SSH

    /// SSH settings
    pub fn ssh(&self) -> Option<&SshSettings> {
        self.base.ssh.as_ref()
    }

    /// Enable (or disable) the SSH server
    pub fn set_ssh(&mut self, ssh: Option<SshSettings>) -> &mut Self {
        self.base.ssh = ssh;
        self
    }

    // switch services

    /// Global switch services
    pub fn services(&self) -> Option<&SwitchServices> {
        self.base.services.as_ref()
    }

    /// Enable DHCP snooping on the given VLANs (an empty set disables it)
    pub fn set_dhcp_snooping_vlans<I>(&mut self, vlans: I) -> Result<&mut Self, ConstructionError>
    where
        I: IntoIterator<Item = u16>,
    {
        self.switch_only("dhcp_snooping_vlans")?;
        let vlans = VlanSet::from_ids(vlans).map_err(|e| e.in_field("dhcp_snooping_vlans"))?;
        modify_group(&mut self.base.services, |s| s.dhcp_snooping_vlans = vlans);
        Ok(self)
    }

    /// Enable dynamic ARP inspection on the given VLANs (an empty set disables it)
    pub fn set_arp_inspection_vlans<I>(&mut self, vlans: I) -> Result<&mut Self, ConstructionError>
    where
        I: IntoIterator<Item = u16>,
    {
        self.switch_only("arp_inspection_vlans")?;
        let vlans = VlanSet::from_ids(vlans).map_err(|e| e.in_field("arp_inspection_vlans"))?;
        modify_group(&mut self.base.services, |s| s.arp_inspection_vlans = vlans);
        Ok(self)
    }

    /// Enable (or disable) QoS globally
    pub fn set_mls_qos(&mut self, enable: bool) -> Result<&mut Self, ConstructionError> {
        self.switch_only("mls_qos")?;
        modify_group(&mut self.base.services, |s| s.mls_qos = enable);
        Ok(self)
    }

    /// Set (or clear) the errdisable recovery interval (30-86400 seconds)
    pub fn set_errdisable_recovery(
        &mut self,
        interval: Option<u32>,
    ) -> Result<&mut Self, ConstructionError> {
        self.switch_only("errdisable_recovery")?;
        if let Some(interval) = interval {
            SwitchServices::check_recovery(interval)?;
        }
        modify_group(&mut self.base.services, |s| s.errdisable_recovery = interval);
        Ok(self)
    }

    // layer-3 extension

    /// Add (or replace) the SVI of a VLAN
    pub fn set_svi(&mut self, vlan: u16, svi: Svi) -> Result<&mut Self, ConstructionError> {
        let l3 = self.l3_mut("svi")?;
        let vlan = VlanId::new(vlan).map_err(|e| e.in_field("svi"))?;
        l3.svis.insert(vlan, svi);
        Ok(self)
    }

    /// Remove the SVI of a VLAN
    pub fn remove_svi(&mut self, vlan: u16) -> Result<Option<Svi>, ConstructionError> {
        let l3 = self.l3_mut("svi")?;
        let vlan = VlanId::new(vlan).map_err(|e| e.in_field("svi"))?;
        Ok(l3.svis.remove(&vlan))
    }

    /// Add a static route
    pub fn add_static_route(&mut self, route: StaticRoute) -> Result<&mut Self, ConstructionError> {
        self.l3_mut("static_route")?.routes.insert(route);
        Ok(self)
    }

    /// Remove a static route
    pub fn remove_static_route(&mut self, route: &StaticRoute) -> Result<bool, ConstructionError> {
        Ok(self.l3_mut("static_route")?.routes.remove(route))
    }

    /// Set (or clear) the OSPF process
    pub fn set_ospf(&mut self, ospf: Option<OspfProcess>) -> Result<&mut Self, ConstructionError> {
        self.l3_mut("ospf")?.ospf = ospf;
        Ok(self)
    }

    /// Set (or clear) the EIGRP process
    pub fn set_eigrp(
        &mut self,
        eigrp: Option<EigrpProcess>,
    ) -> Result<&mut Self, ConstructionError> {
        self.l3_mut("eigrp")?.eigrp = eigrp;
        Ok(self)
    }

    /// Add (or replace) a named ACL
    pub fn set_acl(&mut self, name: &str, acl: Acl) -> Result<&mut Self, ConstructionError> {
        let l3 = self.l3_mut("acl")?;
        l3.acls.insert(Name::new(name).map_err(|e| e.in_field("acl"))?, acl);
        Ok(self)
    }

    /// Remove a named ACL. References to it are reported by the validation.
    pub fn remove_acl(&mut self, name: &str) -> Result<Option<Acl>, ConstructionError> {
        let l3 = self.l3_mut("acl")?;
        let name = Name::new(name).map_err(|e| e.in_field("acl"))?;
        Ok(l3.acls.remove(&name))
    }

    /// Add (or replace) a NAT pool
    pub fn set_nat_pool(
        &mut self,
        name: &str,
        pool: NatPool,
    ) -> Result<&mut Self, ConstructionError> {
        let l3 = self.l3_mut("nat_pool")?;
        l3.nat_pools.insert(Name::new(name).map_err(|e| e.in_field("nat_pool"))?, pool);
        Ok(self)
    }

    /// Add a NAT rule
    pub fn add_nat_rule(&mut self, rule: NatRule) -> Result<&mut Self, ConstructionError> {
        self.l3_mut("nat_rule")?.nat_rules.insert(rule);
        Ok(self)
    }

    /// Remove a NAT rule
    pub fn remove_nat_rule(&mut self, rule: &NatRule) -> Result<bool, ConstructionError> {
        Ok(self.l3_mut("nat_rule")?.nat_rules.remove(rule))
    }

    /// Exclude a range of addresses from all DHCP pools
    pub fn exclude_dhcp_range(
        &mut self,
        from: Ipv4Addr,
        to: Ipv4Addr,
    ) -> Result<&mut Self, ConstructionError> {
        let l3 = self.l3_mut("dhcp_excluded")?;
        if from > to {
            return Err(ConstructionError::Incompatible {
                field: "dhcp_excluded",
                reason: format!("{} comes after {}", from, to),
            });
        }
        l3.dhcp_excluded.insert((from, to));
        Ok(self)
    }

    /// Add (or replace) a DHCP pool
    pub fn set_dhcp_pool(
        &mut self,
        name: &str,
        pool: DhcpPool,
    ) -> Result<&mut Self, ConstructionError> {
        let l3 = self.l3_mut("dhcp_pool")?;
        l3.dhcp_pools.insert(Name::new(name).map_err(|e| e.in_field("dhcp_pool"))?, pool);
        Ok(self)
    }

    /// Add (or replace) a VRF definition
    pub fn set_vrf(&mut self, name: &str, vrf: Vrf) -> Result<&mut Self, ConstructionError> {
        let l3 = self.l3_mut("vrf")?;
        l3.vrfs.insert(Name::new(name).map_err(|e| e.in_field("vrf"))?, vrf);
        Ok(self)
    }
}

fn check_model(model: &DeviceModel, class: DeviceClass) -> Result<(), ConstructionError> {
    let needed: &[ModelCapability] = match class {
        DeviceClass::Router => &[ModelCapability::Routing],
        DeviceClass::SwitchL2 => &[ModelCapability::Switching],
        DeviceClass::SwitchL3 => &[ModelCapability::Switching, ModelCapability::Routing],
    };
    match needed.iter().find(|c| !model.has(**c)) {
        Some(capability) => Err(ConstructionError::UnsupportedByModel {
            field: "class",
            model: model.name().to_string(),
            capability: *capability,
        }),
        None => Ok(()),
    }
}
