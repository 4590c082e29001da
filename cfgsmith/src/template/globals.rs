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

//! Base configuration shared by all device templates.

use super::inert_as_none;
use crate::script::ScriptWriter;
use crate::types::{check_range, ConstructionError, InterfaceId};
use crate::values::{
    Description, Hostname, InterfaceAddress, LoggingLevel, Name, Secret, SnmpAccess, StpMode,
    StpPriority, VlanId, VlanSet,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;
use std::net::Ipv4Addr;

/// Interface used to manage the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementInterface {
    /// Switch virtual interface of a VLAN
    Vlan(VlanId),
    /// Physical (or out-of-band) port
    Port(InterfaceId),
}

/// Management access of the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Management {
    /// Management interface
    pub interface: ManagementInterface,
    /// Address of the management interface
    #[serde(default)]
    pub address: Option<InterfaceAddress>,
    /// Default gateway of the management network
    #[serde(default)]
    pub gateway: Option<Ipv4Addr>,
}

impl Management {
    fn write(&self, w: &mut ScriptWriter) {
        match &self.interface {
            ManagementInterface::Vlan(vlan) => w.enter(format!("interface Vlan{}", vlan)),
            ManagementInterface::Port(iface) => w.enter(format!("interface {}", iface)),
        }
        if let Some(address) = &self.address {
            w.line(format!("ip address {}", address.with_mask()));
        }
        w.line("no shutdown");
        w.exit();
    }

    fn write_gateway(&self, w: &mut ScriptWriter, routed: bool) {
        match self.gateway {
            Some(gw) if routed => w.line(format!("ip route 0.0.0.0 0.0.0.0 {}", gw)),
            Some(gw) => w.line(format!("ip default-gateway {}", gw)),
            None => {}
        }
    }
}

/// Global spanning tree settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StpGlobals {
    pub(crate) mode: Option<StpMode>,
    pub(crate) priorities: BTreeMap<VlanId, StpPriority>,
    pub(crate) portfast_default: bool,
    pub(crate) bpduguard_default: bool,
    pub(crate) loopguard_default: bool,
}

impl StpGlobals {
    /// Spanning tree mode
    pub fn mode(&self) -> Option<StpMode> {
        self.mode
    }

    /// Bridge priority per VLAN
    pub fn priorities(&self) -> &BTreeMap<VlanId, StpPriority> {
        &self.priorities
    }

    fn write(&self, w: &mut ScriptWriter) {
        if let Some(mode) = self.mode {
            w.line(format!("spanning-tree mode {}", mode));
        }
        for (vlan, priority) in self.priorities.iter() {
            w.line(format!("spanning-tree vlan {} priority {}", vlan, priority));
        }
        if self.portfast_default {
            w.line("spanning-tree portfast default");
        }
        if self.bpduguard_default {
            w.line("spanning-tree portfast bpduguard default");
        }
        if self.loopguard_default {
            w.line("spanning-tree loopguard default");
        }
    }
}

/// Syslog settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLogging")]
pub struct Logging {
    pub(crate) hosts: BTreeSet<Ipv4Addr>,
    pub(crate) trap: Option<LoggingLevel>,
    pub(crate) buffered: Option<u32>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawLogging {
    hosts: BTreeSet<Ipv4Addr>,
    trap: Option<LoggingLevel>,
    buffered: Option<u32>,
}

impl TryFrom<RawLogging> for Logging {
    type Error = ConstructionError;

    fn try_from(raw: RawLogging) -> Result<Self, Self::Error> {
        if let Some(size) = raw.buffered {
            Self::check_buffer(size)?;
        }
        Ok(Self { hosts: raw.hosts, trap: raw.trap, buffered: raw.buffered })
    }
}

impl Logging {
    /// Remote syslog servers
    pub fn hosts(&self) -> &BTreeSet<Ipv4Addr> {
        &self.hosts
    }

    /// Severity sent to the syslog servers
    pub fn trap(&self) -> Option<LoggingLevel> {
        self.trap
    }

    /// Size of the local log buffer in bytes
    pub fn buffered(&self) -> Option<u32> {
        self.buffered
    }

    pub(crate) fn check_buffer(size: u32) -> Result<(), ConstructionError> {
        check_range("logging_buffered", size as i64, 4096, 2_147_483_647)
    }

    fn write(&self, w: &mut ScriptWriter) {
        if let Some(size) = self.buffered {
            w.line(format!("logging buffered {}", size));
        }
        if let Some(level) = self.trap {
            w.line(format!("logging trap {}", level));
        }
        for host in self.hosts.iter() {
            w.line(format!("logging host {}", host));
        }
    }
}

/// SNMP agent settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snmp {
    pub(crate) communities: BTreeMap<Name, SnmpAccess>,
    pub(crate) location: Option<Description>,
    pub(crate) contact: Option<Description>,
    pub(crate) traps: bool,
}

impl Snmp {
    /// Communities and their access rights
    pub fn communities(&self) -> &BTreeMap<Name, SnmpAccess> {
        &self.communities
    }

    fn write(&self, w: &mut ScriptWriter) {
        for (community, access) in self.communities.iter() {
            w.line(format!("snmp-server community {} {}", community, access));
        }
        if let Some(location) = &self.location {
            w.line(format!("snmp-server location {}", location));
        }
        if let Some(contact) = &self.contact {
            w.line(format!("snmp-server contact {}", contact));
        }
        if self.traps {
            w.line("snmp-server enable traps");
        }
    }
}

/// Local SPAN session mirroring the traffic of source ports to a destination port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSpanSession")]
pub struct SpanSession {
    sources: BTreeSet<InterfaceId>,
    destination: InterfaceId,
}

#[derive(Deserialize)]
struct RawSpanSession {
    sources: BTreeSet<InterfaceId>,
    destination: InterfaceId,
}

impl TryFrom<RawSpanSession> for SpanSession {
    type Error = ConstructionError;

    fn try_from(raw: RawSpanSession) -> Result<Self, Self::Error> {
        Self::new(raw.sources, raw.destination)
    }
}

impl SpanSession {
    /// Create a new session. There must be at least one source, and the destination cannot be a
    /// source.
    pub fn new<I>(sources: I, destination: InterfaceId) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = InterfaceId>,
    {
        let sources: BTreeSet<InterfaceId> = sources.into_iter().collect();
        if sources.is_empty() {
            return Err(ConstructionError::Incompatible {
                field: "span",
                reason: "a SPAN session needs at least one source".to_string(),
            });
        }
        if sources.contains(&destination) {
            return Err(ConstructionError::Incompatible {
                field: "span",
                reason: format!("{} cannot be source and destination", destination),
            });
        }
        Ok(Self { sources, destination })
    }

    /// Source ports
    pub fn sources(&self) -> &BTreeSet<InterfaceId> {
        &self.sources
    }

    /// Destination port
    pub fn destination(&self) -> &InterfaceId {
        &self.destination
    }

    fn write(&self, id: u8, w: &mut ScriptWriter) {
        let sources = self.sources.iter().join(" , ");
        w.line(format!("monitor session {} source interface {}", id, sources));
        w.line(format!("monitor session {} destination interface {}", id, self.destination));
    }
}

/// Local user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLocalUser")]
pub struct LocalUser {
    privilege: u8,
    secret: Secret,
}

#[derive(Deserialize)]
struct RawLocalUser {
    privilege: u8,
    secret: Secret,
}

impl TryFrom<RawLocalUser> for LocalUser {
    type Error = ConstructionError;

    fn try_from(raw: RawLocalUser) -> Result<Self, Self::Error> {
        Self::with_secret(raw.privilege, raw.secret)
    }
}

impl LocalUser {
    /// Create a user with a privilege level (0-15)
    pub fn new(privilege: u8, secret: &str) -> Result<Self, ConstructionError> {
        Self::with_secret(privilege, Secret::new(secret)?)
    }

    fn with_secret(privilege: u8, secret: Secret) -> Result<Self, ConstructionError> {
        check_range("privilege", privilege as i64, 0, 15)?;
        Ok(Self { privilege, secret })
    }

    /// Privilege level
    pub fn privilege(&self) -> u8 {
        self.privilege
    }
}

/// Authentication settings: enable secret, local users and the AAA login method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aaa {
    pub(crate) enable_secret: Option<Secret>,
    pub(crate) users: BTreeMap<Name, LocalUser>,
    pub(crate) new_model: bool,
    pub(crate) login_local: bool,
}

impl Aaa {
    /// Local users
    pub fn users(&self) -> &BTreeMap<Name, LocalUser> {
        &self.users
    }

    /// Returns `true` if logins are authenticated against the local user database.
    pub fn login_local(&self) -> bool {
        self.login_local
    }

    fn write(&self, w: &mut ScriptWriter) {
        if let Some(secret) = &self.enable_secret {
            w.line(format!("enable secret {}", secret));
        }
        for (name, user) in self.users.iter() {
            w.line(format!(
                "username {} privilege {} secret {}",
                name, user.privilege, user.secret
            ));
        }
        if self.new_model || self.login_local {
            w.line("aaa new-model");
        }
        if self.login_local {
            w.line("aaa authentication login default local");
        }
    }
}

/// SSH server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSshSettings")]
pub struct SshSettings {
    modulus: u16,
}

#[derive(Deserialize)]
struct RawSshSettings {
    modulus: u16,
}

impl TryFrom<RawSshSettings> for SshSettings {
    type Error = ConstructionError;

    fn try_from(raw: RawSshSettings) -> Result<Self, Self::Error> {
        Self::new(raw.modulus)
    }
}

impl SshSettings {
    /// Enable SSH version 2 with an RSA key of the given size (1024, 2048 or 4096 bits)
    pub fn new(modulus: u16) -> Result<Self, ConstructionError> {
        if matches!(modulus, 1024 | 2048 | 4096) {
            Ok(Self { modulus })
        } else {
            Err(ConstructionError::InvalidFormat {
                field: "ssh_modulus",
                value: modulus.to_string(),
                expected: "1024, 2048 or 4096",
            })
        }
    }

    /// Size of the RSA key
    pub fn modulus(&self) -> u16 {
        self.modulus
    }

    fn write(&self, w: &mut ScriptWriter) {
        w.line(format!("crypto key generate rsa modulus {}", self.modulus));
        w.line("ip ssh version 2");
        w.enter("line vty 0 15");
        w.line("transport input ssh");
        w.exit();
    }
}

/// Global switch services (DHCP snooping, ARP inspection, QoS and errdisable recovery).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSwitchServices")]
pub struct SwitchServices {
    pub(crate) dhcp_snooping_vlans: VlanSet,
    pub(crate) arp_inspection_vlans: VlanSet,
    pub(crate) mls_qos: bool,
    pub(crate) errdisable_recovery: Option<u32>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSwitchServices {
    dhcp_snooping_vlans: VlanSet,
    arp_inspection_vlans: VlanSet,
    mls_qos: bool,
    errdisable_recovery: Option<u32>,
}

impl TryFrom<RawSwitchServices> for SwitchServices {
    type Error = ConstructionError;

    fn try_from(raw: RawSwitchServices) -> Result<Self, Self::Error> {
        if let Some(interval) = raw.errdisable_recovery {
            Self::check_recovery(interval)?;
        }
        Ok(Self {
            dhcp_snooping_vlans: raw.dhcp_snooping_vlans,
            arp_inspection_vlans: raw.arp_inspection_vlans,
            mls_qos: raw.mls_qos,
            errdisable_recovery: raw.errdisable_recovery,
        })
    }
}

impl SwitchServices {
    /// VLANs on which DHCP snooping is enabled
    pub fn dhcp_snooping_vlans(&self) -> &VlanSet {
        &self.dhcp_snooping_vlans
    }

    /// VLANs on which dynamic ARP inspection is enabled
    pub fn arp_inspection_vlans(&self) -> &VlanSet {
        &self.arp_inspection_vlans
    }

    /// Recovery interval of err-disabled ports in seconds
    pub fn errdisable_recovery(&self) -> Option<u32> {
        self.errdisable_recovery
    }

    pub(crate) fn check_recovery(interval: u32) -> Result<(), ConstructionError> {
        check_range("errdisable_recovery", interval as i64, 30, 86400)
    }

    fn write(&self, w: &mut ScriptWriter) {
        if !self.dhcp_snooping_vlans.is_empty() {
            w.line("ip dhcp snooping");
            w.line(format!("ip dhcp snooping vlan {}", self.dhcp_snooping_vlans));
        }
        if !self.arp_inspection_vlans.is_empty() {
            w.line(format!("ip arp inspection vlan {}", self.arp_inspection_vlans));
        }
        if self.mls_qos {
            w.line("mls qos");
        }
        if let Some(interval) = self.errdisable_recovery {
            w.line("errdisable recovery cause all");
            w.line(format!("errdisable recovery interval {}", interval));
        }
    }
}

/// # Base configuration
/// Fields shared by routers, layer-2 and layer-3 switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConfig {
    pub(crate) hostname: Hostname,
    #[serde(default)]
    pub(crate) domain_name: Option<Name>,
    #[serde(default)]
    pub(crate) vlans: BTreeMap<VlanId, Option<Name>>,
    #[serde(default)]
    pub(crate) management: Option<Management>,
    #[serde(default, deserialize_with = "inert_as_none")]
    pub(crate) stp: Option<StpGlobals>,
    #[serde(default, deserialize_with = "inert_as_none")]
    pub(crate) logging: Option<Logging>,
    #[serde(default, deserialize_with = "inert_as_none")]
    pub(crate) snmp: Option<Snmp>,
    #[serde(default)]
    pub(crate) span: BTreeMap<u8, SpanSession>,
    #[serde(default, deserialize_with = "inert_as_none")]
    pub(crate) aaa: Option<Aaa>,
    #[serde(default)]
    pub(crate) ssh: Option<SshSettings>,
    #[serde(default, deserialize_with = "inert_as_none")]
    pub(crate) services: Option<SwitchServices>,
}

impl BaseConfig {
    pub(crate) fn new(hostname: Hostname) -> Self {
        Self {
            hostname,
            domain_name: None,
            vlans: BTreeMap::new(),
            management: None,
            stp: None,
            logging: None,
            snmp: None,
            span: BTreeMap::new(),
            aaa: None,
            ssh: None,
            services: None,
        }
    }

    /// Hostname of the device
    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    /// Write the identity, VLAN and global feature blocks, up to (and including) the management
    /// interface.
    pub(crate) fn write(&self, w: &mut ScriptWriter) {
        w.line(format!("hostname {}", self.hostname));
        if let Some(domain) = &self.domain_name {
            w.line(format!("ip domain-name {}", domain));
        }
        for (vlan, name) in self.vlans.iter() {
            w.enter(format!("vlan {}", vlan));
            if let Some(name) = name {
                w.line(format!("name {}", name));
            }
            w.exit();
        }
        if let Some(stp) = &self.stp {
            stp.write(w);
        }
        if let Some(logging) = &self.logging {
            logging.write(w);
        }
        if let Some(snmp) = &self.snmp {
            snmp.write(w);
        }
        for (id, session) in self.span.iter() {
            session.write(*id, w);
        }
        if let Some(aaa) = &self.aaa {
            aaa.write(w);
        }
        if let Some(ssh) = &self.ssh {
            ssh.write(w);
        }
        if let Some(services) = &self.services {
            services.write(w);
        }
        if let Some(management) = &self.management {
            management.write(w);
        }
    }

    /// Write the default route (or default gateway) of the management network.
    pub(crate) fn write_gateway(&self, w: &mut ScriptWriter, routed: bool) {
        if let Some(management) = &self.management {
            management.write_gateway(w, routed);
        }
    }
}
