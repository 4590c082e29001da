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

//! # Template Entities
//!
//! Strongly typed records capturing one configurable unit prior to lowering into commands:
//!
//! - [`PortTemplate`]: either an [`AccessPortTemplate`] or a [`TrunkPortTemplate`]. Port
//!   templates are owned by the [interface registry](crate::registry) entries binding them to
//!   interfaces.
//! - [`DeviceTemplate`]: a router, layer-2 switch or layer-3 switch, made of a shared
//!   [`BaseConfig`] and a [`DeviceKind`] carrying the layer-3 extension.
//!
//! Every optional feature group is stored as an `Option` (or an empty collection) while it is
//! inert. Setters validate their input and leave the template untouched when they fail.

mod access;
mod device;
mod feature;
mod globals;
mod routing;
mod trunk;

pub use access::{AccessPortTemplate, PortIsolation, PortSecurity};
pub use device::{DeviceConfig, DeviceFeature, DeviceKind, DeviceTemplate};
pub use feature::{
    LinkSettings, PortCommon, PortSettings, QosSettings, StormControl, StpEdge, TrustSettings,
};
pub use globals::{
    Aaa, BaseConfig, LocalUser, Logging, Management, ManagementInterface, Snmp, SpanSession,
    SshSettings, StpGlobals, SwitchServices,
};
pub use routing::{
    Acl, AclAction, AclKind, AclProtocol, AclRule, AddressMatch, DhcpPool, EigrpProcess, L3Config,
    NatPool, NatRule, NatTarget, NextHop, OspfProcess, PortMatch, RedundancyGroup,
    RouteDistinguisher, StaticRoute, Svi, Vrf,
};
pub use trunk::{EtherChannel, TrunkPortTemplate};

pub(crate) use feature::{inert_as_none, modify_group, update_group};

use crate::script::{ConfigScript, ScriptWriter};
use crate::types::InterfaceId;
use crate::values::VlanId;
use serde::{Deserialize, Serialize};

/// Capabilities of port templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// The template binds the port to one or more VLANs
    VlanBinding,
    /// The template has host security features (port security, network access control)
    Security,
    /// The template has QoS settings
    Qos,
    /// The template has spanning tree settings
    Stp,
}

/// Optional feature groups of port templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortFeature {
    /// Interface description
    Description,
    /// Speed, duplex and MDIX
    Link,
    /// Spanning tree edge and guard settings
    Stp,
    /// Storm control thresholds
    StormControl,
    /// QoS trust, service policy and priority queue
    Qos,
    /// DHCP snooping trust and rate limit
    DhcpSnooping,
    /// Dynamic ARP inspection trust and rate limit
    ArpInspection,
    /// Access VLAN (access only)
    AccessVlan,
    /// Voice VLAN (access only)
    VoiceVlan,
    /// Protected port and private VLAN host (access only)
    Isolation,
    /// Port security (access only)
    PortSecurity,
    /// 802.1X, MAB and web authentication (access only)
    Authentication,
    /// Power over Ethernet (access only)
    Poe,
    /// Trunk encapsulation (trunk only)
    Encapsulation,
    /// DTP mode (trunk only)
    Dtp,
    /// Native VLAN (trunk only)
    NativeVlan,
    /// Allowed VLAN set (trunk only)
    AllowedVlans,
    /// EtherChannel membership (trunk only)
    EtherChannel,
}

/// # Port Template
/// A port template is either an access or a trunk template. An interface holds at most one of
/// them, so access and trunk settings are mutually exclusive per interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PortTemplate {
    /// Access port
    Access(AccessPortTemplate),
    /// Trunk port
    Trunk(TrunkPortTemplate),
}

impl From<AccessPortTemplate> for PortTemplate {
    fn from(t: AccessPortTemplate) -> Self {
        Self::Access(t)
    }
}

impl From<TrunkPortTemplate> for PortTemplate {
    fn from(t: TrunkPortTemplate) -> Self {
        Self::Trunk(t)
    }
}

impl PortTemplate {
    /// Switchport mode keyword (`access` or `trunk`)
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Access(_) => "access",
            Self::Trunk(_) => "trunk",
        }
    }

    /// Shared feature groups
    pub fn common(&self) -> &PortCommon {
        match self {
            Self::Access(t) => t.common(),
            Self::Trunk(t) => t.common(),
        }
    }

    /// Returns the access template, if this is one
    pub fn as_access(&self) -> Option<&AccessPortTemplate> {
        match self {
            Self::Access(t) => Some(t),
            Self::Trunk(_) => None,
        }
    }

    /// Returns the trunk template, if this is one
    pub fn as_trunk(&self) -> Option<&TrunkPortTemplate> {
        match self {
            Self::Trunk(t) => Some(t),
            Self::Access(_) => None,
        }
    }

    /// Returns `true` if the template provides the capability.
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::VlanBinding | Capability::Qos | Capability::Stp => true,
            Capability::Security => matches!(self, Self::Access(_)),
        }
    }

    /// Returns `true` if the feature group deviates from its inert default. Features of the
    /// other port mode are never active.
    pub fn is_active(&self, feature: PortFeature) -> bool {
        match self {
            Self::Access(t) => t.is_active(feature),
            Self::Trunk(t) => t.is_active(feature),
        }
    }

    /// All VLANs referenced by the template, together with the referencing field.
    pub fn vlan_refs(&self) -> Vec<(&'static str, VlanId)> {
        match self {
            Self::Access(t) => t.vlan_refs(),
            Self::Trunk(t) => t.vlan_refs(),
        }
    }

    /// Generate the interface block of this template bound to `iface`, including the
    /// `interface` and `exit` commands.
    pub fn generate_config(&self, iface: &InterfaceId) -> ConfigScript {
        let mut w = ScriptWriter::new();
        self.write_block(iface, &mut w);
        w.finish()
    }

    pub(crate) fn write_block(&self, iface: &InterfaceId, w: &mut ScriptWriter) {
        w.enter(format!("interface {}", iface));
        match self {
            Self::Access(t) => t.write_config(w),
            Self::Trunk(t) => t.write_config(w),
        }
        w.exit();
    }

    /// Name suggested for a new template in a template library: `VLAN <id>` for access
    /// templates, `TRUNK <id>` for trunks (native VLAN, or else the first allowed VLAN), and
    /// `Custom template` or `TRUNK` if no VLAN is set.
    pub fn suggested_name(&self) -> String {
        match self {
            Self::Access(t) => match t.access_vlan() {
                Some(vlan) => format!("VLAN {}", vlan),
                None => "Custom template".to_string(),
            },
            Self::Trunk(t) => {
                let first = t.allowed_vlans().and_then(|s| s.iter().next());
                match t.native_vlan().or(first) {
                    Some(vlan) => format!("TRUNK {}", vlan),
                    None => "TRUNK".to_string(),
                }
            }
        }
    }
}
