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

//! # Access Port Template
//! A switchport carrying a single untagged VLAN (plus an optional voice VLAN).

use super::feature::{inert_as_none, modify_group, PortCommon, PortSettings};
use super::PortFeature;
use crate::script::ScriptWriter;
use crate::types::ConstructionError;
use crate::values::{AuthMethod, MacAddress, MaxMacCount, PoeMode, ViolationAction, VlanId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::TryFrom;

/// Port security settings. The group being present enables port security on the port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPortSecurity")]
pub struct PortSecurity {
    pub(crate) maximum: Option<MaxMacCount>,
    pub(crate) violation: Option<ViolationAction>,
    pub(crate) sticky: bool,
    pub(crate) static_macs: BTreeSet<MacAddress>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawPortSecurity {
    maximum: Option<MaxMacCount>,
    violation: Option<ViolationAction>,
    sticky: bool,
    static_macs: BTreeSet<MacAddress>,
}

impl TryFrom<RawPortSecurity> for PortSecurity {
    type Error = ConstructionError;

    fn try_from(raw: RawPortSecurity) -> Result<Self, Self::Error> {
        let security = Self {
            maximum: raw.maximum,
            violation: raw.violation,
            sticky: raw.sticky,
            static_macs: BTreeSet::new(),
        };
        raw.static_macs.into_iter().try_fold(security, |mut security, mac| {
            security.add_static_mac(mac)?;
            Ok(security)
        })
    }
}

impl PortSecurity {
    /// Configured address limit (the device default is one address)
    pub fn maximum(&self) -> Option<MaxMacCount> {
        self.maximum
    }

    /// Configured violation action (the device default is shutdown)
    pub fn violation(&self) -> Option<ViolationAction> {
        self.violation
    }

    /// Learned addresses are kept in the running configuration
    pub fn sticky(&self) -> bool {
        self.sticky
    }

    /// Statically configured secure addresses
    pub fn static_macs(&self) -> &BTreeSet<MacAddress> {
        &self.static_macs
    }

    fn limit(&self) -> usize {
        self.maximum.unwrap_or_default().get() as usize
    }

    fn add_static_mac(&mut self, mac: MacAddress) -> Result<(), ConstructionError> {
        if mac.is_multicast() {
            return Err(ConstructionError::InvalidFormat {
                field: "static_mac",
                value: mac.to_string(),
                expected: "a unicast MAC address",
            });
        }
        if self.static_macs.insert(mac) && self.static_macs.len() > self.limit() {
            return Err(ConstructionError::Incompatible {
                field: "static_mac",
                reason: format!("the port allows at most {} secure addresses", self.limit()),
            });
        }
        Ok(())
    }
}

/// Isolation of the port from other ports of the same switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortIsolation {
    pub(crate) protected: bool,
    pub(crate) private_vlan_host: bool,
}

impl PortIsolation {
    /// Protected port (no traffic to other protected ports)
    pub fn protected(&self) -> bool {
        self.protected
    }

    /// Host port of a private VLAN
    pub fn private_vlan_host(&self) -> bool {
        self.private_vlan_host
    }
}

/// # Access Port Template
/// All feature groups start inert. Use the setters (and the ones of [`PortSettings`]) to
/// configure the template:
///
/// ```
/// use cfgsmith::template::{AccessPortTemplate, PortSettings};
/// use cfgsmith::values::ViolationAction;
///
/// let mut t = AccessPortTemplate::new();
/// t.set_access_vlan(10)?
///     .set_max_mac_count(1)?
///     .set_violation_action(ViolationAction::Shutdown)
///     .set_portfast(true);
/// assert!(t.set_access_vlan(4095).is_err());
/// # Ok::<(), cfgsmith::ConstructionError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPortTemplate {
    #[serde(flatten)]
    common: PortCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_vlan: Option<VlanId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_vlan: Option<VlanId>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    isolation: Option<PortIsolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port_security: Option<PortSecurity>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    authentication: BTreeSet<AuthMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poe: Option<PoeMode>,
}

impl PortSettings for AccessPortTemplate {
    fn common(&self) -> &PortCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PortCommon {
        &mut self.common
    }
}

impl AccessPortTemplate {
    /// Create an inert access port template
    pub fn new() -> Self {
        Self::default()
    }

    /// Access VLAN
    pub fn access_vlan(&self) -> Option<VlanId> {
        self.access_vlan
    }

    /// Set the access VLAN (1-4094)
    pub fn set_access_vlan(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        self.access_vlan = Some(VlanId::new(vlan).map_err(|e| e.in_field("access_vlan"))?);
        Ok(self)
    }

    /// Remove the access VLAN
    pub fn clear_access_vlan(&mut self) -> &mut Self {
        self.access_vlan = None;
        self
    }

    /// Voice VLAN
    pub fn voice_vlan(&self) -> Option<VlanId> {
        self.voice_vlan
    }

    /// Set the voice VLAN (1-4094)
    pub fn set_voice_vlan(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        self.voice_vlan = Some(VlanId::new(vlan).map_err(|e| e.in_field("voice_vlan"))?);
        Ok(self)
    }

    /// Remove the voice VLAN
    pub fn clear_voice_vlan(&mut self) -> &mut Self {
        self.voice_vlan = None;
        self
    }

    /// Port isolation settings
    pub fn isolation(&self) -> Option<&PortIsolation> {
        self.isolation.as_ref()
    }

    /// Enable or disable the protected port mode
    pub fn set_protected(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.isolation, |i| i.protected = enable);
        self
    }

    /// Enable or disable the private VLAN host mode
    pub fn set_private_vlan_host(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.isolation, |i| i.private_vlan_host = enable);
        self
    }

    /// Port security settings, `None` if port security is disabled
    pub fn port_security(&self) -> Option<&PortSecurity> {
        self.port_security.as_ref()
    }

    /// Enable port security with the device defaults
    pub fn enable_port_security(&mut self) -> &mut Self {
        self.port_security.get_or_insert_with(PortSecurity::default);
        self
    }

    /// Disable port security, discarding all its settings
    pub fn disable_port_security(&mut self) -> &mut Self {
        self.port_security = None;
        self
    }

    /// Set the maximum number of secure addresses (1-8192), enabling port security. Fails if
    /// more static addresses are configured.
    pub fn set_max_mac_count(&mut self, count: u16) -> Result<&mut Self, ConstructionError> {
        let maximum = MaxMacCount::new(count)?;
        let mut security = self.port_security.clone().unwrap_or_default();
        if security.static_macs.len() > count as usize {
            return Err(ConstructionError::Incompatible {
                field: "max_mac_count",
                reason: format!(
                    "{} static addresses are configured, which exceeds the limit of {}",
                    security.static_macs.len(),
                    count
                ),
            });
        }
        security.maximum = Some(maximum);
        self.port_security = Some(security);
        Ok(self)
    }

    /// Set the violation action, enabling port security
    pub fn set_violation_action(&mut self, action: ViolationAction) -> &mut Self {
        self.port_security.get_or_insert_with(PortSecurity::default).violation = Some(action);
        self
    }

    /// Enable or disable sticky learning, enabling port security
    pub fn set_sticky_mac(&mut self, enable: bool) -> &mut Self {
        self.port_security.get_or_insert_with(PortSecurity::default).sticky = enable;
        self
    }

    /// Add a static secure address, enabling port security. Fails if the address limit is
    /// reached.
    pub fn add_static_mac(&mut self, mac: MacAddress) -> Result<&mut Self, ConstructionError> {
        let mut security = self.port_security.clone().unwrap_or_default();
        security.add_static_mac(mac)?;
        self.port_security = Some(security);
        Ok(self)
    }

    /// Remove a static secure address
    pub fn remove_static_mac(&mut self, mac: MacAddress) -> &mut Self {
        if let Some(security) = self.port_security.as_mut() {
            security.static_macs.remove(&mac);
        }
        self
    }

    /// Network access control methods
    pub fn auth_methods(&self) -> &BTreeSet<AuthMethod> {
        &self.authentication
    }

    /// Enable a network access control method
    pub fn add_auth_method(&mut self, method: AuthMethod) -> &mut Self {
        self.authentication.insert(method);
        self
    }

    /// Disable a network access control method
    pub fn remove_auth_method(&mut self, method: AuthMethod) -> &mut Self {
        self.authentication.remove(&method);
        self
    }

    /// PoE mode
    pub fn poe(&self) -> Option<PoeMode> {
        self.poe
    }

    /// Set (or clear) the PoE mode
    pub fn set_poe(&mut self, mode: Option<PoeMode>) -> &mut Self {
        self.poe = mode;
        self
    }

    /// Returns `true` if the feature group deviates from its inert default.
    pub fn is_active(&self, feature: PortFeature) -> bool {
        match feature {
            PortFeature::AccessVlan => self.access_vlan.is_some(),
            PortFeature::VoiceVlan => self.voice_vlan.is_some(),
            PortFeature::Isolation => self.isolation.is_some(),
            PortFeature::PortSecurity => self.port_security.is_some(),
            PortFeature::Authentication => !self.authentication.is_empty(),
            PortFeature::Poe => self.poe.is_some(),
            f => self.common.is_active(f),
        }
    }

    /// All VLANs referenced by the template, together with the referencing field.
    pub fn vlan_refs(&self) -> Vec<(&'static str, VlanId)> {
        let access = self.access_vlan.map(|v| ("access_vlan", v));
        let voice = self.voice_vlan.map(|v| ("voice_vlan", v));
        access.into_iter().chain(voice).collect()
    }

    pub(crate) fn write_config(&self, w: &mut ScriptWriter) {
        self.common.write_description(w);
        w.line("switchport mode access");
        if let Some(vlan) = self.access_vlan {
            w.line(format!("switchport access vlan {}", vlan));
        }
        if let Some(vlan) = self.voice_vlan {
            w.line(format!("switchport voice vlan {}", vlan));
        }
        if let Some(isolation) = &self.isolation {
            if isolation.protected {
                w.line("switchport protected");
            }
            if isolation.private_vlan_host {
                w.line("switchport private-vlan host");
            }
        }
        if let Some(security) = &self.port_security {
            w.line("switchport port-security");
            if let Some(maximum) = security.maximum {
                w.line(format!("switchport port-security maximum {}", maximum));
            }
            if let Some(action) = security.violation {
                w.line(format!("switchport port-security violation {}", action));
            }
            if security.sticky {
                w.line("switchport port-security mac-address sticky");
            }
            for mac in security.static_macs.iter() {
                w.line(format!("switchport port-security mac-address {}", mac));
            }
        }
        self.common.write_stp(w, false);
        self.common.write_storm_control(w);
        self.common.write_qos(w);
        self.write_authentication(w);
        if let Some(mode) = self.poe {
            w.line(format!("power inline {}", mode));
        }
        self.common.write_inspection(w);
        self.common.write_link(w);
    }

    fn write_authentication(&self, w: &mut ScriptWriter) {
        let auth = &self.authentication;
        if auth.contains(&AuthMethod::Dot1x) || auth.contains(&AuthMethod::Mab) {
            w.line("authentication port-control auto");
        }
        for method in auth.iter() {
            w.line(match method {
                AuthMethod::Dot1x => "dot1x pae authenticator",
                AuthMethod::Mab => "mab",
                AuthMethod::WebAuth => "webauth",
            });
        }
    }
}

