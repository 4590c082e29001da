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

//! # Trunk Port Template
//! A switchport carrying multiple tagged VLANs, optionally bundled into an EtherChannel.

use super::feature::{PortCommon, PortSettings};
use super::PortFeature;
use crate::script::ScriptWriter;
use crate::types::{check_range, ConstructionError};
use crate::values::{ChannelMode, ChannelProtocol, DtpMode, Encapsulation, VlanId, VlanSet};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Membership of the port in an EtherChannel bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEtherChannel")]
pub struct EtherChannel {
    group: u8,
    protocol: ChannelProtocol,
    mode: ChannelMode,
}

#[derive(Deserialize)]
struct RawEtherChannel {
    group: u8,
    protocol: ChannelProtocol,
    #[serde(default)]
    mode: Option<ChannelMode>,
}

impl TryFrom<RawEtherChannel> for EtherChannel {
    type Error = ConstructionError;

    fn try_from(raw: RawEtherChannel) -> Result<Self, Self::Error> {
        Self::new(raw.group, raw.protocol, raw.mode)
    }
}

impl EtherChannel {
    /// Create a channel membership. The group must be in 1-64, and the mode must match the
    /// protocol. Without a mode, the active mode of the protocol is used.
    pub fn new(
        group: u8,
        protocol: ChannelProtocol,
        mode: Option<ChannelMode>,
    ) -> Result<Self, ConstructionError> {
        check_range("channel_group", group as i64, 1, 64)?;
        let mode = mode.unwrap_or_else(|| protocol.default_mode());
        if !protocol.allows(mode) {
            return Err(ConstructionError::Incompatible {
                field: "channel_mode",
                reason: format!("mode {} cannot be used with protocol {}", mode, protocol),
            });
        }
        Ok(Self { group, protocol, mode })
    }

    /// Channel group number
    pub fn group(&self) -> u8 {
        self.group
    }

    /// Aggregation protocol
    pub fn protocol(&self) -> ChannelProtocol {
        self.protocol
    }

    /// Negotiation mode
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }
}

/// # Trunk Port Template
/// Without an allowed VLAN set, all VLANs are allowed on the trunk.
///
/// ```
/// use cfgsmith::template::TrunkPortTemplate;
///
/// let mut t = TrunkPortTemplate::new();
/// t.set_allowed_vlans(vec![30, 10, 20, 20])?.set_native_vlan(99)?;
/// assert_eq!(t.allowed_vlans().unwrap().to_string(), "10,20,30");
/// # Ok::<(), cfgsmith::ConstructionError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrunkPortTemplate")]
pub struct TrunkPortTemplate {
    #[serde(flatten)]
    common: PortCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    encapsulation: Option<Encapsulation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dtp_mode: Option<DtpMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    native_vlan: Option<VlanId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_vlans: Option<VlanSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etherchannel: Option<EtherChannel>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawTrunkPortTemplate {
    #[serde(flatten)]
    common: PortCommon,
    encapsulation: Option<Encapsulation>,
    dtp_mode: Option<DtpMode>,
    native_vlan: Option<VlanId>,
    allowed_vlans: Option<VlanSet>,
    etherchannel: Option<EtherChannel>,
}

impl TryFrom<RawTrunkPortTemplate> for TrunkPortTemplate {
    type Error = ConstructionError;

    fn try_from(raw: RawTrunkPortTemplate) -> Result<Self, Self::Error> {
        if raw.encapsulation == Some(Encapsulation::Isl) && raw.native_vlan.is_some() {
            return Err(Self::isl_native_error("native_vlan"));
        }
        Ok(Self {
            common: raw.common,
            encapsulation: raw.encapsulation,
            dtp_mode: raw.dtp_mode,
            native_vlan: raw.native_vlan,
            allowed_vlans: raw.allowed_vlans,
            etherchannel: raw.etherchannel,
        })
    }
}

impl PortSettings for TrunkPortTemplate {
    fn common(&self) -> &PortCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PortCommon {
        &mut self.common
    }
}

impl TrunkPortTemplate {
    /// Create an inert trunk port template
    pub fn new() -> Self {
        Self::default()
    }

    /// Trunk encapsulation
    pub fn encapsulation(&self) -> Option<Encapsulation> {
        self.encapsulation
    }

    /// Set (or clear) the trunk encapsulation. ISL cannot be combined with a native VLAN.
    pub fn set_encapsulation(
        &mut self,
        encapsulation: Option<Encapsulation>,
    ) -> Result<&mut Self, ConstructionError> {
        if encapsulation == Some(Encapsulation::Isl) && self.native_vlan.is_some() {
            return Err(Self::isl_native_error("encapsulation"));
        }
        self.encapsulation = encapsulation;
        Ok(self)
    }

    /// DTP mode
    pub fn dtp_mode(&self) -> Option<DtpMode> {
        self.dtp_mode
    }

    /// Set (or clear) the DTP mode
    pub fn set_dtp_mode(&mut self, mode: Option<DtpMode>) -> &mut Self {
        self.dtp_mode = mode;
        self
    }

    /// Native (untagged) VLAN
    pub fn native_vlan(&self) -> Option<VlanId> {
        self.native_vlan
    }

    /// Set the native VLAN (1-4094)
    pub fn set_native_vlan(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        let vlan = VlanId::new(vlan).map_err(|e| e.in_field("native_vlan"))?;
        if self.encapsulation == Some(Encapsulation::Isl) {
            return Err(Self::isl_native_error("native_vlan"));
        }
        self.native_vlan = Some(vlan);
        Ok(self)
    }

    /// Remove the native VLAN
    pub fn clear_native_vlan(&mut self) -> &mut Self {
        self.native_vlan = None;
        self
    }

    /// Allowed VLANs, `None` if all VLANs are allowed
    pub fn allowed_vlans(&self) -> Option<&VlanSet> {
        self.allowed_vlans.as_ref()
    }

    /// Replace the allowed VLAN set. Duplicates are removed, and the set is kept sorted.
    pub fn set_allowed_vlans<I>(&mut self, vlans: I) -> Result<&mut Self, ConstructionError>
    where
        I: IntoIterator<Item = u16>,
    {
        let set = VlanSet::from_ids(vlans).map_err(|e| e.in_field("allowed_vlans"))?;
        self.allowed_vlans = Some(set);
        Ok(self)
    }

    /// Add a single VLAN to the allowed set
    pub fn allow_vlan(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        let vlan = VlanId::new(vlan).map_err(|e| e.in_field("allowed_vlans"))?;
        self.allowed_vlans.get_or_insert_with(VlanSet::new).insert(vlan);
        Ok(self)
    }

    /// Remove a single VLAN from the allowed set. Has no effect while all VLANs are allowed.
    pub fn disallow_vlan(&mut self, vlan: u16) -> Result<&mut Self, ConstructionError> {
        let vlan = VlanId::new(vlan).map_err(|e| e.in_field("allowed_vlans"))?;
        if let Some(set) = self.allowed_vlans.as_mut() {
            set.remove(vlan);
        }
        Ok(self)
    }

    /// Allow all VLANs on the trunk
    pub fn allow_all_vlans(&mut self) -> &mut Self {
        self.allowed_vlans = None;
        self
    }

    /// EtherChannel membership
    pub fn etherchannel(&self) -> Option<&EtherChannel> {
        self.etherchannel.as_ref()
    }

    /// Bundle the port into an EtherChannel
    pub fn set_etherchannel(
        &mut self,
        group: u8,
        protocol: ChannelProtocol,
        mode: Option<ChannelMode>,
    ) -> Result<&mut Self, ConstructionError> {
        self.etherchannel = Some(EtherChannel::new(group, protocol, mode)?);
        Ok(self)
    }

    /// Remove the port from its EtherChannel
    pub fn clear_etherchannel(&mut self) -> &mut Self {
        self.etherchannel = None;
        self
    }

    /// Returns `true` if the feature group deviates from its inert default.
    pub fn is_active(&self, feature: PortFeature) -> bool {
        match feature {
            PortFeature::Encapsulation => self.encapsulation.is_some(),
            PortFeature::Dtp => self.dtp_mode.is_some(),
            PortFeature::NativeVlan => self.native_vlan.is_some(),
            PortFeature::AllowedVlans => self.allowed_vlans.is_some(),
            PortFeature::EtherChannel => self.etherchannel.is_some(),
            f => self.common.is_active(f),
        }
    }

    /// All VLANs referenced by the template, together with the referencing field.
    pub fn vlan_refs(&self) -> Vec<(&'static str, VlanId)> {
        let native = self.native_vlan.map(|v| ("native_vlan", v));
        let allowed =
            self.allowed_vlans.iter().flat_map(|s| s.iter()).map(|v| ("allowed_vlans", v));
        native.into_iter().chain(allowed).collect()
    }

    fn isl_native_error(field: &'static str) -> ConstructionError {
        ConstructionError::Incompatible {
            field,
            reason: "ISL encapsulation has no native VLAN".to_string(),
        }
    }

    pub(crate) fn write_config(&self, w: &mut ScriptWriter) {
        self.common.write_description(w);
        if let Some(encapsulation) = self.encapsulation {
            w.line(format!("switchport trunk encapsulation {}", encapsulation));
        }
        match self.dtp_mode {
            Some(DtpMode::Auto) => w.line("switchport mode dynamic auto"),
            Some(DtpMode::Desirable) => w.line("switchport mode dynamic desirable"),
            Some(DtpMode::Nonegotiate) => {
                w.line("switchport mode trunk");
                w.line("switchport nonegotiate");
            }
            None => w.line("switchport mode trunk"),
        }
        if let Some(vlan) = self.native_vlan {
            w.line(format!("switchport trunk native vlan {}", vlan));
        }
        match &self.allowed_vlans {
            Some(set) if set.is_empty() => w.line("switchport trunk allowed vlan none"),
            Some(set) => w.line(format!("switchport trunk allowed vlan {}", set)),
            None => {}
        }
        self.common.write_stp(w, true);
        self.common.write_storm_control(w);
        self.common.write_qos(w);
        self.common.write_inspection(w);
        self.common.write_link(w);
        if let Some(channel) = self.etherchannel {
            if channel.protocol != ChannelProtocol::None {
                w.line(format!("channel-protocol {}", channel.protocol));
            }
            w.line(format!("channel-group {} mode {}", channel.group, channel.mode));
        }
    }
}
