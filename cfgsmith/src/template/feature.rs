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

//! Feature groups shared by access and trunk port templates.

use super::PortFeature;
use crate::script::ScriptWriter;
use crate::types::ConstructionError;
use crate::values::{
    Description, Duplex, Name, QosTrust, RateLimit, Speed, StormThreshold, StormTraffic,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// Apply `f` to a copy of the group (or its default), and store the result only if `f` succeeds.
/// A group equal to its default is inert and stored as `None`.
pub(crate) fn update_group<G, F>(slot: &mut Option<G>, f: F) -> Result<(), ConstructionError>
where
    G: Default + PartialEq + Clone,
    F: FnOnce(&mut G) -> Result<(), ConstructionError>,
{
    let mut group = slot.clone().unwrap_or_default();
    f(&mut group)?;
    *slot = if group == G::default() { None } else { Some(group) };
    Ok(())
}

/// Infallible version of [`update_group`].
pub(crate) fn modify_group<G, F>(slot: &mut Option<G>, f: F)
where
    G: Default + PartialEq + Clone,
    F: FnOnce(&mut G),
{
    let mut group = slot.clone().unwrap_or_default();
    f(&mut group);
    *slot = if group == G::default() { None } else { Some(group) };
}

/// Deserialize an optional feature group, storing a group equal to its default as `None`.
pub(crate) fn inert_as_none<'de, D, G>(deserializer: D) -> Result<Option<G>, D::Error>
where
    D: Deserializer<'de>,
    G: Deserialize<'de> + Default + PartialEq,
{
    Ok(Option::<G>::deserialize(deserializer)?.filter(|g| *g != G::default()))
}

/// Speed, duplex and auto-MDIX of a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLinkSettings")]
pub struct LinkSettings {
    pub(crate) speed: Speed,
    pub(crate) duplex: Duplex,
    pub(crate) mdix_auto: bool,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawLinkSettings {
    speed: Speed,
    duplex: Duplex,
    mdix_auto: bool,
}

impl TryFrom<RawLinkSettings> for LinkSettings {
    type Error = ConstructionError;

    fn try_from(raw: RawLinkSettings) -> Result<Self, Self::Error> {
        let link = Self { speed: raw.speed, duplex: raw.duplex, mdix_auto: raw.mdix_auto };
        link.check()?;
        Ok(link)
    }
}

impl LinkSettings {
    /// Configured speed
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Configured duplex mode
    pub fn duplex(&self) -> Duplex {
        self.duplex
    }

    /// Whether auto-MDIX is enabled
    pub fn mdix_auto(&self) -> bool {
        self.mdix_auto
    }

    fn check(&self) -> Result<(), ConstructionError> {
        if self.duplex == Duplex::Half && self.speed == Speed::Mbps1000 {
            Err(ConstructionError::Incompatible {
                field: "duplex",
                reason: "half duplex is not possible at 1000 Mbit/s".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Spanning tree edge and guard settings of a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStpEdge")]
pub struct StpEdge {
    pub(crate) portfast: bool,
    pub(crate) bpdu_guard: bool,
    pub(crate) bpdu_filter: bool,
    pub(crate) loop_guard: bool,
    pub(crate) root_guard: bool,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawStpEdge {
    portfast: bool,
    bpdu_guard: bool,
    bpdu_filter: bool,
    loop_guard: bool,
    root_guard: bool,
}

impl TryFrom<RawStpEdge> for StpEdge {
    type Error = ConstructionError;

    fn try_from(raw: RawStpEdge) -> Result<Self, Self::Error> {
        let stp = Self {
            portfast: raw.portfast,
            bpdu_guard: raw.bpdu_guard,
            bpdu_filter: raw.bpdu_filter,
            loop_guard: raw.loop_guard,
            root_guard: raw.root_guard,
        };
        stp.check()?;
        Ok(stp)
    }
}

impl StpEdge {
    /// PortFast is enabled
    pub fn portfast(&self) -> bool {
        self.portfast
    }

    /// BPDU guard is enabled
    pub fn bpdu_guard(&self) -> bool {
        self.bpdu_guard
    }

    /// BPDU filter is enabled
    pub fn bpdu_filter(&self) -> bool {
        self.bpdu_filter
    }

    /// Loop guard is enabled
    pub fn loop_guard(&self) -> bool {
        self.loop_guard
    }

    /// Root guard is enabled
    pub fn root_guard(&self) -> bool {
        self.root_guard
    }

    fn check(&self) -> Result<(), ConstructionError> {
        if self.loop_guard && self.root_guard {
            Err(ConstructionError::Incompatible {
                field: "stp_guard",
                reason: "loop guard and root guard cannot be enabled on the same port".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Storm control thresholds per traffic class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormControl {
    pub(crate) levels: BTreeMap<StormTraffic, StormThreshold>,
}

impl StormControl {
    /// Threshold of a traffic class
    pub fn level(&self, traffic: StormTraffic) -> Option<StormThreshold> {
        self.levels.get(&traffic).copied()
    }
}

/// QoS settings of a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QosSettings {
    pub(crate) trust: Option<QosTrust>,
    pub(crate) service_policy: Option<Name>,
    pub(crate) priority_queue: bool,
}

impl QosSettings {
    /// Trusted marking
    pub fn trust(&self) -> Option<QosTrust> {
        self.trust
    }

    /// Ingress service policy
    pub fn service_policy(&self) -> Option<&Name> {
        self.service_policy.as_ref()
    }

    /// Egress priority queue is enabled
    pub fn priority_queue(&self) -> bool {
        self.priority_queue
    }
}

/// Trust state and rate limit of DHCP snooping or dynamic ARP inspection on a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustSettings {
    pub(crate) trusted: bool,
    pub(crate) rate_limit: Option<RateLimit>,
}

impl TrustSettings {
    /// The port is trusted
    pub fn trusted(&self) -> bool {
        self.trusted
    }

    /// Rate limit in packets per second
    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit
    }

    fn write(&self, w: &mut ScriptWriter, prefix: &str) {
        if self.trusted {
            w.line(format!("{} trust", prefix));
        }
        if let Some(rate) = self.rate_limit {
            w.line(format!("{} limit rate {}", prefix, rate));
        }
    }
}

/// # Shared port settings
/// Feature groups that exist on access and trunk ports alike. Every group is `None` while it is
/// inert, also after deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<Description>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    pub(crate) link: Option<LinkSettings>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    pub(crate) stp: Option<StpEdge>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    pub(crate) storm_control: Option<StormControl>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    pub(crate) qos: Option<QosSettings>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    pub(crate) dhcp_snooping: Option<TrustSettings>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "inert_as_none")]
    pub(crate) arp_inspection: Option<TrustSettings>,
}

impl PortCommon {
    pub(crate) fn is_active(&self, feature: PortFeature) -> bool {
        match feature {
            PortFeature::Description => self.description.is_some(),
            PortFeature::Link => self.link.is_some(),
            PortFeature::Stp => self.stp.is_some(),
            PortFeature::StormControl => self.storm_control.is_some(),
            PortFeature::Qos => self.qos.is_some(),
            PortFeature::DhcpSnooping => self.dhcp_snooping.is_some(),
            PortFeature::ArpInspection => self.arp_inspection.is_some(),
            _ => false,
        }
    }

    pub(crate) fn write_description(&self, w: &mut ScriptWriter) {
        if let Some(d) = &self.description {
            w.line(format!("description {}", d));
        }
    }

    pub(crate) fn write_stp(&self, w: &mut ScriptWriter, trunk: bool) {
        if let Some(stp) = &self.stp {
            match (stp.portfast, trunk) {
                (true, true) => w.line("spanning-tree portfast trunk"),
                (true, false) => w.line("spanning-tree portfast"),
                _ => {}
            }
            if stp.bpdu_guard {
                w.line("spanning-tree bpduguard enable");
            }
            if stp.bpdu_filter {
                w.line("spanning-tree bpdufilter enable");
            }
            if stp.loop_guard {
                w.line("spanning-tree guard loop");
            }
            if stp.root_guard {
                w.line("spanning-tree guard root");
            }
        }
    }

    pub(crate) fn write_storm_control(&self, w: &mut ScriptWriter) {
        if let Some(storm) = &self.storm_control {
            for (traffic, level) in storm.levels.iter() {
                w.line(format!("storm-control {} level {}", traffic, level));
            }
        }
    }

    pub(crate) fn write_qos(&self, w: &mut ScriptWriter) {
        if let Some(qos) = &self.qos {
            if let Some(trust) = qos.trust {
                w.line(format!("mls qos trust {}", trust));
            }
            if let Some(policy) = &qos.service_policy {
                w.line(format!("service-policy input {}", policy));
            }
            if qos.priority_queue {
                w.line("priority-queue out");
            }
        }
    }

    pub(crate) fn write_inspection(&self, w: &mut ScriptWriter) {
        if let Some(snooping) = &self.dhcp_snooping {
            snooping.write(w, "ip dhcp snooping");
        }
        if let Some(arp) = &self.arp_inspection {
            arp.write(w, "ip arp inspection");
        }
    }

    pub(crate) fn write_link(&self, w: &mut ScriptWriter) {
        if let Some(link) = &self.link {
            if link.speed != Speed::Auto {
                w.line(format!("speed {}", link.speed));
            }
            if link.duplex != Duplex::Auto {
                w.line(format!("duplex {}", link.duplex));
            }
            if link.mdix_auto {
                w.line("mdix auto");
            }
        }
    }
}

/// # Shared port setters
/// Accessors and mutators of the feature groups that access and trunk ports have in common. Each
/// setter validates its input and leaves the template untouched when it fails.
pub trait PortSettings {
    /// Shared feature groups of the port
    fn common(&self) -> &PortCommon;

    /// Mutable access to the shared feature groups
    #[doc(hidden)]
    fn common_mut(&mut self) -> &mut PortCommon;

    /// Interface description
    fn description(&self) -> Option<&Description> {
        self.common().description.as_ref()
    }

    /// Set the interface description
    fn set_description(&mut self, text: &str) -> Result<&mut Self, ConstructionError> {
        self.common_mut().description = Some(Description::new(text)?);
        Ok(self)
    }

    /// Remove the interface description
    fn clear_description(&mut self) -> &mut Self {
        self.common_mut().description = None;
        self
    }

    /// Speed, duplex and MDIX settings
    fn link(&self) -> Option<&LinkSettings> {
        self.common().link.as_ref()
    }

    /// Set the port speed. Fails if the port is set to half duplex and the speed is 1000.
    fn set_speed(&mut self, speed: Speed) -> Result<&mut Self, ConstructionError> {
        update_group(&mut self.common_mut().link, |l| {
            l.speed = speed;
            l.check()
        })?;
        Ok(self)
    }

    /// Set the duplex mode. Fails for half duplex at 1000 Mbit/s.
    fn set_duplex(&mut self, duplex: Duplex) -> Result<&mut Self, ConstructionError> {
        update_group(&mut self.common_mut().link, |l| {
            l.duplex = duplex;
            l.check()
        })?;
        Ok(self)
    }

    /// Enable or disable auto-MDIX
    fn set_mdix_auto(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.common_mut().link, |l| l.mdix_auto = enable);
        self
    }

    /// Spanning tree edge and guard settings
    fn stp(&self) -> Option<&StpEdge> {
        self.common().stp.as_ref()
    }

    /// Enable or disable PortFast
    fn set_portfast(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.common_mut().stp, |s| s.portfast = enable);
        self
    }

    /// Enable or disable BPDU guard
    fn set_bpdu_guard(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.common_mut().stp, |s| s.bpdu_guard = enable);
        self
    }

    /// Enable or disable BPDU filter
    fn set_bpdu_filter(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.common_mut().stp, |s| s.bpdu_filter = enable);
        self
    }

    /// Enable or disable loop guard. Fails if root guard is enabled.
    fn set_loop_guard(&mut self, enable: bool) -> Result<&mut Self, ConstructionError> {
        update_group(&mut self.common_mut().stp, |s| {
            s.loop_guard = enable;
            s.check()
        })?;
        Ok(self)
    }

    /// Enable or disable root guard. Fails if loop guard is enabled.
    fn set_root_guard(&mut self, enable: bool) -> Result<&mut Self, ConstructionError> {
        update_group(&mut self.common_mut().stp, |s| {
            s.root_guard = enable;
            s.check()
        })?;
        Ok(self)
    }

    /// Storm control thresholds
    fn storm_control(&self) -> Option<&StormControl> {
        self.common().storm_control.as_ref()
    }

    /// Set the storm control threshold of a traffic class
    fn set_storm_control(&mut self, traffic: StormTraffic, level: StormThreshold) -> &mut Self {
        modify_group(&mut self.common_mut().storm_control, |s| {
            s.levels.insert(traffic, level);
        });
        self
    }

    /// Remove the storm control threshold of a traffic class
    fn clear_storm_control(&mut self, traffic: StormTraffic) -> &mut Self {
        modify_group(&mut self.common_mut().storm_control, |s| {
            s.levels.remove(&traffic);
        });
        self
    }

    /// QoS settings
    fn qos(&self) -> Option<&QosSettings> {
        self.common().qos.as_ref()
    }

    /// Set (or clear) the trusted QoS marking
    fn set_qos_trust(&mut self, trust: Option<QosTrust>) -> &mut Self {
        modify_group(&mut self.common_mut().qos, |q| q.trust = trust);
        self
    }

    /// Set (or clear) the ingress service policy
    fn set_service_policy(
        &mut self,
        policy: Option<&str>,
    ) -> Result<&mut Self, ConstructionError> {
        let policy = policy.map(Name::new).transpose().map_err(|e| e.in_field("service_policy"))?;
        update_group(&mut self.common_mut().qos, |q| {
            q.service_policy = policy;
            Ok(())
        })?;
        Ok(self)
    }

    /// Enable or disable the egress priority queue
    fn set_priority_queue(&mut self, enable: bool) -> &mut Self {
        modify_group(&mut self.common_mut().qos, |q| q.priority_queue = enable);
        self
    }

    /// DHCP snooping settings
    fn dhcp_snooping(&self) -> Option<&TrustSettings> {
        self.common().dhcp_snooping.as_ref()
    }

    /// Mark the port as trusted (or untrusted) for DHCP snooping
    fn set_dhcp_snooping_trust(&mut self, trusted: bool) -> &mut Self {
        modify_group(&mut self.common_mut().dhcp_snooping, |s| s.trusted = trusted);
        self
    }

    /// Set (or clear) the DHCP rate limit in packets per second (1-2048)
    fn set_dhcp_snooping_rate(
        &mut self,
        pps: Option<u16>,
    ) -> Result<&mut Self, ConstructionError> {
        let rate = pps.map(RateLimit::new).transpose().map_err(|e| e.in_field("dhcp_snooping"))?;
        update_group(&mut self.common_mut().dhcp_snooping, |s| {
            s.rate_limit = rate;
            Ok(())
        })?;
        Ok(self)
    }

    /// Dynamic ARP inspection settings
    fn arp_inspection(&self) -> Option<&TrustSettings> {
        self.common().arp_inspection.as_ref()
    }

    /// Mark the port as trusted (or untrusted) for dynamic ARP inspection
    fn set_arp_inspection_trust(&mut self, trusted: bool) -> &mut Self {
        modify_group(&mut self.common_mut().arp_inspection, |s| s.trusted = trusted);
        self
    }

    /// Set (or clear) the ARP rate limit in packets per second (1-2048)
    fn set_arp_inspection_rate(
        &mut self,
        pps: Option<u16>,
    ) -> Result<&mut Self, ConstructionError> {
        let rate = pps.map(RateLimit::new).transpose().map_err(|e| e.in_field("arp_inspection"))?;
        update_group(&mut self.common_mut().arp_inspection, |s| {
            s.rate_limit = rate;
            Ok(())
        })?;
        Ok(self)
    }
}
