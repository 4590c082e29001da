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

//! # Device Models
//! Hardware metadata supplied once when a device template is created: which interfaces exist, and
//! which capabilities (switching, routing, PoE, voice VLAN) the hardware provides.

use crate::types::{InterfaceId, InterfaceKind, ModelCapability};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Hardware model of a device. The set of declared interfaces is the only set of interfaces to
/// which port templates can be bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceModel {
    name: String,
    #[serde(default)]
    capabilities: BTreeSet<ModelCapability>,
    interfaces: BTreeSet<InterfaceId>,
}

impl DeviceModel {
    /// Create a model without capabilities and interfaces.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), capabilities: BTreeSet::new(), interfaces: BTreeSet::new() }
    }

    /// Add a capability to the model.
    pub fn with(mut self, capability: ModelCapability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Declare the interfaces `<kind><prefix>/<n>` for all `n` in `ports`. The prefix may be
    /// empty, or contain the slot (and module) numbers.
    pub fn with_ports(
        mut self,
        kind: InterfaceKind,
        prefix: &[u16],
        ports: RangeInclusive<u16>,
    ) -> Self {
        for port in ports {
            let mut path = prefix.to_vec();
            path.push(port);
            if let Ok(iface) = InterfaceId::new(kind, path) {
                self.interfaces.insert(iface);
            }
        }
        self
    }

    /// Declare a single interface.
    pub fn with_interface(mut self, iface: InterfaceId) -> Self {
        self.interfaces.insert(iface);
        self
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the hardware provides the capability.
    pub fn has(&self, capability: ModelCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// All capabilities of the model
    pub fn capabilities(&self) -> impl Iterator<Item = ModelCapability> + '_ {
        self.capabilities.iter().copied()
    }

    /// Returns `true` if the model has an interface with the given identifier.
    pub fn declares(&self, iface: &InterfaceId) -> bool {
        self.interfaces.contains(iface)
    }

    /// All declared interfaces, in ascending order
    pub fn interfaces(&self) -> &BTreeSet<InterfaceId> {
        &self.interfaces
    }
}
