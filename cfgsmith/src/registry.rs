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

//! # Interface Assignment Registry
//! Binds port templates to the physical interfaces of switches. Each binding owns its
//! [`PortTemplate`], together with the [`DisplayTag`] (template name and colour) it was assigned
//! with. Every interface holds at most one binding, and only interfaces declared by the device
//! model can be bound.

use crate::color::Color;
use crate::template::{DeviceTemplate, PortTemplate};
use crate::types::{DeviceId, InterfaceId, RegistryError, UnknownInterfaceError};
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Presentation tag of a port template: its library name and colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayTag {
    /// Name of the template
    pub name: String,
    /// Colour of the template and all interfaces bound to it
    pub color: Color,
}

impl DisplayTag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self { name: name.into(), color }
    }
}

/// A port template bound to an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    template: PortTemplate,
    tag: DisplayTag,
}

impl Binding {
    /// Bound template
    pub fn template(&self) -> &PortTemplate {
        &self.template
    }

    /// Tag of the bound template
    pub fn tag(&self) -> &DisplayTag {
        &self.tag
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DeviceEntry {
    declared: BTreeSet<InterfaceId>,
    bindings: BTreeMap<InterfaceId, Binding>,
}

/// # Interface Registry
/// Process-scoped map from `(device, interface)` to the bound port template. Interfaces are kept
/// ordered by their identifier, so listing the bindings of a device is deterministic and
/// independent of the assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceRegistry {
    devices: BTreeMap<DeviceId, DeviceEntry>,
}

impl InterfaceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the declared interfaces of a switch. Registering a device again updates its
    /// interface set, and drops the bindings of interfaces that are no longer declared.
    pub fn register(&mut self, device: &DeviceTemplate) -> Result<(), RegistryError> {
        if !device.supports_switching() {
            return Err(RegistryError::NoSwitchports(device.id()));
        }
        let declared = device.model().interfaces().clone();
        let entry = self.devices.entry(device.id()).or_default();
        entry.bindings.retain(|iface, _| declared.contains(iface));
        debug!("Register {} with {} interfaces", device.id(), declared.len());
        entry.declared = declared;
        Ok(())
    }

    /// Returns `true` if the device is registered.
    pub fn is_registered(&self, device: DeviceId) -> bool {
        self.devices.contains_key(&device)
    }

    /// Remove a device together with all its bindings. Returns the number of removed bindings,
    /// or `None` if the device was not registered.
    pub fn remove_device(&mut self, device: DeviceId) -> Option<usize> {
        let entry = self.devices.remove(&device)?;
        debug!("Remove {} and {} bindings", device, entry.bindings.len());
        Some(entry.bindings.len())
    }

    fn entry(&self, device: DeviceId) -> Result<&DeviceEntry, RegistryError> {
        self.devices.get(&device).ok_or(RegistryError::UnknownDevice(device))
    }

    fn declared_entry(
        &mut self,
        device: DeviceId,
        iface: &InterfaceId,
    ) -> Result<&mut DeviceEntry, RegistryError> {
        let entry = self.devices.get_mut(&device).ok_or(RegistryError::UnknownDevice(device))?;
        if entry.declared.contains(iface) {
            Ok(entry)
        } else {
            Err(UnknownInterfaceError { device, interface: iface.clone() }.into())
        }
    }

    /// Bind a template to an interface. An existing binding is replaced as a whole and returned.
    pub fn assign(
        &mut self,
        device: DeviceId,
        iface: InterfaceId,
        template: PortTemplate,
        tag: DisplayTag,
    ) -> Result<Option<Binding>, RegistryError> {
        let entry = self.declared_entry(device, &iface)?;
        debug!("Assign {} ({}) to {} on {}", tag.name, template.mode(), iface, device);
        Ok(entry.bindings.insert(iface, Binding { template, tag }))
    }

    /// Clear the binding of an interface, which reverts to the unconfigured default.
    pub fn unassign(
        &mut self,
        device: DeviceId,
        iface: &InterfaceId,
    ) -> Result<Option<Binding>, RegistryError> {
        let entry = self.declared_entry(device, iface)?;
        let old = entry.bindings.remove(iface);
        if old.is_some() {
            debug!("Unassign {} on {}", iface, device);
        }
        Ok(old)
    }

    /// Template bound to an interface
    pub fn lookup(
        &self,
        device: DeviceId,
        iface: &InterfaceId,
    ) -> Result<Option<&PortTemplate>, RegistryError> {
        Ok(self.binding(device, iface)?.map(|b| &b.template))
    }

    /// Binding of an interface
    pub fn binding(
        &self,
        device: DeviceId,
        iface: &InterfaceId,
    ) -> Result<Option<&Binding>, RegistryError> {
        let entry = self.entry(device)?;
        if !entry.declared.contains(iface) {
            return Err(UnknownInterfaceError { device, interface: iface.clone() }.into());
        }
        Ok(entry.bindings.get(iface))
    }

    /// All bindings of a device, ordered by interface identifier.
    pub fn all_assignments(
        &self,
        device: DeviceId,
    ) -> Result<impl Iterator<Item = (&InterfaceId, &PortTemplate)> + '_, RegistryError> {
        Ok(self.entry(device)?.bindings.iter().map(|(i, b)| (i, &b.template)))
    }

    /// All bindings of a device including their tags, ordered by interface identifier.
    pub fn bindings(
        &self,
        device: DeviceId,
    ) -> Result<impl Iterator<Item = (&InterfaceId, &Binding)> + '_, RegistryError> {
        Ok(self.entry(device)?.bindings.iter())
    }

    /// Interfaces declared by the model of a registered device
    pub fn declared_interfaces(
        &self,
        device: DeviceId,
    ) -> Result<&BTreeSet<InterfaceId>, RegistryError> {
        Ok(&self.entry(device)?.declared)
    }

    /// Interfaces of a device bound to the template with the given name, in ascending order.
    pub fn interfaces_for_template(
        &self,
        device: DeviceId,
        name: &str,
    ) -> Result<Vec<InterfaceId>, RegistryError> {
        Ok(self
            .entry(device)?
            .bindings
            .iter()
            .filter(|(_, b)| b.tag.name == name)
            .map(|(i, _)| i.clone())
            .collect())
    }

    fn bindings_named<'a>(&'a mut self, name: &'a str) -> impl Iterator<Item = &'a mut Binding> {
        self.devices
            .values_mut()
            .flat_map(|e| e.bindings.values_mut())
            .filter(move |b| b.tag.name == name)
    }

    /// Change the tag of every binding named `name` (on all devices). Returns the number of
    /// updated bindings.
    pub fn retag(&mut self, name: &str, tag: DisplayTag) -> usize {
        let mut count = 0;
        for binding in self.bindings_named(name) {
            binding.tag = tag.clone();
            count += 1;
        }
        debug!("Retag {} bindings from {} to {}", count, name, tag.name);
        count
    }

    /// Replace the template of every binding named `name` (on all devices) with an edited
    /// version. Returns the number of updated bindings.
    pub fn rebind(&mut self, name: &str, template: &PortTemplate) -> usize {
        let mut count = 0;
        for binding in self.bindings_named(name) {
            binding.template = template.clone();
            count += 1;
        }
        debug!("Rebind {} interfaces to the edited template {}", count, name);
        count
    }

    /// Remove every binding named `name` (on all devices). Returns the number of removed
    /// bindings.
    pub fn unassign_template(&mut self, name: &str) -> usize {
        let mut count = 0;
        for entry in self.devices.values_mut() {
            let before = entry.bindings.len();
            entry.bindings.retain(|_, b| b.tag.name != name);
            count += before - entry.bindings.len();
        }
        debug!("Unassign template {} from {} interfaces", name, count);
        count
    }
}
