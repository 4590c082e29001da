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

//! # Project
//! Process-scoped state of the compiler: the device templates, a library of named port templates,
//! the interface registry and the last applied configuration of each device. A project is
//! created once, passed by reference to its collaborators, and dropped at exit.

use crate::color::Color;
use crate::model::DeviceModel;
use crate::registry::{DisplayTag, InterfaceRegistry};
use crate::script::ConfigScript;
use crate::template::{DeviceConfig, DeviceTemplate, PortTemplate};
use crate::types::{
    ConstructionError, DeviceClass, DeviceId, GenerationPreconditionError, InterfaceId,
    RegistryError,
};
use crate::validate::{validate, validate_graph, ValidationOptions, Violations};
use log::*;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors of project operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// The device does not exist
    #[error("Device {0} does not exist")]
    UnknownDevice(DeviceId),
    /// No device has the given hostname
    #[error("No device has the hostname {0}")]
    UnknownHostname(String),
    /// The template library has no template with the given name
    #[error("Template {0:?} does not exist")]
    UnknownTemplate(String),
    /// The template library already contains a template with the given name
    #[error("Template {0:?} already exists")]
    DuplicateTemplate(String),
    /// Error of the interface registry
    #[error("Registry Error: {0}")]
    Registry(#[from] RegistryError),
    /// A field value was rejected
    #[error("Construction Error: {0}")]
    Construction(#[from] ConstructionError),
    /// The template graph did not pass the validation, nothing was generated
    #[error("{0}")]
    Rejected(#[from] GenerationPreconditionError),
}

/// Port template stored in the library, together with its colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    template: PortTemplate,
    color: Color,
}

impl LibraryEntry {
    /// The template
    pub fn template(&self) -> &PortTemplate {
        &self.template
    }

    /// Colour of the template
    pub fn color(&self) -> Color {
        self.color
    }
}

/// # Project
/// All state of a running compiler session.
///
/// ```
/// use cfgsmith::{catalog, DeviceClass, Project, template::AccessPortTemplate};
///
/// # fn main() -> Result<(), cfgsmith::project::ProjectError> {
/// let mut project = Project::new();
/// let sw = project.add_device(catalog::access_24(), DeviceClass::SwitchL2)?;
/// project.modify_device(sw, |d| d.define_vlan(10, Some("USERS")).map(|_| ()))?;
///
/// let mut users = AccessPortTemplate::new();
/// users.set_access_vlan(10)?;
/// let name = project.add_template(users.into(), None);
/// assert_eq!(name, "VLAN 10");
///
/// project.assign(sw, "Fa0/1".parse()?, &name)?;
/// let script = project.apply(sw)?;
/// assert!(script.contains("switchport access vlan 10"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Project {
    devices: BTreeMap<DeviceId, DeviceTemplate>,
    next_id: u32,
    library: BTreeMap<String, LibraryEntry>,
    registry: InterfaceRegistry,
    outputs: BTreeMap<DeviceId, ConfigScript>,
    options: ValidationOptions,
}

impl Project {
    /// Create an empty project with the default validation options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty project with the given validation options
    pub fn with_options(options: ValidationOptions) -> Self {
        Self { options, ..Default::default() }
    }

    /// Validation options
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Change the validation options. Already applied outputs are kept.
    pub fn set_options(&mut self, options: ValidationOptions) {
        self.options = options;
    }

    /// The interface registry
    pub fn registry(&self) -> &InterfaceRegistry {
        &self.registry
    }

    // devices

    fn insert_device(&mut self, device: DeviceTemplate) -> Result<DeviceId, ProjectError> {
        let id = device.id();
        if device.supports_switching() {
            self.registry.register(&device)?;
        }
        info!("Add {} {} ({})", device.class(), device.hostname(), device.model().name());
        self.devices.insert(id, device);
        self.next_id += 1;
        Ok(id)
    }

    /// Create an empty device template. Switches are registered in the interface registry.
    pub fn add_device(
        &mut self,
        model: DeviceModel,
        class: DeviceClass,
    ) -> Result<DeviceId, ProjectError> {
        let device = DeviceTemplate::new(DeviceId(self.next_id), model, class)?;
        self.insert_device(device)
    }

    /// Create a device template from a stored configuration.
    pub fn add_device_from_config(
        &mut self,
        model: DeviceModel,
        config: DeviceConfig,
    ) -> Result<DeviceId, ProjectError> {
        let device = DeviceTemplate::from_config(DeviceId(self.next_id), model, config)?;
        self.insert_device(device)
    }

    /// Get a device template
    pub fn device(&self, id: DeviceId) -> Option<&DeviceTemplate> {
        self.devices.get(&id)
    }

    /// Iterate over all device templates, ordered by their id
    pub fn devices(&self) -> impl Iterator<Item = &DeviceTemplate> {
        self.devices.values()
    }

    /// Find a device by its hostname
    pub fn find_device(&self, hostname: &str) -> Result<DeviceId, ProjectError> {
        self.devices
            .values()
            .find(|d| d.hostname().as_str() == hostname)
            .map(|d| d.id())
            .ok_or_else(|| ProjectError::UnknownHostname(hostname.to_string()))
    }

    /// Change a device template through its setters. The device is left unchanged if `f` fails.
    pub fn modify_device<F, R>(&mut self, id: DeviceId, f: F) -> Result<R, ProjectError>
    where
        F: FnOnce(&mut DeviceTemplate) -> Result<R, ConstructionError>,
    {
        let device = self.devices.get_mut(&id).ok_or(ProjectError::UnknownDevice(id))?;
        let mut modified = device.clone();
        let result = f(&mut modified)?;
        *device = modified;
        Ok(result)
    }

    /// Remove a device, together with all its interface bindings and its applied output.
    pub fn remove_device(&mut self, id: DeviceId) -> Result<DeviceTemplate, ProjectError> {
        let device = self.devices.remove(&id).ok_or(ProjectError::UnknownDevice(id))?;
        self.registry.remove_device(id);
        self.outputs.remove(&id);
        info!("Remove {}", device.hostname());
        Ok(device)
    }

    // template library

    /// Generate a name for a new template which is not yet used in the library: `VLAN <id>`,
    /// `TRUNK <id>`, `TRUNK` or `Custom template`, followed by ` (<n>)` if needed.
    pub fn unique_template_name(&self, template: &PortTemplate) -> String {
        let base = template.suggested_name();
        let mut name = base.clone();
        let mut idx = 1;
        while self.library.contains_key(&name) {
            idx += 1;
            name = format!("{} ({})", base, idx);
        }
        name
    }

    /// Add a template to the library under a generated name, which is returned. The colour
    /// defaults to [`Color::default`].
    pub fn add_template(&mut self, template: PortTemplate, color: Option<Color>) -> String {
        let name = self.unique_template_name(&template);
        debug!("Add template {}", name);
        let color = color.unwrap_or_default();
        self.library.insert(name.clone(), LibraryEntry { template, color });
        name
    }

    /// Add a template to the library under the given name.
    pub fn insert_template(
        &mut self,
        name: &str,
        template: PortTemplate,
        color: Color,
    ) -> Result<(), ProjectError> {
        if self.library.contains_key(name) {
            return Err(ProjectError::DuplicateTemplate(name.to_string()));
        }
        debug!("Add template {}", name);
        self.library.insert(name.to_string(), LibraryEntry { template, color });
        Ok(())
    }

    /// Get a template of the library
    pub fn template(&self, name: &str) -> Option<&LibraryEntry> {
        self.library.get(name)
    }

    /// Iterate over all templates of the library, ordered by name
    pub fn templates(&self) -> impl Iterator<Item = (&str, &LibraryEntry)> {
        self.library.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// Edit a template of the library. The edit works on a copy: if `f` fails, the template is
    /// unchanged. On success, every interface bound to the template is rebound to the edited
    /// version. Returns the number of rebound interfaces.
    pub fn update_template<F>(&mut self, name: &str, f: F) -> Result<usize, ProjectError>
    where
        F: FnOnce(&mut PortTemplate) -> Result<(), ConstructionError>,
    {
        let entry =
            self.library.get_mut(name).ok_or_else(|| ProjectError::UnknownTemplate(name.into()))?;
        let mut template = entry.template.clone();
        f(&mut template)?;
        entry.template = template;
        Ok(self.registry.rebind(name, &entry.template))
    }

    /// Rename a template of the library, and retag all its bindings.
    pub fn rename_template(&mut self, name: &str, new_name: &str) -> Result<(), ProjectError> {
        if self.library.contains_key(new_name) {
            return Err(ProjectError::DuplicateTemplate(new_name.to_string()));
        }
        let entry =
            self.library.remove(name).ok_or_else(|| ProjectError::UnknownTemplate(name.into()))?;
        self.registry.retag(name, DisplayTag::new(new_name, entry.color));
        self.library.insert(new_name.to_string(), entry);
        Ok(())
    }

    /// Change the colour of a template, and retag all its bindings.
    pub fn set_template_color(&mut self, name: &str, color: Color) -> Result<(), ProjectError> {
        let entry =
            self.library.get_mut(name).ok_or_else(|| ProjectError::UnknownTemplate(name.into()))?;
        entry.color = color;
        self.registry.retag(name, DisplayTag::new(name, color));
        Ok(())
    }

    /// Remove a template from the library. All interfaces bound to it revert to the
    /// unconfigured default.
    pub fn remove_template(&mut self, name: &str) -> Result<PortTemplate, ProjectError> {
        let entry =
            self.library.remove(name).ok_or_else(|| ProjectError::UnknownTemplate(name.into()))?;
        let count = self.registry.unassign_template(name);
        info!("Remove template {} ({} interfaces unassigned)", name, count);
        Ok(entry.template)
    }

    // bindings

    /// Bind a copy of a library template to an interface of a device.
    pub fn assign(
        &mut self,
        device: DeviceId,
        iface: InterfaceId,
        template: &str,
    ) -> Result<(), ProjectError> {
        match self.devices.get(&device) {
            None => return Err(ProjectError::UnknownDevice(device)),
            Some(d) if !d.supports_switching() => {
                return Err(RegistryError::NoSwitchports(device).into());
            }
            Some(_) => {}
        }
        let entry = self
            .library
            .get(template)
            .ok_or_else(|| ProjectError::UnknownTemplate(template.into()))?;
        let tag = DisplayTag::new(template, entry.color);
        self.registry.assign(device, iface, entry.template.clone(), tag)?;
        Ok(())
    }

    /// Clear the binding of an interface.
    pub fn unassign(&mut self, device: DeviceId, iface: &InterfaceId) -> Result<(), ProjectError> {
        self.registry.unassign(device, iface)?;
        Ok(())
    }

    // apply

    /// Validate the template graph of a device.
    pub fn validate(&self, id: DeviceId) -> Result<Violations, ProjectError> {
        let device = self.devices.get(&id).ok_or(ProjectError::UnknownDevice(id))?;
        Ok(validate(device, &self.registry, &self.options))
    }

    /// Validate and generate the configuration of a device as one step. On success, the script
    /// replaces the previous output of the device. If the validation fails, nothing is generated,
    /// the previous output is kept, and all violations are returned.
    pub fn apply(&mut self, id: DeviceId) -> Result<&ConfigScript, ProjectError> {
        let device = self.devices.get(&id).ok_or(ProjectError::UnknownDevice(id))?;
        let script = match validate_graph(device, &self.registry, &self.options) {
            Ok(validated) => validated.generate(),
            Err(e) => {
                for violation in e.violations.iter() {
                    warn!("{}: {}", device.hostname(), violation);
                }
                return Err(e.into());
            }
        };
        info!("Applied {}", device.hostname());
        self.outputs.insert(id, script);
        self.outputs.get(&id).ok_or(ProjectError::UnknownDevice(id))
    }

    /// Last applied output of a device
    pub fn output(&self, id: DeviceId) -> Option<&ConfigScript> {
        self.outputs.get(&id)
    }
}
