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


//! # Project files
//!
//! A project file is a JSON document holding the template library, the devices (hardware model
//! and configuration) and the bindings of library templates to the interfaces of each device.
//!
//! ```json
//! {
//!   "options": { "native_vlan_policy": "exclude" },
//!   "templates": {
//!     "USERS": { "color": "#336699", "template": { "mode": "access", "access_vlan": 10 } }
//!   },
//!   "devices": [
//!     {
//!       "model": "C2960-24TT-L",
//!       "config": { "base": { "hostname": "ACC-01", "vlans": { "10": "USERS" } },
//!                   "kind": "switch_l2" },
//!       "ports": { "Fa0/1": "USERS" }
//!     }
//!   ]
//! }
//! ```

use cfgsmith::template::{DeviceConfig, PortTemplate};
use cfgsmith::validate::ValidationOptions;
use cfgsmith::{catalog, Color, InterfaceId, Project};
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Errors while reading or interpreting a project file
#[derive(Debug, Error)]
pub enum ProjectFileError {
    #[error("Cannot read the project file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown device model {0:?}")]
    UnknownModel(String),
    #[error("Hostname {0} is used by more than one device")]
    DuplicateHostname(String),
    #[error("{0}")]
    Project(#[from] cfgsmith::Error),
}

impl From<cfgsmith::project::ProjectError> for ProjectFileError {
    fn from(cause: cfgsmith::project::ProjectError) -> Self {
        Self::Project(cause.into())
    }
}

/// Library entry of a project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    #[serde(default)]
    pub color: Option<Color>,
    pub template: PortTemplate,
}

/// Device of a project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Name of a model from the built-in catalog
    pub model: String,
    pub config: DeviceConfig,
    /// Library template bound to each interface
    #[serde(default)]
    pub ports: BTreeMap<InterfaceId, String>,
}

/// Content of a project file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    pub options: ValidationOptions,
    pub templates: BTreeMap<String, TemplateEntry>,
    pub devices: Vec<DeviceEntry>,
}

impl ProjectFile {
    /// Read a project file from disk
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ProjectFileError> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Build the project. Templates are added to the library first, then every device is
    /// created and its ports are bound.
    pub fn into_project(self) -> Result<Project, ProjectFileError> {
        let mut project = Project::with_options(self.options);
        for (name, entry) in self.templates {
            project.insert_template(&name, entry.template, entry.color.unwrap_or_default())?;
        }

        let mut hostnames = BTreeSet::new();
        for entry in self.devices {
            let hostname = entry.config.base.hostname().to_string();
            if !hostnames.insert(hostname.clone()) {
                return Err(ProjectFileError::DuplicateHostname(hostname));
            }
            let model = catalog::find(&entry.model)
                .ok_or_else(|| ProjectFileError::UnknownModel(entry.model.clone()))?;
            let id = project.add_device_from_config(model, entry.config)?;
            for (iface, template) in entry.ports {
                project.assign(id, iface, &template)?;
            }
        }
        info!(
            "Loaded {} devices and {} templates",
            project.devices().count(),
            project.templates().count()
        );
        Ok(project)
    }

    /// Capture the state of a project
    pub fn from_project(project: &Project) -> Self {
        let templates = project
            .templates()
            .map(|(name, entry)| {
                let template = entry.template().clone();
                (name.to_string(), TemplateEntry { color: Some(entry.color()), template })
            })
            .collect();
        let devices = project
            .devices()
            .map(|device| {
                let ports = match project.registry().bindings(device.id()) {
                    Ok(bindings) => {
                        bindings.map(|(iface, b)| (iface.clone(), b.tag().name.clone())).collect()
                    }
                    Err(_) => BTreeMap::new(),
                };
                DeviceEntry {
                    model: device.model().name().to_string(),
                    config: device.config(),
                    ports,
                }
            })
            .collect();
        Self { options: *project.options(), templates, devices }
    }
}
