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

#![deny(missing_docs)]

//! # CfgSmith: Template-Based Network Device Configuration Compiler
//! This is a library for describing the configuration of Cisco-style routers and switches as
//! strongly typed templates, and for lowering these templates into ordered IOS command scripts.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`Values`](values)**: Enumerations and bounded value types (VLAN ids, MAC addresses,
//!   speed, duplex, violation actions, ...). Invalid values cannot be constructed.
//!
//! - **[`Templates`](template)**: Port templates
//!   ([`AccessPortTemplate`](template::AccessPortTemplate) and
//!   [`TrunkPortTemplate`](template::TrunkPortTemplate)) and device templates
//!   ([`DeviceTemplate`](template::DeviceTemplate)) for routers, layer-2 and layer-3 switches.
//!   Every template is changed through setters, which reject invalid values with a
//!   [`ConstructionError`] naming the offending field.
//!
//! - **[`Registry`](registry)**: Binds port templates to the interfaces declared by the
//!   [device model](model::DeviceModel) of a switch.
//!
//! - **[`Validation`](validate)**: Cross-checks a device template and all port templates bound
//!   to its interfaces, collecting every [violation](validate::Violation).
//!
//! - **[`Generation`](generate)**: Lowers a validated template graph into a deterministic
//!   [`ConfigScript`].
//!
//! - **[`Project`]**: Process-scoped state holding devices, a library of named port templates,
//!   the registry and the last applied scripts.
//!
//! ## Usage
//!
//! ```
//! use cfgsmith::{catalog, generate, DeviceId, Error};
//! use cfgsmith::registry::{DisplayTag, InterfaceRegistry};
//! use cfgsmith::template::{AccessPortTemplate, DeviceTemplate, PortSettings};
//! use cfgsmith::values::ViolationAction;
//!
//! fn main() -> Result<(), Error> {
//!     // prepare the device
//!     let mut switch = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24())?;
//!     switch.set_hostname("ACC-01")?.define_vlan(10, Some("USERS"))?;
//!
//!     // prepare the port template
//!     let mut users = AccessPortTemplate::new();
//!     users
//!         .set_access_vlan(10)?
//!         .set_max_mac_count(1)?
//!         .set_violation_action(ViolationAction::Shutdown)
//!         .set_portfast(true);
//!
//!     // bind it to an interface
//!     let mut registry = InterfaceRegistry::new();
//!     registry.register(&switch)?;
//!     let tag = DisplayTag::new("USERS", Default::default());
//!     registry.assign(switch.id(), "Fa0/1".parse()?, users.into(), tag)?;
//!
//!     // validate and generate the configuration
//!     let script = generate(&switch, &registry, &Default::default())?;
//!     assert!(script.contains("switchport port-security violation shutdown"));
//!     Ok(())
//! }
//! ```

mod test;

pub mod catalog;
mod color;
mod error;
pub mod generate;
pub mod model;
pub mod printer;
pub mod project;
pub mod registry;
mod script;
pub mod template;
mod types;
pub mod validate;
pub mod values;

pub use color::Color;
pub use error::Error;
pub use generate::generate;
pub use project::Project;
pub use script::{CliLine, ConfigScript};
pub use types::{
    ConstructionError, DeviceClass, DeviceId, GenerationPreconditionError, InterfaceId,
    InterfaceKind, ModelCapability, RegistryError, UnknownInterfaceError,
};
pub use validate::{validate, validate_graph};
