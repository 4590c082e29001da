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

//! # Configuration Generation Engine
//! Lowers a validated template graph into an ordered [`ConfigScript`]. The traversal is pure:
//! it never mutates the templates, and identical graphs always produce identical scripts.
//!
//! The script is emitted in the following order, such that every definition precedes its first
//! reference:
//!
//! 1. `configure terminal`
//! 2. hostname and domain name
//! 3. VLAN definitions
//! 4. spanning tree, logging, SNMP, SPAN, AAA, SSH and switch services
//! 5. management interface
//! 6. layer-3 definitions: `ip routing`, ACLs, NAT, DHCP, VRFs, static routes, OSPF and EIGRP
//! 7. interface blocks, ascending by interface identifier
//! 8. SVI blocks, ascending by VLAN
//! 9. `end`

use crate::registry::InterfaceRegistry;
use crate::script::{ConfigScript, ScriptWriter};
use crate::template::{DeviceKind, DeviceTemplate};
use crate::types::GenerationPreconditionError;
use crate::validate::{validate_graph, Validated, ValidationOptions};
use log::*;

/// Validate the template graph of the device, and generate its configuration script. Fails with
/// [`GenerationPreconditionError`] (carrying all violations) if the graph is invalid, without
/// producing any output.
pub fn generate(
    device: &DeviceTemplate,
    registry: &InterfaceRegistry,
    options: &ValidationOptions,
) -> Result<ConfigScript, GenerationPreconditionError> {
    Ok(validate_graph(device, registry, options)?.generate())
}

impl<'a> Validated<'a> {
    /// Generate the configuration script. This cannot fail, since the graph was validated.
    pub fn generate(&self) -> ConfigScript {
        let device = self.device;
        let mut w = ScriptWriter::new();
        w.line("configure terminal");

        let routed = match device.kind() {
            DeviceKind::Router => true,
            DeviceKind::SwitchL2 => false,
            DeviceKind::SwitchL3(l3) => l3.routing_enabled(),
        };
        device.base().write(&mut w);
        if let Some(l3) = device.l3() {
            l3.write_routing(&mut w);
        }
        device.base().write_gateway(&mut w, routed);
        if let Some(l3) = device.l3() {
            l3.write_globals(&mut w);
        }

        // the ports are already sorted by the registry
        for (iface, template) in self.ports.iter() {
            template.write_block(iface, &mut w);
        }

        if let Some(l3) = device.l3() {
            l3.write_svis(&mut w);
        }

        w.line("end");
        let script = w.finish();
        info!(
            "Generated {} commands for {} ({} interfaces)",
            script.len(),
            device.hostname(),
            self.ports.len()
        );
        script
    }
}
