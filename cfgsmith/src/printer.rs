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

//! # Helper (printer) functions
//! Module containing helper functions to render generated scripts, violations and device models
//! as text, for displaying them or exporting them to a file.

use crate::model::DeviceModel;
use crate::script::ConfigScript;
use crate::validate::Violations;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Options for exporting a script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Number of spaces by which each nested block is indented (0 for a flat script)
    pub indent: usize,
    /// Prepend `enable` to enter the privileged mode before `configure terminal`
    pub privileged_prelude: bool,
    /// Append `write memory` to store the configuration after `end`
    pub save: bool,
}

/// Get the exported lines of the script, including the prelude and the save command if
/// requested. Nested commands are indented by their block depth.
pub fn script_lines(script: &ConfigScript, options: &ExportOptions) -> Vec<String> {
    let mut result = Vec::with_capacity(script.len() + 2);
    if options.privileged_prelude {
        result.push(String::from("enable"));
    }
    result.extend(
        script
            .cli_lines()
            .iter()
            .map(|l| format!("{}{}", " ".repeat(l.depth * options.indent), l.text)),
    );
    if options.save {
        result.push(String::from("write memory"));
    }
    result
}

/// Render the script as text, one command per line.
pub fn script(script: &ConfigScript, options: &ExportOptions) -> String {
    let mut result = script_lines(script, options).join("\n");
    result.push('\n');
    result
}

/// Get one line per violation, formatted as `<field>: <message> (<constraint>)`.
pub fn violations(violations: &Violations) -> Vec<String> {
    violations.iter().map(|v| format!("{} ({})", v, v.constraint)).collect()
}

/// Returns a formatted one-line summary of a device model, listing its capabilities and the
/// number of interfaces of each type.
pub fn model(model: &DeviceModel) -> String {
    let capabilities = model.capabilities().join(", ");
    let ports = model
        .interfaces()
        .iter()
        .group_by(|i| i.kind())
        .into_iter()
        .map(|(kind, group)| format!("{}x {}", group.count(), kind.name()))
        .join(", ");
    format!("{}: {} [{}]", model.name(), ports, capabilities)
}
