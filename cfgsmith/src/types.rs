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

//! Module containing the identifiers and error types shared by all components.

use crate::validate::Violations;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identification of a device template inside a [`Project`](crate::Project).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device-{}", self.0)
    }
}

/// The three kinds of device templates, without their data.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Router (no switchport concept)
    Router,
    /// Layer-2 switch
    SwitchL2,
    /// Layer-3 switch, a superset of the layer-2 switch
    SwitchL3,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Router => "router",
            Self::SwitchL2 => "layer-2 switch",
            Self::SwitchL3 => "layer-3 switch",
        })
    }
}

/// Capabilities that a hardware model may or may not provide.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCapability {
    /// The model can switch frames (has switchports)
    Switching,
    /// The model can route packets
    Routing,
    /// The model provides Power over Ethernet
    Poe,
    /// The model supports a voice VLAN on access ports
    Voice,
}

impl fmt::Display for ModelCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Switching => "switching",
            Self::Routing => "routing",
            Self::Poe => "PoE",
            Self::Voice => "voice VLAN",
        })
    }
}

/// Physical interface type. The order of the variants is the order in which interfaces of
/// different types are listed.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum InterfaceKind {
    /// Ethernet (10 Mbit/s, or the generic name on some platforms)
    Ethernet,
    /// FastEthernet (100 Mbit/s)
    FastEthernet,
    /// GigabitEthernet (1 Gbit/s)
    GigabitEthernet,
    /// TenGigabitEthernet (10 Gbit/s)
    TenGigabitEthernet,
}

impl InterfaceKind {
    /// Full name of the interface type, as used in the configuration
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ethernet => "Ethernet",
            Self::FastEthernet => "FastEthernet",
            Self::GigabitEthernet => "GigabitEthernet",
            Self::TenGigabitEthernet => "TenGigabitEthernet",
        }
    }

    /// Abbreviated name of the interface type
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Ethernet => "Eth",
            Self::FastEthernet => "Fa",
            Self::GigabitEthernet => "Gi",
            Self::TenGigabitEthernet => "Te",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "ethernet" | "eth" | "e" => Some(Self::Ethernet),
            "fastethernet" | "fa" | "f" => Some(Self::FastEthernet),
            "gigabitethernet" | "gi" | "g" => Some(Self::GigabitEthernet),
            "tengigabitethernet" | "te" | "tengig" => Some(Self::TenGigabitEthernet),
            _ => None,
        }
    }
}

/// # Physical interface identifier
/// An interface is identified by its type and the numeric path (`slot/port`, or
/// `slot/module/port`). Interfaces are ordered by type first, and then numerically by the path,
/// such that `GigabitEthernet0/2` comes before `GigabitEthernet0/10`.
///
/// ```
/// # use cfgsmith::InterfaceId;
/// let a: InterfaceId = "Gi0/2".parse().unwrap();
/// let b: InterfaceId = "GigabitEthernet0/10".parse().unwrap();
/// assert!(a < b);
/// assert_eq!(a.to_string(), "GigabitEthernet0/2");
/// ```
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceId {
    kind: InterfaceKind,
    path: Vec<u16>,
}

impl InterfaceId {
    /// Create a new interface identifier. The path must contain between one and three numbers.
    pub fn new(kind: InterfaceKind, path: Vec<u16>) -> Result<Self, ConstructionError> {
        if path.is_empty() || path.len() > 3 {
            return Err(ConstructionError::InvalidFormat {
                field: "interface",
                value: format!("{}{:?}", kind.name(), path),
                expected: "one to three path components",
            });
        }
        Ok(Self { kind, path })
    }

    /// Type of the interface
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Numeric path of the interface
    pub fn path(&self) -> &[u16] {
        &self.path
    }

    /// Abbreviated name, like `Gi0/1`
    pub fn short_name(&self) -> String {
        format!("{}{}", self.kind.short_name(), self.path_str())
    }

    fn path_str(&self) -> String {
        self.path.iter().map(|x| x.to_string()).collect::<Vec<_>>().join("/")
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.name(), self.path_str())
    }
}

impl FromStr for InterfaceId {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConstructionError::InvalidFormat {
            field: "interface",
            value: s.to_string(),
            expected: "an interface name like GigabitEthernet0/1 or Gi0/1",
        };
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_alphabetic()).ok_or_else(err)?;
        let kind = InterfaceKind::from_prefix(&s[..split]).ok_or_else(err)?;
        let path = s[split..]
            .trim()
            .split('/')
            .map(|x| x.parse::<u16>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| err())?;
        Self::new(kind, path).map_err(|_| err())
    }
}

impl TryFrom<String> for InterfaceId {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InterfaceId> for String {
    fn from(iface: InterfaceId) -> String {
        iface.to_string()
    }
}

/// # Construction Error
/// A field value was rejected at the point of mutation. The error always names the offending
/// field. A rejected value never enters the template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// The value lies outside of the allowed range
    #[error("{field}: value {value} is outside of the range {min}..={max}")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Rejected value
        value: i64,
        /// Smallest allowed value
        min: i64,
        /// Largest allowed value
        max: i64,
    },
    /// The value cannot be parsed
    #[error("{field}: invalid value {value:?}, expected {expected}")]
    InvalidFormat {
        /// Offending field
        field: &'static str,
        /// Rejected value
        value: String,
        /// Description of the expected format
        expected: &'static str,
    },
    /// The value conflicts with another field of the same template
    #[error("{field}: {reason}")]
    Incompatible {
        /// Offending field
        field: &'static str,
        /// Why the values are incompatible
        reason: String,
    },
    /// The field does not exist on this kind of device template
    #[error("{field} cannot be configured on a {device} template")]
    UnsupportedByDevice {
        /// Offending field
        field: &'static str,
        /// Kind of device template
        device: DeviceClass,
    },
    /// The hardware model lacks a capability needed by the field
    #[error("{field} requires {capability} support, which model {model} does not provide")]
    UnsupportedByModel {
        /// Offending field
        field: &'static str,
        /// Name of the hardware model
        model: String,
        /// Missing capability
        capability: ModelCapability,
    },
}

impl ConstructionError {
    /// Returns the name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::Incompatible { field, .. }
            | Self::UnsupportedByDevice { field, .. }
            | Self::UnsupportedByModel { field, .. } => field,
        }
    }

    /// Rename the offending field. This is used by setters to report the template field instead
    /// of the name of the value type.
    pub fn in_field(mut self, name: &'static str) -> Self {
        match &mut self {
            Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::Incompatible { field, .. }
            | Self::UnsupportedByDevice { field, .. }
            | Self::UnsupportedByModel { field, .. } => *field = name,
        }
        self
    }
}

/// Check that a value lies in the inclusive range, and report the field otherwise.
pub(crate) fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ConstructionError> {
    if value < min || value > max {
        Err(ConstructionError::OutOfRange { field, value, min, max })
    } else {
        Ok(())
    }
}

/// A registry operation named an interface that the device model does not declare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Interface {interface} is not declared by the model of {device}")]
pub struct UnknownInterfaceError {
    /// Device on which the interface was looked up
    pub device: DeviceId,
    /// The undeclared interface
    pub interface: InterfaceId,
}

/// Registry Errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The interface is not declared by the device model
    #[error("{0}")]
    UnknownInterface(#[from] UnknownInterfaceError),
    /// The device was never registered
    #[error("Device {0} is not known to the interface registry")]
    UnknownDevice(DeviceId),
    /// The device has no switchports, so port templates cannot be bound to it
    #[error("Device {0} has no switchports")]
    NoSwitchports(DeviceId),
}

/// Generation was requested for a template graph that does not pass validation. This is a
/// programming error of the caller, which must validate first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Cannot generate the configuration, the template graph has {} violation(s)",
    .violations.len()
)]
pub struct GenerationPreconditionError {
    /// All violations found during the validation
    pub violations: Violations,
}
