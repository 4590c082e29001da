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

//! # Feature Value Types
//!
//! Closed enumerations and bounded scalars used by the templates. Every type in this module can
//! only hold legal values: invalid input is rejected when the value is constructed (or
//! deserialized), never later during generation.

mod address;
mod names;
mod settings;
mod vlan;

pub use address::{InterfaceAddress, Ipv4Net, MacAddress, Netmask};
pub use names::{Description, Hostname, Name, Secret};
pub use settings::{
    AuthMethod, ChannelMode, ChannelProtocol, Duplex, DtpMode, Encapsulation, LoggingLevel,
    MaxMacCount, NatSide, PoeMode, QosTrust, RateLimit, SnmpAccess, Speed, StormThreshold,
    StormTraffic, StormUnit, StpMode, StpPriority, ViolationAction,
};
pub use vlan::{VlanId, VlanSet};
