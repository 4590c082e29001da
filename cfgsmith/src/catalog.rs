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

//! Built-in hardware models.

use crate::model::DeviceModel;
use crate::types::{InterfaceKind::*, ModelCapability::*};

/// 24 FastEthernet access ports and two gigabit uplinks, layer 2 only.
pub fn access_24() -> DeviceModel {
    DeviceModel::new("C2960-24TT-L")
        .with(Switching)
        .with(Voice)
        .with_ports(FastEthernet, &[0], 1..=24)
        .with_ports(GigabitEthernet, &[0], 1..=2)
}

/// 48 gigabit PoE+ access ports and four 10G uplinks, layer 2 only.
pub fn access_poe_48() -> DeviceModel {
    DeviceModel::new("C2960X-48FPD-L")
        .with(Switching)
        .with(Poe)
        .with(Voice)
        .with_ports(GigabitEthernet, &[1, 0], 1..=48)
        .with_ports(TenGigabitEthernet, &[1, 0], 1..=2)
}

/// 24 gigabit PoE+ ports and four 10G uplinks, with layer-3 routing.
pub fn l3_poe_24() -> DeviceModel {
    DeviceModel::new("C3650-24PS")
        .with(Switching)
        .with(Routing)
        .with(Poe)
        .with(Voice)
        .with_ports(GigabitEthernet, &[1, 0], 1..=24)
        .with_ports(TenGigabitEthernet, &[1, 1], 1..=4)
}

/// Branch router with three routed gigabit ports.
pub fn branch_router() -> DeviceModel {
    DeviceModel::new("ISR4331")
        .with(Routing)
        .with_ports(GigabitEthernet, &[0, 0], 0..=2)
}

/// All built-in models
pub fn all() -> Vec<DeviceModel> {
    vec![access_24(), access_poe_48(), l3_poe_24(), branch_router()]
}

/// Look up a built-in model by name (case-insensitive).
pub fn find(name: &str) -> Option<DeviceModel> {
    all().into_iter().find(|m| m.name().eq_ignore_ascii_case(name))
}
