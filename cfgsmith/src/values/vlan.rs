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

//! VLAN identifiers and ordered VLAN sets.

use crate::types::{check_range, ConstructionError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// IEEE 802.1Q VLAN identifier in the range 1-4094. VLAN 0 and 4095 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Smallest valid VLAN ID
    pub const MIN: u16 = 1;
    /// Largest valid VLAN ID
    pub const MAX: u16 = 4094;

    /// Create a new VLAN ID, failing if it lies outside of 1-4094.
    pub fn new(id: u16) -> Result<Self, ConstructionError> {
        check_range("vlan", id as i64, Self::MIN as i64, Self::MAX as i64)?;
        Ok(Self(id))
    }

    /// Returns the numeric VLAN ID
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ConstructionError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> u16 {
        vlan.0
    }
}

impl FromStr for VlanId {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = if trimmed.to_ascii_lowercase().starts_with("vlan") {
            &trimmed[4..]
        } else {
            trimmed
        };
        let id = digits.parse::<u16>().map_err(|_| ConstructionError::InvalidFormat {
            field: "vlan",
            value: s.to_string(),
            expected: "a number between 1 and 4094",
        })?;
        Self::new(id)
    }
}

/// # Ordered VLAN set
/// Set of VLANs without duplicates, always iterated in ascending order. The textual form is the
/// compressed range list used by the switch CLI, e.g., `10,20-22,30`.
///
/// ```
/// # use cfgsmith::values::VlanSet;
/// let set: VlanSet = "30,10,20-22,21".parse().unwrap();
/// assert_eq!(set.to_string(), "10,20-22,30");
/// assert_eq!(set.len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VlanSet(BTreeSet<VlanId>);

impl VlanSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from raw numbers, failing on the first invalid VLAN ID.
    pub fn from_ids<I: IntoIterator<Item = u16>>(ids: I) -> Result<Self, ConstructionError> {
        ids.into_iter().map(VlanId::new).collect::<Result<BTreeSet<_>, _>>().map(Self)
    }

    /// Insert a VLAN. Returns `false` if it was already present.
    pub fn insert(&mut self, vlan: VlanId) -> bool {
        self.0.insert(vlan)
    }

    /// Remove a VLAN. Returns `true` if it was present.
    pub fn remove(&mut self, vlan: VlanId) -> bool {
        self.0.remove(&vlan)
    }

    /// Returns `true` if the VLAN is part of the set.
    pub fn contains(&self, vlan: VlanId) -> bool {
        self.0.contains(&vlan)
    }

    /// Number of VLANs in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all VLANs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = VlanId> + '_ {
        self.0.iter().copied()
    }

    /// Group the set into inclusive ranges of consecutive VLAN IDs.
    pub fn ranges(&self) -> Vec<(VlanId, VlanId)> {
        let mut ranges: Vec<(VlanId, VlanId)> = Vec::new();
        for vlan in self.iter() {
            match ranges.last_mut() {
                Some((_, end)) if end.get() + 1 == vlan.get() => *end = vlan,
                _ => ranges.push((vlan, vlan)),
            }
        }
        ranges
    }
}

impl fmt::Display for VlanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self
            .ranges()
            .into_iter()
            .map(|(start, end)| {
                if start == end {
                    start.to_string()
                } else {
                    format!("{}-{}", start, end)
                }
            })
            .join(",");
        f.write_str(&repr)
    }
}

impl FromStr for VlanSet {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = Self::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once('-') {
                Some((start, end)) => {
                    let start: VlanId = start.parse()?;
                    let end: VlanId = end.parse()?;
                    if start > end {
                        return Err(ConstructionError::InvalidFormat {
                            field: "vlan",
                            value: token.to_string(),
                            expected: "an ascending range like 10-20",
                        });
                    }
                    for id in start.get()..=end.get() {
                        set.insert(VlanId(id));
                    }
                }
                None => {
                    set.insert(token.parse()?);
                }
            }
        }
        Ok(set)
    }
}

impl TryFrom<String> for VlanSet {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VlanSet> for String {
    fn from(set: VlanSet) -> String {
        set.to_string()
    }
}

impl FromIterator<VlanId> for VlanSet {
    fn from_iter<T: IntoIterator<Item = VlanId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<VlanId> for VlanSet {
    fn extend<T: IntoIterator<Item = VlanId>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}
