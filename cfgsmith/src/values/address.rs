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

//! Layer-2 and layer-3 addresses.

use crate::types::{check_range, ConstructionError};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// 48-bit Ethernet MAC address, printed in the dotted notation of the switch CLI
/// (`0011.2233.4455`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Create a MAC address from its raw bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Returns `true` if the group bit is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(f, "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}", b[0], b[1], b[2], b[3], b[4], b[5])
    }
}

impl FromStr for MacAddress {
    type Err = ConstructionError;

    /// Accepts `00:11:22:33:44:55`, `00-11-22-33-44-55` and `0011.2233.4455`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConstructionError::InvalidFormat {
            field: "mac_address",
            value: s.to_string(),
            expected: "a MAC address like 0011.2233.4455",
        };
        let hex: String = s.chars().filter(|c| !matches!(c, ':' | '-' | '.')).collect();
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let separators = s.len() - hex.len();
        if hex.len() != 12 || !(separators == 5 || separators == 2) {
            return Err(err());
        }
        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> String {
        mac.to_string()
    }
}

/// Contiguous IPv4 network mask, stored as prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Netmask(u8);

impl Netmask {
    /// Create a netmask from its prefix length (0-32)
    pub fn from_prefix_len(len: u8) -> Result<Self, ConstructionError> {
        check_range("netmask", len as i64, 0, 32)?;
        Ok(Self(len))
    }

    /// Create a netmask from the dotted notation. Non-contiguous masks are rejected.
    pub fn from_addr(mask: Ipv4Addr) -> Result<Self, ConstructionError> {
        let bits = u32::from(mask);
        let len = bits.leading_ones();
        if bits.checked_shl(len).unwrap_or(0) != 0 {
            return Err(ConstructionError::InvalidFormat {
                field: "netmask",
                value: mask.to_string(),
                expected: "a contiguous network mask",
            });
        }
        Ok(Self(len as u8))
    }

    /// Prefix length
    pub fn prefix_len(&self) -> u8 {
        self.0
    }

    /// Mask as 32-bit number
    pub fn bits(&self) -> u32 {
        u32::MAX.checked_shl(32 - self.0 as u32).unwrap_or(0)
    }

    /// Dotted mask, e.g., `255.255.255.0`
    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.bits())
    }

    /// Dotted wildcard (inverse mask), e.g., `0.0.0.255`
    pub fn wildcard(&self) -> Ipv4Addr {
        Ipv4Addr::from(!self.bits())
    }
}

impl fmt::Display for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mask())
    }
}

impl FromStr for Netmask {
    type Err = ConstructionError;

    /// Accepts the dotted notation as well as a prefix length (`24` or `/24`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(mask) = s.parse::<Ipv4Addr>() {
            return Self::from_addr(mask);
        }
        let len = s.trim_start_matches('/').parse::<u8>().map_err(|_| {
            ConstructionError::InvalidFormat {
                field: "netmask",
                value: s.to_string(),
                expected: "a dotted mask or a prefix length",
            }
        })?;
        Self::from_prefix_len(len)
    }
}

impl TryFrom<String> for Netmask {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Netmask> for String {
    fn from(mask: Netmask) -> String {
        mask.to_string()
    }
}

fn split_prefix(field: &'static str, s: &str) -> Result<(Ipv4Addr, Netmask), ConstructionError> {
    let err = || ConstructionError::InvalidFormat {
        field,
        value: s.to_string(),
        expected: "an address with prefix length like 10.0.0.1/24",
    };
    let (addr, len) = s.trim().split_once('/').ok_or_else(err)?;
    let addr = addr.parse::<Ipv4Addr>().map_err(|_| err())?;
    let len = len.parse::<u8>().map_err(|_| err())?;
    Ok((addr, Netmask::from_prefix_len(len).map_err(|e| e.in_field(field))?))
}

/// # IPv4 network
/// A network address together with its mask. The address must be aligned to the mask (no host
/// bits set), as the device would reject it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Net {
    addr: Ipv4Addr,
    mask: Netmask,
}

impl Ipv4Net {
    /// Create a new network, failing if host bits are set.
    pub fn new(addr: Ipv4Addr, mask: Netmask) -> Result<Self, ConstructionError> {
        if u32::from(addr) & !mask.bits() != 0 {
            return Err(ConstructionError::Incompatible {
                field: "network",
                reason: format!("{} has host bits set for mask {}", addr, mask),
            });
        }
        Ok(Self { addr, mask })
    }

    /// Network address
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Network mask
    pub fn mask(&self) -> Netmask {
        self.mask
    }

    /// Returns `true` if the address lies inside of the network.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask.bits() == u32::from(self.addr)
    }

    /// CLI form with the mask, e.g., `10.0.0.0 255.255.255.0`
    pub fn with_mask(&self) -> String {
        format!("{} {}", self.addr, self.mask)
    }

    /// CLI form with the wildcard, e.g., `10.0.0.0 0.0.0.255`
    pub fn with_wildcard(&self) -> String {
        format!("{} {}", self.addr, self.mask.wildcard())
    }
}

impl fmt::Display for Ipv4Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask.prefix_len())
    }
}

impl FromStr for Ipv4Net {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, mask) = split_prefix("network", s)?;
        Self::new(addr, mask)
    }
}

impl TryFrom<String> for Ipv4Net {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Ipv4Net> for String {
    fn from(net: Ipv4Net) -> String {
        net.to_string()
    }
}

/// # Interface address
/// Host address of an interface together with the mask of the attached network. Network and
/// broadcast addresses are rejected (except on /31 and /32 networks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceAddress {
    addr: Ipv4Addr,
    mask: Netmask,
}

impl InterfaceAddress {
    /// Create a new interface address
    pub fn new(addr: Ipv4Addr, mask: Netmask) -> Result<Self, ConstructionError> {
        if mask.prefix_len() < 31 {
            let host = u32::from(addr) & !mask.bits();
            if host == 0 || host == !mask.bits() {
                return Err(ConstructionError::Incompatible {
                    field: "address",
                    reason: format!("{} is not a host address of a /{}", addr, mask.prefix_len()),
                });
            }
        }
        Ok(Self { addr, mask })
    }

    /// Host address
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Mask of the attached network
    pub fn mask(&self) -> Netmask {
        self.mask
    }

    /// The attached network
    pub fn network(&self) -> Ipv4Net {
        Ipv4Net { addr: Ipv4Addr::from(u32::from(self.addr) & self.mask.bits()), mask: self.mask }
    }

    /// CLI form, e.g., `10.0.0.1 255.255.255.0`
    pub fn with_mask(&self) -> String {
        format!("{} {}", self.addr, self.mask)
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask.prefix_len())
    }
}

impl FromStr for InterfaceAddress {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, mask) = split_prefix("address", s)?;
        Self::new(addr, mask)
    }
}

impl TryFrom<String> for InterfaceAddress {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InterfaceAddress> for String {
    fn from(addr: InterfaceAddress) -> String {
        addr.to_string()
    }
}
