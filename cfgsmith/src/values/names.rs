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

//! Free-text values that end up verbatim in the configuration.

use crate::types::ConstructionError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Implements `Display`, `FromStr`, `TryFrom<String>`, `From<T> for String` and `as_str` for a
/// string newtype with a `check` function.
macro_rules! string_value {
    ($t:ident) => {
        impl $t {
            /// Create a new value, checking its format.
            pub fn new(s: impl Into<String>) -> Result<Self, ConstructionError> {
                let s = s.into();
                Self::check(&s)?;
                Ok(Self(s))
            }

            /// Returns the value as string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = ConstructionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = ConstructionError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$t> for String {
            fn from(x: $t) -> String {
                x.0
            }
        }
    };
}

/// Device hostname: 1 to 63 characters, starting with a letter, containing only letters, digits
/// and hyphens, and not ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hostname(String);

impl Hostname {
    fn check(s: &str) -> Result<(), ConstructionError> {
        let valid = !s.is_empty()
            && s.len() <= 63
            && s.starts_with(|c: char| c.is_ascii_alphabetic())
            && !s.ends_with('-')
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid {
            Ok(())
        } else {
            Err(ConstructionError::InvalidFormat {
                field: "hostname",
                value: s.to_string(),
                expected: "1-63 letters, digits or hyphens, starting with a letter",
            })
        }
    }
}

string_value!(Hostname);

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interface or VLAN description: a single line of 1 to 240 printable characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    fn check(s: &str) -> Result<(), ConstructionError> {
        let valid = !s.trim().is_empty()
            && s.chars().count() <= 240
            && s.chars().all(|c| !c.is_control());
        if valid {
            Ok(())
        } else {
            Err(ConstructionError::InvalidFormat {
                field: "description",
                value: s.to_string(),
                expected: "a single line of 1-240 printable characters",
            })
        }
    }
}

string_value!(Description);

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a named object (VLAN name, ACL, NAT or DHCP pool, VRF, SNMP community, user,
/// service policy): 1 to 64 printable characters without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    fn check(s: &str) -> Result<(), ConstructionError> {
        let valid = !s.is_empty()
            && s.chars().count() <= 64
            && s.chars().all(|c| c.is_ascii_graphic());
        if valid {
            Ok(())
        } else {
            Err(ConstructionError::InvalidFormat {
                field: "name",
                value: s.to_string(),
                expected: "1-64 printable characters without whitespace",
            })
        }
    }
}

string_value!(Name);

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Password or shared secret. It is written in clear text into the configuration (the device
/// hashes it), but never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Secret(String);

impl Secret {
    fn check(s: &str) -> Result<(), ConstructionError> {
        if !s.is_empty() && s.len() <= 128 && s.chars().all(|c| c.is_ascii_graphic()) {
            Ok(())
        } else {
            Err(ConstructionError::InvalidFormat {
                field: "secret",
                value: "*".repeat(s.len().min(8)),
                expected: "1-128 printable characters without whitespace",
            })
        }
    }
}

string_value!(Secret);

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}
