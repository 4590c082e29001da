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

//! Display colours of port templates.

use crate::types::ConstructionError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// RGB colour used to tag a port template and all interfaces bound to it. Parsed from three or
/// six hexadecimal digits (with an optional leading `#`), displayed as `#RRGGBB`.
///
/// ```
/// # use cfgsmith::Color;
/// let c: Color = "#abc".parse().unwrap();
/// assert_eq!(c.to_string(), "#AABBCC");
/// assert_eq!(c.adjust(-0x10).to_string(), "#9AABBC");
/// assert_eq!(c.contrasting_text(), Color::BLACK);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

impl Color {
    /// White
    pub const WHITE: Color = Color { r: 0xff, g: 0xff, b: 0xff };
    /// Black
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Create a new colour
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Add `offset` to every component, saturating at 0 and 255. Negative offsets darken the
    /// colour.
    pub fn adjust(&self, offset: i16) -> Self {
        let f = |x: u8| (x as i16 + offset).max(0).min(255) as u8;
        Self { r: f(self.r), g: f(self.g), b: f(self.b) }
    }

    /// Relative luminance in the range 0 to 1 (ITU-R BT.709 weights)
    pub fn brightness(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }

    /// Black or white, whichever is readable on top of this colour.
    pub fn contrasting_text(&self) -> Self {
        if self.brightness() < 0.5 {
            Self::WHITE
        } else {
            Self::BLACK
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 0x42, g: 0x87, b: 0xf5 }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConstructionError::InvalidFormat {
            field: "color",
            value: s.to_string(),
            expected: "three or six hexadecimal digits",
        };
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let hex = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return Err(err()),
        };
        let component = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self { r: component(0)?, g: component(2)?, b: component(4)? })
    }
}

impl TryFrom<String> for Color {
    type Error = ConstructionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_string()
    }
}
