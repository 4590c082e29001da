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

//! Enumerations and bounded scalars used by the feature groups of the templates.

use crate::types::{check_range, ConstructionError};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Declares a closed set of configuration keywords. The enum is (de-)serialized and parsed from
/// its keyword (case-insensitive), and displayed as its keyword.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($field:literal) {
            $($(#[$vmeta:meta])* $var:ident => $kw:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $var,)+
        }

        impl $name {
            /// All members of the set, in declaration order
            pub const ALL: &'static [$name] = &[$(Self::$var,)+];

            /// Keyword of the value, as used in the configuration
            pub fn keyword(&self) -> &'static str {
                match self {
                    $(Self::$var => $kw,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }

        impl FromStr for $name {
            type Err = ConstructionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|x| x.keyword().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| ConstructionError::InvalidFormat {
                        field: $field,
                        value: s.to_string(),
                        expected: concat!("one of", $(" ", $kw,)+),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConstructionError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(x: $name) -> String {
                x.keyword().to_string()
            }
        }
    };
}

keyword_enum! {
    /// Interface speed in Mbit/s
    Speed ("speed") {
        /// Negotiated
        Auto => "auto",
        /// 10 Mbit/s
        Mbps10 => "10",
        /// 100 Mbit/s
        Mbps100 => "100",
        /// 1 Gbit/s
        Mbps1000 => "1000",
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::Auto
    }
}

impl Speed {
    /// Fixed speed in Mbit/s, or `None` if negotiated.
    pub fn mbps(&self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Mbps10 => Some(10),
            Self::Mbps100 => Some(100),
            Self::Mbps1000 => Some(1000),
        }
    }
}

keyword_enum! {
    /// Interface duplex mode
    Duplex ("duplex") {
        /// Negotiated
        Auto => "auto",
        /// Full duplex
        Full => "full",
        /// Half duplex
        Half => "half",
    }
}

impl Default for Duplex {
    fn default() -> Self {
        Self::Auto
    }
}

keyword_enum! {
    /// Action taken by port security when the address limit is exceeded
    ViolationAction ("violation") {
        /// Drop frames of unknown sources silently
        Protect => "protect",
        /// Drop frames and count the violation
        Restrict => "restrict",
        /// Put the interface into the err-disabled state
        Shutdown => "shutdown",
    }
}

keyword_enum! {
    /// Power over Ethernet mode of an access port
    PoeMode ("poe") {
        /// Detect powered devices automatically
        Auto => "auto",
        /// Never provide power
        Never => "never",
        /// Pre-allocate power
        Static => "static",
    }
}

keyword_enum! {
    /// Which marking of incoming frames is trusted
    QosTrust ("qos_trust") {
        /// Trust the CoS value of tagged frames
        Cos => "cos",
        /// Trust the DSCP value of IP packets
        Dscp => "dscp",
    }
}

keyword_enum! {
    /// Network access control method
    AuthMethod ("authentication") {
        /// IEEE 802.1X
        Dot1x => "dot1x",
        /// MAC authentication bypass
        Mab => "mab",
        /// Web authentication
        WebAuth => "webauth",
    }
}

keyword_enum! {
    /// Spanning tree protocol variant
    StpMode ("stp_mode") {
        /// Per-VLAN spanning tree
        Pvst => "pvst",
        /// Rapid per-VLAN spanning tree
        RapidPvst => "rapid-pvst",
        /// Multiple spanning tree
        Mst => "mst",
    }
}

keyword_enum! {
    /// Trunk encapsulation
    Encapsulation ("encapsulation") {
        /// IEEE 802.1Q
        Dot1q => "dot1q",
        /// Inter-switch link
        Isl => "isl",
    }
}

keyword_enum! {
    /// Dynamic trunking protocol mode of a trunk port
    DtpMode ("dtp_mode") {
        /// Become a trunk if the neighbor asks for it
        Auto => "auto",
        /// Actively negotiate the trunk
        Desirable => "desirable",
        /// Static trunk, DTP disabled
        Nonegotiate => "nonegotiate",
    }
}

keyword_enum! {
    /// Link aggregation protocol of an EtherChannel
    ChannelProtocol ("channel_protocol") {
        /// IEEE 802.3ad link aggregation control protocol
        Lacp => "lacp",
        /// Port aggregation protocol
        Pagp => "pagp",
        /// Static bundle without negotiation
        None => "none",
    }
}

impl ChannelProtocol {
    /// Returns `true` if the channel mode can be used with this protocol.
    pub fn allows(&self, mode: ChannelMode) -> bool {
        matches!(
            (self, mode),
            (Self::Lacp, ChannelMode::Active)
                | (Self::Lacp, ChannelMode::Passive)
                | (Self::Pagp, ChannelMode::Desirable)
                | (Self::Pagp, ChannelMode::Auto)
                | (Self::None, ChannelMode::On)
        )
    }

    /// The mode used when only the protocol is chosen.
    pub fn default_mode(&self) -> ChannelMode {
        match self {
            Self::Lacp => ChannelMode::Active,
            Self::Pagp => ChannelMode::Desirable,
            Self::None => ChannelMode::On,
        }
    }
}

keyword_enum! {
    /// Negotiation mode of an EtherChannel member
    ChannelMode ("channel_mode") {
        /// LACP, initiate negotiation
        Active => "active",
        /// LACP, respond only
        Passive => "passive",
        /// PAgP, initiate negotiation
        Desirable => "desirable",
        /// PAgP, respond only
        Auto => "auto",
        /// Unconditional bundle
        On => "on",
    }
}

keyword_enum! {
    /// Access right of an SNMP community
    SnmpAccess ("snmp_access") {
        /// Read only
        ReadOnly => "RO",
        /// Read and write
        ReadWrite => "RW",
    }
}

keyword_enum! {
    /// Side of a NAT translation on a routed interface
    NatSide ("nat") {
        /// Private side
        Inside => "inside",
        /// Public side
        Outside => "outside",
    }
}

keyword_enum! {
    /// Traffic class limited by storm control
    StormTraffic ("storm_control") {
        /// Broadcast frames
        Broadcast => "broadcast",
        /// Multicast frames
        Multicast => "multicast",
        /// Unknown unicast frames
        Unicast => "unicast",
    }
}

keyword_enum! {
    /// Unit of a storm control threshold
    StormUnit ("storm_control") {
        /// Percentage of the link bandwidth
        Percent => "percent",
        /// Packets per second
        Pps => "pps",
    }
}

/// Maximum number of secure MAC addresses on a port (1-8192).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct MaxMacCount(u16);

impl MaxMacCount {
    /// Create a new limit
    pub fn new(count: u16) -> Result<Self, ConstructionError> {
        check_range("max_mac_count", count as i64, 1, 8192)?;
        Ok(Self(count))
    }

    /// Returns the limit
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl Default for MaxMacCount {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u16> for MaxMacCount {
    type Error = ConstructionError;

    fn try_from(x: u16) -> Result<Self, Self::Error> {
        Self::new(x)
    }
}

impl From<MaxMacCount> for u16 {
    fn from(x: MaxMacCount) -> u16 {
        x.0
    }
}

impl fmt::Display for MaxMacCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rate limit for DHCP snooping and ARP inspection in packets per second (1-2048).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct RateLimit(u16);

impl RateLimit {
    /// Create a new rate limit
    pub fn new(pps: u16) -> Result<Self, ConstructionError> {
        check_range("rate_limit", pps as i64, 1, 2048)?;
        Ok(Self(pps))
    }

    /// Returns the limit in packets per second
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for RateLimit {
    type Error = ConstructionError;

    fn try_from(x: u16) -> Result<Self, Self::Error> {
        Self::new(x)
    }
}

impl From<RateLimit> for u16 {
    fn from(x: RateLimit) -> u16 {
        x.0
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bridge priority of the spanning tree: 0 to 61440 in steps of 4096.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StpPriority(u16);

impl StpPriority {
    /// Default bridge priority
    pub const DEFAULT: StpPriority = StpPriority(32768);

    /// Create a new priority
    pub fn new(priority: u16) -> Result<Self, ConstructionError> {
        check_range("stp_priority", priority as i64, 0, 61440)?;
        if priority % 4096 != 0 {
            return Err(ConstructionError::InvalidFormat {
                field: "stp_priority",
                value: priority.to_string(),
                expected: "a multiple of 4096",
            });
        }
        Ok(Self(priority))
    }

    /// Returns the priority
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for StpPriority {
    type Error = ConstructionError;

    fn try_from(x: u16) -> Result<Self, Self::Error> {
        Self::new(x)
    }
}

impl From<StpPriority> for u16 {
    fn from(x: StpPriority) -> u16 {
        x.0
    }
}

impl fmt::Display for StpPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const SEVERITIES: [&str; 8] = [
    "emergencies",
    "alerts",
    "critical",
    "errors",
    "warnings",
    "notifications",
    "informational",
    "debugging",
];

/// Syslog severity (0 = emergencies, 7 = debugging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LoggingLevel(u8);

impl LoggingLevel {
    /// Create a new severity level
    pub fn new(level: u8) -> Result<Self, ConstructionError> {
        check_range("logging_level", level as i64, 0, 7)?;
        Ok(Self(level))
    }

    /// Numeric severity
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Keyword of the severity, as used in the configuration
    pub fn keyword(&self) -> &'static str {
        SEVERITIES[self.0 as usize]
    }
}

impl Default for LoggingLevel {
    fn default() -> Self {
        Self(6)
    }
}

impl FromStr for LoggingLevel {
    type Err = ConstructionError;

    /// Accepts the number or the keyword of the severity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(level) = s.parse::<u8>() {
            return Self::new(level);
        }
        SEVERITIES
            .iter()
            .position(|kw| kw.eq_ignore_ascii_case(s))
            .map(|i| Self(i as u8))
            .ok_or_else(|| ConstructionError::InvalidFormat {
                field: "logging_level",
                value: s.to_string(),
                expected: "a syslog severity (0-7 or its name)",
            })
    }
}

impl TryFrom<u8> for LoggingLevel {
    type Error = ConstructionError;

    fn try_from(x: u8) -> Result<Self, Self::Error> {
        Self::new(x)
    }
}

impl From<LoggingLevel> for u8 {
    fn from(x: LoggingLevel) -> u8 {
        x.0
    }
}

impl fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// # Storm control threshold
/// The rising level at which traffic is suppressed, and an optional falling level at which it is
/// forwarded again. Percentages are stored in hundredths of a percent (the device accepts two
/// decimals), packet rates in packets per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawStormThreshold")]
pub struct StormThreshold {
    unit: StormUnit,
    rising: u32,
    falling: Option<u32>,
}

#[derive(Deserialize)]
struct RawStormThreshold {
    unit: StormUnit,
    rising: u32,
    falling: Option<u32>,
}

impl TryFrom<RawStormThreshold> for StormThreshold {
    type Error = ConstructionError;

    fn try_from(raw: RawStormThreshold) -> Result<Self, Self::Error> {
        Self::new(raw.unit, raw.rising, raw.falling)
    }
}

impl StormThreshold {
    fn new(unit: StormUnit, rising: u32, falling: Option<u32>) -> Result<Self, ConstructionError> {
        let max = match unit {
            StormUnit::Percent => 10_000,
            StormUnit::Pps => 10_000_000,
        };
        check_range("storm_control", rising as i64, 0, max)?;
        if let Some(falling) = falling {
            check_range("storm_control", falling as i64, 0, rising as i64)?;
        }
        Ok(Self { unit, rising, falling })
    }

    /// Threshold in percent of the bandwidth (0.00 to 100.00). The falling level must not exceed
    /// the rising level.
    pub fn percent(rising: f64, falling: Option<f64>) -> Result<Self, ConstructionError> {
        let hundredths = |x: f64| -> Result<u32, ConstructionError> {
            if x.is_finite() && (0.0..=100.0).contains(&x) {
                Ok((x * 100.0).round() as u32)
            } else {
                Err(ConstructionError::InvalidFormat {
                    field: "storm_control",
                    value: x.to_string(),
                    expected: "a percentage between 0.00 and 100.00",
                })
            }
        };
        Self::new(StormUnit::Percent, hundredths(rising)?, falling.map(hundredths).transpose()?)
    }

    /// Threshold in packets per second. The falling level must not exceed the rising level.
    pub fn pps(rising: u32, falling: Option<u32>) -> Result<Self, ConstructionError> {
        Self::new(StormUnit::Pps, rising, falling)
    }

    /// Unit of the threshold
    pub fn unit(&self) -> StormUnit {
        self.unit
    }
}

impl fmt::Display for StormThreshold {
    /// Renders the arguments of `storm-control <traffic> level`, e.g., `20.00 10.00` or
    /// `pps 1000 500`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = |x: u32| match self.unit {
            StormUnit::Percent => format!("{}.{:02}", x / 100, x % 100),
            StormUnit::Pps => x.to_string(),
        };
        if self.unit == StormUnit::Pps {
            f.write_str("pps ")?;
        }
        f.write_str(&value(self.rising))?;
        if let Some(falling) = self.falling {
            write!(f, " {}", value(falling))?;
        }
        Ok(())
    }
}
