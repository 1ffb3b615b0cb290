//! IANA-assigned DNS code points.
//!
//! Record types, classes, opcodes and response codes are carried on the wire
//! as raw integers; records and questions store the raw value so unknown code
//! points survive a parse/serialize round trip. The enums here cover the
//! assignments the tracer actually meets.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record type.
///
/// Only the types the tracer inspects or prints are enumerated; every other
/// value is preserved as its raw `u16` by the containing record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordType {
    /// IPv4 address - RFC 1035
    A = 1,
    /// Authoritative name server - RFC 1035
    NS = 2,
    /// Canonical name (alias) - RFC 1035
    CNAME = 5,
    /// Start of authority - RFC 1035
    SOA = 6,
    /// Domain name pointer - RFC 1035
    PTR = 12,
    /// Mail exchange - RFC 1035
    MX = 15,
    /// Text strings - RFC 1035
    TXT = 16,
    /// IPv6 address - RFC 3596
    AAAA = 28,
    /// Server selection - RFC 2782
    SRV = 33,
    /// EDNS(0) option pseudo-record - RFC 6891
    OPT = 41,
    /// Delegation signer - RFC 4034
    DS = 43,
    /// DNSSEC signature - RFC 4034
    RRSIG = 46,
    /// Any record type (query only) - RFC 1035
    ANY = 255,
}

impl RecordType {
    /// Returns the numeric type code.
    #[inline]
    pub fn to_u16(self) -> u16 {
        self.into()
    }

    /// Formats an arbitrary type code, falling back to the RFC 3597
    /// `TYPEnnn` notation for unlisted values.
    pub fn display_code(code: u16) -> RecordTypeDisplay {
        RecordTypeDisplay(code)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::AAAA => "AAAA",
            Self::SRV => "SRV",
            Self::OPT => "OPT",
            Self::DS => "DS",
            Self::RRSIG => "RRSIG",
            Self::ANY => "ANY",
        };
        f.write_str(s)
    }
}

impl FromStr for RecordType {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "NS" => Ok(Self::NS),
            "CNAME" => Ok(Self::CNAME),
            "SOA" => Ok(Self::SOA),
            "PTR" => Ok(Self::PTR),
            "MX" => Ok(Self::MX),
            "TXT" => Ok(Self::TXT),
            "AAAA" => Ok(Self::AAAA),
            "SRV" => Ok(Self::SRV),
            "DS" => Ok(Self::DS),
            "RRSIG" => Ok(Self::RRSIG),
            "ANY" => Ok(Self::ANY),
            _ => Err(UnknownMnemonic(s.to_string())),
        }
    }
}

/// Error returned when a record type mnemonic is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMnemonic(String);

impl fmt::Display for UnknownMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown record type {:?}", self.0)
    }
}

impl std::error::Error for UnknownMnemonic {}

/// Display adapter for raw type codes.
pub struct RecordTypeDisplay(u16);

impl fmt::Display for RecordTypeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RecordType::try_from(self.0) {
            Ok(rt) => rt.fmt(f),
            Err(_) => write!(f, "TYPE{}", self.0),
        }
    }
}

/// DNS record class.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordClass {
    /// Internet - RFC 1035
    IN = 1,
    /// Chaos - RFC 1035
    CH = 3,
    /// Hesiod - RFC 1035
    HS = 4,
    /// Any class (query only) - RFC 1035
    ANY = 255,
}

impl RecordClass {
    /// Returns the numeric class code.
    #[inline]
    pub fn to_u16(self) -> u16 {
        self.into()
    }

    /// Formats an arbitrary class code, falling back to `CLASSnnn`.
    pub fn display_code(code: u16) -> RecordClassDisplay {
        RecordClassDisplay(code)
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
            Self::ANY => "ANY",
        };
        f.write_str(s)
    }
}

/// Display adapter for raw class codes.
pub struct RecordClassDisplay(u16);

impl fmt::Display for RecordClassDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RecordClass::try_from(self.0) {
            Ok(rc) => rc.fmt(f),
            Err(_) => write!(f, "CLASS{}", self.0),
        }
    }
}

/// DNS operation code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum OpCode {
    /// Standard query - RFC 1035
    Query = 0,
    /// Inverse query (obsolete) - RFC 3425
    IQuery = 1,
    /// Server status request - RFC 1035
    Status = 2,
    /// Zone change notification - RFC 1996
    Notify = 4,
    /// Dynamic update - RFC 2136
    Update = 5,
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Query => "QUERY",
            Self::IQuery => "IQUERY",
            Self::Status => "STATUS",
            Self::Notify => "NOTIFY",
            Self::Update => "UPDATE",
        };
        f.write_str(s)
    }
}

/// DNS response code (the 4-bit header field).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum Rcode {
    /// No error - RFC 1035
    NoError = 0,
    /// Format error - RFC 1035
    FormErr = 1,
    /// Server failure - RFC 1035
    ServFail = 2,
    /// Non-existent domain - RFC 1035
    NXDomain = 3,
    /// Not implemented - RFC 1035
    NotImp = 4,
    /// Query refused - RFC 1035
    Refused = 5,
    /// Name exists when it should not - RFC 2136
    YXDomain = 6,
    /// RR set exists when it should not - RFC 2136
    YXRRSet = 7,
    /// RR set that should exist does not - RFC 2136
    NXRRSet = 8,
    /// Server not authoritative for zone - RFC 2136
    NotAuth = 9,
    /// Name not contained in zone - RFC 2136
    NotZone = 10,
}

impl Rcode {
    /// Returns true for NOERROR.
    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::NoError
    }

    /// Returns true for NXDOMAIN.
    #[inline]
    pub fn is_nxdomain(self) -> bool {
        self == Self::NXDomain
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::YXDomain => "YXDOMAIN",
            Self::YXRRSet => "YXRRSET",
            Self::NXRRSet => "NXRRSET",
            Self::NotAuth => "NOTAUTH",
            Self::NotZone => "NOTZONE",
        };
        f.write_str(s)
    }
}
