//! DNS message header.
//!
//! The fixed 12-byte structure at the start of every message: the
//! transaction ID, the flag word (with embedded opcode and rcode),
//! and the four section counts.

use crate::error::{Error, Result};
use crate::iana::{OpCode, Rcode};
use bitflags::bitflags;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the header in bytes.
pub const HEADER_LEN: usize = 12;

bitflags! {
    /// The single-bit flags of the header flag word.
    ///
    /// The opcode and rcode share the same 16-bit word but are kept as
    /// separate [`Header`] fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Flags: u16 {
        /// Query (0) or response (1).
        const QR = 0x8000;
        /// Authoritative answer.
        const AA = 0x0400;
        /// Truncated response.
        const TC = 0x0200;
        /// Recursion desired.
        const RD = 0x0100;
        /// Recursion available.
        const RA = 0x0080;
        /// Authentic data (DNSSEC).
        const AD = 0x0020;
        /// Checking disabled (DNSSEC).
        const CD = 0x0010;
    }
}

/// A DNS message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Transaction identifier.
    pub id: u16,
    /// Single-bit flags.
    pub flags: Flags,
    /// Operation code.
    pub opcode: OpCode,
    /// Response code (4-bit header field).
    pub rcode: Rcode,
    /// Question count.
    pub qd_count: u16,
    /// Answer count.
    pub an_count: u16,
    /// Authority count.
    pub ns_count: u16,
    /// Additional count.
    pub ar_count: u16,
}

impl Header {
    /// Creates a query header with a random transaction ID.
    ///
    /// The RD bit is left clear: the tracer asks for referrals, not
    /// recursion.
    pub fn query() -> Self {
        Self {
            id: rand::random(),
            flags: Flags::empty(),
            opcode: OpCode::Query,
            rcode: Rcode::NoError,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }

    /// Creates a response header answering `query`.
    pub fn response_to(query: &Header) -> Self {
        Self {
            id: query.id,
            flags: Flags::QR | (query.flags & Flags::RD),
            opcode: query.opcode,
            rcode: Rcode::NoError,
            qd_count: query.qd_count,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }

    /// Returns true if the QR bit marks this as a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(Flags::QR)
    }

    /// Returns true if the AA bit is set.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(Flags::AA)
    }

    /// Returns true if the TC bit is set.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(Flags::TC)
    }

    /// Parses a header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::truncated(0, HEADER_LEN));
        }

        let id = u16::from_be_bytes([data[0], data[1]]);
        let word = u16::from_be_bytes([data[2], data[3]]);

        let opcode_bits = ((word >> 11) & 0x0F) as u8;
        let opcode = OpCode::try_from(opcode_bits).unwrap_or(OpCode::Query);
        let rcode_bits = (word & 0x0F) as u8;
        let rcode = Rcode::try_from(rcode_bits).unwrap_or(Rcode::NoError);

        Ok(Self {
            id,
            flags: Flags::from_bits_truncate(word),
            opcode,
            rcode,
            qd_count: u16::from_be_bytes([data[4], data[5]]),
            an_count: u16::from_be_bytes([data[6], data[7]]),
            ns_count: u16::from_be_bytes([data[8], data[9]]),
            ar_count: u16::from_be_bytes([data[10], data[11]]),
        })
    }

    /// Writes the header to a buffer.
    pub fn write_to(&self, buf: &mut BytesMut) {
        let word = self.flags.bits()
            | (u16::from(u8::from(self.opcode)) << 11)
            | u16::from(u8::from(self.rcode));

        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&word.to_be_bytes());
        buf.extend_from_slice(&self.qd_count.to_be_bytes());
        buf.extend_from_slice(&self.an_count.to_be_bytes());
        buf.extend_from_slice(&self.ns_count.to_be_bytes());
        buf.extend_from_slice(&self.ar_count.to_be_bytes());
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            id: 0,
            flags: Flags::empty(),
            opcode: OpCode::Query,
            rcode: Rcode::NoError,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opcode: {}, status: {}, id: {}",
            self.opcode, self.rcode, self.id
        )?;
        let mut set = Vec::new();
        for (bit, label) in [
            (Flags::QR, "qr"),
            (Flags::AA, "aa"),
            (Flags::TC, "tc"),
            (Flags::RD, "rd"),
            (Flags::RA, "ra"),
            (Flags::AD, "ad"),
            (Flags::CD, "cd"),
        ] {
            if self.flags.contains(bit) {
                set.push(label);
            }
        }
        write!(f, "; flags: {}", set.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut header = Header::query();
        header.id = 0xBEEF;
        header.flags |= Flags::AA | Flags::TC;
        header.rcode = Rcode::NXDomain;
        header.qd_count = 1;
        header.ns_count = 4;

        let mut buf = BytesMut::new();
        header.write_to(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);

        let parsed = Header::parse(&buf).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_query_has_rd_clear() {
        let header = Header::query();
        assert!(!header.flags.contains(Flags::RD));
        assert!(!header.is_response());
    }

    #[test]
    fn test_response_echoes_id_and_rd() {
        let mut query = Header::query();
        query.flags |= Flags::RD;
        let response = Header::response_to(&query);
        assert_eq!(response.id, query.id);
        assert!(response.is_response());
        assert!(response.flags.contains(Flags::RD));
    }

    #[test]
    fn test_parse_too_short() {
        assert!(Header::parse(&[0u8; 11]).is_err());
    }
}
