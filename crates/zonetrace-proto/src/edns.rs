//! EDNS(0) support (RFC 6891).
//!
//! The OPT pseudo-record overloads the class field as the advertised UDP
//! payload size and the TTL field as extended rcode bits, version, and
//! flags. It is kept out of the additional section and modelled as this
//! struct on the message.

use crate::error::{Error, Result};
use crate::iana::RecordType;
use crate::name::Name;
use crate::DEFAULT_UDP_PAYLOAD;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DO bit in the OPT TTL field.
const DO_BIT: u32 = 0x8000;

/// EDNS(0) parameters carried by an OPT pseudo-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edns {
    /// Advertised UDP payload size.
    pub udp_size: u16,
    /// Extended rcode high bits.
    pub extended_rcode: u8,
    /// EDNS version, 0 for EDNS(0).
    pub version: u8,
    /// DNSSEC OK flag.
    pub dnssec_ok: bool,
    /// Raw options as (code, data) pairs.
    pub options: Vec<(u16, Vec<u8>)>,
}

impl Edns {
    /// Creates parameters with the default payload size and DO clear.
    pub fn new() -> Self {
        Self {
            udp_size: DEFAULT_UDP_PAYLOAD,
            extended_rcode: 0,
            version: 0,
            dnssec_ok: false,
            options: Vec::new(),
        }
    }

    /// Creates parameters with the DO bit set.
    pub fn with_dnssec_ok() -> Self {
        Self {
            dnssec_ok: true,
            ..Self::new()
        }
    }

    /// Reconstructs parameters from the raw OPT record fields.
    pub fn from_opt(rclass: u16, ttl: u32, rdata: &[u8]) -> Result<Self> {
        let mut options = Vec::new();
        let mut pos = 0;
        while pos < rdata.len() {
            let head = rdata
                .get(pos..pos + 4)
                .ok_or_else(|| Error::truncated(pos, 4))?;
            let code = u16::from_be_bytes([head[0], head[1]]);
            let len = u16::from_be_bytes([head[2], head[3]]) as usize;
            let data = rdata
                .get(pos + 4..pos + 4 + len)
                .ok_or_else(|| Error::truncated(pos + 4, len))?;
            options.push((code, data.to_vec()));
            pos += 4 + len;
        }

        Ok(Self {
            udp_size: rclass,
            extended_rcode: (ttl >> 24) as u8,
            version: (ttl >> 16) as u8,
            dnssec_ok: ttl & DO_BIT != 0,
            options,
        })
    }

    /// Returns the OPT TTL field encoding rcode bits, version, and flags.
    fn ttl(&self) -> u32 {
        let mut ttl = (u32::from(self.extended_rcode) << 24) | (u32::from(self.version) << 16);
        if self.dnssec_ok {
            ttl |= DO_BIT;
        }
        ttl
    }

    /// Returns the wire length of the full OPT record.
    pub fn wire_len(&self) -> usize {
        // Root owner + type + class + ttl + rdlength, then the options.
        1 + 10 + self.options.iter().map(|(_, d)| 4 + d.len()).sum::<usize>()
    }

    /// Writes the OPT record to a buffer.
    pub fn write_to(&self, buf: &mut BytesMut) {
        Name::root().write_wire(buf);
        buf.extend_from_slice(&RecordType::OPT.to_u16().to_be_bytes());
        buf.extend_from_slice(&self.udp_size.to_be_bytes());
        buf.extend_from_slice(&self.ttl().to_be_bytes());

        let rdlength: usize = self.options.iter().map(|(_, d)| 4 + d.len()).sum();
        buf.extend_from_slice(&(rdlength as u16).to_be_bytes());
        for (code, data) in &self.options {
            buf.extend_from_slice(&code.to_be_bytes());
            buf.extend_from_slice(&(data.len() as u16).to_be_bytes());
            buf.extend_from_slice(data);
        }
    }
}

impl Default for Edns {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Edns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version: {}, udp: {}, flags:{}",
            self.version,
            self.udp_size,
            if self.dnssec_ok { " do" } else { "" }
        )
    }
}
