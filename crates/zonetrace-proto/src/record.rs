//! Resource records and section parsing.

use crate::error::{Error, Result};
use crate::iana::{RecordClass, RecordType};
use crate::name::Name;
use crate::rdata::RData;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A DNS resource record.
///
/// Type and class are kept as raw code points; [`Record::record_type`]
/// maps listed values back to [`RecordType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Owner name.
    pub name: Name,
    /// Raw record type code.
    pub rtype: u16,
    /// Raw record class code.
    pub rclass: u16,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Parsed record data.
    pub rdata: RData,
}

impl Record {
    /// Creates an IN-class record.
    pub fn new(name: Name, rtype: RecordType, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype: rtype.to_u16(),
            rclass: RecordClass::IN.to_u16(),
            ttl,
            rdata,
        }
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(name, RecordType::A, ttl, RData::A(addr))
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::new(name, RecordType::AAAA, ttl, RData::Aaaa(addr))
    }

    /// Creates an NS record.
    pub fn ns(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(name, RecordType::NS, ttl, RData::Ns(target))
    }

    /// Creates a CNAME record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(name, RecordType::CNAME, ttl, RData::Cname(target))
    }

    /// Returns the record type if it is a listed code point.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::try_from(self.rtype).ok()
    }

    /// Returns true if this is an NS record.
    #[inline]
    pub fn is_ns(&self) -> bool {
        self.rtype == RecordType::NS.to_u16()
    }

    /// Parses a record at `offset`, returning it and the bytes consumed.
    pub fn parse(message: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, name_len) = Name::from_message(message, offset)?;

        let fixed = offset + name_len;
        let bytes = message
            .get(fixed..fixed + 10)
            .ok_or_else(|| Error::truncated(fixed, 10))?;

        let rtype = u16::from_be_bytes([bytes[0], bytes[1]]);
        let rclass = u16::from_be_bytes([bytes[2], bytes[3]]);
        let ttl = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        let rdlength = u16::from_be_bytes([bytes[8], bytes[9]]);

        let rdata = RData::parse(rtype, message, fixed + 10, rdlength)?;

        Ok((
            Self {
                name,
                rtype,
                rclass,
                ttl,
                rdata,
            },
            name_len + 10 + rdlength as usize,
        ))
    }

    /// Returns the wire length.
    pub fn wire_len(&self) -> usize {
        self.name.wire_len() + 10 + self.rdata.wire_len()
    }

    /// Writes the record to a buffer.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.name.write_wire(buf);
        buf.extend_from_slice(&self.rtype.to_be_bytes());
        buf.extend_from_slice(&self.rclass.to_be_bytes());
        buf.extend_from_slice(&self.ttl.to_be_bytes());
        buf.extend_from_slice(&(self.rdata.wire_len() as u16).to_be_bytes());
        self.rdata.write_to(buf);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.ttl,
            RecordClass::display_code(self.rclass),
            RecordType::display_code(self.rtype),
            self.rdata
        )
    }
}

/// Sequential parser for a record section.
pub(crate) struct SectionParser<'a> {
    message: &'a [u8],
    offset: usize,
    remaining: u16,
}

impl<'a> SectionParser<'a> {
    pub(crate) fn new(message: &'a [u8], offset: usize, count: u16) -> Self {
        Self {
            message,
            offset,
            remaining: count,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn next(&mut self) -> Result<Option<Record>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let (record, consumed) = Record::parse(self.message, self.offset)?;
        self.offset += consumed;
        self.remaining -= 1;
        Ok(Some(record))
    }
}
