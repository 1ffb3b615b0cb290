//! The question section.

use crate::error::{Error, Result};
use crate::iana::{RecordClass, RecordType};
use crate::name::Name;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single DNS question.
///
/// The type and class are stored as raw code points so a question with an
/// unlisted qtype still round-trips through parse and serialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The name being asked about.
    pub qname: Name,
    /// Raw query type code.
    pub qtype: u16,
    /// Raw query class code.
    pub qclass: u16,
}

impl Question {
    /// Creates an IN-class question.
    pub fn new(qname: Name, qtype: RecordType) -> Self {
        Self {
            qname,
            qtype: qtype.to_u16(),
            qclass: RecordClass::IN.to_u16(),
        }
    }

    /// Returns the query type if it is a listed code point.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::try_from(self.qtype).ok()
    }

    /// Parses a question at `offset`, returning it and the bytes consumed.
    pub fn parse(message: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (qname, name_len) = Name::from_message(message, offset)?;
        let fixed = offset + name_len;
        let bytes = message
            .get(fixed..fixed + 4)
            .ok_or_else(|| Error::truncated(fixed, 4))?;
        Ok((
            Self {
                qname,
                qtype: u16::from_be_bytes([bytes[0], bytes[1]]),
                qclass: u16::from_be_bytes([bytes[2], bytes[3]]),
            },
            name_len + 4,
        ))
    }

    /// Returns the wire length.
    pub fn wire_len(&self) -> usize {
        self.qname.wire_len() + 4
    }

    /// Writes the question to a buffer.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.qname.write_wire(buf);
        buf.extend_from_slice(&self.qtype.to_be_bytes());
        buf.extend_from_slice(&self.qclass.to_be_bytes());
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.qname,
            RecordClass::display_code(self.qclass),
            RecordType::display_code(self.qtype),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trip() {
        let q = Question::new(Name::from_str("example.com").unwrap(), RecordType::AAAA);
        let mut buf = BytesMut::new();
        q.write_to(&mut buf);

        let (parsed, consumed) = Question::parse(&buf, 0).unwrap();
        assert_eq!(parsed, q);
        assert_eq!(consumed, buf.len());
        assert_eq!(parsed.record_type(), Some(RecordType::AAAA));
    }

    #[test]
    fn test_unknown_qtype_survives() {
        let mut q = Question::new(Name::from_str("example.com").unwrap(), RecordType::A);
        q.qtype = 4711;
        let mut buf = BytesMut::new();
        q.write_to(&mut buf);

        let (parsed, _) = Question::parse(&buf, 0).unwrap();
        assert_eq!(parsed.qtype, 4711);
        assert_eq!(parsed.record_type(), None);
    }

    #[test]
    fn test_display() {
        let q = Question::new(Name::from_str("example.com").unwrap(), RecordType::A);
        assert_eq!(q.to_string(), "example.com.\tIN\tA");
    }
}
