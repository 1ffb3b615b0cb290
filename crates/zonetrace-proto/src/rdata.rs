//! Record data (RDATA).
//!
//! Only the record types the tracer inspects or prints get a typed
//! representation; everything else is carried as opaque bytes and printed
//! in the RFC 3597 generic form.

use crate::error::{Error, Result};
use crate::iana::RecordType;
use crate::name::Name;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// SOA record fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Soa {
    /// Primary name server.
    pub mname: Name,
    /// Responsible mailbox.
    pub rname: Name,
    /// Zone serial number.
    pub serial: u32,
    /// Refresh interval in seconds.
    pub refresh: u32,
    /// Retry interval in seconds.
    pub retry: u32,
    /// Expire limit in seconds.
    pub expire: u32,
    /// Minimum / negative TTL in seconds.
    pub minimum: u32,
}

/// Parsed record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address.
    A(Ipv4Addr),
    /// IPv6 address.
    Aaaa(Ipv6Addr),
    /// Delegated name server.
    Ns(Name),
    /// Alias target.
    Cname(Name),
    /// Reverse mapping target.
    Ptr(Name),
    /// Mail exchange.
    Mx {
        /// Preference, lower wins.
        preference: u16,
        /// Exchange host.
        exchange: Name,
    },
    /// Start of authority.
    Soa(Soa),
    /// Text record character strings.
    Txt(Vec<Vec<u8>>),
    /// Service locator.
    Srv {
        /// Priority, lower wins.
        priority: u16,
        /// Weight among same-priority targets.
        weight: u16,
        /// Service port.
        port: u16,
        /// Target host.
        target: Name,
    },
    /// Delegation signer digest.
    Ds {
        /// Key tag of the referenced DNSKEY.
        key_tag: u16,
        /// Signing algorithm.
        algorithm: u8,
        /// Digest algorithm.
        digest_type: u8,
        /// Digest bytes.
        digest: Vec<u8>,
    },
    /// Any record type without a typed representation.
    Opaque(Vec<u8>),
}

impl RData {
    /// Parses RDATA for `rtype` at `offset` in the message.
    ///
    /// The whole message is needed because several types embed names that
    /// may use compression pointers.
    pub fn parse(rtype: u16, message: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        let rdlength = rdlength as usize;
        let raw = message
            .get(offset..offset + rdlength)
            .ok_or_else(|| Error::truncated(offset, rdlength))?;

        match RecordType::try_from(rtype) {
            Ok(RecordType::A) => {
                let bytes: [u8; 4] = raw.try_into().map_err(|_| Error::BadRdata {
                    rtype: "A",
                    length: rdlength,
                })?;
                Ok(Self::A(Ipv4Addr::from(bytes)))
            }
            Ok(RecordType::AAAA) => {
                let bytes: [u8; 16] = raw.try_into().map_err(|_| Error::BadRdata {
                    rtype: "AAAA",
                    length: rdlength,
                })?;
                Ok(Self::Aaaa(Ipv6Addr::from(bytes)))
            }
            Ok(RecordType::NS) => Ok(Self::Ns(Name::from_message(message, offset)?.0)),
            Ok(RecordType::CNAME) => Ok(Self::Cname(Name::from_message(message, offset)?.0)),
            Ok(RecordType::PTR) => Ok(Self::Ptr(Name::from_message(message, offset)?.0)),
            Ok(RecordType::MX) => {
                if rdlength < 3 {
                    return Err(Error::BadRdata {
                        rtype: "MX",
                        length: rdlength,
                    });
                }
                let preference = u16::from_be_bytes([raw[0], raw[1]]);
                let (exchange, _) = Name::from_message(message, offset + 2)?;
                Ok(Self::Mx {
                    preference,
                    exchange,
                })
            }
            Ok(RecordType::SOA) => {
                let (mname, mlen) = Name::from_message(message, offset)?;
                let (rname, rlen) = Name::from_message(message, offset + mlen)?;
                let fixed = offset + mlen + rlen;
                let tail = message
                    .get(fixed..fixed + 20)
                    .ok_or_else(|| Error::truncated(fixed, 20))?;
                Ok(Self::Soa(Soa {
                    mname,
                    rname,
                    serial: u32::from_be_bytes(tail[0..4].try_into().unwrap()),
                    refresh: u32::from_be_bytes(tail[4..8].try_into().unwrap()),
                    retry: u32::from_be_bytes(tail[8..12].try_into().unwrap()),
                    expire: u32::from_be_bytes(tail[12..16].try_into().unwrap()),
                    minimum: u32::from_be_bytes(tail[16..20].try_into().unwrap()),
                }))
            }
            Ok(RecordType::TXT) => {
                let mut strings = Vec::new();
                let mut pos = 0;
                while pos < raw.len() {
                    let len = raw[pos] as usize;
                    let chunk = raw
                        .get(pos + 1..pos + 1 + len)
                        .ok_or_else(|| Error::truncated(offset + pos + 1, len))?;
                    strings.push(chunk.to_vec());
                    pos += 1 + len;
                }
                Ok(Self::Txt(strings))
            }
            Ok(RecordType::SRV) => {
                if rdlength < 7 {
                    return Err(Error::BadRdata {
                        rtype: "SRV",
                        length: rdlength,
                    });
                }
                let (target, _) = Name::from_message(message, offset + 6)?;
                Ok(Self::Srv {
                    priority: u16::from_be_bytes([raw[0], raw[1]]),
                    weight: u16::from_be_bytes([raw[2], raw[3]]),
                    port: u16::from_be_bytes([raw[4], raw[5]]),
                    target,
                })
            }
            Ok(RecordType::DS) => {
                if rdlength < 4 {
                    return Err(Error::BadRdata {
                        rtype: "DS",
                        length: rdlength,
                    });
                }
                Ok(Self::Ds {
                    key_tag: u16::from_be_bytes([raw[0], raw[1]]),
                    algorithm: raw[2],
                    digest_type: raw[3],
                    digest: raw[4..].to_vec(),
                })
            }
            _ => Ok(Self::Opaque(raw.to_vec())),
        }
    }

    /// Returns the wire length.
    pub fn wire_len(&self) -> usize {
        match self {
            Self::A(_) => 4,
            Self::Aaaa(_) => 16,
            Self::Ns(n) | Self::Cname(n) | Self::Ptr(n) => n.wire_len(),
            Self::Mx { exchange, .. } => 2 + exchange.wire_len(),
            Self::Soa(soa) => soa.mname.wire_len() + soa.rname.wire_len() + 20,
            Self::Txt(strings) => strings.iter().map(|s| 1 + s.len()).sum(),
            Self::Srv { target, .. } => 6 + target.wire_len(),
            Self::Ds { digest, .. } => 4 + digest.len(),
            Self::Opaque(raw) => raw.len(),
        }
    }

    /// Writes the RDATA to a buffer, uncompressed.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            Self::A(addr) => buf.extend_from_slice(&addr.octets()),
            Self::Aaaa(addr) => buf.extend_from_slice(&addr.octets()),
            Self::Ns(n) | Self::Cname(n) | Self::Ptr(n) => n.write_wire(buf),
            Self::Mx {
                preference,
                exchange,
            } => {
                buf.extend_from_slice(&preference.to_be_bytes());
                exchange.write_wire(buf);
            }
            Self::Soa(soa) => {
                soa.mname.write_wire(buf);
                soa.rname.write_wire(buf);
                buf.extend_from_slice(&soa.serial.to_be_bytes());
                buf.extend_from_slice(&soa.refresh.to_be_bytes());
                buf.extend_from_slice(&soa.retry.to_be_bytes());
                buf.extend_from_slice(&soa.expire.to_be_bytes());
                buf.extend_from_slice(&soa.minimum.to_be_bytes());
            }
            Self::Txt(strings) => {
                for s in strings {
                    buf.extend_from_slice(&[s.len() as u8]);
                    buf.extend_from_slice(s);
                }
            }
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                buf.extend_from_slice(&priority.to_be_bytes());
                buf.extend_from_slice(&weight.to_be_bytes());
                buf.extend_from_slice(&port.to_be_bytes());
                target.write_wire(buf);
            }
            Self::Ds {
                key_tag,
                algorithm,
                digest_type,
                digest,
            } => {
                buf.extend_from_slice(&key_tag.to_be_bytes());
                buf.extend_from_slice(&[*algorithm, *digest_type]);
                buf.extend_from_slice(digest);
            }
            Self::Opaque(raw) => buf.extend_from_slice(raw),
        }
    }

    /// Returns the IPv4 address of an A record.
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            Self::A(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Returns the IPv6 address of an AAAA record.
    pub fn as_aaaa(&self) -> Option<Ipv6Addr> {
        match self {
            Self::Aaaa(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Returns the target of an NS record.
    pub fn as_ns(&self) -> Option<&Name> {
        match self {
            Self::Ns(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the target of a CNAME record.
    pub fn as_cname(&self) -> Option<&Name> {
        match self {
            Self::Cname(n) => Some(n),
            _ => None,
        }
    }

    /// Returns either address family as a generic [`std::net::IpAddr`].
    pub fn as_ip(&self) -> Option<std::net::IpAddr> {
        match self {
            Self::A(addr) => Some((*addr).into()),
            Self::Aaaa(addr) => Some((*addr).into()),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(addr) => write!(f, "{addr}"),
            Self::Aaaa(addr) => write!(f, "{addr}"),
            Self::Ns(n) | Self::Cname(n) | Self::Ptr(n) => write!(f, "{n}"),
            Self::Mx {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            Self::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            Self::Txt(strings) => {
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "\"{}\"", String::from_utf8_lossy(s))?;
                }
                Ok(())
            }
            Self::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{priority} {weight} {port} {target}"),
            Self::Ds {
                key_tag,
                algorithm,
                digest_type,
                digest,
            } => {
                write!(f, "{key_tag} {algorithm} {digest_type} ")?;
                for b in digest {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
            Self::Opaque(raw) => {
                // RFC 3597 generic representation.
                write!(f, "\\# {}", raw.len())?;
                if !raw.is_empty() {
                    f.write_str(" ")?;
                    for b in raw {
                        write!(f, "{b:02x}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn round_trip(rtype: RecordType, rdata: &RData) -> RData {
        let mut buf = BytesMut::new();
        rdata.write_to(&mut buf);
        assert_eq!(buf.len(), rdata.wire_len());
        RData::parse(rtype.to_u16(), &buf, 0, buf.len() as u16).unwrap()
    }

    #[test]
    fn test_address_records() {
        let a = RData::A(Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(round_trip(RecordType::A, &a), a);
        assert_eq!(a.as_ip(), Some("93.184.216.34".parse().unwrap()));

        let aaaa = RData::Aaaa("2606:2800:220:1::1".parse().unwrap());
        assert_eq!(round_trip(RecordType::AAAA, &aaaa), aaaa);
        assert!(aaaa.as_a().is_none());
    }

    #[test]
    fn test_bad_address_length() {
        let err = RData::parse(RecordType::A.to_u16(), &[1, 2, 3], 0, 3);
        assert!(matches!(err, Err(Error::BadRdata { rtype: "A", .. })));
    }

    #[test]
    fn test_ns_with_compression() {
        // Message: "example.com." at 0, then NS rdata at 13 pointing back.
        let message = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, //
            2, b'n', b's', 0xC0, 0x00,
        ];
        let rdata = RData::parse(RecordType::NS.to_u16(), &message, 13, 5).unwrap();
        assert_eq!(
            rdata.as_ns().unwrap(),
            &Name::from_str("ns.example.com").unwrap()
        );
    }

    #[test]
    fn test_soa_round_trip() {
        let soa = RData::Soa(Soa {
            mname: Name::from_str("ns1.example.com").unwrap(),
            rname: Name::from_str("hostmaster.example.com").unwrap(),
            serial: 2024010101,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 3600,
        });
        assert_eq!(round_trip(RecordType::SOA, &soa), soa);
    }

    #[test]
    fn test_txt_display() {
        let txt = RData::Txt(vec![b"v=spf1 -all".to_vec()]);
        assert_eq!(txt.to_string(), "\"v=spf1 -all\"");
        assert_eq!(round_trip(RecordType::TXT, &txt), txt);
    }

    #[test]
    fn test_opaque_preserved() {
        let rdata = RData::parse(4711, &[0xDE, 0xAD, 0xBE, 0xEF], 0, 4).unwrap();
        assert_eq!(rdata, RData::Opaque(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        assert_eq!(rdata.to_string(), "\\# 4 deadbeef");
    }
}
