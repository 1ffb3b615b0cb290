//! DNS domain names.
//!
//! Names are stored in uncompressed wire format (length-prefixed labels
//! terminated by the root label) and compared case-insensitively per
//! RFC 1035. Parsing from a message follows compression pointers
//! (RFC 1035 §4.1.4); writing never emits them.

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LEN, MAX_NAME_LEN};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Upper bound on compression pointer hops while decoding one name.
const MAX_POINTER_HOPS: usize = 64;

/// A fully-qualified DNS domain name.
///
/// The wire representation always ends with the root label, so the root
/// name is the single byte `00`. Most names fit the inline buffer and
/// never touch the heap.
///
/// # Example
///
/// ```
/// use zonetrace_proto::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("www.Example.COM").unwrap();
/// assert_eq!(name.to_string(), "www.Example.COM.");
/// assert_eq!(name, Name::from_str("WWW.example.com.").unwrap());
/// assert_eq!(name.label_count(), 3);
/// ```
#[derive(Clone)]
pub struct Name {
    wire: SmallVec<[u8; 64]>,
}

impl Name {
    /// Returns the root name.
    pub fn root() -> Self {
        Self {
            wire: SmallVec::from_slice(&[0]),
        }
    }

    /// Returns true if this is the root name.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.wire.len() == 1
    }

    /// Returns the uncompressed wire form, including the root label.
    #[inline]
    pub fn as_wire(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the wire length in bytes.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len()
    }

    /// Returns the number of labels, not counting the root label.
    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// Iterates over the labels from leftmost to rightmost, excluding the
    /// final root label.
    pub fn labels(&self) -> Labels<'_> {
        Labels { wire: &self.wire }
    }

    /// Returns the name with its leftmost label removed, or `None` for the
    /// root name.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let skip = 1 + self.wire[0] as usize;
        Some(Self {
            wire: SmallVec::from_slice(&self.wire[skip..]),
        })
    }

    /// Iterates over this name and each of its ancestors, ending with the
    /// root name: `a.b.c.` yields `a.b.c.`, `b.c.`, `c.`, `.`.
    pub fn suffixes(&self) -> Suffixes {
        Suffixes {
            next: Some(self.clone()),
        }
    }

    /// Returns true if `self` equals `other` or sits below it.
    pub fn ends_with(&self, other: &Name) -> bool {
        let mine: Vec<&[u8]> = self.labels().collect();
        let theirs: Vec<&[u8]> = other.labels().collect();
        if theirs.len() > mine.len() {
            return false;
        }
        mine.iter()
            .rev()
            .zip(theirs.iter().rev())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Parses a name out of a message buffer, following compression
    /// pointers. Returns the name and the bytes consumed at `offset`
    /// (pointers count as two bytes regardless of target length).
    pub fn from_message(message: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut pos = offset;
        let mut consumed = 0;
        let mut jumped = false;
        let mut hops = 0;

        loop {
            let len_byte = *message
                .get(pos)
                .ok_or_else(|| Error::truncated(pos, 1))?;

            if len_byte & 0xC0 == 0xC0 {
                let low = *message
                    .get(pos + 1)
                    .ok_or_else(|| Error::truncated(pos + 1, 1))?;
                let target = (usize::from(len_byte & 0x3F) << 8) | usize::from(low);
                // Only backward pointers are legal; forward ones can loop.
                if target >= pos {
                    return Err(Error::BadPointer {
                        offset: pos,
                        target,
                    });
                }
                if !jumped {
                    consumed = pos - offset + 2;
                    jumped = true;
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(Error::PointerChain { offset: pos });
                }
                pos = target;
                continue;
            }

            if len_byte & 0xC0 != 0 {
                return Err(Error::BadLabelType {
                    offset: pos,
                    value: len_byte,
                });
            }

            let len = len_byte as usize;
            if len == 0 {
                wire.push(0);
                if !jumped {
                    consumed = pos - offset + 1;
                }
                break;
            }

            let label = message
                .get(pos + 1..pos + 1 + len)
                .ok_or_else(|| Error::truncated(pos + 1, len))?;
            if wire.len() + 1 + len + 1 > MAX_NAME_LEN {
                return Err(Error::NameTooLong {
                    length: wire.len() + 1 + len + 1,
                });
            }
            wire.push(len_byte);
            wire.extend_from_slice(label);
            pos += 1 + len;
        }

        Ok((Self { wire }, consumed))
    }

    /// Appends the uncompressed wire form to a buffer.
    pub fn write_wire(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.wire);
    }

    /// Returns a lowercased copy of the name.
    #[must_use]
    pub fn to_lowercase(&self) -> Self {
        let mut wire = self.wire.clone();
        wire.iter_mut().for_each(u8::make_ascii_lowercase);
        Self { wire }
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a name in dotted notation. A trailing dot is accepted but
    /// not required; the result is always fully qualified.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }
        let s = s.strip_suffix('.').unwrap_or(s);

        let mut wire = SmallVec::<[u8; 64]>::new();
        for part in s.split('.') {
            if part.len() > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong { length: part.len() });
            }
            for c in part.chars() {
                // Hostname characters plus underscore (service labels) and
                // asterisk (wildcards).
                if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '*' {
                    return Err(Error::InvalidLabelChar { character: c });
                }
            }
            wire.push(part.len() as u8);
            wire.extend_from_slice(part.as_bytes());
        }
        wire.push(0);

        if wire.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong { length: wire.len() });
        }
        Ok(Self { wire })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.labels() {
            for &b in label {
                if b.is_ascii_graphic() && b != b'.' && b != b'\\' {
                    write!(f, "{}", b as char)?;
                } else {
                    write!(f, "\\{:03}", b)?;
                }
            }
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.wire.len() == other.wire.len()
            && self
                .wire
                .iter()
                .zip(other.wire.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &b in self.wire.iter() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Iterator over the labels of a name.
pub struct Labels<'a> {
    wire: &'a [u8],
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = *self.wire.first()? as usize;
        if len == 0 {
            return None;
        }
        let label = &self.wire[1..1 + len];
        self.wire = &self.wire[1 + len..];
        Some(label)
    }
}

/// Iterator over a name and its ancestors, produced by [`Name::suffixes`].
pub struct Suffixes {
    next: Option<Name>,
}

impl Iterator for Suffixes {
    type Item = Name;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.label_count(), 0);
        assert_eq!(root.to_string(), ".");
        assert_eq!(root.as_wire(), &[0]);
        assert_eq!(Name::from_str(".").unwrap(), root);
    }

    #[test]
    fn test_from_str_and_display() {
        let name = Name::from_str("www.example.com.").unwrap();
        assert_eq!(name.to_string(), "www.example.com.");
        assert_eq!(name.label_count(), 3);
        // The trailing dot is implied.
        assert_eq!(Name::from_str("www.example.com").unwrap(), name);
    }

    #[test]
    fn test_case_insensitive_eq_and_hash() {
        use std::collections::HashMap;

        let lower = Name::from_str("ns1.example.net").unwrap();
        let upper = Name::from_str("NS1.EXAMPLE.NET").unwrap();
        assert_eq!(lower, upper);

        let mut map = HashMap::new();
        map.insert(lower, 1);
        assert_eq!(map.get(&upper), Some(&1));
    }

    #[test]
    fn test_parent_chain() {
        let name = Name::from_str("a.b.c").unwrap();
        let b = name.parent().unwrap();
        assert_eq!(b.to_string(), "b.c.");
        let c = b.parent().unwrap();
        assert_eq!(c.to_string(), "c.");
        let root = c.parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_suffixes() {
        let name = Name::from_str("foo.bar.example").unwrap();
        let all: Vec<String> = name.suffixes().map(|n| n.to_string()).collect();
        assert_eq!(all, vec!["foo.bar.example.", "bar.example.", "example.", "."]);
    }

    #[test]
    fn test_ends_with() {
        let name = Name::from_str("ns1.example.com").unwrap();
        assert!(name.ends_with(&Name::from_str("EXAMPLE.com").unwrap()));
        assert!(name.ends_with(&Name::root()));
        assert!(name.ends_with(&name));
        assert!(!name.ends_with(&Name::from_str("other.com").unwrap()));
        assert!(!Name::from_str("com").unwrap().ends_with(&name));
    }

    #[test]
    fn test_from_message_plain() {
        let wire = [
            3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0,
        ];
        let (name, consumed) = Name::from_message(&wire, 0).unwrap();
        assert_eq!(name.to_string(), "www.example.com.");
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn test_from_message_compressed() {
        // example.com. at offset 0, www.<ptr 0> at offset 13.
        let wire = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, //
            3, b'w', b'w', b'w', 0xC0, 0x00,
        ];
        let (name, consumed) = Name::from_message(&wire, 13).unwrap();
        assert_eq!(name.to_string(), "www.example.com.");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_from_message_rejects_forward_pointer() {
        let wire = [0xC0, 0x00];
        assert!(matches!(
            Name::from_message(&wire, 0),
            Err(Error::BadPointer { .. })
        ));
    }

    #[test]
    fn test_label_too_long() {
        let label = "x".repeat(64);
        assert!(matches!(
            Name::from_str(&label),
            Err(Error::LabelTooLong { length: 64 })
        ));
    }

    #[test]
    fn test_name_too_long() {
        let long = vec!["abcdefgh"; 32].join(".");
        assert!(matches!(
            Name::from_str(&long),
            Err(Error::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_character() {
        assert!(matches!(
            Name::from_str("bad name.example"),
            Err(Error::InvalidLabelChar { character: ' ' })
        ));
    }
}
