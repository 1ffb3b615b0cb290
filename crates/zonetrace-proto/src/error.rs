//! Wire format error types.

use thiserror::Error;

/// Result type alias for wire format operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing or building DNS messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The buffer ended before the expected data.
    #[error("truncated message: need {needed} bytes at offset {offset}")]
    Truncated {
        /// Offset at which more data was expected.
        offset: usize,
        /// Number of bytes that were needed.
        needed: usize,
    },

    /// A label exceeds the 63-byte limit of RFC 1035.
    #[error("label of {length} bytes exceeds the 63 byte limit")]
    LabelTooLong {
        /// Actual label length.
        length: usize,
    },

    /// A name exceeds the 255-byte wire limit of RFC 1035.
    #[error("name of {length} bytes exceeds the 255 byte limit")]
    NameTooLong {
        /// Actual wire length.
        length: usize,
    },

    /// A character not allowed in a hostname label.
    #[error("invalid character {character:?} in label")]
    InvalidLabelChar {
        /// The offending character.
        character: char,
    },

    /// A compression pointer that points forward or at itself.
    #[error("bad compression pointer at offset {offset} (target {target})")]
    BadPointer {
        /// Offset of the pointer.
        offset: usize,
        /// Offset the pointer refers to.
        target: usize,
    },

    /// Too many compression pointer hops while decoding one name.
    #[error("compression pointer chain too long at offset {offset}")]
    PointerChain {
        /// Offset where the limit was hit.
        offset: usize,
    },

    /// A label type with the reserved high bits 01 or 10.
    #[error("unsupported label type 0x{value:02x} at offset {offset}")]
    BadLabelType {
        /// Offset of the length byte.
        offset: usize,
        /// The length byte value.
        value: u8,
    },

    /// More than one OPT pseudo-record in a message.
    #[error("message carries more than one OPT record")]
    DuplicateOpt,

    /// RDATA whose length does not match its record type.
    #[error("malformed {rtype} rdata of {length} bytes")]
    BadRdata {
        /// Name of the record type.
        rtype: &'static str,
        /// Observed RDATA length.
        length: usize,
    },
}

impl Error {
    /// Shorthand for a truncation error.
    pub(crate) fn truncated(offset: usize, needed: usize) -> Self {
        Self::Truncated { offset, needed }
    }
}
