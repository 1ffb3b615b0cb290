//! # zonetrace wire format
//!
//! DNS protocol types for the zonetrace delegation tracer: domain names
//! with compression-aware parsing, messages with their four sections, and
//! EDNS(0) parameters carried on the OPT pseudo-record.
//!
//! The crate deliberately covers only what an iterative tracer meets on
//! the wire. Record types without a typed representation are preserved as
//! opaque bytes and printed in the RFC 3597 generic form, so unknown data
//! never fails a parse.
//!
//! ## Example
//!
//! ```
//! use zonetrace_proto::{Edns, Message, Name, Question, RecordType};
//! use std::str::FromStr;
//!
//! let mut query = Message::query(Question::new(
//!     Name::from_str("example.com.").unwrap(),
//!     RecordType::A,
//! ));
//! query.set_edns(Edns::with_dnssec_ok());
//!
//! let wire = query.to_wire();
//! let parsed = Message::parse(&wire).unwrap();
//! assert_eq!(parsed, query);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod edns;
pub mod error;
pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod rdata;
pub mod record;

pub use edns::Edns;
pub use error::{Error, Result};
pub use header::{Flags, Header};
pub use iana::{OpCode, Rcode, RecordClass, RecordType};
pub use message::Message;
pub use name::Name;
pub use question::Question;
pub use rdata::RData;
pub use record::Record;

/// Maximum length of a label (RFC 1035).
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum wire length of a name (RFC 1035).
pub const MAX_NAME_LEN: usize = 255;

/// EDNS(0) UDP payload size advertised in queries.
pub const DEFAULT_UDP_PAYLOAD: u16 = 4096;

/// The DNS port.
pub const DNS_PORT: u16 = 53;
