//! # zonetrace resolution engine
//!
//! A parallel iterative DNS resolver built for observation rather than
//! speed. Starting from the root servers it walks the delegation chain
//! toward the servers authoritative for a name, follows CNAME chains, and
//! at every hop queries *all* known name server addresses concurrently so
//! each server's latency and failures can be reported.
//!
//! ## Structure
//!
//! - [`transport`]: the [`Exchanger`] trait and the UDP implementation
//! - [`cache`]: the delegation cache and the host address cache
//! - [`classify`]: decides whether a response is an answer, an alias,
//!   or a referral
//! - [`trace`]: observer hooks fired as the resolution advances
//! - [`client`]: the [`Client`] driving the whole loop
//!
//! The engine performs no DNSSEC validation; queries carry the DO bit
//! only so responses look like real resolver traffic.

use std::time::Duration;
use thiserror::Error;
use zonetrace_proto::Name;

pub mod cache;
pub mod classify;
pub mod client;
pub mod roots;
pub mod server;
pub mod trace;
pub mod transport;

pub use cache::{AddressAttempt, DelegationCache, LookupCache};
pub use classify::{classify, Classification, ResponseKind};
pub use client::{Client, Trace};
pub use roots::root_servers;
pub use server::{Response, Responses, Server};
pub use trace::Tracer;
pub use transport::{Exchanger, UdpExchanger};

/// Errors surfaced by the resolution engine.
///
/// Transport failures are usually carried as data on a [`Response`] and
/// only become a `TraceError` when a whole hop yields nothing usable.
#[derive(Error, Debug, Clone)]
pub enum TraceError {
    /// A wire exchange hit the per-query deadline.
    #[error("request timed out")]
    Timeout,

    /// Socket-level failure, carried as text so responses stay cloneable.
    #[error("network error: {0}")]
    Network(String),

    /// The reply datagram did not parse.
    #[error("malformed response: {0}")]
    Malformed(#[from] zonetrace_proto::Error),

    /// The reply carried a transaction ID we never sent.
    #[error("response transaction id mismatch")]
    IdMismatch,

    /// The query message has no question section.
    #[error("query carries no question")]
    MissingQuestion,

    /// A hop produced no responses at all.
    #[error("no response")]
    NoResponse,

    /// Every server address at a hop failed.
    #[error("no usable response for {qname} from {attempts} address(es): {cause}")]
    NoUsableResponse {
        /// The name being resolved when the hop failed.
        qname: Name,
        /// Number of addresses that were tried.
        attempts: usize,
        /// The first failure observed.
        cause: Box<TraceError>,
    },
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Tunables of a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hard deadline for a single wire exchange.
    pub timeout: Duration,

    /// Attempt ceiling for resolving one name server's addresses. Breaks
    /// the mutual recursion of name servers delegated through other
    /// unresolvable name servers.
    pub max_retry: u8,

    /// Maximum driver iterations per query, spanning referrals and CNAME
    /// follows. DNS delegation chains are rarely deeper than ten, but
    /// IPv6-only chains with long CNAME sequences need headroom.
    pub max_steps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            max_retry: 10,
            max_steps: 16,
        }
    }
}
