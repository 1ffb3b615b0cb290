//! Name servers and per-server responses.

use crate::TraceError;
use std::fmt;
use std::net::IpAddr;
use std::ops::Deref;
use std::time::Duration;
use zonetrace_proto::{Message, Name};

/// A name server learned from a delegation.
///
/// `addrs` may be empty until the address-completion pass has run; the
/// cost of that pass is kept on `lookup_rtt` so the reported cold path
/// includes it.
#[derive(Debug, Clone)]
pub struct Server {
    /// FQDN of the server.
    pub name: Name,
    /// True if the addresses came from the parent's additional section.
    pub has_glue: bool,
    /// TTL of the NS record that introduced the server.
    pub ttl: u32,
    /// Known addresses, IPv4 and IPv6 mixed.
    pub addrs: Vec<IpAddr>,
    /// Time spent resolving `addrs` when not glued.
    pub lookup_rtt: Duration,
    /// Failure of the address resolution, if any.
    pub lookup_err: Option<TraceError>,
}

impl Server {
    /// Creates a server from a delegation, glued or not.
    pub fn new(name: Name, ttl: u32, addrs: Vec<IpAddr>) -> Self {
        Self {
            name,
            has_glue: !addrs.is_empty(),
            ttl,
            addrs,
            lookup_rtt: Duration::ZERO,
            lookup_err: None,
        }
    }

    /// Creates a server whose addresses are known a priori.
    pub fn glued(name: Name, ttl: u32, addrs: Vec<IpAddr>) -> Self {
        Self {
            name,
            has_glue: true,
            ttl,
            addrs,
            lookup_rtt: Duration::ZERO,
            lookup_err: None,
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.name)?;
        for (i, addr) in self.addrs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{addr}")?;
        }
        f.write_str(")")
    }
}

/// The outcome of one wire exchange with one server address.
#[derive(Debug, Clone)]
pub struct Response {
    /// The server that was queried.
    pub server: Server,
    /// The address the query went to.
    pub addr: IpAddr,
    /// The reply, absent on error.
    pub msg: Option<Message>,
    /// Round-trip time of the exchange.
    pub rtt: Duration,
    /// Transport failure, if any.
    pub err: Option<TraceError>,
}

impl Response {
    /// Total cost of this response on a cold cache: the exchange itself
    /// plus whatever it took to learn the server's address.
    pub fn cold_rtt(&self) -> Duration {
        self.rtt + self.server.lookup_rtt
    }
}

/// All responses gathered by one fan-out.
#[derive(Debug, Clone, Default)]
pub struct Responses(pub Vec<Response>);

impl Responses {
    /// Returns the successful response with the lowest cold-path cost,
    /// or `None` if every exchange failed.
    ///
    /// Ties keep the earliest response so the choice is deterministic.
    pub fn fastest(&self) -> Option<&Response> {
        let mut best: Option<&Response> = None;
        for r in self.0.iter() {
            if r.err.is_some() || r.msg.is_none() {
                continue;
            }
            match best {
                Some(b) if r.cold_rtt() >= b.cold_rtt() => {}
                _ => best = Some(r),
            }
        }
        best
    }
}

impl Deref for Responses {
    type Target = [Response];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Response> for Responses {
    fn from_iter<I: IntoIterator<Item = Response>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Responses {
    type Item = &'a Response;
    type IntoIter = std::slice::Iter<'a, Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use zonetrace_proto::{Question, RecordType};

    fn server(name: &str, lookup_ms: u64) -> Server {
        let mut s = Server::glued(
            Name::from_str(name).unwrap(),
            3600,
            vec!["192.0.2.1".parse().unwrap()],
        );
        s.lookup_rtt = Duration::from_millis(lookup_ms);
        s
    }

    fn response(name: &str, rtt_ms: u64, lookup_ms: u64, err: Option<TraceError>) -> Response {
        let msg = err.is_none().then(|| {
            Message::query(Question::new(
                Name::from_str("example.com").unwrap(),
                RecordType::A,
            ))
        });
        Response {
            server: server(name, lookup_ms),
            addr: "192.0.2.1".parse().unwrap(),
            msg,
            rtt: Duration::from_millis(rtt_ms),
            err,
        }
    }

    #[test]
    fn test_fastest_skips_errors() {
        let rs = Responses(vec![
            response("a.example.", 1, 0, Some(TraceError::Timeout)),
            response("b.example.", 80, 0, None),
            response("c.example.", 20, 0, None),
        ]);
        assert_eq!(rs.fastest().unwrap().server.name.to_string(), "c.example.");
    }

    #[test]
    fn test_fastest_counts_lookup_cost() {
        // 20ms exchange + 100ms lookup loses to a plain 80ms exchange.
        let rs = Responses(vec![
            response("slow-lookup.example.", 20, 100, None),
            response("glued.example.", 80, 0, None),
        ]);
        assert_eq!(
            rs.fastest().unwrap().server.name.to_string(),
            "glued.example."
        );
    }

    #[test]
    fn test_fastest_none_when_all_failed() {
        let rs = Responses(vec![
            response("a.example.", 1, 0, Some(TraceError::Timeout)),
            response("b.example.", 2, 0, Some(TraceError::Network("eh".into()))),
        ]);
        assert!(rs.fastest().is_none());
        assert!(Responses::default().fastest().is_none());
    }

    #[test]
    fn test_fastest_tie_keeps_first() {
        let rs = Responses(vec![
            response("first.example.", 10, 0, None),
            response("second.example.", 10, 0, None),
        ]);
        assert_eq!(
            rs.fastest().unwrap().server.name.to_string(),
            "first.example."
        );
    }
}
