//! The iterative driver.
//!
//! [`Client::resolve`] walks a query from the root servers down: pick the
//! deepest cached delegation, fill in any missing name server addresses
//! (itself a full nested resolution), fan the question out to every
//! address, classify the fastest reply, and either descend, follow an
//! alias, or stop. Every nested resolution shares the caches of the
//! outer one.

use crate::cache::{DelegationCache, LookupCache};
use crate::classify::{classify, ResponseKind};
use crate::server::{Response, Responses, Server};
use crate::trace::Tracer;
use crate::transport::{server_addr, Exchanger, UdpExchanger};
use crate::{ClientConfig, Result, TraceError};
use futures::future::{join_all, BoxFuture, FutureExt};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;
use zonetrace_proto::{Message, Name, RecordType};

/// The outcome of a completed trace.
///
/// `answer` is `None` when the iteration budget ran out before the chain
/// terminated; callers treat that as failure. `rtt` is the cold best
/// path: the summed cost of the fastest successful response at each hop,
/// including time spent resolving unglued server addresses.
#[derive(Debug, Clone)]
pub struct Trace {
    /// The terminal response, if the chain terminated.
    pub answer: Option<Message>,
    /// Accumulated cold-path round-trip time.
    pub rtt: Duration,
}

/// Result of one name server address resolution.
struct HostLookup {
    addrs: Vec<IpAddr>,
    rtt: Duration,
    err: Option<TraceError>,
}

/// A parallel iterative DNS client.
///
/// The client and its two caches live for one top-level query; drop the
/// client to drop everything it learned.
pub struct Client {
    config: ClientConfig,
    exchanger: Arc<dyn Exchanger>,
    delegations: DelegationCache,
    lookups: LookupCache,
}

impl Client {
    /// Creates a client speaking UDP with the configured timeout.
    pub fn new(config: ClientConfig) -> Self {
        let exchanger = Arc::new(UdpExchanger::new(config.timeout));
        Self::with_exchanger(config, exchanger)
    }

    /// Creates a client with a custom transport.
    pub fn with_exchanger(config: ClientConfig, exchanger: Arc<dyn Exchanger>) -> Self {
        Self {
            config,
            exchanger,
            delegations: DelegationCache::new(),
            lookups: LookupCache::new(),
        }
    }

    /// Returns the delegation cache.
    pub fn delegations(&self) -> &DelegationCache {
        &self.delegations
    }

    /// Returns the host address cache.
    pub fn lookups(&self) -> &LookupCache {
        &self.lookups
    }

    /// Resolves `query` iteratively from the roots, reporting each hop
    /// through `tracer`.
    ///
    /// The query must carry exactly one question. Its EDNS parameters are
    /// inherited by every wire exchange and nested resolution.
    pub async fn resolve(&self, query: &Message, tracer: &Tracer) -> Result<Trace> {
        let question = query
            .question()
            .cloned()
            .ok_or(TraceError::MissingQuestion)?;

        let mut message = query.clone();
        let mut qname = question.qname;
        let qtype = question.qtype;
        let mut zone = Name::root();
        let mut rtt = Duration::ZERO;

        for step in 1..=self.config.max_steps {
            let (label, mut servers) = self.delegations.get(&qname);
            debug!(step, %qname, zone = %label, servers = servers.len(), "querying hop");

            self.complete_addresses(&mut servers, &message).await;

            message.set_question_name(qname.clone());
            let responses = self.parallel_query(&message, &servers).await;

            let Some(fastest) = responses.fastest() else {
                return Err(match responses.first() {
                    Some(first) => TraceError::NoUsableResponse {
                        qname,
                        attempts: responses.len(),
                        cause: Box::new(first.err.clone().unwrap_or(TraceError::NoResponse)),
                    },
                    None => TraceError::NoResponse,
                });
            };
            rtt += fastest.cold_rtt();
            let Some(reply) = fastest.msg.clone() else {
                return Err(TraceError::NoResponse);
            };

            let cls = classify(&reply, &qname, qtype, &zone);

            if cls.kind == ResponseKind::Delegation {
                if let Some(new_zone) = &cls.zone {
                    zone = new_zone.clone();
                }
                self.record_delegation(&reply, tracer);
            }

            tracer.emit_response(step, &message, &responses, cls.kind);

            match cls.kind {
                ResponseKind::Cname => {
                    if let Some((owner, target)) = cls.cname {
                        tracer.emit_cname(&owner, &target);
                        debug!(from = %owner, to = %target, "following cname");
                        qname = target;
                        zone = Name::root();
                    }
                }
                ResponseKind::Final => {
                    return Ok(Trace {
                        answer: Some(reply),
                        rtt,
                    });
                }
                ResponseKind::Delegation => {}
            }
        }

        debug!(%qname, budget = self.config.max_steps, "iteration budget exhausted");
        Ok(Trace { answer: None, rtt })
    }

    /// Stores every NS of a referral, with its glue, in both caches.
    fn record_delegation(&self, reply: &Message, tracer: &Tracer) {
        for rr in reply.authority() {
            // Anything that is not an NS record (DS, RRSIG) is not a
            // delegation entry.
            let Some(target) = rr.rdata.as_ns() else {
                continue;
            };
            let glue: Vec<IpAddr> = reply
                .additional()
                .iter()
                .filter(|extra| &extra.name == target)
                .filter_map(|extra| extra.rdata.as_ip())
                .collect();

            if glue.is_empty() {
                debug!(server = %target, zone = %rr.name, "delegation without glue");
            }
            self.delegations
                .add(rr.name.clone(), Server::new(target.clone(), rr.ttl, glue.clone()));
            self.lookups.set(target, glue);

            if !tracer.observes_responses() {
                // Nobody reads per-server statistics; one server is
                // enough to advance.
                break;
            }
        }
    }

    /// Sends `query` to every address of every server concurrently and
    /// collects one [`Response`] per pair.
    ///
    /// Nothing is cancelled early: the per-server statistics are the
    /// tool's whole point, so even a hop that already has a winner waits
    /// for its stragglers (each bounded by the transport timeout).
    pub async fn parallel_query(&self, query: &Message, servers: &[Server]) -> Responses {
        let mut set = JoinSet::new();

        for server in servers {
            for addr in &server.addrs {
                let exchanger = Arc::clone(&self.exchanger);
                let query = query.clone();
                let server = server.clone();
                let addr = *addr;
                set.spawn(async move {
                    match exchanger.exchange(&query, server_addr(addr)).await {
                        Ok((msg, rtt)) => Response {
                            server,
                            addr,
                            msg: Some(msg),
                            rtt,
                            err: None,
                        },
                        Err(err) => Response {
                            server,
                            addr,
                            msg: None,
                            rtt: Duration::ZERO,
                            err: Some(err),
                        },
                    }
                });
            }
        }

        let mut responses = Vec::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(response) = joined {
                responses.push(response);
            }
        }
        Responses(responses)
    }

    /// Resolves addresses for every server that has none, in parallel,
    /// mutating the snapshot in place before the fan-out.
    async fn complete_addresses(&self, servers: &mut [Server], template: &Message) {
        let pending: Vec<usize> = servers
            .iter()
            .enumerate()
            .filter(|(_, s)| s.addrs.is_empty())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return;
        }

        let lookups = join_all(
            pending
                .iter()
                .map(|&i| self.lookup_host(servers[i].name.clone(), template)),
        )
        .await;

        for (&i, lookup) in pending.iter().zip(lookups) {
            let server = &mut servers[i];
            server.addrs = lookup.addrs;
            server.lookup_rtt = lookup.rtt;
            server.lookup_err = lookup.err;
            if server.addrs.is_empty() {
                debug!(server = %server.name, "name server unresolved, skipping its fan-out");
            }
        }
    }

    /// Resolves A and AAAA for `host` through two nested traces sharing
    /// this client's caches.
    ///
    /// The address cache is consulted first and counts the attempt, so a
    /// host that keeps failing becomes unresolvable once it exhausts its
    /// retry budget instead of recursing forever. Boxing breaks the
    /// otherwise infinite future type of resolve calling itself.
    fn lookup_host<'a>(&'a self, host: Name, template: &'a Message) -> BoxFuture<'a, HostLookup> {
        async move {
            let cached = self.lookups.get(&host);
            if !cached.addrs.is_empty() || cached.retry_count > self.config.max_retry {
                return HostLookup {
                    addrs: cached.addrs,
                    rtt: Duration::ZERO,
                    err: None,
                };
            }
            self.lookups.inc_attempt(&host);

            let mut query_a = template.clone();
            if let Some(q) = query_a.question_mut() {
                q.qname = host.clone();
                q.qtype = RecordType::A.to_u16();
            }
            let mut query_aaaa = query_a.clone();
            if let Some(q) = query_aaaa.question_mut() {
                q.qtype = RecordType::AAAA.to_u16();
            }

            let silent = Tracer::silent();
            let (res_a, res_aaaa) = tokio::join!(
                self.resolve(&query_a, &silent),
                self.resolve(&query_aaaa, &silent),
            );

            let mut addrs = Vec::new();
            let mut rtt = Duration::ZERO;
            for result in [res_a, res_aaaa] {
                match result {
                    Ok(trace) => {
                        // The two queries ran in parallel; wall time is
                        // the longer of them.
                        rtt = rtt.max(trace.rtt);
                        if let Some(answer) = trace.answer {
                            addrs.extend(
                                answer.answers().iter().filter_map(|rr| rr.rdata.as_ip()),
                            );
                        }
                    }
                    Err(err) => {
                        debug!(%host, error = %err, "address resolution failed");
                        return HostLookup {
                            addrs: Vec::new(),
                            rtt: Duration::ZERO,
                            err: Some(err),
                        };
                    }
                }
            }

            self.lookups.set(&host, addrs.clone());
            HostLookup {
                addrs,
                rtt,
                err: None,
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::SocketAddr;
    use std::str::FromStr;
    use zonetrace_proto::Question;

    struct RefusingExchanger;

    #[async_trait]
    impl Exchanger for RefusingExchanger {
        async fn exchange(
            &self,
            _query: &Message,
            _addr: SocketAddr,
        ) -> Result<(Message, Duration)> {
            Err(TraceError::Timeout)
        }
    }

    fn client() -> Client {
        Client::with_exchanger(ClientConfig::default(), Arc::new(RefusingExchanger))
    }

    #[tokio::test]
    async fn test_missing_question_is_rejected() {
        // An all-zero header parses as a message without a question.
        let empty = Message::parse(&[0u8; 12]).unwrap();

        let err = client().resolve(&empty, &Tracer::silent()).await.unwrap_err();
        assert!(matches!(err, TraceError::MissingQuestion));
    }

    #[tokio::test]
    async fn test_all_failures_surface_first_cause() {
        let query = Message::query(Question::new(
            Name::from_str("example.com").unwrap(),
            RecordType::A,
        ));
        let err = client().resolve(&query, &Tracer::silent()).await.unwrap_err();

        match err {
            TraceError::NoUsableResponse {
                qname,
                attempts,
                cause,
            } => {
                assert_eq!(qname, Name::from_str("example.com").unwrap());
                // 13 roots with two addresses each.
                assert_eq!(attempts, 26);
                assert!(matches!(*cause, TraceError::Timeout));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
