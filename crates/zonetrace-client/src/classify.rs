//! Response classification.
//!
//! After each fan-out the driver needs to know whether the fastest reply
//! ends the query, redirects it, or hands it to the next zone down. The
//! classifier is total: anything that is neither an answer, an alias,
//! nor a deeper referral terminates the trace as [`ResponseKind::Final`]
//! (for example NOERROR with an empty answer section).

use std::fmt;
use zonetrace_proto::{Message, Name, RecordType};

/// How a response advances the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Referral to a more specific zone.
    Delegation,
    /// The answer aliases the name elsewhere.
    Cname,
    /// Terminal response, with or without an answer.
    Final,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Delegation => "delegation",
            Self::Cname => "cname",
            Self::Final => "final",
        };
        f.write_str(s)
    }
}

/// A classified response.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The kind driving the next driver action.
    pub kind: ResponseKind,
    /// On [`ResponseKind::Cname`], the owner of the last alias followed
    /// and the name the query should continue under.
    pub cname: Option<(Name, Name)>,
    /// On [`ResponseKind::Delegation`], the zone being delegated to.
    pub zone: Option<Name>,
}

/// Classifies `msg` against the question `(qname, qtype)` and the deepest
/// delegation label seen so far.
///
/// Answer records are scanned in order. A record matching the chased name
/// and query type wins immediately; CNAMEs retarget the chased name as
/// they are met, so an alias and its address in one response classify as
/// [`ResponseKind::Final`]. A referral counts only if its owner is deeper
/// than `zone`, which is what forces progress and rules out upward or
/// sideways referrals.
pub fn classify(msg: &Message, qname: &Name, qtype: u16, zone: &Name) -> Classification {
    let mut chased = qname.clone();
    let mut cname: Option<(Name, Name)> = None;

    for rr in msg.answers() {
        if rr.name == chased && rr.rtype == qtype {
            return Classification {
                kind: ResponseKind::Final,
                cname: None,
                zone: None,
            };
        }
        if let Some(target) = rr.rdata.as_cname() {
            if rr.name == chased {
                cname = Some((rr.name.clone(), target.clone()));
                chased = target.clone();
            }
        }
    }

    if let Some((owner, target)) = cname {
        return Classification {
            kind: ResponseKind::Cname,
            cname: Some((owner, target)),
            zone: None,
        };
    }

    for rr in msg.authority() {
        // DS and SOA records in the authority section never mark a zone cut.
        if rr.rtype != RecordType::NS.to_u16() {
            continue;
        }
        if rr.name.label_count() > zone.label_count() {
            return Classification {
                kind: ResponseKind::Delegation,
                cname: None,
                zone: Some(rr.name.clone()),
            };
        }
    }

    Classification {
        kind: ResponseKind::Final,
        cname: None,
        zone: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use zonetrace_proto::{Question, Record};

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn query(qname: &str) -> Message {
        Message::query(Question::new(name(qname), RecordType::A))
    }

    fn a_type() -> u16 {
        RecordType::A.to_u16()
    }

    #[test]
    fn test_direct_answer_is_final() {
        let mut msg = Message::response_to(&query("example.com"));
        msg.add_answer(Record::a(
            name("example.com"),
            300,
            Ipv4Addr::new(93, 184, 216, 34),
        ));

        let cls = classify(&msg, &name("example.com"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Final);
    }

    #[test]
    fn test_answer_owner_compared_case_insensitively() {
        let mut msg = Message::response_to(&query("example.com"));
        msg.add_answer(Record::a(
            name("EXAMPLE.COM"),
            300,
            Ipv4Addr::new(93, 184, 216, 34),
        ));

        let cls = classify(&msg, &name("example.com"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Final);
    }

    #[test]
    fn test_bare_cname() {
        let mut msg = Message::response_to(&query("www.example.net"));
        msg.add_answer(Record::cname(
            name("www.example.net"),
            300,
            name("alias.example.org"),
        ));

        let cls = classify(&msg, &name("www.example.net"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Cname);
        let (owner, target) = cls.cname.unwrap();
        assert_eq!(owner, name("www.example.net"));
        assert_eq!(target, name("alias.example.org"));
    }

    #[test]
    fn test_cname_with_target_answer_is_final() {
        // The alias and the address it resolves to arrive together.
        let mut msg = Message::response_to(&query("www.example.net"));
        msg.add_answer(Record::cname(
            name("www.example.net"),
            300,
            name("alias.example.org"),
        ));
        msg.add_answer(Record::a(
            name("alias.example.org"),
            300,
            Ipv4Addr::new(203, 0, 113, 7),
        ));

        let cls = classify(&msg, &name("www.example.net"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Final);
    }

    #[test]
    fn test_cname_chain_reports_last_hop() {
        let mut msg = Message::response_to(&query("www.example.net"));
        msg.add_answer(Record::cname(name("www.example.net"), 300, name("a.example.org")));
        msg.add_answer(Record::cname(name("a.example.org"), 300, name("b.example.org")));

        let cls = classify(&msg, &name("www.example.net"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Cname);
        let (owner, target) = cls.cname.unwrap();
        assert_eq!(owner, name("a.example.org"));
        assert_eq!(target, name("b.example.org"));
    }

    #[test]
    fn test_delegation_requires_deeper_owner() {
        let mut msg = Message::response_to(&query("www.example.com"));
        msg.add_authority(Record::ns(name("com"), 172800, name("a.gtld-servers.net")));

        let cls = classify(&msg, &name("www.example.com"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Delegation);
        assert_eq!(cls.zone.unwrap(), name("com"));

        // The same referral while already at com. is no progress.
        let cls = classify(&msg, &name("www.example.com"), a_type(), &name("com"));
        assert_eq!(cls.kind, ResponseKind::Final);
    }

    #[test]
    fn test_ds_records_do_not_delegate() {
        use zonetrace_proto::RData;

        let mut msg = Message::response_to(&query("www.example.com"));
        msg.add_authority(Record {
            name: name("example.com"),
            rtype: RecordType::DS.to_u16(),
            rclass: 1,
            ttl: 86400,
            rdata: RData::Ds {
                key_tag: 370,
                algorithm: 13,
                digest_type: 2,
                digest: vec![0xAB; 32],
            },
        });

        let cls = classify(&msg, &name("www.example.com"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Final);
    }

    #[test]
    fn test_first_ns_owner_sets_zone() {
        let mut msg = Message::response_to(&query("www.example.com"));
        msg.add_authority(Record::ns(name("example.com"), 3600, name("ns1.example.com")));
        msg.add_authority(Record::ns(name("com"), 172800, name("a.gtld-servers.net")));

        let cls = classify(&msg, &name("www.example.com"), a_type(), &Name::root());
        assert_eq!(cls.zone.unwrap(), name("example.com"));
    }

    #[test]
    fn test_empty_noerror_is_final() {
        let msg = Message::response_to(&query("example.com"));
        let cls = classify(&msg, &name("example.com"), a_type(), &Name::root());
        assert_eq!(cls.kind, ResponseKind::Final);
        assert!(cls.cname.is_none());
        assert!(cls.zone.is_none());
    }
}
