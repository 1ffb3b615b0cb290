//! Root server hints.
//!
//! The compiled-in IANA root servers seed the delegation cache under the
//! root zone. The list changes rarely; staleness is accepted for a
//! diagnostic tool.

use crate::server::Server;
use std::net::IpAddr;
use std::str::FromStr;
use zonetrace_proto::Name;

/// TTL the root NS set is published with.
const ROOT_TTL: u32 = 518_400;

/// A root server hint.
#[derive(Debug, Clone)]
pub struct RootHint {
    /// Hostname of the root server.
    pub name: &'static str,
    /// IPv4 address.
    pub ipv4: &'static str,
    /// IPv6 address.
    pub ipv6: &'static str,
}

/// IANA root servers.
pub static ROOT_HINTS: &[RootHint] = &[
    RootHint {
        name: "a.root-servers.net.",
        ipv4: "198.41.0.4",
        ipv6: "2001:503:ba3e::2:30",
    },
    RootHint {
        name: "b.root-servers.net.",
        ipv4: "199.9.14.201",
        ipv6: "2001:500:200::b",
    },
    RootHint {
        name: "c.root-servers.net.",
        ipv4: "192.33.4.12",
        ipv6: "2001:500:2::c",
    },
    RootHint {
        name: "d.root-servers.net.",
        ipv4: "199.7.91.13",
        ipv6: "2001:500:2d::d",
    },
    RootHint {
        name: "e.root-servers.net.",
        ipv4: "192.203.230.10",
        ipv6: "2001:500:a8::e",
    },
    RootHint {
        name: "f.root-servers.net.",
        ipv4: "192.5.5.241",
        ipv6: "2001:500:2f::f",
    },
    RootHint {
        name: "g.root-servers.net.",
        ipv4: "192.112.36.4",
        ipv6: "2001:500:12::d0d",
    },
    RootHint {
        name: "h.root-servers.net.",
        ipv4: "198.97.190.53",
        ipv6: "2001:500:1::53",
    },
    RootHint {
        name: "i.root-servers.net.",
        ipv4: "192.36.148.17",
        ipv6: "2001:7fe::53",
    },
    RootHint {
        name: "j.root-servers.net.",
        ipv4: "192.58.128.30",
        ipv6: "2001:503:c27::2:30",
    },
    RootHint {
        name: "k.root-servers.net.",
        ipv4: "193.0.14.129",
        ipv6: "2001:7fd::1",
    },
    RootHint {
        name: "l.root-servers.net.",
        ipv4: "199.7.83.42",
        ipv6: "2001:500:9f::42",
    },
    RootHint {
        name: "m.root-servers.net.",
        ipv4: "202.12.27.33",
        ipv6: "2001:dc3::35",
    },
];

/// Builds the root server set for seeding a delegation cache.
///
/// The hints count as glued: their addresses ship with the binary, so no
/// lookup is ever spent on them.
pub fn root_servers() -> Vec<Server> {
    ROOT_HINTS
        .iter()
        .filter_map(|hint| {
            let name = Name::from_str(hint.name).ok()?;
            let addrs: Vec<IpAddr> = [hint.ipv4, hint.ipv6]
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            Some(Server::glued(name, ROOT_TTL, addrs))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_roots() {
        let roots = root_servers();
        assert_eq!(roots.len(), 13);
        for server in &roots {
            assert!(server.has_glue);
            assert_eq!(server.addrs.len(), 2, "{} lacks an address", server.name);
            assert_eq!(server.ttl, ROOT_TTL);
        }
    }

    #[test]
    fn test_known_addresses() {
        let roots = root_servers();
        let a = &roots[0];
        assert_eq!(a.name.to_string(), "a.root-servers.net.");
        assert!(a.addrs.contains(&"198.41.0.4".parse().unwrap()));
        assert!(a.addrs.contains(&"2001:503:ba3e::2:30".parse().unwrap()));
    }
}
