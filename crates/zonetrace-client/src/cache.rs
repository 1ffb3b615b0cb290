//! The two in-process caches feeding the driver.
//!
//! Both live for one top-level query and are shared with every nested
//! name-server address resolution, which is what lets the retry ceiling
//! in [`LookupCache`] terminate mutually recursive delegations. Locks
//! are never held across I/O.

use crate::roots::root_servers;
use crate::server::Server;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;
use zonetrace_proto::Name;

/// Zone label to name server set, looked up by longest suffix.
///
/// Entries never expire within a run; the tool exists to observe one
/// cold resolution, not to serve traffic.
pub struct DelegationCache {
    zones: Mutex<HashMap<Name, Vec<Server>>>,
}

impl DelegationCache {
    /// Creates a cache with the root zone seeded from the built-in hints.
    pub fn new() -> Self {
        let mut zones = HashMap::new();
        zones.insert(Name::root(), root_servers());
        Self {
            zones: Mutex::new(zones),
        }
    }

    /// Returns the most specific cached zone for `name` and a snapshot of
    /// its servers. Falls back to the root zone, which is always present.
    pub fn get(&self, name: &Name) -> (Name, Vec<Server>) {
        let zones = self.zones.lock();
        for suffix in name.suffixes() {
            if let Some(servers) = zones.get(&suffix) {
                return (suffix, servers.clone());
            }
        }
        // Unreachable while the root stays seeded, but harmless.
        (Name::root(), root_servers())
    }

    /// Adds `server` as a delegation for `zone` unless a server of the
    /// same name (case-insensitive) is already recorded there. Returns
    /// whether the server was inserted.
    pub fn add(&self, zone: Name, server: Server) -> bool {
        let mut zones = self.zones.lock();
        let bucket = zones.entry(zone).or_default();
        if bucket.iter().any(|s| s.name == server.name) {
            return false;
        }
        bucket.push(server);
        true
    }

    /// Returns the number of cached zones.
    pub fn len(&self) -> usize {
        self.zones.lock().len()
    }

    /// Returns true if no zone is cached. Never the case in practice,
    /// the constructor seeds the root.
    pub fn is_empty(&self) -> bool {
        self.zones.lock().is_empty()
    }
}

impl Default for DelegationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// What is known about one hostname's addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressAttempt {
    /// Addresses learned so far.
    pub addrs: Vec<IpAddr>,
    /// Resolution attempts made while no address was known. Frozen once
    /// an address is cached.
    pub retry_count: u8,
}

/// Hostname to address cache bounding nested resolutions.
///
/// A host with no addresses and `retry_count` past the ceiling is
/// treated as unresolvable for the rest of the run. The counter is a
/// cycle breaker, not a policy timer.
pub struct LookupCache {
    hosts: Mutex<HashMap<Name, AddressAttempt>>,
}

impl LookupCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the recorded state for `host`, empty if never seen.
    pub fn get(&self, host: &Name) -> AddressAttempt {
        self.hosts.lock().get(host).cloned().unwrap_or_default()
    }

    /// Records resolved addresses for `host`.
    ///
    /// A non-empty set replaces the entry and freezes the retry counter.
    /// An empty set only bumps the counter, and only while no addresses
    /// are cached.
    pub fn set(&self, host: &Name, addrs: Vec<IpAddr>) {
        let mut hosts = self.hosts.lock();
        let entry = hosts.entry(host.clone()).or_default();
        if addrs.is_empty() {
            if entry.addrs.is_empty() {
                entry.retry_count = entry.retry_count.saturating_add(1);
            }
            return;
        }
        *entry = AddressAttempt {
            addrs,
            retry_count: 1,
        };
    }

    /// Counts one resolution attempt for `host` while unresolved.
    pub fn inc_attempt(&self, host: &Name) {
        let mut hosts = self.hosts.lock();
        let entry = hosts.entry(host.clone()).or_default();
        if entry.addrs.is_empty() {
            entry.retry_count = entry.retry_count.saturating_add(1);
        }
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new()
    }
}
