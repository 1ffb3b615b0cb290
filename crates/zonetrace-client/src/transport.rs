//! Wire transport.
//!
//! The [`Exchanger`] trait is the engine's only I/O seam: one message out
//! to one address, one reply back, with the round-trip time measured at
//! the caller's edge of the socket. Tests substitute a scripted
//! implementation; production uses [`UdpExchanger`].

use crate::{Result, TraceError};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::trace;
use zonetrace_proto::{Message, DNS_PORT};

/// Receive buffer size, matching the EDNS payload size we advertise.
const RECV_BUF: usize = 4096;

/// A single DNS exchange against one server address.
#[async_trait]
pub trait Exchanger: Send + Sync {
    /// Sends `query` to `addr` and awaits the matching reply.
    ///
    /// Implementations own the transaction ID: the caller's copy of the
    /// message is cloned and re-identified before every send, so one
    /// logical query can be in flight to many servers at once.
    async fn exchange(&self, query: &Message, addr: SocketAddr) -> Result<(Message, Duration)>;
}

/// Plain UDP on port 53.
#[derive(Debug, Clone)]
pub struct UdpExchanger {
    timeout: Duration,
}

impl UdpExchanger {
    /// Creates a transport with the given per-exchange deadline.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Exchanger for UdpExchanger {
    async fn exchange(&self, query: &Message, addr: SocketAddr) -> Result<(Message, Duration)> {
        let mut query = query.clone();
        query.set_id(rand::random());

        let start = Instant::now();
        let reply = tokio::time::timeout(self.timeout, exchange_udp(&query, addr))
            .await
            .map_err(|_| TraceError::Timeout)??;
        let rtt = start.elapsed();

        trace!(server = %addr, rtt_ms = rtt.as_millis() as u64, "exchange complete");
        Ok((reply, rtt))
    }
}

async fn exchange_udp(query: &Message, addr: SocketAddr) -> Result<Message> {
    let socket = match addr.ip() {
        IpAddr::V4(_) => UdpSocket::bind("0.0.0.0:0").await,
        IpAddr::V6(_) => UdpSocket::bind("[::]:0").await,
    }
    .map_err(io_error)?;
    socket.connect(addr).await.map_err(io_error)?;
    socket.send(&query.to_wire()).await.map_err(io_error)?;

    let mut buf = vec![0u8; RECV_BUF];
    // Datagrams from earlier queries on a reused port would carry a stale
    // ID; the socket is fresh here, so one mismatch is already suspect.
    loop {
        let len = socket.recv(&mut buf).await.map_err(io_error)?;
        let reply = Message::parse(&buf[..len])?;
        if reply.id() == query.id() {
            return Ok(reply);
        }
        trace!(server = %addr, got = reply.id(), want = query.id(), "dropping mismatched reply");
    }
}

fn io_error(err: std::io::Error) -> TraceError {
    TraceError::Network(err.to_string())
}

/// Builds the `ip:53` socket address for a name server address.
pub fn server_addr(ip: IpAddr) -> SocketAddr {
    SocketAddr::new(ip, DNS_PORT)
}
