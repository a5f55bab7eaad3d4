//! `Endpoint` owns the UDP socket, the 4-tuple, the handshake-derived
//! sequence counters, the FSM state, and the receive buffer. One `Endpoint`
//! models one connection; there is no listener socket that fans out to
//! many peers.

mod handshake;
mod state;
mod teardown;
mod transfer;

pub use state::State;
pub use transfer::RecvOutcome;

use std::net::{SocketAddrV4, UdpSocket};

use log::debug;

use crate::config::Config;
use crate::crypto::RandomKey;
use crate::error::{MicrotcpError, Result};

/// POSIX `shutdown(2)`-style half-close selector. Reserved: this crate
/// only implements full bidirectional teardown, so every variant
/// currently drives the same FIN|ACK exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    Read,
    Write,
    ReadWrite,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_lost: u64,
}

/// One microTCP connection endpoint.
pub struct Endpoint {
    sd: Option<UdpSocket>,
    saddr: Option<SocketAddrV4>,
    daddr: Option<SocketAddrV4>,

    state: State,

    seq_number: u32,
    ack_number: u32,
    peer_seq_number: u32,
    control: u16,

    recvbuf: Vec<u8>,

    config: Config,
    key: RandomKey,

    counters: Counters,
}

impl Endpoint {
    /// Acquire the process's initial-sequence-number key. There is no
    /// `domain`/`type`/`protocol` BSD socket argument: the endpoint only
    /// ever drives a UDP socket internally and presents a stream-like
    /// contract, so there is no argument through which a caller could ask
    /// for the wrong underlying socket type in the first place.
    pub fn new(config: Config) -> Result<Self> {
        let key = RandomKey::new()?;

        Ok(Endpoint {
            sd: None,
            saddr: None,
            daddr: None,
            state: State::Invalid,
            seq_number: 0,
            ack_number: 0,
            peer_seq_number: 0,
            control: 0,
            recvbuf: Vec::new(),
            config,
            key,
            counters: Counters::default(),
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.saddr
    }

    pub fn peer_addr(&self) -> Option<SocketAddrV4> {
        self.daddr
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    fn require_state(&self, expected: State) -> Result<()> {
        if self.state != expected {
            return Err(MicrotcpError::WrongState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.state = State::Invalid;
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.sd
            .as_ref()
            .ok_or(MicrotcpError::NotConnected(self.state))
    }

    /// `siphash_3u32(saddr.ip, daddr.ip, (saddr.port<<16)|daddr.port, key, C, D)`
    /// truncated to 32 bits.
    fn derive_isn(&self) -> u32 {
        let saddr = self.saddr.expect("derive_isn requires a bound local address");
        let daddr = self.daddr.expect("derive_isn requires a resolved peer address");

        let src_ip = u32::from_be_bytes(saddr.ip().octets());
        let dst_ip = u32::from_be_bytes(daddr.ip().octets());
        let ports = ((saddr.port() as u32) << 16) | daddr.port() as u32;

        let hash = crate::crypto::siphash_3u32(
            src_ip,
            dst_ip,
            ports,
            self.key.siphash_key(),
            self.config.siphash_c,
            self.config.siphash_d,
        );

        debug!(
            "derived ISN {} for {}->{}",
            hash as u32, saddr, daddr
        );

        hash as u32
    }

    fn has_control(&self, flag: u16) -> bool {
        self.control & flag == flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_endpoint_starts_invalid() {
        let endpoint = Endpoint::new(Config::default()).unwrap();
        assert_eq!(endpoint.state(), State::Invalid);
        assert!(endpoint.local_addr().is_none());
        assert!(endpoint.peer_addr().is_none());
    }
}
