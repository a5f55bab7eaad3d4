//! Three-way SYN / SYN+ACK / ACK handshake: active open (`connect`) and
//! passive open (`accept`).

use std::net::{SocketAddrV4, UdpSocket};

use log::info;

use crate::error::{MicrotcpError, Result};
use crate::segment::{control, Segment};

use super::{Endpoint, State};

impl Endpoint {
    /// `BOUND ← INVALID`. Binds the UDP socket to `local_addr` and records
    /// `saddr`. On OS failure the endpoint becomes `INVALID` (dead-letter,
    /// no recovery).
    pub fn bind(&mut self, local_addr: SocketAddrV4) -> Result<()> {
        self.require_state(State::Invalid)?;

        match UdpSocket::bind(local_addr) {
            Ok(socket) => {
                self.sd = Some(socket);
                self.saddr = Some(local_addr);
                self.state = State::Bound;
                info!("bound to {local_addr}");
                Ok(())
            }
            Err(e) => {
                self.invalidate();
                Err(MicrotcpError::IoError(e))
            }
        }
    }

    /// Active open: `BOUND -> SYN_SENT -> ESTABLISHED`.
    pub fn connect(&mut self, remote_addr: SocketAddrV4) -> Result<()> {
        self.require_state(State::Bound)?;

        self.socket()?.connect(remote_addr).map_err(|e| {
            self.invalidate();
            MicrotcpError::IoError(e)
        })?;

        self.recvbuf = vec![0u8; self.config.recvbuf];
        self.daddr = Some(remote_addr);

        self.seq_number = self.derive_isn();
        self.control = control::SYN;
        self.state = State::SynSent;

        // SYN carries no ACK bit, so the send path's stop-and-wait rule
        // blocks here for the peer's SYN+ACK and updates
        // `peer_seq_number`/`ack_number` from it.
        self.send_segment(&[])?;

        self.ack_number = self.peer_seq_number.wrapping_add(1);
        self.control = control::ACK;
        self.send_segment(&[])?;

        self.state = State::Established;
        info!("connection established to {remote_addr} (active open)");

        Ok(())
    }

    /// Passive open: `BOUND -> LISTEN -> SYN_RCVD -> ESTABLISHED`.
    pub fn accept(&mut self) -> Result<SocketAddrV4> {
        self.require_state(State::Bound)?;

        self.recvbuf = vec![0u8; self.config.recvbuf];
        self.state = State::Listen;
        info!("listening on {:?}", self.saddr);

        let (n, peer) = self
            .socket()?
            .recv_from(&mut self.recvbuf)
            .map_err(|e| {
                self.invalidate();
                MicrotcpError::IoError(e)
            })?;
        self.counters.packets_received += 1;

        let peer = match peer {
            std::net::SocketAddr::V4(v4) => v4,
            std::net::SocketAddr::V6(_) => {
                self.invalidate();
                return Err(MicrotcpError::IoError(std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "microTCP is IPv4-only",
                )));
            }
        };
        self.daddr = Some(peer);
        self.state = State::SynRcvd;

        if !Segment::verify_checksum(&self.recvbuf[..n]) {
            self.invalidate();
            return Err(MicrotcpError::IntegrityError {
                reason: "SYN failed CRC32 verification",
            });
        }

        let (syn_header, _) = Segment::parse(&self.recvbuf[..n]);
        if !syn_header.has(control::SYN) {
            self.invalidate();
            return Err(MicrotcpError::IntegrityError {
                reason: "expected SYN while in LISTEN",
            });
        }

        self.socket()?.connect(peer).map_err(|e| {
            self.invalidate();
            MicrotcpError::IoError(e)
        })?;

        self.ack_number = syn_header.seq_number.wrapping_add(1);
        self.seq_number = self.derive_isn();
        self.control = control::SYN | control::ACK;

        // SYN+ACK carries SYN, so the send path blocks for the peer's
        // final ACK and updates `peer_seq_number`/`ack_number` from it.
        self.send_segment(&[])?;

        self.state = State::Established;
        info!("connection established with {peer} (passive open)");

        Ok(peer)
    }
}
