//! MSS-bounded segmentation on send, single-segment receive with an
//! inline ACK.

use log::{trace, warn};

use crate::error::{MicrotcpError, Result};
use crate::segment::{control, Header, Segment, HEADER_SIZE};

use super::{Endpoint, State};

/// Outcome of a [`Endpoint::recv`] call: a proper enumeration instead of a
/// sentinel return value, so a peer-initiated close can't be confused with
/// an ordinary error or a short read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// `n` bytes were copied into the caller's buffer.
    Data(usize),
    /// The peer closed the connection; this endpoint already ran its side
    /// of teardown and is now `CLOSED`.
    PeerClosed,
}

impl Endpoint {
    /// Send `buffer` to the peer, fragmenting into `config.mss`-sized
    /// chunks and requiring `ESTABLISHED` (payload-bearing segments are
    /// only accepted in that state).
    pub fn send(&mut self, buffer: &[u8]) -> Result<usize> {
        self.require_state(State::Established)?;
        self.control = 0;
        self.send_segment(buffer)
    }

    /// Segmentation core shared by application sends and the zero-payload
    /// control segments the handshake/teardown paths emit directly.
    pub(super) fn send_segment(&mut self, buffer: &[u8]) -> Result<usize> {
        if buffer.is_empty() {
            self.transmit_chunk(&[])?;
            return Ok(0);
        }

        let mut offset = 0;
        while offset < buffer.len() {
            let step = (buffer.len() - offset).min(self.config.mss);
            self.transmit_chunk(&buffer[offset..offset + step])?;
            offset += step;
        }

        Ok(buffer.len())
    }

    fn transmit_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.seq_number = self.seq_number.wrapping_add(chunk.len() as u32);

        let header = Header {
            seq_number: self.seq_number,
            ack_number: self.ack_number,
            control: self.control,
            ..Default::default()
        };

        let wire = Segment::serialize(header, chunk);

        trace!(
            "-> seq={} ack={} ctl={:#06b} len={}",
            header.seq_number,
            header.ack_number,
            self.control,
            chunk.len()
        );

        self.socket()?.send(&wire).map_err(|e| {
            self.invalidate();
            MicrotcpError::IoError(e)
        })?;
        self.counters.packets_sent += 1;
        self.counters.bytes_sent += chunk.len() as u64;

        // Every segment that advances the sender's byte stream or
        // initiates a handshake is followed by a synchronous ACK receive in
        // the same call; pure-ACK and FIN+ACK segments are not.
        let awaits_ack = self.has_control(control::SYN) || !self.has_control(control::ACK);
        if awaits_ack {
            self.await_ack()?;
        }

        Ok(())
    }

    /// Read one datagram, verify it is a valid ACK, and fold its
    /// `ack_number`/`seq_number` into this endpoint's counters.
    fn await_ack(&mut self) -> Result<()> {
        let n = self.socket()?.recv(&mut self.recvbuf).map_err(|e| {
            self.invalidate();
            MicrotcpError::IoError(e)
        })?;
        self.counters.packets_received += 1;

        if !Segment::verify_checksum(&self.recvbuf[..n]) {
            self.invalidate();
            return Err(MicrotcpError::IntegrityError {
                reason: "ACK failed CRC32 verification",
            });
        }

        let (header, _) = Segment::parse(&self.recvbuf[..n]);
        if !header.has(control::ACK) {
            self.invalidate();
            return Err(MicrotcpError::IntegrityError {
                reason: "expected ACK bit set",
            });
        }

        self.ack_number = header.ack_number;
        self.peer_seq_number = header.seq_number;

        Ok(())
    }

    /// Receive up to `buffer.len()` bytes, acknowledging every data
    /// segment inline. If `wait_all`, keeps receiving until the buffer is
    /// full (or the peer closes); otherwise returns as soon as one
    /// segment's worth of data has been copied.
    pub fn recv(&mut self, buffer: &mut [u8], wait_all: bool) -> Result<RecvOutcome> {
        if matches!(self.state, State::Closed | State::Invalid) {
            return Err(MicrotcpError::NotConnected(self.state));
        }

        let mut copied = 0;

        loop {
            let n = self.socket()?.recv(&mut self.recvbuf).map_err(|e| {
                self.invalidate();
                MicrotcpError::IoError(e)
            })?;
            self.counters.packets_received += 1;

            if !Segment::verify_checksum(&self.recvbuf[..n]) {
                self.invalidate();
                return Err(MicrotcpError::IntegrityError {
                    reason: "segment failed CRC32 verification",
                });
            }

            let (header, _) = Segment::parse(&self.recvbuf[..n]);
            let data_len = header.data_len as usize;

            trace!(
                "<- seq={} ack={} ctl={:#06b} len={}",
                header.seq_number,
                header.ack_number,
                header.control,
                data_len
            );

            if data_len > 0 && self.state != State::Established {
                self.invalidate();
                return Err(MicrotcpError::NotConnected(self.state));
            }

            if header.has(control::FIN)
                && self.state != State::ClosingByHost
                && self.state != State::ClosingByPeer
            {
                self.state = State::ClosingByPeer;
                debug_assert_eq!(
                    self.state,
                    State::ClosingByPeer,
                    "recv must hand off to shutdown exactly once per peer FIN, at depth 1"
                );
                self.shutdown(super::ShutdownMode::ReadWrite)?;
                return Ok(RecvOutcome::PeerClosed);
            }

            let avail = buffer.len() - copied;
            let step = avail.min(data_len);
            if step < data_len {
                warn!("receive buffer too small, truncating {data_len} byte segment to {step}");
            }
            let payload_start = HEADER_SIZE;
            buffer[copied..copied + step]
                .copy_from_slice(&self.recvbuf[payload_start..payload_start + step]);
            copied += step;
            self.counters.bytes_received += step as u64;

            self.ack_number = self.ack_number.wrapping_add(step as u32);
            self.control = control::ACK;
            self.send_segment(&[])?;
            self.control = 0;

            let buffer_full = copied == buffer.len();
            if buffer_full || !wait_all {
                break;
            }
        }

        Ok(RecvOutcome::Data(copied))
    }
}
