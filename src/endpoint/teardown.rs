//! FIN+ACK exchange and half-close semantics.
//!
//! Each direction of teardown emits exactly one FIN+ACK segment and no
//! further acknowledgment round trip: a host-initiated close blocks for
//! the peer's FIN+ACK and then closes, while a peer-initiated close's own
//! FIN+ACK reply *is* the closing acknowledgment.

use log::info;

use crate::error::{MicrotcpError, Result};
use crate::segment::{control, Segment};

use super::{Endpoint, ShutdownMode, State};

impl Endpoint {
    /// `mode` is reserved (see [`ShutdownMode`]); this crate only
    /// implements full bidirectional teardown. Idempotent on `CLOSED`.
    pub fn shutdown(&mut self, _mode: ShutdownMode) -> Result<()> {
        match self.state {
            State::Closed => Ok(()),

            State::Established => {
                self.control = control::ACK | control::FIN;
                self.send_segment(&[])?;
                self.control = 0;
                self.state = State::ClosingByHost;

                self.await_peer_fin_ack()?;

                self.state = State::Closed;
                info!("teardown complete (host-initiated)");
                Ok(())
            }

            // Reentered from `recv` (depth 1) after it observed an
            // unsolicited peer FIN: the FIN+ACK we emit here is itself the
            // closing acknowledgment.
            State::ClosingByPeer => {
                debug_assert_eq!(
                    self.state,
                    State::ClosingByPeer,
                    "shutdown must only reenter from recv's peer-FIN branch"
                );
                self.control = control::ACK | control::FIN;
                self.send_segment(&[])?;
                self.control = 0;
                self.state = State::Closed;
                info!("teardown complete (peer-initiated)");
                Ok(())
            }

            other => Err(MicrotcpError::WrongState {
                expected: State::Established,
                actual: other,
            }),
        }
    }

    /// Block for the peer's own FIN+ACK reply to a host-initiated close.
    /// A raw receive rather than a recursive call into [`Endpoint::recv`]:
    /// there is no caller-supplied buffer to deliver a payload into here,
    /// and a FIN+ACK control segment never carries one.
    fn await_peer_fin_ack(&mut self) -> Result<()> {
        let n = self.socket()?.recv(&mut self.recvbuf).map_err(|e| {
            self.invalidate();
            MicrotcpError::IoError(e)
        })?;
        self.counters.packets_received += 1;

        if !Segment::verify_checksum(&self.recvbuf[..n]) {
            self.invalidate();
            return Err(MicrotcpError::IntegrityError {
                reason: "peer FIN+ACK failed CRC32 verification",
            });
        }

        let (header, _) = Segment::parse(&self.recvbuf[..n]);
        if !header.has(control::FIN) {
            self.invalidate();
            return Err(MicrotcpError::IntegrityError {
                reason: "expected FIN while awaiting teardown",
            });
        }

        self.peer_seq_number = header.seq_number;
        self.ack_number = header.ack_number;

        Ok(())
    }
}
