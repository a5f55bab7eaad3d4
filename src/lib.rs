//! microTCP: a teaching-oriented reliable transport layered on UDP/IPv4.
//!
//! The three load-bearing pieces are the connection state machine
//! ([`endpoint`]), segment framing and integrity ([`segment`], [`crypto`]),
//! and the synchronous send/recv control loop that interleaves data
//! transmission with inline acknowledgment (`Endpoint::send`/`recv`).
//! There is no congestion control, no pipelining, and no retransmission —
//! the core is stop-and-wait per segment, faithfully reproducing the
//! RFC-793-style protocol this crate was built to teach rather than a
//! production transport.

pub mod config;
pub mod crypto;
pub mod endpoint;
pub mod error;
pub mod segment;

pub use config::Config;
pub use endpoint::{Endpoint, RecvOutcome, ShutdownMode, State};
pub use error::{MicrotcpError, Result};
