use log::error;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{MicrotcpError, Result};

use super::siphash::SipHashKey;

/// A process-lifetime 128-bit key drawn from the OS's strong entropy
/// source, used to derive handshake initial sequence numbers.
///
/// Failure to obtain entropy is logged, and key creation fails outright
/// rather than silently falling back to a deterministic key.
#[derive(Debug, Clone, Copy)]
pub struct RandomKey(SipHashKey);

impl RandomKey {
    pub fn new() -> Result<Self> {
        let mut bytes = [0u8; 16];

        // `OsRng` surfaces entropy-source failures as a panic deep inside
        // `fill_bytes` on the platforms this crate targets; the explicit
        // try_fill_bytes path below is what actually gives us an
        // `EntropyFailure` to propagate instead of aborting the process.
        if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
            error!("failed to read OS entropy for initial sequence number key: {e}");
            return Err(MicrotcpError::EntropyFailure);
        }

        let lo = u64::from_ne_bytes(bytes[0..8].try_into().unwrap());
        let hi = u64::from_ne_bytes(bytes[8..16].try_into().unwrap());

        Ok(RandomKey(SipHashKey { key: [lo, hi] }))
    }

    pub fn siphash_key(&self) -> &SipHashKey {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_keys_differ() {
        let a = RandomKey::new().unwrap();
        let b = RandomKey::new().unwrap();

        assert_ne!(a.siphash_key().key, b.siphash_key().key);
    }
}
