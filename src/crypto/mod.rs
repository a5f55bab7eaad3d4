pub mod key;
pub mod siphash;

pub use key::RandomKey;
pub use siphash::{siphash_3u32, SipHashKey};
