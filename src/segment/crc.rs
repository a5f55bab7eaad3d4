/// IEEE-802.3 CRC32 over an entire byte range (header + payload), computed
/// with the header's `checksum` field temporarily zeroed.
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
