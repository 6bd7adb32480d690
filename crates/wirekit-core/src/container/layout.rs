pub const MAGIC: &[u8; 4] = b"WKC1";
pub const VERSION: u8 = 1;
pub const FLAGS: u8 = 0;

/// Magic, version, flags, created_at (i64), entry_count (u32).
pub const HEADER_LEN: usize = 4 + 1 + 1 + 8 + 4;
pub const TRAILER_LEN: usize = 4;

/// Smallest possible record body: name_len (u16), payload_len (u32), crc (u32).
pub const MIN_RECORD_BODY_LEN: usize = 2 + 4 + 4;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
