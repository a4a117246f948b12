use core::mem;

use static_assertions::{const_assert, const_assert_eq};

/// Bytes of arena overhead per block: one packed `u32` header.
pub const HEADER_SIZE: usize = mem::size_of::<u32>();

/// Largest payload size a header can record (31 bits).
pub const MAX_BLOCK_SIZE: usize = (1 << 31) - 1;

const FREE_BIT: u32 = 1 << 31;

// The chain arithmetic assumes a 4 byte header and a size that leaves
// room for the free flag in the top bit.
const_assert_eq!(HEADER_SIZE, 4);
const_assert!(MAX_BLOCK_SIZE < u32::MAX as usize);

/// Decoded block header: a free flag plus a 31-bit payload size.
///
/// In the arena every block starts with this record packed into a
/// single little-endian `u32`, the top bit holding the flag. The
/// payload size excludes the header itself, so the block after this
/// one starts `HEADER_SIZE + size` bytes further along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
  pub free: bool,
  pub size: u32,
}

impl Header {
  pub fn new(
    free: bool,
    size: u32,
  ) -> Self {
    debug_assert!(size as usize <= MAX_BLOCK_SIZE);
    Self { free, size }
  }

  /// Packs the header into its in-arena byte representation.
  pub fn encode(self) -> [u8; HEADER_SIZE] {
    let mut raw = self.size & !FREE_BIT;
    if self.free {
      raw |= FREE_BIT;
    }
    raw.to_le_bytes()
  }

  /// Rebuilds a header from its in-arena byte representation.
  pub fn decode(bytes: [u8; HEADER_SIZE]) -> Self {
    let raw = u32::from_le_bytes(bytes);
    Self {
      free: raw & FREE_BIT != 0,
      size: raw & !FREE_BIT,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_decode_round_trip() {
    for free in [false, true] {
      for size in [0, 1, 100, MAX_BLOCK_SIZE as u32] {
        let header = Header::new(free, size);
        assert_eq!(Header::decode(header.encode()), header);
      }
    }
  }

  #[test]
  fn flag_does_not_disturb_size() {
    let used = Header::new(false, 1234);
    let free = Header::new(true, 1234);
    assert_eq!(Header::decode(used.encode()).size, 1234);
    assert_eq!(Header::decode(free.encode()).size, 1234);
    assert_ne!(used.encode(), free.encode());
  }

  #[test]
  fn decode_masks_the_flag_bit_out_of_size() {
    let bytes = u32::MAX.to_le_bytes();
    let header = Header::decode(bytes);
    assert!(header.free);
    assert_eq!(header.size as usize, MAX_BLOCK_SIZE);
  }
}
