//! Little-endian words and PETSCII.
//!
//! The 6510 stores every pointer low byte first. These helpers keep the
//! hi/lo shuffling out of the trap handlers.

use crate::memory::MemoryBus;
use crate::TrapError;

/// Decodes a little-endian word from the first two bytes of `bytes`.
///
/// # Errors
/// Returns `TrapError::Encoding` if fewer than two bytes are available.
pub fn decode_word(bytes: &[u8]) -> Result<u16, TrapError> {
    match bytes {
        [lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
        _ => Err(TrapError::Encoding {
            needed: 2,
            got: bytes.len(),
        }),
    }
}

/// Encodes a word as `[lo, hi]`.
pub fn encode_word(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Reads a word whose two halves live in separate cells.
pub fn read_word<M: MemoryBus + ?Sized>(mem: &M, lo_addr: u16, hi_addr: u16) -> u16 {
    u16::from_le_bytes([mem.read(lo_addr), mem.read(hi_addr)])
}

/// Writes a word into two separate cells.
pub fn write_word<M: MemoryBus + ?Sized>(mem: &mut M, lo_addr: u16, hi_addr: u16, value: u16) {
    let [lo, hi] = encode_word(value);
    mem.write(lo_addr, lo);
    mem.write(hi_addr, hi);
}

/// Address one past a block of `len` bytes starting at `start`.
///
/// Wraps at $FFFF the same way the guest's 16-bit pointers do.
pub fn end_address(start: u16, len: usize) -> u16 {
    start.wrapping_add(len as u16)
}

/// Convert PETSCII character to ASCII.
pub fn petscii_to_ascii(c: u8) -> char {
    match c {
        0x00..=0x1F => ' ',
        0x20..=0x5F => c as char,
        0x60 => '-',
        0x61..=0x7A => (c - 0x20) as char,
        0x7B..=0x7F => c as char,
        0x80..=0x9F => ' ',
        0xA0 => ' ', // shifted space
        0xC1..=0xDA => (c - 0x80) as char,
        _ => '?',
    }
}
