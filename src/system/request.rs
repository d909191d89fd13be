//! Request parameters captured from the KERNAL's zero-page cells.
//!
//! A LOAD or SAVE reads these once, right after the command cell is
//! cleared, and works from the snapshot from then on.

use crate::config::CellMap;
use crate::encoding::{petscii_to_ascii, read_word};
use crate::memory::MemoryBus;
use crate::TrapError;

/// Size of the filename buffer handed to the filesystem.
pub const FILENAME_BUFFER_LEN: usize = 13;

/// Buffer contents before the guest's name is copied over it: an 8.3 name
/// of eight spaces with a `.PRG` extension, NUL terminated.
const DEFAULT_FILENAME: [u8; FILENAME_BUFFER_LEN] = *b"        .PRG\0";

/// Filename parameters as set up by the KERNAL SETNAM/SETLFS calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameDescriptor {
    /// FNLEN: number of name bytes.
    pub length: u8,
    /// FNADR: guest address of the name bytes.
    pub pointer: u16,
    /// SA: 0 loads to the declared address, 1 to the address in the file.
    pub secondary_address: u8,
    /// FA: device number. Only recorded.
    pub device_number: u8,
}

impl FilenameDescriptor {
    /// Snapshot the descriptor cells.
    pub fn read<M: MemoryBus + ?Sized>(mem: &M, cells: &CellMap) -> Self {
        Self {
            length: mem.read(cells.filename_length),
            pointer: read_word(mem, cells.filename_ptr_lo, cells.filename_ptr_hi),
            secondary_address: mem.read(cells.secondary_address),
            device_number: mem.read(cells.device_number),
        }
    }

    /// True for `LOAD"...",8,1`.
    pub fn uses_embedded_address(&self) -> bool {
        self.secondary_address == 1
    }
}

/// The 13-byte filename buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct FileName {
    buffer: [u8; FILENAME_BUFFER_LEN],
    length: u8,
}

impl FileName {
    /// Builds the buffer from `name`, overwriting the default left to right.
    ///
    /// # Errors
    /// `TrapError::InvalidArgument` if `name` does not fit the buffer.
    pub fn from_bytes(name: &[u8]) -> Result<Self, TrapError> {
        if name.len() > FILENAME_BUFFER_LEN {
            return Err(TrapError::InvalidArgument(format!(
                "filename length {} exceeds {} byte buffer",
                name.len(),
                FILENAME_BUFFER_LEN
            )));
        }
        let mut buffer = DEFAULT_FILENAME;
        buffer[..name.len()].copy_from_slice(name);
        Ok(Self {
            buffer,
            length: name.len() as u8,
        })
    }

    /// Fetches `descriptor.length` bytes from guest memory at
    /// `descriptor.pointer`.
    ///
    /// The length is checked before any byte is read.
    pub fn from_guest<M: MemoryBus + ?Sized>(
        mem: &M,
        descriptor: &FilenameDescriptor,
    ) -> Result<Self, TrapError> {
        let len = descriptor.length as usize;
        if len > FILENAME_BUFFER_LEN {
            return Err(TrapError::InvalidArgument(format!(
                "filename length {} exceeds {} byte buffer",
                len, FILENAME_BUFFER_LEN
            )));
        }
        let bytes: Vec<u8> = (0..len)
            .map(|i| mem.read(descriptor.pointer.wrapping_add(i as u16)))
            .collect();
        Self::from_bytes(&bytes)
    }

    /// The whole buffer, padding included.
    pub fn buffer(&self) -> &[u8; FILENAME_BUFFER_LEN] {
        &self.buffer
    }

    /// Number of bytes the guest supplied.
    pub fn guest_length(&self) -> usize {
        self.length as usize
    }

    /// The name as passed to the filesystem: the buffer up to its NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self
            .buffer
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILENAME_BUFFER_LEN);
        &self.buffer[..end]
    }

    /// `LOAD"$"` asks for the directory instead of a file.
    pub fn is_directory(&self) -> bool {
        self.length == 1 && self.buffer[0] == b'$'
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text: String = self.as_bytes().iter().map(|&b| petscii_to_ascii(b)).collect();
        write!(f, "{}", text)
    }
}

impl std::fmt::Debug for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileName(\"{}\")", self)
    }
}

/// Declared start/end addresses (STAL/EAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u16,
    /// Inclusive.
    pub end: u16,
}

impl AddressRange {
    /// Snapshot the start/end cells.
    pub fn read<M: MemoryBus + ?Sized>(mem: &M, cells: &CellMap) -> Self {
        Self {
            start: read_word(mem, cells.start_lo, cells.start_hi),
            end: read_word(mem, cells.end_lo, cells.end_hi),
        }
    }

    /// Number of bytes in the inclusive range.
    ///
    /// # Errors
    /// `TrapError::InvalidArgument` if `end` lies below `start`.
    pub fn byte_count(&self) -> Result<usize, TrapError> {
        if self.end < self.start {
            return Err(TrapError::InvalidArgument(format!(
                "address range ${:04X}-${:04X} is inverted",
                self.start, self.end
            )));
        }
        Ok((self.end - self.start) as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;

    #[test]
    fn test_default_padding() {
        let name = FileName::from_bytes(b"HELLO").unwrap();
        assert_eq!(name.buffer(), b"HELLO   .PRG\0");
        assert_eq!(name.as_bytes(), b"HELLO   .PRG");
        assert_eq!(name.guest_length(), 5);
        assert_eq!(name.to_string(), "HELLO   .PRG");
    }

    #[test]
    fn test_long_name_overwrites_extension() {
        let name = FileName::from_bytes(b"HELLOWORLD").unwrap();
        assert_eq!(name.as_bytes(), b"HELLOWORLDRG");
    }

    #[test]
    fn test_full_buffer_has_no_terminator() {
        let name = FileName::from_bytes(b"ABCDEFGHIJKLM").unwrap();
        assert_eq!(name.as_bytes(), b"ABCDEFGHIJKLM");
    }

    #[test]
    fn test_too_long_is_rejected() {
        let err = FileName::from_bytes(b"ABCDEFGHIJKLMN").unwrap_err();
        assert!(matches!(err, TrapError::InvalidArgument(_)));
    }

    #[test]
    fn test_directory_name() {
        assert!(FileName::from_bytes(b"$").unwrap().is_directory());
        assert!(!FileName::from_bytes(b"$0").unwrap().is_directory());
        assert!(!FileName::from_bytes(b"").unwrap().is_directory());
    }

    #[test]
    fn test_read_descriptor_and_name() {
        let mut mem = FlatMemory::new();
        let cells = CellMap::c64();
        mem.load(0x0340, b"GAME");
        mem.write(cells.filename_length, 4);
        mem.write(cells.filename_ptr_lo, 0x40);
        mem.write(cells.filename_ptr_hi, 0x03);
        mem.write(cells.secondary_address, 1);
        mem.write(cells.device_number, 8);

        let desc = FilenameDescriptor::read(&mem, &cells);
        assert_eq!(desc.length, 4);
        assert_eq!(desc.pointer, 0x0340);
        assert!(desc.uses_embedded_address());
        assert_eq!(desc.device_number, 8);

        let name = FileName::from_guest(&mem, &desc).unwrap();
        assert_eq!(name.as_bytes(), b"GAME    .PRG");
    }

    #[test]
    fn test_from_guest_rejects_before_reading() {
        let desc = FilenameDescriptor {
            length: 14,
            pointer: 0x0340,
            secondary_address: 0,
            device_number: 8,
        };
        assert!(FileName::from_guest(&FlatMemory::new(), &desc).is_err());
    }

    #[test]
    fn test_address_range_byte_count() {
        let range = AddressRange {
            start: 0x2000,
            end: 0x200A,
        };
        assert_eq!(range.byte_count(), Ok(11));

        let single = AddressRange {
            start: 0x2000,
            end: 0x2000,
        };
        assert_eq!(single.byte_count(), Ok(1));

        let inverted = AddressRange {
            start: 0x2001,
            end: 0x2000,
        };
        assert!(inverted.byte_count().is_err());
    }
}
