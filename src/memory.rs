//! # Guest Address Space
//!
//! The trapdoor never owns the emulated machine's memory. It sees it through
//! the `MemoryBus` trait, the same narrow byte interface the CPU core uses,
//! so the handlers work against banked C64 memory, plain RAM or a test
//! double without change.
//!
//! ## Design Principles
//!
//! - No bus errors: reads and writes always succeed
//! - Writes to ROM or unmapped regions may be ignored by the implementation
//! - Every side effect of a trap is a `write` call, which keeps the handlers
//!   observable from the outside

/// Byte-addressable view of the guest's 64KB address space.
///
/// # Examples
///
/// ```
/// use c64_trapdoor::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x0002, 0x04); // request a LOAD
/// assert_eq!(mem.read(0x0002), 0x04);
/// ```
///
/// ## Implementing Custom Memory
///
/// ```
/// use c64_trapdoor::MemoryBus;
///
/// /// RAM with the KERNAL ROM window write-protected.
/// struct KernalProtected {
///     ram: Vec<u8>,
/// }
///
/// impl MemoryBus for KernalProtected {
///     fn read(&self, addr: u16) -> u8 {
///         self.ram[addr as usize]
///     }
///
///     fn write(&mut self, addr: u16, value: u8) {
///         if addr < 0xE000 {
///             self.ram[addr as usize] = value;
///         }
///     }
/// }
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    ///
    /// Must never panic. Unmapped addresses may return garbage.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    ///
    /// Must never panic. Read-only or unmapped addresses may drop the write.
    fn write(&mut self, addr: u16, value: u8);
}

/// Simple 64KB flat memory.
///
/// All addresses ($0000-$FFFF) are writable RAM initialized to $00. Used by
/// the WASM host and the tests; a full machine plugs in its own banked bus.
pub struct FlatMemory {
    /// 64KB contiguous memory array
    data: Box<[u8; 65536]>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 65536]),
        }
    }

    /// Copies `bytes` into memory starting at `addr`, wrapping at $FFFF.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.write(addr.wrapping_add(i as u16), byte);
        }
    }

    /// Returns `len` bytes starting at `addr` (wrapping at $FFFF).
    pub fn slice(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.read(addr.wrapping_add(i as u16)))
            .collect()
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }
}
