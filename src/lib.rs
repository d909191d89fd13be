//! # Commodore 64 KERNAL Trapdoor
//!
//! Fast LOAD/SAVE for a virtual C64 without emulating a disk drive. Guest
//! code drops a request code into a zero-page cell; once per emulation tick
//! the trapdoor notices it, reads the KERNAL's filename and address
//! parameters from their usual cells, services the request against a
//! virtual disk and writes the results back the way the real firmware would:
//! program bytes, the end-of-program pointer and the status byte `ST`.
//!
//! A companion keyboard translator turns host key codes into PETSCII and
//! pushes them into the KERNAL keyboard buffer.
//!
//! ## Quick Start
//!
//! ```rust
//! use c64_trapdoor::{FlatMemory, Io, MemoryBus, VirtualDisk};
//!
//! let mut memory = FlatMemory::new();
//! let mut disk = VirtualDisk::new("WORK DISK", *b"01");
//! disk.insert("HELLO", vec![0x01, 0x08, 0xA9, 0x00]);
//!
//! // LOAD"HELLO",8,1
//! memory.load(0x0340, b"HELLO");
//! memory.write(0x00B7, 5);    // filename length
//! memory.write(0x00BB, 0x40); // filename pointer lo
//! memory.write(0x00BC, 0x03); // filename pointer hi
//! memory.write(0x00B9, 1);    // secondary address
//! memory.write(0x0002, 4);    // command cell: LOAD
//!
//! let mut io = Io::new(disk);
//! assert!(io.emulate(&mut memory));
//!
//! assert_eq!(memory.read(0x0002), 0);     // command cell cleared
//! assert_eq!(memory.read(0x0801), 0xA9);  // program at its embedded address
//! assert_eq!(memory.read(0x0090), 0x40);  // ST = OK
//! ```
//!
//! ## Modules
//!
//! - `memory` - Guest address space (`MemoryBus`, `FlatMemory`)
//! - `filesystem` - Virtual disk surface (`FileSystem`)
//! - `encoding` - Little-endian words and PETSCII helpers
//! - `config` - Fixed memory cells and command set
//! - `system` - Trap dispatcher, LOAD/SAVE handlers, keyboard, host glue
//! - `video` - Framebuffer boundary and colour palette

pub mod config;
pub mod encoding;
pub mod filesystem;
pub mod memory;
pub mod system;
pub mod video;

// WASM bindings (optional, enabled with "wasm" feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use config::{CellMap, TrapConfig};
pub use filesystem::{ChannelMode, FileSystem, FsError, TRANSFER_CHANNEL};
pub use memory::{FlatMemory, MemoryBus};
pub use system::{
    keys, AddressRange, Command, FileName, FilenameDescriptor, Io, KernalTrap,
    KeyboardTranslator, LoadOutcome, SaveOutcome, ShiftState, TrapOutcome, VirtualDisk,
};
pub use video::{Framebuffer, IndexedFramebuffer, PALETTE};

/// Status Register value for a successful transfer.
pub const STATUS_OK: u8 = 0x40;

/// Status Register value for FILE NOT FOUND.
pub const STATUS_FILE_NOT_FOUND: u8 = 0x42;

/// Errors a trap invocation reports to the host.
///
/// The guest never sees these; it only sees the Status Register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapError {
    /// A request parameter the KERNAL would never produce.
    InvalidArgument(String),
    /// A little-endian word was decoded from too few bytes.
    Encoding {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        got: usize,
    },
}

impl std::fmt::Display for TrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TrapError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            TrapError::Encoding { needed, got } => {
                write!(f, "Encoding error: need {} bytes, got {}", needed, got)
            }
        }
    }
}

impl std::error::Error for TrapError {}
