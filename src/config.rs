//! Trap configuration.
//!
//! Every memory cell the trapdoor touches is listed in [`CellMap`]. The
//! defaults are the stock C64 KERNAL locations:
//!
//! | Cell | Address |
//! |------|---------|
//! | Command | `$02` |
//! | Filename length (FNLEN) | `$B7` |
//! | Secondary address (SA) | `$B9` |
//! | Device number (FA) | `$BA` |
//! | Filename pointer (FNADR) | `$BB`/`$BC` |
//! | Start address (STAL) | `$C1`/`$C2` |
//! | End address (EAL) | `$AE`/`$AF` |
//! | Status (ST) | `$90` |
//! | End of BASIC program (VARTAB) | `$2D`/`$2E` |
//! | Keyboard buffer | `$0277` |
//! | Keyboard buffer count (NDX) | `$C6` |

use crate::filesystem::TRANSFER_CHANNEL;

/// Fixed guest addresses read and written by the trap handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMap {
    pub command: u16,
    pub filename_length: u16,
    pub secondary_address: u16,
    pub device_number: u16,
    pub filename_ptr_lo: u16,
    pub filename_ptr_hi: u16,
    pub start_lo: u16,
    pub start_hi: u16,
    pub end_lo: u16,
    pub end_hi: u16,
    pub status: u16,
    pub end_of_data_lo: u16,
    pub end_of_data_hi: u16,
    pub keyboard_buffer: u16,
    pub keyboard_count: u16,
}

impl CellMap {
    /// The C64 KERNAL zero-page layout.
    pub const fn c64() -> Self {
        Self {
            command: 0x0002,
            filename_length: 0x00B7,
            secondary_address: 0x00B9,
            device_number: 0x00BA,
            filename_ptr_lo: 0x00BB,
            filename_ptr_hi: 0x00BC,
            start_lo: 0x00C1,
            start_hi: 0x00C2,
            end_lo: 0x00AE,
            end_hi: 0x00AF,
            status: 0x0090,
            end_of_data_lo: 0x002D,
            end_of_data_hi: 0x002E,
            keyboard_buffer: 0x0277,
            keyboard_count: 0x00C6,
        }
    }
}

impl Default for CellMap {
    fn default() -> Self {
        Self::c64()
    }
}

/// Trapdoor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapConfig {
    /// Memory cell layout.
    pub cells: CellMap,
    /// The one channel every transfer uses.
    pub transfer_channel: u8,
    /// Also honour command 1 (directory to start of BASIC) and
    /// command 3 (autoload the configuration file).
    pub extended_commands: bool,
    /// Start of BASIC; target of the directory command.
    pub basic_start: u16,
    /// Target of the autoload command.
    pub autoload_address: u16,
    /// File read by the autoload command.
    pub autoload_file: String,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            cells: CellMap::c64(),
            transfer_channel: TRANSFER_CHANNEL,
            extended_commands: false,
            basic_start: 0x0801,
            autoload_address: 0xC000,
            autoload_file: "FDCONFIG.SYS".to_string(),
        }
    }
}

impl TrapConfig {
    /// Default configuration with the extended command set switched on.
    pub fn extended() -> Self {
        Self {
            extended_commands: true,
            ..Self::default()
        }
    }
}
