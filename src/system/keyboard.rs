//! Host keyboard to PETSCII translation.
//!
//! Host key codes arrive one at a time from the host event loop. Printable
//! keys are passed through as PETSCII, a handful of symbols follow the C64
//! keyboard's shift layout, and the result is dropped straight into the
//! KERNAL keyboard buffer:
//!
//! ```text
//! Host key | plain | with SHIFT
//! ---------|-------|-----------
//!    1     |  1    |  !
//!    2     |  2    |  @
//!    6     |  6    |  (space)
//!    8     |  8    |  *
//!    '     |  '    |  "
//!    =     |  =    |  +
//!  HOME    | HOME  |  CLR
//! ```
//!
//! Only the shift modifier is tracked. The 8×8 matrix is kept for a
//! matrix-scanning keyboard path and is never consulted here.

use log::trace;

use crate::config::CellMap;
use crate::memory::MemoryBus;

/// Host key codes with special handling.
pub mod keys {
    /// Shift pressed.
    pub const SHIFT_DOWN: u8 = 0x2A;
    /// Shift released.
    pub const SHIFT_UP: u8 = 0xAA;
    pub const BACKSPACE: u8 = 0x0E;
    pub const ENTER: u8 = 0x0A;
    pub const HOME: u8 = 0x13;
}

/// PETSCII control codes produced by the translator.
pub mod petscii {
    pub const DEL: u8 = 0x14;
    pub const RETURN: u8 = 0x0D;
    pub const HOME: u8 = 0x13;
    pub const CLR: u8 = 0x93;
}

/// State of the shift modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    #[default]
    Released,
    Held,
}

/// Translation for one host key: (host code, plain, shifted).
///
/// Keys missing from the table pass through unchanged.
const TRANSLATION: [(u8, u8, u8); 19] = [
    (b'1', b'1', 0x21),
    (b'2', b'2', 0x40),
    (b'3', b'3', 0x23),
    (b'4', b'4', 0x24),
    (b'5', b'5', 0x25),
    (b'6', b'6', 0x20),
    (b'7', b'7', 0x26),
    (b'8', b'8', 0x2A),
    (b'9', b'9', 0x28),
    (b'0', b'0', 0x29),
    (b',', b',', 0x3C),
    (b'.', b'.', 0x3E),
    (b';', b';', 0x3A),
    (b'/', 0x2F, 0x3F),
    (b'\'', b'\'', 0x22),
    (b'=', 0x3D, 0x2B),
    (keys::BACKSPACE, petscii::DEL, petscii::DEL),
    (keys::ENTER, petscii::RETURN, petscii::RETURN),
    (keys::HOME, petscii::HOME, petscii::CLR),
];

/// Converts host key events into keyboard-buffer writes.
#[derive(Debug, Clone)]
pub struct KeyboardTranslator {
    shift: ShiftState,
    /// Active-low matrix rows, all keys up.
    matrix: [u8; 8],
    buffer_cell: u16,
    count_cell: u16,
}

impl Default for KeyboardTranslator {
    fn default() -> Self {
        Self::new(&CellMap::c64())
    }
}

impl KeyboardTranslator {
    /// Create a translator writing to the keyboard cells of `cells`.
    pub fn new(cells: &CellMap) -> Self {
        Self {
            shift: ShiftState::Released,
            matrix: [0xFF; 8],
            buffer_cell: cells.keyboard_buffer,
            count_cell: cells.keyboard_count,
        }
    }

    /// Current shift state.
    pub fn shift(&self) -> ShiftState {
        self.shift
    }

    /// Raw matrix rows.
    pub fn matrix(&self) -> &[u8; 8] {
        &self.matrix
    }

    /// Translate a key press without touching memory.
    ///
    /// The shift key itself switches to `Held` and yields `None`, as does a
    /// key that translates to NUL.
    pub fn translate(&mut self, code: u8) -> Option<u8> {
        if code == keys::SHIFT_DOWN {
            self.shift = ShiftState::Held;
            return None;
        }

        let shifted = self.shift == ShiftState::Held;
        let petscii = TRANSLATION
            .iter()
            .find(|(host, _, _)| *host == code)
            .map(|&(_, plain, with_shift)| if shifted { with_shift } else { plain })
            .unwrap_or(code);

        (petscii != 0x00).then_some(petscii)
    }

    /// Handle a key press: translate it and, if it yields a character,
    /// put it in the keyboard buffer and flag it as available.
    ///
    /// Returns the injected character.
    pub fn key_down<M: MemoryBus + ?Sized>(&mut self, code: u8, mem: &mut M) -> Option<u8> {
        let petscii = self.translate(code)?;
        trace!("Key ${:02X} -> PETSCII ${:02X} ({:?})", code, petscii, self.shift);
        mem.write(self.buffer_cell, petscii);
        mem.write(self.count_cell, 1);
        Some(petscii)
    }

    /// Handle a key release. Only the shift release code does anything.
    pub fn key_up(&mut self, code: u8) {
        if code == keys::SHIFT_UP {
            self.shift = ShiftState::Released;
        }
    }
}
