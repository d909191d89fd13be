//! KERNAL trap handling and host integration.
//!
//! - `trap`: command cell dispatcher
//! - `load` / `save`: the LOAD and SAVE handlers
//! - `request`: filename and address snapshot
//! - `keyboard`: host key code to PETSCII translation
//! - `virtual_disk`: in-memory `FileSystem`
//! - `io`: the object the host loop drives

mod io;
mod keyboard;
mod load;
mod request;
mod save;
mod trap;
mod virtual_disk;

pub use io::Io;
pub use keyboard::{keys, petscii, KeyboardTranslator, ShiftState};
pub use load::{load, LoadOutcome};
pub use request::{AddressRange, FileName, FilenameDescriptor, FILENAME_BUFFER_LEN};
pub use save::{save, SaveOutcome};
pub use trap::{Command, KernalTrap, TrapOutcome};
pub use virtual_disk::{VirtualDisk, DISK_CAPACITY_BLOCKS};
