//! # Virtual Disk Surface
//!
//! The trap handlers never look inside a disk image. Everything they need
//! from the disk goes through the `FileSystem` trait: open a named file on a
//! channel, stream bytes in or out, close it, and fetch a ready-made
//! directory listing.
//!
//! Only one channel is ever used by the trapdoor ([`TRANSFER_CHANNEL`]) and
//! it is always closed before it is opened again.

/// The channel number every LOAD and SAVE goes through.
pub const TRANSFER_CHANNEL: u8 = 1;

/// Access mode requested when opening a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Open an existing file for reading.
    Read,
    /// Create (or replace) a file for writing.
    Write,
}

/// Errors reported by a `FileSystem` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// The file was not found on disk.
    NotFound(String),
    /// The file already exists and the implementation refuses to replace it.
    Exists(String),
    /// The channel is already open.
    ChannelBusy(u8),
    /// The channel is not open in the mode required.
    ChannelClosed(u8),
    /// The channel number is out of range.
    InvalidChannel(u8),
    /// The disk cannot store any more data.
    DiskFull,
    /// Any other backend failure.
    Io(String),
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(name) => write!(f, "File not found: {}", name),
            FsError::Exists(name) => write!(f, "File exists: {}", name),
            FsError::ChannelBusy(ch) => write!(f, "Channel {} already open", ch),
            FsError::ChannelClosed(ch) => write!(f, "Channel {} not open", ch),
            FsError::InvalidChannel(ch) => write!(f, "Invalid channel: {}", ch),
            FsError::DiskFull => write!(f, "Disk full"),
            FsError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FsError {}

/// Filesystem collaborator consumed by the LOAD/SAVE handlers.
///
/// `name` is the raw filename buffer contents as the guest wrote them,
/// without the trailing NUL (for example `b"HELLO   .PRG"`). How names are
/// matched is up to the implementation.
pub trait FileSystem {
    /// Opens `name` on `channel`.
    ///
    /// # Errors
    /// `FsError::NotFound` when a file opened for reading does not exist;
    /// any other error when the channel cannot be opened.
    fn open(&mut self, channel: u8, name: &[u8], mode: ChannelMode) -> Result<(), FsError>;

    /// Reads the next byte from a channel open for reading.
    ///
    /// Returns `Ok(None)` at end of file.
    fn read_byte(&mut self, channel: u8) -> Result<Option<u8>, FsError>;

    /// Appends a byte to a channel open for writing.
    fn write_byte(&mut self, channel: u8, byte: u8) -> Result<(), FsError>;

    /// Closes a channel, committing any written data. Closing a closed
    /// channel is a no-op.
    fn close(&mut self, channel: u8);

    /// Returns the disk directory formatted as a BASIC program body
    /// (no load address prefix). Its length is the listing size.
    fn directory(&mut self) -> Result<Vec<u8>, FsError>;
}
