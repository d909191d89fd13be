//! SAVE handler.

use log::{debug, info, warn};

use super::request::{AddressRange, FileName, FilenameDescriptor};
use crate::config::TrapConfig;
use crate::filesystem::{ChannelMode, FileSystem};
use crate::memory::MemoryBus;
use crate::TrapError;

/// What a SAVE did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// `size` bytes starting at `start` went to the file.
    Saved { start: u16, size: usize },
    /// A write failed after `size` bytes. The file is closed and the
    /// filesystem decides whether the partial data is kept.
    Truncated { start: u16, size: usize },
    /// The file could not be created. ST is left as it was.
    OpenFailed,
}

/// Runs one SAVE request over the inclusive declared range.
///
/// # Errors
/// `TrapError::InvalidArgument` if the filename does not fit the buffer or
/// the end address lies below the start address. The file is not opened.
pub fn save<M, F>(mem: &mut M, fs: &mut F, config: &TrapConfig) -> Result<SaveOutcome, TrapError>
where
    M: MemoryBus + ?Sized,
    F: FileSystem + ?Sized,
{
    let cells = &config.cells;
    mem.write(cells.command, 0);

    let descriptor = FilenameDescriptor::read(mem, cells);
    let range = AddressRange::read(mem, cells);
    let name = FileName::from_guest(mem, &descriptor)?;
    let expected = range.byte_count()?;
    debug!(
        "SAVE \"{}\",{} from ${:04X}-${:04X}",
        name, descriptor.device_number, range.start, range.end
    );

    let channel = config.transfer_channel;
    if let Err(err) = fs.open(channel, name.as_bytes(), ChannelMode::Write) {
        warn!("SAVE \"{}\": {}", name, err);
        return Ok(SaveOutcome::OpenFailed);
    }

    let mut size = 0usize;
    for addr in range.start..=range.end {
        if let Err(err) = fs.write_byte(channel, mem.read(addr)) {
            warn!("SAVE \"{}\" stopped at ${:04X}: {}", name, addr, err);
            break;
        }
        size += 1;
    }
    fs.close(channel);

    if size < expected {
        return Ok(SaveOutcome::Truncated {
            start: range.start,
            size,
        });
    }
    info!("Saved \"{}\": {} bytes from ${:04X}", name, size, range.start);
    Ok(SaveOutcome::Saved {
        start: range.start,
        size,
    })
}
