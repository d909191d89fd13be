//! LOAD handler.
//!
//! Services `LOAD"name",8` and `LOAD"name",8,1` from the virtual disk, and
//! `LOAD"$",8` from the filesystem's directory listing.

use log::{debug, info, warn};

use super::request::{AddressRange, FileName, FilenameDescriptor};
use crate::config::{CellMap, TrapConfig};
use crate::encoding::{decode_word, end_address, write_word};
use crate::filesystem::{ChannelMode, FileSystem};
use crate::memory::MemoryBus;
use crate::{TrapError, STATUS_FILE_NOT_FOUND, STATUS_OK};

/// What a LOAD did to guest memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// File bytes were copied to `start..start + size`.
    Loaded { start: u16, size: usize },
    /// The directory listing was copied to `start..start + size`.
    Directory { start: u16, size: usize },
    /// The file could not be opened; ST reports FILE NOT FOUND.
    NotFound,
    /// The filesystem could not produce a directory listing.
    DirectoryUnavailable,
}

/// Runs one LOAD request.
///
/// The command cell is cleared before anything else. The filename and
/// address cells are then read once.
///
/// # Errors
/// `TrapError::InvalidArgument` if the filename does not fit the 13-byte
/// buffer. Nothing beyond the command cell is written in that case.
pub fn load<M, F>(mem: &mut M, fs: &mut F, config: &TrapConfig) -> Result<LoadOutcome, TrapError>
where
    M: MemoryBus + ?Sized,
    F: FileSystem + ?Sized,
{
    let cells = &config.cells;
    mem.write(cells.command, 0);

    let descriptor = FilenameDescriptor::read(mem, cells);
    let range = AddressRange::read(mem, cells);
    let name = FileName::from_guest(mem, &descriptor)?;
    debug!(
        "LOAD \"{}\",{},{} to ${:04X}",
        name, descriptor.device_number, descriptor.secondary_address, range.start
    );

    // No ST update on this path, ST keeps whatever the last transfer left.
    if name.is_directory() {
        return Ok(copy_directory(mem, fs, range.start, cells));
    }

    let channel = config.transfer_channel;
    if let Err(err) = fs.open(channel, name.as_bytes(), ChannelMode::Read) {
        warn!("LOAD \"{}\": {}", name, err);
        mem.write(cells.status, STATUS_FILE_NOT_FOUND);
        return Ok(LoadOutcome::NotFound);
    }

    let start = if descriptor.uses_embedded_address() {
        read_embedded_address(fs, channel).unwrap_or(range.start)
    } else {
        range.start
    };
    let size = stream_into(mem, fs, channel, start);
    fs.close(channel);

    if descriptor.secondary_address == 0 {
        write_word(
            mem,
            cells.end_of_data_lo,
            cells.end_of_data_hi,
            end_address(start, size),
        );
    }
    mem.write(cells.status, STATUS_OK);

    info!(
        "Loaded \"{}\": {} bytes at ${:04X}-${:04X}",
        name,
        size,
        start,
        end_address(start, size)
    );
    Ok(LoadOutcome::Loaded { start, size })
}

/// Copies the directory listing to `start` and points the end-of-data
/// pointer past it.
pub(crate) fn copy_directory<M, F>(mem: &mut M, fs: &mut F, start: u16, cells: &CellMap) -> LoadOutcome
where
    M: MemoryBus + ?Sized,
    F: FileSystem + ?Sized,
{
    let listing = match fs.directory() {
        Ok(listing) => listing,
        Err(err) => {
            warn!("Directory listing unavailable: {}", err);
            return LoadOutcome::DirectoryUnavailable;
        }
    };

    for (i, &byte) in listing.iter().enumerate() {
        mem.write(start.wrapping_add(i as u16), byte);
    }
    let size = listing.len();
    write_word(
        mem,
        cells.end_of_data_lo,
        cells.end_of_data_hi,
        end_address(start, size),
    );

    info!("Directory: {} bytes at ${:04X}", size, start);
    LoadOutcome::Directory { start, size }
}

/// Reads the file's two-byte load address header.
///
/// Returns `None` if the file ends before the header is complete; the
/// caller then falls back to the declared address.
fn read_embedded_address<F: FileSystem + ?Sized>(fs: &mut F, channel: u8) -> Option<u16> {
    let mut header = Vec::with_capacity(2);
    while header.len() < 2 {
        match fs.read_byte(channel) {
            Ok(Some(byte)) => header.push(byte),
            Ok(None) => break,
            Err(err) => {
                warn!("Reading load address: {}", err);
                break;
            }
        }
    }
    match decode_word(&header) {
        Ok(addr) => {
            debug!("Embedded load address ${:04X}", addr);
            Some(addr)
        }
        Err(err) => {
            warn!("File too short for a load address: {}", err);
            None
        }
    }
}

/// Copies the rest of the open file to `start` and returns the byte count.
///
/// A read error ends the transfer like end of file does.
pub(crate) fn stream_into<M, F>(mem: &mut M, fs: &mut F, channel: u8, start: u16) -> usize
where
    M: MemoryBus + ?Sized,
    F: FileSystem + ?Sized,
{
    let mut size = 0usize;
    loop {
        match fs.read_byte(channel) {
            Ok(Some(byte)) => {
                mem.write(start.wrapping_add(size as u16), byte);
                size += 1;
            }
            Ok(None) => break,
            Err(err) => {
                warn!("Read error after {} bytes: {}", size, err);
                break;
            }
        }
    }
    size
}
