//! Command trap dispatcher.
//!
//! Guest code requests a transfer by storing a command code in the command
//! cell. [`KernalTrap::tick`] is called once per emulation tick; it decodes
//! the cell and runs the matching handler to completion before returning.

use log::{debug, warn};

use super::load::{self, copy_directory, stream_into, LoadOutcome};
use super::save::{self, SaveOutcome};
use crate::config::TrapConfig;
use crate::filesystem::{ChannelMode, FileSystem};
use crate::memory::MemoryBus;
use crate::TrapError;

/// A decoded command cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Nothing requested, or a code this trap does not handle.
    Idle,
    /// Copy the directory listing to the start of BASIC.
    Directory,
    /// Read the configuration file to its fixed address.
    Autoload,
    /// KERNAL LOAD.
    Load,
    /// KERNAL SAVE.
    Save,
}

impl Command {
    pub const DIRECTORY_CODE: u8 = 0x01;
    pub const AUTOLOAD_CODE: u8 = 0x03;
    pub const LOAD_CODE: u8 = 0x04;
    pub const SAVE_CODE: u8 = 0x05;

    /// Decode a command cell value. `Directory` and `Autoload` are only
    /// recognised when `extended` is set.
    pub fn decode(code: u8, extended: bool) -> Self {
        match code {
            Self::LOAD_CODE => Command::Load,
            Self::SAVE_CODE => Command::Save,
            Self::DIRECTORY_CODE if extended => Command::Directory,
            Self::AUTOLOAD_CODE if extended => Command::Autoload,
            _ => Command::Idle,
        }
    }

    /// The cell value that requests this command. `Idle` is 0.
    pub fn code(self) -> u8 {
        match self {
            Command::Idle => 0x00,
            Command::Directory => Self::DIRECTORY_CODE,
            Command::Autoload => Self::AUTOLOAD_CODE,
            Command::Load => Self::LOAD_CODE,
            Command::Save => Self::SAVE_CODE,
        }
    }
}

/// Result of one dispatcher tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// No command was pending. Memory was not written.
    Idle,
    Load(LoadOutcome),
    Save(SaveOutcome),
}

/// Watches the command cell and services LOAD/SAVE requests.
#[derive(Debug, Clone, Default)]
pub struct KernalTrap {
    config: TrapConfig,
    loads: u64,
    saves: u64,
}

impl KernalTrap {
    pub fn new(config: TrapConfig) -> Self {
        Self {
            config,
            loads: 0,
            saves: 0,
        }
    }

    pub fn config(&self) -> &TrapConfig {
        &self.config
    }

    /// Number of load-type requests serviced so far.
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Number of SAVE requests serviced so far.
    pub fn saves(&self) -> u64 {
        self.saves
    }

    /// Runs one emulation tick and reports whether emulation should go on.
    ///
    /// The answer is always `true`; errors are for the host to log.
    pub fn tick<M, F>(&mut self, mem: &mut M, fs: &mut F) -> Result<bool, TrapError>
    where
        M: MemoryBus + ?Sized,
        F: FileSystem + ?Sized,
    {
        self.service(mem, fs)?;
        Ok(true)
    }

    /// Decodes the command cell and runs the matching handler.
    pub fn service<M, F>(&mut self, mem: &mut M, fs: &mut F) -> Result<TrapOutcome, TrapError>
    where
        M: MemoryBus + ?Sized,
        F: FileSystem + ?Sized,
    {
        let code = mem.read(self.config.cells.command);
        let command = Command::decode(code, self.config.extended_commands);
        if command == Command::Idle {
            if code != 0 {
                debug!("Ignoring command ${:02X}", code);
            }
            return Ok(TrapOutcome::Idle);
        }
        debug!("Command ${:02X} -> {:?}", code, command);

        let outcome = match command {
            Command::Idle => TrapOutcome::Idle,
            Command::Load => TrapOutcome::Load(load::load(mem, fs, &self.config)?),
            Command::Save => TrapOutcome::Save(save::save(mem, fs, &self.config)?),
            Command::Directory => TrapOutcome::Load(self.directory(mem, fs)),
            Command::Autoload => TrapOutcome::Load(self.autoload(mem, fs)),
        };
        match outcome {
            TrapOutcome::Load(_) => self.loads += 1,
            TrapOutcome::Save(_) => self.saves += 1,
            TrapOutcome::Idle => {}
        }
        Ok(outcome)
    }

    /// Directory listing straight to the start of BASIC. ST is not written.
    fn directory<M, F>(&self, mem: &mut M, fs: &mut F) -> LoadOutcome
    where
        M: MemoryBus + ?Sized,
        F: FileSystem + ?Sized,
    {
        mem.write(self.config.cells.command, 0);
        copy_directory(mem, fs, self.config.basic_start, &self.config.cells)
    }

    /// Reads the configuration file to its fixed address, if the disk has
    /// one. Neither ST nor the end-of-data pointer is written.
    fn autoload<M, F>(&self, mem: &mut M, fs: &mut F) -> LoadOutcome
    where
        M: MemoryBus + ?Sized,
        F: FileSystem + ?Sized,
    {
        let config = &self.config;
        mem.write(config.cells.command, 0);

        let channel = config.transfer_channel;
        if let Err(err) = fs.open(channel, config.autoload_file.as_bytes(), ChannelMode::Read) {
            warn!("Autoload \"{}\": {}", config.autoload_file, err);
            return LoadOutcome::NotFound;
        }
        let size = stream_into(mem, fs, channel, config.autoload_address);
        fs.close(channel);

        LoadOutcome::Loaded {
            start: config.autoload_address,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::FlatMemory;
    use crate::system::VirtualDisk;
    use crate::STATUS_OK;

    #[test]
    fn test_decode() {
        assert_eq!(Command::decode(0, false), Command::Idle);
        assert_eq!(Command::decode(4, false), Command::Load);
        assert_eq!(Command::decode(5, false), Command::Save);
        assert_eq!(Command::decode(1, false), Command::Idle);
        assert_eq!(Command::decode(3, false), Command::Idle);
        assert_eq!(Command::decode(1, true), Command::Directory);
        assert_eq!(Command::decode(3, true), Command::Autoload);
        assert_eq!(Command::decode(0xFF, true), Command::Idle);
    }

    #[test]
    fn test_code_matches_decode() {
        for command in [
            Command::Directory,
            Command::Autoload,
            Command::Load,
            Command::Save,
        ] {
            assert_eq!(Command::decode(command.code(), true), command);
        }
        assert_eq!(Command::Idle.code(), 0);
    }

    #[test]
    fn test_idle_tick() {
        let mut trap = KernalTrap::default();
        let mut mem = FlatMemory::new();
        let mut disk = VirtualDisk::default();

        assert_eq!(trap.tick(&mut mem, &mut disk), Ok(true));
        assert_eq!(trap.service(&mut mem, &mut disk), Ok(TrapOutcome::Idle));
        assert_eq!(trap.loads(), 0);
    }

    #[test]
    fn test_unknown_code_is_left_alone() {
        let mut trap = KernalTrap::default();
        let mut mem = FlatMemory::new();
        let mut disk = VirtualDisk::default();
        mem.write(0x02, 0x03);

        assert_eq!(trap.service(&mut mem, &mut disk), Ok(TrapOutcome::Idle));
        assert_eq!(mem.read(0x02), 0x03);
    }

    #[test]
    fn test_extended_directory() {
        let mut trap = KernalTrap::new(TrapConfig::extended());
        let mut mem = FlatMemory::new();
        let mut disk = VirtualDisk::default();
        disk.insert("A", vec![1]);
        let listing = disk.directory().unwrap();
        mem.write(0x02, Command::DIRECTORY_CODE);

        let outcome = trap.service(&mut mem, &mut disk).unwrap();

        assert_eq!(
            outcome,
            TrapOutcome::Load(LoadOutcome::Directory {
                start: 0x0801,
                size: listing.len()
            })
        );
        assert_eq!(mem.read(0x02), 0);
        assert_eq!(mem.slice(0x0801, listing.len()), listing);
        assert_eq!(mem.read(0x90), 0);
        assert_eq!(trap.loads(), 1);
    }

    #[test]
    fn test_extended_autoload() {
        let mut trap = KernalTrap::new(TrapConfig::extended());
        let mut mem = FlatMemory::new();
        let mut disk = VirtualDisk::default();
        disk.insert("FDCONFIG.SYS", vec![0xDE, 0xAD]);
        mem.write(0x02, Command::AUTOLOAD_CODE);

        let outcome = trap.service(&mut mem, &mut disk).unwrap();

        assert_eq!(
            outcome,
            TrapOutcome::Load(LoadOutcome::Loaded {
                start: 0xC000,
                size: 2
            })
        );
        assert_eq!(mem.slice(0xC000, 2), vec![0xDE, 0xAD]);
        assert_eq!(mem.read(0x2D), 0);
        assert_eq!(mem.read(0x90), 0);
        assert!(!disk.is_channel_open());
    }

    #[test]
    fn test_extended_autoload_missing_file() {
        let mut trap = KernalTrap::new(TrapConfig::extended());
        let mut mem = FlatMemory::new();
        let mut disk = VirtualDisk::default();
        mem.write(0x02, Command::AUTOLOAD_CODE);

        let outcome = trap.service(&mut mem, &mut disk).unwrap();

        assert_eq!(outcome, TrapOutcome::Load(LoadOutcome::NotFound));
        assert_eq!(mem.read(0x02), 0);
        assert_eq!(mem.read(0x90), 0);
    }

    #[test]
    fn test_load_counts() {
        let mut trap = KernalTrap::default();
        let mut mem = FlatMemory::new();
        let mut disk = VirtualDisk::default();
        disk.insert("X", vec![0x01]);
        mem.load(0x0340, b"X");
        mem.write(0xB7, 1);
        mem.write(0xBB, 0x40);
        mem.write(0xBC, 0x03);
        mem.write(0xC2, 0x08);
        mem.write(0x02, Command::LOAD_CODE);

        trap.tick(&mut mem, &mut disk).unwrap();

        assert_eq!(trap.loads(), 1);
        assert_eq!(trap.saves(), 0);
        assert_eq!(mem.read(0x0800), 0x01);
        assert_eq!(mem.read(0x90), STATUS_OK);
    }
}
