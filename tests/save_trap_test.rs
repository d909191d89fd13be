//! SAVE trap tests

use c64_trapdoor::{
    ChannelMode, FileSystem, FlatMemory, FsError, KernalTrap, MemoryBus, SaveOutcome,
    TrapError, TrapOutcome, VirtualDisk,
};

/// Filesystem that records written bytes and can refuse opens.
#[derive(Default)]
struct Sink {
    refuse_open: bool,
    /// Refuse writes once this many bytes have been accepted.
    fail_after: Option<usize>,
    opened: Option<(u8, Vec<u8>, ChannelMode)>,
    written: Vec<u8>,
    closes: usize,
}

impl FileSystem for Sink {
    fn open(&mut self, channel: u8, name: &[u8], mode: ChannelMode) -> Result<(), FsError> {
        if self.refuse_open {
            return Err(FsError::DiskFull);
        }
        self.opened = Some((channel, name.to_vec(), mode));
        Ok(())
    }

    fn read_byte(&mut self, _: u8) -> Result<Option<u8>, FsError> {
        Ok(None)
    }

    fn write_byte(&mut self, _: u8, byte: u8) -> Result<(), FsError> {
        if self.fail_after == Some(self.written.len()) {
            return Err(FsError::DiskFull);
        }
        self.written.push(byte);
        Ok(())
    }

    fn close(&mut self, _: u8) {
        self.closes += 1;
    }

    fn directory(&mut self) -> Result<Vec<u8>, FsError> {
        Ok(Vec::new())
    }
}

/// Set up SAVE"name",8 over [start, end].
fn request_save(mem: &mut FlatMemory, name: &[u8], start: u16, end: u16) {
    mem.load(0x0340, name);
    mem.write(0x00B7, name.len() as u8);
    mem.write(0x00BB, 0x40);
    mem.write(0x00BC, 0x03);
    mem.write(0x00BA, 8);
    mem.write(0x00C1, (start & 0xFF) as u8);
    mem.write(0x00C2, (start >> 8) as u8);
    mem.write(0x00AE, (end & 0xFF) as u8);
    mem.write(0x00AF, (end >> 8) as u8);
    mem.write(0x0002, 5);
}

#[test]
fn test_save_eleven_bytes_in_order() {
    let mut mem = FlatMemory::new();
    let data: Vec<u8> = (0..11).map(|i| 0x30 + i).collect();
    mem.load(0x2000, &data);
    mem.write(0x200B, 0xFF); // just past the range
    request_save(&mut mem, b"SCORES", 0x2000, 0x200A);
    let mut sink = Sink::default();

    let outcome = KernalTrap::default().service(&mut mem, &mut sink).unwrap();

    assert_eq!(
        outcome,
        TrapOutcome::Save(SaveOutcome::Saved {
            start: 0x2000,
            size: 11
        })
    );
    assert_eq!(sink.written, data);
    assert_eq!(sink.closes, 1);
    assert_eq!(
        sink.opened,
        Some((1, b"SCORES  .PRG".to_vec(), ChannelMode::Write))
    );
    assert_eq!(mem.read(0x0002), 0);
}

#[test]
fn test_save_open_failure_is_silent() {
    let mut mem = FlatMemory::new();
    request_save(&mut mem, b"SCORES", 0x2000, 0x200A);
    mem.write(0x0090, 0x40);
    let mut sink = Sink {
        refuse_open: true,
        ..Sink::default()
    };

    let outcome = KernalTrap::default().service(&mut mem, &mut sink).unwrap();

    assert_eq!(outcome, TrapOutcome::Save(SaveOutcome::OpenFailed));
    assert_eq!(mem.read(0x0090), 0x40);
    assert_eq!(mem.read(0x0002), 0);
    assert!(sink.written.is_empty());
    assert_eq!(sink.closes, 0);
}

#[test]
fn test_save_then_load_back() {
    let mut mem = FlatMemory::new();
    let program = [0x01, 0x08, 0x0B, 0x08, 0x0A, 0x00, 0x99, 0x22, 0x48, 0x22, 0x00];
    mem.load(0x0801, &program);
    request_save(&mut mem, b"HI", 0x0801, 0x0801 + program.len() as u16 - 1);
    let mut disk = VirtualDisk::new("TEST", *b"01");
    let mut trap = KernalTrap::default();

    trap.tick(&mut mem, &mut disk).unwrap();
    assert_eq!(disk.file("HI"), Some(&program[..]));

    // Load it back somewhere else
    let mut fresh = FlatMemory::new();
    fresh.load(0x0340, b"HI");
    fresh.write(0x00B7, 2);
    fresh.write(0x00BB, 0x40);
    fresh.write(0x00BC, 0x03);
    fresh.write(0x00C2, 0x40);
    fresh.write(0x0002, 4);
    trap.tick(&mut fresh, &mut disk).unwrap();

    assert_eq!(fresh.slice(0x4000, program.len()), program.to_vec());
    assert_eq!(trap.saves(), 1);
    assert_eq!(trap.loads(), 1);
}

#[test]
fn test_save_rejects_inverted_range() {
    let mut mem = FlatMemory::new();
    request_save(&mut mem, b"BAD", 0x3000, 0x2FFF);
    let mut sink = Sink::default();

    let result = KernalTrap::default().tick(&mut mem, &mut sink);

    assert!(matches!(result, Err(TrapError::InvalidArgument(_))));
    assert_eq!(sink.opened, None);
    assert_eq!(mem.read(0x0002), 0);
}

#[test]
fn test_write_error_stops_save_and_closes() {
    let mut mem = FlatMemory::new();
    let data: Vec<u8> = (0..16).collect();
    mem.load(0x2000, &data);
    request_save(&mut mem, b"SCORES", 0x2000, 0x200F);
    mem.write(0x0090, 0x00);
    let mut sink = Sink {
        fail_after: Some(5),
        ..Sink::default()
    };

    let outcome = KernalTrap::default().service(&mut mem, &mut sink).unwrap();

    assert_eq!(
        outcome,
        TrapOutcome::Save(SaveOutcome::Truncated {
            start: 0x2000,
            size: 5
        })
    );
    assert_eq!(sink.written, data[..5].to_vec());
    assert_eq!(sink.closes, 1);
    assert_eq!(mem.read(0x0090), 0x00);
    assert_eq!(mem.read(0x0002), 0);
}

#[test]
fn test_disk_full_keeps_previous_copy() {
    let mut mem = FlatMemory::new();
    let mut disk = VirtualDisk::new("FULL", *b"01");
    let keep = vec![0x11; 254 * 60];
    disk.insert("KEEP", keep.clone());
    disk.insert("BIG", vec![0; 254 * 594]);
    request_save(&mut mem, b"KEEP", 0x1000, 0xFFFF);

    let outcome = KernalTrap::default().service(&mut mem, &mut disk).unwrap();

    assert_eq!(
        outcome,
        TrapOutcome::Save(SaveOutcome::Truncated {
            start: 0x1000,
            size: 254 * 70
        })
    );
    assert_eq!(disk.file("KEEP"), Some(&keep[..]));
    assert!(!disk.is_channel_open());
}
