//! Fuzz target for one dispatcher tick.
//!
//! Arbitrary request cells, filename bytes and disk contents, then a single
//! tick of the trap. The tick must never panic, must service LOAD and SAVE
//! requests, and must leave the transfer channel closed.

#![no_main]

use arbitrary::Arbitrary;
use c64_trapdoor::{FlatMemory, KernalTrap, MemoryBus, TrapConfig, VirtualDisk};
use libfuzzer_sys::fuzz_target;

/// KERNAL request cells
#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    command: u8,
    filename_length: u8,
    filename_ptr: u16,
    secondary_address: u8,
    start: u16,
    end: u16,
    /// Bytes planted at the filename pointer
    filename: Vec<u8>,
}

/// Files on the virtual disk
#[derive(Debug, Arbitrary)]
struct FuzzDisk {
    files: Vec<(String, Vec<u8>)>,
    write_protected: bool,
    extended: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    request: FuzzRequest,
    disk: FuzzDisk,
}

fuzz_target!(|input: FuzzInput| {
    let FuzzInput { request, disk: setup } = input;

    let mut disk = VirtualDisk::new("FUZZ", *b"00");
    for (name, data) in setup.files.into_iter().take(16) {
        disk.insert(&name, data);
    }
    disk.set_write_protected(setup.write_protected);

    let mut mem = FlatMemory::new();
    mem.load(request.filename_ptr, &request.filename);
    mem.write(0x00B7, request.filename_length);
    mem.write(0x00BB, (request.filename_ptr & 0xFF) as u8);
    mem.write(0x00BC, (request.filename_ptr >> 8) as u8);
    mem.write(0x00B9, request.secondary_address);
    mem.write(0x00BA, 8);
    mem.write(0x00C1, (request.start & 0xFF) as u8);
    mem.write(0x00C2, (request.start >> 8) as u8);
    mem.write(0x00AE, (request.end & 0xFF) as u8);
    mem.write(0x00AF, (request.end >> 8) as u8);
    mem.write(0x0002, request.command);

    let config = if setup.extended {
        TrapConfig::extended()
    } else {
        TrapConfig::default()
    };
    let mut trap = KernalTrap::new(config);
    let result = trap.tick(&mut mem, &mut disk);

    // Loaded data may land on the command cell, so count requests instead.
    if matches!(request.command, 4 | 5) && result.is_ok() {
        assert_eq!(trap.loads() + trap.saves(), 1);
    }
    assert!(!disk.is_channel_open());
});
