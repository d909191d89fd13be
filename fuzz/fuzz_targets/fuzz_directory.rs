//! Fuzz target for directory synthesis.
//!
//! Arbitrary disk names and files; the listing must always be framed as a
//! BASIC program ending in a zero link.

#![no_main]

use arbitrary::Arbitrary;
use c64_trapdoor::{FileSystem, VirtualDisk};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzDisk {
    name: String,
    id: [u8; 2],
    files: Vec<(String, Vec<u8>)>,
}

fuzz_target!(|input: FuzzDisk| {
    let mut disk = VirtualDisk::new(&input.name, input.id);
    for (name, data) in input.files.into_iter().take(32) {
        disk.insert(&name, data);
    }

    let listing = match disk.directory() {
        Ok(listing) => listing,
        Err(_) => return,
    };

    // Header line first, $0000 link last
    assert!(listing.len() >= 4);
    assert_eq!(&listing[..2], &[0x01, 0x01]);
    assert_eq!(&listing[listing.len() - 2..], &[0x00, 0x00]);
    assert!(!disk.is_channel_open());
});
