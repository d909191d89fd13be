//! In-memory virtual disk.
//!
//! A `FileSystem` that keeps whole files in memory. It stands in for a real
//! disk backend in the WASM host and in tests, and it synthesises the same
//! BASIC-shaped directory listing a 1541 returns for `LOAD"$",8`.
//!
//! ## Names
//!
//! The trapdoor hands over the raw 8.3 filename buffer, e.g.
//! `"HELLO   .PRG"`. Names are upper-cased, the padding before the dot is
//! dropped and a `.PRG` extension is implied, so that buffer addresses the
//! file `HELLO`. Other extensions stay part of the name (`FDCONFIG.SYS`).
//! Reads accept `*` and `?` wildcards.

use log::{debug, warn};

use crate::encoding::petscii_to_ascii;
use crate::filesystem::{ChannelMode, FileSystem, FsError};

/// Number of channels a drive exposes (0-15).
const CHANNEL_COUNT: u8 = 16;

/// Data bytes per 256-byte disk block (two bytes hold the chain link).
const BLOCK_PAYLOAD: usize = 254;

/// Free blocks on a freshly formatted 1541 disk.
pub const DISK_CAPACITY_BLOCKS: u16 = 664;

/// Width of the quoted name column in the directory listing.
const NAME_COLUMN: usize = 16;

/// BASIC line link placeholder. The KERNAL relinks the program after LOAD.
const LINE_LINK: [u8; 2] = [0x01, 0x01];

/// A file stored on the virtual disk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DiskFile {
    name: String,
    data: Vec<u8>,
}

impl DiskFile {
    fn blocks(&self) -> usize {
        blocks_for(self.data.len())
    }
}

/// The single open channel.
#[derive(Debug, Clone)]
struct OpenChannel {
    number: u8,
    mode: ChannelMode,
    name: String,
    data: Vec<u8>,
    position: usize,
    /// Blocks used by every other file, fixed at open time.
    reserved_blocks: usize,
    /// Set once a write is refused; the file is then not committed.
    failed: bool,
}

/// In-memory disk serving one channel at a time.
#[derive(Debug, Clone)]
pub struct VirtualDisk {
    name: String,
    id: [u8; 2],
    files: Vec<DiskFile>,
    channel: Option<OpenChannel>,
    write_protected: bool,
}

impl Default for VirtualDisk {
    fn default() -> Self {
        Self::new("EMPTY", *b"00")
    }
}

impl VirtualDisk {
    /// Create an empty disk with the given header name and two-byte id.
    pub fn new(name: &str, id: [u8; 2]) -> Self {
        Self {
            name: name.to_uppercase(),
            id,
            files: Vec::new(),
            channel: None,
            write_protected: false,
        }
    }

    /// Disk name shown in the directory header.
    pub fn disk_name(&self) -> &str {
        &self.name
    }

    /// Store a file, replacing any file with the same name.
    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        let name = normalize_name(name.as_bytes());
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(file) => file.data = data,
            None => self.files.push(DiskFile { name, data }),
        }
    }

    /// Remove a file and return its contents.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        let name = normalize_name(name.as_bytes());
        let index = self.files.iter().position(|f| f.name == name)?;
        Some(self.files.remove(index).data)
    }

    /// Contents of a file, by exact name.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        let name = normalize_name(name.as_bytes());
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.data.as_slice())
    }

    /// File names in directory order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_str())
    }

    /// Refuse every write open while set.
    pub fn set_write_protected(&mut self, protected: bool) {
        self.write_protected = protected;
    }

    /// Whether a channel is currently open.
    pub fn is_channel_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Free blocks left on the disk.
    pub fn blocks_free(&self) -> u16 {
        let free = usize::from(DISK_CAPACITY_BLOCKS).saturating_sub(self.used_blocks(None));
        listing_blocks(free)
    }

    fn used_blocks(&self, except: Option<&str>) -> usize {
        self.files
            .iter()
            .filter(|f| Some(f.name.as_str()) != except)
            .map(DiskFile::blocks)
            .sum()
    }

    fn find(&self, pattern: &str) -> Option<&DiskFile> {
        self.files
            .iter()
            .find(|f| f.name == pattern)
            .or_else(|| self.files.iter().find(|f| name_matches(pattern, &f.name)))
    }

    fn channel_mut(&mut self, channel: u8, mode: ChannelMode) -> Result<&mut OpenChannel, FsError> {
        if channel >= CHANNEL_COUNT {
            return Err(FsError::InvalidChannel(channel));
        }
        match self.channel.as_mut() {
            Some(open) if open.number == channel && open.mode == mode => Ok(open),
            _ => Err(FsError::ChannelClosed(channel)),
        }
    }
}

impl FileSystem for VirtualDisk {
    fn open(&mut self, channel: u8, name: &[u8], mode: ChannelMode) -> Result<(), FsError> {
        if channel >= CHANNEL_COUNT {
            return Err(FsError::InvalidChannel(channel));
        }
        if let Some(open) = &self.channel {
            return Err(FsError::ChannelBusy(open.number));
        }

        let name = normalize_name(name);
        let open = match mode {
            ChannelMode::Read => {
                let file = self
                    .find(&name)
                    .ok_or_else(|| FsError::NotFound(name.clone()))?;
                OpenChannel {
                    number: channel,
                    mode,
                    name: file.name.clone(),
                    data: file.data.clone(),
                    position: 0,
                    reserved_blocks: 0,
                    failed: false,
                }
            }
            ChannelMode::Write => {
                if self.write_protected {
                    return Err(FsError::Io("write protected".to_string()));
                }
                if name.is_empty() || name.contains(|c: char| c == '*' || c == '?') {
                    return Err(FsError::Io(format!("bad filename \"{}\"", name)));
                }
                OpenChannel {
                    number: channel,
                    mode,
                    reserved_blocks: self.used_blocks(Some(&name)),
                    name,
                    data: Vec::new(),
                    position: 0,
                    failed: false,
                }
            }
        };

        debug!("Channel {} open {:?} \"{}\"", channel, mode, open.name);
        self.channel = Some(open);
        Ok(())
    }

    fn read_byte(&mut self, channel: u8) -> Result<Option<u8>, FsError> {
        let open = self.channel_mut(channel, ChannelMode::Read)?;
        let byte = open.data.get(open.position).copied();
        if byte.is_some() {
            open.position += 1;
        }
        Ok(byte)
    }

    fn write_byte(&mut self, channel: u8, byte: u8) -> Result<(), FsError> {
        let open = self.channel_mut(channel, ChannelMode::Write)?;
        let needed = open.reserved_blocks + blocks_for(open.data.len() + 1);
        if needed > usize::from(DISK_CAPACITY_BLOCKS) {
            open.failed = true;
            return Err(FsError::DiskFull);
        }
        open.data.push(byte);
        Ok(())
    }

    fn close(&mut self, channel: u8) {
        match self.channel.take() {
            Some(open) if open.number == channel => {
                debug!("Channel {} closed \"{}\"", channel, open.name);
                if open.mode == ChannelMode::Write {
                    if open.failed {
                        // Keep any existing copy rather than a partial one
                        warn!("Discarding incomplete write to \"{}\"", open.name);
                    } else {
                        let name = open.name;
                        self.insert(&name, open.data);
                    }
                }
            }
            other => self.channel = other,
        }
    }

    fn directory(&mut self) -> Result<Vec<u8>, FsError> {
        let mut listing = Vec::new();

        // Header: 0 "DISK NAME       " ID 2A
        listing.extend_from_slice(&LINE_LINK);
        listing.extend_from_slice(&0u16.to_le_bytes());
        listing.push(0x12); // reverse on
        listing.push(b'"');
        push_padded(&mut listing, &self.name, NAME_COLUMN);
        listing.push(b'"');
        listing.push(b' ');
        listing.extend_from_slice(&self.id);
        listing.extend_from_slice(b" 2A");
        listing.push(0x00);

        for file in &self.files {
            let blocks = listing_blocks(file.blocks());
            listing.extend_from_slice(&LINE_LINK);
            listing.extend_from_slice(&blocks.to_le_bytes());

            // Right-align the name column after the block count
            let pad = match blocks {
                0..=9 => 3,
                10..=99 => 2,
                100..=999 => 1,
                _ => 0,
            };
            listing.extend(std::iter::repeat(b' ').take(pad));

            let (shown, kind) = match file.name.rsplit_once('.') {
                Some((_, ext)) if ext == "SEQ" || ext == "USR" || ext == "REL" => {
                    (file.name.as_str(), ext.as_bytes())
                }
                Some(_) => (file.name.as_str(), b"SEQ".as_slice()),
                None => (file.name.as_str(), b"PRG".as_slice()),
            };
            listing.push(b'"');
            listing.extend_from_slice(shown.as_bytes());
            listing.push(b'"');
            let used = shown.len().min(NAME_COLUMN);
            listing.extend(std::iter::repeat(b' ').take(NAME_COLUMN - used + 1));
            listing.extend_from_slice(kind);
            listing.push(0x00);
        }

        listing.extend_from_slice(&LINE_LINK);
        listing.extend_from_slice(&self.blocks_free().to_le_bytes());
        listing.extend_from_slice(b"BLOCKS FREE.");
        listing.push(0x00);

        // End of program
        listing.push(0x00);
        listing.push(0x00);

        Ok(listing)
    }
}

/// Disk blocks needed for `len` bytes; an empty file still takes one.
fn blocks_for(len: usize) -> usize {
    len.div_ceil(BLOCK_PAYLOAD).max(1)
}

/// A block count as the 16-bit line number of a listing line.
fn listing_blocks(blocks: usize) -> u16 {
    u16::try_from(blocks).unwrap_or(u16::MAX)
}

fn push_padded(out: &mut Vec<u8>, text: &str, width: usize) {
    let bytes = text.as_bytes();
    let used = bytes.len().min(width);
    out.extend_from_slice(&bytes[..used]);
    out.extend(std::iter::repeat(b' ').take(width - used));
}

/// Turn a raw filename buffer into the disk's canonical name.
fn normalize_name(raw: &[u8]) -> String {
    // Unprintable bytes must not turn into a '?' wildcard
    let text: String = raw
        .iter()
        .map(|&b| match petscii_to_ascii(b) {
            '?' if b != b'?' => char::REPLACEMENT_CHARACTER,
            c => c,
        })
        .collect::<String>()
        .to_uppercase();

    match text.rsplit_once('.') {
        Some((base, ext)) => {
            let base = base.trim_end();
            let ext = ext.trim();
            if ext.is_empty() || ext == "PRG" {
                base.to_string()
            } else {
                format!("{}.{}", base, ext)
            }
        }
        None => text.trim_end().to_string(),
    }
}

/// Check if a filename matches a pattern (with wildcards).
fn name_matches(pattern: &str, filename: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        filename.starts_with(prefix)
    } else if pattern.contains('?') {
        pattern.len() == filename.len()
            && pattern
                .chars()
                .zip(filename.chars())
                .all(|(p, f)| p == '?' || p == f)
    } else {
        pattern == filename
    }
}
