//! WebAssembly bindings for the trapdoor.
//!
//! Lets a browser host run the trap against a flat 64KB memory and an
//! in-memory disk: poke requests into memory, tick, and read the results.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::config::TrapConfig;
use crate::memory::{FlatMemory, MemoryBus};
use crate::system::{Io, VirtualDisk};
use crate::video::IndexedFramebuffer;

/// WASM wrapper around `Io` with its own memory and disk.
#[wasm_bindgen]
pub struct TrapdoorMachine {
    memory: FlatMemory,
    io: Io<VirtualDisk>,
}

#[wasm_bindgen]
impl TrapdoorMachine {
    /// Create a machine with an empty disk and the stock C64 cells.
    #[wasm_bindgen(constructor)]
    pub fn new(disk_name: &str) -> Self {
        Self::build(disk_name, TrapConfig::default())
    }

    /// Create a machine that also honours the directory and autoload
    /// commands.
    #[wasm_bindgen]
    pub fn new_extended(disk_name: &str) -> Self {
        Self::build(disk_name, TrapConfig::extended())
    }

    /// Run one emulation tick. Returns the liveness flag.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> bool {
        self.io.emulate(&mut self.memory)
    }

    /// Host key press. Returns the injected PETSCII code, if any.
    #[wasm_bindgen]
    pub fn key_down(&mut self, code: u8) -> Option<u8> {
        self.io.on_key_down(code, &mut self.memory)
    }

    /// Host key release.
    #[wasm_bindgen]
    pub fn key_up(&mut self, code: u8) {
        self.io.on_key_up(code);
    }

    /// Read a byte from memory (for debugging).
    #[wasm_bindgen]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    /// Write a byte to memory (for debugging).
    #[wasm_bindgen]
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.memory.write(addr, value);
    }

    /// Copy `len` bytes out of memory.
    #[wasm_bindgen]
    pub fn read_block(&self, addr: u16, len: usize) -> Uint8Array {
        Uint8Array::from(self.memory.slice(addr, len).as_slice())
    }

    /// Store a file on the virtual disk.
    #[wasm_bindgen]
    pub fn add_file(&mut self, name: &str, data: &[u8]) {
        self.io.disk_mut().insert(name, data.to_vec());
    }

    /// Delete a file from the virtual disk. Returns `true` if it existed.
    #[wasm_bindgen]
    pub fn remove_file(&mut self, name: &str) -> bool {
        self.io.disk_mut().remove(name).is_some()
    }

    /// Contents of a file on the virtual disk, e.g. after a SAVE.
    #[wasm_bindgen]
    pub fn get_file(&self, name: &str) -> Option<Uint8Array> {
        self.io.disk().file(name).map(Uint8Array::from)
    }

    /// File names in directory order.
    #[wasm_bindgen]
    pub fn list_files(&self) -> Array {
        self.io
            .disk()
            .file_names()
            .map(JsValue::from_str)
            .collect()
    }

    /// Present the framebuffer and return it as RGBA bytes.
    #[wasm_bindgen]
    pub fn refresh(&mut self) -> Vec<u8> {
        self.io.refresh();
        self.io.video().to_rgba()
    }
}

impl TrapdoorMachine {
    fn build(disk_name: &str, config: TrapConfig) -> Self {
        Self {
            memory: FlatMemory::new(),
            io: Io::with_parts(
                config,
                VirtualDisk::new(disk_name, *b"00"),
                IndexedFramebuffer::default(),
            ),
        }
    }
}
