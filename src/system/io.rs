//! Host-facing I/O glue.
//!
//! `Io` is what the host event loop talks to: one `emulate` call per tick,
//! key events as they arrive, and `refresh` once per frame.

use log::warn;

use super::keyboard::KeyboardTranslator;
use super::trap::KernalTrap;
use crate::config::TrapConfig;
use crate::filesystem::FileSystem;
use crate::memory::MemoryBus;
use crate::video::{Framebuffer, IndexedFramebuffer};

/// Trapdoor, keyboard and screen for one emulated machine.
pub struct Io<F: FileSystem, V: Framebuffer = IndexedFramebuffer> {
    trap: KernalTrap,
    keyboard: KeyboardTranslator,
    disk: F,
    video: V,
}

impl<F: FileSystem> Io<F> {
    /// Stock C64 cells, in-memory framebuffer.
    pub fn new(disk: F) -> Self {
        Self::with_parts(TrapConfig::default(), disk, IndexedFramebuffer::default())
    }
}

impl<F: FileSystem, V: Framebuffer> Io<F, V> {
    pub fn with_parts(config: TrapConfig, disk: F, video: V) -> Self {
        Self {
            keyboard: KeyboardTranslator::new(&config.cells),
            trap: KernalTrap::new(config),
            disk,
            video,
        }
    }

    /// One emulation tick. Returns `false` when emulation should stop,
    /// which the trapdoor itself never asks for.
    pub fn emulate<M: MemoryBus + ?Sized>(&mut self, mem: &mut M) -> bool {
        match self.trap.tick(mem, &mut self.disk) {
            Ok(running) => running,
            Err(err) => {
                warn!("Trap request rejected: {}", err);
                true
            }
        }
    }

    /// Host key press.
    pub fn on_key_down<M: MemoryBus + ?Sized>(&mut self, code: u8, mem: &mut M) -> Option<u8> {
        self.keyboard.key_down(code, mem)
    }

    /// Host key release.
    pub fn on_key_up(&mut self, code: u8) {
        self.keyboard.key_up(code);
    }

    /// Present the current frame.
    pub fn refresh(&mut self) {
        self.video.present();
    }

    pub fn trap(&self) -> &KernalTrap {
        &self.trap
    }

    pub fn keyboard(&self) -> &KeyboardTranslator {
        &self.keyboard
    }

    pub fn disk(&self) -> &F {
        &self.disk
    }

    pub fn disk_mut(&mut self) -> &mut F {
        &mut self.disk
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }
}
