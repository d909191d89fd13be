//! Video boundary.
//!
//! Rendering is not the trapdoor's job, but the host loop that drives it
//! also owns the screen. [`Framebuffer`] is the seam: the emulator fills a
//! buffer of colour indices and calls `present` once per refresh.

/// Visible screen width in pixels.
pub const SCREEN_WIDTH: usize = 320;

/// Visible screen height in pixels.
pub const SCREEN_HEIGHT: usize = 200;

/// The 16 C64 colours as 6-bit VGA DAC triples.
pub const PALETTE: [[u8; 3]; 16] = [
    [0, 0, 0],    // black
    [63, 63, 63], // white
    [63, 0, 0],   // red
    [0, 63, 63],  // cyan
    [63, 0, 63],  // violet
    [0, 63, 0],   // green
    [0, 0, 63],   // blue
    [63, 63, 0],  // yellow
    [63, 36, 0],  // orange
    [50, 20, 0],  // brown
    [63, 40, 50], // light red
    [20, 20, 20], // dark grey
    [30, 30, 30], // grey
    [20, 63, 20], // light green
    [30, 30, 63], // light blue
    [40, 40, 40], // light grey
];

/// 8-bit RGB for a colour index. Only the low nibble is used.
pub fn rgb(index: u8) -> [u8; 3] {
    PALETTE[(index & 0x0F) as usize].map(|v| (v << 2) | (v >> 4))
}

/// A screen the emulator draws colour indices into.
pub trait Framebuffer {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Back buffer, `width * height` colour indices, row major.
    fn pixels_mut(&mut self) -> &mut [u8];

    /// Make the back buffer visible.
    fn present(&mut self);
}

/// Double-buffered framebuffer of colour indices kept in memory.
#[derive(Debug, Clone)]
pub struct IndexedFramebuffer {
    width: usize,
    height: usize,
    back: Vec<u8>,
    front: Vec<u8>,
    presents: u64,
}

impl Default for IndexedFramebuffer {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl IndexedFramebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            back: vec![0; width * height],
            front: vec![0; width * height],
            presents: 0,
        }
    }

    /// The last presented frame.
    pub fn front(&self) -> &[u8] {
        &self.front
    }

    /// Number of frames presented.
    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// The last presented frame as RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.front
            .iter()
            .flat_map(|&index| {
                let [r, g, b] = rgb(index);
                [r, g, b, 0xFF]
            })
            .collect()
    }
}

impl Framebuffer for IndexedFramebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.back
    }

    fn present(&mut self) {
        self.front.copy_from_slice(&self.back);
        self.presents += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_scaling() {
        assert_eq!(rgb(0), [0, 0, 0]);
        assert_eq!(rgb(1), [255, 255, 255]);
        assert_eq!(rgb(2), [255, 0, 0]);
        // High nibble ignored
        assert_eq!(rgb(0x12), rgb(0x02));
    }

    #[test]
    fn test_present_swaps_buffers() {
        let mut fb = IndexedFramebuffer::new(4, 2);
        fb.pixels_mut()[3] = 6;
        assert_eq!(fb.front()[3], 0);

        fb.present();
        assert_eq!(fb.front()[3], 6);
        assert_eq!(fb.presents(), 1);
    }

    #[test]
    fn test_rgba_export() {
        let mut fb = IndexedFramebuffer::new(2, 1);
        fb.pixels_mut().copy_from_slice(&[1, 6]);
        fb.present();
        assert_eq!(fb.to_rgba(), vec![255, 255, 255, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn test_default_size() {
        let fb = IndexedFramebuffer::default();
        assert_eq!(fb.width(), SCREEN_WIDTH);
        assert_eq!(fb.height(), SCREEN_HEIGHT);
        assert_eq!(fb.front().len(), SCREEN_WIDTH * SCREEN_HEIGHT);
    }
}
