pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const PIXELS: usize = WIDTH * HEIGHT;

/// Monochrome 64x32 screen, row-major, one cell (0 or 1) per pixel.
///
/// Any mutation raises the dirty flag; only the renderer clears it through
/// [`FrameBuffer::consume_dirty`].
pub struct FrameBuffer {
    bit_buffer: [u8; PIXELS],
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: [0; PIXELS],
            dirty: false,
        }
    }

    pub fn reset(&mut self) {
        self.bit_buffer = [0; PIXELS];
        self.dirty = false;
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer = [0; PIXELS];
        self.dirty = true;
    }

    /// XOR an 8 pixel wide sprite onto the screen with its top left corner at (x, y).
    /// Coordinates wrap around both edges. Returns whether any lit pixel was turned off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut vf = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 0 {
                    continue;
                }
                let (nx, ny) = ((x as usize + j) % WIDTH, (y as usize + i) % HEIGHT);
                let index = ny * WIDTH + nx;
                if self.bit_buffer[index] == 1 {
                    vf = true;
                }
                self.bit_buffer[index] ^= 1;
            }
        }
        self.dirty = true;
        vf
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.bit_buffer[(y % HEIGHT) * WIDTH + (x % WIDTH)]
    }

    pub fn snapshot(&self) -> [u8; PIXELS] {
        self.bit_buffer
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
