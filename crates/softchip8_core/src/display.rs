use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// 64x32 monochrome display, row-major, `true` = pixel on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }
}

impl Framebuffer {
    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// Pixel state at `(x, y)`; coordinates outside the screen read as off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.pixels[y * SCREEN_WIDTH + x]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.pixels.chunks(SCREEN_WIDTH)
    }

    pub fn clear(&mut self) {
        self.pixels = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
    }

    /// XOR an 8 pixel wide sprite onto the screen, one byte per row with the
    /// most significant bit leftmost. Every pixel wraps around the screen
    /// edges on its own.
    ///
    /// Returns true if any pixel that was on got switched off. The caller
    /// stores this in VF once the whole sprite is drawn.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let x_coord = x as usize;
        let y_coord = y as usize;
        let mut collision = false;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8 {
                if (bits >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let x = (x_coord + col) % SCREEN_WIDTH;
                let y = (y_coord + row) % SCREEN_HEIGHT;
                let pixel = &mut self.pixels[x + y * SCREEN_WIDTH];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        collision
    }
}
