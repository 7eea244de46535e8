use std::io::{self, Write};

use softchip8_core::Framebuffer;

const PIXEL_ON: char = '█';
const PIXEL_OFF: char = ' ';

/// Draw the frame as text, one line per pixel row.
pub fn render_frame<W: Write>(out: &mut W, frame: &Framebuffer) -> io::Result<()> {
    let mut line = String::with_capacity(frame.width() * PIXEL_ON.len_utf8() + 1);
    for row in frame.rows() {
        line.clear();
        line.extend(row.iter().map(|on| if *on { PIXEL_ON } else { PIXEL_OFF }));
        writeln!(out, "{}", line.trim_end())?;
    }
    out.flush()
}
