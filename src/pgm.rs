//! PGM (P2 ASCII) output for a decoded channel.

use std::io::Write;

use crate::channel::Channel;
use crate::err;

/// Writes `channel` as a PGM P2 ASCII image: a `"P2 %d %d 65535\n"` header
/// followed by `height` rows of `width` space-separated decimal pixels, each
/// row newline-terminated.
pub fn write_channel<W: Write>(writer: &mut W, channel: &Channel) -> err::Result<()> {
    writeln!(writer, "P2 {} {} 65535", channel.width(), channel.height())?;

    for row in channel.raw().chunks_exact(channel.width()) {
        let mut line = String::with_capacity(row.len() * 6);
        for (i, pixel) in row.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&pixel.to_string());
        }
        writeln!(writer, "{}", line)?;
    }

    Ok(())
}
