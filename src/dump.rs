/// Hex dump of sector payloads

use std::fmt::Write;

/// Format `data` as 16 byte rows of offset, hex and ASCII columns
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, "{:04x}: ", i * 16);

        for (j, byte) in chunk.iter().enumerate() {
            let _ = write!(out, "{:02x} ", byte);
            if j == 7 {
                out.push(' ');
            }
        }

        // Pad a short last row so the ASCII column lines up
        for j in chunk.len()..16 {
            out.push_str("   ");
            if j == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if (32..127).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }

    out
}
