/// Sector defect map visualization

use crate::convert::DecodeReport;
use crate::format::{Geometry, SectorAddress};
use crate::image::SectorDefect;
use std::fmt::Write;

/// ANSI color codes for the defect map
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const DARK_WHITE: &str = "\x1b[37m";
    pub const DARK_GREY: &str = "\x1b[90m";
    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_MAGENTA: &str = "\x1b[95m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
}

/// Character drawn for a sector without defects
pub const CLEAN_CELL: char = '.';

/// Cell character for a sector: [`CLEAN_CELL`] or the code of its worst defect
///
/// Address mismatches outrank checksum errors, which outrank short sectors.
pub fn cell_for<'a, I>(defects: I) -> char
where
    I: IntoIterator<Item = &'a SectorDefect>,
{
    defects
        .into_iter()
        .max_by_key(|d| match d {
            SectorDefect::CylinderMismatch { .. } => 3,
            SectorDefect::ChecksumMismatch { .. } => 2,
            SectorDefect::ShortSector { .. } => 1,
        })
        .map_or(CLEAN_CELL, SectorDefect::code)
}

/// Draw the defect map of a decoded image
///
/// Cylinders run left to right; each row is one head/sector position, head 0
/// sector 0 at the bottom. Spare cylinders are drawn dimmed when `color` is set.
pub fn draw_defect_map(report: &DecodeReport, geometry: &Geometry, color: bool) -> String {
    let mut out = String::new();
    let cylinders = geometry.num_cylinders as usize;
    let rows = geometry.sectors_per_cylinder();

    let _ = writeln!(out, "=== Defect Map ({}) ===", report.header.image_name);
    if color {
        let _ = writeln!(
            out,
            "Legend: {}. OK{} {}S Short{} {}C Checksum{} {}A Address{}",
            colors::DARK_WHITE,
            colors::RESET,
            colors::BRIGHT_YELLOW,
            colors::RESET,
            colors::BRIGHT_RED,
            colors::RESET,
            colors::BRIGHT_MAGENTA,
            colors::RESET
        );
    } else {
        let _ = writeln!(out, "Legend: . OK  S Short  C Checksum  A Address");
    }
    out.push('\n');

    let mut grid = vec![vec![CLEAN_CELL; cylinders]; rows];
    for cylinder in 0..geometry.num_cylinders {
        for head in 0..geometry.num_heads {
            for sector in 0..geometry.sectors_per_track {
                let address = SectorAddress::new(cylinder, head, sector);
                let row = head as usize * geometry.sectors_per_track as usize + sector as usize;
                grid[row][cylinder as usize] = cell_for(report.defects_at(address));
            }
        }
    }

    for row in (0..rows).rev() {
        let head = row / geometry.sectors_per_track as usize;
        let sector = row % geometry.sectors_per_track as usize;
        let _ = write!(out, "{}/{:>2} ", head, sector);

        for (cylinder, &cell) in grid[row].iter().enumerate() {
            if color {
                let tint = match cell {
                    'S' => colors::BRIGHT_YELLOW,
                    'C' => colors::BRIGHT_RED,
                    'A' => colors::BRIGHT_MAGENTA,
                    _ if !geometry.is_user_cylinder(cylinder as u16) => colors::DARK_GREY,
                    _ => colors::DARK_WHITE,
                };
                let _ = write!(out, "{}{}{}", tint, cell, colors::RESET);
            } else {
                out.push(cell);
            }
        }
        out.push('\n');
    }

    // Cylinder axis, a label every ten columns
    out.push_str("     ");
    let mut col = 0;
    while col < cylinders {
        if col % 10 == 0 {
            let label = col.to_string();
            let width = label.len().min(cylinders - col);
            out.push_str(&label[..width]);
            col += width;
        } else {
            out.push(' ');
            col += 1;
        }
    }
    out.push('\n');

    out
}
