/// I/O operations for emulator and flat image files

/// Flat image access
pub mod flat;
/// Emulator file reader
pub mod reader;
/// Emulator file writer
pub mod writer;

pub use flat::{create_flat, open_flat, read_block, FlatImage};
pub use reader::{open_emulator, EmulatorReader};
pub use writer::{create_emulator, EmulatorWriter};
