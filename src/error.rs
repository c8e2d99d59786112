// Error related data structures.
use std::fmt::{self, Display, Formatter};

// Setup and I/O failures. Runtime oddities (writes to ROM, reads from unmapped I/O, unknown opcodes)
// are not errors; they are logged and the core keeps running.
#[derive(Debug)]
pub enum Error {
    // The ROM is smaller than the 0x150 byte header area.
    RomSize(usize),
    // Byte 0x0147 of the header names a memory bank controller this core does not implement.
    UnsupportedCartridgeType(u8),
    // The SRAM sidecar file does not match the size the header declares.
    SramSize { expect: usize, got: usize },
    // A save-state stream has a bad magic, version or length.
    InvalidState(String),
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::RomSize(n) => write!(f, "rom size {} is below the 0x150 byte header area", n),
            Error::UnsupportedCartridgeType(n) => write!(f, "unsupported cartridge type 0x{:02x}", n),
            Error::SramSize { expect, got } => write!(f, "sram size mismatch: expect {} got {}", expect, got),
            Error::InvalidState(msg) => write!(f, "invalid save state: {}", msg),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
