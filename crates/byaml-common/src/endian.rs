//! Runtime byte order selection.

use std::fmt;
use std::str::FromStr;

/// Byte order of multi-byte values in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Most significant byte first (Wii U era files).
    #[default]
    Big,
    /// Least significant byte first (Switch era files).
    Little,
}

impl Endian {
    /// Lowercase name, as written into XML documents.
    pub const fn name(self) -> &'static str {
        match self {
            Endian::Big => "big",
            Endian::Little => "little",
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endian {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("big") || s.eq_ignore_ascii_case("be") {
            Ok(Endian::Big)
        } else if s.eq_ignore_ascii_case("little") || s.eq_ignore_ascii_case("le") {
            Ok(Endian::Little)
        } else {
            Err(format!("unknown endianness '{}' (expected 'big' or 'little')", s))
        }
    }
}
