//! Windows-1252, the legacy single-byte code page of BYAML string tables.
//!
//! Pooled strings are decoded by passing the raw bytes through this code page
//! and back before interpreting them as UTF-8. For bytes that Windows-1252
//! maps one-to-one this is an identity on the byte level, so the observable
//! result is UTF-8 text with invalid sequences replaced by U+FFFD. Characters
//! the code page cannot represent are encoded as `?`.

/// Characters for bytes 0x80..=0x9F. Unassigned slots map to the C1 control
/// with the same value, which keeps them round-trippable.
const HIGH_CONTROL_BLOCK: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Decode Windows-1252 bytes into text.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}

/// Encode text into Windows-1252, replacing unmappable characters with `?`.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(|c| encode_char(c).unwrap_or(b'?')).collect()
}

/// Run raw string-table bytes through the legacy code page and read the
/// result as UTF-8.
pub fn legacy_to_utf8(bytes: &[u8]) -> String {
    let reencoded = encode(&decode(bytes));
    String::from_utf8_lossy(&reencoded).into_owned()
}

#[inline]
fn decode_byte(b: u8) -> char {
    match b {
        0x80..=0x9F => HIGH_CONTROL_BLOCK[(b - 0x80) as usize],
        _ => char::from(b),
    }
}

fn encode_char(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x00..=0x7F | 0xA0..=0xFF => Some(code as u8),
        _ => HIGH_CONTROL_BLOCK
            .iter()
            .position(|&m| m == c)
            .map(|i| 0x80 + i as u8),
    }
}
