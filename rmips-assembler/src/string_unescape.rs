use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnescapeError {
    TrailingBackslash,
    UnknownEscape(char),
    OutOfRange(String),
}

impl Display for UnescapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::TrailingBackslash => f.write_str("trailing backslash"),
            UnescapeError::UnknownEscape(c) => write!(f, "unknown escape '\\{}'", c),
            UnescapeError::OutOfRange(digits) => {
                write!(f, "escape '\\{}' is out of range", digits)
            }
        }
    }
}

/// Convert C-style escape sequences into their raw byte values. Supports
/// the single-character escapes, 3-digit octal `\NNN`, and 2-digit hex
/// `\xNN`; other source characters pass through as their UTF-8 bytes.
pub fn unescape(s: &str) -> Result<Vec<u8>, UnescapeError> {
    let mut chars = s.chars();
    let mut result = Vec::with_capacity(s.len());

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buffer = [0; 4];
            result.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            continue;
        }

        match chars.next() {
            Some('a') => result.push(0x07),
            Some('b') => result.push(0x08),
            Some('f') => result.push(0x0C),
            Some('n') => result.push(b'\n'),
            Some('r') => result.push(b'\r'),
            Some('t') => result.push(b'\t'),
            Some('v') => result.push(0x0B),
            Some('\\') => result.push(b'\\'),
            Some('\'') => result.push(b'\''),
            Some('\"') => result.push(b'\"'),
            Some('x') => result.push(hex_escape(&mut chars)?),
            Some(first @ '0'..='7') => result.push(octal_escape(first, &mut chars)?),
            Some(c) => return Err(UnescapeError::UnknownEscape(c)),
            None => return Err(UnescapeError::TrailingBackslash),
        }
    }

    Ok(result)
}

/// `\xNN`: exactly two hex digits.
fn hex_escape(chars: &mut std::str::Chars) -> Result<u8, UnescapeError> {
    let mut digits = String::new();

    for _ in 0..2 {
        match chars.next() {
            Some(digit) if digit.is_ascii_hexdigit() => digits.push(digit),
            _ => return Err(UnescapeError::OutOfRange(format!("x{}", digits))),
        }
    }

    u8::from_str_radix(&digits, 16).map_err(|_| UnescapeError::OutOfRange(digits))
}

/// `\NNN`: exactly three octal digits, at most 0o377.
fn octal_escape(first: char, chars: &mut std::str::Chars) -> Result<u8, UnescapeError> {
    let mut digits = String::new();
    digits.push(first);

    for _ in 0..2 {
        match chars.next() {
            Some(digit) if ('0'..='7').contains(&digit) => digits.push(digit),
            _ => return Err(UnescapeError::OutOfRange(digits)),
        }
    }

    match u16::from_str_radix(&digits, 8) {
        Ok(value) if value <= 0xFF => Ok(value as u8),
        _ => Err(UnescapeError::OutOfRange(digits)),
    }
}
