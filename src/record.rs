//! # Row Codec
//!
//! The single record type stored by the engine and its fixed-width
//! binary codec.
//!
//! ## Wire Layout (293 bytes)
//!
//! ```text
//! Offset  Size  Field     Description
//! ------  ----  --------  ---------------------------------------
//! 0       4     id        Primary key, little-endian u32
//! 4       33    username  ASCII, null-padded, 1 terminator byte
//! 37      256   email     ASCII, null-padded, 1 terminator byte
//! ```
//!
//! Text fields shorter than their allocated width are padded with zero
//! bytes; decoding reads up to the first zero. Length validation is the
//! statement parser's concern: by the time a row reaches the codec its
//! fields fit their columns, so the codec itself has no error paths.
//!
//! Rows exist only transiently as decoded values; the persistent form is
//! always the 293-byte cell payload inside a leaf page.

use std::fmt;

use crate::config::{
    EMAIL_MAX_LEN, EMAIL_OFFSET, ID_OFFSET, ROW_SIZE, USERNAME_MAX_LEN, USERNAME_OFFSET,
};

/// One row of the table: `(id, username, email)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Writes the 293-byte encoding into `dst`, which must be at least
    /// [`ROW_SIZE`] bytes long.
    pub fn encode_into(&self, dst: &mut [u8]) {
        let dst = &mut dst[..ROW_SIZE];
        dst.fill(0);
        dst[ID_OFFSET..ID_OFFSET + 4].copy_from_slice(&self.id.to_le_bytes());

        let username = self.username.as_bytes();
        let len = username.len().min(USERNAME_MAX_LEN);
        dst[USERNAME_OFFSET..USERNAME_OFFSET + len].copy_from_slice(&username[..len]);

        let email = self.email.as_bytes();
        let len = email.len().min(EMAIL_MAX_LEN);
        dst[EMAIL_OFFSET..EMAIL_OFFSET + len].copy_from_slice(&email[..len]);
    }

    /// Returns the 293-byte encoding as an owned buffer.
    pub fn encode(&self) -> [u8; ROW_SIZE] {
        let mut buf = [0u8; ROW_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Decodes a row from `src`, which must be at least [`ROW_SIZE`]
    /// bytes long. `decode(encode(r)) == r` for any row with in-bounds
    /// field lengths.
    pub fn decode(src: &[u8]) -> Self {
        let src = &src[..ROW_SIZE];
        let id = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        Self {
            id,
            username: decode_text(&src[USERNAME_OFFSET..EMAIL_OFFSET]),
            email: decode_text(&src[EMAIL_OFFSET..ROW_SIZE]),
        }
    }
}

fn decode_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let row = Row::new(1, "alice", "alice@example.com");
        let decoded = Row::decode(&row.encode());

        assert_eq!(decoded, row);
    }

    #[test]
    fn encode_is_exactly_row_size() {
        let row = Row::new(7, "bob", "bob@example.com");

        assert_eq!(row.encode().len(), ROW_SIZE);
    }

    #[test]
    fn id_is_little_endian_at_offset_zero() {
        let row = Row::new(0x0102_0304, "x", "y");
        let buf = row.encode();

        assert_eq!(&buf[..4], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn short_fields_are_null_padded() {
        let row = Row::new(1, "ab", "c");
        let buf = row.encode();

        assert_eq!(&buf[USERNAME_OFFSET..USERNAME_OFFSET + 3], b"ab\0");
        assert!(buf[USERNAME_OFFSET + 2..EMAIL_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(buf[EMAIL_OFFSET], b'c');
        assert!(buf[EMAIL_OFFSET + 1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn maximum_length_fields_round_trip() {
        let username = "a".repeat(USERNAME_MAX_LEN);
        let email = "b".repeat(EMAIL_MAX_LEN);
        let row = Row::new(42, username.clone(), email.clone());

        let decoded = Row::decode(&row.encode());

        assert_eq!(decoded.username, username);
        assert_eq!(decoded.email, email);
    }

    #[test]
    fn encode_into_overwrites_stale_bytes() {
        let mut buf = [0xFFu8; ROW_SIZE];
        Row::new(1, "a", "b").encode_into(&mut buf);

        let decoded = Row::decode(&buf);
        assert_eq!(decoded.username, "a");
        assert_eq!(decoded.email, "b");
    }

    #[test]
    fn display_formats_as_tuple() {
        let row = Row::new(1, "test", "test@email.com");

        assert_eq!(row.to_string(), "(1, test, test@email.com)");
    }
}
