//! Fixed-width row codec.
//!
//! A row is serialized into exactly [`ROW_SIZE`] bytes:
//! ```text
//! Offset  Size  Description
//! 0       4     id (little-endian)
//! 4       32    username bytes, zero-filled past the text
//! 36      255   email bytes, zero-filled past the text
//! ```

use crate::error::{Result, StorageError};
use std::borrow::Cow;
use std::fmt;

pub const ID_SIZE: usize = std::mem::size_of::<u32>();
pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;
pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// A table record keyed by `id`
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    /// Ordering key
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Build a row, rejecting text longer than its column
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        Ok(Self {
            id,
            username: fixed_column("username", username)?,
            email: fixed_column("email", email)?,
        })
    }

    /// Username text with the zero padding stripped
    pub fn username(&self) -> Cow<'_, str> {
        column_text(&self.username)
    }

    /// Email text with the zero padding stripped
    pub fn email(&self) -> Cow<'_, str> {
        column_text(&self.email)
    }

    /// Write this row into the first `ROW_SIZE` bytes of `dest`
    pub fn serialize(&self, dest: &mut [u8]) {
        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
    }

    /// Read a row from the first `ROW_SIZE` bytes of `src`
    pub fn deserialize(src: &[u8]) -> Self {
        let mut id = [0u8; ID_SIZE];
        let mut username = [0u8; USERNAME_SIZE];
        let mut email = [0u8; EMAIL_SIZE];

        id.copy_from_slice(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]);
        username.copy_from_slice(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
        email.copy_from_slice(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);

        Self {
            id: u32::from_le_bytes(id),
            username,
            email,
        }
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("username", &self.username())
            .field("email", &self.email())
            .finish()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username(), self.email())
    }
}

fn fixed_column<const N: usize>(field: &'static str, text: &str) -> Result<[u8; N]> {
    let bytes = text.as_bytes();
    if bytes.len() > N {
        return Err(StorageError::FieldTooLong {
            field,
            len: bytes.len(),
            max: N,
        });
    }
    let mut column = [0u8; N];
    column[..bytes.len()].copy_from_slice(bytes);
    Ok(column)
}

fn column_text(column: &[u8]) -> Cow<'_, str> {
    let end = column.iter().position(|&b| b == 0).unwrap_or(column.len());
    String::from_utf8_lossy(&column[..end])
}
