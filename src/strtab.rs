//! Random access into the `.debug_str` string pool.

use crate::common::section;
use crate::error::{Error, ErrorKind, Result};

/// The null-terminated string pool found in the `.debug_str` section.
///
/// `DW_FORM_strp` attributes index into this pool by byte offset; an
/// offset may point at the start of a string or into the tail of a longer
/// one.
#[derive(Debug, Clone)]
pub struct StrTable {
    data: Vec<u8>,
}

impl StrTable {
    /// Construct a new `StrTable` from the contents of `.debug_str`.
    pub fn new(data: Vec<u8>) -> StrTable {
        StrTable { data }
    }

    /// The total size of the pool in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if the pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the string starting at the given byte offset.
    pub fn get_str(&self, offset: u64) -> Result<String> {
        let start = offset as usize;
        if offset > self.data.len() as u64 {
            return Err(Error::new(
                ErrorKind::OutOfRange,
                section::DEBUG_STR,
                offset,
                "string offset is outside .debug_str",
            ));
        }
        let nul = match self.data[start..].iter().position(|&b| b == 0) {
            Some(idx) => start + idx,
            None => {
                return Err(Error::new(
                    ErrorKind::TruncatedInput,
                    section::DEBUG_STR,
                    offset,
                    "string is not null-terminated",
                ));
            }
        };
        String::from_utf8(self.data[start..nul].to_vec()).map_err(|_| {
            Error::new(
                ErrorKind::BadUtf8,
                section::DEBUG_STR,
                offset,
                "string is not valid UTF-8",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_str() {
        let table = StrTable::new(b"main\0main.c\0int\0".to_vec());
        assert_eq!(table.get_str(0).unwrap(), "main");
        assert_eq!(table.get_str(5).unwrap(), "main.c");
        assert_eq!(table.get_str(12).unwrap(), "int");
        // A suffix of a longer string.
        assert_eq!(table.get_str(10).unwrap(), "c");
    }

    #[test]
    fn test_out_of_range() {
        let table = StrTable::new(b"a\0".to_vec());
        assert_eq!(table.get_str(3).unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_unterminated() {
        let table = StrTable::new(b"abc".to_vec());
        assert_eq!(
            table.get_str(1).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }
}
