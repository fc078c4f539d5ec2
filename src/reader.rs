//! A seekable cursor over the bytes of one DWARF section.

use std::io;

use crate::common::Format;
use crate::endianity::Endianity;
use crate::error::{Error, ErrorKind, Result};

/// A reader over the data of one section.
///
/// The reader owns the section contents, tracks an absolute byte position
/// within the section, and decodes multi-byte fields with the endianity
/// the container was loaded with. All read operations advance the
/// position. Errors are stamped with the section name and the position at
/// which the read failed.
#[derive(Debug, Clone)]
pub struct SectionReader<Endian>
where
    Endian: Endianity,
{
    data: Vec<u8>,
    pos: usize,
    endian: Endian,
    section: &'static str,
}

impl<Endian> SectionReader<Endian>
where
    Endian: Endianity,
{
    /// Construct a new `SectionReader` over a section's contents.
    pub fn new(data: Vec<u8>, endian: Endian, section: &'static str) -> SectionReader<Endian> {
        SectionReader {
            data,
            pos: 0,
            endian,
            section,
        }
    }

    /// The endianity this reader decodes with.
    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// The name of the section this reader covers.
    #[inline]
    pub fn section(&self) -> &'static str {
        self.section
    }

    /// The total size of the section in bytes.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// The current position within the section.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Return true if the number of bytes remaining is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Construct an error at the current position.
    pub fn error(&self, kind: ErrorKind, context: &'static str) -> Error {
        Error::new(kind, self.section, self.pos as u64, context)
    }

    /// Move the position to `pos`. A position one past the last byte is
    /// permitted, matching the empty reader.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::new(
                ErrorKind::OutOfRange,
                self.section,
                pos as u64,
                "seeking past the end of the section",
            ));
        }
        self.pos = pos;
        Ok(())
    }

    /// Discard the specified number of bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        if self.remaining() < len {
            return Err(self.error(ErrorKind::TruncatedInput, "skipping bytes"));
        }
        self.pos += len;
        Ok(())
    }

    fn read_slice(&mut self, len: usize, context: &'static str) -> Result<&[u8]> {
        if self.remaining() < len {
            return Err(self.error(ErrorKind::TruncatedInput, context));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read a `len`-byte block into an owned buffer.
    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>> {
        self.read_slice(len, context).map(|s| s.to_vec())
    }

    /// Read a u8.
    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        let slice = self.read_slice(1, context)?;
        Ok(slice[0])
    }

    /// Read an i8.
    pub fn read_i8(&mut self, context: &'static str) -> Result<i8> {
        self.read_u8(context).map(|v| v as i8)
    }

    /// Read a u16.
    pub fn read_u16(&mut self, context: &'static str) -> Result<u16> {
        let endian = self.endian;
        let slice = self.read_slice(2, context)?;
        Ok(endian.read_u16(slice))
    }

    /// Read an i16.
    pub fn read_i16(&mut self, context: &'static str) -> Result<i16> {
        self.read_u16(context).map(|v| v as i16)
    }

    /// Read a u32.
    pub fn read_u32(&mut self, context: &'static str) -> Result<u32> {
        let endian = self.endian;
        let slice = self.read_slice(4, context)?;
        Ok(endian.read_u32(slice))
    }

    /// Read an i32.
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32> {
        self.read_u32(context).map(|v| v as i32)
    }

    /// Read a u64.
    pub fn read_u64(&mut self, context: &'static str) -> Result<u64> {
        let endian = self.endian;
        let slice = self.read_slice(8, context)?;
        Ok(endian.read_u64(slice))
    }

    /// Read an i64.
    pub fn read_i64(&mut self, context: &'static str) -> Result<i64> {
        self.read_u64(context).map(|v| v as i64)
    }

    /// Read an address-sized integer, and return it zero-extended to a
    /// `u64`.
    pub fn read_address(&mut self, address_size: u8, context: &'static str) -> Result<u64> {
        match address_size {
            1 => self.read_u8(context).map(u64::from),
            2 => self.read_u16(context).map(u64::from),
            4 => self.read_u32(context).map(u64::from),
            8 => self.read_u64(context),
            otherwise => Err(self.error(
                ErrorKind::UnsupportedAddressSize(otherwise),
                context,
            )),
        }
    }

    /// Read a word-sized integer according to the DWARF format, and
    /// return it as a `u64`.
    pub fn read_word(&mut self, format: Format, context: &'static str) -> Result<u64> {
        match format {
            Format::Dwarf32 => self.read_u32(context).map(u64::from),
            Format::Dwarf64 => self.read_u64(context),
        }
    }

    /// Read an initial length field.
    ///
    /// The 32-bit value `0xffff_ffff` escapes to a 64-bit length and
    /// selects the 64-bit DWARF format; anything else is the length
    /// itself in 32-bit format. The length excludes the length field.
    pub fn read_initial_length(&mut self, context: &'static str) -> Result<(u64, Format)> {
        let value = self.read_u32(context)?;
        if value == 0xffff_ffff {
            let value = self.read_u64(context)?;
            Ok((value, Format::Dwarf64))
        } else {
            Ok((u64::from(value), Format::Dwarf32))
        }
    }

    /// Read an unsigned LEB128 encoded integer.
    pub fn read_uleb128(&mut self, context: &'static str) -> Result<u64> {
        match leb128::read::unsigned(self) {
            Ok(val) => Ok(val),
            Err(leb128::read::Error::IoError(ref e))
                if e.kind() == io::ErrorKind::UnexpectedEof =>
            {
                Err(self.error(ErrorKind::TruncatedInput, context))
            }
            Err(_) => Err(self.error(ErrorKind::Overflow, context)),
        }
    }

    /// Read a signed LEB128 encoded integer.
    pub fn read_sleb128(&mut self, context: &'static str) -> Result<i64> {
        match leb128::read::signed(self) {
            Ok(val) => Ok(val),
            Err(leb128::read::Error::IoError(ref e))
                if e.kind() == io::ErrorKind::UnexpectedEof =>
            {
                Err(self.error(ErrorKind::TruncatedInput, context))
            }
            Err(_) => Err(self.error(ErrorKind::Overflow, context)),
        }
    }

    /// Read a null-terminated string, excluding the null byte.
    pub fn read_string(&mut self, context: &'static str) -> Result<String> {
        let start = self.pos;
        let nul = match self.data[start..].iter().position(|&b| b == 0) {
            Some(idx) => start + idx,
            None => {
                return Err(self.error(ErrorKind::TruncatedInput, context));
            }
        };
        let bytes = self.data[start..nul].to_vec();
        self.pos = nul + 1;
        String::from_utf8(bytes).map_err(|_| {
            Error::new(ErrorKind::BadUtf8, self.section, start as u64, context)
        })
    }
}

// The `leb128` crate decodes from any `io::Read`; reading through this
// impl keeps the reader's position in step with what was consumed.
impl<Endian> io::Read for SectionReader<Endian>
where
    Endian: Endianity,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endianity::{BigEndian, LittleEndian};

    fn reader(data: &[u8]) -> SectionReader<LittleEndian> {
        SectionReader::new(data.to_vec(), LittleEndian, ".debug_info")
    }

    #[test]
    fn test_fixed_width() {
        let mut r = reader(&[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0]);
        assert_eq!(r.read_u16("u16").unwrap(), 0x3412);
        assert_eq!(r.read_u32("u32").unwrap(), 0xbc9a_7856);
        assert_eq!(r.position(), 6);
        assert_eq!(r.remaining(), 2);
        assert_eq!(
            r.read_u32("u32").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn test_big_endian() {
        let mut r = SectionReader::new(vec![0x12, 0x34], BigEndian, ".debug_info");
        assert_eq!(r.read_u16("u16").unwrap(), 0x1234);
    }

    #[test]
    fn test_seek_and_skip() {
        let mut r = reader(&[0, 1, 2, 3]);
        r.seek(2).unwrap();
        assert_eq!(r.read_u8("byte").unwrap(), 2);
        r.seek(4).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.seek(5).unwrap_err().kind(), ErrorKind::OutOfRange);
        r.seek(0).unwrap();
        r.skip(3).unwrap();
        assert_eq!(r.skip(2).unwrap_err().kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_read_address() {
        let mut r = reader(&[0xff, 0xff, 0xff, 0xff]);
        assert_eq!(r.read_address(4, "addr").unwrap(), 0xffff_ffff);
        let mut r = reader(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(r.read_address(8, "addr").unwrap(), 0x0807_0605_0403_0201);
        let mut r = reader(&[0x01]);
        assert_eq!(
            r.read_address(3, "addr").unwrap_err().kind(),
            ErrorKind::UnsupportedAddressSize(3)
        );
    }

    #[test]
    fn test_read_word() {
        let mut r = reader(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(r.read_word(Format::Dwarf32, "word").unwrap(), 0x0403_0201);
        let mut r = reader(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(
            r.read_word(Format::Dwarf64, "word").unwrap(),
            0x0807_0605_0403_0201
        );
    }

    #[test]
    fn test_leb128() {
        // 624485 unsigned, -123456 signed.
        let mut r = reader(&[0xe5, 0x8e, 0x26, 0xc0, 0xbb, 0x78]);
        assert_eq!(r.read_uleb128("uleb").unwrap(), 624_485);
        assert_eq!(r.read_sleb128("sleb").unwrap(), -123_456);
        assert!(r.is_empty());
    }

    #[test]
    fn test_leb128_truncated() {
        let mut r = reader(&[0x80, 0x80]);
        assert_eq!(
            r.read_uleb128("uleb").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn test_read_string() {
        let mut r = reader(b"main\0rest");
        assert_eq!(r.read_string("name").unwrap(), "main");
        assert_eq!(r.position(), 5);
        let mut r = reader(b"no-null");
        assert_eq!(
            r.read_string("name").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }
}
