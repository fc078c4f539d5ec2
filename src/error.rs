//! The error type returned by every decoder in the crate.

use std::error;
use std::fmt;
use std::result;

use crate::constants;

/// The category of a decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An I/O error occurred while reading the backing file.
    Io,
    /// The backing file was modified after the container was loaded.
    ModifiedUnderneath,
    /// A required ELF section is absent.
    MissingSection,
    /// The ELF container itself is malformed.
    MalformedElf,
    /// A section ended in the middle of a record.
    TruncatedInput,
    /// An abbreviation table entry is malformed: a duplicate code, a
    /// has-children byte that is not 0 or 1, or a half-null attribute
    /// specification.
    MalformedAbbrev,
    /// A DIE uses an abbreviation code that is not in its unit's table.
    UnknownAbbrevCode(u64),
    /// An attribute's form is not representable for the attribute's class.
    UnsupportedForm(constants::DwForm),
    /// No decoding rule applies to an attribute with the given name.
    UnsupportedAttribute(constants::DwAt),
    /// A DWARF expression opcode is unknown or explicitly unsupported.
    UnsupportedOpcode(constants::DwOp),
    /// A line-number-program opcode is unknown or explicitly unsupported.
    UnsupportedLineOpcode(constants::DwLne),
    /// The DWARF unit version is outside the implemented set.
    UnsupportedVersion(u16),
    /// The size of an address field is not one this decoder reads.
    UnsupportedAddressSize(u8),
    /// Narrowing an integer lost information, or an offset points outside
    /// the section it indexes.
    OutOfRange,
    /// A LEB128 value did not fit in 64 bits.
    Overflow,
    /// An inline or `.debug_str` string is not valid UTF-8.
    BadUtf8,
    /// A DWARF expression did not consume exactly its declared size.
    TruncatedExpression,
    /// A line-number program did not consume exactly its declared size.
    TruncatedLineProgram,
}

impl ErrorKind {
    /// A short description of the error kind.
    pub fn description(&self) -> &'static str {
        match *self {
            ErrorKind::Io => "an I/O error occurred while reading",
            ErrorKind::ModifiedUnderneath => "the file was modified after the container was loaded",
            ErrorKind::MissingSection => "a required section is absent",
            ErrorKind::MalformedElf => "the ELF container is malformed",
            ErrorKind::TruncatedInput => "the section ended in the middle of a record",
            ErrorKind::MalformedAbbrev => "an abbreviation table entry is malformed",
            ErrorKind::UnknownAbbrevCode(_) => {
                "a DIE uses an abbreviation code that is not in its unit's table"
            }
            ErrorKind::UnsupportedForm(_) => {
                "the attribute's form is not representable for its class"
            }
            ErrorKind::UnsupportedAttribute(_) => "no decoding rule applies to the attribute",
            ErrorKind::UnsupportedOpcode(_) => {
                "a DWARF expression opcode is unknown or unsupported"
            }
            ErrorKind::UnsupportedLineOpcode(_) => {
                "a line-number-program opcode is unknown or unsupported"
            }
            ErrorKind::UnsupportedVersion(_) => "the DWARF version is outside the implemented set",
            ErrorKind::UnsupportedAddressSize(_) => "the address size is not supported",
            ErrorKind::OutOfRange => "an integer narrowing lost information or an offset is out of bounds",
            ErrorKind::Overflow => "a LEB128 value did not fit in 64 bits",
            ErrorKind::BadUtf8 => "a string is not valid UTF-8",
            ErrorKind::TruncatedExpression => {
                "a DWARF expression did not consume exactly its declared size"
            }
            ErrorKind::TruncatedLineProgram => {
                "a line-number program did not consume exactly its declared size"
            }
        }
    }
}

/// An error that occurred while decoding.
///
/// Every error carries its [`ErrorKind`], the name of the section being
/// decoded, the byte offset within that section at which decoding failed,
/// and a static context string describing what was being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    section: &'static str,
    offset: u64,
    context: &'static str,
}

impl Error {
    /// Construct a new `Error`.
    pub fn new(kind: ErrorKind, section: &'static str, offset: u64, context: &'static str) -> Error {
        Error {
            kind,
            section,
            offset,
            context,
        }
    }

    /// Construct an error that is not tied to any section, such as a
    /// failure to stat or open the backing file.
    pub fn file_level(kind: ErrorKind, context: &'static str) -> Error {
        Error {
            kind,
            section: "",
            offset: 0,
            context,
        }
    }

    /// The category of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The name of the section that was being decoded, or the empty
    /// string for file-level errors.
    #[inline]
    pub fn section(&self) -> &'static str {
        self.section
    }

    /// The byte offset within the section at which decoding failed.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// A static description of what was being read when the error occurred.
    #[inline]
    pub fn context(&self) -> &'static str {
        self.context
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        if self.section.is_empty() {
            write!(f, "{}: {}", self.context, self.kind.description())?;
        } else {
            write!(
                f,
                "{}+{:#x}: {}: {}",
                self.section,
                self.offset,
                self.context,
                self.kind.description()
            )?;
        }
        match self.kind {
            ErrorKind::UnknownAbbrevCode(code) => write!(f, " ({})", code),
            ErrorKind::UnsupportedForm(form) => write!(f, " ({})", form),
            ErrorKind::UnsupportedAttribute(at) => write!(f, " ({})", at),
            ErrorKind::UnsupportedOpcode(op) => write!(f, " ({})", op),
            ErrorKind::UnsupportedLineOpcode(op) => write!(f, " ({})", op),
            ErrorKind::UnsupportedVersion(version) => write!(f, " ({})", version),
            ErrorKind::UnsupportedAddressSize(size) => write!(f, " ({})", size),
            _ => Ok(()),
        }
    }
}

impl error::Error for Error {}

/// The result of a decode.
pub type Result<T> = result::Result<T, Error>;
