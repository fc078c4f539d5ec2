//! Types shared by every decoder in the crate.

/// Whether the format of a compilation unit is 32- or 64-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// 64-bit DWARF
    Dwarf64,
    /// 32-bit DWARF
    Dwarf32,
}

impl Format {
    /// Return the serialized size of an initial length field for the format.
    #[inline]
    pub fn initial_length_size(self) -> u8 {
        match self {
            Format::Dwarf32 => 4,
            Format::Dwarf64 => 12,
        }
    }

    /// Return the natural word size for the format.
    #[inline]
    pub fn word_size(self) -> u8 {
        match self {
            Format::Dwarf32 => 4,
            Format::Dwarf64 => 8,
        }
    }
}

/// The decoding parameters that vary per compilation unit.
///
/// Attribute, expression and list decoding all need these three facts and
/// nothing else from the unit header, so they are bundled and passed by
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    /// Whether the unit is 32- or 64-bit DWARF.
    pub format: Format,

    /// The DWARF version of the unit.
    pub version: u16,

    /// The size in bytes of an address in the unit.
    pub address_size: u8,
}

/// Section names the decoder reads, as they appear in the ELF section table.
pub mod section {
    /// Unit headers and the DIE byte stream.
    pub const DEBUG_INFO: &str = ".debug_info";
    /// Abbreviation tables.
    pub const DEBUG_ABBREV: &str = ".debug_abbrev";
    /// The null-terminated string pool.
    pub const DEBUG_STR: &str = ".debug_str";
    /// Line-number-info headers and programs.
    pub const DEBUG_LINE: &str = ".debug_line";
    /// Location lists.
    pub const DEBUG_LOC: &str = ".debug_loc";
    /// Range lists.
    pub const DEBUG_RANGES: &str = ".debug_ranges";
}
