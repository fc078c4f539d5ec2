//! Compilation unit headers and the unit handle.

use std::rc::Rc;

use crate::abbrev::AbbrevTable;
use crate::common::{Encoding, Format};
use crate::constants;
use crate::die::Die;
use crate::dwarf::Dwarf;
use crate::elf::SectionResolver;
use crate::endianity::Endianity;
use crate::error::{ErrorKind, Result};
use crate::line::LineInfo;
use crate::reader::SectionReader;

/// The header of one unit in `.debug_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHeader {
    format: Format,
    version: u16,
    unit_type: constants::DwUt,
    debug_abbrev_offset: u64,
    address_size: u8,
    header_offset: u64,
    data_offset: u64,
    size: u64,
    type_signature: Option<u64>,
    type_offset: Option<u64>,
}

impl UnitHeader {
    /// Whether the unit is 32- or 64-bit DWARF.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// The unit's DWARF version.
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The unit's type. Versions before 5 have no unit type field and
    /// report `DW_UT_compile`.
    #[inline]
    pub fn unit_type(&self) -> constants::DwUt {
        self.unit_type
    }

    /// The offset in `.debug_abbrev` of the unit's abbreviation table.
    #[inline]
    pub fn debug_abbrev_offset(&self) -> u64 {
        self.debug_abbrev_offset
    }

    /// The size in bytes of an address in this unit.
    #[inline]
    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    /// The offset in `.debug_info` at which the unit begins.
    #[inline]
    pub fn header_offset(&self) -> u64 {
        self.header_offset
    }

    /// The offset in `.debug_info` at which the unit's DIE byte stream
    /// begins.
    #[inline]
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// The unit's total size in `.debug_info`, including the length
    /// field itself.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The type signature, present only for type units.
    #[inline]
    pub fn type_signature(&self) -> Option<u64> {
        self.type_signature
    }

    /// The unit-local offset of the described type, present only for
    /// type units.
    #[inline]
    pub fn type_offset(&self) -> Option<u64> {
        self.type_offset
    }

    /// The decoding parameters of this unit.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        Encoding {
            format: self.format,
            version: self.version,
            address_size: self.address_size,
        }
    }

    /// Return true if the given `.debug_info` offset falls within this
    /// unit's byte range.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.header_offset && offset < self.header_offset + self.size
    }
}

/// Parse the unit header at the reader's current position and seek the
/// reader past the whole unit.
fn parse_unit_header<Endian>(r: &mut SectionReader<Endian>) -> Result<UnitHeader>
where
    Endian: Endianity,
{
    let header_offset = r.position() as u64;
    let (length, format) = r.read_initial_length("a unit's initial length")?;
    let size = length + u64::from(format.initial_length_size());

    let version = r.read_u16("a unit's version")?;
    if version < 2 || version > 5 {
        return Err(r.error(
            ErrorKind::UnsupportedVersion(version),
            "an unsupported unit version",
        ));
    }

    let unit_type = if version >= 5 {
        constants::DwUt(r.read_u8("a unit's type")?)
    } else {
        constants::DW_UT_compile
    };

    let debug_abbrev_offset = r.read_word(format, "a unit's .debug_abbrev offset")?;
    let address_size = r.read_u8("a unit's address size")?;

    // Type units carry a signature and a type offset before their DIEs.
    let (type_signature, type_offset) = if unit_type == constants::DW_UT_type {
        let signature = r.read_u64("a type unit's signature")?;
        let offset = r.read_word(format, "a type unit's type offset")?;
        (Some(signature), Some(offset))
    } else {
        (None, None)
    };

    let data_offset = r.position() as u64;
    let header = UnitHeader {
        format,
        version,
        unit_type,
        debug_abbrev_offset,
        address_size,
        header_offset,
        data_offset,
        size,
        type_signature,
        type_offset,
    };

    r.seek((header_offset + size) as usize)?;
    Ok(header)
}

/// Enumerate every unit header in `.debug_info`, partitioned into
/// compile units and type units.
pub(crate) fn parse_unit_headers<Endian>(
    r: &mut SectionReader<Endian>,
) -> Result<(Vec<Rc<UnitHeader>>, Vec<Rc<UnitHeader>>)>
where
    Endian: Endianity,
{
    let mut compile_units = Vec::new();
    let mut type_units = Vec::new();
    while !r.is_empty() {
        let header = Rc::new(parse_unit_header(r)?);
        if header.unit_type() == constants::DW_UT_type {
            type_units.push(header);
        } else {
            compile_units.push(header);
        }
    }
    Ok((compile_units, type_units))
}

/// A handle to one compilation unit of a container.
///
/// The handle borrows the container; the unit's abbreviation table, DIE
/// tree and line info materialise on first access and stay cached in the
/// container.
pub struct Unit<'a, A: SectionResolver> {
    dwarf: &'a Dwarf<A>,
    header: Rc<UnitHeader>,
}

impl<'a, A: SectionResolver> std::fmt::Debug for Unit<'a, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Unit").field("header", &self.header).finish()
    }
}

impl<'a, A: SectionResolver> Unit<'a, A> {
    pub(crate) fn new(dwarf: &'a Dwarf<A>, header: Rc<UnitHeader>) -> Unit<'a, A> {
        Unit { dwarf, header }
    }

    /// The unit's header.
    #[inline]
    pub fn header(&self) -> &UnitHeader {
        &self.header
    }

    /// The unit's abbreviation table.
    pub fn abbrev_table(&self) -> Result<Rc<AbbrevTable>> {
        self.dwarf.abbrev_table(self.header.debug_abbrev_offset())
    }

    /// The root DIE of the unit's tree, expanding the tree on first
    /// access.
    pub fn die_tree(&self) -> Result<Rc<Die>> {
        self.dwarf.die_tree(&self.header)
    }

    /// The unit's line-number info, or `None` if its root DIE has no
    /// `DW_AT_stmt_list` attribute.
    pub fn line_info(&self) -> Result<Option<Rc<LineInfo>>> {
        self.dwarf.line_info(&self.header)
    }
}
