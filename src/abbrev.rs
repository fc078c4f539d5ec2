//! The `.debug_abbrev` abbreviation-table decoder.

use std::collections::hash_map;
use std::collections::HashMap;

use crate::constants;
use crate::endianity::Endianity;
use crate::error::{ErrorKind, Result};
use crate::reader::SectionReader;

/// The description of one attribute in an abbreviation entry: a pair of
/// name and form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    name: constants::DwAt,
    form: constants::DwForm,
}

impl AttrSpec {
    /// Construct a new `AttrSpec` from the given name and form.
    pub fn new(name: constants::DwAt, form: constants::DwForm) -> AttrSpec {
        AttrSpec { name, form }
    }

    /// Get the attribute's name.
    #[inline]
    pub fn name(&self) -> constants::DwAt {
        self.name
    }

    /// Get the attribute's form.
    #[inline]
    pub fn form(&self) -> constants::DwForm {
        self.form
    }
}

/// An abbreviation entry describes the shape of a DIE: its tag, whether
/// it has children, and the ordered list of its attribute specifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbrevEntry {
    code: u64,
    tag: constants::DwTag,
    has_children: bool,
    attr_specs: Vec<AttrSpec>,
}

impl AbbrevEntry {
    /// Construct a new `AbbrevEntry`.
    ///
    /// # Panics
    ///
    /// Panics if `code` is zero; zero terminates a table.
    pub fn new(
        code: u64,
        tag: constants::DwTag,
        has_children: bool,
        attr_specs: Vec<AttrSpec>,
    ) -> AbbrevEntry {
        assert!(code != 0);
        AbbrevEntry {
            code,
            tag,
            has_children,
            attr_specs,
        }
    }

    /// Get this entry's abbreviation code.
    #[inline]
    pub fn code(&self) -> u64 {
        self.code
    }

    /// Get this entry's tag.
    #[inline]
    pub fn tag(&self) -> constants::DwTag {
        self.tag
    }

    /// Return true if DIEs with this abbreviation have children.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Get this entry's attribute specifications, in declaration order.
    #[inline]
    pub fn attr_specs(&self) -> &[AttrSpec] {
        &self.attr_specs[..]
    }

    /// Parse one abbreviation entry, or `None` for the null entry that
    /// terminates a table.
    fn parse<Endian>(r: &mut SectionReader<Endian>) -> Result<Option<AbbrevEntry>>
    where
        Endian: Endianity,
    {
        let code = r.read_uleb128("an abbreviation code")?;
        if code == 0 {
            return Ok(None);
        }

        let tag = r.read_uleb128("an abbreviation tag")?;
        if tag == 0 {
            return Err(r.error(ErrorKind::MalformedAbbrev, "abbreviation tag is zero"));
        }

        let has_children = match constants::DwChildren(r.read_u8("the has-children byte")?) {
            constants::DW_CHILDREN_no => false,
            constants::DW_CHILDREN_yes => true,
            _ => {
                return Err(r.error(
                    ErrorKind::MalformedAbbrev,
                    "the has-children byte is not 0 or 1",
                ));
            }
        };

        let mut attr_specs = Vec::new();
        loop {
            let name = r.read_uleb128("an attribute name")?;
            let form = r.read_uleb128("an attribute form")?;
            match (name, form) {
                (0, 0) => break,
                (0, _) | (_, 0) => {
                    return Err(r.error(
                        ErrorKind::MalformedAbbrev,
                        "half-null attribute specification",
                    ));
                }
                _ => attr_specs.push(AttrSpec::new(
                    constants::DwAt(name),
                    constants::DwForm(form),
                )),
            }
        }

        Ok(Some(AbbrevEntry {
            code,
            tag: constants::DwTag(tag),
            has_children,
            attr_specs,
        }))
    }
}

/// One unit's abbreviation table: a mapping from abbreviation code to
/// entry.
///
/// Tables are parsed at the `debug_abbrev_offset` a unit header names,
/// and cached by that offset in the container; units that share an offset
/// share the table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AbbrevTable {
    entries: HashMap<u64, AbbrevEntry>,
}

impl AbbrevTable {
    /// Parse the abbreviation table at the reader's current position,
    /// stopping at the terminating null entry.
    pub fn parse<Endian>(r: &mut SectionReader<Endian>) -> Result<AbbrevTable>
    where
        Endian: Endianity,
    {
        let mut table = AbbrevTable {
            entries: HashMap::new(),
        };
        while let Some(entry) = AbbrevEntry::parse(r)? {
            match table.entries.entry(entry.code) {
                hash_map::Entry::Occupied(_) => {
                    return Err(r.error(
                        ErrorKind::MalformedAbbrev,
                        "duplicate abbreviation code",
                    ));
                }
                hash_map::Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }
        Ok(table)
    }

    /// Get the entry for the given abbreviation code.
    #[inline]
    pub fn get(&self, code: u64) -> Option<&AbbrevEntry> {
        self.entries.get(&code)
    }

    /// The number of entries in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::endianity::LittleEndian;
    use crate::error::ErrorKind;

    fn reader(data: &[u8]) -> SectionReader<LittleEndian> {
        SectionReader::new(data.to_vec(), LittleEndian, ".debug_abbrev")
    }

    #[test]
    #[cfg_attr(rustfmt, rustfmt_skip)]
    fn test_parse_table_ok() {
        let buf = [
            // Code
            0x02,
            // DW_TAG_subprogram
            0x2e,
            // DW_CHILDREN_no
            0x00,
            // Begin attributes
                // Attribute name = DW_AT_name
                0x03,
                // Attribute form = DW_FORM_string
                0x08,
            // End attributes
            0x00,
            0x00,

            // Code
            0x01,
            // DW_TAG_compile_unit
            0x11,
            // DW_CHILDREN_yes
            0x01,
            // Begin attributes
                // Attribute name = DW_AT_producer
                0x25,
                // Attribute form = DW_FORM_strp
                0x0e,
                // Attribute name = DW_AT_language
                0x13,
                // Attribute form = DW_FORM_data2
                0x05,
            // End attributes
            0x00,
            0x00,

            // Null terminator
            0x00,

            // Extra
            0x01,
            0x02,
            0x03,
            0x04,
        ];

        let expect1 = AbbrevEntry::new(
            1, DW_TAG_compile_unit, true,
            vec![
                AttrSpec::new(DW_AT_producer, DW_FORM_strp),
                AttrSpec::new(DW_AT_language, DW_FORM_data2),
            ]);

        let expect2 = AbbrevEntry::new(
            2, DW_TAG_subprogram, false,
            vec![
                AttrSpec::new(DW_AT_name, DW_FORM_string),
            ]);

        let mut r = reader(&buf);
        let table = AbbrevTable::parse(&mut r).expect("Should parse abbreviations");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some(&expect1));
        assert_eq!(table.get(2), Some(&expect2));
        assert_eq!(table.get(3), None);
        // The reader stops right after the table's null terminator.
        assert_eq!(r.remaining(), 4);
    }

    #[test]
    fn test_shared_table_at_offset() {
        let buf = [
            // Extra bytes before the table.
            0xde, 0xad, 0xbe, 0xef,
            // Code 1, DW_TAG_base_type, no children, no attributes.
            0x01, 0x24, 0x00, 0x00, 0x00,
            // Null terminator.
            0x00,
        ];
        let mut r = reader(&buf);
        r.seek(4).unwrap();
        let table = AbbrevTable::parse(&mut r).expect("Should parse abbreviations");
        assert_eq!(table.get(1).unwrap().tag(), DW_TAG_base_type);
        assert!(!table.get(1).unwrap().has_children());
        assert!(table.get(1).unwrap().attr_specs().is_empty());
    }

    #[test]
    fn test_duplicate_code() {
        let buf = [
            // Two entries with code 1.
            0x01, 0x2e, 0x00, 0x03, 0x08, 0x00, 0x00,
            0x01, 0x11, 0x01, 0x25, 0x0e, 0x00, 0x00,
            0x00,
        ];
        let mut r = reader(&buf);
        assert_eq!(
            AbbrevTable::parse(&mut r).unwrap_err().kind(),
            ErrorKind::MalformedAbbrev
        );
    }

    #[test]
    fn test_bad_has_children() {
        let buf = [0x01, 0x2e, 0x02];
        let mut r = reader(&buf);
        assert_eq!(
            AbbrevTable::parse(&mut r).unwrap_err().kind(),
            ErrorKind::MalformedAbbrev
        );
    }

    #[test]
    fn test_half_null_attr_spec() {
        // Name zero with a non-zero form.
        let buf = [0x01, 0x2e, 0x00, 0x00, 0x08];
        let mut r = reader(&buf);
        assert_eq!(
            AbbrevTable::parse(&mut r).unwrap_err().kind(),
            ErrorKind::MalformedAbbrev
        );
        // Form zero with a non-zero name.
        let buf = [0x01, 0x2e, 0x00, 0x03, 0x00];
        let mut r = reader(&buf);
        assert_eq!(
            AbbrevTable::parse(&mut r).unwrap_err().kind(),
            ErrorKind::MalformedAbbrev
        );
    }

    #[test]
    fn test_zero_tag() {
        let buf = [0x01, 0x00];
        let mut r = reader(&buf);
        assert_eq!(
            AbbrevTable::parse(&mut r).unwrap_err().kind(),
            ErrorKind::MalformedAbbrev
        );
    }

    #[test]
    fn test_truncated_table() {
        let buf = [0x01, 0x2e];
        let mut r = reader(&buf);
        assert_eq!(
            AbbrevTable::parse(&mut r).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn test_idempotent_parse() {
        let buf = [
            0x01, 0x11, 0x01, 0x25, 0x0e, 0x13, 0x05, 0x00, 0x00,
            0x00,
        ];
        let mut r = reader(&buf);
        let first = AbbrevTable::parse(&mut r).unwrap();
        r.seek(0).unwrap();
        let second = AbbrevTable::parse(&mut r).unwrap();
        assert_eq!(first, second);
    }
}
