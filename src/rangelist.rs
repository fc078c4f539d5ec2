//! The `.debug_ranges` range-list decoder.

use crate::endianity::Endianity;
use crate::error::{ErrorKind, Result};
use crate::reader::SectionReader;

/// Read one machine word of a list entry, widened to 64 bits.
///
/// With a 4-byte address size, `MAX_U32` is promoted to `MAX_U64` so the
/// sentinel logic downstream is uniform across address sizes.
pub(crate) fn read_list_address<Endian>(
    r: &mut SectionReader<Endian>,
    address_size: u8,
    context: &'static str,
) -> Result<u64>
where
    Endian: Endianity,
{
    match address_size {
        4 => {
            let value = r.read_u32(context)?;
            if value == u32::MAX {
                Ok(u64::MAX)
            } else {
                Ok(u64::from(value))
            }
        }
        8 => r.read_u64(context),
        otherwise => Err(r.error(ErrorKind::UnsupportedAddressSize(otherwise), context)),
    }
}

/// One entry of a range list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeListEntry {
    /// An address range `[begin, end)`, relative to the applicable base
    /// address.
    Normal {
        /// The beginning address offset of the range.
        begin: u64,
        /// The first address offset past the end of the range.
        end: u64,
    },
    /// A base-address-selection entry: subsequent normal entries are
    /// relative to this address.
    BaseAddress {
        /// The new base address.
        addr: u64,
    },
    /// The entry that terminates the list.
    EndOfList,
}

/// A decoded range list, in file order, terminated by its explicit
/// end-of-list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeList(pub Vec<RangeListEntry>);

impl RangeList {
    /// The entries of this list, in file order.
    #[inline]
    pub fn entries(&self) -> &[RangeListEntry] {
        &self.0[..]
    }

    /// The number of entries, including the end-of-list entry.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the list has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the range list starting at the reader's current position,
    /// up to and including its end-of-list entry.
    pub fn parse<Endian>(r: &mut SectionReader<Endian>, address_size: u8) -> Result<RangeList>
    where
        Endian: Endianity,
    {
        let mut entries = Vec::new();
        loop {
            let begin = read_list_address(r, address_size, "the begin of a range list entry")?;
            let end = read_list_address(r, address_size, "the end of a range list entry")?;

            if begin == 0 && end == 0 {
                entries.push(RangeListEntry::EndOfList);
                return Ok(RangeList(entries));
            } else if begin == u64::MAX {
                entries.push(RangeListEntry::BaseAddress { addr: end });
            } else {
                entries.push(RangeListEntry::Normal { begin, end });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate test_assembler;

    use self::test_assembler::{Endian, Label, LabelMaker, Section};
    use super::*;
    use crate::endianity::LittleEndian;

    fn reader(buf: Vec<u8>) -> SectionReader<LittleEndian> {
        SectionReader::new(buf, LittleEndian, ".debug_ranges")
    }

    #[test]
    fn test_ranges_8_byte() {
        let start = Label::new();
        let first = Label::new();
        let section = Section::with_endian(Endian::Little)
            // A list before the offset under test.
            .mark(&start)
            .L64(0x10000).L64(0x10100)
            .L64(0).L64(0)
            .mark(&first)
            // A normal entry.
            .L64(0x400400).L64(0x400419)
            // A base address selection.
            .L64(0xffff_ffff_ffff_ffff).L64(0x0200_0000)
            // Another normal entry, then end of list.
            .L64(0x400404).L64(0x40040e)
            .L64(0).L64(0);
        let buf = section.get_contents().unwrap();
        let offset = (&first - &start) as usize;

        let mut r = reader(buf);
        r.seek(offset).unwrap();
        let list = RangeList::parse(&mut r, 8).unwrap();
        assert_eq!(
            list.entries(),
            &[
                RangeListEntry::Normal {
                    begin: 0x400400,
                    end: 0x400419,
                },
                RangeListEntry::BaseAddress { addr: 0x0200_0000 },
                RangeListEntry::Normal {
                    begin: 0x400404,
                    end: 0x40040e,
                },
                RangeListEntry::EndOfList,
            ][..]
        );
    }

    #[test]
    fn test_ranges_4_byte_widening() {
        let section = Section::with_endian(Endian::Little)
            // A base address selection: MAX_U32 must be promoted so it is
            // recognised with 8-byte sentinel logic.
            .L32(0xffff_ffff).L32(0x0200_0000)
            // The end must widen from its own field, not the begin field.
            .L32(0x10200).L32(0xffff_ffff)
            .L32(0).L32(0);
        let buf = section.get_contents().unwrap();

        let mut r = reader(buf);
        let list = RangeList::parse(&mut r, 4).unwrap();
        assert_eq!(
            list.entries(),
            &[
                RangeListEntry::BaseAddress { addr: 0x0200_0000 },
                RangeListEntry::Normal {
                    begin: 0x10200,
                    end: u64::MAX,
                },
                RangeListEntry::EndOfList,
            ][..]
        );
    }

    #[test]
    fn test_missing_end_of_list() {
        let section = Section::with_endian(Endian::Little)
            .L64(0x400400).L64(0x400419);
        let buf = section.get_contents().unwrap();

        let mut r = reader(buf);
        assert_eq!(
            RangeList::parse(&mut r, 8).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn test_unsupported_address_size() {
        let mut r = reader(vec![0; 16]);
        assert_eq!(
            RangeList::parse(&mut r, 2).unwrap_err().kind(),
            ErrorKind::UnsupportedAddressSize(2)
        );
    }
}
