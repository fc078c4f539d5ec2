//! The `.debug_loc` location-list decoder.

use crate::common::Encoding;
use crate::endianity::Endianity;
use crate::error::Result;
use crate::expr::{parse_exprloc, DwExpr};
use crate::rangelist::read_list_address;
use crate::reader::SectionReader;

/// One entry of a location list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocListEntry {
    /// An address range `[begin, end)` over which the expression gives
    /// the location, relative to the applicable base address.
    Normal {
        /// The beginning address offset of the range.
        begin: u64,
        /// The first address offset past the end of the range.
        end: u64,
        /// The location expression for the range.
        expr: DwExpr,
    },
    /// The location to use where no normal entry applies.
    Default {
        /// The default location expression.
        expr: DwExpr,
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

/// A decoded location list, in file order, terminated by its explicit
/// end-of-list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocList(pub Vec<LocListEntry>);

impl LocList {
    /// The entries of this list, in file order.
    #[inline]
    pub fn entries(&self) -> &[LocListEntry] {
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

    /// Decode the location list starting at the reader's current
    /// position, up to and including its end-of-list entry.
    pub fn parse<Endian>(r: &mut SectionReader<Endian>, encoding: Encoding) -> Result<LocList>
    where
        Endian: Endianity,
    {
        let address_size = encoding.address_size;
        let mut entries = Vec::new();
        loop {
            let begin = read_list_address(r, address_size, "the begin of a loc list entry")?;
            let end = read_list_address(r, address_size, "the end of a loc list entry")?;

            if begin == 0 && end == 0 {
                entries.push(LocListEntry::EndOfList);
                return Ok(LocList(entries));
            } else if begin == u64::MAX {
                entries.push(LocListEntry::BaseAddress { addr: end });
            } else if begin == 0 && end == u64::MAX {
                let expr = parse_exprloc(r, encoding)?;
                entries.push(LocListEntry::Default { expr });
            } else {
                let size = r.read_u16("the size of a loc list expression")?;
                let expr = DwExpr::parse(r, u64::from(size), encoding)?;
                entries.push(LocListEntry::Normal { begin, end, expr });
            }
        }
    }
}
