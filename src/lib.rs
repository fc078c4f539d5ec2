//! A reader for DWARF debugging information in ELF object files.
//!
//! `durin` decodes the DWARF v2–v4 sections emitted by mainstream
//! toolchains (v5 is recognised at the header level) into a navigable,
//! typed object model: a [`Dwarf`] container enumerates compilation
//! [`Unit`]s, each unit expands lazily into a [`Die`] tree whose
//! attribute values carry their semantic types, and line-number
//! programs, location lists, range lists and DWARF expressions decode
//! into structured form without being interpreted.
//!
//! Cross-DIE references resolve eagerly through a per-container
//! offset→DIE cache, so resolving the same reference twice yields the
//! same node and reference cycles through type entries terminate.
//!
//! ```no_run
//! # fn example() -> durin::Result<()> {
//! let dwarf = durin::Dwarf::load("a.out")?;
//! for unit in dwarf.units()? {
//!     let root = unit.die_tree()?;
//!     if let Some(durin::AttrValue::String(name)) =
//!         root.attr_value(durin::constants::DW_AT_name)
//!     {
//!         println!("{}", name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod constants;

mod abbrev;
mod attr;
mod common;
mod die;
mod dwarf;
mod elf;
mod endianity;
mod error;
mod expr;
mod line;
mod loclist;
mod rangelist;
mod reader;
mod strtab;
#[cfg(test)]
mod test_util;
mod unit;

pub use crate::abbrev::{AbbrevEntry, AbbrevTable, AttrSpec};
pub use crate::attr::AttrValue;
pub use crate::common::{section, Encoding, Format};
pub use crate::die::{Attribute, Die, DieRef};
pub use crate::dwarf::Dwarf;
pub use crate::elf::{Elf, SectionResolver};
pub use crate::endianity::{BigEndian, Endianity, LittleEndian, RunTimeEndian};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::expr::{DwExpr, Operand, Operation};
pub use crate::line::{FileEntry, LineInfo, LineInstr, LineInstrKind, RawLeb};
pub use crate::loclist::{LocList, LocListEntry};
pub use crate::rangelist::{RangeList, RangeListEntry};
pub use crate::reader::SectionReader;
pub use crate::strtab::StrTable;
pub use crate::unit::{Unit, UnitHeader};
