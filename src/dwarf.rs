//! The per-file DWARF container.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::abbrev::{AbbrevEntry, AbbrevTable};
use crate::attr::{read_attr, AttrValue};
use crate::common::section;
use crate::constants;
use crate::die::Die;
use crate::elf::{Elf, SectionResolver};
use crate::endianity::RunTimeEndian;
use crate::error::{Error, ErrorKind, Result};
use crate::line::LineInfo;
use crate::loclist::LocList;
use crate::rangelist::RangeList;
use crate::reader::SectionReader;
use crate::strtab::StrTable;
use crate::unit::{parse_unit_headers, Unit, UnitHeader};

/// A container over one object file's DWARF debugging information.
///
/// The container owns the section resolver and every cache: the unit
/// list, the per-offset abbreviation tables, the offset→DIE cache, the
/// `.debug_str` pool and decoded line infos. Everything materialises
/// lazily on first access and lives as long as the container.
///
/// The container is single-threaded: its caches use interior mutability
/// and mutate only during calls made by the caller's thread. Callers
/// that need parallelism open one container per thread.
#[derive(Debug)]
pub struct Dwarf<A: SectionResolver = Elf> {
    resolver: A,
    endian: RunTimeEndian,
    units: RefCell<Option<(Vec<Rc<UnitHeader>>, Vec<Rc<UnitHeader>>)>>,
    abbrevs: RefCell<HashMap<u64, Rc<AbbrevTable>>>,
    die_cache: RefCell<HashMap<u64, Rc<Die>>>,
    debug_str: RefCell<Option<Rc<StrTable>>>,
    line_infos: RefCell<HashMap<u64, Rc<LineInfo>>>,
}

impl Dwarf<Elf> {
    /// Open the ELF file at `path` and build a container over its DWARF
    /// sections.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dwarf<Elf>> {
        Dwarf::new(Elf::open(path)?)
    }
}

impl<A: SectionResolver> Dwarf<A> {
    /// Build a container over the given section resolver.
    ///
    /// Absence of `.debug_info` or `.debug_abbrev` is a hard error;
    /// the other debug sections are required only if something actually
    /// dereferences them.
    pub fn new(resolver: A) -> Result<Dwarf<A>> {
        for &name in &[section::DEBUG_INFO, section::DEBUG_ABBREV] {
            if resolver.section_data(name)?.is_none() {
                return Err(Error::new(
                    ErrorKind::MissingSection,
                    name,
                    0,
                    "a mandatory debug section is not present",
                ));
            }
        }
        let endian = resolver.endianness();
        Ok(Dwarf {
            resolver,
            endian,
            units: RefCell::new(None),
            abbrevs: RefCell::new(HashMap::new()),
            die_cache: RefCell::new(HashMap::new()),
            debug_str: RefCell::new(None),
            line_infos: RefCell::new(HashMap::new()),
        })
    }

    /// The section resolver this container reads through.
    #[inline]
    pub fn resolver(&self) -> &A {
        &self.resolver
    }

    fn section_data_required(&self, name: &'static str) -> Result<Vec<u8>> {
        match self.resolver.section_data(name)? {
            Some(data) => Ok(data),
            None => Err(Error::new(
                ErrorKind::MissingSection,
                name,
                0,
                "the section is not present",
            )),
        }
    }

    fn section_reader(&self, name: &'static str) -> Result<SectionReader<RunTimeEndian>> {
        let data = self.section_data_required(name)?;
        Ok(SectionReader::new(data, self.endian, name))
    }

    fn unit_lists(&self) -> Result<(Vec<Rc<UnitHeader>>, Vec<Rc<UnitHeader>>)> {
        if let Some(lists) = &*self.units.borrow() {
            return Ok(lists.clone());
        }
        let mut r = self.section_reader(section::DEBUG_INFO)?;
        let lists = parse_unit_headers(&mut r)?;
        *self.units.borrow_mut() = Some(lists.clone());
        Ok(lists)
    }

    /// The compilation units of this container, in section order.
    pub fn units(&self) -> Result<Vec<Unit<A>>> {
        let (compile_units, _) = self.unit_lists()?;
        Ok(compile_units
            .into_iter()
            .map(|header| Unit::new(self, header))
            .collect())
    }

    /// The type units of this container, in section order. Their DIE
    /// trees are not expanded.
    pub fn type_units(&self) -> Result<Vec<Rc<UnitHeader>>> {
        let (_, type_units) = self.unit_lists()?;
        Ok(type_units)
    }

    /// The `.debug_str` string pool, read and cached on first access.
    pub fn debug_str(&self) -> Result<Rc<StrTable>> {
        if let Some(table) = &*self.debug_str.borrow() {
            return Ok(Rc::clone(table));
        }
        let data = self.section_data_required(section::DEBUG_STR)?;
        let table = Rc::new(StrTable::new(data));
        *self.debug_str.borrow_mut() = Some(Rc::clone(&table));
        Ok(table)
    }

    /// The abbreviation table at the given `.debug_abbrev` offset,
    /// parsed once and shared by every unit naming that offset.
    pub(crate) fn abbrev_table(&self, offset: u64) -> Result<Rc<AbbrevTable>> {
        if let Some(table) = self.abbrevs.borrow().get(&offset) {
            return Ok(Rc::clone(table));
        }
        let mut r = self.section_reader(section::DEBUG_ABBREV)?;
        r.seek(offset as usize)?;
        let table = Rc::new(AbbrevTable::parse(&mut r)?);
        self.abbrevs.borrow_mut().insert(offset, Rc::clone(&table));
        Ok(table)
    }

    fn cached_complete_die(&self, offset: u64) -> Option<Rc<Die>> {
        self.die_cache
            .borrow()
            .get(&offset)
            .filter(|die| die.end_offset() != 0)
            .cloned()
    }

    /// The root DIE of the given unit, expanding the tree on first
    /// access.
    pub(crate) fn die_tree(&self, unit: &Rc<UnitHeader>) -> Result<Rc<Die>> {
        if let Some(die) = self.cached_complete_die(unit.data_offset()) {
            return Ok(die);
        }
        let mut r = self.section_reader(section::DEBUG_INFO)?;
        r.seek(unit.data_offset() as usize)?;
        match self.read_die(unit, &mut r, None)? {
            Some(die) => Ok(die),
            None => Err(Error::new(
                ErrorKind::UnknownAbbrevCode(0),
                section::DEBUG_INFO,
                unit.data_offset(),
                "the unit's root DIE is a null entry",
            )),
        }
    }

    /// Decode the DIE at the reader's current position, or return `None`
    /// for the null entry that terminates a child list.
    ///
    /// The new node is installed in the offset→DIE cache before any of
    /// its attributes are read, so a reference chain that leads back to
    /// a node still being decoded resolves to the same node instead of
    /// recursing forever. A node that fails to decode is evicted before
    /// the error propagates, so a later read of the same offset is not
    /// poisoned by the half-built node.
    fn read_die(
        &self,
        unit: &Rc<UnitHeader>,
        r: &mut SectionReader<RunTimeEndian>,
        parent: Option<&Rc<Die>>,
    ) -> Result<Option<Rc<Die>>> {
        let offset = r.position() as u64;

        let cached = self.die_cache.borrow().get(&offset).cloned();
        if let Some(die) = cached {
            if let Some(parent) = parent {
                die.set_parent(parent);
            }
            // A zero end offset means the node is still mid-decode. That
            // only happens on re-entry through a reference, and the
            // reference resolver restores its own position afterwards.
            let end = die.end_offset();
            if end != 0 {
                r.seek(end as usize)?;
            }
            return Ok(Some(die));
        }

        let code = r.read_uleb128("a DIE's abbreviation code")?;
        if code == 0 {
            return Ok(None);
        }

        let table = self.abbrev_table(unit.debug_abbrev_offset())?;
        let entry = match table.get(code) {
            Some(entry) => entry,
            None => {
                return Err(Error::new(
                    ErrorKind::UnknownAbbrevCode(code),
                    section::DEBUG_INFO,
                    offset,
                    "a DIE uses a code missing from its unit's table",
                ));
            }
        };

        let parent_link = match parent {
            Some(parent) => Rc::downgrade(parent),
            None => Weak::new(),
        };
        let die = Die::new(entry.tag(), offset, Rc::clone(unit), parent_link);
        self.die_cache.borrow_mut().insert(offset, Rc::clone(&die));

        if let Err(err) = self.read_die_body(unit, r, &die, entry) {
            self.die_cache.borrow_mut().remove(&offset);
            return Err(err);
        }

        die.set_end_offset(r.position() as u64);
        Ok(Some(die))
    }

    fn read_die_body(
        &self,
        unit: &Rc<UnitHeader>,
        r: &mut SectionReader<RunTimeEndian>,
        die: &Rc<Die>,
        entry: &AbbrevEntry,
    ) -> Result<()> {
        for spec in entry.attr_specs() {
            let attr = read_attr(self, unit, r, spec.name(), spec.form())?;
            die.push_attr(attr);
        }
        if entry.has_children() {
            while let Some(child) = self.read_die(unit, r, Some(die))? {
                die.push_child(child);
            }
        }
        Ok(())
    }

    /// Resolve a reference attribute: decode the DIE at `target`, saving
    /// and restoring the reader's position around the detour. The
    /// resolved node keeps whatever parent it has; the referring DIE is
    /// not made its parent.
    pub(crate) fn resolve_ref(
        &self,
        unit: &Rc<UnitHeader>,
        r: &mut SectionReader<RunTimeEndian>,
        target: u64,
    ) -> Result<Rc<Die>> {
        let saved = r.position();
        r.seek(target as usize)?;
        let resolved = self.read_die(unit, r, None);
        r.seek(saved)?;
        match resolved? {
            Some(die) => Ok(die),
            None => Err(Error::new(
                ErrorKind::OutOfRange,
                section::DEBUG_INFO,
                target,
                "a reference resolves to a null entry",
            )),
        }
    }

    /// The compile unit whose byte range contains the given
    /// `.debug_info` offset.
    pub(crate) fn unit_for_offset(&self, offset: u64) -> Result<Rc<UnitHeader>> {
        let (compile_units, _) = self.unit_lists()?;
        compile_units
            .iter()
            .find(|unit| unit.contains(offset))
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::OutOfRange,
                    section::DEBUG_INFO,
                    offset,
                    "a reference points outside every unit",
                )
            })
    }

    /// Materialise the location list at the given `.debug_loc` offset.
    pub(crate) fn read_loclist(&self, unit: &Rc<UnitHeader>, offset: u64) -> Result<LocList> {
        let mut r = self.section_reader(section::DEBUG_LOC)?;
        r.seek(offset as usize)?;
        LocList::parse(&mut r, unit.encoding())
    }

    /// Materialise the range list at the given `.debug_ranges` offset.
    pub(crate) fn read_rangelist(&self, unit: &Rc<UnitHeader>, offset: u64) -> Result<RangeList> {
        let mut r = self.section_reader(section::DEBUG_RANGES)?;
        r.seek(offset as usize)?;
        RangeList::parse(&mut r, unit.address_size())
    }

    /// The line-number info of the given unit, or `None` if its root DIE
    /// carries no `DW_AT_stmt_list` attribute.
    pub(crate) fn line_info(&self, unit: &Rc<UnitHeader>) -> Result<Option<Rc<LineInfo>>> {
        let root = self.die_tree(unit)?;
        let offset = match root.attr_value(constants::DW_AT_stmt_list) {
            Some(AttrValue::U64(offset)) => offset,
            _ => return Ok(None),
        };
        if let Some(info) = self.line_infos.borrow().get(&offset) {
            return Ok(Some(Rc::clone(info)));
        }
        let mut r = self.section_reader(section::DEBUG_LINE)?;
        r.seek(offset as usize)?;
        let info = Rc::new(LineInfo::parse(&mut r, unit.address_size())?);
        self.line_infos.borrow_mut().insert(offset, Rc::clone(&info));
        Ok(Some(info))
    }
}
