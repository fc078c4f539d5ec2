//! The ELF container and the section-resolver interface the decoder
//! consumes.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::endianity::RunTimeEndian;
use crate::error::{Error, ErrorKind, Result};
use crate::reader::SectionReader;

/// Resolves named sections into byte ranges and exposes the architecture
/// facts the DWARF decoder needs.
///
/// [`Elf`] is the bundled implementation; tests substitute an in-memory
/// one.
pub trait SectionResolver {
    /// Return the contents of the named section, or `None` if the
    /// container has no section with that name.
    fn section_data(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// The size in bytes of a machine address: 4 or 8.
    fn address_size(&self) -> u8;

    /// The byte order of the container.
    fn endianness(&self) -> RunTimeEndian;
}

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;

const ET_REL: u16 = 1;
const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;

const SHT_NOBITS: u32 = 8;

// Pseudo section name used on errors about the container itself.
const ELF_FILE: &str = "(elf)";

#[derive(Debug, Clone)]
struct SectionHeader {
    name: String,
    sh_type: u32,
    offset: u64,
    size: u64,
}

/// An ELF object file, opened as a table of named sections.
///
/// The section header table is parsed once when the file is opened; the
/// file itself is re-opened for every [`section_data`] request and closed
/// again before the request returns. Each request first checks that the
/// file has not been modified since the container was loaded and fails
/// with [`ErrorKind::ModifiedUnderneath`] if it has.
///
/// [`section_data`]: SectionResolver::section_data
#[derive(Debug)]
pub struct Elf {
    path: PathBuf,
    mtime: SystemTime,
    address_size: u8,
    endian: RunTimeEndian,
    file_type: u16,
    sections: Vec<SectionHeader>,
}

impl Elf {
    /// Open the ELF file at `path` and parse its section header table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Elf> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path)
            .map_err(|_| Error::file_level(ErrorKind::Io, "stating the ELF file"))?;
        let mtime = metadata
            .modified()
            .map_err(|_| Error::file_level(ErrorKind::Io, "reading the ELF file's mtime"))?;
        let data = fs::read(&path)
            .map_err(|_| Error::file_level(ErrorKind::Io, "reading the ELF file"))?;

        if data.len() < 16 || data[0..4] != ELF_MAGIC {
            return Err(Error::new(
                ErrorKind::MalformedElf,
                ELF_FILE,
                0,
                "the file does not start with the ELF magic",
            ));
        }

        let address_size = match data[4] {
            ELFCLASS32 => 4,
            ELFCLASS64 => 8,
            _ => {
                return Err(Error::new(
                    ErrorKind::MalformedElf,
                    ELF_FILE,
                    4,
                    "unknown ELF class",
                ));
            }
        };
        let endian = match data[5] {
            ELFDATA2LSB => RunTimeEndian::Little,
            ELFDATA2MSB => RunTimeEndian::Big,
            _ => {
                return Err(Error::new(
                    ErrorKind::MalformedElf,
                    ELF_FILE,
                    5,
                    "unknown ELF data encoding",
                ));
            }
        };

        let mut r = SectionReader::new(data, endian, ELF_FILE);
        r.seek(16)?;
        let file_type = r.read_u16("the ELF file type")?;
        match file_type {
            ET_REL | ET_EXEC | ET_DYN => {}
            _ => {
                return Err(r.error(
                    ErrorKind::MalformedElf,
                    "the ELF file is not relocatable, executable or shared",
                ));
            }
        }
        let _machine = r.read_u16("the ELF machine")?;
        let _version = r.read_u32("the ELF version")?;

        let shoff;
        if address_size == 4 {
            let _entry = r.read_u32("the entry point")?;
            let _phoff = r.read_u32("the program header offset")?;
            shoff = u64::from(r.read_u32("the section header offset")?);
        } else {
            let _entry = r.read_u64("the entry point")?;
            let _phoff = r.read_u64("the program header offset")?;
            shoff = r.read_u64("the section header offset")?;
        }
        let _flags = r.read_u32("the ELF flags")?;
        let _ehsize = r.read_u16("the ELF header size")?;
        let _phentsize = r.read_u16("the program header entry size")?;
        let _phnum = r.read_u16("the program header count")?;
        let shentsize = u64::from(r.read_u16("the section header entry size")?);
        let shnum = r.read_u16("the section header count")?;
        let shstrndx = r.read_u16("the section name table index")?;

        // First pass: the raw headers, names still unresolved.
        let mut raw = Vec::with_capacity(shnum as usize);
        for i in 0..u64::from(shnum) {
            r.seek((shoff + i * shentsize) as usize)?;
            let sh_name = r.read_u32("a section's name offset")?;
            let sh_type = r.read_u32("a section's type")?;
            let (offset, size) = if address_size == 4 {
                let _flags = r.read_u32("a section's flags")?;
                let _addr = r.read_u32("a section's address")?;
                let offset = u64::from(r.read_u32("a section's file offset")?);
                let size = u64::from(r.read_u32("a section's size")?);
                (offset, size)
            } else {
                let _flags = r.read_u64("a section's flags")?;
                let _addr = r.read_u64("a section's address")?;
                let offset = r.read_u64("a section's file offset")?;
                let size = r.read_u64("a section's size")?;
                (offset, size)
            };
            raw.push((sh_name, sh_type, offset, size));
        }

        let (_, strtab_type, strtab_offset, strtab_size) =
            *raw.get(shstrndx as usize).ok_or_else(|| {
                Error::new(
                    ErrorKind::MalformedElf,
                    ELF_FILE,
                    0,
                    "the section name table index is out of bounds",
                )
            })?;
        if strtab_type == SHT_NOBITS {
            return Err(Error::new(
                ErrorKind::MalformedElf,
                ELF_FILE,
                strtab_offset,
                "the section name table has no file data",
            ));
        }

        let mut sections = Vec::with_capacity(raw.len());
        for &(sh_name, sh_type, offset, size) in &raw {
            let name_offset = strtab_offset + u64::from(sh_name);
            if name_offset >= strtab_offset + strtab_size {
                return Err(Error::new(
                    ErrorKind::MalformedElf,
                    ELF_FILE,
                    name_offset,
                    "a section name offset is outside the name table",
                ));
            }
            r.seek(name_offset as usize)?;
            let name = r.read_string("a section name")?;
            sections.push(SectionHeader {
                name,
                sh_type,
                offset,
                size,
            });
        }

        Ok(Elf {
            path,
            mtime,
            address_size,
            endian,
            file_type,
            sections,
        })
    }

    /// The path this container was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `e_type` field of the ELF header.
    #[inline]
    pub fn file_type(&self) -> u16 {
        self.file_type
    }

    /// The names of all sections, in table order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Fail if the backing file was modified after the container was
    /// loaded.
    fn check_unmodified(&self) -> Result<()> {
        let metadata = fs::metadata(&self.path)
            .map_err(|_| Error::file_level(ErrorKind::Io, "stating the ELF file"))?;
        let mtime = metadata
            .modified()
            .map_err(|_| Error::file_level(ErrorKind::Io, "reading the ELF file's mtime"))?;
        if mtime > self.mtime {
            return Err(Error::file_level(
                ErrorKind::ModifiedUnderneath,
                "the ELF file was modified after the container was loaded",
            ));
        }
        Ok(())
    }
}

impl SectionResolver for Elf {
    fn section_data(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut found = None;
        for section in &self.sections {
            if section.name == name {
                if found.is_some() {
                    return Err(Error::new(
                        ErrorKind::MalformedElf,
                        ELF_FILE,
                        0,
                        "more than one section has the requested name",
                    ));
                }
                found = Some(section);
            }
        }
        let section = match found {
            Some(section) => section,
            None => return Ok(None),
        };
        if section.sh_type == SHT_NOBITS {
            return Err(Error::new(
                ErrorKind::MalformedElf,
                ELF_FILE,
                section.offset,
                "the requested section has no file data",
            ));
        }

        self.check_unmodified()?;

        // The file is opened for just this read and closed on return.
        let mut file = fs::File::open(&self.path)
            .map_err(|_| Error::file_level(ErrorKind::Io, "opening the ELF file"))?;
        file.seek(SeekFrom::Start(section.offset))
            .map_err(|_| Error::file_level(ErrorKind::Io, "seeking to a section"))?;
        let mut data = vec![0; section.size as usize];
        file.read_exact(&mut data)
            .map_err(|_| Error::file_level(ErrorKind::Io, "reading a section"))?;
        Ok(Some(data))
    }

    #[inline]
    fn address_size(&self) -> u8 {
        self.address_size
    }

    #[inline]
    fn endianness(&self) -> RunTimeEndian {
        self.endian
    }
}
