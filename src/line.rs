//! The `.debug_line` line-number-info decoder.
//!
//! The header is fully decoded for versions 2 through 4, and up to the
//! entry-format tables for version 5. The instruction stream is decoded
//! but kept verbatim: the line-number state machine is not executed, and
//! every instruction's operands are stored uniformly as raw unsigned
//! LEB128 byte sequences.

use crate::constants;
use crate::endianity::Endianity;
use crate::error::{ErrorKind, Result};
use crate::reader::SectionReader;

/// An unsigned LEB128 value kept as its byte sequence, for operands whose
/// decoding is deferred to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLeb(pub Vec<u8>);

impl RawLeb {
    /// Encode a value into its LEB128 byte sequence.
    pub fn encode(value: u64) -> RawLeb {
        let mut bytes = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = leb128::write::unsigned(&mut bytes, value);
        RawLeb(bytes)
    }

    /// Decode the byte sequence back into its value.
    pub fn value(&self) -> u64 {
        let mut result = 0;
        let mut shift = 0;
        for &byte in &self.0 {
            if shift < 64 {
                result |= u64::from(byte & 0x7f) << shift;
            }
            shift += 7;
            if byte & 0x80 == 0 {
                break;
            }
        }
        result
    }
}

/// The kind of a line-number-program instruction's opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineInstrKind {
    /// An opcode at or above `opcode_base`.
    Special,
    /// An opcode between 1 and `opcode_base`.
    Standard,
    /// A zero opcode byte followed by a size and a sub-opcode.
    Extended,
}

/// One line-number-program instruction, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInstr {
    /// Whether the opcode is special, standard or extended.
    pub kind: LineInstrKind,
    /// The opcode byte. For extended instructions this is the sub-opcode,
    /// not the zero escape byte.
    pub opcode: u8,
    /// The instruction's operands, re-encoded uniformly as raw LEB128.
    pub operands: Vec<RawLeb>,
}

/// An entry of the line-number header's file table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file's path.
    pub path: String,
    /// An index into the directory table.
    pub dir_index: u64,
    /// The file's modification timestamp, or zero.
    pub timestamp: u64,
    /// The file's size in bytes, or zero.
    pub size: u64,
}

/// A decoded line-number-info unit: the header plus its instruction
/// stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    /// The total size of the unit in `.debug_line`, including the length
    /// field itself.
    pub size: u64,
    /// The line-number-info version.
    pub version: u16,
    /// The address size, present for version 5 and later.
    pub address_size: Option<u8>,
    /// The segment selector size, present for version 5 and later.
    pub segment_selector_size: Option<u8>,
    /// The size in bytes of the smallest target instruction.
    pub min_instr_length: u8,
    /// The maximum operations per instruction, present for version 4 and
    /// later.
    pub max_ops_per_instr: Option<u8>,
    /// The initial value of the state machine's `is_stmt` register.
    pub default_is_stmt: bool,
    /// The smallest line-number advance a special opcode encodes.
    pub line_base: i8,
    /// The number of distinct line-number advances special opcodes
    /// encode.
    pub line_range: u8,
    /// The first special opcode.
    pub opcode_base: u8,
    /// The operand count of each standard opcode, indexed by opcode - 1.
    pub standard_opcode_lengths: Vec<u8>,
    /// The include directories, in table order.
    pub directories: Vec<String>,
    /// The file entries, in table order.
    pub files: Vec<FileEntry>,
    /// The instruction stream, verbatim.
    pub program: Vec<LineInstr>,
}

impl LineInfo {
    /// Decode the line-number-info unit starting at the reader's current
    /// position.
    ///
    /// `address_size` gives the width of `DW_LNE_set_address` operands.
    /// For a version 5 unit the header is returned partially decoded,
    /// before the entry-format tables.
    pub fn parse<Endian>(r: &mut SectionReader<Endian>, address_size: u8) -> Result<LineInfo>
    where
        Endian: Endianity,
    {
        let unit_start = r.position() as u64;
        let (length, format) = r.read_initial_length("the line info initial length")?;
        let size = length + u64::from(format.initial_length_size());

        let version = r.read_u16("the line info version")?;
        if version < 2 || version > 5 {
            return Err(r.error(
                ErrorKind::UnsupportedVersion(version),
                "an unsupported line info version",
            ));
        }

        let (v5_address_size, segment_selector_size) = if version >= 5 {
            let address_size = r.read_u8("the line info address size")?;
            let selector_size = r.read_u8("the line info segment selector size")?;
            (Some(address_size), Some(selector_size))
        } else {
            (None, None)
        };

        // The header length is not needed; field ends are bounded by the
        // declared unit size instead.
        let _header_length = r.read_word(format, "the line info header length")?;

        let min_instr_length = r.read_u8("the minimum instruction length")?;
        let max_ops_per_instr = if version >= 4 {
            Some(r.read_u8("the maximum operations per instruction")?)
        } else {
            None
        };
        let default_is_stmt = r.read_u8("the default is_stmt value")? != 0;
        let line_base = r.read_i8("the line base")?;
        let line_range = r.read_u8("the line range")?;
        let opcode_base = r.read_u8("the opcode base")?;

        let mut standard_opcode_lengths = Vec::new();
        for _ in 1..opcode_base {
            standard_opcode_lengths.push(r.read_u8("a standard opcode's operand count")?);
        }

        let mut info = LineInfo {
            size,
            version,
            address_size: v5_address_size,
            segment_selector_size,
            min_instr_length,
            max_ops_per_instr,
            default_is_stmt,
            line_base,
            line_range,
            opcode_base,
            standard_opcode_lengths,
            directories: Vec::new(),
            files: Vec::new(),
            program: Vec::new(),
        };

        if version >= 5 {
            // The version 5 entry-format tables are not decoded; return
            // the partially decoded header.
            return Ok(info);
        }

        loop {
            let dir = r.read_string("a directory entry")?;
            if dir.is_empty() {
                break;
            }
            info.directories.push(dir);
        }

        loop {
            let path = r.read_string("a file entry's path")?;
            if path.is_empty() {
                break;
            }
            let dir_index = r.read_uleb128("a file entry's directory index")?;
            let timestamp = r.read_uleb128("a file entry's timestamp")?;
            let size = r.read_uleb128("a file entry's size")?;
            info.files.push(FileEntry {
                path,
                dir_index,
                timestamp,
                size,
            });
        }

        let end = unit_start + size;
        while (r.position() as u64) < end {
            let instr = parse_instruction(r, &info, address_size)?;
            info.program.push(instr);
        }
        if r.position() as u64 != end {
            return Err(r.error(
                ErrorKind::TruncatedLineProgram,
                "the line program did not consume exactly its declared size",
            ));
        }

        Ok(info)
    }
}

fn parse_instruction<Endian>(
    r: &mut SectionReader<Endian>,
    info: &LineInfo,
    address_size: u8,
) -> Result<LineInstr>
where
    Endian: Endianity,
{
    let byte = r.read_u8("a line program opcode")?;

    if byte == 0 {
        // Extended opcode: a size, a sub-opcode, then the operand.
        let _instr_size = r.read_uleb128("an extended instruction's size")?;
        let opcode = constants::DwLne(r.read_u8("an extended opcode")?);
        let mut operands = Vec::new();
        match opcode {
            constants::DW_LNE_end_sequence => {}
            constants::DW_LNE_set_address => {
                let addr = r.read_address(address_size, "the DW_LNE_set_address operand")?;
                operands.push(RawLeb::encode(addr));
            }
            constants::DW_LNE_set_discriminator => {
                let discriminator = r.read_uleb128("the DW_LNE_set_discriminator operand")?;
                operands.push(RawLeb::encode(discriminator));
            }
            constants::DW_LNE_define_file => {
                return Err(r.error(
                    ErrorKind::UnsupportedLineOpcode(opcode),
                    "an unsupported extended opcode",
                ));
            }
            otherwise => {
                return Err(r.error(
                    ErrorKind::UnsupportedLineOpcode(otherwise),
                    "an unknown extended opcode",
                ));
            }
        }
        Ok(LineInstr {
            kind: LineInstrKind::Extended,
            opcode: opcode.0,
            operands,
        })
    } else if byte < info.opcode_base {
        // Standard opcode: the operand count comes from the header's
        // table, except for the one fixed-width operand.
        let mut operands = Vec::new();
        if constants::DwLns(byte) == constants::DW_LNS_fixed_advance_pc {
            let operand = r.read_u16("the DW_LNS_fixed_advance_pc operand")?;
            operands.push(RawLeb::encode(u64::from(operand)));
        } else {
            let count = info
                .standard_opcode_lengths
                .get(byte as usize - 1)
                .copied()
                .unwrap_or(0);
            for _ in 0..count {
                let operand = r.read_uleb128("a standard opcode's operand")?;
                operands.push(RawLeb::encode(operand));
            }
        }
        Ok(LineInstr {
            kind: LineInstrKind::Standard,
            opcode: byte,
            operands,
        })
    } else {
        Ok(LineInstr {
            kind: LineInstrKind::Special,
            opcode: byte,
            operands: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate test_assembler;

    use self::test_assembler::{Endian, Label, LabelMaker, Section};
    use super::*;
    use crate::constants::*;
    use crate::endianity::LittleEndian;
    use crate::test_util::SectionMethods;

    /// The operand counts GNU toolchains emit for the twelve standard
    /// opcodes.
    const STANDARD_LENGTHS: [u8; 12] = [0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1];

    fn reader(buf: Vec<u8>) -> SectionReader<LittleEndian> {
        SectionReader::new(buf, LittleEndian, ".debug_line")
    }

    /// A version 2 header like the one GCC emits for a single-file C
    /// program, followed by a six-instruction program.
    fn single_file_section() -> Section {
        let length = Label::new();
        let start = Label::new();
        let end = Label::new();
        let section = Section::with_endian(Endian::Little)
            .D32(&length)
            .mark(&start)
            // version
            .L16(2)
            // header_length (not used by the decoder)
            .L32(0)
            // min_instr_length, default_is_stmt, line_base (-5),
            // line_range, opcode_base
            .D8(1).D8(1).D8(0xfb).D8(14).D8(13)
            .append_bytes(&STANDARD_LENGTHS)
            // no directories
            .D8(0)
            // one file entry: "main.c", dir 0, mtime 0, size 0
            .append_bytes(b"main.c\0").uleb(0).uleb(0).uleb(0)
            // end of file entries
            .D8(0)
            // program: set_address, two specials, advance_line, special,
            // end_sequence
            .D8(0).uleb(9).D8(DW_LNE_set_address.0).L64(0x4004ed)
            .D8(0x15)
            .D8(0x82)
            .D8(DW_LNS_advance_line.0).sleb(1)
            .D8(0x83)
            .D8(0).uleb(1).D8(DW_LNE_end_sequence.0)
            .mark(&end);
        length.set_const((&end - &start) as u64);
        section
    }

    #[test]
    fn test_parse_header_v2() {
        let buf = single_file_section().get_contents().unwrap();
        let total = buf.len() as u64;
        let info = LineInfo::parse(&mut reader(buf), 8).unwrap();

        assert_eq!(info.size, total);
        assert_eq!(info.version, 2);
        assert_eq!(info.address_size, None);
        assert_eq!(info.max_ops_per_instr, None);
        assert_eq!(info.min_instr_length, 1);
        assert!(info.default_is_stmt);
        assert_eq!(info.line_base, -5);
        assert_eq!(info.line_range, 14);
        assert_eq!(info.opcode_base, 13);
        assert_eq!(info.standard_opcode_lengths, STANDARD_LENGTHS.to_vec());
        assert!(info.directories.is_empty());
        assert_eq!(
            info.files,
            vec![FileEntry {
                path: "main.c".to_string(),
                dir_index: 0,
                timestamp: 0,
                size: 0,
            }]
        );
    }

    #[test]
    fn test_parse_program() {
        let buf = single_file_section().get_contents().unwrap();
        let info = LineInfo::parse(&mut reader(buf), 8).unwrap();

        assert_eq!(info.program.len(), 6);
        assert_eq!(
            info.program[0],
            LineInstr {
                kind: LineInstrKind::Extended,
                opcode: DW_LNE_set_address.0,
                operands: vec![RawLeb::encode(0x4004ed)],
            }
        );
        assert_eq!(info.program[0].operands[0].value(), 0x4004ed);
        assert_eq!(info.program[1].kind, LineInstrKind::Special);
        assert_eq!(info.program[1].opcode, 0x15);
        assert_eq!(
            info.program[3],
            LineInstr {
                kind: LineInstrKind::Standard,
                opcode: DW_LNS_advance_line.0,
                operands: vec![RawLeb::encode(1)],
            }
        );
        assert_eq!(
            info.program[5],
            LineInstr {
                kind: LineInstrKind::Extended,
                opcode: DW_LNE_end_sequence.0,
                operands: vec![],
            }
        );
    }

    #[test]
    fn test_fixed_advance_pc_reencoded() {
        let length = Label::new();
        let start = Label::new();
        let end = Label::new();
        let section = Section::with_endian(Endian::Little)
            .D32(&length)
            .mark(&start)
            .L16(2)
            .L32(0)
            .D8(1).D8(1).D8(0xfb).D8(14).D8(13)
            .append_bytes(&STANDARD_LENGTHS)
            .D8(0)
            .D8(0)
            .D8(DW_LNS_fixed_advance_pc.0).L16(0x1234)
            .D8(0).uleb(1).D8(DW_LNE_end_sequence.0)
            .mark(&end);
        length.set_const((&end - &start) as u64);
        let buf = section.get_contents().unwrap();

        let info = LineInfo::parse(&mut reader(buf), 8).unwrap();
        assert_eq!(info.program.len(), 2);
        assert_eq!(info.program[0].operands, vec![RawLeb::encode(0x1234)]);
        assert_eq!(info.program[0].operands[0].value(), 0x1234);
    }

    #[test]
    fn test_v4_max_ops() {
        let length = Label::new();
        let start = Label::new();
        let end = Label::new();
        let section = Section::with_endian(Endian::Little)
            .D32(&length)
            .mark(&start)
            .L16(4)
            .L32(0)
            .D8(1).D8(1).D8(1).D8(0xfb).D8(14).D8(13)
            .append_bytes(&STANDARD_LENGTHS)
            .D8(0)
            .D8(0)
            .mark(&end);
        length.set_const((&end - &start) as u64);
        let buf = section.get_contents().unwrap();

        let info = LineInfo::parse(&mut reader(buf), 8).unwrap();
        assert_eq!(info.version, 4);
        assert_eq!(info.max_ops_per_instr, Some(1));
        assert!(info.program.is_empty());
    }

    #[test]
    fn test_v5_partial_header() {
        let length = Label::new();
        let start = Label::new();
        let end = Label::new();
        let section = Section::with_endian(Endian::Little)
            .D32(&length)
            .mark(&start)
            .L16(5)
            // address_size, segment_selector_size
            .D8(8).D8(0)
            .L32(0)
            .D8(1).D8(1).D8(1).D8(0xfb).D8(14).D8(13)
            .append_bytes(&STANDARD_LENGTHS)
            // v5 entry-format tables would follow; the decoder stops here.
            .mark(&end);
        length.set_const((&end - &start) as u64);
        let buf = section.get_contents().unwrap();

        let info = LineInfo::parse(&mut reader(buf), 8).unwrap();
        assert_eq!(info.version, 5);
        assert_eq!(info.address_size, Some(8));
        assert_eq!(info.segment_selector_size, Some(0));
        assert!(info.directories.is_empty());
        assert!(info.files.is_empty());
        assert!(info.program.is_empty());
    }

    #[test]
    fn test_define_file_unsupported() {
        let length = Label::new();
        let start = Label::new();
        let end = Label::new();
        let section = Section::with_endian(Endian::Little)
            .D32(&length)
            .mark(&start)
            .L16(2)
            .L32(0)
            .D8(1).D8(1).D8(0xfb).D8(14).D8(13)
            .append_bytes(&STANDARD_LENGTHS)
            .D8(0)
            .D8(0)
            .D8(0).uleb(2).D8(DW_LNE_define_file.0).D8(0)
            .mark(&end);
        length.set_const((&end - &start) as u64);
        let buf = section.get_contents().unwrap();

        assert_eq!(
            LineInfo::parse(&mut reader(buf), 8).unwrap_err().kind(),
            ErrorKind::UnsupportedLineOpcode(DW_LNE_define_file)
        );
    }

    #[test]
    fn test_unsupported_version() {
        let section = Section::with_endian(Endian::Little)
            .L32(2)
            .L16(1);
        let buf = section.get_contents().unwrap();

        assert_eq!(
            LineInfo::parse(&mut reader(buf), 8).unwrap_err().kind(),
            ErrorKind::UnsupportedVersion(1)
        );
    }

    #[test]
    fn test_program_overrun() {
        // The declared length cuts the set_address operand in half.
        let length = Label::new();
        let start = Label::new();
        let end = Label::new();
        let section = Section::with_endian(Endian::Little)
            .D32(&length)
            .mark(&start)
            .L16(2)
            .L32(0)
            .D8(1).D8(1).D8(0xfb).D8(14).D8(13)
            .append_bytes(&STANDARD_LENGTHS)
            .D8(0)
            .D8(0)
            .D8(0).uleb(9).D8(DW_LNE_set_address.0).L32(0x4004ed)
            .mark(&end)
            // The other half of the operand lives outside the unit.
            .L32(0);
        length.set_const((&end - &start) as u64);
        let buf = section.get_contents().unwrap();

        assert_eq!(
            LineInfo::parse(&mut reader(buf), 8).unwrap_err().kind(),
            ErrorKind::TruncatedLineProgram
        );
    }
}
