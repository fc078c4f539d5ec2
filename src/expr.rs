//! The DWARF expression decoder.
//!
//! Expressions are decoded into their operation sequence without being
//! evaluated. Each operation keeps the opcode it was encoded with, so
//! `DW_OP_reg5` stays `DW_OP_reg5` rather than being folded into some
//! normalized register form, and its operands keep the width and
//! signedness the opcode dictates.

use crate::common::Encoding;
use crate::constants;
use crate::endianity::Endianity;
use crate::error::{ErrorKind, Result};
use crate::reader::SectionReader;

/// One operand of a DWARF expression operation.
///
/// The variant records the encoding the opcode dictates for the operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// An unsigned 8-bit operand.
    U8(u8),
    /// A signed 8-bit operand.
    I8(i8),
    /// An unsigned 16-bit operand.
    U16(u16),
    /// A signed 16-bit operand.
    I16(i16),
    /// An unsigned 32-bit operand.
    U32(u32),
    /// A signed 32-bit operand.
    I32(i32),
    /// An unsigned 64-bit operand.
    U64(u64),
    /// A signed 64-bit operand.
    I64(i64),
    /// An unsigned LEB128 operand.
    Uleb(u64),
    /// A signed LEB128 operand.
    Sleb(i64),
    /// A machine-word address, zero-extended to 64 bits.
    Address(u64),
    /// A reference into `.debug_info`, read with the unit's format width.
    Reference(u64),
    /// A size-prefixed block of raw bytes.
    Bytes(Vec<u8>),
}

/// A single DWARF expression operation: an opcode plus the operands its
/// schema dictates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The opcode.
    pub op: constants::DwOp,
    /// The decoded operands, in encoding order.
    pub operands: Vec<Operand>,
}

/// A decoded DWARF expression: a finite ordered sequence of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DwExpr(pub Vec<Operation>);

impl DwExpr {
    /// The operations of this expression, in encoding order.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.0[..]
    }

    /// The number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the expression has no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode `size` bytes of expression starting at the reader's current
    /// position.
    ///
    /// Fails with [`ErrorKind::TruncatedExpression`] if an operation runs
    /// past the declared size.
    pub fn parse<Endian>(
        r: &mut SectionReader<Endian>,
        size: u64,
        encoding: Encoding,
    ) -> Result<DwExpr>
    where
        Endian: Endianity,
    {
        let end = r.position() as u64 + size;
        let mut operations = Vec::new();
        while (r.position() as u64) < end {
            operations.push(Operation::parse(r, encoding)?);
            if r.position() as u64 > end {
                return Err(r.error(
                    ErrorKind::TruncatedExpression,
                    "an operation ran past the end of the expression",
                ));
            }
        }
        Ok(DwExpr(operations))
    }
}

impl Operation {
    fn with(op: constants::DwOp, operands: Vec<Operand>) -> Operation {
        Operation { op, operands }
    }

    /// Decode a single operation at the reader's current position.
    pub fn parse<Endian>(r: &mut SectionReader<Endian>, encoding: Encoding) -> Result<Operation>
    where
        Endian: Endianity,
    {
        let op = constants::DwOp(r.read_u8("an expression opcode")?);
        match op {
            constants::DW_OP_addr => {
                let addr = r.read_address(encoding.address_size, "the DW_OP_addr operand")?;
                Ok(Operation::with(op, vec![Operand::Address(addr)]))
            }
            constants::DW_OP_const1u => {
                let value = r.read_u8("the DW_OP_const1u operand")?;
                Ok(Operation::with(op, vec![Operand::U8(value)]))
            }
            constants::DW_OP_const1s => {
                let value = r.read_i8("the DW_OP_const1s operand")?;
                Ok(Operation::with(op, vec![Operand::I8(value)]))
            }
            constants::DW_OP_const2u => {
                let value = r.read_u16("the DW_OP_const2u operand")?;
                Ok(Operation::with(op, vec![Operand::U16(value)]))
            }
            constants::DW_OP_const2s => {
                let value = r.read_i16("the DW_OP_const2s operand")?;
                Ok(Operation::with(op, vec![Operand::I16(value)]))
            }
            constants::DW_OP_const4u => {
                let value = r.read_u32("the DW_OP_const4u operand")?;
                Ok(Operation::with(op, vec![Operand::U32(value)]))
            }
            constants::DW_OP_const4s => {
                let value = r.read_i32("the DW_OP_const4s operand")?;
                Ok(Operation::with(op, vec![Operand::I32(value)]))
            }
            constants::DW_OP_const8u => {
                let value = r.read_u64("the DW_OP_const8u operand")?;
                Ok(Operation::with(op, vec![Operand::U64(value)]))
            }
            constants::DW_OP_const8s => {
                let value = r.read_i64("the DW_OP_const8s operand")?;
                Ok(Operation::with(op, vec![Operand::I64(value)]))
            }
            constants::DW_OP_constu
            | constants::DW_OP_plus_uconst
            | constants::DW_OP_piece
            | constants::DW_OP_regx
            | constants::DW_OP_addrx
            | constants::DW_OP_constx
            | constants::DW_OP_convert
            | constants::DW_OP_GNU_convert
            | constants::DW_OP_reinterpret
            | constants::DW_OP_GNU_reinterpret => {
                let value = r.read_uleb128("an unsigned LEB128 operand")?;
                Ok(Operation::with(op, vec![Operand::Uleb(value)]))
            }
            constants::DW_OP_consts | constants::DW_OP_fbreg => {
                let value = r.read_sleb128("a signed LEB128 operand")?;
                Ok(Operation::with(op, vec![Operand::Sleb(value)]))
            }
            constants::DW_OP_pick
            | constants::DW_OP_deref_size
            | constants::DW_OP_xderef_size => {
                let value = r.read_u8("a one-byte operand")?;
                Ok(Operation::with(op, vec![Operand::U8(value)]))
            }
            constants::DW_OP_bra | constants::DW_OP_skip => {
                let target = r.read_i16("a branch offset")?;
                Ok(Operation::with(op, vec![Operand::I16(target)]))
            }
            constants::DW_OP_call2 => {
                let target = r.read_u16("the DW_OP_call2 operand")?;
                Ok(Operation::with(op, vec![Operand::U16(target)]))
            }
            constants::DW_OP_call4 => {
                let target = r.read_u32("the DW_OP_call4 operand")?;
                Ok(Operation::with(op, vec![Operand::U32(target)]))
            }
            constants::DW_OP_call_ref => {
                let target = r.read_word(encoding.format, "the DW_OP_call_ref operand")?;
                Ok(Operation::with(op, vec![Operand::Reference(target)]))
            }
            constants::DW_OP_bregx => {
                let register = r.read_uleb128("the DW_OP_bregx register")?;
                let offset = r.read_sleb128("the DW_OP_bregx offset")?;
                Ok(Operation::with(
                    op,
                    vec![Operand::Uleb(register), Operand::Sleb(offset)],
                ))
            }
            constants::DW_OP_bit_piece => {
                let size = r.read_uleb128("the DW_OP_bit_piece size")?;
                let offset = r.read_uleb128("the DW_OP_bit_piece offset")?;
                Ok(Operation::with(
                    op,
                    vec![Operand::Uleb(size), Operand::Uleb(offset)],
                ))
            }
            constants::DW_OP_regval_type | constants::DW_OP_GNU_regval_type => {
                let register = r.read_uleb128("a register number")?;
                let base_type = r.read_uleb128("a base type offset")?;
                Ok(Operation::with(
                    op,
                    vec![Operand::Uleb(register), Operand::Uleb(base_type)],
                ))
            }
            constants::DW_OP_deref_type
            | constants::DW_OP_GNU_deref_type
            | constants::DW_OP_xderef_type => {
                let size = r.read_u8("a dereference size")?;
                let base_type = r.read_uleb128("a base type offset")?;
                Ok(Operation::with(
                    op,
                    vec![Operand::U8(size), Operand::Uleb(base_type)],
                ))
            }
            constants::DW_OP_implicit_value
            | constants::DW_OP_entry_value
            | constants::DW_OP_GNU_entry_value => {
                let size = r.read_uleb128("a block size")?;
                let block = r.read_bytes(size as usize, "a block operand")?;
                Ok(Operation::with(
                    op,
                    vec![Operand::Uleb(size), Operand::Bytes(block)],
                ))
            }
            constants::DW_OP_implicit_pointer | constants::DW_OP_GNU_implicit_pointer => {
                let die = r.read_word(encoding.format, "an implicit pointer reference")?;
                let offset = r.read_sleb128("an implicit pointer offset")?;
                Ok(Operation::with(
                    op,
                    vec![Operand::Reference(die), Operand::Sleb(offset)],
                ))
            }
            constants::DW_OP_deref
            | constants::DW_OP_dup
            | constants::DW_OP_drop
            | constants::DW_OP_over
            | constants::DW_OP_swap
            | constants::DW_OP_rot
            | constants::DW_OP_xderef
            | constants::DW_OP_abs
            | constants::DW_OP_and
            | constants::DW_OP_div
            | constants::DW_OP_minus
            | constants::DW_OP_mod
            | constants::DW_OP_mul
            | constants::DW_OP_neg
            | constants::DW_OP_not
            | constants::DW_OP_or
            | constants::DW_OP_plus
            | constants::DW_OP_shl
            | constants::DW_OP_shr
            | constants::DW_OP_shra
            | constants::DW_OP_xor
            | constants::DW_OP_eq
            | constants::DW_OP_ge
            | constants::DW_OP_gt
            | constants::DW_OP_le
            | constants::DW_OP_lt
            | constants::DW_OP_ne
            | constants::DW_OP_nop
            | constants::DW_OP_push_object_address
            | constants::DW_OP_form_tls_address
            | constants::DW_OP_call_frame_cfa
            | constants::DW_OP_stack_value => Ok(Operation::with(op, Vec::new())),
            constants::DW_OP_const_type
            | constants::DW_OP_GNU_const_type
            | constants::DW_OP_GNU_push_tls_address
            | constants::DW_OP_GNU_uninit
            | constants::DW_OP_GNU_encoded_addr
            | constants::DW_OP_GNU_parameter_ref => Err(r.error(
                ErrorKind::UnsupportedOpcode(op),
                "an unsupported expression opcode",
            )),
            _ => match op.0 {
                // lit0..lit31 and reg0..reg31 take no operands.
                0x30..=0x6f => Ok(Operation::with(op, Vec::new())),
                // breg0..breg31 take one signed LEB128 offset.
                0x70..=0x8f => {
                    let offset = r.read_sleb128("a base register offset")?;
                    Ok(Operation::with(op, vec![Operand::Sleb(offset)]))
                }
                _ => Err(r.error(
                    ErrorKind::UnsupportedOpcode(op),
                    "an unknown expression opcode",
                )),
            },
        }
    }
}

/// Decode a ULEB128 size prefix followed by that many bytes of
/// expression, the `exprloc` attribute encoding.
pub(crate) fn parse_exprloc<Endian>(
    r: &mut SectionReader<Endian>,
    encoding: Encoding,
) -> Result<DwExpr>
where
    Endian: Endianity,
{
    let size = r.read_uleb128("the size of exprloc data")?;
    DwExpr::parse(r, size, encoding)
}

#[cfg(test)]
mod tests {
    extern crate test_assembler;

    use self::test_assembler::{Endian, Section};
    use super::*;
    use crate::common::Format;
    use crate::constants::*;
    use crate::endianity::LittleEndian;
    use crate::test_util::SectionMethods;

    const ENCODING: Encoding = Encoding {
        format: Format::Dwarf32,
        version: 4,
        address_size: 8,
    };

    fn parse_expr(buf: Vec<u8>, encoding: Encoding) -> Result<DwExpr> {
        let size = buf.len() as u64;
        let mut r = SectionReader::new(buf, LittleEndian, ".debug_info");
        DwExpr::parse(&mut r, size, encoding)
    }

    #[test]
    fn test_no_operand_ops() {
        let buf = vec![DW_OP_call_frame_cfa.0, DW_OP_stack_value.0, DW_OP_plus.0];
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[
                Operation::with(DW_OP_call_frame_cfa, vec![]),
                Operation::with(DW_OP_stack_value, vec![]),
                Operation::with(DW_OP_plus, vec![]),
            ][..]
        );
    }

    #[test]
    fn test_literal_and_register_ops() {
        let buf = vec![DW_OP_lit0.0, DW_OP_lit31.0, DW_OP_reg0.0, DW_OP_reg5.0];
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(expr.len(), 4);
        for operation in expr.operations() {
            assert!(operation.operands.is_empty());
        }
        assert_eq!(expr.operations()[3].op, DW_OP_reg5);
    }

    #[test]
    fn test_const1s() {
        let buf = vec![DW_OP_const1s.0, (-20i8) as u8];
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[Operation::with(DW_OP_const1s, vec![Operand::I8(-20)])][..]
        );
    }

    #[test]
    fn test_breg_sleb_operand() {
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_breg3.0)
            .sleb(0);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[Operation::with(DW_OP_breg3, vec![Operand::Sleb(0)])][..]
        );
    }

    #[test]
    fn test_addr_operand_width() {
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_addr.0)
            .L64(0x0000_7fff_1234_5678);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[Operation::with(
                DW_OP_addr,
                vec![Operand::Address(0x0000_7fff_1234_5678)]
            )][..]
        );

        let four_byte = Encoding {
            address_size: 4,
            ..ENCODING
        };
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_addr.0)
            .L32(0xffff_ffff);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, four_byte).unwrap();
        assert_eq!(
            expr.operations()[0].operands,
            vec![Operand::Address(0xffff_ffff)]
        );
    }

    #[test]
    fn test_bregx_two_operands() {
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_bregx.0)
            .uleb(16)
            .sleb(-32);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[Operation::with(
                DW_OP_bregx,
                vec![Operand::Uleb(16), Operand::Sleb(-32)]
            )][..]
        );
    }

    #[test]
    fn test_entry_value_block() {
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_GNU_entry_value.0)
            .uleb(1)
            .D8(DW_OP_reg5.0)
            .D8(DW_OP_stack_value.0);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[
                Operation::with(
                    DW_OP_GNU_entry_value,
                    vec![Operand::Uleb(1), Operand::Bytes(vec![DW_OP_reg5.0])]
                ),
                Operation::with(DW_OP_stack_value, vec![]),
            ][..]
        );
    }

    #[test]
    fn test_implicit_pointer_format_width() {
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_implicit_pointer.0)
            .L32(0x1234)
            .sleb(-8);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, ENCODING).unwrap();
        assert_eq!(
            expr.operations(),
            &[Operation::with(
                DW_OP_implicit_pointer,
                vec![Operand::Reference(0x1234), Operand::Sleb(-8)]
            )][..]
        );

        let dwarf64 = Encoding {
            format: Format::Dwarf64,
            ..ENCODING
        };
        let section = Section::with_endian(Endian::Little)
            .D8(DW_OP_GNU_implicit_pointer.0)
            .L64(0x1234)
            .sleb(8);
        let buf = section.get_contents().unwrap();
        let expr = parse_expr(buf, dwarf64).unwrap();
        assert_eq!(
            expr.operations()[0].operands,
            vec![Operand::Reference(0x1234), Operand::Sleb(8)]
        );
    }

    #[test]
    fn test_unsupported_opcode() {
        let buf = vec![DW_OP_GNU_uninit.0];
        assert_eq!(
            parse_expr(buf, ENCODING).unwrap_err().kind(),
            ErrorKind::UnsupportedOpcode(DW_OP_GNU_uninit)
        );
    }

    #[test]
    fn test_unknown_opcode() {
        let buf = vec![0x01];
        assert_eq!(
            parse_expr(buf, ENCODING).unwrap_err().kind(),
            ErrorKind::UnsupportedOpcode(DwOp(0x01))
        );
    }

    #[test]
    fn test_operand_crossing_declared_size() {
        // DW_OP_const2u followed by only one of its two operand bytes
        // inside the declared size; the second byte exists in the section
        // but belongs to whatever comes after the expression.
        let buf = vec![DW_OP_const2u.0, 0x01, 0x02];
        let mut r = SectionReader::new(buf, LittleEndian, ".debug_info");
        assert_eq!(
            DwExpr::parse(&mut r, 2, ENCODING).unwrap_err().kind(),
            ErrorKind::TruncatedExpression
        );
    }

    #[test]
    fn test_truncated_operand() {
        let buf = vec![DW_OP_const2u.0];
        assert_eq!(
            parse_expr(buf, ENCODING).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }
}
