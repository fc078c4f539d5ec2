//! The attribute value decoder.
//!
//! For each (attribute name, form) pair found in a DIE, this module picks
//! the value type the attribute's DWARF-defined class dictates and
//! decodes the bytes into it: integers keep their semantic width and
//! signedness, strings come inline or from `.debug_str`, references
//! resolve to DIE handles, and location or range lists are materialised
//! from their sections eagerly.

use std::rc::Rc;

use crate::constants;
use crate::constants::{DwAt, DwForm};
use crate::die::{Attribute, DieRef};
use crate::dwarf::Dwarf;
use crate::elf::SectionResolver;
use crate::endianity::RunTimeEndian;
use crate::error::{ErrorKind, Result};
use crate::expr::{parse_exprloc, DwExpr};
use crate::loclist::LocList;
use crate::rangelist::RangeList;
use crate::reader::SectionReader;
use crate::unit::UnitHeader;

/// The value of a DIE attribute.
///
/// This catalogue is closed; every attribute the decoder accepts maps to
/// exactly one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// An unsigned 8-bit constant.
    U8(u8),
    /// An unsigned 16-bit constant.
    U16(u16),
    /// An unsigned 32-bit constant.
    U32(u32),
    /// An unsigned 64-bit constant, address or section offset.
    U64(u64),
    /// A signed 8-bit constant.
    I8(i8),
    /// A signed 16-bit constant.
    I16(i16),
    /// A signed 32-bit constant.
    I32(i32),
    /// A signed 64-bit constant.
    I64(i64),
    /// A boolean flag.
    Flag(bool),
    /// An inline string or a string from `.debug_str`.
    String(String),
    /// A resolved reference to another DIE.
    Ref(DieRef),
    /// An unresolved type-unit signature from `DW_FORM_ref_sig8`.
    TypeSignature(u64),
    /// A DWARF expression.
    Expr(DwExpr),
    /// A location list from `.debug_loc`.
    LocList(LocList),
    /// A range list from `.debug_ranges`.
    RangeList(RangeList),
    /// A block of raw bytes.
    Block(Vec<u8>),
    /// The value of a `DW_AT_language` attribute.
    Language(constants::DwLang),
    /// The value of a `DW_AT_encoding` attribute.
    Encoding(constants::DwAte),
    /// The value of a `DW_AT_visibility` attribute.
    Visibility(constants::DwVis),
    /// The value of a `DW_AT_accessibility` attribute.
    Accessibility(constants::DwAccess),
    /// The value of a `DW_AT_virtuality` attribute.
    Virtuality(constants::DwVirtuality),
    /// The value of a `DW_AT_inline` attribute.
    Inline(constants::DwInl),
    /// The value of a `DW_AT_endianity` attribute.
    Endianity(constants::DwEnd),
    /// The value of a `DW_AT_calling_convention` attribute.
    CallingConvention(constants::DwCc),
    /// The value of a `DW_AT_ordering` attribute.
    Ordering(constants::DwOrd),
}

/// Decode the attribute at the reader's current position.
pub(crate) fn read_attr<A>(
    d: &Dwarf<A>,
    unit: &Rc<UnitHeader>,
    r: &mut SectionReader<RunTimeEndian>,
    name: DwAt,
    form: DwForm,
) -> Result<Attribute>
where
    A: SectionResolver,
{
    // DW_FORM_indirect carries the actual form as a ULEB128 prefix on
    // the value itself.
    let mut form = form;
    while form == constants::DW_FORM_indirect {
        form = DwForm(r.read_uleb128("an indirect form")?);
    }

    let value = match name {
        constants::DW_AT_sibling
        | constants::DW_AT_discr
        | constants::DW_AT_import
        | constants::DW_AT_common_reference
        | constants::DW_AT_containing_type
        | constants::DW_AT_default_value
        | constants::DW_AT_abstract_origin
        | constants::DW_AT_base_types
        | constants::DW_AT_friend
        | constants::DW_AT_namelist_item
        | constants::DW_AT_priority
        | constants::DW_AT_specification
        | constants::DW_AT_type
        | constants::DW_AT_object_pointer
        | constants::DW_AT_extension
        | constants::DW_AT_signature => read_ref(d, unit, r, form)?,

        constants::DW_AT_name
        | constants::DW_AT_comp_dir
        | constants::DW_AT_producer
        | constants::DW_AT_linkage_name
        | constants::DW_AT_description
        | constants::DW_AT_picture_string => AttrValue::String(read_str(d, unit, r, form)?),

        constants::DW_AT_location
        | constants::DW_AT_string_length
        | constants::DW_AT_return_addr
        | constants::DW_AT_segment
        | constants::DW_AT_static_link
        | constants::DW_AT_use_location
        | constants::DW_AT_vtable_elem_location
        | constants::DW_AT_frame_base => {
            if form.is_exprloc() {
                AttrValue::Expr(parse_exprloc(r, unit.encoding())?)
            } else if form.is_loclist_ptr() {
                let offset = r.read_word(unit.format(), "a .debug_loc offset")?;
                AttrValue::LocList(d.read_loclist(unit, offset)?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "a location attribute with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_data_location => {
            if form.is_exprloc() {
                AttrValue::Expr(parse_exprloc(r, unit.encoding())?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_data_location with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_ranges => {
            if form.is_rangelist_ptr() {
                let offset = r.read_word(unit.format(), "a .debug_ranges offset")?;
                AttrValue::RangeList(d.read_rangelist(unit, offset)?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_ranges with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_start_scope => {
            if form.is_rangelist_ptr() {
                let offset = r.read_word(unit.format(), "a .debug_ranges offset")?;
                AttrValue::RangeList(d.read_rangelist(unit, offset)?)
            } else if form.is_constant() {
                AttrValue::I64(read_i64_val(r, form)?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_start_scope with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_stmt_list => {
            if form.is_line_ptr() {
                AttrValue::U64(r.read_word(unit.format(), "a .debug_line offset")?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_stmt_list with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_low_pc | constants::DW_AT_entry_pc => {
            if form.is_address() {
                AttrValue::U64(r.read_address(unit.address_size(), "an address attribute")?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "an address attribute with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_high_pc => {
            if form.is_address() {
                AttrValue::U64(r.read_address(unit.address_size(), "DW_AT_high_pc")?)
            } else if form.is_constant() {
                AttrValue::U64(read_u64_val(r, form)?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_high_pc with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_language => {
            if form.is_constant() {
                AttrValue::Language(constants::DwLang(read_u16_val(r, form)?))
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_language with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_ordering => {
            AttrValue::Ordering(constants::DwOrd(r.read_u8("DW_AT_ordering")?))
        }
        constants::DW_AT_visibility => {
            AttrValue::Visibility(constants::DwVis(r.read_u8("DW_AT_visibility")?))
        }
        constants::DW_AT_accessibility => {
            AttrValue::Accessibility(constants::DwAccess(r.read_u8("DW_AT_accessibility")?))
        }
        constants::DW_AT_virtuality => {
            AttrValue::Virtuality(constants::DwVirtuality(r.read_u8("DW_AT_virtuality")?))
        }
        constants::DW_AT_inline => {
            AttrValue::Inline(constants::DwInl(r.read_u8("DW_AT_inline")?))
        }
        constants::DW_AT_endianity => {
            AttrValue::Endianity(constants::DwEnd(r.read_u8("DW_AT_endianity")?))
        }
        constants::DW_AT_encoding => {
            AttrValue::Encoding(constants::DwAte(r.read_u8("DW_AT_encoding")?))
        }
        constants::DW_AT_calling_convention => {
            AttrValue::CallingConvention(constants::DwCc(r.read_u8("DW_AT_calling_convention")?))
        }
        constants::DW_AT_address_class => {
            AttrValue::U8(r.read_u8("DW_AT_address_class")?)
        }

        constants::DW_AT_byte_size
        | constants::DW_AT_bit_offset
        | constants::DW_AT_bit_size => {
            if form.is_constant() {
                AttrValue::U32(read_u32_val(r, form)?)
            } else if form.is_exprloc() {
                AttrValue::Expr(parse_exprloc(r, unit.encoding())?)
            } else if form.is_reference() {
                read_ref(d, unit, r, form)?
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "a size attribute with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_lower_bound
        | constants::DW_AT_upper_bound
        | constants::DW_AT_bit_stride
        | constants::DW_AT_byte_stride
        | constants::DW_AT_count
        | constants::DW_AT_allocated
        | constants::DW_AT_associated => {
            if form.is_constant() {
                AttrValue::I64(read_i64_val(r, form)?)
            } else if form.is_exprloc() {
                AttrValue::Expr(parse_exprloc(r, unit.encoding())?)
            } else if form.is_reference() {
                read_ref(d, unit, r, form)?
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "a bound attribute with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_const_value => {
            if form.is_block() {
                AttrValue::Block(read_block(r, form)?)
            } else if form.is_constant() {
                AttrValue::I64(read_i64_val(r, form)?)
            } else if form.is_string() {
                AttrValue::String(read_str(d, unit, r, form)?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_const_value with a form outside its classes",
                ));
            }
        }

        constants::DW_AT_data_member_location => {
            if form == constants::DW_FORM_sec_offset {
                AttrValue::U64(r.read_word(unit.format(), "DW_AT_data_member_location")?)
            } else if form.is_exprloc() {
                // The legacy convention keeps member locations as opaque
                // block bytes rather than a decoded expression.
                AttrValue::Block(read_block(r, form)?)
            } else {
                AttrValue::I64(read_i64_val(r, form)?)
            }
        }

        constants::DW_AT_decl_column
        | constants::DW_AT_decl_file
        | constants::DW_AT_decl_line
        | constants::DW_AT_call_column
        | constants::DW_AT_call_file
        | constants::DW_AT_call_line => AttrValue::U32(read_u32_val(r, form)?),

        constants::DW_AT_is_optional
        | constants::DW_AT_prototyped
        | constants::DW_AT_artificial
        | constants::DW_AT_declaration
        | constants::DW_AT_external
        | constants::DW_AT_variable_parameter
        | constants::DW_AT_use_UTF8
        | constants::DW_AT_mutable
        | constants::DW_AT_threads_scaled
        | constants::DW_AT_explicit
        | constants::DW_AT_elemental
        | constants::DW_AT_pure
        | constants::DW_AT_recursive
        | constants::DW_AT_main_subprogram
        | constants::DW_AT_const_expr
        | constants::DW_AT_enum_class
        | constants::DW_AT_GNU_tail_call
        | constants::DW_AT_GNU_all_tail_call_sites
        | constants::DW_AT_GNU_all_call_sites => AttrValue::Flag(read_flag(r, form)?),

        constants::DW_AT_GNU_call_site_value => {
            if form.is_exprloc() {
                AttrValue::Expr(parse_exprloc(r, unit.encoding())?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedForm(form),
                    "DW_AT_GNU_call_site_value with a form outside its classes",
                ));
            }
        }

        _ => {
            if form.is_block() || form.is_exprloc() {
                AttrValue::Block(read_block(r, form)?)
            } else {
                return Err(r.error(
                    ErrorKind::UnsupportedAttribute(name),
                    "an attribute with no decoding rule",
                ));
            }
        }
    };

    Ok(Attribute::new(name, value))
}

/// Read a string-class value: inline for `DW_FORM_string`, through the
/// `.debug_str` pool for `DW_FORM_strp`.
fn read_str<A>(
    d: &Dwarf<A>,
    unit: &Rc<UnitHeader>,
    r: &mut SectionReader<RunTimeEndian>,
    form: DwForm,
) -> Result<String>
where
    A: SectionResolver,
{
    match form {
        constants::DW_FORM_string => r.read_string("an inline string"),
        constants::DW_FORM_strp => {
            let offset = r.read_word(unit.format(), "a .debug_str offset")?;
            d.debug_str()?.get_str(offset)
        }
        _ => Err(r.error(
            ErrorKind::UnsupportedForm(form),
            "a string attribute with a form outside its classes",
        )),
    }
}

/// Read a constant-class value as a `u16`, zero-extending narrower forms
/// and failing `OutOfRange` when the value does not fit.
fn read_u16_val(r: &mut SectionReader<RunTimeEndian>, form: DwForm) -> Result<u16> {
    let value = read_u64_val(r, form)?;
    if value > u64::from(u16::MAX) {
        return Err(r.error(ErrorKind::OutOfRange, "a constant does not fit in 16 bits"));
    }
    Ok(value as u16)
}

/// Read a constant-class value as a `u32`, zero-extending narrower forms
/// and failing `OutOfRange` when the value does not fit.
fn read_u32_val(r: &mut SectionReader<RunTimeEndian>, form: DwForm) -> Result<u32> {
    let value = read_u64_val(r, form)?;
    if value > u64::from(u32::MAX) {
        return Err(r.error(ErrorKind::OutOfRange, "a constant does not fit in 32 bits"));
    }
    Ok(value as u32)
}

/// Read an unsigned value of any constant form, zero-extended to 64 bits.
fn read_u64_val(r: &mut SectionReader<RunTimeEndian>, form: DwForm) -> Result<u64> {
    match form {
        constants::DW_FORM_data1 => r.read_u8("a one-byte constant").map(u64::from),
        constants::DW_FORM_data2 => r.read_u16("a two-byte constant").map(u64::from),
        constants::DW_FORM_data4 => r.read_u32("a four-byte constant").map(u64::from),
        constants::DW_FORM_data8 => r.read_u64("an eight-byte constant"),
        constants::DW_FORM_udata => r.read_uleb128("a ULEB128 constant"),
        _ => Err(r.error(
            ErrorKind::UnsupportedForm(form),
            "reading a non-constant form as an unsigned constant",
        )),
    }
}

/// Read a signed value of any constant form, sign-extended to 64 bits.
fn read_i64_val(r: &mut SectionReader<RunTimeEndian>, form: DwForm) -> Result<i64> {
    match form {
        constants::DW_FORM_data1 => r.read_i8("a one-byte constant").map(i64::from),
        constants::DW_FORM_data2 => r.read_i16("a two-byte constant").map(i64::from),
        constants::DW_FORM_data4 => r.read_i32("a four-byte constant").map(i64::from),
        constants::DW_FORM_data8 => r.read_i64("an eight-byte constant"),
        constants::DW_FORM_sdata => r.read_sleb128("an SLEB128 constant"),
        constants::DW_FORM_udata => {
            let value = r.read_uleb128("a ULEB128 constant")?;
            if value > i64::MAX as u64 {
                return Err(r.error(ErrorKind::OutOfRange, "a constant does not fit in i64"));
            }
            Ok(value as i64)
        }
        _ => Err(r.error(
            ErrorKind::UnsupportedForm(form),
            "reading a non-constant form as a signed constant",
        )),
    }
}

/// Read a flag-class value. `DW_FORM_flag_present` consumes no bytes.
fn read_flag(r: &mut SectionReader<RunTimeEndian>, form: DwForm) -> Result<bool> {
    match form {
        constants::DW_FORM_flag => Ok(r.read_u8("a flag byte")? != 0),
        constants::DW_FORM_flag_present => Ok(true),
        _ => Err(r.error(
            ErrorKind::UnsupportedForm(form),
            "a flag attribute with a form outside its classes",
        )),
    }
}

/// Read a size-prefixed block of raw bytes. `DW_FORM_exprloc` is
/// accepted here for the attributes that keep their expression bytes
/// opaque.
fn read_block(r: &mut SectionReader<RunTimeEndian>, form: DwForm) -> Result<Vec<u8>> {
    let size = match form {
        constants::DW_FORM_block1 => u64::from(r.read_u8("a block size")?),
        constants::DW_FORM_block2 => u64::from(r.read_u16("a block size")?),
        constants::DW_FORM_block4 => u64::from(r.read_u32("a block size")?),
        constants::DW_FORM_block | constants::DW_FORM_exprloc => {
            r.read_uleb128("a block size")?
        }
        _ => {
            return Err(r.error(
                ErrorKind::UnsupportedForm(form),
                "reading a non-block form as a block of bytes",
            ));
        }
    };
    r.read_bytes(size as usize, "a block of bytes")
}

/// Read a reference-class value and resolve it to its target DIE.
fn read_ref<A>(
    d: &Dwarf<A>,
    unit: &Rc<UnitHeader>,
    r: &mut SectionReader<RunTimeEndian>,
    form: DwForm,
) -> Result<AttrValue>
where
    A: SectionResolver,
{
    if form == constants::DW_FORM_ref_sig8 {
        // Type units are not expanded; keep the signature unresolved.
        let signature = r.read_u64("a type unit signature")?;
        return Ok(AttrValue::TypeSignature(signature));
    }

    let (target, target_unit) = if form.is_unit_ref() {
        let offset = match form {
            constants::DW_FORM_ref1 => u64::from(r.read_u8("a one-byte reference")?),
            constants::DW_FORM_ref2 => u64::from(r.read_u16("a two-byte reference")?),
            constants::DW_FORM_ref4 => u64::from(r.read_u32("a four-byte reference")?),
            constants::DW_FORM_ref8 => r.read_u64("an eight-byte reference")?,
            _ => r.read_uleb128("a ULEB128 reference")?,
        };
        let target = unit.header_offset() + offset;
        if target >= unit.header_offset() + unit.size() {
            return Err(r.error(
                ErrorKind::OutOfRange,
                "a unit-local reference points outside its unit",
            ));
        }
        (target, Rc::clone(unit))
    } else if form == constants::DW_FORM_ref_addr {
        // DWARF 2 encoded ref_addr with the width of an address; later
        // versions use the format's word size.
        let target = if unit.version() == 2 {
            r.read_address(unit.address_size(), "a DWARF 2 section reference")?
        } else {
            r.read_word(unit.format(), "a section reference")?
        };
        let target_unit = d.unit_for_offset(target)?;
        (target, target_unit)
    } else {
        return Err(r.error(
            ErrorKind::UnsupportedForm(form),
            "a reference attribute with a form outside its classes",
        ));
    };

    let die = d.resolve_ref(&target_unit, r, target)?;
    Ok(AttrValue::Ref(DieRef::new(&die)))
}
