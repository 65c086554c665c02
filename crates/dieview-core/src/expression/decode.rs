//! Expression decoding on top of `gimli::Operation`.
//!
//! gimli parses the operand encoding; this module recovers the opcode byte of
//! each operation and lays out its operands the way the dumper prints them.

use std::borrow::Cow;

use gimli::{
    constants, DebugInfoOffset, DieReference, DwOp, Encoding, EndianSlice, Operation, Reader, RunTimeEndian,
    UnitOffset,
};
use smallvec::{smallvec, SmallVec};

use crate::error::{map_dwarf_error, Result};
use crate::types::{ExprOp, LocationExpression, OpArg};

type Slice<'a> = EndianSlice<'a, RunTimeEndian>;

/// Decode raw expression bytes into operation records.
///
/// ## Errors
///
/// Returns `DieViewError::Dwarf` for truncated operands or opcodes gimli does
/// not recognise.
pub fn decode_expression(bytes: &[u8], encoding: Encoding, endian: RunTimeEndian) -> Result<LocationExpression>
{
    decode_reader(EndianSlice::new(bytes, endian), encoding)
}

fn decode_reader(mut pc: Slice<'_>, encoding: Encoding) -> Result<LocationExpression>
{
    let mut ops = Vec::new();
    while !pc.is_empty() {
        let opcode = pc
            .clone()
            .read_u8()
            .map_err(|err| map_dwarf_error("reading expression opcode", err))?;
        let operation =
            Operation::parse(&mut pc, encoding).map_err(|err| map_dwarf_error("decoding expression operation", err))?;

        let dwop = DwOp(opcode);
        let name = dwop
            .static_string()
            .map_or_else(|| Cow::Owned(format!("DW_OP_0x{opcode:02x}")), Cow::Borrowed);
        ops.push(ExprOp {
            opcode,
            name,
            args: operands(dwop, operation, encoding)?,
        });
    }
    Ok(LocationExpression(ops))
}

fn unit_offset(offset: UnitOffset<usize>) -> OpArg
{
    OpArg::Unsigned(offset.0 as u64)
}

fn operands(dwop: DwOp, operation: Operation<Slice<'_>>, encoding: Encoding) -> Result<SmallVec<[OpArg; 2]>>
{
    let args = match operation {
        Operation::Deref { base_type, size, .. } => match dwop {
            constants::DW_OP_deref | constants::DW_OP_xderef => SmallVec::new(),
            constants::DW_OP_deref_size | constants::DW_OP_xderef_size => smallvec![OpArg::Unsigned(size.into())],
            _ => smallvec![OpArg::Unsigned(size.into()), unit_offset(base_type)],
        },
        Operation::Pick { index } => {
            if dwop == constants::DW_OP_pick {
                smallvec![OpArg::Unsigned(index.into())]
            } else {
                // DW_OP_dup and DW_OP_over
                SmallVec::new()
            }
        }
        Operation::PlusConstant { value } => smallvec![OpArg::Unsigned(value)],
        Operation::Bra { target } | Operation::Skip { target } => smallvec![OpArg::Signed(target.into())],
        Operation::UnsignedConstant { value } => {
            if (constants::DW_OP_lit0..=constants::DW_OP_lit31).contains(&dwop) {
                SmallVec::new()
            } else {
                smallvec![OpArg::Unsigned(value)]
            }
        }
        Operation::SignedConstant { value } => smallvec![OpArg::Signed(value)],
        Operation::Register { register } => {
            if (constants::DW_OP_reg0..=constants::DW_OP_reg31).contains(&dwop) {
                SmallVec::new()
            } else {
                smallvec![OpArg::Unsigned(register.0.into())]
            }
        }
        Operation::RegisterOffset {
            register,
            offset,
            base_type,
        } => {
            if (constants::DW_OP_breg0..=constants::DW_OP_breg31).contains(&dwop) {
                smallvec![OpArg::Signed(offset)]
            } else if dwop == constants::DW_OP_bregx {
                smallvec![OpArg::Unsigned(register.0.into()), OpArg::Signed(offset)]
            } else {
                // DW_OP_regval_type and its GNU spelling
                smallvec![OpArg::Unsigned(register.0.into()), unit_offset(base_type)]
            }
        }
        Operation::FrameOffset { offset } => smallvec![OpArg::Signed(offset)],
        Operation::Call { offset } => match offset {
            DieReference::UnitRef(UnitOffset(offset)) | DieReference::DebugInfoRef(DebugInfoOffset(offset)) => {
                smallvec![OpArg::Unsigned(offset as u64)]
            }
        },
        Operation::Piece {
            size_in_bits,
            bit_offset: None,
        } => smallvec![OpArg::Unsigned(size_in_bits / 8)],
        Operation::Piece {
            size_in_bits,
            bit_offset: Some(bit_offset),
        } => smallvec![OpArg::Unsigned(size_in_bits), OpArg::Unsigned(bit_offset)],
        Operation::ImplicitValue { data } => smallvec![OpArg::Bytes(data.slice().to_vec())],
        Operation::ImplicitPointer { value, byte_offset } => {
            smallvec![OpArg::Unsigned(value.0 as u64), OpArg::Signed(byte_offset)]
        }
        Operation::EntryValue { expression } => smallvec![OpArg::Nested(decode_reader(expression, encoding)?)],
        Operation::ParameterRef { offset } => smallvec![unit_offset(offset)],
        Operation::Address { address } => smallvec![OpArg::Unsigned(address)],
        Operation::AddressIndex { index } | Operation::ConstantIndex { index } => {
            smallvec![OpArg::Unsigned(index.0 as u64)]
        }
        Operation::TypedLiteral { base_type, value } => {
            smallvec![unit_offset(base_type), OpArg::Bytes(value.slice().to_vec())]
        }
        Operation::Convert { base_type } | Operation::Reinterpret { base_type } => smallvec![unit_offset(base_type)],
        Operation::WasmLocal { index } | Operation::WasmGlobal { index } | Operation::WasmStack { index } => {
            smallvec![OpArg::Unsigned(index.into())]
        }
        // Stack manipulation, arithmetic, comparisons and the no-operand
        // location descriptions (DW_OP_stack_value, DW_OP_call_frame_cfa, ...)
        _ => SmallVec::new(),
    };
    Ok(args)
}

#[cfg(test)]
mod tests
{
    use gimli::Format;

    use super::*;

    fn encoding(version: u16) -> Encoding
    {
        Encoding {
            address_size: 8,
            format: Format::Dwarf32,
            version,
        }
    }

    fn decode(bytes: &[u8]) -> LocationExpression
    {
        decode_expression(bytes, encoding(4), RunTimeEndian::Little).unwrap()
    }

    #[test]
    fn test_register_has_no_operands()
    {
        let expr = decode(&[0x50]);
        assert_eq!(expr.len(), 1);
        assert_eq!(expr.ops()[0].opcode, 0x50);
        assert_eq!(expr.ops()[0].name, "DW_OP_reg0");
        assert!(expr.ops()[0].args.is_empty());
    }

    #[test]
    fn test_fbreg_signed_operand()
    {
        // DW_OP_fbreg -24
        let expr = decode(&[0x91, 0x68]);
        assert_eq!(expr.ops()[0].name, "DW_OP_fbreg");
        assert_eq!(expr.ops()[0].args.as_slice(), &[OpArg::Signed(-24)]);
    }

    #[test]
    fn test_addr_operand()
    {
        let mut bytes = vec![0x03];
        bytes.extend_from_slice(&0x4010u64.to_le_bytes());
        let expr = decode(&bytes);
        assert_eq!(expr.ops()[0].name, "DW_OP_addr");
        assert_eq!(expr.ops()[0].args.as_slice(), &[OpArg::Unsigned(0x4010)]);
    }

    #[test]
    fn test_bregx_and_piece()
    {
        // DW_OP_bregx 7 16; DW_OP_piece 4
        let expr = decode(&[0x92, 0x07, 0x10, 0x93, 0x04]);
        assert_eq!(expr.ops()[0].args.as_slice(), &[OpArg::Unsigned(7), OpArg::Signed(16)]);
        assert_eq!(expr.ops()[1].name, "DW_OP_piece");
        assert_eq!(expr.ops()[1].args.as_slice(), &[OpArg::Unsigned(4)]);
    }

    #[test]
    fn test_literal_and_stack_value()
    {
        let expr = decode(&[0x35, 0x9f]);
        assert_eq!(expr.ops()[0].name, "DW_OP_lit5");
        assert!(expr.ops()[0].args.is_empty());
        assert_eq!(expr.ops()[1].name, "DW_OP_stack_value");
    }

    #[test]
    fn test_implicit_value_bytes()
    {
        let expr = decode(&[0x9e, 0x02, 0xbe, 0xef]);
        assert_eq!(expr.ops()[0].args.as_slice(), &[OpArg::Bytes(vec![0xbe, 0xef])]);
    }

    #[test]
    fn test_entry_value_is_nested()
    {
        // DW_OP_entry_value { DW_OP_reg5 }; DW_OP_stack_value
        let expr = decode_expression(&[0xa3, 0x01, 0x55, 0x9f], encoding(5), RunTimeEndian::Little).unwrap();
        let OpArg::Nested(inner) = &expr.ops()[0].args[0] else {
            panic!("expected nested expression");
        };
        assert_eq!(inner.ops()[0].name, "DW_OP_reg5");
        assert_eq!(expr.ops()[1].name, "DW_OP_stack_value");
    }

    #[test]
    fn test_truncated_expression_is_an_error()
    {
        assert!(decode_expression(&[0x03, 0x00], encoding(4), RunTimeEndian::Little).is_err());
    }
}
