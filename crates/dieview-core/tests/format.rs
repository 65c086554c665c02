//! Tests for attribute value formatting

mod common;

use common::{MemorySource, attr, line_state, location_entry, unit};
use dieview_core::error::DieViewError;
use dieview_core::types::{LineProgram, ListItem};
use dieview_core::{AttrValue, AttributeFormatter, DisplayOptions, DwarfSource, UnitId, has_location, is_reference};
use gimli::constants::*;

fn source() -> MemorySource
{
    let root = vec![attr(DW_AT_low_pc, DW_FORM_addr, AttrValue::Unsigned(0x1000))];
    MemorySource::new(vec![unit(0, 0x100, 0x200, 4, root)])
        .with_line_program(
            0,
            LineProgram::new(
                vec!["main.c".to_string(), "util.c".to_string()],
                vec![line_state(0x1000, 1, 3)],
            ),
        )
        .with_location_list(
            0x1a0,
            vec![ListItem::Relative(location_entry(0x10, 0x20, &[0x50]))],
        )
}

fn format(source: &MemorySource, options: DisplayOptions, attribute: &dieview_core::Attribute) -> String
{
    let unit = source.unit(UnitId(0)).unwrap();
    AttributeFormatter::new(options).format_value(source, unit, attribute).unwrap()
}

#[test]
fn test_language_known_code()
{
    let source = source();
    let language = attr(DW_AT_language, DW_FORM_data1, AttrValue::Unsigned(0x1));
    assert_eq!(format(&source, DisplayOptions::default(), &language), "1 C89");
}

#[test]
fn test_language_unknown_code_is_bare()
{
    let source = source();
    let language = attr(DW_AT_language, DW_FORM_data2, AttrValue::Unsigned(0x7777));
    assert_eq!(format(&source, DisplayOptions::default(), &language), "30583");
}

#[test]
fn test_reference_renders_upper_hex()
{
    let source = source();
    let reference = attr(DW_AT_type, DW_FORM_ref4, AttrValue::Unsigned(0x20));
    assert_eq!(format(&source, DisplayOptions::default(), &reference), "Ref: 0x20");

    let reference = attr(DW_AT_type, DW_FORM_ref4, AttrValue::Unsigned(0x2d));
    assert_eq!(format(&source, DisplayOptions::default(), &reference), "Ref: 0x2D");
}

#[test]
fn test_unsupported_reference_is_still_a_reference()
{
    let signature = attr(DW_AT_type, DW_FORM_ref_sig8, AttrValue::Unsigned(0xdead_beef));
    assert!(is_reference(&signature));
    assert!(is_reference(&attr(DW_AT_import, DW_FORM_ref_sup4, AttrValue::Unsigned(1))));
    assert!(!is_reference(&attr(DW_AT_byte_size, DW_FORM_data1, AttrValue::Unsigned(4))));
}

#[test]
fn test_signature_renders_as_plain_integer()
{
    let source = source();
    let signature = attr(DW_AT_signature, DW_FORM_ref_sig8, AttrValue::Unsigned(0xdead_beef));
    assert_eq!(format(&source, DisplayOptions::default(), &signature), "3735928559");

    let hex = DisplayOptions {
        hex: true,
        ..DisplayOptions::default()
    };
    assert_eq!(format(&source, hex, &signature), "0xdeadbeef");

    let alt = attr(DW_AT_import, DW_FORM_ref_sup4, AttrValue::Unsigned(0x10));
    assert_eq!(format(&source, hex, &alt), "0x10");
}

#[test]
fn test_address_parses_back()
{
    let source = source();
    for address in [0u64, 0x1, 0x40_1000, 0xffff_ffff_ffff_fff0] {
        for hex in [false, true] {
            let options = DisplayOptions {
                hex,
                ..DisplayOptions::default()
            };
            let low_pc = attr(DW_AT_low_pc, DW_FORM_addr, AttrValue::Unsigned(address));
            let text = format(&source, options, &low_pc);
            let digits = text.strip_prefix("0x").expect("hex address");
            assert_eq!(u64::from_str_radix(digits, 16).unwrap(), address);
        }
    }
}

#[test]
fn test_decl_file()
{
    let source = source();
    let none = attr(DW_AT_decl_file, DW_FORM_data1, AttrValue::Unsigned(0));
    assert_eq!(format(&source, DisplayOptions::default(), &none), "0: (N/A)");

    let second = attr(DW_AT_decl_file, DW_FORM_data1, AttrValue::Unsigned(2));
    assert_eq!(format(&source, DisplayOptions::default(), &second), "2: util.c");
}

#[test]
fn test_decl_file_zero_without_line_program()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())]);
    let none = attr(DW_AT_decl_file, DW_FORM_data1, AttrValue::Unsigned(0));
    assert_eq!(format(&source, DisplayOptions::default(), &none), "0: (N/A)");
    assert_eq!(source.reads(), 0);
}

#[test]
fn test_decl_file_out_of_range()
{
    let source = source();
    let unit = source.unit(UnitId(0)).unwrap();
    let bad = attr(DW_AT_decl_file, DW_FORM_data1, AttrValue::Unsigned(9));
    let result = AttributeFormatter::default().format_value(&source, unit, &bad);
    assert!(matches!(
        result,
        Err(DieViewError::MalformedLineEntry {
            index: 9,
            file_count: 2
        })
    ));
}

#[test]
fn test_stmt_list_lower_hex()
{
    let source = source();
    let stmt = attr(DW_AT_stmt_list, DW_FORM_sec_offset, AttrValue::Unsigned(0x1f));
    assert_eq!(format(&source, DisplayOptions::default(), &stmt), "LNP at 0x1f");
}

#[test]
fn test_location_expression()
{
    let source = source();
    let location = attr(DW_AT_location, DW_FORM_exprloc, AttrValue::Block(vec![0x91, 0x68]));
    assert_eq!(format(&source, DisplayOptions::default(), &location), "fbreg -24");

    let prefixed = DisplayOptions {
        show_prefix: true,
        ..DisplayOptions::default()
    };
    assert_eq!(format(&source, prefixed, &location), "DW_OP_fbreg -24");

    let hex = DisplayOptions {
        hex: true,
        ..DisplayOptions::default()
    };
    assert_eq!(format(&source, hex, &location), "fbreg -0x18");
}

#[test]
fn test_location_expression_joined()
{
    let source = source();
    // DW_OP_breg7 8; DW_OP_deref
    let location = attr(DW_AT_location, DW_FORM_exprloc, AttrValue::Block(vec![0x77, 0x08, 0x06]));
    assert_eq!(format(&source, DisplayOptions::default(), &location), "breg7 8; deref");
}

#[test]
fn test_location_list()
{
    let source = source();
    let location = attr(DW_AT_location, DW_FORM_sec_offset, AttrValue::Unsigned(0x1a0));
    assert_eq!(format(&source, DisplayOptions::default(), &location), "Loc list: 0x1A0");
}

#[test]
fn test_string_wins_over_location()
{
    let source = source();
    let text = attr(DW_AT_location, DW_FORM_string, AttrValue::Text(b"in a register".to_vec()));
    assert_eq!(format(&source, DisplayOptions::default(), &text), "in a register");
}

#[test]
fn test_generic_integers_follow_hex_flag()
{
    let source = source();
    let size = attr(DW_AT_byte_size, DW_FORM_data1, AttrValue::Unsigned(31));
    assert_eq!(format(&source, DisplayOptions::default(), &size), "31");
    let hex = DisplayOptions {
        hex: true,
        ..DisplayOptions::default()
    };
    assert_eq!(format(&source, hex, &size), "0x1f");

    let bound = attr(DW_AT_lower_bound, DW_FORM_sdata, AttrValue::Signed(-16));
    assert_eq!(format(&source, hex, &bound), "-0x10");
}

#[test]
fn test_generic_non_integers()
{
    let source = source();
    let external = attr(DW_AT_external, DW_FORM_flag_present, AttrValue::Flag(true));
    assert_eq!(format(&source, DisplayOptions::default(), &external), "True");

    let constant = attr(DW_AT_const_value, DW_FORM_block1, AttrValue::Block(vec![1, 2]));
    assert_eq!(format(&source, DisplayOptions::default(), &constant), "[1, 2]");
}

#[test]
fn test_has_location_by_version()
{
    let data = attr(DW_AT_location, DW_FORM_data4, AttrValue::Unsigned(0));
    assert!(has_location(&data, 2));
    assert!(!has_location(&data, 4));

    let exprloc = attr(DW_AT_frame_base, DW_FORM_exprloc, AttrValue::Block(vec![0x56]));
    assert!(has_location(&exprloc, 4));
}
