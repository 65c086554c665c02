//! Tests for location and range list resolution

mod common;

use common::{MemorySource, attr, die, location_entry, unit};
use dieview_core::error::DieViewError;
use dieview_core::location::{absolute_entries, resolve_location, resolve_ranges, unit_base_address};
use dieview_core::types::{ListItem, RangeListEntry};
use dieview_core::{AttrValue, DwarfSource, ExpressionDumper, ResolvedLocation, UnitId};
use gimli::constants::*;

fn range(begin_offset: u64, end_offset: u64) -> RangeListEntry
{
    RangeListEntry {
        begin_offset,
        end_offset,
    }
}

#[test]
fn test_resolve_single_expression()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())]);
    let unit = source.unit(UnitId(0)).unwrap();
    let location = attr(DW_AT_location, DW_FORM_exprloc, AttrValue::Block(vec![0x50]));

    let Some(ResolvedLocation::Expression(expression)) = resolve_location(&source, unit, &location).unwrap() else {
        panic!("expected a single expression");
    };
    assert_eq!(ExpressionDumper::default().dump(&expression), vec!["reg0".to_string()]);
    assert_eq!(source.reads(), 0);
}

#[test]
fn test_resolve_list_is_cached_per_unit()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())]).with_location_list(
        0x30,
        vec![
            ListItem::Relative(location_entry(0x0, 0x8, &[0x50])),
            ListItem::Relative(location_entry(0x8, 0x10, &[0x51])),
        ],
    );
    let unit = source.unit(UnitId(0)).unwrap();
    let location = attr(DW_AT_location, DW_FORM_sec_offset, AttrValue::Unsigned(0x30));

    for _ in 0..3 {
        let Some(ResolvedLocation::List { offset, items }) = resolve_location(&source, unit, &location).unwrap() else {
            panic!("expected a location list");
        };
        assert_eq!(offset, 0x30);
        assert_eq!(items.len(), 2);
    }
    assert_eq!(source.reads(), 1);
}

#[test]
fn test_non_location_attribute()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())]);
    let unit = source.unit(UnitId(0)).unwrap();
    let name = attr(DW_AT_name, DW_FORM_string, AttrValue::Text(b"x".to_vec()));
    assert_eq!(resolve_location(&source, unit, &name).unwrap(), None);
}

#[test]
fn test_base_address_prefers_low_pc()
{
    let both = unit(
        0,
        0,
        0x40,
        4,
        vec![
            attr(DW_AT_entry_pc, DW_FORM_addr, AttrValue::Unsigned(0x2000)),
            attr(DW_AT_low_pc, DW_FORM_addr, AttrValue::Unsigned(0x1000)),
        ],
    );
    assert_eq!(unit_base_address(&both).unwrap(), 0x1000);

    let entry_only = unit(0, 0, 0x40, 4, vec![attr(DW_AT_entry_pc, DW_FORM_addr, AttrValue::Unsigned(0x2000))]);
    assert_eq!(unit_base_address(&entry_only).unwrap(), 0x2000);

    let neither = unit(0, 0x80, 0x40, 4, Vec::new());
    assert!(matches!(
        unit_base_address(&neither),
        Err(DieViewError::MissingBaseAddress { unit_offset: 0x80 })
    ));
}

#[test]
fn test_absolute_entries_add_base()
{
    let unit = unit(0, 0, 0x40, 4, vec![attr(DW_AT_low_pc, DW_FORM_addr, AttrValue::Unsigned(0x1000))]);
    let items = vec![
        ListItem::Relative(range(0x10, 0x20)),
        ListItem::Absolute(range(0x5000, 0x5010)),
    ];
    let bounds: Vec<_> = absolute_entries(&unit, 0, &items)
        .unwrap()
        .into_iter()
        .map(|entry| (entry.begin, entry.end))
        .collect();
    assert_eq!(bounds, vec![(0x1010, 0x1020), (0x5000, 0x5010)]);
}

#[test]
fn test_base_address_selection_is_reported()
{
    let unit = unit(0, 0, 0x40, 4, vec![attr(DW_AT_low_pc, DW_FORM_addr, AttrValue::Unsigned(0x1000))]);
    let items = vec![
        ListItem::Relative(range(0x10, 0x20)),
        ListItem::BaseAddressSelection { address: 0x8000 },
        ListItem::Relative(range(0x0, 0x4)),
    ];
    assert!(matches!(
        absolute_entries(&unit, 0x60, &items),
        Err(DieViewError::UnsupportedBaseAddressSelection {
            list_offset: 0x60,
            address: 0x8000
        })
    ));
}

#[test]
fn test_resolve_ranges()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())])
        .with_range_list(0x0, vec![ListItem::Relative(range(0x0, 0x10))]);
    let subprogram = die(0x2a, 0, DW_TAG_subprogram, Vec::new());
    let ranges = attr(DW_AT_ranges, DW_FORM_sec_offset, AttrValue::Unsigned(0x0));

    let items = resolve_ranges(&source, &subprogram, &ranges).unwrap().expect("range list");
    assert_eq!(items.as_slice(), &[ListItem::Relative(range(0x0, 0x10))]);

    // Second lookup hits the unit cache
    resolve_ranges(&source, &subprogram, &ranges).unwrap();
    assert_eq!(source.reads(), 1);
}

#[test]
fn test_resolve_ranges_without_section()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())]);
    let subprogram = die(0x2a, 0, DW_TAG_subprogram, Vec::new());
    let ranges = attr(DW_AT_ranges, DW_FORM_sec_offset, AttrValue::Unsigned(0x0));
    assert_eq!(resolve_ranges(&source, &subprogram, &ranges).unwrap(), None);
}

#[test]
fn test_resolve_ranges_unknown_unit()
{
    let source = MemorySource::new(vec![unit(0, 0, 0x40, 4, Vec::new())]);
    let stray = die(0x2a, 5, DW_TAG_subprogram, Vec::new());
    let ranges = attr(DW_AT_ranges, DW_FORM_sec_offset, AttrValue::Unsigned(0x0));
    assert!(matches!(
        resolve_ranges(&source, &stray, &ranges),
        Err(DieViewError::UnknownUnit { index: 5 })
    ));
}
