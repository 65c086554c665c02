//! # Location and Range Lists
//!
//! Classification of location-bearing attributes and resolution of their
//! values into expressions or lists.
//!
//! ## Location classes
//!
//! An attribute carries a location when it holds either
//!
//! - a **single expression**: `DW_FORM_exprloc`, or (before DWARF 4) any block
//!   form except on `DW_AT_const_value`;
//! - a **location list**: `DW_FORM_sec_offset`/`DW_FORM_loclistx`, or (before
//!   DWARF 4) a `data1`..`data8` form, on an attribute of the `loclistptr`
//!   class that is not a plain constant.
//!
//! ## Base addresses
//!
//! Relative list entries are offsets from the unit base address, which is the
//! root DIE's `DW_AT_low_pc`, falling back to `DW_AT_entry_pc`. The base is
//! looked up only when a relative entry is converted, so lists made of
//! absolute entries work in units without either attribute.

use std::sync::Arc;

use gimli::constants::*;
use gimli::{DwAt, DwForm};

use crate::error::{DieViewError, Result};
use crate::source::DwarfSource;
use crate::types::{Attribute, CompileUnit, Die, ListItem, LocationExpression, LocationListEntry, RangeListEntry};

/// Attributes whose values may be location lists.
const LOCATION_LIST_ATTRIBUTES: [DwAt; 21] = [
    DW_AT_location,
    DW_AT_string_length,
    DW_AT_const_value,
    DW_AT_return_addr,
    DW_AT_data_member_location,
    DW_AT_frame_base,
    DW_AT_segment,
    DW_AT_static_link,
    DW_AT_use_location,
    DW_AT_vtable_elem_location,
    DW_AT_call_value,
    DW_AT_GNU_call_site_value,
    DW_AT_GNU_call_site_target,
    DW_AT_GNU_call_site_data_value,
    DW_AT_call_target,
    DW_AT_call_target_clobbered,
    DW_AT_call_data_location,
    DW_AT_call_data_value,
    DW_AT_upper_bound,
    DW_AT_lower_bound,
    DW_AT_count,
];

/// How a location-bearing attribute stores its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationClass
{
    /// The value is one expression
    Expression,
    /// The value is an offset of a location list
    List,
}

/// A resolved location attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation
{
    Expression(LocationExpression),
    List
    {
        /// Section offset of the list (the attribute value)
        offset: u64,
        items: Arc<Vec<ListItem<LocationListEntry>>>,
    },
}

/// Entries with a begin/end pair that may need the base address added.
pub trait ListBounds
{
    fn bounds(&self) -> (u64, u64);
}

impl ListBounds for LocationListEntry
{
    fn bounds(&self) -> (u64, u64)
    {
        (self.begin_offset, self.end_offset)
    }
}

impl ListBounds for RangeListEntry
{
    fn bounds(&self) -> (u64, u64)
    {
        (self.begin_offset, self.end_offset)
    }
}

/// A list entry with absolute begin/end addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteEntry<'a, E>
{
    pub begin: u64,
    pub end: u64,
    pub entry: &'a E,
}

fn is_block_form(form: DwForm) -> bool
{
    matches!(form, DW_FORM_block1 | DW_FORM_block2 | DW_FORM_block4 | DW_FORM_block)
}

fn is_fixed_data_form(form: DwForm) -> bool
{
    matches!(form, DW_FORM_data1 | DW_FORM_data2 | DW_FORM_data4 | DW_FORM_data8)
}

/// Plain constants that share a name with `loclistptr` attributes.
fn is_constant(attr: &Attribute, version: u16) -> bool
{
    let name = attr.name();
    let constant_name =
        (version >= 3 && name == DW_AT_data_member_location) || name == DW_AT_upper_bound || name == DW_AT_count;
    constant_name && (is_fixed_data_form(attr.form()) || matches!(attr.form(), DW_FORM_sdata | DW_FORM_udata))
}

fn has_location_expression(attr: &Attribute, version: u16) -> bool
{
    (version < 4 && is_block_form(attr.form()) && attr.name() != DW_AT_const_value) || attr.form() == DW_FORM_exprloc
}

fn has_location_list(attr: &Attribute, version: u16) -> bool
{
    let list_form = (version < 4 && is_fixed_data_form(attr.form()) && attr.name() != DW_AT_const_value)
        || matches!(attr.form(), DW_FORM_sec_offset | DW_FORM_loclistx);
    list_form && !is_constant(attr, version) && LOCATION_LIST_ATTRIBUTES.contains(&attr.name())
}

/// Which location class `attr` belongs to in a unit of DWARF `version`.
pub fn location_class(attr: &Attribute, version: u16) -> Option<LocationClass>
{
    if has_location_expression(attr, version) {
        Some(LocationClass::Expression)
    } else if has_location_list(attr, version) {
        Some(LocationClass::List)
    } else {
        None
    }
}

/// Whether `attr` carries a location expression or location list.
pub fn has_location(attr: &Attribute, version: u16) -> bool
{
    location_class(attr, version).is_some()
}

/// Resolve a location attribute of `unit` into an expression or a list.
///
/// Returns `Ok(None)` for attributes that carry no location, or whose value
/// does not have the shape its form promises.
///
/// ## Errors
///
/// Decoding errors from the source.
pub fn resolve_location<S: DwarfSource + ?Sized>(
    source: &S,
    unit: &CompileUnit,
    attr: &Attribute,
) -> Result<Option<ResolvedLocation>>
{
    match location_class(attr, unit.version()) {
        Some(LocationClass::Expression) => {
            let Some(bytes) = attr.value().block() else {
                tracing::warn!(attribute = %attr.name(), form = %attr.form(), "expression attribute without a block value");
                return Ok(None);
            };
            source
                .decode_expression(unit, bytes)
                .map(|expression| Some(ResolvedLocation::Expression(expression)))
        }
        Some(LocationClass::List) => {
            let Some(offset) = attr.value().as_unsigned() else {
                tracing::warn!(attribute = %attr.name(), form = %attr.form(), "location list attribute without an offset");
                return Ok(None);
            };
            let items = unit.location_list(source, offset)?;
            Ok(Some(ResolvedLocation::List { offset, items }))
        }
        None => Ok(None),
    }
}

/// Resolve the `DW_AT_ranges` attribute `attr` of `die`.
///
/// Returns `Ok(None)` when the value is not an offset or the file has no
/// range list section.
///
/// ## Errors
///
/// `UnknownUnit` when `die` belongs to no unit of `source`, or a decoding
/// error.
pub fn resolve_ranges<S: DwarfSource + ?Sized>(
    source: &S,
    die: &Die,
    attr: &Attribute,
) -> Result<Option<Arc<Vec<ListItem<RangeListEntry>>>>>
{
    let unit = source.unit(die.unit())?;
    let Some(offset) = attr.value().as_unsigned() else {
        return Ok(None);
    };
    unit.range_list(source, offset)
}

/// The unit base address: root `DW_AT_low_pc`, else `DW_AT_entry_pc`.
///
/// ## Errors
///
/// `MissingBaseAddress` when the root DIE has neither.
pub fn unit_base_address(unit: &CompileUnit) -> Result<u64>
{
    let root = unit.root();
    [DW_AT_low_pc, DW_AT_entry_pc]
        .into_iter()
        .find_map(|name| root.attribute(name).and_then(|attr| attr.value().as_unsigned()))
        .ok_or(DieViewError::MissingBaseAddress {
            unit_offset: unit.offset(),
        })
}

/// Convert list items into absolute begin/end pairs.
///
/// ## Errors
///
/// `UnsupportedBaseAddressSelection` for a base-address-selection item, and
/// `MissingBaseAddress` when a relative item needs a base the unit lacks.
pub fn absolute_entries<'a, E: ListBounds>(
    unit: &CompileUnit,
    list_offset: u64,
    items: &'a [ListItem<E>],
) -> Result<Vec<AbsoluteEntry<'a, E>>>
{
    let mut base = None;
    items
        .iter()
        .map(|item| match item {
            ListItem::Absolute(entry) => {
                let (begin, end) = entry.bounds();
                Ok(AbsoluteEntry { begin, end, entry })
            }
            ListItem::Relative(entry) => {
                let base = match base {
                    Some(known) => known,
                    None => *base.insert(unit_base_address(unit)?),
                };
                let (begin, end) = entry.bounds();
                Ok(AbsoluteEntry {
                    begin: base.wrapping_add(begin),
                    end: base.wrapping_add(end),
                    entry,
                })
            }
            ListItem::BaseAddressSelection { address } => {
                tracing::warn!(list_offset, address, "list selects a new base address");
                Err(DieViewError::UnsupportedBaseAddressSelection {
                    list_offset,
                    address: *address,
                })
            }
        })
        .collect()
}
