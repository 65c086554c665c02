//! Location list and range list entries.

use super::expression::LocationExpression;

/// A location list entry: an address range and the expression valid in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationListEntry
{
    pub begin_offset: u64,
    pub end_offset: u64,
    pub expression: LocationExpression,
}

/// A range list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeListEntry
{
    pub begin_offset: u64,
    pub end_offset: u64,
}

/// An item of a decoded list.
///
/// DWARF 2-4 entries and DWARF 5 offset pairs are relative to the unit base
/// address. DWARF 5 start/end, start/length and indexed entries already carry
/// absolute addresses. Base-address selections are passed through as-is so
/// the consumer can report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem<E>
{
    Relative(E),
    Absolute(E),
    BaseAddressSelection
    {
        address: u64,
    },
}

impl<E> ListItem<E>
{
    pub fn is_base_address_selection(&self) -> bool
    {
        matches!(self, ListItem::BaseAddressSelection { .. })
    }
}
