//! Debug information entries.

use std::fmt;

use gimli::{DwAt, DwTag};

use super::attribute::Attribute;

/// Index of a compile unit in its DWARF source.
///
/// DIEs point back at their owning unit through this id instead of holding
/// the unit itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub usize);

impl UnitId
{
    pub const fn index(self) -> usize
    {
        self.0
    }
}

impl fmt::Display for UnitId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "unit#{}", self.0)
    }
}

/// A debug information entry with its attributes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die
{
    offset: u64,
    tag: DwTag,
    unit: UnitId,
    has_children: bool,
    attributes: Vec<Attribute>,
}

impl Die
{
    /// `offset` is the absolute position of the entry in `.debug_info`.
    pub fn new(offset: u64, tag: DwTag, unit: UnitId, has_children: bool, attributes: Vec<Attribute>) -> Self
    {
        Self {
            offset,
            tag,
            unit,
            has_children,
            attributes,
        }
    }

    pub fn offset(&self) -> u64
    {
        self.offset
    }

    pub fn tag(&self) -> DwTag
    {
        self.tag
    }

    /// The compile unit that owns this entry.
    pub fn unit(&self) -> UnitId
    {
        self.unit
    }

    pub fn has_children(&self) -> bool
    {
        self.has_children
    }

    /// Attributes in the order they were declared in the abbreviation.
    pub fn attributes(&self) -> &[Attribute]
    {
        &self.attributes
    }

    /// First attribute with the given name.
    pub fn attribute(&self, name: DwAt) -> Option<&Attribute>
    {
        self.attributes.iter().find(|attr| attr.name() == name)
    }

    pub fn len(&self) -> usize
    {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.attributes.is_empty()
    }
}
