//! # DWARF Source
//!
//! The narrow interface through which the interpreter reads DWARF data.
//!
//! The interpreter never parses sections itself. A source hands out compile
//! units (with their root DIEs), decodes location and range lists, replays
//! line programs and decodes expression bytes. [`crate::image::DwarfImage`]
//! implements it on top of gimli; tests use in-memory sources.

use crate::error::{DieViewError, Result};
use crate::expression::decode_expression;
use crate::language::LanguageTable;
use crate::types::{
    CompileUnit, LineProgram, ListItem, LocationExpression, LocationListEntry, RangeListEntry, UnitId,
};

/// Read-only access to a DWARF debug-info tree.
///
/// `units()` must be sorted by offset, non-overlapping, and indexed by
/// [`UnitId`] (`units()[i].id() == UnitId(i)`).
pub trait DwarfSource
{
    /// All compile units, in `.debug_info` order.
    fn units(&self) -> &[CompileUnit];

    /// Table of language names used for `DW_AT_language`.
    fn languages(&self) -> &LanguageTable;

    /// Decode and replay the line-number program of `unit`.
    ///
    /// ## Errors
    ///
    /// `MissingLineProgram` when the unit has none, or a decoding error.
    fn read_line_program(&self, unit: &CompileUnit) -> Result<LineProgram>;

    /// Decode the location list at section offset `offset`.
    ///
    /// ## Errors
    ///
    /// Returns a decoding error for malformed lists.
    fn read_location_list(&self, unit: &CompileUnit, offset: u64) -> Result<Vec<ListItem<LocationListEntry>>>;

    /// Decode the range list at section offset `offset`.
    ///
    /// Returns `Ok(None)` when the file carries no range list section at all.
    ///
    /// ## Errors
    ///
    /// Returns a decoding error for malformed lists.
    fn read_range_list(&self, unit: &CompileUnit, offset: u64) -> Result<Option<Vec<ListItem<RangeListEntry>>>>;

    /// Decode an expression (`DW_FORM_exprloc` or block payload) in the
    /// context of `unit`.
    ///
    /// ## Errors
    ///
    /// Returns a decoding error for truncated or unknown operations.
    fn decode_expression(&self, unit: &CompileUnit, bytes: &[u8]) -> Result<LocationExpression>
    {
        decode_expression(bytes, unit.encoding(), unit.endian())
    }

    /// Look up a unit by id.
    ///
    /// ## Errors
    ///
    /// `UnknownUnit` if the id is not in `units()`.
    fn unit(&self, id: UnitId) -> Result<&CompileUnit>
    {
        self.units()
            .get(id.index())
            .ok_or(DieViewError::UnknownUnit { index: id.index() })
    }

    /// The unit whose `.debug_info` span contains `offset`, if any.
    fn unit_containing(&self, offset: u64) -> Option<&CompileUnit>
    {
        let units = self.units();
        let after = units.partition_point(|unit| unit.offset() <= offset);
        let candidate = units.get(after.checked_sub(1)?)?;
        candidate.contains(offset).then_some(candidate)
    }
}
