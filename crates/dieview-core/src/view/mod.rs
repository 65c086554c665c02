//! # DIE Attribute View
//!
//! Row/column access to one DIE's attributes for a table widget.
//!
//! ## Layout
//!
//! ```text
//! normal:     Attribute | Form | Value
//! low-level:  Attribute | Offset | Form | Raw | Value
//! ```
//!
//! In low-level mode two metadata rows ("DIE offset", "Has children") come
//! before the attributes, so attribute `i` sits at row `i + 2`.
//!
//! Every mutator returns a [`ChangeSet`] describing the minimal refresh the
//! widget has to perform.

mod change;
mod table;

pub use change::{ChangeSet, ModelChange};
pub use table::DetailTable;

use gimli::constants::{DW_AT_ranges, DW_AT_stmt_list};
use gimli::DwAt;

use crate::config::DisplayOptions;
use crate::error::{DieViewError, Result};
use crate::format::{hex_string, AttributeFormatter};
use crate::location::{self, ResolvedLocation};
use crate::reference::{self, ReferenceKind, ReferenceTarget};
use crate::source::DwarfSource;
use crate::types::{Attribute, CompileUnit, Die};

const HEADERS: [&str; 3] = ["Attribute", "Form", "Value"];
const LOW_LEVEL_HEADERS: [&str; 5] = ["Attribute", "Offset", "Form", "Raw", "Value"];
const METADATA_ROWS: [&str; 2] = ["DIE offset", "Has children"];

const RANGE_HEADERS: [&str; 2] = ["Start offset", "End offset"];
const EXPRESSION_HEADERS: [&str; 1] = ["Command"];
const LOCATION_LIST_HEADERS: [&str; 3] = ["Start offset", "End offset", "Expression"];
const LINE_HEADERS: [&str; 3] = ["Address", "File", "Line"];

/// Presentation hint for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHint
{
    /// A synthetic metadata row
    Metadata,
    /// A reference that [`DieAttributeView::resolve_reference`] can follow
    FollowReference,
    /// A reference in a form that cannot be followed
    UnsupportedReference,
}

impl RowHint
{
    pub fn tooltip(self) -> Option<&'static str>
    {
        match self {
            RowHint::Metadata => None,
            RowHint::FollowReference => Some("Follow reference"),
            RowHint::UnsupportedReference => Some("Unsupported reference format"),
        }
    }
}

/// What a row shows.
enum Row<'a>
{
    Metadata(usize),
    Attribute(&'a Attribute),
}

/// The attributes of one DIE, addressed by row and column.
pub struct DieAttributeView<'a, S: DwarfSource + ?Sized>
{
    source: &'a S,
    die: &'a Die,
    formatter: AttributeFormatter,
}

impl<'a, S: DwarfSource + ?Sized> DieAttributeView<'a, S>
{
    pub fn new(source: &'a S, die: &'a Die, options: DisplayOptions) -> Self
    {
        Self {
            source,
            die,
            formatter: AttributeFormatter::new(options),
        }
    }

    pub fn die(&self) -> &'a Die
    {
        self.die
    }

    pub fn options(&self) -> DisplayOptions
    {
        self.formatter.options()
    }

    pub fn formatter(&self) -> &AttributeFormatter
    {
        &self.formatter
    }

    pub fn headers(&self) -> &'static [&'static str]
    {
        if self.options().low_level {
            &LOW_LEVEL_HEADERS
        } else {
            &HEADERS
        }
    }

    pub fn column_count(&self) -> usize
    {
        self.headers().len()
    }

    /// Number of metadata rows before the first attribute.
    pub fn metadata_rows(&self) -> usize
    {
        if self.options().low_level {
            METADATA_ROWS.len()
        } else {
            0
        }
    }

    pub fn row_count(&self) -> usize
    {
        self.metadata_rows() + self.die.len()
    }

    /// Index of the Value column.
    pub fn value_column(&self) -> usize
    {
        self.column_count() - 1
    }

    /// The attribute shown at `row`, or `None` for metadata and out-of-range rows.
    pub fn attribute_at(&self, row: usize) -> Option<&'a Attribute>
    {
        let index = row.checked_sub(self.metadata_rows())?;
        self.die.attributes().get(index)
    }

    /// Look an attribute up by name.
    pub fn attribute(&self, name: DwAt) -> Option<&'a Attribute>
    {
        self.die.attribute(name)
    }

    /// Row at which the attribute `name` is shown.
    pub fn row_of(&self, name: DwAt) -> Option<usize>
    {
        let index = self.die.attributes().iter().position(|attr| attr.name() == name)?;
        Some(index + self.metadata_rows())
    }

    fn row(&self, row: usize) -> Result<Row<'a>>
    {
        let metadata = self.metadata_rows();
        if row < metadata {
            return Ok(Row::Metadata(row));
        }
        self.die
            .attributes()
            .get(row - metadata)
            .map(Row::Attribute)
            .ok_or(DieViewError::RowOutOfRange {
                row,
                rows: self.row_count(),
            })
    }

    fn unit(&self) -> Result<&'a CompileUnit>
    {
        self.source.unit(self.die.unit())
    }

    /// Display text of one cell; `None` for empty cells and columns past the end.
    ///
    /// ## Errors
    ///
    /// `RowOutOfRange`, or a formatting error for the Value column.
    pub fn cell(&self, row: usize, column: usize) -> Result<Option<String>>
    {
        if column >= self.column_count() {
            return Ok(None);
        }
        let value_column = self.value_column();

        match self.row(row)? {
            Row::Metadata(index) => Ok(if column == 0 {
                Some(METADATA_ROWS[index].to_string())
            } else if column == value_column {
                Some(match index {
                    0 => self.formatter.format_offset(self.die.offset()),
                    _ if self.die.has_children() => "True".to_string(),
                    _ => "False".to_string(),
                })
            } else {
                None
            }),
            Row::Attribute(attr) => {
                let text = if column == 0 {
                    self.formatter.format_name(attr.name())
                } else if column == value_column {
                    self.formatter.format_value(self.source, self.unit()?, attr)?
                } else if !self.options().low_level {
                    self.formatter.format_form(attr.form())
                } else {
                    match column {
                        1 => self.formatter.format_offset(attr.offset()),
                        2 => self.formatter.format_form(attr.form()),
                        _ => self.formatter.format_raw(attr),
                    }
                };
                Ok(Some(text))
            }
        }
    }

    /// Presentation hint for `row`, if any.
    pub fn hint(&self, row: usize) -> Option<RowHint>
    {
        match self.row(row).ok()? {
            Row::Metadata(_) => Some(RowHint::Metadata),
            Row::Attribute(attr) => match reference::reference_kind(attr.form())? {
                ReferenceKind::Unsupported => Some(RowHint::UnsupportedReference),
                ReferenceKind::UnitRelative | ReferenceKind::SectionAbsolute => Some(RowHint::FollowReference),
            },
        }
    }

    /// Whether the attribute at `row` is a reference, followable or not.
    pub fn is_reference(&self, row: usize) -> bool
    {
        self.attribute_at(row).is_some_and(reference::is_reference)
    }

    /// Point the view at another DIE.
    ///
    /// Reports the attribute rows added or removed at the end of the table,
    /// followed by a value refresh of every remaining row. A table left with
    /// no rows has no range to refresh, so switching between two DIEs without
    /// attributes outside low-level mode yields an empty change set.
    pub fn switch_die(&mut self, die: &'a Die) -> ChangeSet
    {
        let before = self.die.len();
        let after = die.len();
        self.die = die;
        tracing::debug!(offset = die.offset(), unit = %die.unit(), before, after, "switching DIE");

        let metadata = self.metadata_rows();
        let mut changes = ChangeSet::new();
        if after > before {
            changes.push(ModelChange::RowsInserted {
                first: metadata + before,
                last: metadata + after - 1,
            });
        } else if before > after {
            changes.push(ModelChange::RowsRemoved {
                first: metadata + after,
                last: metadata + before - 1,
            });
        }
        self.push_data_changed(&mut changes);
        changes
    }

    /// Show or hide the `DW_*_` name prefixes.
    pub fn set_prefix(&mut self, show_prefix: bool) -> ChangeSet
    {
        let mut changes = ChangeSet::new();
        if self.options().show_prefix != show_prefix {
            self.formatter.set_prefix(show_prefix);
            self.push_data_changed(&mut changes);
        }
        changes
    }

    /// Switch integers between hexadecimal and decimal.
    pub fn set_hex(&mut self, hex: bool) -> ChangeSet
    {
        let mut changes = ChangeSet::new();
        if self.options().hex != hex {
            self.formatter.set_hex(hex);
            self.push_data_changed(&mut changes);
        }
        changes
    }

    /// Show or hide the Offset/Raw columns and the metadata rows.
    pub fn set_low_level(&mut self, low_level: bool) -> ChangeSet
    {
        let mut changes = ChangeSet::new();
        if self.options().low_level == low_level {
            return changes;
        }
        self.formatter.set_low_level(low_level);

        let last_metadata = METADATA_ROWS.len() - 1;
        if low_level {
            changes.push(ModelChange::ColumnsInserted { first: 1, last: 1 });
            changes.push(ModelChange::ColumnsInserted { first: 3, last: 3 });
            changes.push(ModelChange::RowsInserted {
                first: 0,
                last: last_metadata,
            });
        } else {
            changes.push(ModelChange::RowsRemoved {
                first: 0,
                last: last_metadata,
            });
            changes.push(ModelChange::ColumnsRemoved { first: 3, last: 3 });
            changes.push(ModelChange::ColumnsRemoved { first: 1, last: 1 });
        }
        changes
    }

    /// Refresh every cell; nothing is pushed for an empty table.
    fn push_data_changed(&self, changes: &mut ChangeSet)
    {
        let rows = self.row_count();
        if rows > 0 {
            changes.push(ModelChange::DataChanged {
                first_row: 0,
                last_row: rows - 1,
                first_column: 0,
                last_column: self.column_count() - 1,
            });
        }
    }

    /// The DIE the reference at `row` points to.
    ///
    /// Returns `Ok(None)` for metadata rows, non-reference attributes and
    /// `ref_addr` values outside every unit.
    ///
    /// ## Errors
    ///
    /// `RowOutOfRange`, or `UnsupportedReferenceKind` for signature and
    /// supplementary references.
    pub fn resolve_reference(&self, row: usize) -> Result<Option<ReferenceTarget>>
    {
        let Row::Attribute(attr) = self.row(row)? else {
            return Ok(None);
        };
        let target = reference::resolve_reference(self.source, self.unit()?, attr)?;
        tracing::debug!(row, ?target, "resolved reference");
        Ok(target)
    }

    /// Expand the attribute at `row` into a sub-table.
    ///
    /// - `DW_AT_ranges`: (start, end) absolute addresses
    /// - single location expression: one operation per row
    /// - location list: (start, end, expression)
    /// - `DW_AT_stmt_list`: (address, file, line) per emitted line row
    ///
    /// Anything else, including metadata rows, expands to `None`.
    ///
    /// ## Errors
    ///
    /// `RowOutOfRange`, `MissingBaseAddress`, `UnsupportedBaseAddressSelection`,
    /// line program errors and decoding errors.
    pub fn expand(&self, row: usize) -> Result<Option<DetailTable>>
    {
        let Row::Attribute(attr) = self.row(row)? else {
            return Ok(None);
        };
        let unit = self.unit()?;
        let dumper = self.formatter.dumper();

        if attr.name() == DW_AT_ranges {
            let Some(offset) = attr.value().as_unsigned() else {
                return Ok(None);
            };
            let Some(items) = location::resolve_ranges(self.source, self.die, attr)? else {
                return Ok(None);
            };
            let rows = location::absolute_entries(unit, offset, items.as_slice())?
                .into_iter()
                .map(|entry| vec![hex_string(entry.begin), hex_string(entry.end)])
                .collect();
            return Ok(Some(DetailTable::new(&RANGE_HEADERS, rows)));
        }

        match location::resolve_location(self.source, unit, attr)? {
            Some(ResolvedLocation::Expression(expression)) => {
                let rows = dumper.dump(&expression).into_iter().map(|op| vec![op]).collect();
                return Ok(Some(DetailTable::new(&EXPRESSION_HEADERS, rows)));
            }
            Some(ResolvedLocation::List { offset, items }) => {
                let rows = location::absolute_entries(unit, offset, items.as_slice())?
                    .into_iter()
                    .map(|entry| {
                        vec![
                            hex_string(entry.begin),
                            hex_string(entry.end),
                            dumper.dump_joined(&entry.entry.expression),
                        ]
                    })
                    .collect();
                return Ok(Some(DetailTable::new(&LOCATION_LIST_HEADERS, rows)));
            }
            None => {}
        }

        if attr.name() == DW_AT_stmt_list {
            let program = unit.line_program(self.source)?;
            let rows = program
                .states()
                .iter()
                .map(|state| {
                    let file = program.file_name(state.file)?.unwrap_or("(N/A)");
                    Ok(vec![hex_string(state.address), file.to_string(), state.line.to_string()])
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Some(DetailTable::new(&LINE_HEADERS, rows)));
        }

        Ok(None)
    }
}
