//! # Error Types
//!
//! Error handling for attribute interpretation.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use gimli::DwForm;
use thiserror::Error;

/// Main error type for attribute interpretation
///
/// Formatting-time failures surface here as typed values rather than blank
/// cells, so the host can decide between a placeholder and an error marker.
///
/// ## Error Categories
///
/// 1. **Base address errors**: MissingBaseAddress, UnsupportedBaseAddressSelection
/// 2. **Reference errors**: UnsupportedReferenceKind
/// 3. **Line program errors**: MalformedLineEntry, MissingLineProgram
/// 4. **Lookup errors**: UnknownUnit, RowOutOfRange
/// 5. **Decoding errors**: Dwarf, Object, Io (from the DWARF access layer)
///
/// A `ref_addr` pointing past every known unit is *not* an error; reference
/// resolution returns `Ok(None)` for that case.
#[derive(Error, Debug)]
pub enum DieViewError
{
    /// The unit's root DIE has neither `DW_AT_low_pc` nor `DW_AT_entry_pc`
    ///
    /// Base-relative location and range list entries cannot be turned into
    /// addresses without one of these.
    #[error("Can't find the base address for unit at 0x{unit_offset:x}")]
    MissingBaseAddress
    {
        /// Offset of the unit in `.debug_info`
        unit_offset: u64,
    },

    /// The attribute uses a reference form that cannot be followed
    ///
    /// Covers `DW_FORM_ref_sig8`, `DW_FORM_ref_sup4`, `DW_FORM_ref_sup8` and
    /// `DW_FORM_GNU_ref_alt`.
    #[error("Unsupported reference form: {form}")]
    UnsupportedReferenceKind
    {
        /// The offending form
        form: DwForm,
    },

    /// A file index does not exist in the unit's line program file table
    #[error("File index {index} is out of range (file table has {file_count} entries)")]
    MalformedLineEntry
    {
        /// The 1-based file index from the attribute or line row
        index: u64,
        /// Number of entries in the file table
        file_count: usize,
    },

    /// A location or range list contains a base-address-selection entry
    ///
    /// Those entries change the base for the entries that follow; they are
    /// reported rather than applied.
    #[error("List at 0x{list_offset:x} selects a new base address 0x{address:x}; base address selection is not supported")]
    UnsupportedBaseAddressSelection
    {
        /// Section offset of the list
        list_offset: u64,
        /// Address carried by the selection entry
        address: u64,
    },

    /// The unit has no line-number program
    #[error("Unit at 0x{unit_offset:x} has no line number program")]
    MissingLineProgram
    {
        /// Offset of the unit in `.debug_info`
        unit_offset: u64,
    },

    /// A unit id that the DWARF source does not know about
    #[error("No compile unit with index {index}")]
    UnknownUnit
    {
        /// The unit index
        index: usize,
    },

    /// A row index past the end of the attribute view
    #[error("Row {row} is out of range (view has {rows} rows)")]
    RowOutOfRange
    {
        /// Requested row
        row: usize,
        /// Row count of the view
        rows: usize,
    },

    /// Failure reported by gimli while decoding DWARF data
    #[error("{context}: {source}")]
    Dwarf
    {
        /// What was being decoded
        context: String,
        /// The underlying gimli error
        #[source]
        source: gimli::Error,
    },

    /// The object file container could not be parsed
    #[error("Object file error: {0}")]
    Object(String),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, DieViewError>`
///
/// ```rust
/// use dieview_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, DieViewError>;

/// Wrap a gimli error with a short description of what was being decoded.
pub(crate) fn map_dwarf_error(context: &str, err: gimli::Error) -> DieViewError
{
    DieViewError::Dwarf {
        context: context.to_string(),
        source: err,
    }
}
