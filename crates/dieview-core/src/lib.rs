//! # dieview-core
//!
//! Interprets the attributes of a DWARF debugging information entry for
//! display: one row per attribute, a human-readable value per row, and
//! drill-down tables for ranges, locations and line programs.
//!
//! This crate provides:
//! - Attribute value formatting ([`format::AttributeFormatter`])
//! - Location expression dumping ([`expression::ExpressionDumper`])
//! - Location and range list resolution ([`location`])
//! - Reference following across compile units ([`reference`])
//! - A row/column view over one DIE ([`view::DieAttributeView`])
//! - A gimli-backed DWARF source for object files ([`image::DwarfImage`])
//!
//! ## Example
//!
//! ```no_run
//! use dieview_core::{DieAttributeView, DisplayOptions, DwarfImage, DwarfSource, UnitId};
//!
//! # fn main() -> dieview_core::Result<()>
//! # {
//! let image = DwarfImage::open("/usr/bin/true")?;
//! let unit = image.unit(UnitId(0))?;
//! let view = DieAttributeView::new(&image, unit.root(), DisplayOptions::default());
//! for row in 0..view.row_count() {
//!     println!("{:?}", view.cell(row, view.value_column())?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod expression;
pub mod format;
pub mod image;
pub mod language;
pub mod location;
pub mod reference;
pub mod source;
pub mod types;
pub mod view;

pub use config::DisplayOptions;
pub use error::{DieViewError, Result};
pub use expression::ExpressionDumper;
pub use format::{AttributeFormatter, ValueRule};
pub use image::DwarfImage;
pub use language::LanguageTable;
pub use location::{has_location, LocationClass, ResolvedLocation};
pub use reference::{is_reference, ReferenceKind, ReferenceTarget};
pub use source::DwarfSource;
pub use types::{AttrValue, Attribute, CompileUnit, Die, UnitId};
pub use view::{ChangeSet, DetailTable, DieAttributeView, ModelChange, RowHint};
