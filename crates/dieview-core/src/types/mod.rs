//! # Types
//!
//! The data model the interpreter reads: attributes, DIEs, compile units,
//! decoded expressions, list entries and line programs.
//!
//! All of it is produced by a DWARF access layer (see [`crate::source`]) and
//! treated as read-only here.

pub mod attribute;
pub mod die;
pub mod expression;
pub mod line;
pub mod lists;
pub mod unit;

// Re-export all public types
pub use attribute::{AttrValue, Attribute};
pub use die::{Die, UnitId};
pub use expression::{ExprOp, LocationExpression, OpArg};
pub use line::{LineProgram, LineState};
pub use lists::{ListItem, LocationListEntry, RangeListEntry};
pub use unit::CompileUnit;
