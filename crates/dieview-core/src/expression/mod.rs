//! # Expression Dumper
//!
//! Renders decoded DWARF expressions as text, one string per operation:
//!
//! ```text
//! DW_OP_fbreg -24
//! bregx 0x7, 0x10
//! entry_value {reg5}
//! ```
//!
//! The dumper only renders; toggling the prefix or hex flags never requires
//! decoding the expression again.

mod decode;

pub use decode::decode_expression;

use crate::format::int_string;
use crate::types::{ExprOp, LocationExpression, OpArg};

const OP_PREFIX: &str = "DW_OP_";

/// Separator between operations of one expression.
pub const OP_SEPARATOR: &str = "; ";

/// Renders [`LocationExpression`]s under the current display flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressionDumper
{
    show_prefix: bool,
    hex: bool,
}

impl ExpressionDumper
{
    pub fn new(show_prefix: bool, hex: bool) -> Self
    {
        Self { show_prefix, hex }
    }

    pub fn show_prefix(&self) -> bool
    {
        self.show_prefix
    }

    pub fn hex(&self) -> bool
    {
        self.hex
    }

    pub fn set_prefix(&mut self, show_prefix: bool)
    {
        self.show_prefix = show_prefix;
    }

    pub fn set_hex(&mut self, hex: bool)
    {
        self.hex = hex;
    }

    /// One display string per operation, in order.
    pub fn dump(&self, expression: &LocationExpression) -> Vec<String>
    {
        expression.ops().iter().map(|op| self.dump_op(op)).collect()
    }

    /// The whole expression on one line, operations separated by `"; "`.
    pub fn dump_joined(&self, expression: &LocationExpression) -> String
    {
        self.dump(expression).join(OP_SEPARATOR)
    }

    /// `"<name> <arg>, <arg>"`, or just the name when there are no operands.
    pub fn dump_op(&self, op: &ExprOp) -> String
    {
        let full: &str = &op.name;
        let name = if self.show_prefix {
            full
        } else {
            full.strip_prefix(OP_PREFIX).unwrap_or(full)
        };

        if op.args.is_empty() {
            return name.to_string();
        }

        let args = op.args.iter().map(|arg| self.format_arg(arg)).collect::<Vec<_>>();
        format!("{name} {}", args.join(", "))
    }

    fn format_arg(&self, arg: &OpArg) -> String
    {
        match arg {
            OpArg::Text(text) => text.clone(),
            OpArg::Unsigned(value) => int_string(i128::from(*value), self.hex),
            OpArg::Signed(value) => int_string(i128::from(*value), self.hex),
            OpArg::Bytes(bytes) => bytes.iter().map(|byte| format!("{byte:02x}")).collect(),
            OpArg::Nested(expression) => format!("{{{}}}", self.dump_joined(expression)),
        }
    }
}
