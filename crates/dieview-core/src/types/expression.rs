//! Decoded DWARF expressions.

use std::borrow::Cow;

use smallvec::SmallVec;

/// Argument of a single expression operation.
///
/// `Nested` carries a whole sub-expression, as used by `DW_OP_entry_value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpArg
{
    Unsigned(u64),
    Signed(i64),
    /// Literal bytes (`DW_OP_implicit_value`, `DW_OP_const_type`)
    Bytes(Vec<u8>),
    /// Pre-rendered text, passed through unchanged
    Text(String),
    Nested(LocationExpression),
}

/// One operation record: the opcode, its name and its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprOp
{
    pub opcode: u8,
    /// Full operation name, e.g. `DW_OP_breg7`
    pub name: Cow<'static, str>,
    pub args: SmallVec<[OpArg; 2]>,
}

impl ExprOp
{
    pub fn new(opcode: u8, name: impl Into<Cow<'static, str>>, args: impl IntoIterator<Item = OpArg>) -> Self
    {
        Self {
            opcode,
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }
}

/// An ordered sequence of operation records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationExpression(pub Vec<ExprOp>);

impl LocationExpression
{
    pub fn new(ops: Vec<ExprOp>) -> Self
    {
        Self(ops)
    }

    pub fn ops(&self) -> &[ExprOp]
    {
        &self.0
    }

    pub fn len(&self) -> usize
    {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.0.is_empty()
    }
}

impl FromIterator<ExprOp> for LocationExpression
{
    fn from_iter<I: IntoIterator<Item = ExprOp>>(iter: I) -> Self
    {
        Self(iter.into_iter().collect())
    }
}
