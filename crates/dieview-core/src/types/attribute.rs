//! Attribute records handed over by the DWARF access layer.

use gimli::{DwAt, DwForm};

/// An attribute value, either as encoded on disk (raw) or after the access
/// layer resolved it (decoded).
///
/// Block and exprloc payloads are kept apart from string bytes: only the
/// latter are rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue
{
    /// Unsigned constants, addresses, offsets and indices
    Unsigned(u64),
    /// Signed constants (`DW_FORM_sdata`, `DW_FORM_implicit_const`)
    Signed(i64),
    /// Flags (`DW_FORM_flag`, `DW_FORM_flag_present`)
    Flag(bool),
    /// Block and exprloc payloads
    Block(Vec<u8>),
    /// String bytes, inline or fetched from a string section
    Text(Vec<u8>),
}

impl AttrValue
{
    /// The value as an unsigned integer, if it is a non-negative integer.
    pub fn as_unsigned(&self) -> Option<u64>
    {
        match *self {
            AttrValue::Unsigned(value) => Some(value),
            AttrValue::Signed(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }

    /// The value widened to `i128`, for integers of either sign.
    pub fn as_integer(&self) -> Option<i128>
    {
        match *self {
            AttrValue::Unsigned(value) => Some(i128::from(value)),
            AttrValue::Signed(value) => Some(i128::from(value)),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool
    {
        matches!(self, AttrValue::Unsigned(_) | AttrValue::Signed(_))
    }

    /// Payload bytes of a block or exprloc value.
    pub fn block(&self) -> Option<&[u8]>
    {
        match self {
            AttrValue::Block(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Generic string conversion used when no dedicated rendering applies.
    ///
    /// Integers are decimal, flags are `True`/`False`, blocks are a bracketed
    /// decimal byte list and strings are decoded lossily.
    pub fn to_display_string(&self) -> String
    {
        match self {
            AttrValue::Unsigned(value) => value.to_string(),
            AttrValue::Signed(value) => value.to_string(),
            AttrValue::Flag(true) => "True".to_string(),
            AttrValue::Flag(false) => "False".to_string(),
            AttrValue::Block(bytes) => {
                let list = bytes.iter().map(u8::to_string).collect::<Vec<_>>().join(", ");
                format!("[{list}]")
            }
            AttrValue::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// One attribute of a DIE.
///
/// Immutable once produced by the access layer. `offset` is the position of
/// the encoded value in `.debug_info` and only matters in low-level display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute
{
    name: DwAt,
    form: DwForm,
    raw_value: AttrValue,
    value: AttrValue,
    offset: u64,
}

impl Attribute
{
    /// Build an attribute whose raw and decoded values are the same.
    pub fn new(name: DwAt, form: DwForm, value: AttrValue) -> Self
    {
        Self {
            name,
            form,
            raw_value: value.clone(),
            value,
            offset: 0,
        }
    }

    /// Replace the raw (on-disk) value, e.g. a string offset for `DW_FORM_strp`.
    #[must_use]
    pub fn with_raw_value(mut self, raw_value: AttrValue) -> Self
    {
        self.raw_value = raw_value;
        self
    }

    /// Set the `.debug_info` offset of the encoded value.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self
    {
        self.offset = offset;
        self
    }

    pub fn name(&self) -> DwAt
    {
        self.name
    }

    pub fn form(&self) -> DwForm
    {
        self.form
    }

    pub fn raw_value(&self) -> &AttrValue
    {
        &self.raw_value
    }

    /// The decoded value (strings resolved, indices turned into offsets or addresses).
    pub fn value(&self) -> &AttrValue
    {
        &self.value
    }

    pub fn offset(&self) -> u64
    {
        self.offset
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_block_display_is_decimal_list()
    {
        assert_eq!(AttrValue::Block(vec![0x91, 0x7c]).to_display_string(), "[145, 124]");
        assert_eq!(AttrValue::Block(Vec::new()).to_display_string(), "[]");
    }

    #[test]
    fn test_flag_display()
    {
        assert_eq!(AttrValue::Flag(true).to_display_string(), "True");
        assert_eq!(AttrValue::Flag(false).to_display_string(), "False");
    }

    #[test]
    fn test_as_unsigned_rejects_negative()
    {
        assert_eq!(AttrValue::Signed(-1).as_unsigned(), None);
        assert_eq!(AttrValue::Signed(7).as_unsigned(), Some(7));
        assert_eq!(AttrValue::Text(b"x".to_vec()).as_unsigned(), None);
    }

    #[test]
    fn test_with_raw_value_keeps_decoded()
    {
        let attr = Attribute::new(gimli::DW_AT_name, gimli::DW_FORM_strp, AttrValue::Text(b"main".to_vec()))
            .with_raw_value(AttrValue::Unsigned(0x40))
            .with_offset(0x2c);
        assert_eq!(attr.raw_value(), &AttrValue::Unsigned(0x40));
        assert_eq!(attr.value(), &AttrValue::Text(b"main".to_vec()));
        assert_eq!(attr.offset(), 0x2c);
    }
}
