//! # Attribute Value Formatting
//!
//! Turns one attribute into display text. The first matching rule wins:
//!
//! | # | Rule | Rendering |
//! |---|------|-----------|
//! | 1 | value is a string | the string |
//! | 2 | address form | `0x401000` |
//! | 3 | followable reference form | `Ref: 0x2D` |
//! | 4 | location expression / list | `fbreg -24` / `Loc list: 0x1A0` |
//! | 5 | `DW_AT_language` | `28 Rust` |
//! | 6 | `DW_AT_decl_file` | `1: main.c` |
//! | 7 | `DW_AT_stmt_list` | `LNP at 0x0` |
//! | 8 | anything else | decimal or hex integer, or the generic string |
//!
//! The ordering is significant: a string-valued attribute never reaches the
//! location rules, and a reference-form `DW_AT_location` is rendered as a
//! reference. Type signatures and supplementary-file references are not
//! followable and fall through to the later rules.

use gimli::constants::*;
use gimli::{DwAt, DwForm};

use crate::config::DisplayOptions;
use crate::error::Result;
use crate::expression::ExpressionDumper;
use crate::location::{self, LocationClass, ResolvedLocation};
use crate::reference;
use crate::source::DwarfSource;
use crate::types::{AttrValue, Attribute, CompileUnit};

const ATTRIBUTE_PREFIX: &str = "DW_AT_";
const FORM_PREFIX: &str = "DW_FORM_";

/// Render an integer in decimal, or in hexadecimal as `0x1f` / `-0x10`.
pub(crate) fn int_string(value: i128, hex: bool) -> String
{
    if !hex {
        return value.to_string();
    }
    if value < 0 {
        format!("-0x{:x}", value.unsigned_abs())
    } else {
        format!("0x{value:x}")
    }
}

/// Lowercase hex used for offsets and addresses.
pub(crate) fn hex_string(value: u64) -> String
{
    format!("0x{value:x}")
}

/// The formatting rule that applies to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule
{
    Text,
    Address,
    Reference,
    Location(LocationClass),
    Language,
    DeclFile,
    StmtList,
    Generic,
}

impl ValueRule
{
    /// First matching rule for `attr` in a unit of DWARF `version`.
    pub fn classify(attr: &Attribute, version: u16) -> Self
    {
        if matches!(attr.value(), AttrValue::Text(_)) {
            return ValueRule::Text;
        }
        if is_address_form(attr.form()) && attr.value().is_integer() {
            return ValueRule::Address;
        }
        if reference::is_followable(attr.form()) {
            return ValueRule::Reference;
        }
        if let Some(class) = location::location_class(attr, version) {
            return ValueRule::Location(class);
        }
        match attr.name() {
            DW_AT_language => ValueRule::Language,
            DW_AT_decl_file => ValueRule::DeclFile,
            DW_AT_stmt_list => ValueRule::StmtList,
            _ => ValueRule::Generic,
        }
    }
}

fn is_address_form(form: DwForm) -> bool
{
    matches!(
        form,
        DW_FORM_addr
            | DW_FORM_addrx
            | DW_FORM_addrx1
            | DW_FORM_addrx2
            | DW_FORM_addrx3
            | DW_FORM_addrx4
            | DW_FORM_GNU_addr_index
    )
}

/// `DW_AT_name` / `name`, or the bare decimal code for unknown constants.
fn constant_name(name: Option<&'static str>, code: u16, prefix: &str, show_prefix: bool) -> String
{
    match name {
        Some(name) if show_prefix => name.to_string(),
        Some(name) => name.strip_prefix(prefix).unwrap_or(name).to_string(),
        None => code.to_string(),
    }
}

/// Formats attribute names, forms and values under the display flags.
///
/// Rendering is a pure function of the attribute, its unit and the flags;
/// the only state touched is the unit's list and line program caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFormatter
{
    options: DisplayOptions,
    dumper: ExpressionDumper,
}

impl AttributeFormatter
{
    pub fn new(options: DisplayOptions) -> Self
    {
        Self {
            options,
            dumper: ExpressionDumper::new(options.show_prefix, options.hex),
        }
    }

    pub fn options(&self) -> DisplayOptions
    {
        self.options
    }

    /// The expression dumper, kept in sync with the prefix and hex flags.
    pub fn dumper(&self) -> &ExpressionDumper
    {
        &self.dumper
    }

    pub fn set_prefix(&mut self, show_prefix: bool)
    {
        self.options.show_prefix = show_prefix;
        self.dumper.set_prefix(show_prefix);
    }

    pub fn set_hex(&mut self, hex: bool)
    {
        self.options.hex = hex;
        self.dumper.set_hex(hex);
    }

    pub fn set_low_level(&mut self, low_level: bool)
    {
        self.options.low_level = low_level;
    }

    pub fn format_name(&self, name: DwAt) -> String
    {
        constant_name(name.static_string(), name.0, ATTRIBUTE_PREFIX, self.options.show_prefix)
    }

    pub fn format_form(&self, form: DwForm) -> String
    {
        constant_name(form.static_string(), form.0, FORM_PREFIX, self.options.show_prefix)
    }

    /// The on-disk value, for the low-level "Raw" column.
    pub fn format_raw(&self, attr: &Attribute) -> String
    {
        match attr.raw_value().as_integer() {
            Some(value) => int_string(value, self.options.hex),
            None => attr.raw_value().to_display_string(),
        }
    }

    /// A `.debug_info` offset, always hexadecimal.
    pub fn format_offset(&self, offset: u64) -> String
    {
        hex_string(offset)
    }

    /// Display text for the value of `attr`, which belongs to `unit`.
    ///
    /// ## Errors
    ///
    /// List decoding errors, `MissingLineProgram` or `MalformedLineEntry`
    /// for `DW_AT_decl_file`, and other errors from the source.
    pub fn format_value<S: DwarfSource + ?Sized>(
        &self,
        source: &S,
        unit: &CompileUnit,
        attr: &Attribute,
    ) -> Result<String>
    {
        let value = attr.value();
        let rule = ValueRule::classify(attr, unit.version());
        tracing::trace!(attribute = %attr.name(), form = %attr.form(), ?rule, "formatting value");
        match rule {
            ValueRule::Text => Ok(value.to_display_string()),
            ValueRule::Address => Ok(self.address(value)),
            ValueRule::Reference => Ok(match value.as_unsigned() {
                Some(offset) => format!("Ref: 0x{offset:X}"),
                None => value.to_display_string(),
            }),
            ValueRule::Location(_) => match location::resolve_location(source, unit, attr)? {
                Some(ResolvedLocation::Expression(expression)) => Ok(self.dumper.dump_joined(&expression)),
                Some(ResolvedLocation::List { offset, .. }) => Ok(format!("Loc list: 0x{offset:X}")),
                None => Ok(self.generic(value)),
            },
            ValueRule::Language => Ok(match value.as_unsigned() {
                Some(code) => match source.languages().name(code) {
                    Some(name) => format!("{code} {name}"),
                    None => code.to_string(),
                },
                None => self.generic(value),
            }),
            ValueRule::DeclFile => match value.as_unsigned() {
                Some(0) => Ok("0: (N/A)".to_string()),
                Some(index) => {
                    let program = unit.line_program(source)?;
                    let name = program.file_name(index)?.unwrap_or_default();
                    Ok(format!("{index}: {name}"))
                }
                None => Ok(self.generic(value)),
            },
            ValueRule::StmtList => Ok(match value.as_unsigned() {
                Some(offset) => format!("LNP at {}", hex_string(offset)),
                None => self.generic(value),
            }),
            ValueRule::Generic => Ok(self.generic(value)),
        }
    }

    fn address(&self, value: &AttrValue) -> String
    {
        match value.as_integer() {
            Some(address) => int_string(address, true),
            None => value.to_display_string(),
        }
    }

    fn generic(&self, value: &AttrValue) -> String
    {
        match value.as_integer() {
            Some(number) => int_string(number, self.options.hex),
            None => value.to_display_string(),
        }
    }
}
