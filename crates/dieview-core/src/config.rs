//! # Display Configuration
//!
//! The three display flags shared by the formatter, the expression dumper and
//! the attribute view.
//!
//! ## Environment Variables
//!
//! - `DIEVIEW_PREFIX`: show `DW_AT_`/`DW_FORM_`/`DW_OP_` prefixes
//! - `DIEVIEW_HEX`: render integers in hexadecimal
//! - `DIEVIEW_LOWLEVEL`: show offset/raw columns and the metadata rows
//!
//! Accepted values are `1|true|yes|on` and `0|false|no|off`; anything else
//! leaves the default in place.

use std::env;

pub const PREFIX_ENV: &str = "DIEVIEW_PREFIX";
pub const HEX_ENV: &str = "DIEVIEW_HEX";
pub const LOW_LEVEL_ENV: &str = "DIEVIEW_LOWLEVEL";

/// Display flags. Everything is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions
{
    /// Keep the `DW_*_` name prefixes
    pub show_prefix: bool,
    /// Render integers as hexadecimal instead of decimal
    pub hex: bool,
    /// Show the offset/raw columns and the DIE metadata rows
    pub low_level: bool,
}

impl DisplayOptions
{
    /// Defaults overlaid with the `DIEVIEW_*` environment variables.
    pub fn from_env() -> Self
    {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Overlay values produced by `lookup` (keyed by environment variable name).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self
    {
        if let Some(value) = lookup(PREFIX_ENV).as_deref().and_then(parse_flag) {
            self.show_prefix = value;
        }
        if let Some(value) = lookup(HEX_ENV).as_deref().and_then(parse_flag) {
            self.hex = value;
        }
        if let Some(value) = lookup(LOW_LEVEL_ENV).as_deref().and_then(parse_flag) {
            self.low_level = value;
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool>
{
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
