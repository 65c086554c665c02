//! Language code names for `DW_AT_language`.

use std::collections::HashMap;

use gimli::constants::{
    DW_LANG_ALTIUM_Assembler, DW_LANG_BORLAND_Delphi, DW_LANG_GOOGLE_RenderScript, DW_LANG_Mips_Assembler,
    DW_LANG_SUN_Assembler,
};
use gimli::DwLang;
use once_cell::sync::Lazy;

/// Vendor language codes that sit outside the standard range.
const VENDOR_LANGUAGES: [DwLang; 5] = [
    DW_LANG_Mips_Assembler,
    DW_LANG_GOOGLE_RenderScript,
    DW_LANG_SUN_Assembler,
    DW_LANG_ALTIUM_Assembler,
    DW_LANG_BORLAND_Delphi,
];

static DWARF_STANDARD: Lazy<LanguageTable> = Lazy::new(|| {
    (0..=0xffu16)
        .chain(VENDOR_LANGUAGES.map(|language| language.0))
        .filter_map(|code| {
            let name = DwLang(code).static_string()?;
            Some((u64::from(code), name.strip_prefix("DW_LANG_").unwrap_or(name).to_string()))
        })
        .collect()
});

/// Maps numeric language codes to human-readable names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTable
{
    names: HashMap<u64, String>,
}

impl LanguageTable
{
    /// An empty table; every code renders bare.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Every `DW_LANG_*` code gimli knows, named without the prefix
    /// (`0x1` is `C89`, `0x1c` is `Rust`).
    pub fn dwarf_standard() -> Self
    {
        DWARF_STANDARD.clone()
    }

    pub fn insert(&mut self, code: u64, name: impl Into<String>)
    {
        self.names.insert(code, name.into());
    }

    pub fn name(&self, code: u64) -> Option<&str>
    {
        self.names.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }
}

impl FromIterator<(u64, String)> for LanguageTable
{
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self
    {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
