//! In-memory DWARF source shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use dieview_core::error::{DieViewError, Result};
use dieview_core::types::{LineProgram, LineState, ListItem, LocationListEntry, RangeListEntry};
use dieview_core::{AttrValue, Attribute, CompileUnit, Die, DwarfSource, LanguageTable, UnitId};
use gimli::{DwAt, DwForm, DwTag, Encoding, Format, RunTimeEndian};

static LOGGING: Once = Once::new();

/// Route core tracing events to stdout at warn level, once per test binary.
pub fn init_logging()
{
    LOGGING.call_once(|| {
        if let Ok(guard) = dieview_utils::init_logging_with_level(dieview_utils::LogLevel::Warn, dieview_utils::LogFormat::Pretty) {
            std::mem::forget(guard);
        }
    });
}

pub fn encoding(version: u16) -> Encoding
{
    Encoding {
        format: Format::Dwarf32,
        version,
        address_size: 8,
    }
}

pub fn attr(name: DwAt, form: DwForm, value: AttrValue) -> Attribute
{
    Attribute::new(name, form, value)
}

pub fn die(offset: u64, unit: usize, tag: DwTag, attributes: Vec<Attribute>) -> Die
{
    Die::new(offset, tag, UnitId(unit), false, attributes)
}

/// A unit at `offset` spanning `size` bytes, whose root DIE follows the
/// 11-byte DWARF 4 header.
pub fn unit(index: usize, offset: u64, size: u64, version: u16, root_attributes: Vec<Attribute>) -> CompileUnit
{
    let root = Die::new(
        offset + 0xb,
        gimli::DW_TAG_compile_unit,
        UnitId(index),
        true,
        root_attributes,
    );
    CompileUnit::new(UnitId(index), offset, size, encoding(version), RunTimeEndian::Little, root)
}

pub fn location_entry(begin_offset: u64, end_offset: u64, bytes: &[u8]) -> LocationListEntry
{
    LocationListEntry {
        begin_offset,
        end_offset,
        expression: dieview_core::expression::decode_expression(bytes, encoding(4), RunTimeEndian::Little)
            .expect("valid expression"),
    }
}

pub fn line_state(address: u64, file: u64, line: u64) -> LineState
{
    LineState {
        address,
        file,
        line,
        end_sequence: false,
    }
}

/// A [`DwarfSource`] whose lists and line programs are supplied up front.
#[derive(Default)]
pub struct MemorySource
{
    pub units: Vec<CompileUnit>,
    pub languages: LanguageTable,
    pub line_programs: HashMap<usize, LineProgram>,
    pub location_lists: HashMap<u64, Vec<ListItem<LocationListEntry>>>,
    pub range_lists: Option<HashMap<u64, Vec<ListItem<RangeListEntry>>>>,
    pub reads: AtomicUsize,
}

impl MemorySource
{
    pub fn new(units: Vec<CompileUnit>) -> Self
    {
        init_logging();
        Self {
            units,
            languages: LanguageTable::dwarf_standard(),
            ..Self::default()
        }
    }

    pub fn with_line_program(mut self, unit: usize, program: LineProgram) -> Self
    {
        self.line_programs.insert(unit, program);
        self
    }

    pub fn with_location_list(mut self, offset: u64, items: Vec<ListItem<LocationListEntry>>) -> Self
    {
        self.location_lists.insert(offset, items);
        self
    }

    pub fn with_range_list(mut self, offset: u64, items: Vec<ListItem<RangeListEntry>>) -> Self
    {
        self.range_lists.get_or_insert_with(HashMap::new).insert(offset, items);
        self
    }

    /// Number of list and line program reads that reached this source.
    pub fn reads(&self) -> usize
    {
        self.reads.load(Ordering::SeqCst)
    }

    fn missing(offset: u64) -> DieViewError
    {
        DieViewError::Dwarf {
            context: "reading list".to_string(),
            source: gimli::Error::UnexpectedEof(gimli::ReaderOffsetId(offset)),
        }
    }
}

impl DwarfSource for MemorySource
{
    fn units(&self) -> &[CompileUnit]
    {
        &self.units
    }

    fn languages(&self) -> &LanguageTable
    {
        &self.languages
    }

    fn read_line_program(&self, unit: &CompileUnit) -> Result<LineProgram>
    {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.line_programs
            .get(&unit.id().index())
            .cloned()
            .ok_or(DieViewError::MissingLineProgram {
                unit_offset: unit.offset(),
            })
    }

    fn read_location_list(&self, _unit: &CompileUnit, offset: u64) -> Result<Vec<ListItem<LocationListEntry>>>
    {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.location_lists.get(&offset).cloned().ok_or_else(|| Self::missing(offset))
    }

    fn read_range_list(&self, _unit: &CompileUnit, offset: u64) -> Result<Option<Vec<ListItem<RangeListEntry>>>>
    {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match &self.range_lists {
            None => Ok(None),
            Some(lists) => lists.get(&offset).cloned().map(Some).ok_or_else(|| Self::missing(offset)),
        }
    }
}
