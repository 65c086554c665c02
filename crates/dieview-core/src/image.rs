//! # DWARF Image
//!
//! A [`DwarfSource`] backed by an object file on disk.
//!
//! The file is parsed once with `object`; every DWARF section is copied into
//! an `Arc<[u8]>` and handed to `gimli`. Compile units and their root DIEs are
//! read eagerly, all other DIEs on demand.
//!
//! ## Value decoding
//!
//! Each attribute keeps two values: the raw form-level value (a string
//! offset for `DW_FORM_strp`, an index for `DW_FORM_addrx`) and the decoded
//! value (the string, the address). Index forms for lists are decoded to
//! section offsets, unit-relative references stay unit-relative.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{
    AttributeValue, DebugInfoOffset, DebugLineOffset, DebugStrOffset, DebugTypeSignature, Dwarf, EndianArcSlice,
    EntriesRaw, LocationListsOffset, RangeListsOffset, RawLocListEntry, RawRngListEntry, Reader, RunTimeEndian,
    SectionId, UnitOffset,
};
use object::{Object, ObjectSection};

use crate::error::{map_dwarf_error, DieViewError, Result};
use crate::language::LanguageTable;
use crate::source::DwarfSource;
use crate::types::{
    AttrValue, Attribute, CompileUnit, Die, LineProgram, LineState, ListItem, LocationExpression, LocationListEntry,
    RangeListEntry, UnitId,
};

type OwnedReader = EndianArcSlice<RunTimeEndian>;
type OwnedDwarf = Dwarf<OwnedReader>;
type OwnedUnit = gimli::Unit<OwnedReader>;

const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offs"]),
    (".debug_loc", &[".debug_loc", "__debug_loc"]),
    (".debug_loclists", &[".debug_loclists", "__debug_loclists"]),
];

/// An object file's DWARF, with its compile units indexed by [`UnitId`].
pub struct DwarfImage
{
    path: PathBuf,
    endian: RunTimeEndian,
    sections: HashMap<&'static str, Arc<[u8]>>,
    dwarf: OwnedDwarf,
    dwarf_units: Vec<OwnedUnit>,
    units: Vec<CompileUnit>,
    languages: LanguageTable,
}

impl DwarfImage
{
    /// Read and parse the object file at `path`.
    ///
    /// ## Errors
    ///
    /// `Io` when the file cannot be read, `Object` when it is not a supported
    /// object file, `Dwarf` when the unit headers are malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self>
    {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Self::parse(path.to_path_buf(), &bytes)
    }

    /// Parse an object file already in memory; `path` is only used for display.
    ///
    /// ## Errors
    ///
    /// `Object` when the bytes are not a supported object file, `Dwarf` when
    /// the unit headers are malformed.
    pub fn parse(path: PathBuf, bytes: &[u8]) -> Result<Self>
    {
        let file = object::File::parse(bytes)
            .map_err(|err| DieViewError::Object(format!("failed to parse {}: {err}", path.display())))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            if let Some(data) = load_section_bytes(&file, aliases)? {
                sections.insert(*canonical, data);
            }
        }

        let dwarf = Dwarf::load(|section| Ok::<_, gimli::Error>(section_reader(&sections, endian, section)))
            .map_err(|err| map_dwarf_error("loading DWARF sections", err))?;

        let mut image = Self {
            path,
            endian,
            sections,
            dwarf,
            dwarf_units: Vec::new(),
            units: Vec::new(),
            languages: LanguageTable::dwarf_standard(),
        };
        image.load_units()?;
        tracing::info!(path = %image.path.display(), units = image.units.len(), "loaded DWARF image");
        Ok(image)
    }

    fn load_units(&mut self) -> Result<()>
    {
        let mut headers = self.dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| map_dwarf_error("reading unit header", err))?
        {
            let Some(DebugInfoOffset(offset)) = header.offset().as_debug_info_offset() else {
                continue;
            };
            let size = header.length_including_self() as u64;
            let dwarf_unit = self
                .dwarf
                .unit(header)
                .map_err(|err| map_dwarf_error("parsing unit", err))?;

            let id = UnitId(self.units.len());
            let mut entries = dwarf_unit
                .entries_raw(None)
                .map_err(|err| map_dwarf_error("reading unit entries", err))?;
            let Some(root) = self.read_entry(id, offset as u64, &dwarf_unit, &mut entries)? else {
                tracing::warn!(offset, "unit without a root DIE");
                continue;
            };

            tracing::debug!(offset, size, version = dwarf_unit.encoding().version, "loaded unit");
            let unit = CompileUnit::new(id, offset as u64, size, dwarf_unit.encoding(), self.endian, root);
            self.units.push(unit);
            self.dwarf_units.push(dwarf_unit);
        }
        Ok(())
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Replace the language table used for `DW_AT_language`.
    pub fn set_languages(&mut self, languages: LanguageTable)
    {
        self.languages = languages;
    }

    /// Every DIE of the unit `id`, in `.debug_info` order.
    ///
    /// ## Errors
    ///
    /// `UnknownUnit`, or a decoding error.
    pub fn dies(&self, id: UnitId) -> Result<Vec<Die>>
    {
        let (unit, dwarf_unit) = self.unit_pair(id)?;
        let mut entries = dwarf_unit
            .entries_raw(None)
            .map_err(|err| map_dwarf_error("reading unit entries", err))?;

        let mut dies = Vec::new();
        while !entries.is_empty() {
            if let Some(die) = self.read_entry(id, unit.offset(), dwarf_unit, &mut entries)? {
                dies.push(die);
            }
        }
        Ok(dies)
    }

    /// The DIE at absolute `.debug_info` offset `offset` inside unit `id`,
    /// typically a resolved reference target.
    ///
    /// Returns `Ok(None)` for offsets outside the unit or at a null entry.
    ///
    /// ## Errors
    ///
    /// `UnknownUnit`, or a decoding error.
    pub fn die_at(&self, id: UnitId, offset: u64) -> Result<Option<Die>>
    {
        let (unit, dwarf_unit) = self.unit_pair(id)?;
        if !unit.contains(offset) || offset == unit.offset() {
            return Ok(None);
        }
        let relative = UnitOffset((offset - unit.offset()) as usize);
        let mut entries = dwarf_unit
            .entries_raw(Some(relative))
            .map_err(|err| map_dwarf_error("seeking to DIE", err))?;
        self.read_entry(id, unit.offset(), dwarf_unit, &mut entries)
    }

    fn unit_pair(&self, id: UnitId) -> Result<(&CompileUnit, &OwnedUnit)>
    {
        let unit = self.unit(id)?;
        let dwarf_unit = self
            .dwarf_units
            .get(id.index())
            .ok_or(DieViewError::UnknownUnit { index: id.index() })?;
        Ok((unit, dwarf_unit))
    }

    fn has_section(&self, name: &str) -> bool
    {
        self.sections.get(name).is_some_and(|data| !data.is_empty())
    }

    /// Read the next entry; `None` for a null entry.
    fn read_entry(
        &self,
        id: UnitId,
        unit_offset: u64,
        dwarf_unit: &OwnedUnit,
        entries: &mut EntriesRaw<'_, '_, OwnedReader>,
    ) -> Result<Option<Die>>
    {
        let offset = entries.next_offset();
        let Some(abbreviation) = entries
            .read_abbreviation()
            .map_err(|err| map_dwarf_error("reading abbreviation", err))?
        else {
            return Ok(None);
        };

        let mut attributes = Vec::with_capacity(abbreviation.attributes().len());
        for spec in abbreviation.attributes() {
            let value_offset = entries.next_offset();
            let attr = entries
                .read_attribute(*spec)
                .map_err(|err| map_dwarf_error("reading attribute", err))?;
            let raw = plain_value(&attr.raw_value())?;
            let value = self.decoded_value(dwarf_unit, attr.value()).unwrap_or_else(|err| {
                tracing::warn!(attribute = %attr.name(), error = %err, "falling back to the raw value");
                raw.clone()
            });
            attributes.push(
                Attribute::new(attr.name(), spec.form(), value)
                    .with_raw_value(raw)
                    .with_offset(unit_offset + value_offset.0 as u64),
            );
        }

        Ok(Some(Die::new(
            unit_offset + offset.0 as u64,
            abbreviation.tag(),
            id,
            abbreviation.has_children(),
            attributes,
        )))
    }

    /// Resolve strings, address indices and list indices.
    fn decoded_value(&self, dwarf_unit: &OwnedUnit, value: AttributeValue<OwnedReader>) -> Result<AttrValue>
    {
        match value {
            AttributeValue::String(_)
            | AttributeValue::DebugStrRef(_)
            | AttributeValue::DebugLineStrRef(_)
            | AttributeValue::DebugStrOffsetsIndex(_) => {
                let reader = self
                    .dwarf
                    .attr_string(dwarf_unit, value)
                    .map_err(|err| map_dwarf_error("resolving string", err))?;
                Ok(AttrValue::Text(reader_bytes(&reader)?.into_owned()))
            }
            AttributeValue::DebugAddrIndex(index) => self
                .dwarf
                .address(dwarf_unit, index)
                .map(AttrValue::Unsigned)
                .map_err(|err| map_dwarf_error("resolving address index", err)),
            AttributeValue::DebugLocListsIndex(index) => self
                .dwarf
                .locations_offset(dwarf_unit, index)
                .map(|LocationListsOffset(offset)| AttrValue::Unsigned(offset as u64))
                .map_err(|err| map_dwarf_error("resolving location list index", err)),
            AttributeValue::DebugRngListsIndex(index) => self
                .dwarf
                .ranges_offset(dwarf_unit, index)
                .map(|RangeListsOffset(offset)| AttrValue::Unsigned(offset as u64))
                .map_err(|err| map_dwarf_error("resolving range list index", err)),
            AttributeValue::RangeListsRef(raw) => {
                let RangeListsOffset(offset) = self.dwarf.ranges_offset_from_raw(dwarf_unit, raw);
                Ok(AttrValue::Unsigned(offset as u64))
            }
            other => plain_value(&other),
        }
    }

    fn expression(&self, unit: &CompileUnit, data: &gimli::Expression<OwnedReader>) -> Result<LocationExpression>
    {
        let bytes = reader_bytes(&data.0)?;
        self.decode_expression(unit, &bytes)
    }

    fn address_index(&self, dwarf_unit: &OwnedUnit, index: gimli::DebugAddrIndex<usize>) -> Result<u64>
    {
        self.dwarf
            .address(dwarf_unit, index)
            .map_err(|err| map_dwarf_error("resolving list address", err))
    }
}

impl DwarfSource for DwarfImage
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
        let (_, dwarf_unit) = self.unit_pair(unit.id())?;
        let Some(program) = dwarf_unit.line_program.clone() else {
            tracing::warn!(unit = unit.offset(), "unit has no line program");
            return Err(DieViewError::MissingLineProgram {
                unit_offset: unit.offset(),
            });
        };

        let header = program.header();
        // DWARF 5 file tables start at index 0 (the unit's primary file);
        // drop it so that lookups are 1-based for every version.
        let skip = usize::from(header.version() >= 5);
        let mut files = Vec::with_capacity(header.file_names().len());
        for file in header.file_names().iter().skip(skip) {
            let name = self
                .dwarf
                .attr_string(dwarf_unit, file.path_name())
                .map_err(|err| map_dwarf_error("reading file name", err))?;
            files.push(String::from_utf8_lossy(&reader_bytes(&name)?).into_owned());
        }

        let mut states = Vec::new();
        let mut rows = program.rows();
        while let Some((_, row)) = rows
            .next_row()
            .map_err(|err| map_dwarf_error("running line program", err))?
        {
            states.push(LineState {
                address: row.address(),
                file: row.file_index(),
                line: row.line().map_or(0, |line| line.get()),
                end_sequence: row.end_sequence(),
            });
        }

        Ok(LineProgram::new(files, states))
    }

    fn read_location_list(&self, unit: &CompileUnit, offset: u64) -> Result<Vec<ListItem<LocationListEntry>>>
    {
        let (_, dwarf_unit) = self.unit_pair(unit.id())?;
        let mut raw = self
            .dwarf
            .raw_locations(dwarf_unit, LocationListsOffset(offset as usize))
            .map_err(|err| map_dwarf_error("opening location list", err))?;

        let mut items = Vec::new();
        while let Some(entry) = raw
            .next()
            .map_err(|err| map_dwarf_error("reading location list", err))?
        {
            let entry_of = |begin: u64, end: u64, data: &gimli::Expression<OwnedReader>| -> Result<LocationListEntry> {
                Ok(LocationListEntry {
                    begin_offset: begin,
                    end_offset: end,
                    expression: self.expression(unit, data)?,
                })
            };

            let item = match entry {
                RawLocListEntry::AddressOrOffsetPair { begin, end, data }
                | RawLocListEntry::OffsetPair { begin, end, data } => ListItem::Relative(entry_of(begin, end, &data)?),
                RawLocListEntry::StartEnd { begin, end, data } => ListItem::Absolute(entry_of(begin, end, &data)?),
                RawLocListEntry::StartLength { begin, length, data } => {
                    ListItem::Absolute(entry_of(begin, begin.wrapping_add(length), &data)?)
                }
                RawLocListEntry::StartxEndx { begin, end, data } => ListItem::Absolute(entry_of(
                    self.address_index(dwarf_unit, begin)?,
                    self.address_index(dwarf_unit, end)?,
                    &data,
                )?),
                RawLocListEntry::StartxLength { begin, length, data } => {
                    let begin = self.address_index(dwarf_unit, begin)?;
                    ListItem::Absolute(entry_of(begin, begin.wrapping_add(length), &data)?)
                }
                RawLocListEntry::BaseAddress { addr } => ListItem::BaseAddressSelection { address: addr },
                RawLocListEntry::BaseAddressx { addr } => ListItem::BaseAddressSelection {
                    address: self.address_index(dwarf_unit, addr)?,
                },
                RawLocListEntry::DefaultLocation { .. } => {
                    tracing::trace!(offset, "skipping default location entry");
                    continue;
                }
            };
            items.push(item);
        }
        Ok(items)
    }

    fn read_range_list(&self, unit: &CompileUnit, offset: u64) -> Result<Option<Vec<ListItem<RangeListEntry>>>>
    {
        let section = if unit.version() >= 5 {
            ".debug_rnglists"
        } else {
            ".debug_ranges"
        };
        if !self.has_section(section) {
            return Ok(None);
        }

        let (_, dwarf_unit) = self.unit_pair(unit.id())?;
        let mut raw = self
            .dwarf
            .raw_ranges(dwarf_unit, RangeListsOffset(offset as usize))
            .map_err(|err| map_dwarf_error("opening range list", err))?;

        let entry_of = |begin_offset: u64, end_offset: u64| RangeListEntry {
            begin_offset,
            end_offset,
        };

        let mut items = Vec::new();
        while let Some(entry) = raw
            .next()
            .map_err(|err| map_dwarf_error("reading range list", err))?
        {
            items.push(match entry {
                RawRngListEntry::AddressOrOffsetPair { begin, end } | RawRngListEntry::OffsetPair { begin, end } => {
                    ListItem::Relative(entry_of(begin, end))
                }
                RawRngListEntry::StartEnd { begin, end } => ListItem::Absolute(entry_of(begin, end)),
                RawRngListEntry::StartLength { begin, length } => {
                    ListItem::Absolute(entry_of(begin, begin.wrapping_add(length)))
                }
                RawRngListEntry::StartxEndx { begin, end } => ListItem::Absolute(entry_of(
                    self.address_index(dwarf_unit, begin)?,
                    self.address_index(dwarf_unit, end)?,
                )),
                RawRngListEntry::StartxLength { begin, length } => {
                    let begin = self.address_index(dwarf_unit, begin)?;
                    ListItem::Absolute(entry_of(begin, begin.wrapping_add(length)))
                }
                RawRngListEntry::BaseAddress { addr } => ListItem::BaseAddressSelection { address: addr },
                RawRngListEntry::BaseAddressx { addr } => ListItem::BaseAddressSelection {
                    address: self.address_index(dwarf_unit, addr)?,
                },
            });
        }
        Ok(Some(items))
    }
}

fn section_reader(sections: &HashMap<&'static str, Arc<[u8]>>, endian: RunTimeEndian, id: SectionId) -> OwnedReader
{
    let data = sections
        .get(id.name())
        .cloned()
        .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
    EndianArcSlice::new(data, endian)
}

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> Result<Option<Arc<[u8]>>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| DieViewError::Object(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }
    Ok(None)
}

fn reader_bytes(reader: &OwnedReader) -> Result<Cow<'_, [u8]>>
{
    reader
        .to_slice()
        .map_err(|err| map_dwarf_error("reading section bytes", err))
}

/// Form-level value of an attribute, without consulting other sections.
///
/// Section offsets and bases stay integers; only string forms yield text.
fn plain_value(value: &AttributeValue<OwnedReader>) -> Result<AttrValue>
{
    let number = match value {
        AttributeValue::Block(data) => return Ok(AttrValue::Block(reader_bytes(data)?.into_owned())),
        AttributeValue::Exprloc(expression) => return Ok(AttrValue::Block(reader_bytes(&expression.0)?.into_owned())),
        AttributeValue::String(data) => return Ok(AttrValue::Text(reader_bytes(data)?.into_owned())),
        AttributeValue::Sdata(value) => return Ok(AttrValue::Signed(*value)),
        AttributeValue::Flag(value) => return Ok(AttrValue::Flag(*value)),
        AttributeValue::Addr(value)
        | AttributeValue::Data8(value)
        | AttributeValue::Udata(value)
        | AttributeValue::FileIndex(value)
        | AttributeValue::DebugTypesRef(DebugTypeSignature(value)) => *value,
        AttributeValue::Data1(value) => u64::from(*value),
        AttributeValue::Data2(value) => u64::from(*value),
        AttributeValue::Data4(value) => u64::from(*value),
        AttributeValue::SecOffset(offset)
        | AttributeValue::UnitRef(UnitOffset(offset))
        | AttributeValue::DebugInfoRef(DebugInfoOffset(offset))
        | AttributeValue::DebugInfoRefSup(DebugInfoOffset(offset))
        | AttributeValue::DebugLineRef(DebugLineOffset(offset))
        | AttributeValue::LocationListsRef(LocationListsOffset(offset))
        | AttributeValue::DebugStrRef(DebugStrOffset(offset))
        | AttributeValue::DebugStrRefSup(DebugStrOffset(offset)) => *offset as u64,
        AttributeValue::RangeListsRef(raw) => raw.0 as u64,
        AttributeValue::DebugLineStrRef(offset) => offset.0 as u64,
        AttributeValue::DebugAddrIndex(index) => index.0 as u64,
        AttributeValue::DebugLocListsIndex(index) => index.0 as u64,
        AttributeValue::DebugRngListsIndex(index) => index.0 as u64,
        AttributeValue::DebugStrOffsetsIndex(index) => index.0 as u64,
        AttributeValue::DebugAddrBase(base) => base.0 as u64,
        AttributeValue::DebugLocListsBase(base) => base.0 as u64,
        AttributeValue::DebugRngListsBase(base) => base.0 as u64,
        AttributeValue::DebugStrOffsetsBase(base) => base.0 as u64,
        AttributeValue::DebugMacinfoRef(offset) => offset.0 as u64,
        AttributeValue::DebugMacroRef(offset) => offset.0 as u64,
        AttributeValue::Language(language) => u64::from(language.0),
        AttributeValue::Encoding(encoding) => u64::from(encoding.0),
        AttributeValue::Accessibility(access) => u64::from(access.0),
        AttributeValue::Visibility(visibility) => u64::from(visibility.0),
        AttributeValue::Virtuality(virtuality) => u64::from(virtuality.0),
        AttributeValue::Inline(inline) => u64::from(inline.0),
        AttributeValue::CallingConvention(convention) => u64::from(convention.0),
        AttributeValue::IdentifierCase(case) => u64::from(case.0),
        AttributeValue::DecimalSign(sign) => u64::from(sign.0),
        AttributeValue::Endianity(endianity) => u64::from(endianity.0),
        AttributeValue::Ordering(ordering) => u64::from(ordering.0),
        AttributeValue::AddressClass(class) => class.0,
        AttributeValue::DwoId(id) => id.0,
    };
    Ok(AttrValue::Unsigned(number))
}
