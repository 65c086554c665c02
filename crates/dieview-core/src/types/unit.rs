//! Compile units and their memoised side tables.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use gimli::{Encoding, RunTimeEndian};
use once_cell::sync::OnceCell;

use super::die::{Die, UnitId};
use super::line::LineProgram;
use super::lists::{ListItem, LocationListEntry, RangeListEntry};
use crate::error::Result;
use crate::source::DwarfSource;

type LocationList = Arc<Vec<ListItem<LocationListEntry>>>;
type RangeList = Arc<Vec<ListItem<RangeListEntry>>>;

/// A compile unit: the scope of unit-relative references and the owner of
/// the line program and list caches.
///
/// The caches are filled on first access and never invalidated; the DWARF
/// data behind them is immutable.
#[derive(Debug)]
pub struct CompileUnit
{
    id: UnitId,
    offset: u64,
    size: u64,
    encoding: Encoding,
    endian: RunTimeEndian,
    root: Die,
    line_program: OnceCell<Arc<LineProgram>>,
    location_lists: RwLock<HashMap<u64, LocationList>>,
    range_lists: RwLock<HashMap<u64, Option<RangeList>>>,
}

impl CompileUnit
{
    /// `offset` is the unit header's position in `.debug_info` and `size` the
    /// header-inclusive length, so the unit spans `offset..offset + size`.
    pub fn new(id: UnitId, offset: u64, size: u64, encoding: Encoding, endian: RunTimeEndian, root: Die) -> Self
    {
        Self {
            id,
            offset,
            size,
            encoding,
            endian,
            root,
            line_program: OnceCell::new(),
            location_lists: RwLock::new(HashMap::new()),
            range_lists: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> UnitId
    {
        self.id
    }

    pub fn offset(&self) -> u64
    {
        self.offset
    }

    pub fn size(&self) -> u64
    {
        self.size
    }

    pub fn end_offset(&self) -> u64
    {
        self.offset.saturating_add(self.size)
    }

    /// Whether an absolute `.debug_info` offset falls inside this unit.
    pub fn contains(&self, offset: u64) -> bool
    {
        offset >= self.offset && offset < self.end_offset()
    }

    pub fn version(&self) -> u16
    {
        self.encoding.version
    }

    pub fn encoding(&self) -> Encoding
    {
        self.encoding
    }

    pub fn endian(&self) -> RunTimeEndian
    {
        self.endian
    }

    /// The unit's top-level DIE (`DW_TAG_compile_unit` or similar).
    pub fn root(&self) -> &Die
    {
        &self.root
    }

    /// The unit's line program, read from `source` on first use.
    ///
    /// ## Errors
    ///
    /// Propagates the source's error; a failed read is retried on the next call.
    pub fn line_program<S: DwarfSource + ?Sized>(&self, source: &S) -> Result<Arc<LineProgram>>
    {
        self.line_program
            .get_or_try_init(|| {
                tracing::debug!(unit = self.offset, "loading line program");
                source.read_line_program(self).map(Arc::new)
            })
            .cloned()
    }

    /// The location list at `offset`, read from `source` on first use.
    ///
    /// ## Errors
    ///
    /// Propagates the source's decoding error.
    pub fn location_list<S: DwarfSource + ?Sized>(&self, source: &S, offset: u64) -> Result<LocationList>
    {
        if let Some(list) = self
            .location_lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&offset)
        {
            return Ok(list.clone());
        }

        tracing::debug!(unit = self.offset, offset, "loading location list");
        let list = Arc::new(source.read_location_list(self, offset)?);
        self.location_lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(offset, list.clone());
        Ok(list)
    }

    /// The range list at `offset`, or `None` when the file has no range list
    /// section.
    ///
    /// ## Errors
    ///
    /// Propagates the source's decoding error.
    pub fn range_list<S: DwarfSource + ?Sized>(&self, source: &S, offset: u64) -> Result<Option<RangeList>>
    {
        if let Some(list) = self
            .range_lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&offset)
        {
            return Ok(list.clone());
        }

        tracing::debug!(unit = self.offset, offset, "loading range list");
        let list = source.read_range_list(self, offset)?.map(Arc::new);
        self.range_lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(offset, list.clone());
        Ok(list)
    }
}
