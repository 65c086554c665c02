//! Structural change reports for incremental table refresh.

use smallvec::SmallVec;

/// One change to the shape or content of the attribute table.
///
/// Ranges are inclusive, like the row/column notifications of table widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChange
{
    RowsInserted
    {
        first: usize,
        last: usize,
    },
    RowsRemoved
    {
        first: usize,
        last: usize,
    },
    ColumnsInserted
    {
        first: usize,
        last: usize,
    },
    ColumnsRemoved
    {
        first: usize,
        last: usize,
    },
    /// Cell contents in the rectangle must be re-read
    DataChanged
    {
        first_row: usize,
        last_row: usize,
        first_column: usize,
        last_column: usize,
    },
}

/// The changes produced by one view mutation, in the order they apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(SmallVec<[ModelChange; 4]>);

impl ChangeSet
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn push(&mut self, change: ModelChange)
    {
        self.0.push(change);
    }

    pub fn changes(&self) -> &[ModelChange]
    {
        &self.0
    }

    pub fn is_empty(&self) -> bool
    {
        self.0.is_empty()
    }

    /// Total number of rows inserted.
    pub fn rows_inserted(&self) -> usize
    {
        self.0
            .iter()
            .map(|change| match *change {
                ModelChange::RowsInserted { first, last } => last - first + 1,
                _ => 0,
            })
            .sum()
    }

    /// Total number of rows removed.
    pub fn rows_removed(&self) -> usize
    {
        self.0
            .iter()
            .map(|change| match *change {
                ModelChange::RowsRemoved { first, last } => last - first + 1,
                _ => 0,
            })
            .sum()
    }

    /// Whether any rows or columns were added or removed.
    pub fn is_structural(&self) -> bool
    {
        self.0
            .iter()
            .any(|change| !matches!(change, ModelChange::DataChanged { .. }))
    }

    pub fn has_data_change(&self) -> bool
    {
        self.0
            .iter()
            .any(|change| matches!(change, ModelChange::DataChanged { .. }))
    }
}

impl IntoIterator for ChangeSet
{
    type Item = ModelChange;
    type IntoIter = smallvec::IntoIter<[ModelChange; 4]>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.0.into_iter()
    }
}
