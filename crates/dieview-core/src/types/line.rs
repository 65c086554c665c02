//! Line-number program data.

use crate::error::{DieViewError, Result};

/// One emitting state of the line-number state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState
{
    pub address: u64,
    /// 1-based index into [`LineProgram::files`]; 0 means no file.
    pub file: u64,
    /// Source line, 0 when unknown
    pub line: u64,
    pub end_sequence: bool,
}

/// A unit's line-number program, replayed into its emitting states.
///
/// The file table is 1-based: `files[i - 1]` names file `i`. For DWARF 5
/// programs the access layer drops the zeroth entry so the same lookup
/// applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineProgram
{
    files: Vec<String>,
    states: Vec<LineState>,
}

impl LineProgram
{
    pub fn new(files: Vec<String>, states: Vec<LineState>) -> Self
    {
        Self { files, states }
    }

    pub fn files(&self) -> &[String]
    {
        &self.files
    }

    pub fn states(&self) -> &[LineState]
    {
        &self.states
    }

    /// Look up a file by its 1-based index. Index 0 yields `None`.
    ///
    /// ## Errors
    ///
    /// Returns `MalformedLineEntry` when a non-zero index is past the end of
    /// the file table.
    pub fn file_name(&self, index: u64) -> Result<Option<&str>>
    {
        if index == 0 {
            return Ok(None);
        }
        usize::try_from(index - 1)
            .ok()
            .and_then(|slot| self.files.get(slot))
            .map(|name| Some(name.as_str()))
            .ok_or(DieViewError::MalformedLineEntry {
                index,
                file_count: self.files.len(),
            })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_file_name_is_one_based()
    {
        let program = LineProgram::new(vec!["a.c".to_string(), "b.h".to_string()], Vec::new());
        assert_eq!(program.file_name(0).unwrap(), None);
        assert_eq!(program.file_name(1).unwrap(), Some("a.c"));
        assert_eq!(program.file_name(2).unwrap(), Some("b.h"));
    }

    #[test]
    fn test_file_name_out_of_range()
    {
        let program = LineProgram::new(vec!["a.c".to_string()], Vec::new());
        let err = program.file_name(3).unwrap_err();
        assert!(matches!(
            err,
            DieViewError::MalformedLineEntry {
                index: 3,
                file_count: 1
            }
        ));
    }
}
