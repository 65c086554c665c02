//! Sub-tables produced by expanding an attribute.

/// A small read-only table: column headers and rows of display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTable
{
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl DetailTable
{
    pub(crate) fn new(headers: &[&'static str], rows: Vec<Vec<String>>) -> Self
    {
        Self {
            headers: headers.to_vec(),
            rows,
        }
    }

    pub fn headers(&self) -> &[&'static str]
    {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>]
    {
        &self.rows
    }

    pub fn row_count(&self) -> usize
    {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize
    {
        self.headers.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str>
    {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}
