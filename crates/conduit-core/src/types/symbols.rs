//! Symbol, function and source line types.

use std::fmt;
use std::path::PathBuf;

use super::Address;

/// Source position attached to an address by the backend's line table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineEntry
{
    /// File name without its directory.
    pub file_name: String,
    /// Directory holding `file_name` (may be empty).
    pub directory: String,
    /// 1-based line number, 0 when the backend has no line.
    pub line: u32,
    /// 1-based column number, 0 when unknown.
    pub column: u32,
}

impl LineEntry
{
    /// Build an entry for `directory/file_name:line` with an unknown column.
    pub fn new(directory: impl Into<String>, file_name: impl Into<String>, line: u32) -> Self
    {
        Self {
            file_name: file_name.into(),
            directory: directory.into(),
            line,
            column: 0,
        }
    }

    /// Builder-style column setter.
    #[must_use]
    pub fn with_column(mut self, column: u32) -> Self
    {
        self.column = column;
        self
    }

    /// Full path of the source file (`directory` joined with `file_name`).
    pub fn path(&self) -> PathBuf
    {
        PathBuf::from(&self.directory).join(&self.file_name)
    }
}

impl fmt::Display for LineEntry
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:{}", self.path().display(), self.line)?;
        if self.column != 0 {
            write!(f, ":{}", self.column)?;
        }
        Ok(())
    }
}

/// A linker symbol as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo
{
    /// Symbol name as the backend presents it.
    pub name: String,
    /// Load address of the first byte of the symbol.
    pub start: Address,
    /// Load address one past the last byte, when known.
    pub end: Option<Address>,
}

impl SymbolInfo
{
    /// Symbol starting at `start` with unknown extent.
    pub fn new(name: impl Into<String>, start: Address) -> Self
    {
        Self {
            name: name.into(),
            start,
            end: None,
        }
    }
}

/// A function with debug information.
///
/// `end` points to the first address after the function body, matching how
/// debugger backends report function ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo
{
    /// Function name (possibly qualified).
    pub name: String,
    /// Load address of the function entry.
    pub start: Address,
    /// First load address past the function body.
    pub end: Address,
}

impl FunctionInfo
{
    /// Create a function descriptor for `[start, end)`.
    pub fn new(name: impl Into<String>, start: Address, end: Address) -> Self
    {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Address of the last byte that still belongs to the function.
    ///
    /// `None` for an empty range.
    #[must_use]
    pub fn last_address(&self) -> Option<Address>
    {
        if self.end > self.start {
            self.end.checked_sub(1)
        } else {
            None
        }
    }
}
