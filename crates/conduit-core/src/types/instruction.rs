//! Instruction descriptors.
//!
//! Two shapes live here: [`RawInstruction`] is what the backend's disassembler
//! hands back, and [`InstructionInfo`] is what the bridge returns to clients after
//! it has attached symbol and line metadata and filled every gap with placeholders.

use std::fmt;

use super::{Address, LineEntry};

/// Text used for both mnemonic and operands of a placeholder instruction.
pub const PLACEHOLDER_TEXT: &str = "??";

/// An instruction decoded by the backend, before the bridge enriches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction
{
    /// Load address, `None` when the backend could not resolve it.
    pub address: Option<Address>,
    /// Encoded length in bytes.
    pub byte_size: u64,
    /// Opcode mnemonic (e.g. `mov`).
    pub mnemonic: String,
    /// Operand text in the requested flavor.
    pub operands: String,
    /// Disassembler comment, if any.
    pub comment: Option<String>,
}

impl RawInstruction
{
    /// Decoded instruction at `address`.
    pub fn new(address: Address, byte_size: u64, mnemonic: impl Into<String>, operands: impl Into<String>) -> Self
    {
        Self {
            address: Some(address),
            byte_size,
            mnemonic: mnemonic.into(),
            operands: operands.into(),
            comment: None,
        }
    }

    /// Builder-style comment setter.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self
    {
        self.comment = Some(comment.into());
        self
    }

    /// First address past this instruction, if both the address and the sum are
    /// representable.
    #[must_use]
    pub fn end_address(&self) -> Option<Address>
    {
        self.address.and_then(|address| address.checked_add(self.byte_size))
    }
}

/// One entry of a reconstructed instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionInfo
{
    /// Load address of the instruction.
    pub address: Address,
    /// Opcode mnemonic, `"??"` for placeholders.
    pub mnemonic: String,
    /// Operand text, `"??"` for placeholders.
    pub operands: String,
    /// Disassembler comment.
    pub comment: Option<String>,
    /// Name of the symbol starting exactly at `address`.
    pub symbol_name: Option<String>,
    /// Source position of `address`.
    pub line_entry: Option<LineEntry>,
    /// `false` for placeholders standing in for unmapped or undecodable bytes.
    pub is_valid: bool,
}

impl InstructionInfo
{
    /// Placeholder for an address that is unmapped or could not be decoded.
    pub fn placeholder(address: Address) -> Self
    {
        Self {
            address,
            mnemonic: PLACEHOLDER_TEXT.to_string(),
            operands: PLACEHOLDER_TEXT.to_string(),
            comment: None,
            symbol_name: None,
            line_entry: None,
            is_valid: false,
        }
    }

    /// Whether this entry stands in for bytes that produced no instruction.
    #[must_use]
    pub fn is_placeholder(&self) -> bool
    {
        !self.is_valid
    }
}

impl fmt::Display for InstructionInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}:  {} {}", self.address, self.mnemonic, self.operands)?;
        if let Some(comment) = &self.comment {
            write!(f, " ; {comment}")?;
        }
        Ok(())
    }
}

/// Mapping state of the region containing a probed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegionInfo
{
    /// First address past the region (exclusive).
    pub end: Address,
    /// Whether the region is backed by readable memory.
    pub mapped: bool,
}

impl MemoryRegionInfo
{
    /// A mapped region ending at `end`.
    #[must_use]
    pub const fn mapped(end: Address) -> Self
    {
        Self { end, mapped: true }
    }

    /// An unmapped hole ending at `end`.
    #[must_use]
    pub const fn unmapped(end: Address) -> Self
    {
        Self { end, mapped: false }
    }
}
