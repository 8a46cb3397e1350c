//! Flat wire records.
//!
//! Records carry no backend handle and no `Option<String>`: a missing string is
//! sent as `""`, matching what clients of the bridge already expect. Handles are
//! replaced by stable ids before a record is built.

use conduit_core::breakpoints::BreakpointHandle;
use conduit_core::error::OffsetBreakpointError;
use conduit_core::frame::FrameInfo;
use conduit_core::store::ObjectId;
use conduit_core::types::{InstructionInfo, LineEntry};
use serde::{Deserialize, Serialize};

/// Source position on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntryRecord
{
    pub file_name: String,
    pub directory: String,
    pub line: u32,
    pub column: u32,
}

impl From<&LineEntry> for LineEntryRecord
{
    fn from(entry: &LineEntry) -> Self
    {
        Self {
            file_name: entry.file_name.clone(),
            directory: entry.directory.clone(),
            line: entry.line,
            column: entry.column,
        }
    }
}

/// One reconstructed instruction on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionInfoRecord
{
    pub address: u64,
    pub mnemonic: String,
    pub operands: String,
    pub comment: String,
    pub symbol_name: String,
    /// Absent when the address has no line information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_entry: Option<LineEntryRecord>,
}

impl From<&InstructionInfo> for InstructionInfoRecord
{
    fn from(info: &InstructionInfo) -> Self
    {
        Self {
            address: info.address.value(),
            mnemonic: info.mnemonic.clone(),
            operands: info.operands.clone(),
            comment: info.comment.clone().unwrap_or_default(),
            symbol_name: info.symbol_name.clone().unwrap_or_default(),
            line_entry: info.line_entry.as_ref().map(LineEntryRecord::from),
        }
    }
}

/// Frame descriptor on the wire.
///
/// `addr_min`/`addr_max` are only meaningful when `valid_fields` contains the
/// stack range flag; `module_id` is the stable id of the frame's module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfoRecord
{
    pub valid_fields: u32,
    pub func_name: String,
    pub language: String,
    pub module_name: String,
    pub addr_min: u64,
    pub addr_max: u64,
    pub has_debug_info: bool,
    pub stale_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<u64>,
}

impl FrameInfoRecord
{
    /// Flatten `info`, substituting `module_id` for its module handle.
    pub fn new<M>(info: &FrameInfo<M>, module_id: Option<ObjectId>) -> Self
    {
        let (addr_min, addr_max) = info
            .stack_range
            .map_or((0, 0), |range| (range.min.value(), range.max.value()));

        Self {
            valid_fields: info.valid_fields.bits(),
            func_name: info.func_name.clone(),
            language: info.language.clone(),
            module_name: info.module_name.clone(),
            addr_min,
            addr_max,
            has_debug_info: info.has_debug_info,
            stale_code: info.stale_code,
            module_id: module_id.map(ObjectId::raw),
        }
    }
}

/// Outcome of a function offset breakpoint request, sent by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointErrorCode
{
    Success,
    NoFunctionLocation,
    NoFunctionFound,
    PositionNotAvailable,
    /// The request was rejected before reaching the backend.
    InvalidArgument,
    /// The backend failed to create or delete a breakpoint.
    Backend,
}

impl From<&OffsetBreakpointError> for BreakpointErrorCode
{
    fn from(error: &OffsetBreakpointError) -> Self
    {
        match error {
            OffsetBreakpointError::EmptySymbolName => Self::InvalidArgument,
            OffsetBreakpointError::NoFunctionLocation(_) => Self::NoFunctionLocation,
            OffsetBreakpointError::NoFunctionFound(_) => Self::NoFunctionFound,
            OffsetBreakpointError::PositionNotAvailable { .. } => Self::PositionNotAvailable,
            OffsetBreakpointError::Backend(_) => Self::Backend,
        }
    }
}

/// Reply to a function offset breakpoint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionOffsetBreakpointRecord
{
    pub error: BreakpointErrorCode,
    /// Id of the created breakpoint, present only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint_id: Option<u64>,
    /// Human readable reason, empty on success.
    pub message: String,
}

impl From<std::result::Result<BreakpointHandle, OffsetBreakpointError>> for FunctionOffsetBreakpointRecord
{
    fn from(result: std::result::Result<BreakpointHandle, OffsetBreakpointError>) -> Self
    {
        match result {
            Ok(handle) => Self {
                error: BreakpointErrorCode::Success,
                breakpoint_id: Some(handle.id.raw()),
                message: String::new(),
            },
            Err(error) => Self {
                error: BreakpointErrorCode::from(&error),
                breakpoint_id: None,
                message: error.to_string(),
            },
        }
    }
}
