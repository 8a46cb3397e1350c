//! Request/response envelope.
//!
//! Messages are adjacently tagged JSON objects:
//!
//! ```json
//! { "method": "read_instruction_infos", "params": { "address": 4198400, "count": 32 } }
//! { "result": "instruction_infos", "value": [ ... ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::records::{FrameInfoRecord, FunctionOffsetBreakpointRecord, InstructionInfoRecord};

/// Request sent from a client to the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Request
{
    /// Reconstruct `count` instructions starting at `address`
    ReadInstructionInfos
    {
        address: u64,
        count: u32,
        /// Empty selects the configured default flavor
        #[serde(default)]
        flavor: String,
    },
    /// Break `offset` lines into the body of `symbol_name`
    CreateFunctionOffsetBreakpoint
    {
        symbol_name: String,
        offset: u32,
    },
    /// Describe a registered frame; `fields` is a `FrameInfoFlags` mask
    GetFrameInfo
    {
        frame_id: u64,
        fields: u32,
    },
    /// Drop a frame id
    ReleaseFrame
    {
        frame_id: u64,
    },
    /// Drop one reference to a module id
    ReleaseModule
    {
        module_id: u64,
    },
}

/// Response sent from the bridge to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum Response
{
    /// Either exactly the requested number of instructions or none
    InstructionInfos(Vec<InstructionInfoRecord>),
    FunctionOffsetBreakpoint(FunctionOffsetBreakpointRecord),
    FrameInfo(FrameInfoRecord),
    Released,
    /// The request could not be served at all
    Error
    {
        message: String,
    },
}

impl Response
{
    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self
    {
        Self::Error {
            message: message.into(),
        }
    }
}
