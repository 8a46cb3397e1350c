//! Common module for library exports

pub use crate::backend::{
    BreakpointControl, Disassembler, FrameFunction, InstructionSource, ProcessMemory, StackFrame, SymbolLookup,
};
pub use crate::breakpoints::{resolve_function_offset, BreakpointHandle, BreakpointId};
pub use crate::disasm::{InstructionReader, ReaderConfig};
pub use crate::error::{BridgeError, OffsetBreakpointError, Result};
pub use crate::frame::{format_function_name, get_frame_info, AddressRange, FrameInfo, FrameInfoFlags};
pub use crate::store::{BuildIdComparer, HasBuildId, IdentityComparer, ObjectId, ObjectStore, UniqueObjectStore, ValueComparer};
pub use crate::types::{
    Address, Architecture, FunctionInfo, InstructionInfo, LineEntry, MemoryRegionInfo, RawInstruction, SymbolInfo,
};
