//! # Backend Capabilities
//!
//! The bridge never talks to a concrete native debugger. Each component asks for
//! the narrow capability it needs through one of these traits, and the embedding
//! service implements them on top of whatever backend it hosts.
//!
//! ## Why several small traits?
//!
//! - The instruction reader only needs memory, disassembly and symbol lookups.
//! - The offset resolver only needs symbol lookups and breakpoint control.
//! - The frame formatter only needs a single frame.
//!
//! Splitting them keeps test doubles small and makes it obvious which backend
//! calls a component can make.
//!
//! ## Failure model
//!
//! Backends report failure either by returning `None` / an empty list (the
//! object simply is not there) or by returning a [`BridgeError`](crate::error::BridgeError)
//! (the query itself failed). Query failures are fatal to the current request.

use std::path::Path;

use crate::breakpoints::BreakpointHandle;
use crate::breakpoints::BreakpointId;
use crate::error::Result;
use crate::types::{Address, FunctionInfo, LineEntry, MemoryRegionInfo, RawInstruction, SymbolInfo};

/// Read access to the target process's address space.
pub trait ProcessMemory
{
    /// Describe the region that contains `address`.
    ///
    /// Unmapped holes are regions too: the backend reports where the hole ends so
    /// the caller can skip it in one step.
    ///
    /// ## Errors
    ///
    /// `MemoryRegion` when the backend cannot answer.
    fn memory_region_info(&self, address: Address) -> Result<MemoryRegionInfo>;

    /// Read up to `buffer.len()` bytes starting at `address`.
    ///
    /// Returns the number of bytes actually read. A short read is not an error;
    /// the bytes that were read are valid.
    ///
    /// ## Errors
    ///
    /// `MemoryRead` when not a single byte could be read.
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> Result<usize>;
}

/// The backend's disassembler.
pub trait Disassembler
{
    /// Decode at most `max_count` instructions from `bytes`, which were read from
    /// `address`.
    ///
    /// Decoding stops at the first byte sequence that is not a valid instruction
    /// or at the end of the buffer, whichever comes first.
    fn disassemble(&self, address: Address, bytes: &[u8], max_count: usize, flavor: &str) -> Vec<RawInstruction>;

    /// Read target memory at `address` and decode at most `count` instructions.
    ///
    /// Unlike [`disassemble`](Self::disassemble) the backend reads the bytes
    /// itself, so the decoded instruction may extend past a page boundary.
    fn read_instructions(&self, address: Address, count: usize, flavor: &str) -> Vec<RawInstruction>;
}

/// Symbol and line table queries.
pub trait SymbolLookup
{
    /// Symbol containing `address`, if any.
    fn symbol_at(&self, address: Address) -> Option<SymbolInfo>;

    /// Function with debug information containing `address`, if any.
    fn function_at(&self, address: Address) -> Option<FunctionInfo>;

    /// Line table entry for `address`, if any.
    fn line_entry_at(&self, address: Address) -> Option<LineEntry>;
}

/// Stateful breakpoint operations.
///
/// These mutate the backend and take `&mut self`; callers that share a target
/// across threads must serialize them.
pub trait BreakpointControl
{
    /// Create a breakpoint on every function named `symbol_name`.
    ///
    /// The returned handle lists the locations the breakpoint bound to, which may
    /// be none.
    ///
    /// ## Errors
    ///
    /// `Backend` if the breakpoint could not be created at all.
    fn create_breakpoint_by_name(&mut self, symbol_name: &str) -> Result<BreakpointHandle>;

    /// Create a breakpoint at `path:line`.
    ///
    /// ## Errors
    ///
    /// `Backend` if the breakpoint could not be created.
    fn create_breakpoint_by_location(&mut self, path: &Path, line: u32) -> Result<BreakpointHandle>;

    /// Delete a breakpoint. Returns `false` if it did not exist.
    fn delete_breakpoint(&mut self, id: BreakpointId) -> bool;
}

/// Everything the instruction reader needs from a target.
pub trait InstructionSource: ProcessMemory + Disassembler + SymbolLookup {}

impl<T> InstructionSource for T where T: ProcessMemory + Disassembler + SymbolLookup {}

/// A single stack frame of a stopped thread.
///
/// `Module` is the backend's module handle. The frame formatter never looks
/// inside it; it only passes it on so the RPC layer can register it in a module
/// identity store.
pub trait StackFrame
{
    /// Backend module handle type.
    type Module;

    /// Raw function name as the backend prints it (may carry leading `::`).
    fn function_name(&self) -> Option<String>;

    /// Debug-info description of the frame's function.
    fn function(&self) -> Option<FrameFunction>;

    /// Rendered values of the function's arguments, in declaration order
    /// (including a leading `this` for methods).
    ///
    /// May be shorter than the parameter list when debug info is incomplete.
    fn argument_values(&self) -> Vec<String>;

    /// Line table entry of the frame's pc.
    fn line_entry(&self) -> Option<LineEntry>;

    /// Module the frame's pc belongs to.
    fn module(&self) -> Option<Self::Module>;

    /// File name (no directory) of the module's platform file.
    fn module_file_name(&self) -> Option<String>;

    /// Whether the module carries compile units (i.e. has debug info).
    fn module_has_compile_units(&self) -> bool;

    /// Range of the symbol containing the pc, as `(start, end)`.
    fn symbol_range(&self) -> Option<(Address, Address)>;

    /// Program counter, [`Address::INVALID`] when unknown.
    fn pc(&self) -> Address;
}

/// Debug-info view of the function a frame is executing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameFunction
{
    /// Type names of the declared parameters, excluding any implicit `this`.
    pub argument_types: Vec<String>,
    /// Parameter names in declaration order, including a leading `this` for
    /// methods.
    pub argument_names: Vec<String>,
    /// Source language name (e.g. `c++`), empty when unknown.
    pub language: String,
    /// Load address of the function entry, when known.
    pub start: Option<Address>,
    /// First load address past the function, when known.
    pub end: Option<Address>,
}
