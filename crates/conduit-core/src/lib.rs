//! # conduit-core
//!
//! The algorithmic core of the conduit debugging bridge.
//!
//! A native debugger backend keeps its processes, frames and modules as handles
//! that only mean something inside its own address space. This crate provides
//! the pieces that let a remote client work with them anyway:
//! - Identity stores that turn handles into stable ids ([`store`])
//! - Gap-free instruction listings over partially mapped memory ([`disasm`])
//! - "Function + line offset" breakpoints ([`breakpoints`])
//! - Call stack frame descriptors ([`frame`])
//!
//! ## Backends
//!
//! Nothing here talks to a real debugger. Every component is written against
//! the capability traits in [`backend`], which the hosting service implements.
//! All calls are synchronous; the only internal lock is the one inside each
//! identity store.

pub mod backend;
pub mod breakpoints;
pub mod disasm;
pub mod error;
pub mod frame;
pub mod prelude;
pub mod store;
pub mod types;

pub use backend::{BreakpointControl, Disassembler, InstructionSource, ProcessMemory, StackFrame, SymbolLookup};
pub use disasm::{InstructionReader, ReaderConfig};
// Re-export commonly used types
pub use error::{BridgeError, OffsetBreakpointError, Result};
pub use store::{ObjectId, ObjectStore, UniqueObjectStore};
pub use types::{Address, InstructionInfo};
