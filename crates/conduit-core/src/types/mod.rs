//! # Types
//!
//! Plain data shared by every component of the bridge.
//!
//! None of these types holds a backend handle. They are the values that are safe
//! to copy out of the backend and hand to the RPC layer.

pub mod address;
pub mod arch;
pub mod instruction;
pub mod symbols;

// Re-export all public types
pub use address::Address;
pub use arch::Architecture;
pub use instruction::{InstructionInfo, MemoryRegionInfo, RawInstruction, PLACEHOLDER_TEXT};
pub use symbols::{FunctionInfo, LineEntry, SymbolInfo};
