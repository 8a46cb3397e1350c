//! # Error Types
//!
//! General error handling for the bridge.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::store::ObjectId;
use crate::types::Address;

/// Main error type for bridge operations
///
/// ## Error Categories
///
/// 1. **Not-found errors**: ObjectNotFound. Always recoverable; the caller decides
///    what to tell the client.
/// 2. **Backend I/O errors**: MemoryRegion, MemoryRead, Backend. Fatal to the
///    current request only.
/// 3. **Invariant errors**: UnresolvedInstructionAddress, AddressOverflow. The
///    request cannot produce a trustworthy answer.
/// 4. **Argument errors**: InvalidArgument. Raised before any backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError
{
    /// No live object is registered under the given stable id
    ///
    /// Raised both for ids that were never issued and for ids whose last
    /// reference has been removed. Callers must not try to tell the two apart.
    #[error("Object not found in store: id {0}")]
    ObjectNotFound(ObjectId),

    /// Invalid argument passed to a bridge function
    ///
    /// Examples:
    /// - Empty symbol name for an offset breakpoint
    /// - A page size of zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The backend could not describe the memory region containing `address`
    #[error("Failed to query memory region at {address}: {details}")]
    MemoryRegion
    {
        /// Address that was probed
        address: Address,
        /// Backend-provided description
        details: String,
    },

    /// Reading target memory returned no bytes at all
    #[error("Failed to read memory at {address}: {details}")]
    MemoryRead
    {
        /// First address of the failed read
        address: Address,
        /// Backend-provided description
        details: String,
    },

    /// The disassembler produced an instruction whose load address could not be
    /// resolved
    ///
    /// This means the start address handed to the reader was not a valid load
    /// address, so nothing in the pass can be trusted.
    #[error("Unable to resolve the load address of a disassembled instruction")]
    UnresolvedInstructionAddress,

    /// Walking forward from the given address would wrap the address space
    #[error("Address arithmetic overflowed at {0}")]
    AddressOverflow(Address),

    /// Any other failure reported by the native debugger backend
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for `Result<T, BridgeError>`
///
/// ```rust
/// use conduit_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Reasons a "function + line offset" breakpoint could not be placed
///
/// Each variant maps to a distinct message in the client, so they are kept
/// separate instead of collapsing into a generic failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetBreakpointError
{
    /// The symbol name was empty; no backend call was made.
    #[error("Symbol name must not be empty")]
    EmptySymbolName,

    /// The name breakpoint bound to zero locations
    #[error("No location found for function '{0}'")]
    NoFunctionLocation(String),

    /// The first bound location does not belong to a function with line
    /// information
    #[error("No function found for '{0}'")]
    NoFunctionFound(String),

    /// The requested line lies past the last line of the function
    #[error("Line {requested} is outside of the function (last line is {last_line})")]
    PositionNotAvailable
    {
        /// Line the offset resolved to
        requested: u32,
        /// Last line of the function body
        last_line: u32,
    },

    /// The backend refused to create or delete a breakpoint
    #[error(transparent)]
    Backend(#[from] BridgeError),
}
