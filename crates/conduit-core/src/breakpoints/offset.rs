//! # Function Offset Breakpoints
//!
//! Editors let users ask for "a breakpoint N lines into function `foo`". The
//! backend only understands names and `file:line` locations, so the request is
//! resolved in two steps:
//!
//! 1. A transient breakpoint on the function name finds where `foo` lives. It is
//!    deleted again as soon as the function is known.
//! 2. The function's line range is read from the line table, the target line is
//!    checked against it, and a `file:line` breakpoint is created there.
//!
//! ## Overloads
//!
//! When several functions share the name, only the first bound location is
//! used, so the offset breakpoint lands in one overload only.

use tracing::{debug, warn};

use super::BreakpointHandle;
use crate::backend::{BreakpointControl, SymbolLookup};
use crate::error::OffsetBreakpointError;
use crate::types::{FunctionInfo, LineEntry};

/// Create a breakpoint `offset` lines after the first line of `symbol_name`.
///
/// Offset `0` targets the line right after the function's opening line, which is
/// where the first statement of the body usually is.
///
/// ## Errors
///
/// - `EmptySymbolName` before any backend call.
/// - `NoFunctionLocation` when the name bound nowhere.
/// - `NoFunctionFound` when the first location has no function with line
///   information.
/// - `PositionNotAvailable` when the target line is past the function's last line.
/// - `Backend` when the backend refused to create the location breakpoint.
pub fn resolve_function_offset<T>(
    target: &mut T,
    symbol_name: &str,
    offset: u32,
) -> Result<BreakpointHandle, OffsetBreakpointError>
where
    T: BreakpointControl + SymbolLookup + ?Sized,
{
    if symbol_name.is_empty() {
        return Err(OffsetBreakpointError::EmptySymbolName);
    }

    let transient = target.create_breakpoint_by_name(symbol_name)?;
    let Some(location) = transient.location(0) else {
        return Err(OffsetBreakpointError::NoFunctionLocation(symbol_name.to_string()));
    };
    if transient.num_locations() > 1 {
        debug!(
            symbol_name,
            locations = transient.num_locations(),
            "name bound to several functions, using the first"
        );
    }

    let function = target.function_at(location);
    if !target.delete_breakpoint(transient.id) {
        warn!(id = %transient.id, "transient breakpoint was already gone");
    }

    let no_function = || OffsetBreakpointError::NoFunctionFound(symbol_name.to_string());
    let function = function.ok_or_else(no_function)?;
    let (start, last_line) = line_range(target, &function).ok_or_else(no_function)?;

    let requested = start.line.saturating_add(offset).saturating_add(1);
    if requested > last_line {
        return Err(OffsetBreakpointError::PositionNotAvailable { requested, last_line });
    }

    let path = start.path();
    debug!(symbol_name, offset, path = %path.display(), line = requested, "placing offset breakpoint");
    Ok(target.create_breakpoint_by_location(&path, requested)?)
}

/// Line entry of the function entry and the line of its last byte.
fn line_range<T>(target: &T, function: &FunctionInfo) -> Option<(LineEntry, u32)>
where
    T: SymbolLookup + ?Sized,
{
    let start = target.line_entry_at(function.start)?;
    // `end` points past the function; its last byte belongs to the closing line.
    let last = target.line_entry_at(function.last_address()?)?;
    Some((start, last.line))
}
