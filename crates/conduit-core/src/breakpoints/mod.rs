//! Breakpoint handles and the function offset resolver.
//!
//! The bridge does not track breakpoints itself; the backend owns them. What
//! crosses into the bridge is a [`BreakpointHandle`]: the backend's id plus the
//! addresses the breakpoint bound to.

pub mod offset;

use std::fmt;

pub use offset::resolve_function_offset;

use crate::types::Address;

/// Unique identifier for a breakpoint managed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointId(u64);

impl BreakpointId
{
    /// Create a new identifier from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self
    {
        Self(value)
    }

    /// Get the raw numeric representation (useful for logging / errors).
    #[must_use]
    pub const fn raw(self) -> u64
    {
        self.0
    }
}

impl fmt::Display for BreakpointId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// A breakpoint as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointHandle
{
    /// Backend id, used to delete the breakpoint later.
    pub id: BreakpointId,
    /// Load addresses the breakpoint bound to, in backend order.
    pub locations: Vec<Address>,
}

impl BreakpointHandle
{
    /// Create a handle for breakpoint `id` bound to `locations`.
    pub fn new(id: BreakpointId, locations: Vec<Address>) -> Self
    {
        Self { id, locations }
    }

    /// Number of bound locations.
    #[must_use]
    pub fn num_locations(&self) -> usize
    {
        self.locations.len()
    }

    /// Address of the location at `index`, if it exists.
    #[must_use]
    pub fn location(&self, index: usize) -> Option<Address>
    {
        self.locations.get(index).copied()
    }
}
