//! Load address type.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed load address in the target process
///
/// This wrapper around `u64` keeps addresses apart from the other 64-bit numbers
/// that travel through the bridge (byte counts, stable ids, line numbers). Only the
/// raw value ever crosses the RPC boundary; the backend's own address objects never
/// do.
///
/// ## Pages
///
/// The instruction reader walks target memory page by page. [`Address::page`] and
/// [`Address::page_end`] do the integer arithmetic for a given page size so the
/// reader never has to repeat it.
///
/// ## Example
///
/// ```rust
/// use conduit_core::types::Address;
///
/// let addr = Address::from(0x1ffe);
/// assert_eq!(addr.page(4096), 1);
/// assert_eq!(addr.page_end(4096), Some(Address::from(0x2000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Sentinel the backend reports for "no valid program counter".
    pub const INVALID: Self = Address(u64::MAX);

    /// Create a new address from a `u64` value
    ///
    /// ```rust
    /// use conduit_core::types::Address;
    ///
    /// const TEXT_BASE: Address = Address::new(0x40_0000);
    /// assert_eq!(TEXT_BASE.value(), 0x40_0000);
    /// ```
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use conduit_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    #[must_use]
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    ///
    /// ```rust
    /// use conduit_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_sub(1), Some(Address::from(0xfff)));
    /// assert_eq!(addr.checked_sub(u64::MAX), None);
    /// ```
    #[must_use]
    pub fn checked_sub(self, offset: u64) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Add an offset to this address, saturating at the maximum value
    #[must_use]
    pub fn saturating_add(self, offset: u64) -> Self
    {
        Address(self.0.saturating_add(offset))
    }

    /// Index of the page containing this address.
    ///
    /// `page_size` must be non-zero.
    #[must_use]
    pub const fn page(self, page_size: u64) -> u64
    {
        self.0 / page_size
    }

    /// First address of the page after the one containing this address.
    ///
    /// Returns `None` for the last page of the address space, whose end is not
    /// representable.
    #[must_use]
    pub fn page_end(self, page_size: u64) -> Option<Self>
    {
        (self.page(page_size) + 1).checked_mul(page_size).map(Address)
    }

    /// Number of bytes from this address up to `other` (zero if `other` is lower).
    #[must_use]
    pub const fn distance_to(self, other: Address) -> u64
    {
        other.0.saturating_sub(self.0)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
