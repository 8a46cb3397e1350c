//! # Instruction Reconstruction
//!
//! Turns "give me `count` instructions starting at `address`" into exactly
//! `count` [`InstructionInfo`] entries, no matter what the target memory looks
//! like.
//!
//! ## How it works
//!
//! The reader walks a cursor forward one page at a time:
//!
//! 1. The [`RegionProbe`] tells it whether the page under the cursor is mapped.
//! 2. Unmapped memory is padded with one `"??"` placeholder per byte, up to the end
//!    of the hole or the requested count.
//! 3. Mapped memory is read up to the page end and handed to the backend's
//!    disassembler.
//! 4. An instruction that starts in the last few bytes of a page may continue on
//!    the next one. The reader asks the backend to decode it directly from target
//!    memory and keeps it if it really crosses the boundary.
//! 5. Anything else the disassembler stopped on becomes a single one-byte
//!    placeholder, and decoding resumes at the following byte.
//!
//! ## Failure
//!
//! The result is all or nothing. A failed region query, a read that returns no
//! bytes, or an instruction without a load address abandons the pass and the
//! caller gets an empty list. Partial streams would show gaps as if they were
//! code.

pub mod probe;

use tracing::{debug, trace, warn};

pub use probe::RegionProbe;

use crate::backend::InstructionSource;
use crate::error::{BridgeError, Result};
use crate::types::{Address, Architecture, InstructionInfo, RawInstruction};

/// Page geometry used by the instruction reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig
{
    page_size: u64,
    max_instruction_size: u64,
}

impl ReaderConfig
{
    /// Page size used when none is configured.
    pub const DEFAULT_PAGE_SIZE: u64 = 4096;

    /// Create a validated configuration.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` unless `page_size` is a power of two and
    /// `max_instruction_size` is non-zero and smaller than a page.
    pub fn new(page_size: u64, max_instruction_size: u64) -> Result<Self>
    {
        if !page_size.is_power_of_two() {
            return Err(BridgeError::InvalidArgument(format!(
                "page size must be a power of two, got {page_size}"
            )));
        }
        if max_instruction_size == 0 || max_instruction_size >= page_size {
            return Err(BridgeError::InvalidArgument(format!(
                "max instruction size must be between 1 and {}, got {max_instruction_size}",
                page_size - 1
            )));
        }
        Ok(Self {
            page_size,
            max_instruction_size,
        })
    }

    /// Default page size with the longest encoding of `architecture`.
    #[must_use]
    pub const fn for_architecture(architecture: Architecture) -> Self
    {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            max_instruction_size: architecture.max_instruction_size(),
        }
    }

    /// Page size in bytes.
    #[must_use]
    pub const fn page_size(&self) -> u64
    {
        self.page_size
    }

    /// Longest instruction encoding in bytes.
    #[must_use]
    pub const fn max_instruction_size(&self) -> u64
    {
        self.max_instruction_size
    }
}

impl Default for ReaderConfig
{
    fn default() -> Self
    {
        Self::for_architecture(Architecture::default())
    }
}

/// Reconstructs gap-free instruction streams from a target.
///
/// The reader borrows the target for the duration of a request and holds no
/// state between calls.
///
/// ```rust,ignore
/// let reader = InstructionReader::new(&target);
/// let listing = reader.read_instruction_infos(Address::new(0x401000), 32, "intel");
/// assert!(listing.is_empty() || listing.len() == 32);
/// ```
#[derive(Debug)]
pub struct InstructionReader<'a, T: ?Sized>
{
    target: &'a T,
    config: ReaderConfig,
}

impl<'a, T> InstructionReader<'a, T>
where
    T: InstructionSource + ?Sized,
{
    /// Reader with the default x86-64 page geometry.
    pub fn new(target: &'a T) -> Self
    {
        Self::with_config(target, ReaderConfig::default())
    }

    /// Reader with an explicit page geometry.
    pub fn with_config(target: &'a T, config: ReaderConfig) -> Self
    {
        Self { target, config }
    }

    /// Read exactly `count` instructions starting at `start`.
    ///
    /// Returns an empty list when the pass had to be abandoned (see the module
    /// docs); any other result has exactly `count` entries in strictly increasing
    /// address order.
    pub fn read_instruction_infos(&self, start: Address, count: usize, flavor: &str) -> Vec<InstructionInfo>
    {
        if count == 0 {
            return Vec::new();
        }

        match self.reconstruct(start, count, flavor) {
            Ok(instructions) => {
                debug!(
                    %start,
                    count,
                    placeholders = instructions.iter().filter(|i| i.is_placeholder()).count(),
                    "reconstructed instruction stream"
                );
                instructions
            }
            Err(error) => {
                warn!(%start, count, %error, "instruction read abandoned");
                Vec::new()
            }
        }
    }

    fn reconstruct(&self, start: Address, count: usize, flavor: &str) -> Result<Vec<InstructionInfo>>
    {
        let mut probe = RegionProbe::new(self.target, self.config.page_size);
        // `count` comes from the client; grow past one page worth on demand.
        let page_capacity = usize::try_from(self.config.page_size).unwrap_or(usize::MAX);
        let mut instructions = Vec::with_capacity(count.min(page_capacity));
        let mut cursor = start;

        while instructions.len() < count {
            let region = probe.probe(cursor)?;
            if region.mapped {
                cursor = self.read_page(&mut instructions, cursor, count, flavor)?;
            } else {
                let remaining = u64::try_from(count - instructions.len()).unwrap_or(u64::MAX);
                cursor = pad_unmapped(&mut instructions, cursor, remaining, region.end)?;
            }
        }

        Ok(instructions)
    }

    /// Decode the mapped page under `cursor` and return where the next pass
    /// iteration starts.
    ///
    /// The last page of the address space cannot be read: its end is not a
    /// representable address, so the pass ends with `AddressOverflow`.
    fn read_page(
        &self,
        instructions: &mut Vec<InstructionInfo>,
        mut cursor: Address,
        count: usize,
        flavor: &str,
    ) -> Result<Address>
    {
        let page_end = cursor
            .page_end(self.config.page_size)
            .ok_or(BridgeError::AddressOverflow(cursor))?;
        let length = usize::try_from(cursor.distance_to(page_end)).map_err(|_| BridgeError::AddressOverflow(cursor))?;

        let mut bytes = vec![0u8; length];
        let read = self.target.read_memory(cursor, &mut bytes)?;
        bytes.truncate(read);

        let remaining = count - instructions.len();
        for raw in self
            .target
            .disassemble(cursor, &bytes, remaining, flavor)
            .into_iter()
            .take(remaining)
        {
            let (info, end) = self.describe(raw)?;
            instructions.push(info);
            cursor = cursor.max(end);
        }

        if instructions.len() >= count || cursor >= page_end {
            return Ok(cursor);
        }

        if cursor.distance_to(page_end) < self.config.max_instruction_size {
            if let Some(end) = self.read_boundary_instruction(instructions, cursor, flavor)? {
                return Ok(end);
            }
        }

        trace!(%cursor, "no decodable instruction, inserting placeholder");
        instructions.push(InstructionInfo::placeholder(cursor));
        cursor.checked_add(1).ok_or(BridgeError::AddressOverflow(cursor))
    }

    /// Try to decode one instruction at `cursor` that runs into the next page.
    ///
    /// Returns the address after it when it was accepted.
    fn read_boundary_instruction(
        &self,
        instructions: &mut Vec<InstructionInfo>,
        cursor: Address,
        flavor: &str,
    ) -> Result<Option<Address>>
    {
        let Some(raw) = self.target.read_instructions(cursor, 1, flavor).into_iter().next() else {
            return Ok(None);
        };

        let (info, end) = self.describe(raw)?;
        let page_size = self.config.page_size;
        if info.address != cursor || end.page(page_size) == cursor.page(page_size) {
            return Ok(None);
        }

        trace!(address = %info.address, %end, "accepted page boundary instruction");
        instructions.push(info);
        Ok(Some(end))
    }

    /// Attach symbol and line metadata, returning the entry and its end address.
    fn describe(&self, raw: RawInstruction) -> Result<(InstructionInfo, Address)>
    {
        let address = raw.address.ok_or(BridgeError::UnresolvedInstructionAddress)?;
        let end = address
            .checked_add(raw.byte_size)
            .ok_or(BridgeError::AddressOverflow(address))?;

        // Interior addresses never carry the symbol name.
        let symbol_name = self
            .target
            .symbol_at(address)
            .filter(|symbol| symbol.start == address)
            .map(|symbol| symbol.name);

        let info = InstructionInfo {
            address,
            mnemonic: raw.mnemonic,
            operands: raw.operands,
            comment: raw.comment,
            symbol_name,
            line_entry: self.target.line_entry_at(address),
            is_valid: true,
        };
        Ok((info, end))
    }
}

/// Fill an unmapped hole with placeholders and return the new cursor.
///
/// A region that does not reach past the cursor still yields one placeholder, so
/// the pass always moves forward.
fn pad_unmapped(
    instructions: &mut Vec<InstructionInfo>,
    cursor: Address,
    remaining: u64,
    region_end: Address,
) -> Result<Address>
{
    let limit = cursor.saturating_add(remaining).min(region_end);
    let end = if limit > cursor {
        limit
    } else {
        cursor.checked_add(1).ok_or(BridgeError::AddressOverflow(cursor))?
    };

    trace!(%cursor, %end, "padding unmapped memory");
    instructions.extend((cursor.value()..end.value()).map(|address| InstructionInfo::placeholder(Address::new(address))));
    Ok(end)
}
