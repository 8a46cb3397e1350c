//! Page-granular memory region probe.

use tracing::trace;

use crate::backend::ProcessMemory;
use crate::error::Result;
use crate::types::{Address, MemoryRegionInfo};

/// Answers "is this address mapped, and where does its region end?" for one
/// reconstruction pass.
///
/// Region queries are expensive on real backends, so the probe remembers the
/// last page it checked and only asks the backend again once the cursor enters a
/// different page (or walks past the end of the cached region, which only
/// happens when a backend reports regions that are not page aligned).
///
/// A probe is scoped to a single pass and must not be reused across requests:
/// memory may be remapped between them.
#[derive(Debug)]
pub struct RegionProbe<'a, M: ?Sized>
{
    memory: &'a M,
    page_size: u64,
    last: Option<(u64, MemoryRegionInfo)>,
}

impl<'a, M> RegionProbe<'a, M>
where
    M: ProcessMemory + ?Sized,
{
    /// Create a probe over `memory` using pages of `page_size` bytes.
    ///
    /// `page_size` must be non-zero; [`ReaderConfig`](super::ReaderConfig)
    /// guarantees this.
    pub fn new(memory: &'a M, page_size: u64) -> Self
    {
        Self {
            memory,
            page_size,
            last: None,
        }
    }

    /// Describe the region containing `address`.
    ///
    /// ## Errors
    ///
    /// Whatever the backend reported. The caller must abandon the pass.
    pub fn probe(&mut self, address: Address) -> Result<MemoryRegionInfo>
    {
        let page = address.page(self.page_size);
        if let Some((last_page, region)) = self.last {
            if last_page == page && address < region.end {
                return Ok(region);
            }
        }

        let region = self.memory.memory_region_info(address)?;
        trace!(%address, page, end = %region.end, mapped = region.mapped, "probed memory region");
        self.last = Some((page, region));
        Ok(region)
    }
}
