//! Target architecture.

use std::fmt;

/// Architecture of the debugged process
///
/// The instruction reader only needs one fact per architecture: the longest
/// encoding an instruction can have. That bounds how close to a page end an
/// instruction may start and still straddle into the next page.
///
/// ```rust
/// use conduit_core::types::Architecture;
///
/// assert_eq!(Architecture::X86_64.max_instruction_size(), 15);
/// assert_eq!(Architecture::Arm64.max_instruction_size(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture
{
    /// 64-bit x86 (Intel/AMD), variable-length encodings up to 15 bytes.
    #[default]
    X86_64,
    /// 64-bit ARM, fixed 4-byte encodings.
    Arm64,
}

impl Architecture
{
    /// Longest possible instruction encoding in bytes.
    #[must_use]
    pub const fn max_instruction_size(self) -> u64
    {
        match self {
            Architecture::X86_64 => 15,
            Architecture::Arm64 => 4,
        }
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Architecture::Arm64 => write!(f, "arm64"),
            Architecture::X86_64 => write!(f, "x86_64"),
        }
    }
}
