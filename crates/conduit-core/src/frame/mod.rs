//! # Frame Descriptors
//!
//! Builds the per-frame information a call stack window shows: the rendered
//! function name, language, module, code range and a few status bits. Callers
//! ask for fields with [`FrameInfoFlags`]; [`FrameInfo::valid_fields`] says which
//! ones could actually be filled.

pub mod format;

use std::fmt;

use bitflags::bitflags;
use tracing::trace;

pub use format::{format_arguments, format_function_name, strip_global_scope};

use crate::backend::StackFrame;
use crate::types::Address;

bitflags! {
    /// Frame fields a client can request.
    ///
    /// The bit values match the frame info flags of the Visual Studio debugger
    /// interface, so clients can pass their mask through unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameInfoFlags: u32 {
        /// Rendered function name.
        const FUNCNAME = 0x0000_0001;
        /// Return type (never filled).
        const RETURNTYPE = 0x0000_0002;
        /// Argument list (never filled).
        const ARGS = 0x0000_0004;
        /// Source language name.
        const LANGUAGE = 0x0000_0008;
        /// Module file name.
        const MODULE = 0x0000_0010;
        /// Code address range of the frame.
        const STACKRANGE = 0x0000_0020;
        /// Frame object.
        const FRAME = 0x0000_0040;
        /// Whether the module has debug information.
        const DEBUGINFO = 0x0000_0080;
        /// Whether the code is stale.
        const STALECODE = 0x0000_0100;
        /// Annotated frame (never filled).
        const ANNOTATEDFRAME = 0x0000_0200;
        /// Module handle.
        const DEBUG_MODULEP = 0x0000_0400;
        /// Format the function name (ignored).
        const FUNCNAME_FORMAT = 0x0000_0800;
        /// Return type in the function name (ignored).
        const FUNCNAME_RETURNTYPE = 0x0000_1000;
        /// Argument list in the function name.
        const FUNCNAME_ARGS = 0x0000_2000;
        /// Language in the function name (ignored).
        const FUNCNAME_LANGUAGE = 0x0000_4000;
        /// `module!` prefix on the function name.
        const FUNCNAME_MODULE = 0x0000_8000;
        /// ` Line N` suffix on the function name.
        const FUNCNAME_LINES = 0x0001_0000;
        /// Offset in the function name (ignored).
        const FUNCNAME_OFFSET = 0x0002_0000;
        /// Argument types in the argument list.
        const FUNCNAME_ARGS_TYPES = 0x0004_0000;
        /// Argument names in the argument list.
        const FUNCNAME_ARGS_NAMES = 0x0008_0000;
        /// Argument values in the argument list.
        const FUNCNAME_ARGS_VALUES = 0x0010_0000;
    }
}

/// Inclusive-exclusive code range of a frame, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange
{
    /// Lowest address.
    pub min: Address,
    /// Highest address (function or symbol end, or the pc itself).
    pub max: Address,
}

impl AddressRange
{
    /// Create a range from `min` to `max`.
    #[must_use]
    pub const fn new(min: Address, max: Address) -> Self
    {
        Self { min, max }
    }
}

impl fmt::Display for AddressRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Frame information for one frame, generic over the backend's module handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo<M>
{
    /// Fields that were requested and could be filled.
    pub valid_fields: FrameInfoFlags,
    /// Rendered function name.
    pub func_name: String,
    /// Source language name.
    pub language: String,
    /// Module file name.
    pub module_name: String,
    /// Code range of the frame.
    pub stack_range: Option<AddressRange>,
    /// Whether the frame's module has debug information.
    pub has_debug_info: bool,
    /// Whether the frame executes stale code (always `false`).
    pub stale_code: bool,
    /// Backend handle of the frame's module.
    pub module: Option<M>,
}

impl<M> Default for FrameInfo<M>
{
    fn default() -> Self
    {
        Self {
            valid_fields: FrameInfoFlags::empty(),
            func_name: String::new(),
            language: String::new(),
            module_name: String::new(),
            stack_range: None,
            has_debug_info: false,
            stale_code: false,
            module: None,
        }
    }
}

/// Collect the `fields` of `frame`.
///
/// Fields that cannot be determined are left at their defaults and stay out of
/// `valid_fields`. Flags without a meaning here (return type, annotated frame,
/// and the ignored name modifiers) are accepted and never reported valid.
pub fn get_frame_info<F>(frame: &F, fields: FrameInfoFlags) -> FrameInfo<F::Module>
where
    F: StackFrame + ?Sized,
{
    let mut info = FrameInfo::default();

    if fields.contains(FrameInfoFlags::FUNCNAME) {
        info.func_name = format_function_name(frame, fields);
        info.valid_fields |= FrameInfoFlags::FUNCNAME;
    }

    if fields.contains(FrameInfoFlags::LANGUAGE) {
        if let Some(function) = frame.function() {
            if !function.language.is_empty() {
                info.language = function.language;
                info.valid_fields |= FrameInfoFlags::LANGUAGE;
            }
        }
    }

    if fields.contains(FrameInfoFlags::MODULE) {
        if let Some(name) = frame.module_file_name() {
            info.module_name = name;
            info.valid_fields |= FrameInfoFlags::MODULE;
        }
    }

    if fields.contains(FrameInfoFlags::STACKRANGE) {
        info.stack_range = physical_stack_range(frame);
        if info.stack_range.is_some() {
            info.valid_fields |= FrameInfoFlags::STACKRANGE;
        }
    }

    if fields.contains(FrameInfoFlags::FRAME) {
        info.valid_fields |= FrameInfoFlags::FRAME;
    }

    // Both module fields need the handle; fetch it once.
    let module = if fields.intersects(FrameInfoFlags::DEBUGINFO | FrameInfoFlags::DEBUG_MODULEP) {
        frame.module()
    } else {
        None
    };

    if fields.contains(FrameInfoFlags::DEBUGINFO) {
        info.has_debug_info = module.is_some() && frame.module_has_compile_units();
        info.valid_fields |= FrameInfoFlags::DEBUGINFO;
    }

    if fields.contains(FrameInfoFlags::STALECODE) {
        info.stale_code = false;
        info.valid_fields |= FrameInfoFlags::STALECODE;
    }

    if fields.contains(FrameInfoFlags::DEBUG_MODULEP) && module.is_some() {
        info.module = module;
        info.valid_fields |= FrameInfoFlags::DEBUG_MODULEP;
    }

    trace!(requested = fields.bits(), valid = info.valid_fields.bits(), "collected frame info");
    info
}

/// Code range of the frame: the function's range, else the symbol's, else the
/// pc alone.
pub fn physical_stack_range<F>(frame: &F) -> Option<AddressRange>
where
    F: StackFrame + ?Sized,
{
    let function_range = frame
        .function()
        .and_then(|function| Some(AddressRange::new(function.start?, function.end?)));

    function_range
        .or_else(|| frame.symbol_range().map(|(min, max)| AddressRange::new(min, max)))
        .or_else(|| {
            let pc = frame.pc();
            (pc != Address::INVALID).then_some(AddressRange::new(pc, pc))
        })
}
