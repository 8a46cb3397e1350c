//! In-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use conduit_core::backend::{BreakpointControl, Disassembler, FrameFunction, ProcessMemory, StackFrame, SymbolLookup};
use conduit_core::breakpoints::{BreakpointHandle, BreakpointId};
use conduit_core::error::{BridgeError, Result};
use conduit_core::types::{Address, FunctionInfo, LineEntry, MemoryRegionInfo, RawInstruction, SymbolInfo};

pub const PAGE_SIZE: u64 = 4096;

#[derive(Debug, Clone, Copy)]
pub struct Region
{
    pub start: u64,
    pub end: u64,
    pub mapped: bool,
}

/// Fake target: memory regions, a table of decodable instructions, symbols,
/// line entries and breakpoints. Every backend call is recorded.
#[derive(Debug, Default)]
pub struct FakeTarget
{
    pub regions: Vec<Region>,
    pub fail_region_query: bool,
    pub fail_reads: bool,
    /// Reads stop short at this address and fail when starting at or past it.
    pub readable_until: Option<u64>,
    /// Decodable instructions keyed by the address they are decoded at.
    pub instructions: BTreeMap<u64, RawInstruction>,
    pub symbols: Vec<SymbolInfo>,
    pub functions: Vec<FunctionInfo>,
    pub lines: BTreeMap<u64, LineEntry>,

    pub name_locations: HashMap<String, Vec<Address>>,
    pub fail_location_breakpoints: bool,
    next_breakpoint: u64,
    pub live_breakpoints: Vec<BreakpointId>,
    pub deleted_breakpoints: Vec<BreakpointId>,
    pub location_breakpoints: Vec<(PathBuf, u32)>,
    pub name_breakpoint_requests: Vec<String>,

    pub region_queries: RefCell<Vec<u64>>,
    pub reads: RefCell<Vec<(u64, usize)>>,
    pub disassemble_calls: RefCell<Vec<(u64, usize)>>,
    pub read_instructions_calls: RefCell<Vec<(u64, usize)>>,
}

impl FakeTarget
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add a region `[start, end)`.
    pub fn region(mut self, start: u64, end: u64, mapped: bool) -> Self
    {
        self.regions.push(Region { start, end, mapped });
        self
    }

    /// Add a decodable instruction at `address`.
    pub fn instruction(mut self, address: u64, size: u64, mnemonic: &str) -> Self
    {
        self.instructions.insert(
            address,
            RawInstruction::new(Address::new(address), size, mnemonic, format!("op{address:x}")),
        );
        self
    }

    /// Add `count` one-byte instructions starting at `start`.
    pub fn one_byte_instructions(mut self, start: u64, count: u64) -> Self
    {
        for address in start..start + count {
            self = self.instruction(address, 1, "nop");
        }
        self
    }

    pub fn symbol(mut self, name: &str, start: u64, end: u64) -> Self
    {
        self.symbols.push(SymbolInfo {
            name: name.to_string(),
            start: Address::new(start),
            end: Some(Address::new(end)),
        });
        self
    }

    pub fn function(mut self, name: &str, start: u64, end: u64) -> Self
    {
        self.functions
            .push(FunctionInfo::new(name, Address::new(start), Address::new(end)));
        self
    }

    pub fn line(mut self, address: u64, directory: &str, file: &str, line: u32) -> Self
    {
        self.lines.insert(address, LineEntry::new(directory, file, line));
        self
    }

    pub fn name_bound_to(mut self, name: &str, locations: &[u64]) -> Self
    {
        self.name_locations
            .insert(name.to_string(), locations.iter().copied().map(Address::new).collect());
        self
    }

    fn allocate_breakpoint(&mut self) -> BreakpointId
    {
        self.next_breakpoint += 1;
        let id = BreakpointId::from_raw(self.next_breakpoint);
        self.live_breakpoints.push(id);
        id
    }

    fn decode_from(&self, address: u64, limit: Option<u64>, max_count: usize) -> Vec<RawInstruction>
    {
        let mut decoded = Vec::new();
        let mut current = address;
        while decoded.len() < max_count {
            let Some(instruction) = self.instructions.get(&current) else {
                break;
            };
            let end = current + instruction.byte_size;
            if limit.is_some_and(|limit| end > limit) {
                break;
            }
            decoded.push(instruction.clone());
            if instruction.byte_size == 0 {
                break;
            }
            current = end;
        }
        decoded
    }
}

impl ProcessMemory for FakeTarget
{
    fn memory_region_info(&self, address: Address) -> Result<MemoryRegionInfo>
    {
        self.region_queries.borrow_mut().push(address.value());
        if self.fail_region_query {
            return Err(BridgeError::MemoryRegion {
                address,
                details: "region query failed".to_string(),
            });
        }
        self.regions
            .iter()
            .find(|region| region.start <= address.value() && address.value() < region.end)
            .map(|region| MemoryRegionInfo {
                end: Address::new(region.end),
                mapped: region.mapped,
            })
            .ok_or_else(|| BridgeError::MemoryRegion {
                address,
                details: "no region".to_string(),
            })
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> Result<usize>
    {
        self.reads.borrow_mut().push((address.value(), buffer.len()));
        if self.fail_reads {
            return Err(BridgeError::MemoryRead {
                address,
                details: "read failed".to_string(),
            });
        }
        let length = match self.readable_until {
            Some(limit) if address.value() >= limit => {
                return Err(BridgeError::MemoryRead {
                    address,
                    details: "past readable limit".to_string(),
                });
            }
            Some(limit) => buffer.len().min(usize::try_from(limit - address.value()).unwrap()),
            None => buffer.len(),
        };
        buffer[..length].fill(0x90);
        Ok(length)
    }
}

impl Disassembler for FakeTarget
{
    fn disassemble(&self, address: Address, bytes: &[u8], max_count: usize, _flavor: &str) -> Vec<RawInstruction>
    {
        self.disassemble_calls.borrow_mut().push((address.value(), bytes.len()));
        self.decode_from(address.value(), Some(address.value() + bytes.len() as u64), max_count)
    }

    fn read_instructions(&self, address: Address, count: usize, _flavor: &str) -> Vec<RawInstruction>
    {
        self.read_instructions_calls.borrow_mut().push((address.value(), count));
        self.decode_from(address.value(), None, count)
    }
}

impl SymbolLookup for FakeTarget
{
    fn symbol_at(&self, address: Address) -> Option<SymbolInfo>
    {
        self.symbols
            .iter()
            .find(|symbol| symbol.start <= address && symbol.end.map_or(true, |end| address < end))
            .cloned()
    }

    fn function_at(&self, address: Address) -> Option<FunctionInfo>
    {
        self.functions
            .iter()
            .find(|function| function.start <= address && address < function.end)
            .cloned()
    }

    fn line_entry_at(&self, address: Address) -> Option<LineEntry>
    {
        self.lines
            .range(..=address.value())
            .next_back()
            .map(|(_, entry)| entry.clone())
    }
}

impl BreakpointControl for FakeTarget
{
    fn create_breakpoint_by_name(&mut self, symbol_name: &str) -> Result<BreakpointHandle>
    {
        self.name_breakpoint_requests.push(symbol_name.to_string());
        let locations = self.name_locations.get(symbol_name).cloned().unwrap_or_default();
        let id = self.allocate_breakpoint();
        Ok(BreakpointHandle::new(id, locations))
    }

    fn create_breakpoint_by_location(&mut self, path: &Path, line: u32) -> Result<BreakpointHandle>
    {
        if self.fail_location_breakpoints {
            return Err(BridgeError::Backend("cannot bind location".to_string()));
        }
        self.location_breakpoints.push((path.to_path_buf(), line));
        let id = self.allocate_breakpoint();
        Ok(BreakpointHandle::new(id, Vec::new()))
    }

    fn delete_breakpoint(&mut self, id: BreakpointId) -> bool
    {
        let before = self.live_breakpoints.len();
        self.live_breakpoints.retain(|live| *live != id);
        self.deleted_breakpoints.push(id);
        before != self.live_breakpoints.len()
    }
}

/// Module handle used by [`FakeFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeModule
{
    pub file_name: String,
    pub build_id: String,
    pub has_compile_units: bool,
}

/// Fake stack frame with every backend answer spelled out.
#[derive(Debug, Clone, Default)]
pub struct FakeFrame
{
    pub function_name: Option<String>,
    pub function: Option<FrameFunction>,
    pub argument_values: Vec<String>,
    pub line_entry: Option<LineEntry>,
    pub module: Option<FakeModule>,
    pub symbol_range: Option<(Address, Address)>,
    pub pc: u64,
}

impl FakeFrame
{
    pub fn named(name: &str) -> Self
    {
        Self {
            function_name: Some(name.to_string()),
            pc: u64::MAX,
            ..Self::default()
        }
    }

    pub fn with_arguments(mut self, types: &[&str], names: &[&str], values: &[&str]) -> Self
    {
        let function = self.function.get_or_insert_with(FrameFunction::default);
        function.argument_types = types.iter().map(ToString::to_string).collect();
        function.argument_names = names.iter().map(ToString::to_string).collect();
        self.argument_values = values.iter().map(ToString::to_string).collect();
        self
    }

    pub fn in_module(mut self, file_name: &str, has_compile_units: bool) -> Self
    {
        self.module = Some(FakeModule {
            file_name: file_name.to_string(),
            build_id: format!("build-{file_name}"),
            has_compile_units,
        });
        self
    }

    pub fn at_line(mut self, line: u32) -> Self
    {
        self.line_entry = Some(LineEntry::new("/src", "main.cc", line));
        self
    }
}

impl StackFrame for FakeFrame
{
    type Module = FakeModule;

    fn function_name(&self) -> Option<String>
    {
        self.function_name.clone()
    }

    fn function(&self) -> Option<FrameFunction>
    {
        self.function.clone()
    }

    fn argument_values(&self) -> Vec<String>
    {
        self.argument_values.clone()
    }

    fn line_entry(&self) -> Option<LineEntry>
    {
        self.line_entry.clone()
    }

    fn module(&self) -> Option<FakeModule>
    {
        self.module.clone()
    }

    fn module_file_name(&self) -> Option<String>
    {
        self.module.as_ref().map(|module| module.file_name.clone())
    }

    fn module_has_compile_units(&self) -> bool
    {
        self.module.as_ref().is_some_and(|module| module.has_compile_units)
    }

    fn symbol_range(&self) -> Option<(Address, Address)>
    {
        self.symbol_range
    }

    fn pc(&self) -> Address
    {
        Address::new(self.pc)
    }
}
