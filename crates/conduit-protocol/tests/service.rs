//! Tests for the bridge service

use std::path::{Path, PathBuf};
use std::thread;

use conduit_core::backend::{
    BreakpointControl, Disassembler, FrameFunction, ProcessMemory, StackFrame, SymbolLookup,
};
use conduit_core::breakpoints::{BreakpointHandle, BreakpointId};
use conduit_core::error::{BridgeError, Result};
use conduit_core::frame::FrameInfoFlags;
use conduit_core::store::{BuildIdComparer, HasBuildId, ObjectId};
use conduit_core::types::{Address, FunctionInfo, LineEntry, MemoryRegionInfo, RawInstruction, SymbolInfo};
use conduit_protocol::{BreakpointErrorCode, BridgeService, ProtocolError, Request, Response};
use conduit_utils::config::BridgeConfig;

const CODE_START: u64 = 0x1000;
const CODE_END: u64 = 0x2000;
const FUNCTION_END: u64 = 0x1010;
const SOURCE_DIR: &str = "/src";
const SOURCE_FILE: &str = "render.cpp";

/// One mapped page of one-byte `nop`s holding a single function `render`
/// spanning lines 20 to 24.
#[derive(Debug, Default)]
struct Target
{
    next_breakpoint: u64,
    live: Vec<BreakpointId>,
    location_requests: Vec<(PathBuf, u32)>,
}

fn nops(address: Address, count: usize) -> Vec<RawInstruction>
{
    (0..count as u64)
        .map(|i| RawInstruction::new(address + i, 1, "nop", ""))
        .collect()
}

impl ProcessMemory for Target
{
    fn memory_region_info(&self, address: Address) -> Result<MemoryRegionInfo>
    {
        Ok(match address.value() {
            a if a < CODE_START => MemoryRegionInfo::unmapped(Address::new(CODE_START)),
            a if a < CODE_END => MemoryRegionInfo::mapped(Address::new(CODE_END)),
            _ => MemoryRegionInfo::unmapped(Address::INVALID),
        })
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> Result<usize>
    {
        if !(CODE_START..CODE_END).contains(&address.value()) {
            return Err(BridgeError::MemoryRead {
                address,
                details: "unmapped".to_string(),
            });
        }
        let available = usize::try_from(CODE_END - address.value()).unwrap();
        let read = buffer.len().min(available);
        buffer[..read].fill(0x90);
        Ok(read)
    }
}

impl Disassembler for Target
{
    fn disassemble(&self, address: Address, bytes: &[u8], max_count: usize, _flavor: &str) -> Vec<RawInstruction>
    {
        nops(address, bytes.len().min(max_count))
    }

    fn read_instructions(&self, address: Address, count: usize, _flavor: &str) -> Vec<RawInstruction>
    {
        nops(address, count)
    }
}

impl SymbolLookup for Target
{
    fn symbol_at(&self, address: Address) -> Option<SymbolInfo>
    {
        (CODE_START..FUNCTION_END)
            .contains(&address.value())
            .then(|| SymbolInfo::new("render", Address::new(CODE_START)))
    }

    fn function_at(&self, address: Address) -> Option<FunctionInfo>
    {
        (CODE_START..FUNCTION_END).contains(&address.value()).then(|| {
            FunctionInfo::new("render", Address::new(CODE_START), Address::new(FUNCTION_END))
        })
    }

    fn line_entry_at(&self, address: Address) -> Option<LineEntry>
    {
        let line = match address.value() {
            a if (CODE_START..CODE_START + 8).contains(&a) => 20,
            a if (CODE_START + 8..FUNCTION_END).contains(&a) => 24,
            _ => return None,
        };
        Some(LineEntry::new(SOURCE_DIR, SOURCE_FILE, line))
    }
}

impl BreakpointControl for Target
{
    fn create_breakpoint_by_name(&mut self, symbol_name: &str) -> Result<BreakpointHandle>
    {
        self.next_breakpoint += 1;
        let id = BreakpointId::from_raw(self.next_breakpoint);
        self.live.push(id);
        let locations = if symbol_name == "render" {
            vec![Address::new(CODE_START)]
        } else {
            Vec::new()
        };
        Ok(BreakpointHandle::new(id, locations))
    }

    fn create_breakpoint_by_location(&mut self, path: &Path, line: u32) -> Result<BreakpointHandle>
    {
        self.next_breakpoint += 1;
        let id = BreakpointId::from_raw(self.next_breakpoint);
        self.live.push(id);
        self.location_requests.push((path.to_path_buf(), line));
        Ok(BreakpointHandle::new(id, vec![Address::new(CODE_START + 4)]))
    }

    fn delete_breakpoint(&mut self, id: BreakpointId) -> bool
    {
        let before = self.live.len();
        self.live.retain(|live| *live != id);
        self.live.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Module
{
    file_name: String,
    build_id: String,
}

impl HasBuildId for Module
{
    fn build_id(&self) -> String
    {
        self.build_id.clone()
    }
}

#[derive(Debug, Clone)]
struct Frame
{
    name: String,
    module: Module,
}

impl Frame
{
    fn new(name: &str, file_name: &str, build_id: &str) -> Self
    {
        Self {
            name: name.to_string(),
            module: Module {
                file_name: file_name.to_string(),
                build_id: build_id.to_string(),
            },
        }
    }
}

impl StackFrame for Frame
{
    type Module = Module;

    fn function_name(&self) -> Option<String>
    {
        Some(self.name.clone())
    }

    fn function(&self) -> Option<FrameFunction>
    {
        Some(FrameFunction {
            language: "c++".to_string(),
            start: Some(Address::new(CODE_START)),
            end: Some(Address::new(FUNCTION_END)),
            ..FrameFunction::default()
        })
    }

    fn argument_values(&self) -> Vec<String>
    {
        Vec::new()
    }

    fn line_entry(&self) -> Option<LineEntry>
    {
        None
    }

    fn module(&self) -> Option<Module>
    {
        Some(self.module.clone())
    }

    fn module_file_name(&self) -> Option<String>
    {
        Some(self.module.file_name.clone())
    }

    fn module_has_compile_units(&self) -> bool
    {
        true
    }

    fn symbol_range(&self) -> Option<(Address, Address)>
    {
        None
    }

    fn pc(&self) -> Address
    {
        Address::new(CODE_START)
    }
}

type Service = BridgeService<Target, Frame, BuildIdComparer>;

fn service() -> Service
{
    BridgeService::new(Target::default(), BuildIdComparer, BridgeConfig::default()).unwrap()
}

#[test]
fn test_invalid_geometry_is_rejected()
{
    let config = BridgeConfig {
        page_size: 1000,
        ..BridgeConfig::default()
    };
    let result = Service::new(Target::default(), BuildIdComparer, config);
    let error = result.err().unwrap();
    assert!(matches!(error, ProtocolError::Bridge(BridgeError::InvalidArgument(_))));
    assert!(format!("{}", error).contains("power of two"));

    let config = BridgeConfig {
        max_instruction_size: 0,
        ..BridgeConfig::default()
    };
    let error = Service::new(Target::default(), BuildIdComparer, config).err().unwrap();
    assert!(format!("{}", error).contains("max instruction size"));
}

#[test]
fn test_read_instructions_across_unmapped_prefix()
{
    let service = service();
    let records = service.read_instruction_infos(Address::new(CODE_START - 2), 4, "");

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].mnemonic, "??");
    assert_eq!(records[0].symbol_name, "");
    assert!(records[0].line_entry.is_none());
    assert_eq!(records[2].address, CODE_START);
    assert_eq!(records[2].mnemonic, "nop");
    assert_eq!(records[2].symbol_name, "render");
    assert_eq!(records[2].line_entry.as_ref().map(|entry| entry.line), Some(20));
    assert_eq!(records[3].symbol_name, "");
}

#[test]
fn test_offset_breakpoint_success()
{
    let service = service();
    let record = service.create_function_offset_breakpoint("render", 0);

    assert_eq!(record.error, BreakpointErrorCode::Success);
    assert_eq!(record.breakpoint_id, Some(2));
    assert!(record.message.is_empty());

    let (live, requests) = service.with_target(|target| (target.live.clone(), target.location_requests.clone()));
    assert_eq!(live, vec![BreakpointId::from_raw(2)]);
    assert_eq!(requests, vec![(PathBuf::from("/src/render.cpp"), 21)]);
}

#[test]
fn test_offset_breakpoint_errors()
{
    let service = service();

    let past_end = service.create_function_offset_breakpoint("render", 4);
    assert_eq!(past_end.error, BreakpointErrorCode::PositionNotAvailable);
    assert_eq!(past_end.breakpoint_id, None);
    assert!(past_end.message.contains("25"));

    let last_line = service.create_function_offset_breakpoint("render", 3);
    assert_eq!(last_line.error, BreakpointErrorCode::Success);

    let empty = service.create_function_offset_breakpoint("", 0);
    assert_eq!(empty.error, BreakpointErrorCode::InvalidArgument);
}

#[test]
fn test_frame_info_registers_module_once_per_build_id()
{
    let service = service();
    let first = service.register_frame(Frame::new("render", "/out/game", "ab12"));
    let second = service.register_frame(Frame::new("update", "/srv/game", "ab12"));
    let fields = FrameInfoFlags::FUNCNAME | FrameInfoFlags::MODULE | FrameInfoFlags::DEBUG_MODULEP;

    let a = service.get_frame_info(first, fields).unwrap();
    let b = service.get_frame_info(second, fields).unwrap();

    assert_eq!(a.func_name, "render");
    assert_eq!(a.module_name, "/out/game");
    assert_eq!(a.valid_fields, fields.bits());
    assert!(a.module_id.is_some());
    assert_eq!(a.module_id, b.module_id);
    assert_eq!(service.module_count(), 1);

    let module_id = ObjectId::from_raw(a.module_id.unwrap());
    assert_eq!(service.module(module_id).unwrap().file_name, "/out/game");

    service.release_module(module_id).unwrap();
    assert_eq!(service.module_count(), 1);
    service.release_module(module_id).unwrap();
    assert_eq!(service.module_count(), 0);
}

#[test]
fn test_frame_info_stack_range()
{
    let service = service();
    let id = service.register_frame(Frame::new("render", "game", "ab12"));

    let record = service.get_frame_info(id, FrameInfoFlags::STACKRANGE).unwrap();

    assert_eq!(record.valid_fields, FrameInfoFlags::STACKRANGE.bits());
    assert_eq!((record.addr_min, record.addr_max), (CODE_START, FUNCTION_END));
    assert_eq!(record.module_id, None);
    assert_eq!(service.module_count(), 0);
}

#[test]
fn test_released_frame_is_not_found()
{
    let service = service();
    let id = service.register_frame(Frame::new("render", "game", "ab12"));
    assert_eq!(service.frame_count(), 1);

    service.release_frame(id).unwrap();
    let error = service.get_frame_info(id, FrameInfoFlags::FUNCNAME).unwrap_err();
    assert!(matches!(error, ProtocolError::Bridge(BridgeError::ObjectNotFound(_))));
    assert!(format!("{}", error).contains("not found"));
}

#[test]
fn test_handle_dispatches_requests()
{
    let service = service();
    let id = service.register_frame(Frame::new("render", "game", "ab12"));

    let response = service.handle(Request::ReadInstructionInfos {
        address: CODE_START,
        count: 3,
        flavor: "att".to_string(),
    });
    match response {
        Response::InstructionInfos(records) => assert_eq!(records.len(), 3),
        other => panic!("Expected InstructionInfos, got {:?}", other),
    }

    let response = service.handle(Request::GetFrameInfo {
        frame_id: id.raw(),
        fields: FrameInfoFlags::FUNCNAME.bits(),
    });
    match response {
        Response::FrameInfo(record) => assert_eq!(record.func_name, "render"),
        other => panic!("Expected FrameInfo, got {:?}", other),
    }

    assert_eq!(
        service.handle(Request::ReleaseFrame { frame_id: id.raw() }),
        Response::Released
    );
    match service.handle(Request::ReleaseFrame { frame_id: id.raw() }) {
        Response::Error { message } => assert!(message.contains("not found")),
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[test]
fn test_handle_json()
{
    let service = service();

    let reply = service
        .handle_json(r#"{"method":"read_instruction_infos","params":{"address":4096,"count":2}}"#)
        .unwrap();
    assert!(reply.starts_with(r#"{"result":"instruction_infos","value":["#));
    assert!(reply.contains("\"mnemonic\":\"nop\""));

    let error = service.handle_json("{\"method\":").unwrap_err();
    assert!(matches!(error, ProtocolError::Json(_)));
    assert!(format!("{}", error).contains("Malformed message"));
}

#[test]
fn test_concurrent_reads_share_the_target()
{
    let service = service();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                let service = &service;
                scope.spawn(move || service.read_instruction_infos(Address::new(CODE_START + i * 16), 16, ""))
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let records = handle.join().unwrap();
            assert_eq!(records.len(), 16);
            assert_eq!(records[0].address, CODE_START + i as u64 * 16);
            assert!(records.windows(2).all(|pair| pair[0].address < pair[1].address));
        }
    });
}
