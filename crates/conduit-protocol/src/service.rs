//! # Bridge Service
//!
//! Binds one backend target to the identity stores and serves [`Request`]s.
//!
//! The target sits behind an `RwLock`: instruction reads and frame queries share
//! it, breakpoint resolution (which creates and deletes backend breakpoints)
//! takes it exclusively. The stores lock themselves.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use conduit_core::backend::{BreakpointControl, InstructionSource, StackFrame, SymbolLookup};
use conduit_core::breakpoints::resolve_function_offset;
use conduit_core::disasm::{InstructionReader, ReaderConfig};
use conduit_core::frame::{get_frame_info, FrameInfoFlags};
use conduit_core::store::{IdentityComparer, ObjectId, ObjectStore, UniqueObjectStore};
use conduit_core::types::Address;
use conduit_utils::config::BridgeConfig;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::message::{Request, Response};
use crate::records::{FrameInfoRecord, FunctionOffsetBreakpointRecord, InstructionInfoRecord};

/// Serves bridge requests for a single target.
///
/// `F` is the backend's frame handle; its modules are deduplicated with the
/// comparer `C`.
pub struct BridgeService<T, F, C>
where
    F: StackFrame,
    C: IdentityComparer<F::Module>,
{
    target: RwLock<T>,
    frames: ObjectStore<F>,
    modules: UniqueObjectStore<F::Module, C>,
    config: BridgeConfig,
    reader: ReaderConfig,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T>
{
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T>
{
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl<T, F, C> BridgeService<T, F, C>
where
    F: StackFrame,
    C: IdentityComparer<F::Module>,
{
    /// Wrap `target`, deduplicating modules with `comparer`.
    ///
    /// ## Errors
    ///
    /// `Bridge(InvalidArgument)` if the page geometry in `config` is unusable.
    pub fn new(target: T, comparer: C, config: BridgeConfig) -> Result<Self>
    {
        let reader = ReaderConfig::new(config.page_size, config.max_instruction_size)?;
        info!(
            page_size = config.page_size,
            max_instruction_size = config.max_instruction_size,
            flavor = %config.disassembly_flavor,
            "bridge service ready"
        );

        Ok(Self {
            target: RwLock::new(target),
            frames: ObjectStore::new(),
            modules: UniqueObjectStore::new(comparer),
            config,
            reader,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &BridgeConfig
    {
        &self.config
    }

    /// Run `f` with shared access to the target.
    pub fn with_target<R>(&self, f: impl FnOnce(&T) -> R) -> R
    {
        f(&read(&self.target))
    }

    /// Register a frame handle and return the id clients refer to it by.
    pub fn register_frame(&self, frame: F) -> ObjectId
    {
        self.frames.add_object(frame)
    }

    /// Forget a frame id.
    ///
    /// ## Errors
    ///
    /// `Bridge(ObjectNotFound)` if the id is not live.
    pub fn release_frame(&self, id: ObjectId) -> Result<()>
    {
        Ok(self.frames.remove_object(id)?)
    }

    /// Drop one reference to a module id.
    ///
    /// ## Errors
    ///
    /// `Bridge(ObjectNotFound)` if the id is not live.
    pub fn release_module(&self, id: ObjectId) -> Result<()>
    {
        Ok(self.modules.remove_object(id)?)
    }

    /// Number of live frame ids.
    pub fn frame_count(&self) -> usize
    {
        self.frames.count()
    }

    /// Number of distinct live modules.
    pub fn module_count(&self) -> usize
    {
        self.modules.count()
    }
}

impl<T, F, C> BridgeService<T, F, C>
where
    F: StackFrame,
    F::Module: Clone,
    C: IdentityComparer<F::Module>,
{
    /// Module handle registered under `id`.
    ///
    /// ## Errors
    ///
    /// `Bridge(ObjectNotFound)` if the id is not live.
    pub fn module(&self, id: ObjectId) -> Result<F::Module>
    {
        Ok(self.modules.get_object(id)?)
    }
}

impl<T, F, C> BridgeService<T, F, C>
where
    T: InstructionSource,
    F: StackFrame,
    C: IdentityComparer<F::Module>,
{
    /// Reconstruct `count` instructions at `address`.
    ///
    /// An empty `flavor` selects the configured default.
    pub fn read_instruction_infos(&self, address: Address, count: usize, flavor: &str) -> Vec<InstructionInfoRecord>
    {
        let flavor = self.config.flavor_or_default(flavor);
        let target = read(&self.target);
        InstructionReader::with_config(&*target, self.reader)
            .read_instruction_infos(address, count, flavor)
            .iter()
            .map(InstructionInfoRecord::from)
            .collect()
    }
}

impl<T, F, C> BridgeService<T, F, C>
where
    T: BreakpointControl + SymbolLookup,
    F: StackFrame,
    C: IdentityComparer<F::Module>,
{
    /// Place a breakpoint `offset` lines into `symbol_name`.
    pub fn create_function_offset_breakpoint(&self, symbol_name: &str, offset: u32) -> FunctionOffsetBreakpointRecord
    {
        let result = {
            let mut target = write(&self.target);
            resolve_function_offset(&mut *target, symbol_name, offset)
        };
        if let Err(error) = &result {
            debug!(symbol = symbol_name, offset, %error, "function offset breakpoint not placed");
        }
        FunctionOffsetBreakpointRecord::from(result)
    }
}

impl<T, F, C> BridgeService<T, F, C>
where
    F: StackFrame + Clone,
    C: IdentityComparer<F::Module>,
{
    /// Describe the frame registered under `frame_id`.
    ///
    /// A module handle in the result is registered in the module store and sent
    /// as its id; the caller owns that reference.
    ///
    /// ## Errors
    ///
    /// `Bridge(ObjectNotFound)` if the frame id is not live.
    pub fn get_frame_info(&self, frame_id: ObjectId, fields: FrameInfoFlags) -> Result<FrameInfoRecord>
    {
        let frame = self.frames.get_object(frame_id)?;
        let mut info = {
            let _target = read(&self.target);
            get_frame_info(&frame, fields)
        };
        let module_id = info.module.take().map(|module| self.modules.add_object(module));
        Ok(FrameInfoRecord::new(&info, module_id))
    }
}

impl<T, F, C> BridgeService<T, F, C>
where
    T: InstructionSource + BreakpointControl,
    F: StackFrame + Clone,
    C: IdentityComparer<F::Module>,
{
    /// Serve one request.
    ///
    /// Failures that are part of a normal reply (an empty instruction list, a
    /// breakpoint error code) stay in their record; everything else becomes
    /// [`Response::Error`].
    pub fn handle(&self, request: Request) -> Response
    {
        debug!(?request, "handling request");
        let response = match request {
            Request::ReadInstructionInfos { address, count, flavor } => {
                let count = usize::try_from(count).unwrap_or(usize::MAX);
                Ok(Response::InstructionInfos(self.read_instruction_infos(
                    Address::new(address),
                    count,
                    &flavor,
                )))
            }
            Request::CreateFunctionOffsetBreakpoint { symbol_name, offset } => Ok(Response::FunctionOffsetBreakpoint(
                self.create_function_offset_breakpoint(&symbol_name, offset),
            )),
            Request::GetFrameInfo { frame_id, fields } => self
                .get_frame_info(ObjectId::from_raw(frame_id), FrameInfoFlags::from_bits_truncate(fields))
                .map(Response::FrameInfo),
            Request::ReleaseFrame { frame_id } => self
                .release_frame(ObjectId::from_raw(frame_id))
                .map(|()| Response::Released),
            Request::ReleaseModule { module_id } => self
                .release_module(ObjectId::from_raw(module_id))
                .map(|()| Response::Released),
        };

        response.unwrap_or_else(|error| {
            warn!(%error, "request failed");
            Response::error(error.to_string())
        })
    }

    /// Decode a JSON request, serve it and encode the response.
    ///
    /// ## Errors
    ///
    /// `Json` if `request` is not a valid request; bridge failures are reported
    /// inside the returned response instead.
    pub fn handle_json(&self, request: &str) -> Result<String>
    {
        let request: Request = serde_json::from_str(request)?;
        let response = self.handle(request);
        Ok(serde_json::to_string(&response)?)
    }
}
