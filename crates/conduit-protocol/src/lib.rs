//! # Conduit Protocol
//!
//! Wire-facing half of the bridge.
//!
//! The core crate works on backend handles and rich Rust types. This crate turns
//! them into flat `serde` records, assigns stable ids to frames and modules, and
//! dispatches tagged [`Request`]s to the core through a [`BridgeService`].
//! It does not pick a transport: hosts feed it JSON strings (or `Request`
//! values) from whatever channel they use.
//!
//! ```rust,ignore
//! let service = BridgeService::new(target, BuildIdComparer, BridgeConfig::from_env()?)?;
//! let reply = service.handle_json(r#"{"method":"release_frame","params":{"frame_id":1}}"#)?;
//! ```

pub mod error;
pub mod message;
pub mod records;
pub mod service;

pub use error::{ProtocolError, Result};
pub use message::{Request, Response};
pub use records::{
    BreakpointErrorCode, FrameInfoRecord, FunctionOffsetBreakpointRecord, InstructionInfoRecord, LineEntryRecord,
};
pub use service::BridgeService;
