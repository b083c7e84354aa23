//! Emulation driver and debug-synchronisation loop for the KAISER Sega
//! Genesis front end.
//!
//! The crate owns the scheduling and control logic around a foreign
//! emulation core. The core itself sits behind [`adapter::CoreAdapter`];
//! [`native::NativeCore`] binds the C library when built with the
//! `bundled` or `system` feature.

/// The call boundary into the emulation core.
pub mod adapter;

/// Single program-counter breakpoint.
pub mod breakpoint;

/// Cartridge images and their validation.
pub mod cartridge;

/// Driver tunables.
pub mod config;

/// Run state and control flags.
pub mod control;

/// Instruction listings around the program counter.
pub mod disasm;

/// Tick orchestration and publishing.
pub mod driver;

pub mod error;

/// Rolling frame-rate estimation.
pub mod fps;

/// FFI-backed adapter.
pub mod native;

/// Timer loop and remote control.
pub mod scheduler;

/// Debug snapshot types.
pub mod snapshot;

/// Debug view refresh.
pub mod sync;

pub use adapter::{Button, CoreAdapter, Cpu, Pad};
pub use cartridge::Cartridge;
pub use config::DriverConfig;
pub use control::RunState;
pub use driver::{Driver, TickReport, TickUpdate};
pub use error::{AdapterError, DriverError, LoadError};
pub use native::NativeCore;
pub use scheduler::{Command, ControlHandle, Scheduler};
pub use snapshot::DebugSnapshot;
