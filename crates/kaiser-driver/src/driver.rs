//! The emulation driver: owns the core adapter and runs one tick at a time.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, error, info, trace};

use crate::adapter::{Button, CoreAdapter, Cpu, Pad};
use crate::breakpoint::BreakpointMonitor;
use crate::cartridge::Cartridge;
use crate::config::DriverConfig;
use crate::control::{ControlState, RunState};
use crate::error::{AdapterError, DriverError, LoadError};
use crate::fps::{FpsEstimate, FpsEstimator};
use crate::snapshot::DebugSnapshot;
use crate::sync::DebugViewSync;

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub reset_applied: bool,
    pub stepped: bool,
    pub breakpoint_hit: bool,
    /// Frame counter after the tick.
    pub frame: u64,
    /// Status line, present once a cartridge is loaded.
    pub status: Option<String>,
}

/// Pushed to every subscriber after a tick.
#[derive(Debug, Clone)]
pub struct TickUpdate {
    pub frame: u64,
    pub status: Arc<str>,
    pub snapshot: Arc<DebugSnapshot>,
}

impl TickUpdate {
    /// The rendered frame (RGB32) carried by the snapshot.
    pub fn frame_buffer(&self) -> &[u8] {
        &self.snapshot.frame_buffer
    }
}

pub struct Driver<A: CoreAdapter> {
    adapter: A,
    config: DriverConfig,
    control: ControlState,
    breakpoint: BreakpointMonitor,
    sync: DebugViewSync,
    fps: FpsEstimator,
    cartridge: Option<Cartridge>,
    frames: u64,
    last_tick: Option<Instant>,
    fault: Option<AdapterError>,
    subscribers: Vec<Sender<TickUpdate>>,
}

impl<A: CoreAdapter> Driver<A> {
    pub fn new(adapter: A, config: DriverConfig) -> Self {
        Self {
            sync: DebugViewSync::new(config.disassembly_lines, config.vram_palette),
            fps: FpsEstimator::with_capacity(config.fps_history),
            adapter,
            config,
            control: ControlState::default(),
            breakpoint: BreakpointMonitor::default(),
            cartridge: None,
            frames: 0,
            last_tick: None,
            fault: None,
            subscribers: Vec::new(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.control.state()
    }

    pub fn turbo(&self) -> bool {
        self.control.turbo()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn breakpoint(&self) -> &BreakpointMonitor {
        &self.breakpoint
    }

    pub fn fps(&self) -> FpsEstimate {
        self.fps.estimate()
    }

    /// The latest complete debug snapshot.
    pub fn snapshot(&self) -> Arc<DebugSnapshot> {
        self.sync.snapshot()
    }

    /// Time until the next tick should run. Turbo only shortens it while
    /// the machine is actually running.
    pub fn cadence(&self) -> Duration {
        if self.control.turbo() && self.control.is_running() {
            self.config.turbo_interval()
        } else {
            self.config.frame_interval()
        }
    }

    /// A bounded feed of tick updates. Updates are dropped for a subscriber
    /// whose queue is full.
    pub fn subscribe(&mut self) -> Receiver<TickUpdate> {
        let (tx, rx) = crossbeam_channel::bounded(self.config.subscriber_queue.max(1));
        self.subscribers.push(tx);
        rx
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DriverError> {
        let cartridge = Cartridge::from_file(path)?;
        self.load_cartridge(cartridge)
    }

    /// Hands `cartridge` to the core, powers it on and resets it. On failure
    /// the driver keeps its previous state.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<(), DriverError> {
        if self.control.state() == RunState::Faulted {
            return Err(DriverError::InvalidState("cannot load after a core failure"));
        }

        self.adapter
            .load_cartridge(cartridge.data())
            .and_then(|()| self.adapter.power_on())
            .and_then(|()| self.adapter.halt_and_reset())
            .map_err(LoadError::Rejected)?;

        match cartridge.title() {
            Some(title) => info!("Loaded \"{title}\" ({} bytes)", cartridge.size()),
            None => info!("Loaded cartridge ({} bytes)", cartridge.size()),
        }

        self.cartridge = Some(cartridge);
        self.control.start();
        self.frames = 0;
        self.last_tick = None;
        self.fps.clear();
        Ok(())
    }

    pub fn request_reset(&mut self) -> Result<(), DriverError> {
        self.control
            .request_reset()
            .map_err(DriverError::InvalidState)?;
        debug!("Reset requested");
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<RunState, DriverError> {
        let state = self
            .control
            .toggle_pause()
            .map_err(DriverError::InvalidState)?;
        if state == RunState::Running {
            self.breakpoint.skip_next_hit();
        }
        info!("Emulation {state}");
        Ok(state)
    }

    pub fn toggle_turbo(&mut self) -> bool {
        let turbo = self.control.toggle_turbo();
        info!("Turbo {}", if turbo { "on" } else { "off" });
        turbo
    }

    pub fn arm(&mut self, address: u32) {
        self.breakpoint.arm(address);
    }

    pub fn disarm(&mut self) {
        self.breakpoint.disarm();
    }

    pub fn arm_from_input(&mut self, input: &str) -> bool {
        self.breakpoint.arm_from_input(input)
    }

    /// Advances exactly one frame while paused, ignoring the breakpoint.
    pub fn step_one_frame(&mut self) -> Result<(), DriverError> {
        self.require_paused("frame step is only allowed while paused")?;
        let result = self.adapter.step_frame();
        self.guard(result)?;
        self.frames += 1;
        self.refresh_and_publish();
        Ok(())
    }

    /// Runs a handful of 68000 cycles while paused.
    pub fn micro_step(&mut self) -> Result<(), DriverError> {
        self.require_paused("micro-step is only allowed while paused")?;
        let result = self.adapter.execute_cycles(self.config.micro_step_cycles);
        self.guard(result)?;
        self.refresh_and_publish();
        Ok(())
    }

    pub fn press_button(&mut self, pad: Pad, button: Button) -> Result<(), DriverError> {
        self.require_live()?;
        let result = self.adapter.press_button(pad, button);
        self.guard(result)
    }

    pub fn release_button(&mut self, pad: Pad, button: Button) -> Result<(), DriverError> {
        self.require_live()?;
        let result = self.adapter.release_button(pad, button);
        self.guard(result)
    }

    pub fn tick(&mut self) -> Result<TickReport, DriverError> {
        self.tick_at(Instant::now())
    }

    /// Runs one tick as if the clock read `now`.
    pub fn tick_at(&mut self, now: Instant) -> Result<TickReport, DriverError> {
        match self.control.state() {
            RunState::Faulted => return Err(self.fault_error()),
            RunState::Idle => return Ok(TickReport::default()),
            RunState::Running | RunState::Paused => {}
        }

        let mut report = TickReport::default();

        if self.control.take_reset() {
            let result = self
                .adapter
                .pulse_halt()
                .and_then(|()| self.adapter.halt_and_reset());
            self.guard(result)?;
            self.frames = 0;
            report.reset_applied = true;
            info!("Machine reset");
        }

        if self.control.is_running() {
            let pc = self.adapter.read_pc(Cpu::M68k);
            let pc = self.guard(pc)?;
            if self.breakpoint.check(pc) {
                self.control.pause();
                report.breakpoint_hit = true;
                info!("Breakpoint hit at 0x{pc:08x}");
            } else {
                let result = self.adapter.step_frame();
                self.guard(result)?;
                self.frames += 1;
                report.stepped = true;
            }
        }

        self.sync.refresh(&self.adapter, self.breakpoint.address());

        if let Some(prev) = self.last_tick.replace(now) {
            let interval = now.saturating_duration_since(prev);
            self.fps.record(interval.as_nanos() as f64 / 1_000_000.0);
        }

        let status = self.status_line();
        trace!("{status}");
        self.publish(&status);

        report.frame = self.frames;
        report.status = Some(status);
        Ok(report)
    }

    /// `Frame: <n> (fps: <a> <b> <c>) (cycles: <cycles>)`
    ///
    /// Cycles come from the core; the last snapshot's count stands in when
    /// that read fails.
    pub fn status_line(&self) -> String {
        let cycles = self
            .adapter
            .cycle_counter()
            .unwrap_or_else(|_| self.sync.snapshot().cycles);
        format!(
            "Frame: {} (fps: {}) (cycles: {})",
            self.frames,
            self.fps.estimate(),
            cycles
        )
    }

    fn refresh_and_publish(&mut self) {
        self.sync.refresh(&self.adapter, self.breakpoint.address());
        let status = self.status_line();
        self.publish(&status);
    }

    fn publish(&mut self, status: &str) {
        if self.subscribers.is_empty() {
            return;
        }

        let update = TickUpdate {
            frame: self.frames,
            status: Arc::from(status),
            snapshot: self.sync.snapshot(),
        };

        self.subscribers
            .retain(|tx| match tx.try_send(update.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    trace!("Subscriber queue full, dropping update");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    fn require_paused(&self, msg: &'static str) -> Result<(), DriverError> {
        match self.control.state() {
            RunState::Paused => Ok(()),
            RunState::Faulted => Err(self.fault_error()),
            _ => Err(DriverError::InvalidState(msg)),
        }
    }

    fn require_live(&self) -> Result<(), DriverError> {
        match self.control.state() {
            RunState::Faulted => Err(self.fault_error()),
            _ => Ok(()),
        }
    }

    fn fault_error(&self) -> DriverError {
        match &self.fault {
            Some(e) => DriverError::Adapter(e.clone()),
            None => DriverError::InvalidState("driver has faulted"),
        }
    }

    /// Any adapter failure outside of loading ends the session.
    fn guard<T>(&mut self, result: Result<T, AdapterError>) -> Result<T, DriverError> {
        result.map_err(|e| {
            error!("Emulation core failed: {e}");
            self.control.fault();
            self.fault = Some(e.clone());
            DriverError::Adapter(e)
        })
    }
}
