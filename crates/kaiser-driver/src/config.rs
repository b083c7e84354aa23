use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::disasm::DEFAULT_LINES;
use crate::fps::DEFAULT_HISTORY;

/// Tunables of the driver and its scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Tick interval at normal speed.
    pub frame_interval_ms: u64,
    /// Tick interval with turbo on.
    pub turbo_interval_ms: u64,
    /// Instructions listed per CPU in the disassembly views.
    pub disassembly_lines: usize,
    /// Inter-tick intervals kept for FPS estimation.
    pub fps_history: usize,
    /// 68000 cycles run by a paused micro-step.
    pub micro_step_cycles: u32,
    /// Palette line handed to the VRAM tile-sheet renderer.
    pub vram_palette: u8,
    /// Pending updates buffered per subscriber before new ones are dropped.
    pub subscriber_queue: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            turbo_interval_ms: 4,
            disassembly_lines: DEFAULT_LINES,
            fps_history: DEFAULT_HISTORY,
            micro_step_cycles: 7,
            vram_palette: 1,
            subscriber_queue: 4,
        }
    }
}

impl DriverConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn turbo_interval(&self) -> Duration {
        Duration::from_millis(self.turbo_interval_ms.max(1))
    }
}
