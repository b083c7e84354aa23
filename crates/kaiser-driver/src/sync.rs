use std::sync::Arc;

use log::{trace, warn};

use crate::adapter::{
    CRAM_ENTRIES, CRAM_RAW_SIZE, CoreAdapter, Cpu, VRAM_IMAGE_SIZE, VRAM_SIZE, decode_cram_color,
};
use crate::disasm::{DisassemblyCursor, mark_breakpoint};
use crate::error::AdapterError;
use crate::snapshot::{CpuSnapshot, DebugSnapshot, RegisterSnapshot};

/// Keeps the observer-facing [`DebugSnapshot`] in step with the core.
///
/// A refresh captures a complete snapshot before publishing it; observers
/// never see a half-updated one.
#[derive(Debug)]
pub struct DebugViewSync {
    m68k: DisassemblyCursor,
    z80: DisassemblyCursor,
    lines: usize,
    vram_palette: u8,
    current: Arc<DebugSnapshot>,
    failed_refreshes: u64,
}

impl DebugViewSync {
    pub fn new(lines: usize, vram_palette: u8) -> Self {
        Self {
            m68k: DisassemblyCursor::new(Cpu::M68k),
            z80: DisassemblyCursor::new(Cpu::Z80),
            lines,
            vram_palette,
            current: Arc::new(DebugSnapshot::default()),
            failed_refreshes: 0,
        }
    }

    pub fn snapshot(&self) -> Arc<DebugSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn failed_refreshes(&self) -> u64 {
        self.failed_refreshes
    }

    /// Pulls fresh state from `adapter`. On a failed read the previous
    /// snapshot stays in place and `false` is returned.
    pub fn refresh<A: CoreAdapter + ?Sized>(&mut self, adapter: &A, breakpoint: Option<u32>) -> bool {
        match self.capture(adapter, breakpoint) {
            Ok(snapshot) => {
                self.current = Arc::new(snapshot);
                trace!("Debug views refreshed");
                true
            }
            Err(e) => {
                self.failed_refreshes += 1;
                warn!("Debug view refresh failed, keeping previous snapshot: {e}");
                false
            }
        }
    }

    fn capture<A: CoreAdapter + ?Sized>(
        &self,
        adapter: &A,
        breakpoint: Option<u32>,
    ) -> Result<DebugSnapshot, AdapterError> {
        let mut m68k = self.capture_cpu(adapter, &self.m68k)?;
        // Only the main CPU carries the breakpoint.
        mark_breakpoint(&mut m68k.disassembly, breakpoint);
        let z80 = self.capture_cpu(adapter, &self.z80)?;

        let mut palette = [[0u8; 3]; CRAM_ENTRIES];
        for (index, colour) in palette.iter_mut().enumerate() {
            *colour = decode_cram_color(adapter.cram_entry(index)?);
        }

        let mut cram_raw = vec![0u8; CRAM_RAW_SIZE];
        adapter.read_cram_raw(&mut cram_raw)?;

        let mut vram_image = vec![0u8; VRAM_IMAGE_SIZE];
        adapter.read_vram(&mut vram_image, self.vram_palette)?;

        let mut vram_raw = vec![0u8; VRAM_SIZE];
        adapter.read_vram_raw(&mut vram_raw)?;

        Ok(DebugSnapshot {
            m68k,
            z80,
            palette,
            cram_raw,
            vram_image,
            vram_raw,
            frame_buffer: adapter.frame_buffer().to_vec(),
            cycles: adapter.cycle_counter()?,
        })
    }

    fn capture_cpu<A: CoreAdapter + ?Sized>(
        &self,
        adapter: &A,
        cursor: &DisassemblyCursor,
    ) -> Result<CpuSnapshot, AdapterError> {
        let cpu = cursor.cpu();
        let values = (0..cpu.register_names().len())
            .map(|index| adapter.read_register(cpu, index))
            .collect::<Result<Vec<_>, _>>()?;
        let registers = RegisterSnapshot::new(cpu, values);
        let pc = cpu.mask_address(registers.pc());
        let disassembly = cursor.decode_sequence(adapter, pc, self.lines)?;

        Ok(CpuSnapshot {
            registers,
            disassembly,
        })
    }
}
