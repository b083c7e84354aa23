use std::fmt;

use crate::adapter::{CRAM_ENTRIES, CRAM_RAW_SIZE, Cpu, VRAM_SIZE};
use crate::disasm::DisasmLine;

const REGISTERS_PER_LINE: usize = 3;

/// Register values of one CPU, in core index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub cpu: Cpu,
    values: Vec<u32>,
}

impl RegisterSnapshot {
    /// All-zero registers, used before the first refresh.
    pub fn zeroed(cpu: Cpu) -> Self {
        Self {
            cpu,
            values: vec![0; cpu.register_names().len()],
        }
    }

    pub fn new(cpu: Cpu, values: Vec<u32>) -> Self {
        debug_assert_eq!(values.len(), cpu.register_names().len());
        Self { cpu, values }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn pc(&self) -> u32 {
        self.values
            .get(self.cpu.pc_index())
            .copied()
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.cpu
            .register_names()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

impl fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                if i % REGISTERS_PER_LINE == 0 {
                    f.write_str("\n")?;
                } else {
                    f.write_str(" ")?;
                }
            }
            write!(f, "{name}={value:08x}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub registers: RegisterSnapshot,
    pub disassembly: Vec<DisasmLine>,
}

impl CpuSnapshot {
    pub fn empty(cpu: Cpu) -> Self {
        Self {
            registers: RegisterSnapshot::zeroed(cpu),
            disassembly: Vec::new(),
        }
    }
}

/// Everything the debug observers show, captured in one refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugSnapshot {
    pub m68k: CpuSnapshot,
    pub z80: CpuSnapshot,

    /// CRAM decoded to 8-bit RGB, four palettes of sixteen.
    pub palette: [[u8; 3]; CRAM_ENTRIES],
    pub cram_raw: Vec<u8>,

    /// VRAM tile sheet, RGB32.
    pub vram_image: Vec<u8>,
    pub vram_raw: Vec<u8>,

    /// Last rendered frame, RGB32.
    pub frame_buffer: Vec<u8>,
    pub cycles: u64,
}

impl Default for DebugSnapshot {
    fn default() -> Self {
        Self {
            m68k: CpuSnapshot::empty(Cpu::M68k),
            z80: CpuSnapshot::empty(Cpu::Z80),
            palette: [[0; 3]; CRAM_ENTRIES],
            cram_raw: vec![0; CRAM_RAW_SIZE],
            vram_image: Vec::new(),
            vram_raw: vec![0; VRAM_SIZE],
            frame_buffer: Vec::new(),
            cycles: 0,
        }
    }
}

impl DebugSnapshot {
    pub fn cpu(&self, cpu: Cpu) -> &CpuSnapshot {
        match cpu {
            Cpu::M68k => &self.m68k,
            Cpu::Z80 => &self.z80,
        }
    }

    /// One palette line (0..4) of sixteen colours.
    pub fn palette_line(&self, line: usize) -> &[[u8; 3]] {
        let start = (line % 4) * 16;
        &self.palette[start..start + 16]
    }
}
