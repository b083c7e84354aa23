#![allow(dead_code)]

use std::path::PathBuf;

use kaiser_driver::adapter::FRAME_BUFFER_SIZE;
use kaiser_driver::{AdapterError, Button, Cartridge, CoreAdapter, Cpu, Driver, DriverConfig, Pad};

pub const RESET_PC: u32 = 0x0F00;
pub const CYCLES_PER_FRAME: u64 = 1000;

/// Mutating calls seen by [`FakeCore`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(usize),
    PowerOn,
    HaltAndReset,
    PulseHalt,
    StepFrame,
    Execute(u32),
    Press(Pad, Button),
    Release(Pad, Button),
}

/// A scripted stand-in for the native core.
///
/// The 68000 PC starts at [`RESET_PC`] and advances by `pc_stride` per frame;
/// every instruction is `instr_len` bytes long.
#[derive(Debug)]
pub struct FakeCore {
    pub calls: Vec<Call>,
    pub pc: u32,
    pub z80_pc: u32,
    pub pc_stride: u32,
    pub instr_len: u32,
    pub cycles: u64,
    /// OR-ed into the reported 68000 PC, as a core with junk upper bits would.
    pub pc_high_bits: u32,
    pub cram: [u16; 64],
    pub frame: Vec<u8>,

    pub reject_load: bool,
    pub fail_step: bool,
    /// Fails the memory and disassembly reads, but not register reads.
    pub fail_view_reads: bool,
    pub fail_cycle_counter: bool,
}

impl Default for FakeCore {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            pc: 0,
            z80_pc: 0,
            pc_stride: 0x80,
            instr_len: 2,
            cycles: 0,
            pc_high_bits: 0,
            cram: [0; 64],
            frame: vec![0; FRAME_BUFFER_SIZE],
            reject_load: false,
            fail_step: false,
            fail_view_reads: false,
            fail_cycle_counter: false,
        }
    }
}

impl FakeCore {
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn read_check(&self, op: &'static str) -> Result<(), AdapterError> {
        if self.fail_view_reads {
            Err(AdapterError::call(op, "scripted read failure"))
        } else {
            Ok(())
        }
    }
}

impl CoreAdapter for FakeCore {
    fn load_cartridge(&mut self, rom: &[u8]) -> Result<(), AdapterError> {
        if self.reject_load {
            return Err(AdapterError::call("load_cartridge", "scripted rejection"));
        }
        self.calls.push(Call::Load(rom.len()));
        Ok(())
    }

    fn power_on(&mut self) -> Result<(), AdapterError> {
        self.calls.push(Call::PowerOn);
        Ok(())
    }

    fn halt_and_reset(&mut self) -> Result<(), AdapterError> {
        self.calls.push(Call::HaltAndReset);
        self.pc = RESET_PC;
        self.cycles = 0;
        Ok(())
    }

    fn pulse_halt(&mut self) -> Result<(), AdapterError> {
        self.calls.push(Call::PulseHalt);
        Ok(())
    }

    fn step_frame(&mut self) -> Result<(), AdapterError> {
        if self.fail_step {
            return Err(AdapterError::call("frame", "scripted step failure"));
        }
        self.calls.push(Call::StepFrame);
        self.pc = (self.pc + self.pc_stride) & Cpu::M68k.address_mask();
        self.cycles += CYCLES_PER_FRAME;
        let next = self.frame[0].wrapping_add(1);
        self.frame.fill(next);
        Ok(())
    }

    fn execute_cycles(&mut self, cycles: u32) -> Result<(), AdapterError> {
        self.calls.push(Call::Execute(cycles));
        self.pc = (self.pc + self.instr_len) & Cpu::M68k.address_mask();
        self.cycles += u64::from(cycles);
        Ok(())
    }

    fn read_register(&self, cpu: Cpu, index: usize) -> Result<u32, AdapterError> {
        if index >= cpu.register_names().len() {
            return Err(AdapterError::call("get_reg", "index out of range"));
        }
        let value = match cpu {
            Cpu::M68k if index == cpu.pc_index() => self.pc | self.pc_high_bits,
            Cpu::Z80 if index == cpu.pc_index() => self.z80_pc,
            _ => index as u32 * 0x10,
        };
        Ok(value)
    }

    fn disassemble(&self, cpu: Cpu, _address: u32) -> Result<(String, u32), AdapterError> {
        self.read_check("disassemble")?;
        let text = match cpu {
            Cpu::M68k => "MOVE.W  D0, D1",
            Cpu::Z80 => "LD A, (HL) ",
        };
        Ok((text.to_string(), self.instr_len))
    }

    fn cram_entry(&self, index: usize) -> Result<u16, AdapterError> {
        self.read_check("get_cram")?;
        self.cram
            .get(index)
            .copied()
            .ok_or_else(|| AdapterError::call("get_cram", "index out of range"))
    }

    fn read_cram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError> {
        self.read_check("get_cram_raw")?;
        buf.fill(0x5A);
        Ok(())
    }

    fn read_vram(&self, buf: &mut [u8], palette: u8) -> Result<(), AdapterError> {
        self.read_check("get_vram")?;
        buf.fill(palette);
        Ok(())
    }

    fn read_vram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError> {
        self.read_check("get_vram_raw")?;
        buf.fill(0x11);
        Ok(())
    }

    fn press_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError> {
        self.calls.push(Call::Press(pad, button));
        Ok(())
    }

    fn release_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError> {
        self.calls.push(Call::Release(pad, button));
        Ok(())
    }

    fn cycle_counter(&self) -> Result<u64, AdapterError> {
        if self.fail_cycle_counter {
            return Err(AdapterError::call("get_cycle_counter", "scripted read failure"));
        }
        Ok(self.cycles)
    }

    fn frame_buffer(&self) -> &[u8] {
        &self.frame
    }
}

pub fn test_rom() -> Cartridge {
    let mut rom = vec![0u8; 0x200];
    rom[0x150..0x15B].copy_from_slice(b"TEST SONIC ");
    Cartridge::from_bytes(rom).expect("valid test ROM")
}

pub fn fast_config() -> DriverConfig {
    DriverConfig {
        frame_interval_ms: 1,
        turbo_interval_ms: 1,
        ..DriverConfig::default()
    }
}

/// A driver with [`test_rom`] loaded and the load calls cleared.
pub fn loaded_driver() -> Driver<FakeCore> {
    let mut driver = Driver::new(FakeCore::default(), DriverConfig::default());
    driver.load_cartridge(test_rom()).expect("load test ROM");
    driver.adapter_mut().calls.clear();
    driver
}

pub fn write_rom(dir: &std::path::Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write ROM");
    path
}
