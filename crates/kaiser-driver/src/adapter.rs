use std::fmt;

use crate::error::AdapterError;

/// Output frame geometry of the core (RGB32, one `u32` per pixel).
pub const SCREEN_WIDTH: usize = 320;
pub const SCREEN_HEIGHT: usize = 240;
pub const FRAME_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

/// Raw VRAM as exposed by the VDP.
pub const VRAM_SIZE: usize = 0x10000;
/// Raw CRAM bytes copied out by the VDP (one byte per entry).
pub const CRAM_RAW_SIZE: usize = 0x40;
/// Colour entries in CRAM: four palettes of sixteen.
pub const CRAM_ENTRIES: usize = 64;

/// VRAM tile sheet rendered by the VDP: 2048 tiles, 16 per row.
pub const VRAM_IMAGE_WIDTH: usize = 128;
pub const VRAM_IMAGE_HEIGHT: usize = 1024;
pub const VRAM_IMAGE_SIZE: usize = VRAM_IMAGE_WIDTH * VRAM_IMAGE_HEIGHT * 4;

/// Largest cartridge the core maps.
pub const MAX_ROM_SIZE: usize = 0x40_0000;

pub const M68K_REGISTERS: [&str; 20] = [
    "d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
    "pc", "sr", "sp", "usp",
];

pub const Z80_REGISTERS: [&str; 8] = ["af", "bc", "de", "hl", "ix", "iy", "pc", "sp"];

/// The two processors of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cpu {
    /// Main 68000.
    M68k,
    /// Z80 sound coprocessor.
    Z80,
}

impl Cpu {
    /// Register names in core index order.
    pub const fn register_names(self) -> &'static [&'static str] {
        match self {
            Cpu::M68k => &M68K_REGISTERS,
            Cpu::Z80 => &Z80_REGISTERS,
        }
    }

    /// Core index of the program counter.
    pub const fn pc_index(self) -> usize {
        match self {
            Cpu::M68k => 16,
            Cpu::Z80 => 6,
        }
    }

    pub const fn address_mask(self) -> u32 {
        match self {
            Cpu::M68k => 0x00FF_FFFF,
            Cpu::Z80 => 0xFFFF,
        }
    }

    /// Drops address bits the CPU does not decode.
    pub const fn mask_address(self, address: u32) -> u32 {
        address & self.address_mask()
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cpu::M68k => f.write_str("M68k"),
            Cpu::Z80 => f.write_str("Z80"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pad {
    One,
    Two,
}

impl Pad {
    pub const fn index(self) -> usize {
        match self {
            Pad::One => 0,
            Pad::Two => 1,
        }
    }
}

/// Joypad buttons in the order the I/O chip numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    B,
    C,
    A,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::B,
        Button::C,
        Button::A,
        Button::Start,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name.trim().to_ascii_lowercase().as_str() {
            "up" => Button::Up,
            "down" => Button::Down,
            "left" => Button::Left,
            "right" => Button::Right,
            "b" => Button::B,
            "c" => Button::C,
            "a" => Button::A,
            "start" => Button::Start,
            _ => return None,
        };
        Some(button)
    }
}

/// The fixed call boundary into the emulation core.
///
/// Only `load_cartridge`, `power_on`, `halt_and_reset`, `pulse_halt`,
/// `step_frame`, `execute_cycles` and the joypad calls mutate machine state.
/// Everything taking `&self` is a pure read and may be issued freely between
/// ticks.
pub trait CoreAdapter {
    fn load_cartridge(&mut self, rom: &[u8]) -> Result<(), AdapterError>;
    fn power_on(&mut self) -> Result<(), AdapterError>;
    fn halt_and_reset(&mut self) -> Result<(), AdapterError>;
    fn pulse_halt(&mut self) -> Result<(), AdapterError>;
    /// Advances the machine by one video frame.
    fn step_frame(&mut self) -> Result<(), AdapterError>;
    /// Runs the main CPU for roughly `cycles` clock cycles.
    fn execute_cycles(&mut self, cycles: u32) -> Result<(), AdapterError>;

    fn read_register(&self, cpu: Cpu, index: usize) -> Result<u32, AdapterError>;

    /// The program counter of `cpu`, limited to its address width.
    fn read_pc(&self, cpu: Cpu) -> Result<u32, AdapterError> {
        self.read_register(cpu, cpu.pc_index())
            .map(|pc| cpu.mask_address(pc))
    }

    /// Decodes the instruction at `address`, returning its text and length in bytes.
    fn disassemble(&self, cpu: Cpu, address: u32) -> Result<(String, u32), AdapterError>;

    /// Packed `0x0BGR` colour at `index` (0..64).
    fn cram_entry(&self, index: usize) -> Result<u16, AdapterError>;
    fn read_cram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError>;
    /// Renders the VRAM tile sheet into `buf` (RGB32) using `palette`.
    fn read_vram(&self, buf: &mut [u8], palette: u8) -> Result<(), AdapterError>;
    fn read_vram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError>;

    fn press_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError>;
    fn release_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError>;

    fn cycle_counter(&self) -> Result<u64, AdapterError>;
    /// The most recently rendered frame (RGB32, [`FRAME_BUFFER_SIZE`] bytes).
    fn frame_buffer(&self) -> &[u8];
}

impl<A: CoreAdapter + ?Sized> CoreAdapter for Box<A> {
    fn load_cartridge(&mut self, rom: &[u8]) -> Result<(), AdapterError> {
        (**self).load_cartridge(rom)
    }

    fn power_on(&mut self) -> Result<(), AdapterError> {
        (**self).power_on()
    }

    fn halt_and_reset(&mut self) -> Result<(), AdapterError> {
        (**self).halt_and_reset()
    }

    fn pulse_halt(&mut self) -> Result<(), AdapterError> {
        (**self).pulse_halt()
    }

    fn step_frame(&mut self) -> Result<(), AdapterError> {
        (**self).step_frame()
    }

    fn execute_cycles(&mut self, cycles: u32) -> Result<(), AdapterError> {
        (**self).execute_cycles(cycles)
    }

    fn read_register(&self, cpu: Cpu, index: usize) -> Result<u32, AdapterError> {
        (**self).read_register(cpu, index)
    }

    fn disassemble(&self, cpu: Cpu, address: u32) -> Result<(String, u32), AdapterError> {
        (**self).disassemble(cpu, address)
    }

    fn cram_entry(&self, index: usize) -> Result<u16, AdapterError> {
        (**self).cram_entry(index)
    }

    fn read_cram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError> {
        (**self).read_cram_raw(buf)
    }

    fn read_vram(&self, buf: &mut [u8], palette: u8) -> Result<(), AdapterError> {
        (**self).read_vram(buf, palette)
    }

    fn read_vram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError> {
        (**self).read_vram_raw(buf)
    }

    fn press_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError> {
        (**self).press_button(pad, button)
    }

    fn release_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError> {
        (**self).release_button(pad, button)
    }

    fn cycle_counter(&self) -> Result<u64, AdapterError> {
        (**self).cycle_counter()
    }

    fn frame_buffer(&self) -> &[u8] {
        (**self).frame_buffer()
    }
}

/// Decodes a packed `0x0BGR` CRAM entry into 8-bit RGB.
pub fn decode_cram_color(packed: u16) -> [u8; 3] {
    let channel = |shift: u16| (((packed >> shift) & 0x0F) as u8) * 16;
    [channel(0), channel(4), channel(8)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cram_decode_spreads_nibbles_to_channels() {
        assert_eq!(decode_cram_color(0x0000), [0, 0, 0]);
        assert_eq!(decode_cram_color(0x000E), [0xE0, 0, 0]);
        assert_eq!(decode_cram_color(0x00E0), [0, 0xE0, 0]);
        assert_eq!(decode_cram_color(0x0E00), [0, 0, 0xE0]);
        assert_eq!(decode_cram_color(0x0ACE), [0xE0, 0xC0, 0xA0]);
    }

    #[test]
    fn pc_index_points_at_pc() {
        for cpu in [Cpu::M68k, Cpu::Z80] {
            assert_eq!(cpu.register_names()[cpu.pc_index()], "pc");
        }
    }

    #[test]
    fn m68k_pc_is_core_register_sixteen() {
        assert_eq!(Cpu::M68k.pc_index(), 16);
        assert_eq!(Cpu::Z80.pc_index(), 6);
    }

    #[test]
    fn addresses_are_cut_to_the_bus_width() {
        assert_eq!(Cpu::M68k.mask_address(0xAB00_1000), 0x1000);
        assert_eq!(Cpu::M68k.mask_address(0x00FF_FFFF), 0x00FF_FFFF);
        assert_eq!(Cpu::Z80.mask_address(0x0001_2345), 0x2345);
    }

    #[test]
    fn buttons_follow_core_numbering() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
        assert_eq!(Button::Right.index(), 3);
        assert_eq!(Button::A.index(), 6);
        assert_eq!(Button::Start.index(), 7);
        assert_eq!(Button::from_name(" Start "), Some(Button::Start));
        assert_eq!(Button::from_name("select"), None);
    }
}
