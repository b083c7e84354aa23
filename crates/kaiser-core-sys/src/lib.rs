#![allow(non_camel_case_types, clippy::missing_safety_doc)]

//! Low-level (unsafe) bindings to the precompiled Genesis emulation core.
//!
//! The core keeps all machine state in process-wide globals, so every
//! function here mutates or reads shared state. Use the safe adapter in
//! `kaiser-driver` instead of calling these directly.

use std::os::raw::{c_char, c_int, c_uint, c_void};

/// Largest cartridge image the core's ROM window accepts.
pub const MAX_ROM_SIZE: usize = 0x40_0000;
/// Bytes in the core's output frame (320 × 240 RGB32).
pub const SCREEN_BUFFER_SIZE: usize = 320 * 240 * 4;
/// Bytes the YM2612 renders into per frame.
pub const AUDIO_BUFFER_SIZE: usize = 1080 * 2;
/// Bytes copied out by [`sega3155313_get_vram_raw`].
pub const VRAM_SIZE: usize = 0x10000;
/// Bytes copied out by [`sega3155313_get_cram_raw`].
pub const CRAM_RAW_SIZE: usize = 0x40;
/// Bytes written by [`sega3155313_get_vram`] (128 × 1024 RGB32 tile sheet).
pub const VRAM_IMAGE_SIZE: usize = 128 * 1024 * 4;
/// Upper bound the disassemblers write into their text buffer.
pub const DISASSEMBLY_BUFFER_SIZE: usize = 2048;

/// `M68K_CPU_TYPE_68000` as understood by `m68k_disassemble`.
pub const M68K_CPU_TYPE_68000: c_uint = 1;

unsafe extern "C" {
    /// Clears volatile memory and copies `size` bytes of ROM.
    pub fn load_cartridge(buffer: *const u8, size: usize);
    /// Initializes the 68000, Z80 and YM2612 cores.
    pub fn power_on();
    /// Sends a reset pulse to every chip.
    pub fn reset_emulation();
    /// Runs one full video frame.
    pub fn frame();
    /// Returns the 68000 cycles executed in the current frame.
    pub fn get_cycle_counter() -> c_uint;

    pub fn m68k_pulse_halt();
    pub fn m68k_execute(num_cycles: c_int) -> c_int;
    pub fn m68k_get_reg(context: *mut c_void, reg: c_int) -> c_uint;
    /// Writes NUL-terminated text into `str_buff`, returns the instruction length.
    pub fn m68k_disassemble(str_buff: *mut c_char, pc: c_uint, cpu_type: c_uint) -> c_uint;

    pub fn z80_get_reg(reg: c_int) -> c_uint;
    pub fn z80_disassemble(str_buff: *mut c_char, pc: c_uint) -> c_uint;

    pub fn sega3155313_set_buffers(screen_buffer: *mut u8, scaled_buffer: *mut u8);
    pub fn sega3155313_get_cram(index: c_int) -> u16;
    pub fn sega3155313_get_cram_raw(raw_buffer: *mut u8);
    pub fn sega3155313_get_vram(raw_buffer: *mut u8, palette: c_int);
    pub fn sega3155313_get_vram_raw(raw_buffer: *mut u8);

    /// Copies the screen into the scaled buffer with the named filter.
    pub fn scale_filter(filter: *const c_char, zoom: c_int);

    pub fn ym2612_set_buffer(buffer: *mut u8);

    pub fn sega3155345_pad_press_button(pad: c_int, button: c_int);
    pub fn sega3155345_pad_release_button(pad: c_int, button: c_int);
}
