//! [`CoreAdapter`] backed by the precompiled Genesis core.
//!
//! The backend only exists when the crate is built with `bundled` or
//! `system`; otherwise [`NativeCore::new`] reports
//! [`AdapterError::Unavailable`] and the driver can only be exercised with
//! test doubles.

pub use backend::NativeCore;

#[cfg(any(feature = "bundled", feature = "system"))]
mod backend {
    use std::ffi::CStr;
    use std::fmt;
    use std::os::raw::{c_char, c_int};
    use std::ptr;
    use std::sync::atomic::{AtomicBool, Ordering};

    use kaiser_core_sys as sys;
    use log::{debug, info};

    use crate::adapter::{Button, CoreAdapter, Cpu, Pad};
    use crate::error::AdapterError;

    /// The core keeps its machine in C globals; only one owner may exist.
    static CLAIMED: AtomicBool = AtomicBool::new(false);

    pub struct NativeCore {
        screen: Box<[u8]>,
        scaled: Box<[u8]>,
        audio: Box<[u8]>,
    }

    impl fmt::Debug for NativeCore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("NativeCore").finish_non_exhaustive()
        }
    }

    impl NativeCore {
        /// Claims the process-wide core and hands it this adapter's frame and
        /// audio buffers.
        pub fn new() -> Result<Self, AdapterError> {
            if CLAIMED.swap(true, Ordering::AcqRel) {
                return Err(AdapterError::AlreadyClaimed);
            }

            let mut core = Self {
                screen: vec![0; sys::SCREEN_BUFFER_SIZE].into_boxed_slice(),
                scaled: vec![0; sys::SCREEN_BUFFER_SIZE].into_boxed_slice(),
                audio: vec![0; sys::AUDIO_BUFFER_SIZE].into_boxed_slice(),
            };

            // The boxed slices never move, so the core may hold on to them
            // for as long as this adapter lives.
            unsafe {
                sys::sega3155313_set_buffers(core.screen.as_mut_ptr(), core.scaled.as_mut_ptr());
                sys::ym2612_set_buffer(core.audio.as_mut_ptr());
            }

            info!("Native core claimed");
            Ok(core)
        }
    }

    impl Drop for NativeCore {
        fn drop(&mut self) {
            CLAIMED.store(false, Ordering::Release);
            debug!("Native core released");
        }
    }

    fn check_len(op: &'static str, buf: &[u8], needed: usize) -> Result<(), AdapterError> {
        if buf.len() < needed {
            return Err(AdapterError::call(
                op,
                format!("buffer holds {} bytes, need {needed}", buf.len()),
            ));
        }
        Ok(())
    }

    impl CoreAdapter for NativeCore {
        fn load_cartridge(&mut self, rom: &[u8]) -> Result<(), AdapterError> {
            if rom.is_empty() {
                return Err(AdapterError::call("load_cartridge", "empty image"));
            }
            if rom.len() > sys::MAX_ROM_SIZE {
                return Err(AdapterError::call(
                    "load_cartridge",
                    format!("{} bytes exceeds the ROM window", rom.len()),
                ));
            }
            unsafe { sys::load_cartridge(rom.as_ptr(), rom.len()) };
            Ok(())
        }

        fn power_on(&mut self) -> Result<(), AdapterError> {
            unsafe { sys::power_on() };
            Ok(())
        }

        fn halt_and_reset(&mut self) -> Result<(), AdapterError> {
            unsafe { sys::reset_emulation() };
            Ok(())
        }

        fn pulse_halt(&mut self) -> Result<(), AdapterError> {
            unsafe { sys::m68k_pulse_halt() };
            Ok(())
        }

        fn step_frame(&mut self) -> Result<(), AdapterError> {
            unsafe {
                sys::frame();
                // Zoom 1 without a filter is a straight copy into `scaled`.
                sys::scale_filter(c"None".as_ptr(), 1);
            }
            Ok(())
        }

        fn execute_cycles(&mut self, cycles: u32) -> Result<(), AdapterError> {
            let cycles = c_int::try_from(cycles).unwrap_or(c_int::MAX);
            unsafe { sys::m68k_execute(cycles) };
            Ok(())
        }

        fn read_register(&self, cpu: Cpu, index: usize) -> Result<u32, AdapterError> {
            if index >= cpu.register_names().len() {
                return Err(AdapterError::call(
                    "read_register",
                    format!("{cpu} has no register {index}"),
                ));
            }
            let reg = index as c_int;
            let value = match cpu {
                Cpu::M68k => unsafe { sys::m68k_get_reg(ptr::null_mut(), reg) },
                Cpu::Z80 => unsafe { sys::z80_get_reg(reg) },
            };
            Ok(value)
        }

        fn disassemble(&self, cpu: Cpu, address: u32) -> Result<(String, u32), AdapterError> {
            let mut buf: [c_char; sys::DISASSEMBLY_BUFFER_SIZE] = [0; sys::DISASSEMBLY_BUFFER_SIZE];
            let len = match cpu {
                Cpu::M68k => unsafe {
                    sys::m68k_disassemble(buf.as_mut_ptr(), address, sys::M68K_CPU_TYPE_68000)
                },
                Cpu::Z80 => unsafe { sys::z80_disassemble(buf.as_mut_ptr(), address) },
            };
            // Keep a terminator even if the core filled the whole buffer.
            buf[sys::DISASSEMBLY_BUFFER_SIZE - 1] = 0;
            let text = unsafe { CStr::from_ptr(buf.as_ptr()) }
                .to_string_lossy()
                .into_owned();
            Ok((text, len))
        }

        fn cram_entry(&self, index: usize) -> Result<u16, AdapterError> {
            if index >= crate::adapter::CRAM_ENTRIES {
                return Err(AdapterError::call(
                    "cram_entry",
                    format!("index {index} out of range"),
                ));
            }
            Ok(unsafe { sys::sega3155313_get_cram(index as c_int) })
        }

        fn read_cram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError> {
            check_len("read_cram_raw", buf, sys::CRAM_RAW_SIZE)?;
            unsafe { sys::sega3155313_get_cram_raw(buf.as_mut_ptr()) };
            Ok(())
        }

        fn read_vram(&self, buf: &mut [u8], palette: u8) -> Result<(), AdapterError> {
            check_len("read_vram", buf, sys::VRAM_IMAGE_SIZE)?;
            unsafe { sys::sega3155313_get_vram(buf.as_mut_ptr(), c_int::from(palette)) };
            Ok(())
        }

        fn read_vram_raw(&self, buf: &mut [u8]) -> Result<(), AdapterError> {
            check_len("read_vram_raw", buf, sys::VRAM_SIZE)?;
            unsafe { sys::sega3155313_get_vram_raw(buf.as_mut_ptr()) };
            Ok(())
        }

        fn press_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError> {
            unsafe {
                sys::sega3155345_pad_press_button(pad.index() as c_int, button.index() as c_int)
            };
            Ok(())
        }

        fn release_button(&mut self, pad: Pad, button: Button) -> Result<(), AdapterError> {
            unsafe {
                sys::sega3155345_pad_release_button(pad.index() as c_int, button.index() as c_int)
            };
            Ok(())
        }

        fn cycle_counter(&self) -> Result<u64, AdapterError> {
            Ok(u64::from(unsafe { sys::get_cycle_counter() }))
        }

        fn frame_buffer(&self) -> &[u8] {
            &self.scaled
        }
    }
}

#[cfg(not(any(feature = "bundled", feature = "system")))]
mod backend {
    use crate::adapter::{Button, CoreAdapter, Cpu, Pad};
    use crate::error::AdapterError;

    /// Placeholder used when no native backend is compiled in.
    #[derive(Debug)]
    pub struct NativeCore {
        _unavailable: (),
    }

    impl NativeCore {
        pub fn new() -> Result<Self, AdapterError> {
            Err(AdapterError::Unavailable)
        }
    }

    impl CoreAdapter for NativeCore {
        fn load_cartridge(&mut self, _rom: &[u8]) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn power_on(&mut self) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn halt_and_reset(&mut self) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn pulse_halt(&mut self) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn step_frame(&mut self) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn execute_cycles(&mut self, _cycles: u32) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn read_register(&self, _cpu: Cpu, _index: usize) -> Result<u32, AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn disassemble(&self, _cpu: Cpu, _address: u32) -> Result<(String, u32), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn cram_entry(&self, _index: usize) -> Result<u16, AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn read_cram_raw(&self, _buf: &mut [u8]) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn read_vram(&self, _buf: &mut [u8], _palette: u8) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn read_vram_raw(&self, _buf: &mut [u8]) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn press_button(&mut self, _pad: Pad, _button: Button) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn release_button(&mut self, _pad: Pad, _button: Button) -> Result<(), AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn cycle_counter(&self) -> Result<u64, AdapterError> {
            Err(AdapterError::Unavailable)
        }

        fn frame_buffer(&self) -> &[u8] {
            &[]
        }
    }

}
