mod common;

use common::FakeCore;
use kaiser_driver::adapter::{CRAM_RAW_SIZE, VRAM_IMAGE_SIZE, VRAM_SIZE};
use kaiser_driver::disasm::DisassemblyCursor;
use kaiser_driver::sync::DebugViewSync;
use kaiser_driver::Cpu;

#[test]
fn refresh_captures_every_view() {
    let mut core = FakeCore {
        pc: 0x200,
        z80_pc: 0x40,
        cycles: 1234,
        ..FakeCore::default()
    };
    core.cram[0] = 0x0EEE;
    core.cram[17] = 0x000E;

    let mut sync = DebugViewSync::new(10, 2);
    assert!(sync.refresh(&core, Some(0x204)));

    let snap = sync.snapshot();
    assert_eq!(snap.m68k.registers.pc(), 0x200);
    assert_eq!(snap.m68k.registers.get("d1"), Some(0x10));
    assert_eq!(snap.z80.registers.pc(), 0x40);
    assert_eq!(snap.palette[0], [0xE0, 0xE0, 0xE0]);
    assert_eq!(snap.palette_line(1)[1], [0xE0, 0, 0]);
    assert_eq!(snap.cram_raw, vec![0x5A; CRAM_RAW_SIZE]);
    assert_eq!(snap.vram_image.len(), VRAM_IMAGE_SIZE);
    assert!(snap.vram_image.iter().all(|&b| b == 2));
    assert_eq!(snap.vram_raw.len(), VRAM_SIZE);
    assert_eq!(snap.cycles, 1234);

    let marked: Vec<u32> = snap
        .m68k
        .disassembly
        .iter()
        .filter(|l| l.at_breakpoint)
        .map(|l| l.address)
        .collect();
    assert_eq!(marked, vec![0x204]);
    assert!(snap.z80.disassembly.iter().all(|l| !l.at_breakpoint));
}

#[test]
fn failed_refresh_is_counted_and_ignored() {
    let core = FakeCore {
        fail_view_reads: true,
        ..FakeCore::default()
    };
    let mut sync = DebugViewSync::new(10, 1);
    let before = sync.snapshot();

    assert!(!sync.refresh(&core, None));
    assert_eq!(sync.failed_refreshes(), 1);
    assert_eq!(*sync.snapshot(), *before);
}

#[test]
fn zero_length_instructions_still_advance() {
    let core = FakeCore {
        instr_len: 0,
        ..FakeCore::default()
    };
    let lines = DisassemblyCursor::new(Cpu::M68k)
        .decode_sequence(&core, 0x100, 4)
        .unwrap();
    let addrs: Vec<u32> = lines.iter().map(|l| l.address).collect();
    assert_eq!(addrs, vec![0x100, 0x101, 0x102, 0x103]);
}

#[test]
fn listings_wrap_at_the_address_width() {
    let core = FakeCore {
        instr_len: 4,
        ..FakeCore::default()
    };

    let z80 = DisassemblyCursor::new(Cpu::Z80)
        .decode_sequence(&core, 0xFFFC, 3)
        .unwrap();
    let addrs: Vec<u32> = z80.iter().map(|l| l.address).collect();
    assert_eq!(addrs, vec![0xFFFC, 0x0000, 0x0004]);
    assert_eq!(z80[0].text, "ld a, (hl)");

    let m68k = DisassemblyCursor::new(Cpu::M68k)
        .decode_sequence(&core, 0x0100_0010, 1)
        .unwrap();
    assert_eq!(m68k[0].address, 0x10);
}

#[test]
fn requested_line_count_is_honoured() {
    let core = FakeCore::default();
    let mut sync = DebugViewSync::new(3, 1);
    assert!(sync.refresh(&core, None));
    assert_eq!(sync.snapshot().m68k.disassembly.len(), 3);
}
