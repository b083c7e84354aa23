use std::fmt;

use crate::adapter::{CoreAdapter, Cpu};
use crate::error::AdapterError;

pub const DEFAULT_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    pub address: u32,
    pub text: String,
    /// Set on the entry sitting on the armed breakpoint.
    pub at_breakpoint: bool,
}

impl fmt::Display for DisasmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.at_breakpoint {
            f.write_str("> ")?;
        }
        write!(f, "[0x{:08x}]: {}", self.address, self.text)
    }
}

/// Walks forward through one CPU's code, one decoded instruction at a time.
#[derive(Debug, Clone, Copy)]
pub struct DisassemblyCursor {
    cpu: Cpu,
}

impl DisassemblyCursor {
    pub fn new(cpu: Cpu) -> Self {
        Self { cpu }
    }

    pub fn cpu(&self) -> Cpu {
        self.cpu
    }

    /// Decodes `count` consecutive instructions starting at `start_pc`.
    ///
    /// A zero length from the core is treated as one byte so the listing
    /// always advances.
    pub fn decode_sequence<A: CoreAdapter + ?Sized>(
        &self,
        adapter: &A,
        start_pc: u32,
        count: usize,
    ) -> Result<Vec<DisasmLine>, AdapterError> {
        let mut address = self.cpu.mask_address(start_pc);
        let mut lines = Vec::with_capacity(count);

        for _ in 0..count {
            let (text, len) = adapter.disassemble(self.cpu, address)?;
            lines.push(DisasmLine {
                address,
                text: text.trim().to_lowercase(),
                at_breakpoint: false,
            });
            address = self.cpu.mask_address(address.wrapping_add(len.max(1)));
        }

        Ok(lines)
    }
}

/// Flags the first line sitting on `breakpoint`. Pure decoration; control
/// state is never touched here.
pub fn mark_breakpoint(lines: &mut [DisasmLine], breakpoint: Option<u32>) {
    let Some(bp) = breakpoint else {
        return;
    };
    if let Some(line) = lines.iter_mut().find(|line| line.address == bp) {
        line.at_breakpoint = true;
    }
}
