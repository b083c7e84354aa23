use log::{debug, warn};

/// A single program-counter breakpoint on the main CPU.
///
/// The monitor only answers "does this PC match"; pausing is the caller's
/// decision.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BreakpointMonitor {
    address: Option<u32>,
    enabled: bool,
    skip_once: bool,
}

impl BreakpointMonitor {
    pub fn arm(&mut self, address: u32) {
        self.address = Some(address);
        self.enabled = true;
        self.skip_once = false;
        debug!("Breakpoint armed at 0x{address:08x}");
    }

    pub fn disarm(&mut self) {
        self.enabled = false;
        self.skip_once = false;
    }

    /// Arms from user text. Empty or malformed input disarms instead of
    /// failing. Returns whether the breakpoint ended up armed.
    pub fn arm_from_input(&mut self, input: &str) -> bool {
        let input = input.trim();
        if input.is_empty() {
            self.disarm();
            return false;
        }

        match parse_hex_address(input) {
            Ok(address) => {
                self.arm(address);
                true
            }
            Err(e) => {
                warn!("{e}; breakpoint disabled");
                self.disarm();
                false
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.enabled && self.address.is_some()
    }

    /// The watched address while armed.
    pub fn address(&self) -> Option<u32> {
        if self.enabled { self.address } else { None }
    }

    pub fn matches(&self, pc: u32) -> bool {
        self.address() == Some(pc)
    }

    /// Lets the next [`check`](Self::check) pass over a match once, so a
    /// machine resumed on the breakpoint address can leave it.
    pub fn skip_next_hit(&mut self) {
        self.skip_once = true;
    }

    /// Pre-step check. Consumes a pending skip whether or not it matched.
    pub fn check(&mut self, pc: u32) -> bool {
        let skip = std::mem::take(&mut self.skip_once);
        self.matches(pc) && !skip
    }
}

pub fn parse_hex_address(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let digits = s.strip_prefix('$').unwrap_or(s);
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    u32::from_str_radix(digits, 16).map_err(|_| format!("Invalid hex address: '{s}'"))
}
