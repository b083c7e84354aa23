use std::fmt;

/// Lifecycle of an emulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No cartridge loaded yet.
    #[default]
    Idle,
    Running,
    Paused,
    /// The core failed; the session is over.
    Faulted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

/// Flags mutated by user commands and consumed by ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    state: RunState,
    reset_requested: bool,
    turbo: bool,
}

impl ControlState {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn turbo(&self) -> bool {
        self.turbo
    }

    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    /// A fresh cartridge: running, unpaused, no pending reset, normal speed.
    pub fn start(&mut self) {
        *self = ControlState {
            state: RunState::Running,
            ..ControlState::default()
        };
    }

    pub fn request_reset(&mut self) -> Result<(), &'static str> {
        match self.state {
            RunState::Running | RunState::Paused => {
                self.reset_requested = true;
                Ok(())
            }
            RunState::Idle => Err("reset requested with no cartridge loaded"),
            RunState::Faulted => Err("reset requested after a core failure"),
        }
    }

    /// Clears and returns the pending reset flag.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    /// Running to Paused and back. Returns the new state.
    pub fn toggle_pause(&mut self) -> Result<RunState, &'static str> {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Idle => return Err("pause toggled with no cartridge loaded"),
            RunState::Faulted => return Err("pause toggled after a core failure"),
        };
        Ok(self.state)
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
        }
    }

    pub fn toggle_turbo(&mut self) -> bool {
        self.turbo = !self.turbo;
        self.turbo
    }

    pub fn fault(&mut self) {
        self.state = RunState::Faulted;
        self.reset_requested = false;
    }
}
