use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, info, warn};

use crate::adapter::{Button, CoreAdapter, Pad};
use crate::driver::{Driver, TickReport};
use crate::error::DriverError;

/// A request queued for the scheduler thread. Applied between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Reset,
    TogglePause,
    ToggleTurbo,
    StepFrame,
    MicroStep,
    Arm(u32),
    ArmInput(String),
    Disarm,
    Press(Pad, Button),
    Release(Pad, Button),
}

enum Message {
    Command(Command),
    Wake,
}

/// Cloneable remote control for a running [`Scheduler`].
#[derive(Clone)]
pub struct ControlHandle {
    tx: Sender<Message>,
    stop: Arc<AtomicBool>,
}

impl ControlHandle {
    pub fn send(&self, command: Command) {
        // The scheduler owns a sender too, so the channel outlives every handle.
        let _ = self.tx.send(Message::Command(command));
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        let _ = self.tx.send(Message::Wake);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Single-timer tick loop. The cadence is re-read from the driver after
/// every tick, so turbo and pause changes apply from the next one.
pub struct Scheduler {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    stop: Arc<AtomicBool>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> ControlHandle {
        ControlHandle {
            tx: self.tx.clone(),
            stop: Arc::clone(&self.stop),
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Ticks `driver` until stopped, until `on_tick` returns `false`, or
    /// until the core fails.
    ///
    /// A stop raised before this call is cleared, so the scheduler can be
    /// run again after an earlier run was stopped.
    pub fn run<A, F>(&self, driver: &mut Driver<A>, mut on_tick: F) -> Result<(), DriverError>
    where
        A: CoreAdapter,
        F: FnMut(&TickReport, &Driver<A>) -> bool,
    {
        self.stop.store(false, Ordering::Release);
        info!("Scheduler started");
        let mut deadline = Instant::now();

        'outer: loop {
            while let Ok(msg) = self.rx.try_recv() {
                self.handle_message(driver, msg)?;
            }

            loop {
                if self.stopped() {
                    break 'outer;
                }
                match self.rx.recv_deadline(deadline) {
                    Ok(msg) => self.handle_message(driver, msg)?,
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => break 'outer,
                }
            }

            let report = driver.tick()?;
            if !on_tick(&report, driver) {
                break;
            }

            let now = Instant::now();
            deadline += driver.cadence();
            if deadline < now {
                deadline = now;
            }
        }

        info!("Scheduler stopped after {} frames", driver.frames());
        Ok(())
    }

    fn handle_message<A: CoreAdapter>(
        &self,
        driver: &mut Driver<A>,
        msg: Message,
    ) -> Result<(), DriverError> {
        let Message::Command(command) = msg else {
            return Ok(());
        };
        debug!("Applying {command:?}");

        match apply(driver, command) {
            Err(e @ DriverError::Adapter(_)) => Err(e),
            Err(e) => {
                warn!("Command ignored: {e}");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }
}

fn apply<A: CoreAdapter>(driver: &mut Driver<A>, command: Command) -> Result<(), DriverError> {
    match command {
        Command::Load(path) => driver.load(path)?,
        Command::Reset => driver.request_reset()?,
        Command::TogglePause => {
            driver.toggle_pause()?;
        }
        Command::ToggleTurbo => {
            driver.toggle_turbo();
        }
        Command::StepFrame => driver.step_one_frame()?,
        Command::MicroStep => driver.micro_step()?,
        Command::Arm(address) => driver.arm(address),
        Command::ArmInput(text) => {
            driver.arm_from_input(&text);
        }
        Command::Disarm => driver.disarm(),
        Command::Press(pad, button) => driver.press_button(pad, button)?,
        Command::Release(pad, button) => driver.release_button(pad, button)?,
    }
    Ok(())
}
