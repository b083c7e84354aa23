//! Line-oriented control from stdin, for driving a headless session by hand.

use crossbeam_channel::Sender;
use kaiser_driver::{Button, Command, ControlHandle, Pad};
use log::{info, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;

pub const HELP: &str = "commands: p(ause) t(urbo) r(eset) s(tep) m(icro) \
b(reak) [HEX] press|release PAD BUTTON load PATH dump shot q(uit)";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Driver(Command),
    Dump,
    Screenshot,
    Quit,
}

fn parse_pad(s: &str) -> Result<Pad, String> {
    match s {
        "1" => Ok(Pad::One),
        "2" => Ok(Pad::Two),
        _ => Err(format!("unknown pad '{s}', expected 1 or 2")),
    }
}

fn parse_button(s: &str) -> Result<Button, String> {
    Button::from_name(s).ok_or_else(|| format!("unknown button '{s}'"))
}

pub fn parse_line(line: &str) -> Result<Option<Action>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let action = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("p" | "pause", []) => Action::Driver(Command::TogglePause),
        ("t" | "turbo", []) => Action::Driver(Command::ToggleTurbo),
        ("r" | "reset", []) => Action::Driver(Command::Reset),
        ("s" | "step", []) => Action::Driver(Command::StepFrame),
        ("m" | "micro", []) => Action::Driver(Command::MicroStep),
        ("b" | "break", []) => Action::Driver(Command::Disarm),
        ("b" | "break", [addr]) => Action::Driver(Command::ArmInput((*addr).to_string())),
        ("press", [pad, button]) => {
            Action::Driver(Command::Press(parse_pad(pad)?, parse_button(button)?))
        }
        ("release", [pad, button]) => {
            Action::Driver(Command::Release(parse_pad(pad)?, parse_button(button)?))
        }
        ("load", [_, ..]) => Action::Driver(Command::Load(PathBuf::from(rest.join(" ")))),
        ("dump", []) => Action::Dump,
        ("shot" | "screenshot", []) => Action::Screenshot,
        ("q" | "quit", []) => Action::Quit,
        _ => return Err(format!("unrecognised command '{}'", line.trim())),
    };
    Ok(Some(action))
}

/// Reads stdin on a background thread until EOF or `quit`. Driver commands
/// go straight to the scheduler; the rest are forwarded on `actions`.
pub fn spawn(handle: ControlHandle, actions: Sender<Action>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        info!("{HELP}");
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_line(&line) {
                Ok(None) => {}
                Ok(Some(Action::Driver(command))) => handle.send(command),
                Ok(Some(Action::Quit)) => {
                    handle.stop();
                    break;
                }
                Ok(Some(action)) => {
                    if actions.send(action).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{e}; {HELP}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_verbs() {
        assert_eq!(
            parse_line("p"),
            Ok(Some(Action::Driver(Command::TogglePause)))
        );
        assert_eq!(
            parse_line("  TURBO "),
            Ok(Some(Action::Driver(Command::ToggleTurbo)))
        );
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("q"), Ok(Some(Action::Quit)));
    }

    #[test]
    fn breakpoint_with_and_without_address() {
        assert_eq!(
            parse_line("b $1000"),
            Ok(Some(Action::Driver(Command::ArmInput("$1000".into()))))
        );
        assert_eq!(parse_line("break"), Ok(Some(Action::Driver(Command::Disarm))));
    }

    #[test]
    fn joypad_commands() {
        assert_eq!(
            parse_line("press 2 start"),
            Ok(Some(Action::Driver(Command::Press(Pad::Two, Button::Start))))
        );
        assert!(parse_line("press 3 start").is_err());
        assert!(parse_line("release 1 select").is_err());
    }

    #[test]
    fn load_keeps_spaces_in_paths() {
        assert_eq!(
            parse_line("load roms/Sonic 2.bin"),
            Ok(Some(Action::Driver(Command::Load(PathBuf::from(
                "roms/Sonic 2.bin"
            )))))
        );
        assert!(parse_line("load").is_err());
    }
}
