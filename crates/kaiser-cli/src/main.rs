mod config;
mod console;
mod dump;
mod screenshot;

use clap::Parser;
use console::Action;
use kaiser_driver::{Driver, NativeCore, Scheduler, TickReport};
use log::{error, info, warn};
use config::KaiserConfig;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "kaiser", about = "Sega Genesis front end with debug views")]
struct Args {
    /// Path to the cartridge dump
    rom: PathBuf,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks, paused ones included
    #[arg(long)]
    frames: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    seconds: Option<u64>,

    /// Start in turbo mode
    #[arg(long)]
    turbo: bool,

    /// Arm a 68000 breakpoint (hex, `0x` or `$` prefix allowed)
    #[arg(long = "break", value_name = "HEX")]
    breakpoint: Option<String>,

    /// Start paused
    #[arg(long)]
    paused: bool,

    /// Write raw VRAM/CRAM dumps here when the run ends
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Save a PNG of the last frame here when the run ends
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    /// Read control commands from stdin
    #[arg(long)]
    console: bool,

    /// Write the effective config (file plus flags) back to the config path
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// When a headless run should end.
///
/// Ticks are counted here rather than read from the driver, whose frame
/// counter stands still while paused and restarts on reset.
#[derive(Debug, Clone, Copy, Default)]
struct RunLimits {
    ticks: Option<u64>,
    until: Option<Instant>,
    stop_on_break: bool,
    seen: u64,
}

impl RunLimits {
    fn new(ticks: Option<u64>, seconds: Option<u64>, start: Instant, stop_on_break: bool) -> Self {
        Self {
            ticks,
            until: seconds.map(|s| start + Duration::from_secs(s)),
            stop_on_break,
            seen: 0,
        }
    }

    fn after_tick(&mut self, report: &TickReport, now: Instant) -> bool {
        self.seen += 1;
        if report.breakpoint_hit && self.stop_on_break {
            info!("Breakpoint hit with no console attached, stopping");
            return false;
        }
        if self.ticks.is_some_and(|limit| self.seen >= limit) {
            return false;
        }
        !self.until.is_some_and(|until| now >= until)
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn log_break<A: kaiser_driver::CoreAdapter>(driver: &Driver<A>) {
    let snap = driver.snapshot();
    info!("68000 registers:\n{}", snap.m68k.registers);
    for line in &snap.m68k.disassembly {
        info!("{line}");
    }
}

/// Loads the config file and lays the command-line overrides over it,
/// saving the result when `--save-config` is given.
fn prepare_config(args: &Args) -> io::Result<KaiserConfig> {
    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_from_file(&config_path);
    if let Some(dir) = &args.dump_dir {
        cfg.dump_dir = dir.clone();
    }
    if let Some(dir) = &args.screenshot_dir {
        cfg.screenshot_dir = dir.clone();
    }
    if let Some(bp) = &args.breakpoint {
        cfg.breakpoint = Some(bp.clone());
    }

    if args.save_config {
        config::save_to_file(&config_path, &cfg)?;
        info!("Saved config to {}", config_path.display());
    }
    Ok(cfg)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let cfg = prepare_config(&args)?;

    let core = NativeCore::new()?;
    let mut driver = Driver::new(core, cfg.driver.clone());
    driver.load(&args.rom)?;

    if let Some(bp) = cfg.breakpoint.as_deref() {
        driver.arm_from_input(bp);
    }
    if args.turbo {
        driver.toggle_turbo();
    }
    if args.paused {
        driver.toggle_pause()?;
    }

    let scheduler = Scheduler::new();
    let (action_tx, action_rx) = crossbeam_channel::unbounded();
    if args.console {
        console::spawn(scheduler.handle(), action_tx);
    }

    let mut limits = RunLimits::new(args.frames, args.seconds, Instant::now(), !args.console);
    let status_every = cfg.status_every.max(1);

    scheduler.run(&mut driver, |report: &TickReport, driver| {
        for action in action_rx.try_iter() {
            let snap = driver.snapshot();
            let result = match action {
                Action::Dump => dump::write_memory_dumps(&cfg.dump_dir, &snap).map(|_| ()),
                Action::Screenshot => {
                    screenshot::save_screenshot(&cfg.screenshot_dir, &snap.frame_buffer)
                        .map(|_| ())
                }
                Action::Driver(_) | Action::Quit => Ok(()),
            };
            if let Err(e) = result {
                warn!("{e}");
            }
        }

        if report.breakpoint_hit {
            log_break(driver);
        }
        if report.stepped && report.frame % status_every == 0 {
            if let Some(status) = &report.status {
                info!("{status}");
            }
        }

        limits.after_tick(report, Instant::now())
    })?;

    info!("{}", driver.status_line());

    let snap = driver.snapshot();
    if args.dump_dir.is_some() {
        dump::write_memory_dumps(&cfg.dump_dir, &snap)?;
    }
    if args.screenshot_dir.is_some() {
        screenshot::save_screenshot(&cfg.screenshot_dir, &snap.frame_buffer)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
