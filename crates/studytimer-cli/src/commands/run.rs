//! The interactive driver: ticks the timer once per interval, reads
//! single-letter commands from stdin, and stops on `q` or Ctrl-C.

use std::time::Duration;

use studytimer_core::{now_ms, Config, Database, StudyTimer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::today;
use crate::host::terminal_platform;

const MIN_TICK_MS: u64 = 100;

const HELP: &str = "[s] skip delay  [h] hide  [v] show  [q] stop";

/// What a line typed on stdin asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Skip,
    Quit,
    Hide,
    Show,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "s" | "skip" => Some(Input::Skip),
            "q" | "quit" | "stop" => Some(Input::Quit),
            "h" | "hide" => Some(Input::Hide),
            "v" | "show" => Some(Input::Show),
            _ => None,
        }
    }
}

pub fn run(
    study: Option<u32>,
    break_minutes: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(study, break_minutes))
}

async fn drive(
    study: Option<u32>,
    break_minutes: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut timer = StudyTimer::with_config(db, terminal_platform(&config), &config);

    if timer.recover(now_ms())? {
        info!("resuming saved session");
        if study.is_some() || break_minutes.is_some() {
            warn!("--study/--break ignored: resuming the saved session with its own lengths");
        }
    } else {
        timer.start(
            study.unwrap_or(config.timer.study_minutes),
            break_minutes.unwrap_or(config.timer.break_minutes),
            now_ms(),
        )?;
    }
    eprintln!("{HELP}");

    let period = Duration::from_millis(config.host.tick_interval_ms.max(MIN_TICK_MS));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                timer.tick(now_ms());
                if !timer.is_running() {
                    println!();
                    eprintln!("Session was stopped elsewhere.");
                    return Ok(());
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match Input::parse(&line) {
                    Some(Input::Skip) => {
                        if timer.skip(now_ms()).is_none() {
                            debug!("skip ignored outside a delay");
                        }
                    }
                    Some(Input::Quit) => break,
                    Some(Input::Hide) => timer.on_visibility_change(false, now_ms()),
                    Some(Input::Show) => timer.on_visibility_change(true, now_ms()),
                    None if line.trim().is_empty() => {}
                    None => warn!(input = line.trim(), "unknown command"),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    if let Some(summary) = timer.stop(now_ms(), today())? {
        eprintln!(
            "Session complete: studied {}. Today: {}",
            summary.studied, summary.today
        );
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}
