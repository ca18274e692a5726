//! One-shot session commands. Each invocation recovers whatever session the
//! last one saved, acts on it, and prints JSON.

use serde::Serialize;
use studytimer_core::display::format_minutes;
use studytimer_core::{Config, DailyTotal, DisplayFrame, ValidationError};

use super::{open_timer, today};

#[derive(Serialize)]
struct Status {
    running: bool,
    #[serde(flatten)]
    frame: Option<DisplayFrame>,
}

#[derive(Serialize)]
struct SkipResult {
    skipped: bool,
    #[serde(flatten)]
    frame: Option<DisplayFrame>,
}

#[derive(Serialize)]
struct Today {
    minutes: u64,
    today: String,
}

/// Start a session and leave it for `status` or `run` to pick up.
pub fn start(
    study: Option<u32>,
    break_minutes: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut timer = open_timer()?;
    let now = studytimer_core::now_ms();
    timer.start(
        study.unwrap_or(config.timer.study_minutes),
        break_minutes.unwrap_or(config.timer.break_minutes),
        now,
    )?;

    let status = Status {
        running: true,
        frame: timer.frame(now),
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let timer = open_timer()?;
    let status = Status {
        running: timer.is_running(),
        frame: timer.frame(studytimer_core::now_ms()),
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub fn skip() -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = open_timer()?;
    if !timer.is_running() {
        return Err(ValidationError::NotRunning.into());
    }
    let now = studytimer_core::now_ms();
    let skipped = timer.skip(now).is_some();
    let result = SkipResult {
        skipped,
        frame: timer.frame(now),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub fn stop() -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = open_timer()?;
    let summary = timer
        .stop(studytimer_core::now_ms(), today())?
        .ok_or(ValidationError::NotRunning)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn today_total() -> Result<(), Box<dyn std::error::Error>> {
    let timer = open_timer()?;
    let minutes = DailyTotal::new(timer.store()).minutes_today()?;
    let total = Today {
        minutes,
        today: format_minutes(minutes),
    };
    println!("{}", serde_json::to_string_pretty(&total)?);
    Ok(())
}
