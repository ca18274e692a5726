pub mod completions;
pub mod config;
pub mod run;
pub mod session;

use chrono::{Local, NaiveDate};
use studytimer_core::{Config, Database, Platform, StudyTimer};

/// A timer over the on-disk store, brought up to date with any session a
/// previous invocation left running.
///
/// One-shot commands run headless: the alerts they catch up past belong to
/// whichever `run` loop is watching.
pub(crate) fn open_timer() -> Result<StudyTimer<Database>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut timer = StudyTimer::with_config(db, Platform::headless(), &config);
    timer.recover(studytimer_core::now_ms())?;
    Ok(timer)
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
