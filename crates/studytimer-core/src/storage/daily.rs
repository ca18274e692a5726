//! Minutes studied today, persisted and reset when the local date changes.

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use super::kv::KvStore;
use crate::error::StoreError;
use crate::timer::accumulator::credited_minutes;

pub const TOTAL_KEY: &str = "study_timer.total_minutes";
pub const DATE_KEY: &str = "study_timer.date";

const DATE_FMT: &str = "%Y-%m-%d";

/// Calendar-day study total stored in a [`KvStore`].
pub struct DailyTotal<'a, S: KvStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KvStore + ?Sized> DailyTotal<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    /// Minutes recorded for `today`.
    ///
    /// The first read on a new day resets the stored total to zero.
    pub fn minutes_on(&self, today: NaiveDate) -> Result<u64, StoreError> {
        let today_str = today.format(DATE_FMT).to_string();
        let stored_date = self.kv.get(DATE_KEY)?;

        if stored_date.as_deref() != Some(today_str.as_str()) {
            debug!(previous = ?stored_date, today = %today_str, "daily total reset");
            self.kv.set(DATE_KEY, &today_str)?;
            self.kv.set(TOTAL_KEY, "0")?;
            return Ok(0);
        }

        let total = match self.kv.get(TOTAL_KEY)? {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "unreadable daily total, treating as 0");
                0
            }),
            None => 0,
        };
        Ok(total)
    }

    /// Minutes recorded for the current local date.
    pub fn minutes_today(&self) -> Result<u64, StoreError> {
        self.minutes_on(Local::now().date_naive())
    }

    /// Credit a finished session's study seconds to `today` and return the
    /// new total.
    pub fn add_session(&self, today: NaiveDate, study_secs: u64) -> Result<u64, StoreError> {
        let total = self
            .minutes_on(today)?
            .saturating_add(credited_minutes(study_secs));
        self.kv.set(TOTAL_KEY, &total.to_string())?;
        self.kv.set(DATE_KEY, &today.format(DATE_FMT).to_string())?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn empty_store_reads_zero() {
        let kv = MemoryStore::new();
        assert_eq!(DailyTotal::new(&kv).minutes_on(day(17)).unwrap(), 0);
        assert_eq!(kv.get(DATE_KEY).unwrap().as_deref(), Some("2026-10-17"));
    }

    #[test]
    fn sessions_accumulate_within_a_day() {
        let kv = MemoryStore::new();
        let daily = DailyTotal::new(&kv);
        assert_eq!(daily.add_session(day(17), 25 * 60).unwrap(), 25);
        assert_eq!(daily.add_session(day(17), 90).unwrap(), 27);
        assert_eq!(daily.add_session(day(17), 29).unwrap(), 27);
        assert_eq!(daily.minutes_on(day(17)).unwrap(), 27);
    }

    #[test]
    fn new_day_resets_total() {
        let kv = MemoryStore::new();
        let daily = DailyTotal::new(&kv);
        daily.add_session(day(17), 50 * 60).unwrap();
        assert_eq!(daily.minutes_on(day(18)).unwrap(), 0);
        assert_eq!(kv.get(TOTAL_KEY).unwrap().as_deref(), Some("0"));
        // Going back does not resurrect the old total either.
        assert_eq!(daily.minutes_on(day(17)).unwrap(), 0);
    }

    #[test]
    fn garbage_total_reads_as_zero() {
        let kv = MemoryStore::new();
        kv.set(DATE_KEY, "2026-10-17").unwrap();
        kv.set(TOTAL_KEY, "lots").unwrap();
        assert_eq!(DailyTotal::new(&kv).minutes_on(day(17)).unwrap(), 0);
    }
}
