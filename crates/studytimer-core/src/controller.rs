//! The study session controller.
//!
//! `StudyTimer` is what a host talks to. It owns the phase engine, persists
//! every transition, hands effects to the platform, and pushes a fresh
//! [`DisplayFrame`] to the display after each catch-up. Hosts feed it
//! three kinds of event: periodic ticks, visibility changes and page-show
//! (resume) events, plus the user's start, skip and stop actions.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::display::{format_minutes, format_summary, DisplayFrame};
use crate::effects::{self, EffectPolicy};
use crate::error::{Result, StoreError, ValidationError};
use crate::events::{Effect, Notification};
use crate::platform::{Platform, WakeLock};
use crate::storage::{Config, DailyTotal, KvStore, SessionStore};
use crate::timer::{CatchUp, PhaseEngine, PhaseState};

/// What a finished session amounted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub study_secs: u64,
    pub cycles: u32,
    /// `Xh Ym` or `Ym`.
    pub studied: String,
    pub today_minutes: u64,
    /// `Xh Ym`.
    pub today: String,
}

pub struct StudyTimer<S: KvStore> {
    store: S,
    platform: Platform,
    policy: EffectPolicy,
    engine: Option<PhaseEngine>,
    wake_lock: Option<Box<dyn WakeLock>>,
}

impl<S: KvStore> StudyTimer<S> {
    pub fn new(store: S, platform: Platform) -> Self {
        Self {
            store,
            platform,
            policy: EffectPolicy::default(),
            engine: None,
            wake_lock: None,
        }
    }

    /// A controller honouring the notification and audio switches in `config`.
    pub fn with_config(store: S, platform: Platform, config: &Config) -> Self {
        let mut timer = Self::new(store, platform);
        timer.policy = EffectPolicy {
            notifications: config.notifications.enabled,
            audio: config.audio.enabled,
        };
        timer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> Option<&PhaseEngine> {
        self.engine.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.engine.as_ref().is_some_and(PhaseEngine::is_running)
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.wake_lock.is_some()
    }

    /// The frame a display would show at `now_ms`, if a session is active.
    pub fn frame(&self, now_ms: u64) -> Option<DisplayFrame> {
        self.engine
            .as_ref()
            .map(|engine| DisplayFrame::from_engine(engine, now_ms, self.wake_lock.is_some()))
    }

    /// Minutes credited to `today` by earlier sessions.
    pub fn minutes_on(&self, today: NaiveDate) -> Result<u64, StoreError> {
        DailyTotal::new(&self.store).minutes_on(today)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Resume a persisted session, if there is one, and bring it up to
    /// `now_ms` before anything is displayed.
    ///
    /// Returns whether a session is now running.
    pub fn recover(&mut self, now_ms: u64) -> Result<bool> {
        if self.is_running() {
            return Ok(true);
        }
        let Some(state) = SessionStore::new(&self.store).recover()? else {
            return Ok(false);
        };

        info!(phase = ?state.phase, cycle = state.cycle, "session recovered");
        self.engine = Some(PhaseEngine::from_state(state));
        self.wake_lock = effects::acquire_wake_lock(self.platform.screen_lock.as_mut());
        self.tick(now_ms);
        Ok(true)
    }

    /// Begin a new session at `now_ms`.
    ///
    /// # Errors
    /// Fails if a session is already running or either length is zero.
    pub fn start(&mut self, study_minutes: u32, break_minutes: u32, now_ms: u64) -> Result<()> {
        if self.is_running() {
            return Err(ValidationError::AlreadyRunning.into());
        }
        if study_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration {
                field: "study_minutes",
            }
            .into());
        }
        if break_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration {
                field: "break_minutes",
            }
            .into());
        }

        if self.policy.notifications && !self.platform.notifier.request_permission() {
            warn!("notification permission denied, continuing without notifications");
            self.policy.notifications = false;
        }
        if self.wake_lock.is_none() {
            self.wake_lock = effects::acquire_wake_lock(self.platform.screen_lock.as_mut());
        }

        let engine = PhaseEngine::start(
            u64::from(study_minutes) * 60_000,
            u64::from(break_minutes) * 60_000,
            now_ms,
        );
        info!(study_minutes, break_minutes, "session started");

        self.persist(engine.state());
        let status = [Effect::Notify(Notification::phase_status(engine.state()))];
        self.engine = Some(engine);
        effects::execute(&status, &mut self.platform, self.policy);
        self.render(now_ms);
        Ok(())
    }

    /// Apply every transition due at `now_ms`, persisting and executing
    /// each one in order, then redraw.
    ///
    /// The stored snapshot is read first, so a skip or stop made by another
    /// process sharing the store takes effect here.
    pub fn tick(&mut self, now_ms: u64) -> CatchUp {
        if !self.sync_from_store() {
            return CatchUp::default();
        }
        let result = match self.engine.as_mut() {
            Some(engine) => engine.catch_up(now_ms),
            None => return CatchUp::default(),
        };
        self.apply(&result);
        self.render(now_ms);
        result
    }

    /// End the current delay early. `None` outside a delay.
    pub fn skip(&mut self, now_ms: u64) -> Option<CatchUp> {
        if !self.sync_from_store() {
            return None;
        }
        let engine = self.engine.as_mut()?;
        if !engine.phase().is_delay() {
            return None;
        }
        effects::execute(&[Effect::StopTone], &mut self.platform, self.policy);
        let result = engine.skip(now_ms)?;
        self.apply(&result);
        self.render(now_ms);
        Some(result)
    }

    /// The host became visible or hidden.
    ///
    /// Coming back re-takes the wake-lock and catches up; going away saves
    /// a snapshot.
    pub fn on_visibility_change(&mut self, visible: bool, now_ms: u64) {
        if !self.is_running() {
            return;
        }
        if visible {
            if self.wake_lock.is_none() {
                self.wake_lock = effects::acquire_wake_lock(self.platform.screen_lock.as_mut());
            }
            self.tick(now_ms);
        } else if self.sync_from_store() {
            self.save_snapshot();
        }
    }

    /// The host resumed from a suspended (cached) page.
    pub fn on_page_show(&mut self, restored_from_cache: bool, now_ms: u64) {
        if restored_from_cache && self.is_running() {
            self.tick(now_ms);
        }
    }

    /// The host is about to unload.
    pub fn on_unload(&mut self) {
        if self.sync_from_store() {
            self.save_snapshot();
        }
    }

    /// End the session at `now_ms`, credit its study time to `today`, and
    /// release everything it held.
    ///
    /// Returns `None` when no session was active, including one that another
    /// process already stopped. If crediting fails the session keeps running.
    pub fn stop(&mut self, now_ms: u64, today: NaiveDate) -> Result<Option<SessionSummary>> {
        if !self.sync_from_store() {
            return Ok(None);
        }
        let Some(engine) = self.engine.as_ref() else {
            return Ok(None);
        };
        let mut finished = engine.clone();
        let state = finished.stop(now_ms).clone();

        let today_minutes =
            DailyTotal::new(&self.store).add_session(today, state.session_study_secs)?;
        info!(
            study_secs = state.session_study_secs,
            today_minutes, "session stopped"
        );

        if let Err(e) = SessionStore::new(&self.store).clear() {
            warn!(error = %e, "failed to clear session snapshot");
        }
        self.end_local_session();

        Ok(Some(SessionSummary {
            study_secs: state.session_study_secs,
            cycles: state.cycle,
            studied: format_summary(state.session_study_secs),
            today_minutes,
            today: format_minutes(today_minutes),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Align the local session with the stored snapshot. Returns whether a
    /// session is still running afterwards.
    fn sync_from_store(&mut self) -> bool {
        let Some(local) = self.engine.as_ref().filter(|e| e.is_running()) else {
            return false;
        };
        let stored = match SessionStore::new(&self.store).load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to read session snapshot, keeping local state");
                return true;
            }
        };

        match stored {
            Some(stored) if stored.running => {
                let local = local.state();
                let moved = (stored.phase, stored.cycle, stored.phase_start_ms)
                    != (local.phase, local.cycle, local.phase_start_ms);
                if moved {
                    debug!(phase = ?stored.phase, cycle = stored.cycle, "adopting stored session");
                    self.engine = Some(PhaseEngine::from_state(stored));
                }
                true
            }
            _ => {
                info!("session ended elsewhere");
                self.end_local_session();
                false
            }
        }
    }

    /// Drop the local session and release what it held, without crediting.
    fn end_local_session(&mut self) {
        self.engine = None;
        effects::execute(&[Effect::StopTone], &mut self.platform, self.policy);
        effects::release_wake_lock(self.wake_lock.take());
    }

    fn apply(&mut self, result: &CatchUp) {
        for transition in &result.transitions {
            self.persist(&transition.state);
            effects::execute(&transition.effects, &mut self.platform, self.policy);
        }
    }

    fn save_snapshot(&self) {
        if let Some(engine) = &self.engine {
            self.persist(engine.state());
        }
    }

    fn persist(&self, state: &PhaseState) {
        if let Err(e) = SessionStore::new(&self.store).save(state) {
            warn!(error = %e, "failed to save session snapshot");
        }
    }

    fn render(&mut self, now_ms: u64) {
        if let Some(frame) = self.frame(now_ms) {
            self.platform.display.render(&frame);
        }
    }
}
