//! # Study Timer Core Library
//!
//! This library provides the core logic for a study/break interval timer.
//! Hosts (the bundled CLI, or anything else that can call Rust) feed it
//! wall-clock time and user actions; it decides which phase the session is
//! in and what should happen about it.
//!
//! ## Architecture
//!
//! - **Phase Engine**: A wall-clock-based state machine. It never counts
//!   down; every transition is recomputed from the stored phase start, so a
//!   suspended or restarted host catches up exactly
//! - **Accumulator**: Study time derived from the phase state, plus a
//!   persisted per-day total
//! - **Storage**: Key-value persistence (SQLite or in-memory) for the
//!   session snapshot and daily total; TOML configuration
//! - **Platform**: Traits for notifications, tones, screen wake-lock and
//!   display, which the host implements
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: Core phase state machine
//! - [`StudyTimer`]: Session controller wiring engine, storage and platform
//! - [`SessionStore`]: Snapshot persistence and recovery
//! - [`Config`]: Application configuration management

pub mod controller;
pub mod display;
pub mod effects;
pub mod error;
pub mod events;
pub mod platform;
pub mod storage;
pub mod timer;

pub use controller::{SessionSummary, StudyTimer};
pub use display::DisplayFrame;
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{Effect, Notification, ToneClip};
pub use platform::{
    DisplaySink, Notifier, Platform, PlatformError, ScreenLock, TonePlayer, Vibrator, WakeLock,
};
pub use storage::{Config, DailyTotal, Database, KvStore, MemoryStore, SessionStore};
pub use timer::{CatchUp, DelayKind, Phase, PhaseEngine, PhaseState, Transition};

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
