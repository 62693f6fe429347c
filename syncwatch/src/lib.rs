use chrono::{DateTime, Utc};

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod connector;
pub mod env;
pub mod poll;
pub mod status;
pub mod store;
pub mod trigger;

/// Source of "now" for trigger instants.
///
/// Everything in this crate compares instants as UTC, so the clock hands out
/// `DateTime<Utc>` only.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now_utc()
    }
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
