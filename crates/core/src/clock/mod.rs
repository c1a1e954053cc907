//! Clock module - injected "now" and civil-day semantics.
//!
//! Every cooldown, streak and goal-window decision asks a [`Clock`] for the
//! current instant and the fixed civil timezone instead of reading the wall
//! clock directly.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::utils::time_utils::{civil_date_from_utc, DEFAULT_CIVIL_TZ};

/// Source of the current instant and the civil timezone used for day boundaries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn timezone(&self) -> Tz;

    /// Civil date of `instant` in this clock's timezone.
    fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        civil_date_from_utc(instant, self.timezone())
    }

    /// Civil date of "now".
    fn today(&self) -> NaiveDate {
        self.civil_date(self.now())
    }
}

/// Wall-clock implementation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        SystemClock { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_CIVIL_TZ)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Settable clock for deterministic tests and replays.
///
/// Clones share the same instant, so a test can keep a handle and advance
/// time under a service that owns another clone.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<RwLock<DateTime<Utc>>>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>, tz: Tz) -> Self {
        FixedClock {
            instant: Arc::new(RwLock::new(instant)),
            tz,
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.instant.write().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().unwrap_or_else(|e| e.into_inner())
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}
