//! Level curve and progression projection.

use serde::{Deserialize, Serialize};

/// XP cost of one patient level.
pub const PATIENT_XP_PER_LEVEL: i64 = 100;

/// XP cost of one therapist level.
pub const THERAPIST_XP_PER_LEVEL: i64 = 150;

pub const PATIENT_CURVE: ProgressionCurve = ProgressionCurve::new(PATIENT_XP_PER_LEVEL);
pub const THERAPIST_CURVE: ProgressionCurve = ProgressionCurve::new(THERAPIST_XP_PER_LEVEL);

/// The two independent actor populations, each with its own curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Patient,
    Therapist,
}

impl ActorKind {
    pub fn curve(&self) -> ProgressionCurve {
        match self {
            ActorKind::Patient => PATIENT_CURVE,
            ActorKind::Therapist => THERAPIST_CURVE,
        }
    }
}

/// Flat level curve: every level costs the same amount of XP.
///
/// Level is always derived from cumulative XP as `xp / xp_per_level + 1`.
/// Negative XP is clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionCurve {
    xp_per_level: i64,
}

/// Read-only projection of an XP total, consumed by progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionInfo {
    pub level: i32,
    pub xp_for_current_level: i64,
    pub xp_for_next_level: i64,
    pub xp_in_current_level: i64,
    pub xp_to_next_level: i64,
    pub progress_percent: f64,
}

impl ProgressionCurve {
    /// `xp_per_level` must be positive; anything lower is raised to 1.
    pub const fn new(xp_per_level: i64) -> Self {
        let xp_per_level = if xp_per_level < 1 { 1 } else { xp_per_level };
        ProgressionCurve { xp_per_level }
    }

    pub const fn xp_per_level(&self) -> i64 {
        self.xp_per_level
    }

    pub fn level_from_xp(&self, xp: i64) -> i32 {
        let level = xp.max(0) / self.xp_per_level + 1;
        i32::try_from(level).unwrap_or(i32::MAX)
    }

    pub fn xp_for_level(&self, level: i32) -> i64 {
        (i64::from(level.max(1)) - 1) * self.xp_per_level
    }

    /// Percentage of the current level already earned, in `[0, 100]`.
    pub fn progress_percent(&self, xp: i64) -> f64 {
        let xp = xp.max(0);
        let floor = self.xp_for_level(self.level_from_xp(xp));
        let pct = (xp - floor) as f64 / self.xp_per_level as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }

    pub fn info(&self, xp: i64) -> ProgressionInfo {
        let xp = xp.max(0);
        let level = self.level_from_xp(xp);
        let xp_for_current_level = self.xp_for_level(level);
        let xp_for_next_level = xp_for_current_level + self.xp_per_level;
        ProgressionInfo {
            level,
            xp_for_current_level,
            xp_for_next_level,
            xp_in_current_level: xp - xp_for_current_level,
            xp_to_next_level: xp_for_next_level - xp,
            progress_percent: self.progress_percent(xp),
        }
    }
}
