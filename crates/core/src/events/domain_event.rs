//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::goals::GoalCategory;
use crate::progression::ActorKind;

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about progression changes. Runtime adapters
/// translate them into platform-specific actions (toasts, push messages,
/// emails). Delivery is not this crate's concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// An award pushed the actor over one or more level boundaries.
    LevelUp {
        actor_id: String,
        actor_kind: ActorKind,
        previous_level: i32,
        new_level: i32,
    },

    /// A goal transitioned to completed. Emitted once per goal.
    GoalCompleted {
        goal_id: String,
        owner_id: String,
        category: GoalCategory,
    },

    /// A patient spent coins on a reward.
    CoinsRedeemed {
        actor_id: String,
        amount: i64,
        remaining: i64,
    },
}

impl DomainEvent {
    /// Creates a LevelUp event.
    pub fn level_up(
        actor_id: impl Into<String>,
        actor_kind: ActorKind,
        previous_level: i32,
        new_level: i32,
    ) -> Self {
        Self::LevelUp {
            actor_id: actor_id.into(),
            actor_kind,
            previous_level,
            new_level,
        }
    }

    /// Creates a GoalCompleted event.
    pub fn goal_completed(
        goal_id: impl Into<String>,
        owner_id: impl Into<String>,
        category: GoalCategory,
    ) -> Self {
        Self::GoalCompleted {
            goal_id: goal_id.into(),
            owner_id: owner_id.into(),
            category,
        }
    }

    /// Creates a CoinsRedeemed event.
    pub fn coins_redeemed(actor_id: impl Into<String>, amount: i64, remaining: i64) -> Self {
        Self::CoinsRedeemed {
            actor_id: actor_id.into(),
            amount,
            remaining,
        }
    }
}
