//! Session event stream.
//!
//! Sessions publish what they present so observers (loggers, UIs, tests) can
//! follow a battle without implementing [`battle_core::BattlePresenter`].

use battle_core::{BattleAction, BattleSide, TurnKind, UnitId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    TurnStarted {
        round: u32,
        unit: UnitId,
        kind: TurnKind,
    },
    ActionBegan(BattleAction),
    ActionCompleted(BattleAction),
    BattleFinished {
        winner: BattleSide,
        rounds: u32,
    },
}

/// Broadcast channel of [`BattleEvent`]s.
///
/// Publishing never blocks; slow subscribers lag and lose old events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sender: broadcast::channel(capacity.max(1)).0,
        }
    }

    pub fn publish(&self, event: BattleEvent) {
        if self.sender.send(event).is_err() {
            // No subscribers - this is normal, not an error
            tracing::trace!("no subscribers for battle event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
