//! Round-based turn order.
//!
//! At the start of each round every active unit gets one regular turn, ordered
//! by initiative plus a random jitter. Extra turns (second attacks, granted
//! attacks, pre-emptive doppelganger turns) are inserted at the front of the
//! pending queue. Units that wait are moved behind everyone still pending.

use std::collections::VecDeque;

use crate::random::BattleRandom;
use crate::state::{AttackType, BattleSide, BattleState, UnitId};

/// Why a unit gets a turn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TurnKind {
    /// The unit's one turn per round. Effects are processed at its start.
    Regular,
    /// Follow-up turn of a unit with the double attack ability.
    SecondAttack,
    /// Turn granted by an ally's GiveAdditionalAttack.
    AdditionalAttack,
    /// First-round turn of a doppelganger, before everyone else.
    Preemptive,
}

impl TurnKind {
    pub const fn is_regular(self) -> bool {
        matches!(self, Self::Regular)
    }
}

/// One entry in the turn queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTurnOrder {
    pub unit: UnitId,
    /// Initiative the order was sorted by, jitter included.
    pub initiative: i32,
    pub kind: TurnKind,
}

impl UnitTurnOrder {
    pub const fn regular(unit: UnitId, initiative: i32) -> Self {
        Self {
            unit,
            initiative,
            kind: TurnKind::Regular,
        }
    }

    pub const fn extra(unit: UnitId, kind: TurnKind) -> Self {
        Self {
            unit,
            initiative: i32::MAX,
            kind,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTurnQueue {
    round: u32,
    pending: VecDeque<UnitTurnOrder>,
    waiting: VecDeque<UnitTurnOrder>,
}

impl UnitTurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current round, starting at 1 once the first round is built.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.waiting.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.waiting.len()
    }

    /// Pending orders followed by waiting ones, in the order they will run.
    pub fn iter(&self) -> impl Iterator<Item = &UnitTurnOrder> {
        self.pending.iter().chain(self.waiting.iter())
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.iter().any(|o| o.unit == unit)
    }

    /// Builds the order for the next round from every active unit.
    ///
    /// Initiative is `initiative + rand[0, jitter)`, drawn in unit id order,
    /// sorted descending with ties broken by the lower id. The first round
    /// also prepends a pre-emptive turn for each doppelganger.
    pub fn start_round(
        &mut self,
        state: &BattleState,
        random: &mut dyn BattleRandom,
        jitter: u32,
    ) {
        self.round += 1;
        self.pending.clear();
        self.waiting.clear();

        let mut units: Vec<_> = [BattleSide::Attacker, BattleSide::Defender]
            .into_iter()
            .flat_map(|side| state.active_units(side))
            .collect();
        units.sort_by_key(|u| u.id);

        let mut orders: Vec<UnitTurnOrder> = units
            .iter()
            .map(|unit| {
                let roll = random.get_range(0, jitter);
                UnitTurnOrder::regular(unit.id, (unit.initiative() + roll) as i32)
            })
            .collect();
        orders.sort_by(|a, b| b.initiative.cmp(&a.initiative).then(a.unit.cmp(&b.unit)));

        if self.round == 1 {
            for unit in &units {
                if unit.unit_type.main_attack.attack_type() == AttackType::Doppelganger {
                    self.pending
                        .push_back(UnitTurnOrder::extra(unit.id, TurnKind::Preemptive));
                }
            }
        }
        self.pending.extend(orders);
        tracing::debug!(round = self.round, turns = self.pending.len(), "turn order built");
    }

    /// Pops the next order: pending first, then waiting.
    pub fn next(&mut self) -> Option<UnitTurnOrder> {
        self.pending
            .pop_front()
            .or_else(|| self.waiting.pop_front())
    }

    /// Schedules an extra turn to run right after the current one.
    pub fn insert_immediate(&mut self, order: UnitTurnOrder) {
        self.pending.push_front(order);
    }

    /// Requeues a unit behind everyone still pending this round.
    pub fn push_waiting(&mut self, order: UnitTurnOrder) {
        self.waiting.push_back(order);
    }

    /// Moves a unit's pending regular turn to match a new initiative.
    ///
    /// Other orders keep their relative positions; extra turns at the front of
    /// the queue are never overtaken.
    pub fn reorder(&mut self, unit: UnitId, initiative: i32) {
        let Some(index) = self
            .pending
            .iter()
            .position(|o| o.unit == unit && o.kind.is_regular())
        else {
            return;
        };
        let Some(mut order) = self.pending.remove(index) else {
            return;
        };
        order.initiative = initiative;

        let insert_at = self
            .pending
            .iter()
            .position(|o| {
                o.kind.is_regular()
                    && (o.initiative < initiative
                        || (o.initiative == initiative && o.unit > unit))
            })
            .unwrap_or(self.pending.len());
        self.pending.insert(insert_at, order);
    }

    /// Drops every order of `unit`. Returns true if any was removed.
    pub fn remove(&mut self, unit: UnitId) -> bool {
        let before = self.len();
        self.pending.retain(|o| o.unit != unit);
        self.waiting.retain(|o| o.unit != unit);
        before != self.len()
    }
}
