//! Animation length lookups for animated sessions.

use std::collections::HashMap;

use battle_core::{AnimationHint, AnimationKind, AttackType};

/// Source of animation lengths for committed actions.
///
/// Returning `None` means no animation data exists for the hint; sessions
/// then present the action without waiting.
pub trait AnimationOracle {
    fn animation_length(&self, hint: &AnimationHint) -> Option<u64>;
}

/// Every action animates for the same length.
#[derive(Clone, Copy, Debug)]
pub struct FixedAnimationOracle {
    pub length_ms: u64,
}

impl FixedAnimationOracle {
    pub const fn new(length_ms: u64) -> Self {
        Self { length_ms }
    }
}

impl AnimationOracle for FixedAnimationOracle {
    fn animation_length(&self, _hint: &AnimationHint) -> Option<u64> {
        Some(self.length_ms)
    }
}

/// Lengths per animation kind, optionally refined per attack type.
///
/// A per attack type entry wins over the kind entry. Kinds without an entry
/// have no animation data.
#[derive(Clone, Debug, Default)]
pub struct AnimationTable {
    kinds: HashMap<AnimationKind, u64>,
    attacks: HashMap<(AnimationKind, AttackType), u64>,
}

impl AnimationTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: AnimationKind, length_ms: u64) -> Self {
        self.kinds.insert(kind, length_ms);
        self
    }

    #[must_use]
    pub fn with_attack(mut self, kind: AnimationKind, attack: AttackType, length_ms: u64) -> Self {
        self.attacks.insert((kind, attack), length_ms);
        self
    }
}

impl AnimationOracle for AnimationTable {
    fn animation_length(&self, hint: &AnimationHint) -> Option<u64> {
        hint.attack_type
            .and_then(|attack| self.attacks.get(&(hint.kind, attack)))
            .or_else(|| self.kinds.get(&hint.kind))
            .copied()
    }
}
