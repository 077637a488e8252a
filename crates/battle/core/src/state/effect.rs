use super::{AttackSource, AttackType, UnitId, UnitProtection};

/// Remaining lifetime of an active effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Completes when the count reaches zero.
    Turns(u32),
    /// Lasts until the battle ends.
    Infinite,
}

impl EffectDuration {
    pub const fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Counts one turn down. Returns true once the duration is exhausted.
    pub fn tick(&mut self) -> bool {
        match self {
            Self::Turns(turns) => {
                *turns = turns.saturating_sub(1);
                *turns == 0
            }
            Self::Infinite => false,
        }
    }
}

/// Effect left on a unit by an attack.
///
/// `duration_owner` is the unit whose regular turn starts count the duration
/// down. `power` is snapshotted when the effect is created: damage per turn
/// for damage-over-time effects, percent for damage and initiative modifiers,
/// absolute armor for armor reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitBattleEffect {
    pub effect_type: AttackType,
    pub source: AttackSource,
    pub duration: EffectDuration,
    pub power: u32,
    pub duration_owner: UnitId,
    /// Protections this effect added to its carrier, removed on completion.
    pub granted: Vec<UnitProtection>,
}

impl UnitBattleEffect {
    pub fn new(
        effect_type: AttackType,
        source: AttackSource,
        duration: EffectDuration,
        power: u32,
        duration_owner: UnitId,
    ) -> Self {
        Self {
            effect_type,
            source,
            duration,
            power,
            duration_owner,
            granted: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_granted(mut self, granted: Vec<UnitProtection>) -> Self {
        self.granted = granted;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_duration_completes_after_its_turns() {
        let mut duration = EffectDuration::Turns(2);
        assert!(!duration.tick());
        assert!(duration.tick());
        assert_eq!(duration, EffectDuration::Turns(0));
    }

    #[test]
    fn infinite_duration_never_completes() {
        let mut duration = EffectDuration::Infinite;
        for _ in 0..100 {
            assert!(!duration.tick());
        }
    }
}
