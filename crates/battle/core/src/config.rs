/// Battle rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Exclusive upper bound of the random bonus added to attack power.
    pub damage_range: u32,
    /// Exclusive upper bound of the random bonus added to initiative when a
    /// round's turn order is built.
    pub initiative_jitter: u32,
    /// Extra damage dealt by units with the critical hit ability, in percent
    /// of the attack power.
    pub critical_percent: u32,
    /// Armor never reduces damage by more than this percentage.
    pub max_armor: u32,
    /// Hit points a revived unit comes back with, in percent of its maximum.
    pub revive_percent: u32,
    /// Instant resolution forces the attacking side to retreat after this round.
    pub forced_retreat_round: u32,
    /// Instant resolution forces the defending side to defend after this round.
    pub forced_defend_round: u32,
    /// Instant resolution retreats every attacking unit once this round is
    /// exceeded.
    pub max_rounds: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Cells in a squad grid (two lines by three flanks).
    pub const MAX_SQUAD_UNITS: usize = 6;
    /// Upper bound of simultaneously active effects on one unit. A unit holds
    /// at most one effect per attack type.
    pub const MAX_BATTLE_EFFECTS: usize = 24;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DAMAGE_RANGE: u32 = 5;
    pub const DEFAULT_INITIATIVE_JITTER: u32 = 5;
    pub const DEFAULT_CRITICAL_PERCENT: u32 = 5;
    pub const DEFAULT_MAX_ARMOR: u32 = 90;
    pub const DEFAULT_REVIVE_PERCENT: u32 = 50;
    pub const DEFAULT_FORCED_RETREAT_ROUND: u32 = 10;
    pub const DEFAULT_FORCED_DEFEND_ROUND: u32 = 20;
    pub const DEFAULT_MAX_ROUNDS: u32 = 100;

    pub fn new() -> Self {
        Self {
            damage_range: Self::DEFAULT_DAMAGE_RANGE,
            initiative_jitter: Self::DEFAULT_INITIATIVE_JITTER,
            critical_percent: Self::DEFAULT_CRITICAL_PERCENT,
            max_armor: Self::DEFAULT_MAX_ARMOR,
            revive_percent: Self::DEFAULT_REVIVE_PERCENT,
            forced_retreat_round: Self::DEFAULT_FORCED_RETREAT_ROUND,
            forced_defend_round: Self::DEFAULT_FORCED_DEFEND_ROUND,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }

    /// Config without any random spread in damage or turn order.
    pub fn without_jitter() -> Self {
        Self {
            damage_range: 0,
            initiative_jitter: 0,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
