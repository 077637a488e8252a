use arrayvec::ArrayVec;

use super::UnitId;
use crate::config::BattleConfig;

/// Which side of the battle a squad fights on.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BattleSide {
    /// The squad that initiated the battle.
    Attacker,
    /// The squad that was attacked.
    Defender,
}

impl BattleSide {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Attacker => Self::Defender,
            Self::Defender => Self::Attacker,
        }
    }
}

/// Owner of a squad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u32);

/// Grid line of a squad cell. Large units occupy `Both`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnitLine {
    Front,
    Back,
    Both,
}

impl UnitLine {
    /// Returns true if a unit standing on `self` covers the `line` cell.
    pub const fn covers(self, line: UnitLine) -> bool {
        matches!(
            (self, line),
            (Self::Both, _)
                | (_, Self::Both)
                | (Self::Front, Self::Front)
                | (Self::Back, Self::Back)
        )
    }
}

/// Grid column of a squad cell.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnitFlank {
    Left,
    Center,
    Right,
}

impl UnitFlank {
    pub const ALL: [UnitFlank; 3] = [Self::Left, Self::Center, Self::Right];

    const fn index(self) -> u32 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }

    /// Column distance between two flanks.
    pub const fn distance(self, other: UnitFlank) -> u32 {
        self.index().abs_diff(other.index())
    }
}

/// Cell (or pair of cells for large units) a unit occupies in its squad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitPosition {
    pub line: UnitLine,
    pub flank: UnitFlank,
}

impl UnitPosition {
    pub const fn new(line: UnitLine, flank: UnitFlank) -> Self {
        Self { line, flank }
    }

    pub const fn front(flank: UnitFlank) -> Self {
        Self::new(UnitLine::Front, flank)
    }

    pub const fn back(flank: UnitFlank) -> Self {
        Self::new(UnitLine::Back, flank)
    }

    /// Position of a large unit on `flank`.
    pub const fn large(flank: UnitFlank) -> Self {
        Self::new(UnitLine::Both, flank)
    }

    pub const fn is_large(&self) -> bool {
        matches!(self.line, UnitLine::Both)
    }

    /// Returns true if the two positions share at least one cell.
    pub const fn overlaps(&self, other: &UnitPosition) -> bool {
        self.flank.index() == other.flank.index() && self.line.covers(other.line)
    }

    /// Returns true if a unit at this position stands on the front line.
    pub const fn is_front(&self) -> bool {
        self.line.covers(UnitLine::Front)
    }

    /// Returns true if a unit at this position stands on the back line.
    pub const fn is_back(&self) -> bool {
        self.line.covers(UnitLine::Back)
    }
}

/// One side's squad: up to six units addressed by line and flank.
///
/// `units` lists the ids currently present on the grid, including corpses.
/// Hidden and unsummoned units are taken off the list; retreated units stay
/// on it and are filtered by their flags.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Squad {
    pub side: BattleSide,
    pub player: PlayerId,
    /// Squad is controlled by the AI.
    pub is_computer: bool,
    pub units: ArrayVec<UnitId, { BattleConfig::MAX_SQUAD_UNITS }>,
}

impl Squad {
    pub fn new(side: BattleSide, player: PlayerId, is_computer: bool) -> Self {
        Self {
            side,
            player,
            is_computer,
            units: ArrayVec::new(),
        }
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    pub fn is_full(&self) -> bool {
        self.units.is_full()
    }

    pub(crate) fn remove(&mut self, unit: UnitId) {
        self.units.retain(|id| *id != unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_position_overlaps_both_lines_of_its_flank() {
        let large = UnitPosition::large(UnitFlank::Center);
        assert!(large.overlaps(&UnitPosition::front(UnitFlank::Center)));
        assert!(large.overlaps(&UnitPosition::back(UnitFlank::Center)));
        assert!(!large.overlaps(&UnitPosition::front(UnitFlank::Left)));
    }

    #[test]
    fn small_positions_overlap_only_on_same_cell() {
        let front = UnitPosition::front(UnitFlank::Left);
        assert!(front.overlaps(&UnitPosition::front(UnitFlank::Left)));
        assert!(!front.overlaps(&UnitPosition::back(UnitFlank::Left)));
    }

    #[test]
    fn flank_distance_is_symmetric() {
        assert_eq!(UnitFlank::Left.distance(UnitFlank::Right), 2);
        assert_eq!(UnitFlank::Right.distance(UnitFlank::Center), 1);
        assert_eq!(UnitFlank::Center.distance(UnitFlank::Center), 0);
    }
}
