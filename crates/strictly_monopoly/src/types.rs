//! Core domain enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Group an asset tile belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AssetGroup {
    /// Mediterranean and Baltic.
    Brown,
    /// Oriental, Vermont, Connecticut.
    LightBlue,
    /// St. Charles, States, Virginia.
    Pink,
    /// St. James, Tennessee, New York.
    Orange,
    /// Kentucky, Indiana, Illinois.
    Red,
    /// Atlantic, Ventnor, Marvin Gardens.
    Yellow,
    /// Pacific, North Carolina, Pennsylvania.
    Green,
    /// Park Place and Boardwalk.
    DarkBlue,
    /// The four railroads.
    Railroad,
    /// Electric Company and Water Works.
    Utility,
}

/// How an asset behaves, derived from its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Color group property that accepts improvements.
    Improvable,
    /// Railroad, rent scales with railroads owned.
    Railroad,
    /// Utility, rent scales with the dice.
    Utility,
}

impl AssetGroup {
    /// The asset behaviour of tiles in this group.
    pub fn kind(self) -> AssetKind {
        match self {
            AssetGroup::Railroad => AssetKind::Railroad,
            AssetGroup::Utility => AssetKind::Utility,
            _ => AssetKind::Improvable,
        }
    }
}

/// Ownership tier of an improvable tile.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    FromRepr,
    IntoStaticStr,
)]
#[repr(u8)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    /// Owner lacks part of the group.
    NoMonopoly = 0,
    /// Owner holds the whole group, no improvements.
    Monopoly = 1,
    /// One improvement.
    OneImprovement = 2,
    /// Two improvements.
    TwoImprovements = 3,
    /// Three improvements.
    ThreeImprovements = 4,
    /// Four improvements.
    FourImprovements = 5,
    /// Hotel.
    FiveImprovements = 6,
}

impl PropertyStatus {
    /// Improvements carried at this tier.
    pub fn improvements(self) -> u8 {
        (self as u8).saturating_sub(PropertyStatus::Monopoly as u8)
    }

    /// Tier of a monopoly tile carrying `improvements` improvements.
    pub fn with_improvements(improvements: u8) -> Option<Self> {
        Self::from_repr((PropertyStatus::Monopoly as u8).checked_add(improvements)?)
    }
}

/// Ownership tier of a railroad.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    FromRepr,
    IntoStaticStr,
)]
#[repr(u8)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RailroadStatus {
    /// Nobody owns it.
    Unowned = 0,
    /// Owner holds one railroad.
    OneOwned = 1,
    /// Owner holds two railroads.
    TwoOwned = 2,
    /// Owner holds three railroads.
    ThreeOwned = 3,
    /// Owner holds all four.
    FourOwned = 4,
}

/// Ownership tier of a utility.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UtilityStatus {
    /// Owner holds one utility (or nobody owns it).
    NoMonopoly,
    /// Owner holds both utilities.
    Monopoly,
}

/// Group-specific ownership tier of an asset tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetStatus {
    /// Tier of a color group property.
    Property(PropertyStatus),
    /// Tier of a railroad.
    Railroad(RailroadStatus),
    /// Tier of a utility.
    Utility(UtilityStatus),
}

impl AssetStatus {
    /// Tier of an unowned tile in `group`.
    pub fn initial(group: AssetGroup) -> Self {
        match group.kind() {
            AssetKind::Improvable => AssetStatus::Property(PropertyStatus::NoMonopoly),
            AssetKind::Railroad => AssetStatus::Railroad(RailroadStatus::Unowned),
            AssetKind::Utility => AssetStatus::Utility(UtilityStatus::NoMonopoly),
        }
    }

    /// True at or above the tier reached by owning the whole group.
    pub fn is_monopoly(self) -> bool {
        match self {
            AssetStatus::Property(status) => status >= PropertyStatus::Monopoly,
            AssetStatus::Railroad(status) => status == RailroadStatus::FourOwned,
            AssetStatus::Utility(status) => status == UtilityStatus::Monopoly,
        }
    }

    /// Improvements carried, zero for railroads and utilities.
    pub fn improvements(self) -> u8 {
        match self {
            AssetStatus::Property(status) => status.improvements(),
            _ => 0,
        }
    }

    /// Wire label of the tier.
    pub fn label(self) -> &'static str {
        match self {
            AssetStatus::Property(status) => status.into(),
            AssetStatus::Railroad(status) => status.into(),
            AssetStatus::Utility(status) => status.into(),
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Solvency status of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    /// Solvent.
    Good,
    /// Money is negative but liquidating assets would cover it.
    InTheHole,
    /// Out of the game.
    Bankrupt,
    /// Undefined state, never produced by the engine.
    Invalid,
}

impl PlayerStatus {
    /// True unless the status is terminal.
    pub fn is_active(self) -> bool {
        !matches!(self, PlayerStatus::Bankrupt | PlayerStatus::Invalid)
    }
}

/// Way of leaving jail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JailMethod {
    /// Rolled doubles, free.
    Doubles,
    /// Paid the jail fee.
    Money,
    /// Used a Get Out of Jail Free card.
    Card,
}

/// Which card deck a card tile draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DeckKind {
    /// Chance.
    Chance,
    /// Community Chest.
    CommunityChest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_property_status_improvements() {
        assert_eq!(PropertyStatus::NoMonopoly.improvements(), 0);
        assert_eq!(PropertyStatus::Monopoly.improvements(), 0);
        assert_eq!(PropertyStatus::FiveImprovements.improvements(), 5);
        assert_eq!(
            PropertyStatus::with_improvements(3),
            Some(PropertyStatus::ThreeImprovements)
        );
        assert_eq!(PropertyStatus::with_improvements(6), None);
    }

    #[test]
    fn test_initial_status_by_group() {
        assert_eq!(
            AssetStatus::initial(AssetGroup::Brown),
            AssetStatus::Property(PropertyStatus::NoMonopoly)
        );
        assert_eq!(
            AssetStatus::initial(AssetGroup::Railroad),
            AssetStatus::Railroad(RailroadStatus::Unowned)
        );
        assert!(!AssetStatus::initial(AssetGroup::Utility).is_monopoly());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(
            AssetStatus::Property(PropertyStatus::NoMonopoly).label(),
            "NO_MONOPOLY"
        );
        assert_eq!(
            AssetStatus::Railroad(RailroadStatus::TwoOwned).to_string(),
            "TWO_OWNED"
        );
        assert_eq!(PlayerStatus::InTheHole.to_string(), "IN_THE_HOLE");
    }

    #[test]
    fn test_jail_method_parsing() {
        assert_eq!(JailMethod::from_str("card"), Ok(JailMethod::Card));
        assert_eq!(JailMethod::from_str("MONEY"), Ok(JailMethod::Money));
        assert!(JailMethod::from_str("bribe").is_err());
    }
}
