//! Development card plays and the events commands produce.
//!
//! Commands on [`crate::Game`] return the events describing what changed, so
//! a host can render or log them without diffing state.

use crate::board::Resource;
use crate::layout::{Corner, RoadEdge, TilePos};
use crate::player::{DevCardKind, PlayerColor, ResourceHand};
use serde::{Deserialize, Serialize};

/// A development card play together with the choices it needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevCardPlay {
    /// Move the robber, optionally stealing from `victim`
    Knight {
        target_tile: TilePos,
        victim: Option<PlayerColor>,
    },
    /// Take every other player's holding of one resource
    Monopoly { resource: Resource },
    /// Take two resources from the bank
    YearOfPlenty { resources: [Resource; 2] },
    /// Build two roads for free, in order
    RoadBuilding { roads: [RoadEdge; 2] },
}

impl DevCardPlay {
    /// The card this play consumes
    pub fn kind(&self) -> DevCardKind {
        match self {
            DevCardPlay::Knight { .. } => DevCardKind::Knight,
            DevCardPlay::Monopoly { .. } => DevCardKind::Monopoly,
            DevCardPlay::YearOfPlenty { .. } => DevCardKind::YearOfPlenty,
            DevCardPlay::RoadBuilding { .. } => DevCardKind::RoadBuilding,
        }
    }
}

/// Events that occur as a result of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        color: PlayerColor,
        dice: (u8, u8),
        total: u8,
    },

    /// A color received resources from a roll or an initial settlement
    ResourcesProduced {
        color: PlayerColor,
        resources: ResourceHand,
    },

    /// A 7 left this color over the hand limit
    DiscardRequired { color: PlayerColor, count: u32 },

    /// A color paid an owed discard
    ResourcesDiscarded {
        color: PlayerColor,
        resources: ResourceHand,
    },

    SettlementBuilt {
        color: PlayerColor,
        corner: Corner,
        initial: bool,
    },

    CityBuilt { color: PlayerColor, corner: Corner },

    RoadBuilt {
        color: PlayerColor,
        edge: RoadEdge,
        /// Road length through the new road after placing it
        length: u32,
    },

    /// `kind` is private to the buyer until played
    DevelopmentCardBought {
        color: PlayerColor,
        kind: DevCardKind,
    },

    DevelopmentCardPlayed {
        color: PlayerColor,
        kind: DevCardKind,
    },

    /// Monopoly collected `taken` cards of `resource`
    MonopolyTaken {
        color: PlayerColor,
        resource: Resource,
        taken: u32,
    },

    /// Year of plenty granted two resources
    ResourcesGranted {
        color: PlayerColor,
        resources: ResourceHand,
    },

    RobberMoved {
        color: PlayerColor,
        from: TilePos,
        to: TilePos,
    },

    /// `resource` is `None` when the victim had nothing to steal
    ResourceStolen {
        thief: PlayerColor,
        victim: PlayerColor,
        resource: Option<Resource>,
    },

    /// Longest road changed hands
    LongestRoadChanged {
        previous: Option<PlayerColor>,
        holder: PlayerColor,
        length: u32,
    },

    /// Largest army changed hands
    LargestArmyChanged {
        previous: Option<PlayerColor>,
        holder: PlayerColor,
        knights: u32,
    },

    /// Every color placed two settlements and two roads
    InitialPlacementFinished,

    TurnEnded {
        color: PlayerColor,
        next: PlayerColor,
    },

    GameWon {
        color: PlayerColor,
        victory_points: u32,
    },
}

/// Outcome of a dice roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub dice: (u8, u8),
    pub events: Vec<GameEvent>,
}

impl DiceRoll {
    pub fn total(&self) -> u8 {
        self.dice.0 + self.dice.1
    }

    pub fn is_seven(&self) -> bool {
        self.total() == 7
    }
}
