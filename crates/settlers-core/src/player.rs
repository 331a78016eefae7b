//! Player state and resource management.
//!
//! This module contains:
//! - Player colors
//! - ResourceHand for managing resource counts
//! - Development card kinds and the standard deck
//! - Special cards (longest road, largest army)
//! - Building costs
//! - The per-color Player ledger

use crate::board::Resource;
use crate::layout::{Corner, RoadEdge};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Player color. Colors double as player identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
    Green,
    Yellow,
}

impl PlayerColor {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Orange => "orange",
            PlayerColor::White => "white",
            PlayerColor::Green => "green",
            PlayerColor::Yellow => "yellow",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Development card kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DevCardKind {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP the moment it is bought
    VictoryPoint,
    /// Take every other player's holding of one resource
    Monopoly,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
}

impl DevCardKind {
    pub const ALL: [DevCardKind; 5] = [
        DevCardKind::Knight,
        DevCardKind::VictoryPoint,
        DevCardKind::Monopoly,
        DevCardKind::RoadBuilding,
        DevCardKind::YearOfPlenty,
    ];

    /// How many copies of this card the standard deck holds
    pub fn deck_count(&self) -> usize {
        match self {
            DevCardKind::Knight => 14,
            DevCardKind::VictoryPoint => 5,
            DevCardKind::Monopoly => 2,
            DevCardKind::RoadBuilding => 2,
            DevCardKind::YearOfPlenty => 2,
        }
    }

    /// Create the standard development card deck (25 cards), unshuffled
    pub fn standard_deck() -> Vec<DevCardKind> {
        let mut deck = Vec::with_capacity(25);
        for kind in Self::ALL {
            deck.extend(std::iter::repeat(kind).take(kind.deck_count()));
        }
        deck
    }

    /// Create the standard deck and shuffle it
    pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<DevCardKind> {
        let mut deck = Self::standard_deck();
        deck.shuffle(rng);
        deck
    }
}

impl fmt::Display for DevCardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DevCardKind::Knight => "knight",
            DevCardKind::VictoryPoint => "victory point",
            DevCardKind::Monopoly => "monopoly",
            DevCardKind::RoadBuilding => "road building",
            DevCardKind::YearOfPlenty => "year of plenty",
        };
        f.write_str(name)
    }
}

/// Achievement cards held by at most one player at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpecialCard {
    LongestRoad,
    LargestArmy,
}

impl fmt::Display for SpecialCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecialCard::LongestRoad => f.write_str("longest road"),
            SpecialCard::LargestArmy => f.write_str("largest army"),
        }
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a hand holding one card per listed resource
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut hand = Self::new();
        for r in resources {
            hand.add(*r, 1);
        }
        hand
    }

    /// Total number of resource cards, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        Resource::ALL
            .iter()
            .fold(0u32, |sum, r| sum.saturating_add(self.get(*r)))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Brick => &mut self.brick,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for r in Resource::ALL {
            self.add(r, other.get(r));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Subtract a cost, leaving the hand untouched and returning false if
    /// any count would go negative
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for r in Resource::ALL {
            *self.slot(r) -= cost.get(r);
        }
        true
    }

    /// Remove and return everything held of one resource
    pub fn take_all(&mut self, resource: Resource) -> u32 {
        std::mem::take(self.slot(resource))
    }

    /// Remove a uniformly random card (robber steal). `None` on an empty hand.
    pub fn remove_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut pick = rng.gen_range(0..total);
        for r in Resource::ALL {
            let held = self.get(r);
            if pick < held {
                *self.slot(r) -= 1;
                return Some(r);
            }
            pick -= held;
        }
        None
    }

    /// Non-zero entries, in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|r| (r, self.get(r)))
            .filter(|(_, n)| *n > 0)
    }
}

impl fmt::Display for ResourceHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(r, n)| format!("{} x {}", r, n)).collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 wood
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 wood, 1 wheat, 1 sheep
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 3 ore, 2 wheat
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to buy a development card: 1 ore, 1 wheat, 1 sheep
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    color: PlayerColor,
    resources: ResourceHand,
    /// Permanent victory points: buildings and VP cards, never special cards
    victory_points: u32,
    /// Every settlement ever placed, in placement order (upgraded ones included)
    settlements: Vec<Corner>,
    cities: BTreeSet<Corner>,
    roads: Vec<RoadEdge>,
    dev_cards: BTreeMap<DevCardKind, u32>,
    vp_cards: u32,
    knights_played: u32,
    special_cards: BTreeSet<SpecialCard>,
}

impl Player {
    pub fn new(color: PlayerColor) -> Self {
        Self {
            color,
            resources: ResourceHand::new(),
            victory_points: 0,
            settlements: Vec::new(),
            cities: BTreeSet::new(),
            roads: Vec::new(),
            dev_cards: BTreeMap::new(),
            vp_cards: 0,
            knights_played: 0,
            special_cards: BTreeSet::new(),
        }
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    pub fn resources(&self) -> &ResourceHand {
        &self.resources
    }

    /// Permanent victory points (buildings and VP cards)
    pub fn permanent_victory_points(&self) -> u32 {
        self.victory_points
    }

    /// Victory points including special cards, computed on demand
    pub fn total_victory_points(&self, points_per_special_card: u32) -> u32 {
        self.victory_points + points_per_special_card * self.special_cards.len() as u32
    }

    /// Settlements that have not been upgraded
    pub fn num_settlements(&self) -> usize {
        self.settlements.len() - self.cities.len()
    }

    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }

    pub fn num_roads(&self) -> usize {
        self.roads.len()
    }

    /// Every building corner in placement order
    pub fn settlement_corners(&self) -> &[Corner] {
        &self.settlements
    }

    pub fn roads(&self) -> &[RoadEdge] {
        &self.roads
    }

    pub fn knights_played(&self) -> u32 {
        self.knights_played
    }

    pub fn vp_cards(&self) -> u32 {
        self.vp_cards
    }

    /// Unplayed development cards by kind (VP cards included)
    pub fn development_cards(&self) -> &BTreeMap<DevCardKind, u32> {
        &self.dev_cards
    }

    pub fn development_card_count(&self, kind: DevCardKind) -> u32 {
        self.dev_cards.get(&kind).copied().unwrap_or(0)
    }

    pub fn has_special_card(&self, card: SpecialCard) -> bool {
        self.special_cards.contains(&card)
    }

    pub fn special_cards(&self) -> &BTreeSet<SpecialCard> {
        &self.special_cards
    }

    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.resources.can_afford(cost)
    }

    // ==================== Ledger Mutation ====================

    pub(crate) fn pay(&mut self, cost: &ResourceHand) -> bool {
        self.resources.try_subtract(cost)
    }

    pub(crate) fn receive(&mut self, gain: &ResourceHand) {
        self.resources.add_hand(gain);
    }

    pub(crate) fn resources_mut(&mut self) -> &mut ResourceHand {
        &mut self.resources
    }

    pub(crate) fn record_settlement(&mut self, corner: Corner) {
        self.settlements.push(corner);
        self.victory_points += 1;
    }

    pub(crate) fn record_city(&mut self, corner: Corner) {
        self.cities.insert(corner);
        self.victory_points += 1;
    }

    pub(crate) fn record_road(&mut self, edge: RoadEdge) {
        self.roads.push(edge);
    }

    pub(crate) fn add_development_card(&mut self, kind: DevCardKind) {
        *self.dev_cards.entry(kind).or_insert(0) += 1;
        if kind == DevCardKind::VictoryPoint {
            self.vp_cards += 1;
            self.victory_points += 1;
        }
    }

    /// Remove one card of `kind`; returns false if none is held
    pub(crate) fn play_development_card(&mut self, kind: DevCardKind) -> bool {
        match self.dev_cards.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                if kind == DevCardKind::Knight {
                    self.knights_played += 1;
                }
                true
            }
            _ => false,
        }
    }

    pub(crate) fn add_special_card(&mut self, card: SpecialCard) {
        self.special_cards.insert(card);
    }

    pub(crate) fn remove_special_card(&mut self, card: SpecialCard) {
        self.special_cards.remove(&card);
    }
}
