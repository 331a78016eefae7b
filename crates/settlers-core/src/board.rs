//! Game board representation including tiles, buildings, and ports.
//!
//! This module contains:
//! - Resource and tile kinds
//! - Port kinds and their fixed coastal sites
//! - Settlements and cities
//! - The generated board with its lookup tables
//! - Production for a dice roll

use crate::layout::{corner_lattice, spiral_order, Corner, RoadEdge, TilePos, TOKEN_LETTERS};
use crate::player::{PlayerColor, ResourceHand};
use crate::roads::RoadNetwork;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Ore => "ore",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a tile produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// No production and no number token
    Desert,
}

impl TileKind {
    /// The standard tile deck: 4 wood, 4 sheep, 4 wheat, 3 brick, 3 ore, 1 desert
    pub fn standard_deck() -> Vec<TileKind> {
        let counts = [
            (Resource::Wood, 4),
            (Resource::Sheep, 4),
            (Resource::Wheat, 4),
            (Resource::Brick, 3),
            (Resource::Ore, 3),
        ];
        let mut deck: Vec<TileKind> = counts
            .iter()
            .flat_map(|(r, n)| std::iter::repeat(TileKind::Resource(*r)).take(*n))
            .collect();
        deck.push(TileKind::Desert);
        deck
    }

    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileKind::Resource(r) => Some(*r),
            TileKind::Desert => None,
        }
    }
}

/// Port kinds for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl PortKind {
    /// The nine ports of a standard board: 4 generic, one per resource
    pub fn standard_set() -> Vec<PortKind> {
        let mut kinds = vec![PortKind::Generic; 4];
        kinds.extend(Resource::ALL.into_iter().map(PortKind::Specific));
        kinds
    }
}

/// Coastal tiles that carry a port, with the two corners the port touches.
/// `None` as the column names the last tile in the row.
const PORT_SITES: [(usize, Option<usize>, [usize; 2]); 9] = [
    (1, Some(0), [4, 5]),
    (2, Some(0), [5, 0]),
    (4, Some(0), [0, 1]),
    (7, Some(0), [0, 1]),
    (8, Some(0), [1, 2]),
    (7, None, [2, 3]),
    (4, None, [2, 3]),
    (2, None, [3, 4]),
    (1, None, [4, 5]),
];

/// A single tile on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pos: TilePos,
    kind: TileKind,
    /// Dice number that triggers production (None for the desert)
    token: Option<u8>,
    /// Letter of the token, in laying order
    letter: Option<char>,
    corners: [Corner; 6],
}

impl Tile {
    pub fn pos(&self) -> TilePos {
        self.pos
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn resource(&self) -> Option<Resource> {
        self.kind.resource()
    }

    pub fn token(&self) -> Option<u8> {
        self.token
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    /// Corners in order: left, lower-left, lower-right, right, upper-right, upper-left
    pub fn corners(&self) -> &[Corner; 6] {
        &self.corners
    }

    pub fn is_desert(&self) -> bool {
        self.kind == TileKind::Desert
    }
}

/// A settlement or city on a corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub color: PlayerColor,
    pub corner: Corner,
    pub is_city: bool,
}

impl Settlement {
    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        if self.is_city {
            2
        } else {
            1
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        if self.is_city {
            2
        } else {
            1
        }
    }
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    /// Tiles in row-major order
    tiles: Vec<Tile>,
    corner_tiles: HashMap<Corner, Vec<TilePos>>,
    /// Productive tiles by token number
    roll_tiles: BTreeMap<u8, Vec<TilePos>>,
    corners: BTreeSet<Corner>,
    edges: BTreeSet<RoadEdge>,
    /// Corners where a settlement may still be placed
    available: BTreeSet<Corner>,
    settlements: HashMap<Corner, Settlement>,
    roads: RoadNetwork,
    ports: BTreeMap<Corner, PortKind>,
    robber: TilePos,
    desert: TilePos,
}

impl Board {
    /// Generate a board with shuffled tiles and ports.
    ///
    /// Tiles are dealt row-major from a shuffled deck, then number tokens are
    /// laid along the spiral, skipping the desert. The robber starts on the
    /// desert.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = TileKind::standard_deck();
        deck.shuffle(rng);

        let lattice = corner_lattice();
        let mut tiles: Vec<Tile> = TilePos::all()
            .zip(deck)
            .map(|(pos, kind)| Tile {
                pos,
                kind,
                token: None,
                letter: None,
                corners: lattice[pos.row][pos.col],
            })
            .collect();

        let mut letters = TOKEN_LETTERS.iter();
        for pos in spiral_order() {
            let Some(tile) = pos.index().and_then(|i| tiles.get_mut(i)) else {
                continue;
            };
            if tile.is_desert() {
                continue;
            }
            if let Some((letter, number)) = letters.next() {
                tile.letter = Some(*letter);
                tile.token = Some(*number);
            }
        }

        let desert = tiles
            .iter()
            .find(|t| t.is_desert())
            .map(|t| t.pos)
            .unwrap_or(TilePos::new(0, 0));

        let mut corner_tiles: HashMap<Corner, Vec<TilePos>> = HashMap::new();
        let mut roll_tiles: BTreeMap<u8, Vec<TilePos>> = BTreeMap::new();
        let mut edges = BTreeSet::new();
        for tile in &tiles {
            for (i, corner) in tile.corners.iter().enumerate() {
                corner_tiles.entry(*corner).or_default().push(tile.pos);
                edges.insert(RoadEdge::new(*corner, tile.corners[(i + 1) % 6]));
            }
            if let Some(number) = tile.token {
                roll_tiles.entry(number).or_default().push(tile.pos);
            }
        }
        let corners: BTreeSet<Corner> = corner_tiles.keys().copied().collect();

        let mut kinds = PortKind::standard_set();
        kinds.shuffle(rng);
        let mut ports = BTreeMap::new();
        for ((row, col, [i, j]), kind) in PORT_SITES.into_iter().zip(kinds) {
            let col = col.unwrap_or(lattice[row].len() - 1);
            let hex = &lattice[row][col];
            ports.insert(hex[i], kind);
            ports.insert(hex[j], kind);
        }

        debug!(
            "generated board with desert at {}, {} corners and {} edges",
            desert,
            corners.len(),
            edges.len()
        );

        Self {
            tiles,
            corner_tiles,
            roll_tiles,
            available: corners.clone(),
            corners,
            edges,
            settlements: HashMap::new(),
            roads: RoadNetwork::new(),
            ports,
            robber: desert,
            desert,
        }
    }

    // ==================== Query Methods ====================

    /// All tiles in row-major order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        pos.index().and_then(|i| self.tiles.get(i))
    }

    /// Tiles touching a corner (empty for an unknown corner)
    pub fn tiles_at_corner(&self, corner: Corner) -> Vec<&Tile> {
        self.corner_tiles
            .get(&corner)
            .into_iter()
            .flatten()
            .filter_map(|pos| self.tile(*pos))
            .collect()
    }

    /// Productive tiles carrying `number`
    pub fn tiles_for_roll(&self, number: u8) -> Vec<&Tile> {
        self.roll_tiles
            .get(&number)
            .into_iter()
            .flatten()
            .filter_map(|pos| self.tile(*pos))
            .collect()
    }

    pub fn corners(&self) -> &BTreeSet<Corner> {
        &self.corners
    }

    pub fn edges(&self) -> &BTreeSet<RoadEdge> {
        &self.edges
    }

    pub fn is_edge(&self, edge: RoadEdge) -> bool {
        self.edges.contains(&edge)
    }

    /// Corners one edge away from `corner`, sorted
    pub fn adjacent_corners(&self, corner: Corner) -> Vec<Corner> {
        let mut adjacent: Vec<Corner> = self
            .tiles_at_corner(corner)
            .iter()
            .flat_map(|tile| {
                let c = tile.corners();
                (0..6).filter_map(move |i| {
                    if c[i] == corner {
                        Some([c[(i + 5) % 6], c[(i + 1) % 6]])
                    } else {
                        None
                    }
                })
            })
            .flatten()
            .collect();
        adjacent.sort();
        adjacent.dedup();
        adjacent
    }

    pub fn robber(&self) -> TilePos {
        self.robber
    }

    pub fn desert(&self) -> TilePos {
        self.desert
    }

    pub fn settlement_at(&self, corner: Corner) -> Option<&Settlement> {
        self.settlements.get(&corner)
    }

    /// Owner of the building on `corner`, if any
    pub fn owner_at(&self, corner: Corner) -> Option<PlayerColor> {
        self.settlements.get(&corner).map(|s| s.color)
    }

    /// All buildings, sorted by corner
    pub fn settlements(&self) -> Vec<&Settlement> {
        let mut all: Vec<&Settlement> = self.settlements.values().collect();
        all.sort_by_key(|s| s.corner);
        all
    }

    pub fn roads(&self) -> &RoadNetwork {
        &self.roads
    }

    pub fn port_at(&self, corner: Corner) -> Option<PortKind> {
        self.ports.get(&corner).copied()
    }

    /// Every port corner with its kind
    pub fn ports(&self) -> &BTreeMap<Corner, PortKind> {
        &self.ports
    }

    /// Ports a player reaches through their buildings
    pub fn ports_for(&self, color: PlayerColor) -> Vec<PortKind> {
        let mut reached = Vec::new();
        for s in self.settlements() {
            if s.color != color {
                continue;
            }
            if let Some(kind) = self.port_at(s.corner) {
                if !reached.contains(&kind) {
                    reached.push(kind);
                }
            }
        }
        reached
    }

    /// Colors with a building on one of the tile's corners
    pub fn players_on_tile(&self, pos: TilePos) -> BTreeSet<PlayerColor> {
        self.tile(pos)
            .map(|tile| {
                tile.corners()
                    .iter()
                    .filter_map(|c| self.owner_at(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ==================== Validation Methods ====================

    /// Free, on the board, and not next to any building
    pub fn can_place_settlement(&self, corner: Corner) -> bool {
        self.available.contains(&corner)
    }

    /// Every corner where a settlement may still go, sorted
    pub fn legal_settlement_corners(&self) -> Vec<Corner> {
        self.available.iter().copied().collect()
    }

    /// Whether `color` may build a road on `edge`
    pub fn can_place_road(&self, edge: RoadEdge, color: PlayerColor) -> bool {
        self.is_edge(edge) && self.roads.can_place(edge, color, |c| self.owner_at(c))
    }

    /// As [`Board::can_place_road`], with `pending` treated as already built
    pub fn can_place_road_after(&self, edge: RoadEdge, color: PlayerColor, pending: RoadEdge) -> bool {
        self.is_edge(edge)
            && self
                .roads
                .can_place_after(edge, color, Some(pending), |c| self.owner_at(c))
    }

    /// Road length for `color` through the component containing `start`
    pub fn road_length(&self, color: PlayerColor, start: Corner) -> u32 {
        self.roads.road_length(color, start, |c| self.owner_at(c))
    }

    /// Best road length over everything `color` has built
    pub fn longest_road(&self, color: PlayerColor) -> u32 {
        self.roads.longest_road(color, |c| self.owner_at(c))
    }

    // ==================== Mutation Methods ====================

    /// Place a settlement (assumes validation already done) and retire the
    /// corner and its neighbours from the available set
    pub(crate) fn place_settlement(&mut self, corner: Corner, color: PlayerColor) {
        self.settlements.insert(
            corner,
            Settlement {
                color,
                corner,
                is_city: false,
            },
        );
        for adjacent in self.adjacent_corners(corner) {
            self.available.remove(&adjacent);
        }
        self.available.remove(&corner);
    }

    /// Upgrade a settlement to a city
    pub(crate) fn upgrade_to_city(&mut self, corner: Corner) {
        if let Some(s) = self.settlements.get_mut(&corner) {
            s.is_city = true;
        }
    }

    /// Place a road
    pub(crate) fn place_road(&mut self, edge: RoadEdge, color: PlayerColor) {
        self.roads.insert(edge, color);
    }

    /// Move the robber to a new location
    pub(crate) fn move_robber(&mut self, pos: TilePos) {
        self.robber = pos;
    }

    // ==================== Resource Distribution ====================

    /// Resources produced for a dice roll, per color.
    ///
    /// The robber's tile produces nothing. A 7 produces nothing at all.
    pub fn production_for_roll(&self, roll: u8) -> BTreeMap<PlayerColor, ResourceHand> {
        let mut distribution: BTreeMap<PlayerColor, ResourceHand> = BTreeMap::new();

        for tile in self.tiles_for_roll(roll) {
            if tile.pos == self.robber {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            for corner in tile.corners() {
                if let Some(s) = self.settlement_at(*corner) {
                    distribution
                        .entry(s.color)
                        .or_default()
                        .add(resource, s.resource_multiplier());
                }
            }
        }

        distribution
    }

    /// One card per non-desert tile touching `corner`. Used for the second
    /// initial settlement, which ignores the robber.
    pub fn production_for_corner(&self, corner: Corner) -> ResourceHand {
        let mut hand = ResourceHand::new();
        for tile in self.tiles_at_corner(corner) {
            if let Some(resource) = tile.resource() {
                hand.add(resource, 1);
            }
        }
        hand
    }

    /// Snapshot with plain lists in place of maps
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tiles: self.tiles.clone(),
            settlements: self.settlements().into_iter().copied().collect(),
            roads: self.roads.roads().collect(),
            ports: self.ports.iter().map(|(c, k)| (*c, *k)).collect(),
            robber: self.robber,
        }
    }
}

/// Serializable board state with lists instead of corner-keyed maps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<Tile>,
    pub settlements: Vec<Settlement>,
    pub roads: Vec<(RoadEdge, PlayerColor)>,
    pub ports: Vec<(Corner, PortKind)>,
    pub robber: TilePos,
}
